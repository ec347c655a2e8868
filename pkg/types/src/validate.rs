use anyhow::{Result, bail};

use crate::meta::GardenObject;

/// Validate a Kubernetes-style resource name.
/// Rules: lowercase `[a-z0-9-]`, max 63 chars, no leading/trailing hyphens.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("name must not be empty");
    }
    if name.len() > 63 {
        bail!("name '{}' exceeds 63 characters (got {})", name, name.len());
    }
    if name.starts_with('-') || name.ends_with('-') {
        bail!("name '{}' must not start or end with a hyphen", name);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        bail!(
            "name '{}' must contain only lowercase letters, digits, and hyphens [a-z0-9-]",
            name
        );
    }
    Ok(())
}

/// Check name and namespace of an object against its scope.
pub fn validate_metadata<T: GardenObject>(obj: &T) -> Result<()> {
    let meta = obj.metadata();
    validate_name(&meta.name)?;
    match (T::NAMESPACED, meta.namespace.is_empty()) {
        (true, true) => bail!("{} '{}' must have a namespace", T::KIND, meta.name),
        (false, false) => bail!("{} '{}' is cluster-scoped", T::KIND, meta.name),
        (true, false) => validate_name(&meta.namespace),
        (false, true) => Ok(()),
    }
}
