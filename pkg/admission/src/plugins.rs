use pkg_constants::admission::READY_TIMEOUT_SECS;
use pkg_state::GardenListers;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::info;

use crate::attributes::Attributes;
use crate::errors::{AdmissionError, AdmissionResult};
use crate::interfaces::ValidationInterface;

/// Dependencies handed to plugin factories.
#[derive(Clone)]
pub struct PluginContext {
    pub listers: Option<Arc<dyn GardenListers>>,
    pub ready_timeout: Duration,
}

impl PluginContext {
    pub fn new(listers: Arc<dyn GardenListers>) -> Self {
        Self {
            listers: Some(listers),
            ready_timeout: Duration::from_secs(READY_TIMEOUT_SECS),
        }
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

pub type Factory = fn(&PluginContext) -> AdmissionResult<Arc<dyn ValidationInterface>>;

/// Named plugin factories.
#[derive(Default)]
pub struct Plugins {
    registry: RwLock<BTreeMap<String, Factory>>,
}

impl Plugins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, factory: Factory) {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), factory);
    }

    pub fn get_factory(&self, name: &str) -> Option<Factory> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// Registered names in sorted order.
    pub fn registered_names(&self) -> Vec<String> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.get_factory(name).is_some()
    }

    /// Build one plugin and check it was fully initialized.
    pub fn new_from_plugins(
        &self,
        name: &str,
        ctx: &PluginContext,
    ) -> AdmissionResult<Arc<dyn ValidationInterface>> {
        let factory = self.get_factory(name).ok_or_else(|| {
            AdmissionError::internal_error(format!("unknown admission plugin: {}", name))
        })?;
        let plugin = factory(ctx)?;
        plugin.validate_initialization()?;
        Ok(plugin)
    }

    /// Build the enabled plugins, in the given order, into a chain.
    pub fn new_chain(&self, names: &[String], ctx: &PluginContext) -> AdmissionResult<ValidationChain> {
        let mut chain = ValidationChain::default();
        for name in names {
            let plugin = self.new_from_plugins(name, ctx)?;
            info!("Enabled admission plugin {}", name);
            chain.plugins.push((name.clone(), plugin));
        }
        Ok(chain)
    }
}

/// Runs every plugin that handles the request's operation; the first
/// rejection wins.
#[derive(Clone, Default)]
pub struct ValidationChain {
    plugins: Vec<(String, Arc<dyn ValidationInterface>)>,
}

impl ValidationChain {
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn validate(&self, attributes: &dyn Attributes) -> AdmissionResult<()> {
        for (_, plugin) in &self.plugins {
            if plugin.handles(attributes.operation()) {
                plugin.validate(attributes)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributesRecord, GroupVersionKind, GroupVersionResource};
    use crate::handler::Handler;
    use crate::interfaces::{Interface, Operation};
    use pkg_state::GardenCache;

    struct DenyAll {
        handler: Handler,
    }

    impl Interface for DenyAll {
        fn handles(&self, operation: Operation) -> bool {
            self.handler.handles(operation)
        }
    }

    impl ValidationInterface for DenyAll {
        fn validate(&self, attributes: &dyn Attributes) -> AdmissionResult<()> {
            Err(AdmissionError::forbidden(
                &attributes.resource().resource,
                attributes.name(),
                "denied",
            ))
        }
    }

    fn deny_all(_ctx: &PluginContext) -> AdmissionResult<Arc<dyn ValidationInterface>> {
        Ok(Arc::new(DenyAll {
            handler: Handler::new(&[Operation::Create]),
        }))
    }

    fn context() -> PluginContext {
        PluginContext::new(Arc::new(GardenCache::new()))
    }

    fn attributes(operation: Operation) -> AttributesRecord {
        AttributesRecord {
            name: "s1".to_string(),
            namespace: "garden-dev".to_string(),
            resource: GroupVersionResource::new("garden.sapcloud.io", "v1beta1", "shoots"),
            subresource: String::new(),
            operation,
            kind: GroupVersionKind::new("garden.sapcloud.io", "v1beta1", "Shoot"),
            object: None,
            old_object: None,
        }
    }

    #[test]
    fn registry_lookup() {
        let plugins = Plugins::new();
        plugins.register("DenyAll", deny_all);
        assert!(plugins.is_registered("DenyAll"));
        assert!(!plugins.is_registered("Other"));
        assert_eq!(plugins.registered_names(), vec!["DenyAll".to_string()]);

        let err = plugins.new_from_plugins("Other", &context()).err().unwrap();
        assert!(err.to_string().contains("unknown admission plugin: Other"));
    }

    #[test]
    fn chain_only_runs_plugins_for_handled_operations() {
        let plugins = Plugins::new();
        plugins.register("DenyAll", deny_all);
        let chain = plugins.new_chain(&["DenyAll".to_string()], &context()).unwrap();
        assert_eq!(chain.names(), vec!["DenyAll"]);

        assert!(chain.validate(&attributes(Operation::Create)).is_err());
        assert!(chain.validate(&attributes(Operation::Update)).is_ok());
        assert!(ValidationChain::default().validate(&attributes(Operation::Create)).is_ok());
    }
}
