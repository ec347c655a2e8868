use std::fmt;
use std::str::FromStr;

use crate::attributes::Attributes;
use crate::errors::AdmissionResult;

/// Verb of the request under admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Connect => write!(f, "CONNECT"),
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CREATE" => Ok(Operation::Create),
            "UPDATE" => Ok(Operation::Update),
            "DELETE" => Ok(Operation::Delete),
            "CONNECT" => Ok(Operation::Connect),
            other => Err(format!("unknown operation {:?}", other)),
        }
    }
}

/// A pluggable admission decision maker.
pub trait Interface: Send + Sync {
    fn handles(&self, operation: Operation) -> bool;
}

/// Admission plugins that only inspect the request, never modify it.
pub trait ValidationInterface: Interface {
    fn validate(&self, attributes: &dyn Attributes) -> AdmissionResult<()>;

    /// Check that the plugin received every dependency it needs.
    fn validate_initialization(&self) -> AdmissionResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_display_and_parse() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!("update".parse::<Operation>(), Ok(Operation::Update));
        assert_eq!("DELETE".parse::<Operation>(), Ok(Operation::Delete));
        assert!("PATCH".parse::<Operation>().is_err());
    }
}
