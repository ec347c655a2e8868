//! Validating admission for garden resources: the plugin framework, the
//! AdmissionReview wire format, and the shoot quota plugin.

pub mod attributes;
pub mod errors;
pub mod handler;
pub mod interfaces;
pub mod plugins;
pub mod quotavalidator;
pub mod review;

pub use attributes::{Attributes, AttributesRecord, GroupVersionKind, GroupVersionResource};
pub use errors::{AdmissionError, AdmissionResult};
pub use handler::Handler;
pub use interfaces::{Interface, Operation, ValidationInterface};
pub use plugins::{PluginContext, Plugins, ValidationChain};

/// Registry with every plugin this crate ships.
pub fn all_plugins() -> Plugins {
    let plugins = Plugins::new();
    quotavalidator::register(&plugins);
    plugins
}
