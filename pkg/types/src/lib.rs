//! Typed garden objects shared by the store, the quota core and the API.

pub mod cloudprofile;
pub mod config;
pub mod meta;
pub mod quantity;
pub mod quota;
pub mod resources;
pub mod secretbinding;
pub mod shoot;
pub mod validate;

pub use meta::{GardenObject, ObjectMeta, ObjectReference};
pub use quantity::{Quantity, QuantityError};
pub use resources::{QuotaMetric, ResourceVector};
