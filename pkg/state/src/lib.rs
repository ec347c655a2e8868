pub mod cache;
pub mod client;
pub mod error;
pub mod listers;
pub mod sync;
pub mod watch;

pub use cache::GardenCache;
pub use client::StateStore;
pub use error::StoreError;
pub use listers::GardenListers;
pub use sync::CacheSync;
