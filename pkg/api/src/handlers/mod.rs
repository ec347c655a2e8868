pub mod admission;
pub mod health;
pub mod resources;
pub mod watch;
