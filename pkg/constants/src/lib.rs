//! Centralized constants for the garden admission server.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod admission;
pub mod garden;
pub mod network;
pub mod paths;
pub mod state;
