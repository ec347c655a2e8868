//! Network-related constants.

/// Default port for the admission / garden API server.
pub const DEFAULT_API_PORT: u16 = 9443;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: [u8; 4] = [0, 0, 0, 0];
