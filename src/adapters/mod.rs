// Adapters layer: concrete implementations for external systems (row sources, http transport).

pub mod http;
pub mod memory;
pub mod sqlite;
