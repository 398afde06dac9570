//! Application lifecycle helpers used by the binary.

pub mod shutdown;

// Re-export public API
pub use shutdown::shutdown_gracefully;
