//! Tracing/logging setup shared by processes embedding the resolver.

pub mod subscriber;

pub use subscriber::{LogFormat, init_with};

/// Initialize process-wide logging with defaults (`info`, JSON, `RUST_LOG` override).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    init_with("info", LogFormat::from_env());
}
