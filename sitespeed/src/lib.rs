// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    AuditOptions, format_elapsed, resolve_api_key, resolve_output_path, run_audit,
};

// Re-export traversal functionality from sitespeed-core
pub use sitespeed_core::traversal::{
    DEFAULT_DELAY, TraversalEvent, TraversalOptions, TraversalProgressCallback,
    execute_traversal,
};
