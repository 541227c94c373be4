//! Request handler module
//!
//! Request routing dispatch plus the cached content and echo endpoints.

pub mod content;
pub mod echo;
pub mod router;

// Re-export main entry point
pub use content::ContentStore;
pub use router::handle_request;
