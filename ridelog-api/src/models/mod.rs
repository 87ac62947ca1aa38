pub mod auth;
pub mod entry;

// Re-export models for easier access
pub use auth::*;
pub use entry::*;
