//! rusty-blog/crates/blog-core/src/lib.rs
//!
//! The central domain logic and interface definitions for rusty-blog.

pub mod error;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod services;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use pagination::*;
pub use traits::*;
