//! Container format detection.
//!
//! Manuals are usually bare HELP image files, but some distributions ship them
//! zipped. Detection only looks at the leading signature bytes.

// Submodule declarations
pub mod functions;
pub mod types;
pub mod utils;

// Re-exports
pub use functions::{detect_container, detect_container_from_bytes};
pub use types::ContainerFormat;
