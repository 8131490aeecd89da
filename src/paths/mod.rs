//! Local path handling for Wave-Harvest
//!
//! This module provides destination sanitization and the on-disk layout of
//! input lists, failure logs, downloaded images, and run logs.

mod layout;
mod sanitize;

pub use layout::Layout;
pub use sanitize::{sanitize, Sanitized, IMAGE_EXTENSIONS};
