//! URL handling module for Link-Atlas
//!
//! This module provides seed URL validation and base origin derivation.

mod origin;
mod validate;

// Re-export main functions
pub use origin::origin_of;
pub use validate::validate_seed_url;
