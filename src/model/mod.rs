//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod pack;

// Re-export for convenience
pub use error::{AppError, InputError, StoreError, SyncError};
pub use identifiers::{InvalidPackId, PackId};
pub use pack::{Fingerprint, Pack, PackView};
