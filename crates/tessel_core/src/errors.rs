//! Error Types
//!
//! This module defines the recoverable error surface of the object layer.
//!
//! # Overview
//!
//! [`TesselError`] covers:
//! - Allocation failures (handle exhaustion, failed object construction)
//! - Argument and state misuse detected while mutating an object
//! - Reads from an incomplete framebuffer
//! - Malformed context settings
//!
//! Lookups of unknown handles are *not* errors; they return `None` and leave the
//! protocol-level decision to the caller. Completeness failures are values, not
//! errors.
//!
//! ```rust,ignore
//! use tessel_core::errors::{Result, TesselError};
//!
//! fn make_name(manager: &mut ResourceManager<Texture>) -> Result<Handle> {
//!     manager.allocate_empty_object()
//! }
//! ```

use thiserror::Error;

use crate::handle::Handle;

/// The main error type for the object layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TesselError {
    // ========================================================================
    // Allocation Errors
    // ========================================================================
    /// Generic allocation failure, e.g. the handle space is exhausted.
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// No contiguous block of `count` free handles exists.
    #[error("Handle range exhausted: no contiguous block of {count} handles")]
    HandleRangeExhausted {
        /// Requested block size
        count: u32,
    },

    /// A factory reported that it could not construct the object.
    #[error("Failed to construct {kind} object for handle {handle}")]
    ObjectConstructionFailed {
        /// Resource kind name
        kind: &'static str,
        /// Handle the object was meant to fill
        handle: Handle,
    },

    // ========================================================================
    // Usage Errors
    // ========================================================================
    /// An argument is outside its legal range.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The operation is not allowed in the object's current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The operation reads from a framebuffer that is not complete.
    #[error("Invalid framebuffer operation: framebuffer status is {0}")]
    InvalidFramebufferOperation(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Context settings could not be parsed.
    #[error("Invalid context settings: {0}")]
    InvalidConfig(String),
}

impl TesselError {
    /// Returns `true` for every variant the API layer reports as out-of-memory.
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(
            self,
            Self::OutOfMemory(_)
                | Self::HandleRangeExhausted { .. }
                | Self::ObjectConstructionFailed { .. }
        )
    }
}

/// Alias for `Result<T, TesselError>`.
pub type Result<T> = std::result::Result<T, TesselError>;
