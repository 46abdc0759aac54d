//! Filesystem collaborators for the delivery pipeline.
//!
//! Narrow interfaces the orchestrator consumes: MIME type resolution and
//! reference sanitization with directory containment. Kept separate from
//! the delivery components so tests can substitute them freely.

pub mod mime;
pub mod sanitize;

pub use mime::{FixedMimeResolver, GuessMimeResolver, MimeResolver};
pub use sanitize::{
    PathError, SanitizeConfig, is_within_root, resolve_under_root, sanitize_reference,
};
