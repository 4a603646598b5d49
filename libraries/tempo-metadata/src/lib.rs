//! Tempo Metadata
//!
//! Metadata extraction capability for the Tempo library engine.
//!
//! The [`MetadataProvider`] trait turns a file path into a
//! [`tempo_core::types::TrackCandidate`] or a typed failure. The shipped
//! implementation is [`LoftyProvider`]; alternatives can be compiled in
//! behind the same trait.
//!
//! Two outcomes are deliberately not errors:
//! - a file that probes as playable but has malformed tags yields a
//!   minimal candidate keyed off the filename;
//! - only a failed playability probe is reported, as
//!   [`MetadataError::NotPlayable`], and callers skip those silently.

mod error;
mod provider;
mod reader;

pub use error::{MetadataError, Result};
pub use provider::MetadataProvider;
pub use reader::LoftyProvider;
