//! Emission line identification.
//!
//! A measured spectrum is reduced to its significant points (intensity above
//! the spectrum mean), then every reference system is matched against it
//! window by window. The viewer binary and the export layer only consume the
//! resulting [`identify::Identification`].

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod identify;
pub mod pipeline;

pub use error::{Error, Result};
