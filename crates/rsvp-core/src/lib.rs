//! Core types and trait definitions for the RSVP service.
//!
//! Holds the record model, validation, the derived statistics, and the two
//! seams (storage and sessions) that every other crate plugs into. Nothing
//! here speaks HTTP or SQL.

// Implementations use `async fn` against the trait's `Send` future bounds.
#![allow(async_fn_in_trait)]

pub mod envelope;
pub mod error;
pub mod listeners;
pub mod rsvp;
pub mod session;
pub mod stats;
pub mod store;

pub use error::{Error, Result, ValidationError};
