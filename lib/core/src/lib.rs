//! Core types shared across corrlinker crates.
//!
//! This crate provides the foundational pieces shared by the session and
//! authentication layers: the rootcause-based `Result` alias and the opaque
//! session identifier.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{GenerateIdError, ParseIdError, SessionId};
