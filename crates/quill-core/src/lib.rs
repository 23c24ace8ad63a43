//! # Quill Core
//!
//! The domain layer of Quill.
//! This crate contains the `Post` model and the persistence ports, with zero
//! infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::PersistenceError;
