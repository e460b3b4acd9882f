//! Core types and trait definitions for the Quad trigger handlers.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store backend, the handlers and the server all depend on it.

pub mod account;
pub mod document;
pub mod error;
pub mod policy;
pub mod push;
pub mod store;

pub use error::{Error, Result};
