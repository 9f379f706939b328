//! # Inkpost Core
//!
//! The domain layer of the Inkpost blogging backend.
//! This crate contains the entities, the ports infrastructure must implement,
//! and the authentication and post services built on top of them.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
