//! # Quill Core
//!
//! The domain layer of the Quill user service: user records and their
//! invariants, write validation, credential normalization and the
//! persistence gateway. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::DomainError;
