//! # Quill Shared
//!
//! Wire types shared by the API server and its clients: the read and write
//! views of a user, pagination envelopes and problem-details errors.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, Violation};
