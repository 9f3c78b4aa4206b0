//! Object storage for uploaded files.
//!
//! [`S3FileStorage`] implements `todo_core::ports::FileStorage` on top of the
//! AWS SDK. Pointing [`S3Config::endpoint`] at a local S3 emulator switches
//! the client to static test credentials and path-style addressing.

pub mod s3;

pub use s3::{S3Config, S3FileStorage};
