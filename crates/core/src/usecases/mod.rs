//! Use cases composing the ports into business operations.

pub mod file;
pub mod todo;

pub use file::{FileUseCase, UploadFileRequest, UploadFileResponse};
pub use todo::TodoUseCase;
