//! File storage for uploaded documents

mod uploads;

pub use uploads::{StoredFile, UploadStore};
