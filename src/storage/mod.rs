use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::errors::{AppError, Result};
use crate::models::ObjectMetadata;

pub mod local;

pub use local::LocalObjectStore;

/// Blob store holding file bytes, organised as `{user_id}/{file_name}`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores a new object. Fails with `Conflict` if the path is taken.
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String>;

    /// Lists objects directly under `prefix`, newest first, at most `limit`.
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectMetadata>>;

    async fn stat(&self, path: &str) -> Result<ObjectMetadata>;

    async fn open(&self, path: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>>;

    async fn remove(&self, path: &str) -> Result<()>;

    async fn move_object(&self, from: &str, to: &str) -> Result<()>;
}

pub fn object_path(user_id: &str, file_name: &str) -> String {
    format!("{}/{}", user_id, file_name)
}

/// Rejects names that could escape the owner's folder.
pub fn validate_file_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("File name cannot be empty".to_string()));
    }
    if name.len() > 255 {
        return Err(AppError::Validation("File name is too long".to_string()));
    }
    if trimmed == "." || trimmed == ".." || name.contains(['/', '\\', '\0']) {
        return Err(AppError::Validation(format!("Invalid file name: {}", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path() {
        assert_eq!(object_path("user_1", "a.txt"), "user_1/a.txt");
    }

    #[test]
    fn test_file_name_validation() {
        assert!(validate_file_name("report.pdf").is_ok());
        assert!(validate_file_name("my photo (1).jpg").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("   ").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("../other/a.txt").is_err());
        assert!(validate_file_name("a\\b").is_err());
        assert!(validate_file_name(&"x".repeat(256)).is_err());
    }
}
