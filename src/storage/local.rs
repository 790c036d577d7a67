use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::{
    fs,
    io::{AsyncRead, AsyncWriteExt},
};

use crate::{
    errors::{AppError, Result},
    models::ObjectMetadata,
    storage::ObjectStore,
};

/// Object store backed by a directory on the local filesystem.
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        std::fs::create_dir_all(&base_path)
            .map_err(|e| AppError::Storage(format!("Failed to create storage directory: {}", e)))?;

        Ok(Self { base_path })
    }

    fn get_full_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::Validation(format!("Invalid object path: {}", path)));
        }
        Ok(self.base_path.join(relative))
    }

    async fn metadata_for(&self, path: &str, full_path: &Path) -> Result<ObjectMetadata> {
        let metadata = match fs::metadata(full_path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(AppError::NotFound(format!("Object not found: {}", path))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!("Object not found: {}", path)))
            }
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to get file metadata: {}",
                    e
                )))
            }
        };

        let created_at: DateTime<Utc> = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ObjectMetadata {
            content_type: mime_guess::from_path(&name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
            name,
            path: path.to_string(),
            size: metadata.len() as i64,
            created_at,
        })
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = self.get_full_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {}", e)))?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::Conflict(format!("Object already exists: {}", path)))
            }
            Err(e) => return Err(AppError::Storage(format!("Failed to create file: {}", e))),
        };

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            fs::remove_file(&full_path).await.ok();
            return Err(AppError::Storage(format!("Failed to write file: {}", e)));
        }

        Ok(path.to_string())
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectMetadata>> {
        let dir = self.get_full_path(prefix.trim_end_matches('/'))?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Storage(format!("Failed to list directory: {}", e))),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read directory entry: {}", e)))?
        {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let path = format!("{}/{}", prefix.trim_end_matches('/'), file_name);
            match self.metadata_for(&path, &entry.path()).await {
                Ok(meta) => objects.push(meta),
                Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        objects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));
        objects.truncate(limit);

        Ok(objects)
    }

    async fn stat(&self, path: &str) -> Result<ObjectMetadata> {
        let full_path = self.get_full_path(path)?;
        self.metadata_for(path, &full_path).await
    }

    async fn open(&self, path: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        let full_path = self.get_full_path(path)?;

        let file = fs::File::open(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("Object not found: {}", path)),
            _ => AppError::Storage(format!("Failed to open file: {}", e)),
        })?;

        Ok(Box::new(file))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let full_path = self.get_full_path(path)?;

        fs::remove_file(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("Object not found: {}", path)),
            _ => AppError::Storage(format!("Failed to delete file: {}", e)),
        })
    }

    async fn move_object(&self, from: &str, to: &str) -> Result<()> {
        let source = self.get_full_path(from)?;
        let target = self.get_full_path(to)?;

        self.metadata_for(from, &source).await?;
        if fs::try_exists(&target).await.unwrap_or(false) {
            return Err(AppError::Conflict(format!("Object already exists: {}", to)));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {}", e)))?;
        }

        fs::rename(&source, &target)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to move file: {}", e)))
    }
}
