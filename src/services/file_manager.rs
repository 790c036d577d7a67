use std::sync::Arc;

use crate::{
    auth::UrlSigner,
    errors::{AppError, Result},
    models::{ObjectMetadata, StorageAccount, StoredObject},
    services::ledger::QuotaLedger,
    storage::{object_path, validate_file_name, ObjectStore},
};

/// Couples every object-store mutation with its ledger update so the two
/// either both happen or the first one is undone.
pub struct FileService {
    objects: Arc<dyn ObjectStore>,
    ledger: Arc<dyn QuotaLedger>,
    signer: Arc<UrlSigner>,
    list_limit: usize,
}

impl FileService {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        ledger: Arc<dyn QuotaLedger>,
        signer: Arc<UrlSigner>,
        list_limit: usize,
    ) -> Self {
        Self {
            objects,
            ledger,
            signer,
            list_limit,
        }
    }

    fn present(&self, meta: ObjectMetadata) -> Result<StoredObject> {
        let url = self.signer.sign(&meta.path)?;
        Ok(StoredObject::from_metadata(meta, url))
    }

    pub async fn upload(
        &self,
        user_id: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<(StoredObject, StorageAccount)> {
        validate_file_name(file_name)?;
        if data.is_empty() {
            return Err(AppError::Validation(format!("File {} is empty", file_name)));
        }

        // Fail before writing bytes for users that were never provisioned.
        self.ledger.get_account(user_id).await?;

        let path = object_path(user_id, file_name);
        self.objects.upload(&path, data).await?;

        let account = match self.ledger.apply_delta(user_id, data.len() as i64).await {
            Ok(account) => account,
            Err(e) => {
                tracing::error!(user_id, path = %path, "Ledger update failed after upload, removing object: {}", e);
                if let Err(cleanup) = self.objects.remove(&path).await {
                    tracing::error!(path = %path, "Failed to remove orphaned object: {}", cleanup);
                }
                return Err(e);
            }
        };

        let meta = self.objects.stat(&path).await?;
        tracing::info!(user_id, path = %path, size = meta.size, "Uploaded object");

        Ok((self.present(meta)?, account))
    }

    /// Stores every file of one request. When a file fails, the ones already
    /// stored by this call are deleted again so the request has no partial effect.
    pub async fn upload_all<D: AsRef<[u8]> + Sync>(
        &self,
        user_id: &str,
        files: &[(String, D)],
    ) -> Result<(Vec<StoredObject>, StorageAccount)> {
        let mut uploaded: Vec<StoredObject> = Vec::with_capacity(files.len());
        let mut account = None;

        for (file_name, data) in files {
            match self.upload(user_id, file_name, data.as_ref()).await {
                Ok((object, updated)) => {
                    uploaded.push(object);
                    account = Some(updated);
                }
                Err(e) => {
                    for object in &uploaded {
                        if let Err(undo) = self.delete(user_id, &object.name).await {
                            tracing::error!(user_id, path = %object.path, "Failed to undo batch upload: {}", undo);
                        }
                    }
                    return Err(e);
                }
            }
        }

        let account = account.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
        Ok((uploaded, account))
    }

    /// Records one object entering (`direction = 1`) or leaving (`-1`) the
    /// store. Zero-byte objects only move the file count.
    async fn record_object(&self, user_id: &str, size: i64, direction: i64) -> Result<StorageAccount> {
        if size > 0 {
            self.ledger.apply_delta(user_id, size * direction).await
        } else {
            self.ledger.adjust_file_count(user_id, direction).await
        }
    }

    pub async fn delete(&self, user_id: &str, file_name: &str) -> Result<StorageAccount> {
        validate_file_name(file_name)?;
        let path = object_path(user_id, file_name);
        let meta = self.objects.stat(&path).await?;

        let account = self.record_object(user_id, meta.size, -1).await?;

        if let Err(e) = self.objects.remove(&path).await {
            tracing::error!(user_id, path = %path, "Object removal failed, restoring ledger: {}", e);
            if let Err(restore) = self.record_object(user_id, meta.size, 1).await {
                tracing::error!(user_id, "Failed to restore ledger after failed delete: {}", restore);
            }
            return Err(e);
        }

        tracing::info!(user_id, path = %path, size = meta.size, "Deleted object");

        Ok(account)
    }

    /// Renames an object in place. Size is unchanged so the ledger is not touched.
    pub async fn rename(
        &self,
        user_id: &str,
        file_name: &str,
        new_name: &str,
    ) -> Result<StoredObject> {
        validate_file_name(file_name)?;
        validate_file_name(new_name)?;

        let from = object_path(user_id, file_name);
        let to = object_path(user_id, new_name);
        if from == to {
            return self.present(self.objects.stat(&from).await?);
        }

        self.objects.move_object(&from, &to).await?;
        tracing::info!(user_id, from = %from, to = %to, "Renamed object");

        self.present(self.objects.stat(&to).await?)
    }

    /// Lists the caller's folder, capped at the configured fetch limit.
    pub async fn list(&self, user_id: &str) -> Result<Vec<StoredObject>> {
        self.list_up_to(user_id, self.list_limit).await
    }

    pub async fn list_all(&self, user_id: &str) -> Result<Vec<StoredObject>> {
        self.list_up_to(user_id, usize::MAX).await
    }

    async fn list_up_to(&self, user_id: &str, limit: usize) -> Result<Vec<StoredObject>> {
        self.objects
            .list(user_id, limit)
            .await?
            .into_iter()
            .map(|meta| self.present(meta))
            .collect()
    }

    pub async fn signed_url(&self, user_id: &str, file_name: &str) -> Result<String> {
        validate_file_name(file_name)?;
        let meta = self.objects.stat(&object_path(user_id, file_name)).await?;
        self.signer.sign(&meta.path)
    }

    /// Recomputes the ledger from the authoritative object listing.
    pub async fn reconcile(&self, user_id: &str) -> Result<StorageAccount> {
        let objects = self.objects.list(user_id, usize::MAX).await?;
        let used: i64 = objects.iter().map(|o| o.size).sum();
        let count = objects.len() as i64;

        let before = self.ledger.get_account(user_id).await?;
        let after = self.ledger.reconcile(user_id, used, count).await?;

        if before != after {
            tracing::warn!(
                user_id,
                ledger_bytes = before.used_storage,
                actual_bytes = after.used_storage,
                ledger_files = before.total_files,
                actual_files = after.total_files,
                "Corrected storage ledger drift"
            );
        }

        Ok(after)
    }
}
