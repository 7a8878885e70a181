//! Filesystem-backed `AttachmentStore`.
//!
//! Files land in a single directory opened through `cap_std`, so storage
//! keys can never escape it. Keys are `<uuid>-<sanitised name>`.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{AttachmentStore, AttachmentStoreError};
use crate::domain::{AttachmentUpload, EventAttachment};

const MAX_NAME_LEN: usize = 100;
const FALLBACK_NAME: &str = "attachment";

/// Stores attachments as plain files in one directory.
#[derive(Clone)]
pub struct FsAttachmentStore {
    dir: Arc<Dir>,
    max_bytes: u64,
}

impl FsAttachmentStore {
    /// Open (creating when missing) `root` as the attachment directory.
    pub fn open(root: &Path, max_bytes: u64) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            dir: Arc::new(dir),
            max_bytes,
        })
    }
}

/// Reduce a client-supplied file name to a safe single path component.
fn sanitise_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    let truncated: String = trimmed.chars().take(MAX_NAME_LEN).collect();
    if truncated.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        truncated
    }
}

fn is_single_component(key: &str) -> bool {
    !key.is_empty() && !key.starts_with('.') && !key.contains(['/', '\\'])
}

fn io_error(error: impl ToString) -> AttachmentStoreError {
    AttachmentStoreError::io(error.to_string())
}

#[async_trait]
impl AttachmentStore for FsAttachmentStore {
    async fn store(
        &self,
        upload: &AttachmentUpload,
    ) -> Result<EventAttachment, AttachmentStoreError> {
        let size_bytes = upload.data.len() as u64;
        if size_bytes > self.max_bytes {
            return Err(AttachmentStoreError::too_large(self.max_bytes));
        }

        let storage_key = format!("{}-{}", Uuid::new_v4(), sanitise_file_name(&upload.file_name));
        let dir = Arc::clone(&self.dir);
        let key = storage_key.clone();
        let data = upload.data.clone();
        tokio::task::spawn_blocking(move || dir.write(&key, data))
            .await
            .map_err(io_error)?
            .map_err(io_error)?;
        debug!(%storage_key, size_bytes, "stored attachment");

        Ok(EventAttachment {
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size_bytes,
            storage_key,
        })
    }

    async fn remove(&self, storage_key: &str) -> Result<(), AttachmentStoreError> {
        if !is_single_component(storage_key) {
            return Err(AttachmentStoreError::io(format!(
                "invalid storage key: {storage_key}"
            )));
        }
        let dir = Arc::clone(&self.dir);
        let key = storage_key.to_owned();
        let result = tokio::task::spawn_blocking(move || dir.remove_file(&key))
            .await
            .map_err(io_error)?;
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err)),
        }
    }
}
