//! Port for storing files uploaded with events.
use async_trait::async_trait;

use crate::domain::{AttachmentUpload, EventAttachment};

use super::define_port_error;

define_port_error! {
    /// Errors raised by attachment storage adapters.
    pub enum AttachmentStoreError {
        /// The backing store could not be written or read.
        Io { message: String } => "attachment storage failed: {message}",
        /// The upload exceeds the configured size limit.
        TooLarge { limit: u64 } => "attachment exceeds {limit} bytes",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Persist the upload and describe where it went.
    async fn store(&self, upload: &AttachmentUpload)
    -> Result<EventAttachment, AttachmentStoreError>;

    /// Remove a previously stored attachment. Missing keys are not an error.
    async fn remove(&self, storage_key: &str) -> Result<(), AttachmentStoreError>;
}

/// Store that keeps nothing and reports every upload as stored.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAttachmentStore;

#[async_trait]
impl AttachmentStore for FixtureAttachmentStore {
    async fn store(
        &self,
        upload: &AttachmentUpload,
    ) -> Result<EventAttachment, AttachmentStoreError> {
        Ok(EventAttachment {
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size_bytes: upload.data.len() as u64,
            storage_key: format!("fixture/{}", upload.file_name),
        })
    }

    async fn remove(&self, _storage_key: &str) -> Result<(), AttachmentStoreError> {
        Ok(())
    }
}
