//! Multipart form reader for event creation.
//!
//! The form carries a `data` text part holding the JSON payload and an
//! optional `file` part holding the attachment.

use actix_multipart::{Field, Multipart, MultipartError};
use futures_util::StreamExt;
use serde_json::json;

use crate::domain::{AttachmentUpload, Error};

/// Default attachment size limit when none is configured.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const MAX_DATA_BYTES: usize = 64 * 1024;

const DATA_PART: &str = "data";
const FILE_PART: &str = "file";

/// Upload size limit shared with handlers through `app_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimit(pub usize);

impl Default for UploadLimit {
    fn default() -> Self {
        Self(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Parts extracted from an event creation form.
#[derive(Debug)]
pub struct EventForm {
    pub data: String,
    pub file: Option<AttachmentUpload>,
}

fn malformed(err: &MultipartError) -> Error {
    Error::invalid_request(format!("invalid multipart body: {err}"))
}

fn part_too_large(part: &str, limit: usize) -> Error {
    Error::invalid_request(format!("{part} part exceeds {limit} bytes"))
        .with_details(json!({ "field": part, "code": "too_large" }))
}

async fn read_part(field: &mut Field, part: &str, limit: usize) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|err| malformed(&err))?;
        if buf.len() + chunk.len() > limit {
            return Err(part_too_large(part, limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Drain the multipart stream into an [`EventForm`].
///
/// Unknown parts are rejected so clients notice misspelt field names.
pub async fn read_event_form(mut payload: Multipart, limit: UploadLimit) -> Result<EventForm, Error> {
    let mut data = None;
    let mut file = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|err| malformed(&err))?;
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            DATA_PART => {
                let bytes = read_part(&mut field, DATA_PART, MAX_DATA_BYTES).await?;
                let text = String::from_utf8(bytes).map_err(|_| {
                    Error::invalid_request("data part must be UTF-8")
                        .with_details(json!({ "field": DATA_PART, "code": "invalid_encoding" }))
                })?;
                data = Some(text);
            }
            FILE_PART => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("attachment")
                    .to_owned();
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = read_part(&mut field, FILE_PART, limit.0).await?;
                if !bytes.is_empty() {
                    file = Some(AttachmentUpload {
                        file_name,
                        content_type,
                        data: bytes,
                    });
                }
            }
            other => {
                return Err(Error::invalid_request(format!(
                    "unexpected multipart part: {other}"
                ))
                .with_details(json!({ "field": other, "code": "unexpected_part" })));
            }
        }
    }

    let data = data.ok_or_else(|| {
        Error::invalid_request("missing required field: data")
            .with_details(json!({ "field": DATA_PART, "code": "missing_field" }))
    })?;
    Ok(EventForm { data, file })
}
