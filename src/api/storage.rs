//! Media upload.

use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::media::MediaKind;

use super::{ApiError, HttpApi};

const UPLOAD_PATH: &str = "/api/storage/upload";

/// A file to upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime_type)
    }
}

impl HttpApi {
    /// Upload a file and return its public URL.
    pub async fn upload(&self, upload: &Upload) -> Result<String, ApiError> {
        let kind = upload.kind();
        let data = self
            .dispatch(Method::POST, UPLOAD_PATH, &[], |builder| {
                let part = Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.mime_type)
                    .map_err(|e| {
                        ApiError::InvalidRequest(format!(
                            "Bad MIME type '{}': {}",
                            upload.mime_type, e
                        ))
                    })?;
                let form = Form::new()
                    .part("file", part)
                    .text("type", kind.as_str());
                Ok(builder.multipart(form))
            })
            .await?;

        match data {
            Some(serde_json::Value::String(url)) if !url.is_empty() => Ok(url),
            _ => Err(ApiError::MissingData {
                path: UPLOAD_PATH.to_string(),
            }),
        }
    }
}
