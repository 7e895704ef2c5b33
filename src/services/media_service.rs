use std::borrow::Cow;

use actix_multipart::Field;
use futures::TryStreamExt;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};

use crate::config::AppConfig;
use crate::error::ApiError;

const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Largest single upload accepted; covers short reels.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug)]
pub enum MediaUploadError {
    NotConfigured,
    InvalidUpload(String),
    GcsError(String),
}

impl std::fmt::Display for MediaUploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaUploadError::NotConfigured => write!(f, "MEDIA_BUCKET is not configured"),
            MediaUploadError::InvalidUpload(err) => write!(f, "Invalid upload: {}", err),
            MediaUploadError::GcsError(err) => write!(f, "GCS error: {}", err),
        }
    }
}

impl std::error::Error for MediaUploadError {}

impl From<MediaUploadError> for ApiError {
    fn from(err: MediaUploadError) -> Self {
        match err {
            MediaUploadError::NotConfigured => ApiError::NotConfigured("Media storage"),
            MediaUploadError::InvalidUpload(msg) => ApiError::BadRequest(msg),
            MediaUploadError::GcsError(msg) => ApiError::Storage(msg),
        }
    }
}

/// Object storage for user media: post photos and videos, route images and
/// profile pictures.
#[derive(Clone)]
pub struct MediaService {
    client: Option<Client>,
    bucket: String,
}

impl MediaService {
    pub async fn from_config(config: &AppConfig) -> Self {
        let Some(bucket) = config.media_bucket.clone() else {
            log::warn!("MEDIA_BUCKET not set; uploads are disabled");
            return Self::disabled();
        };

        match ClientConfig::default().with_auth().await {
            Ok(gcs_config) => Self {
                client: Some(Client::new(gcs_config)),
                bucket,
            },
            Err(e) => {
                log::error!("Failed to create GCS client: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: None,
            bucket: String::new(),
        }
    }

    fn client(&self) -> Result<&Client, MediaUploadError> {
        self.client.as_ref().ok_or(MediaUploadError::NotConfigured)
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn public_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", PUBLIC_HOST, self.bucket, object_name)
    }

    pub async fn upload(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, MediaUploadError> {
        let client = self.client()?;
        if bytes.is_empty() {
            return Err(MediaUploadError::InvalidUpload("File is empty".to_string()));
        }

        let mut media = Media::new(object_name.to_string());
        media.content_type = Cow::Owned(content_type.to_string());
        let upload_type = UploadType::Simple(media);
        let upload_request = UploadObjectRequest {
            bucket: self.bucket.clone(),
            ..Default::default()
        };

        let size = bytes.len();
        client
            .upload_object(&upload_request, bytes, &upload_type)
            .await
            .map_err(|e| MediaUploadError::GcsError(format!("Failed to upload to GCS: {}", e)))?;

        log::info!("Uploaded {} ({} bytes)", object_name, size);
        Ok(self.public_url(object_name))
    }

    /// Deletes the object behind a public URL this service produced. URLs
    /// from elsewhere are ignored.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), MediaUploadError> {
        let client = self.client()?;
        let Some(object) = object_name_from_url(&self.bucket, url) else {
            log::debug!("Not a media URL of this bucket: {}", url);
            return Ok(());
        };

        client
            .delete_object(&DeleteObjectRequest {
                bucket: self.bucket.clone(),
                object: object.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| MediaUploadError::GcsError(format!("Failed to delete {}: {}", object, e)))
    }
}

pub fn object_name_from_url<'a>(bucket: &str, url: &'a str) -> Option<&'a str> {
    let prefix = format!("{}/{}/", PUBLIC_HOST, bucket);
    url.strip_prefix(&prefix).filter(|name| !name.is_empty())
}

/// Last path segment with anything outside `[A-Za-z0-9._-]` replaced.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

pub fn post_object_path(user_id: &str, millis: i64, filename: &str) -> String {
    format!("posts/{}/{}_{}", user_id, millis, sanitize_filename(filename))
}

pub fn route_object_path(route_id: &str, millis: i64, filename: &str) -> String {
    format!("routes/{}/{}_{}", route_id, millis, sanitize_filename(filename))
}

pub fn profile_object_path(user_id: &str) -> String {
    format!("users/{}/profile.jpg", user_id)
}

/// Percent of a declared upload length, clamped to 100.
pub fn progress_percent(received: u64, declared: u64) -> f64 {
    if declared == 0 {
        return 100.0;
    }
    ((received as f64 / declared as f64) * 100.0).min(100.0)
}

/// One uploaded file read fully into memory.
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn append_chunk(bytes: &mut Vec<u8>, chunk: &[u8], limit: usize) -> Result<(), MediaUploadError> {
    if bytes.len() + chunk.len() > limit {
        return Err(MediaUploadError::InvalidUpload("File too large".to_string()));
    }
    bytes.extend_from_slice(chunk);
    Ok(())
}

/// Drains a multipart field, reporting progress against the request's
/// declared Content-Length. Stops reading once `MAX_UPLOAD_BYTES` is passed.
pub async fn read_field<F: FnMut(f64)>(
    field: &mut Field,
    declared_len: Option<u64>,
    mut on_progress: F,
) -> Result<UploadedFile, MediaUploadError> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string)
        .unwrap_or_else(|| "upload".to_string());
    let content_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| MediaUploadError::InvalidUpload(e.to_string()))?
    {
        append_chunk(&mut bytes, &chunk, MAX_UPLOAD_BYTES)?;
        if let Some(declared) = declared_len {
            on_progress(progress_percent(bytes.len() as u64, declared));
        }
    }
    on_progress(100.0);

    Ok(UploadedFile {
        filename,
        content_type,
        bytes,
    })
}

/// Progress callback that logs every 25% step once.
pub fn logging_progress(label: String) -> impl FnMut(f64) {
    let mut next_mark = 25.0;
    move |percent| {
        while percent >= next_mark && next_mark <= 100.0 {
            log::info!("Upload {}: {:.0}% done", label, next_mark);
            next_mark += 25.0;
        }
    }
}
