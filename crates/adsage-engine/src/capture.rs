use std::fs;
use std::path::{Path, PathBuf};

use adsage_contracts::analysis::{Audience, Platform, PostInput, PreInput};
use adsage_contracts::session::{SessionContext, SessionStore, StoreError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;
use thiserror::Error;

use crate::image_fingerprint;
use crate::presenter::{Cue, View};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("enter a post URL to analyze")]
    MissingUrl,
    #[error("Please upload an image first.")]
    MissingImage,
    #[error("enter caption text for the creative")]
    MissingText,
    #[error("Please upload an image file. ({path} is {declared})")]
    NotAnImage { path: PathBuf, declared: String },
    #[error("could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Field names used for shake cues.
pub const URL_FIELD: &str = "url";
pub const TEXT_FIELD: &str = "text";

impl CaptureError {
    /// How the refusal is surfaced: a blocking alert or a shake on the field.
    pub fn cue(&self) -> Cue {
        match self {
            Self::MissingUrl => Cue::Shake(URL_FIELD),
            Self::MissingText => Cue::Shake(TEXT_FIELD),
            other => Cue::Alert(other.to_string()),
        }
    }
}

pub fn capture_post(raw_url: &str) -> Result<PostInput, CaptureError> {
    let url = raw_url.trim();
    if url.is_empty() {
        return Err(CaptureError::MissingUrl);
    }
    Ok(PostInput {
        url: url.to_string(),
    })
}

/// An accepted image, already encoded as a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub data_uri: String,
}

impl ImageUpload {
    /// Accepts exactly one file whose declared type is `image/*`.
    ///
    /// The declared type comes from the extension, as a browser would
    /// report it, so content is not sniffed.
    pub fn from_path(path: &Path) -> Result<Self, CaptureError> {
        let mime = declared_mime(path);
        if !mime.starts_with("image/") {
            return Err(CaptureError::NotAnImage {
                path: path.to_path_buf(),
                declared: mime,
            });
        }
        let bytes = fs::read(path).map_err(|source| CaptureError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let data_uri = format!("data:{mime};base64,{}", BASE64.encode(&bytes));
        let upload = Self {
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
            mime,
            data_uri,
        };
        log::info!(
            "accepted image {} ({} bytes, sha256 {})",
            upload.file_name,
            bytes.len(),
            image_fingerprint(&upload.data_uri)
        );
        Ok(upload)
    }
}

fn declared_mime(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

/// Validates the upload form. The image is checked before the caption.
pub fn capture_pre(
    upload: Option<&ImageUpload>,
    text: &str,
    platform: Platform,
    target: Audience,
) -> Result<PreInput, CaptureError> {
    let Some(upload) = upload else {
        return Err(CaptureError::MissingImage);
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(CaptureError::MissingText);
    }
    Ok(PreInput {
        image: upload.data_uri.clone(),
        text: text.to_string(),
        platform: platform.as_str().to_string(),
        target: target.as_str().to_string(),
    })
}

/// Controller for the capture view: validates, persists, then hands off.
pub struct CaptureController {
    store: SessionStore,
}

impl CaptureController {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    pub fn submit_post(&self, raw_url: &str) -> Result<(View, SessionContext), CaptureError> {
        let input = capture_post(raw_url)?;
        self.persist(SessionContext::post(input))
    }

    pub fn submit_pre(
        &self,
        upload: Option<&ImageUpload>,
        text: &str,
        platform: Platform,
        target: Audience,
    ) -> Result<(View, SessionContext), CaptureError> {
        let input = capture_pre(upload, text, platform, target)?;
        self.persist(SessionContext::pre(input))
    }

    fn persist(&self, context: SessionContext) -> Result<(View, SessionContext), CaptureError> {
        self.store.save(&context)?;
        log::info!(
            "captured {} input for session {}",
            context.mode,
            context.session_id
        );
        Ok((View::Dashboard, context))
    }
}
