//! Attachment metadata index.
//!
//! The host's media library keeps, per attachment, the stored file
//! reference, the native URL it would serve, the mime type, and the
//! original dimensions. This module is the crate's stand-in for that store:
//! a JSON file (`attachments.json`) in the state directory mapping ids to
//! [`Attachment`] records.
//!
//! [`identify`] fills in mime type and dimensions for a local file so new
//! attachments can be registered without trusting caller-supplied sizes.

use crate::media::Downsize;
use crate::planner::Dimensions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the index file within the state directory.
const INDEX_FILENAME: &str = "attachments.json";

/// Mime types the image service can serve.
pub const SERVABLE_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to identify image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Unrecognized image format: {0}")]
    UnknownFormat(PathBuf),
    #[error("Attachment {0} not found")]
    NotFound(u64),
}

/// One media-library attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    /// Stored file reference, e.g. `gs://bucket/2024/05/dawn.jpg`.
    pub file: String,
    /// URL the host serves the original from.
    pub url: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl Attachment {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Whether the image service can serve this attachment.
    pub fn is_servable(&self) -> bool {
        SERVABLE_MIME_TYPES.contains(&self.mime_type.as_str())
    }

    /// What the host itself would return for this attachment: the original.
    pub fn native_downsize(&self) -> Downsize {
        Downsize {
            url: self.url.clone(),
            width: self.width,
            height: self.height,
            intermediate: false,
        }
    }
}

/// On-disk index of attachments keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentIndex {
    pub attachments: BTreeMap<u64, Attachment>,
}

impl AttachmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the state directory. A missing file is an empty index; a
    /// corrupt one is an error, since silently dropping attachments would
    /// lose data on the next save.
    pub fn load(state_dir: &Path) -> Result<Self, AttachmentError> {
        let path = state_dir.join(INDEX_FILENAME);
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, state_dir: &Path) -> Result<(), AttachmentError> {
        std::fs::create_dir_all(state_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(state_dir.join(INDEX_FILENAME), json)?;
        Ok(())
    }

    pub fn get(&self, id: u64) -> Result<&Attachment, AttachmentError> {
        self.attachments.get(&id).ok_or(AttachmentError::NotFound(id))
    }

    /// Insert or replace an attachment, returning the previous record.
    pub fn insert(&mut self, attachment: Attachment) -> Option<Attachment> {
        self.attachments.insert(attachment.id, attachment)
    }

    pub fn remove(&mut self, id: u64) -> Option<Attachment> {
        self.attachments.remove(&id)
    }

    /// Next free id (one past the highest in use).
    pub fn next_id(&self) -> u64 {
        self.attachments.keys().next_back().map_or(1, |id| id + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.values()
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

/// Read a local image's mime type and dimensions from its header.
pub fn identify(path: &Path) -> Result<(String, Dimensions), AttachmentError> {
    let image_err = |source| AttachmentError::Image {
        path: path.to_path_buf(),
        source,
    };

    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| AttachmentError::UnknownFormat(path.to_path_buf()))?;
    let (width, height) = reader.into_dimensions().map_err(image_err)?;

    Ok((
        format.to_mime_type().to_string(),
        Dimensions::new(width, height),
    ))
}
