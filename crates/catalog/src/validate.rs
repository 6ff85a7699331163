//! Submit gating for the creation forms.
//!
//! Rules run in a fixed order and the first failure is reported; messages are
//! phrased for the person filling in the form.

use thiserror::Error;

use crate::aggregate::format_file_size;
use crate::duration::DurationError;
use crate::model::{BundleDraft, ChapterDraft, CourseDraft, EntityKind, VideoAsset};

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;
pub const VIDEO_MIME_PREFIX: &str = "video/";

/// A draft that cannot be submitted yet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a {0} title")]
    MissingTitle(EntityKind),
    #[error("Please select a course")]
    MissingCourse,
    #[error("Please select a module")]
    MissingModule,
    #[error("Please upload a video file")]
    MissingVideo,
    #[error("Please select a valid video file")]
    UnsupportedMediaType { mime_type: String },
    #[error("File size must be less than {}", format_file_size(*.limit))]
    FileTooLarge { size: u64, limit: u64 },
    #[error("Please enter a chapter duration")]
    MissingDuration,
    #[error("Please enter a valid duration ({0})")]
    InvalidDuration(#[from] DurationError),
}

/// Accepted media for chapter uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPolicy {
    pub mime_prefix: String,
    pub max_bytes: u64,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            mime_prefix: VIDEO_MIME_PREFIX.to_string(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl MediaPolicy {
    /// Type is checked before size.
    pub fn check(&self, asset: &VideoAsset) -> Result<(), ValidationError> {
        if !asset
            .mime_type
            .to_ascii_lowercase()
            .starts_with(&self.mime_prefix.to_ascii_lowercase())
        {
            return Err(ValidationError::UnsupportedMediaType {
                mime_type: asset.mime_type.clone(),
            });
        }
        if asset.size_bytes > self.max_bytes {
            return Err(ValidationError::FileTooLarge {
                size: asset.size_bytes,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

pub fn require_title(kind: EntityKind, title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        Err(ValidationError::MissingTitle(kind))
    } else {
        Ok(())
    }
}

/// Validates drafts before they reach the content service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftValidator {
    policy: MediaPolicy,
}

impl DraftValidator {
    pub fn new(policy: MediaPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MediaPolicy {
        &self.policy
    }

    pub fn bundle(&self, draft: &BundleDraft) -> Result<(), ValidationError> {
        require_title(EntityKind::Bundle, &draft.title)
    }

    pub fn course(&self, draft: &CourseDraft) -> Result<(), ValidationError> {
        require_title(EntityKind::Course, &draft.title)
    }

    pub fn media(&self, asset: &VideoAsset) -> Result<(), ValidationError> {
        self.policy.check(asset)
    }

    /// Title, then course, module and video presence, then the media policy.
    pub fn chapter(
        &self,
        draft: &ChapterDraft,
        video: Option<&VideoAsset>,
    ) -> Result<(), ValidationError> {
        require_title(EntityKind::Chapter, &draft.title)?;
        if draft.course.is_none() {
            return Err(ValidationError::MissingCourse);
        }
        if draft.module.is_none() {
            return Err(ValidationError::MissingModule);
        }
        let video = video.ok_or(ValidationError::MissingVideo)?;
        self.policy.check(video)
    }
}
