use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use coursedesk_catalog::{MediaPolicy, VIDEO_MIME_PREFIX};

const SETTINGS_VERSION: u32 = 1;
const DEFAULT_MAX_UPLOAD_MIB: u64 = 500;
const DEFAULT_TAG_PREVIEW: usize = 2;
const MAX_TAG_PREVIEW: usize = 10;
const MIB: u64 = 1024 * 1024;

/// 工作區內設定檔的位置。 / Where the settings live inside a workspace.
pub const SETTINGS_DIR: &str = ".coursedesk";
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize settings {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to replace settings {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 管理後台設定。 / Admin settings for one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub uploads: UploadSettings,
    #[serde(default)]
    pub listing: ListingSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            uploads: UploadSettings::default(),
            listing: ListingSettings::default(),
        }
    }
}

impl AdminSettings {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = SETTINGS_VERSION;
        }
        self.uploads.sanitize();
        self.listing.sanitize();
    }
}

/// 影片上傳限制。 / Limits applied to chapter video uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_upload_mib")]
    pub max_upload_mib: u64,
    #[serde(default = "default_mime_prefix")]
    pub accepted_mime_prefix: String,
}

fn default_max_upload_mib() -> u64 {
    DEFAULT_MAX_UPLOAD_MIB
}

fn default_mime_prefix() -> String {
    VIDEO_MIME_PREFIX.to_string()
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_upload_mib: default_max_upload_mib(),
            accepted_mime_prefix: default_mime_prefix(),
        }
    }
}

impl UploadSettings {
    fn sanitize(&mut self) {
        if self.max_upload_mib == 0 {
            self.max_upload_mib = default_max_upload_mib();
        }
        let prefix = self.accepted_mime_prefix.trim().to_ascii_lowercase();
        self.accepted_mime_prefix = if prefix.is_empty() {
            default_mime_prefix()
        } else {
            prefix
        };
    }

    /// The policy chapter uploads are checked against.
    pub fn media_policy(&self) -> MediaPolicy {
        MediaPolicy {
            mime_prefix: self.accepted_mime_prefix.clone(),
            max_bytes: self.max_upload_mib.saturating_mul(MIB),
        }
    }
}

/// 列表顯示設定。 / How listings are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSettings {
    /// Tags shown per chapter row before collapsing into "+N".
    #[serde(default = "default_tag_preview")]
    pub tag_preview: usize,
}

fn default_tag_preview() -> usize {
    DEFAULT_TAG_PREVIEW
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            tag_preview: default_tag_preview(),
        }
    }
}

impl ListingSettings {
    fn sanitize(&mut self) {
        self.tag_preview = self.tag_preview.clamp(1, MAX_TAG_PREVIEW);
    }

    /// 以 `"css, layout +2"` 形式摘要標籤。 / Renders tags as `"css, layout +2"`.
    pub fn preview_tags<'a>(&self, tags: impl IntoIterator<Item = &'a String>) -> String {
        let tags: Vec<&str> = tags.into_iter().map(String::as_str).collect();
        let shown = tags.len().min(self.tag_preview);
        let mut line = tags[..shown].join(", ");
        if tags.len() > shown {
            line.push_str(&format!(" +{}", tags.len() - shown));
        }
        line
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    data: AdminSettings,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>, settings: AdminSettings) -> Self {
        let mut data = settings;
        data.sanitize();
        Self {
            path: path.into(),
            data,
        }
    }

    /// 設定檔路徑：`<workspace>/.coursedesk/settings.json`。
    /// Settings path for a workspace root.
    pub fn workspace_path(root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(SETTINGS_DIR).join(SETTINGS_FILE)
    }

    pub fn open_workspace(root: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Self::load(Self::workspace_path(root))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "settings file missing, using defaults");
            return Ok(Self::new(path, AdminSettings::default()));
        }

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: AdminSettings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &AdminSettings {
        &self.data
    }

    pub fn update<F>(&mut self, op: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut AdminSettings),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    /// Writes `settings.tmp` next to the file and renames it into place.
    /// A failed rename removes the temporary file and leaves the old settings.
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut payload =
            serde_json::to_string_pretty(&self.data).map_err(|source| SettingsError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        payload.push('\n');

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| SettingsError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp_path, &self.path) {
            if let Err(err) = fs::remove_file(&tmp_path) {
                warn!(path = %tmp_path.display(), error = %err, "could not remove temporary settings");
            }
            return Err(SettingsError::Replace {
                path: self.path.clone(),
                source,
            });
        }
        debug!(
            path = %self.path.display(),
            max_upload_mib = self.data.uploads.max_upload_mib,
            "saved settings"
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_restores_defaults_for_blank_values() {
        let mut settings = AdminSettings {
            version: 0,
            uploads: UploadSettings {
                max_upload_mib: 0,
                accepted_mime_prefix: "  ".into(),
            },
            listing: ListingSettings { tag_preview: 0 },
        };
        settings.sanitize();
        assert_eq!(settings, AdminSettings {
            listing: ListingSettings { tag_preview: 1 },
            ..AdminSettings::default()
        });
    }

    #[test]
    fn tag_preview_is_capped() {
        let mut listing = ListingSettings { tag_preview: 64 };
        listing.sanitize();
        assert_eq!(listing.tag_preview, MAX_TAG_PREVIEW);
    }

    #[test]
    fn preview_collapses_extra_tags() {
        let tags: Vec<String> = ["css", "flexbox", "layout", "advanced"]
            .into_iter()
            .map(String::from)
            .collect();
        let listing = ListingSettings::default();
        assert_eq!(listing.preview_tags(&tags), "css, flexbox +2");
        assert_eq!(listing.preview_tags(&tags[..1]), "css");
        assert_eq!(listing.preview_tags(&Vec::<String>::new()), "");
    }

    #[test]
    fn media_policy_uses_mebibytes() {
        let uploads = UploadSettings {
            max_upload_mib: 2,
            accepted_mime_prefix: "video/".into(),
        };
        let policy = uploads.media_policy();
        assert_eq!(policy.max_bytes, 2 * MIB);
        assert_eq!(UploadSettings::default().media_policy(), MediaPolicy::default());
    }
}
