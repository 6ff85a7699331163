//! Workspace settings for the CourseDesk admin.
//! CourseDesk 管理後台的工作區設定。

pub mod admin;

pub use admin::{
    AdminSettings, ListingSettings, SettingsError, SettingsStore, UploadSettings, SETTINGS_DIR,
    SETTINGS_FILE,
};
