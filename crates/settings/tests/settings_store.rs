use coursedesk_catalog::{ContentDuration, DraftValidator, InMemoryCatalog, VideoAsset};
use coursedesk_catalog::{ChapterDraft, ContentService, CourseId, ModuleId, ValidationError};
use coursedesk_settings::{AdminSettings, SettingsError, SettingsStore};
use std::fs;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let store = SettingsStore::open_workspace(temp.path()).expect("load defaults");

    assert_eq!(store.settings(), &AdminSettings::default());
    assert_eq!(store.settings().uploads.max_upload_mib, 500);
    assert_eq!(store.settings().uploads.accepted_mime_prefix, "video/");
    assert_eq!(store.settings().listing.tag_preview, 2);
    assert!(store.path().ends_with(".coursedesk/settings.json"));
    assert!(!store.path().exists());
}

#[test]
fn update_persists_and_reloads() {
    let temp = tempdir().expect("tempdir");
    let mut store = SettingsStore::open_workspace(temp.path()).expect("load");
    store
        .update(|settings| {
            settings.uploads.max_upload_mib = 64;
            settings.listing.tag_preview = 4;
        })
        .expect("save");

    let reloaded = SettingsStore::open_workspace(temp.path()).expect("reload");
    assert_eq!(reloaded.settings().uploads.max_upload_mib, 64);
    assert_eq!(reloaded.settings().listing.tag_preview, 4);
    assert!(!store.path().with_extension("tmp").exists());
}

#[test]
fn out_of_range_values_are_sanitized_on_load() {
    let temp = tempdir().expect("tempdir");
    let path = SettingsStore::workspace_path(temp.path());
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(
        &path,
        r#"{ "uploads": { "max_upload_mib": 0, "accepted_mime_prefix": " " }, "listing": { "tag_preview": 99 } }"#,
    )
    .expect("write");

    let store = SettingsStore::load(&path).expect("load");
    assert_eq!(store.settings().version, 1);
    assert_eq!(store.settings().uploads.max_upload_mib, 500);
    assert_eq!(store.settings().uploads.accepted_mime_prefix, "video/");
    assert_eq!(store.settings().listing.tag_preview, 10);
}

#[test]
fn corrupt_file_reports_path() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("settings.json");
    fs::write(&path, "{ not json").expect("write");

    let err = SettingsStore::load(&path).expect_err("should fail");
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("settings.json"));
}

#[test]
fn configured_limit_gates_uploads() {
    let temp = tempdir().expect("tempdir");
    let mut store = SettingsStore::open_workspace(temp.path()).expect("load");
    store
        .update(|settings| settings.uploads.max_upload_mib = 1)
        .expect("save");

    let validator = DraftValidator::new(store.settings().uploads.media_policy());
    let mut catalog = InMemoryCatalog::demo(validator).expect("demo");
    let mut draft = ChapterDraft::new("Grid", ContentDuration::from_minutes(40));
    draft.course = Some(CourseId::new(1));
    draft.module = Some(ModuleId::new(2));

    let video = VideoAsset::new("grid.mp4", "video/mp4", 2 * 1024 * 1024);
    let err = catalog.create_chapter(draft, video).expect_err("too large");
    assert_eq!(err.to_string(), "File size must be less than 1 MB");
    assert!(matches!(
        err,
        coursedesk_catalog::CatalogError::Validation(ValidationError::FileTooLarge { .. })
    ));
}

#[test]
fn failed_replace_keeps_no_temporary_file() {
    let temp = tempdir().expect("tempdir");
    let path = SettingsStore::workspace_path(temp.path());
    fs::create_dir_all(path.join("occupied")).expect("block the settings path");

    let store = SettingsStore::new(path.clone(), AdminSettings::default());
    let err = store.save().expect_err("rename onto a directory");
    assert!(matches!(err, SettingsError::Replace { .. }));
    assert!(!path.with_extension("tmp").exists());
    assert!(path.join("occupied").is_dir());
}

#[test]
fn saved_file_ends_with_newline() {
    let temp = tempdir().expect("tempdir");
    let store = SettingsStore::open_workspace(temp.path()).expect("load");
    store.save().expect("save");
    let saved = fs::read_to_string(store.path()).expect("read back");
    assert!(saved.ends_with("}\n"));
}
