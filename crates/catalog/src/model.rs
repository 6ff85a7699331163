use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::duration::ContentDuration;
use crate::ids::{BundleId, ChapterId, CourseId, ModuleId};
use crate::sequence::{Identified, Sequence};

/// 發佈狀態。 / Publication state shared by bundles, courses and chapters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Draft,
    Published,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Draft => f.write_str("Draft"),
            Status::Published => f.write_str("Published"),
        }
    }
}

/// The four kinds of content node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Bundle,
    Course,
    Module,
    Chapter,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Bundle => "bundle",
            EntityKind::Course => "course",
            EntityKind::Module => "module",
            EntityKind::Chapter => "chapter",
        };
        f.write_str(label)
    }
}

/// Uploaded media backing a chapter.
/// 章節所使用的影片檔資訊。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl VideoAsset {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: ContentDuration,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    #[serde(default)]
    pub chapters: Sequence<Chapter>,
}

/// A course owns its modules; `duration` is the runtime advertised in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub duration: ContentDuration,
    #[serde(default)]
    pub modules: Sequence<Module>,
}

/// A bundle only references courses; the courses live in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: BundleId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub courses: Sequence<CourseId>,
}

impl Identified for Chapter {
    type Id = ChapterId;

    fn id(&self) -> ChapterId {
        self.id
    }
}

impl Identified for Module {
    type Id = ModuleId;

    fn id(&self) -> ModuleId {
        self.id
    }
}

impl Identified for Course {
    type Id = CourseId;

    fn id(&self) -> CourseId {
        self.id
    }
}

impl Identified for Bundle {
    type Id = BundleId;

    fn id(&self) -> BundleId {
        self.id
    }
}

impl Identified for CourseId {
    type Id = CourseId;

    fn id(&self) -> CourseId {
        *self
    }
}

/// 課程包草稿。 / Bundle under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleDraft {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub courses: Vec<CourseId>,
}

impl BundleDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub(crate) fn build(self, id: BundleId) -> Bundle {
        Bundle {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            status: self.status,
            courses: self.courses.into_iter().collect(),
        }
    }
}

/// 課程草稿。 / Course under construction, modules included.
///
/// When `duration` is `None` the course advertises the sum of its chapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub duration: Option<ContentDuration>,
    pub modules: Sequence<Module>,
}

impl CourseDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDraft {
    pub title: String,
}

impl ModuleDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub(crate) fn build(self, id: ModuleId) -> Module {
        Module {
            id,
            title: self.title.trim().to_string(),
            chapters: Sequence::new(),
        }
    }
}

/// 章節草稿。 / Chapter under construction.
///
/// `course` and `module` record where the chapter form wants it placed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterDraft {
    pub title: String,
    pub description: String,
    pub duration: ContentDuration,
    pub tags: BTreeSet<String>,
    pub status: Status,
    pub course: Option<CourseId>,
    pub module: Option<ModuleId>,
    pub video: Option<VideoAsset>,
}

impl ChapterDraft {
    pub fn new(title: impl Into<String>, duration: ContentDuration) -> Self {
        Self {
            title: title.into(),
            duration,
            ..Self::default()
        }
    }

    pub(crate) fn build(self, id: ChapterId) -> Chapter {
        Chapter {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            duration: self.duration,
            tags: self.tags,
            status: self.status,
            video: self.video,
        }
    }
}
