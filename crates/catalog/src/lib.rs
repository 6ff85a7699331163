//! Content model and authoring logic for the CourseDesk admin.
//! CourseDesk 管理後台的內容模型與編輯邏輯：課程包、課程、單元與章節。

pub mod aggregate;
pub mod duration;
pub mod error;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod listing;
pub mod model;
pub mod notice;
pub mod seed;
pub mod sequence;
pub mod service;
pub mod tree;
pub mod validate;

pub use aggregate::{
    course_chapter_count, course_runtime, format_file_size, module_runtime, total_chapters,
    total_duration, CatalogStats,
};
pub use duration::{ContentDuration, DurationError};
pub use error::CatalogError;
pub use filter::{filter, filter_candidates, SearchQuery, Searchable};
pub use forms::{
    BundleAction, BundleForm, ChapterAction, ChapterForm, CourseAction, CourseForm, FormError,
};
pub use ids::{BundleId, ChapterId, CourseId, IdAllocator, ModuleId};
pub use listing::{BundleListing, ChapterListing, CourseSummary};
pub use model::{
    Bundle, BundleDraft, Chapter, ChapterDraft, Course, CourseDraft, EntityKind, Module,
    ModuleDraft, Status, VideoAsset,
};
pub use notice::{Notice, NoticeLevel, Route, SubmitOutcome};
pub use seed::{demo_catalog, parse_catalog, SeedError};
pub use sequence::{DuplicateId, Identified, IndexOutOfRange, Sequence};
pub use service::{ContentService, InMemoryCatalog};
pub use tree::{ChildDraft, ChildId, ContentTree, ContentTreeDiff, ContentTreeError, ParentId};
pub use validate::{
    DraftValidator, MediaPolicy, ValidationError, DEFAULT_MAX_UPLOAD_BYTES, VIDEO_MIME_PREFIX,
};
