use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::duration::ContentDuration;
use crate::ids::{BundleId, ChapterId, CourseId, IdAllocator, ModuleId};
use crate::model::{
    Bundle, BundleDraft, Chapter, ChapterDraft, Course, CourseDraft, EntityKind, Module,
    ModuleDraft,
};
use crate::sequence::{IndexOutOfRange, Sequence};
use crate::validate::{require_title, ValidationError};

/// Addresses a node that owns an ordered child sequence.
/// 指向擁有子項序列的節點。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParentId {
    Bundle(BundleId),
    Course(CourseId),
    Module { course: CourseId, module: ModuleId },
}

impl ParentId {
    /// The kind of child this parent accepts.
    pub fn child_kind(&self) -> EntityKind {
        match self {
            ParentId::Bundle(_) => EntityKind::Course,
            ParentId::Course(_) => EntityKind::Module,
            ParentId::Module { .. } => EntityKind::Chapter,
        }
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentId::Bundle(id) => write!(f, "bundle {id}"),
            ParentId::Course(id) => write!(f, "course {id}"),
            ParentId::Module { course, module } => write!(f, "module {module} of course {course}"),
        }
    }
}

/// Identifies a child inside its parent's sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildId {
    Course(CourseId),
    Module(ModuleId),
    Chapter(ChapterId),
}

impl ChildId {
    pub fn kind(&self) -> EntityKind {
        match self {
            ChildId::Course(_) => EntityKind::Course,
            ChildId::Module(_) => EntityKind::Module,
            ChildId::Chapter(_) => EntityKind::Chapter,
        }
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildId::Course(id) => write!(f, "course {id}"),
            ChildId::Module(id) => write!(f, "module {id}"),
            ChildId::Chapter(id) => write!(f, "chapter {id}"),
        }
    }
}

/// Payload for [`ContentTree::add_child`]. Bundles take references to
/// existing courses, courses take modules, modules take chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildDraft {
    CourseRef(CourseId),
    Module(ModuleDraft),
    Chapter(ChapterDraft),
}

impl ChildDraft {
    pub fn kind(&self) -> EntityKind {
        match self {
            ChildDraft::CourseRef(_) => EntityKind::Course,
            ChildDraft::Module(_) => EntityKind::Module,
            ChildDraft::Chapter(_) => EntityKind::Chapter,
        }
    }
}

/// Captures differences after a tree mutation.
/// 紀錄內容樹變動後的差異。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTreeDiff {
    pub added: Vec<ChildId>,
    pub removed: Vec<ChildId>,
    pub moved: Vec<ChildId>,
    pub updated: Vec<ParentId>,
}

impl ContentTreeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.updated.is_empty()
    }
}

/// Tree-manipulation errors.
/// 內容樹操作錯誤類型。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentTreeError {
    #[error("{0} not found")]
    NodeNotFound(ParentId),
    #[error("{parent} cannot accept a {child}")]
    InvalidParent { parent: ParentId, child: EntityKind },
    #[error("{child} is already part of {parent}")]
    DuplicateChild { parent: ParentId, child: ChildId },
    #[error("course {0} does not exist")]
    UnknownCourse(CourseId),
    #[error(transparent)]
    IndexOutOfRange(#[from] IndexOutOfRange),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Default)]
struct TreeIds {
    bundles: IdAllocator,
    courses: IdAllocator,
    modules: IdAllocator,
    chapters: IdAllocator,
}

/// In-memory Bundle → Course → Module → Chapter tree under authoring.
/// 編輯中的 課程包 → 課程 → 單元 → 章節 內容樹。
#[derive(Debug, Clone, Default)]
pub struct ContentTree {
    revision: u64,
    bundles: Sequence<Bundle>,
    courses: Sequence<Course>,
    ids: TreeIds,
}

impl ContentTree {
    /// 建立空的內容樹。 / Constructs an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree around existing entities, reserving every id they use.
    /// 以既有資料建立內容樹，並保留其中所有識別碼。
    pub fn from_parts(
        bundles: impl IntoIterator<Item = Bundle>,
        courses: impl IntoIterator<Item = Course>,
    ) -> Self {
        let bundles: Sequence<Bundle> = bundles.into_iter().collect();
        let courses: Sequence<Course> = courses.into_iter().collect();
        let mut ids = TreeIds::default();
        for bundle in &bundles {
            ids.bundles.observe(bundle.id.as_u64());
        }
        for course in &courses {
            ids.courses.observe(course.id.as_u64());
            for module in &course.modules {
                ids.modules.observe(module.id.as_u64());
                for chapter in &module.chapters {
                    ids.chapters.observe(chapter.id.as_u64());
                }
            }
        }
        Self {
            revision: 0,
            bundles,
            courses,
            ids,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn bundles(&self) -> &Sequence<Bundle> {
        &self.bundles
    }

    pub fn courses(&self) -> &Sequence<Course> {
        &self.courses
    }

    pub fn bundle(&self, id: BundleId) -> Option<&Bundle> {
        self.bundles.get(id)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(id)
    }

    pub fn module(&self, course: CourseId, module: ModuleId) -> Option<&Module> {
        self.courses.get(course)?.modules.get(module)
    }

    /// Finds a chapter along with the course and module that own it.
    pub fn locate_chapter(&self, id: ChapterId) -> Option<(&Course, &Module, &Chapter)> {
        self.courses.iter().find_map(|course| {
            course.modules.iter().find_map(|module| {
                module
                    .chapters
                    .get(id)
                    .map(|chapter| (course, module, chapter))
            })
        })
    }

    /// Number of children currently under `parent`.
    pub fn child_count(&self, parent: ParentId) -> Option<usize> {
        match parent {
            ParentId::Bundle(id) => self.bundles.get(id).map(|bundle| bundle.courses.len()),
            ParentId::Course(id) => self.courses.get(id).map(|course| course.modules.len()),
            ParentId::Module { course, module } => self
                .module(course, module)
                .map(|module| module.chapters.len()),
        }
    }

    /// Adds a top-level bundle. Every referenced course must already exist.
    pub fn insert_bundle(&mut self, draft: BundleDraft) -> Result<BundleId, ContentTreeError> {
        require_title(EntityKind::Bundle, &draft.title)?;
        if let Some(missing) = draft
            .courses
            .iter()
            .copied()
            .find(|course| !self.courses.contains(*course))
        {
            return Err(ContentTreeError::UnknownCourse(missing));
        }
        let id: BundleId = self.ids.bundles.next();
        self.bundles.push(draft.build(id));
        self.bump();
        debug!(bundle = %id, revision = self.revision, "inserted bundle");
        Ok(id)
    }

    /// Adds a top-level course. Modules and chapters carried by the draft are
    /// re-keyed from this tree's id space so they cannot clash with existing ones.
    pub fn insert_course(&mut self, draft: CourseDraft) -> Result<CourseId, ContentTreeError> {
        require_title(EntityKind::Course, &draft.title)?;
        let id: CourseId = self.ids.courses.next();
        let mut modules = Sequence::new();
        for module in draft.modules {
            let chapters: Sequence<Chapter> = module
                .chapters
                .into_iter()
                .map(|chapter| Chapter {
                    id: self.ids.chapters.next(),
                    ..chapter
                })
                .collect();
            modules.push(Module {
                id: self.ids.modules.next(),
                title: module.title,
                chapters,
            });
        }
        let runtime: ContentDuration = modules
            .iter()
            .flat_map(|module: &Module| module.chapters.iter())
            .map(|chapter| chapter.duration)
            .sum();
        self.courses.push(Course {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            status: draft.status,
            duration: draft.duration.unwrap_or(runtime),
            modules,
        });
        self.bump();
        debug!(course = %id, revision = self.revision, "inserted course");
        Ok(id)
    }

    /// Appends a child to the end of `parent`'s sequence.
    /// 在指定父節點的序列尾端新增子項。
    pub fn add_child(
        &mut self,
        parent: ParentId,
        draft: ChildDraft,
    ) -> Result<ContentTreeDiff, ContentTreeError> {
        let mut diff = ContentTreeDiff::default();
        match (parent, draft) {
            (ParentId::Bundle(bundle_id), ChildDraft::CourseRef(course_id)) => {
                if !self.courses.contains(course_id) {
                    return Err(ContentTreeError::UnknownCourse(course_id));
                }
                let bundle = self
                    .bundles
                    .get_mut(bundle_id)
                    .ok_or(ContentTreeError::NodeNotFound(parent))?;
                let child = ChildId::Course(course_id);
                if !bundle.courses.push(course_id) {
                    return Err(ContentTreeError::DuplicateChild { parent, child });
                }
                diff.added.push(child);
            }
            (ParentId::Course(course_id), ChildDraft::Module(draft)) => {
                require_title(EntityKind::Module, &draft.title)?;
                let course = self
                    .courses
                    .get_mut(course_id)
                    .ok_or(ContentTreeError::NodeNotFound(parent))?;
                let id: ModuleId = self.ids.modules.next();
                course.modules.push(draft.build(id));
                diff.added.push(ChildId::Module(id));
            }
            (ParentId::Module { course, module }, ChildDraft::Chapter(draft)) => {
                require_title(EntityKind::Chapter, &draft.title)?;
                let module = self
                    .courses
                    .get_mut(course)
                    .and_then(|course| course.modules.get_mut(module))
                    .ok_or(ContentTreeError::NodeNotFound(parent))?;
                let id: ChapterId = self.ids.chapters.next();
                module.chapters.push(draft.build(id));
                diff.added.push(ChildId::Chapter(id));
            }
            (parent, draft) => {
                return Err(ContentTreeError::InvalidParent {
                    parent,
                    child: draft.kind(),
                });
            }
        }
        diff.updated.push(parent);
        self.bump();
        debug!(%parent, added = ?diff.added, revision = self.revision, "added child");
        Ok(diff)
    }

    /// Removes a child by id. An absent child yields an empty diff; an absent
    /// parent is an error.
    /// 依識別碼移除子項；子項不存在時回傳空差異。
    pub fn remove_child(
        &mut self,
        parent: ParentId,
        child: ChildId,
    ) -> Result<ContentTreeDiff, ContentTreeError> {
        let removed = match (parent, child) {
            (ParentId::Bundle(bundle_id), ChildId::Course(course_id)) => self
                .bundles
                .get_mut(bundle_id)
                .ok_or(ContentTreeError::NodeNotFound(parent))?
                .courses
                .remove(course_id)
                .is_some(),
            (ParentId::Course(course_id), ChildId::Module(module_id)) => self
                .courses
                .get_mut(course_id)
                .ok_or(ContentTreeError::NodeNotFound(parent))?
                .modules
                .remove(module_id)
                .is_some(),
            (ParentId::Module { course, module }, ChildId::Chapter(chapter_id)) => self
                .courses
                .get_mut(course)
                .and_then(|course| course.modules.get_mut(module))
                .ok_or(ContentTreeError::NodeNotFound(parent))?
                .chapters
                .remove(chapter_id)
                .is_some(),
            (parent, child) => {
                return Err(ContentTreeError::InvalidParent {
                    parent,
                    child: child.kind(),
                });
            }
        };

        let mut diff = ContentTreeDiff::default();
        if removed {
            diff.removed.push(child);
            diff.updated.push(parent);
            self.bump();
            debug!(%parent, %child, revision = self.revision, "removed child");
        }
        Ok(diff)
    }

    /// Moves the child at `from` to position `to` within `parent`.
    /// 在父節點內將 `from` 位置的子項移至 `to`。
    pub fn reorder(
        &mut self,
        parent: ParentId,
        from: usize,
        to: usize,
    ) -> Result<ContentTreeDiff, ContentTreeError> {
        let moved = match parent {
            ParentId::Bundle(id) => {
                let courses = &mut self
                    .bundles
                    .get_mut(id)
                    .ok_or(ContentTreeError::NodeNotFound(parent))?
                    .courses;
                courses.reorder(from, to)?;
                courses.as_slice().get(to).copied().map(ChildId::Course)
            }
            ParentId::Course(id) => {
                let modules = &mut self
                    .courses
                    .get_mut(id)
                    .ok_or(ContentTreeError::NodeNotFound(parent))?
                    .modules;
                modules.reorder(from, to)?;
                modules.as_slice().get(to).map(|module| ChildId::Module(module.id))
            }
            ParentId::Module { course, module } => {
                let chapters = &mut self
                    .courses
                    .get_mut(course)
                    .and_then(|course| course.modules.get_mut(module))
                    .ok_or(ContentTreeError::NodeNotFound(parent))?
                    .chapters;
                chapters.reorder(from, to)?;
                chapters
                    .as_slice()
                    .get(to)
                    .map(|chapter| ChildId::Chapter(chapter.id))
            }
        };

        let mut diff = ContentTreeDiff::default();
        if from != to {
            diff.moved.extend(moved);
            diff.updated.push(parent);
            self.bump();
            debug!(%parent, from, to, revision = self.revision, "reordered children");
        }
        Ok(diff)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
