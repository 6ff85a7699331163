//! The CRUD boundary the forms and listings talk to.
//!
//! `InMemoryCatalog` keeps everything in a [`ContentTree`] for the lifetime of
//! the process; a backend-backed implementation would satisfy the same trait.

use tracing::{info, warn};

use crate::aggregate::CatalogStats;
use crate::error::CatalogError;
use crate::filter::{SearchQuery, Searchable};
use crate::ids::CourseId;
use crate::listing::{BundleListing, ChapterListing};
use crate::model::{Bundle, BundleDraft, Chapter, ChapterDraft, Course, CourseDraft, VideoAsset};
use crate::seed::{demo_catalog, SeedError};
use crate::tree::{ChildDraft, ChildId, ContentTree, ContentTreeError, ParentId};
use crate::validate::{DraftValidator, ValidationError};

/// Create and list operations over the content catalog.
pub trait ContentService {
    fn create_bundle(&mut self, draft: BundleDraft) -> Result<Bundle, CatalogError>;

    fn create_course(&mut self, draft: CourseDraft) -> Result<Course, CatalogError>;

    fn create_chapter(
        &mut self,
        draft: ChapterDraft,
        video: VideoAsset,
    ) -> Result<Chapter, CatalogError>;

    fn list_bundles(&self, filter: Option<&SearchQuery>) -> Vec<BundleListing>;

    fn list_courses(&self, filter: Option<&SearchQuery>) -> Vec<Course>;

    fn list_chapters(&self, filter: Option<&SearchQuery>) -> Vec<ChapterListing>;

    fn course(&self, id: CourseId) -> Option<Course>;
}

/// Content service backed by an in-memory tree.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tree: ContentTree,
    validator: DraftValidator,
}

impl InMemoryCatalog {
    pub fn new(tree: ContentTree, validator: DraftValidator) -> Self {
        Self { tree, validator }
    }

    /// The sample catalog, validated with `validator`.
    pub fn demo(validator: DraftValidator) -> Result<Self, SeedError> {
        Ok(Self::new(demo_catalog()?, validator))
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    /// Direct access for edits that go through the tree operations.
    pub fn tree_mut(&mut self) -> &mut ContentTree {
        &mut self.tree
    }

    pub fn validator(&self) -> &DraftValidator {
        &self.validator
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::collect(&self.tree)
    }
}

fn rejected<T>(kind: &str, err: impl Into<CatalogError>) -> Result<T, CatalogError> {
    let err = err.into();
    warn!(kind, error = %err, "rejected submission");
    Err(err)
}

fn matches_filter<T: Searchable>(filter: Option<&SearchQuery>, item: &T) -> bool {
    filter.map_or(true, |query| item.matches(query))
}

impl ContentService for InMemoryCatalog {
    fn create_bundle(&mut self, draft: BundleDraft) -> Result<Bundle, CatalogError> {
        if let Err(err) = self.validator.bundle(&draft) {
            return rejected("bundle", err);
        }
        let id = match self.tree.insert_bundle(draft) {
            Ok(id) => id,
            Err(err) => return rejected("bundle", err),
        };
        let bundle = self
            .tree
            .bundle(id)
            .cloned()
            .ok_or(CatalogError::Tree(ContentTreeError::NodeNotFound(
                ParentId::Bundle(id),
            )))?;
        info!(bundle = %bundle.id, title = %bundle.title, courses = bundle.courses.len(), "created bundle");
        Ok(bundle)
    }

    fn create_course(&mut self, draft: CourseDraft) -> Result<Course, CatalogError> {
        if let Err(err) = self.validator.course(&draft) {
            return rejected("course", err);
        }
        let id = match self.tree.insert_course(draft) {
            Ok(id) => id,
            Err(err) => return rejected("course", err),
        };
        let course = self
            .tree
            .course(id)
            .cloned()
            .ok_or(CatalogError::Tree(ContentTreeError::NodeNotFound(
                ParentId::Course(id),
            )))?;
        info!(course = %course.id, title = %course.title, modules = course.modules.len(), "created course");
        Ok(course)
    }

    fn create_chapter(
        &mut self,
        mut draft: ChapterDraft,
        video: VideoAsset,
    ) -> Result<Chapter, CatalogError> {
        if let Err(err) = self.validator.chapter(&draft, Some(&video)) {
            return rejected("chapter", err);
        }
        let (Some(course), Some(module)) = (draft.course, draft.module) else {
            return rejected("chapter", ValidationError::MissingModule);
        };
        draft.video = Some(video);

        let parent = ParentId::Module { course, module };
        let diff = match self.tree.add_child(parent, ChildDraft::Chapter(draft)) {
            Ok(diff) => diff,
            Err(err) => return rejected("chapter", err),
        };
        let chapter = diff
            .added
            .iter()
            .find_map(|child| match child {
                ChildId::Chapter(id) => self
                    .tree
                    .module(course, module)
                    .and_then(|module| module.chapters.get(*id))
                    .cloned(),
                _ => None,
            })
            .ok_or(CatalogError::Tree(
                ContentTreeError::NodeNotFound(parent),
            ))?;
        info!(chapter = %chapter.id, %parent, title = %chapter.title, "created chapter");
        Ok(chapter)
    }

    fn list_bundles(&self, filter: Option<&SearchQuery>) -> Vec<BundleListing> {
        self.tree
            .bundles()
            .iter()
            .filter(|bundle| matches_filter(filter, *bundle))
            .map(|bundle| BundleListing::resolve(bundle, |id| self.tree.course(id)))
            .collect()
    }

    fn list_courses(&self, filter: Option<&SearchQuery>) -> Vec<Course> {
        self.tree
            .courses()
            .iter()
            .filter(|course| matches_filter(filter, *course))
            .cloned()
            .collect()
    }

    fn list_chapters(&self, filter: Option<&SearchQuery>) -> Vec<ChapterListing> {
        self.tree
            .courses()
            .iter()
            .flat_map(|course| {
                course.modules.iter().flat_map(move |module| {
                    module
                        .chapters
                        .iter()
                        .map(move |chapter| ChapterListing::new(course, module, chapter))
                })
            })
            .filter(|listing| matches_filter(filter, listing))
            .collect()
    }

    fn course(&self, id: CourseId) -> Option<Course> {
        self.tree.course(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::ContentDuration;
    use crate::ids::ModuleId;
    use crate::model::{EntityKind, ModuleDraft};

    const MIB: u64 = 1024 * 1024;

    fn catalog_with_module() -> (InMemoryCatalog, CourseId, ModuleId) {
        let mut catalog = InMemoryCatalog::default();
        let course = catalog.create_course(CourseDraft::new("CSS")).unwrap();
        let diff = catalog
            .tree_mut()
            .add_child(
                ParentId::Course(course.id),
                ChildDraft::Module(ModuleDraft::new("Layout")),
            )
            .unwrap();
        let ChildId::Module(module) = diff.added[0] else {
            panic!("expected a module");
        };
        (catalog, course.id, module)
    }

    #[test]
    fn create_bundle_with_blank_title_leaves_catalog_unchanged() {
        let mut catalog = InMemoryCatalog::default();
        let err = catalog.create_bundle(BundleDraft::new(" ")).unwrap_err();
        assert_eq!(
            err,
            CatalogError::Validation(ValidationError::MissingTitle(EntityKind::Bundle))
        );
        assert!(catalog.list_bundles(None).is_empty());
        assert_eq!(catalog.tree().revision(), 0);
    }

    #[test]
    fn create_bundle_resolves_courses_in_listing() {
        let mut catalog = InMemoryCatalog::default();
        let mut draft = CourseDraft::new("Node.js Backend");
        draft.duration = Some(ContentDuration::from_hours(10));
        let course = catalog.create_course(draft).unwrap();

        let mut bundle = BundleDraft::new("Backend");
        bundle.courses.push(course.id);
        let created = catalog.create_bundle(bundle).unwrap();

        let listings = catalog.list_bundles(None);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, created.id);
        assert_eq!(listings[0].courses[0].title, "Node.js Backend");
        assert_eq!(listings[0].total_duration, ContentDuration::from_hours(10));
    }

    #[test]
    fn create_chapter_places_video_under_module() {
        let (mut catalog, course, module) = catalog_with_module();
        let mut draft = ChapterDraft::new("Flexbox", ContentDuration::from_minutes(35));
        draft.course = Some(course);
        draft.module = Some(module);
        draft.tags.insert("css".into());

        let video = VideoAsset::new("flexbox.mp4", "video/mp4", 10 * MIB);
        let chapter = catalog.create_chapter(draft, video.clone()).unwrap();
        assert_eq!(chapter.video, Some(video));

        let listings = catalog.list_chapters(Some(&SearchQuery::new("CSS")));
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].module_title, "Layout");
    }

    #[test]
    fn create_chapter_rejects_oversized_upload() {
        let (mut catalog, course, module) = catalog_with_module();
        let mut draft = ChapterDraft::new("Grid", ContentDuration::from_minutes(40));
        draft.course = Some(course);
        draft.module = Some(module);

        let video = VideoAsset::new("grid.mp4", "video/mp4", 600 * MIB);
        let err = catalog.create_chapter(draft, video).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::FileTooLarge { .. })
        ));
        assert!(catalog.list_chapters(None).is_empty());
    }

    #[test]
    fn create_chapter_in_unknown_module_is_a_tree_error() {
        let (mut catalog, course, _) = catalog_with_module();
        let mut draft = ChapterDraft::new("Lost", ContentDuration::ZERO);
        draft.course = Some(course);
        draft.module = Some(ModuleId::new(999));
        let video = VideoAsset::new("lost.mp4", "video/mp4", MIB);
        let err = catalog.create_chapter(draft, video).unwrap_err();
        assert!(matches!(err, CatalogError::Tree(_)));
    }
}
