//! Read-only views handed out by the content service for listing screens.

use serde::Serialize;

use crate::aggregate::{course_chapter_count, total_duration};
use crate::duration::ContentDuration;
use crate::ids::{BundleId, CourseId, ModuleId};
use crate::model::{Bundle, Chapter, Course, Module, Status};
use crate::sequence::Identified;

/// One row of the course picker and the course listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: String,
    pub status: Status,
    pub duration: ContentDuration,
    pub module_count: usize,
    pub chapter_count: usize,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            status: course.status,
            duration: course.duration,
            module_count: course.modules.len(),
            chapter_count: course_chapter_count(course),
        }
    }
}

impl Identified for CourseSummary {
    type Id = CourseId;

    fn id(&self) -> CourseId {
        self.id
    }
}

/// A bundle with its course references resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleListing {
    pub id: BundleId,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub courses: Vec<CourseSummary>,
    pub total_duration: ContentDuration,
}

impl BundleListing {
    /// References that no longer resolve are skipped.
    pub fn resolve<'a>(
        bundle: &Bundle,
        lookup: impl Fn(CourseId) -> Option<&'a Course>,
    ) -> Self {
        let courses: Vec<CourseSummary> = bundle
            .courses
            .iter()
            .filter_map(|id| lookup(*id))
            .map(CourseSummary::from)
            .collect();
        Self {
            id: bundle.id,
            title: bundle.title.clone(),
            description: bundle.description.clone(),
            status: bundle.status,
            total_duration: total_duration(&courses),
            courses,
        }
    }
}

/// A chapter together with where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterListing {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub course_id: CourseId,
    pub course_title: String,
    pub module_id: ModuleId,
    pub module_title: String,
}

impl ChapterListing {
    pub fn new(course: &Course, module: &Module, chapter: &Chapter) -> Self {
        Self {
            chapter: chapter.clone(),
            course_id: course.id,
            course_title: course.title.clone(),
            module_id: module.id,
            module_title: module.title.clone(),
        }
    }
}
