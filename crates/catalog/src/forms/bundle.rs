use crate::aggregate::total_duration;
use crate::duration::ContentDuration;
use crate::filter::{filter_candidates, SearchQuery};
use crate::ids::CourseId;
use crate::listing::CourseSummary;
use crate::model::{Bundle, BundleDraft, EntityKind, Status};
use crate::notice::SubmitOutcome;
use crate::sequence::Sequence;
use crate::service::ContentService;

use super::FormError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleAction {
    SetTitle(String),
    SetDescription(String),
    SetStatus(Status),
    SetQuery(String),
    /// Picks a course from the candidates and clears the search box.
    AddCourse(CourseSummary),
    RemoveCourse(CourseId),
    MoveCourse { from: usize, to: usize },
}

/// 課程包建立表單。 / The create-bundle screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleForm {
    title: String,
    description: String,
    status: Status,
    query: String,
    courses: Sequence<CourseSummary>,
}

impl BundleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> &Sequence<CourseSummary> {
        &self.courses
    }

    pub fn apply(&mut self, action: BundleAction) -> Result<(), FormError> {
        match action {
            BundleAction::SetTitle(title) => self.title = title,
            BundleAction::SetDescription(description) => self.description = description,
            BundleAction::SetStatus(status) => self.status = status,
            BundleAction::SetQuery(query) => self.query = query,
            BundleAction::AddCourse(course) => {
                self.courses.push(course);
                self.query.clear();
            }
            BundleAction::RemoveCourse(id) => {
                self.courses.remove(id);
            }
            BundleAction::MoveCourse { from, to } => self.courses.reorder(from, to)?,
        }
        Ok(())
    }

    /// Adds a catalog course by id, as when picking it from the candidates.
    pub fn add_course_by_id<S: ContentService + ?Sized>(
        &mut self,
        service: &S,
        id: CourseId,
    ) -> Result<(), FormError> {
        let course = service.course(id).ok_or(FormError::UnknownCourse(id))?;
        self.apply(BundleAction::AddCourse(CourseSummary::from(&course)))
    }

    /// Catalog courses matching the search box that are not selected yet.
    /// Nothing is offered until something is typed.
    pub fn candidates<S: ContentService + ?Sized>(&self, service: &S) -> Vec<CourseSummary> {
        let query = SearchQuery::new(&self.query);
        if query.is_blank() {
            return Vec::new();
        }
        let summaries: Vec<CourseSummary> = service
            .list_courses(None)
            .iter()
            .map(CourseSummary::from)
            .collect();
        filter_candidates(&query, &summaries, &self.courses.ids())
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn total_duration(&self) -> ContentDuration {
        total_duration(&self.courses)
    }

    pub fn draft(&self) -> BundleDraft {
        BundleDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            courses: self.courses.ids(),
        }
    }

    pub fn submit<S: ContentService + ?Sized>(&self, service: &mut S) -> SubmitOutcome<Bundle> {
        SubmitOutcome::from_result(EntityKind::Bundle, service.create_bundle(self.draft()))
    }
}
