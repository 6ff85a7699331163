use std::collections::BTreeSet;

use crate::duration::ContentDuration;
use crate::error::CatalogError;
use crate::ids::{CourseId, ModuleId};
use crate::model::{Chapter, ChapterDraft, EntityKind, Module, Status, VideoAsset};
use crate::notice::SubmitOutcome;
use crate::service::ContentService;
use crate::validate::{DraftValidator, MediaPolicy, ValidationError};

use super::FormError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterAction {
    SetTitle(String),
    SetDescription(String),
    SetDuration(String),
    SetStatus(Status),
    SelectCourse(Option<CourseId>),
    SelectModule(Option<ModuleId>),
    SetTagInput(String),
    /// Commits the tag input.
    AddTag,
    RemoveTag(String),
    AttachVideo(VideoAsset),
    ClearVideo,
}

/// 章節建立表單。 / The create-chapter screen.
///
/// The duration is kept as typed and only parsed on submit; leaving it blank
/// records a zero-length chapter.
#[derive(Debug, Clone, Default)]
pub struct ChapterForm {
    validator: DraftValidator,
    title: String,
    description: String,
    duration: String,
    status: Status,
    course: Option<CourseId>,
    module: Option<ModuleId>,
    tags: BTreeSet<String>,
    tag_input: String,
    video: Option<VideoAsset>,
}

impl ChapterForm {
    pub fn new(policy: MediaPolicy) -> Self {
        Self {
            validator: DraftValidator::new(policy),
            ..Self::default()
        }
    }

    pub fn course(&self) -> Option<CourseId> {
        self.course
    }

    pub fn module(&self) -> Option<ModuleId> {
        self.module
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn video(&self) -> Option<&VideoAsset> {
        self.video.as_ref()
    }

    pub fn apply(&mut self, action: ChapterAction) -> Result<(), FormError> {
        match action {
            ChapterAction::SetTitle(title) => self.title = title,
            ChapterAction::SetDescription(description) => self.description = description,
            ChapterAction::SetDuration(duration) => self.duration = duration,
            ChapterAction::SetStatus(status) => self.status = status,
            ChapterAction::SelectCourse(course) => {
                if course != self.course {
                    self.module = None;
                }
                self.course = course;
            }
            ChapterAction::SelectModule(module) => {
                if module.is_some() && self.course.is_none() {
                    return Err(ValidationError::MissingCourse.into());
                }
                self.module = module;
            }
            ChapterAction::SetTagInput(input) => self.tag_input = input,
            ChapterAction::AddTag => {
                let tag = self.tag_input.trim().to_lowercase();
                if !tag.is_empty() {
                    self.tags.insert(tag);
                    self.tag_input.clear();
                }
            }
            ChapterAction::RemoveTag(tag) => {
                self.tags.remove(&tag.trim().to_lowercase());
            }
            ChapterAction::AttachVideo(asset) => {
                self.validator.media(&asset)?;
                self.video = Some(asset);
            }
            ChapterAction::ClearVideo => self.video = None,
        }
        Ok(())
    }

    /// Selects a course after checking that the catalog knows it.
    pub fn select_course<S: ContentService + ?Sized>(
        &mut self,
        service: &S,
        course: Option<CourseId>,
    ) -> Result<(), FormError> {
        if let Some(id) = course {
            service.course(id).ok_or(FormError::UnknownCourse(id))?;
        }
        self.apply(ChapterAction::SelectCourse(course))
    }

    /// Selects a module of the selected course.
    pub fn select_module<S: ContentService + ?Sized>(
        &mut self,
        service: &S,
        module: Option<ModuleId>,
    ) -> Result<(), FormError> {
        if let (Some(id), Some(_)) = (module, self.course) {
            if !self.module_options(service).iter().any(|option| option.id == id) {
                return Err(FormError::UnknownModule(id));
            }
        }
        self.apply(ChapterAction::SelectModule(module))
    }

    /// Modules of the selected course, in course order.
    pub fn module_options<S: ContentService + ?Sized>(&self, service: &S) -> Vec<Module> {
        self.course
            .and_then(|id| service.course(id))
            .map(|course| course.modules.into_vec())
            .unwrap_or_default()
    }

    fn draft(&self, duration: ContentDuration) -> ChapterDraft {
        ChapterDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            duration,
            tags: self.tags.clone(),
            status: self.status,
            course: self.course,
            module: self.module,
            video: None,
        }
    }

    /// Field rules run first so the message matches the first empty field,
    /// then the typed duration is parsed.
    fn checked_draft(&self) -> Result<(ChapterDraft, VideoAsset), ValidationError> {
        self.validator
            .chapter(&self.draft(ContentDuration::ZERO), self.video.as_ref())?;
        let duration = if self.duration.trim().is_empty() {
            ContentDuration::ZERO
        } else {
            ContentDuration::parse(&self.duration)?
        };
        let video = self.video.clone().ok_or(ValidationError::MissingVideo)?;
        Ok((self.draft(duration), video))
    }

    pub fn submit<S: ContentService + ?Sized>(&self, service: &mut S) -> SubmitOutcome<Chapter> {
        let result = self
            .checked_draft()
            .map_err(CatalogError::from)
            .and_then(|(draft, video)| service.create_chapter(draft, video));
        SubmitOutcome::from_result(EntityKind::Chapter, result)
    }
}
