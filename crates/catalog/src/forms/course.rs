use crate::aggregate::total_chapters;
use crate::duration::ContentDuration;
use crate::ids::{ChapterId, IdAllocator, ModuleId};
use crate::model::{ChapterDraft, Course, CourseDraft, EntityKind, Module, ModuleDraft, Status};
use crate::notice::SubmitOutcome;
use crate::sequence::Sequence;
use crate::service::ContentService;
use crate::validate::{require_title, ValidationError};

use super::FormError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseAction {
    SetTitle(String),
    SetDescription(String),
    SetStatus(Status),
    SetDuration(Option<ContentDuration>),
    OpenModuleInput,
    CancelModuleInput,
    SetModuleTitle(String),
    /// Commits the module input; a blank title is ignored.
    AddModule,
    RemoveModule(ModuleId),
    MoveModule { from: usize, to: usize },
    AddChapter {
        module: ModuleId,
        title: String,
        duration: String,
    },
    RemoveChapter { module: ModuleId, chapter: ChapterId },
    MoveChapter { module: ModuleId, from: usize, to: usize },
}

/// 課程建立表單，含單元與章節編輯。 / The create-course screen with its
/// inline module and chapter editor.
#[derive(Debug, Clone, Default)]
pub struct CourseForm {
    title: String,
    description: String,
    status: Status,
    duration: Option<ContentDuration>,
    modules: Sequence<Module>,
    module_input: Option<String>,
    module_ids: IdAllocator,
    chapter_ids: IdAllocator,
}

impl CourseForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn modules(&self) -> &Sequence<Module> {
        &self.modules
    }

    /// The pending module title while the inline input is open.
    pub fn module_input(&self) -> Option<&str> {
        self.module_input.as_deref()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn total_chapters(&self) -> usize {
        total_chapters(&self.modules)
    }

    pub fn module_by_title(&self, title: &str) -> Option<&Module> {
        let title = title.trim();
        self.modules
            .iter()
            .find(|module| module.title.eq_ignore_ascii_case(title))
    }

    pub fn apply(&mut self, action: CourseAction) -> Result<(), FormError> {
        match action {
            CourseAction::SetTitle(title) => self.title = title,
            CourseAction::SetDescription(description) => self.description = description,
            CourseAction::SetStatus(status) => self.status = status,
            CourseAction::SetDuration(duration) => self.duration = duration,
            CourseAction::OpenModuleInput => {
                self.module_input.get_or_insert_with(String::new);
            }
            CourseAction::CancelModuleInput => self.module_input = None,
            CourseAction::SetModuleTitle(title) => self.module_input = Some(title),
            CourseAction::AddModule => {
                let title = self.module_input.as_deref().unwrap_or_default();
                if !title.trim().is_empty() {
                    let module = ModuleDraft::new(title).build(self.module_ids.next());
                    self.modules.push(module);
                    self.module_input = None;
                }
            }
            CourseAction::RemoveModule(id) => {
                self.modules.remove(id);
            }
            CourseAction::MoveModule { from, to } => self.modules.reorder(from, to)?,
            CourseAction::AddChapter {
                module,
                title,
                duration,
            } => {
                require_title(EntityKind::Chapter, &title)?;
                if duration.trim().is_empty() {
                    return Err(ValidationError::MissingDuration.into());
                }
                let duration = ContentDuration::parse(&duration).map_err(ValidationError::from)?;
                let target = self
                    .modules
                    .get_mut(module)
                    .ok_or(FormError::UnknownModule(module))?;
                let chapter = ChapterDraft::new(title, duration).build(self.chapter_ids.next());
                target.chapters.push(chapter);
            }
            CourseAction::RemoveChapter { module, chapter } => {
                self.modules
                    .get_mut(module)
                    .ok_or(FormError::UnknownModule(module))?
                    .chapters
                    .remove(chapter);
            }
            CourseAction::MoveChapter { module, from, to } => self
                .modules
                .get_mut(module)
                .ok_or(FormError::UnknownModule(module))?
                .chapters
                .reorder(from, to)?,
        }
        Ok(())
    }

    pub fn draft(&self) -> CourseDraft {
        CourseDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            duration: self.duration,
            modules: self.modules.clone(),
        }
    }

    pub fn submit<S: ContentService + ?Sized>(&self, service: &mut S) -> SubmitOutcome<Course> {
        SubmitOutcome::from_result(EntityKind::Course, service.create_course(self.draft()))
    }
}
