//! 建立表單的狀態與更新邏輯。 / State and update logic behind the create screens.
//!
//! Each form owns its draft state and changes only through `apply`, which
//! either accepts an action or reports why it was refused without touching
//! the state. Submitting hands the draft to a [`ContentService`].
//!
//! [`ContentService`]: crate::service::ContentService

mod bundle;
mod chapter;
mod course;

pub use bundle::{BundleAction, BundleForm};
pub use chapter::{ChapterAction, ChapterForm};
pub use course::{CourseAction, CourseForm};

use thiserror::Error;

use crate::ids::{CourseId, ModuleId};
use crate::sequence::IndexOutOfRange;
use crate::validate::ValidationError;

/// Why a form refused an action.
/// 表單拒絕動作的原因。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    IndexOutOfRange(#[from] IndexOutOfRange),
    #[error("course {0} does not exist")]
    UnknownCourse(CourseId),
    #[error("module {0} is not part of this course")]
    UnknownModule(ModuleId),
}
