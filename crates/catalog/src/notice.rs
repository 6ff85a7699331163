use std::fmt;

use crate::error::CatalogError;
use crate::model::EntityKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient message shown after a form action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn created(kind: EntityKind) -> Self {
        let label = match kind {
            EntityKind::Bundle => "Bundle",
            EntityKind::Course => "Course",
            EntityKind::Module => "Module",
            EntityKind::Chapter => "Chapter",
        };
        Self::success(format!("{label} created successfully!"))
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Admin screens a successful submit navigates to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    Bundles,
    Courses,
    Chapters,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/admin",
            Route::Bundles => "/admin/bundles",
            Route::Courses => "/admin/courses",
            Route::Chapters => "/admin/chapters",
        }
    }

    /// The listing that shows entities of `kind`.
    pub fn listing(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Bundle => Route::Bundles,
            EntityKind::Course | EntityKind::Module => Route::Courses,
            EntityKind::Chapter => Route::Chapters,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Result of submitting a form: either the created entity with where to go
/// next, or the message explaining why the form stays open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T> {
    Created {
        entity: T,
        notice: Notice,
        redirect: Route,
    },
    Rejected {
        notice: Notice,
    },
}

impl<T> SubmitOutcome<T> {
    pub fn from_result(kind: EntityKind, result: Result<T, CatalogError>) -> Self {
        match result {
            Ok(entity) => SubmitOutcome::Created {
                entity,
                notice: Notice::created(kind),
                redirect: Route::listing(kind),
            },
            Err(err) => SubmitOutcome::Rejected {
                notice: Notice::error(err.to_string()),
            },
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SubmitOutcome::Created { .. })
    }

    pub fn notice(&self) -> &Notice {
        match self {
            SubmitOutcome::Created { notice, .. } | SubmitOutcome::Rejected { notice } => notice,
        }
    }

    pub fn entity(&self) -> Option<&T> {
        match self {
            SubmitOutcome::Created { entity, .. } => Some(entity),
            SubmitOutcome::Rejected { .. } => None,
        }
    }

    pub fn into_entity(self) -> Option<T> {
        match self {
            SubmitOutcome::Created { entity, .. } => Some(entity),
            SubmitOutcome::Rejected { .. } => None,
        }
    }
}
