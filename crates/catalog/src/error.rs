use thiserror::Error;

use crate::tree::ContentTreeError;
use crate::validate::ValidationError;

/// Errors surfaced by the content service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Tree(ContentTreeError),
}

impl From<ContentTreeError> for CatalogError {
    fn from(err: ContentTreeError) -> Self {
        match err {
            ContentTreeError::Validation(err) => CatalogError::Validation(err),
            other => CatalogError::Tree(other),
        }
    }
}

impl CatalogError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CatalogError::Validation(_))
    }
}
