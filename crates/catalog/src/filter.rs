//! Case-insensitive substring search over listing collections.
//!
//! Filtering never touches the source collection: it returns a fresh vector of
//! borrowed matches, so running the same query twice yields the same view.

use crate::listing::{ChapterListing, CourseSummary};
use crate::model::{Bundle, Chapter, Course, Module};
use crate::sequence::Identified;

/// A normalised search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    /// Surrounding whitespace is not part of the needle.
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.trim().to_lowercase(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    pub fn is_blank(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches_text(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.needle)
    }
}

impl From<&str> for SearchQuery {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Things that can be matched against a [`SearchQuery`].
pub trait Searchable {
    fn matches(&self, query: &SearchQuery) -> bool;
}

impl Searchable for Bundle {
    fn matches(&self, query: &SearchQuery) -> bool {
        query.matches_text(&self.title)
    }
}

impl Searchable for Course {
    fn matches(&self, query: &SearchQuery) -> bool {
        query.matches_text(&self.title)
    }
}

impl Searchable for CourseSummary {
    fn matches(&self, query: &SearchQuery) -> bool {
        query.matches_text(&self.title)
    }
}

impl Searchable for Module {
    fn matches(&self, query: &SearchQuery) -> bool {
        query.matches_text(&self.title)
    }
}

impl Searchable for Chapter {
    fn matches(&self, query: &SearchQuery) -> bool {
        query.matches_text(&self.title) || self.tags.iter().any(|tag| query.matches_text(tag))
    }
}

impl Searchable for ChapterListing {
    fn matches(&self, query: &SearchQuery) -> bool {
        self.chapter.matches(query) || query.matches_text(&self.course_title)
    }
}

pub fn filter<'a, T, I>(query: &SearchQuery, items: I) -> Vec<&'a T>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().filter(|item| item.matches(query)).collect()
}

/// Like [`filter`], minus anything whose id is already in `selected`.
pub fn filter_candidates<'a, T, I>(query: &SearchQuery, items: I, selected: &[T::Id]) -> Vec<&'a T>
where
    T: Searchable + Identified + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(|item| !selected.contains(&item.id()) && item.matches(query))
        .collect()
}
