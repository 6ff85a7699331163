use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Bundle, Course, EntityKind};
use crate::tree::ContentTree;

const DEMO_CATALOG: &str = include_str!("../data/demo_catalog.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid catalog payload: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("bundle {bundle} references unknown course {course}")]
    DanglingCourse { bundle: u64, course: u64 },
    #[error("{kind} {id} appears more than once")]
    DuplicateId { kind: EntityKind, id: u64 },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    bundles: Vec<Bundle>,
    #[serde(default)]
    courses: Vec<Course>,
}

/// Parses a catalog JSON document into a tree.
pub fn parse_catalog(json: &str) -> Result<ContentTree, SeedError> {
    let file: CatalogFile = serde_json::from_str(json)?;
    if let Some(id) = first_repeat(file.bundles.iter().map(|bundle| bundle.id.as_u64())) {
        return Err(SeedError::DuplicateId {
            kind: EntityKind::Bundle,
            id,
        });
    }
    if let Some(id) = first_repeat(file.courses.iter().map(|course| course.id.as_u64())) {
        return Err(SeedError::DuplicateId {
            kind: EntityKind::Course,
            id,
        });
    }
    for bundle in &file.bundles {
        if let Some(course) = bundle
            .courses
            .iter()
            .find(|id| !file.courses.iter().any(|course| course.id == **id))
        {
            return Err(SeedError::DanglingCourse {
                bundle: bundle.id.as_u64(),
                course: course.as_u64(),
            });
        }
    }
    Ok(ContentTree::from_parts(file.bundles, file.courses))
}

fn first_repeat(mut ids: impl Iterator<Item = u64>) -> Option<u64> {
    let mut seen = HashSet::new();
    ids.find(|id| !seen.insert(*id))
}

/// The sample catalog shown on a fresh admin install.
pub fn demo_catalog() -> Result<ContentTree, SeedError> {
    parse_catalog(DEMO_CATALOG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CatalogStats;
    use crate::ids::CourseId;

    #[test]
    fn demo_catalog_loads() {
        let tree = demo_catalog().unwrap();
        let stats = CatalogStats::collect(&tree);
        assert_eq!(stats.bundles, 2);
        assert_eq!(stats.courses, 5);
        assert_eq!(stats.modules, 6);
        assert_eq!(stats.chapters, 17);
        let html = tree.course(CourseId::new(1)).unwrap();
        assert_eq!(html.modules.len(), 3);
        assert_eq!(html.duration.to_string(), "4 hours");
    }

    #[test]
    fn dangling_bundle_reference_is_rejected() {
        let json = r#"{ "bundles": [{ "id": 1, "title": "B", "courses": [9] }], "courses": [] }"#;
        assert!(matches!(
            parse_catalog(json),
            Err(SeedError::DanglingCourse { bundle: 1, course: 9 })
        ));
    }

    #[test]
    fn repeated_course_id_is_reported() {
        let json = r#"{ "courses": [{ "id": 1, "title": "A" }, { "id": 1, "title": "B" }] }"#;
        let err = parse_catalog(json).unwrap_err();
        assert!(matches!(
            err,
            SeedError::DuplicateId {
                kind: EntityKind::Course,
                id: 1
            }
        ));
        assert_eq!(err.to_string(), "course 1 appears more than once");
    }

    #[test]
    fn repeated_child_ids_are_rejected() {
        let modules = r#"{ "courses": [{ "id": 1, "title": "C", "modules": [
            { "id": 1, "title": "M1" }, { "id": 1, "title": "M2" }
        ] }] }"#;
        let err = parse_catalog(modules).unwrap_err();
        assert!(matches!(err, SeedError::Invalid(_)));
        assert!(err.to_string().contains("duplicate id 1"));

        let chapters = r#"{ "courses": [{ "id": 1, "title": "C", "modules": [
            { "id": 1, "title": "M", "chapters": [
                { "id": 5, "title": "A" }, { "id": 5, "title": "B" }
            ] }
        ] }] }"#;
        let err = parse_catalog(chapters).unwrap_err();
        assert!(err.to_string().contains("duplicate id 5"));
    }

    #[test]
    fn malformed_duration_is_rejected() {
        let json = r#"{ "courses": [{ "id": 1, "title": "C", "duration": "a while" }] }"#;
        assert!(matches!(parse_catalog(json), Err(SeedError::Invalid(_))));
    }
}
