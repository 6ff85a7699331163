use serde::Serialize;

use crate::duration::ContentDuration;
use crate::listing::CourseSummary;
use crate::model::{Course, Module};
use crate::sequence::Sequence;
use crate::tree::ContentTree;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// 課程包內已選課程的總時數。 / Sum of the advertised durations of the given courses.
pub fn total_duration<'a>(courses: impl IntoIterator<Item = &'a CourseSummary>) -> ContentDuration {
    courses.into_iter().map(|course| course.duration).sum()
}

/// 各單元章節總數。 / Chapter count across all modules.
pub fn total_chapters(modules: &Sequence<Module>) -> usize {
    modules.iter().map(|module| module.chapters.len()).sum()
}

pub fn course_chapter_count(course: &Course) -> usize {
    total_chapters(&course.modules)
}

pub fn module_runtime(module: &Module) -> ContentDuration {
    module.chapters.iter().map(|chapter| chapter.duration).sum()
}

/// Runtime of a course measured from its chapters, independent of the
/// duration it advertises.
pub fn course_runtime(course: &Course) -> ContentDuration {
    course.modules.iter().map(module_runtime).sum()
}

/// 後台首頁統計。 / Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub bundles: usize,
    pub courses: usize,
    pub modules: usize,
    pub chapters: usize,
}

impl CatalogStats {
    pub fn collect(tree: &ContentTree) -> Self {
        let courses = tree.courses();
        Self {
            bundles: tree.bundles().len(),
            courses: courses.len(),
            modules: courses.iter().map(|course| course.modules.len()).sum(),
            chapters: courses.iter().map(course_chapter_count).sum(),
        }
    }
}

/// Formats a byte count with binary units and at most two decimals,
/// e.g. `"10 MB"` or `"1.5 GB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ChapterId, CourseId, ModuleId};
    use crate::model::{Chapter, Status};

    fn summary(id: u64, hours: u32) -> CourseSummary {
        CourseSummary {
            id: CourseId::new(id),
            title: format!("Course {id}"),
            status: Status::Draft,
            duration: ContentDuration::from_hours(hours),
            module_count: 0,
            chapter_count: 0,
        }
    }

    fn module(id: u64, minutes: &[u32]) -> Module {
        Module {
            id: ModuleId::new(id),
            title: format!("Module {id}"),
            chapters: minutes
                .iter()
                .enumerate()
                .map(|(index, minutes)| Chapter {
                    id: ChapterId::new(id * 100 + index as u64),
                    title: format!("Chapter {index}"),
                    description: String::new(),
                    duration: ContentDuration::from_minutes(*minutes),
                    tags: Default::default(),
                    status: Status::Draft,
                    video: None,
                })
                .collect(),
        }
    }

    #[test]
    fn bundle_duration_sums_selected_courses() {
        let selected = vec![summary(1, 4), summary(2, 6), summary(3, 8)];
        assert_eq!(total_duration(&selected), ContentDuration::from_hours(18));
        assert_eq!(total_duration(&Vec::<CourseSummary>::new()), ContentDuration::ZERO);
    }

    #[test]
    fn chapter_totals_and_runtime() {
        let course = Course {
            id: CourseId::new(1),
            title: "HTML & CSS".into(),
            description: String::new(),
            status: Status::Published,
            duration: ContentDuration::from_hours(4),
            modules: [module(1, &[15, 20]), module(2, &[25, 30, 5]), module(3, &[])]
                .into_iter()
                .collect(),
        };
        assert_eq!(course_chapter_count(&course), 5);
        assert_eq!(course_runtime(&course), ContentDuration::from_minutes(95));
    }

    #[test]
    fn file_sizes_use_binary_units() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(500 * 1024 * 1024), "500 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }
}
