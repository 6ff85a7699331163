use std::error::Error;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli(workspace: &std::path::Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("coursedesk-cli")?;
    cmd.env_remove("RUST_LOG")
        .args(["--workspace", workspace.to_str().unwrap()]);
    Ok(cmd)
}

#[test]
fn dashboard_reports_demo_totals() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .arg("dashboard")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("CourseDesk dashboard (/admin)")
                .and(predicate::str::contains("Bundles:  2"))
                .and(predicate::str::contains("Courses:  5"))
                .and(predicate::str::contains("Modules:  6"))
                .and(predicate::str::contains("Chapters: 17")),
        );
    Ok(())
}

#[test]
fn bundles_list_shows_resolved_courses() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .args(["bundles", "list", "--query", "web"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(
                "#1 Web Development Fundamentals [Published] 3 courses, 20 hours",
            )
            .and(predicate::str::contains("    - React Fundamentals (8 hours)"))
            .and(predicate::str::contains("Backend Essentials").not()),
        );
    Ok(())
}

#[test]
fn chapters_list_filters_by_tag() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .args(["chapters", "list", "--query", "FLEXBOX"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("#7 Flexbox Layout Mastery [Published] 35 min")
                .and(predicate::str::contains("tags: advanced, css +2"))
                .and(predicate::str::contains("Grid Layout").not()),
        );
    Ok(())
}

#[test]
fn courses_list_json_is_machine_readable() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let output = cli(workspace.path())?
        .args(["courses", "list", "--query", "node", "--json"])
        .output()?;
    assert!(output.status.success());

    let courses: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let courses = courses.as_array().expect("array");
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["title"], "Node.js Backend");
    assert_eq!(courses[0]["duration"], "10 hours");
    Ok(())
}

#[test]
fn list_with_no_matches_says_so() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .args(["bundles", "list", "--query", "haskell"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No bundles found."));
    Ok(())
}

#[test]
fn bundle_without_title_is_rejected() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .args(["bundles", "create", "--course", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Please enter a bundle title"));
    Ok(())
}

#[test]
fn bundle_create_prints_notice_and_total() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .args([
            "bundles",
            "create",
            "--title",
            "Full Stack",
            "--course",
            "3",
            "--course",
            "#4",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Bundle created successfully!")
                .and(predicate::str::contains("Next: /admin/bundles"))
                .and(predicate::str::contains(
                    "#3 Full Stack [Draft] 2 courses, 18 hours",
                )),
        );
    Ok(())
}

#[test]
fn bundle_with_unknown_course_fails() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .args(["bundles", "create", "--title", "Ghost", "--course", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("course 42 does not exist"));
    Ok(())
}

#[test]
fn course_create_with_inline_chapters() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .args([
            "courses",
            "create",
            "--title",
            "TypeScript",
            "--module",
            "Types",
            "--module",
            "Generics",
            "--chapter",
            "Types|Primitive types|15 min",
            "--chapter",
            "generics|Constraints|1h 5m",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Course created successfully!")
                .and(predicate::str::contains("Next: /admin/courses"))
                .and(predicate::str::contains(
                    "TypeScript [Draft] 2 modules, 2 chapters, 1h 20m",
                )),
        );
    Ok(())
}

#[test]
fn course_chapter_needs_declared_module() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli(workspace.path())?
        .args([
            "courses",
            "create",
            "--title",
            "TypeScript",
            "--chapter",
            "Types|Primitive types|15 min",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("module 'Types' is not declared"));
    Ok(())
}
