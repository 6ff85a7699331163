use coursedesk_catalog::{
    filter, BundleAction, BundleForm, Chapter, ContentDuration, ContentService, DraftValidator,
    InMemoryCatalog, ParentId, SearchQuery,
};

fn demo() -> InMemoryCatalog {
    InMemoryCatalog::demo(DraftValidator::default()).expect("demo catalog")
}

fn all_chapters(catalog: &InMemoryCatalog) -> Vec<Chapter> {
    catalog
        .list_chapters(None)
        .into_iter()
        .map(|listing| listing.chapter)
        .collect()
}

#[test]
fn dashboard_counts_match_seed() {
    let stats = demo().stats();
    assert_eq!(stats.bundles, 2);
    assert_eq!(stats.courses, 5);
    assert_eq!(stats.modules, 6);
    assert_eq!(stats.chapters, 17);
}

#[test]
fn css_filter_matches_titles_and_tags_only() {
    let catalog = demo();
    let chapters = all_chapters(&catalog);
    let query = SearchQuery::new("CSS");

    let hits = filter(&query, &chapters);
    assert_eq!(hits.len(), 8);
    for chapter in &hits {
        let in_title = chapter.title.to_lowercase().contains("css");
        let in_tags = chapter.tags.iter().any(|tag| tag.contains("css"));
        assert!(in_title || in_tags, "{} should not match", chapter.title);
    }

    let again = filter(&query, hits.iter().copied());
    assert_eq!(again, hits);
    assert_eq!(chapters.len(), 17);
}

#[test]
fn chapter_listing_search_includes_course_title() {
    let catalog = demo();
    let listings = catalog.list_chapters(Some(&SearchQuery::new("html & css")));
    assert_eq!(listings.len(), 12);
    assert!(listings
        .iter()
        .all(|listing| listing.course_title == "HTML & CSS Fundamentals"));
}

#[test]
fn bundle_listing_sums_course_durations() {
    let catalog = demo();
    let listings = catalog.list_bundles(Some(&SearchQuery::new("web")));
    assert_eq!(listings.len(), 1);
    let web = &listings[0];
    assert_eq!(web.courses.len(), 3);
    assert_eq!(web.total_duration, ContentDuration::from_hours(20));
    assert_eq!(web.total_duration.to_string(), "20 hours");
}

#[test]
fn reorder_bundle_courses_in_tree() {
    let mut catalog = demo();
    let web = catalog.list_bundles(None)[0].id;
    let parent = ParentId::Bundle(web);

    let diff = catalog.tree_mut().reorder(parent, 0, 2).expect("reorder");
    assert_eq!(diff.updated, vec![parent]);
    let titles: Vec<_> = catalog.list_bundles(None)[0]
        .courses
        .iter()
        .map(|course| course.title.clone())
        .collect();
    assert_eq!(
        titles,
        vec![
            "JavaScript Programming",
            "React Fundamentals",
            "HTML & CSS Fundamentals"
        ]
    );
}

#[test]
fn bundle_form_builds_on_demo_courses() {
    let mut catalog = demo();
    let mut form = BundleForm::new();
    form.apply(BundleAction::SetTitle("Full Stack".into()))
        .expect("title");
    for query in ["react", "node", "database"] {
        form.apply(BundleAction::SetQuery(query.into())).expect("query");
        let course = form
            .candidates(&catalog)
            .into_iter()
            .next()
            .expect("candidate");
        form.apply(BundleAction::AddCourse(course)).expect("add");
    }
    assert_eq!(form.total_duration(), ContentDuration::from_hours(23));

    let outcome = form.submit(&mut catalog);
    assert!(outcome.is_created(), "{}", outcome.notice());
    assert_eq!(catalog.stats().bundles, 3);
}
