use super::*;
use crate::{
    pages::movie_page,
    support::{matrix, Call, FakeApi},
};

fn found(critics_pick: bool, review_warning: bool) -> ReviewResult {
    ReviewResult::Found {
        review_text: "A dazzling, kinetic ride.".to_string(),
        critics_pick,
        publication_date: "1999-03-31".to_string(),
        review_warning,
    }
}

fn review_text(doc: &Document) -> String {
    let node = doc.first_by_class(REVIEW_TEXT_CLASS).expect("review text");
    doc.text_content(node)
}

#[tokio::test]
async fn renders_review_with_publication_line() {
    let api = FakeApi::new();
    api.set_review(Ok(found(false, false)));
    let mut doc = movie_page(&matrix(), Some("t"), None);

    ReviewFetcher::new(api.clone())
        .fetch(&mut doc)
        .await
        .expect("fetch");

    assert_eq!(review_text(&doc), "A dazzling, kinetic ride.");
    let publication = doc.first_by_class(PUBLICATION_CLASS).expect("publication");
    assert_eq!(doc.text_content(publication), "New York Times, 1999-03-31");
    let warning = doc.by_id(REVIEW_WARNING_ID).expect("warning");
    assert!(doc.children(warning).is_empty());

    match &api.calls()[..] {
        [Call::Review(request)] => {
            assert_eq!(request.title, "The Matrix");
            assert_eq!(request.release_year, 1999);
        }
        other => panic!("unexpected calls: {other:?}"),
    }
}

#[tokio::test]
async fn critics_pick_adds_marker() {
    let api = FakeApi::new();
    api.set_review(Ok(found(true, false)));
    let mut doc = movie_page(&matrix(), Some("t"), None);

    ReviewFetcher::new(api).fetch(&mut doc).await.expect("fetch");

    let review = doc.first_by_class(REVIEW_CLASS).expect("review");
    assert!(doc.text_content(review).contains(CRITICS_PICK_MARKER));
}

#[tokio::test]
async fn year_mismatch_warning_uses_the_same_glyph_twice() {
    let api = FakeApi::new();
    api.set_review(Ok(found(false, true)));
    let mut doc = movie_page(&matrix(), Some("t"), None);

    ReviewFetcher::new(api).fetch(&mut doc).await.expect("fetch");

    let publication = doc.first_by_class(PUBLICATION_CLASS).expect("publication");
    let warning = doc.by_id(REVIEW_WARNING_ID).expect("warning");
    let publication_sup = doc.first_by_tag_within(publication, "sup").expect("sup");
    let warning_sup = doc.first_by_tag_within(warning, "sup").expect("sup");

    assert_eq!(
        doc.text_content(publication_sup).trim(),
        doc.text_content(warning_sup).trim()
    );
    assert_eq!(doc.text_content(warning_sup).trim(), WARNING_GLYPH);
    assert!(doc.text_content(warning).ends_with(REVIEW_WARNING_TEXT));
}

#[tokio::test]
async fn missing_review_shows_server_message() {
    let api = FakeApi::new();
    let mut doc = movie_page(&matrix(), Some("t"), None);

    let result = ReviewFetcher::new(api).fetch(&mut doc).await.expect("fetch");

    assert!(matches!(result, ReviewResult::NotFound { .. }));
    assert_eq!(review_text(&doc), "No review found.");
    assert!(doc.first_by_class(PUBLICATION_CLASS).is_none());
}

#[tokio::test]
async fn transport_error_shows_generic_text_and_alerts() {
    let api = FakeApi::new();
    api.set_review(Err(ClientError::http(502, "Bad Gateway")));
    let mut doc = movie_page(&matrix(), Some("t"), None);

    let err = ReviewFetcher::new(api)
        .fetch(&mut doc)
        .await
        .expect_err("must fail");

    assert!(matches!(err, ClientError::Http { status: 502, .. }));
    assert_eq!(review_text(&doc), REVIEW_ERROR_TEXT);
    assert_eq!(
        doc.alerts(),
        &["Error: could not load review.\nBad Gateway, 502".to_string()]
    );
}

#[tokio::test]
async fn page_without_review_panel_is_rejected_before_any_request() {
    let api = FakeApi::new();
    let mut doc = Document::new();

    let err = ReviewFetcher::new(api.clone())
        .fetch(&mut doc)
        .await
        .expect_err("no panel");

    assert!(matches!(err, ClientError::MissingElement { .. }));
    assert!(api.calls().is_empty());
}
