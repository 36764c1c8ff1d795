use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::json;
use shared::domain::TmdbId;

use super::*;
use crate::{
    config::Settings,
    pages::movie_page,
    support::{matrix, spawn_server, Call, FakeApi, ListStep},
    transport::HttpApi,
};

fn buttons(doc: &Document) -> (bool, bool) {
    (
        doc.by_id(ADD_BUTTON_ID).is_some(),
        doc.by_id(REMOVE_BUTTON_ID).is_some(),
    )
}

fn attached(doc: &Document, api: &Arc<FakeApi>) -> ListToggleController {
    let api: Arc<dyn CinescoutApi> = api.clone();
    ListToggleController::attach(doc, api)
        .expect("attach")
        .expect("button present")
}

#[tokio::test]
async fn add_success_swaps_to_remove_button() {
    let api = FakeApi::new();
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::NotOnList));
    let mut toggle = attached(&doc, &api);
    assert_eq!(toggle.state(), ListMembership::NotOnList);

    let state = toggle.toggle(&mut doc).await.expect("toggle");

    assert_eq!(state, ListMembership::OnList);
    assert_eq!(buttons(&doc), (false, true));
    assert_eq!(api.calls(), vec![Call::Add(matrix())]);
    assert!(doc.alerts().is_empty());

    let button = doc.by_id(REMOVE_BUTTON_ID).expect("remove button");
    assert_eq!(doc.text_content(button), "Remove film");
    assert!(doc.has_class(button, "btn-secondary"));
}

#[tokio::test]
async fn remove_success_swaps_back_to_add_button() {
    let api = FakeApi::new();
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::OnList));
    let mut toggle = attached(&doc, &api);

    toggle.toggle(&mut doc).await.expect("toggle");

    assert_eq!(buttons(&doc), (true, false));
    assert_eq!(api.calls(), vec![Call::Remove(TmdbId::new("603"))]);
}

#[tokio::test]
async fn failure_keeps_button_and_alerts() {
    let api = FakeApi::new();
    api.fail_next_list_call("Film already on list!");
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::NotOnList));
    let mut toggle = attached(&doc, &api);

    let err = toggle.toggle(&mut doc).await.expect_err("must fail");

    assert!(matches!(err, ClientError::Application { .. }));
    assert_eq!(toggle.state(), ListMembership::NotOnList);
    assert_eq!(buttons(&doc), (true, false));
    assert_eq!(
        doc.alerts(),
        &["Error: Add Film failed.\nFilm already on list!".to_string()]
    );
}

#[tokio::test]
async fn remove_failure_names_the_remove_action() {
    let api = FakeApi::new();
    api.fail_next_list_call("boom");
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::OnList));
    let mut toggle = attached(&doc, &api);

    let _ = toggle.toggle(&mut doc).await;

    assert_eq!(buttons(&doc), (false, true));
    assert!(doc.alerts()[0].starts_with("Error: Remove Film failed."));
}

#[tokio::test]
async fn anonymous_page_has_no_controller() {
    let api: Arc<dyn CinescoutApi> = FakeApi::new();
    let doc = movie_page(&matrix(), None, None);

    assert!(ListToggleController::attach(&doc, api)
        .expect("attach")
        .is_none());
}

#[tokio::test]
async fn newer_click_supersedes_request_in_flight() {
    let api = FakeApi::new();
    api.push_list_step(ListStep::Hang);
    api.push_list_step(ListStep::Reply(Ok(())));
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::NotOnList));
    let mut toggle = attached(&doc, &api);

    assert_eq!(toggle.click(), ToggleAction::Add);
    tokio::task::yield_now().await;
    assert!(toggle.is_pending());
    assert_eq!(toggle.click(), ToggleAction::Add);

    let state = toggle
        .settle(&mut doc)
        .await
        .expect("pending request")
        .expect("second click succeeds");

    assert_eq!(state, ListMembership::OnList);
    assert!(!toggle.is_pending());
    assert_eq!(buttons(&doc), (false, true));
    assert!(doc.alerts().is_empty());
    assert!(toggle.settle(&mut doc).await.is_none());
}

#[tokio::test]
async fn repeated_toggles_never_leave_two_buttons() {
    let api = FakeApi::new();
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::NotOnList));
    let mut toggle = attached(&doc, &api);

    for _ in 0..4 {
        toggle.toggle(&mut doc).await.expect("toggle");
        let container = doc.by_id(BUTTON_CONTAINER_ID).expect("container");
        assert_eq!(doc.all_by_tag_within(container, "button").len(), 1);
    }
    assert_eq!(toggle.state(), ListMembership::NotOnList);
    assert_eq!(api.calls().len(), 4);
}

#[tokio::test]
async fn render_fails_without_container() {
    let api: Arc<dyn CinescoutApi> = FakeApi::new();
    let toggle = ListToggleController::new(api, matrix(), ListMembership::OnList);
    let mut doc = Document::new();

    let err = toggle.render(&mut doc).expect_err("no container");
    assert!(matches!(err, ClientError::MissingElement { .. }));
}

#[tokio::test]
async fn timed_out_request_leaves_state_and_alerts() {
    let api = FakeApi::new();
    api.push_list_step(ListStep::Reply(Err(ClientError::Timeout {
        endpoint: "add-to-list".to_string(),
        after: Duration::from_secs(10),
    })));
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::NotOnList));
    let mut toggle = attached(&doc, &api);

    let err = toggle.toggle(&mut doc).await.expect_err("must time out");

    assert!(matches!(err, ClientError::Timeout { .. }));
    assert_eq!(toggle.state(), ListMembership::NotOnList);
    assert_eq!(buttons(&doc), (true, false));
    assert!(doc.alerts()[0].contains("timed out after 10000ms"));
}

#[derive(Clone, Default)]
struct SlowList {
    on_list: Arc<AtomicBool>,
    adds: Arc<AtomicUsize>,
}

/// Stores the film immediately, but answers the first add only after a pause.
async fn slow_add(State(list): State<SlowList>) -> (StatusCode, Json<serde_json::Value>) {
    let first = list.adds.fetch_add(1, Ordering::SeqCst) == 0;
    if list.on_list.swap(true, Ordering::SeqCst) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"success": false, "err_message": "Film already on list!"})),
        );
    }
    if first {
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    (StatusCode::CREATED, Json(json!({"success": true})))
}

#[tokio::test]
async fn add_that_landed_before_abort_is_confirmed_by_the_conflict() {
    let list = SlowList::default();
    let app = Router::new()
        .route("/api/user-movie-list/item", post(slow_add))
        .with_state(list.clone());
    let base_url = spawn_server(app).await;
    let settings = Settings {
        base_url,
        csrf_token: Some("t".to_string()),
        ..Settings::default()
    };
    let api: Arc<dyn CinescoutApi> =
        Arc::new(HttpApi::new(&settings).expect("api").without_proxy());
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::NotOnList));
    let mut toggle = ListToggleController::attach(&doc, api)
        .expect("attach")
        .expect("button present");

    toggle.click();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(list.on_list.load(Ordering::SeqCst));
    toggle.click();

    let state = toggle
        .settle(&mut doc)
        .await
        .expect("pending request")
        .expect("conflict confirms the add");

    assert_eq!(state, ListMembership::OnList);
    assert_eq!(list.adds.load(Ordering::SeqCst), 2);
    assert_eq!(buttons(&doc), (false, true));
    assert!(doc.alerts().is_empty());
}

#[tokio::test]
async fn conflict_without_an_aborted_request_is_still_a_failure() {
    let api = FakeApi::new();
    api.push_list_step(ListStep::Reply(Err(ClientError::http(
        409,
        "Film already on list!",
    ))));
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::NotOnList));
    let mut toggle = attached(&doc, &api);

    let err = toggle.toggle(&mut doc).await.expect_err("must fail");

    assert!(matches!(err, ClientError::Http { status: 409, .. }));
    assert_eq!(toggle.state(), ListMembership::NotOnList);
    assert_eq!(buttons(&doc), (true, false));
    assert_eq!(doc.alerts().len(), 1);
}

#[tokio::test]
async fn remove_that_landed_before_abort_is_confirmed_by_not_found() {
    let api = FakeApi::new();
    api.push_list_step(ListStep::Hang);
    api.push_list_step(ListStep::Reply(Err(ClientError::http(404, "Film not on list"))));
    let mut doc = movie_page(&matrix(), Some("t"), Some(ListMembership::OnList));
    let mut toggle = attached(&doc, &api);

    toggle.click();
    tokio::task::yield_now().await;
    toggle.click();
    let state = toggle
        .settle(&mut doc)
        .await
        .expect("pending request")
        .expect("not found confirms the remove");

    assert_eq!(state, ListMembership::NotOnList);
    assert_eq!(buttons(&doc), (true, false));
    assert!(doc.alerts().is_empty());
}
