//! Scripted API double and a local HTTP server helper for controller tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::domain::{
    CatalogListing, CatalogRow, FilmRef, ReviewRequest, ReviewResult, TmdbId,
};
use tokio::net::TcpListener;

use crate::{
    error::{ClientError, ClientResult},
    transport::CinescoutApi,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Add(FilmRef),
    Remove(TmdbId),
    Catalog,
    Review(ReviewRequest),
}

pub enum ListStep {
    Reply(ClientResult<()>),
    /// Never answers; the request stays in flight until aborted.
    Hang,
}

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    list_steps: Mutex<VecDeque<ListStep>>,
    catalog: Mutex<Option<ClientResult<CatalogListing>>>,
    review: Mutex<Option<ClientResult<ReviewResult>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_list_step(&self, step: ListStep) {
        self.list_steps.lock().expect("lock").push_back(step);
    }

    pub fn fail_next_list_call(&self, message: &str) {
        self.push_list_step(ListStep::Reply(Err(ClientError::Application {
            message: message.to_string(),
        })));
    }

    pub fn set_catalog(&self, result: ClientResult<CatalogListing>) {
        *self.catalog.lock().expect("lock") = Some(result);
    }

    pub fn set_review(&self, result: ClientResult<ReviewResult>) {
        *self.review.lock().expect("lock") = Some(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }

    async fn next_list_reply(&self) -> ClientResult<()> {
        let step = self.list_steps.lock().expect("lock").pop_front();
        match step {
            Some(ListStep::Reply(result)) => result,
            Some(ListStep::Hang) => std::future::pending::<ClientResult<()>>().await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CinescoutApi for FakeApi {
    async fn add_to_list(&self, film: &FilmRef) -> ClientResult<()> {
        self.record(Call::Add(film.clone()));
        self.next_list_reply().await
    }

    async fn remove_from_list(&self, tmdb_id: &TmdbId) -> ClientResult<()> {
        self.record(Call::Remove(tmdb_id.clone()));
        self.next_list_reply().await
    }

    async fn catalog(&self) -> ClientResult<CatalogListing> {
        self.record(Call::Catalog);
        self.catalog
            .lock()
            .expect("lock")
            .take()
            .unwrap_or_else(|| {
                Ok(CatalogListing {
                    results: Vec::new(),
                    num_results: 0,
                })
            })
    }

    async fn review(&self, request: &ReviewRequest) -> ClientResult<ReviewResult> {
        self.record(Call::Review(request.clone()));
        self.review
            .lock()
            .expect("lock")
            .take()
            .unwrap_or_else(|| {
                Ok(ReviewResult::NotFound {
                    message: "No review found.".to_string(),
                })
            })
    }
}

pub fn matrix() -> FilmRef {
    FilmRef {
        tmdb_id: TmdbId::new("603"),
        title: "The Matrix".to_string(),
        year: 1999,
        release_date: "1999-03-30".to_string(),
        original_title: "The Matrix".to_string(),
    }
}

pub fn catalog_row(tmdb_id: i64, title: &str, year: i32, directors: &[&str]) -> CatalogRow {
    CatalogRow {
        tmdb_id: TmdbId::new(tmdb_id.to_string()),
        title: title.to_string(),
        year,
        directors: directors.iter().map(|d| d.to_string()).collect(),
    }
}

/// Serves `app` on an ephemeral local port and returns its base url.
pub async fn spawn_server(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}
