use serde::{Deserialize, Serialize};

use crate::domain::{CatalogListing, CatalogRow, FilmRef, ReviewResult, TmdbId};

/// Header carrying the anti-forgery token on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Fields shared by every JSON reply. Failures put their text in
/// `err_message`, except the review endpoint which uses `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn failure_message(&self) -> Option<&str> {
        let present = |m: &&str| !m.trim().is_empty();
        self.err_message
            .as_deref()
            .filter(present)
            .or_else(|| self.message.as_deref().filter(present))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddListItemForm {
    pub tmdb_id: TmdbId,
    pub title: String,
    pub year: i32,
    pub date: String,
    pub original_title: String,
}

impl From<&FilmRef> for AddListItemForm {
    fn from(film: &FilmRef) -> Self {
        Self {
            tmdb_id: film.tmdb_id.clone(),
            title: film.title.clone(),
            year: film.year,
            date: film.release_date.clone(),
            original_title: film.original_title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveListItemForm {
    pub tmdb_id: TmdbId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub results: Vec<CatalogRow>,
    #[serde(default)]
    pub num_results: Option<usize>,
}

impl From<CatalogResponse> for CatalogListing {
    fn from(value: CatalogResponse) -> Self {
        let num_results = value.num_results.unwrap_or(value.results.len());
        Self {
            results: value.results,
            num_results,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub critics_pick: bool,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub review_warning: bool,
}

impl From<ReviewResponse> for ReviewResult {
    fn from(value: ReviewResponse) -> Self {
        ReviewResult::Found {
            review_text: value.review_text,
            critics_pick: value.critics_pick,
            publication_date: value.publication_date,
            review_warning: value.review_warning,
        }
    }
}
