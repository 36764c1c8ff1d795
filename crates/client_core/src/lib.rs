use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

pub mod catalog;
pub mod config;
pub mod csrf;
pub mod dom;
pub mod error;
pub mod list_toggle;
pub mod pages;
pub mod review;
pub mod saved_list;
pub mod sortable;
pub mod spinner;
pub mod transport;

pub use catalog::CriterionTableLoader;
pub use config::{load_settings, Settings};
pub use csrf::CsrfToken;
pub use dom::{Document, ElementSpec, NodeId};
pub use error::{ClientError, ClientResult};
pub use list_toggle::{ListToggleController, ToggleAction};
pub use review::ReviewFetcher;
pub use saved_list::SavedListController;
pub use sortable::{SortColumn, SortOrder, SortableTable};
pub use spinner::MovieLinkSpinners;
pub use transport::{CinescoutApi, HttpApi};

/// Builds the HTTP client for one page view, using the page's CSRF token
/// when it carries one.
pub fn api_for_page(settings: &Settings, doc: &Document) -> anyhow::Result<Arc<dyn CinescoutApi>> {
    Ok(Arc::new(http_api_for_page(settings, doc)?))
}

fn http_api_for_page(settings: &Settings, doc: &Document) -> anyhow::Result<HttpApi> {
    let api = HttpApi::new(settings)
        .context("failed to build cinescout http client")?
        .with_csrf_token(CsrfToken::from_page(doc));
    if !api.has_csrf_token() {
        warn!("no CSRF token on the page or in config; list and review requests will be refused");
    }
    Ok(api)
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
