//! Per-link spinners shown while a movie page loads.
//!
//! Only one spinner is visible at a time. Every click restarts the single
//! deadline, so an older click can never hide a newer spinner early.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::{
    dom::{Document, NodeId},
    error::{ClientError, ClientResult},
    pages::MOVIE_LINK_CLASS,
};

pub struct MovieLinkSpinners {
    delay: Duration,
    active: Option<(NodeId, Instant)>,
}

impl MovieLinkSpinners {
    /// Hides every link spinner on the page.
    pub fn attach(doc: &mut Document, delay: Duration) -> Self {
        for link in doc.all_by_class(MOVIE_LINK_CLASS) {
            if let Some(spinner) = doc.first_by_tag_within(link, "span") {
                doc.set_hidden(spinner, true);
            }
        }
        Self {
            delay,
            active: None,
        }
    }

    pub fn active_spinner(&self) -> Option<NodeId> {
        self.active.map(|(spinner, _)| spinner)
    }

    pub fn click(&mut self, doc: &mut Document, link: NodeId) -> ClientResult<()> {
        let spinner = doc
            .first_by_tag_within(link, "span")
            .ok_or_else(|| ClientError::missing_element("movie-link span"))?;

        if let Some((previous, _)) = self.active.take() {
            if previous != spinner && doc.is_visible(previous) {
                debug!("another link clicked; hiding previous spinner");
                doc.set_hidden(previous, true);
            }
        }

        doc.set_hidden(spinner, false);
        self.active = Some((spinner, Instant::now() + self.delay));
        Ok(())
    }

    /// Waits for the active spinner's deadline and hides it. Returns `false`
    /// when no spinner is showing.
    pub async fn expire(&mut self, doc: &mut Document) -> bool {
        let Some((spinner, deadline)) = self.active else {
            return false;
        };
        sleep_until(deadline).await;
        debug!("spinner delay elapsed; hiding spinner");
        doc.set_hidden(spinner, true);
        self.active = None;
        true
    }
}

#[cfg(test)]
#[path = "tests/spinner_tests.rs"]
mod tests;
