//! Trash buttons on the viewer's saved-list page.

use std::sync::Arc;

use shared::domain::TmdbId;
use tracing::{error, info};

use crate::{
    dom::{Document, NodeId},
    error::{ClientError, ClientResult},
    pages::{EMPTY_LIST_MESSAGE_ID, TRASH_BUTTON_CLASS},
    transport::CinescoutApi,
};

pub struct SavedListController {
    api: Arc<dyn CinescoutApi>,
}

impl SavedListController {
    /// Syncs the empty-list message with the rows present at load.
    pub fn attach(doc: &mut Document, api: Arc<dyn CinescoutApi>) -> Self {
        let controller = Self { api };
        controller.sync_empty_message(doc);
        controller
    }

    pub fn films(&self, doc: &Document) -> Vec<TmdbId> {
        trash_buttons(doc).into_iter().map(|(_, id)| id).collect()
    }

    /// Removes `tmdb_id` from the list; the row disappears only once the
    /// server confirms.
    pub async fn remove(&self, doc: &mut Document, tmdb_id: &TmdbId) -> ClientResult<()> {
        let button = trash_buttons(doc)
            .into_iter()
            .find(|(_, id)| id == tmdb_id)
            .map(|(button, _)| button)
            .ok_or_else(|| ClientError::missing_element(format!("trash-button[{tmdb_id}]")))?;

        if let Err(err) = self.api.remove_from_list(tmdb_id).await {
            error!(%tmdb_id, error = %err, "failed to remove film from saved list");
            doc.alert(format!("Error: Remove Film failed.\n{err}"));
            return Err(err);
        }

        let row = doc
            .closest(button, "tr")
            .or_else(|| doc.parent(button))
            .unwrap_or(button);
        doc.remove(row);
        info!(%tmdb_id, remaining = trash_buttons(doc).len(), "film removed from saved list");
        self.sync_empty_message(doc);
        Ok(())
    }

    fn sync_empty_message(&self, doc: &mut Document) {
        let empty = trash_buttons(doc).is_empty();
        if let Some(message) = doc.by_id(EMPTY_LIST_MESSAGE_ID) {
            doc.set_hidden(message, !empty);
        }
    }
}

fn trash_buttons(doc: &Document) -> Vec<(NodeId, TmdbId)> {
    doc.all_by_class(TRASH_BUTTON_CLASS)
        .into_iter()
        .filter_map(|button| doc.value(button).map(|v| (button, TmdbId::new(v))))
        .collect()
}

#[cfg(test)]
#[path = "tests/saved_list_tests.rs"]
mod tests;
