//! Add/remove button for the film shown on a movie page.
//!
//! The controller owns the membership state; the button container is rendered
//! from it and only after the server has confirmed a change. Each click spawns
//! one request task. A click while a request is in flight aborts that request,
//! so a stale reply can never reach the page. The aborted request may still
//! have landed on the server, so when the request that replaced it is
//! rejected because the film is already in the target state, that rejection
//! confirms the target instead of failing.

use std::sync::Arc;

use shared::{
    domain::{FilmRef, ListMembership},
    error::ErrorCode,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{
    dom::{Document, ElementSpec, NodeId},
    error::{ClientError, ClientResult},
    pages::{read_film, BUTTON_CONTAINER_ID},
    transport::CinescoutApi,
};

pub const ADD_BUTTON_ID: &str = "add-button";
pub const REMOVE_BUTTON_ID: &str = "remove-button";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Add,
    Remove,
}

impl ToggleAction {
    fn for_state(state: ListMembership) -> Self {
        match state {
            ListMembership::NotOnList => Self::Add,
            ListMembership::OnList => Self::Remove,
        }
    }

    fn target(self) -> ListMembership {
        match self {
            Self::Add => ListMembership::OnList,
            Self::Remove => ListMembership::NotOnList,
        }
    }

    /// Whether `err` is the server reporting the film already in this
    /// action's target state.
    fn already_applied(self, err: &ClientError) -> bool {
        matches!(
            (self, err.code()),
            (Self::Add, ErrorCode::Conflict)
                | (Self::Remove, ErrorCode::Conflict | ErrorCode::NotFound)
        )
    }

    fn failure_title(self) -> &'static str {
        match self {
            Self::Add => "Add Film",
            Self::Remove => "Remove Film",
        }
    }
}

struct PendingToggle {
    action: ToggleAction,
    /// An aborted request for the same action was sent before this one.
    follows_aborted: bool,
    task: JoinHandle<ClientResult<()>>,
}

pub struct ListToggleController {
    api: Arc<dyn CinescoutApi>,
    film: FilmRef,
    state: ListMembership,
    pending: Option<PendingToggle>,
}

impl ListToggleController {
    pub fn new(api: Arc<dyn CinescoutApi>, film: FilmRef, state: ListMembership) -> Self {
        Self {
            api,
            film,
            state,
            pending: None,
        }
    }

    /// Reads the film and the initial state from a freshly loaded movie page.
    ///
    /// Returns `Ok(None)` when the page has neither button (anonymous viewer).
    pub fn attach(doc: &Document, api: Arc<dyn CinescoutApi>) -> ClientResult<Option<Self>> {
        let state = if doc.by_id(REMOVE_BUTTON_ID).is_some() {
            ListMembership::OnList
        } else if doc.by_id(ADD_BUTTON_ID).is_some() {
            ListMembership::NotOnList
        } else {
            debug!("no list button on page; toggle inactive");
            return Ok(None);
        };

        let film = read_film(doc)?;
        debug!(tmdb_id = %film.tmdb_id, ?state, "list toggle attached");
        Ok(Some(Self::new(api, film, state)))
    }

    pub fn state(&self) -> ListMembership {
        self.state
    }

    pub fn film(&self) -> &FilmRef {
        &self.film
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts the request for the visible button. Any request still in flight
    /// is aborted first.
    pub fn click(&mut self) -> ToggleAction {
        let action = ToggleAction::for_state(self.state);
        let mut follows_aborted = false;
        if let Some(stale) = self.pending.take() {
            stale.task.abort();
            follows_aborted = stale.action == action || stale.follows_aborted;
            info!(tmdb_id = %self.film.tmdb_id, action = ?stale.action, "superseding in-flight request");
        }

        let api = Arc::clone(&self.api);
        let film = self.film.clone();
        info!(tmdb_id = %film.tmdb_id, ?action, "list button clicked");

        let task = tokio::spawn(async move {
            match action {
                ToggleAction::Add => api.add_to_list(&film).await,
                ToggleAction::Remove => api.remove_from_list(&film.tmdb_id).await,
            }
        });
        self.pending = Some(PendingToggle {
            action,
            follows_aborted,
            task,
        });
        action
    }

    /// Waits for the in-flight request and applies its outcome to the page.
    ///
    /// Returns `None` when nothing is pending.
    pub async fn settle(&mut self, doc: &mut Document) -> Option<ClientResult<ListMembership>> {
        let PendingToggle {
            action,
            follows_aborted,
            task,
        } = self.pending.take()?;
        let result = match task.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_cancelled() => Err(ClientError::Superseded),
            Err(join_err) => Err(ClientError::Transport {
                endpoint: "list-toggle".to_string(),
                message: join_err.to_string(),
            }),
        };
        let result = match result {
            Err(err) if follows_aborted && action.already_applied(&err) => {
                info!(
                    tmdb_id = %self.film.tmdb_id,
                    ?action,
                    error = %err,
                    "aborted request already reached the server"
                );
                Ok(())
            }
            other => other,
        };
        Some(self.apply(doc, action, result))
    }

    /// Click and wait.
    pub async fn toggle(&mut self, doc: &mut Document) -> ClientResult<ListMembership> {
        self.click();
        match self.settle(doc).await {
            Some(result) => result,
            None => Err(ClientError::Superseded),
        }
    }

    fn apply(
        &mut self,
        doc: &mut Document,
        action: ToggleAction,
        result: ClientResult<()>,
    ) -> ClientResult<ListMembership> {
        match result {
            Ok(()) => {
                self.state = action.target();
                info!(tmdb_id = %self.film.tmdb_id, state = ?self.state, "list membership changed");
                self.render(doc)?;
                Ok(self.state)
            }
            Err(err) => {
                error!(tmdb_id = %self.film.tmdb_id, ?action, error = %err, "list toggle failed");
                doc.alert(format!(
                    "Error: {} failed.\n{}",
                    action.failure_title(),
                    err
                ));
                Err(err)
            }
        }
    }

    /// Replaces whatever list button the container holds with the one for
    /// the current state.
    pub fn render(&self, doc: &mut Document) -> ClientResult<()> {
        let container = doc
            .by_id(BUTTON_CONTAINER_ID)
            .ok_or_else(|| ClientError::missing_element(BUTTON_CONTAINER_ID))?;
        for id in [ADD_BUTTON_ID, REMOVE_BUTTON_ID] {
            while let Some(button) = doc.by_id(id) {
                doc.remove(button);
            }
        }
        append_button(doc, container, self.state);
        Ok(())
    }
}

impl Drop for ListToggleController {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}

pub(crate) fn append_button(
    doc: &mut Document,
    container: NodeId,
    membership: ListMembership,
) -> NodeId {
    let (id, label) = match membership {
        ListMembership::NotOnList => (ADD_BUTTON_ID, "Add to list"),
        ListMembership::OnList => (REMOVE_BUTTON_ID, "Remove film"),
    };
    let button = doc.append(
        container,
        ElementSpec::new("button")
            .id(id)
            .attr("type", "submit")
            .class("btn")
            .class("btn-secondary"),
    );
    doc.append(button, ElementSpec::new("h2").text(label));
    button
}

#[cfg(test)]
#[path = "tests/list_toggle_tests.rs"]
mod tests;
