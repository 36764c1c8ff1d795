//! NYT review panel on the movie page.

use std::sync::Arc;

use shared::domain::ReviewResult;
use tracing::{error, info};

use crate::{
    dom::{Document, ElementSpec, NodeId},
    error::{ClientError, ClientResult},
    pages::{read_review_request, REVIEW_CLASS, REVIEW_TEXT_CLASS, REVIEW_WARNING_ID},
    transport::CinescoutApi,
};

pub const CRITICS_PICK_MARKER: &str = " ⭐️";
/// Same glyph on the publication line and in front of the warning.
pub const WARNING_GLYPH: &str = "☂︎";
pub const REVIEW_WARNING_TEXT: &str = "Because the release and review years are different, \
     this movie review might be for another movie of a similar title.";
pub const REVIEW_ERROR_TEXT: &str = "An error has occurred. Please open console for more info.";
const PUBLICATION_CLASS: &str = "publication";

struct ReviewNodes {
    review: NodeId,
    text: NodeId,
    warning: NodeId,
}

fn locate(doc: &Document) -> ClientResult<ReviewNodes> {
    let review = doc
        .first_by_class(REVIEW_CLASS)
        .ok_or_else(|| ClientError::missing_element(REVIEW_CLASS))?;
    let text = doc
        .first_by_class(REVIEW_TEXT_CLASS)
        .ok_or_else(|| ClientError::missing_element(REVIEW_TEXT_CLASS))?;
    let warning = doc
        .by_id(REVIEW_WARNING_ID)
        .ok_or_else(|| ClientError::missing_element(REVIEW_WARNING_ID))?;
    Ok(ReviewNodes {
        review,
        text,
        warning,
    })
}

pub struct ReviewFetcher {
    api: Arc<dyn CinescoutApi>,
}

impl ReviewFetcher {
    pub fn new(api: Arc<dyn CinescoutApi>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self, doc: &mut Document) -> ClientResult<ReviewResult> {
        let nodes = locate(doc)?;
        let request = read_review_request(doc)?;
        info!(title = %request.title, release_year = request.release_year, "fetching review");

        match self.api.review(&request).await {
            Ok(result) => {
                render(doc, &nodes, &result);
                Ok(result)
            }
            Err(err) => {
                error!(title = %request.title, error = %err, "review request failed");
                doc.set_text(nodes.text, REVIEW_ERROR_TEXT);
                doc.alert(format!("Error: could not load review.\n{err}"));
                Err(err)
            }
        }
    }
}

fn render(doc: &mut Document, nodes: &ReviewNodes, result: &ReviewResult) {
    match result {
        ReviewResult::NotFound { message } => {
            doc.set_text(nodes.text, message.as_str());
        }
        ReviewResult::Found {
            review_text,
            critics_pick,
            publication_date,
            review_warning,
        } => {
            doc.set_text(nodes.text, review_text.as_str());

            if *critics_pick {
                doc.append(
                    nodes.review,
                    ElementSpec::new("span")
                        .attr("title", "Critic's Pick")
                        .text(CRITICS_PICK_MARKER),
                );
            }

            doc.append(nodes.review, ElementSpec::new("br"));
            let publication = doc.append(
                nodes.review,
                ElementSpec::new("span")
                    .class(PUBLICATION_CLASS)
                    .text(format!("New York Times, {publication_date}")),
            );

            if *review_warning {
                doc.append(
                    publication,
                    ElementSpec::new("sup").text(format!(" {WARNING_GLYPH}")),
                );
                doc.append(
                    nodes.warning,
                    ElementSpec::new("sup").text(format!("{WARNING_GLYPH} ")),
                );
                doc.append(nodes.warning, ElementSpec::new("em").text(REVIEW_WARNING_TEXT));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/review_tests.rs"]
mod tests;
