//! Criterion catalog table on the browse page.

use std::{sync::Arc, time::Duration};

use shared::domain::{CatalogListing, CatalogRow};
use tracing::{error, info};
use url::form_urlencoded;

use crate::{
    dom::{Document, ElementSpec, NodeId},
    error::{ClientError, ClientResult},
    pages::{CRITERION_TABLE_ID, SPINNER_CONTAINER_ID, TABLE_FOOTNOTE_ID},
    sortable::{SortColumn, SortOrder, SortableTable},
    transport::CinescoutApi,
};

/// Directors are often better known for something other than directing.
const DIRECTOR_KNOWN_FOR: &str = "All";
const DIRECTOR_SEPARATOR: &str = " & ";

struct TableNodes {
    footnote: NodeId,
    spinner: NodeId,
    table: NodeId,
    tbody: NodeId,
}

fn locate(doc: &Document) -> ClientResult<TableNodes> {
    let by_id = |id: &str| doc.by_id(id).ok_or_else(|| ClientError::missing_element(id));
    let table = by_id(CRITERION_TABLE_ID)?;
    Ok(TableNodes {
        footnote: by_id(TABLE_FOOTNOTE_ID)?,
        spinner: by_id(SPINNER_CONTAINER_ID)?,
        table,
        tbody: doc
            .first_by_tag_within(table, "tbody")
            .ok_or_else(|| ClientError::missing_element("tbody"))?,
    })
}

pub struct CriterionTableLoader {
    api: Arc<dyn CinescoutApi>,
    spinner_delay: Duration,
}

impl CriterionTableLoader {
    pub fn new(api: Arc<dyn CinescoutApi>, spinner_delay: Duration) -> Self {
        Self { api, spinner_delay }
    }

    /// Shows the spinner for the fixed delay, then fetches and renders the
    /// catalog. The returned table is already sorted by year.
    pub async fn load(&self, doc: &mut Document) -> ClientResult<SortableTable> {
        let nodes = locate(doc)?;
        doc.set_hidden(nodes.footnote, true);
        doc.set_collapsed(nodes.spinner, false);

        tokio::time::sleep(self.spinner_delay).await;
        let result = self.api.catalog().await;
        doc.set_collapsed(nodes.spinner, true);

        let listing = match result {
            Ok(listing) => listing,
            Err(err) => {
                error!(error = %err, "catalog request failed");
                doc.alert(format!("Error: could not load films.\n{err}"));
                return Err(err);
            }
        };

        render_listing(doc, nodes.tbody, &listing);
        info!(
            rows = listing.results.len(),
            num_results = listing.num_results,
            "catalog table rendered"
        );
        doc.set_hidden(nodes.footnote, false);

        let mut table = SortableTable::mount(doc, nodes.table)?;
        table.sort_by(doc, SortColumn::Year, SortOrder::Ascending);
        Ok(table)
    }
}

fn render_listing(doc: &mut Document, tbody: NodeId, listing: &CatalogListing) {
    for film in &listing.results {
        render_row(doc, tbody, film);
    }
}

fn render_row(doc: &mut Document, tbody: NodeId, film: &CatalogRow) -> NodeId {
    let row = doc.append(tbody, ElementSpec::new("tr"));

    let title_cell = doc.append(row, ElementSpec::new("td"));
    doc.append(
        title_cell,
        ElementSpec::new("a")
            .attr("href", movie_href(film))
            .class("text-white")
            .text(film.title.as_str()),
    );

    let year = if film.year > 0 {
        film.year.to_string()
    } else {
        String::new()
    };
    doc.append(row, ElementSpec::new("td").text(year));

    let directors_cell = doc.append(row, ElementSpec::new("td"));
    for (i, director) in film.directors.iter().enumerate() {
        if i > 0 {
            doc.append_text(directors_cell, DIRECTOR_SEPARATOR);
        }
        doc.append(
            directors_cell,
            ElementSpec::new("a")
                .attr("href", director_href(director))
                .class("text-white")
                .text(director.as_str()),
        );
    }
    row
}

pub fn movie_href(film: &CatalogRow) -> String {
    format!("/movie/{}", film.tmdb_id)
}

pub fn director_href(director: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("name", director)
        .append_pair("known_for", DIRECTOR_KNOWN_FOR)
        .finish();
    format!("/person-search?{query}")
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
