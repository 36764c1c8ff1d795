//! Page skeletons and the hidden-field readers shared by the controllers.

use shared::domain::{parse_year, FilmRef, ListMembership, ReviewRequest, TmdbId};

use crate::{
    csrf::CSRF_META_NAME,
    dom::{Document, ElementSpec, NodeId},
    error::{ClientError, ClientResult},
    list_toggle::append_button,
};

pub const TMDB_ID_FIELD: &str = "tmdb-id";
pub const TITLE_FIELD: &str = "title";
pub const YEAR_FIELD: &str = "year";
pub const DATE_FIELD: &str = "date";
pub const ORIGINAL_TITLE_FIELD: &str = "original-title";

pub const BUTTON_CONTAINER_ID: &str = "button-container";
pub const REVIEW_CLASS: &str = "review";
pub const REVIEW_TEXT_CLASS: &str = "review-text";
pub const REVIEW_WARNING_ID: &str = "review-warning";

pub const SPINNER_CONTAINER_ID: &str = "spinner-container";
pub const CRITERION_TABLE_ID: &str = "criterion-table";
pub const TABLE_FOOTNOTE_ID: &str = "table-footnote-container";

pub const EMPTY_LIST_MESSAGE_ID: &str = "empty-list-message";
pub const TRASH_BUTTON_CLASS: &str = "trash-button";
pub const MOVIE_LINK_CLASS: &str = "movie-link";

fn field<'a>(doc: &'a Document, id: &str) -> Option<&'a str> {
    doc.by_id(id).and_then(|node| doc.value(node))
}

fn required_field(doc: &Document, id: &str) -> ClientResult<String> {
    field(doc, id)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ClientError::missing_element(id))
}

fn optional_field(doc: &Document, id: &str) -> String {
    field(doc, id).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Reads the film identity from the movie page's hidden inputs.
pub fn read_film(doc: &Document) -> ClientResult<FilmRef> {
    Ok(FilmRef {
        tmdb_id: TmdbId::new(required_field(doc, TMDB_ID_FIELD)?),
        title: required_field(doc, TITLE_FIELD)?,
        year: parse_year(&optional_field(doc, YEAR_FIELD)),
        release_date: optional_field(doc, DATE_FIELD),
        original_title: optional_field(doc, ORIGINAL_TITLE_FIELD),
    })
}

/// Review lookups only need the title fields and the release information.
pub fn read_review_request(doc: &Document) -> ClientResult<ReviewRequest> {
    let film = FilmRef {
        tmdb_id: TmdbId::new(optional_field(doc, TMDB_ID_FIELD)),
        title: required_field(doc, TITLE_FIELD)?,
        year: parse_year(&optional_field(doc, YEAR_FIELD)),
        release_date: optional_field(doc, DATE_FIELD),
        original_title: optional_field(doc, ORIGINAL_TITLE_FIELD),
    };
    Ok(ReviewRequest::from(&film))
}

/// `<html><head>` with the CSRF meta tag, returns the `body` node.
fn page_shell(doc: &mut Document, csrf_token: Option<&str>) -> NodeId {
    let html = doc.append(doc.root(), ElementSpec::new("html"));
    let head = doc.append(html, ElementSpec::new("head"));
    if let Some(token) = csrf_token {
        doc.append(
            head,
            ElementSpec::new("meta")
                .attr("name", CSRF_META_NAME)
                .attr("content", token),
        );
    }
    doc.append(html, ElementSpec::new("body"))
}

fn hidden_input(doc: &mut Document, parent: NodeId, id: &str, value: impl Into<String>) {
    doc.append(
        parent,
        ElementSpec::new("input")
            .id(id)
            .attr("type", "hidden")
            .attr("value", value),
    );
}

/// Movie page. `membership` is `None` for anonymous viewers, who get no button.
pub fn movie_page(
    film: &FilmRef,
    csrf_token: Option<&str>,
    membership: Option<ListMembership>,
) -> Document {
    let mut doc = Document::new();
    let body = page_shell(&mut doc, csrf_token);

    let year = if film.year > 0 {
        film.year.to_string()
    } else {
        String::new()
    };
    hidden_input(&mut doc, body, TMDB_ID_FIELD, film.tmdb_id.as_str());
    hidden_input(&mut doc, body, TITLE_FIELD, film.title.as_str());
    hidden_input(&mut doc, body, YEAR_FIELD, year);
    hidden_input(&mut doc, body, DATE_FIELD, film.release_date.as_str());
    hidden_input(&mut doc, body, ORIGINAL_TITLE_FIELD, film.original_title.as_str());

    doc.append(body, ElementSpec::new("h1").text(film.title.as_str()));
    let container = doc.append(body, ElementSpec::new("div").id(BUTTON_CONTAINER_ID));
    if let Some(membership) = membership {
        append_button(&mut doc, container, membership);
    }

    let review = doc.append(body, ElementSpec::new("div").class(REVIEW_CLASS));
    doc.append(review, ElementSpec::new("p").class(REVIEW_TEXT_CLASS));
    doc.append(body, ElementSpec::new("div").id(REVIEW_WARNING_ID));
    doc
}

/// Browse page: loading spinner, empty catalog table and its footnote.
pub fn browse_page() -> Document {
    let mut doc = Document::new();
    let body = page_shell(&mut doc, None);

    let spinner = doc.append(body, ElementSpec::new("div").id(SPINNER_CONTAINER_ID));
    doc.append(
        spinner,
        ElementSpec::new("div")
            .class("spinner-border")
            .attr("role", "status"),
    );

    let table = doc.append(
        body,
        ElementSpec::new("table")
            .id(CRITERION_TABLE_ID)
            .class("table"),
    );
    let thead = doc.append(table, ElementSpec::new("thead"));
    let header = doc.append(thead, ElementSpec::new("tr"));
    for label in ["Title", "Year", "Director(s)"] {
        doc.append(header, ElementSpec::new("th").text(label));
    }
    doc.append(table, ElementSpec::new("tbody"));

    let footnote = doc.append(body, ElementSpec::new("div").id(TABLE_FOOTNOTE_ID));
    doc.append(
        footnote,
        ElementSpec::new("small").text("Films from The Criterion Collection."),
    );
    doc
}

/// Saved-list page with one row per film.
pub fn saved_list_page(films: &[(TmdbId, String)], csrf_token: Option<&str>) -> Document {
    let mut doc = Document::new();
    let body = page_shell(&mut doc, csrf_token);

    doc.append(
        body,
        ElementSpec::new("p")
            .id(EMPTY_LIST_MESSAGE_ID)
            .text("Your list is empty."),
    );
    let table = doc.append(body, ElementSpec::new("table").id("list-table"));
    let tbody = doc.append(table, ElementSpec::new("tbody"));
    for (tmdb_id, title) in films {
        let row = doc.append(tbody, ElementSpec::new("tr"));
        let title_cell = doc.append(row, ElementSpec::new("td"));
        let link = doc.append(
            title_cell,
            ElementSpec::new("a")
                .class(MOVIE_LINK_CLASS)
                .attr("href", format!("/movie/{tmdb_id}"))
                .text(title.as_str()),
        );
        doc.append(link, ElementSpec::new("span").class("spinner-border"));
        let action_cell = doc.append(row, ElementSpec::new("td"));
        doc.append(
            action_cell,
            ElementSpec::new("button")
                .class(TRASH_BUTTON_CLASS)
                .attr("value", tmdb_id.as_str())
                .text("Remove"),
        );
    }
    doc
}

#[cfg(test)]
#[path = "tests/pages_tests.rs"]
mod tests;
