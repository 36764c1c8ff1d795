use std::cmp::Ordering;

use tracing::debug;

use crate::{
    dom::{Document, NodeId},
    error::{ClientError, ClientResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Title,
    Year,
    Directors,
}

impl SortColumn {
    fn index(self) -> usize {
        match self {
            Self::Title => 0,
            Self::Year => 1,
            Self::Directors => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Year => "year",
            Self::Directors => "directors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn name(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// Client-side sorting over the body rows of a table. No pagination.
#[derive(Debug, Clone)]
pub struct SortableTable {
    table: NodeId,
    tbody: NodeId,
    sorted_by: Option<(SortColumn, SortOrder)>,
}

impl SortableTable {
    pub fn mount(doc: &Document, table: NodeId) -> ClientResult<Self> {
        let tbody = doc
            .first_by_tag_within(table, "tbody")
            .ok_or_else(|| ClientError::missing_element("tbody"))?;
        Ok(Self {
            table,
            tbody,
            sorted_by: None,
        })
    }

    pub fn sorted_by(&self) -> Option<(SortColumn, SortOrder)> {
        self.sorted_by
    }

    /// Stable sort: rows with equal keys keep their current relative order.
    pub fn sort_by(&mut self, doc: &mut Document, column: SortColumn, order: SortOrder) {
        let mut rows: Vec<(NodeId, String)> = doc
            .children(self.tbody)
            .iter()
            .map(|row| (*row, cell_text(doc, *row, column.index())))
            .collect();

        rows.sort_by(|(_, a), (_, b)| {
            let ordering = compare_cells(column, a, b);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });

        doc.reorder_children(self.tbody, rows.into_iter().map(|(row, _)| row).collect());
        doc.set_attr(self.table, "data-sort-column", column.name());
        doc.set_attr(self.table, "data-sort-order", order.name());
        self.sorted_by = Some((column, order));
        debug!(column = column.name(), order = order.name(), "table sorted");
    }

    /// Header click: a new column sorts ascending, the current one flips.
    pub fn toggle(&mut self, doc: &mut Document, column: SortColumn) {
        let order = match self.sorted_by {
            Some((current, SortOrder::Ascending)) if current == column => SortOrder::Descending,
            _ => SortOrder::Ascending,
        };
        self.sort_by(doc, column, order);
    }
}

fn cell_text(doc: &Document, row: NodeId, index: usize) -> String {
    doc.all_by_tag_within(row, "td")
        .get(index)
        .map(|cell| doc.text_content(*cell))
        .unwrap_or_default()
}

fn compare_cells(column: SortColumn, a: &str, b: &str) -> Ordering {
    match column {
        SortColumn::Year => parse_year_cell(a).cmp(&parse_year_cell(b)),
        SortColumn::Title | SortColumn::Directors => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Blank or unparsable years sort first.
fn parse_year_cell(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

#[cfg(test)]
#[path = "tests/sortable_tests.rs"]
mod tests;
