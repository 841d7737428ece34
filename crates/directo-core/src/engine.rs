//! Table mutation engine
//!
//! Grows a single append-only table at the end of a document and fills it
//! row by row. Every edit that can change lengths is followed by a fresh
//! snapshot; offsets are never carried across a submitted batch.
//!
//! A build runs through these states:
//!
//! - [`DocumentSession::create`] creates the document.
//! - [`DocumentSession::create_table`] appends a one-row table and hands out a
//!   [`TableBuilder`] that borrows the session exclusively, so no other
//!   operation can touch the document while the table is active.
//! - [`TableBuilder::fill_last_row`] and [`TableBuilder::append_row`]
//!   alternate; filling a row that was already filled is an error.
//! - [`DocumentSession::finish`] ends the session and returns the document id.

use crate::dispatch::BatchDispatcher;
use crate::document::{Document, Span, TableSnapshot};
use crate::edit::{EditOperation, ParagraphStyle, TextStyle};
use crate::error::{Error, Result};
use crate::service::DocumentService;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Filler for cells with no data; the service rejects empty insertions
pub const PLACEHOLDER: &str = "\n";

/// The text destined for one cell, one item per insertion, top to bottom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextGroup(Vec<String>);

impl TextGroup {
    pub fn new(items: Vec<String>) -> Self {
        Self(items)
    }

    pub fn single(text: impl Into<String>) -> Self {
        Self(vec![text.into()])
    }

    pub fn placeholder() -> Self {
        Self::single(PLACEHOLDER)
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }
}

/// Split `groups` into row fill units of exactly `column_count` groups
///
/// Only the final unit is padded, with [`TextGroup::placeholder`].
pub fn row_fill_units(groups: Vec<TextGroup>, column_count: usize) -> Vec<Vec<TextGroup>> {
    if column_count == 0 {
        return Vec::new();
    }
    let mut units: Vec<Vec<TextGroup>> = groups
        .chunks(column_count)
        .map(|chunk| chunk.to_vec())
        .collect();
    if let Some(last) = units.last_mut() {
        last.resize(column_count, TextGroup::placeholder());
    }
    units
}

/// Plan the inserts that fill one row, given each cell's append point
///
/// Pairs are built in natural (column, item) order and returned reversed, so
/// each insert lands at or before every insert already applied and no
/// precomputed offset is invalidated. Items of one cell share an offset; in
/// reverse they stack up in their original top-to-bottom order.
pub fn plan_row_fill(append_points: &[usize], unit: &[TextGroup]) -> Result<Vec<EditOperation>> {
    if append_points.len() != unit.len() {
        return Err(Error::ColumnMismatch {
            expected: append_points.len(),
            found: unit.len(),
        });
    }

    let mut inserts = Vec::new();
    for (&offset, group) in append_points.iter().zip(unit) {
        for text in group.items() {
            if text.is_empty() {
                return Err(Error::EmptyText(offset));
            }
            inserts.push(EditOperation::insert_text(text.clone(), offset));
        }
    }
    inserts.reverse();
    Ok(inserts)
}

/// One document build against a document service
pub struct DocumentSession<S: DocumentService> {
    service: S,
    dispatcher: BatchDispatcher,
    document_id: String,
}

impl<S: DocumentService> DocumentSession<S> {
    /// Create a new, empty document
    pub fn create(mut service: S, dispatcher: BatchDispatcher, title: &str) -> Result<Self> {
        let document_id = service.create(title)?;
        info!("created document {} '{}'", document_id, title);
        Ok(Self::open(service, dispatcher, document_id))
    }

    /// Continue building an existing document
    pub fn open(service: S, dispatcher: BatchDispatcher, document_id: impl Into<String>) -> Self {
        Self {
            service,
            dispatcher,
            document_id: document_id.into(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Fetch the current document structure
    pub fn snapshot(&mut self) -> Result<Document> {
        self.service.get_snapshot(&self.document_id)
    }

    /// Submit edits through the dispatcher
    pub fn submit(&mut self, operations: &[EditOperation]) -> Result<()> {
        self.dispatcher
            .submit(&mut self.service, &self.document_id, operations)
    }

    /// Append a one-row table of `columns` columns and make it the active table
    pub fn create_table(&mut self, columns: usize) -> Result<TableBuilder<'_, S>> {
        self.submit(&[EditOperation::insert_table(1, columns)])?;
        let document = self.snapshot()?;
        let table = TableSnapshot::locate(&document)
            .ok_or_else(|| Error::TableNotFound(self.document_id.clone()))?;
        info!(
            "table with {} columns active at index {} in {}",
            table.column_count, table.start_offset, self.document_id
        );
        Ok(TableBuilder {
            session: self,
            table,
            last_row_filled: false,
        })
    }

    /// End the build and return the document id
    pub fn finish(self) -> String {
        self.document_id
    }

    /// End the build and return the service along with the document id
    pub fn into_parts(self) -> (S, String) {
        (self.service, self.document_id)
    }
}

/// Exclusive handle on the active table of a [`DocumentSession`]
pub struct TableBuilder<'a, S: DocumentService> {
    session: &'a mut DocumentSession<S>,
    table: TableSnapshot,
    last_row_filled: bool,
}

impl<S: DocumentService> TableBuilder<'_, S> {
    /// Structure of the table as of the last refresh
    pub fn snapshot(&self) -> &TableSnapshot {
        &self.table
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count
    }

    /// Re-read the table from the document
    ///
    /// A snapshot without a readable table keeps the previous table state:
    /// some batches touch the document without reshaping the active table.
    ///
    /// Returns whether a new snapshot was installed.
    fn refresh(&mut self) -> Result<bool> {
        let document = self.session.snapshot()?;
        match TableSnapshot::locate(&document) {
            Some(table) => {
                self.table = table;
                Ok(true)
            }
            None => {
                debug!(
                    "no table in {} after refresh, keeping previous snapshot",
                    self.session.document_id
                );
                Ok(false)
            }
        }
    }

    /// Insert an empty row below the current last row
    ///
    /// The row counts as fillable only once a refreshed snapshot shows it.
    /// Otherwise the fill state is left alone, so a following
    /// [`fill_last_row`](Self::fill_last_row) cannot land in the old row.
    pub fn append_row(&mut self) -> Result<()> {
        let row_index = self.table.last_row_index();
        let rows_before = self.table.row_count;
        self.session.submit(&[EditOperation::insert_row_below(
            self.table.start_offset,
            row_index,
        )])?;
        if self.refresh()? && self.table.row_count > rows_before {
            self.last_row_filled = false;
            debug!("appended row {} to table at {}", row_index + 1, self.table.start_offset);
        } else {
            debug!(
                "appended row not visible in {}, last row stays as it was",
                self.session.document_id
            );
        }
        Ok(())
    }

    /// Insert one text group into each cell of the last row
    pub fn fill_last_row(&mut self, unit: &[TextGroup]) -> Result<()> {
        let row_index = self.table.last_row_index();
        if self.last_row_filled {
            return Err(Error::RowAlreadyFilled(row_index));
        }
        if unit.len() != self.table.column_count {
            return Err(Error::ColumnMismatch {
                expected: self.table.column_count,
                found: unit.len(),
            });
        }

        let inserts = plan_row_fill(&self.table.last_row_append_points(), unit)?;
        self.session.submit(&inserts)?;
        self.refresh()?;
        self.last_row_filled = true;
        debug!("filled row {} with {} inserts", row_index, inserts.len());
        Ok(())
    }

    /// Fill the table from a flat, column-ordered list of groups
    ///
    /// Rows are appended as needed so that each unit fills a fresh last row.
    pub fn fill_table(&mut self, groups: Vec<TextGroup>) -> Result<()> {
        let units = row_fill_units(groups, self.table.column_count);
        info!(
            "filling {} rows of {} columns",
            units.len(),
            self.table.column_count
        );
        for unit in &units {
            if self.last_row_filled {
                self.append_row()?;
            }
            self.fill_last_row(unit)?;
        }
        Ok(())
    }

    fn cell_spans(&self, first_paragraph_only: bool) -> Vec<Span> {
        self.table
            .cells()
            .map(|cell| {
                if first_paragraph_only {
                    cell.first_paragraph()
                } else {
                    cell.whole()
                }
            })
            .collect()
    }

    /// Apply a text style to every cell, or to each cell's first paragraph
    pub fn apply_text_style(&mut self, style: &TextStyle, first_paragraph_only: bool) -> Result<()> {
        let edits: Vec<EditOperation> = self
            .cell_spans(first_paragraph_only)
            .into_iter()
            .map(|span| EditOperation::text_style(style.clone(), span))
            .collect();
        self.session.submit(&edits)
    }

    /// Apply a paragraph style to every cell, or to each cell's first paragraph
    pub fn apply_paragraph_style(
        &mut self,
        style: &ParagraphStyle,
        first_paragraph_only: bool,
    ) -> Result<()> {
        let edits: Vec<EditOperation> = self
            .cell_spans(first_paragraph_only)
            .into_iter()
            .map(|span| EditOperation::paragraph_style(style.clone(), span))
            .collect();
        self.session.submit(&edits)
    }
}
