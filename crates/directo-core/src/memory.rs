//! In-process document service
//!
//! Keeps documents as a list of text runs and tables and lays them out with
//! the same index arithmetic the Docs API uses: a one-unit section break at
//! the top, one structural unit at the start of every table, row and cell,
//! and one at the end of every table. Text is measured in UTF-16 code units.
//! Batches are applied atomically: an invalid edit leaves the document as it
//! was before the batch.

use crate::document::{
    utf16_len, Body, Document, Paragraph, ParagraphElement, StructuralElement, Table, TableCell,
    TableRow, TextRun,
};
use crate::edit::{EditOperation, Range};
use crate::error::{Error, Result};
use crate::service::DocumentService;
use log::debug;
use std::collections::BTreeMap;

/// A batch as it was received
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedBatch {
    pub document_id: String,
    pub operations: Vec<EditOperation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    /// One or more paragraphs, each ending in `\n`
    Text(String),
    Table(TableBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableBlock {
    /// Row-major cells; each cell holds its paragraphs as one `\n`-terminated string
    rows: Vec<Vec<String>>,
}

impl TableBlock {
    fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![vec!["\n".to_string(); columns]; rows],
        }
    }

    fn index_len(&self) -> usize {
        2 + self
            .rows
            .iter()
            .map(|row| 1 + row.iter().map(|cell| 1 + utf16_len(cell)).sum::<usize>())
            .sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoryDocument {
    title: String,
    blocks: Vec<Block>,
}

impl MemoryDocument {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            blocks: vec![Block::Text("\n".to_string())],
        }
    }

    fn end_index(&self) -> usize {
        1 + self
            .blocks
            .iter()
            .map(|block| match block {
                Block::Text(text) => utf16_len(text),
                Block::Table(table) => table.index_len(),
            })
            .sum::<usize>()
    }

    /// The paragraph text holding `index`, and the index where that text starts
    fn text_at(&mut self, index: usize) -> Option<(&mut String, usize)> {
        let mut idx = 1;
        for block in self.blocks.iter_mut() {
            match block {
                Block::Text(text) => {
                    let len = utf16_len(text);
                    if idx <= index && index < idx + len {
                        return Some((text, idx));
                    }
                    idx += len;
                }
                Block::Table(table) => {
                    idx += 1;
                    for row in table.rows.iter_mut() {
                        idx += 1;
                        for cell in row.iter_mut() {
                            idx += 1;
                            let len = utf16_len(cell);
                            if idx <= index && index < idx + len {
                                return Some((cell, idx));
                            }
                            idx += len;
                        }
                    }
                    idx += 1;
                }
            }
        }
        None
    }

    fn table_at(&mut self, index: usize) -> Option<&mut TableBlock> {
        let mut idx = 1;
        for block in self.blocks.iter_mut() {
            match block {
                Block::Text(text) => idx += utf16_len(text),
                Block::Table(table) => {
                    let len = table.index_len();
                    if idx == index {
                        return Some(table);
                    }
                    idx += len;
                }
            }
        }
        None
    }

    fn apply(&mut self, operation: &EditOperation) -> Result<()> {
        match operation {
            EditOperation::InsertTable(insert) => {
                if insert.rows == 0 || insert.columns == 0 {
                    return Err(Error::InvalidEdit(format!(
                        "table must have at least one row and column, got {}x{}",
                        insert.rows, insert.columns
                    )));
                }
                self.blocks
                    .push(Block::Table(TableBlock::new(insert.rows, insert.columns)));
                self.blocks.push(Block::Text("\n".to_string()));
                Ok(())
            }
            EditOperation::InsertTableRow(insert) => {
                let location = insert.table_cell_location;
                let start = location.table_start_location.index;
                let table = self
                    .table_at(start)
                    .ok_or_else(|| Error::InvalidEdit(format!("no table starts at index {}", start)))?;
                let columns = table
                    .rows
                    .get(location.row_index)
                    .map(Vec::len)
                    .ok_or_else(|| {
                        Error::InvalidEdit(format!(
                            "row {} is out of range for table at {}",
                            location.row_index, start
                        ))
                    })?;
                let at = if insert.insert_below {
                    location.row_index + 1
                } else {
                    location.row_index
                };
                table.rows.insert(at, vec!["\n".to_string(); columns]);
                Ok(())
            }
            EditOperation::InsertText(insert) => {
                let index = insert.location.index;
                if insert.text.is_empty() {
                    return Err(Error::InvalidEdit(format!("empty text at index {}", index)));
                }
                let (text, start) = self.text_at(index).ok_or_else(|| {
                    Error::InvalidEdit(format!("index {} is not inside a paragraph", index))
                })?;
                let byte = byte_offset(text, index - start).ok_or_else(|| {
                    Error::InvalidEdit(format!("index {} splits a character", index))
                })?;
                text.insert_str(byte, &insert.text);
                Ok(())
            }
            EditOperation::UpdateTextStyle(update) => self.check_style(&update.fields, update.range),
            EditOperation::UpdateParagraphStyle(update) => {
                self.check_style(&update.fields, update.range)
            }
        }
    }

    fn check_style(&self, fields: &str, range: Range) -> Result<()> {
        if fields.is_empty() {
            return Err(Error::InvalidEdit("style update with empty field mask".to_string()));
        }
        if range.start_index >= range.end_index || range.end_index > self.end_index() {
            return Err(Error::InvalidEdit(format!(
                "style range {}..{} is outside the document",
                range.start_index, range.end_index
            )));
        }
        Ok(())
    }

    fn to_document(&self, document_id: &str) -> Document {
        let mut content = vec![StructuralElement {
            start_index: 0,
            end_index: 1,
            section_break: Some(serde_json::json!({})),
            ..StructuralElement::default()
        }];

        let mut idx = 1;
        for block in &self.blocks {
            match block {
                Block::Text(text) => content.extend(paragraphs(text, &mut idx)),
                Block::Table(table) => content.push(table_element(table, &mut idx)),
            }
        }

        Document {
            document_id: document_id.to_string(),
            title: self.title.clone(),
            body: Body { content },
        }
    }
}

/// Byte offset of the `units`-th UTF-16 code unit in `text`
fn byte_offset(text: &str, units: usize) -> Option<usize> {
    let mut seen = 0;
    for (byte, c) in text.char_indices() {
        if seen == units {
            return Some(byte);
        }
        seen += c.len_utf16();
    }
    (seen == units).then_some(text.len())
}

fn paragraphs(text: &str, idx: &mut usize) -> Vec<StructuralElement> {
    text.split_inclusive('\n')
        .map(|paragraph| {
            let start = *idx;
            *idx += utf16_len(paragraph);
            StructuralElement {
                start_index: start,
                end_index: *idx,
                paragraph: Some(Paragraph {
                    elements: vec![ParagraphElement {
                        start_index: start,
                        end_index: *idx,
                        text_run: Some(TextRun {
                            content: paragraph.to_string(),
                        }),
                    }],
                }),
                ..StructuralElement::default()
            }
        })
        .collect()
}

fn table_element(table: &TableBlock, idx: &mut usize) -> StructuralElement {
    let start = *idx;
    *idx += 1;

    let table_rows = table
        .rows
        .iter()
        .map(|row| {
            let row_start = *idx;
            *idx += 1;
            let table_cells = row
                .iter()
                .map(|cell| {
                    let cell_start = *idx;
                    *idx += 1;
                    let content = paragraphs(cell, idx);
                    TableCell {
                        start_index: cell_start,
                        end_index: *idx,
                        content,
                    }
                })
                .collect();
            TableRow {
                start_index: row_start,
                end_index: *idx,
                table_cells,
            }
        })
        .collect();

    *idx += 1;
    StructuralElement {
        start_index: start,
        end_index: *idx,
        table: Some(Table {
            rows: table.rows.len(),
            columns: table.rows.first().map_or(0, Vec::len),
            table_rows,
        }),
        ..StructuralElement::default()
    }
}

/// Document service that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryDocumentService {
    documents: BTreeMap<String, MemoryDocument>,
    batches: Vec<SubmittedBatch>,
    next_id: usize,
}

impl MemoryDocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch received, in submission order
    pub fn batches(&self) -> &[SubmittedBatch] {
        &self.batches
    }

    /// Total edits received across all batches
    pub fn edit_count(&self) -> usize {
        self.batches.iter().map(|b| b.operations.len()).sum()
    }

    /// Current structure of a document, if it exists
    pub fn document(&self, document_id: &str) -> Option<Document> {
        self.documents
            .get(document_id)
            .map(|doc| doc.to_document(document_id))
    }
}

impl DocumentService for MemoryDocumentService {
    fn create(&mut self, title: &str) -> Result<String> {
        self.next_id += 1;
        let id = format!("memory-{}", self.next_id);
        self.documents.insert(id.clone(), MemoryDocument::new(title));
        debug!("created in-memory document {} '{}'", id, title);
        Ok(id)
    }

    fn get_snapshot(&mut self, document_id: &str) -> Result<Document> {
        self.document(document_id)
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))
    }

    fn batch_edit(&mut self, document_id: &str, operations: &[EditOperation]) -> Result<()> {
        let document = self
            .documents
            .get(document_id)
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))?;

        let mut staged = document.clone();
        for operation in operations {
            staged.apply(operation)?;
        }

        self.documents.insert(document_id.to_string(), staged);
        self.batches.push(SubmittedBatch {
            document_id: document_id.to_string(),
            operations: operations.to_vec(),
        });
        Ok(())
    }
}
