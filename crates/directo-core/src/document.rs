//! Document structure snapshots, shaped like the Docs API JSON
//!
//! Offsets are flat indexes into the document body counted in UTF-16 code
//! units. Every insertion shifts the offsets of everything after it, so a
//! snapshot is only valid until the next edit is submitted.

use serde::{Deserialize, Serialize};

/// Length of a string in document index units
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Body,
}

impl Document {
    /// The last top-level table; tables are only ever appended
    pub fn last_table(&self) -> Option<(&StructuralElement, &Table)> {
        self.body
            .content
            .iter()
            .rev()
            .find_map(|element| element.table.as_ref().map(|table| (element, table)))
    }

    /// End index of the body, one past the final newline
    pub fn end_index(&self) -> usize {
        self.body.content.last().map_or(1, |e| e.end_index)
    }

    /// Concatenated text of every paragraph, tables included, in document order
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for element in &self.body.content {
            element.collect_text(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    /// Omitted by the API for the leading section break
    #[serde(default)]
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<Paragraph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_break: Option<serde_json::Value>,
}

impl StructuralElement {
    fn collect_text(&self, out: &mut String) {
        if let Some(paragraph) = &self.paragraph {
            for element in &paragraph.elements {
                if let Some(run) = &element.text_run {
                    out.push_str(&run.content);
                }
            }
        }
        if let Some(table) = &self.table {
            for row in &table.table_rows {
                for cell in &row.table_cells {
                    for element in &cell.content {
                        element.collect_text(out);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    #[serde(default)]
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub rows: usize,
    pub columns: usize,
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

/// A half-open `[start, end)` interval of document offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The paragraphs of one table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSnapshot {
    /// Paragraph spans in top-to-bottom order; never empty
    pub paragraphs: Vec<Span>,
}

impl CellSnapshot {
    /// Offset just before the last paragraph's trailing newline
    pub fn append_point(&self) -> usize {
        self.last_paragraph().end - 1
    }

    pub fn first_paragraph(&self) -> Span {
        self.paragraphs[0]
    }

    pub fn last_paragraph(&self) -> Span {
        self.paragraphs[self.paragraphs.len() - 1]
    }

    /// From the first paragraph's start to the last paragraph's end
    pub fn whole(&self) -> Span {
        Span::new(self.first_paragraph().start, self.last_paragraph().end)
    }
}

/// Value copy of a table's structure at one document version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    pub start_offset: usize,
    pub row_count: usize,
    pub column_count: usize,
    pub rows: Vec<Vec<CellSnapshot>>,
}

impl TableSnapshot {
    /// Capture the structure of a table element
    ///
    /// Cells without paragraphs are not produced by the Docs API; if one shows
    /// up the table is treated as unreadable.
    pub fn from_element(element: &StructuralElement, table: &Table) -> Option<Self> {
        let rows = table
            .table_rows
            .iter()
            .map(|row| {
                row.table_cells
                    .iter()
                    .map(|cell| {
                        let paragraphs: Vec<Span> = cell
                            .content
                            .iter()
                            .filter(|e| e.paragraph.is_some())
                            .map(|e| Span::new(e.start_index, e.end_index))
                            .collect();
                        (!paragraphs.is_empty()).then_some(CellSnapshot { paragraphs })
                    })
                    .collect::<Option<Vec<_>>>()
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            start_offset: element.start_index,
            row_count: table.rows,
            column_count: table.columns,
            rows,
        })
    }

    /// Snapshot of the last table in `document`, if there is one
    pub fn locate(document: &Document) -> Option<Self> {
        let (element, table) = document.last_table()?;
        Self::from_element(element, table)
    }

    pub fn last_row_index(&self) -> usize {
        self.row_count.saturating_sub(1)
    }

    pub fn last_row(&self) -> Option<&[CellSnapshot]> {
        self.rows.last().map(Vec::as_slice)
    }

    /// Append points of the last row, left to right
    pub fn last_row_append_points(&self) -> Vec<usize> {
        self.last_row()
            .map(|cells| cells.iter().map(CellSnapshot::append_point).collect())
            .unwrap_or_default()
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellSnapshot> {
        self.rows.iter().flatten()
    }
}
