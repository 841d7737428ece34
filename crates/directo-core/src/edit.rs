//! Edit operations, serialized as Docs API batch-update requests

use crate::document::Span;
use serde::{Deserialize, Serialize};

/// A single positional edit against a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditOperation {
    InsertTable(InsertTable),
    InsertTableRow(InsertTableRow),
    InsertText(InsertText),
    UpdateTextStyle(UpdateTextStyle),
    UpdateParagraphStyle(UpdateParagraphStyle),
}

impl EditOperation {
    /// Append a `rows` x `columns` table at the end of the body
    pub fn insert_table(rows: usize, columns: usize) -> Self {
        Self::InsertTable(InsertTable {
            rows,
            columns,
            end_of_segment_location: EndOfSegmentLocation::default(),
        })
    }

    /// Insert a row below `row_index` of the table starting at `table_start`
    pub fn insert_row_below(table_start: usize, row_index: usize) -> Self {
        Self::InsertTableRow(InsertTableRow {
            table_cell_location: TableCellLocation {
                table_start_location: Location { index: table_start },
                row_index,
                column_index: 0,
            },
            insert_below: true,
        })
    }

    pub fn insert_text(text: impl Into<String>, index: usize) -> Self {
        Self::InsertText(InsertText {
            text: text.into(),
            location: Location { index },
        })
    }

    pub fn text_style(style: TextStyle, span: Span) -> Self {
        Self::UpdateTextStyle(UpdateTextStyle {
            fields: style.field_mask(),
            text_style: style,
            range: Range::from(span),
        })
    }

    pub fn paragraph_style(style: ParagraphStyle, span: Span) -> Self {
        Self::UpdateParagraphStyle(UpdateParagraphStyle {
            fields: style.field_mask(),
            paragraph_style: style,
            range: Range::from(span),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub index: usize,
}

/// Empty segment id means the document body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndOfSegmentLocation {
    #[serde(default)]
    pub segment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTable {
    pub rows: usize,
    pub columns: usize,
    pub end_of_segment_location: EndOfSegmentLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellLocation {
    pub table_start_location: Location,
    pub row_index: usize,
    pub column_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTableRow {
    pub table_cell_location: TableCellLocation,
    pub insert_below: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub text: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: usize,
    pub end_index: usize,
}

impl From<Span> for Range {
    fn from(span: Span) -> Self {
        Self {
            start_index: span.start,
            end_index: span.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    pub text_style: TextStyle,
    /// Comma separated names of the style fields being changed
    pub fields: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyle {
    pub paragraph_style: ParagraphStyle,
    pub fields: String,
    pub range: Range,
}

/// A size in points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub magnitude: f64,
    pub unit: String,
}

impl Dimension {
    pub fn points(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: "PT".to_string(),
        }
    }
}

/// Character formatting; only the fields that are set get changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
}

impl TextStyle {
    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Self::default()
        }
    }

    /// Names of the set fields, in API spelling
    pub fn field_mask(&self) -> String {
        [
            ("bold", self.bold.is_some()),
            ("italic", self.italic.is_some()),
            ("underline", self.underline.is_some()),
            ("fontSize", self.font_size.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect::<Vec<_>>()
        .join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NamedStyleType {
    NormalText,
    Title,
    Subtitle,
    #[serde(rename = "HEADING_1")]
    Heading1,
    #[serde(rename = "HEADING_2")]
    Heading2,
    #[serde(rename = "HEADING_3")]
    Heading3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Alignment {
    Start,
    Center,
    End,
    Justified,
}

/// Paragraph formatting; only the fields that are set get changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_style_type: Option<NamedStyleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_above: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_below: Option<Dimension>,
}

impl ParagraphStyle {
    pub fn field_mask(&self) -> String {
        [
            ("namedStyleType", self.named_style_type.is_some()),
            ("alignment", self.alignment.is_some()),
            ("spaceAbove", self.space_above.is_some()),
            ("spaceBelow", self.space_below.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect::<Vec<_>>()
        .join(",")
    }
}
