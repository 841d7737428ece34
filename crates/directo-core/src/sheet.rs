//! Spreadsheet ranges, readers and header-keyed row records

use crate::error::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A rectangular window into one tab of a spreadsheet, in A1 terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRange {
    pub tab: String,
    pub col_start: String,
    pub col_end: String,
    /// First row, 1-based
    pub row_start: u32,
    /// Last row, 1-based and inclusive; `None` reads to the last populated row
    pub row_end: Option<u32>,
}

impl SheetRange {
    pub fn new(
        tab: impl Into<String>,
        col_start: impl Into<String>,
        col_end: impl Into<String>,
        row_start: u32,
        row_end: Option<u32>,
    ) -> Self {
        Self {
            tab: tab.into(),
            col_start: col_start.into(),
            col_end: col_end.into(),
            row_start,
            row_end,
        }
    }

    /// Zero-based, end-exclusive column span
    pub fn column_span(&self) -> Result<(usize, usize)> {
        let start = column_number(&self.col_start).ok_or_else(|| self.invalid("bad start column"))?;
        let end = column_number(&self.col_end).ok_or_else(|| self.invalid("bad end column"))?;
        if end < start {
            return Err(self.invalid("end column precedes start column"));
        }
        Ok((start - 1, end))
    }

    /// Zero-based, end-exclusive row span; `None` end means open-ended
    pub fn row_span(&self) -> Result<(usize, Option<usize>)> {
        if self.row_start == 0 {
            return Err(self.invalid("rows are 1-based"));
        }
        match self.row_end {
            Some(end) if end < self.row_start => Err(self.invalid("end row precedes start row")),
            end => Ok((self.row_start as usize - 1, end.map(|e| e as usize))),
        }
    }

    fn invalid(&self, message: &str) -> Error {
        Error::InvalidRange {
            range: self.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{}:{}",
            self.tab, self.col_start, self.row_start, self.col_end
        )?;
        if let Some(end) = self.row_end {
            write!(f, "{}", end)?;
        }
        Ok(())
    }
}

/// Convert a column label ("A", "AD") into its 1-based number
pub fn column_number(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    label.chars().try_fold(0usize, |acc, c| {
        let c = c.to_ascii_uppercase();
        if c.is_ascii_uppercase() {
            Some(acc * 26 + (c as usize - 'A' as usize + 1))
        } else {
            None
        }
    })
}

/// Where a header row and its data rows live within a sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub tab: String,
    pub col_start: String,
    pub col_end: String,
    pub header_row: u32,
    pub data_row_start: u32,
    #[serde(default)]
    pub data_row_end: Option<u32>,
}

impl SheetLayout {
    pub fn header_range(&self) -> SheetRange {
        SheetRange::new(
            self.tab.clone(),
            self.col_start.clone(),
            self.col_end.clone(),
            self.header_row,
            Some(self.header_row),
        )
    }

    pub fn data_range(&self) -> SheetRange {
        SheetRange::new(
            self.tab.clone(),
            self.col_start.clone(),
            self.col_end.clone(),
            self.data_row_start,
            self.data_row_end,
        )
    }
}

/// Reads a rectangular block of string cells from a spreadsheet
///
/// Trailing empty cells and trailing empty rows may be omitted by the
/// implementation, the same way the Sheets API does.
pub trait SheetReader {
    fn read_range(&self, sheet_id: &str, range: &SheetRange) -> Result<Vec<Vec<String>>>;
}

/// A header row plus the data rows beneath it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetData {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Sheet row number of `rows[0]`, used in error messages
    pub first_row: usize,
}

impl SheetData {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            header,
            rows,
            first_row: 2,
        }
    }

    /// Read the header and data ranges described by `layout`
    pub fn read<R: SheetReader + ?Sized>(
        reader: &R,
        sheet_id: &str,
        layout: &SheetLayout,
    ) -> Result<Self> {
        let header_range = layout.header_range();
        let header = reader
            .read_range(sheet_id, &header_range)?
            .into_iter()
            .next()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::InvalidRange {
                range: header_range.to_string(),
                message: "no header row".to_string(),
            })?;

        let rows = reader.read_range(sheet_id, &layout.data_range())?;
        debug!(
            "read {} data rows from {} ({} columns)",
            rows.len(),
            layout.tab,
            header.len()
        );

        Ok(Self {
            header,
            rows,
            first_row: layout.data_row_start as usize,
        })
    }

    /// Zip each row against the header; blank rows are skipped
    pub fn records(&self) -> Vec<RawRecord> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let row_number = self.first_row + i;
                if row.len() > self.header.len() {
                    warn!(
                        "row {} has {} cells but only {} headers, dropping the extra cells",
                        row_number,
                        row.len(),
                        self.header.len()
                    );
                }
                let record = RawRecord::zip(row_number, &self.header, row);
                if record.is_blank() {
                    debug!("skipping blank row {}", row_number);
                    None
                } else {
                    Some(record)
                }
            })
            .collect()
    }
}

/// One data row keyed by header name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Sheet row number
    pub row: usize,
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    /// Pair headers with values; pairs past the shorter list are dropped
    pub fn zip(row: usize, header: &[String], values: &[String]) -> Self {
        let fields = header
            .iter()
            .zip(values.iter())
            .map(|(h, v)| (h.clone(), v.trim().to_string()))
            .collect();
        Self { row, fields }
    }

    /// Get a field value; empty cells read as absent
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Get a field value that identifies the record
    pub fn require(&self, field: &str) -> Result<&str> {
        self.get(field).ok_or_else(|| Error::MissingField {
            row: self.row,
            field: field.to_string(),
        })
    }

    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }
}

/// Reads ranges out of local CSV exports; the sheet id is the file path
#[derive(Debug, Clone, Default)]
pub struct CsvSheetReader {
    base_dir: Option<PathBuf>,
}

impl CsvSheetReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative sheet ids against `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, sheet_id: &str) -> PathBuf {
        let path = Path::new(sheet_id);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SheetReader for CsvSheetReader {
    fn read_range(&self, sheet_id: &str, range: &SheetRange) -> Result<Vec<Vec<String>>> {
        let path = self.resolve(sheet_id);
        let grid = read_csv_grid(&path)?;
        let (col_start, col_end) = range.column_span()?;
        let (row_start, row_end) = range.row_span()?;
        let row_end = row_end.unwrap_or(grid.len()).min(grid.len());

        let mut block: Vec<Vec<String>> = grid
            .get(row_start..row_end.max(row_start))
            .unwrap_or_default()
            .iter()
            .map(|row| {
                let end = col_end.min(row.len());
                let mut cells: Vec<String> = row.get(col_start..end.max(col_start)).unwrap_or_default().to_vec();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while block.last().is_some_and(|r| r.is_empty()) {
            block.pop();
        }
        Ok(block)
    }
}

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut grid = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_range_display() {
        let open = SheetRange::new("working", "E", "AD", 2, None);
        assert_eq!(open.to_string(), "working!E2:AD");

        let closed = SheetRange::new("Sheet1", "A", "D", 1, Some(1));
        assert_eq!(closed.to_string(), "Sheet1!A1:D1");
    }

    #[test]
    fn test_column_number() {
        assert_eq!(column_number("A"), Some(1));
        assert_eq!(column_number("d"), Some(4));
        assert_eq!(column_number("Z"), Some(26));
        assert_eq!(column_number("AD"), Some(30));
        assert_eq!(column_number(""), None);
        assert_eq!(column_number("A1"), None);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let range = SheetRange::new("Sheet1", "D", "A", 1, None);
        assert!(matches!(range.column_span(), Err(Error::InvalidRange { .. })));

        let range = SheetRange::new("Sheet1", "A", "D", 5, Some(2));
        assert!(matches!(range.row_span(), Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn test_short_rows_zip_silently() {
        let header = strings(&["name_last", "name_first", "grade", "teacher_hr"]);
        let record = RawRecord::zip(2, &header, &strings(&["Doe", "Jack"]));

        assert_eq!(record.get("name_last"), Some("Doe"));
        assert_eq!(record.get("grade"), None);
        assert!(matches!(
            record.require("teacher_hr"),
            Err(Error::MissingField { row: 2, .. })
        ));
    }

    #[test]
    fn test_empty_cells_read_as_absent() {
        let header = strings(&["a", "b"]);
        let record = RawRecord::zip(3, &header, &strings(&["", " x "]));

        assert_eq!(record.get("a"), None);
        assert_eq!(record.get("b"), Some("x"));
    }

    #[test]
    fn test_records_skip_blank_rows() {
        let data = SheetData::new(
            strings(&["a", "b"]),
            vec![strings(&["1", "2"]), vec![], strings(&["", ""]), strings(&["3"])],
        );

        let records = data.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, 2);
        assert_eq!(records[1].row, 5);
        assert_eq!(records[1].get("a"), Some("3"));
    }

    #[test]
    fn test_csv_reader_applies_window() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name_last,name_first,grade,extra").unwrap();
        writeln!(file, "1,Doe,Jack,1,").unwrap();
        writeln!(file, "2,Doe,Jill,,").unwrap();
        writeln!(file, ",,,,").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let reader = CsvSheetReader::new();
        let layout = SheetLayout {
            tab: "Sheet1".to_string(),
            col_start: "B".to_string(),
            col_end: "E".to_string(),
            header_row: 1,
            data_row_start: 2,
            data_row_end: None,
        };

        let data = SheetData::read(&reader, &path, &layout).unwrap();
        assert_eq!(data.header, strings(&["name_last", "name_first", "grade", "extra"]));
        assert_eq!(
            data.rows,
            vec![strings(&["Doe", "Jack", "1"]), strings(&["Doe", "Jill"])]
        );
    }

    #[test]
    fn test_csv_reader_resolves_relative_ids() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("roster.csv"), "name_last,name_first\nDoe,Jack\n").unwrap();
        let range = SheetRange::new("Sheet1", "A", "B", 2, None);

        let reader = CsvSheetReader::with_base_dir(dir.path());

        assert_eq!(
            reader.read_range("roster.csv", &range).unwrap(),
            vec![strings(&["Doe", "Jack"])]
        );
    }

    #[test]
    fn test_csv_reader_missing_file() {
        let reader = CsvSheetReader::with_base_dir("/nonexistent");
        let range = SheetRange::new("Sheet1", "A", "B", 1, None);
        assert!(matches!(
            reader.read_range("roster.csv", &range),
            Err(Error::FileRead { .. })
        ));
    }
}
