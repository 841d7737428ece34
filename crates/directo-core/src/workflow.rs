//! End-to-end document builds: class roster and student directory
//!
//! Both produce a two-column table with a bold heading in every cell's first
//! paragraph and return the id of the new document.

use crate::dispatch::BatchDispatcher;
use crate::edit::TextStyle;
use crate::engine::{DocumentSession, TextGroup};
use crate::error::Result;
use crate::format::{by_class, by_student, table_groups};
use crate::record::EnrichedMap;
use crate::service::DocumentService;
use log::info;

const TABLE_COLUMNS: usize = 2;

/// Build a document listing each class beside its students
pub fn make_class_roster<S: DocumentService>(
    service: S,
    dispatcher: BatchDispatcher,
    title: &str,
    children: &EnrichedMap,
    grade_filter: Option<&str>,
) -> Result<String> {
    let classes = by_class(children, grade_filter)?;
    info!("building class roster '{}' with {} classes", title, classes.len());
    build_table_document(service, dispatcher, title, table_groups(&classes))
}

/// Build a document listing each student beside their parents' addresses
pub fn make_student_directory<S: DocumentService>(
    service: S,
    dispatcher: BatchDispatcher,
    title: &str,
    children: &EnrichedMap,
    grade_filter: Option<&str>,
) -> Result<String> {
    let students = by_student(children, grade_filter)?;
    info!(
        "building student directory '{}' with {} students",
        title,
        students.len()
    );
    build_table_document(service, dispatcher, title, table_groups(&students))
}

fn build_table_document<S: DocumentService>(
    service: S,
    dispatcher: BatchDispatcher,
    title: &str,
    groups: Vec<TextGroup>,
) -> Result<String> {
    let mut session = DocumentSession::create(service, dispatcher, title)?;
    {
        let mut table = session.create_table(TABLE_COLUMNS)?;
        table.fill_table(groups)?;
        table.apply_text_style(&TextStyle::bold(), true)?;
    }
    Ok(session.finish())
}
