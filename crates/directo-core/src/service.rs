//! The document service boundary

use crate::document::Document;
use crate::edit::EditOperation;
use crate::error::Result;

/// A remote rich-text document store that applies positional edits
///
/// `batch_edit` applies the operations in order, each against the document
/// state left by the previous one. It returns nothing; callers fetch a fresh
/// snapshot to observe the effects.
pub trait DocumentService {
    /// Create an empty document and return its id
    fn create(&mut self, title: &str) -> Result<String>;

    /// Fetch the current structure of a document
    fn get_snapshot(&mut self, document_id: &str) -> Result<Document>;

    /// Apply an ordered list of edits as one batch
    fn batch_edit(&mut self, document_id: &str, operations: &[EditOperation]) -> Result<()>;
}

impl<S: DocumentService + ?Sized> DocumentService for &mut S {
    fn create(&mut self, title: &str) -> Result<String> {
        (**self).create(title)
    }

    fn get_snapshot(&mut self, document_id: &str) -> Result<Document> {
        (**self).get_snapshot(document_id)
    }

    fn batch_edit(&mut self, document_id: &str, operations: &[EditOperation]) -> Result<()> {
        (**self).batch_edit(document_id, operations)
    }
}
