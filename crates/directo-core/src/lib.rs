//! directo-core: Core library for building school directory documents
//!
//! This library provides functionality to:
//! - Read roster and directory sheets (Google Sheets or CSV exports)
//! - Normalize rows into child and parent records keyed by name
//! - Reconcile the two sources into enriched children
//! - Format class and student entries for a two-column table
//! - Grow and fill a table in a Google Docs document with index-safe edits

pub mod config;
pub mod dispatch;
pub mod document;
pub mod edit;
pub mod engine;
pub mod error;
pub mod format;
pub mod google;
pub mod memory;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod service;
pub mod sheet;
pub mod workflow;

pub use config::Config;
pub use dispatch::BatchDispatcher;
pub use document::{Document, TableSnapshot};
pub use edit::{EditOperation, ParagraphStyle, TextStyle};
pub use engine::{DocumentSession, TableBuilder, TextGroup};
pub use error::{Error, Result};
pub use format::{by_class, by_student, ClassGroup, StudentEntry};
pub use google::{token_from_env, GoogleDocsClient, GoogleSheetsReader};
pub use memory::MemoryDocumentService;
pub use normalize::{DirectoryData, RosterData};
pub use reconcile::enrich;
pub use record::{ChildRecord, EnrichedChild, EnrichedMap, ParentRecord};
pub use service::DocumentService;
pub use sheet::{CsvSheetReader, SheetData, SheetLayout, SheetRange, SheetReader};
pub use workflow::{make_class_roster, make_student_directory};
