//! Google Sheets and Docs collaborators over blocking HTTP
//!
//! Authorization is a bearer token obtained elsewhere; these clients neither
//! refresh nor retry.

use crate::document::Document;
use crate::edit::EditOperation;
use crate::error::{Error, Result};
use crate::service::DocumentService;
use crate::sheet::{SheetRange, SheetReader};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::env;

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DOCS_BASE: &str = "https://docs.googleapis.com/v1/documents";

/// Read a bearer token from the named environment variable
pub fn token_from_env(var: &str) -> Result<String> {
    env::var(var)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::MissingToken(var.to_string()))
}

/// Turn a non-success response into a service error
fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().unwrap_or_default();
        Err(Error::Service {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(Debug, Clone)]
struct Authorized {
    client: Client,
    token: String,
}

impl Authorized {
    fn new(token: String) -> Self {
        Self {
            client: Client::new(),
            token,
        }
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).bearer_auth(&self.token)
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url).bearer_auth(&self.token)
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Sheets v4 `values.get`
#[derive(Debug, Clone)]
pub struct GoogleSheetsReader {
    http: Authorized,
}

impl GoogleSheetsReader {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: Authorized::new(token.into()),
        }
    }
}

impl SheetReader for GoogleSheetsReader {
    fn read_range(&self, sheet_id: &str, range: &SheetRange) -> Result<Vec<Vec<String>>> {
        let url = format!("{}/{}/values/{}", SHEETS_BASE, sheet_id, range);
        debug!("GET {}", url);
        let response = check(self.http.get(&url).send()?)?;
        let values: ValueRange = response.json()?;
        Ok(values.values)
    }
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest<'a> {
    requests: &'a [EditOperation],
}

/// Docs v1 `documents.create`, `documents.get` and `documents.batchUpdate`
#[derive(Debug, Clone)]
pub struct GoogleDocsClient {
    http: Authorized,
}

impl GoogleDocsClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: Authorized::new(token.into()),
        }
    }
}

impl DocumentService for GoogleDocsClient {
    fn create(&mut self, title: &str) -> Result<String> {
        debug!("POST {}", DOCS_BASE);
        let response = check(self.http.post(DOCS_BASE).json(&CreateRequest { title }).send()?)?;
        let document: Document = response.json()?;
        Ok(document.document_id)
    }

    fn get_snapshot(&mut self, document_id: &str) -> Result<Document> {
        let url = format!("{}/{}", DOCS_BASE, document_id);
        debug!("GET {}", url);
        let response = check(self.http.get(&url).send()?)?;
        Ok(response.json()?)
    }

    fn batch_edit(&mut self, document_id: &str, operations: &[EditOperation]) -> Result<()> {
        let url = format!("{}/{}:batchUpdate", DOCS_BASE, document_id);
        debug!("POST {} ({} requests)", url, operations.len());
        check(
            self.http
                .post(&url)
                .json(&BatchUpdateRequest {
                    requests: operations,
                })
                .send()?,
        )?;
        Ok(())
    }
}
