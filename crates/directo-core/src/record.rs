//! Child and parent records keyed by composite name

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Children keyed by `"<last>, <first>"`
pub type ChildMap = BTreeMap<String, ChildRecord>;

/// Parents keyed by `"<last>, <first>"`
pub type ParentMap = BTreeMap<String, ParentRecord>;

/// Build the `"<last>, <first>"` key used to join records across sheets
pub fn composite_key(last: &str, first: &str) -> String {
    format!("{}, {}", last, first)
}

/// Field-wise merge where present values in `other` win
pub trait Merge {
    fn merge(&mut self, other: Self);
}

/// Take `new` when it carries a value, keep `old` otherwise
fn merge_field<T>(old: &mut Option<T>, new: Option<T>) {
    if new.is_some() {
        *old = new;
    }
}

/// A student, from the roster and optionally the directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub name_last: String,
    pub name_first: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_hr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Keys of the parents listed alongside this child in the directory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_keys: Vec<String>,
}

impl ChildRecord {
    pub fn new(name_last: impl Into<String>, name_first: impl Into<String>) -> Self {
        Self {
            name_last: name_last.into(),
            name_first: name_first.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> String {
        composite_key(&self.name_last, &self.name_first)
    }
}

impl Merge for ChildRecord {
    fn merge(&mut self, other: Self) {
        if !other.name_last.is_empty() {
            self.name_last = other.name_last;
        }
        if !other.name_first.is_empty() {
            self.name_first = other.name_first;
        }
        merge_field(&mut self.grade, other.grade);
        merge_field(&mut self.teacher_hr, other.teacher_hr);
        merge_field(&mut self.language, other.language);
        if !other.parent_keys.is_empty() {
            self.parent_keys = other.parent_keys;
        }
    }
}

/// A parent or guardian from the directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRecord {
    pub name_last: String,
    pub name_first: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl ParentRecord {
    pub fn new(name_last: impl Into<String>, name_first: impl Into<String>) -> Self {
        Self {
            name_last: name_last.into(),
            name_first: name_first.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> String {
        composite_key(&self.name_last, &self.name_first)
    }
}

impl Merge for ParentRecord {
    fn merge(&mut self, other: Self) {
        if !other.name_last.is_empty() {
            self.name_last = other.name_last;
        }
        if !other.name_first.is_empty() {
            self.name_first = other.name_first;
        }
        merge_field(&mut self.email, other.email);
        merge_field(&mut self.phone, other.phone);
        merge_field(&mut self.address, other.address);
        merge_field(&mut self.city, other.city);
        merge_field(&mut self.state, other.state);
        merge_field(&mut self.zip, other.zip);
    }
}

/// Insert `record` under `key`, or merge it over the record already there
pub fn upsert<T: Merge>(map: &mut BTreeMap<String, T>, key: String, record: T) {
    match map.get_mut(&key) {
        Some(existing) => existing.merge(record),
        None => {
            map.insert(key, record);
        }
    }
}

/// A roster child after the directory join; `parents` is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedChild {
    #[serde(flatten)]
    pub child: ChildRecord,
    pub parents: Vec<ParentRecord>,
}

impl EnrichedChild {
    pub fn key(&self) -> String {
        self.child.key()
    }
}

/// Enriched children keyed by `"<last>, <first>"`
pub type EnrichedMap = BTreeMap<String, EnrichedChild>;
