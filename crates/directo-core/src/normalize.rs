//! Record normalizer: raw sheet rows into uniquely keyed children and parents
//!
//! Roster rows carry one child each. Directory rows are wide: up to two
//! parents/guardians (`_parent_guardian_a`, `_parent_guardian_b`) and up to
//! two children (`_child_a`, `_child_b`) per row. Every child found in a
//! directory row is linked to every parent found in that same row.

use crate::error::Result;
use crate::record::{upsert, ChildMap, ChildRecord, ParentMap, ParentRecord};
use crate::sheet::{RawRecord, SheetData};
use serde::{Deserialize, Serialize};

const PARENT_SLOTS: [&str; 2] = ["_parent_guardian_a", "_parent_guardian_b"];
const CHILD_SLOTS: [&str; 2] = ["_child_a", "_child_b"];

/// Children parsed from the class roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterData {
    pub children: ChildMap,
}

impl RosterData {
    /// Converge every roster row into the children map
    pub fn from_sheet(sheet: &SheetData) -> Result<Self> {
        let mut roster = Self::default();
        for record in sheet.records() {
            let child = child_from_roster_row(&record)?;
            upsert(&mut roster.children, child.key(), child);
        }
        Ok(roster)
    }
}

/// Children and parents parsed from the family directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryData {
    pub children: ChildMap,
    pub parents: ParentMap,
}

impl DirectoryData {
    /// Converge every directory row into the children and parents maps
    pub fn from_sheet(sheet: &SheetData) -> Result<Self> {
        let mut directory = Self::default();
        for record in sheet.records() {
            directory.absorb(family_from_directory_row(&record)?);
        }
        Ok(directory)
    }

    /// Merge one row's family into the maps
    pub fn absorb(&mut self, family: Family) {
        for (key, child) in family.children {
            upsert(&mut self.children, key, child);
        }
        for (key, parent) in family.parents {
            upsert(&mut self.parents, key, parent);
        }
    }
}

/// The children and parents extracted from a single directory row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Family {
    pub children: ChildMap,
    pub parents: ParentMap,
}

fn optional(record: &RawRecord, field: &str) -> Option<String> {
    record.get(field).map(str::to_string)
}

/// Build the child named on one roster row
pub fn child_from_roster_row(record: &RawRecord) -> Result<ChildRecord> {
    Ok(ChildRecord {
        name_last: record.require("name_last")?.to_string(),
        name_first: record.require("name_first")?.to_string(),
        grade: optional(record, "grade"),
        teacher_hr: optional(record, "teacher_hr"),
        language: optional(record, "language"),
        parent_keys: Vec::new(),
    })
}

/// Extract the parents and children of one directory row and cross-link them
pub fn family_from_directory_row(record: &RawRecord) -> Result<Family> {
    let mut family = Family::default();

    for (i, suffix) in PARENT_SLOTS.iter().enumerate() {
        if i > 0 && record.get(&format!("name_last{suffix}")).is_none() {
            continue;
        }
        let parent = parent_from_slot(record, suffix)?;
        family.parents.insert(parent.key(), parent);
    }

    let parent_keys: Vec<String> = family.parents.keys().cloned().collect();

    for (i, suffix) in CHILD_SLOTS.iter().enumerate() {
        if i > 0 && record.get(&format!("name_last{suffix}")).is_none() {
            continue;
        }
        let mut child = child_from_slot(record, suffix)?;
        child.parent_keys = parent_keys.clone();
        family.children.insert(child.key(), child);
    }

    Ok(family)
}

fn parent_from_slot(record: &RawRecord, suffix: &str) -> Result<ParentRecord> {
    let field = |name: &str| optional(record, &format!("{name}{suffix}"));
    Ok(ParentRecord {
        name_last: record.require(&format!("name_last{suffix}"))?.to_string(),
        name_first: record.require(&format!("name_first{suffix}"))?.to_string(),
        email: field("email"),
        phone: field("phone"),
        address: field("address"),
        city: field("city"),
        state: field("state"),
        zip: field("zip"),
    })
}

fn child_from_slot(record: &RawRecord, suffix: &str) -> Result<ChildRecord> {
    Ok(ChildRecord::new(
        record.require(&format!("name_last{suffix}"))?,
        record.require(&format!("name_first{suffix}"))?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn directory_header() -> Vec<String> {
        strings(&[
            "name_last_parent_guardian_a",
            "name_first_parent_guardian_a",
            "email_parent_guardian_a",
            "phone_parent_guardian_a",
            "name_last_parent_guardian_b",
            "name_first_parent_guardian_b",
            "email_parent_guardian_b",
            "name_last_child_a",
            "name_first_child_a",
            "name_last_child_b",
            "name_first_child_b",
        ])
    }

    #[test]
    fn test_roster_row_selects_child_attributes() {
        let header = strings(&["name_last", "name_first", "grade", "teacher_hr", "language", "notes"]);
        let record = RawRecord::zip(2, &header, &strings(&["Doe", "Jack", "1", "Ms.Lee", "EN", "x"]));

        let child = child_from_roster_row(&record).unwrap();
        assert_eq!(
            child,
            ChildRecord {
                grade: Some("1".to_string()),
                teacher_hr: Some("Ms.Lee".to_string()),
                language: Some("EN".to_string()),
                ..ChildRecord::new("Doe", "Jack")
            }
        );
    }

    #[test]
    fn test_roster_row_without_name_fails() {
        let header = strings(&["name_last", "name_first", "grade"]);
        let record = RawRecord::zip(7, &header, &strings(&["Doe", "", "1"]));

        match child_from_roster_row(&record) {
            Err(Error::MissingField { row, field }) => {
                assert_eq!(row, 7);
                assert_eq!(field, "name_first");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_row_cross_links_both_children_to_both_parents() {
        let record = RawRecord::zip(
            2,
            &directory_header(),
            &strings(&[
                "Doe", "Ann", "a@x.com", "555", "Roe", "Bob", "", "Doe", "Jack", "Doe", "Jill",
            ]),
        );

        let family = family_from_directory_row(&record).unwrap();

        assert_eq!(
            family.parents.keys().collect::<Vec<_>>(),
            vec!["Doe, Ann", "Roe, Bob"]
        );
        assert_eq!(family.parents["Roe, Bob"].email, None);
        for key in ["Doe, Jack", "Doe, Jill"] {
            assert_eq!(
                family.children[key].parent_keys,
                strings(&["Doe, Ann", "Roe, Bob"])
            );
        }
    }

    #[test]
    fn test_directory_row_b_slots_need_last_name() {
        let record = RawRecord::zip(
            2,
            &directory_header(),
            &strings(&["Doe", "Ann", "", "", "", "Bob", "", "Doe", "Jack", "", "Jill"]),
        );

        let family = family_from_directory_row(&record).unwrap();
        assert_eq!(family.parents.len(), 1);
        assert_eq!(family.children.len(), 1);
        assert_eq!(family.children["Doe, Jack"].parent_keys, strings(&["Doe, Ann"]));
    }

    #[test]
    fn test_directory_converges_duplicate_parents() {
        let sheet = SheetData::new(
            directory_header(),
            vec![
                strings(&["Doe", "Ann", "a@x.com", "555", "", "", "", "Doe", "Jack"]),
                strings(&["Doe", "Ann", "ann@y.org", "", "", "", "", "Doe", "Jill"]),
            ],
        );

        let directory = DirectoryData::from_sheet(&sheet).unwrap();

        let ann = &directory.parents["Doe, Ann"];
        assert_eq!(ann.email.as_deref(), Some("ann@y.org"));
        assert_eq!(ann.phone.as_deref(), Some("555"));
        assert_eq!(directory.children.len(), 2);
    }

    #[test]
    fn test_roster_later_rows_win() {
        let sheet = SheetData::new(
            strings(&["name_last", "name_first", "grade", "teacher_hr"]),
            vec![
                strings(&["Doe", "Jack", "1", "Ms.Lee"]),
                strings(&["Doe", "Jack", "2"]),
            ],
        );

        let roster = RosterData::from_sheet(&sheet).unwrap();
        let jack = &roster.children["Doe, Jack"];
        assert_eq!(jack.grade.as_deref(), Some("2"));
        assert_eq!(jack.teacher_hr.as_deref(), Some("Ms.Lee"));
    }
}
