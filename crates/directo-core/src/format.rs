//! Formatter: enriched children into ordered two-column table entries
//!
//! Class entries put `"<teacher> - <grade> - <language>"` beside the class
//! list; student entries put `"<name> - <grade>"` beside the parents'
//! addresses. Output order is fully determined by the input data.

use crate::engine::TextGroup;
use crate::error::{Error, Result};
use crate::record::{EnrichedChild, EnrichedMap, ParentRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Display form of a grade code
pub fn grade_repr(grade: &str) -> Result<&'static str> {
    match grade {
        "0" => Ok("K"),
        "1" => Ok("1"),
        "2" => Ok("2"),
        "3" => Ok("3"),
        "4" => Ok("4"),
        "5" => Ok("5"),
        other => Err(Error::UnknownGrade(other.to_string())),
    }
}

fn child_grade(child: &EnrichedChild) -> Result<&str> {
    child
        .child
        .grade
        .as_deref()
        .ok_or_else(|| Error::MissingAttribute {
            key: child.key(),
            field: "grade".to_string(),
        })
}

/// Anything that renders as one row of table cells
pub trait TableEntry {
    fn columns(&self) -> Vec<TextGroup>;
}

/// Flatten entries into the column-ordered group list a table is filled from
pub fn table_groups<T: TableEntry>(entries: &[T]) -> Vec<TextGroup> {
    entries.iter().flat_map(|entry| entry.columns()).collect()
}

/// Children sharing a `(teacher, grade, language)` tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassGroup {
    pub teacher: String,
    pub grade: String,
    pub grade_repr: String,
    pub language: String,
    pub students: Vec<String>,
}

impl ClassGroup {
    pub fn index_slug(&self) -> String {
        format!("{}-{}-{}", self.grade, self.language, self.teacher)
    }

    pub fn heading(&self) -> String {
        format!("{} - {} - {}\n\n", self.teacher, self.grade_repr, self.language)
    }
}

impl TableEntry for ClassGroup {
    fn columns(&self) -> Vec<TextGroup> {
        vec![
            TextGroup::single(self.heading()),
            TextGroup::single(self.students.join("\n")),
        ]
    }
}

/// Group children into classes, optionally only those in `grade_filter`
pub fn by_class(children: &EnrichedMap, grade_filter: Option<&str>) -> Result<Vec<ClassGroup>> {
    let mut classes: BTreeMap<(String, String, String), ClassGroup> = BTreeMap::new();

    for (key, child) in children {
        let grade = child_grade(child)?;
        let grade_repr = grade_repr(grade)?;
        if grade_filter.is_some_and(|g| g != grade) {
            continue;
        }

        let teacher = child.child.teacher_hr.clone().unwrap_or_default();
        let language = child.child.language.clone().unwrap_or_default();
        classes
            .entry((teacher.clone(), grade.to_string(), language.clone()))
            .or_insert_with(|| ClassGroup {
                teacher,
                grade: grade.to_string(),
                grade_repr: grade_repr.to_string(),
                language,
                students: Vec::new(),
            })
            .students
            .push(key.clone());
    }

    let mut classes: Vec<ClassGroup> = classes.into_values().collect();
    for class in &mut classes {
        class.students.sort();
    }
    classes.sort_by_key(ClassGroup::index_slug);
    Ok(classes)
}

/// One student with the parents to list beside them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentEntry {
    pub name: String,
    pub grade_repr: String,
    pub parents: Vec<ParentRecord>,
}

impl StudentEntry {
    pub fn heading(&self) -> String {
        format!("{} - {}\n\n", self.name, self.grade_repr)
    }

    /// Blank-line separated addresses, or a lone newline with no parents
    pub fn addresses(&self) -> String {
        if self.parents.is_empty() {
            return "\n".to_string();
        }
        self.parents
            .iter()
            .map(format_address)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl TableEntry for StudentEntry {
    fn columns(&self) -> Vec<TextGroup> {
        vec![
            TextGroup::single(self.heading()),
            TextGroup::single(self.addresses()),
        ]
    }
}

/// List students by name, optionally only those in `grade_filter`
pub fn by_student(children: &EnrichedMap, grade_filter: Option<&str>) -> Result<Vec<StudentEntry>> {
    let mut students = Vec::new();
    for (key, child) in children {
        let grade = child_grade(child)?;
        let grade_repr = grade_repr(grade)?;
        if grade_filter.is_some_and(|g| g != grade) {
            continue;
        }
        students.push(StudentEntry {
            name: key.clone(),
            grade_repr: grade_repr.to_string(),
            parents: child.parents.clone(),
        });
    }
    students.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(students)
}

/// Render a parent's mailing block; lines with no backing field are left out
pub fn format_address(parent: &ParentRecord) -> String {
    let city_line = parent.city.as_ref().map(|city| {
        [Some(city), parent.state.as_ref(), parent.zip.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    });

    let lines = [
        Some(format!("{} {}", parent.name_first, parent.name_last)),
        parent.address.clone(),
        city_line,
        parent.email.clone(),
        parent.phone.clone(),
    ];

    lines.into_iter().flatten().collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChildRecord;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn child(last: &str, first: &str, grade: &str, teacher: &str, language: &str) -> EnrichedChild {
        EnrichedChild {
            child: ChildRecord {
                grade: Some(grade.to_string()),
                teacher_hr: Some(teacher.to_string()),
                language: Some(language.to_string()),
                ..ChildRecord::new(last, first)
            },
            parents: Vec::new(),
        }
    }

    fn map(children: Vec<EnrichedChild>) -> EnrichedMap {
        children.into_iter().map(|c| (c.key(), c)).collect()
    }

    fn ann() -> ParentRecord {
        ParentRecord {
            email: Some("a@x.com".to_string()),
            ..ParentRecord::new("Doe", "Ann")
        }
    }

    #[rstest]
    #[case("0", "K")]
    #[case("1", "1")]
    #[case("3", "3")]
    #[case("5", "5")]
    fn test_grade_repr(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(grade_repr(code).unwrap(), expected);
    }

    #[rstest]
    #[case("6")]
    #[case("K")]
    #[case("")]
    fn test_unknown_grade_fails(#[case] code: &str) {
        assert!(matches!(grade_repr(code), Err(Error::UnknownGrade(_))));
    }

    #[test]
    fn test_by_class_groups_siblings() {
        let children = map(vec![
            child("Doe", "Jill", "1", "Ms.Lee", "EN"),
            child("Doe", "Jack", "1", "Ms.Lee", "EN"),
            child("Roe", "Amy", "2", "Mr.Kim", "ES"),
        ]);

        let classes = by_class(&children, Some("1")).unwrap();

        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].index_slug(), "1-EN-Ms.Lee");
        assert_eq!(classes[0].students, vec!["Doe, Jack", "Doe, Jill"]);
        assert_eq!(
            classes[0].columns(),
            vec![
                TextGroup::single("Ms.Lee - 1 - EN\n\n"),
                TextGroup::single("Doe, Jack\nDoe, Jill"),
            ]
        );
    }

    #[test]
    fn test_by_class_orders_by_slug() {
        let children = map(vec![
            child("Roe", "Amy", "2", "Mr.Kim", "ES"),
            child("Poe", "Eve", "0", "Ms.Ray", "EN"),
            child("Doe", "Jack", "2", "Ms.Ash", "EN"),
        ]);

        let slugs: Vec<String> = by_class(&children, None)
            .unwrap()
            .iter()
            .map(ClassGroup::index_slug)
            .collect();

        assert_eq!(slugs, vec!["0-EN-Ms.Ray", "2-EN-Ms.Ash", "2-ES-Mr.Kim"]);
    }

    #[test]
    fn test_kindergarten_heading() {
        let children = map(vec![child("Poe", "Eve", "0", "Ms.Ray", "EN")]);

        let classes = by_class(&children, None).unwrap();

        assert_eq!(classes[0].heading(), "Ms.Ray - K - EN\n\n");
    }

    #[test]
    fn test_unmapped_grade_fails_loudly() {
        let children = map(vec![child("Doe", "Jack", "7", "Ms.Lee", "EN")]);

        assert!(matches!(by_class(&children, None), Err(Error::UnknownGrade(_))));
        assert!(matches!(by_student(&children, None), Err(Error::UnknownGrade(_))));
    }

    #[test]
    fn test_missing_grade_fails_loudly() {
        let mut jack = child("Doe", "Jack", "1", "Ms.Lee", "EN");
        jack.child.grade = None;
        let children = map(vec![jack]);

        assert!(matches!(
            by_student(&children, None),
            Err(Error::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_by_student_columns() {
        let mut jack = child("Doe", "Jack", "0", "Ms.Lee", "EN");
        jack.parents = vec![ann(), ParentRecord::new("Doe", "Bob")];
        let children = map(vec![jack, child("Abe", "Zed", "1", "Ms.Lee", "EN")]);

        let students = by_student(&children, None).unwrap();

        assert_eq!(
            table_groups(&students),
            vec![
                TextGroup::single("Abe, Zed - 1\n\n"),
                TextGroup::single("\n"),
                TextGroup::single("Doe, Jack - K\n\n"),
                TextGroup::single("Ann Doe\na@x.com\n\nBob Doe"),
            ]
        );
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let forward = map(vec![
            child("Doe", "Jack", "1", "Ms.Lee", "EN"),
            child("Roe", "Amy", "1", "Ms.Lee", "EN"),
            child("Poe", "Eve", "2", "Mr.Kim", "ES"),
        ]);
        let mut reversed = EnrichedMap::new();
        for (key, value) in forward.iter().rev() {
            reversed.insert(key.clone(), value.clone());
        }

        let first = serde_json::to_string(&by_class(&forward, None).unwrap()).unwrap();
        let second = serde_json::to_string(&by_class(&reversed, None).unwrap()).unwrap();
        assert_eq!(first, second);

        let first = serde_json::to_string(&by_student(&forward, None).unwrap()).unwrap();
        let second = serde_json::to_string(&by_student(&reversed, None).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_full_address() {
        let parent = ParentRecord {
            email: Some("a@x.com".to_string()),
            phone: Some("555-0100".to_string()),
            address: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            zip: Some("62701".to_string()),
            ..ParentRecord::new("Doe", "Ann")
        };

        assert_eq!(
            format_address(&parent),
            "Ann Doe\n1 Main St\nSpringfield IL 62701\na@x.com\n555-0100"
        );
    }

    #[test]
    fn test_partial_address() {
        let parent = ParentRecord {
            city: Some("Springfield".to_string()),
            zip: Some("62701".to_string()),
            phone: Some("555-0100".to_string()),
            ..ParentRecord::new("Doe", "Ann")
        };

        assert_eq!(format_address(&parent), "Ann Doe\nSpringfield 62701\n555-0100");
    }

    #[test]
    fn test_contact_only_address() {
        let parent = ParentRecord {
            email: Some("a@x.com".to_string()),
            phone: Some("555-0100".to_string()),
            ..ParentRecord::new("Doe", "Ann")
        };

        assert_eq!(format_address(&parent), "Ann Doe\na@x.com\n555-0100");
    }

    #[test]
    fn test_state_without_city_is_not_rendered() {
        let parent = ParentRecord {
            state: Some("IL".to_string()),
            ..ParentRecord::new("Doe", "Ann")
        };

        assert_eq!(format_address(&parent), "Ann Doe");
    }
}
