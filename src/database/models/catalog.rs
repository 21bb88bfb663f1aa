//! Reference data the timetable points at: departments, grades, sections,
//! subjects, professors and rooms. Records are handled through one tagged
//! enum so stores and handlers can stay kind-agnostic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::department::{Department, NewDepartment};
use super::grade::{Grade, NewGrade};
use super::professor::{NewProfessor, Professor};
use super::room::{NewRoom, Room};
use super::section::{NewSection, Section};
use super::subject::{NewSubject, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Department,
    Grade,
    Section,
    Subject,
    Professor,
    Room,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Department,
        EntityKind::Grade,
        EntityKind::Section,
        EntityKind::Subject,
        EntityKind::Professor,
        EntityKind::Room,
    ];

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Department => "departments",
            EntityKind::Grade => "grades",
            EntityKind::Section => "sections",
            EntityKind::Subject => "subjects",
            EntityKind::Professor => "professors",
            EntityKind::Room => "rooms",
        }
    }

    /// Name of the foreign-key field pointing at this kind
    pub fn id_field(self) -> &'static str {
        match self {
            EntityKind::Department => "department_id",
            EntityKind::Grade => "grade_id",
            EntityKind::Section => "section_id",
            EntityKind::Subject => "subject_id",
            EntityKind::Professor => "professor_id",
            EntityKind::Room => "room_id",
        }
    }

    /// Kind owning records of this kind, and the path segment used by the
    /// scoped listing (`/grades/department/:id`)
    pub fn parent_kind(self) -> Option<EntityKind> {
        match self {
            EntityKind::Grade | EntityKind::Professor => Some(EntityKind::Department),
            EntityKind::Section | EntityKind::Subject => Some(EntityKind::Grade),
            EntityKind::Department | EntityKind::Room => None,
        }
    }

    /// Singular lowercase name, as used in scoped paths
    pub fn segment(self) -> &'static str {
        match self {
            EntityKind::Department => "department",
            EntityKind::Grade => "grade",
            EntityKind::Section => "section",
            EntityKind::Subject => "subject",
            EntityKind::Professor => "professor",
            EntityKind::Room => "room",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Department => "Department",
            EntityKind::Grade => "Grade",
            EntityKind::Section => "Section",
            EntityKind::Subject => "Subject",
            EntityKind::Professor => "Professor",
            EntityKind::Room => "Room",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogRecord {
    Department(Department),
    Grade(Grade),
    Section(Section),
    Subject(Subject),
    Professor(Professor),
    Room(Room),
}

impl CatalogRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            CatalogRecord::Department(_) => EntityKind::Department,
            CatalogRecord::Grade(_) => EntityKind::Grade,
            CatalogRecord::Section(_) => EntityKind::Section,
            CatalogRecord::Subject(_) => EntityKind::Subject,
            CatalogRecord::Professor(_) => EntityKind::Professor,
            CatalogRecord::Room(_) => EntityKind::Room,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            CatalogRecord::Department(r) => r.id,
            CatalogRecord::Grade(r) => r.id,
            CatalogRecord::Section(r) => r.id,
            CatalogRecord::Subject(r) => r.id,
            CatalogRecord::Professor(r) => r.id,
            CatalogRecord::Room(r) => r.id,
        }
    }

    /// Owning record, if this kind has one
    pub fn parent(&self) -> Option<(EntityKind, i64)> {
        match self {
            CatalogRecord::Department(_) | CatalogRecord::Room(_) => None,
            CatalogRecord::Grade(r) => Some((EntityKind::Department, r.department_id)),
            CatalogRecord::Section(r) => Some((EntityKind::Grade, r.grade_id)),
            CatalogRecord::Subject(r) => Some((EntityKind::Grade, r.grade_id)),
            CatalogRecord::Professor(r) => Some((EntityKind::Department, r.department_id)),
        }
    }

    /// Keys that must be unique among records of the same kind.
    /// Scoped keys embed the parent id.
    pub fn unique_keys(&self) -> Vec<String> {
        match self {
            CatalogRecord::Department(r) => vec![
                format!("name:{}", r.name.to_lowercase()),
                format!("code:{}", r.code.to_lowercase()),
            ],
            CatalogRecord::Grade(r) => vec![format!("{}:name:{}", r.department_id, r.name.to_lowercase())],
            CatalogRecord::Section(r) => vec![format!("{}:name:{}", r.grade_id, r.name.to_lowercase())],
            CatalogRecord::Subject(r) => vec![format!("{}:code:{}", r.grade_id, r.code.to_lowercase())],
            CatalogRecord::Professor(r) => vec![format!("email:{}", r.email.to_lowercase())],
            CatalogRecord::Room(r) => vec![format!("name:{}", r.name.to_lowercase())],
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewCatalogRecord {
    Department(NewDepartment),
    Grade(NewGrade),
    Section(NewSection),
    Subject(NewSubject),
    Professor(NewProfessor),
    Room(NewRoom),
}

impl NewCatalogRecord {
    /// Decode a request body for the given kind
    pub fn from_json(kind: EntityKind, body: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EntityKind::Department => NewCatalogRecord::Department(serde_json::from_value(body)?),
            EntityKind::Grade => NewCatalogRecord::Grade(serde_json::from_value(body)?),
            EntityKind::Section => NewCatalogRecord::Section(serde_json::from_value(body)?),
            EntityKind::Subject => NewCatalogRecord::Subject(serde_json::from_value(body)?),
            EntityKind::Professor => NewCatalogRecord::Professor(serde_json::from_value(body)?),
            EntityKind::Room => NewCatalogRecord::Room(serde_json::from_value(body)?),
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            NewCatalogRecord::Department(_) => EntityKind::Department,
            NewCatalogRecord::Grade(_) => EntityKind::Grade,
            NewCatalogRecord::Section(_) => EntityKind::Section,
            NewCatalogRecord::Subject(_) => EntityKind::Subject,
            NewCatalogRecord::Professor(_) => EntityKind::Professor,
            NewCatalogRecord::Room(_) => EntityKind::Room,
        }
    }

    /// Field-level problems with the payload, keyed by field name
    pub fn validate(&self) -> Vec<(&'static str, String)> {
        let mut problems = Vec::new();

        match self {
            NewCatalogRecord::Department(r) => {
                require(&mut problems, "name", &r.name);
                require(&mut problems, "code", &r.code);
            }
            NewCatalogRecord::Grade(r) => {
                require(&mut problems, "name", &r.name);
                if r.level < 1 {
                    problems.push(("level", "Level must be at least 1".to_string()));
                }
            }
            NewCatalogRecord::Section(r) => {
                require(&mut problems, "name", &r.name);
                if matches!(r.capacity, Some(c) if c < 0) {
                    problems.push(("capacity", "Capacity cannot be negative".to_string()));
                }
            }
            NewCatalogRecord::Subject(r) => {
                require(&mut problems, "name", &r.name);
                require(&mut problems, "code", &r.code);
            }
            NewCatalogRecord::Professor(r) => {
                require(&mut problems, "first_name", &r.first_name);
                require(&mut problems, "last_name", &r.last_name);
                if !r.email.contains('@') {
                    problems.push(("email", "Invalid email format".to_string()));
                }
            }
            NewCatalogRecord::Room(r) => {
                require(&mut problems, "name", &r.name);
                if matches!(r.capacity, Some(c) if c < 0) {
                    problems.push(("capacity", "Capacity cannot be negative".to_string()));
                }
            }
        }
        problems
    }

    /// Materialize with an assigned id
    pub fn with_id(self, id: i64) -> CatalogRecord {
        match self {
            NewCatalogRecord::Department(r) => CatalogRecord::Department(Department {
                id,
                name: r.name,
                code: r.code,
                description: r.description,
            }),
            NewCatalogRecord::Grade(r) => CatalogRecord::Grade(Grade {
                id,
                name: r.name,
                level: r.level,
                department_id: r.department_id,
            }),
            NewCatalogRecord::Section(r) => CatalogRecord::Section(Section {
                id,
                name: r.name,
                grade_id: r.grade_id,
                capacity: r.capacity,
            }),
            NewCatalogRecord::Subject(r) => CatalogRecord::Subject(Subject {
                id,
                name: r.name,
                code: r.code,
                grade_id: r.grade_id,
                credits: r.credits,
                hours_per_week: r.hours_per_week,
            }),
            NewCatalogRecord::Professor(r) => CatalogRecord::Professor(Professor {
                id,
                first_name: r.first_name,
                last_name: r.last_name,
                email: r.email,
                phone: r.phone,
                department_id: r.department_id,
                specialization: r.specialization,
                max_hours_per_week: r.max_hours_per_week,
            }),
            NewCatalogRecord::Room(r) => CatalogRecord::Room(Room {
                id,
                name: r.name,
                capacity: r.capacity,
                room_type: r.room_type,
                building: r.building,
                floor: r.floor,
            }),
        }
    }
}

fn require(problems: &mut Vec<(&'static str, String)>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        problems.push((field, "This field is required".to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_payload_for_kind() {
        let record = NewCatalogRecord::from_json(
            EntityKind::Room,
            json!({ "name": "B-101", "capacity": 40, "type": "lab" }),
        )
        .unwrap();
        assert_eq!(record.kind(), EntityKind::Room);
        match record.with_id(3) {
            CatalogRecord::Room(room) => {
                assert_eq!(room.id, 3);
                assert_eq!(room.room_type.as_deref(), Some("lab"));
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn grade_payload_without_department_is_rejected() {
        let err = NewCatalogRecord::from_json(EntityKind::Grade, json!({ "name": "L1", "level": 1 }));
        assert!(err.is_err());
    }

    #[test]
    fn scoped_unique_keys_include_parent() {
        let a = NewCatalogRecord::Section(NewSection { name: "A".into(), grade_id: 1, capacity: None }).with_id(1);
        let b = NewCatalogRecord::Section(NewSection { name: "a".into(), grade_id: 2, capacity: None }).with_id(2);
        assert_ne!(a.unique_keys(), b.unique_keys());
        assert_eq!(a.parent(), Some((EntityKind::Grade, 1)));
    }

    #[test]
    fn parent_kind_matches_record_parent() {
        let subject = NewCatalogRecord::Subject(NewSubject {
            name: "Algebra".into(),
            code: "ALG".into(),
            grade_id: 4,
            credits: None,
            hours_per_week: None,
        })
        .with_id(1);
        assert_eq!(subject.parent().map(|(kind, _)| kind), EntityKind::Subject.parent_kind());
        assert_eq!(EntityKind::Grade.parent_kind(), Some(EntityKind::Department));
        assert_eq!(EntityKind::Room.parent_kind(), None);
        assert_eq!(EntityKind::Department.segment(), "department");
    }

    #[test]
    fn validation_reports_blank_fields() {
        let problems = NewCatalogRecord::Department(NewDepartment {
            name: " ".into(),
            code: "CS".into(),
            description: None,
        })
        .validate();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].0, "name");
    }

    #[test]
    fn untagged_serialization_is_flat() {
        let value = NewCatalogRecord::Department(NewDepartment {
            name: "Computer Science".into(),
            code: "CS".into(),
            description: None,
        })
        .with_id(9)
        .into_value();
        assert_eq!(value["id"], json!(9));
        assert_eq!(value["code"], json!("CS"));
    }
}
