//! Resource records returned by the read endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A class (form group) within the school.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub id: String,
    pub name: String,
    pub grade_level: String,
    #[serde(default)]
    pub room_assignment_id: Option<String>,
    pub students_enrolled: u32,
    pub teacher_names: String,
    #[serde(default)]
    pub room_name: Option<String>,
    pub school_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A physical room that classes can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    pub school_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-class enrolment summary nested in a teacher's roster entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherClassSummary {
    pub id: String,
    pub name: String,
    pub grade_level: String,
    pub students_enrolled: u32,
}

/// Read-only roster entry for a teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    pub user_id: String,
    pub profile_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub total_classes: u32,
    #[serde(default)]
    pub classes: Vec<TeacherClassSummary>,
}

/// The class a student is enrolled in, when any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentClassRef {
    pub id: String,
    pub name: String,
    pub grade_level: String,
}

/// The guardian linked to a student record, when any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub parent_id: String,
    pub name: String,
    pub email: String,
}

/// Read-only roster entry for a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub user_id: String,
    pub profile_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub current_grade_level: String,
    #[serde(default)]
    pub class: Option<StudentClassRef>,
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

/// A teacher assigned to a subject within one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAssignmentTeacher {
    pub user_id: String,
    pub name: String,
}

/// Per-class assignment breakdown nested in a subject record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAssignmentClass {
    pub class_id: String,
    pub class_name: String,
    #[serde(default)]
    pub teachers: Vec<SubjectAssignmentTeacher>,
}

/// A subject plus the assignment summary computed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub id: String,
    pub name: String,
    pub grade_level: String,
    #[serde(default)]
    pub description: Option<String>,
    pub school_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_classes_taught: u32,
    pub total_teachers_assigned: u32,
    #[serde(default)]
    pub classes: Vec<SubjectAssignmentClass>,
}

/// Calendar event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    Academic,
    Holiday,
    Meeting,
    Sports,
    Other,
}

/// A calendar event scoped to one school.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_all_day: bool,
    pub category: EventCategory,
    pub school_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
