//! Request and response DTOs for the write endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::EventCategory;

/// Body for `POST schools/classes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: String,
    pub grade_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_assignment_id: Option<String>,
}

/// Body for `PUT classes/{id}`. All fields optional; absent fields are
/// left untouched by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_assignment_id: Option<String>,
}

/// Body for `POST schools/rooms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub school_id: String,
}

/// Body for `PUT rooms/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

/// Acknowledgement returned by the DELETE endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
}

/// Body for `POST subjects/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub name: String,
    pub grade_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Subject as echoed back by the create endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSubject {
    pub id: String,
    pub name: String,
    pub grade_level: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response from `POST subjects/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubjectResponse {
    pub message: String,
    pub subject: CreatedSubject,
}

/// Body for `POST subjects/assign-teacher`.
///
/// `teacher_profile_id` is the teacher's profile id, not the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeacherRequest {
    pub class_id: String,
    pub subject_id: String,
    pub teacher_profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
}

/// The assignment as confirmed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetails {
    pub id: String,
    pub class: String,
    pub subject: String,
    pub teacher: String,
    pub grade_level: String,
    #[serde(default)]
    pub session_start_time: Option<String>,
    #[serde(default)]
    pub session_end_time: Option<String>,
    #[serde(default)]
    pub day_of_week: Option<u8>,
}

/// Response from `POST subjects/assign-teacher`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub message: String,
    pub assignment: AssignmentDetails,
}

/// Body for `POST events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_all_day: bool,
    pub category: EventCategory,
}
