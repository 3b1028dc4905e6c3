//! Shared type definitions for the Edutage admin client.
//!
//! This crate holds everything the other workspace members agree on:
//!
//! - wire DTOs for the school-management REST API ([`auth`], [`records`],
//!   [`requests`], [`analytics`])
//! - the endpoint catalog and invalidation tags ([`endpoints`])
//! - declarative field validation used by the onboarding wizard
//!   ([`validation`])
//!
//! It deliberately has no HTTP or async dependencies so that both the
//! request layer and the wizard engine can build on it.

pub mod analytics;
pub mod auth;
pub mod endpoints;
pub mod records;
pub mod requests;
pub mod validation;

pub use analytics::{
    AdministrativeSummary, AttendanceMetrics, ClassBreakdown, GradingMetrics, PerformanceSummary,
    SchoolAnalytics,
};
pub use auth::{AuthResponse, LoginRequest, SchoolCategory, SchoolSummary, SchoolType, UserIdentity};
pub use endpoints::{EndpointSpec, ResourceKey, Tag};
pub use records::{
    ClassRecord, EventCategory, EventRecord, ParentRef, RoomRecord, StudentClassRef, StudentRecord,
    SubjectAssignmentClass, SubjectAssignmentTeacher, SubjectRecord, TeacherClassSummary,
    TeacherRecord,
};
pub use requests::{
    AssignTeacherRequest, AssignmentDetails, AssignmentResponse, CreateClassRequest,
    CreateEventRequest, CreateRoomRequest, CreateSubjectRequest, CreateSubjectResponse,
    CreatedSubject, DeleteResponse, UpdateClassRequest, UpdateRoomRequest,
};
pub use validation::{FieldRule, FieldValidation, PatternRule, validate_slice};

/// Synchronous source of the bearer credential attached to API requests.
///
/// The session store implements this; the HTTP client only sees the trait so
/// the two can live in separate crates without a dependency cycle.
pub trait CredentialProvider: Send + Sync {
    /// Returns the current bearer token, if a session is established.
    fn bearer_token(&self) -> Option<String>;
}

/// A provider that never yields a credential. Used before login and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousCredentials;

impl CredentialProvider for AnonymousCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}
