//! Typed operations over the endpoint catalog.
//!
//! [`SchoolApi`] is what the surfaces talk to: each method wires one
//! catalog entry through the query cache (reads) or the mutation
//! dispatcher (writes) and decodes the payload into its DTO.

use std::sync::Arc;

use anyhow::{Context, Result};
use edutage_types::endpoints::{self, EndpointSpec};
use edutage_types::{
    AssignTeacherRequest, AssignmentResponse, AuthResponse, ClassRecord, CreateClassRequest,
    CreateEventRequest, CreateRoomRequest, CreateSubjectRequest, CreateSubjectResponse,
    DeleteResponse, EventRecord, LoginRequest, ResourceKey, RoomRecord, SchoolAnalytics,
    StudentRecord, SubjectRecord, TeacherRecord, UpdateClassRequest, UpdateRoomRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::cache::QueryCache;
use crate::mutation::{MutationDescriptor, MutationDispatcher};
use crate::session::{Session, SessionStore};
use crate::transport::{HttpTransport, ResourceTransport};

/// The admin client's view of the backend: cached reads, invalidating
/// writes, and session lifecycle.
#[derive(Clone)]
pub struct SchoolApi {
    cache: QueryCache,
    dispatcher: MutationDispatcher,
    session: Arc<SessionStore>,
}

impl SchoolApi {
    /// Production wiring over a [`SchoolClient`](edutage_api::SchoolClient).
    pub fn new(client: Arc<edutage_api::SchoolClient>, session: Arc<SessionStore>) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(client)), session)
    }

    /// Wiring over an arbitrary transport. Tests substitute an in-memory
    /// backend here.
    pub fn with_transport(
        transport: Arc<dyn ResourceTransport>,
        session: Arc<SessionStore>,
    ) -> Self {
        let cache = QueryCache::new(transport.clone());
        let dispatcher = MutationDispatcher::new(transport, cache.clone());
        Self {
            cache,
            dispatcher,
            session,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn dispatcher(&self) -> &MutationDispatcher {
        &self.dispatcher
    }

    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Exchange credentials for a session. The session is persisted only
    /// when the backend accepts the login.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let auth: AuthResponse = self
            .write(&endpoints::LOGIN, None, Some(encode(request)?))
            .await?;
        self.session
            .set_session(Session::from_auth(&auth))
            .context("persist session")?;
        Ok(auth)
    }

    /// Submit a completed onboarding payload (produced by the wizard) and
    /// establish the returned session.
    pub async fn onboard_school(&self, payload: Value) -> Result<AuthResponse> {
        let auth: AuthResponse = self
            .write(&endpoints::ONBOARD_SCHOOL, None, Some(payload))
            .await?;
        self.session
            .set_session(Session::from_auth(&auth))
            .context("persist session")?;
        Ok(auth)
    }

    /// Tear down the session.
    pub fn logout(&self) -> Result<()> {
        self.session.clear_session().context("clear session")
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn analytics(&self) -> Result<SchoolAnalytics> {
        self.read(&endpoints::SCHOOL_ANALYTICS).await
    }

    pub async fn classes(&self) -> Result<Vec<ClassRecord>> {
        self.read(&endpoints::LIST_CLASSES).await
    }

    pub async fn rooms(&self) -> Result<Vec<RoomRecord>> {
        self.read(&endpoints::LIST_ROOMS).await
    }

    pub async fn teachers(&self) -> Result<Vec<TeacherRecord>> {
        self.read(&endpoints::LIST_TEACHERS).await
    }

    pub async fn students(&self) -> Result<Vec<StudentRecord>> {
        self.read(&endpoints::LIST_STUDENTS).await
    }

    pub async fn subjects(&self) -> Result<Vec<SubjectRecord>> {
        self.read(&endpoints::LIST_SUBJECTS).await
    }

    /// Events for one calendar month.
    pub async fn events(&self, month: u32, year: i32) -> Result<Vec<EventRecord>> {
        let spec = &endpoints::LIST_EVENTS;
        let key = ResourceKey::with_params(spec.path, &json!({"month": month, "year": year}));
        let value = self
            .cache
            .fetch(key, spec.provides)
            .await
            .with_context(|| format!("fetch {}", spec.name))?;
        decode(value, spec.name)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    pub async fn create_class(&self, request: &CreateClassRequest) -> Result<ClassRecord> {
        self.write(&endpoints::CREATE_CLASS, None, Some(encode(request)?))
            .await
    }

    pub async fn update_class(
        &self,
        id: &str,
        request: &UpdateClassRequest,
    ) -> Result<ClassRecord> {
        self.write(&endpoints::UPDATE_CLASS, Some(id), Some(encode(request)?))
            .await
    }

    pub async fn delete_class(&self, id: &str) -> Result<DeleteResponse> {
        self.write(&endpoints::DELETE_CLASS, Some(id), None).await
    }

    pub async fn create_room(&self, request: &CreateRoomRequest) -> Result<RoomRecord> {
        self.write(&endpoints::CREATE_ROOM, None, Some(encode(request)?))
            .await
    }

    pub async fn update_room(&self, id: &str, request: &UpdateRoomRequest) -> Result<RoomRecord> {
        self.write(&endpoints::UPDATE_ROOM, Some(id), Some(encode(request)?))
            .await
    }

    pub async fn delete_room(&self, id: &str) -> Result<DeleteResponse> {
        self.write(&endpoints::DELETE_ROOM, Some(id), None).await
    }

    pub async fn create_subject(
        &self,
        request: &CreateSubjectRequest,
    ) -> Result<CreateSubjectResponse> {
        self.write(&endpoints::CREATE_SUBJECT, None, Some(encode(request)?))
            .await
    }

    pub async fn assign_teacher(
        &self,
        request: &AssignTeacherRequest,
    ) -> Result<AssignmentResponse> {
        self.write(&endpoints::ASSIGN_TEACHER, None, Some(encode(request)?))
            .await
    }

    pub async fn create_event(&self, request: &CreateEventRequest) -> Result<EventRecord> {
        self.write(&endpoints::CREATE_EVENT, None, Some(encode(request)?))
            .await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    async fn read<T: DeserializeOwned>(&self, spec: &EndpointSpec) -> Result<T> {
        let key = ResourceKey::collection(spec.path);
        let value = self
            .cache
            .fetch(key, spec.provides)
            .await
            .with_context(|| format!("fetch {}", spec.name))?;
        decode(value, spec.name)
    }

    async fn write<T: DeserializeOwned>(
        &self,
        spec: &EndpointSpec,
        id: Option<&str>,
        body: Option<Value>,
    ) -> Result<T> {
        let descriptor = match id {
            Some(id) => MutationDescriptor::from_spec_with_id(spec, id, body),
            None => MutationDescriptor::from_spec(spec, body),
        };
        let value = self
            .dispatcher
            .execute(descriptor)
            .await
            .with_context(|| format!("execute {}", spec.name))?;
        decode(value, spec.name)
    }
}

fn encode<T: Serialize>(request: &T) -> Result<Value> {
    serde_json::to_value(request).context("encode request body")
}

fn decode<T: DeserializeOwned>(value: Value, name: &str) -> Result<T> {
    serde_json::from_value(value).with_context(|| format!("decode {name} payload"))
}
