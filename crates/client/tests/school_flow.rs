//! End-to-end flows over an in-memory backend: create-then-read round
//! trips, login outcomes, and per-month event caching.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use edutage_api::ApiError;
use edutage_client::{ResourceTransport, SchoolApi, SessionStore};
use edutage_types::{CreateClassRequest, CredentialProvider, LoginRequest, ResourceKey};
use serde_json::{Value, json};

/// A tiny school backend living in memory.
struct FakeBackend {
    classes: Mutex<Vec<Value>>,
    class_fetches: AtomicUsize,
}

impl FakeBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            classes: Mutex::new(Vec::new()),
            class_fetches: AtomicUsize::new(0),
        })
    }

    fn class_record(body: &Value, id: &str) -> Value {
        json!({
            "id": id,
            "name": body["name"],
            "gradeLevel": body["gradeLevel"],
            "studentsEnrolled": 0,
            "teacherNames": "",
            "schoolId": "s-1",
            "createdAt": "2026-08-01T09:00:00Z",
            "updatedAt": "2026-08-01T09:00:00Z"
        })
    }

    fn auth_response() -> Value {
        json!({
            "user": {
                "id": "u-1",
                "email": "admin@acme.edu",
                "firstName": "Ada",
                "lastName": "Obi",
                "role": "ADMIN",
                "position": "Principal",
                "schoolId": "s-1"
            },
            "school": {
                "id": "s-1",
                "name": "Acme Academy",
                "email": "office@acme.edu",
                "type": "PRIMARY",
                "category": "PRIVATE"
            },
            "token": "tok-live"
        })
    }

    fn event(id: &str, title: &str, month: u64) -> Value {
        json!({
            "id": id,
            "title": title,
            "description": "",
            "startDate": format!("2026-{month:02}-10T08:00:00Z"),
            "endDate": format!("2026-{month:02}-10T17:00:00Z"),
            "isAllDay": true,
            "category": "Academic",
            "schoolId": "s-1",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        })
    }
}

#[async_trait]
impl ResourceTransport for FakeBackend {
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, ApiError> {
        match key.endpoint() {
            "classes/all" => {
                self.class_fetches.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Array(self.classes.lock().expect("classes lock").clone()))
            }
            "events" => {
                let month = key
                    .params()
                    .and_then(|params| params["month"].as_u64())
                    .unwrap_or_default();
                match month {
                    5 => Ok(json!([
                        Self::event("e-1", "Mid-term exams", 5),
                        Self::event("e-2", "Sports day", 5),
                    ])),
                    _ => Ok(json!([])),
                }
            }
            other => Err(ApiError::Server {
                status: 404,
                message: format!("unknown resource {other}"),
            }),
        }
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        match (method, path) {
            ("POST", "schools/classes") => {
                let body = body.ok_or_else(|| ApiError::Server {
                    status: 400,
                    message: "missing body".into(),
                })?;
                let mut classes = self.classes.lock().expect("classes lock");
                let record = Self::class_record(body, &format!("c-{}", classes.len() + 1));
                classes.push(record.clone());
                Ok(record)
            }
            ("POST", "auth/login") => {
                let email = body
                    .and_then(|body| body["email"].as_str())
                    .unwrap_or_default();
                if email == "admin@acme.edu" {
                    Ok(Self::auth_response())
                } else {
                    Err(ApiError::Server {
                        status: 400,
                        message: "Invalid email or password".into(),
                    })
                }
            }
            _ => Err(ApiError::Server {
                status: 404,
                message: format!("unknown operation {method} {path}"),
            }),
        }
    }
}

fn api_over(backend: Arc<FakeBackend>) -> SchoolApi {
    SchoolApi::with_transport(backend, Arc::new(SessionStore::ephemeral()))
}

#[tokio::test]
async fn created_class_appears_in_the_next_read() {
    let backend = FakeBackend::new();
    let api = api_over(backend.clone());

    let before = api.classes().await.expect("initial list");
    assert!(before.is_empty());

    let created = api
        .create_class(&CreateClassRequest {
            name: "P1A".into(),
            grade_level: "Grade 1".into(),
            room_assignment_id: None,
        })
        .await
        .expect("create class");
    assert_eq!(created.name, "P1A");

    let after = api.classes().await.expect("list after create");
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].name, "P1A");
    assert_eq!(after[0].grade_level, "Grade 1");
    assert_eq!(
        backend.class_fetches.load(Ordering::SeqCst),
        2,
        "the second read must come from a fresh fetch, not the stale entry"
    );
}

#[tokio::test]
async fn failed_login_surfaces_server_message_and_persists_nothing() {
    let backend = FakeBackend::new();
    let api = api_over(backend);

    let error = api
        .login(&LoginRequest {
            email: "wrong@acme.edu".into(),
            password: "nope".into(),
        })
        .await
        .expect_err("login must fail");

    let api_error = error
        .downcast_ref::<ApiError>()
        .expect("failure carries the typed error");
    assert_eq!(
        *api_error,
        ApiError::Server {
            status: 400,
            message: "Invalid email or password".into()
        }
    );
    assert!(
        api.session_store().session().is_none(),
        "no session may be persisted on failure"
    );
}

#[tokio::test]
async fn successful_login_establishes_the_session() {
    let backend = FakeBackend::new();
    let api = api_over(backend);

    let auth = api
        .login(&LoginRequest {
            email: "admin@acme.edu".into(),
            password: "Secret1!".into(),
        })
        .await
        .expect("login succeeds");
    assert_eq!(auth.user.full_name(), "Ada Obi");

    let store = api.session_store();
    assert_eq!(store.bearer_token().as_deref(), Some("tok-live"));
    assert_eq!(
        store.session().expect("session present").school.name,
        "Acme Academy"
    );

    api.logout().expect("logout");
    assert!(store.session().is_none());
}

#[tokio::test]
async fn event_months_are_cached_under_distinct_keys() {
    let backend = FakeBackend::new();
    let api = api_over(backend);

    let may = api.events(5, 2026).await.expect("may events");
    assert_eq!(may.len(), 2);
    assert_eq!(may[0].title, "Mid-term exams");

    let june = api.events(6, 2026).await.expect("june events");
    assert!(june.is_empty());

    assert_eq!(api.cache().len(), 2, "each month occupies its own entry");
}
