//! The endpoint catalog: every REST operation the client performs, declared
//! as data.
//!
//! Read endpoints name the [`Tag`]s they provide; write endpoints name the
//! tags they invalidate. The query cache and mutation dispatcher consume
//! these declarations, so the wiring between a write and the reads it
//! refreshes lives in exactly one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse invalidation label grouping cache entries that go stale together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Analytics,
    Classes,
    Rooms,
    Teachers,
    Students,
    Subjects,
    Events,
}

/// Declares one REST operation: method, path template, and tag wiring.
#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    /// Canonical identifier in `group:action` form (e.g. `classes:list`).
    pub name: &'static str,
    /// HTTP method, upper-case.
    pub method: &'static str,
    /// API-relative path; may contain an `{id}` placeholder.
    pub path: &'static str,
    /// Tags attached to cache entries produced by this endpoint.
    pub provides: &'static [Tag],
    /// Tags marked stale when this endpoint succeeds.
    pub invalidates: &'static [Tag],
}

impl EndpointSpec {
    /// Substitute the `{id}` placeholder in the path template.
    pub fn path_for(&self, id: &str) -> String {
        self.path.replace("{id}", id)
    }
}

pub const LOGIN: EndpointSpec = EndpointSpec {
    name: "auth:login",
    method: "POST",
    path: "auth/login",
    provides: &[],
    invalidates: &[],
};

pub const ONBOARD_SCHOOL: EndpointSpec = EndpointSpec {
    name: "auth:onboard-school",
    method: "POST",
    path: "auth/onboard-school",
    provides: &[],
    invalidates: &[],
};

pub const SCHOOL_ANALYTICS: EndpointSpec = EndpointSpec {
    name: "analytics:school",
    method: "GET",
    path: "analytics/school",
    provides: &[Tag::Analytics],
    invalidates: &[],
};

pub const LIST_CLASSES: EndpointSpec = EndpointSpec {
    name: "classes:list",
    method: "GET",
    path: "classes/all",
    provides: &[Tag::Classes],
    invalidates: &[],
};

pub const CREATE_CLASS: EndpointSpec = EndpointSpec {
    name: "classes:create",
    method: "POST",
    path: "schools/classes",
    provides: &[],
    invalidates: &[Tag::Classes, Tag::Analytics],
};

pub const UPDATE_CLASS: EndpointSpec = EndpointSpec {
    name: "classes:update",
    method: "PUT",
    path: "classes/{id}",
    provides: &[],
    invalidates: &[Tag::Classes, Tag::Analytics],
};

pub const DELETE_CLASS: EndpointSpec = EndpointSpec {
    name: "classes:delete",
    method: "DELETE",
    path: "classes/{id}",
    provides: &[],
    invalidates: &[Tag::Classes, Tag::Analytics],
};

pub const LIST_ROOMS: EndpointSpec = EndpointSpec {
    name: "rooms:list",
    method: "GET",
    path: "rooms/all",
    provides: &[Tag::Rooms],
    invalidates: &[],
};

pub const CREATE_ROOM: EndpointSpec = EndpointSpec {
    name: "rooms:create",
    method: "POST",
    path: "schools/rooms",
    provides: &[],
    invalidates: &[Tag::Rooms],
};

pub const UPDATE_ROOM: EndpointSpec = EndpointSpec {
    name: "rooms:update",
    method: "PUT",
    path: "rooms/{id}",
    provides: &[],
    invalidates: &[Tag::Rooms],
};

pub const DELETE_ROOM: EndpointSpec = EndpointSpec {
    name: "rooms:delete",
    method: "DELETE",
    path: "rooms/{id}",
    provides: &[],
    invalidates: &[Tag::Rooms],
};

pub const LIST_TEACHERS: EndpointSpec = EndpointSpec {
    name: "teachers:list",
    method: "GET",
    path: "teachers/all",
    provides: &[Tag::Teachers],
    invalidates: &[],
};

pub const LIST_STUDENTS: EndpointSpec = EndpointSpec {
    name: "students:list",
    method: "GET",
    path: "students/all",
    provides: &[Tag::Students],
    invalidates: &[],
};

pub const LIST_SUBJECTS: EndpointSpec = EndpointSpec {
    name: "subjects:list",
    method: "GET",
    path: "subjects/all",
    provides: &[Tag::Subjects],
    invalidates: &[],
};

pub const CREATE_SUBJECT: EndpointSpec = EndpointSpec {
    name: "subjects:create",
    method: "POST",
    path: "subjects/create",
    provides: &[],
    invalidates: &[Tag::Subjects],
};

pub const ASSIGN_TEACHER: EndpointSpec = EndpointSpec {
    name: "subjects:assign-teacher",
    method: "POST",
    path: "subjects/assign-teacher",
    provides: &[],
    invalidates: &[Tag::Subjects, Tag::Classes],
};

pub const LIST_EVENTS: EndpointSpec = EndpointSpec {
    name: "events:list",
    method: "GET",
    path: "events",
    provides: &[Tag::Events],
    invalidates: &[],
};

pub const CREATE_EVENT: EndpointSpec = EndpointSpec {
    name: "events:create",
    method: "POST",
    path: "events",
    provides: &[],
    invalidates: &[Tag::Events],
};

/// Every endpoint the client knows about, in catalog order.
pub const CATALOG: &[EndpointSpec] = &[
    LOGIN,
    ONBOARD_SCHOOL,
    SCHOOL_ANALYTICS,
    LIST_CLASSES,
    CREATE_CLASS,
    UPDATE_CLASS,
    DELETE_CLASS,
    LIST_ROOMS,
    CREATE_ROOM,
    UPDATE_ROOM,
    DELETE_ROOM,
    LIST_TEACHERS,
    LIST_STUDENTS,
    LIST_SUBJECTS,
    CREATE_SUBJECT,
    ASSIGN_TEACHER,
    LIST_EVENTS,
    CREATE_EVENT,
];

/// Look up an endpoint by its canonical `group:action` name.
pub fn find(name: &str) -> Option<&'static EndpointSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Identifies one fetchable resource: a GET endpoint plus its canonically
/// serialized argument. Used as the cache lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    endpoint: String,
    argument: Option<String>,
}

impl ResourceKey {
    /// Key for an argument-less collection or singleton endpoint.
    pub fn collection(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            argument: None,
        }
    }

    /// Key for an endpoint parameterized by a query argument. The argument
    /// is serialized once at construction so equal arguments always produce
    /// equal keys.
    pub fn with_params(endpoint: &str, params: &Value) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            argument: Some(params.to_string()),
        }
    }

    /// API-relative path of the underlying endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The query argument, decoded back to JSON. `None` for collection keys.
    pub fn params(&self) -> Option<Value> {
        self.argument
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{}?{}", self.endpoint, argument),
            None => f.write_str(&self.endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_names_are_unique() {
        for (index, spec) in CATALOG.iter().enumerate() {
            let duplicate = CATALOG
                .iter()
                .skip(index + 1)
                .any(|other| other.name == spec.name);
            assert!(!duplicate, "duplicate endpoint name {}", spec.name);
        }
    }

    #[test]
    fn writes_invalidate_what_reads_provide() {
        // Every invalidated tag must be provided by some read endpoint,
        // otherwise the invalidation can never reach a cache entry.
        for spec in CATALOG {
            for tag in spec.invalidates {
                let provided = CATALOG
                    .iter()
                    .any(|other| other.provides.contains(tag));
                assert!(provided, "{} invalidates unprovided tag {:?}", spec.name, tag);
            }
        }
    }

    #[test]
    fn path_for_substitutes_id() {
        assert_eq!(UPDATE_CLASS.path_for("c-9"), "classes/c-9");
        assert_eq!(LIST_CLASSES.path_for("ignored"), "classes/all");
    }

    #[test]
    fn find_resolves_canonical_names() {
        assert_eq!(find("rooms:create").map(|s| s.path), Some("schools/rooms"));
        assert!(find("rooms:unknown").is_none());
    }

    #[test]
    fn resource_keys_compare_by_endpoint_and_argument() {
        let may = ResourceKey::with_params("events", &json!({"month": 5, "year": 2026}));
        let may_again = ResourceKey::with_params("events", &json!({"month": 5, "year": 2026}));
        let june = ResourceKey::with_params("events", &json!({"month": 6, "year": 2026}));

        assert_eq!(may, may_again);
        assert_ne!(may, june);
        assert_ne!(may, ResourceKey::collection("events"));
        assert_eq!(may.params(), Some(json!({"month": 5, "year": 2026})));
    }
}
