// system-tests/tests/helpers/fake_appwrite.rs
// ============================================================================
// Module: Fake Appwrite Server
// Description: Stateful loopback stand-in for the Appwrite Databases API.
// Purpose: Let CLI suites migrate and back up a database end to end offline.
// Dependencies: tiny_http, serde_json, url
// ============================================================================

//! ## Overview
//! Serves the handful of Databases endpoints the toolkit calls, backed by
//! in-memory collections. Created attributes become `available` at once.
//! Documents listed in [`FakeAppwrite::reject_updates`] answer updates with
//! HTTP 400.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::Read;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::thread::JoinHandle;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Method;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;
use url::Url;

/// Project id the fake expects.
pub const PROJECT_ID: &str = "school-project";
/// API key the fake expects.
pub const API_KEY: &str = "system-test-key";
/// Database id the fake serves.
pub const DATABASE_ID: &str = "schoolsphere";

/// One in-memory collection.
#[derive(Debug, Default, Clone)]
pub struct FakeCollection {
    /// Display name.
    pub name: String,
    /// Attribute keys in creation order.
    pub attributes: Vec<String>,
    /// Stored documents, each carrying `$id`.
    pub documents: Vec<Map<String, Value>>,
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, FakeCollection>,
    rejected: BTreeSet<String>,
    writes: u64,
}

/// A running fake server; stops on drop.
pub struct FakeAppwrite {
    server: Arc<Server>,
    state: Arc<Mutex<State>>,
    handle: Option<JoinHandle<()>>,
    endpoint: String,
}

impl FakeAppwrite {
    /// Starts a server with the given collections.
    pub fn start(collections: Vec<(&str, FakeCollection)>) -> Result<Self, String> {
        let server = Server::http("127.0.0.1:0").map_err(|err| format!("bind fake appwrite: {err}"))?;
        let addr = server.server_addr().to_ip().ok_or_else(|| "fake appwrite has no ip address".to_string())?;
        let server = Arc::new(server);
        let state = Arc::new(Mutex::new(State {
            collections: collections.into_iter().map(|(id, collection)| (id.to_string(), collection)).collect(),
            ..State::default()
        }));
        let handle = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                for request in server.incoming_requests() {
                    handle_request(&state, request);
                }
            })
        };
        Ok(Self {
            server,
            state,
            handle: Some(handle),
            endpoint: format!("http://{addr}/v1"),
        })
    }

    /// Returns the `/v1` endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Environment for a CLI child process targeting this server.
    pub fn env(&self) -> Vec<(&'static str, String)> {
        vec![
            ("APPWRITE_ENDPOINT", self.endpoint.clone()),
            ("APPWRITE_PROJECT_ID", PROJECT_ID.to_string()),
            ("APPWRITE_API_KEY", API_KEY.to_string()),
            ("APPWRITE_DATABASE_ID", DATABASE_ID.to_string()),
        ]
    }

    /// Makes updates to `document_id` fail with HTTP 400.
    pub fn reject_updates(&self, document_id: &str) {
        lock(&self.state).rejected.insert(document_id.to_string());
    }

    /// Returns a snapshot of a collection.
    pub fn collection(&self, id: &str) -> Option<FakeCollection> {
        lock(&self.state).collections.get(id).cloned()
    }

    /// Returns the number of successful document updates.
    pub fn writes(&self) -> u64 {
        lock(&self.state).writes
    }
}

impl Drop for FakeAppwrite {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Builds a collection from `(id, fields)` documents.
pub fn collection(name: &str, attributes: &[&str], documents: Vec<Value>) -> FakeCollection {
    FakeCollection {
        name: name.to_string(),
        attributes: attributes.iter().map(|key| (*key).to_string()).collect(),
        documents: documents.into_iter().filter_map(|document| document.as_object().cloned()).collect(),
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// ============================================================================
// SECTION: Routing
// ============================================================================

fn handle_request(state: &Mutex<State>, mut request: Request) {
    let authorized = header(&request, "X-Appwrite-Project").as_deref() == Some(PROJECT_ID)
        && header(&request, "X-Appwrite-Key").as_deref() == Some(API_KEY);
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let (status, payload) = if authorized {
        route(state, request.method(), request.url(), &body)
    } else {
        (401, error_body("Invalid API key"))
    };
    let Ok(content_type) = Header::from_bytes("Content-Type", "application/json") else {
        return;
    };
    let _ = request.respond(Response::from_string(payload.to_string()).with_status_code(status).with_header(content_type));
}

fn header(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_string())
}

fn error_body(message: &str) -> Value {
    json!({"message": message})
}

fn route(state: &Mutex<State>, method: &Method, raw_url: &str, body: &str) -> (u16, Value) {
    let Ok(url) = Url::parse(&format!("http://fake{raw_url}")) else {
        return (400, error_body("bad url"));
    };
    let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();
    let page = page_of(&url);
    let mut state = lock(state);
    match (method, segments.as_slice()) {
        (Method::Get, ["v1", "databases", db]) if *db == DATABASE_ID => {
            (200, json!({"$id": DATABASE_ID, "name": "SchoolSphere"}))
        }
        (Method::Get, ["v1", "databases", db, "collections"]) if *db == DATABASE_ID => {
            let all: Vec<Value> = state
                .collections
                .iter()
                .map(|(id, collection)| json!({"$id": id, "name": collection.name}))
                .collect();
            (200, json!({"total": all.len(), "collections": slice(&all, page)}))
        }
        (Method::Get, ["v1", "databases", db, "collections", id]) if *db == DATABASE_ID => {
            match state.collections.get(*id) {
                Some(collection) => {
                    let attributes: Vec<Value> = collection
                        .attributes
                        .iter()
                        .map(|key| json!({"key": key, "type": "string", "status": "available"}))
                        .collect();
                    (200, json!({"$id": id, "name": collection.name, "attributes": attributes}))
                }
                None => (404, error_body("Collection with the requested ID could not be found.")),
            }
        }
        (Method::Post, ["v1", "databases", db, "collections", id, "attributes", _kind]) if *db == DATABASE_ID => {
            create_attribute(&mut state, id, body)
        }
        (Method::Get, ["v1", "databases", db, "collections", id, "documents"]) if *db == DATABASE_ID => {
            match state.collections.get(*id) {
                Some(collection) => {
                    let all: Vec<Value> = collection.documents.iter().cloned().map(Value::Object).collect();
                    (200, json!({"total": all.len(), "documents": slice(&all, page)}))
                }
                None => (404, error_body("Collection with the requested ID could not be found.")),
            }
        }
        (Method::Patch, ["v1", "databases", db, "collections", id, "documents", document]) if *db == DATABASE_ID => {
            update_document(&mut state, id, document, body)
        }
        _ => (404, error_body("Route not found")),
    }
}

fn create_attribute(state: &mut State, collection_id: &str, body: &str) -> (u16, Value) {
    let Some(key) = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("key").and_then(Value::as_str).map(str::to_string))
    else {
        return (400, error_body("Missing key"));
    };
    let Some(collection) = state.collections.get_mut(collection_id) else {
        return (404, error_body("Collection with the requested ID could not be found."));
    };
    if collection.attributes.contains(&key) {
        return (409, json!({"message": "Attribute with the requested key already exists.", "code": 409}));
    }
    collection.attributes.push(key.clone());
    (202, json!({"key": key, "status": "available"}))
}

fn update_document(state: &mut State, collection_id: &str, document_id: &str, body: &str) -> (u16, Value) {
    if state.rejected.contains(document_id) {
        return (400, error_body("Invalid document structure"));
    }
    let Some(data) = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("data").and_then(Value::as_object).cloned())
    else {
        return (400, error_body("Missing data"));
    };
    let Some(collection) = state.collections.get_mut(collection_id) else {
        return (404, error_body("Collection with the requested ID could not be found."));
    };
    let Some(document) = collection
        .documents
        .iter_mut()
        .find(|document| document.get("$id").and_then(Value::as_str) == Some(document_id))
    else {
        return (404, error_body("Document with the requested ID could not be found."));
    };
    for (key, value) in data {
        if !collection.attributes.contains(&key) {
            return (400, error_body(&format!("Unknown attribute: \"{key}\"")));
        }
        document.insert(key, value);
    }
    let updated = Value::Object(document.clone());
    state.writes += 1;
    (200, updated)
}

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// Reads `limit`/`offset` from JSON-encoded `queries[]` parameters.
fn page_of(url: &Url) -> (usize, usize) {
    let mut limit = 25;
    let mut offset = 0;
    for (name, value) in url.query_pairs() {
        if name != "queries[]" {
            continue;
        }
        let Ok(query) = serde_json::from_str::<Value>(&value) else {
            continue;
        };
        let first = query.get("values").and_then(|values| values.get(0)).and_then(Value::as_u64);
        match (query.get("method").and_then(Value::as_str), first) {
            (Some("limit"), Some(value)) => limit = usize::try_from(value).unwrap_or(usize::MAX),
            (Some("offset"), Some(value)) => offset = usize::try_from(value).unwrap_or(usize::MAX),
            _ => {}
        }
    }
    (limit, offset)
}

fn slice(all: &[Value], (limit, offset): (usize, usize)) -> Vec<Value> {
    all.iter().skip(offset).take(limit).cloned().collect()
}
