use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::registry::actor::{Role, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::registry::domain::{
    Application, ApplicationId, ApplicationStatus, Posting, PostingDraft, PostingId, UserId,
};
use crate::registry::memory::InMemoryStore;
use crate::registry::repository::{RegistryStore, StoreError};
use crate::registry::service::{InternshipRegistry, RegistryPolicy};

pub(super) struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub(super) fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub(super) fn advance_seconds(&self, seconds: i64) {
        *self.0.lock().expect("clock mutex poisoned") += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex poisoned")
    }
}

pub(super) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(super) fn coordinator() -> UserId {
    UserId::new("coord-1")
}

pub(super) fn other_coordinator() -> UserId {
    UserId::new("coord-2")
}

pub(super) fn student() -> UserId {
    UserId::new("student-1")
}

pub(super) fn other_student() -> UserId {
    UserId::new("student-2")
}

pub(super) fn deadline() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid deadline")
}

pub(super) fn draft() -> PostingDraft {
    PostingDraft {
        title: "Backend Intern".to_string(),
        organization: "Acme".to_string(),
        department: "CSE".to_string(),
        description: "Build internal APIs".to_string(),
        open_positions: 2,
        deadline: deadline(),
    }
}

pub(super) fn draft_titled(title: &str, organization: &str, department: &str) -> PostingDraft {
    PostingDraft {
        title: title.to_string(),
        organization: organization.to_string(),
        department: department.to_string(),
        ..draft()
    }
}

pub(super) fn build_registry() -> (
    InternshipRegistry<InMemoryStore>,
    Arc<InMemoryStore>,
    Arc<MutableClock>,
) {
    build_registry_with_policy(RegistryPolicy::default())
}

pub(super) fn build_registry_with_policy(
    policy: RegistryPolicy,
) -> (
    InternshipRegistry<InMemoryStore>,
    Arc<InMemoryStore>,
    Arc<MutableClock>,
) {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(MutableClock::new(fixture_timestamp()));
    let registry = InternshipRegistry::with_clock(store.clone(), clock.clone(), policy);
    (registry, store, clock)
}

pub(super) fn posting_record(id: &str, owner: UserId) -> Posting {
    Posting {
        id: PostingId(id.to_string()),
        owner_id: owner,
        title: "Backend Intern".to_string(),
        organization: "Acme".to_string(),
        department: "CSE".to_string(),
        description: String::new(),
        open_positions: 2,
        deadline: deadline(),
        status: crate::registry::domain::PostingStatus::Open,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

pub(super) fn application_record(id: &str, applicant: UserId, posting: &str) -> Application {
    Application {
        id: ApplicationId(id.to_string()),
        applicant_id: applicant,
        posting_id: PostingId(posting.to_string()),
        status: ApplicationStatus::Pending,
        submitted_at: fixture_timestamp(),
        reviewed_at: None,
        reviewed_by: None,
    }
}

/// Store whose backend is permanently offline.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl RegistryStore for UnavailableStore {
    fn insert_posting(&self, _posting: Posting) -> Result<Posting, StoreError> {
        offline()
    }

    fn replace_posting(&self, _posting: Posting) -> Result<Posting, StoreError> {
        offline()
    }

    fn fetch_posting(&self, _id: &PostingId) -> Result<Option<Posting>, StoreError> {
        offline()
    }

    fn postings(&self) -> Result<Vec<Posting>, StoreError> {
        offline()
    }

    fn postings_by_owner(&self, _owner: &UserId) -> Result<Vec<Posting>, StoreError> {
        offline()
    }

    fn insert_application(&self, _application: Application) -> Result<Application, StoreError> {
        offline()
    }

    fn transition_application(
        &self,
        _id: &ApplicationId,
        _expected: ApplicationStatus,
        _next: Application,
    ) -> Result<Application, StoreError> {
        offline()
    }

    fn fetch_application(&self, _id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        offline()
    }

    fn applications(&self) -> Result<Vec<Application>, StoreError> {
        offline()
    }

    fn applications_by_applicant(
        &self,
        _applicant: &UserId,
    ) -> Result<Vec<Application>, StoreError> {
        offline()
    }

    fn applications_for_posting(
        &self,
        _posting: &PostingId,
    ) -> Result<Vec<Application>, StoreError> {
        offline()
    }
}

pub(super) fn request(
    method: Method,
    uri: &str,
    actor: Option<(&str, Role)>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user_id, role)) = actor {
        builder = builder
            .header(USER_ID_HEADER, user_id)
            .header(USER_ROLE_HEADER, role.label());
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
