//! Internship postings and the applications students submit against them.
//!
//! `InternshipRegistry` enforces the lifecycle rules over any `RegistryStore`;
//! `registry_router` maps its operations onto HTTP.

pub mod actor;
pub mod domain;
pub mod file;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use actor::{Actor, ActorRejection, Role, USER_ID_HEADER, USER_ROLE_HEADER};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, Posting, PostingDraft, PostingId,
    PostingPatch, PostingStatus, ReviewDecision, UserId,
};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use repository::{RegistryStore, StoreError};
pub use router::registry_router;
pub use service::{InternshipRegistry, RegistryError, RegistryPolicy};
pub use validation::{PostingGuard, ValidationError};
pub use views::{
    ApplicationCounts, CoordinatorDashboard, PostingQuery, PostingSummary, StudentDashboard,
};
