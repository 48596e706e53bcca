use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Posting, PostingDraft, PostingId,
    PostingPatch, ReviewDecision, UserId,
};
use super::repository::{RegistryStore, StoreError};
use super::validation::{PostingGuard, ValidationError};
use super::views::{
    newest_applications_first, newest_postings_first, ApplicationCounts, CoordinatorDashboard,
    PostingQuery, PostingSummary, StudentDashboard,
};
use crate::config::RegistryConfig;

/// Optional hardening switches layered over the core lifecycle rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryPolicy {
    /// Refuse submissions against postings whose status is `Closed`.
    pub reject_closed_postings: bool,
}

impl Default for RegistryPolicy {
    fn default() -> Self {
        Self {
            reject_closed_postings: true,
        }
    }
}

impl From<&RegistryConfig> for RegistryPolicy {
    fn from(config: &RegistryConfig) -> Self {
        Self {
            reject_closed_postings: config.reject_closed_postings,
        }
    }
}

/// Owns the posting and application lifecycles on top of a storage backend.
///
/// Construct once per process and share by reference; the store handle is
/// injected rather than reached through globals.
pub struct InternshipRegistry<S: ?Sized> {
    guard: PostingGuard,
    store: Arc<S>,
    clock: Arc<dyn Clock + Send + Sync>,
    policy: RegistryPolicy,
}

impl<S> InternshipRegistry<S>
where
    S: RegistryStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, RegistryPolicy::default())
    }

    pub fn with_policy(store: Arc<S>, policy: RegistryPolicy) -> Self {
        Self::with_clock(store, Arc::new(DefaultClock), policy)
    }

    pub fn with_clock(
        store: Arc<S>,
        clock: Arc<dyn Clock + Send + Sync>,
        policy: RegistryPolicy,
    ) -> Self {
        Self {
            guard: PostingGuard,
            store,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> RegistryPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Publish a new posting owned by `owner_id`. Role checks belong to the caller.
    pub fn create_posting(
        &self,
        owner_id: &UserId,
        draft: PostingDraft,
    ) -> Result<Posting, RegistryError> {
        let posting = self
            .guard
            .posting_from_draft(owner_id.clone(), draft, self.clock.utc())?;
        let stored = self.store.insert_posting(posting)?;

        info!(posting_id = %stored.id, owner_id = %stored.owner_id, "posting created");
        Ok(stored)
    }

    /// Apply a partial update. Only the owning coordinator may edit a posting.
    pub fn update_posting(
        &self,
        owner_id: &UserId,
        posting_id: &PostingId,
        patch: PostingPatch,
    ) -> Result<Posting, RegistryError> {
        PostingGuard::require_identity(owner_id)?;
        let current = self.require_posting(posting_id)?;
        self.require_owner(&current, owner_id)?;

        let updated = self.guard.apply_patch(&current, patch, self.clock.utc())?;
        let stored = self
            .store
            .replace_posting(updated)
            .map_err(|err| match err {
                StoreError::NotFound => RegistryError::posting_not_found(posting_id),
                other => RegistryError::Store(other),
            })?;

        info!(
            posting_id = %stored.id,
            status = stored.status.label(),
            "posting updated"
        );
        Ok(stored)
    }

    /// Submit an application. The duplicate check and insert are one store call.
    pub fn submit_application(
        &self,
        applicant_id: &UserId,
        posting_id: &PostingId,
    ) -> Result<Application, RegistryError> {
        PostingGuard::require_identity(applicant_id)?;
        let posting = self.require_posting(posting_id)?;

        if self.policy.reject_closed_postings && !posting.is_open() {
            return Err(RegistryError::Closed);
        }

        let application = Application {
            id: ApplicationId::generate(),
            applicant_id: applicant_id.clone(),
            posting_id: posting.id,
            status: ApplicationStatus::Pending,
            submitted_at: self.clock.utc(),
            reviewed_at: None,
            reviewed_by: None,
        };

        let stored = self
            .store
            .insert_application(application)
            .map_err(|err| match err {
                StoreError::Conflict => RegistryError::Duplicate,
                other => RegistryError::Store(other),
            })?;

        info!(
            application_id = %stored.id,
            posting_id = %stored.posting_id,
            applicant_id = %stored.applicant_id,
            "application submitted"
        );
        Ok(stored)
    }

    /// Record the single Pending -> Approved/Rejected transition.
    pub fn review_application(
        &self,
        reviewer_id: &UserId,
        application_id: &ApplicationId,
        decision: ReviewDecision,
    ) -> Result<Application, RegistryError> {
        PostingGuard::require_identity(reviewer_id)?;
        let application = self.require_application(application_id)?;
        let posting = self.require_posting(&application.posting_id)?;
        self.require_owner(&posting, reviewer_id)?;

        if application.status.is_final() {
            return Err(RegistryError::State {
                current: application.status,
            });
        }

        let next = application.reviewed(decision, reviewer_id.clone(), self.clock.utc());
        let stored = self
            .store
            .transition_application(application_id, ApplicationStatus::Pending, next)
            .map_err(|err| match err {
                StoreError::StatusMismatch { current } => RegistryError::State { current },
                StoreError::NotFound => RegistryError::application_not_found(application_id),
                other => RegistryError::Store(other),
            })?;

        info!(
            application_id = %stored.id,
            reviewer_id = %reviewer_id,
            status = stored.status.label(),
            "application reviewed"
        );
        Ok(stored)
    }

    pub fn get_posting(&self, posting_id: &PostingId) -> Result<Posting, RegistryError> {
        self.require_posting(posting_id)
    }

    pub fn get_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, RegistryError> {
        self.require_application(application_id)
    }

    pub fn list_postings(&self, query: &PostingQuery) -> Result<Vec<Posting>, RegistryError> {
        let mut postings: Vec<Posting> = self
            .store
            .postings()?
            .into_iter()
            .filter(|posting| query.matches(posting))
            .collect();
        postings.sort_by(newest_postings_first);
        Ok(postings)
    }

    pub fn applications_for_student(
        &self,
        applicant_id: &UserId,
    ) -> Result<Vec<Application>, RegistryError> {
        let mut applications = self.store.applications_by_applicant(applicant_id)?;
        applications.sort_by(newest_applications_first);
        Ok(applications)
    }

    /// Applications against every posting the coordinator owns.
    pub fn applications_for_coordinator(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<Application>, RegistryError> {
        let mut applications = Vec::new();
        for posting in self.store.postings_by_owner(owner_id)? {
            applications.extend(self.store.applications_for_posting(&posting.id)?);
        }
        applications.sort_by(newest_applications_first);
        Ok(applications)
    }

    pub fn applications_for_posting(
        &self,
        owner_id: &UserId,
        posting_id: &PostingId,
    ) -> Result<Vec<Application>, RegistryError> {
        let posting = self.require_posting(posting_id)?;
        self.require_owner(&posting, owner_id)?;

        let mut applications = self.store.applications_for_posting(posting_id)?;
        applications.sort_by(newest_applications_first);
        Ok(applications)
    }

    pub fn coordinator_dashboard(
        &self,
        owner_id: &UserId,
    ) -> Result<CoordinatorDashboard, RegistryError> {
        let mut postings = self.store.postings_by_owner(owner_id)?;
        postings.sort_by(newest_postings_first);

        let mut totals = ApplicationCounts::default();
        let mut posting_summaries = Vec::with_capacity(postings.len());
        for posting in postings {
            let applications = self.store.applications_for_posting(&posting.id)?;
            let counts = ApplicationCounts::tally(&applications);
            totals.total += counts.total;
            totals.pending += counts.pending;
            totals.approved += counts.approved;
            totals.rejected += counts.rejected;
            posting_summaries.push(PostingSummary {
                posting,
                applications: counts,
            });
        }

        Ok(CoordinatorDashboard {
            postings: posting_summaries.len(),
            open_postings: posting_summaries
                .iter()
                .filter(|summary| summary.posting.is_open())
                .count(),
            applications: totals,
            posting_summaries,
        })
    }

    pub fn student_dashboard(
        &self,
        applicant_id: &UserId,
    ) -> Result<StudentDashboard, RegistryError> {
        let open_postings = self
            .store
            .postings()?
            .iter()
            .filter(|posting| posting.is_open())
            .count();
        let applications = self.store.applications_by_applicant(applicant_id)?;

        Ok(StudentDashboard {
            open_postings,
            applications: ApplicationCounts::tally(&applications),
        })
    }

    fn require_posting(&self, posting_id: &PostingId) -> Result<Posting, RegistryError> {
        self.store
            .fetch_posting(posting_id)?
            .ok_or_else(|| RegistryError::posting_not_found(posting_id))
    }

    fn require_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, RegistryError> {
        self.store
            .fetch_application(application_id)?
            .ok_or_else(|| RegistryError::application_not_found(application_id))
    }

    fn require_owner(&self, posting: &Posting, caller: &UserId) -> Result<(), RegistryError> {
        if posting.is_owned_by(caller) {
            return Ok(());
        }
        warn!(posting_id = %posting.id, caller = %caller, "caller does not own posting");
        Err(RegistryError::Authorization)
    }
}

/// Error raised by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("caller does not own the posting")]
    Authorization,
    #[error("an application for this posting already exists")]
    Duplicate,
    #[error("posting is closed to new applications")]
    Closed,
    #[error("application is already {current}")]
    State { current: ApplicationStatus },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    fn posting_not_found(id: &PostingId) -> Self {
        Self::NotFound {
            entity: "posting",
            id: id.0.clone(),
        }
    }

    fn application_not_found(id: &ApplicationId) -> Self {
        Self::NotFound {
            entity: "application",
            id: id.0.clone(),
        }
    }

    /// Short machine-readable tag surfaced to the presentation layer.
    pub const fn kind(&self) -> &'static str {
        match self {
            RegistryError::Validation(_) => "validation",
            RegistryError::NotFound { .. } => "not_found",
            RegistryError::Authorization => "authorization",
            RegistryError::Duplicate => "duplicate",
            RegistryError::Closed => "closed",
            RegistryError::State { .. } => "state",
            RegistryError::Store(_) => "storage",
        }
    }
}
