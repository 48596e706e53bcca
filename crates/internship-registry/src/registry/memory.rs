use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationId, ApplicationStatus, Posting, PostingId, UserId};
use super::repository::{RegistryStore, StoreError};

/// Both collections plus the secondary indexes used for duplicate checks and
/// owner lookups. Only the collections are serialized; indexes are derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    postings: BTreeMap<PostingId, Posting>,
    applications: BTreeMap<ApplicationId, Application>,
    #[serde(skip)]
    pair_index: HashMap<(UserId, PostingId), ApplicationId>,
    #[serde(skip)]
    owner_index: HashMap<UserId, Vec<PostingId>>,
}

impl StoreState {
    pub(crate) fn rebuild_indexes(&mut self) {
        self.pair_index.clear();
        self.owner_index.clear();
        for posting in self.postings.values() {
            self.owner_index
                .entry(posting.owner_id.clone())
                .or_default()
                .push(posting.id.clone());
        }
        for application in self.applications.values() {
            self.pair_index.insert(
                (
                    application.applicant_id.clone(),
                    application.posting_id.clone(),
                ),
                application.id.clone(),
            );
        }
    }

    pub(crate) fn insert_posting(&mut self, posting: Posting) -> Result<Posting, StoreError> {
        if self.postings.contains_key(&posting.id) {
            return Err(StoreError::Conflict);
        }
        self.owner_index
            .entry(posting.owner_id.clone())
            .or_default()
            .push(posting.id.clone());
        self.postings.insert(posting.id.clone(), posting.clone());
        Ok(posting)
    }

    pub(crate) fn replace_posting(&mut self, posting: Posting) -> Result<Posting, StoreError> {
        match self.postings.get_mut(&posting.id) {
            Some(slot) => {
                *slot = posting.clone();
                Ok(posting)
            }
            None => Err(StoreError::NotFound),
        }
    }

    pub(crate) fn posting(&self, id: &PostingId) -> Option<Posting> {
        self.postings.get(id).cloned()
    }

    pub(crate) fn all_postings(&self) -> Vec<Posting> {
        self.postings.values().cloned().collect()
    }

    pub(crate) fn postings_by_owner(&self, owner: &UserId) -> Vec<Posting> {
        self.owner_index
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.postings.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn insert_application(
        &mut self,
        application: Application,
    ) -> Result<Application, StoreError> {
        let pair = (
            application.applicant_id.clone(),
            application.posting_id.clone(),
        );
        if self.pair_index.contains_key(&pair) || self.applications.contains_key(&application.id) {
            return Err(StoreError::Conflict);
        }
        self.pair_index.insert(pair, application.id.clone());
        self.applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    pub(crate) fn transition_application(
        &mut self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: Application,
    ) -> Result<Application, StoreError> {
        let slot = self.applications.get_mut(id).ok_or(StoreError::NotFound)?;
        if slot.status != expected {
            return Err(StoreError::StatusMismatch {
                current: slot.status,
            });
        }
        *slot = next.clone();
        Ok(next)
    }

    pub(crate) fn application(&self, id: &ApplicationId) -> Option<Application> {
        self.applications.get(id).cloned()
    }

    pub(crate) fn all_applications(&self) -> Vec<Application> {
        self.applications.values().cloned().collect()
    }

    pub(crate) fn applications_by_applicant(&self, applicant: &UserId) -> Vec<Application> {
        self.applications
            .values()
            .filter(|application| &application.applicant_id == applicant)
            .cloned()
            .collect()
    }

    pub(crate) fn applications_for_posting(&self, posting: &PostingId) -> Vec<Application> {
        self.applications
            .values()
            .filter(|application| &application.posting_id == posting)
            .cloned()
            .collect()
    }
}

pub(crate) fn lock_state(state: &Mutex<StoreState>) -> Result<MutexGuard<'_, StoreState>, StoreError> {
    state
        .lock()
        .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
}

/// Process-local store. State lives as long as the value does.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for InMemoryStore {
    fn insert_posting(&self, posting: Posting) -> Result<Posting, StoreError> {
        lock_state(&self.state)?.insert_posting(posting)
    }

    fn replace_posting(&self, posting: Posting) -> Result<Posting, StoreError> {
        lock_state(&self.state)?.replace_posting(posting)
    }

    fn fetch_posting(&self, id: &PostingId) -> Result<Option<Posting>, StoreError> {
        Ok(lock_state(&self.state)?.posting(id))
    }

    fn postings(&self) -> Result<Vec<Posting>, StoreError> {
        Ok(lock_state(&self.state)?.all_postings())
    }

    fn postings_by_owner(&self, owner: &UserId) -> Result<Vec<Posting>, StoreError> {
        Ok(lock_state(&self.state)?.postings_by_owner(owner))
    }

    fn insert_application(&self, application: Application) -> Result<Application, StoreError> {
        lock_state(&self.state)?.insert_application(application)
    }

    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: Application,
    ) -> Result<Application, StoreError> {
        lock_state(&self.state)?.transition_application(id, expected, next)
    }

    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        Ok(lock_state(&self.state)?.application(id))
    }

    fn applications(&self) -> Result<Vec<Application>, StoreError> {
        Ok(lock_state(&self.state)?.all_applications())
    }

    fn applications_by_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(lock_state(&self.state)?.applications_by_applicant(applicant))
    }

    fn applications_for_posting(
        &self,
        posting: &PostingId,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(lock_state(&self.state)?.applications_for_posting(posting))
    }
}
