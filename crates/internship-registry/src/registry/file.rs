use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::domain::{Application, ApplicationId, ApplicationStatus, Posting, PostingId, UserId};
use super::memory::{lock_state, StoreState};
use super::repository::{RegistryStore, StoreError};

/// Store persisting both collections to a single JSON document on disk.
///
/// Every write goes to a sibling temporary file that is renamed over the
/// document. In-memory state is committed only after the rename succeeds.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileStore {
    /// Open the document at `path`, starting empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| io_unavailable(parent, err))?;
        }

        let mut state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<StoreState>(&bytes).map_err(|err| {
                StoreError::Unavailable(format!("malformed store file {}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => StoreState::default(),
            Err(err) => return Err(io_unavailable(&path, err)),
        };
        state.rebuild_indexes();

        debug!(path = %path.display(), "opened json file store");
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = lock_state(&self.state)?;
        let mut staged = guard.clone();
        let outcome = apply(&mut staged)?;
        self.persist(&staged)?;
        *guard = staged;
        Ok(outcome)
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|err| StoreError::Unavailable(format!("failed to encode store: {err}")))?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, bytes).map_err(|err| io_unavailable(&staging, err))?;
        fs::rename(&staging, &self.path).map_err(|err| io_unavailable(&self.path, err))
    }
}

fn io_unavailable(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {err}", path.display()))
}

impl RegistryStore for JsonFileStore {
    fn insert_posting(&self, posting: Posting) -> Result<Posting, StoreError> {
        self.mutate(|state| state.insert_posting(posting))
    }

    fn replace_posting(&self, posting: Posting) -> Result<Posting, StoreError> {
        self.mutate(|state| state.replace_posting(posting))
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
        self.mutate(|state| state.insert_application(application))
    }

    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: Application,
    ) -> Result<Application, StoreError> {
        self.mutate(|state| state.transition_application(id, expected, next))
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
