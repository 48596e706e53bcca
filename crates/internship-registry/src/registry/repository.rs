use super::domain::{Application, ApplicationId, ApplicationStatus, Posting, PostingId, UserId};

/// Storage abstraction over the `postings` and `applications` collections.
///
/// Implementations must make `insert_application` and `transition_application`
/// atomic with respect to each other and to concurrent callers: at most one
/// caller wins a race to insert the same (applicant, posting) pair, and at most
/// one caller wins a race to move an application out of a given status.
pub trait RegistryStore: Send + Sync {
    fn insert_posting(&self, posting: Posting) -> Result<Posting, StoreError>;
    /// Overwrite an existing posting. Fails with `NotFound` if it was never inserted.
    fn replace_posting(&self, posting: Posting) -> Result<Posting, StoreError>;
    fn fetch_posting(&self, id: &PostingId) -> Result<Option<Posting>, StoreError>;
    fn postings(&self) -> Result<Vec<Posting>, StoreError>;
    fn postings_by_owner(&self, owner: &UserId) -> Result<Vec<Posting>, StoreError>;

    /// Compare-and-insert keyed on (`applicant_id`, `posting_id`).
    fn insert_application(&self, application: Application) -> Result<Application, StoreError>;
    /// Compare-and-swap on the stored status.
    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: Application,
    ) -> Result<Application, StoreError>;
    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    fn applications(&self) -> Result<Vec<Application>, StoreError>;
    fn applications_by_applicant(&self, applicant: &UserId)
        -> Result<Vec<Application>, StoreError>;
    fn applications_for_posting(&self, posting: &PostingId)
        -> Result<Vec<Application>, StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stored status is {current}")]
    StatusMismatch { current: ApplicationStatus },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
