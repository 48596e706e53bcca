use chrono::{DateTime, Utc};

use super::domain::{Posting, PostingDraft, PostingId, PostingPatch, PostingStatus, UserId};

/// Validation errors raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("open positions must be a positive integer")]
    NonPositivePositions,
    #[error("update must change at least one field")]
    EmptyPatch,
    #[error("caller identity is missing")]
    MissingIdentity,
}

/// Guard responsible for producing well-formed `Posting` records.
///
/// Text is stored verbatim; only emptiness is checked, after trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostingGuard;

impl PostingGuard {
    pub fn require_identity(user: &UserId) -> Result<(), ValidationError> {
        if user.is_blank() {
            return Err(ValidationError::MissingIdentity);
        }
        Ok(())
    }

    /// Build a freshly opened posting from a coordinator's draft.
    pub fn posting_from_draft(
        &self,
        owner_id: UserId,
        draft: PostingDraft,
        now: DateTime<Utc>,
    ) -> Result<Posting, ValidationError> {
        Self::require_identity(&owner_id)?;
        require_text("title", &draft.title)?;
        require_text("organization", &draft.organization)?;
        require_text("department", &draft.department)?;
        require_positions(draft.open_positions)?;

        Ok(Posting {
            id: PostingId::generate(),
            owner_id,
            title: draft.title,
            organization: draft.organization,
            department: draft.department,
            description: draft.description,
            open_positions: draft.open_positions,
            deadline: draft.deadline,
            status: PostingStatus::Open,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update, enforcing the same constraints as creation.
    pub fn apply_patch(
        &self,
        current: &Posting,
        patch: PostingPatch,
        now: DateTime<Utc>,
    ) -> Result<Posting, ValidationError> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }

        let mut updated = current.clone();

        if let Some(title) = patch.title {
            require_text("title", &title)?;
            updated.title = title;
        }
        if let Some(organization) = patch.organization {
            require_text("organization", &organization)?;
            updated.organization = organization;
        }
        if let Some(department) = patch.department {
            require_text("department", &department)?;
            updated.department = department;
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }
        if let Some(positions) = patch.open_positions {
            require_positions(positions)?;
            updated.open_positions = positions;
        }
        if let Some(deadline) = patch.deadline {
            updated.deadline = deadline;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }

        updated.updated_at = now;
        Ok(updated)
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

fn require_positions(positions: u32) -> Result<(), ValidationError> {
    if positions == 0 {
        return Err(ValidationError::NonPositivePositions);
    }
    Ok(())
}
