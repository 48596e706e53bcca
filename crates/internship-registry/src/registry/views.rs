use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationStatus, Posting, PostingStatus};

/// Filter applied when listing postings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostingQuery {
    #[serde(default)]
    pub status: Option<PostingStatus>,
    /// Case-insensitive substring matched against title, organization and department.
    #[serde(default)]
    pub search: Option<String>,
}

impl PostingQuery {
    pub fn open() -> Self {
        Self {
            status: Some(PostingStatus::Open),
            search: None,
        }
    }

    pub fn matches(&self, posting: &Posting) -> bool {
        if let Some(status) = self.status {
            if posting.status != status {
                return false;
            }
        }

        match self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        {
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&posting.title, &posting.organization, &posting.department]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Newest first, ties broken by id so repeated reads are identical.
pub(crate) fn newest_postings_first(left: &Posting, right: &Posting) -> Ordering {
    right
        .created_at
        .cmp(&left.created_at)
        .then_with(|| left.id.cmp(&right.id))
}

pub(crate) fn newest_applications_first(left: &Application, right: &Application) -> Ordering {
    right
        .submitted_at
        .cmp(&left.submitted_at)
        .then_with(|| left.id.cmp(&right.id))
}

/// Per-status tally of applications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ApplicationCounts {
    pub fn tally<'a>(applications: impl IntoIterator<Item = &'a Application>) -> Self {
        applications
            .into_iter()
            .fold(Self::default(), |mut counts, application| {
                counts.total += 1;
                match application.status {
                    ApplicationStatus::Pending => counts.pending += 1,
                    ApplicationStatus::Approved => counts.approved += 1,
                    ApplicationStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingSummary {
    pub posting: Posting,
    pub applications: ApplicationCounts,
}

/// Figures shown on a coordinator's dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorDashboard {
    pub postings: usize,
    pub open_postings: usize,
    pub applications: ApplicationCounts,
    pub posting_summaries: Vec<PostingSummary>,
}

/// Figures shown on a student's dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub open_postings: usize,
    pub applications: ApplicationCounts,
}
