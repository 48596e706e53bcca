use super::common::*;
use crate::registry::domain::{PostingPatch, PostingStatus, UserId};
use crate::registry::validation::{PostingGuard, ValidationError};

#[test]
fn guard_opens_posting_with_fields_verbatim() {
    let mut draft = draft();
    draft.title = "  Backend Intern ".to_string();

    let posting = PostingGuard
        .posting_from_draft(coordinator(), draft, fixture_timestamp())
        .expect("valid draft");

    assert_eq!(posting.status, PostingStatus::Open);
    assert_eq!(posting.title, "  Backend Intern ");
    assert_eq!(posting.owner_id, coordinator());
    assert_eq!(posting.created_at, posting.updated_at);
    assert!(!posting.id.0.is_empty());
}

#[test]
fn guard_rejects_blank_required_text() {
    for (field, mut draft) in [
        ("title", draft()),
        ("organization", draft()),
        ("department", draft()),
    ] {
        match field {
            "title" => draft.title = "   ".to_string(),
            "organization" => draft.organization.clear(),
            _ => draft.department = "\t".to_string(),
        }

        match PostingGuard.posting_from_draft(coordinator(), draft, fixture_timestamp()) {
            Err(ValidationError::EmptyField { field: reported }) => assert_eq!(reported, field),
            other => panic!("expected empty {field} error, got {other:?}"),
        }
    }
}

#[test]
fn guard_allows_empty_description() {
    let mut draft = draft();
    draft.description.clear();

    let posting = PostingGuard
        .posting_from_draft(coordinator(), draft, fixture_timestamp())
        .expect("description is optional");
    assert!(posting.description.is_empty());
}

#[test]
fn guard_rejects_zero_positions() {
    let mut draft = draft();
    draft.open_positions = 0;

    assert_eq!(
        PostingGuard.posting_from_draft(coordinator(), draft, fixture_timestamp()),
        Err(ValidationError::NonPositivePositions)
    );
}

#[test]
fn guard_requires_owner_identity() {
    assert_eq!(
        PostingGuard.posting_from_draft(UserId::new(" "), draft(), fixture_timestamp()),
        Err(ValidationError::MissingIdentity)
    );
}

#[test]
fn patch_rejects_empty_update() {
    let posting = posting_record("posting-1", coordinator());

    assert_eq!(
        PostingGuard.apply_patch(&posting, PostingPatch::default(), fixture_timestamp()),
        Err(ValidationError::EmptyPatch)
    );
}

#[test]
fn patch_applies_creation_constraints() {
    let posting = posting_record("posting-1", coordinator());

    let zero = PostingPatch {
        open_positions: Some(0),
        ..PostingPatch::default()
    };
    assert_eq!(
        PostingGuard.apply_patch(&posting, zero, fixture_timestamp()),
        Err(ValidationError::NonPositivePositions)
    );

    let blank = PostingPatch {
        organization: Some(String::new()),
        ..PostingPatch::default()
    };
    assert_eq!(
        PostingGuard.apply_patch(&posting, blank, fixture_timestamp()),
        Err(ValidationError::EmptyField {
            field: "organization"
        })
    );
}

#[test]
fn patch_keeps_identity_fields_and_stamps_update() {
    let posting = posting_record("posting-1", coordinator());
    let later = fixture_timestamp() + chrono::TimeDelta::hours(2);

    let patch = PostingPatch {
        open_positions: Some(5),
        status: Some(PostingStatus::Closed),
        ..PostingPatch::default()
    };
    let updated = PostingGuard
        .apply_patch(&posting, patch, later)
        .expect("valid patch");

    assert_eq!(updated.id, posting.id);
    assert_eq!(updated.owner_id, posting.owner_id);
    assert_eq!(updated.created_at, posting.created_at);
    assert_eq!(updated.updated_at, later);
    assert_eq!(updated.open_positions, 5);
    assert_eq!(updated.status, PostingStatus::Closed);
    assert_eq!(updated.title, posting.title);
}
