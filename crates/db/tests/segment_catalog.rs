//! Integration tests for the segment catalog: create, soft-delete, reinstate.

use assert_matches::assert_matches;
use dus_core::error::CoreError;
use dus_core::operation::OperationAction;
use dus_core::validation::SegmentChanges;
use dus_db::models::segment::{CreateOutcome, CreateSegment};
use dus_db::repositories::{MembershipRepo, OperationRepo, SegmentRepo};
use dus_db::StoreError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_segment(slug: &str, percentage: i16) -> CreateSegment {
    CreateSegment {
        slug: slug.to_string(),
        auto_add_percentage: percentage,
    }
}

fn changes(user_id: i64, add: &[&str], delete: &[&str]) -> SegmentChanges {
    let add: Vec<String> = add.iter().map(|s| s.to_string()).collect();
    let delete: Vec<String> = delete.iter().map(|s| s.to_string()).collect();
    SegmentChanges::new(user_id, &add, &delete).unwrap()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_inserts_active_segment(pool: PgPool) {
    let outcome = SegmentRepo::create(&pool, &new_segment("AVITO_VOICE", 30))
        .await
        .unwrap();
    assert_eq!(outcome, CreateOutcome::Created);

    let segment = SegmentRepo::find_by_slug(&pool, "AVITO_VOICE")
        .await
        .unwrap()
        .expect("segment should exist");
    assert_eq!(segment.auto_add_percentage, 30);
    assert!(!segment.deleted);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_duplicate_active_slug_fails(pool: PgPool) {
    SegmentRepo::create(&pool, &new_segment("AVITO_VOICE", 0))
        .await
        .unwrap();

    let err = SegmentRepo::create(&pool, &new_segment("AVITO_VOICE", 50))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::AlreadyExists { ref slug }) if slug == "AVITO_VOICE");

    // The first percentage is untouched.
    let segment = SegmentRepo::find_by_slug(&pool, "AVITO_VOICE")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(segment.auto_add_percentage, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_after_delete_reinstates_with_new_percentage(pool: PgPool) {
    SegmentRepo::create(&pool, &new_segment("AVITO_VOICE", 10))
        .await
        .unwrap();
    SegmentRepo::delete(&pool, "AVITO_VOICE").await.unwrap();

    let outcome = SegmentRepo::create(&pool, &new_segment("AVITO_VOICE", 60))
        .await
        .unwrap();
    assert_eq!(outcome, CreateOutcome::Reinstated);

    let segment = SegmentRepo::find_by_slug(&pool, "AVITO_VOICE")
        .await
        .unwrap()
        .unwrap();
    assert!(!segment.deleted);
    assert_eq!(segment.auto_add_percentage, 60);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_unknown_segment_fails(pool: PgPool) {
    let err = SegmentRepo::delete(&pool, "NOPE").await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::SegmentDoesNotExist { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_twice_fails_second_time(pool: PgPool) {
    SegmentRepo::create(&pool, &new_segment("AVITO_VOICE", 0))
        .await
        .unwrap();
    SegmentRepo::delete(&pool, "AVITO_VOICE").await.unwrap();

    let err = SegmentRepo::delete(&pool, "AVITO_VOICE").await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::SegmentDoesNotExist { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_purges_memberships_and_audits_each(pool: PgPool) {
    SegmentRepo::create(&pool, &new_segment("AVITO_VOICE", 0))
        .await
        .unwrap();
    SegmentRepo::create(&pool, &new_segment("AVITO_SALE", 0))
        .await
        .unwrap();
    for user_id in [3, 1, 2] {
        MembershipRepo::update_user_segments(
            &pool,
            &changes(user_id, &["AVITO_VOICE", "AVITO_SALE"], &[]),
        )
        .await
        .unwrap();
    }

    let deleted = SegmentRepo::delete(&pool, "AVITO_VOICE").await.unwrap();
    assert_eq!(deleted.affected_users, vec![1, 2, 3]);

    // Other segments keep their members.
    for user_id in [1, 2, 3] {
        let active = MembershipRepo::active_segments(&pool, user_id)
            .await
            .unwrap();
        assert_eq!(active, vec!["AVITO_SALE".to_string()]);
    }
    assert!(MembershipRepo::list_members(&pool, "AVITO_VOICE")
        .await
        .unwrap()
        .is_empty());

    let history = OperationRepo::list_for_segment(&pool, "AVITO_VOICE")
        .await
        .unwrap();
    let deletes: Vec<_> = history
        .iter()
        .filter(|op| op.action() == Some(OperationAction::Delete))
        .collect();
    assert_eq!(deletes.len(), 3);
    assert!(deletes.iter().all(|op| !op.auto_add));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_leaves_tombstone_and_other_segments(pool: PgPool) {
    SegmentRepo::create(&pool, &new_segment("B_SEG", 0))
        .await
        .unwrap();
    SegmentRepo::create(&pool, &new_segment("A_SEG", 0))
        .await
        .unwrap();
    SegmentRepo::delete(&pool, "B_SEG").await.unwrap();

    let untouched = SegmentRepo::find_by_slug(&pool, "A_SEG")
        .await
        .unwrap()
        .unwrap();
    assert!(!untouched.deleted);

    // The row survives as a tombstone.
    let tombstone = SegmentRepo::find_by_slug(&pool, "B_SEG")
        .await
        .unwrap()
        .unwrap();
    assert!(tombstone.deleted);
}
