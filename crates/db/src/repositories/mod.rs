//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or an open transaction) as the first argument.
//! Mutations that touch memberships always append their audit rows inside
//! the same transaction.

pub mod enrollment_repo;
pub mod membership_repo;
pub mod operation_repo;
pub mod segment_repo;

pub use enrollment_repo::EnrollmentRepo;
pub use membership_repo::MembershipRepo;
pub use operation_repo::OperationRepo;
pub use segment_repo::SegmentRepo;
