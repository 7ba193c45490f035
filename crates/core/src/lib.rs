//! Domain logic for the dynamic user segmentation service.
//!
//! Everything in this crate is pure: input validation, enrollment
//! arithmetic, report rendering and the shared error type. Database and
//! HTTP concerns live in `dus-db` and `dus-api`.

pub mod enrollment;
pub mod error;
pub mod operation;
pub mod report;
pub mod types;
pub mod validation;
