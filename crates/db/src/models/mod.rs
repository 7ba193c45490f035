//! Entity models and DTOs, one module per table.

pub mod membership;
pub mod operation;
pub mod segment;
