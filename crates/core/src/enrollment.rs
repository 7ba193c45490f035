//! Auto-enrollment arithmetic.
//!
//! The enrollment tick brings each segment's coverage of the known user
//! population up to its configured percentage. The database side lives in
//! `dus-db`; the sizing rules live here so they can be tested without a
//! database.

/// Number of users a segment should cover for the given population.
///
/// `floor(population * percentage / 100)`. Negative inputs are treated as 0.
pub fn target_count(population: i64, percentage: i16) -> i64 {
    let population = population.max(0);
    let percentage = i64::from(percentage.clamp(0, 100));
    population * percentage / 100
}

/// How many additional members a segment needs to reach `target`.
///
/// Never negative: a segment that already meets or exceeds its target
/// needs nothing.
pub fn shortfall(target: i64, have: i64) -> i64 {
    (target - have).max(0)
}

/// Outcome of one enrollment tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrollmentSummary {
    /// Distinct users holding at least one segment when the tick started.
    pub population: i64,
    /// Segments with a non-zero percentage that were examined.
    pub segments_checked: usize,
    /// Memberships inserted by this tick.
    pub memberships_added: u64,
}

impl EnrollmentSummary {
    pub fn is_noop(&self) -> bool {
        self.memberships_added == 0
    }
}
