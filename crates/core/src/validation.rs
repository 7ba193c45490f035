//! Boundary validation for segment, membership and report requests.
//!
//! All functions normalize their input (trimming) and return either the
//! cleaned value or a [`CoreError::Validation`] naming the offending field.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveTime};
use regex::Regex;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

pub const MSG_EMPTY_SLUG: &str = "empty slug";
pub const MSG_SLUG_NOT_UPPERCASE: &str = "slug can only contain uppercase letters";
pub const MSG_SEGMENT_NOT_UPPERCASE: &str = "segment can only contain uppercase letters";
pub const MSG_PERCENTAGE_FORMAT: &str = "invalid percentage format (e.g. 100%, 99%, 1%)";
pub const MSG_PERCENTAGE_ZERO: &str = "percentage cannot be zero";
pub const MSG_PERCENTAGE_TOO_BIG: &str = "percentage cannot be more than 100";
pub const MSG_BAD_USER_ID: &str = "user id can be only positive number";
pub const MSG_BOTH_EMPTY: &str =
    "segments to add and segments to delete cannot both be empty";
pub const MSG_BAD_DATE: &str = "invalid date (year-month, e.g. 2023-08)";
pub const MSG_BAD_REPORT_ID: &str = "invalid report id (expected a UUID)";

/// Largest accepted auto-enrollment percentage.
pub const MAX_PERCENTAGE: i16 = 100;

static PERCENTAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+%$").expect("valid regex"));

static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Validate a segment slug supplied in a create/delete request.
///
/// Trims surrounding whitespace; rejects empty slugs and slugs that are not
/// already uppercase.
pub fn validate_slug(raw: &str) -> Result<String, CoreError> {
    check_slug(raw, "slug", MSG_SLUG_NOT_UPPERCASE)
}

fn check_slug(raw: &str, field: &'static str, not_upper: &str) -> Result<String, CoreError> {
    let slug = raw.trim();
    if slug.is_empty() {
        return Err(CoreError::validation(field, MSG_EMPTY_SLUG));
    }
    if slug.to_uppercase() != slug {
        return Err(CoreError::validation(field, not_upper));
    }
    Ok(slug.to_string())
}

// ---------------------------------------------------------------------------
// Percentage
// ---------------------------------------------------------------------------

/// Parse an auto-enrollment percentage of the form `N%`.
///
/// The empty string means "no auto-enrollment" and yields `0`. Otherwise
/// `N` must be in `1..=100`.
pub fn parse_percentage(raw: &str) -> Result<i16, CoreError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(0);
    }
    if !PERCENTAGE_RE.is_match(value) {
        return Err(CoreError::validation("percentage", MSG_PERCENTAGE_FORMAT));
    }

    let digits = value.trim_end_matches('%');
    // Anything that overflows u32 is certainly above the maximum.
    let percentage = match digits.parse::<u32>() {
        Ok(n) => n,
        Err(_) => return Err(CoreError::validation("percentage", MSG_PERCENTAGE_TOO_BIG)),
    };

    if percentage > MAX_PERCENTAGE as u32 {
        return Err(CoreError::validation("percentage", MSG_PERCENTAGE_TOO_BIG));
    }
    if percentage == 0 {
        return Err(CoreError::validation("percentage", MSG_PERCENTAGE_ZERO));
    }
    Ok(percentage as i16)
}

// ---------------------------------------------------------------------------
// Users and membership changes
// ---------------------------------------------------------------------------

/// Reject non-positive user identifiers.
pub fn validate_user_id(user_id: DbId) -> Result<DbId, CoreError> {
    if user_id <= 0 {
        return Err(CoreError::validation("user_id", MSG_BAD_USER_ID));
    }
    Ok(user_id)
}

/// A validated membership update for one user.
///
/// Slugs are trimmed and deduplicated within each list, preserving the
/// order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentChanges {
    pub user_id: DbId,
    pub to_add: Vec<String>,
    pub to_delete: Vec<String>,
}

impl SegmentChanges {
    pub fn new(
        user_id: DbId,
        to_add: &[String],
        to_delete: &[String],
    ) -> Result<Self, CoreError> {
        let user_id = validate_user_id(user_id)?;

        if to_add.is_empty() && to_delete.is_empty() {
            return Err(CoreError::validation("segments", MSG_BOTH_EMPTY));
        }

        Ok(Self {
            user_id,
            to_add: normalize_list(to_add, "segment to add")?,
            to_delete: normalize_list(to_delete, "segment to delete")?,
        })
    }
}

fn normalize_list(slugs: &[String], field: &'static str) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::with_capacity(slugs.len());
    for raw in slugs {
        let slug = check_slug(raw, field, MSG_SEGMENT_NOT_UPPERCASE)?;
        if !out.contains(&slug) {
            out.push(slug);
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Report inputs
// ---------------------------------------------------------------------------

/// A calendar month in UTC, the unit of a membership report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportMonth {
    first_day: NaiveDate,
}

impl ReportMonth {
    /// Parse a `YYYY-MM` string.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let value = raw.trim();
        if !MONTH_RE.is_match(value) {
            return Err(CoreError::validation("date", MSG_BAD_DATE));
        }
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| CoreError::validation("date", MSG_BAD_DATE))?;
        let year: i32 = year
            .parse()
            .map_err(|_| CoreError::validation("date", MSG_BAD_DATE))?;
        let month: u32 = month
            .parse()
            .map_err(|_| CoreError::validation("date", MSG_BAD_DATE))?;

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| CoreError::validation("date", MSG_BAD_DATE))
    }

    /// First instant of the month (inclusive).
    pub fn start(&self) -> Timestamp {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant of the following month (exclusive).
    pub fn end(&self) -> Timestamp {
        let (year, month) = if self.first_day.month() == 12 {
            (self.first_day.year() + 1, 1)
        } else {
            (self.first_day.year(), self.first_day.month() + 1)
        };
        // Day 1 of a month in 1..=12 always exists.
        NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap_or(self.first_day)
            .and_time(NaiveTime::MIN)
            .and_utc()
    }
}

impl std::fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

/// Parse a report identifier. Only well-formed UUIDs are accepted.
pub fn parse_report_id(raw: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| CoreError::validation("id", MSG_BAD_REPORT_ID))
}
