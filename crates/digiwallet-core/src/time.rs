//! Timestamp helpers.
//!
//! Every timestamp the engine writes into a signed document is UTC with
//! second precision, so the RFC 3339 rendering is stable across
//! serialization round-trips.

use chrono::{DateTime, SubsecRound, Utc};

/// Current UTC time truncated to whole seconds.
pub fn now_seconds() -> DateTime<Utc> {
    truncate_to_seconds(Utc::now())
}

/// Drop any sub-second component of a timestamp.
pub fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(0)
}
