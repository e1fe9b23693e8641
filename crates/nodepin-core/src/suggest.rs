//! Nearest-version suggestions around a target version.
//!
//! Given the release catalog and the version a project asks for, pick a
//! short list of releases to offer instead: the newest release, the newest
//! LTS release, and up to `limit` LTS and non-LTS releases on either side of
//! the target, nearest first.

use std::cmp::Ordering;

use nodepin_backend::{compare, normalize, version::major};
use thiserror::Error;

use crate::catalog::{Catalog, ReleaseRecord};

pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SuggestError {
    #[error("release catalog is empty")]
    EmptyCatalog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSet {
    pub target: String,
    pub latest: ReleaseRecord,
    pub latest_lts: Option<ReleaseRecord>,
    /// Newer releases nearest-first, then older releases nearest-first.
    pub nearest_lts: Vec<ReleaseRecord>,
    /// Empty when the target's major line has LTS releases.
    pub nearest_non_lts: Vec<ReleaseRecord>,
}

impl SuggestionSet {
    /// Every distinct version in the set, in presentation order.
    #[must_use]
    pub fn candidates(&self) -> Vec<&ReleaseRecord> {
        let mut seen: Vec<&ReleaseRecord> = Vec::new();
        let all = std::iter::once(&self.latest)
            .chain(self.latest_lts.iter())
            .chain(self.nearest_lts.iter())
            .chain(self.nearest_non_lts.iter());
        for record in all {
            if !seen.iter().any(|r| r.version == record.version) {
                seen.push(record);
            }
        }
        seen
    }
}

/// Suggest releases near `target` with the default per-direction limit.
///
/// # Errors
/// Returns [`SuggestError::EmptyCatalog`] when `records` is empty.
pub fn suggest(records: &[ReleaseRecord], target: &str) -> Result<SuggestionSet, SuggestError> {
    suggest_with_limit(records, target, DEFAULT_SUGGESTION_LIMIT)
}

/// Suggest releases near `target`, taking at most `limit` entries from each
/// side of it per list.
///
/// # Errors
/// Returns [`SuggestError::EmptyCatalog`] when `records` is empty.
pub fn suggest_with_limit(
    records: &[ReleaseRecord],
    target: &str,
    limit: usize,
) -> Result<SuggestionSet, SuggestError> {
    let target = normalize(target);
    let catalog = Catalog::from_records(records);
    let latest = catalog.latest().ok_or(SuggestError::EmptyCatalog)?;
    let latest_lts = catalog.latest_lts();

    let sorted = catalog.records();
    let newer: Vec<&ReleaseRecord> = sorted
        .iter()
        .filter(|r| compare(&r.version, &target) == Ordering::Greater)
        .collect();
    let older: Vec<&ReleaseRecord> = sorted
        .iter()
        .filter(|r| compare(&r.version, &target) == Ordering::Less)
        .collect();

    let mut nearest_lts = nearest(&newer, &older, limit, ReleaseRecord::is_lts);
    backfill_lts(&mut nearest_lts, sorted, &target, &older, limit);

    let nearest_non_lts = if is_major_lts(sorted, &target) {
        Vec::new()
    } else {
        nearest(&newer, &older, limit, |r| !r.is_lts())
    };

    Ok(SuggestionSet {
        target,
        latest: latest.clone(),
        latest_lts: latest_lts.cloned(),
        nearest_lts: nearest_lts.into_iter().cloned().collect(),
        nearest_non_lts: nearest_non_lts.into_iter().cloned().collect(),
    })
}

// `newer` and `older` are both descending, so the newer side is walked in
// reverse to start next to the target.
fn nearest<'a>(
    newer: &[&'a ReleaseRecord],
    older: &[&'a ReleaseRecord],
    limit: usize,
    keep: impl Fn(&ReleaseRecord) -> bool,
) -> Vec<&'a ReleaseRecord> {
    newer
        .iter()
        .rev()
        .copied()
        .filter(|r| keep(r))
        .take(limit)
        .chain(older.iter().copied().filter(|r| keep(r)).take(limit))
        .collect()
}

/// Top up a short older-side LTS contribution with LTS releases at or above
/// the target, nearest first. The target's own release qualifies.
fn backfill_lts<'a>(
    picked: &mut Vec<&'a ReleaseRecord>,
    sorted: &'a [ReleaseRecord],
    target: &str,
    older: &[&ReleaseRecord],
    limit: usize,
) {
    let older_count = older.iter().filter(|r| r.is_lts()).take(limit).count();
    let mut missing = limit.saturating_sub(older_count);

    let pool = sorted
        .iter()
        .rev()
        .filter(|r| r.is_lts() && compare(&r.version, target) != Ordering::Less);

    for record in pool {
        if missing == 0 {
            break;
        }
        if picked.iter().any(|p| p.version == record.version) {
            continue;
        }
        picked.push(record);
        missing -= 1;
    }
}

fn is_major_lts(sorted: &[ReleaseRecord], target: &str) -> bool {
    let prefix = format!("{}.", major(target));
    sorted
        .iter()
        .any(|r| r.is_lts() && r.version.starts_with(&prefix))
}
