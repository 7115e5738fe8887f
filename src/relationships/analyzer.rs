//! Builds familiarity and recency matrices for a candidate set

use crate::error::Result;
use crate::relationships::matrix::{FamiliarityMatrix, RecencyMatrix};
use crate::storage::repository::{load_history, MatchRecord, MatchRepository};
use crate::types::{DateRange, PlayerId, Side};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Candidate members of each side of one match
fn same_side_candidates<'a>(
    entry: &'a MatchRecord,
    candidates: &HashSet<&str>,
) -> [Vec<&'a str>; 2] {
    let mut sides: [Vec<&str>; 2] = [Vec::new(), Vec::new()];
    for participation in &entry.participations {
        if candidates.contains(participation.player_id.as_str()) {
            let slot = match participation.side {
                Side::One => 0,
                Side::Two => 1,
            };
            sides[slot].push(participation.player_id.as_str());
        }
    }
    sides
}

fn for_each_pair(members: &[&str], mut f: impl FnMut(&str, &str)) {
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            f(a, b);
        }
    }
}

fn in_range(entry: &MatchRecord, range: Option<&DateRange>) -> bool {
    range.map_or(true, |r| r.contains(entry.record.played_at))
}

/// Count shared-side matches for every candidate pair
///
/// Cost is O(matches × players per match²).
pub fn familiarity_from_history(
    history: &[MatchRecord],
    candidates: &[PlayerId],
    range: Option<&DateRange>,
) -> FamiliarityMatrix {
    let candidates: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let mut matrix = FamiliarityMatrix::new();
    for entry in history.iter().filter(|e| in_range(e, range)) {
        for members in same_side_candidates(entry, &candidates) {
            for_each_pair(&members, |a, b| matrix.increment(a, b));
        }
    }
    matrix
}

/// Find the most recent shared-side date for every candidate pair
///
/// Matches are scanned newest first so the first date seen for a pair is
/// its latest one.
pub fn recency_from_history(
    history: &[MatchRecord],
    candidates: &[PlayerId],
    range: Option<&DateRange>,
) -> RecencyMatrix {
    let candidates: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let mut newest_first: Vec<&MatchRecord> =
        history.iter().filter(|e| in_range(e, range)).collect();
    newest_first.sort_by(|a, b| b.record.played_at.cmp(&a.record.played_at));

    let mut matrix = RecencyMatrix::new();
    for entry in newest_first {
        let played_at = entry.record.played_at;
        for members in same_side_candidates(entry, &candidates) {
            for_each_pair(&members, |a, b| {
                if matrix.last_shared(a, b).is_none() {
                    matrix.observe(a, b, played_at);
                }
            });
        }
    }
    matrix
}

/// Derives pairwise statistics from the match repository
pub struct PairwiseRelationshipAnalyzer {
    matches: Arc<dyn MatchRepository>,
}

impl PairwiseRelationshipAnalyzer {
    pub fn new(matches: Arc<dyn MatchRepository>) -> Self {
        Self { matches }
    }

    /// Familiarity among `candidates`, optionally restricted to a date window
    pub async fn build_familiarity(
        &self,
        candidates: &[PlayerId],
        range: Option<&DateRange>,
    ) -> Result<FamiliarityMatrix> {
        let history = load_history(self.matches.as_ref()).await?;
        let matrix = familiarity_from_history(&history, candidates, range);
        debug!(
            "Familiarity over {} matches: {} candidate pairs have teamed up",
            history.len(),
            matrix.len()
        );
        Ok(matrix)
    }

    /// Recency among `candidates`, optionally restricted to a date window
    pub async fn build_recency(
        &self,
        candidates: &[PlayerId],
        range: Option<&DateRange>,
    ) -> Result<RecencyMatrix> {
        let history = load_history(self.matches.as_ref()).await?;
        let matrix = recency_from_history(&history, candidates, range);
        debug!(
            "Recency over {} matches: {} candidate pairs have teamed up",
            history.len(),
            matrix.len()
        );
        Ok(matrix)
    }

    /// Both matrices from a single history load
    pub async fn build_all(
        &self,
        candidates: &[PlayerId],
        range: Option<&DateRange>,
    ) -> Result<(FamiliarityMatrix, RecencyMatrix)> {
        let history = load_history(self.matches.as_ref()).await?;
        Ok((
            familiarity_from_history(&history, candidates, range),
            recency_from_history(&history, candidates, range),
        ))
    }
}
