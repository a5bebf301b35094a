use crate::core::scoring::{compatibility_score, genders_compatible};
use crate::models::{Profile, ScoredCandidate};

/// Result of the matching process.
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
}

/// Pairwise matching engine.
///
/// # Pipeline
/// 1. Drop the profile itself, unapproved candidates, and same-gender pairs
/// 2. Score the survivors
/// 3. Keep scores at or above the threshold
/// 4. Stable sort descending by score (ties keep input order)
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    min_score: u8,
}

pub const DEFAULT_MIN_SCORE: u8 = 50;

impl Matcher {
    pub fn new(min_score: u8) -> Self {
        Self { min_score }
    }

    pub fn with_default_threshold() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
        }
    }

    pub fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Find matches for `profile` among `candidates`.
    ///
    /// Same-gender candidates are excluded here outright, independent of the
    /// scoring penalty; only approved candidates are ever surfaced.
    pub fn find_matches(&self, profile: &Profile, candidates: &[Profile]) -> MatchOutcome {
        let total_candidates = candidates.len();

        let mut matches: Vec<ScoredCandidate> = candidates
            .iter()
            .filter(|candidate| candidate.id != profile.id)
            .filter(|candidate| candidate.approved())
            .filter(|candidate| genders_compatible(profile, candidate))
            .filter_map(|candidate| {
                let (score, reasons) = compatibility_score(profile, candidate);
                if score >= self.min_score {
                    Some(ScoredCandidate {
                        profile_id: candidate.id.clone(),
                        score,
                        reasons,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stable sort: equal scores keep the candidates' input order.
        matches.sort_by(|a, b| b.score.cmp(&a.score));

        MatchOutcome {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_threshold()
    }
}
