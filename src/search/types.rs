//! Types produced by the fuzzy matcher.

use std::cmp::Ordering;

use crate::candidate::Candidate;

/// Ranking key for one match.
///
/// Ordered by, in priority: contiguous substring over scattered subsequence,
/// match starting at a word boundary, fewer gaps between matched characters,
/// shorter label. Greater is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScore {
    /// The query appears as a contiguous substring of the label
    pub contiguous: bool,
    /// The match starts at the label's beginning or right after a separator
    pub at_boundary: bool,
    /// Number of breaks between consecutive matched characters
    pub gaps: usize,
    /// Label length in characters
    pub label_len: usize,
}

impl MatchScore {
    /// The score every candidate gets for an empty query.
    pub const UNIFORM: MatchScore = MatchScore {
        contiguous: true,
        at_boundary: true,
        gaps: 0,
        label_len: 0,
    };
}

impl Ord for MatchScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.contiguous
            .cmp(&other.contiguous)
            .then(self.at_boundary.cmp(&other.at_boundary))
            .then(other.gaps.cmp(&self.gaps))
            .then(other.label_len.cmp(&self.label_len))
    }
}

impl PartialOrd for MatchScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A candidate that survived filtering, with its score and the character
/// positions of the label that matched the query (for highlighting).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: MatchScore,
    pub positions: Vec<usize>,
}

impl ScoredCandidate {
    /// Wrap a candidate for an empty query: uniform score, nothing highlighted.
    pub fn unranked(candidate: Candidate) -> Self {
        Self {
            candidate,
            score: MatchScore::UNIFORM,
            positions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(contiguous: bool, at_boundary: bool, gaps: usize, label_len: usize) -> MatchScore {
        MatchScore {
            contiguous,
            at_boundary,
            gaps,
            label_len,
        }
    }

    #[test]
    fn contiguous_outranks_everything_else() {
        assert!(score(true, false, 0, 40) > score(false, true, 0, 3));
    }

    #[test]
    fn boundary_outranks_gaps_and_length() {
        assert!(score(false, true, 3, 40) > score(false, false, 1, 3));
    }

    #[test]
    fn fewer_gaps_outrank_shorter_labels() {
        assert!(score(false, false, 1, 40) > score(false, false, 2, 3));
    }

    #[test]
    fn shorter_label_wins_when_quality_is_equal() {
        assert!(score(true, true, 0, 5) > score(true, true, 0, 6));
        assert_eq!(score(true, true, 0, 5).cmp(&score(true, true, 0, 5)), Ordering::Equal);
    }
}
