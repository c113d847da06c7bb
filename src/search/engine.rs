//! Fuzzy matcher: ordered-subsequence filtering with deterministic ranking.
//!
//! A candidate matches when every query character appears in its label, in
//! order, ignoring case. Matches are ranked by [`MatchScore`]; equal scores
//! keep the order the source produced them in.

use crate::candidate::Candidate;
use crate::search::types::{MatchScore, ScoredCandidate};

/// Characters after which a match counts as starting at a word boundary.
const SEPARATORS: [char; 4] = ['-', '_', '/', ' '];

/// Filter and rank `candidates` against `query`.
///
/// An empty query keeps every candidate, in input order, with a uniform score.
/// Non-matching candidates are dropped rather than ranked last.
pub fn fuzzy_match(query: &str, candidates: &[Candidate]) -> Vec<ScoredCandidate> {
    let needle: Vec<char> = query.chars().map(fold_case).collect();
    if needle.is_empty() {
        return candidates
            .iter()
            .cloned()
            .map(ScoredCandidate::unranked)
            .collect();
    }

    let mut results: Vec<ScoredCandidate> = candidates
        .iter()
        .filter_map(|candidate| {
            score_label(&needle, &candidate.label).map(|m| ScoredCandidate {
                candidate: candidate.clone(),
                score: m.score,
                positions: m.positions,
            })
        })
        .collect();

    // sort_by is stable, so ties stay in snapshot order
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

/// Whether `query` is a case-insensitive ordered subsequence of `label`.
pub fn is_subsequence(query: &str, label: &str) -> bool {
    let needle: Vec<char> = query.chars().map(fold_case).collect();
    let hay: Vec<char> = label.chars().map(fold_case).collect();
    align_from(&needle, &hay, 0).is_some()
}

struct LabelMatch {
    score: MatchScore,
    positions: Vec<usize>,
}

fn score_label(needle: &[char], label: &str) -> Option<LabelMatch> {
    let hay: Vec<char> = label.chars().map(fold_case).collect();
    if needle.len() > hay.len() {
        return None;
    }
    let label_len = hay.len();

    if let Some(start) = find_substring(needle, &hay) {
        return Some(LabelMatch {
            score: MatchScore {
                contiguous: true,
                at_boundary: is_boundary(&hay, start),
                gaps: 0,
                label_len,
            },
            positions: (start..start + needle.len()).collect(),
        });
    }

    let leftmost = align_from(needle, &hay, 0)?;
    let leftmost_score = scattered_score(&hay, &leftmost);

    // If aligning from the first boundary that starts with the needle's head
    // fails, aligning from any later boundary fails too.
    let anchored = (0..hay.len())
        .find(|&i| hay[i] == needle[0] && is_boundary(&hay, i))
        .and_then(|start| align_from(needle, &hay, start))
        .map(|positions| {
            let score = scattered_score(&hay, &positions);
            (score, positions)
        });

    let (score, positions) = match anchored {
        Some((score, positions)) if score > leftmost_score => (score, positions),
        _ => (leftmost_score, leftmost),
    };
    Some(LabelMatch { score, positions })
}

fn scattered_score(hay: &[char], positions: &[usize]) -> MatchScore {
    MatchScore {
        contiguous: false,
        at_boundary: positions.first().is_some_and(|&p| is_boundary(hay, p)),
        gaps: positions.windows(2).filter(|w| w[1] != w[0] + 1).count(),
        label_len: hay.len(),
    }
}

/// First occurrence of `needle` in `hay`, preferring one at a word boundary.
fn find_substring(needle: &[char], hay: &[char]) -> Option<usize> {
    let mut first = None;
    for (start, window) in hay.windows(needle.len()).enumerate() {
        if window == needle {
            if is_boundary(hay, start) {
                return Some(start);
            }
            first.get_or_insert(start);
        }
    }
    first
}

/// Greedy left-to-right alignment of `needle` in `hay` starting at `start`.
fn align_from(needle: &[char], hay: &[char], start: usize) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut wanted = needle.iter().peekable();
    for (i, &c) in hay.iter().enumerate().skip(start) {
        match wanted.peek() {
            Some(&&w) if w == c => {
                positions.push(i);
                wanted.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    (positions.len() == needle.len()).then_some(positions)
}

fn is_boundary(hay: &[char], index: usize) -> bool {
    index == 0 || SEPARATORS.contains(&hay[index - 1])
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
