//! Tiered fuzzy scoring and ranking of candidate names.
//!
//! A candidate is scored against a query in one of four tiers: exact match,
//! prefix, contiguous substring, or ordered subsequence. Everything is
//! compared on lowercase forms. Ranking adds a usage boost on top of the raw
//! match score and keeps the input order for equal scores.

use std::cmp::Ordering;

pub const EXACT_MATCH_SCORE: i32 = 10_000;
pub const PREFIX_MATCH_SCORE: i32 = 5_000;
pub const SUBSTRING_MATCH_SCORE: i32 = 2_000;

const PREFIX_PER_CHAR: i32 = 10;
const SUBSTRING_PER_CHAR: i32 = 5;

const SUBSEQUENCE_PER_CHAR: i32 = 10;
const CONSECUTIVE_PER_CHAR: i32 = 30;
const FIRST_CHAR_BONUS: i32 = 50;
const WORD_BOUNDARY_BONUS: i32 = 25;

/// Raw scores below this are treated as noise and never ranked. Prefix and
/// substring tiers always clear it.
pub const MIN_MATCH_SCORE: i32 = 50;

/// Each recorded use of a candidate is worth this many points.
pub const USAGE_BOOST: i32 = 100;

/// A ranked candidate. `index` points into the slices passed to [`rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub score: i32,
    pub index: usize,
}

/// Scores `candidate` against `query`, case-insensitively. Returns 0 when the
/// query characters do not appear in the candidate in order.
pub fn score(query: &str, candidate: &str) -> i32 {
    let query_lower = query.to_lowercase();
    let query_chars: Vec<char> = query_lower.chars().collect();
    score_prepared(&query_lower, &query_chars, candidate)
}

fn score_prepared(query_lower: &str, query_chars: &[char], candidate: &str) -> i32 {
    let candidate_lower = candidate.to_lowercase();
    let query_len = query_chars.len() as i32;

    if candidate_lower == query_lower {
        return EXACT_MATCH_SCORE;
    }
    if candidate_lower.starts_with(query_lower) {
        return PREFIX_MATCH_SCORE + query_len * PREFIX_PER_CHAR;
    }
    if candidate_lower.contains(query_lower) {
        return SUBSTRING_MATCH_SCORE + query_len * SUBSTRING_PER_CHAR;
    }

    subsequence_score(query_chars, candidate)
}

/// Walks the lowercased candidate once, advancing through the query whenever
/// the characters agree. Boundaries are judged on the lowercase form too, so
/// casing never changes a score.
fn subsequence_score(query: &[char], candidate: &str) -> i32 {
    if query.is_empty() {
        return 0;
    }

    let mut query_index = 0;
    let mut consecutive = 0;
    let mut max_consecutive = 0;
    let mut total = 0;
    let mut word_boundary_bonus = 0;
    let mut first_char_bonus = 0;
    let mut previous: Option<char> = None;

    for (position, lower) in candidate.chars().flat_map(char::to_lowercase).enumerate() {
        if query_index == query.len() {
            break;
        }

        if lower == query[query_index] {
            total += SUBSEQUENCE_PER_CHAR;
            consecutive += 1;
            max_consecutive = max_consecutive.max(consecutive);

            if query_index == 0 && position == 0 {
                first_char_bonus = FIRST_CHAR_BONUS;
            }
            if previous.is_some_and(is_word_boundary) {
                word_boundary_bonus += WORD_BOUNDARY_BONUS;
            }

            query_index += 1;
        } else {
            consecutive = 0;
        }

        previous = Some(lower);
    }

    if query_index < query.len() {
        return 0;
    }

    total + max_consecutive * CONSECUTIVE_PER_CHAR + word_boundary_bonus + first_char_bonus
}

#[inline]
fn is_word_boundary(c: char) -> bool {
    matches!(c, ' ' | '-' | '_' | '.' | '/' | '\\')
}

#[inline]
fn usage_boost(usage_scores: &[u32], index: usize) -> i32 {
    let usage = usage_scores.get(index).copied().unwrap_or(0);
    i32::try_from(usage)
        .unwrap_or(i32::MAX)
        .saturating_mul(USAGE_BOOST)
}

/// Ranks `candidates` against `query`.
///
/// `usage_scores` is parallel to `candidates`; missing entries count as zero.
/// With an empty query every candidate is returned, ordered by usage alone.
/// Otherwise only candidates whose raw score reaches [`MIN_MATCH_SCORE`] are
/// kept, and the usage boost is added afterwards.
///
/// Output is sorted by score descending, ties keep the input order.
#[tracing::instrument(skip_all, fields(candidates = candidates.len()), level = tracing::Level::DEBUG)]
pub fn rank<S: AsRef<str>>(query: &str, candidates: &[S], usage_scores: &[u32]) -> Vec<Match> {
    let mut matches: Vec<Match> = if query.is_empty() {
        (0..candidates.len())
            .map(|index| Match {
                score: usage_boost(usage_scores, index),
                index,
            })
            .collect()
    } else {
        let query_lower = query.to_lowercase();
        let query_chars: Vec<char> = query_lower.chars().collect();

        candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let raw = score_prepared(&query_lower, &query_chars, candidate.as_ref());
                (raw >= MIN_MATCH_SCORE).then(|| Match {
                    score: raw.saturating_add(usage_boost(usage_scores, index)),
                    index,
                })
            })
            .collect()
    };

    glidesort::sort_by(&mut matches, compare_matches);
    matches
}

#[inline]
fn compare_matches(a: &Match, b: &Match) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.index.cmp(&b.index))
}
