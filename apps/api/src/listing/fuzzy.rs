//! Pluggable approximate matching over job text fields.
//!
//! Default: `ApproximateSearcher`, an approximate-substring matcher scored the way
//! bitap-style searchers score: `errors / pattern_len + |match_start - location| / distance`.
//! 0.0 is a perfect match at the expected location; a job matches when at least one field
//! scores at or below the threshold.
//!
//! The pipeline only sees `dyn FuzzySearcher`, so the algorithm can be swapped without
//! touching the filter stages.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::job::{Job, JobField};

/// A corpus entry returned by a search, `index` being its position in the searched corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuzzyMatch {
    pub index: usize,
    /// 0.0 = perfect; larger is worse.
    pub score: f64,
}

/// The fuzzy search trait. Results come back ranked best-first.
pub trait FuzzySearcher: Send + Sync {
    fn search(
        &self,
        corpus: &[&Job],
        fields: &[JobField],
        query: &str,
        threshold: f64,
    ) -> Vec<FuzzyMatch>;
}

/// Approximate-substring searcher with a proximity penalty.
#[derive(Debug, Clone)]
pub struct ApproximateSearcher {
    /// Character offset where a match is expected to start.
    pub location: usize,
    /// How far (in characters) a match may drift from `location` before the proximity
    /// penalty alone reaches 1.0. Zero disables the proximity penalty.
    pub distance: usize,
}

impl Default for ApproximateSearcher {
    fn default() -> Self {
        Self {
            location: 0,
            distance: 100,
        }
    }
}

impl FuzzySearcher for ApproximateSearcher {
    fn search(
        &self,
        corpus: &[&Job],
        fields: &[JobField],
        query: &str,
        threshold: f64,
    ) -> Vec<FuzzyMatch> {
        let pattern: Vec<char> = query.trim().to_lowercase().chars().collect();
        if pattern.is_empty() || fields.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<FuzzyMatch> = corpus
            .iter()
            .enumerate()
            .filter_map(|(index, job)| {
                self.score_job(job, fields, &pattern, threshold)
                    .map(|score| FuzzyMatch { index, score })
            })
            .collect();

        // Stable: equal scores keep corpus order.
        matches.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
        matches
    }
}

impl ApproximateSearcher {
    /// Combines the scores of every field under the threshold. Each field score is weighted
    /// by a length norm (short fields count more), and matching in more fields improves the
    /// total. `None` when no field matches.
    fn score_job(
        &self,
        job: &Job,
        fields: &[JobField],
        pattern: &[char],
        threshold: f64,
    ) -> Option<f64> {
        let mut total = 1.0_f64;
        let mut matched = false;

        for field in fields {
            let text = job.field(*field);
            if text.is_empty() {
                continue;
            }
            let Some(score) = self.score_field(text, pattern) else {
                continue;
            };
            if score > threshold {
                continue;
            }
            matched = true;
            total *= score.max(f64::EPSILON).powf(field_norm(text));
        }

        matched.then_some(total)
    }

    /// Best score of `pattern` against any substring of `text`.
    fn score_field(&self, text: &str, pattern: &[char]) -> Option<f64> {
        let text: Vec<char> = text.to_lowercase().chars().collect();
        let m = pattern.len();
        if m == 0 || text.is_empty() {
            return None;
        }

        // Semi-global edit distance: a match may start anywhere in the text. Alongside each
        // cost we carry the text offset the match started at, for the proximity penalty.
        let mut prev_cost: Vec<usize> = (0..=m).collect();
        let mut prev_start: Vec<usize> = vec![0; m + 1];
        let mut cost = vec![0usize; m + 1];
        let mut start = vec![0usize; m + 1];
        let mut best: Option<f64> = None;

        for (j, tc) in text.iter().enumerate() {
            cost[0] = 0;
            start[0] = j + 1;
            for i in 1..=m {
                let substitution = prev_cost[i - 1] + usize::from(pattern[i - 1] != *tc);
                let skip_pattern = cost[i - 1] + 1;
                let skip_text = prev_cost[i] + 1;

                if substitution <= skip_pattern && substitution <= skip_text {
                    cost[i] = substitution;
                    start[i] = prev_start[i - 1];
                } else if skip_pattern <= skip_text {
                    cost[i] = skip_pattern;
                    start[i] = start[i - 1];
                } else {
                    cost[i] = skip_text;
                    start[i] = prev_start[i];
                }
            }

            let score = self.compute_score(cost[m], m, start[m]);
            if best.map_or(true, |b| score < b) {
                best = Some(score);
            }

            std::mem::swap(&mut prev_cost, &mut cost);
            std::mem::swap(&mut prev_start, &mut start);
        }

        best
    }

    fn compute_score(&self, errors: usize, pattern_len: usize, match_start: usize) -> f64 {
        let accuracy = errors as f64 / pattern_len as f64;
        if self.distance == 0 {
            return accuracy;
        }
        let proximity = match_start.abs_diff(self.location);
        accuracy + proximity as f64 / self.distance as f64
    }
}

fn field_norm(text: &str) -> f64 {
    let tokens = text.split_whitespace().count().max(1);
    1.0 / (tokens as f64).sqrt()
}
