//! Scores a job against every industry and picks the best label.
//!
//! Score = number of the industry's keywords present in `title + " " + summary`.
//! The highest positive score wins; ties go to the industry declared first in the taxonomy.
//! No positive score means `Industry::Other`.

use std::sync::LazyLock;

use crate::listing::matcher::{normalize, KeywordMatcher};
use crate::listing::taxonomy::Industry;
use crate::models::job::Job;

// Keyword matchers compiled once for the whole process.
static TAXONOMY_MATCHERS: LazyLock<Vec<(Industry, Vec<KeywordMatcher>)>> = LazyLock::new(|| {
    Industry::CLASSIFIED
        .iter()
        .map(|industry| {
            let matchers = industry
                .keywords()
                .iter()
                .map(|kw| KeywordMatcher::new(kw))
                .collect();
            (*industry, matchers)
        })
        .collect()
});

/// Per-industry keyword hit counts, in taxonomy order.
pub fn score_industries(text: &str) -> Vec<(Industry, usize)> {
    let normalized = normalize(text);
    TAXONOMY_MATCHERS
        .iter()
        .map(|(industry, matchers)| {
            let score = matchers
                .iter()
                .filter(|m| m.is_match_normalized(&normalized))
                .count();
            (*industry, score)
        })
        .collect()
}

pub fn classify_text(text: &str) -> Industry {
    let mut best: Option<(Industry, usize)> = None;
    for (industry, score) in score_industries(text) {
        if score == 0 {
            continue;
        }
        // Strictly greater: an equal score never displaces an earlier industry.
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((industry, score));
        }
    }
    best.map(|(industry, _)| industry).unwrap_or(Industry::Other)
}

pub fn classify(job: &Job) -> Industry {
    classify_text(&job.classification_text())
}
