//! Applies the active filter state to a job snapshot.
//!
//! Stages, in order, each narrowing the previous stage's output:
//! 1. split include pills into industry pills (matching a current facet) and search pills
//! 2. industry filter: keep jobs whose label matches any industry pill
//! 3. text filter: exact AND-substring mode or fuzzy mode over the joined search pills
//! 4. refinement: within the selected industry, drop jobs mentioning an excluded term
//! 5. exclusion: drop jobs mentioning any exclude pill
//!
//! Stages with nothing to do pass their input through untouched. Every stage keeps the
//! incoming order except fuzzy text search, which ranks by relevance.

use tracing::debug;

use crate::listing::facets::{is_facet_label, Facet};
use crate::listing::filters::FilterState;
use crate::listing::fuzzy::FuzzySearcher;
use crate::listing::matcher::{any_match, KeywordMatcher};
use crate::listing::snapshot::JobSnapshot;
use crate::models::job::{Job, JobField};

/// Pills up to this many characters (without spaces) switch the text filter to exact mode.
pub const EXACT_MODE_MAX_CHARS: usize = 6;
/// Fuzzy threshold for pill filtering.
pub const STRICT_FUZZY_THRESHOLD: f64 = 0.2;
/// Fuzzy threshold for the unfiltered live search.
pub const BASE_FUZZY_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Exact,
    Fuzzy,
}

/// Exact mode as soon as any pill is short and a single word; fuzzy otherwise.
pub fn text_mode<S: AsRef<str>>(pills: &[S]) -> TextMode {
    let any_short_word = pills.iter().any(|pill| {
        let pill: &str = pill.as_ref();
        pill.chars().count() <= EXACT_MODE_MAX_CHARS && !pill.contains(' ')
    });
    if any_short_word {
        TextMode::Exact
    } else {
        TextMode::Fuzzy
    }
}

/// Include pills naming a current facet, and everything else.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PillPartition<'a> {
    pub industry: Vec<&'a str>,
    pub search: Vec<&'a str>,
}

pub fn partition_pills<'a>(pills: &'a [String], facets: &[Facet]) -> PillPartition<'a> {
    let mut partition = PillPartition::default();
    for pill in pills {
        if is_facet_label(facets, pill) {
            partition.industry.push(pill.as_str());
        } else {
            partition.search.push(pill.as_str());
        }
    }
    partition
}

/// Runs every stage over `snapshot`, returning the surviving job indices in result order.
pub fn run(
    snapshot: &JobSnapshot,
    state: &FilterState,
    searcher: &dyn FuzzySearcher,
    threshold: f64,
) -> Vec<usize> {
    let mut selected = snapshot.all_indices();
    if state.is_empty() {
        return selected;
    }

    let pills = partition_pills(state.include_pills(), snapshot.facets());

    selected = filter_by_industry(snapshot, selected, &pills.industry);
    debug!(remaining = selected.len(), "industry filter applied");

    selected = filter_by_text(snapshot, selected, &pills.search, searcher, threshold);
    debug!(remaining = selected.len(), "text filter applied");

    selected = filter_by_refinement(snapshot, selected, state);
    debug!(remaining = selected.len(), "industry refinement applied");

    selected = filter_by_exclusion(snapshot, selected, state.exclude_pills());
    debug!(remaining = selected.len(), "exclude pills applied");

    selected
}

/// Convenience over [`run`] for a plain job slice; classifies on the fly.
#[cfg(test)]
pub fn filter_jobs(
    jobs: &[Job],
    state: &FilterState,
    searcher: &dyn FuzzySearcher,
    threshold: f64,
) -> Vec<Job> {
    let snapshot = JobSnapshot::new(0, jobs.to_vec());
    run(&snapshot, state, searcher, threshold)
        .into_iter()
        .filter_map(|i| snapshot.job(i).cloned())
        .collect()
}

fn filter_by_industry(
    snapshot: &JobSnapshot,
    selected: Vec<usize>,
    industry_pills: &[&str],
) -> Vec<usize> {
    if industry_pills.is_empty() {
        return selected;
    }
    selected
        .into_iter()
        .filter(|&i| {
            let label = snapshot.industry(i).label();
            industry_pills
                .iter()
                .any(|pill| label.eq_ignore_ascii_case(pill))
        })
        .collect()
}

fn filter_by_text(
    snapshot: &JobSnapshot,
    selected: Vec<usize>,
    search_pills: &[&str],
    searcher: &dyn FuzzySearcher,
    threshold: f64,
) -> Vec<usize> {
    if search_pills.is_empty() {
        return selected;
    }

    match text_mode(search_pills) {
        TextMode::Exact => selected
            .into_iter()
            .filter(|&i| {
                snapshot.job(i).is_some_and(|job| {
                    let text = job.search_text();
                    search_pills.iter().all(|pill| text.contains(pill))
                })
            })
            .collect(),
        TextMode::Fuzzy => {
            let query = search_pills.join(" ");
            let corpus: Vec<&Job> = selected.iter().filter_map(|&i| snapshot.job(i)).collect();
            searcher
                .search(&corpus, &JobField::SEARCHABLE, &query, threshold)
                .into_iter()
                .filter_map(|m| selected.get(m.index).copied())
                .collect()
        }
    }
}

fn filter_by_refinement(
    snapshot: &JobSnapshot,
    selected: Vec<usize>,
    state: &FilterState,
) -> Vec<usize> {
    let Some(industry) = state.selected_industry() else {
        return selected;
    };
    if state.excluded_terms().is_empty() {
        return selected;
    }

    let matchers: Vec<KeywordMatcher> = state
        .excluded_terms()
        .iter()
        .map(|t| KeywordMatcher::new(t))
        .collect();

    selected
        .into_iter()
        .filter(|&i| {
            if snapshot.industry(i) != industry {
                return true;
            }
            snapshot
                .job(i)
                .map_or(true, |job| !any_match(&matchers, &job.classification_text()))
        })
        .collect()
}

fn filter_by_exclusion(
    snapshot: &JobSnapshot,
    selected: Vec<usize>,
    exclude_pills: &[String],
) -> Vec<usize> {
    if exclude_pills.is_empty() {
        return selected;
    }

    let matchers: Vec<KeywordMatcher> = exclude_pills
        .iter()
        .map(|t| KeywordMatcher::new(t))
        .collect();

    selected
        .into_iter()
        .filter(|&i| {
            snapshot
                .job(i)
                .map_or(true, |job| !any_match(&matchers, &job.exclusion_text()))
        })
        .collect()
}
