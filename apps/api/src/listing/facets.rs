use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(test)]
use crate::listing::classifier::classify;
use crate::listing::taxonomy::Industry;
#[cfg(test)]
use crate::models::job::Job;

/// Industries need at least this many jobs to be offered as a filter.
pub const MIN_FACET_COUNT: usize = 2;

/// An industry offered as a selectable filter, with the number of jobs classified to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub industry: Industry,
    pub count: usize,
}

/// Tallies already-classified labels into facets, most populated first.
///
/// Singleton industries are dropped. Equal counts keep taxonomy order (`Other` last).
pub fn aggregate_labels<I>(labels: I) -> Vec<Facet>
where
    I: IntoIterator<Item = Industry>,
{
    let mut counts: BTreeMap<Industry, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut facets: Vec<Facet> = counts
        .into_iter()
        .filter(|(_, count)| *count >= MIN_FACET_COUNT)
        .map(|(industry, count)| Facet { industry, count })
        .collect();
    facets.sort_by(|a, b| b.count.cmp(&a.count));
    facets
}

/// Classifies every job and aggregates the labels.
#[cfg(test)]
pub fn aggregate(jobs: &[Job]) -> Vec<Facet> {
    aggregate_labels(jobs.iter().map(classify))
}

/// True when `term` names one of `facets` (case-insensitively).
pub fn is_facet_label(facets: &[Facet], term: &str) -> bool {
    facets
        .iter()
        .any(|f| f.industry.label().eq_ignore_ascii_case(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str) -> Job {
        Job {
            title: title.to_string(),
            ..Job::default()
        }
    }

    #[test]
    fn test_singleton_industry_is_dropped() {
        let jobs = vec![
            job("Python engineer"),
            job("Python data wrangler with pandas"),
            job("Copywriter"),
        ];
        let facets = aggregate(&jobs);
        assert_eq!(
            facets,
            vec![Facet {
                industry: Industry::Python,
                count: 2
            }]
        );
    }

    #[test]
    fn test_sorted_by_count_descending() {
        let jobs = vec![
            job("Copywriter"),
            job("Copywriter"),
            job("Bookkeeping"),
            job("Bookkeeping"),
            job("Bookkeeping"),
            job("Forklift"),
            job("Forklift"),
        ];
        let facets = aggregate(&jobs);
        assert_eq!(facets.len(), 3);
        assert!(facets.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(facets[0].industry, Industry::Finance);
        assert_eq!(facets[0].count, 3);
    }

    #[test]
    fn test_other_is_a_facet_when_populated() {
        let facets = aggregate(&[job("Forklift"), job("Barista")]);
        assert_eq!(facets[0].industry, Industry::Other);
        assert_eq!(facets[0].count, 2);
    }

    #[test]
    fn test_empty_job_set_has_no_facets() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_is_facet_label_ignores_case() {
        let facets = vec![Facet {
            industry: Industry::VideoAudio,
            count: 4,
        }];
        assert!(is_facet_label(&facets, "video & audio"));
        assert!(!is_facet_label(&facets, "video"));
    }
}
