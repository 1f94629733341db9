use std::sync::Arc;

use crate::listing::classifier::classify;
use crate::listing::facets::{aggregate_labels, Facet};
use crate::listing::taxonomy::Industry;
use crate::models::job::Job;

/// An immutable job set as returned by one bulk fetch, classified once on construction.
///
/// `generation` identifies the fetch; anything memoised against a snapshot keys on it.
#[derive(Debug, Clone, Default)]
pub struct JobSnapshot {
    generation: u64,
    jobs: Vec<Job>,
    industries: Vec<Industry>,
    facets: Vec<Facet>,
}

impl JobSnapshot {
    pub fn new(generation: u64, jobs: Vec<Job>) -> Self {
        let industries: Vec<Industry> = jobs.iter().map(classify).collect();
        let facets = aggregate_labels(industries.iter().copied());
        Self {
            generation,
            jobs,
            industries,
            facets,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The same classified jobs under another generation id.
    pub fn with_generation(self, generation: u64) -> Self {
        Self { generation, ..self }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn job(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    /// Label of the job at `index`; `Other` for an index outside the snapshot.
    pub fn industry(&self, index: usize) -> Industry {
        self.industries
            .get(index)
            .copied()
            .unwrap_or(Industry::Other)
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.jobs.len()).collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<(usize, &Job)> {
        self.jobs.iter().enumerate().find(|(_, job)| job.id == id)
    }
}

/// Single-slot memo: keeps the value computed for the most recent key.
#[derive(Debug)]
pub struct Memo<K, V> {
    slot: Option<(K, Arc<V>)>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn get_or_compute<F>(&mut self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        if let Some((cached_key, value)) = &self.slot {
            if *cached_key == key {
                return Arc::clone(value);
            }
        }
        let value = Arc::new(compute());
        self.slot = Some((key, Arc::clone(&value)));
        value
    }
}
