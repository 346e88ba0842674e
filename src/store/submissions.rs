use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::models::{NewSubmission, Submission};

/// In-memory assessment storage keyed by generated submission id.
///
/// Each entry remembers the sequence number it was created with, so listings
/// come back in submission order even though the map itself is unordered.
pub struct SubmissionStore {
    entries: DashMap<String, (u64, Submission)>,
    counter: AtomicU64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStats {
    pub total_submissions: usize,
    pub experience_levels: BTreeMap<String, u64>,
    pub top_skills: BTreeMap<String, u64>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            counter: AtomicU64::new(0),
        }
    }

    /// Store a record under a fresh id owned by `owner_id`.
    pub fn submit(&self, record: NewSubmission, owner_id: &str) -> Submission {
        loop {
            let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
            let now = Utc::now();
            let id = format!("ASSESS_{seq}_{}", now.timestamp_millis());

            if let Entry::Vacant(slot) = self.entries.entry(id.clone()) {
                let submission = record.into_submission(id, owner_id.to_string(), now);
                slot.insert((seq, submission.clone()));
                return submission;
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Submission> {
        self.entries.get(id).map(|entry| entry.value().1.clone())
    }

    pub fn list_all(&self) -> Vec<Submission> {
        self.collect(|_| true)
    }

    pub fn list_by_owner(&self, owner_id: &str) -> Vec<Submission> {
        self.collect(|s| s.user_id == owner_id)
    }

    pub fn delete(&self, id: &str) -> Option<Submission> {
        self.entries.remove(id).map(|(_, (_, submission))| submission)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Totals by experience level and by skill over the current contents.
    pub fn stats(&self) -> SubmissionStats {
        let mut stats = SubmissionStats::default();
        for entry in self.entries.iter() {
            let submission = &entry.value().1;
            stats.total_submissions += 1;
            *stats
                .experience_levels
                .entry(submission.experience.clone())
                .or_insert(0) += 1;
            for skill in &submission.skills {
                *stats.top_skills.entry(skill.clone()).or_insert(0) += 1;
            }
        }
        stats
    }

    fn collect(&self, keep: impl Fn(&Submission) -> bool) -> Vec<Submission> {
        let mut found: Vec<(u64, Submission)> = self
            .entries
            .iter()
            .filter(|entry| keep(&entry.value().1))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|(seq, _)| *seq);
        found.into_iter().map(|(_, s)| s).collect()
    }
}

impl Default for SubmissionStore {
    fn default() -> Self {
        Self::new()
    }
}
