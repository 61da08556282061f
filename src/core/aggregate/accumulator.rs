//! Partial aggregates
//!
//! Each accumulator is a plain value built from one stream of records. Two
//! accumulators combine with `merge`, which is associative, so a sequential
//! scan and a per-file parallel scan reduced in file order give identical
//! results. Nothing here depends on insertion order except `notes` (sorted
//! when the snapshot is built) and the first-seen condition display, which
//! follows merge order.

use crate::domain::records::{ConditionRecord, EncounterRecord};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A per-resource accumulator that can be fed raw records and merged
pub trait ResourceTally: Default + Send + 'static {
    /// File-name prefix of the resource type
    const RESOURCE: &'static str;

    /// Narrows one raw JSON object and accumulates it
    fn observe_json(&mut self, value: &Value);

    /// Combines two partial aggregates; `self` precedes `other` in file order
    fn merge(self, other: Self) -> Self;

    /// Records seen so far (including skipped ones)
    fn records_seen(&self) -> u64;
}

/// Running encounter aggregates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncounterTally {
    /// Every encounter read
    pub total: u64,

    /// Encounters per class code
    pub by_class: HashMap<String, u64>,

    /// Encounters per start day, kept sorted
    pub by_day: BTreeMap<String, u64>,

    /// Start instants per patient reference
    pub visits: HashMap<String, Vec<DateTime<Utc>>>,

    /// Sum of valid stays in whole milliseconds (integer so merge order
    /// cannot change the result)
    pub los_millis: u128,

    /// Number of valid stays
    pub los_count: u64,

    /// Data-quality notes in record order
    pub notes: Vec<String>,
}

impl EncounterTally {
    /// Accumulates one encounter
    pub fn observe(&mut self, record: &EncounterRecord) {
        self.total += 1;
        *self.by_class.entry(record.class_code.clone()).or_insert(0) += 1;

        let Some(day) = record.start_date() else {
            self.notes.push(missing_start_note(record));
            return;
        };
        *self.by_day.entry(day).or_insert(0) += 1;

        let start = record.start_instant();
        if start.is_none() {
            tracing::debug!(
                encounter = %record.id,
                "period.start has a date but no usable time; left out of revisit and stay"
            );
        }

        if let (Some(subject), Some(start)) = (&record.subject_reference, start) {
            self.visits.entry(subject.clone()).or_default().push(start);
        }

        if let (Some(start), Some(end)) = (start, record.end_instant()) {
            let stay = end - start;
            if stay >= Duration::zero() {
                self.los_millis += stay.num_milliseconds() as u128;
                self.los_count += 1;
            }
        }
    }
}

fn missing_start_note(record: &EncounterRecord) -> String {
    match &record.period_start {
        None => format!("Encounter {} is missing period.start", record.id),
        Some(raw) => format!(
            "Encounter {} has an unparsable period.start ({raw})",
            record.id
        ),
    }
}

impl ResourceTally for EncounterTally {
    const RESOURCE: &'static str = "Encounter";

    fn observe_json(&mut self, value: &Value) {
        self.observe(&EncounterRecord::from_json(value));
    }

    fn merge(mut self, other: Self) -> Self {
        self.total += other.total;
        for (class, count) in other.by_class {
            *self.by_class.entry(class).or_insert(0) += count;
        }
        for (day, count) in other.by_day {
            *self.by_day.entry(day).or_insert(0) += count;
        }
        for (subject, starts) in other.visits {
            self.visits.entry(subject).or_default().extend(starts);
        }
        self.los_millis += other.los_millis;
        self.los_count += other.los_count;
        self.notes.extend(other.notes);
        self
    }

    fn records_seen(&self) -> u64 {
        self.total
    }
}

/// Count and first-seen display for one condition code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEntry {
    pub display: String,
    pub count: u64,
}

/// Running condition frequencies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionTally {
    /// Entries per code
    pub by_code: HashMap<String, ConditionEntry>,

    /// Records read, including ones without a usable coding
    pub records: u64,

    /// Records skipped for lacking both code and display
    pub skipped: u64,
}

impl ConditionTally {
    /// Accumulates one condition; the first display seen for a code is kept
    pub fn observe(&mut self, record: ConditionRecord) {
        self.by_code
            .entry(record.code)
            .and_modify(|entry| entry.count += 1)
            .or_insert(ConditionEntry {
                display: record.display,
                count: 1,
            });
    }
}

impl ResourceTally for ConditionTally {
    const RESOURCE: &'static str = "Condition";

    fn observe_json(&mut self, value: &Value) {
        self.records += 1;
        match ConditionRecord::from_json(value) {
            Some(record) => self.observe(record),
            None => self.skipped += 1,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (code, entry) in other.by_code {
            self.by_code
                .entry(code)
                .and_modify(|existing| existing.count += entry.count)
                .or_insert(entry);
        }
        self.records += other.records;
        self.skipped += other.skipped;
        self
    }

    fn records_seen(&self) -> u64 {
        self.records
    }
}
