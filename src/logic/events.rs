//! Security Event Channels & Summarizer
//!
//! Two independently configured event-log channels (A = Defender-style,
//! B = sysmon-style), each with its own event-id -> label map, reduced to
//! count-by-label summaries. Summarization is pure; channel reading is
//! platform-gated and degrades to an empty record list, never an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{CHANNEL_A_NAME, CHANNEL_B_NAME, MAX_CHANNEL_RECORDS};

// ============================================================================
// RAW RECORDS
// ============================================================================

/// One raw security-log record. Only `event_id` is required; the rest is
/// carried for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: u32,
    #[serde(default)]
    pub time_generated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub record_number: Option<u64>,
}

/// A named channel plus its id -> label map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub labels: BTreeMap<u32, String>,
}

impl ChannelConfig {
    /// Defender-operational-style channel (channel A).
    pub fn defender() -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(1006, "Malware detected".to_string());
        labels.insert(1007, "Malware action taken".to_string());
        labels.insert(1116, "Malware detected (state change)".to_string());
        labels.insert(1117, "Malware action taken (state change)".to_string());
        labels.insert(5001, "Real-time protection disabled".to_string());
        labels.insert(5007, "Platform configuration changed".to_string());
        Self {
            name: CHANNEL_A_NAME.to_string(),
            labels,
        }
    }

    /// Sysmon-operational-style channel (channel B).
    pub fn sysmon() -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(1, "Process creation".to_string());
        labels.insert(3, "Network connection".to_string());
        labels.insert(8, "CreateRemoteThread".to_string());
        labels.insert(11, "File created".to_string());
        labels.insert(12, "Registry object added".to_string());
        labels.insert(13, "Registry value set".to_string());
        labels.insert(22, "DNS query".to_string());
        Self {
            name: CHANNEL_B_NAME.to_string(),
            labels,
        }
    }

    /// Merge user-supplied labels over the defaults.
    pub fn with_extra_labels(mut self, extra: &BTreeMap<u32, String>) -> Self {
        for (id, label) in extra {
            self.labels.insert(*id, label.clone());
        }
        self
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Count for one labeled event id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub event_id: u32,
    pub label: String,
    pub count: u64,
}

/// Reduction of a raw record sequence. `by_label` iterates in ascending
/// event-id order and its counts sum to `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub total: u64,
    pub by_label: Vec<LabelCount>,
}

impl EventSummary {
    pub fn empty() -> Self {
        Self {
            total: 0,
            by_label: Vec::new(),
        }
    }

    /// Summed count of entries carrying exactly this label.
    pub fn count_for(&self, label: &str) -> u64 {
        self.by_label
            .iter()
            .filter(|lc| lc.label == label)
            .map(|lc| lc.count)
            .sum()
    }
}

/// Reduce raw records to an [`EventSummary`]. Pure and idempotent: no I/O,
/// no input mutation, identical inputs give identical output.
pub fn summarize_events(raw: &[EventRecord], labels: &BTreeMap<u32, String>) -> EventSummary {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for record in raw {
        *counts.entry(record.event_id).or_insert(0) += 1;
    }

    // BTreeMap iteration gives the ascending-event-id order contract.
    let by_label = counts
        .into_iter()
        .map(|(event_id, count)| LabelCount {
            event_id,
            label: labels
                .get(&event_id)
                .cloned()
                .unwrap_or_else(|| format!("Event {}", event_id)),
            count,
        })
        .collect();

    EventSummary {
        total: raw.len() as u64,
        by_label,
    }
}

// ============================================================================
// CHANNEL READING
// ============================================================================

/// Read raw records for a channel.
///
/// The native Windows event-log capability does not exist on this platform;
/// instead a lab run may inject a record stream as JSONL under the output
/// directory (`events/<file_stem>.jsonl`). A missing or unreadable file is an
/// absent channel: empty records, not an error. Bad lines are skipped and
/// reads are capped at [`MAX_CHANNEL_RECORDS`].
pub fn read_channel(out_dir: &Path, channel: &ChannelConfig) -> Vec<EventRecord> {
    let path = channel_file(out_dir, &channel.name);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(_) => {
            log::debug!("Channel {:?} unavailable ({:?})", channel.name, path);
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EventRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => log::debug!("Skipping bad record in {:?}: {}", path, e),
        }
        if records.len() >= MAX_CHANNEL_RECORDS {
            break;
        }
    }

    log::info!("Read {} records from channel {:?}", records.len(), channel.name);
    records
}

/// JSONL path for a channel, from a filesystem-safe stem of its name.
pub fn channel_file(out_dir: &Path, channel_name: &str) -> PathBuf {
    let stem: String = channel_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    out_dir.join("events").join(format!("{}.jsonl", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(event_id: u32) -> EventRecord {
        EventRecord {
            event_id,
            time_generated: None,
            source: None,
            record_number: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        let summary = summarize_events(&[], &BTreeMap::new());
        assert_eq!(summary.total, 0);
        assert!(summary.by_label.is_empty());
    }

    #[test]
    fn counts_sum_to_total() {
        let raw: Vec<EventRecord> = [3, 22, 3, 1, 3, 22].iter().map(|&id| record(id)).collect();
        let summary = summarize_events(&raw, &ChannelConfig::sysmon().labels);

        assert_eq!(summary.total, raw.len() as u64);
        let sum: u64 = summary.by_label.iter().map(|lc| lc.count).sum();
        assert_eq!(sum, summary.total);
    }

    #[test]
    fn by_label_orders_by_ascending_event_id() {
        let raw: Vec<EventRecord> = [22, 1, 3].iter().map(|&id| record(id)).collect();
        let summary = summarize_events(&raw, &ChannelConfig::sysmon().labels);

        let ids: Vec<u32> = summary.by_label.iter().map(|lc| lc.event_id).collect();
        assert_eq!(ids, vec![1, 3, 22]);
        assert_eq!(summary.by_label[1].label, "Network connection");
    }

    #[test]
    fn unlabeled_ids_get_synthesized_labels() {
        let raw = vec![record(9999)];
        let summary = summarize_events(&raw, &BTreeMap::new());
        assert_eq!(summary.by_label[0].label, "Event 9999");
    }

    #[test]
    fn summarization_is_deterministic() {
        let raw: Vec<EventRecord> = [3, 1006, 3, 22].iter().map(|&id| record(id)).collect();
        let labels = ChannelConfig::sysmon().labels;
        assert_eq!(summarize_events(&raw, &labels), summarize_events(&raw, &labels));
    }

    #[test]
    fn count_for_matches_label() {
        let raw: Vec<EventRecord> = [3, 3, 22].iter().map(|&id| record(id)).collect();
        let summary = summarize_events(&raw, &ChannelConfig::sysmon().labels);
        assert_eq!(summary.count_for("Network connection"), 2);
        assert_eq!(summary.count_for("DNS query"), 1);
        assert_eq!(summary.count_for("no such label"), 0);
    }

    #[test]
    fn missing_channel_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records = read_channel(dir.path(), &ChannelConfig::defender());
        assert!(records.is_empty());
    }

    #[test]
    fn jsonl_channel_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let channel = ChannelConfig::sysmon();
        let path = channel_file(dir.path(), &channel.name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "{\"event_id\": 3}\nnot json\n{\"event_id\": 22, \"source\": \"sysmon\"}\n",
        )
        .unwrap();

        let records = read_channel(dir.path(), &channel);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_id, 3);
        assert_eq!(records[1].source.as_deref(), Some("sysmon"));
    }
}
