//! MITRE ATT&CK Mapping
//!
//! Maps raw event ids to technique identifiers for the report layer.
//! Looked up per distinct id, display only.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::logic::events::EventSummary;

/// Event id -> ATT&CK technique ids (sample subset).
static ATTACK_MAPPING: Lazy<HashMap<u32, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<u32, &'static [&'static str]> = HashMap::new();

    // Sysmon event ids
    m.insert(1, &["T1059", "T1204"]); // Process creation
    m.insert(3, &["T1048"]); // Network connection
    m.insert(8, &["T1055"]); // CreateRemoteThread
    m.insert(11, &["T1003", "T1552"]); // File created
    m.insert(12, &["T1136", "T1137"]); // Registry object added
    m.insert(13, &["T1112"]); // Registry value set
    m.insert(22, &["T1071"]); // DNS query

    // Defender event ids
    m.insert(1006, &["T1204.002"]); // Malicious file detected
    m.insert(1116, &["T1204.002"]); // Malicious file detected

    m
});

/// Technique ids for one event id, if mapped.
pub fn techniques_for(event_id: u32) -> Option<&'static [&'static str]> {
    ATTACK_MAPPING.get(&event_id).copied()
}

/// Technique annotations for every distinct mapped id in a summary,
/// in the summary's (ascending-id) order.
pub fn annotate_summary(summary: &EventSummary) -> Vec<(u32, Vec<&'static str>)> {
    summary
        .by_label
        .iter()
        .filter_map(|lc| techniques_for(lc.event_id).map(|t| (lc.event_id, t.to_vec())))
        .collect()
}
