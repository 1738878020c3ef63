//! Heuristic Scorer
//!
//! Deterministic, explainable scoring from aggregate features: five
//! saturating factors, exact weights, clamp to [0, 1], threshold-gated notes.

use crate::logic::events::EventSummary;
use crate::logic::sampler::FeatureRow;

use super::rules::*;
use super::types::{Aggregates, ScoreResult};

/// Arithmetic means over the whole history plus channel totals.
///
/// Re-averaging the full history on every call is the documented contract:
/// the incremental score is a smoothing function of the run so far, not of
/// the latest sample, and the timeline curves depend on it. O(rows) per call.
pub fn aggregates(
    rows: &[FeatureRow],
    channel_a: &EventSummary,
    channel_b: &EventSummary,
) -> Aggregates {
    let n = rows.len() as f64;
    let (mean_cpu, mean_threads, mean_tcp) = if rows.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (
            rows.iter().map(|r| r.cpu_percent).sum::<f64>() / n,
            rows.iter().map(|r| r.thread_count as f64).sum::<f64>() / n,
            rows.iter().map(|r| r.established_tcp_count as f64).sum::<f64>() / n,
        )
    };

    Aggregates {
        mean_cpu,
        mean_threads,
        mean_tcp,
        channel_a_total: channel_a.total as f64,
        channel_b_network: channel_b.count_for(LABEL_NETWORK) as f64,
        channel_b_dns: channel_b.count_for(LABEL_DNS) as f64,
    }
}

/// Saturating linear ramp: caps at 1.0 before the weight is applied.
fn ramp(value: f64, divisor: f64, weight: f64) -> f64 {
    (value / divisor).min(1.0) * weight
}

/// Heuristic likelihood over the full row history so far.
///
/// Empty history is not an error: likelihood 0.0, no parts, one note.
pub fn heuristic(
    rows: &[FeatureRow],
    channel_a: &EventSummary,
    channel_b: &EventSummary,
) -> ScoreResult {
    if rows.is_empty() {
        return ScoreResult {
            likelihood: 0.0,
            parts: Vec::new(),
            notes: vec!["no telemetry".to_string()],
        };
    }

    let agg = aggregates(rows, channel_a, channel_b);
    let b_activity = agg.channel_b_network + agg.channel_b_dns;

    let parts = vec![
        (FACTOR_CPU.to_string(), ramp(agg.mean_cpu, CPU_DIVISOR, CPU_WEIGHT)),
        (FACTOR_THREADS.to_string(), ramp(agg.mean_threads, THREAD_DIVISOR, THREAD_WEIGHT)),
        (FACTOR_TCP.to_string(), ramp(agg.mean_tcp, TCP_DIVISOR, TCP_WEIGHT)),
        (FACTOR_CHANNEL_A.to_string(), ramp(agg.channel_a_total, CHANNEL_A_DIVISOR, CHANNEL_A_WEIGHT)),
        (FACTOR_CHANNEL_B.to_string(), ramp(b_activity, CHANNEL_B_DIVISOR, CHANNEL_B_WEIGHT)),
    ];

    let mut notes = Vec::new();
    if agg.mean_cpu > CPU_NOTE_THRESHOLD {
        notes.push(format!("Elevated CPU: {:.1}%", agg.mean_cpu));
    }
    if agg.mean_threads > THREAD_NOTE_THRESHOLD {
        notes.push(format!("High thread count: {:.0}", agg.mean_threads));
    }
    if agg.mean_tcp > TCP_NOTE_THRESHOLD {
        notes.push(format!("Multiple TCP connections: {:.0}", agg.mean_tcp));
    }
    if channel_a.total > 0 {
        notes.push(format!("Channel A events observed: {}", channel_a.total));
    }
    if b_activity > 0.0 {
        notes.push(format!("Channel B net/dns: {}", b_activity as u64));
    }

    let likelihood = parts.iter().map(|(_, v)| v).sum::<f64>().clamp(0.0, 1.0);

    ScoreResult {
        likelihood,
        parts,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::events::{summarize_events, ChannelConfig, EventRecord};
    use std::collections::BTreeMap;

    fn row(cpu: f64, threads: u32, tcp: u32) -> FeatureRow {
        FeatureRow {
            ts: 0.0,
            cpu_percent: cpu,
            memory_percent: 0.0,
            thread_count: threads,
            open_file_count: 0,
            established_tcp_count: tcp,
            handle_count: None,
            bytes_sent_rate: 0.0,
            bytes_recv_rate: 0.0,
            remote_ips: vec![],
        }
    }

    fn summary_of(ids: &[u32], cfg: &ChannelConfig) -> EventSummary {
        let raw: Vec<EventRecord> = ids
            .iter()
            .map(|&event_id| EventRecord {
                event_id,
                time_generated: None,
                source: None,
                record_number: None,
            })
            .collect();
        summarize_events(&raw, &cfg.labels)
    }

    #[test]
    fn empty_history_scores_zero_with_one_note() {
        let result = heuristic(&[], &EventSummary::empty(), &EventSummary::empty());
        assert_eq!(result.likelihood, 0.0);
        assert!(result.parts.is_empty());
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn concrete_cpu_scenario() {
        // Three rows at cpu 40, everything else zero:
        // cpu_activity = min(40/50, 1) * 0.25 = 0.2, all other factors 0.
        let rows = vec![row(40.0, 0, 0), row(40.0, 0, 0), row(40.0, 0, 0)];
        let result = heuristic(&rows, &EventSummary::empty(), &EventSummary::empty());

        assert!((result.likelihood - 0.2).abs() < 1e-12);
        assert!((result.part("cpu_activity").unwrap() - 0.2).abs() < 1e-12);
        for name in ["threads", "tcp_conns", "channel_a_events", "channel_b_activity"] {
            assert_eq!(result.part(name), Some(0.0));
        }
        assert_eq!(result.notes, vec!["Elevated CPU: 40.0%".to_string()]);
    }

    #[test]
    fn likelihood_stays_in_unit_interval() {
        let rows = vec![row(10_000.0, 5_000, 900); 4];
        let a = summary_of(&[1006; 50], &ChannelConfig::defender());
        let b = summary_of(&[3; 100], &ChannelConfig::sysmon());

        let result = heuristic(&rows, &a, &b);
        assert!((0.0..=1.0).contains(&result.likelihood));
        // All ramps saturated: sum of weights is exactly 1.0.
        assert!((result.likelihood - 1.0).abs() < 1e-12);
    }

    #[test]
    fn factors_are_monotone_in_their_inputs() {
        let base_rows = vec![row(20.0, 10, 2)];
        let a = summary_of(&[1006, 1006], &ChannelConfig::defender());
        let b = summary_of(&[3, 22], &ChannelConfig::sysmon());
        let base = heuristic(&base_rows, &a, &b).likelihood;

        // More CPU
        assert!(heuristic(&[row(35.0, 10, 2)], &a, &b).likelihood >= base);
        // More threads
        assert!(heuristic(&[row(20.0, 30, 2)], &a, &b).likelihood >= base);
        // More TCP
        assert!(heuristic(&[row(20.0, 10, 6)], &a, &b).likelihood >= base);
        // More channel-A events
        let a_more = summary_of(&[1006; 5], &ChannelConfig::defender());
        assert!(heuristic(&base_rows, &a_more, &b).likelihood >= base);
        // More channel-B network/dns activity
        let b_more = summary_of(&[3, 3, 22, 22], &ChannelConfig::sysmon());
        assert!(heuristic(&base_rows, &a, &b_more).likelihood >= base);
    }

    #[test]
    fn notes_embed_triggering_values() {
        let rows = vec![row(55.5, 80, 9)];
        let a = summary_of(&[1006, 1116, 1116], &ChannelConfig::defender());
        let b = summary_of(&[3, 3, 22], &ChannelConfig::sysmon());

        let result = heuristic(&rows, &a, &b);
        assert!(result.notes.contains(&"Elevated CPU: 55.5%".to_string()));
        assert!(result.notes.contains(&"High thread count: 80".to_string()));
        assert!(result.notes.contains(&"Multiple TCP connections: 9".to_string()));
        assert!(result.notes.contains(&"Channel A events observed: 3".to_string()));
        assert!(result.notes.contains(&"Channel B net/dns: 3".to_string()));
    }

    #[test]
    fn history_mean_smooths_instantaneous_spikes() {
        // One spike in a long quiet history barely moves the mean.
        let mut rows = vec![row(1.0, 2, 0); 99];
        rows.push(row(100.0, 2, 0));
        let result = heuristic(&rows, &EventSummary::empty(), &EventSummary::empty());

        let mean_cpu: f64 = (99.0 * 1.0 + 100.0) / 100.0;
        let expected = (mean_cpu / 50.0).min(1.0) * 0.25 + (2.0 / 50.0) * 0.15;
        assert!((result.likelihood - expected).abs() < 1e-12);
    }
}
