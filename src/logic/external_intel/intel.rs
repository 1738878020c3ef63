//! IP Reputation Lookup
//!
//! Optional AbuseIPDB check for remote addresses seen during a run. Gated on
//! `ABUSEIPDB_API_KEY`; any HTTP or parse failure yields `None`, never an
//! error - reputation is decoration, not a scoring input.

use std::time::Duration;

use serde::Deserialize;

use crate::constants::get_abuseipdb_key;

const API_URL: &str = "https://api.abuseipdb.com/api/v2/check";
const MAX_AGE_DAYS: &str = "90";
const TIMEOUT: Duration = Duration::from_secs(5);

/// The slice of an AbuseIPDB report we display.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpReport {
    pub ip_address: String,
    pub abuse_confidence_score: i64,
    pub total_reports: i64,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Check one IP. `None` when no key is configured or the lookup fails.
pub fn check_ip(ip: &str) -> Option<IpReport> {
    let key = get_abuseipdb_key()?;
    check_ip_with(API_URL, &key, ip)
}

fn check_ip_with(url: &str, key: &str, ip: &str) -> Option<IpReport> {
    let response = ureq::get(url)
        .set("Key", key)
        .set("Accept", "application/json")
        .query("ipAddress", ip)
        .query("maxAgeInDays", MAX_AGE_DAYS)
        .timeout(TIMEOUT)
        .call();

    let body: serde_json::Value = match response {
        Ok(resp) => match resp.into_json() {
            Ok(v) => v,
            Err(e) => {
                log::warn!("IP reputation response for {} unreadable: {}", ip, e);
                return None;
            }
        },
        Err(e) => {
            log::warn!("IP reputation lookup for {} failed: {}", ip, e);
            return None;
        }
    };

    match serde_json::from_value(body.get("data")?.clone()) {
        Ok(report) => Some(report),
        Err(e) => {
            log::warn!("IP reputation payload for {} malformed: {}", ip, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_short_circuits() {
        std::env::remove_var("ABUSEIPDB_API_KEY");
        assert!(check_ip("8.8.8.8").is_none());
    }

    #[test]
    fn report_parses_from_api_shape() {
        let body = r#"{
            "ipAddress": "203.0.113.7",
            "abuseConfidenceScore": 42,
            "totalReports": 7,
            "countryCode": "NL"
        }"#;
        let report: IpReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.ip_address, "203.0.113.7");
        assert_eq!(report.abuse_confidence_score, 42);
        assert_eq!(report.country_code.as_deref(), Some("NL"));
    }
}
