//! Platform probes for metrics `sysinfo` does not expose.
//!
//! Linux reads procfs directly; every probe degrades to a zero/`None`
//! default on failure so a single unreadable file never aborts a sample.

#[cfg(target_os = "linux")]
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Threads of the current process. 0 when unknown.
pub fn thread_count() -> u32 {
    #[cfg(target_os = "linux")]
    {
        count_dir_entries("/proc/self/task")
    }
    #[cfg(not(target_os = "linux"))]
    {
        0
    }
}

/// Open file descriptors of the current process. 0 when unknown.
pub fn open_file_count() -> u32 {
    #[cfg(target_os = "linux")]
    {
        count_dir_entries("/proc/self/fd")
    }
    #[cfg(not(target_os = "linux"))]
    {
        0
    }
}

/// Kernel handle count. A Windows concept; `None` on every other platform.
pub fn handle_count() -> Option<u32> {
    None
}

/// Established TCP connections host-wide: (connection count, distinct remote
/// IPs, sorted). Both empty when the capability is unavailable.
pub fn established_tcp() -> (u32, Vec<String>) {
    #[cfg(target_os = "linux")]
    {
        let mut count = 0u32;
        let mut ips = std::collections::BTreeSet::new();

        for (path, v6) in [("/proc/net/tcp", false), ("/proc/net/tcp6", true)] {
            let Ok(text) = std::fs::read_to_string(path) else {
                continue;
            };
            for line in text.lines().skip(1) {
                if let Some(ip) = parse_established_remote(line, v6) {
                    count += 1;
                    ips.insert(ip.to_string());
                }
            }
        }

        (count, ips.into_iter().collect())
    }
    #[cfg(not(target_os = "linux"))]
    {
        (0, Vec::new())
    }
}

#[cfg(target_os = "linux")]
fn count_dir_entries(path: &str) -> u32 {
    match std::fs::read_dir(path) {
        Ok(entries) => entries.count() as u32,
        Err(_) => 0,
    }
}

/// TCP_ESTABLISHED in procfs socket tables.
#[cfg(target_os = "linux")]
const ESTABLISHED_STATE: &str = "01";

/// Parse one `/proc/net/tcp[6]` row, returning the remote address when the
/// socket is ESTABLISHED.
///
/// Row shape: `sl local_address rem_address st ...` with addresses encoded as
/// little-endian hex plus a hex port (`0100007F:0016` = 127.0.0.1:22).
#[cfg(target_os = "linux")]
fn parse_established_remote(line: &str, v6: bool) -> Option<IpAddr> {
    let mut fields = line.split_whitespace();
    let _sl = fields.next()?;
    let _local = fields.next()?;
    let remote = fields.next()?;
    let state = fields.next()?;

    if state != ESTABLISHED_STATE {
        return None;
    }

    let (hex_addr, _hex_port) = remote.split_once(':')?;
    if v6 {
        parse_hex_ipv6(hex_addr).map(IpAddr::V6)
    } else {
        parse_hex_ipv4(hex_addr).map(IpAddr::V4)
    }
}

#[cfg(target_os = "linux")]
fn parse_hex_ipv4(hex: &str) -> Option<Ipv4Addr> {
    if hex.len() != 8 {
        return None;
    }
    let raw = u32::from_str_radix(hex, 16).ok()?;
    // procfs stores the address little-endian
    Some(Ipv4Addr::from(raw.swap_bytes()))
}

#[cfg(target_os = "linux")]
fn parse_hex_ipv6(hex: &str) -> Option<Ipv6Addr> {
    if hex.len() != 32 {
        return None;
    }
    // Four little-endian 32-bit groups
    let mut bytes = [0u8; 16];
    for (i, chunk) in hex.as_bytes().chunks(8).enumerate() {
        let group = std::str::from_utf8(chunk).ok()?;
        let raw = u32::from_str_radix(group, 16).ok()?.swap_bytes();
        bytes[i * 4..i * 4 + 4].copy_from_slice(&raw.to_be_bytes());
    }
    Some(Ipv6Addr::from(bytes))
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn parses_established_ipv4_row() {
        let line = "   1: 0100007F:A8C0 0101A8C0:01BB 01 00000000:00000000 00:00000000 00000000  1000        0 12345 1";
        let ip = parse_established_remote(line, false).unwrap();
        assert_eq!(ip.to_string(), "192.168.1.1");
    }

    #[test]
    fn skips_non_established_states() {
        // 0A = LISTEN
        let line = "   0: 00000000:0016 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 999 1";
        assert!(parse_established_remote(line, false).is_none());
    }

    #[test]
    fn parses_established_ipv6_loopback() {
        let line = "   2: 00000000000000000000000001000000:1F90 00000000000000000000000001000000:D2F0 01 00000000:00000000 00:00000000 00000000  1000        0 4242 1";
        let ip = parse_established_remote(line, true).unwrap();
        assert_eq!(ip.to_string(), "::1");
    }

    #[test]
    fn malformed_rows_yield_none() {
        assert!(parse_established_remote("garbage", false).is_none());
        assert!(parse_established_remote("   1: 0100007F:A8C0 ZZZZ:01BB 01", false).is_none());
    }

    #[test]
    fn self_probes_are_nonzero_on_linux() {
        assert!(thread_count() >= 1);
        assert!(open_file_count() >= 1);
    }
}
