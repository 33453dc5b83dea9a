// SSRF guard, run before any network I/O. First failing check picks the reason.
// Only IP-literal hosts are range-checked; DNS names are never resolved here.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

pub const REASON_MISSING: &str = "Missing URL";
pub const REASON_SPACES: &str = "URL must not contain spaces";
pub const REASON_SCHEME: &str = "URL must start with http:// or https://";
pub const REASON_NO_HOST: &str = "URL must contain a host";
pub const REASON_INVALID_HOST: &str = "Invalid host";
pub const REASON_LOCALHOST: &str = "localhost is not allowed";
pub const REASON_UNSAFE_IP: &str = "Private/unsafe IPs are not allowed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub allowed: bool,
    pub reason: &'static str,
}

impl ValidationVerdict {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: "ok",
        }
    }

    fn reject(reason: &'static str) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

pub fn validate(raw_url: &str) -> ValidationVerdict {
    let url = raw_url.trim();

    if url.is_empty() {
        return ValidationVerdict::reject(REASON_MISSING);
    }

    if url.contains(' ') {
        return ValidationVerdict::reject(REASON_SPACES);
    }

    let Some((scheme, rest)) = url.split_once(':') else {
        return ValidationVerdict::reject(REASON_SCHEME);
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return ValidationVerdict::reject(REASON_SCHEME);
    }

    // The authority is checked on the raw text: the WHATWG parser would
    // happily turn "http:///x" into host "x".
    if authority(rest).is_none_or(str::is_empty) {
        return ValidationVerdict::reject(REASON_NO_HOST);
    }

    let host = match Url::parse(url) {
        Ok(parsed) => match parsed.host() {
            Some(host) => host.to_owned(),
            None => return ValidationVerdict::reject(REASON_INVALID_HOST),
        },
        Err(_) => return ValidationVerdict::reject(REASON_INVALID_HOST),
    };

    match host {
        Host::Domain(name) if name == "localhost" => ValidationVerdict::reject(REASON_LOCALHOST),
        Host::Domain(_) => ValidationVerdict::allow(),
        Host::Ipv4(ip) if is_unsafe_ip(&IpAddr::V4(ip)) => {
            ValidationVerdict::reject(REASON_UNSAFE_IP)
        }
        Host::Ipv6(ip) if is_unsafe_ip(&IpAddr::V6(ip)) => {
            ValidationVerdict::reject(REASON_UNSAFE_IP)
        }
        Host::Ipv4(_) | Host::Ipv6(_) => ValidationVerdict::allow(),
    }
}

// "//authority/path?query#frag" -> "authority"
fn authority(after_scheme: &str) -> Option<&str> {
    let rest = after_scheme.strip_prefix("//")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Private, loopback, link-local, reserved or multicast.
pub fn is_unsafe_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_unsafe_ipv4(v4),
        IpAddr::V6(v6) => is_unsafe_ipv6(v6),
    }
}

fn is_unsafe_ipv4(ip: &Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_private()                               // 10/8, 172.16/12, 192.168/16
        || ip.is_loopback()                       // 127/8
        || ip.is_link_local()                     // 169.254/16, cloud metadata
        || ip.is_multicast()                      // 224/4
        || ip.is_broadcast()
        || ip.is_documentation()
        || a == 0                                 // "this network"
        || a >= 240                               // reserved 240/4
        || (a == 100 && (b & 0xC0) == 64)         // shared address space 100.64/10
        || (a == 192 && b == 0 && c == 0)         // IETF protocol assignments
        || (a == 198 && (b & 0xFE) == 18)         // benchmarking 198.18/15
}

fn is_unsafe_ipv6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_unsafe_ipv4(&v4);
    }
    let segments = ip.segments();
    // outside global unicast 2000::/3 everything is reserved, ULA, link-local
    // or multicast; this includes ::/8 (v4-compatible, NAT64 64:ff9b::/96)
    if segments[0] & 0xE000 != 0x2000 {
        return true;
    }
    (segments[0] == 0x2001 && segments[1] < 0x0200)        // IETF protocol assignments, Teredo
        || (segments[0] == 0x2001 && segments[1] == 0x0DB8) // documentation
        || (segments[0] == 0x2002 && is_unsafe_ipv4(&embedded_6to4(&segments))) // 6to4
}

fn embedded_6to4(segments: &[u16; 8]) -> Ipv4Addr {
    let [a, b] = segments[1].to_be_bytes();
    let [c, d] = segments[2].to_be_bytes();
    Ipv4Addr::new(a, b, c, d)
}
