//! Host header normalization.

/// Normalizes a host or domain for lookup.
///
/// Trims whitespace, lower-cases, drops a `:port` suffix (including the
/// bracketed IPv6 form `[::1]:8080`), and strips a trailing dot. A bare
/// IPv6 address without brackets is left intact. Returns an empty string
/// for blank input.
#[must_use]
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim().to_ascii_lowercase();

    let host = if let Some(rest) = host.strip_prefix('[') {
        match rest.split_once(']') {
            Some((addr, _port)) => addr.to_string(),
            None => rest.to_string(),
        }
    } else if host.matches(':').count() == 1 {
        match host.split_once(':') {
            Some((name, _port)) => name.to_string(),
            None => host,
        }
    } else {
        host
    };

    host.trim_end_matches('.').to_string()
}

/// Returns the subdomain label if `host` sits directly under `base`.
///
/// Both arguments must already be normalized. A host equal to the base
/// has no label.
#[must_use]
pub fn subdomain_of<'a>(host: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return None;
    }
    host.strip_suffix(base)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .filter(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ports_and_case() {
        assert_eq!(normalize_host(" Shop.Example.COM:8443 "), "shop.example.com");
        assert_eq!(normalize_host("localhost:5173"), "localhost");
        assert_eq!(normalize_host("[::1]:8080"), "::1");
        assert_eq!(normalize_host("fe80::1"), "fe80::1");
        assert_eq!(normalize_host("example.com."), "example.com");
        assert_eq!(normalize_host("   "), "");
    }

    #[test]
    fn subdomain_requires_a_dot_boundary() {
        assert_eq!(subdomain_of("acme.example.com", "example.com"), Some("acme"));
        assert_eq!(subdomain_of("badexample.com", "example.com"), None);
        assert_eq!(subdomain_of("example.com", "example.com"), None);
        assert_eq!(subdomain_of(".example.com", "example.com"), None);
        assert_eq!(subdomain_of("acme.example.com", ""), None);
    }
}
