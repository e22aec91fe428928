//! URL and link safety checks.
//!
//! Every URL a component references is checked for dangerous protocols,
//! plaintext HTTP, private-network targets (SSRF), localhost and
//! throwaway TLDs. Markdown links and images get link-specific checks on top.

use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::{Host, Url};

use super::semantic::redact_secrets;
use super::ComponentValidator;
use crate::types::{
    Component, FindingLevel, ResultAccumulator, ResultDetails, RiskSeverity, ValidationResult,
};

/// Protocols that are rejected outright.
pub const BLOCKED_PROTOCOLS: &[&str] = &["file", "ftp", "data", "javascript", "vbscript"];

/// Protocols that are acceptable.
pub const ALLOWED_PROTOCOLS: &[&str] = &["https", "http"];

/// TLDs commonly used for throwaway or look-alike domains.
pub const SUSPICIOUS_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".gq", ".zip", ".mov", ".xyz"];

/// Protocols that make a markdown link dangerous to click.
const DANGEROUS_LINK_PROTOCOLS: &[&str] = &["javascript:", "data:", "file:", "vbscript:"];

/// Hostnames that refer to the local machine.
const LOCALHOST_NAMES: &[&str] = &["localhost", "127.0.0.1", "[::1]", "::1"];

/// Inline data URIs above this size bloat the component.
const MAX_DATA_URI_BYTES: usize = 10 * 1024;

/// `[text](url)` and `![alt](src)`; the first group is `!` for images.
static MARKDOWN_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).unwrap()
});

static BARE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bhttps?://[^\s<>"'`)\]]+"#).unwrap());

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// Options for [`ReferenceValidator`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceOptions {
    /// Ask for reachability probing. Accepted but not performed.
    pub check_accessibility: bool,
    /// Treat plaintext `http:` URLs as errors.
    pub strict_https: bool,
}

/// A markdown link or image found in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    /// Link text or image alt text.
    pub text: String,
    /// Target URL as written.
    pub url: String,
    /// True for `![alt](src)`.
    pub is_image: bool,
}

/// Link hygiene summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceReport {
    /// Distinct URLs discovered.
    pub total_urls: usize,
    /// URLs using `https:`.
    pub https_urls: usize,
    /// URLs using `http:`.
    pub http_urls: usize,
    /// Share of URLs using `https:`, 0-100. 100 when there are none.
    pub https_percentage: f64,
    /// Findings recorded as errors.
    pub error_count: usize,
    /// Findings recorded as warnings.
    pub warning_count: usize,
}

impl ReferenceReport {
    /// Summarize a reference validation result.
    pub fn from_result(result: &ValidationResult) -> Self {
        let urls: &[String] = match &result.details {
            Some(ResultDetails::Reference { urls }) => urls,
            _ => &[],
        };

        let scheme_is = |url: &String, scheme: &str| {
            url.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        };
        let https_urls = urls.iter().filter(|u| scheme_is(u, "https:")).count();
        let http_urls = urls.iter().filter(|u| scheme_is(u, "http:")).count();

        let https_percentage = if urls.is_empty() {
            100.0
        } else {
            ((https_urls as f64 / urls.len() as f64) * 1000.0).round() / 10.0
        };

        Self {
            total_urls: urls.len(),
            https_urls,
            http_urls,
            https_percentage,
            error_count: result.error_count,
            warning_count: result.warning_count,
        }
    }
}

/// Collect markdown links and images.
pub fn extract_markdown_links(content: &str) -> Vec<MarkdownLink> {
    MARKDOWN_LINK_RE
        .captures_iter(content)
        .map(|caps| MarkdownLink {
            is_image: &caps[1] == "!",
            text: caps[2].to_string(),
            url: caps[3].to_string(),
        })
        .collect()
}

/// Collect every distinct URL: markdown link targets first, then bare
/// `http(s)://` URLs not already seen. Image sources are excluded.
pub fn extract_urls(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for link in extract_markdown_links(content) {
        if !link.is_image && seen.insert(link.url.clone()) {
            urls.push(link.url);
        }
    }

    let link_spans: Vec<(usize, usize)> = MARKDOWN_LINK_RE
        .find_iter(content)
        .map(|m| (m.start(), m.end()))
        .collect();

    for m in BARE_URL_RE.find_iter(content) {
        if link_spans
            .iter()
            .any(|(start, end)| m.start() >= *start && m.start() < *end)
        {
            continue;
        }
        let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if seen.insert(url.to_string()) {
            urls.push(url.to_string());
        }
    }

    urls
}

/// RFC 1918, loopback, link-local and unspecified IPv4 addresses.
fn is_private_ipv4(addr: &Ipv4Addr) -> bool {
    addr.is_private() || addr.is_loopback() || addr.is_link_local() || addr.is_unspecified()
}

/// Loopback, unique-local, link-local, unspecified and IPv4-mapped private
/// IPv6 addresses.
fn is_private_ipv6(addr: &Ipv6Addr) -> bool {
    if addr.is_loopback() || addr.is_unspecified() {
        return true;
    }
    let first = addr.segments()[0];
    if (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80 {
        return true;
    }
    addr.to_ipv4_mapped()
        .is_some_and(|v4| is_private_ipv4(&v4))
}

/// True if the URL targets a private or local network address.
pub fn targets_private_network(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(addr)) => is_private_ipv4(&addr),
        Some(Host::Ipv6(addr)) => is_private_ipv6(&addr),
        _ => false,
    }
}

/// URL, markdown-link and image safety validator.
#[derive(Debug, Clone, Default)]
pub struct ReferenceValidator;

impl ReferenceValidator {
    /// Create a reference validator.
    pub fn new() -> Self {
        Self
    }

    /// Derive the reference report for a result produced by this validator.
    pub fn reference_report(&self, result: &ValidationResult) -> ReferenceReport {
        ReferenceReport::from_result(result)
    }

    fn validate_url(&self, acc: &mut ResultAccumulator, raw: &str, options: &ReferenceOptions) {
        // Relative links point inside the component's own package.
        if !SCHEME_RE.is_match(raw) {
            return;
        }

        let shown = redact_secrets(raw);
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                acc.add_warning(
                    "REF_W005",
                    format!("Malformed URL: {}", shown),
                    json!({ "url": shown, "error": e.to_string(), "severity": RiskSeverity::Low.as_str() }),
                );
                return;
            }
        };

        let scheme = url.scheme();
        if BLOCKED_PROTOCOLS.contains(&scheme) {
            acc.add_error(
                "REF_E001",
                format!("Blocked protocol '{}:' in URL", scheme),
                json!({
                    "url": truncate(&shown, 200),
                    "protocol": format!("{}:", scheme),
                    "severity": RiskSeverity::Critical.as_str(),
                }),
            );
            return;
        }

        if !ALLOWED_PROTOCOLS.contains(&scheme) {
            acc.add_warning(
                "REF_W001",
                format!("Unknown protocol '{}:' in URL", scheme),
                json!({
                    "url": shown,
                    "protocol": format!("{}:", scheme),
                    "severity": RiskSeverity::Medium.as_str(),
                }),
            );
            return;
        }

        if scheme == "http" {
            let suggestion = format!("https{}", shown.get(4..).unwrap_or_default());
            let (level, code, severity) = if options.strict_https {
                (FindingLevel::Error, "REF_E002", RiskSeverity::High)
            } else {
                (FindingLevel::Warning, "REF_W002", RiskSeverity::Medium)
            };
            acc.add(
                level,
                code,
                format!("Insecure HTTP URL: {}", shown),
                json!({
                    "url": shown,
                    "suggestion": suggestion,
                    "severity": severity.as_str(),
                }),
            );
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

        if targets_private_network(&url) {
            acc.add_error(
                "REF_E004",
                format!("URL targets a private network address (SSRF risk): {}", host),
                json!({
                    "url": shown,
                    "hostname": host,
                    "severity": RiskSeverity::Critical.as_str(),
                }),
            );
        }

        if LOCALHOST_NAMES.contains(&host.as_str()) {
            acc.add_warning(
                "REF_W003",
                format!("URL points to localhost: {}", shown),
                json!({
                    "url": shown,
                    "hostname": host,
                    "severity": RiskSeverity::Medium.as_str(),
                }),
            );
        }

        let bare_host = host.trim_end_matches('.');
        if let Some(tld) = SUSPICIOUS_TLDS.iter().find(|tld| bare_host.ends_with(*tld)) {
            acc.add_warning(
                "REF_W004",
                format!("URL uses a suspicious top-level domain '{}': {}", tld, shown),
                json!({
                    "url": shown,
                    "hostname": host,
                    "tld": tld,
                    "severity": RiskSeverity::Medium.as_str(),
                }),
            );
        }
    }

    fn check_markdown_links(&self, acc: &mut ResultAccumulator, links: &[MarkdownLink]) {
        for link in links.iter().filter(|l| !l.is_image) {
            let target = link.url.trim().to_ascii_lowercase();
            if let Some(protocol) = DANGEROUS_LINK_PROTOCOLS
                .iter()
                .find(|p| target.starts_with(*p))
            {
                acc.add_error(
                    "REF_E003",
                    format!("Dangerous markdown link '{}' uses {}", link.text, protocol),
                    json!({
                        "text": link.text,
                        "url": truncate(&redact_secrets(&link.url), 200),
                        "protocol": protocol,
                        "severity": RiskSeverity::Critical.as_str(),
                    }),
                );
            }
        }
    }

    fn check_images(
        &self,
        acc: &mut ResultAccumulator,
        links: &[MarkdownLink],
        options: &ReferenceOptions,
    ) {
        for image in links.iter().filter(|l| l.is_image) {
            let src = image.url.trim();
            let is_data = src
                .get(..5)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"));
            if is_data {
                if !src[5..].to_ascii_lowercase().starts_with("image/") {
                    acc.add_error(
                        "REF_E001",
                        "Image uses a non-image data: URI",
                        json!({
                            "alt": image.text,
                            "url": truncate(&redact_secrets(src), 200),
                            "protocol": "data:",
                            "severity": RiskSeverity::Critical.as_str(),
                        }),
                    );
                } else if src.len() > MAX_DATA_URI_BYTES {
                    acc.add_warning(
                        "REF_W006",
                        format!(
                            "Inline image data URI is {} bytes (limit {})",
                            src.len(),
                            MAX_DATA_URI_BYTES
                        ),
                        json!({
                            "alt": image.text,
                            "size": src.len(),
                            "limit": MAX_DATA_URI_BYTES,
                            "severity": RiskSeverity::Low.as_str(),
                        }),
                    );
                }
            } else {
                self.validate_url(acc, src, options);
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

impl ComponentValidator for ReferenceValidator {
    type Options = ReferenceOptions;

    fn name(&self) -> &'static str {
        "reference"
    }

    fn validate(&self, component: &Component, options: &ReferenceOptions) -> ValidationResult {
        let mut acc = ResultAccumulator::new(self.name());

        if component.is_empty() {
            acc.add_error("REF_E000", "Component content is empty", json!({}));
            return acc.into_result();
        }

        let content = component.content.as_str();
        let links = extract_markdown_links(content);
        let urls = extract_urls(content);

        for url in &urls {
            self.validate_url(&mut acc, url, options);
        }
        self.check_markdown_links(&mut acc, &links);
        self.check_images(&mut acc, &links, options);

        if options.check_accessibility {
            acc.add_info(
                "REF_I001",
                "URL accessibility check skipped; network probing is not performed during validation",
                json!({ "urls": urls.len() }),
            );
        }

        if !urls.is_empty() {
            acc.add_info(
                "REF_I002",
                format!("Found {} URL{}", urls.len(), if urls.len() == 1 { "" } else { "s" }),
                json!({ "count": urls.len() }),
            );
        }

        let urls = urls.iter().map(|u| redact_secrets(u)).collect();
        let result = acc.into_result_with(ResultDetails::Reference { urls });
        tracing::debug!(
            path = %component.path.display(),
            errors = result.error_count,
            warnings = result.warning_count,
            "reference validation complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComponentType;

    fn validate_with(content: &str, options: ReferenceOptions) -> ValidationResult {
        ReferenceValidator::new().validate(
            &Component::new(content, "test.md", ComponentType::Agent),
            &options,
        )
    }

    fn validate(content: &str) -> ValidationResult {
        validate_with(content, ReferenceOptions::default())
    }

    #[test]
    fn test_extract_urls_dedupes_markdown_and_bare() {
        let content = "See [docs](https://example.com/docs) or https://example.com/docs.\nAlso https://other.org/page";
        let urls = extract_urls(content);
        assert_eq!(urls, vec!["https://example.com/docs", "https://other.org/page"]);
    }

    #[test]
    fn test_https_url_is_clean() {
        let result = validate("Read https://example.com for details.");
        assert!(result.valid);
        assert!(!result.has_code("REF_E004"));
        assert!(!result.has_code("REF_W003"));
        assert_eq!(result.warning_count, 0);
    }

    #[test]
    fn test_ssrf_private_addresses() {
        for url in ["http://127.0.0.1/admin", "http://192.168.1.5/"] {
            let result = validate(&format!("Fetch {} now", url));
            let finding = result.find("REF_E004").unwrap_or_else(|| panic!("no REF_E004 for {}", url));
            assert_eq!(finding.metadata["severity"], "critical");
            assert!(!result.valid);
        }
    }

    #[test]
    fn test_ssrf_more_ranges() {
        for url in [
            "https://10.0.0.1/",
            "https://172.16.4.2/",
            "https://169.254.169.254/latest/meta-data",
            "https://[fd00::1]/",
            "https://[fe80::1]/",
            "https://[::ffff:10.0.0.1]/",
        ] {
            let result = validate(&format!("[x]({})", url));
            assert!(result.has_error("REF_E004"), "not flagged: {}", url);
        }
        assert!(!validate("https://8.8.8.8/").has_code("REF_E004"));
    }

    #[test]
    fn test_localhost_warning() {
        let result = validate("[local](https://localhost:3000/api)");
        assert!(result.has_warning("REF_W003"));
        assert!(!result.has_code("REF_E004"));

        let result = validate("http://127.0.0.1/admin");
        assert!(result.has_warning("REF_W003"));
        assert!(result.has_error("REF_E004"));
    }

    #[test]
    fn test_http_warning_and_strict() {
        let result = validate("http://example.com/page");
        let finding = result.find("REF_W002").unwrap();
        assert_eq!(finding.metadata["suggestion"], "https://example.com/page");
        assert!(result.valid);

        let result = validate_with(
            "http://example.com/page",
            ReferenceOptions {
                strict_https: true,
                ..Default::default()
            },
        );
        assert!(result.has_error("REF_E002"));
        assert_eq!(
            result.find("REF_E002").unwrap().metadata["suggestion"],
            "https://example.com/page"
        );
    }

    #[test]
    fn test_blocked_protocols() {
        let result = validate("[open](file:///etc/passwd)");
        assert!(result.has_error("REF_E001"));
        assert!(result.has_error("REF_E003"));

        let result = validate("[click](javascript:alert(1))");
        assert!(result.has_error("REF_E003"));
    }

    #[test]
    fn test_unknown_protocol_warning() {
        let result = validate("[chat](irc://irc.example.net/channel)");
        assert!(result.has_warning("REF_W001"));
        assert!(result.valid);
    }

    #[test]
    fn test_relative_links_ignored() {
        let result = validate("[next](./next.md) and [top](#top)");
        assert!(result.valid);
        assert_eq!(result.warning_count, 0);
    }

    #[test]
    fn test_malformed_url_is_warning() {
        let result = validate("[bad](http://[::1/)");
        assert!(result.has_warning("REF_W005"));
        assert!(result.valid);
    }

    #[test]
    fn test_suspicious_tld() {
        let result = validate("Download from https://free-stuff.xyz/tool");
        let finding = result.find("REF_W004").unwrap();
        assert_eq!(finding.metadata["tld"], ".xyz");
    }

    #[test]
    fn test_large_data_uri_image() {
        let data = format!("data:image/png;base64,{}", "A".repeat(11 * 1024));
        let result = validate(&format!("![logo]({})", data));
        assert!(result.has_warning("REF_W006"));
        assert!(result.valid);

        let result = validate("![tiny](data:image/png;base64,AAAA)");
        assert!(result.valid);
        assert_eq!(result.warning_count, 0);
    }

    #[test]
    fn test_remote_image_validated() {
        let result = validate("![pic](http://192.168.0.10/pic.png)");
        assert!(result.has_error("REF_E004"));
        assert!(result.has_warning("REF_W002"));
    }

    #[test]
    fn test_accessibility_is_informational() {
        let result = validate_with(
            "https://example.com",
            ReferenceOptions {
                check_accessibility: true,
                ..Default::default()
            },
        );
        assert!(result.has_info("REF_I001"));
        assert!(result.valid);
    }

    #[test]
    fn test_reference_report_percentage() {
        let result = validate("https://a.example.com https://b.example.com http://c.example.com http://d.example.com");
        let report = ReferenceValidator::new().reference_report(&result);
        assert_eq!(report.total_urls, 4);
        assert_eq!(report.https_urls, 2);
        assert_eq!(report.http_urls, 2);
        assert_eq!(report.https_percentage, 50.0);

        let empty = validate("no links here");
        assert_eq!(ReferenceReport::from_result(&empty).https_percentage, 100.0);
    }

    #[test]
    fn test_query_token_not_in_report() {
        let result = validate("Call http://api.example.com/?token=ABCDEFGHIJKLMNOPQRSTUVWXYZ for data");
        assert!(result.has_warning("REF_W002"));

        let serialized = serde_json::to_string(&result).unwrap();
        assert!(!serialized.contains("ABCDEFGHIJKLMNOPQRSTUVWXYZ"));
        assert!(serialized.contains("token:=<REDACTED>"));

        let report = ReferenceReport::from_result(&result);
        assert_eq!(report.http_urls, 1);
    }
}
