//! Link eligibility policy and URL normalization
//!
//! Discovered links pass through two stages: [`UrlFilter::normalize`]
//! turns a raw href into a canonical absolute URL, and
//! [`UrlFilter::is_eligible`] decides whether that URL may enter the
//! frontier. Eligibility rules are evaluated in a fixed order and
//! short-circuit on the first failing rule.

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::crawler::registry::VisitedRegistry;

/// Read-only link policy, built once at startup.
pub struct UrlFilter {
    allowed_domains: Vec<String>,
    exclude_patterns: Vec<Regex>,
    include_keys: Vec<String>,
}

impl UrlFilter {
    /// Compile the policy.
    ///
    /// # Errors
    ///
    /// Returns the first exclude pattern that fails to compile.
    pub fn new(
        allowed_domains: Vec<String>,
        exclude_patterns: &[String],
        include_keys: Vec<String>,
    ) -> Result<Self, regex::Error> {
        let exclude_patterns = exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            allowed_domains,
            exclude_patterns,
            include_keys,
        })
    }

    /// Resolve a raw link against the page it was found on, strip the
    /// fragment and the entire query string, and percent-decode the result.
    ///
    /// Dropping the query string conflates query-addressed resources into
    /// one visited entry; only the first is ever fetched.
    pub fn normalize(&self, raw: &str, base: &Url) -> Option<String> {
        let mut resolved = base.join(raw).ok()?;
        resolved.set_fragment(None);
        resolved.set_query(None);

        percent_decode_str(resolved.as_str())
            .decode_utf8()
            .ok()
            .map(|decoded| decoded.into_owned())
    }

    /// Decide whether a normalized URL may be enqueued.
    ///
    /// Rules, in order, short-circuiting on the first rejection:
    /// 1. not already visited;
    /// 2. scheme is http or https;
    /// 3. host equals or is a subdomain of an allowed domain;
    /// 4. no exclude pattern matches (exclusion beats inclusion);
    /// 5. if include keys are configured, at least one occurs in the URL.
    pub fn is_eligible(&self, url: &str, visited: &VisitedRegistry) -> bool {
        if visited.contains(url) {
            return false;
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return false;
        }

        let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_owned)) {
            Some(host) => host,
            None => return false,
        };

        if !self.is_allowed_host(&host) {
            return false;
        }

        if self.exclude_patterns.iter().any(|pattern| pattern.is_match(url)) {
            return false;
        }

        if self.include_keys.is_empty() {
            return true;
        }

        self.include_keys.iter().any(|key| url.contains(key.as_str()))
    }

    /// Host matches an allowed domain exactly or as a subdomain
    fn is_allowed_host(&self, host: &str) -> bool {
        self.allowed_domains.iter().any(|domain| {
            host == domain || host.ends_with(&format!(".{domain}"))
        })
    }
}
