use serde::Serialize;

use crate::dom::dom_model::normalize_host;
use crate::policy::tables;

// ============================================================================
// Site policy — host/path gating, independent of page content.
// Check order is fixed: allowlist, exceptions, blocklist, blocked paths,
// default allow. Every decision names the table that produced it.
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    Social,
    Video,
    News,
    Shopping,
    Productivity,
    Email,
    Gaming,
    Other,
}

impl BlockCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockCategory::Social => "social",
            BlockCategory::Video => "video",
            BlockCategory::News => "news",
            BlockCategory::Shopping => "shopping",
            BlockCategory::Productivity => "productivity",
            BlockCategory::Email => "email",
            BlockCategory::Gaming => "gaming",
            BlockCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    pub allowed: bool,
    /// Which table/category matched, for diagnostics
    pub reason: String,
}

impl PolicyDecision {
    fn allow(reason: impl Into<String>) -> Self {
        Self { allowed: true, reason: reason.into() }
    }

    fn block(reason: impl Into<String>) -> Self {
        Self { allowed: false, reason: reason.into() }
    }
}

#[derive(Debug, Clone)]
pub struct SiteException {
    pub domain: String,
    /// Empty means the entire domain is excepted
    pub path_prefixes: Vec<String>,
}

pub trait PolicyStore {
    fn evaluate(&self, host: &str, path: &str) -> PolicyDecision;
    fn is_form_host(&self, host: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct SitePolicy {
    form_hosts: Vec<String>,
    exceptions: Vec<SiteException>,
    blocklist: Vec<(String, BlockCategory)>,
    blocked_paths: Vec<(String, Vec<String>)>,
}

/// Host matching: exact, or the entry matches a suffix label boundary
/// (entry `example.com` covers `login.example.com`).
fn host_matches(entry: &str, host: &str) -> bool {
    host == entry || host.ends_with(&format!(".{}", entry))
}

impl SitePolicy {
    pub fn with_defaults() -> Self {
        Self {
            form_hosts: tables::FORM_HOSTS.iter().map(|s| s.to_string()).collect(),
            exceptions: tables::EXCEPTIONS
                .iter()
                .map(|(d, paths)| SiteException {
                    domain: d.to_string(),
                    path_prefixes: paths.iter().map(|p| p.to_string()).collect(),
                })
                .collect(),
            blocklist: tables::BLOCKLIST
                .iter()
                .map(|(d, c)| (d.to_string(), *c))
                .collect(),
            blocked_paths: tables::BLOCKED_PATHS
                .iter()
                .map(|(d, paths)| {
                    (d.to_string(), paths.iter().map(|p| p.to_string()).collect())
                })
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            form_hosts: Vec::new(),
            exceptions: Vec::new(),
            blocklist: Vec::new(),
            blocked_paths: Vec::new(),
        }
    }

    // Config-driven extensions

    pub fn add_blocked_domain(&mut self, domain: &str, category: BlockCategory) {
        self.blocklist.push((normalize_host(domain), category));
    }

    pub fn add_exception(&mut self, domain: &str, path_prefixes: Vec<String>) {
        self.exceptions.push(SiteException {
            domain: normalize_host(domain),
            path_prefixes,
        });
    }

    pub fn add_form_host(&mut self, domain: &str) {
        self.form_hosts.push(normalize_host(domain));
    }

    fn exception_for(&self, host: &str, path: &str) -> Option<&SiteException> {
        self.exceptions.iter().find(|e| {
            host_matches(&e.domain, host)
                && (e.path_prefixes.is_empty()
                    || e.path_prefixes.iter().any(|p| path.starts_with(p.as_str())))
        })
    }
}

impl PolicyStore for SitePolicy {
    fn evaluate(&self, host: &str, path: &str) -> PolicyDecision {
        let host = normalize_host(host);

        // (1) dedicated form hosts always pass
        if self.is_form_host(&host) {
            return PolicyDecision::allow(format!("allowlist: form host '{}'", host));
        }

        // (2) exceptions override a blocked domain
        if let Some(e) = self.exception_for(&host, path) {
            return PolicyDecision::allow(format!(
                "exception: '{}' path prefix matched",
                e.domain
            ));
        }

        // (3) categorized blocklist
        if let Some((domain, category)) = self
            .blocklist
            .iter()
            .find(|(d, _)| host_matches(d, &host))
        {
            return PolicyDecision::block(format!(
                "blocklist: '{}' ({})",
                domain,
                category.as_str()
            ));
        }

        // (4) domain-scoped blocked paths
        if let Some((domain, prefix)) = self.blocked_paths.iter().find_map(|(d, paths)| {
            if host_matches(d, &host) {
                paths
                    .iter()
                    .find(|p| path.starts_with(p.as_str()))
                    .map(|p| (d.clone(), p.clone()))
            } else {
                None
            }
        }) {
            return PolicyDecision::block(format!(
                "blocked path: '{}{}'",
                domain, prefix
            ));
        }

        // (5) default allow
        PolicyDecision::allow("default: no table matched")
    }

    fn is_form_host(&self, host: &str) -> bool {
        let host = normalize_host(host);
        self.form_hosts.iter().any(|d| host_matches(d, &host))
    }
}
