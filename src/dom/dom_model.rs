use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

use crate::error::DetectError;

// ============================================================================
// Raw snapshot shape (as produced by the host-side extractor)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<RawNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSnapshot {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub dom: RawNode,
}

// ============================================================================
// Flattened document tree
// ============================================================================

/// One node of the flattened document tree. Attributes are kept in a sorted
/// map so serialization (and the cache fingerprint) is order-stable.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl DomNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|s| s.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }

    pub fn role(&self) -> Option<&str> {
        self.attr("role")
    }

    pub fn input_type(&self) -> Option<String> {
        self.attr("type").map(|t| t.to_lowercase())
    }

    /// Lowercased class tokens.
    pub fn classes(&self) -> Vec<String> {
        self.attr("class")
            .map(|c| {
                c.split_whitespace()
                    .map(|t| t.to_lowercase())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    }

    /// Combined id + class string, lowercased, for token matching.
    pub fn id_class_blob(&self) -> String {
        let mut blob = String::new();
        if let Some(id) = self.id() {
            blob.push_str(&id.to_lowercase());
            blob.push(' ');
        }
        if let Some(class) = self.attr("class") {
            blob.push_str(&class.to_lowercase());
        }
        blob
    }
}

/// A fully materialized page snapshot: url, title, and the document tree
/// flattened into an arena in document order (index 0 is the root).
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub url: String,
    pub title: String,
    nodes: Vec<DomNode>,
}

impl DocumentSnapshot {
    pub fn parse(json: &str) -> Result<Self, DetectError> {
        let raw: RawSnapshot =
            serde_json::from_str(json).map_err(|e| DetectError::SnapshotParse {
                context: "document snapshot".to_string(),
                source: e,
            })?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DetectError> {
        let raw: RawSnapshot =
            serde_json::from_value(value).map_err(|e| DetectError::SnapshotParse {
                context: "document snapshot".to_string(),
                source: e,
            })?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_raw(raw: RawSnapshot) -> Self {
        let mut nodes = Vec::new();
        flatten(&raw.dom, None, &mut nodes);
        Self {
            url: raw.url,
            title: raw.title,
            nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> &DomNode {
        &self.nodes[idx]
    }

    /// All node indices in document order.
    pub fn indices(&self) -> std::ops::Range<usize> {
        0..self.nodes.len()
    }

    /// Indices of `idx` and all its descendants, in document order.
    pub fn subtree(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            out.push(i);
            // Push in reverse so children come off the stack in order
            for &c in self.nodes[i].children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Ancestor indices of `idx`, nearest first (excludes `idx` itself).
    pub fn ancestors(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = self.nodes[idx].parent;
        while let Some(p) = cur {
            out.push(p);
            cur = self.nodes[p].parent;
        }
        out
    }

    pub fn depth(&self, idx: usize) -> usize {
        self.ancestors(idx).len()
    }

    pub fn is_within(&self, idx: usize, ancestor: usize) -> bool {
        self.ancestors(idx).contains(&ancestor)
    }

    /// First node whose `id` attribute equals `id`.
    pub fn by_id(&self, id: &str) -> Option<usize> {
        self.indices().find(|&i| self.nodes[i].id() == Some(id))
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<usize> {
        self.indices()
            .filter(|&i| self.nodes[i].tag.eq_ignore_ascii_case(tag))
            .collect()
    }

    /// Concatenated text of `idx` and its descendants, whitespace-normalized.
    pub fn text_content(&self, idx: usize) -> String {
        let mut parts = Vec::new();
        for i in self.subtree(idx) {
            if let Some(t) = &self.nodes[i].text {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
        }
        parts.join(" ")
    }

    /// Hostname of the page url, lowercased, `www.` stripped.
    pub fn host(&self) -> String {
        normalize_host(host_of(&self.url))
    }

    /// Path component of the page url (always begins with `/`).
    pub fn path(&self) -> String {
        path_of(&self.url)
    }

    /// True when the page was served over a secure transport.
    pub fn is_secure(&self) -> bool {
        self.url.to_lowercase().starts_with("https://")
    }

    /// Stable sha1 fingerprint of the snapshot structure, used as the
    /// page-analysis cache key. Text content is included so edits that add
    /// interactive copy invalidate the cache too.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.url.as_bytes());
        hasher.update(self.title.as_bytes());
        for node in &self.nodes {
            hasher.update(node.tag.as_bytes());
            for (k, v) in &node.attrs {
                hasher.update(k.as_bytes());
                hasher.update(v.as_bytes());
            }
            if let Some(t) = &node.text {
                hasher.update(t.as_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

fn flatten(raw: &RawNode, parent: Option<usize>, out: &mut Vec<DomNode>) -> usize {
    let idx = out.len();
    out.push(DomNode {
        tag: raw.tag.to_lowercase(),
        attrs: raw.attrs.clone(),
        text: raw.text.clone(),
        parent,
        children: Vec::new(),
    });
    for child in &raw.children {
        let child_idx = flatten(child, Some(idx), out);
        out[idx].children.push(child_idx);
    }
    idx
}

// ============================================================================
// URL helpers (no external url crate; snapshots carry well-formed urls)
// ============================================================================

pub fn host_of(url: &str) -> String {
    let rest = url
        .split_once("://")
        .map(|(_, r)| r)
        .unwrap_or(url);
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    // Drop userinfo and port
    let host = host.rsplit('@').next().unwrap_or(host);
    host.split(':').next().unwrap_or(host).to_string()
}

pub fn path_of(url: &str) -> String {
    let rest = url
        .split_once("://")
        .map(|(_, r)| r)
        .unwrap_or(url);
    match rest.find('/') {
        Some(pos) => {
            let path = &rest[pos..];
            let path = path.split(['?', '#']).next().unwrap_or(path);
            path.to_string()
        }
        None => "/".to_string(),
    }
}

pub fn normalize_host(host: impl AsRef<str>) -> String {
    let h = host.as_ref().to_lowercase();
    h.strip_prefix("www.").unwrap_or(&h).to_string()
}
