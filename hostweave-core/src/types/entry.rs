//! Hosts entry type definitions

use serde::{Deserialize, Serialize};

/// Where an entry's content comes from.
///
/// Immutable after creation; [`crate::services::EntryService::save_entry`]
/// rejects attempts to change it on edit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Locally edited content
    Local,
    /// Content fetched from a URL
    Remote,
    /// Union of member entries, referenced by id
    Group,
    /// Organizational container for child entries
    Folder,
}

/// A user-configured hosts source.
///
/// Entries form a tree through `children` (folder/group nesting); groups
/// additionally reference member entries by id through `include`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostsEntry {
    /// Entry ID (UUID), never reused
    pub id: String,
    /// Entry kind
    #[serde(rename = "where")]
    pub kind: EntryKind,
    /// Display title, trimmed on save
    #[serde(default)]
    pub title: String,
    /// Source URL (remote only), trimmed on save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Auto-refresh interval in seconds; 0 means never
    #[serde(default, deserialize_with = "lenient_interval::deserialize")]
    pub refresh_interval: u64,
    /// Ordered member entry ids (group only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Nested child entries (folder/group only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HostsEntry>,
    /// Last successful fetch, human-readable (remote only, set by the refresh engine)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<String>,
    /// Last successful fetch, epoch milliseconds (remote only, set by the refresh engine)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh_ms: Option<i64>,
}

impl HostsEntry {
    /// Create an empty entry of the given kind.
    #[must_use]
    pub fn new(id: String, kind: EntryKind) -> Self {
        Self {
            id,
            kind,
            title: String::new(),
            url: None,
            refresh_interval: 0,
            include: Vec::new(),
            children: Vec::new(),
            last_refresh: None,
            last_refresh_ms: None,
        }
    }

    /// Whether a scheduled refresh is due at `now_ms`.
    ///
    /// Only remote entries with a non-zero interval are ever due. An entry
    /// that has never been refreshed is due immediately.
    #[must_use]
    pub fn is_refresh_due(&self, now_ms: i64) -> bool {
        if self.kind != EntryKind::Remote || self.refresh_interval == 0 {
            return false;
        }
        match self.last_refresh_ms {
            None => true,
            Some(last_ms) => {
                let interval_ms = i64::try_from(self.refresh_interval)
                    .unwrap_or(i64::MAX)
                    .saturating_mul(1000);
                now_ms.saturating_sub(last_ms) >= interval_ms
            }
        }
    }
}

/// Partial save payload for creating or editing an entry.
///
/// On edit, only the provided keys overwrite; the merge is applied as an
/// atomic replacement of the stored record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveEntryRequest {
    /// Target entry id; `None` means create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Entry kind; required for create, must match the stored kind on edit
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_interval::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
}

impl SaveEntryRequest {
    /// Return a copy with surrounding whitespace stripped from `title` and `url`.
    #[must_use]
    pub fn trimmed(mut self) -> Self {
        if let Some(ref title) = self.title {
            self.title = Some(title.trim().to_string());
        }
        if let Some(ref url) = self.url {
            self.url = Some(url.trim().to_string());
        }
        self
    }

    /// Apply the provided keys to an existing record.
    ///
    /// `id`, `kind` and the refresh timestamps are never touched here.
    pub fn apply_to(&self, entry: &mut HostsEntry) {
        if let Some(ref title) = self.title {
            entry.title.clone_from(title);
        }
        if let Some(ref url) = self.url {
            entry.url = Some(url.clone());
        }
        if let Some(interval) = self.refresh_interval {
            entry.refresh_interval = interval;
        }
        if let Some(ref include) = self.include {
            entry.include.clone_from(include);
        }
    }
}

/// Lenient `refresh_interval` deserialization.
///
/// Frontends have historically sent the interval as a number, a numeric
/// string, or garbage; anything non-numeric or negative becomes 0 instead of
/// failing the whole document.
mod lenient_interval {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawInterval {
        U64(u64),
        I64(i64),
        F64(f64),
        String(String),
        Other(serde::de::IgnoredAny),
    }

    fn normalize(raw: RawInterval) -> u64 {
        match raw {
            RawInterval::U64(v) => v,
            RawInterval::I64(v) => u64::try_from(v).unwrap_or(0),
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            RawInterval::F64(v) if v.is_finite() && v > 0.0 => v as u64,
            RawInterval::F64(_) => 0,
            RawInterval::String(s) => s.trim().parse::<u64>().unwrap_or(0),
            RawInterval::Other(_) => 0,
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(normalize(RawInterval::deserialize(deserializer)?))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<RawInterval>::deserialize(deserializer)?.map(normalize))
    }
}
