//! Repository domain types
//!
//! This module contains the records returned by the repository listing endpoint
//! together with the derived values built from a whole listing: the ordered
//! [`RepositorySet`] and its change-detection [`Signature`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Account (user) name wrapper for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct AccountName(pub String);

impl AccountName {
    pub fn new<T: Into<String>>(account: T) -> Self {
        Self(account.into())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AccountName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Numeric repository identifier as assigned by GitHub, stable across refreshes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct RepositoryId(pub u64);

impl RepositoryId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A timestamp as it appeared on the wire, plus the instant it denotes.
///
/// The listing endpoint sends RFC 3339 strings, but bare dates
/// (`2024-01-02`) and offset-less date-times are accepted too. Bare dates are
/// read as UTC midnight, offset-less date-times as local time.
/// Text that cannot be parsed is kept verbatim with no instant; such values
/// order before every valid instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    raw: String,
    instant: Option<DateTime<Utc>>,
}

impl Timestamp {
    pub fn parse<T: Into<String>>(raw: T) -> Self {
        let raw = raw.into();
        let instant = parse_instant(raw.trim());
        Self { raw, instant }
    }

    /// The wire text, unchanged
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }
}

fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(raw))
    }
}

/// One repository record from the listing endpoint.
///
/// Optional fields that are absent or `null` on the wire are valid absence,
/// never a decoding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub pushed_at: Option<Timestamp>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub has_pages: bool,
    pub html_url: String,
}

impl Repository {
    /// Language when present and non-empty
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|lang| !lang.is_empty())
    }

    pub fn updated_instant(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_ref().and_then(Timestamp::instant)
    }

    pub fn created_instant(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_ref().and_then(Timestamp::instant)
    }
}

/// The ordered repositories of one accepted listing response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositorySet(Vec<Repository>);

impl RepositorySet {
    pub fn new(repositories: Vec<Repository>) -> Self {
        Self(repositories)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Repository> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Repository] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Repository> {
        self.0
    }

    pub fn signature(&self) -> Signature {
        Signature::of(self)
    }
}

impl From<Vec<Repository>> for RepositorySet {
    fn from(repositories: Vec<Repository>) -> Self {
        Self(repositories)
    }
}

impl<'a> IntoIterator for &'a RepositorySet {
    type Item = &'a Repository;
    type IntoIter = std::slice::Iter<'a, Repository>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Change-detection fingerprint of a [`RepositorySet`].
///
/// Built from `id:updated_at:pushed_at` per repository, in response order,
/// joined with `|`. Two sets with equal signatures are considered the same
/// listing even when other fields differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn of(repositories: &RepositorySet) -> Self {
        let entries: Vec<String> = repositories
            .iter()
            .map(|repo| {
                format!(
                    "{}:{}:{}",
                    repo.id,
                    repo.updated_at.as_ref().map(Timestamp::as_str).unwrap_or(""),
                    repo.pushed_at.as_ref().map(Timestamp::as_str).unwrap_or("")
                )
            })
            .collect();
        Self(entries.join("|"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
