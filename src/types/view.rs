//! View selection and grouped presentation types

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use super::Repository;

/// Group label used for repositories without a language
pub const UNCLASSIFIED_LANGUAGE_LABEL: &str = "その他";

/// Name of the synthetic language filter that matches everything
pub const ALL_LANGUAGES: &str = "All";

/// Sort order applied to the filtered repositories.
///
/// Parsing never fails: any unrecognised key becomes [`SortKey::Unrecognized`],
/// which leaves the order untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, EnumString)]
pub enum SortKey {
    /// Most recently updated first
    #[default]
    #[strum(serialize = "updated")]
    Updated,
    /// Most recently created first
    #[strum(serialize = "created_new")]
    CreatedNew,
    /// Oldest created first
    #[strum(serialize = "created_old")]
    CreatedOld,
    /// Most starred first
    #[strum(serialize = "stars")]
    Stars,
    /// Alphabetical by name
    #[strum(serialize = "name")]
    Name,
    #[strum(default)]
    Unrecognized(String),
}

impl SortKey {
    /// Parse a sort key, mapping unknown keys to [`SortKey::Unrecognized`]
    pub fn parse(key: &str) -> Self {
        key.parse()
            .unwrap_or_else(|_| Self::Unrecognized(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Updated => "updated",
            Self::CreatedNew => "created_new",
            Self::CreatedOld => "created_old",
            Self::Stars => "stars",
            Self::Name => "name",
            Self::Unrecognized(key) => key,
        }
    }

    /// All keys that actually reorder, in menu order
    pub fn known() -> [SortKey; 5] {
        [
            Self::Updated,
            Self::CreatedNew,
            Self::CreatedOld,
            Self::Stars,
            Self::Name,
        ]
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language filter selection: everything, or one exact language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LanguageFilter {
    #[default]
    All,
    Language(String),
}

impl LanguageFilter {
    pub fn new(value: &str) -> Self {
        if value == ALL_LANGUAGES {
            Self::All
        } else {
            Self::Language(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_LANGUAGES,
            Self::Language(language) => language,
        }
    }

    /// Exact, case-sensitive match against a repository language
    pub fn matches(&self, language: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Language(wanted) => language == Some(wanted.as_str()),
        }
    }
}

impl FromStr for LanguageFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for LanguageFilter {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for LanguageFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user's current search, sort and language selections
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewSelection {
    pub search_term: String,
    pub sort_key: SortKey,
    pub language_filter: LanguageFilter,
}

impl ViewSelection {
    pub fn new(
        search_term: impl Into<String>,
        sort_key: SortKey,
        language_filter: LanguageFilter,
    ) -> Self {
        Self {
            search_term: search_term.into(),
            sort_key,
            language_filter,
        }
    }
}

/// Repositories sharing one language label, in sorted order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageGroup {
    pub label: String,
    pub repositories: Vec<Repository>,
}

impl LanguageGroup {
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

/// Filtered, sorted repositories partitioned by language label.
///
/// Groups appear in the order their first member appears in the sorted
/// sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedView(pub Vec<LanguageGroup>);

impl GroupedView {
    pub fn groups(&self) -> &[LanguageGroup] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LanguageGroup> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|group| group.label.as_str()).collect()
    }

    /// All members of all groups, in group order
    pub fn repositories(&self) -> impl Iterator<Item = &Repository> {
        self.0.iter().flat_map(|group| group.repositories.iter())
    }

    pub fn total_repositories(&self) -> usize {
        self.0.iter().map(LanguageGroup::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("updated"), SortKey::Updated);
        assert_eq!(SortKey::parse("created_new"), SortKey::CreatedNew);
        assert_eq!(SortKey::parse("created_old"), SortKey::CreatedOld);
        assert_eq!(SortKey::parse("stars"), SortKey::Stars);
        assert_eq!(SortKey::parse("name"), SortKey::Name);
        assert_eq!(
            SortKey::parse("popularity"),
            SortKey::Unrecognized("popularity".to_string())
        );
        assert_eq!(SortKey::parse("popularity").as_str(), "popularity");
    }

    #[test]
    fn test_language_filter() {
        assert_eq!(LanguageFilter::new("All"), LanguageFilter::All);
        assert_eq!(
            LanguageFilter::new("Rust"),
            LanguageFilter::Language("Rust".to_string())
        );

        assert!(LanguageFilter::All.matches(None));
        assert!(LanguageFilter::All.matches(Some("Go")));
        assert!(LanguageFilter::new("Go").matches(Some("Go")));
        assert!(!LanguageFilter::new("Go").matches(Some("go")));
        assert!(!LanguageFilter::new("Go").matches(None));
    }
}
