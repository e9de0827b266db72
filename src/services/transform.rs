//! View transform: language derivation, filtering, sorting and grouping
//!
//! Everything here is a pure function of the repository set and the current
//! [`ViewSelection`]; nothing is cached between calls.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{
    ALL_LANGUAGES, GroupedView, LanguageFilter, LanguageGroup, Repository, RepositorySet, SortKey,
    UNCLASSIFIED_LANGUAGE_LABEL, ViewSelection,
};

/// Languages offered by the language selector.
///
/// Always starts with [`LanguageFilter::All`], followed by each distinct
/// non-empty language in the order it first appears in `repositories`.
pub fn available_languages(repositories: &RepositorySet) -> Vec<LanguageFilter> {
    let mut languages = vec![LanguageFilter::All];
    for language in repositories.iter().filter_map(Repository::language) {
        if language == ALL_LANGUAGES {
            continue;
        }
        if !languages
            .iter()
            .any(|known| matches!(known, LanguageFilter::Language(l) if l == language))
        {
            languages.push(LanguageFilter::Language(language.to_string()));
        }
    }
    languages
}

/// Whether a repository passes the search and language filters.
///
/// The search term is matched case-insensitively as a substring of the name
/// or the description; a missing description never matches.
pub fn matches_selection(
    repository: &Repository,
    search_term: &str,
    language_filter: &LanguageFilter,
) -> bool {
    let needle = search_term.to_lowercase();
    let matches_search = repository.name.to_lowercase().contains(&needle)
        || repository
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&needle));

    matches_search && language_filter.matches(repository.language.as_deref())
}

/// ASCII punctuation in root collation order
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary collation weight: whitespace, punctuation and symbols, digits,
/// then letters compared case-folded.
fn primary_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        return (0, c as u32);
    }
    if let Some(rank) = PUNCTUATION_ORDER.chars().position(|p| p == c) {
        return (1, rank as u32);
    }
    if let Some(digit) = c.to_digit(10) {
        return (3, digit);
    }
    if c.is_alphanumeric() {
        (4, c as u32)
    } else {
        (2, c as u32)
    }
}

/// Compare repository names the way a human-facing list expects.
///
/// Follows root collation: punctuation sorts before digits, digits before
/// letters, and letters compare case-insensitively. Lower case then sorts
/// before upper case at the first differing position, and finally the raw
/// strings break any remaining tie so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| {
        s.chars()
            .flat_map(char::to_lowercase)
            .map(primary_weight)
            .collect::<Vec<_>>()
    };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

fn compare_by_key(sort_key: &SortKey, a: &Repository, b: &Repository) -> Ordering {
    match sort_key {
        SortKey::Updated => b.updated_instant().cmp(&a.updated_instant()),
        SortKey::CreatedNew => b.created_instant().cmp(&a.created_instant()),
        SortKey::CreatedOld => a.created_instant().cmp(&b.created_instant()),
        SortKey::Stars => b.stargazers_count.cmp(&a.stargazers_count),
        SortKey::Name => compare_names(&a.name, &b.name),
        SortKey::Unrecognized(_) => Ordering::Equal,
    }
}

/// Stable sort in place; equal elements keep their relative order
pub fn sort_repositories(repositories: &mut [&Repository], sort_key: &SortKey) {
    repositories.sort_by(|a, b| compare_by_key(sort_key, a, b));
}

/// Filter then sort, returning references into `repositories`
pub fn filter_and_sort<'a>(
    repositories: &'a RepositorySet,
    selection: &ViewSelection,
) -> Vec<&'a Repository> {
    let mut visible: Vec<&Repository> = repositories
        .iter()
        .filter(|repo| {
            matches_selection(repo, &selection.search_term, &selection.language_filter)
        })
        .collect();
    sort_repositories(&mut visible, &selection.sort_key);
    visible
}

/// Label of the group a repository belongs to
pub fn group_label(repository: &Repository) -> &str {
    repository.language().unwrap_or(UNCLASSIFIED_LANGUAGE_LABEL)
}

/// Partition an already sorted sequence by language label
pub fn group_by_language<'a, I>(sorted: I) -> GroupedView
where
    I: IntoIterator<Item = &'a Repository>,
{
    let mut groups: Vec<LanguageGroup> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    for repository in sorted {
        let label = group_label(repository);
        let index = match index_by_label.get(label) {
            Some(index) => *index,
            None => {
                groups.push(LanguageGroup {
                    label: label.to_string(),
                    repositories: Vec::new(),
                });
                index_by_label.insert(label.to_string(), groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[index].repositories.push(repository.clone());
    }

    GroupedView(groups)
}

/// Full transform from repository set and selection to grouped view
pub fn transform(repositories: &RepositorySet, selection: &ViewSelection) -> GroupedView {
    group_by_language(filter_and_sort(repositories, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RepositoryId, Timestamp};

    fn repo(id: u64, name: &str, language: Option<&str>) -> Repository {
        Repository {
            id: RepositoryId::new(id),
            name: name.to_string(),
            description: None,
            language: language.map(str::to_string),
            stargazers_count: 0,
            updated_at: None,
            pushed_at: None,
            created_at: None,
            homepage: None,
            has_pages: false,
            html_url: format!("https://github.com/someone/{}", name),
        }
    }

    fn names(repositories: &[&Repository]) -> Vec<String> {
        repositories.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_available_languages_keeps_first_seen_order() {
        let set = RepositorySet::new(vec![
            repo(1, "a", Some("Rust")),
            repo(2, "b", None),
            repo(3, "c", Some("Go")),
            repo(4, "d", Some("Rust")),
            repo(5, "e", Some("")),
        ]);

        assert_eq!(
            available_languages(&set),
            vec![
                LanguageFilter::All,
                LanguageFilter::new("Rust"),
                LanguageFilter::new("Go"),
            ]
        );
    }

    #[test]
    fn test_available_languages_never_duplicates_all() {
        let set = RepositorySet::new(vec![repo(1, "odd", Some("All"))]);
        assert_eq!(available_languages(&set), vec![LanguageFilter::All]);
    }

    #[test]
    fn test_search_matches_name_or_description_case_insensitively() {
        let mut described = repo(1, "tool", None);
        described.description = Some("A Parser for TOML".to_string());
        let plain = repo(2, "ParserKit", None);

        assert!(matches_selection(&described, "parser", &LanguageFilter::All));
        assert!(matches_selection(&plain, "PARSER", &LanguageFilter::All));
        assert!(!matches_selection(&repo(3, "other", None), "parser", &LanguageFilter::All));
        assert!(matches_selection(&repo(3, "other", None), "", &LanguageFilter::All));
    }

    #[test]
    fn test_language_filter_is_exact() {
        let go = repo(1, "service", Some("Go"));
        assert!(matches_selection(&go, "", &LanguageFilter::new("Go")));
        assert!(!matches_selection(&go, "", &LanguageFilter::new("go")));
        assert!(!matches_selection(&go, "", &LanguageFilter::new("Rust")));
    }

    #[test]
    fn test_sort_by_name() {
        let set = RepositorySet::new(vec![
            repo(1, "beta", None),
            repo(2, "Alpha", None),
            repo(3, "alpha", None),
            repo(4, "Gamma", None),
        ]);
        let mut visible: Vec<&Repository> = set.iter().collect();
        sort_repositories(&mut visible, &SortKey::Name);
        assert_eq!(names(&visible), vec!["alpha", "Alpha", "beta", "Gamma"]);

        sort_repositories(&mut visible, &SortKey::Name);
        assert_eq!(names(&visible), vec!["alpha", "Alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_sort_by_dates() {
        let mut old = repo(1, "old", None);
        old.created_at = Some(Timestamp::parse("2020-01-01T00:00:00Z"));
        old.updated_at = Some(Timestamp::parse("2024-06-01T00:00:00Z"));
        let mut new = repo(2, "new", None);
        new.created_at = Some(Timestamp::parse("2023-01-01T00:00:00Z"));
        new.updated_at = Some(Timestamp::parse("2024-01-01T00:00:00Z"));
        let undated = repo(3, "undated", None);

        let set = RepositorySet::new(vec![undated, old, new]);
        let mut visible: Vec<&Repository> = set.iter().collect();

        sort_repositories(&mut visible, &SortKey::CreatedNew);
        assert_eq!(names(&visible), vec!["new", "old", "undated"]);

        sort_repositories(&mut visible, &SortKey::CreatedOld);
        assert_eq!(names(&visible), vec!["undated", "old", "new"]);

        sort_repositories(&mut visible, &SortKey::Updated);
        assert_eq!(names(&visible), vec!["old", "new", "undated"]);
    }

    #[test]
    fn test_unrecognized_sort_key_keeps_order() {
        let set = RepositorySet::new(vec![
            repo(1, "zeta", None),
            repo(2, "alpha", None),
            repo(3, "mu", None),
        ]);
        let mut visible: Vec<&Repository> = set.iter().collect();
        sort_repositories(&mut visible, &SortKey::parse("random"));
        assert_eq!(names(&visible), vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_stars_sort_is_stable() {
        let mut first = repo(1, "first", None);
        first.stargazers_count = 3;
        let mut second = repo(2, "second", None);
        second.stargazers_count = 3;
        let mut top = repo(3, "top", None);
        top.stargazers_count = 10;

        let set = RepositorySet::new(vec![first, second, top]);
        let mut visible: Vec<&Repository> = set.iter().collect();
        sort_repositories(&mut visible, &SortKey::Stars);
        assert_eq!(names(&visible), vec!["top", "first", "second"]);
    }

    #[test]
    fn test_grouping_follows_sorted_order() {
        let set = RepositorySet::new(vec![
            repo(1, "a", Some("Go")),
            repo(2, "b", None),
            repo(3, "c", Some("Rust")),
            repo(4, "d", Some("Go")),
            repo(5, "e", None),
        ]);

        let grouped = group_by_language(set.iter());
        assert_eq!(grouped.labels(), vec!["Go", UNCLASSIFIED_LANGUAGE_LABEL, "Rust"]);
        assert_eq!(grouped.groups()[0].len(), 2);
        assert_eq!(grouped.groups()[0].repositories[1].name, "d");
        assert_eq!(grouped.groups()[1].repositories[1].name, "e");
        assert_eq!(grouped.total_repositories(), set.len());
    }

    #[test]
    fn test_compare_names_is_total() {
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
        assert_eq!(compare_names("a", "B"), Ordering::Less);
        assert_eq!(compare_names("b", "A"), Ordering::Greater);
        assert_eq!(compare_names("repo", "Repo"), Ordering::Less);
        assert_eq!(compare_names("Repo", "repo"), Ordering::Greater);
        assert_eq!(compare_names("app", "app-2"), Ordering::Less);
    }

    #[test]
    fn test_sort_by_name_orders_punctuation_before_digits_and_letters() {
        let set = RepositorySet::new(
            ["a1", "a_b", "a-b", "a.b", "ab", "Ab", "a2"]
                .iter()
                .enumerate()
                .map(|(i, name)| repo(i as u64 + 1, name, None))
                .collect(),
        );
        let mut visible: Vec<&Repository> = set.iter().collect();
        sort_repositories(&mut visible, &SortKey::Name);
        assert_eq!(
            names(&visible),
            vec!["a_b", "a-b", "a.b", "a1", "a2", "ab", "Ab"]
        );

        assert_eq!(compare_names("my_tool", "my-tool"), Ordering::Less);
        assert_eq!(compare_names("v2-api", "v10-api"), Ordering::Greater);
        assert_eq!(compare_names("9lives", "apple"), Ordering::Less);
    }
}
