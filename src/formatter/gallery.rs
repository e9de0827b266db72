use anyhow::{Context, Result};
use serde::Serialize;

use crate::formatter::{DisplayTimezone, MarkdownContent, format_card_date};
use crate::services::DeployUrlResolver;
use crate::services::transform::group_label;
use crate::types::{GroupedView, LanguageFilter, Repository};

/// Shown in place of a missing description
pub const DESCRIPTION_FALLBACK: &str = "真実はコードの中にある。";

/// Icon text for repositories without a language
pub const ICON_FALLBACK: &str = "JS";

pub const LOADING_MESSAGE: &str = "『リアリティ』を取得中…";

pub const EMPTY_MESSAGE: &str = "該当するリポジトリはありません。";

/// Display-ready projection of one repository
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryCard {
    pub id: u64,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub language: String,
    pub stars: u64,
    pub updated: Option<String>,
    pub html_url: String,
    pub deploy_url: Option<String>,
}

impl RepositoryCard {
    pub fn new(
        repository: &Repository,
        resolver: &DeployUrlResolver,
        timezone: DisplayTimezone,
    ) -> Self {
        let icon = repository
            .language()
            .and_then(|language| language.chars().next())
            .map(|initial| initial.to_string())
            .unwrap_or_else(|| ICON_FALLBACK.to_string());

        Self {
            id: repository.id.value(),
            name: repository.name.clone(),
            icon,
            description: repository
                .description
                .as_deref()
                .filter(|description| !description.is_empty())
                .unwrap_or(DESCRIPTION_FALLBACK)
                .to_string(),
            language: group_label(repository).to_string(),
            stars: repository.stargazers_count,
            updated: repository
                .updated_instant()
                .map(|instant| format_card_date(instant, timezone)),
            html_url: repository.html_url.clone(),
            deploy_url: resolver.resolve(repository),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardGroup {
    pub label: String,
    pub count: usize,
    pub cards: Vec<RepositoryCard>,
}

pub fn card_groups(
    view: &GroupedView,
    resolver: &DeployUrlResolver,
    timezone: DisplayTimezone,
) -> Vec<CardGroup> {
    view.iter()
        .map(|group| CardGroup {
            label: group.label.clone(),
            count: group.len(),
            cards: group
                .repositories
                .iter()
                .map(|repository| RepositoryCard::new(repository, resolver, timezone))
                .collect(),
        })
        .collect()
}

/// Render the grouped view as Markdown.
///
/// While the first refresh is pending and nothing has been published yet,
/// only the loading message is rendered.
pub fn gallery_markdown(
    initial_loading: bool,
    view: &GroupedView,
    resolver: &DeployUrlResolver,
    timezone: DisplayTimezone,
) -> MarkdownContent {
    if initial_loading {
        return MarkdownContent(format!("{}\n", LOADING_MESSAGE));
    }
    if view.is_empty() {
        return MarkdownContent(format!("{}\n", EMPTY_MESSAGE));
    }

    let mut content = String::new();
    for group in card_groups(view, resolver, timezone) {
        content.push_str(&format!("## {} ({}件)\n", group.label, group.count));

        for card in group.cards {
            content.push_str(&format!("\n### [{}] {}\n", card.icon, card.name));
            content.push_str(&format!("{}\n\n", card.description));
            content.push_str(&format!("- 言語: {}\n", card.language));
            content.push_str(&format!("- ★ {}\n", card.stars));
            if let Some(updated) = &card.updated {
                content.push_str(&format!("- 更新: {}\n", updated));
            }
            content.push_str(&format!("- GitHubへ: {}\n", card.html_url));
            if let Some(deploy_url) = &card.deploy_url {
                content.push_str(&format!("- 公開サイト: {}\n", deploy_url));
            }
        }
        content.push('\n');
    }

    MarkdownContent(content)
}

#[derive(Serialize)]
struct GalleryJson<'a> {
    loading: bool,
    groups: &'a [CardGroup],
}

pub fn gallery_json(
    initial_loading: bool,
    view: &GroupedView,
    resolver: &DeployUrlResolver,
    timezone: DisplayTimezone,
) -> Result<String> {
    let groups = card_groups(view, resolver, timezone);
    serde_json::to_string_pretty(&GalleryJson {
        loading: initial_loading,
        groups: &groups,
    })
    .context("Failed to serialize gallery")
}

/// Language selector entries, "All" first
pub fn languages_markdown(languages: &[LanguageFilter]) -> MarkdownContent {
    let mut content = String::from("## カテゴリ\n");
    for language in languages {
        content.push_str(&format!("- {}\n", language));
    }
    MarkdownContent(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transform::group_by_language;
    use crate::types::{AccountName, RepositoryId, Timestamp, UNCLASSIFIED_LANGUAGE_LABEL};

    fn repository(name: &str, language: Option<&str>) -> Repository {
        Repository {
            id: RepositoryId::new(7),
            name: name.to_string(),
            description: None,
            language: language.map(str::to_string),
            stargazers_count: 3,
            updated_at: Some(Timestamp::parse("2024-03-04T05:06:07Z")),
            pushed_at: None,
            created_at: None,
            homepage: None,
            has_pages: false,
            html_url: format!("https://github.com/ARrow0809/{}", name),
        }
    }

    fn utc() -> DisplayTimezone {
        DisplayTimezone::parse("UTC").unwrap()
    }

    fn resolver() -> DeployUrlResolver {
        DeployUrlResolver::new(AccountName::from("ARrow0809"))
    }

    #[test]
    fn test_card_fallbacks() {
        let card = RepositoryCard::new(&repository("bare", None), &resolver(), utc());
        assert_eq!(card.icon, ICON_FALLBACK);
        assert_eq!(card.description, DESCRIPTION_FALLBACK);
        assert_eq!(card.language, UNCLASSIFIED_LANGUAGE_LABEL);
        assert_eq!(card.updated.as_deref(), Some("2024/3/4"));
        assert_eq!(card.deploy_url, None);
    }

    #[test]
    fn test_card_with_language_and_pages() {
        let mut repo = repository("site", Some("TypeScript"));
        repo.has_pages = true;
        repo.description = Some("Personal site".to_string());
        let card = RepositoryCard::new(&repo, &resolver(), utc());
        assert_eq!(card.icon, "T");
        assert_eq!(card.description, "Personal site");
        assert_eq!(
            card.deploy_url.as_deref(),
            Some("https://arrow0809.github.io/site/")
        );
    }

    #[test]
    fn test_markdown_states() {
        let empty = GroupedView::default();
        assert_eq!(
            gallery_markdown(true, &empty, &resolver(), utc()).0,
            format!("{}\n", LOADING_MESSAGE)
        );
        assert_eq!(
            gallery_markdown(false, &empty, &resolver(), utc()).0,
            format!("{}\n", EMPTY_MESSAGE)
        );
    }

    #[test]
    fn test_markdown_groups() {
        let repos = [repository("alpha", Some("Go")), repository("beta", None)];
        let view = group_by_language(repos.iter());
        let markdown = gallery_markdown(false, &view, &resolver(), utc()).0;

        assert!(markdown.contains("## Go (1件)\n"));
        assert!(markdown.contains(&format!("## {} (1件)\n", UNCLASSIFIED_LANGUAGE_LABEL)));
        assert!(markdown.contains("### [G] alpha\n"));
        assert!(markdown.contains("- GitHubへ: https://github.com/ARrow0809/beta\n"));
        assert!(!markdown.contains("- 公開サイト:"));
        assert!(markdown.find("alpha").unwrap() < markdown.find("beta").unwrap());
    }

    #[test]
    fn test_json_output() {
        let repos = [repository("alpha", Some("Go"))];
        let view = group_by_language(repos.iter());
        let json = gallery_json(false, &view, &resolver(), utc()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["loading"], false);
        assert_eq!(value["groups"][0]["label"], "Go");
        assert_eq!(value["groups"][0]["count"], 1);
        assert_eq!(value["groups"][0]["cards"][0]["name"], "alpha");
    }

    #[test]
    fn test_languages_markdown() {
        let content = languages_markdown(&[LanguageFilter::All, LanguageFilter::new("Rust")]);
        assert_eq!(content.0, "## カテゴリ\n- All\n- Rust\n");
    }
}
