//! Share links for a single item.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Serialize;
use shared::ContentItem;

const TWITTER_INTENT_URL: &str = "https://twitter.com/intent/tweet";
const FACEBOOK_SHARER_URL: &str = "https://www.facebook.com/sharer/sharer.php";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinks {
    /// Plain link to the item on its source site
    pub link: String,
    pub twitter: String,
    pub facebook: String,
}

pub fn share_text(item: &ContentItem) -> String {
    format!("Check out {} on Anime News Hub!", item.title)
}

pub fn share_links(item: &ContentItem) -> Result<ShareLinks> {
    let text = share_text(item);

    let twitter = Url::parse_with_params(
        TWITTER_INTENT_URL,
        &[("text", text.as_str()), ("url", item.source_url.as_str())],
    )
    .context("Failed to build Twitter share link")?;

    let facebook = Url::parse_with_params(FACEBOOK_SHARER_URL, &[("u", item.source_url.as_str())])
        .context("Failed to build Facebook share link")?;

    Ok(ShareLinks {
        link: item.source_url.clone(),
        twitter: twitter.into(),
        facebook: facebook.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{ContentCategory, ContentStatus};

    fn item() -> ContentItem {
        ContentItem {
            id: "anime-154587".to_string(),
            title: "Frieren & Fern".to_string(),
            alternative_titles: Vec::new(),
            summary: "summary".to_string(),
            category: ContentCategory::Anime,
            image_url: "https://img".to_string(),
            source_url: "https://anilist.co/anime/154587".to_string(),
            source_name: "AniList".to_string(),
            release_date: "2023-09-29".to_string(),
            updated_at: Utc::now(),
            status: ContentStatus::Finished,
            popularity: None,
            score: None,
            is_trending: false,
            episodes: Some(28),
            chapters: None,
        }
    }

    #[test]
    fn test_share_links() -> Result<()> {
        let links = share_links(&item())?;

        assert_eq!(links.link, "https://anilist.co/anime/154587");
        assert_eq!(
            links.twitter,
            "https://twitter.com/intent/tweet?text=Check+out+Frieren+%26+Fern+on+Anime+News+Hub%21\
             &url=https%3A%2F%2Fanilist.co%2Fanime%2F154587"
        );
        assert_eq!(
            links.facebook,
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fanilist.co%2Fanime%2F154587"
        );
        Ok(())
    }

    #[test]
    fn test_share_text() {
        assert_eq!(share_text(&item()), "Check out Frieren & Fern on Anime News Hub!");
    }
}
