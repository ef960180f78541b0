//! Plain-text rendering of listings and item details.

use crate::browse::Section;
use crate::share::ShareLinks;
use chrono::{DateTime, Utc};
use shared::{ContentItem, Tab};

/// Placeholder shown instead of an empty listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    Default,
    Favorites,
    Error,
}

impl EmptyState {
    pub fn title(&self) -> &'static str {
        match self {
            EmptyState::Default => "No content found",
            EmptyState::Favorites => "No favorites yet",
            EmptyState::Error => "Something went wrong",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::Default => "There are no items to display",
            EmptyState::Favorites => "Save items you love to find them here",
            EmptyState::Error => "Unable to load content. Run `anime-news-hub refresh` to try again.",
        }
    }

    pub fn render(&self) -> String {
        format!("{}\n{}\n", self.title(), self.message())
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Human-friendly age of a timestamp
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;

    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 7 {
        plural(elapsed.num_days(), "day")
    } else {
        then.format("%b %-d, %Y").to_string()
    }
}

/// `N Item` / `N Items`
pub fn count_line(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "Item" } else { "Items" })
}

/// Score out of 100 shown on a ten-point scale
fn score_label(score: u32) -> String {
    format!("{:.1}", score as f64 / 10.0)
}

fn progress_label(item: &ContentItem) -> Option<String> {
    match (item.episodes, item.chapters) {
        (Some(episodes), _) => Some(format!("{} eps", episodes)),
        (None, Some(chapters)) => Some(format!("{} chs", chapters)),
        (None, None) => None,
    }
}

/// One-line card: marker, category, title, score and age
pub fn card_line(item: &ContentItem, favorite: bool, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{}{} [{:<11}] {}",
        if favorite { '♥' } else { ' ' },
        if item.is_trending { '🔥' } else { ' ' },
        item.category.label(),
        item.title
    );

    if let Some(score) = item.score {
        line.push_str(&format!("  ★ {}", score_label(score)));
    }
    line.push_str(&format!(
        "  · {}  · {}  ({})",
        item.source_name,
        relative_time(item.updated_at, now),
        item.id
    ));

    line
}

/// Render a listing of cards, or the empty state
pub fn listing<F>(items: &[ContentItem], is_favorite: F, empty: EmptyState, now: DateTime<Utc>) -> String
where
    F: Fn(&str) -> bool,
{
    if items.is_empty() {
        return empty.render();
    }

    items
        .iter()
        .map(|item| card_line(item, is_favorite(&item.id), now) + "\n")
        .collect()
}

/// Favorites tab body
///
/// `stored` is the size of the whole store; the count line reflects only the
/// items that survived filtering.
pub fn favorites_view(stored: usize, filtered: &[ContentItem], now: DateTime<Utc>) -> String {
    if stored == 0 {
        return EmptyState::Favorites.render();
    }

    format!(
        "{}\n\n{}",
        count_line(filtered.len()),
        listing(filtered, |_| true, EmptyState::Default, now)
    )
}

pub fn header(tab: Tab, updated: DateTime<Utc>) -> String {
    format!("== {} ==  (updated {})\n\n", tab.page_title(), updated.format("%H:%M:%S"))
}

pub fn sections<F>(sections: &[Section], is_favorite: F, now: DateTime<Utc>) -> String
where
    F: Fn(&str) -> bool,
{
    if sections.is_empty() {
        return EmptyState::Default.render();
    }

    sections
        .iter()
        .map(|section| {
            format!(
                "{}\n{}\n",
                section.title,
                listing(&section.items, &is_favorite, EmptyState::Default, now)
            )
        })
        .collect()
}

/// Full detail view of one item
pub fn detail(item: &ContentItem, favorite: bool, links: &ShareLinks) -> String {
    let mut lines = vec![
        item.title.clone(),
        format!("{} · {}", item.category.label(), item.status),
    ];
    if !item.alternative_titles.is_empty() {
        lines.push(format!("Also known as: {}", item.alternative_titles.join(", ")));
    }
    lines.push(String::new());

    let mut facts = Vec::new();
    if let Some(score) = item.score {
        facts.push(format!("★ {}", score_label(score)));
    }
    if let Some(popularity) = item.popularity {
        facts.push(format!("{} fans", popularity));
    }
    facts.push(format!("Released {}", item.release_date));
    if let Some(progress) = progress_label(item) {
        facts.push(progress);
    }
    lines.push(facts.join(" · "));
    lines.push(String::new());

    lines.push("Synopsis".to_string());
    lines.push(item.summary.clone());
    lines.push(String::new());

    lines.push(format!("Data Source: {}", item.source_name));
    lines.push(format!("Link:        {}", links.link));
    lines.push(format!("Twitter:     {}", links.twitter));
    lines.push(format!("Facebook:    {}", links.facebook));
    lines.push(format!("Favorite:    {}", if favorite { "yes" } else { "no" }));
    lines.push(format!("Last updated: {}", item.updated_at.format("%b %-d, %Y")));

    lines.join("\n") + "\n"
}
