//! Anime News Hub CLI application.

use anime_news_hub::browse::{self, Section};
use anime_news_hub::render::{self, EmptyState};
use anime_news_hub::{apply_filters, share_links, ContentHub, Feed, FavoritesStore, Season};
use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use shared::{
    CategoryFilter, Config, ContentItem, DateRange, FavoriteItem, FilterOptions, SortBy, StatusFilter, Tab,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse trending anime and manga from AniList and MangaDex", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct FilterArgs {
    /// Category chip (all, anime, manga, manhwa, manhua, light-novel, web-novel)
    #[arg(long, default_value = "all")]
    category: CategoryFilter,

    /// Status (all, ongoing, upcoming, finished)
    #[arg(long, default_value = "all")]
    status: StatusFilter,

    /// Sort order (upstream, latest, popular, trending)
    #[arg(long, default_value = "upstream")]
    sort: SortBy,

    /// Only items updated within (all, today, week, month)
    #[arg(long, default_value = "all")]
    range: DateRange,
}

impl From<FilterArgs> for FilterOptions {
    fn from(args: FilterArgs) -> Self {
        FilterOptions {
            category: args.category,
            status: args.status,
            sort_by: args.sort,
            date_range: args.range,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Everything: trending anime, trending manga and MangaDex
    Home(FilterArgs),
    /// Trending anime and manga
    Trending,
    /// MangaDex, manga and anime sections
    Categories,
    /// Most popular anime of all time
    Popular(FilterArgs),
    /// Anime of a season, the current one by default
    Seasonal {
        #[arg(long)]
        season: Option<Season>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Saved favorites
    Favorites(FilterArgs),
    /// Search every catalog
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
    },
    /// Details of one item
    Show { id: String },
    /// Manage favorites
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
    /// Share links for one item
    Share { id: String },
    /// Inspect or clear the session cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Clear the cache and refetch every feed
    Refresh,
    /// Re-render the home view periodically
    Watch {
        /// Minutes between refreshes (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Subcommand, Debug)]
enum FavoriteAction {
    Add { id: String },
    Remove { id: String },
    Toggle { id: String },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    Stats,
    Clear,
}

struct App {
    hub: ContentHub,
    favorites: FavoritesStore,
    json: bool,
}

impl App {
    fn emit<T, F>(&self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    fn emit_listing(&self, tab: Option<Tab>, items: &[ContentItem], empty: EmptyState) -> Result<()> {
        let now = Utc::now();
        self.emit(items, || {
            let mut out = tab.map(|t| render::header(t, now)).unwrap_or_default();
            out.push_str(&render::listing(items, |id| self.favorites.is_favorite(id), empty, now));
            out
        })
    }

    async fn home(&mut self, options: FilterOptions) -> Result<()> {
        let items = match self.hub.all_content().await {
            Ok(items) => items,
            Err(e) => {
                if !self.json {
                    print!("{}", EmptyState::Error.render());
                }
                return Err(e);
            }
        };

        let filtered = apply_filters(&items, &options, Utc::now());
        self.emit_listing(Some(Tab::Home), &filtered, EmptyState::Default)
    }

    async fn trending(&mut self) -> Result<()> {
        let view = self.hub.trending().await;
        let grid = browse::trending_grid(&view);
        let now = Utc::now();

        let value = json!({
            "trendingAnime": view.anime.len(),
            "trendingManga": view.manga.len(),
            "items": grid,
        });

        self.emit(&value, || {
            let mut out = render::header(Tab::Trending, now);
            out.push_str(&format!(
                "{} Trending Anime · {} Trending Manga · Live Updates\n\nHot Right Now\n",
                view.anime.len(),
                view.manga.len()
            ));
            if grid.is_empty() {
                out.push_str(&EmptyState::Default.render());
            } else {
                out.push_str(&render::listing(grid, |id| self.favorites.is_favorite(id), EmptyState::Default, now));
            }
            out
        })
    }

    async fn categories(&mut self) -> Result<()> {
        let view = self.hub.categories().await;
        let sections: Vec<Section> = browse::category_sections(&view);
        let now = Utc::now();

        self.emit(&sections, || {
            let mut out = render::header(Tab::Categories, now);
            out.push_str(&render::sections(&sections, |id| self.favorites.is_favorite(id), now));
            out
        })
    }

    async fn feed(&mut self, feed: Feed, options: FilterOptions) -> Result<()> {
        let items = self.hub.feed(&feed).await?;
        let filtered = apply_filters(&items, &options, Utc::now());
        self.emit_listing(None, &filtered, EmptyState::Default)
    }

    fn favorites(&self, options: FilterOptions) -> Result<()> {
        let items: Vec<ContentItem> = self.favorites.list().iter().map(|f| f.item.clone()).collect();
        let filtered = apply_filters(&items, &options, Utc::now());
        let now = Utc::now();

        let shown: Vec<&FavoriteItem> = filtered
            .iter()
            .filter_map(|item| self.favorites.get(&item.id))
            .collect();

        self.emit(&shown, || {
            let mut out = render::header(Tab::Favorites, now);
            out.push_str(&render::favorites_view(self.favorites.len(), &filtered, now));
            out
        })
    }

    async fn search(&mut self, query: &str, category: CategoryFilter) -> Result<()> {
        let items = self.hub.search(query).await?;
        let options = FilterOptions {
            category,
            ..Default::default()
        };
        let filtered = apply_filters(&items, &options, Utc::now());
        self.emit_listing(None, &filtered, EmptyState::Default)
    }

    /// Favorites first, then the browsable feeds
    async fn resolve_item(&mut self, id: &str) -> Result<ContentItem> {
        if let Some(favorite) = self.favorites.get(id) {
            return Ok(favorite.item.clone());
        }

        self.hub
            .find_item(id)
            .await?
            .ok_or_else(|| anyhow!("No item with id {}", id))
    }

    async fn show(&mut self, id: &str) -> Result<()> {
        let item = self.resolve_item(id).await?;
        let links = share_links(&item)?;
        let favorite = self.favorites.is_favorite(&item.id);

        self.emit(&item, || render::detail(&item, favorite, &links))
    }

    async fn share(&mut self, id: &str) -> Result<()> {
        let item = self.resolve_item(id).await?;
        let links = share_links(&item)?;

        self.emit(&links, || {
            format!(
                "{}\n\nLink:     {}\nTwitter:  {}\nFacebook: {}\n",
                anime_news_hub::share::share_text(&item),
                links.link,
                links.twitter,
                links.facebook
            )
        })
    }

    async fn favorite(&mut self, action: FavoriteAction) -> Result<()> {
        let (id, state) = match action {
            FavoriteAction::Add { id } => {
                let item = self.resolve_item(&id).await?;
                self.favorites.add(&item)?;
                (id, true)
            }
            FavoriteAction::Remove { id } => {
                if !self.favorites.remove(&id)? {
                    warn!(id = %id, "Not a favorite");
                }
                (id, false)
            }
            FavoriteAction::Toggle { id } => {
                let item = self.resolve_item(&id).await?;
                let state = self.favorites.toggle(&item)?;
                (id, state)
            }
        };

        let value = json!({ "id": id, "favorite": state, "count": self.favorites.len() });
        self.emit(&value, || {
            format!(
                "{} {}\n{}\n",
                id,
                if state { "is a favorite" } else { "is not a favorite" },
                render::count_line(self.favorites.len())
            )
        })
    }

    fn cache(&mut self, action: CacheAction) -> Result<()> {
        match action {
            CacheAction::Stats => {
                let stats = self.hub.cache_stats();
                self.emit(&stats, || {
                    format!(
                        "Enabled: {}\nEntries: {} ({} expired)\nStored: {} bytes\nTTL: {}s\n",
                        stats.enabled, stats.entries, stats.expired_entries, stats.stored_bytes, stats.ttl_seconds
                    )
                })
            }
            CacheAction::Clear => {
                self.hub.clear_cache().context("Failed to clear cache")?;
                self.emit(&json!({ "cleared": true }), || "Cache cleared\n".to_string())
            }
        }
    }

    async fn refresh(&mut self) -> Result<()> {
        self.hub.clear_cache().context("Failed to clear cache")?;

        let all = self.hub.all_content().await?;
        let trending = self.hub.trending().await;
        let categories = self.hub.categories().await;

        let value = json!({
            "allContent": all.len(),
            "trendingAnime": trending.anime.len(),
            "trendingManga": trending.manga.len(),
            "mangaDexManga": categories.mangadex.len(),
            "updatedAt": Utc::now(),
        });

        self.emit(&value, || {
            format!(
                "Refreshed: {} items ({} trending anime, {} trending manga, {} from MangaDex)\n",
                all.len(),
                trending.anime.len(),
                trending.manga.len(),
                categories.mangadex.len()
            )
        })
    }

    async fn watch(&mut self, interval_minutes: u64, options: FilterOptions) -> Result<()> {
        let period = watch_period(interval_minutes);
        let mut ticker = tokio::time::interval(period);
        info!(interval_minutes = interval_minutes, "Watching home feed");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.hub.clear_cache() {
                        warn!(error = %e, "Failed to clear cache before refresh");
                    }
                    if let Err(e) = self.home(options).await {
                        error!(error = %e, "Refresh failed, retrying on next tick");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping watch");
                    return Ok(());
                }
            }
        }
    }
}

/// Refresh period of `watch`, at least one minute
fn watch_period(minutes: u64) -> Duration {
    Duration::from_secs(minutes.max(1).saturating_mul(60))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    shared::logging::init(shared::LogConfig::from_config(&config, args.verbose))?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    let hub = ContentHub::from_config(&config)?;
    let favorites = FavoritesStore::open(config.favorites_file()).context("Failed to open favorites")?;

    let mut app = App {
        hub,
        favorites,
        json: args.json,
    };

    match args.command {
        Command::Home(filters) => app.home(filters.into()).await,
        Command::Trending => app.trending().await,
        Command::Categories => app.categories().await,
        Command::Popular(filters) => app.feed(Feed::PopularAnime, filters.into()).await,
        Command::Seasonal { season, year } => {
            let now = Utc::now();
            let feed = match (season, year) {
                (None, None) => Feed::current_season(now),
                (season, year) => Feed::SeasonalAnime {
                    season: season.unwrap_or_else(|| Season::from_month(now.month())),
                    year: year.unwrap_or_else(|| now.year()),
                },
            };
            app.feed(feed, FilterOptions::default()).await
        }
        Command::Favorites(filters) => app.favorites(filters.into()),
        Command::Search { query, category } => app.search(&query.join(" "), category).await,
        Command::Show { id } => app.show(&id).await,
        Command::Favorite { action } => app.favorite(action).await,
        Command::Share { id } => app.share(&id).await,
        Command::Cache { action } => app.cache(action),
        Command::Refresh => app.refresh().await,
        Command::Watch { interval, filters } => {
            let minutes = interval.unwrap_or(config.feed.refresh_interval_minutes);
            app.watch(minutes, filters.into()).await
        }
    }
}
