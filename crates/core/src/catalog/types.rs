//! Types for the movie/series catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earliest year accepted for an entry.
pub const MIN_YEAR: i32 = 1888;
/// Latest year accepted for an entry.
pub const MAX_YEAR: i32 = 2100;

/// Returned when a stored or supplied string is not one of an enum's wire values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed string enum with its wire values.
///
/// Parsing is case-insensitive so filter parameters like `language=telugu`
/// resolve to the canonical variant.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire/storage representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Audio language of an entry.
    Language, "language", {
        Telugu => "Telugu",
        Tamil => "Tamil",
        Hindi => "Hindi",
        English => "English",
        Kannada => "Kannada",
        Malayalam => "Malayalam",
        Dubbed => "Dubbed",
    }
);

wire_enum!(
    /// Catalog section an entry is listed under.
    Category, "category", {
        Movie => "Movie",
        WebSeries => "Web Series",
        Dubbed => "Dubbed",
    }
);

wire_enum!(
    Genre, "genre", {
        Action => "Action",
        Comedy => "Comedy",
        Romance => "Romance",
        Thriller => "Thriller",
        Horror => "Horror",
        Drama => "Drama",
        SciFi => "Sci-Fi",
        Adventure => "Adventure",
        Crime => "Crime",
    }
);

wire_enum!(
    /// Resolution tier of a download link.
    Quality, "quality", {
        Sd480 => "480p",
        Hd720 => "720p",
        FullHd1080 => "1080p",
        Uhd4k => "4K",
    }
);

/// A single downloadable file at a given quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub quality: Quality,
    pub url: String,
}

/// One episode of a web series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub episode_number: u32,
    pub title: String,
    #[serde(default)]
    pub download_links: Vec<DownloadLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
}

/// What an entry actually offers for download.
///
/// Movies carry their links directly; series carry them per episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntryContent {
    Movie {
        #[serde(rename = "downloadLinks")]
        download_links: Vec<DownloadLink>,
    },
    Series {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seasons: Option<u32>,
        episodes: Vec<Episode>,
    },
}

impl EntryContent {
    pub fn kind(&self) -> &'static str {
        match self {
            EntryContent::Movie { .. } => "movie",
            EntryContent::Series { .. } => "series",
        }
    }

    /// Every download link, movie-level or episode-level.
    pub fn links_mut(&mut self) -> Box<dyn Iterator<Item = &mut DownloadLink> + '_> {
        match self {
            EntryContent::Movie { download_links } => Box::new(download_links.iter_mut()),
            EntryContent::Series { episodes, .. } => Box::new(
                episodes
                    .iter_mut()
                    .flat_map(|e| e.download_links.iter_mut()),
            ),
        }
    }
}

/// A persisted movie or series record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub language: Language,
    pub category: Category,
    pub genre: Vec<Genre>,
    pub year: i32,
    pub poster_url: String,
    pub description: String,
    pub file_size: String,
    #[serde(flatten)]
    pub content: EntryContent,
    pub is_trending: bool,
    pub is_featured: bool,
    pub is_active: bool,
    pub download_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Body of a create or full update: an entry minus the store-owned fields.
///
/// `id`, `createdAt` and `downloadCount` are ignored if a client sends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCatalogEntry {
    pub title: String,
    pub language: Language,
    pub category: Category,
    #[serde(default)]
    pub genre: Vec<Genre>,
    pub year: i32,
    pub poster_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_size: String,
    #[serde(flatten)]
    pub content: EntryContent,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewCatalogEntry {
    /// Check every write-time invariant and return the canonical form.
    ///
    /// Trims text fields, collapses duplicate genres and rewrites share links
    /// into direct-download links.
    pub fn validated(mut self) -> Result<Self, CatalogError> {
        self.title = self.title.trim().to_string();
        self.poster_url = self.poster_url.trim().to_string();
        self.description = self.description.trim().to_string();
        self.file_size = self.file_size.trim().to_string();

        require_text("title", &self.title)?;
        require_text("posterUrl", &self.poster_url)?;
        require_text("description", &self.description)?;
        require_text("fileSize", &self.file_size)?;

        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(CatalogError::Validation(format!(
                "year must be between {} and {}, got {}",
                MIN_YEAR, MAX_YEAR, self.year
            )));
        }

        let mut genres = Vec::with_capacity(self.genre.len());
        for g in self.genre.drain(..) {
            if !genres.contains(&g) {
                genres.push(g);
            }
        }
        if genres.is_empty() {
            return Err(CatalogError::Validation(
                "at least one genre is required".to_string(),
            ));
        }
        self.genre = genres;

        match (&self.category, &self.content) {
            (Category::WebSeries, EntryContent::Movie { .. }) => {
                return Err(CatalogError::Validation(
                    "category 'Web Series' requires kind 'series' with episodes".to_string(),
                ));
            }
            (Category::Movie | Category::Dubbed, EntryContent::Series { .. }) => {
                return Err(CatalogError::Validation(format!(
                    "kind 'series' requires category 'Web Series', got '{}'",
                    self.category
                )));
            }
            _ => {}
        }

        match &mut self.content {
            EntryContent::Movie { download_links } => {
                if download_links.is_empty() {
                    return Err(CatalogError::Validation(
                        "a movie needs at least one download link".to_string(),
                    ));
                }
            }
            EntryContent::Series { seasons, episodes } => {
                if episodes.is_empty() {
                    return Err(CatalogError::Validation(
                        "a series needs at least one episode".to_string(),
                    ));
                }
                if *seasons == Some(0) {
                    return Err(CatalogError::Validation(
                        "seasons must be at least 1".to_string(),
                    ));
                }
                let mut seen = Vec::with_capacity(episodes.len());
                for episode in episodes.iter_mut() {
                    if episode.episode_number == 0 {
                        return Err(CatalogError::Validation(
                            "episodeNumber must be at least 1".to_string(),
                        ));
                    }
                    if seen.contains(&episode.episode_number) {
                        return Err(CatalogError::Validation(format!(
                            "duplicate episodeNumber {}",
                            episode.episode_number
                        )));
                    }
                    seen.push(episode.episode_number);
                    episode.title = episode.title.trim().to_string();
                    require_text("episode title", &episode.title)?;
                }
            }
        }

        for link in self.content.links_mut() {
            link.url = link.url.trim().to_string();
            if link.url.is_empty() {
                return Err(CatalogError::Validation(
                    "download link url is required".to_string(),
                ));
            }
            link.url = crate::links::normalize(&link.url);
        }

        Ok(self)
    }
}

fn require_text(field: &str, value: &str) -> Result<(), CatalogError> {
    if value.is_empty() {
        Err(CatalogError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

/// Boolean flags an admin can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryFlag {
    Active,
    Trending,
    Featured,
}

impl EntryFlag {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            EntryFlag::Active => "is_active",
            EntryFlag::Trending => "is_trending",
            EntryFlag::Featured => "is_featured",
        }
    }
}

impl FromStr for EntryFlag {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntryFlag::Active),
            "trending" => Ok(EntryFlag::Trending),
            "featured" => Ok(EntryFlag::Featured),
            other => Err(UnknownVariant {
                kind: "flag",
                value: other.to_string(),
            }),
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub items: Vec<CatalogEntry>,
    pub total: u64,
    pub page: u32,
    pub page_count: u64,
}

/// Compact entry used for type-ahead search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSuggestion {
    pub id: String,
    pub title: String,
    pub poster_url: String,
    pub language: Language,
    pub year: i32,
}

/// Episode listing of a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEpisodes {
    pub episodes: Vec<Episode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<u32>,
    pub total_episodes: usize,
}

impl TryFrom<CatalogEntry> for SeriesEpisodes {
    type Error = CatalogError;

    fn try_from(entry: CatalogEntry) -> Result<Self, Self::Error> {
        match entry.content {
            EntryContent::Series { seasons, episodes } => Ok(Self {
                total_episodes: episodes.len(),
                episodes,
                seasons,
            }),
            EntryContent::Movie { .. } => Err(CatalogError::Validation(format!(
                "'{}' is a movie and has no episodes",
                entry.title
            ))),
        }
    }
}

/// Distinct filter values across active entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub languages: Vec<Language>,
    pub categories: Vec<Category>,
    pub genres: Vec<Genre>,
    /// Newest first.
    pub years: Vec<i32>,
}

/// Aggregate counts over active entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: u64,
    pub trending: u64,
    pub featured: u64,
    pub series: u64,
    pub total_downloads: u64,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
