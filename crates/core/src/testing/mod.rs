//! Testing utilities and fixtures.
//!
//! Used by unit tests in this crate and by the server's integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use cinelinks_core::testing::{fixtures, MockCatalog};
//!
//! let catalog = MockCatalog::new();
//! catalog.create(fixtures::new_movie("RRR"))?;
//!
//! // Make every following call fail
//! catalog.set_failure("disk full");
//! ```

mod mock_catalog;

pub use mock_catalog::MockCatalog;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::catalog::{
        CatalogEntry, Category, DownloadLink, EntryContent, Episode, Genre, Language,
        NewCatalogEntry, Quality,
    };

    /// A Google Drive file id long enough to be recognized as a share link.
    pub const DRIVE_FILE_ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz_-0123";

    fn slug(title: &str) -> String {
        title.trim().to_lowercase().replace(' ', "-")
    }

    /// Create a download link.
    pub fn link(quality: Quality, url: &str) -> DownloadLink {
        DownloadLink {
            quality,
            url: url.to_string(),
        }
    }

    /// Create a valid Telugu action movie with a single 720p link.
    pub fn new_movie(title: &str) -> NewCatalogEntry {
        let slug = slug(title);
        NewCatalogEntry {
            title: title.to_string(),
            language: Language::Telugu,
            category: Category::Movie,
            genre: vec![Genre::Action, Genre::Drama],
            year: 2022,
            poster_url: format!("https://img.example.com/{}.jpg", slug),
            description: format!("{} description", title),
            file_size: "2.1 GB".to_string(),
            content: EntryContent::Movie {
                download_links: vec![link(
                    Quality::Hd720,
                    &format!("https://cdn.example.com/{}-720p.mkv", slug),
                )],
            },
            is_trending: false,
            is_featured: false,
            is_active: true,
        }
    }

    /// Create a valid single-season Hindi web series with `episodes` episodes.
    pub fn new_series(title: &str, episodes: u32) -> NewCatalogEntry {
        let slug = slug(title);
        NewCatalogEntry {
            title: title.to_string(),
            language: Language::Hindi,
            category: Category::WebSeries,
            genre: vec![Genre::Thriller, Genre::Crime],
            year: 2020,
            poster_url: format!("https://img.example.com/{}.jpg", slug),
            description: format!("{} description", title),
            file_size: "700 MB per episode".to_string(),
            content: EntryContent::Series {
                seasons: Some(1),
                episodes: (1..=episodes)
                    .map(|n| Episode {
                        episode_number: n,
                        title: format!("Episode {}", n),
                        download_links: vec![link(
                            Quality::FullHd1080,
                            &format!("https://cdn.example.com/{}-e{:02}.mkv", slug, n),
                        )],
                        duration: Some("45m".to_string()),
                        air_date: Some(format!("2020-01-{:02}", n.min(28))),
                    })
                    .collect(),
            },
            is_trending: false,
            is_featured: false,
            is_active: true,
        }
    }

    /// Build a stored-looking entry without going through a store.
    pub fn entry_from(entry: NewCatalogEntry) -> CatalogEntry {
        CatalogEntry {
            id: Uuid::new_v4().to_string(),
            title: entry.title,
            language: entry.language,
            category: entry.category,
            genre: entry.genre,
            year: entry.year,
            poster_url: entry.poster_url,
            description: entry.description,
            file_size: entry.file_size,
            content: entry.content,
            is_trending: entry.is_trending,
            is_featured: entry.is_featured,
            is_active: entry.is_active,
            download_count: 0,
            created_at: Utc::now(),
        }
    }
}
