pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod links;
pub mod testing;
pub mod watchlist;

pub use auth::{
    create_authenticator, AdminKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    ADMIN_KEY_HEADER,
};
pub use catalog::{
    load_seed_file, seed_if_empty, CatalogEntry, CatalogError, CatalogFilter, CatalogPage,
    CatalogStats, CatalogStore, Category, DownloadLink, EntryContent, EntryFlag, Episode,
    FilterOptions, Genre, Language, NewCatalogEntry, Quality, RawCatalogQuery, SearchSuggestion,
    SeriesEpisodes, SqliteCatalog,
};
pub use client::{CatalogClient, ClientError};
pub use config::{
    load_config, load_config_from_str, validate_config, AdminConfig, Config, ConfigError,
    DatabaseConfig, SanitizedConfig, ServerConfig,
};
pub use watchlist::{FileStorage, MemoryStorage, Watchlist, WatchlistError, WatchlistStorage};
