//! SQLite-backed catalog implementation.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ToSql};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{
    CatalogEntry, CatalogError, CatalogFilter, CatalogPage, CatalogStats, CatalogStore,
    EntryFlag, FilterOptions, Genre, NewCatalogEntry, SearchSuggestion, SUGGESTION_MIN_CHARS,
};

const SELECT_COLUMNS: &str = "e.id, e.title, e.language, e.category, e.genre, e.year, \
     e.poster_url, e.description, e.file_size, e.content, e.is_trending, e.is_featured, \
     e.is_active, e.download_count, e.created_at";

/// SQLite-backed catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.busy_timeout(Duration::from_secs(5)).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- One row per movie or series
            CREATE TABLE IF NOT EXISTS catalog_entries (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                title_folded TEXT NOT NULL,
                language TEXT NOT NULL,
                category TEXT NOT NULL,
                genre TEXT NOT NULL,
                year INTEGER NOT NULL,
                poster_url TEXT NOT NULL,
                description TEXT NOT NULL,
                description_folded TEXT NOT NULL,
                file_size TEXT NOT NULL,
                kind TEXT NOT NULL,
                content TEXT NOT NULL,
                is_trending INTEGER NOT NULL DEFAULT 0,
                is_featured INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                download_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_entries_language ON catalog_entries(language);
            CREATE INDEX IF NOT EXISTS idx_catalog_entries_category ON catalog_entries(category);
            CREATE INDEX IF NOT EXISTS idx_catalog_entries_year ON catalog_entries(year);
            CREATE INDEX IF NOT EXISTS idx_catalog_entries_trending ON catalog_entries(is_trending);
            CREATE INDEX IF NOT EXISTS idx_catalog_entries_active ON catalog_entries(is_active);
            CREATE INDEX IF NOT EXISTS idx_catalog_entries_created ON catalog_entries(created_at);

            -- Genre membership, for filtering and distinct values
            CREATE TABLE IF NOT EXISTS catalog_entry_genres (
                entry_id TEXT NOT NULL REFERENCES catalog_entries(id) ON DELETE CASCADE,
                genre TEXT NOT NULL,
                PRIMARY KEY (entry_id, genre)
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_entry_genres_genre ON catalog_entry_genres(genre);
            "#,
        )
        .map_err(db_err)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("catalog connection lock poisoned".to_string()))
    }

    fn build_where_clause(filter: &CatalogFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if filter.no_match {
            conditions.push("0");
        }

        if !filter.include_inactive {
            conditions.push("e.is_active = 1");
        }

        if let Some(language) = filter.language {
            conditions.push("e.language = ?");
            params.push(Box::new(language.as_str()));
        }

        if let Some(category) = filter.category {
            conditions.push("e.category = ?");
            params.push(Box::new(category.as_str()));
        }

        if let Some(genre) = filter.genre {
            conditions.push(
                "EXISTS (SELECT 1 FROM catalog_entry_genres g WHERE g.entry_id = e.id AND g.genre = ?)",
            );
            params.push(Box::new(genre.as_str()));
        }

        if let Some(year) = filter.year {
            conditions.push("e.year = ?");
            params.push(Box::new(year));
        }

        if filter.trending_only {
            conditions.push("e.is_trending = 1");
        }

        if filter.featured_only {
            conditions.push("e.is_featured = 1");
        }

        if let Some(ref search) = filter.search {
            // Folded columns keep the match case-insensitive beyond ASCII
            conditions.push("(instr(e.title_folded, ?) > 0 OR instr(e.description_folded, ?) > 0)");
            let term = fold(search);
            params.push(Box::new(term.clone()));
            params.push(Box::new(term));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
        let created_at_str: String = row.get(14)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(14, Type::Text, Box::new(e)))?;
        let download_count: i64 = row.get(13)?;

        Ok(CatalogEntry {
            id: row.get(0)?,
            title: row.get(1)?,
            language: parse_column(row, 2)?,
            category: parse_column(row, 3)?,
            genre: json_column(row, 4)?,
            year: row.get(5)?,
            poster_url: row.get(6)?,
            description: row.get(7)?,
            file_size: row.get(8)?,
            content: json_column(row, 9)?,
            is_trending: row.get(10)?,
            is_featured: row.get(11)?,
            is_active: row.get(12)?,
            download_count: download_count.max(0) as u64,
            created_at,
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<CatalogEntry, CatalogError> {
        conn.query_row(
            &format!("SELECT {} FROM catalog_entries e WHERE e.id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_entry,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => CatalogError::NotFound(id.to_string()),
            _ => db_err(e),
        })
    }

    fn query_entries(
        conn: &Connection,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let rows = stmt.query_map(params, Self::row_to_entry).map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_err)?);
        }
        Ok(entries)
    }

    fn write_genres(conn: &Connection, id: &str, genres: &[Genre]) -> Result<(), CatalogError> {
        conn.execute(
            "DELETE FROM catalog_entry_genres WHERE entry_id = ?",
            params![id],
        )
        .map_err(db_err)?;

        for genre in genres {
            conn.execute(
                "INSERT OR IGNORE INTO catalog_entry_genres (entry_id, genre) VALUES (?, ?)",
                params![id, genre.as_str()],
            )
            .map_err(db_err)?;
        }
        Ok(())
    }

    fn distinct<T: FromStr>(conn: &Connection, sql: &str) -> Result<Vec<T>, CatalogError>
    where
        T::Err: std::fmt::Display,
    {
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?;

        let mut values = Vec::new();
        for row in rows {
            let raw = row.map_err(db_err)?;
            values.push(
                raw.parse()
                    .map_err(|e: T::Err| CatalogError::Database(e.to_string()))?,
            );
        }
        Ok(values)
    }
}

impl CatalogStore for SqliteCatalog {
    fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError> {
        let entry = entry.validated()?;
        let record = CatalogEntry {
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
            // Stored with microsecond precision; keep the returned value identical
            created_at: Utc::now().trunc_subsecs(6),
        };

        let genre_json = to_json(&record.genre)?;
        let content_json = to_json(&record.content)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_err)?;

        tx.execute(
            "INSERT INTO catalog_entries (id, title, title_folded, language, category, genre, year,
                poster_url, description, description_folded, file_size, kind, content,
                is_trending, is_featured, is_active, download_count, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
            params![
                &record.id,
                &record.title,
                fold(&record.title),
                record.language.as_str(),
                record.category.as_str(),
                &genre_json,
                record.year,
                &record.poster_url,
                &record.description,
                fold(&record.description),
                &record.file_size,
                record.content.kind(),
                &content_json,
                record.is_trending,
                record.is_featured,
                record.is_active,
                timestamp(&record.created_at),
            ],
        )
        .map_err(db_err)?;

        Self::write_genres(&tx, &record.id, &record.genre)?;
        tx.commit().map_err(db_err)?;

        Ok(record)
    }

    fn get(&self, id: &str) -> Result<CatalogEntry, CatalogError> {
        let conn = self.conn()?;
        Self::fetch(&conn, id)
    }

    fn update(&self, id: &str, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError> {
        let entry = entry.validated()?;
        let genre_json = to_json(&entry.genre)?;
        let content_json = to_json(&entry.content)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_err)?;

        let rows_affected = tx
            .execute(
                "UPDATE catalog_entries SET
                    title = ?, title_folded = ?, language = ?, category = ?, genre = ?, year = ?,
                    poster_url = ?, description = ?, description_folded = ?, file_size = ?,
                    kind = ?, content = ?, is_trending = ?, is_featured = ?, is_active = ?
                 WHERE id = ?",
                params![
                    &entry.title,
                    fold(&entry.title),
                    entry.language.as_str(),
                    entry.category.as_str(),
                    &genre_json,
                    entry.year,
                    &entry.poster_url,
                    &entry.description,
                    fold(&entry.description),
                    &entry.file_size,
                    entry.content.kind(),
                    &content_json,
                    entry.is_trending,
                    entry.is_featured,
                    entry.is_active,
                    id,
                ],
            )
            .map_err(db_err)?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        Self::write_genres(&tx, id, &entry.genre)?;
        let updated = Self::fetch(&tx, id)?;
        tx.commit().map_err(db_err)?;

        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_err)?;

        tx.execute(
            "DELETE FROM catalog_entry_genres WHERE entry_id = ?",
            params![id],
        )
        .map_err(db_err)?;
        let rows_affected = tx
            .execute("DELETE FROM catalog_entries WHERE id = ?", params![id])
            .map_err(db_err)?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        tx.commit().map_err(db_err)?;
        Ok(())
    }

    fn list(&self, filter: &CatalogFilter) -> Result<CatalogPage, CatalogError> {
        let conn = self.conn()?;
        let (where_clause, params) = Self::build_where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM catalog_entries e {}", where_clause);
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let total: i64 = conn
            .query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(db_err)?;

        let sql = format!(
            "SELECT {} FROM catalog_entries e {} ORDER BY e.created_at DESC, e.rowid DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_clause
        );
        let limit = i64::from(filter.limit);
        let offset = i64::try_from(filter.offset()).unwrap_or(i64::MAX);
        let mut page_params = param_refs;
        page_params.push(&limit);
        page_params.push(&offset);

        let items = Self::query_entries(&conn, &sql, &page_params)?;
        let total = total.max(0) as u64;

        Ok(CatalogPage {
            items,
            total,
            page: filter.page,
            page_count: filter.page_count(total),
        })
    }

    fn related(&self, id: &str, limit: u32) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.conn()?;
        let source = Self::fetch(&conn, id)?;

        let language = source.language.as_str();
        let genres: Vec<&str> = source.genre.iter().map(|g| g.as_str()).collect();
        let limit = i64::from(limit);

        let mut params: Vec<&dyn ToSql> = vec![&source.id, &language];
        let shares_genre = if genres.is_empty() {
            String::new()
        } else {
            let placeholders = vec!["?"; genres.len()].join(", ");
            for genre in &genres {
                params.push(genre);
            }
            format!(
                " OR EXISTS (SELECT 1 FROM catalog_entry_genres g WHERE g.entry_id = e.id AND g.genre IN ({}))",
                placeholders
            )
        };
        params.push(&limit);

        let sql = format!(
            "SELECT {} FROM catalog_entries e
             WHERE e.is_active = 1 AND e.id != ? AND (e.language = ?{})
             ORDER BY e.created_at DESC, e.rowid DESC LIMIT ?",
            SELECT_COLUMNS, shares_genre
        );

        Self::query_entries(&conn, &sql, &params)
    }

    fn suggestions(&self, query: &str, limit: u32) -> Result<Vec<SearchSuggestion>, CatalogError> {
        let query = query.trim();
        if query.chars().count() < SUGGESTION_MIN_CHARS {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, poster_url, language, year FROM catalog_entries
                 WHERE is_active = 1 AND instr(title_folded, ?1) > 0
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![fold(query), i64::from(limit)], |row| {
                Ok(SearchSuggestion {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    poster_url: row.get(2)?,
                    language: parse_column(row, 3)?,
                    year: row.get(4)?,
                })
            })
            .map_err(db_err)?;

        let mut suggestions = Vec::new();
        for row in rows {
            suggestions.push(row.map_err(db_err)?);
        }
        Ok(suggestions)
    }

    fn record_download(&self, id: &str) -> Result<u64, CatalogError> {
        let conn = self.conn()?;

        // Single statement: concurrent increments never lose an update
        let count: i64 = conn
            .query_row(
                "UPDATE catalog_entries SET download_count = download_count + 1
                 WHERE id = ? RETURNING download_count",
                params![id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CatalogError::NotFound(id.to_string()),
                _ => db_err(e),
            })?;

        Ok(count.max(0) as u64)
    }

    fn toggle(&self, id: &str, flag: EntryFlag) -> Result<CatalogEntry, CatalogError> {
        let conn = self.conn()?;
        let column = flag.column();

        let rows_affected = conn
            .execute(
                &format!(
                    "UPDATE catalog_entries SET {0} = NOT {0} WHERE id = ?",
                    column
                ),
                params![id],
            )
            .map_err(db_err)?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        Self::fetch(&conn, id)
    }

    fn filter_options(&self) -> Result<FilterOptions, CatalogError> {
        let conn = self.conn()?;

        let languages = Self::distinct(
            &conn,
            "SELECT DISTINCT language FROM catalog_entries WHERE is_active = 1 ORDER BY language",
        )?;
        let categories = Self::distinct(
            &conn,
            "SELECT DISTINCT category FROM catalog_entries WHERE is_active = 1 ORDER BY category",
        )?;
        let genres = Self::distinct(
            &conn,
            "SELECT DISTINCT g.genre FROM catalog_entry_genres g
             JOIN catalog_entries e ON e.id = g.entry_id
             WHERE e.is_active = 1 ORDER BY g.genre",
        )?;

        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT year FROM catalog_entries WHERE is_active = 1 ORDER BY year DESC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, i32>(0))
            .map_err(db_err)?;
        let mut years = Vec::new();
        for row in rows {
            years.push(row.map_err(db_err)?);
        }

        Ok(FilterOptions {
            languages,
            categories,
            genres,
            years,
        })
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_trending), 0),
                    COALESCE(SUM(is_featured), 0),
                    COALESCE(SUM(kind = 'series'), 0),
                    COALESCE(SUM(download_count), 0)
             FROM catalog_entries WHERE is_active = 1",
            [],
            |row| {
                let count = |idx: usize| row.get::<_, i64>(idx).map(|v| v.max(0) as u64);
                Ok(CatalogStats {
                    total: count(0)?,
                    trending: count(1)?,
                    featured: count(2)?,
                    series: count(3)?,
                    total_downloads: count(4)?,
                })
            },
        )
        .map_err(db_err)
    }

    fn count_all(&self) -> Result<u64, CatalogError> {
        let conn = self.conn()?;
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM catalog_entries", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(total.max(0) as u64)
    }
}

fn db_err(e: rusqlite::Error) -> CatalogError {
    CatalogError::Database(e.to_string())
}

fn fold(text: &str) -> String {
    text.to_lowercase()
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CatalogError> {
    serde_json::to_string(value).map_err(|e| CatalogError::Internal(e.to_string()))
}

fn parse_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = super::UnknownVariant>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json_column<T: DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
