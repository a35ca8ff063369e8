//! SQLite article store with FTS5 search.
//!
//! The store opens a fresh connection for every operation, so an
//! [`ArticleStore`] is just a path and can be cloned freely across threads.
//! All methods block; async callers should run them on a blocking pool.

mod schema;
mod seed;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::types::{ArticleRecord, SearchQuery, SearchResult, StoreStats};
use kba_core::{AppError, AppResult};

pub use schema::SCHEMA;

/// Characters of content returned as a search excerpt.
pub const EXCERPT_CHARS: usize = 280;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the article database.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    path: PathBuf,
}

impl ArticleStore {
    /// Point the store at `path`, creating the parent directory if needed.
    ///
    /// Does not touch the database itself; see [`ArticleStore::init_schema`].
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Database(format!(
                    "Failed to create database directory {:?}: {}",
                    parent, e
                ))
            })?;
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> AppResult<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(|e| AppError::Database(format!("Failed to open {:?}: {}", self.path, e)))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| db_error("set busy timeout", e))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| db_error("enable foreign keys", e))?;
        Ok(conn)
    }

    /// Create tables, indexes and triggers. Safe to call repeatedly.
    pub fn init_schema(&self) -> AppResult<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| db_error("apply schema", e))?;

        tracing::debug!("Applied schema to {:?}", self.path);
        Ok(())
    }

    /// Seed sample data into empty tables, dating articles relative to today.
    pub fn seed(&self, seed: u64) -> AppResult<StoreStats> {
        self.seed_as_of(seed, Local::now().date_naive())
    }

    /// Seed sample data with publish dates counted back from `today`.
    pub fn seed_as_of(&self, seed: u64, today: NaiveDate) -> AppResult<StoreStats> {
        let mut conn = self.connect()?;
        seed::seed_tables(&mut conn, seed, today)
    }

    /// Row counts per table.
    pub fn stats(&self) -> AppResult<StoreStats> {
        let conn = self.connect()?;
        let count = |table: &str| -> AppResult<u64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(|e| db_error("count rows", e))
        };

        Ok(StoreStats {
            authors: count("authors")?,
            categories: count("categories")?,
            tags: count("tags")?,
            articles: count("articles")?,
            article_tags: count("article_tags")?,
        })
    }

    /// Full-text search over title and content.
    ///
    /// Falls back to a case-insensitive substring match when the full-text
    /// pass finds nothing; fallback rows carry a rank of 0.
    pub fn search(&self, query: &SearchQuery) -> AppResult<Vec<SearchResult>> {
        let text = query.query.trim();
        if text.is_empty() {
            return Err(AppError::Validation("query is required".to_string()));
        }

        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let limit = query.effective_limit() as i64;

        let conn = self.connect()?;

        let mut results = match fts_expression(text) {
            Some(expr) => query_results(&conn, FTS_SEARCH, params![expr, category, limit])?,
            None => Vec::new(),
        };

        if results.is_empty() {
            tracing::debug!("No full-text hits for {:?}; trying substring match", text);
            let pattern = format!("%{}%", escape_like(text));
            results = query_results(&conn, SUBSTRING_SEARCH, params![pattern, category, limit])?;
        }

        for result in &mut results {
            result.tags = tags_for(&conn, result.id)?;
        }

        tracing::debug!("Search {:?} returned {} results", text, results.len());
        Ok(results)
    }

    /// Title and content of the given articles, newest first.
    ///
    /// Ids that do not exist are silently absent from the result.
    pub fn fetch_contexts(&self, ids: &[i64]) -> AppResult<Vec<ArticleRecord>> {
        if ids.is_empty() {
            return Err(AppError::Validation("context_ids is required".to_string()));
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, title, content FROM articles WHERE id IN ({})
             ORDER BY publish_date DESC, id ASC",
            placeholders
        );

        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| db_error("prepare context fetch", e))?;
        let rows = stmt
            .query_map(params_from_iter(ids.iter()), |row| {
                Ok(ArticleRecord {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                })
            })
            .map_err(|e| db_error("fetch contexts", e))?;

        let records = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| db_error("read contexts", e))?;

        if records.len() < ids.len() {
            tracing::debug!("Fetched {} of {} requested articles", records.len(), ids.len());
        }

        Ok(records)
    }
}

const FTS_SEARCH: &str = "
    SELECT a.id, a.title, substr(a.content, 1, 280), a.publish_date,
           au.id, au.name, au.bio, c.id, c.name, -bm25(articles_fts) AS score
    FROM articles_fts
    JOIN articles a ON a.id = articles_fts.rowid
    JOIN authors au ON au.id = a.author_id
    JOIN categories c ON c.id = a.category_id
    WHERE articles_fts MATCH ?1 AND (?2 IS NULL OR c.name = ?2)
    ORDER BY score DESC, a.publish_date DESC
    LIMIT ?3";

const SUBSTRING_SEARCH: &str = "
    SELECT a.id, a.title, substr(a.content, 1, 280), a.publish_date,
           au.id, au.name, au.bio, c.id, c.name, 0.0 AS score
    FROM articles a
    JOIN authors au ON au.id = a.author_id
    JOIN categories c ON c.id = a.category_id
    WHERE (a.title LIKE ?1 ESCAPE '\\' OR a.content LIKE ?1 ESCAPE '\\')
      AND (?2 IS NULL OR c.name = ?2)
    ORDER BY a.publish_date DESC, a.id ASC
    LIMIT ?3";

fn query_results(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> AppResult<Vec<SearchResult>> {
    let mut stmt = conn.prepare(sql).map_err(|e| db_error("prepare search", e))?;
    let rows = stmt
        .query_map(params, search_row)
        .map_err(|e| db_error("search articles", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| db_error("read search results", e))
}

fn search_row(row: &Row<'_>) -> rusqlite::Result<SearchResult> {
    Ok(SearchResult {
        id: row.get(0)?,
        title: row.get(1)?,
        excerpt: row.get(2)?,
        publish_date: row.get(3)?,
        author_id: row.get(4)?,
        author_name: row.get(5)?,
        author_bio: row.get(6)?,
        category_id: row.get(7)?,
        category_name: row.get(8)?,
        tags: String::new(),
        rank: row.get(9)?,
    })
}

fn tags_for(conn: &Connection, article_id: i64) -> AppResult<String> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT t.name FROM article_tags atg JOIN tags t ON t.id = atg.tag_id
             WHERE atg.article_id = ?1 ORDER BY t.name",
        )
        .map_err(|e| db_error("prepare tag query", e))?;
    let names = stmt
        .query_map([article_id], |row| row.get::<_, String>(0))
        .map_err(|e| db_error("query tags", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| db_error("read tags", e))?;
    Ok(names.join(", "))
}

/// Build an FTS5 expression requiring every term of `query`.
///
/// Terms are the alphanumeric runs of the input, each double-quoted so FTS5
/// syntax characters in user input are never interpreted. Returns `None`
/// when the input has no terms.
pub fn fts_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn db_error(action: &str, err: rusqlite::Error) -> AppError {
    AppError::Database(format!("Failed to {}: {}", action, err))
}
