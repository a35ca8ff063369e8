//! Deterministic sample data.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};

use super::db_error;
use crate::types::StoreStats;
use kba_core::{AppError, AppResult};

const AUTHORS: [(&str, &str); 4] = [
    ("Guido Van Prime", "Engineer and writer focusing on Python internals."),
    ("Ada Data", "Database specialist with a love for SQL and query planning."),
    ("Grace Hopperton", "Backend engineer who cares about clarity and correctness."),
    ("Linus Craft", "Systems programmer exploring performance and tooling."),
];

const CATEGORIES: [&str; 5] = ["Python", "Databases", "Frontend", "DevOps", "LLMs"];

const TAGS: [&str; 18] = [
    "asyncio",
    "typing",
    "indexes",
    "joins",
    "ORM",
    "transactions",
    "postgres",
    "sqlite",
    "fastapi",
    "flask",
    "testing",
    "cicd",
    "rag",
    "prompting",
    "vector",
    "tokenization",
    "performance",
    "caching",
];

const TITLES: [&str; 24] = [
    "Mastering Async IO in Python",
    "Demystifying PostgreSQL Indexes",
    "Effective SQL Joins: Inner vs Outer",
    "FastAPI vs Flask: Choosing the Right Tool",
    "Schema Design for Scalable Apps",
    "Building RAG Pipelines without Heavy Frameworks",
    "Understanding Query Plans in Postgres",
    "Typing in Python: When and Why",
    "Full-Text Search with PostgreSQL",
    "Designing REST APIs for Performance",
    "Caching Strategies for Backend Services",
    "Migrations 101: Alembic and Beyond",
    "Testing Pyramid: Unit to E2E",
    "CI/CD for Python Backends",
    "Cursor vs Offset Pagination in APIs",
    "Transactions and Isolation Levels",
    "Secure Secrets: .env and Beyond",
    "Web Security Basics for APIs",
    "Vector Search vs Full-Text Search",
    "Prompt Engineering Essentials",
    "Token Budgets and Context Windows",
    "Frontend-Friendly API Responses",
    "Joins across Tags and Categories",
    "Date-based Partitioning in Postgres",
];

const BOILERPLATE: &str = "This article explores practical techniques with examples and trade-offs. \
It covers pitfalls, performance considerations, and real-world tips for teams. \
You will find code snippets, explanations, and gotchas to avoid in production. ";

/// Publish dates fall within this many days before `today`.
const MAX_AGE_DAYS: u64 = 900;

/// Fill empty tables with sample data. Returns the rows inserted.
///
/// Each table is only touched when it is empty, so re-running is a no-op.
pub(crate) fn seed_tables(
    conn: &mut Connection,
    seed: u64,
    today: NaiveDate,
) -> AppResult<StoreStats> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut inserted = StoreStats::default();

    let tx = conn
        .transaction()
        .map_err(|e| db_error("start seed transaction", e))?;

    if is_empty(&tx, "authors")? {
        for (name, bio) in AUTHORS {
            tx.execute("INSERT INTO authors (name, bio) VALUES (?1, ?2)", params![name, bio])
                .map_err(|e| db_error("insert author", e))?;
            inserted.authors += 1;
        }
    }

    if is_empty(&tx, "categories")? {
        for name in CATEGORIES {
            tx.execute("INSERT INTO categories (name) VALUES (?1)", params![name])
                .map_err(|e| db_error("insert category", e))?;
            inserted.categories += 1;
        }
    }

    if is_empty(&tx, "tags")? {
        for name in TAGS {
            tx.execute("INSERT INTO tags (name) VALUES (?1)", params![name])
                .map_err(|e| db_error("insert tag", e))?;
            inserted.tags += 1;
        }
    }

    if is_empty(&tx, "articles")? {
        let author_ids = ids(&tx, "authors")?;
        let category_ids = ids(&tx, "categories")?;
        let tag_ids = ids(&tx, "tags")?;

        for title in TITLES {
            let repeats = rng.gen_range(20..=40);
            let content = format!("{}\n\n{}", title, BOILERPLATE.repeat(repeats))
                .trim()
                .to_string();
            let age = rng.gen_range(0..=MAX_AGE_DAYS);
            let publish_date = today.checked_sub_days(Days::new(age)).unwrap_or(today);
            let author_id = *author_ids
                .choose(&mut rng)
                .ok_or_else(|| AppError::Database("No authors to assign".to_string()))?;
            let category_id = *category_ids
                .choose(&mut rng)
                .ok_or_else(|| AppError::Database("No categories to assign".to_string()))?;

            tx.execute(
                "INSERT INTO articles (title, content, publish_date, author_id, category_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![title, content, publish_date, author_id, category_id],
            )
            .map_err(|e| db_error("insert article", e))?;
            inserted.articles += 1;

            let article_id = tx.last_insert_rowid();
            let tag_count = rng.gen_range(2..=5).min(tag_ids.len());
            for tag_id in tag_ids.choose_multiple(&mut rng, tag_count) {
                inserted.article_tags += tx
                    .execute(
                        "INSERT OR IGNORE INTO article_tags (article_id, tag_id) VALUES (?1, ?2)",
                        params![article_id, tag_id],
                    )
                    .map_err(|e| db_error("tag article", e))? as u64;
            }
        }
    }

    tx.commit().map_err(|e| db_error("commit seed", e))?;

    tracing::debug!("Seeded rows: {:?}", inserted);
    Ok(inserted)
}

fn is_empty(conn: &Connection, table: &str) -> AppResult<bool> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .map_err(|e| db_error("count rows", e))?;
    Ok(count == 0)
}

fn ids(conn: &Connection, table: &str) -> AppResult<Vec<i64>> {
    let mut stmt = conn
        .prepare(&format!("SELECT id FROM {} ORDER BY id", table))
        .map_err(|e| db_error("prepare id query", e))?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| db_error("query ids", e))?;
    rows.collect::<Result<Vec<i64>, _>>()
        .map_err(|e| db_error("read ids", e))
}
