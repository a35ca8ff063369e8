//! Search command handler.

use clap::Args;
use kba_core::{config::AppConfig, AppResult};
use kba_knowledge::{ArticleStore, SearchQuery, SearchResult, DEFAULT_SEARCH_LIMIT};

/// Full-text search over articles
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Search text
    pub query: String,

    /// Only return articles in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Maximum number of results (1-50)
    #[arg(short = 'n', long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mut query = SearchQuery::new(&self.query).with_limit(self.limit);
        if let Some(category) = &self.category {
            query = query.with_category(category);
        }

        let store = ArticleStore::open(&config.database)?;
        let results = store.search(&query)?;

        if self.json {
            let output = serde_json::json!({ "results": results });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if results.is_empty() {
            println!("No articles match {:?}", self.query);
        } else {
            for result in &results {
                println!("{}", format_result(result));
            }
        }

        Ok(())
    }
}

fn format_result(result: &SearchResult) -> String {
    let mut text = format!(
        "[{}] {} ({}, {}, {})",
        result.id, result.title, result.category_name, result.author_name, result.publish_date
    );
    if !result.tags.is_empty() {
        text.push_str(&format!("\n    tags: {}", result.tags));
    }
    let excerpt = result.excerpt.split_whitespace().collect::<Vec<_>>().join(" ");
    text.push_str(&format!("\n    {}", excerpt));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result(tags: &str) -> SearchResult {
        SearchResult {
            id: 3,
            title: "Query Plans".to_string(),
            excerpt: "Query Plans\n\nReading   plans.".to_string(),
            publish_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            author_id: 1,
            author_name: "Ada Data".to_string(),
            author_bio: String::new(),
            category_id: 2,
            category_name: "Databases".to_string(),
            tags: tags.to_string(),
            rank: 1.5,
        }
    }

    #[test]
    fn test_format_result_with_tags() {
        let text = format_result(&result("indexes, postgres"));
        assert_eq!(
            text,
            "[3] Query Plans (Databases, Ada Data, 2024-05-20)\n    tags: indexes, postgres\n    Query Plans Reading plans."
        );
    }

    #[test]
    fn test_format_result_without_tags() {
        let text = format_result(&result(""));
        assert!(!text.contains("tags:"));
    }
}
