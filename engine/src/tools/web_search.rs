//! Web search tool
//!
//! Returns a small set of result snippets for a query. The actual search
//! backend sits behind [`SearchProvider`]; the shipped implementation is a
//! canned-snippet stub so the engine can run without external credentials.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::tools::Tool;
use sdk::ToolError;

/// One search result snippet
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub source: String,
}

/// Backend that answers search queries
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError>;
}

/// Canned-result provider used when no real search backend is wired
pub struct StaticSearchProvider {
    hits: Vec<SearchHit>,
}

impl StaticSearchProvider {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }
}

impl Default for StaticSearchProvider {
    fn default() -> Self {
        Self::new(vec![
            SearchHit {
                title: "Example Title 1".to_string(),
                snippet: "Snippet for result 1...".to_string(),
                source: "example.com".to_string(),
            },
            SearchHit {
                title: "Example Title 2".to_string(),
                snippet: "Snippet for result 2...".to_string(),
                source: "anothersite.org".to_string(),
            },
        ])
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, ToolError> {
        Ok(self.hits.clone())
    }
}

pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Searches the web for a query and returns the top results."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": {
                "type": "object",
                "properties": {
                    "query": { "type": "string" }
                },
                "required": ["query"]
            }
        })
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, ToolError> {
        let args: SearchArgs = serde_json::from_str(arguments_json)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        if args.query.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "query must not be empty".to_string(),
            ));
        }

        info!("Searching the web for: {}", args.query);
        let hits = self.provider.search(&args.query).await?;

        if hits.is_empty() {
            return Ok("No results found.".to_string());
        }

        let formatted = hits
            .iter()
            .map(|hit| {
                format!(
                    "Title: {}\nSnippet: {}\nSource: {}",
                    hit.title, hit.snippet, hit.source
                )
            })
            .collect::<Vec<_>>()
            .join("\n---\n");

        Ok(format!("Search results:\n{}", formatted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_formats_results() {
        let tool = WebSearchTool::new(Arc::new(StaticSearchProvider::default()));

        let out = tool.execute(r#"{"query":"rust agents"}"#).await.unwrap();
        assert!(out.starts_with("Search results:"));
        assert!(out.contains("Example Title 1"));
        assert!(out.contains("---"));
    }

    #[tokio::test]
    async fn test_empty_results() {
        let tool = WebSearchTool::new(Arc::new(StaticSearchProvider::new(Vec::new())));

        let out = tool.execute(r#"{"query":"anything"}"#).await.unwrap();
        assert_eq!(out, "No results found.");
    }

    #[tokio::test]
    async fn test_blank_query_is_invalid() {
        let tool = WebSearchTool::new(Arc::new(StaticSearchProvider::default()));

        let result = tool.execute(r#"{"query":""}"#).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
