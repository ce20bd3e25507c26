//! Search Example
//!
//! Runs a POST search, the same search as a GET request, and a
//! multi-search across two indexes.
//!
//! Run with: cargo run --example search_movies -- "prince"

use meili_rs::{
    Client, ClientConfig, IndexSearchQuery, MatchingStrategy, MultiSearchQuery, SearchQuery,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Movie {
    id: u32,
    title: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meili_rs=debug")),
        )
        .init();

    let term = std::env::args().nth(1).unwrap_or_else(|| "wonder".to_string());
    let client = Client::new(ClientConfig::from_env())?;
    let movies = client.index("movies");

    let query = SearchQuery::new(term.clone())
        .with_limit(5)
        .with_matching_strategy(MatchingStrategy::Last);

    let response = movies.search::<Movie>(&query).await?;
    println!(
        "🔍 {} hit(s) for '{}' in {}ms",
        response.estimated_total_hits.unwrap_or(response.hits.len()),
        term,
        response.processing_time_ms
    );
    for (i, hit) in response.hits.iter().enumerate() {
        println!("   {}. {} (id {})", i + 1, hit.result.title, hit.result.id);
    }

    let via_get = movies.search_get::<Movie>(&query).await?;
    println!("   GET search returned {} hit(s)\n", via_get.hits.len());

    let batch = MultiSearchQuery {
        queries: vec![
            IndexSearchQuery::new("movies", SearchQuery::new(term.clone()).with_limit(3)),
            IndexSearchQuery::new("movies", SearchQuery::placeholder().with_limit(3)),
        ],
    };
    match client.multi_search::<Movie>(&batch).await {
        Ok(results) => {
            for result in results.results {
                println!("📚 {}: {} hit(s)", result.index_uid, result.response.hits.len());
            }
        }
        Err(err) => println!("multi-search failed ({:?}): {}", err.kind(), err),
    }

    Ok(())
}
