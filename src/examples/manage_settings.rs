//! Settings Example
//!
//! Updates a handful of settings, waits for them to apply and shows that an
//! invalid ranking rule is rejected before any request goes out.
//!
//! Run with: cargo run --example manage_settings

use meili_rs::{Client, ClientConfig, Faceting, Settings, TypoTolerance};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meili_rs=debug")),
        )
        .init();

    let client = Client::new(ClientConfig::from_env())?;
    let index = client.index("movies");

    let settings = Settings::new()
        .with_searchable_attributes(["title", "overview"])
        .with_filterable_attributes(["genres", "year"])
        .with_sortable_attributes(["year"])
        .with_ranking_rules(["words", "typo", "proximity", "attribute", "sort", "exactness", "year:desc"])
        .with_faceting(Faceting {
            max_values_per_facet: Some(50),
            ..Faceting::default()
        });

    let task = index.update_settings(&settings).await?;
    let task = index.wait_for_task(task.task_uid, None).await?;
    println!("⚙️  Settings update finished as {}", task.status);

    let typo = TypoTolerance {
        disable_on_attributes: Some(vec!["year".to_string()]),
        ..TypoTolerance::default()
    };
    let task = index.update_typo_tolerance(&typo).await?;
    index.wait_for_task(task.task_uid, None).await?;

    println!("   ranking rules: {:?}", index.get_ranking_rules().await?);
    println!("   typo tolerance: {:?}", index.get_typo_tolerance().await?);

    let invalid = vec!["year:up".to_string()];
    match index.update_ranking_rules(&invalid).await {
        Ok(_) => println!("unexpectedly accepted {:?}", invalid),
        Err(err) => println!("❌ Rejected locally: {}", err),
    }

    let task = index.reset_stop_words().await?;
    index.wait_for_task(task.task_uid, None).await?;
    println!("🧹 Stop words reset");

    Ok(())
}
