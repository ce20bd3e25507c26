//! Wait For Task Example
//!
//! Creates an index, adds a few documents and waits for both tasks.
//! A running Meilisearch server is expected at MEILI_HOST
//! (default http://localhost:7700) with MEILI_API_KEY if one is set.
//!
//! Run with: cargo run --example wait_for_task

use meili_rs::{Client, ClientConfig, EnqueuedTaskExt, ErrorKind, PollOptions};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Movie {
    id: u32,
    title: &'static str,
    genres: &'static [&'static str],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meili_rs=debug")),
        )
        .init();

    let config = ClientConfig::from_env()
        .client_agent("meili-rs-demo/wait_for_task")
        .poll(PollOptions::new(Duration::from_millis(100), Duration::from_secs(10)));
    let client = Client::new(config)?;

    if !client.is_healthy().await {
        println!("Meilisearch is not reachable, start a server first");
        return Ok(());
    }

    let creation = client.create_index("movies", Some("id")).await?;
    println!("📥 Index creation enqueued as task {}", creation.task_uid);
    let task = creation.wait(&client, None).await?;
    println!("   status: {}", task.status);
    if let Some(error) = &task.error {
        // an existing index is reported on the task, not as a client error
        println!("   reason: {}", error.message.as_deref().unwrap_or("unknown"));
    }

    let movies = [
        Movie { id: 1, title: "Carol", genres: &["Romance", "Drama"] },
        Movie { id: 2, title: "Wonder Woman", genres: &["Action", "Adventure"] },
        Movie { id: 3, title: "Life of Pi", genres: &["Adventure", "Drama"] },
    ];
    let index = client.index("movies");
    let first = index.add_documents(&movies[..2], None).await?;
    let second = index.add_documents(&movies[2..], None).await?;

    match index
        .wait_for_tasks(&[first.task_uid, second.task_uid], None)
        .await
    {
        Ok(tasks) => {
            for task in tasks {
                println!("✅ Task {} finished as {}", task.uid, task.status);
            }
        }
        Err(err) if err.kind() == ErrorKind::Timeout => {
            println!("⏱️  Still indexing: {}", err);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
