use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AppConfig;

/// Liveness probe for a running deployment: one read against the comment
/// API and one against the separately-hosted front-end. Errors mean fail.
pub async fn run(config: &AppConfig) -> Result<()> {
    let client = reqwest::Client::new();

    let api_url = format!(
        "{}/api/comments/",
        config.api_base_url.trim_end_matches('/')
    );
    let response = client
        .get(&api_url)
        .send()
        .await
        .with_context(|| format!("backend API unreachable at {}", api_url))?;

    if !response.status().is_success() {
        return Err(anyhow!("backend API returned {}", response.status()));
    }

    let comments: Value = response
        .json()
        .await
        .context("backend API returned a non-JSON body")?;
    let comments = comments
        .as_array()
        .ok_or_else(|| anyhow!("backend API did not return a comment array"))?;

    info!(count = comments.len(), "backend API reachable");
    match comments.first().and_then(|c| c["author_name"].as_str()) {
        Some(author_name) => info!(first_author = %author_name, "sample data present"),
        None => warn!("no comments found; run the seed importer"),
    }

    let response = client
        .get(&config.frontend_base_url)
        .send()
        .await
        .with_context(|| {
            format!("front-end unreachable at {}", config.frontend_base_url)
        })?;

    if response.status().is_success() {
        info!("front-end reachable");
    } else {
        warn!(status = %response.status(), "front-end responded with an error status");
    }

    Ok(())
}
