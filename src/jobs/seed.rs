use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

use crate::app::comments::CommentService;
use crate::app::users::UserService;
use crate::config::AppConfig;
use crate::domain::user::{NewUser, User};
use crate::infra::db::Db;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_FIRST_NAME: &str = "Admin";
const ADMIN_DEFAULT_PASSWORD: &str = "admin123";
const USER_DEFAULT_PASSWORD: &str = "password123";
const PREVIEW_LEN: usize = 50;

#[derive(Debug, Deserialize)]
struct SeedDocument {
    #[serde(default)]
    comments: Vec<SeedComment>,
}

#[derive(Debug, Deserialize)]
struct SeedComment {
    #[serde(default = "unknown_author")]
    author: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    likes: i64,
    #[serde(default)]
    image: String,
}

fn unknown_author() -> String {
    "Unknown".to_string()
}

/// One-shot import: wipe all comments, then repopulate users and comments
/// from the JSON export named by `SEED_FILE`. Fail-stop: the reset is not
/// undone if a later step errors.
pub async fn run(db: &Db, config: &AppConfig) -> Result<()> {
    let raw = std::fs::read_to_string(&config.seed_file)
        .with_context(|| format!("cannot read seed file {:?}", config.seed_file))?;
    let document: SeedDocument = serde_json::from_str(&raw)
        .with_context(|| format!("invalid JSON in {:?}", config.seed_file))?;

    info!(
        count = document.comments.len(),
        file = %config.seed_file,
        "loaded seed comments"
    );

    let comments = CommentService::new(db.clone());
    let users = UserService::new(db.clone());

    let removed = comments.delete_all().await?;
    if removed > 0 {
        info!(count = removed, "cleared existing comments");
    }

    // The admin account comes first so API creates have an author to
    // attach to. An existing admin is reused untouched.
    let (_, created) = users
        .get_or_create(NewUser {
            username: config.default_author.clone(),
            email: ADMIN_EMAIL.to_string(),
            first_name: ADMIN_FIRST_NAME.to_string(),
            is_staff: true,
            is_superuser: true,
            password: ADMIN_DEFAULT_PASSWORD.to_string(),
        })
        .await?;
    if created {
        info!(username = %config.default_author, "created admin user");
    } else {
        info!(username = %config.default_author, "admin user already exists");
    }

    // One user per distinct raw author string, first occurrence wins.
    let mut authors: HashMap<String, User> = HashMap::new();
    for entry in &document.comments {
        if authors.contains_key(&entry.author) {
            continue;
        }
        let username = normalize_username(&entry.author);
        let (user, created) = users
            .get_or_create(NewUser {
                username: username.clone(),
                email: format!("{}@example.com", username),
                first_name: entry.author.clone(),
                is_staff: false,
                is_superuser: false,
                password: USER_DEFAULT_PASSWORD.to_string(),
            })
            .await?;
        if created {
            info!(author = %entry.author, username = %username, "created user");
        }
        authors.insert(entry.author.clone(), user);
    }

    let mut created_count = 0u64;
    for entry in &document.comments {
        let author = authors
            .get(&entry.author)
            .context("author resolved in a previous pass is missing")?;
        let image = if entry.image.is_empty() {
            None
        } else {
            Some(entry.image.clone())
        };

        comments
            .create(author, entry.text.clone(), entry.likes, image)
            .await?;
        created_count += 1;
        info!(
            author = %entry.author,
            likes = entry.likes,
            preview = %preview(&entry.text),
            "created comment"
        );
    }

    let total = comments.count().await?;
    info!(
        comments_created = created_count,
        users_resolved = authors.len(),
        total_comments = total,
        "seed run complete"
    );

    Ok(())
}

fn normalize_username(author: &str) -> String {
    author.to_lowercase().replace(' ', "_")
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_username_lowercases_and_underscores() {
        assert_eq!(normalize_username("Jane Doe"), "jane_doe");
        assert_eq!(normalize_username("admin"), "admin");
        assert_eq!(normalize_username("A B C"), "a_b_c");
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(80);
        let p = preview(&long);
        assert_eq!(p, format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("Hello world"), "Hello world");
    }

    #[test]
    fn seed_document_defaults_missing_fields() {
        let doc: SeedDocument =
            serde_json::from_str(r#"{"comments": [{"text": "hi"}]}"#).unwrap();
        assert_eq!(doc.comments[0].author, "Unknown");
        assert_eq!(doc.comments[0].likes, 0);
        assert_eq!(doc.comments[0].image, "");
    }
}
