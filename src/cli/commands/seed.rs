use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StorageBackend};
use crate::services::{Registration, ServiceError};
use crate::state::AppState;

/// Top level of a seed file
#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub users: Vec<UserFixture>,
}

#[derive(Debug, Deserialize)]
pub struct UserFixture {
    pub username: String,
    pub password: String,
    pub fullname: Option<String>,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Vec<NoteFixture>,
}

/// A note whose folder and tags are given by name
#[derive(Debug, Deserialize)]
pub struct NoteFixture {
    pub title: String,
    pub content: Option<String>,
    pub folder: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub folders: usize,
    pub tags: usize,
    pub notes: usize,
}

pub fn load_fixture(path: &Path) -> anyhow::Result<Fixture> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    parse_fixture(&raw)
}

pub fn parse_fixture(raw: &str) -> anyhow::Result<Fixture> {
    Ok(serde_yaml::from_str(raw)?)
}

pub async fn handle(config: AppConfig, file: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.backend == StorageBackend::Memory {
        warn!("Seeding the in-memory store; the data disappears when this command exits");
    }

    let fixture = load_fixture(file)?;
    let state = AppState::open(config).await?;
    let report = seed(&state, &fixture).await?;

    output_success(
        &output_format,
        &format!(
            "Seeded {} users, {} folders, {} tags, {} notes",
            report.users, report.folders, report.tags, report.notes
        ),
        Some(json!({ "seeded": report })),
    )
}

/// Load a fixture through the same services the HTTP API uses. Existing users,
/// folders and tags are reused, so a fixture can be applied more than once
/// (notes are always added).
pub async fn seed(state: &AppState, fixture: &Fixture) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    for entry in &fixture.users {
        let registration = Registration {
            username: entry.username.clone(),
            password: entry.password.clone(),
            fullname: entry.fullname.clone(),
        };
        let user = match state.identity.register(registration).await {
            Ok(user) => {
                report.users += 1;
                user
            }
            Err(ServiceError::DuplicateUsername) => state
                .identity
                .verify_credentials(&entry.username, &entry.password)
                .await
                .with_context(|| format!("user {} exists with another password", entry.username))?,
            Err(e) => return Err(e).with_context(|| format!("registering {}", entry.username)),
        };
        let owner = user.id;

        let folders = state.folders();
        let mut folder_ids = HashMap::new();
        for folder in folders.list(owner).await? {
            folder_ids.insert(folder.name, folder.id);
        }
        for name in &entry.folders {
            if !folder_ids.contains_key(name) {
                let folder = folders.create(owner, Some(name.as_str())).await?;
                folder_ids.insert(folder.name, folder.id);
                report.folders += 1;
            }
        }

        let tags = state.tags();
        let mut tag_ids = HashMap::new();
        for tag in tags.list(owner).await? {
            tag_ids.insert(tag.name, tag.id);
        }
        for name in &entry.tags {
            if !tag_ids.contains_key(name) {
                let tag = tags.create(owner, Some(name.as_str())).await?;
                tag_ids.insert(tag.name, tag.id);
                report.tags += 1;
            }
        }

        let notes = state.notes();
        for note in &entry.notes {
            let body = note_body(note, &folder_ids, &tag_ids)
                .with_context(|| format!("note '{}' of {}", note.title, entry.username))?;
            notes.create(owner, &body).await?;
            report.notes += 1;
        }

        info!("Seeded user {}", entry.username);
    }

    Ok(report)
}

fn note_body(
    note: &NoteFixture,
    folder_ids: &HashMap<String, Uuid>,
    tag_ids: &HashMap<String, Uuid>,
) -> anyhow::Result<Value> {
    let mut body = Map::new();
    body.insert("title".into(), json!(note.title));
    if let Some(content) = &note.content {
        body.insert("content".into(), json!(content));
    }
    if let Some(folder) = &note.folder {
        let id = folder_ids
            .get(folder)
            .with_context(|| format!("unknown folder '{}'", folder))?;
        body.insert("folderId".into(), json!(id.to_string()));
    }
    let tags = note
        .tags
        .iter()
        .map(|name| {
            tag_ids
                .get(name)
                .map(|id| json!(id.to_string()))
                .with_context(|| format!("unknown tag '{}'", name))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    body.insert("tags".into(), Value::Array(tags));
    Ok(Value::Object(body))
}
