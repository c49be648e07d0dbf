use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GenerationConfig;

/// The three artifacts a project can derive from its requirements document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    UserStories,
    Entities,
    DbDesign,
}

impl ArtifactKind {
    /// Column of the `projects` table holding this artifact.
    pub fn column(&self) -> &'static str {
        match self {
            ArtifactKind::UserStories => "user_stories",
            ArtifactKind::Entities => "entities",
            ArtifactKind::DbDesign => "db_design",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            ArtifactKind::UserStories => {
                "You are a requirements analyst. Derive user stories in the form \
                 'As a [role], I want [feature], so that [benefit]' covering every \
                 feature in the provided requirements document."
            }
            ArtifactKind::Entities => {
                "You are a data modeling expert. Identify the business entities in \
                 the provided requirements document, with their attributes, types, \
                 constraints and relationships, as structured JSON."
            }
            ArtifactKind::DbDesign => {
                "You are a database architect. Design a normalized database schema \
                 for the provided requirements document: tables, columns, keys and \
                 indexes, with SQL."
            }
        }
    }
}

/// Collaborator that turns a requirements document into one artifact.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn generate(&self, kind: ArtifactKind, requirement_doc: &str) -> anyhow::Result<String>;
}

/// Chat-completion client for an OpenAI-compatible endpoint.
pub struct OpenAiGenerator {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(generation: &GenerationConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("build generation http client")?;
        Ok(Self {
            http,
            api_key: generation.api_key.clone(),
            base_url: generation.base_url.trim_end_matches('/').to_string(),
            model: generation.model.clone(),
        })
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[async_trait]
impl ArtifactGenerator for OpenAiGenerator {
    async fn generate(&self, kind: ArtifactKind, requirement_doc: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0.7,
            "messages": [
                { "role": "system", "content": kind.system_prompt() },
                { "role": "user", "content": requirement_doc },
            ],
        });

        debug!(kind = ?kind, "requesting artifact generation");
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("generation request failed")?
            .error_for_status()
            .context("generation service returned an error")?;

        let completion: CompletionResponse = response
            .json()
            .await
            .context("malformed generation response")?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("generation response had no content"))
    }
}
