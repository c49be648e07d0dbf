use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::generation::ArtifactKind;
use crate::projects::repo::Project;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

/// List entry: the documents themselves are left out.
#[derive(Debug, Serialize)]
pub struct ProjectListItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<Project> for ProjectListItem {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDetails {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub requirement_doc: Option<String>,
    pub user_stories: Option<String>,
    pub entities: Option<String>,
    pub db_design: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<Project> for ProjectDetails {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            requirement_doc: p.requirement_doc,
            user_stories: p.user_stories,
            entities: p.entities,
            db_design: p.db_design,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequirementsRequest {
    pub requirement_doc: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub kind: ArtifactKind,
}

#[derive(Debug, Serialize)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateAck {
    pub ok: bool,
}
