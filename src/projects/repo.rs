use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::generation::ArtifactKind;

const PROJECT_COLUMNS: &str = "id, user_id, name, description, requirement_doc, \
                               user_stories, entities, db_design, created_at, updated_at";

/// A project: a requirements document plus the artifacts derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub requirement_doc: Option<String>,
    pub user_stories: Option<String>,
    pub entities: Option<String>,
    pub db_design: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Project>, AppError> {
    let rows = sqlx::query_as::<_, Project>(&format!(
        r#"
        SELECT {PROJECT_COLUMNS}
        FROM projects
        WHERE user_id = $1
        ORDER BY updated_at DESC
        "#,
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_for_user(
    db: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
) -> Result<Option<Project>, AppError> {
    let project = sqlx::query_as::<_, Project>(&format!(
        r#"
        SELECT {PROJECT_COLUMNS}
        FROM projects
        WHERE id = $1 AND user_id = $2
        "#,
    ))
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(project)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Project, AppError> {
    let project = sqlx::query_as::<_, Project>(&format!(
        r#"
        INSERT INTO projects (user_id, name, description)
        VALUES ($1, $2, $3)
        RETURNING {PROJECT_COLUMNS}
        "#,
    ))
    .bind(user_id)
    .bind(name)
    .bind(description)
    .fetch_one(db)
    .await?;
    Ok(project)
}

/// Replace the requirements document. Returns `false` when the project does
/// not exist or belongs to someone else.
pub async fn update_requirements(
    db: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    requirement_doc: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE projects
        SET requirement_doc = $1, updated_at = now()
        WHERE id = $2 AND user_id = $3
        "#,
    )
    .bind(requirement_doc)
    .bind(project_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Store a generated artifact in the column belonging to its kind.
pub async fn set_artifact(
    db: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    kind: ArtifactKind,
    content: &str,
) -> Result<bool, AppError> {
    // Column names come from the ArtifactKind enum, never from input.
    let query = format!(
        "UPDATE projects SET {} = $1, updated_at = now() WHERE id = $2 AND user_id = $3",
        kind.column()
    );
    let result = sqlx::query(&query)
        .bind(content)
        .bind(project_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
