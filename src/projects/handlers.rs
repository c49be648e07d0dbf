use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    state::AppState,
};

use super::dto::{
    CreateProjectRequest, GenerateRequest, GeneratedArtifact, ProjectDetails, ProjectListItem,
    UpdateAck, UpdateRequirementsRequest,
};
use super::repo;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/:id", get(get_project))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", post(create_project))
        .route("/projects/:id/requirements", put(update_requirements))
        .route("/projects/:id/generate", post(generate_artifact))
}

#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ProjectListItem>>, AppError> {
    let projects = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetails>, AppError> {
    let project = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or(AppError::ProjectNotFound)?;
    Ok(Json(project.into()))
}

#[instrument(skip(state, body))]
pub async fn create_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ProjectDetails>), AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Project name must not be empty".into()));
    }

    let project = repo::create(&state.db, user_id, name, body.description.as_deref()).await?;
    info!(project_id = %project.id, "project created");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        format!("/projects/{}", project.id).parse().unwrap(),
    );

    Ok((StatusCode::CREATED, headers, Json(project.into())))
}

#[instrument(skip(state, body))]
pub async fn update_requirements(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRequirementsRequest>,
) -> Result<Json<UpdateAck>, AppError> {
    let updated =
        repo::update_requirements(&state.db, user_id, id, &body.requirement_doc).await?;
    if !updated {
        return Err(AppError::ProjectNotFound);
    }
    Ok(Json(UpdateAck { ok: true }))
}

#[instrument(skip(state, body))]
pub async fn generate_artifact(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GeneratedArtifact>, AppError> {
    let project = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or(AppError::ProjectNotFound)?;

    let Some(requirement_doc) = project
        .requirement_doc
        .as_deref()
        .filter(|doc| !doc.trim().is_empty())
    else {
        return Err(AppError::Validation(
            "Add a requirements document first".into(),
        ));
    };

    let content = state
        .generator
        .generate(body.kind, requirement_doc)
        .await
        .map_err(AppError::Generation)?;

    let stored = repo::set_artifact(&state.db, user_id, id, body.kind, &content).await?;
    if !stored {
        return Err(AppError::ProjectNotFound);
    }

    info!(project_id = %id, kind = ?body.kind, "artifact generated");
    Ok(Json(GeneratedArtifact {
        kind: body.kind,
        content,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ArtifactKind;

    #[test]
    fn generated_artifact_serializes_with_the_wire_kind() {
        let artifact = GeneratedArtifact {
            kind: ArtifactKind::UserStories,
            content: "As a user, ...".into(),
        };
        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains("\"kind\":\"userStories\""));
    }

    #[test]
    fn generate_request_parses_each_kind() {
        for (raw, kind) in [
            ("userStories", ArtifactKind::UserStories),
            ("entities", ArtifactKind::Entities),
            ("dbDesign", ArtifactKind::DbDesign),
        ] {
            let body: GenerateRequest =
                serde_json::from_str(&format!(r#"{{"kind":"{raw}"}}"#)).unwrap();
            assert_eq!(body.kind, kind);
        }
    }
}
