//! Pet handlers: four lookups, create, and the write operations that are not offered.

use crate::error::AppError;
use crate::extractors::{ReaderAccess, WriterAccess};
use crate::model::Pet;
use crate::service::PetValidator;
use crate::state::AppState;
use crate::store::PetLookup;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: {}", raw)))
}

async fn find(state: &AppState, lookup: PetLookup) -> Result<Json<Pet>, AppError> {
    Ok(Json(state.service.find(lookup).await?))
}

pub async fn find_by_id(
    _: ReaderAccess,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Pet>, AppError> {
    find(&state, PetLookup::Id(parse_id(&id)?)).await
}

pub async fn find_by_category(
    _: ReaderAccess,
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Pet>, AppError> {
    find(&state, PetLookup::Category(parse_id(&category_id)?)).await
}

/// `GET /pet/findByCategory/uploadImage` shares its path with the upload route.
pub async fn find_by_category_named_upload(_: ReaderAccess) -> AppError {
    AppError::BadRequest("invalid id: uploadImage".into())
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

pub async fn find_by_status(
    _: ReaderAccess,
    State(state): State<AppState>,
    Query(q): Query<StatusQuery>,
) -> Result<Json<Pet>, AppError> {
    find(&state, PetLookup::Status(q.status)).await
}

/// `?tags=a&tags=b`; every `tags` pair is collected in order.
pub async fn find_by_tags(
    _: ReaderAccess,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Pet>, AppError> {
    let tags = pairs
        .into_iter()
        .filter(|(k, _)| k == "tags")
        .map(|(_, v)| v)
        .collect();
    find(&state, PetLookup::Tags(tags)).await
}

pub async fn add_pet(
    _: WriterAccess,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let pet = PetValidator::validate(&body)?;
    let created = state.service.create(pet).await?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, created.location())],
        Json(created.pet),
    ))
}

pub async fn edit_pet(_: WriterAccess) -> AppError {
    AppError::NotImplemented("edit pet")
}

/// Answers for any id, including segments that name a lookup route.
pub async fn upload_image(_: WriterAccess) -> AppError {
    AppError::NotImplemented("upload pet image")
}

/// Answers for any id, including segments that name a lookup route.
pub async fn delete_pet(_: WriterAccess) -> AppError {
    AppError::NotImplemented("delete pet")
}
