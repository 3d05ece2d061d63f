use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::logic::{check, parse_payload, ValidationError, RELATION_FIELDS};
use crate::model::{parse_id, Entity, Id};
use crate::store::{CopyrightStore, EntityStore};

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `{"<collection>": [...]}`
fn envelope<T: Serialize>(collection: &str, items: Vec<T>) -> Result<Json<Value>, ApiError> {
    let mut body = Map::new();
    body.insert(collection.to_string(), serde_json::to_value(items)?);
    Ok(Json(Value::Object(body)))
}

/// Validate a raw body against `fields` and deserialize the surviving keys.
fn draft_from_body<D: DeserializeOwned>(body: &[u8], fields: &[&str]) -> Result<D, ApiError> {
    let payload = parse_payload(body)?;
    let filtered = check(&payload, fields)?;
    serde_json::from_value(Value::Object(filtered))
        .map_err(|e| ApiError::from(ValidationError::MalformedJson(e.to_string())))
}

/// Look up the record named by a raw path segment; 404 if it does not exist.
async fn find<S, E>(state: &AppState<S>, raw_id: &str) -> Result<(Id, E), ApiError>
where
    S: EntityStore<E>,
    E: Entity,
{
    let not_found = || ApiError::not_found(E::COLLECTION, raw_id);
    let id = parse_id(raw_id).ok_or_else(not_found)?;
    let entity = EntityStore::<E>::get(state.store.as_ref(), id)
        .await?
        .ok_or_else(not_found)?;
    Ok((id, entity))
}

/// GET /{collection}
pub async fn list_entities<S, E>(
    State(state): State<AppState<S>>,
) -> Result<Json<Value>, ApiError>
where
    S: EntityStore<E>,
    E: Entity,
{
    let items = EntityStore::<E>::list(state.store.as_ref()).await?;
    envelope(E::COLLECTION, items)
}

/// GET /{collection}/:id
pub async fn get_entity<S, E>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<E>, ApiError>
where
    S: EntityStore<E>,
    E: Entity,
{
    let (_, entity) = find::<S, E>(&state, &raw_id).await?;
    Ok(Json(entity))
}

/// POST /{collection}
pub async fn create_entity<S, E>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Response, ApiError>
where
    S: EntityStore<E>,
    E: Entity,
{
    let draft: E::Draft = draft_from_body(&body, E::FIELDS)?;
    let id = EntityStore::<E>::create(state.store.as_ref(), draft).await?;
    log::info!("Created {} {}", E::COLLECTION, id);

    let location = state.resource_path(E::COLLECTION, id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// PUT /{collection}/:id
pub async fn update_entity<S, E>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError>
where
    S: EntityStore<E>,
    E: Entity,
{
    let (id, _) = find::<S, E>(&state, &raw_id).await?;
    let draft: E::Draft = draft_from_body(&body, E::FIELDS)?;
    EntityStore::<E>::update(state.store.as_ref(), id, draft).await?;
    log::info!("Updated {} {}", E::COLLECTION, id);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /{collection}/:id
///
/// Always 204: a record that is already gone counts as deleted.
pub async fn delete_entity<S, E>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: EntityStore<E>,
    E: Entity,
{
    if let Some(id) = parse_id(&raw_id) {
        EntityStore::<E>::delete(state.store.as_ref(), id).await?;
        log::info!("Deleted {} {}", E::COLLECTION, id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /{collection}/:id/{related}
pub async fn list_related<S, E>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    S: EntityStore<E>,
    E: Entity,
{
    let (id, _) = find::<S, E>(&state, &raw_id).await?;
    let related = EntityStore::<E>::list_related(state.store.as_ref(), id).await?;
    envelope(<E::Related as Entity>::COLLECTION, related)
}

/// POST /{collection}/:id/{related} with `{"id": <related id>}`
pub async fn relate_entity<S, E>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError>
where
    S: EntityStore<E> + EntityStore<E::Related> + CopyrightStore,
    E: Entity,
{
    let (id, _) = find::<S, E>(&state, &raw_id).await?;

    let payload = parse_payload(&body)?;
    let fields = check(&payload, RELATION_FIELDS)?;
    let related_id = fields
        .get("id")
        .and_then(Value::as_i64)
        .and_then(|n| Id::try_from(n).ok())
        .ok_or_else(|| ValidationError::MissingField("id".to_string()))?;

    let related_collection = <E::Related as Entity>::COLLECTION;
    if EntityStore::<E::Related>::get(state.store.as_ref(), related_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found(related_collection, related_id));
    }

    state.store.relate(E::copyright(id, related_id)).await?;
    log::info!(
        "Related {} {} with {} {}",
        E::COLLECTION,
        id,
        related_collection,
        related_id
    );
    Ok(StatusCode::CREATED)
}

/// DELETE /{collection}/:id/{related}/:related_id
///
/// Always 204: missing records and missing relations are already unrelated.
pub async fn unrelate_entity<S, E>(
    State(state): State<AppState<S>>,
    Path((raw_id, raw_related_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: CopyrightStore,
    E: Entity,
{
    if let (Some(id), Some(related_id)) = (parse_id(&raw_id), parse_id(&raw_related_id)) {
        state.store.unrelate(E::copyright(id, related_id)).await?;
        log::info!(
            "Unrelated {} {} from {} {}",
            E::COLLECTION,
            id,
            <E::Related as Entity>::COLLECTION,
            related_id
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /{collection}/:id/{related}/:related_id
///
/// Redirects to the related record's own URL without looking anything up.
/// A related id that is not an integer names no record and is a 404.
pub async fn redirect_to_related<S, E>(
    State(state): State<AppState<S>>,
    Path((_, raw_related_id)): Path<(String, String)>,
) -> Result<Response, ApiError>
where
    S: Send + Sync + 'static,
    E: Entity,
{
    let related_collection = <E::Related as Entity>::COLLECTION;
    let related_id = parse_id(&raw_related_id)
        .ok_or_else(|| ApiError::not_found(related_collection, raw_related_id.escape_debug()))?;

    let location = state.resource_path(related_collection, related_id);
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
