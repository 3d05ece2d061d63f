use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::handlers;
use crate::api::state::AppState;
use crate::config::normalize_base_path;
use crate::model::{Device, Entity, Scientist};
use crate::store::traits::{CopyrightStore, EntityStore, Store};

/// Largest request body accepted by any route.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// The endpoint family of one entity type:
///
/// ```text
/// GET    /{collection}                        list
/// POST   /{collection}                        create
/// GET    /{collection}/:id                    fetch one
/// PUT    /{collection}/:id                    replace
/// DELETE /{collection}/:id                    delete
/// GET    /{collection}/:id/{related}          list related
/// POST   /{collection}/:id/{related}          relate
/// GET    /{collection}/:id/{related}/:rid     redirect to /{related}/:rid
/// DELETE /{collection}/:id/{related}/:rid     unrelate
/// ```
pub fn entity_routes<S, E>() -> Router<AppState<S>>
where
    S: EntityStore<E> + EntityStore<E::Related> + CopyrightStore + 'static,
    E: Entity,
{
    let collection = format!("/{}", E::COLLECTION);
    let member = format!("{}/:id", collection);
    let related = format!("{}/{}", member, <E::Related as Entity>::COLLECTION);
    let related_member = format!("{}/:related_id", related);

    Router::new()
        .route(
            &collection,
            get(handlers::list_entities::<S, E>).post(handlers::create_entity::<S, E>),
        )
        .route(
            &member,
            get(handlers::get_entity::<S, E>)
                .put(handlers::update_entity::<S, E>)
                .delete(handlers::delete_entity::<S, E>),
        )
        .route(
            &related,
            get(handlers::list_related::<S, E>).post(handlers::relate_entity::<S, E>),
        )
        .route(
            &related_member,
            get(handlers::redirect_to_related::<S, E>).delete(handlers::unrelate_entity::<S, E>),
        )
}

/// Health check at the root plus both entity families under `base_path`
/// (already normalized, empty for root).
pub fn create_router<S: Store + 'static>(base_path: &str) -> Router<AppState<S>> {
    let entities = Router::new()
        .merge(entity_routes::<S, Scientist>())
        .merge(entity_routes::<S, Device>());

    let router = Router::new().route("/health", get(handlers::health_check));
    if base_path.is_empty() {
        router.merge(entities)
    } else {
        router.nest(base_path, entities)
    }
}

/// Fully wired application for a store, ready to serve.
pub fn build_app<S: Store + 'static>(store: Arc<S>, base_path: &str) -> Router {
    let base_path = normalize_base_path(base_path);
    create_router::<S>(&base_path)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(AppState::new(store, base_path))
}
