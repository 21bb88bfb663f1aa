//! One set of CRUD handlers shared by every catalog kind. The kind is
//! bound when the routes are built, see [`routes`].

use axum::{extract::State, routing::get, Extension, Router};
use serde_json::Value;

use crate::auth::AuthUser;
use crate::database::models::{CatalogRecord, EntityKind};
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::server::AppState;

/// `/<table>` and `/<table>/:id` for one kind, plus
/// `/<table>/<parent>/:id` for kinds owned by another record
pub fn routes(kind: EntityKind) -> Router<AppState> {
    let collection = format!("/{}", kind.table());
    let member = format!("/{}/:id", kind.table());

    let mut router = Router::new();
    if let Some(parent) = kind.parent_kind() {
        let scoped = format!("/{}/{}/:id", kind.table(), parent.segment());
        router = router.route(
            &scoped,
            get(move |state: State<AppState>, parent_id: ApiPath<i64>| children(state, parent_id, kind)),
        );
    }

    router
        .route(
            &collection,
            get(move |state: State<AppState>| list(state, kind)).post(
                move |state: State<AppState>, user: Extension<AuthUser>, body: ApiJson<Value>| {
                    create(state, user, body, kind)
                },
            ),
        )
        .route(
            &member,
            get(move |state: State<AppState>, id: ApiPath<i64>| show(state, id, kind))
                .put(
                    move |state: State<AppState>, user: Extension<AuthUser>, id: ApiPath<i64>, body: ApiJson<Value>| {
                        update(state, user, id, body, kind)
                    },
                )
                .delete(move |state: State<AppState>, user: Extension<AuthUser>, id: ApiPath<i64>| {
                    delete(state, user, id, kind)
                }),
        )
}

async fn list(State(state): State<AppState>, kind: EntityKind) -> ApiResult<Vec<CatalogRecord>> {
    Ok(ApiResponse::success(state.catalog.list(kind).await?))
}

async fn children(
    State(state): State<AppState>,
    ApiPath(parent_id): ApiPath<i64>,
    kind: EntityKind,
) -> ApiResult<Vec<CatalogRecord>> {
    Ok(ApiResponse::success(state.catalog.list_children(kind, parent_id).await?))
}

async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>, kind: EntityKind) -> ApiResult<CatalogRecord> {
    Ok(ApiResponse::success(state.catalog.get(kind, id).await?))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<Value>,
    kind: EntityKind,
) -> ApiResult<CatalogRecord> {
    Ok(ApiResponse::created(state.catalog.create(&user, kind, body).await?))
}

async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<Value>,
    kind: EntityKind,
) -> ApiResult<CatalogRecord> {
    Ok(ApiResponse::success(state.catalog.update(&user, kind, id, body).await?))
}

async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    kind: EntityKind,
) -> ApiResult<Deleted> {
    state.catalog.delete(&user, kind, id).await?;
    Ok(ApiResponse::deleted(id))
}
