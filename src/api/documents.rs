//! `/documents` routes.

use super::{AppState, ListParams};
use crate::{
    core::document::{self, DocumentIncludes, DocumentInput},
    entities::user,
    errors::Result,
    resources::{Collection, Item, document::DocumentResource},
    validation::AppJson,
};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

/// Routes relative to the API prefix.
/// `/documents` routes, including `accept`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(index).post(create))
        .route("/documents/new", get(show_new))
        .route(
            "/documents/:uuid",
            get(show).put(update).delete(destroy),
        )
        .route("/documents/:uuid/accept", post(accept))
}

async fn index(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Collection<DocumentResource>>> {
    let page = document::list_documents(&state.db, &params.query).await?;
    let includes = DocumentIncludes {
        assigned: true,
        ..DocumentIncludes::default()
    };
    let mut data = Vec::with_capacity(page.items.len());
    for item in &page.items {
        let details = document::load_details(&state.db, item.clone(), includes).await?;
        data.push(DocumentResource::from(details));
    }
    Ok(Json(Collection::from_page(page.with_items(data), &params.path)))
}

async fn show_new() -> Json<Item<DocumentResource>> {
    Json(Item::new(DocumentResource::from(document::new_document())))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    AppJson(input): AppJson<DocumentInput>,
) -> Result<impl IntoResponse> {
    let created = document::create_document(&state.db, input, Some(user.uuid)).await?;
    Ok((
        StatusCode::CREATED,
        Json(Item::new(DocumentResource::from(created))),
    ))
}

async fn show(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    params: ListParams,
) -> Result<Json<Item<DocumentResource>>> {
    params.query.allow_includes(&["template"])?;
    let found = document::find_document(&state.db, &uuid).await?;
    let includes = DocumentIncludes {
        owner: true,
        assigned: true,
        template: params.query.includes("template"),
    };
    let details = document::load_details(&state.db, found, includes).await?;
    Ok(Json(Item::new(DocumentResource::from(details))))
}

async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    AppJson(input): AppJson<DocumentInput>,
) -> Result<Json<Item<DocumentResource>>> {
    let updated = document::update_document(&state.db, &uuid, input).await?;
    Ok(Json(Item::new(DocumentResource::from(updated))))
}

async fn destroy(State(state): State<AppState>, Path(uuid): Path<String>) -> Result<StatusCode> {
    document::delete_document(&state.db, &uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn accept(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<Item<DocumentResource>>> {
    let accepted = document::accept_document(&state.db, &uuid).await?;
    let details = document::load_details(&state.db, accepted, DocumentIncludes::all()).await?;
    Ok(Json(Item::new(DocumentResource::from(details))))
}
