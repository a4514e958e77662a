//! `/menu-items` routes.

use super::{AppState, ListParams};
use crate::{
    core::menu_item::{self, MenuItemInput},
    errors::Result,
    resources::{Collection, Item, menu_item::MenuItemResource},
    validation::AppJson,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

/// `/menu-items` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu-items", get(index).post(create))
        .route(
            "/menu-items/:uuid",
            get(show).put(update).delete(destroy),
        )
}

async fn index(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Collection<MenuItemResource>>> {
    let page = menu_item::list_menu_items(&state.db, &params.query).await?;
    let with_store = params.query.includes("store");
    let mut data = Vec::with_capacity(page.items.len());
    for item in &page.items {
        let details = menu_item::load_details(&state.db, item.clone(), with_store).await?;
        data.push(MenuItemResource::from(details));
    }
    Ok(Json(Collection::from_page(page.with_items(data), &params.path)))
}

async fn show(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    params: ListParams,
) -> Result<Json<Item<MenuItemResource>>> {
    params.query.allow_includes(menu_item::INCLUDES)?;
    let item = menu_item::find_menu_item(&state.db, &uuid).await?;
    let details = menu_item::load_details(&state.db, item, params.query.includes("store")).await?;
    Ok(Json(Item::new(MenuItemResource::from(details))))
}

async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<MenuItemInput>,
) -> Result<impl IntoResponse> {
    let item = menu_item::create_menu_item(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Item::new(MenuItemResource::from(&item))),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    AppJson(input): AppJson<MenuItemInput>,
) -> Result<Json<Item<MenuItemResource>>> {
    let item = menu_item::update_menu_item(&state.db, &uuid, input).await?;
    Ok(Json(Item::new(MenuItemResource::from(&item))))
}

async fn destroy(State(state): State<AppState>, Path(uuid): Path<String>) -> Result<StatusCode> {
    menu_item::delete_menu_item(&state.db, &uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
