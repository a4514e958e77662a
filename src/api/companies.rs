//! `/companies` routes.

use super::{AppState, ListParams};
use crate::{
    core::{
        company::{self, CompanyIncludes, CompanyInput},
        lookup,
    },
    errors::Result,
    resources::{
        Collection, Item,
        company::{CompanyMeta, CompanyResource},
    },
    validation::AppJson,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

/// `/companies` routes: CRUD with lookup meta on show.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(index).post(create))
        .route(
            "/companies/:uuid",
            get(show).put(update).delete(destroy),
        )
}

async fn index(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Collection<CompanyResource>>> {
    let page = company::list_companies(&state.db, &params.query).await?;
    let includes = CompanyIncludes::from_query(&params.query);
    let mut data = Vec::with_capacity(page.items.len());
    for item in &page.items {
        let details = company::load_details(&state.db, item.clone(), includes).await?;
        data.push(CompanyResource::from(details));
    }
    Ok(Json(Collection::from_page(page.with_items(data), &params.path)))
}

async fn show(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    params: ListParams,
) -> Result<Json<Item<CompanyResource, CompanyMeta>>> {
    let details = company::show_company(&state.db, &uuid, &params.query).await?;
    let meta = CompanyMeta::new(
        &details.company_types,
        &lookup::get_company_statuses(&state.db).await?,
    );
    Ok(Json(Item::with_meta(CompanyResource::from(details), meta)))
}

async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CompanyInput>,
) -> Result<impl IntoResponse> {
    let created = company::create_company(&state.db, input).await?;
    let details = company::load_details(&state.db, created, CompanyIncludes::default()).await?;
    Ok((
        StatusCode::CREATED,
        Json(Item::new(CompanyResource::from(details))),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    AppJson(input): AppJson<CompanyInput>,
) -> Result<Json<Item<CompanyResource>>> {
    let updated = company::update_company(&state.db, &uuid, input).await?;
    let details = company::load_details(&state.db, updated, CompanyIncludes::default()).await?;
    Ok(Json(Item::new(CompanyResource::from(details))))
}

async fn destroy(State(state): State<AppState>, Path(uuid): Path<String>) -> Result<StatusCode> {
    company::delete_company(&state.db, &uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
