//! `/payment/types` routes.

use super::{AppState, ListParams};
use crate::{
    core::payment_type,
    errors::Result,
    resources::{Collection, Item, payment_type::PaymentTypeResource},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

/// Read-only `/payment/types` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment/types", get(index))
        .route("/payment/types/:uuid", get(show))
}

async fn index(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Collection<PaymentTypeResource>>> {
    let page = payment_type::list_payment_types(&state.db, &params.query).await?;
    Ok(Json(Collection::from_page(
        page.map(PaymentTypeResource::from),
        &params.path,
    )))
}

async fn show(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<Item<PaymentTypeResource>>> {
    let found = payment_type::find_payment_type(&state.db, &uuid).await?;
    Ok(Json(Item::new(PaymentTypeResource::from(found))))
}
