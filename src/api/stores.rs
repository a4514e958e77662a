//! `/stores` routes.

use super::{AppState, ListParams};
use crate::{
    core::{
        event,
        store::{self, StoreIncludes, StoreInput},
    },
    entities::user,
    errors::Result,
    resources::{
        Collection, Item,
        event::EventResource,
        store::{ServiceSummaryResource, StatisticResource, StoreResource, StoreSummaryResource},
    },
    square::Location,
    validation::AppJson,
};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

/// `/stores` routes, including summaries, events and Square locations.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores", get(index).post(create))
        .route("/stores/new", get(show_new))
        .route("/stores/stats", get(stats))
        .route("/stores/:uuid", get(show).put(update).delete(destroy))
        .route("/stores/:uuid/summary", get(summary))
        .route("/stores/:uuid/service-summary", get(service_summary))
        .route("/stores/:uuid/events", get(events))
        .route("/stores/:uuid/locations", get(locations))
}

async fn index(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Collection<StoreResource>>> {
    let page = store::list_stores(&state.db, &params.query).await?;
    let includes = StoreIncludes::from_query(&params.query);
    let mut data = Vec::with_capacity(page.items.len());
    for item in &page.items {
        let details = store::load_details(&state.db, item.clone(), includes).await?;
        data.push(StoreResource::from(details));
    }
    Ok(Json(Collection::from_page(page.with_items(data), &params.path)))
}

async fn show_new() -> Json<Item<StoreResource>> {
    Json(Item::new(StoreResource::from(store::new_store())))
}

async fn stats(State(state): State<AppState>) -> Result<Json<Item<Vec<StatisticResource>>>> {
    let stats = store::store_stats(&state.db).await?;
    Ok(Json(Item::new(
        stats.into_iter().map(StatisticResource::from).collect(),
    )))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    AppJson(input): AppJson<StoreInput>,
) -> Result<impl IntoResponse> {
    let details = store::create_store(&state.db, &state.storage, input, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(Item::new(StoreResource::from(details))),
    ))
}

async fn show(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    params: ListParams,
) -> Result<Json<Item<StoreResource>>> {
    let details = store::show_store(&state.db, &uuid, &params.query).await?;
    Ok(Json(Item::new(StoreResource::from(details))))
}

async fn update(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    AppJson(input): AppJson<StoreInput>,
) -> Result<Json<Item<StoreResource>>> {
    let details = store::update_store(&state.db, &state.storage, &uuid, input).await?;
    Ok(Json(Item::new(StoreResource::from(details))))
}

async fn destroy(State(state): State<AppState>, Path(uuid): Path<String>) -> Result<StatusCode> {
    store::delete_store(&state.db, &state.storage, &uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn summary(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    params: ListParams,
) -> Result<Json<Item<StoreSummaryResource>>> {
    let details = store::store_summary(&state.db, &uuid, &params.query).await?;
    Ok(Json(Item::new(StoreSummaryResource::from(details))))
}

async fn service_summary(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<Item<ServiceSummaryResource>>> {
    let summary = store::service_summary(&state.db, &uuid).await?;
    Ok(Json(Item::new(ServiceSummaryResource::from(summary))))
}

async fn events(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    params: ListParams,
) -> Result<Json<Collection<EventResource>>> {
    let found = store::find_store(&state.db, &uuid).await?;
    let page = event::list_store_events(&state.db, &found.uuid, &params.query).await?;
    let page = page.map(|e| EventResource::from(&e));
    Ok(Json(Collection::from_page(page, &params.path)))
}

async fn locations(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<Item<Vec<Location>>>> {
    let locations = store::store_locations(&state.db, state.square.as_ref(), &uuid).await?;
    Ok(Json(Item::new(locations)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_store_with_tags_and_image() -> Result<()> {
        let app = TestApp::new().await?;
        let tag = create_test_tag(&app.db, "Vegan").await?;

        let response = app
            .post(
                "/api/foodfleet/stores",
                &json!({
                    "name": "Taco Truck",
                    "website": "https://tacos.example.com",
                    "tags": [tag.uuid],
                    "image": format!("data:image/png;base64,{TEST_PNG}")
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        let data = &response.body["data"];
        assert_eq!(data["name"], "Taco Truck");
        assert_eq!(data["status_id"], 1);
        assert_eq!(data["tags"][0]["uuid"], tag.uuid.as_str());
        assert!(data["supplier_uuid"].is_null());
        let image_file = app.state.storage.path(data["image"].as_str().unwrap());
        assert!(image_file.exists());
        assert!(data.get("square_access_token").is_none());

        let invalid = app
            .post(
                "/api/foodfleet/stores",
                &json!({"name": "", "website": "tacos", "status_id": 42}),
            )
            .await;
        assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(invalid.body["errors"]["name"].is_array());
        assert!(invalid.body["errors"]["website"].is_array());
        assert_eq!(
            invalid.body["errors"]["status_id"],
            json!(["The selected status id is invalid."])
        );

        drop(app);
        assert!(!image_file.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_show_with_includes() -> Result<()> {
        let app = TestApp::new().await?;
        let store = create_test_store(&app.db, "Grill").await?;
        let fair = create_test_event(&app.db, "Fair").await?;
        attach_store_to_event(&app.db, &fair, &store).await?;

        let path = format!(
            "/api/foodfleet/stores/{}?include=events,status&provide=events-count",
            store.uuid
        );
        let response = app.get(&path).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["events"][0]["name"], "Fair");
        assert_eq!(response.body["data"]["status"]["name"], "Draft");
        assert_eq!(response.body["data"]["events_count"], 1);

        let bad = app
            .get(&format!("/api/foodfleet/stores/{}?include=areas", store.uuid))
            .await;
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let missing = app.get("/api/foodfleet/stores/missing").await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_store() -> Result<()> {
        let app = TestApp::new().await?;
        let store = create_test_store(&app.db, "Grill").await?;
        let tag = create_test_tag(&app.db, "BBQ").await?;
        let path = format!("/api/foodfleet/stores/{}", store.uuid);

        let response = app
            .put(&path, &json!({"name": "Big Grill", "tags": [tag.uuid], "status_id": 2}))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["name"], "Big Grill");
        assert_eq!(response.body["data"]["status_id"], 2);
        assert_eq!(response.body["data"]["tags"][0]["name"], "BBQ");

        let response = app.put(&path, &json!({"commission_rate": "ten"})).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

        let response = app.put(&path, &json!({"event_uuid": "nope"})).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }

    #[tokio::test]
    async fn test_destroy_refuses_store_with_events() -> Result<()> {
        let app = TestApp::new().await?;
        let busy = create_test_store(&app.db, "Busy").await?;
        let idle = create_test_store(&app.db, "Idle").await?;
        let fair = create_test_event(&app.db, "Fair").await?;
        attach_store_to_event(&app.db, &fair, &busy).await?;

        let response = app
            .delete(&format!("/api/foodfleet/stores/{}", busy.uuid))
            .await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.body["message"],
            "This Fleet Member is currently assigned to an Event, please unassign it from the event first."
        );

        let response = app
            .delete(&format!("/api/foodfleet/stores/{}", idle.uuid))
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn test_index_pagination_and_filters() -> Result<()> {
        let app = TestApp::new().await?;
        for name in ["One", "Two", "Three"] {
            create_test_store(&app.db, name).await?;
        }

        let response = app
            .get("/api/foodfleet/stores?page%5Bsize%5D=2&page%5Bnumber%5D=2&sort=name")
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["meta"]["total"], 3);
        assert_eq!(response.body["meta"]["current_page"], 2);
        assert_eq!(response.body["meta"]["last_page"], 2);
        assert_eq!(response.body["data"][0]["name"], "Two");
        assert!(response.body["links"]["next"].is_null());
        assert_eq!(response.body["meta"]["path"], "/api/foodfleet/stores");
        assert_eq!(
            response.body["links"]["prev"],
            "/api/foodfleet/stores?page%5Bnumber%5D=1&page%5Bsize%5D=2"
        );

        let response = app
            .get("/api/foodfleet/stores?page%5Bnumber%5D=18446744073709551615")
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"], json!([]));
        assert_eq!(response.body["meta"]["total"], 3);
        assert!(response.body["meta"]["from"].is_null());
        assert!(response.body["links"]["next"].is_null());

        let response = app.get("/api/foodfleet/stores?filter%5Bname%5D=thr").await;
        assert_eq!(response.body["data"][0]["name"], "Three");

        let response = app.get("/api/foodfleet/stores?filter%5Bbogus%5D=1").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_new_stats_and_summaries() -> Result<()> {
        let app = TestApp::new().await?;
        let store = create_test_store(&app.db, "Grill").await?;

        let response = app.get("/api/foodfleet/stores/new").await;
        assert_eq!(response.body["data"]["status_id"], 1);

        let response = app.get("/api/foodfleet/stores/stats").await;
        let stats = response.body["data"].as_array().unwrap();
        let draft = stats.iter().find(|s| s["id"] == 1).unwrap();
        assert_eq!(draft["name"], "Draft");
        assert_eq!(draft["stores_count"], 1);

        let response = app
            .get(&format!("/api/foodfleet/stores/{}/summary?include=owner", store.uuid))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["tags"], json!([]));
        assert!(response.body["data"]["owner"].is_null());

        let response = app
            .get(&format!("/api/foodfleet/stores/{}/service-summary", store.uuid))
            .await;
        assert_eq!(response.body["data"]["total_events"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_store_events_list() -> Result<()> {
        let app = TestApp::new().await?;
        let store = create_test_store(&app.db, "Grill").await?;
        let fair = create_test_event(&app.db, "Fair").await?;
        let rodeo = create_test_event(&app.db, "Rodeo").await?;
        create_test_event(&app.db, "Elsewhere").await?;
        attach_store_to_event(&app.db, &fair, &store).await?;
        attach_store_to_event(&app.db, &rodeo, &store).await?;

        let response = app
            .get(&format!("/api/foodfleet/stores/{}/events?sort=-name", store.uuid))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["meta"]["total"], 2);
        assert_eq!(response.body["data"][0]["name"], "Rodeo");

        let response = app.get("/api/foodfleet/stores/missing/events").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_locations() -> Result<()> {
        let app = TestApp::with_square(FakeSquare::success(vec!["Main", "Annex"])).await?;
        let store = create_test_store(&app.db, "Grill").await?;
        let path = format!("/api/foodfleet/stores/{}/locations", store.uuid);

        let response = app.get(&path).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"], json!([]));

        set_square_token(&app.db, store, "sq-token").await?;
        let response = app.get(&path).await;
        assert_eq!(response.body["data"][1]["name"], "Annex");

        let app = TestApp::with_square(FakeSquare::unreachable()).await?;
        let store = create_test_store(&app.db, "Cart").await?;
        set_square_token(&app.db, store.clone(), "sq-token").await?;
        let response = app
            .get(&format!("/api/foodfleet/stores/{}/locations", store.uuid))
            .await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            response.body["message"]
                .as_str()
                .unwrap()
                .starts_with("Received error while calling Square:")
        );
        Ok(())
    }
}
