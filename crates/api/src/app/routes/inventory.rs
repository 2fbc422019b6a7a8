use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockroom_core::DomainError;
use stockroom_inventory::{InventoryItem, ItemName};
use stockroom_session::SortMode;

use crate::app::state::SharedSession;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(add_item))
        .route("/items/:name", get(get_item))
        .route("/items/:name/add", post(add_unit))
        .route("/items/:name/remove", post(remove_unit))
        .route("/refresh", post(refresh))
}

pub async fn list_items(
    Extension(session): Extension<SharedSession>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let mode = match query.sort.as_deref() {
        None | Some("") => SortMode::default(),
        Some(raw) => match raw.parse::<SortMode>() {
            Ok(mode) => mode,
            Err(e) => return errors::domain_error_to_response(e),
        },
    };

    let session = session.lock().await;
    let items = session.filter_and_sort(query.q.as_deref().unwrap_or(""), mode);
    (StatusCode::OK, Json(dto::items_to_json(&items))).into_response()
}

pub async fn get_item(
    Extension(session): Extension<SharedSession>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let name = match ItemName::parse(&name) {
        Ok(n) => n,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let session = session.lock().await;
    match session.item(&name) {
        Some(item) => (StatusCode::OK, Json(dto::item_to_json(item))).into_response(),
        None => errors::domain_error_to_response(DomainError::not_found()),
    }
}

pub async fn add_item(
    Extension(session): Extension<SharedSession>,
    Json(body): Json<dto::AddItemRequest>,
) -> axum::response::Response {
    add_one(session, &body.name).await
}

pub async fn add_unit(
    Extension(session): Extension<SharedSession>,
    Path(name): Path<String>,
) -> axum::response::Response {
    add_one(session, &name).await
}

async fn add_one(session: SharedSession, raw: &str) -> axum::response::Response {
    let name = match ItemName::parse(raw) {
        Ok(n) => n,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let mut session = session.lock().await;
    let added = session.add_item(name.as_str()).await;
    match added {
        Ok(quantity) => {
            let item = InventoryItem::new(name, quantity);
            (StatusCode::OK, Json(dto::item_to_json(&item))).into_response()
        }
        Err(e) => errors::session_error_to_response(e),
    }
}

pub async fn remove_unit(
    Extension(session): Extension<SharedSession>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let name = match ItemName::parse(&name) {
        Ok(n) => n,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let mut session = session.lock().await;
    match session.remove_item(name.as_str()).await {
        Ok(stored) => (StatusCode::OK, Json(dto::stored_to_json(&name, stored))).into_response(),
        Err(e) => errors::session_error_to_response(e),
    }
}

pub async fn refresh(Extension(session): Extension<SharedSession>) -> axum::response::Response {
    let mut session = session.lock().await;
    if let Err(e) = session.refresh().await {
        return errors::session_error_to_response(e);
    }
    let items = session.filter_and_sort("", SortMode::default());
    (StatusCode::OK, Json(dto::items_to_json(&items))).into_response()
}
