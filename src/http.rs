use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use gtfs_static::{LoadReport, RouteRecord, RouteShape, StopRecord};
use realtime::{Category, HttpError};
use vehicle_feed::{CycleSummary, VehicleRecord};

use crate::query::Tracker;

type HttpResult<T> = Result<T, HttpError>;
type AppState = Arc<Tracker>;

pub fn router(tracker: Arc<Tracker>) -> Router {
    Router::new()
        .route("/vehicles/{category}", get(vehicles))
        .route("/vehicles/{category}/route/{route_id}", get(vehicles_on_route))
        .route("/routes/{category}", get(routes))
        .route("/routes/{category}/{route_id}/stops", get(route_stops))
        .route("/shapes/{category}/{trip_id}", get(shapes))
        .route("/stops/{category}/{trip_id}", get(trip_stops))
        .route("/cycles/{category}", get(last_cycle))
        .route("/gtfs/{category}/refresh", post(refresh))
        .with_state(tracker)
}

#[axum::debug_handler]
async fn vehicles(
    State(tracker): State<AppState>, Path(category): Path<String>,
) -> HttpResult<Json<Vec<VehicleRecord>>> {
    let category = category.parse::<Category>()?;
    Ok(Json(tracker.get_vehicles(&category).await?))
}

#[axum::debug_handler]
async fn vehicles_on_route(
    State(tracker): State<AppState>, Path((category, route_id)): Path<(String, String)>,
) -> HttpResult<Json<Vec<VehicleRecord>>> {
    let category = category.parse::<Category>()?;
    Ok(Json(tracker.get_vehicles_on_route(&category, &route_id).await?))
}

#[axum::debug_handler]
async fn routes(
    State(tracker): State<AppState>, Path(category): Path<String>,
) -> HttpResult<Json<Vec<RouteRecord>>> {
    let category = category.parse::<Category>()?;
    Ok(Json(tracker.get_routes(&category)?))
}

#[axum::debug_handler]
async fn route_stops(
    State(tracker): State<AppState>, Path((category, route_id)): Path<(String, String)>,
) -> HttpResult<Json<Vec<StopRecord>>> {
    let category = category.parse::<Category>()?;
    Ok(Json(tracker.get_stops_for_route(&category, &route_id).await?))
}

#[axum::debug_handler]
async fn shapes(
    State(tracker): State<AppState>, Path((category, trip_id)): Path<(String, String)>,
) -> HttpResult<Json<Vec<RouteShape>>> {
    let category = category.parse::<Category>()?;
    Ok(Json(tracker.get_route_shape(&category, &trip_id)?))
}

#[axum::debug_handler]
async fn trip_stops(
    State(tracker): State<AppState>, Path((category, trip_id)): Path<(String, String)>,
) -> HttpResult<Json<Vec<StopRecord>>> {
    let category = category.parse::<Category>()?;
    Ok(Json(tracker.get_stops_for_trip(&category, &trip_id)?))
}

#[axum::debug_handler]
async fn last_cycle(
    State(tracker): State<AppState>, Path(category): Path<String>,
) -> HttpResult<Json<CycleSummary>> {
    let category = category.parse::<Category>()?;
    Ok(Json(tracker.get_last_cycle(&category)?))
}

#[axum::debug_handler]
async fn refresh(
    State(tracker): State<AppState>, Path(category): Path<String>,
) -> HttpResult<Json<LoadReport>> {
    let category = category.parse::<Category>()?;
    Ok(Json(tracker.refresh(&category).await?))
}
