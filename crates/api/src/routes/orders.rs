//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common::{OrderId, Page};
use domain::{
    AddService, CreateOrder, Order, OrderRepository, OrderService, OrderState, OrderStatus,
    Service, ServiceInput,
};
use identity::Identity;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all order handlers.
pub struct AppState<R: OrderRepository> {
    pub order_service: OrderService<R>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub lab: String,
    #[serde(default)]
    pub patient: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub services: Vec<ServiceInput>,
}

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub state: Option<OrderState>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub lab: String,
    pub patient: String,
    pub customer: String,
    pub state: OrderState,
    pub status: OrderStatus,
    pub services: Vec<Service>,
    pub total_value: f64,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id().to_string(),
            lab: order.lab().to_string(),
            patient: order.patient().to_string(),
            customer: order.customer().to_string(),
            state: order.state(),
            status: order.status(),
            total_value: order.total_value(),
            services: order.services().to_vec(),
            version: order.version().as_i64(),
            created_at: order.created_at().to_rfc3339(),
            updated_at: order.updated_at().to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /orders: validate and create a new order.
#[tracing::instrument(skip(state, caller, payload), fields(caller = %caller.email))]
pub async fn create<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(req) = payload?;
    let cmd = CreateOrder::new(req.lab, req.patient, req.customer, req.services);
    let order = state.order_service.create(cmd).await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders: list active orders, optionally filtered by state.
#[tracing::instrument(skip(state, query))]
pub async fn list<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let Query(query) = query?;
    let page = Page::from_parts(query.page, query.limit);
    let orders = state.order_service.list(query.state, page).await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{id}: load a single order.
#[tracing::instrument(skip(state))]
pub async fn get<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.get(order_id).await?;

    Ok(Json(order.into()))
}

/// PATCH /orders/{id}/advance: move an order to its next workflow state.
#[tracing::instrument(skip(state, caller), fields(caller = %caller.email))]
pub async fn advance<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.advance(order_id).await?;

    Ok(Json(order.into()))
}

/// POST /orders/{id}/services: append a service to an order.
#[tracing::instrument(skip(state, caller, payload), fields(caller = %caller.email))]
pub async fn add_service<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<ServiceInput>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Json(service) = payload?;
    let order_id = parse_order_id(&id)?;
    let order = state
        .order_service
        .add_service(AddService::new(order_id, service))
        .await?;

    Ok(Json(order.into()))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
