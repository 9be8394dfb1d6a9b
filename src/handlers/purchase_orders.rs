use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::{
    commands::purchaseorders::{
        CreatePurchaseOrderCommand, FulfillmentItemInput, PurchaseOrderItemInput,
        RecordFulfillmentCommand, SplitItemInput, SplitPurchaseOrderCommand,
        UpdatePurchaseOrderCommand,
    },
    errors::ApiError,
    handlers::AppState,
    models::PurchaseOrderStatus,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Request and response DTOs

fn validate_unit_price(unit_price: &Decimal) -> Result<(), ValidationError> {
    if unit_price.is_sign_negative() {
        return Err(ValidationError::new("unit_price_negative"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    pub work_order_id: Uuid,
    pub vendor_id: Uuid,
    #[validate(length(min = 1))]
    pub items: Vec<PurchaseOrderItemRequest>,
    pub issue_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderItemRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderRequest {
    pub vendor_id: Option<Uuid>,
    pub issue_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub status: Option<PurchaseOrderStatus>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordFulfillmentRequest {
    pub delivery_date: NaiveDate,
    #[validate(length(max = 200))]
    pub received_by: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<FulfillmentItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FulfillmentItemRequest {
    pub order_item_id: Uuid,
    pub quantity_received: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SplitPurchaseOrderRequest {
    pub new_vendor_id: Uuid,
    #[validate(length(min = 1))]
    pub items: Vec<SplitItemRequest>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SplitItemRequest {
    pub order_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOrdersParams {
    /// Restrict the listing to one work order; omit for every order.
    pub work_order_id: Option<Uuid>,
}

// Handler functions

/// Create a new purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created", body = crate::models::PurchaseOrder),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let command = CreatePurchaseOrderCommand {
        work_order_id: payload.work_order_id,
        vendor_id: payload.vendor_id,
        items: payload
            .items
            .into_iter()
            .map(|item| PurchaseOrderItemInput {
                description: item.description,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
        issue_date: payload.issue_date,
        expected_delivery_date: payload.expected_delivery_date,
        notes: payload.notes,
    };

    let order = state
        .services
        .purchase_orders
        .create_order(command)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order created: {}", order.id);

    Ok(created_response(order))
}

/// List purchase orders, optionally scoped to a work order
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(ListOrdersParams, PaginationParams),
    responses(
        (status = 200, description = "Purchase orders listed", body = [crate::models::PurchaseOrder])
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let orders = state
        .services
        .purchase_orders
        .list_orders(params.work_order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::paginate(
        orders,
        &pagination,
    )))
}

/// Get a purchase order by ID
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order fetched", body = crate::models::PurchaseOrder),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .purchase_orders
        .get_order(order_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Purchase order with ID {} not found", order_id))
        })?;

    Ok(success_response(order))
}

/// Update a purchase order
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    request_body = UpdatePurchaseOrderRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order updated", body = crate::models::PurchaseOrder),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdatePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let command = UpdatePurchaseOrderCommand {
        id: order_id,
        vendor_id: payload.vendor_id,
        issue_date: payload.issue_date,
        expected_delivery_date: payload.expected_delivery_date,
        notes: payload.notes,
        status: payload.status,
    };

    let order = state
        .services
        .purchase_orders
        .update_order(command)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order updated: {}", order.id);

    Ok(success_response(order))
}

/// Delete a purchase order
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .purchase_orders
        .delete_order(order_id)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order deleted: {}", order_id);

    Ok(no_content_response())
}

/// Record a delivery against a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/fulfillments",
    request_body = RecordFulfillmentRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 201, description = "Fulfillment recorded", body = serde_json::Value),
        (status = 400, description = "Invalid quantities", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn record_fulfillment(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<RecordFulfillmentRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let command = RecordFulfillmentCommand {
        order_id,
        delivery_date: payload.delivery_date,
        received_by: payload.received_by,
        notes: payload.notes,
        items: payload
            .items
            .into_iter()
            .map(|item| FulfillmentItemInput {
                order_item_id: item.order_item_id,
                quantity_received: item.quantity_received,
                notes: item.notes,
            })
            .collect(),
    };

    let (order, fulfillment) = state
        .services
        .purchase_orders
        .record_fulfillment(command)
        .await
        .map_err(map_service_error)?;

    info!(
        "Fulfillment {} recorded against purchase order {}",
        fulfillment.id, order.id
    );

    Ok(created_response(serde_json::json!({
        "order": order,
        "fulfillment": fulfillment,
    })))
}

/// List the delivery history of a purchase order
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/fulfillments",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Fulfillment history", body = [crate::models::Fulfillment]),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn list_fulfillments(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .purchase_orders
        .get_order(order_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Purchase order with ID {} not found", order_id))
        })?;

    Ok(success_response(order.fulfillments))
}

/// Split outstanding quantity to a new order under a different vendor
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/split",
    request_body = SplitPurchaseOrderRequest,
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 201, description = "New purchase order created from split", body = crate::models::PurchaseOrder),
        (status = 400, description = "Invalid split", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn split_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<SplitPurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let command = SplitPurchaseOrderCommand {
        order_id,
        new_vendor_id: payload.new_vendor_id,
        items: payload
            .items
            .into_iter()
            .map(|item| SplitItemInput {
                order_item_id: item.order_item_id,
                quantity: item.quantity,
            })
            .collect(),
        notes: payload.notes,
    };

    let new_order = state
        .services
        .purchase_orders
        .split_order(command)
        .await
        .map_err(map_service_error)?;

    info!(
        "Purchase order {} split into {} for vendor {}",
        order_id, new_order.id, new_order.vendor_id
    );

    Ok(created_response(new_order))
}

/// Get purchase orders for a vendor
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/vendor/{vendor_id}",
    params(
        ("vendor_id" = Uuid, Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Purchase orders by vendor", body = [crate::models::PurchaseOrder])
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_orders_by_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let orders = state
        .services
        .purchase_orders
        .get_orders_by_vendor(vendor_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Get purchase orders by status
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/status/{status}",
    params(
        ("status" = String, Path, description = "Purchase order status")
    ),
    responses(
        (status = 200, description = "Purchase orders by status", body = [crate::models::PurchaseOrder]),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_orders_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let status: PurchaseOrderStatus = status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown status '{}'", status)))?;

    let orders = state
        .services
        .purchase_orders
        .get_orders_by_status(status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Creates the router for purchase order endpoints
pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase_order))
        .route("/", get(list_purchase_orders))
        .route("/:id", get(get_purchase_order))
        .route("/:id", put(update_purchase_order))
        .route("/:id", delete(delete_purchase_order))
        .route("/:id/fulfillments", post(record_fulfillment))
        .route("/:id/fulfillments", get(list_fulfillments))
        .route("/:id/split", post(split_purchase_order))
        .route("/vendor/:vendor_id", get(get_purchase_orders_by_vendor))
        .route("/status/:status", get(get_purchase_orders_by_status))
}
