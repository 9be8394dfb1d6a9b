use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sitedesk API",
        version = "0.3.0",
        description = r#"
# Sitedesk Purchasing API

Backend service for construction back-office purchasing: purchase orders
issued against work orders, vendor management, delivery recording, and
splitting outstanding quantities to a new vendor.

## Error Handling

Failures use a consistent error body with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Quantity 70 for item 'drywall sheets' exceeds remaining 60",
  "timestamp": "2026-08-06T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` and `per_page` query parameters.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    paths(
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::delete_purchase_order,
        crate::handlers::purchase_orders::record_fulfillment,
        crate::handlers::purchase_orders::list_fulfillments,
        crate::handlers::purchase_orders::split_purchase_order,
        crate::handlers::purchase_orders::get_purchase_orders_by_vendor,
        crate::handlers::purchase_orders::get_purchase_orders_by_status,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::delete_vendor,
    ),
    components(schemas(
        crate::models::PurchaseOrder,
        crate::models::PurchaseOrderItem,
        crate::models::PurchaseOrderStatus,
        crate::models::Fulfillment,
        crate::models::FulfillmentItem,
        crate::models::Vendor,
        crate::errors::ErrorResponse,
        crate::handlers::purchase_orders::CreatePurchaseOrderRequest,
        crate::handlers::purchase_orders::PurchaseOrderItemRequest,
        crate::handlers::purchase_orders::UpdatePurchaseOrderRequest,
        crate::handlers::purchase_orders::RecordFulfillmentRequest,
        crate::handlers::purchase_orders::FulfillmentItemRequest,
        crate::handlers::purchase_orders::SplitPurchaseOrderRequest,
        crate::handlers::purchase_orders::SplitItemRequest,
        crate::handlers::vendors::CreateVendorRequest,
        crate::handlers::vendors::UpdateVendorRequest,
    )),
    tags(
        (name = "purchase-orders", description = "Purchase order lifecycle: creation, delivery recording, vendor splitting"),
        (name = "vendors", description = "Vendor administration")
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated OpenAPI document.
pub fn swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
