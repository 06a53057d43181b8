//! # Products API
//!
//! JSON endpoints for listing the catalog and submitting new products.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use justpos_core::catalog::{Product, ProductCard, SubmitError, Submission, Toast};

use crate::SharedState;

/// A product as submitted and stored
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub product_name: String,
    pub number_in_stock: String,
    pub price: String,
    pub product_image: String,
}

impl From<Product> for ProductBody {
    fn from(p: Product) -> Self {
        Self {
            product_name: p.product_name,
            number_in_stock: p.number_in_stock,
            price: p.price,
            product_image: p.product_image,
        }
    }
}

/// One grid card
#[derive(Debug, Serialize, ToSchema)]
pub struct CardResponse {
    pub key: u64,
    pub image_placeholder: String,
    pub badges: Vec<String>,
    pub name: String,
    pub price_label: String,
    pub stock_label: String,
}

impl From<ProductCard> for CardResponse {
    fn from(card: ProductCard) -> Self {
        Self {
            key: card.key,
            image_placeholder: card.image_placeholder.to_string(),
            badges: card.badges.iter().map(|b| b.to_string()).collect(),
            name: card.name,
            price_label: card.price_label,
            stock_label: card.stock_label,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<CardResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToastResponse {
    pub title: String,
    pub description: String,
    pub raised_at: String,
}

impl From<Toast> for ToastResponse {
    fn from(toast: Toast) -> Self {
        Self {
            title: toast.title,
            description: toast.description,
            raised_at: toast.raised_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub key: u64,
    pub product: ProductBody,
    pub toast: ToastResponse,
}

impl From<Submission> for SubmitResponse {
    fn from(s: Submission) -> Self {
        Self {
            key: s.key.0,
            product: s.product.into(),
            toast: s.toast.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationResponse {
    pub errors: Vec<FieldErrorResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

pub fn product_routes() -> Router<SharedState> {
    Router::new().route("/", get(list_products).post(create_product))
}

/// List the catalog as rendered cards
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Cards in insertion order", body = ProductListResponse)
    )
)]
pub async fn list_products(State(state): State<SharedState>) -> Json<ProductListResponse> {
    let page = state.page.lock().await;
    Json(ProductListResponse {
        products: page.cards().into_iter().map(CardResponse::from).collect(),
    })
}

/// Submit a product through the add-product form
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductBody,
    responses(
        (status = 201, description = "Product added", body = SubmitResponse),
        (status = 400, description = "Body is not a JSON object", body = ApiResponse),
        (status = 422, description = "Shape validation failed", body = ValidationResponse),
        (status = 500, description = "Storage write failed", body = ApiResponse)
    )
)]
pub async fn create_product(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Response {
    let Value::Object(input) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse {
                success: false,
                message: "Expected a JSON object".to_string(),
            }),
        )
            .into_response();
    };

    let submitted = match state.submit(input).await {
        Ok(submitted) => submitted,
        Err(e) => return rejected(e),
    };
    match submitted.result {
        Ok(submission) => (
            StatusCode::CREATED,
            Json(SubmitResponse::from(submission)),
        )
            .into_response(),
        Err(SubmitError::Shape(issues)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ValidationResponse {
                errors: issues
                    .iter()
                    .map(|i| FieldErrorResponse {
                        field: i.field.name().to_string(),
                        message: i.issue.to_string(),
                    })
                    .collect(),
            }),
        )
            .into_response(),
        Err(SubmitError::Rejected(e)) => rejected(e),
    }
}

fn rejected(e: anyhow::Error) -> Response {
    tracing::error!("Failed to add product: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse {
            success: false,
            message: format!("Failed to add product: {}", e),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use crate::test_support::{api, memory_state, read_only_state};
    use crate::build_router;
    use axum::http::StatusCode;
    use justpos_core::catalog::PRODUCTS_KEY;
    use justpos_core::state::KeyValueStorage;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_starts_empty() {
        let (state, _) = memory_state();
        let router = build_router(state);

        let (status, body) = api(&router, "GET", "/api/v1/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "products": [] }));
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (state, storage) = memory_state();
        let router = build_router(state);

        let (status, body) = api(
            &router,
            "POST",
            "/api/v1/products",
            Some(json!({
                "productName": "Soda",
                "numberInStock": "10",
                "price": "25",
                "productImage": ""
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["key"], json!(0));
        assert_eq!(body["product"]["productName"], json!("Soda"));
        assert!(body["toast"]["description"]
            .as_str()
            .unwrap()
            .contains("10 Soda(s) with the price of PHP 25"));

        let (_, body) = api(&router, "GET", "/api/v1/products", None).await;
        assert_eq!(body["products"][0]["price_label"], json!("$25"));
        assert_eq!(body["products"][0]["stock_label"], json!("Item in stock: 10"));

        assert_eq!(
            storage.get_item(PRODUCTS_KEY).unwrap().as_deref(),
            Some(r#"[{"productName":"Soda","numberInStock":"10","price":"25","productImage":""}]"#)
        );
    }

    #[tokio::test]
    async fn test_create_reports_field_errors() {
        let (state, storage) = memory_state();
        let router = build_router(state);

        let (status, body) = api(
            &router,
            "POST",
            "/api/v1/products",
            Some(json!({ "productName": "Soda", "numberInStock": 10 })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "errors": [
                    { "field": "numberInStock", "message": "Expected string, received number" },
                    { "field": "price", "message": "Required" }
                ]
            })
        );
        assert_eq!(storage.get_item(PRODUCTS_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_rejects_non_object() {
        let (state, _) = memory_state();
        let router = build_router(state);

        let (status, body) = api(&router, "POST", "/api/v1/products", Some(json!(["Soda"]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_create_write_failure_is_server_error() {
        let router = build_router(read_only_state());

        let (status, body) = api(
            &router,
            "POST",
            "/api/v1/products",
            Some(json!({
                "productName": "Soda",
                "numberInStock": "10",
                "price": "25",
                "productImage": ""
            })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].as_str().unwrap().contains("storage is read-only"));

        // Kept in memory for the session
        let (_, body) = api(&router, "GET", "/api/v1/products", None).await;
        assert_eq!(body["products"][0]["name"], json!("Soda"));
    }
}
