//! JustPOS Server
//!
//! Axum server for the products page: server-rendered HTML, a JSON API and
//! embedded static assets. Also hosts the `justpos` CLI.

mod api;
mod render;
#[cfg(test)]
mod test_support;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use justpos_core::catalog::{
    AddProductForm, FormField, LocalCatalogStore, ProductsPage, SubmitError, Submission, ToastQueue,
    TracingNotifier,
};
use justpos_core::config::{JustposConfig, StorageBackend};
use justpos_core::state::{io, KeyValueStorage};
use render::{render_page, PageModel};
use rust_embed::RustEmbed;
use serde_json::{Map, Value};
use std::{collections::HashMap, net::SocketAddr, path::Path, sync::Arc};
use tokio::{
    net::TcpListener,
    sync::{Mutex, OwnedMutexGuard},
};
use utoipa::OpenApi;

/// Embedded static assets
#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

type CatalogPage = ProductsPage<LocalCatalogStore, Arc<ToastQueue>>;

/// What one submission left behind
struct Submitted {
    /// Still locked, so the response renders the state the submission produced
    page: OwnedMutexGuard<CatalogPage>,
    result: Result<Submission, SubmitError>,
    /// The form as it stood after submitting, issues included
    form: AddProductForm,
}

/// Application state
pub struct AppState {
    /// One page session; the lock serializes submissions like UI event dispatch
    page: Arc<Mutex<CatalogPage>>,
    toasts: Arc<ToastQueue>,
}

impl AppState {
    fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let toasts = Arc::new(ToastQueue::default());
        let page = ProductsPage::open(LocalCatalogStore::new(storage), Arc::clone(&toasts));
        Self {
            page: Arc::new(Mutex::new(page)),
            toasts,
        }
    }

    /// Submit `input` on the blocking pool, since every backend writes synchronously.
    /// A rejected form is handed back to the caller and cleared from the shared page.
    async fn submit(&self, input: Map<String, Value>) -> anyhow::Result<Submitted> {
        let mut page = Arc::clone(&self.page).lock_owned().await;
        let (mut page, result) = tokio::task::spawn_blocking(move || {
            let result = page.submit_values(&input);
            (page, result)
        })
        .await
        .context("Submission task failed")?;

        let form = page.form().clone();
        if result.is_err() {
            page.form_mut().clear();
        }
        Ok(Submitted { page, result, form })
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Parser, Clone)]
#[command(author, version, about = "JustPOS - Point-of-sale product catalog")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the JustPOS server (default)
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create the runtime directory and a default config
    Init {
        /// Storage backend: sqlite, file or memory
        #[arg(short, long)]
        storage: Option<String>,
    },
    /// Add a product from the command line
    Add {
        /// Product name
        #[arg(long)]
        name: String,
        /// Number in stock
        #[arg(long)]
        stock: String,
        /// Item price
        #[arg(long)]
        price: String,
        /// Image reference
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Print the product cards
    List,
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "JustPOS API",
        version = "1.0.0",
        description = "Product catalog API for the JustPOS point-of-sale prototype"
    ),
    paths(api::products::list_products, api::products::create_product),
    components(schemas(
        api::products::ProductBody,
        api::products::CardResponse,
        api::products::ProductListResponse,
        api::products::ToastResponse,
        api::products::SubmitResponse,
        api::products::FieldErrorResponse,
        api::products::ValidationResponse,
        api::products::ApiResponse
    ))
)]
struct ApiDoc;

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// === Page Handlers ===

async fn products_page(State(state): State<SharedState>) -> Html<String> {
    let page = state.page.lock().await;
    let toasts = state.toasts.drain();
    let cards = page.cards();
    Html(render_page(&PageModel {
        cards: &cards,
        form: page.form(),
        toasts: &toasts,
        error: None,
    }))
}

async fn submit_product_form(
    State(state): State<SharedState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let input: Map<String, Value> = fields
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    let Submitted { page, result, form } = match state.submit(input).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("{:#}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to add product").into_response();
        }
    };
    let (status, error) = match result {
        Ok(_) => return Redirect::to("/").into_response(),
        Err(SubmitError::Shape(_)) => (StatusCode::UNPROCESSABLE_ENTITY, None),
        Err(SubmitError::Rejected(e)) => {
            tracing::error!("Failed to add product: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(format!("Failed to add product: {}", e)),
            )
        }
    };

    let toasts = state.toasts.drain();
    let cards = page.cards();
    let html = render_page(&PageModel {
        cards: &cards,
        form: &form,
        toasts: &toasts,
        error: error.as_deref(),
    });
    (status, Html(html)).into_response()
}

async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match Assets::get(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                file.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(products_page))
        .route("/products", axum::routing::post(submit_product_form))
        .nest("/api/v1/products", api::product_routes())
        .route("/api/v1/openapi.json", get(serve_openapi))
        .fallback(get(serve_static))
        .with_state(state)
}

// === Server Entry ===

async fn run_server(config: JustposConfig, port: Option<u16>) -> anyhow::Result<()> {
    let storage = config.open_storage()?;
    let state: SharedState = Arc::new(AppState::new(storage));
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port.unwrap_or(config.port)));
    println!("🚀 JustPOS Server running at http://{}", addr);
    println!("   Page:     /");
    println!("   Products: /api/v1/products (GET, POST)");
    println!("   OpenAPI:  /api/v1/openapi.json");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn init_runtime(storage: Option<String>) -> anyhow::Result<()> {
    let runtime = io::get_runtime_path();
    let config = init_runtime_in(&runtime, storage.as_deref()).await?;

    println!("✅ JustPOS initialized in {:?}", runtime);
    println!("   Storage: {:?}", config.storage);
    println!("\n🚀 Run `justpos serve` to start the server");
    Ok(())
}

/// Write the config and `.gitignore` under `runtime`. An unknown backend name
/// is an error here, unlike the `JUSTPOS_STORAGE` override.
async fn init_runtime_in(runtime: &Path, storage: Option<&str>) -> anyhow::Result<JustposConfig> {
    let backend = storage.map(str::parse::<StorageBackend>).transpose()?;
    io::ensure_runtime_dir(runtime).await?;

    let mut config = JustposConfig::load_from(runtime).await;
    if let Some(backend) = backend {
        config.storage = backend;
    }
    config.save().await?;

    if !io::file_exists(runtime, ".gitignore").await {
        io::write_runtime_file(runtime, ".gitignore", "*.db\nstorage/\n.env\n").await?;
    }
    Ok(config)
}

fn add_product(
    config: &JustposConfig,
    name: String,
    stock: String,
    price: String,
    image: String,
) -> anyhow::Result<()> {
    let store = LocalCatalogStore::new(config.open_storage()?);
    let mut page = ProductsPage::open(store, TracingNotifier);

    let form = page.form_mut();
    form.set(FormField::ProductName, name);
    form.set(FormField::NumberInStock, stock);
    form.set(FormField::Price, price);
    form.set(FormField::ProductImage, image);

    match page.submit() {
        Ok(submission) => {
            println!("✅ {}: {}", submission.toast.title, submission.toast.description);
            Ok(())
        }
        Err(SubmitError::Shape(issues)) => {
            for issue in issues.iter() {
                eprintln!("❌ {}: {}", issue.field.label(), issue.issue);
            }
            anyhow::bail!("Product was not added")
        }
        Err(SubmitError::Rejected(e)) => Err(e.context("Failed to add product")),
    }
}

fn list_products(config: &JustposConfig) -> anyhow::Result<()> {
    let store = LocalCatalogStore::new(config.open_storage()?);
    let page = ProductsPage::open(store, TracingNotifier);

    let cards = page.cards();
    if cards.is_empty() {
        println!("No products yet. Add one with `justpos add`.");
    }
    for card in cards {
        println!(
            "[{}] {}  {}  {}",
            card.key, card.name, card.price_label, card.stock_label
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let env_path = io::get_runtime_path().join(".env");
    if env_path.exists() {
        if let Err(e) = dotenvy::from_path(&env_path) {
            tracing::warn!("Failed to load {:?}: {}", env_path, e);
        }
    }

    let args = Args::parse();
    let config = JustposConfig::load().await;

    match args.command {
        None => run_server(config, None).await,
        Some(CliCommand::Serve { port }) => run_server(config, port).await,
        Some(CliCommand::Init { storage }) => init_runtime(storage).await,
        Some(CliCommand::Add {
            name,
            stock,
            price,
            image,
        }) => add_product(&config, name, stock, price, image),
        Some(CliCommand::List) => list_products(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{api, memory_state, read_only_state, send};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/products")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_form_submit_redirects_and_shows_toast_once() {
        let (state, _) = memory_state();
        let router = build_router(state);

        let (status, _, location) = send(
            &router,
            form_request("productImage=&productName=Soda&numberInStock=10&price=25"),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/"));

        let (status, body, _) = send(&router, get_request("/")).await;
        let html = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("10 Soda(s) with the price of PHP 25"));
        assert!(html.contains("<span>$25</span>"));

        let (_, body, _) = send(&router, get_request("/")).await;
        let html = String::from_utf8(body).unwrap();
        assert!(!html.contains("with the price of PHP"));
        assert!(html.contains("Item in stock: 10"));
    }

    #[tokio::test]
    async fn test_form_submit_missing_field_renders_inline_message() {
        let (state, _) = memory_state();
        let router = build_router(state);

        let (status, body, _) =
            send(&router, form_request("productName=Soda&numberInStock=10")).await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("<p class=\"message\">Required</p>"));
        assert!(html.contains("value=\"Soda\""));

        let (_, body) = api(&router, "GET", "/api/v1/products", None).await;
        assert_eq!(body, json!({ "products": [] }));
    }

    #[tokio::test]
    async fn test_openapi_lists_product_paths() {
        let (state, _) = memory_state();
        let router = build_router(state);

        let (status, body) = api(&router, "GET", "/api/v1/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/products"]["get"].is_object());
        assert!(body["paths"]["/api/v1/products"]["post"].is_object());
    }

    #[tokio::test]
    async fn test_static_assets() {
        let (state, _) = memory_state();
        let router = build_router(state);

        let (status, _, _) = send(&router, get_request("/styles.css")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(&router, get_request("/missing.js")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cli_parses_add() {
        let args = Args::parse_from([
            "justpos", "add", "--name", "Soda", "--stock", "10", "--price", "25",
        ]);
        match args.command {
            Some(CliCommand::Add { name, image, .. }) => {
                assert_eq!(name, "Soda");
                assert_eq!(image, "");
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_cli_add_and_list_with_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = JustposConfig::default();
        config.runtime_path = dir.path().to_path_buf();
        config.apply_overrides(Some("file"), None);

        add_product(&config, "Soda".into(), "10".into(), "25".into(), String::new()).unwrap();
        add_product(&config, "Chips".into(), "5".into(), "15".into(), String::new()).unwrap();
        list_products(&config).unwrap();

        let stored = std::fs::read_to_string(dir.path().join("storage/PRODUCTS.json")).unwrap();
        let products: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(products[0]["productName"], json!("Soda"));
        assert_eq!(products[1]["productName"], json!("Chips"));
    }

    #[tokio::test]
    async fn test_form_write_failure_renders_error_and_toast() {
        let router = build_router(read_only_state());

        let (status, body, _) = send(
            &router,
            form_request("productImage=&productName=Soda&numberInStock=10&price=25"),
        )
        .await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(html.contains("storage is read-only"));
        assert!(html.contains("10 Soda(s) with the price of PHP 25"));
        assert!(html.contains("value=\"Soda\""));
        assert!(html.contains("Item in stock: 10"));
    }

    #[tokio::test]
    async fn test_rejected_form_is_not_shown_to_the_next_visitor() {
        let (state, _) = memory_state();
        let router = build_router(state);

        let (status, _, _) = send(&router, form_request("productName=SecretA")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, body, _) = send(&router, get_request("/")).await;
        let html = String::from_utf8(body).unwrap();
        assert!(!html.contains("SecretA"));
        assert!(html.contains("<details class=\"dialog\">"));
        assert!(!html.contains("class=\"message\""));
    }

    #[tokio::test]
    async fn test_init_rejects_unknown_backend() {
        let dir = tempfile::tempdir().unwrap();

        let err = init_runtime_in(dir.path(), Some("fiel")).await.unwrap_err();
        assert!(err.to_string().contains("Unknown storage backend: fiel"));
        assert!(!dir.path().join("config.json").exists());
    }

    #[tokio::test]
    async fn test_init_saves_chosen_backend() {
        let dir = tempfile::tempdir().unwrap();

        let config = init_runtime_in(dir.path(), Some("file")).await.unwrap();
        assert_eq!(config.storage, StorageBackend::File);

        let reloaded = JustposConfig::load_from(dir.path()).await;
        assert_eq!(reloaded.storage, StorageBackend::File);
        assert!(dir.path().join(".gitignore").exists());
    }
}
