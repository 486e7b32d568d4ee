use axum::{
    routing::{get, post},
    Router,
};
use lambda_http::{run, Error};
use tracing::info;
use lms_circulation::catalog::controller::{add_book, find_book_by_id, recommend_book, search_books};
use lms_circulation::circulation::controller::circulate;
use lms_circulation::circulation::factory::create_library_store;
use lms_circulation::core::controller::AppState;
use lms_circulation::core::domain::Configuration;
use lms_circulation::core::repository::RepositoryStore;
use lms_circulation::patrons::controller::{add_patron, find_patron_by_id};
use lms_circulation::utils::ddb::setup_tracing;

// See https://docs.aws.amazon.com/lambda/latest/dg/lambda-rust.html
// https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html

const DEV_MODE: bool = true;

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let (branch, store_kind) = if DEV_MODE {
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096");
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
        ("dev", RepositoryStore::from_env())
    } else {
        ("prod", RepositoryStore::DynamoDB)
    };
    info!(branch, "starting circulation with {:?} store", store_kind);

    let store = create_library_store(store_kind).await;
    let state = AppState::new(Configuration::from_env(branch), store_kind, store);

    let app = Router::new()
        .route("/catalog", post(add_book))
        .route("/catalog/search", get(search_books))
        .route("/catalog/:id", get(find_book_by_id))
        .route("/catalog/recommend/:genre", get(recommend_book))
        .route("/patrons", post(add_patron))
        .route("/patrons/:id", get(find_patron_by_id))
        .route("/circulation/:action", post(circulate))
        .with_state(state);

    run(app).await
}
