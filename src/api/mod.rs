pub mod upload;

use axum::{routing::{get, post}, Router};

async fn home() -> String {
    format!("Filedrop {}", env!("CARGO_PKG_VERSION"))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/upload", post(upload::upload))
}
