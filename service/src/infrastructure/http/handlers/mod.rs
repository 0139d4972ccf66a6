use axum::http::StatusCode;

pub mod embeds;
pub mod labs;
pub mod versions;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
