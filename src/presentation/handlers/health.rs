use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub ping: String,
}

pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse {
        ping: "pong".to_string(),
    })
}
