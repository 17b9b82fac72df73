use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct InlineRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub first_name: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub search_client_open: bool,
}
