use crate::{error::ApiError, model::LlmBackend};
use axum::{extract::Query, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Serialize)]
pub struct AskResponse {
    pub response: String,
}

/// Value of the `prompt` query parameter. A repeated parameter resolves to its last value.
pub fn prompt_param(pairs: Vec<(String, String)>) -> Option<String> {
    pairs
        .into_iter()
        .rev()
        .find_map(|(k, v)| (k == "prompt").then_some(v))
}

pub fn routes<B: LlmBackend + Clone + 'static>(backend: B) -> Router {
    Router::new()
        .route("/", get(root))
        .route(
            "/ask",
            get(move |Query(pairs): Query<Vec<(String, String)>>| {
                let backend = backend.clone();
                async move {
                    let prompt = prompt_param(pairs).ok_or(ApiError::MissingPrompt)?;
                    debug!(prompt_len = prompt.len(), "ask");
                    let response = backend.complete(&prompt).await?;
                    debug!(completion_len = response.len(), "ask done");
                    Ok::<_, ApiError>(Json(AskResponse { response }))
                }
            }),
        )
}

async fn root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}
