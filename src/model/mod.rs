use crate::error::BackendError;


#[derive(Clone, Debug)]
pub struct GenerateParams {
pub model: String,
pub temperature: f32,
pub max_retries: u32,
}


#[async_trait::async_trait]
pub trait LlmBackend: Send + Sync + 'static {
async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}


pub mod ollama;
