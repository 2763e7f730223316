use clap::Parser;
use std::time::Duration;

use crate::model::GenerateParams;

#[derive(Parser, Debug, Clone)]
pub struct Config {
    #[arg(long, env, default_value = "0.0.0.0:8000")]
    pub bind_addr: String,
    /// Base address of the Ollama server all completions are delegated to.
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    pub ollama_base_url: String,
    #[arg(long, env, default_value = "gemma3:270m")]
    pub model: String,
    #[arg(long, env, default_value_t = 0.0)]
    pub temperature: f32,
    /// Extra attempts the model client makes on retryable failures.
    #[arg(long, env, default_value_t = 2)]
    pub max_retries: u32,
    /// Per-attempt backend timeout. Unset means wait for the backend indefinitely.
    #[arg(long, env)]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn generate_params(&self) -> GenerateParams {
        GenerateParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_retries: self.max_retries,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_gateway_contract() {
        let cfg = Config::try_parse_from(["prompt-gateway"]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.model, "gemma3:270m");
        assert_eq!(cfg.temperature, 0.0);
        assert_eq!(cfg.max_retries, 2);
        assert!(cfg.request_timeout().is_none());
        // OLLAMA_BASE_URL may be set in the environment running the tests
        if std::env::var_os("OLLAMA_BASE_URL").is_none() {
            assert_eq!(cfg.ollama_base_url, "http://localhost:11434");
        }
    }

    #[test]
    fn base_url_reads_ollama_env_var() {
        let cmd = <Config as clap::CommandFactory>::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "ollama_base_url")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("OLLAMA_BASE_URL")));
        let defaults: Vec<_> = arg.get_default_values().iter().map(|v| v.to_str()).collect();
        assert_eq!(defaults, [Some("http://localhost:11434")]);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "prompt-gateway",
            "--ollama-base-url",
            "http://ollama.internal:11434",
            "--max-retries",
            "0",
            "--request-timeout-secs",
            "30",
        ])
        .unwrap();
        assert_eq!(cfg.ollama_base_url, "http://ollama.internal:11434");
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));

        let params = cfg.generate_params();
        assert_eq!(params.max_retries, 0);
        assert_eq!(params.model, "gemma3:270m");
    }
}
