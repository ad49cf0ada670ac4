//! Configuration for the annotation engine

use std::env;

use serde::Deserialize;

/// Top-level annotation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationConfig {
    pub api: ApiConfig,
    pub capabilities: Capabilities,
}

/// Remote API endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the annotation API, without trailing slash
    pub base_url: String,
    /// Bearer token; requests go out unauthenticated when absent
    pub token: Option<String>,
}

/// Capability flags supplied at construction time
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Capabilities {
    pub can_annotate: bool,
    pub can_delete: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        AnnotationConfig {
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                token: None,
            },
            capabilities: Capabilities {
                can_annotate: true,
                can_delete: true,
            },
        }
    }
}

impl AnnotationConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present; missing variables fall back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = AnnotationConfig::default();

        AnnotationConfig {
            api: ApiConfig {
                base_url: env::var("ANNOTATIONS_API_URL")
                    .unwrap_or(defaults.api.base_url)
                    .trim_end_matches('/')
                    .to_string(),
                token: env::var("ANNOTATIONS_API_TOKEN").ok(),
            },
            capabilities: Capabilities {
                can_annotate: env::var("ANNOTATIONS_CAN_ANNOTATE")
                    .map(|v| v != "false" && v != "0")
                    .unwrap_or(defaults.capabilities.can_annotate),
                can_delete: env::var("ANNOTATIONS_CAN_DELETE")
                    .map(|v| v != "false" && v != "0")
                    .unwrap_or(defaults.capabilities.can_delete),
            },
        }
    }
}
