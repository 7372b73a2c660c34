use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_CHAT_ENDPOINT: &str = "/api/eugen/chat";
pub const DEFAULT_RESET_ENDPOINT: &str = "/api/eugen/chat/reset";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PRODUCT_LIMIT: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	#[serde(default)]
	pub backend: Backend,
	#[serde(default)]
	pub widget: Widget,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { http_bind: DEFAULT_HTTP_BIND.to_string(), log_level: "info".to_string() }
	}
}

/// The external recommendation backend the proxy forwards to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Backend {
	/// Overridden by `EUGEN_API`.
	pub base_url: String,
	/// Overridden by `EUGEN_API_PREFIX`.
	pub api_prefix: String,
	pub timeout_ms: u64,
}
impl Backend {
	pub fn chat_url(&self) -> String {
		format!("{}{}/chat", self.base_url, self.api_prefix)
	}

	pub fn reset_url(&self) -> String {
		format!("{}{}/chat/reset", self.base_url, self.api_prefix)
	}
}
impl Default for Backend {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BACKEND_URL.to_string(),
			api_prefix: DEFAULT_API_PREFIX.to_string(),
			timeout_ms: DEFAULT_TIMEOUT_MS,
		}
	}
}

/// Client side of the chat: where the widget core sends turns and keeps its transcript.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Widget {
	pub origin: String,
	pub endpoint: String,
	pub reset_endpoint: String,
	pub request_timeout_ms: u64,
	pub product_limit: usize,
	pub storage_path: Option<PathBuf>,
}
impl Widget {
	pub fn chat_url(&self) -> String {
		format!("{}{}", self.origin, self.endpoint)
	}

	pub fn reset_url(&self) -> String {
		format!("{}{}", self.origin, self.reset_endpoint)
	}
}
impl Default for Widget {
	fn default() -> Self {
		Self {
			origin: format!("http://{DEFAULT_HTTP_BIND}"),
			endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
			reset_endpoint: DEFAULT_RESET_ENDPOINT.to_string(),
			request_timeout_ms: DEFAULT_TIMEOUT_MS,
			product_limit: DEFAULT_PRODUCT_LIMIT,
			storage_path: None,
		}
	}
}
