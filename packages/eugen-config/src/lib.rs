mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Backend, Config, DEFAULT_API_PREFIX, DEFAULT_BACKEND_URL, DEFAULT_CHAT_ENDPOINT,
	DEFAULT_HTTP_BIND, DEFAULT_PRODUCT_LIMIT, DEFAULT_RESET_ENDPOINT, DEFAULT_TIMEOUT_MS, Service,
	Widget,
};

use std::{env, fs, path::Path};

pub const ENV_BACKEND_URL: &str = "EUGEN_API";
pub const ENV_API_PREFIX: &str = "EUGEN_API_PREFIX";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	finish(cfg)
}

/// Loads `path` when given, otherwise starts from the built-in development defaults.
/// Environment overrides apply in both cases.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
	match path {
		Some(path) => load(path),
		None => finish(Config::default()),
	}
}

pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(base_url) = lookup(ENV_BACKEND_URL) {
		cfg.backend.base_url = base_url;
	}
	if let Some(api_prefix) = lookup(ENV_API_PREFIX) {
		cfg.backend.api_prefix = api_prefix;
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	for (label, url) in
		[("backend.base_url", &cfg.backend.base_url), ("widget.origin", &cfg.widget.origin)]
	{
		if !(url.starts_with("http://") || url.starts_with("https://")) {
			return Err(Error::Validation {
				message: format!("{label} must start with http:// or https://."),
			});
		}
	}

	if !cfg.backend.api_prefix.is_empty() && !cfg.backend.api_prefix.starts_with('/') {
		return Err(Error::Validation {
			message: "backend.api_prefix must be empty or start with /.".to_string(),
		});
	}

	for (label, endpoint) in [
		("widget.endpoint", &cfg.widget.endpoint),
		("widget.reset_endpoint", &cfg.widget.reset_endpoint),
	] {
		if !endpoint.starts_with('/') {
			return Err(Error::Validation { message: format!("{label} must start with /.") });
		}
	}

	for (label, value) in [
		("backend.timeout_ms", cfg.backend.timeout_ms),
		("widget.request_timeout_ms", cfg.widget.request_timeout_ms),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.widget.product_limit == 0 {
		return Err(Error::Validation {
			message: "widget.product_limit must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn finish(mut cfg: Config) -> Result<Config> {
	apply_env_overrides(&mut cfg, |key| env::var(key).ok().filter(|value| !value.trim().is_empty()));
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

fn normalize(cfg: &mut Config) {
	cfg.backend.base_url = cfg.backend.base_url.trim().trim_end_matches('/').to_string();
	cfg.backend.api_prefix = cfg.backend.api_prefix.trim().trim_end_matches('/').to_string();
	cfg.widget.origin = cfg.widget.origin.trim().trim_end_matches('/').to_string();

	if cfg.widget.storage_path.as_ref().map(|path| path.as_os_str().is_empty()).unwrap_or(false) {
		cfg.widget.storage_path = None;
	}
}
