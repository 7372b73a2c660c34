use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Magenta.on_default() | Effects::BOLD)
		.usage(AnsiColor::Magenta.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Installs the global fmt subscriber. An unparsable directive falls back to `info`.
pub fn init_tracing(log_level: &str) {
	let filter = log_filter(log_level);

	// A second install (tests, embedded runs) keeps the first subscriber.
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn log_filter(log_level: &str) -> EnvFilter {
	EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
	use super::log_filter;

	#[test]
	fn invalid_directive_falls_back_to_info() {
		assert_eq!(log_filter("eugen_proxy=loud").to_string(), "info");
		assert_eq!(log_filter("debug").to_string(), "debug");
	}
}
