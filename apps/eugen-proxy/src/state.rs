use std::sync::Arc;

use crate::upstream::{Result, Upstream};

#[derive(Clone)]
pub struct AppState {
	pub upstream: Arc<Upstream>,
}
impl AppState {
	pub fn new(backend: &eugen_config::Backend) -> Result<Self> {
		let upstream = Upstream::new(backend)?;

		Ok(Self { upstream: Arc::new(upstream) })
	}
}
