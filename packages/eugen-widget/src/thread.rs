use std::sync::Arc;

use eugen_domain::ChatMessage;

use crate::{Result, storage::KeyValueStore};

pub const THREAD_KEY: &str = "eugen.thread.v1";

/// Read/write view over the persisted transcript.
pub struct ThreadStore<S> {
	store: Arc<S>,
}
impl<S> ThreadStore<S>
where
	S: KeyValueStore,
{
	pub fn new(store: Arc<S>) -> Self {
		Self { store }
	}

	/// Never fails: nothing persisted, an unreadable store and a value of the wrong shape all
	/// read as an empty thread.
	pub fn load(&self) -> Vec<ChatMessage> {
		let raw = match self.store.get(THREAD_KEY) {
			Ok(Some(raw)) => raw,
			Ok(None) => return Vec::new(),
			Err(err) => {
				tracing::debug!(error = %err, "Thread storage unreadable. Starting empty.");

				return Vec::new();
			},
		};

		match serde_json::from_str(&raw) {
			Ok(messages) => messages,
			Err(err) => {
				tracing::debug!(error = %err, "Persisted thread is malformed. Starting empty.");

				Vec::new()
			},
		}
	}

	pub fn save(&self, messages: &[ChatMessage]) -> Result<()> {
		let raw = serde_json::to_string(messages)?;

		self.store.set(THREAD_KEY, &raw)
	}

	pub fn clear(&self) -> Result<()> {
		self.store.remove(THREAD_KEY)
	}
}
