//! In-process stand-in for the upstream EUGEN backend.
//!
//! Serves `POST {prefix}/chat` and `POST {prefix}/chat/reset` on an ephemeral loopback port,
//! records every body it receives and answers from per-endpoint scripts.

mod error;

pub use error::{Error, Result};

use std::{
	collections::VecDeque,
	net::SocketAddr,
	sync::{Arc, Mutex},
};

use axum::{
	Router,
	body::Bytes,
	extract::State,
	http::{StatusCode, header},
	response::{IntoResponse, Response},
	routing::post,
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};

/// What the fake answers with. Unscripted calls get [`FakeResponse::default_chat`] or
/// [`FakeResponse::default_reset`].
#[derive(Clone, Debug)]
pub enum FakeResponse {
	Json { status: u16, body: Value },
	Raw { status: u16, body: String },
}
impl FakeResponse {
	pub fn json(body: Value) -> Self {
		Self::Json { status: 200, body }
	}

	pub fn status(status: u16, body: Value) -> Self {
		Self::Json { status, body }
	}

	pub fn raw(status: u16, body: impl Into<String>) -> Self {
		Self::Raw { status, body: body.into() }
	}

	pub fn default_chat() -> Self {
		Self::json(json!({ "reply": "ok" }))
	}

	pub fn default_reset() -> Self {
		Self::json(json!({ "ok": true }))
	}
}
impl IntoResponse for FakeResponse {
	fn into_response(self) -> Response {
		match self {
			Self::Json { status, body } => (status_code(status), axum::Json(body)).into_response(),
			Self::Raw { status, body } =>
				(status_code(status), [(header::CONTENT_TYPE, "text/plain")], body).into_response(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Endpoint {
	Chat,
	Reset,
}

#[derive(Default)]
struct Shared {
	chat_script: Mutex<VecDeque<FakeResponse>>,
	reset_script: Mutex<VecDeque<FakeResponse>>,
	received: Mutex<Vec<(Endpoint, Value)>>,
}
impl Shared {
	fn handle(&self, endpoint: Endpoint, body: &[u8]) -> FakeResponse {
		// Non-JSON bodies are kept as text so tests can still assert on them.
		let body = serde_json::from_slice(body)
			.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));

		self.received.lock().unwrap_or_else(|err| err.into_inner()).push((endpoint, body));

		let script = match endpoint {
			Endpoint::Chat => &self.chat_script,
			Endpoint::Reset => &self.reset_script,
		};
		let next = script.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

		next.unwrap_or_else(|| match endpoint {
			Endpoint::Chat => FakeResponse::default_chat(),
			Endpoint::Reset => FakeResponse::default_reset(),
		})
	}

	fn bodies(&self, endpoint: Endpoint) -> Vec<Value> {
		self.received
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.iter()
			.filter(|(seen, _)| *seen == endpoint)
			.map(|(_, body)| body.clone())
			.collect()
	}
}

pub struct FakeBackend {
	addr: SocketAddr,
	prefix: String,
	shared: Arc<Shared>,
	task: JoinHandle<()>,
}
impl FakeBackend {
	/// Starts serving under `prefix` (for example `/api/v1`). Must be called inside a tokio
	/// runtime; the server stops when the value is dropped.
	pub async fn spawn(prefix: &str) -> Result<Self> {
		if !prefix.is_empty() && !prefix.starts_with('/') {
			return Err(Error::Message(format!("Route prefix must start with '/': {prefix:?}.")));
		}

		let shared = Arc::new(Shared::default());
		let app = Router::new()
			.route(&format!("{prefix}/chat"), post(chat))
			.route(&format!("{prefix}/chat/reset"), post(reset))
			.with_state(Arc::clone(&shared));
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let task = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, app).await {
				eprintln!("Fake backend stopped: {err}.");
			}
		});

		Ok(Self { addr, prefix: prefix.to_string(), shared, task })
	}

	/// Origin without the prefix, the shape `backend.base_url` expects.
	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn script_chat(&self, response: FakeResponse) {
		self.shared.chat_script.lock().unwrap_or_else(|err| err.into_inner()).push_back(response);
	}

	pub fn script_reset(&self, response: FakeResponse) {
		self.shared.reset_script.lock().unwrap_or_else(|err| err.into_inner()).push_back(response);
	}

	pub fn chat_bodies(&self) -> Vec<Value> {
		self.shared.bodies(Endpoint::Chat)
	}

	pub fn reset_bodies(&self) -> Vec<Value> {
		self.shared.bodies(Endpoint::Reset)
	}
}
impl Drop for FakeBackend {
	fn drop(&mut self) {
		self.task.abort();
	}
}

/// A loopback URL nothing listens on. The port is released right away, so a later bind could
/// in principle grab it; good enough for connection-refused tests.
pub async fn unreachable_url() -> Result<String> {
	let listener = TcpListener::bind("127.0.0.1:0").await?;
	let addr = listener.local_addr()?;

	drop(listener);

	Ok(format!("http://{addr}"))
}

async fn chat(State(shared): State<Arc<Shared>>, body: Bytes) -> FakeResponse {
	shared.handle(Endpoint::Chat, &body)
}

async fn reset(State(shared): State<Arc<Shared>>, body: Bytes) -> FakeResponse {
	shared.handle(Endpoint::Reset, &body)
}

fn status_code(status: u16) -> StatusCode {
	StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
