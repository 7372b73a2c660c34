//! The `eugen_session_id` cookie: the only thing tying a browser to its server-side memory.

use axum::http::{HeaderMap, header};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "eugen_session_id";
/// Eight hours.
pub const MAX_AGE_SECS: u64 = 60 * 60 * 8;

const TOKEN_LEN: usize = 11;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns the first non-empty session cookie across all `Cookie` headers.
pub fn from_headers(headers: &HeaderMap) -> Option<String> {
	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(name, value)| *name == COOKIE_NAME && !value.is_empty())
		.map(|(_, value)| value.to_string())
}

/// A fresh opaque token: lowercase base-36 over the random low bits of a v4 UUID.
pub fn mint() -> String {
	let mut bits = Uuid::new_v4().as_u128();
	let mut token = Vec::with_capacity(TOKEN_LEN);

	for _ in 0..TOKEN_LEN {
		token.push(ALPHABET[(bits % 36) as usize]);
		bits /= 36;
	}

	token.into_iter().map(char::from).collect()
}

/// Not HttpOnly: the page itself may read the id.
pub fn set_cookie(session_id: &str) -> String {
	format!("{COOKIE_NAME}={session_id}; Path=/; Max-Age={MAX_AGE_SECS}; SameSite=Lax")
}
