use serde_json::Value;

use eugen_domain::{ChatMessage, ResultGroups, flatten_results};

pub const FALLBACK_REPLY: &str = "I’m here! How can I help you decide?";

/// Builds the assistant message for a success body of the shape
/// `{ reply: string, results?: { <label>: ProductHit[] } }`.
///
/// Shape mismatches degrade instead of failing the turn: a missing or non-string `reply` becomes
/// [`FALLBACK_REPLY`], and malformed `results` leave the message without products.
pub fn decode_reply(body: Value, product_limit: usize, at: i64) -> ChatMessage {
	let mut fields = match body {
		Value::Object(fields) => fields,
		other => {
			tracing::warn!(kind = json_kind(&other), "Chat response is not a JSON object.");

			Default::default()
		},
	};
	let content = match fields.remove("reply") {
		Some(Value::String(reply)) => reply,
		None | Some(Value::Null) => FALLBACK_REPLY.to_string(),
		Some(other) => {
			tracing::warn!(kind = json_kind(&other), "Chat reply is not a string.");

			FALLBACK_REPLY.to_string()
		},
	};
	let raw_results = match fields.remove("results") {
		None | Some(Value::Null) => None,
		Some(results) => match serde_json::from_value::<ResultGroups>(results) {
			Ok(groups) => Some(groups),
			Err(err) => {
				tracing::warn!(error = %err, "Chat results are malformed. Dropping products.");

				None
			},
		},
	};
	let products = raw_results
		.as_ref()
		.map(|groups| flatten_results(groups, product_limit))
		.unwrap_or_default();

	ChatMessage::assistant(content, at, products, raw_results)
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
