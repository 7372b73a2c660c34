use std::fmt;

use serde::{
	Deserialize, Deserializer, Serialize, Serializer,
	de::{IgnoredAny, MapAccess, Visitor},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
	/// Epoch milliseconds.
	pub at: i64,
	#[serde(default)]
	pub meta: MessageMeta,
}
impl ChatMessage {
	/// User messages carry an empty `meta` placeholder.
	pub fn user(content: impl Into<String>, at: i64) -> Self {
		Self { role: Role::User, content: content.into(), at, meta: MessageMeta::default() }
	}

	pub fn assistant(
		content: impl Into<String>,
		at: i64,
		products: Vec<ProductHit>,
		raw_results: Option<ResultGroups>,
	) -> Self {
		Self {
			role: Role::Assistant,
			content: content.into(),
			at,
			meta: MessageMeta { products: Some(products), raw_results },
		}
	}

	pub fn products(&self) -> &[ProductHit] {
		self.meta.products.as_deref().unwrap_or_default()
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMeta {
	/// Flattened and deduplicated cards rendered beneath the text.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub products: Option<Vec<ProductHit>>,
	/// Results as grouped by the backend, kept for diagnostics.
	#[serde(default, rename = "rawResults", skip_serializing_if = "Option::is_none")]
	pub raw_results: Option<ResultGroups>,
}

/// One retrieval hit as returned by the recommendation backend.
///
/// Display attributes decode leniently: a numeric field sent as a numeric string is parsed, and
/// any other mistyped attribute reads as absent instead of failing the hit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductHit {
	#[serde(default, deserialize_with = "de_hit_id", skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, deserialize_with = "de_text", skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, deserialize_with = "de_text", skip_serializing_if = "Option::is_none")]
	pub manufacturer: Option<String>,
	#[serde(default, deserialize_with = "de_number", skip_serializing_if = "Option::is_none")]
	pub price_brutto: Option<f64>,
	#[serde(default, deserialize_with = "de_number", skip_serializing_if = "Option::is_none")]
	pub ram_gb: Option<f64>,
	#[serde(default, deserialize_with = "de_number", skip_serializing_if = "Option::is_none")]
	pub ssd_gb: Option<f64>,
	#[serde(default, deserialize_with = "de_number", skip_serializing_if = "Option::is_none")]
	pub display_inch: Option<f64>,
	#[serde(default, deserialize_with = "de_text", skip_serializing_if = "Option::is_none")]
	pub cpu: Option<String>,
	#[serde(default, deserialize_with = "de_text", skip_serializing_if = "Option::is_none")]
	pub image_path: Option<String>,
	#[serde(default, deserialize_with = "de_text", skip_serializing_if = "Option::is_none")]
	pub item_type: Option<String>,
	#[serde(default, deserialize_with = "de_text", skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}
impl ProductHit {
	pub fn with_id(id: impl Into<String>) -> Self {
		Self { id: Some(id.into()), ..Default::default() }
	}

	/// The deduplication key. Empty ids count as missing.
	pub fn key(&self) -> Option<&str> {
		self.id.as_deref().filter(|id| !id.is_empty())
	}
}

/// Results keyed by the sub-query that produced them, in the backend's order.
///
/// Serialized as a JSON object; deserialization keeps document order and skips entries that are
/// not hit objects (`null` included). A group that is not a list reads as empty. A repeated
/// label replaces the earlier group in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultGroups(Vec<(String, Vec<ProductHit>)>);
impl ResultGroups {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, label: impl Into<String>, hits: Vec<ProductHit>) {
		let label = label.into();

		match self.0.iter_mut().find(|(existing, _)| *existing == label) {
			Some((_, group)) => *group = hits,
			None => self.0.push((label, hits)),
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[ProductHit])> {
		self.0.iter().map(|(label, hits)| (label.as_str(), hits.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<L> FromIterator<(L, Vec<ProductHit>)> for ResultGroups
where
	L: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (L, Vec<ProductHit>)>>(iter: I) -> Self {
		let mut groups = Self::new();

		for (label, hits) in iter {
			groups.push(label, hits);
		}

		groups
	}
}
impl Serialize for ResultGroups {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_map(self.0.iter().map(|(label, hits)| (label, hits)))
	}
}
impl<'de> Deserialize<'de> for ResultGroups {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct GroupsVisitor;
		impl<'de> Visitor<'de> for GroupsVisitor {
			type Value = ResultGroups;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("a map of sub-query labels to product hit lists")
			}

			fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
			where
				A: MapAccess<'de>,
			{
				let mut groups = ResultGroups::new();

				while let Some((label, slot)) = access.next_entry::<String, GroupSlot>()? {
					let hits = match slot {
						GroupSlot::Hits(slots) => slots
							.into_iter()
							.filter_map(|slot| match slot {
								HitSlot::Hit(hit) => Some(hit),
								HitSlot::Other(_) => None,
							})
							.collect(),
						GroupSlot::Other(_) => Vec::new(),
					};

					groups.push(label, hits);
				}

				Ok(groups)
			}
		}

		deserializer.deserialize_map(GroupsVisitor)
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupSlot {
	Hits(Vec<HitSlot>),
	Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HitSlot {
	Hit(ProductHit),
	Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
	Text(String),
	Unsigned(u64),
	Signed(i64),
	Float(f64),
	Other(IgnoredAny),
}

/// Ids may arrive as strings or integers.
fn de_hit_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<RawScalar>::deserialize(deserializer)?.and_then(|raw| match raw {
		RawScalar::Text(text) => Some(text),
		RawScalar::Unsigned(value) => Some(value.to_string()),
		RawScalar::Signed(value) => Some(value.to_string()),
		RawScalar::Float(_) | RawScalar::Other(_) => None,
	}))
}

fn de_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<RawScalar>::deserialize(deserializer)?.and_then(|raw| match raw {
		RawScalar::Text(text) => text.trim().parse::<f64>().ok().filter(|value| value.is_finite()),
		RawScalar::Unsigned(value) => Some(value as f64),
		RawScalar::Signed(value) => Some(value as f64),
		RawScalar::Float(value) => Some(value),
		RawScalar::Other(_) => None,
	}))
}

fn de_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<RawScalar>::deserialize(deserializer)?.and_then(|raw| match raw {
		RawScalar::Text(text) => Some(text),
		_ => None,
	}))
}
