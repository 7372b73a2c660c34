use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
	Home,
	Category,
	/// Product detail page.
	Pdp,
	Cart,
	Search,
	#[default]
	Other,
}
impl Route {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Home => "home",
			Self::Category => "category",
			Self::Pdp => "pdp",
			Self::Cart => "cart",
			Self::Search => "search",
			Self::Other => "other",
		}
	}
}
impl std::str::FromStr for Route {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"home" => Ok(Self::Home),
			"category" => Ok(Self::Category),
			"pdp" => Ok(Self::Pdp),
			"cart" => Ok(Self::Cart),
			"search" => Ok(Self::Search),
			"other" => Ok(Self::Other),
			other => Err(format!(
				"Unknown route {other}; expected one of home, category, pdp, cart, search, other."
			)),
		}
	}
}

/// Supplied by the hosting page. Read-only and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
	pub route: Route,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub product_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub product_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cart_total: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
}
impl PageContext {
	pub fn new(route: Route) -> Self {
		Self { route, ..Default::default() }
	}
}
