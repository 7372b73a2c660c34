use eugen_domain::{ChatMessage, ProductHit, Role, display};

pub const INTRO_HINT: &str = "Meet EUGEN, your digital Product Advisor. \
	Ask for tips, comparisons and setups. (/open, /dismiss)";

pub fn message(message: &ChatMessage) -> String {
	let speaker = match message.role {
		Role::User => "You",
		Role::Assistant => "EUGEN",
	};
	let mut out = format!("{speaker}: {}", message.content);

	for (idx, hit) in message.products().iter().enumerate() {
		out.push('\n');
		out.push_str(&card(idx + 1, hit));
	}

	out
}

/// `  [2] Dell XPS 15 | 16GB RAM • 512GB SSD | 1.299,00 €`
pub fn card(index: usize, hit: &ProductHit) -> String {
	let mut out = format!("  [{index}] {}", display::title(hit));
	let specs = display::spec_line(hit);

	if !specs.is_empty() {
		out.push_str(" | ");
		out.push_str(&specs);
	}

	out.push_str(" | ");
	out.push_str(&display::euro(hit.price_brutto));

	out
}

pub fn suggestions(items: &[String]) -> String {
	items
		.iter()
		.enumerate()
		.map(|(idx, item)| format!("  {}. {item}", idx + 1))
		.collect::<Vec<_>>()
		.join("\n")
}
