//! Canned prompts derived from the page the widget is mounted on.
//!
//! Everything here is a pure function of its input. Whether suggestions are shown at all is
//! decided by the widget (empty thread, idle, empty input).

use crate::{
	context::{PageContext, Route},
	display,
	message::ProductHit,
};

pub const INLINE_PDP_PROMPTS: [&str; 3] = [
	"Compare with cheaper option",
	"Is this good for video editing?",
	"What should I bundle with it?",
];

pub fn suggestions(ctx: &PageContext) -> Vec<String> {
	match ctx.route {
		Route::Pdp => vec![
			format!("Compare {} with the next best option", or_fallback(&ctx.product_name, "this")),
			"Is the RAM upgradable? Any gotchas?".to_string(),
			"Show cheaper alternatives with similar specs".to_string(),
			"Is there a better monitor pairing for this laptop?".to_string(),
		],
		Route::Category => vec![
			format!("Best value in {}", or_fallback(&ctx.category, "this category")),
			"Creator picks vs office picks".to_string(),
			"Help me pick by budget: 700€, 1000€, 1500€".to_string(),
			"Only USB-C charging models".to_string(),
		],
		Route::Cart => vec![
			"Optimize my cart for performance/€".to_string(),
			"Bundle suggestions (dock, case, cable)".to_string(),
			"Any better GPU/CPU for same price?".to_string(),
		],
		Route::Search => vec![
			format!("Refine results for “{}”", or_fallback(&ctx.query, "")),
			"Filter by weight < 1.4kg and > 12h battery".to_string(),
			"Top-rated under 1000€".to_string(),
		],
		Route::Home | Route::Other => vec![
			"What should I buy for video editing?".to_string(),
			"Build me a full setup under 2k€".to_string(),
			"Compare 14” vs 16” for my use".to_string(),
		],
	}
}

/// Label of the floating open button.
pub fn fab_label(route: Route) -> &'static str {
	match route {
		Route::Pdp => "Ask about this product",
		Route::Category => "Need help choosing?",
		Route::Cart => "Optimize my cart",
		Route::Search => "Refine these results",
		Route::Home | Route::Other => "Ask EUGEN",
	}
}

pub fn compare_prompt(hit: &ProductHit) -> String {
	format!("Compare {} with a similar but cheaper option", display::title(hit))
}

pub fn why_prompt(hit: &ProductHit) -> String {
	format!("Why did you pick {}? Be specific.", display::title(hit))
}

fn or_fallback<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
	value.as_deref().unwrap_or(fallback)
}
