use crate::message::ProductHit;

pub const UNNAMED_PRODUCT: &str = "Unnamed";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
pub const MISSING_PRICE: &str = "—";

pub fn title(hit: &ProductHit) -> &str {
	hit.name.as_deref().filter(|name| !name.is_empty()).unwrap_or(UNNAMED_PRODUCT)
}

pub fn image(hit: &ProductHit) -> &str {
	hit.image_path.as_deref().filter(|path| !path.is_empty()).unwrap_or(PLACEHOLDER_IMAGE)
}

/// `16GB RAM • 512GB SSD • 14" • M3`, skipping absent or zero parts.
pub fn spec_line(hit: &ProductHit) -> String {
	let mut parts = Vec::new();

	if let Some(ram) = hit.ram_gb.filter(|value| *value != 0.0) {
		parts.push(format!("{}GB RAM", number(ram)));
	}
	if let Some(ssd) = hit.ssd_gb.filter(|value| *value != 0.0) {
		parts.push(format!("{}GB SSD", number(ssd)));
	}
	if let Some(inch) = hit.display_inch.filter(|value| *value != 0.0) {
		parts.push(format!("{}\"", number(inch)));
	}
	if let Some(cpu) = hit.cpu.as_deref().filter(|cpu| !cpu.is_empty()) {
		parts.push(cpu.to_string());
	}

	parts.join(" • ")
}

/// German-locale euro amount, e.g. `1.299,00 €` (non-breaking space before the sign).
pub fn euro(amount: Option<f64>) -> String {
	let Some(amount) = amount.filter(|value| value.is_finite()) else {
		return MISSING_PRICE.to_string();
	};
	let cents = (amount.abs() * 100.0).round() as u64;
	let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
	let whole = (cents / 100).to_string();
	let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);

	for (idx, digit) in whole.chars().enumerate() {
		if idx > 0 && (whole.len() - idx) % 3 == 0 {
			grouped.push('.');
		}

		grouped.push(digit);
	}

	format!("{sign}{grouped},{:02}\u{a0}€", cents % 100)
}

fn number(value: f64) -> String {
	if value.fract() == 0.0 && value.abs() < 1e15 { format!("{value:.0}") } else { value.to_string() }
}
