use crate::storage::KeyValueStore;

pub const INTRO_KEY: &str = "eugen.intro.v1";
pub const SHOW_AFTER_MS: i64 = 600;
pub const HIDE_AFTER_MS: i64 = 10_600;

/// First-run onboarding hint shown next to the open button.
///
/// Visible from [`SHOW_AFTER_MS`] to [`HIDE_AFTER_MS`] after mount, unless dismissed now or in
/// an earlier session.
#[derive(Clone, Debug)]
pub struct IntroHint {
	mounted_at: i64,
	dismissed: bool,
	armed: bool,
}
impl IntroHint {
	/// An unreadable flag counts as dismissed so a broken store never nags.
	pub fn mount<S>(store: &S, now_ms: i64) -> Self
	where
		S: KeyValueStore + ?Sized,
	{
		let dismissed = match store.get(INTRO_KEY) {
			Ok(seen) => seen.is_some(),
			Err(err) => {
				tracing::debug!(error = %err, "Intro flag unreadable. Suppressing hint.");

				true
			},
		};

		Self { mounted_at: now_ms, dismissed, armed: !dismissed }
	}

	pub fn is_visible(&self, now_ms: i64) -> bool {
		let elapsed = now_ms - self.mounted_at;

		self.armed && (SHOW_AFTER_MS..HIDE_AFTER_MS).contains(&elapsed)
	}

	pub fn is_dismissed(&self) -> bool {
		self.dismissed
	}

	pub fn dismiss<S>(&mut self, store: &S)
	where
		S: KeyValueStore + ?Sized,
	{
		self.armed = false;

		if self.dismissed {
			return;
		}

		self.dismissed = true;

		if let Err(err) = store.set(INTRO_KEY, "1") {
			tracing::warn!(error = %err, "Failed to persist intro dismissal.");
		}
	}

	/// Disarms the schedule for this mount. The persisted flag is left alone.
	pub fn reset(&mut self) {
		self.armed = false;
	}
}
