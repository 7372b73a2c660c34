use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

pub trait Clock: Send + Sync {
	/// Epoch milliseconds.
	fn now_ms(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now_ms(&self) -> i64 {
		(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
	}
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
	now_ms: AtomicI64,
}
impl ManualClock {
	pub fn new(start_ms: i64) -> Self {
		Self { now_ms: AtomicI64::new(start_ms) }
	}

	pub fn advance(&self, delta_ms: i64) {
		self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
	}

	pub fn set(&self, now_ms: i64) {
		self.now_ms.store(now_ms, Ordering::SeqCst);
	}
}
impl Clock for ManualClock {
	fn now_ms(&self) -> i64 {
		self.now_ms.load(Ordering::SeqCst)
	}
}
