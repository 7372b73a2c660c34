//! Client-side core of the EUGEN chat widget: transcript persistence, the per-turn request
//! lifecycle and the onboarding hint. Rendering is left to the embedding front-end.

pub mod clock;
pub mod intro;
pub mod reply;
pub mod storage;
pub mod thread;
pub mod transport;
pub mod widget;

mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use thread::ThreadStore;
pub use transport::{ChatRequest, ChatTransport, HttpTransport};
pub use widget::{ChatWidget, Notice, NoticeLevel, Notifier, SendOutcome, WidgetOptions};
