use std::{
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use tokio::{runtime::Handle, sync::Notify};

use eugen_domain::{ChatMessage, PageContext, suggestions};

use crate::{
	Error,
	clock::Clock,
	intro::IntroHint,
	reply::decode_reply,
	storage::KeyValueStore,
	thread::ThreadStore,
	transport::{ChatRequest, ChatTransport},
};

pub const NETWORK_FAILURE_NOTICE: &str = "EUGEN is thinking… but the network failed. Try again.";
pub const THREAD_CLEARED_NOTICE: &str = "Thread cleared";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
	Info,
	Error,
}

/// A transient, user-facing notification (a toast in the browser).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
	pub level: NoticeLevel,
	pub text: String,
}
impl Notice {
	pub fn info(text: impl Into<String>) -> Self {
		Self { level: NoticeLevel::Info, text: text.into() }
	}

	pub fn error(text: impl Into<String>) -> Self {
		Self { level: NoticeLevel::Error, text: text.into() }
	}
}

pub trait Notifier: Send + Sync {
	fn notify(&self, notice: Notice);
}

/// How one call to [`ChatWidget::send`] ended.
#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome {
	/// Blank input. Nothing changed.
	Ignored,
	/// Another turn is still in flight. Nothing changed.
	Busy,
	/// The assistant message that was appended.
	Answered(ChatMessage),
	/// Rejected, non-success status or timed out. The user message stays unanswered.
	Failed,
	/// Cut short by closing the widget.
	Aborted,
	/// The thread was cleared mid-turn. The reply or failure was dropped without a notice.
	Discarded,
}

#[derive(Clone, Copy, Debug)]
pub struct WidgetOptions {
	pub request_timeout: Duration,
	pub product_limit: usize,
}
impl From<&eugen_config::Widget> for WidgetOptions {
	fn from(cfg: &eugen_config::Widget) -> Self {
		Self {
			request_timeout: Duration::from_millis(cfg.request_timeout_ms),
			product_limit: cfg.product_limit,
		}
	}
}
impl Default for WidgetOptions {
	fn default() -> Self {
		Self::from(&eugen_config::Widget::default())
	}
}

struct WidgetState {
	messages: Vec<ChatMessage>,
	input: String,
	loading: bool,
	open: bool,
	intro: IntroHint,
	page: PageContext,
	// Bumped on every clear so late replies can tell their thread is gone.
	epoch: u64,
}

enum TurnFailure {
	Transport(Error),
	Timeout,
	Aborted,
}

/// Client-side core of the chat widget.
///
/// Owns the visible transcript and drives each turn: optimistic user append, one chat call,
/// assistant append on success, a notice on failure. At most one turn is in flight; a send
/// issued meanwhile returns [`SendOutcome::Busy`]. State sits behind a mutex that is never held
/// across an await, so the presentation layer can read it while a turn is pending.
pub struct ChatWidget<T, S> {
	transport: Arc<T>,
	store: Arc<S>,
	threads: ThreadStore<S>,
	clock: Arc<dyn Clock>,
	notifier: Arc<dyn Notifier>,
	options: WidgetOptions,
	abort: Notify,
	state: Mutex<WidgetState>,
}
impl<T, S> ChatWidget<T, S>
where
	T: ChatTransport + 'static,
	S: KeyValueStore,
{
	/// Loads the persisted thread and mounts the intro hint.
	pub fn new(
		transport: T,
		store: S,
		clock: Arc<dyn Clock>,
		notifier: Arc<dyn Notifier>,
		options: WidgetOptions,
		page: PageContext,
	) -> Self {
		let store = Arc::new(store);
		let threads = ThreadStore::new(Arc::clone(&store));
		let messages = threads.load();
		let intro = IntroHint::mount(&*store, clock.now_ms());

		tracing::debug!(messages = messages.len(), route = page.route.as_str(), "Widget mounted.");

		Self {
			transport: Arc::new(transport),
			store,
			threads,
			clock,
			notifier,
			options,
			abort: Notify::new(),
			state: Mutex::new(WidgetState {
				messages,
				input: String::new(),
				loading: false,
				open: false,
				intro,
				page,
				epoch: 0,
			}),
		}
	}

	pub fn messages(&self) -> Vec<ChatMessage> {
		self.lock().messages.clone()
	}

	pub fn is_loading(&self) -> bool {
		self.lock().loading
	}

	pub fn is_open(&self) -> bool {
		self.lock().open
	}

	pub fn input(&self) -> String {
		self.lock().input.clone()
	}

	pub fn set_input(&self, input: impl Into<String>) {
		self.lock().input = input.into();
	}

	pub fn page_context(&self) -> PageContext {
		self.lock().page.clone()
	}

	pub fn set_page_context(&self, page: PageContext) {
		self.lock().page = page;
	}

	pub fn fab_label(&self) -> &'static str {
		suggestions::fab_label(self.lock().page.route)
	}

	pub fn suggestions(&self) -> Vec<String> {
		suggestions::suggestions(&self.lock().page)
	}

	/// Suggestions only show on an empty, idle thread with nothing typed.
	pub fn suggestions_visible(&self) -> bool {
		let state = self.lock();

		state.messages.is_empty() && !state.loading && state.input.trim().is_empty()
	}

	pub fn intro_visible(&self) -> bool {
		let now = self.clock.now_ms();

		self.lock().intro.is_visible(now)
	}

	pub fn dismiss_intro(&self) {
		self.lock().intro.dismiss(&*self.store);
	}

	pub fn open(&self) {
		let mut state = self.lock();

		state.open = true;
		state.intro.dismiss(&*self.store);
	}

	/// Closing also aborts a turn in flight.
	pub fn close(&self) {
		let mut state = self.lock();

		state.open = false;
		state.intro.dismiss(&*self.store);

		if state.loading {
			tracing::debug!("Widget closed during a turn. Aborting.");
			self.abort.notify_waiters();
		}
	}

	/// Sends whatever is in the input field.
	pub async fn submit(&self) -> SendOutcome {
		let input = self.input();

		self.send(&input).await
	}

	pub async fn send(&self, text: &str) -> SendOutcome {
		let content = text.trim();

		if content.is_empty() {
			return SendOutcome::Ignored;
		}

		let (request, epoch, aborted) = {
			let mut state = self.lock();

			if state.loading {
				tracing::debug!("Send rejected while a turn is in flight.");

				return SendOutcome::Busy;
			}

			let message = ChatMessage::user(content, self.clock.now_ms());

			state.messages.push(message.clone());
			state.input.clear();
			state.loading = true;

			self.persist(&state.messages);

			// Registered under the lock, so a concurrent close cannot slip in unseen.
			(ChatRequest::new(message), state.epoch, self.abort.notified())
		};
		let result = tokio::select! {
			res = tokio::time::timeout(self.options.request_timeout, self.transport.chat(&request)) =>
				match res {
					Ok(Ok(body)) => Ok(body),
					Ok(Err(err)) => Err(TurnFailure::Transport(err)),
					Err(_) => Err(TurnFailure::Timeout),
				},
			_ = aborted => Err(TurnFailure::Aborted),
		};
		let mut state = self.lock();

		state.loading = false;

		// Whatever a turn from a cleared thread produced, reply or failure, is dropped unseen.
		if state.epoch != epoch {
			tracing::debug!(
				succeeded = result.is_ok(),
				"Turn ended after the thread was cleared. Dropping it."
			);

			return SendOutcome::Discarded;
		}

		let outcome = match result {
			Ok(body) => {
				let reply = decode_reply(body, self.options.product_limit, self.clock.now_ms());

				state.messages.push(reply.clone());
				self.persist(&state.messages);

				SendOutcome::Answered(reply)
			},
			Err(TurnFailure::Aborted) => SendOutcome::Aborted,
			Err(TurnFailure::Transport(err)) => {
				tracing::warn!(error = %err, "Chat request failed.");

				SendOutcome::Failed
			},
			Err(TurnFailure::Timeout) => {
				tracing::warn!(
					timeout_ms = self.options.request_timeout.as_millis() as u64,
					"Chat request timed out."
				);

				SendOutcome::Failed
			},
		};

		drop(state);

		if outcome == SendOutcome::Failed {
			self.notifier.notify(Notice::error(NETWORK_FAILURE_NOTICE));
		}

		outcome
	}

	/// Drops the thread locally and asks the server to forget the session.
	///
	/// The server reset runs detached on the current tokio runtime and its outcome is discarded;
	/// the local clear never waits for it. Outside a runtime the reset is skipped.
	pub fn clear(&self) {
		match Handle::try_current() {
			Ok(handle) => {
				let transport = Arc::clone(&self.transport);

				handle.spawn(async move {
					if let Err(err) = transport.reset().await {
						tracing::debug!(error = %err, "Server-side reset failed. Ignoring.");
					}
				});
			},
			Err(_) => tracing::debug!("No tokio runtime. Skipping server-side reset."),
		}

		let mut state = self.lock();

		state.messages.clear();
		state.epoch += 1;
		state.intro.reset();

		if let Err(err) = self.threads.clear() {
			tracing::warn!(error = %err, "Failed to remove persisted thread.");
		}

		drop(state);

		self.notifier.notify(Notice::info(THREAD_CLEARED_NOTICE));
	}

	fn persist(&self, messages: &[ChatMessage]) {
		if let Err(err) = self.threads.save(messages) {
			tracing::warn!(error = %err, "Failed to persist thread.");
		}
	}

	fn lock(&self) -> MutexGuard<'_, WidgetState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}
