use std::{
	collections::VecDeque,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::{Notify, oneshot};

use eugen_domain::{ChatMessage, PageContext, ProductHit, Role, Route};
use eugen_widget::{
	ChatRequest, ChatTransport, ChatWidget, Error, FileStore, KeyValueStore, ManualClock,
	MemoryStore, Notice, NoticeLevel, Notifier, Result, SendOutcome, ThreadStore, WidgetOptions,
	intro::INTRO_KEY,
	reply::FALLBACK_REPLY,
	thread::THREAD_KEY,
	widget::{NETWORK_FAILURE_NOTICE, THREAD_CLEARED_NOTICE},
};

enum Step {
	Reply(Value),
	Status(u16),
	Hang,
	Gate(oneshot::Receiver<Value>),
}

#[derive(Default)]
struct Script {
	steps: Mutex<VecDeque<Step>>,
	requests: Mutex<Vec<ChatRequest>>,
	resets: AtomicUsize,
	reset_seen: Notify,
	fail_reset: bool,
}
impl Script {
	fn push(&self, step: Step) {
		self.steps.lock().expect("steps lock").push_back(step);
	}

	fn requests(&self) -> Vec<ChatRequest> {
		self.requests.lock().expect("requests lock").clone()
	}
}

struct ScriptedTransport(Arc<Script>);
impl ChatTransport for ScriptedTransport {
	async fn chat(&self, request: &ChatRequest) -> Result<Value> {
		self.0.requests.lock().expect("requests lock").push(request.clone());

		let step = self.0.steps.lock().expect("steps lock").pop_front();

		match step {
			Some(Step::Reply(body)) => Ok(body),
			Some(Step::Status(status)) => Err(Error::Status { status }),
			Some(Step::Gate(gate)) => gate.await.map_err(|_| Error::Status { status: 599 }),
			Some(Step::Hang) | None => std::future::pending().await,
		}
	}

	async fn reset(&self) -> Result<()> {
		self.0.resets.fetch_add(1, Ordering::SeqCst);
		self.0.reset_seen.notify_one();

		if self.0.fail_reset { Err(Error::Status { status: 502 }) } else { Ok(()) }
	}
}

#[derive(Default)]
struct RecordingNotifier {
	notices: Mutex<Vec<Notice>>,
}
impl RecordingNotifier {
	fn notices(&self) -> Vec<Notice> {
		self.notices.lock().expect("notices lock").clone()
	}
}
impl Notifier for RecordingNotifier {
	fn notify(&self, notice: Notice) {
		self.notices.lock().expect("notices lock").push(notice);
	}
}

struct Harness<S> {
	script: Arc<Script>,
	notifier: Arc<RecordingNotifier>,
	clock: Arc<ManualClock>,
	widget: Arc<ChatWidget<ScriptedTransport, S>>,
}

fn harness_with<S>(store: S, script: Script, options: WidgetOptions, page: PageContext) -> Harness<S>
where
	S: KeyValueStore + 'static,
{
	let script = Arc::new(script);
	let notifier = Arc::new(RecordingNotifier::default());
	let clock = Arc::new(ManualClock::new(1_700_000_000_000));
	let widget = ChatWidget::new(
		ScriptedTransport(Arc::clone(&script)),
		store,
		clock.clone(),
		notifier.clone(),
		options,
		page,
	);

	Harness { script, notifier, clock, widget: Arc::new(widget) }
}

fn harness() -> Harness<MemoryStore> {
	harness_with(
		MemoryStore::new(),
		Script::default(),
		WidgetOptions::default(),
		PageContext::new(Route::Home),
	)
}

async fn wait_until_loading<S>(widget: &ChatWidget<ScriptedTransport, S>)
where
	S: KeyValueStore,
{
	tokio::time::timeout(Duration::from_secs(5), async {
		while !widget.is_loading() {
			tokio::task::yield_now().await;
		}
	})
	.await
	.expect("Turn never started.");
}

fn hit_ids(message: &ChatMessage) -> Vec<&str> {
	message.products().iter().filter_map(ProductHit::key).collect()
}

#[tokio::test]
async fn send_appends_trimmed_user_message_before_the_call() {
	let h = harness();

	h.script.push(Step::Reply(json!({ "reply": "Hello!" })));
	h.widget.set_input("  Which laptop for travel?  ");

	let outcome = h.widget.submit().await;
	let messages = h.widget.messages();
	let requests = h.script.requests();

	assert!(matches!(outcome, SendOutcome::Answered(_)));
	assert_eq!(messages.len(), 2);
	assert_eq!(messages[0].role, Role::User);
	assert_eq!(messages[0].content, "Which laptop for travel?");
	assert_eq!(messages[0].at, 1_700_000_000_000);
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].message, messages[0]);
	assert!(requests[0].thread.is_empty());
	assert_eq!(h.widget.input(), "");
	assert!(!h.widget.is_loading());
}

#[tokio::test]
async fn blank_input_is_a_no_op() {
	let h = harness();

	for text in ["", "   ", "\n\t "] {
		assert_eq!(h.widget.send(text).await, SendOutcome::Ignored);
	}

	assert!(h.widget.messages().is_empty());
	assert!(h.script.requests().is_empty());
	assert!(h.notifier.notices().is_empty());
	assert!(!h.widget.is_loading());
}

#[tokio::test]
async fn reply_with_results_yields_deduplicated_cards() {
	let h = harness();

	h.script.push(Step::Reply(json!({
		"reply": "Here are two options",
		"results": {
			"q1": [{ "id": "a" }, { "id": "b" }],
			"q2": [{ "id": "b" }, { "id": "c" }]
		}
	})));

	let outcome = h.widget.send("Best laptop under 1000€").await;
	let SendOutcome::Answered(reply) = outcome else {
		panic!("Expected an answer, got {outcome:?}.");
	};

	assert_eq!(reply.role, Role::Assistant);
	assert_eq!(reply.content, "Here are two options");
	assert_eq!(hit_ids(&reply), vec!["a", "b", "c"]);
	assert_eq!(reply.meta.raw_results.as_ref().map(|groups| groups.len()), Some(2));
	assert_eq!(h.widget.messages().last(), Some(&reply));
}

#[tokio::test]
async fn reply_without_results_has_no_cards() {
	let h = harness();

	h.script.push(Step::Reply(json!({ "reply": "X" })));

	let SendOutcome::Answered(reply) = h.widget.send("hi").await else {
		panic!("Expected an answer.");
	};

	assert_eq!(reply.content, "X");
	assert!(reply.products().is_empty());
	assert!(reply.meta.raw_results.is_none());
	assert_eq!(h.widget.messages().len(), 2);
}

#[tokio::test]
async fn missing_reply_uses_the_friendly_default() {
	let h = harness();

	h.script.push(Step::Reply(json!({ "results": {} })));

	let SendOutcome::Answered(reply) = h.widget.send("hi").await else {
		panic!("Expected an answer.");
	};

	assert_eq!(reply.content, FALLBACK_REPLY);
}

#[tokio::test]
async fn failed_call_keeps_only_the_user_message() {
	let h = harness();

	h.script.push(Step::Status(502));

	assert_eq!(h.widget.send("hello?").await, SendOutcome::Failed);

	let messages = h.widget.messages();

	assert_eq!(messages.len(), 1);
	assert_eq!(messages[0].role, Role::User);
	assert!(!h.widget.is_loading());
	assert_eq!(h.notifier.notices(), vec![Notice::error(NETWORK_FAILURE_NOTICE)]);
}

#[tokio::test]
async fn failure_does_not_block_the_next_turn() {
	let h = harness();

	h.script.push(Step::Status(500));
	h.script.push(Step::Reply(json!({ "reply": "Back online" })));

	assert_eq!(h.widget.send("first").await, SendOutcome::Failed);
	assert!(matches!(h.widget.send("second").await, SendOutcome::Answered(_)));

	let contents = h.widget.messages().into_iter().map(|m| m.content).collect::<Vec<_>>();

	assert_eq!(contents, vec!["first", "second", "Back online"]);
}

#[tokio::test]
async fn second_send_while_in_flight_is_rejected() {
	let h = harness();
	let (release, gate) = oneshot::channel();

	h.script.push(Step::Gate(gate));

	let widget = Arc::clone(&h.widget);
	let first = tokio::spawn(async move { widget.send("first").await });

	wait_until_loading(&h.widget).await;

	assert!(!h.widget.suggestions_visible());
	assert_eq!(h.widget.send("second").await, SendOutcome::Busy);
	assert_eq!(h.widget.messages().len(), 1);
	assert_eq!(h.script.requests().len(), 1);

	release.send(json!({ "reply": "done" })).expect("Turn dropped its gate.");

	let outcome = first.await.expect("Send task panicked.");

	assert!(matches!(outcome, SendOutcome::Answered(_)));
	assert_eq!(h.widget.messages().len(), 2);
	assert!(!h.widget.is_loading());
}

#[tokio::test]
async fn slow_backend_times_out_into_a_failure() {
	let options =
		WidgetOptions { request_timeout: Duration::from_millis(50), ..WidgetOptions::default() };
	let h = harness_with(MemoryStore::new(), Script::default(), options, PageContext::default());

	h.script.push(Step::Hang);

	assert_eq!(h.widget.send("anyone there?").await, SendOutcome::Failed);
	assert!(!h.widget.is_loading());
	assert_eq!(h.widget.messages().len(), 1);
	assert_eq!(h.notifier.notices(), vec![Notice::error(NETWORK_FAILURE_NOTICE)]);
}

#[tokio::test]
async fn closing_aborts_the_turn_quietly() {
	let h = harness();

	h.script.push(Step::Hang);
	h.widget.open();

	let widget = Arc::clone(&h.widget);
	let turn = tokio::spawn(async move { widget.send("never mind").await });

	wait_until_loading(&h.widget).await;
	h.widget.close();

	let outcome = tokio::time::timeout(Duration::from_secs(5), turn)
		.await
		.expect("Abort did not end the turn.")
		.expect("Send task panicked.");

	assert_eq!(outcome, SendOutcome::Aborted);
	assert!(!h.widget.is_loading());
	assert!(!h.widget.is_open());
	assert_eq!(h.widget.messages().len(), 1);
	assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn clear_empties_thread_even_when_reset_fails() {
	let script = Script { fail_reset: true, ..Script::default() };
	let h = harness_with(MemoryStore::new(), script, WidgetOptions::default(), PageContext::default());

	h.script.push(Step::Reply(json!({ "reply": "ok" })));
	h.widget.send("hello").await;
	h.widget.clear();

	assert!(h.widget.messages().is_empty());
	assert!(h.widget.suggestions_visible());

	tokio::time::timeout(Duration::from_secs(5), h.script.reset_seen.notified())
		.await
		.expect("Reset was never attempted.");

	assert_eq!(h.script.resets.load(Ordering::SeqCst), 1);
	assert_eq!(h.notifier.notices(), vec![Notice::info(THREAD_CLEARED_NOTICE)]);
	assert_eq!(h.notifier.notices()[0].level, NoticeLevel::Info);
}

#[tokio::test]
async fn reply_after_clear_is_discarded() {
	let h = harness();
	let (release, gate) = oneshot::channel();

	h.script.push(Step::Gate(gate));

	let widget = Arc::clone(&h.widget);
	let turn = tokio::spawn(async move { widget.send("question").await });

	wait_until_loading(&h.widget).await;
	h.widget.clear();
	release.send(json!({ "reply": "late answer" })).expect("Turn dropped its gate.");

	assert_eq!(turn.await.expect("Send task panicked."), SendOutcome::Discarded);
	assert!(h.widget.messages().is_empty());
	assert!(!h.widget.is_loading());
}

#[tokio::test]
async fn failure_after_clear_is_discarded_without_a_notice() {
	let h = harness();
	let (release, gate) = oneshot::channel::<Value>();

	h.script.push(Step::Gate(gate));

	let widget = Arc::clone(&h.widget);
	let turn = tokio::spawn(async move { widget.send("question").await });

	wait_until_loading(&h.widget).await;
	h.widget.clear();
	drop(release);

	assert_eq!(turn.await.expect("Send task panicked."), SendOutcome::Discarded);
	assert!(h.widget.messages().is_empty());
	assert!(!h.widget.is_loading());
	assert_eq!(h.notifier.notices(), vec![Notice::info(THREAD_CLEARED_NOTICE)]);
}

#[tokio::test]
async fn timeout_after_clear_is_discarded_without_a_notice() {
	let options =
		WidgetOptions { request_timeout: Duration::from_millis(50), ..WidgetOptions::default() };
	let h = harness_with(MemoryStore::new(), Script::default(), options, PageContext::default());

	h.script.push(Step::Hang);

	let widget = Arc::clone(&h.widget);
	let turn = tokio::spawn(async move { widget.send("anyone?").await });

	wait_until_loading(&h.widget).await;
	h.widget.clear();

	assert_eq!(turn.await.expect("Send task panicked."), SendOutcome::Discarded);
	assert_eq!(h.notifier.notices(), vec![Notice::info(THREAD_CLEARED_NOTICE)]);
}

#[tokio::test]
async fn clear_empties_the_persisted_thread_when_reset_fails() {
	let dir = TempDir::new().expect("Failed to create temp dir.");
	let path = dir.path().join("storage.json");
	let script = Script { fail_reset: true, ..Script::default() };
	let h =
		harness_with(FileStore::new(&path), script, WidgetOptions::default(), PageContext::default());
	let persisted = || ThreadStore::new(Arc::new(FileStore::new(&path))).load();

	h.script.push(Step::Reply(json!({ "reply": "ok" })));
	h.widget.send("hello").await;

	assert_eq!(persisted().len(), 2);

	h.widget.clear();

	tokio::time::timeout(Duration::from_secs(5), h.script.reset_seen.notified())
		.await
		.expect("Reset was never attempted.");

	assert!(persisted().is_empty());
	assert!(h.widget.messages().is_empty());
}

#[test]
fn clear_outside_a_runtime_skips_the_reset() {
	let h = harness();

	h.widget.clear();

	assert!(h.widget.messages().is_empty());
	assert_eq!(h.script.resets.load(Ordering::SeqCst), 0);
	assert_eq!(h.notifier.notices(), vec![Notice::info(THREAD_CLEARED_NOTICE)]);
}

#[tokio::test]
async fn transcript_survives_a_reload() {
	let dir = TempDir::new().expect("Failed to create temp dir.");
	let path = dir.path().join("storage.json");

	{
		let h = harness_with(
			FileStore::new(&path),
			Script::default(),
			WidgetOptions::default(),
			PageContext::default(),
		);

		h.script.push(Step::Reply(json!({
			"reply": "Try the XPS",
			"results": { "q": [{ "id": "p10" }] }
		})));
		h.widget.send("Creator laptop?").await;
	}

	let reloaded = ThreadStore::new(Arc::new(FileStore::new(&path))).load();

	assert_eq!(reloaded.len(), 2);
	assert_eq!(reloaded[0].content, "Creator laptop?");
	assert_eq!(reloaded[1].content, "Try the XPS");
	assert_eq!(hit_ids(&reloaded[1]), vec!["p10"]);

	let h = harness_with(
		FileStore::new(&path),
		Script::default(),
		WidgetOptions::default(),
		PageContext::default(),
	);

	assert_eq!(h.widget.messages(), reloaded);
	assert!(!h.widget.suggestions_visible());
}

#[tokio::test]
async fn corrupt_transcript_starts_empty() {
	let store = MemoryStore::new();

	store.set(THREAD_KEY, "{definitely not json").expect("set");

	let h = harness_with(store, Script::default(), WidgetOptions::default(), PageContext::default());

	assert!(h.widget.messages().is_empty());

	h.script.push(Step::Reply(json!({ "reply": "fresh start" })));
	h.widget.send("hi").await;

	assert_eq!(h.widget.messages().len(), 2);
}

#[tokio::test]
async fn suggestions_follow_page_context_and_visibility_rules() {
	let page = PageContext {
		product_name: Some("Dell XPS 15".to_string()),
		..PageContext::new(Route::Pdp)
	};
	let h = harness_with(MemoryStore::new(), Script::default(), WidgetOptions::default(), page);

	assert_eq!(h.widget.fab_label(), "Ask about this product");
	assert_eq!(h.widget.suggestions()[0], "Compare Dell XPS 15 with the next best option");
	assert!(h.widget.suggestions_visible());

	h.widget.set_input("typing");

	assert!(!h.widget.suggestions_visible());

	h.widget.set_input("   ");
	h.widget.set_page_context(PageContext::new(Route::Cart));

	assert!(h.widget.suggestions_visible());
	assert_eq!(h.widget.suggestions().len(), 3);
	assert_eq!(h.widget.fab_label(), "Optimize my cart");
}

#[tokio::test]
async fn intro_hint_runs_on_the_injected_clock() {
	let h = harness();

	assert!(!h.widget.intro_visible());

	h.clock.advance(600);

	assert!(h.widget.intro_visible());

	h.clock.advance(10_000);

	assert!(!h.widget.intro_visible());
}

#[tokio::test]
async fn opening_dismisses_the_intro_for_good() {
	let store = MemoryStore::new();
	let h = harness_with(store, Script::default(), WidgetOptions::default(), PageContext::default());

	h.clock.advance(1_000);

	assert!(h.widget.intro_visible());

	h.widget.open();

	assert!(h.widget.is_open());
	assert!(!h.widget.intro_visible());
}

#[tokio::test]
async fn persisted_dismissal_suppresses_the_intro() {
	let store = MemoryStore::new();

	store.set(INTRO_KEY, "1").expect("set");

	let h = harness_with(store, Script::default(), WidgetOptions::default(), PageContext::default());

	h.clock.advance(1_000);

	assert!(!h.widget.intro_visible());
}

#[tokio::test]
async fn clearing_resets_the_intro_hint() {
	let h = harness();

	h.clock.advance(1_000);

	assert!(h.widget.intro_visible());

	h.widget.clear();

	assert!(!h.widget.intro_visible());
}
