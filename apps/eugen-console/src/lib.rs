//! Terminal front-end for the EUGEN widget core. Talks to a running chat proxy.

pub mod command;
pub mod render;

use std::{
	io::{self, Write},
	path::PathBuf,
	sync::Arc,
};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use eugen_domain::{ChatMessage, PageContext, ProductHit, Role, Route, suggestions};
use eugen_widget::{
	ChatWidget, FileStore, HttpTransport, KeyValueStore, MemoryStore, Notice, NoticeLevel,
	Notifier, SendOutcome, SystemClock, WidgetOptions,
};

use crate::command::Command;

#[derive(Debug, Parser)]
#[command(
	version = eugen_cli::VERSION,
	rename_all = "kebab",
	styles = eugen_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	/// Page the widget pretends to be mounted on.
	#[arg(long, default_value = "home")]
	pub route: Route,
	#[arg(long)]
	pub category: Option<String>,
	#[arg(long)]
	pub product_id: Option<String>,
	#[arg(long)]
	pub product_name: Option<String>,
	#[arg(long)]
	pub cart_total: Option<f64>,
	#[arg(long)]
	pub query: Option<String>,
}
impl Args {
	pub fn page_context(&self) -> PageContext {
		PageContext {
			route: self.route,
			category: self.category.clone(),
			product_id: self.product_id.clone(),
			product_name: self.product_name.clone(),
			cart_total: self.cart_total,
			query: self.query.clone(),
		}
	}
}

struct ConsoleNotifier;
impl Notifier for ConsoleNotifier {
	fn notify(&self, notice: Notice) {
		match notice.level {
			NoticeLevel::Info => println!("* {}", notice.text),
			NoticeLevel::Error => eprintln!("! {}", notice.text),
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = eugen_config::load_or_default(args.config.as_deref())?;
	eugen_cli::init_tracing(&config.service.log_level);
	let transport = HttpTransport::new(&config.widget)?;
	let options = WidgetOptions::from(&config.widget);
	let page = args.page_context();
	tracing::info!(
		endpoint = %config.widget.chat_url(),
		route = page.route.as_str(),
		"Console starting."
	);

	match &config.widget.storage_path {
		Some(path) => {
			let store = FileStore::new(path);
			drive(ChatWidget::new(
				transport,
				store,
				Arc::new(SystemClock),
				Arc::new(ConsoleNotifier),
				options,
				page,
			))
			.await
		},
		None => {
			drive(ChatWidget::new(
				transport,
				MemoryStore::new(),
				Arc::new(SystemClock),
				Arc::new(ConsoleNotifier),
				options,
				page,
			))
			.await
		},
	}
}

async fn drive<S>(widget: ChatWidget<HttpTransport, S>) -> color_eyre::Result<()>
where
	S: KeyValueStore + 'static,
{
	let widget = Arc::new(widget);
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut intro_shown = false;

	println!("[{}]  /help for commands", widget.fab_label());

	for message in widget.messages() {
		println!("{}", render::message(&message));
	}

	loop {
		if !intro_shown && widget.intro_visible() {
			println!("{}", render::INTRO_HINT);

			intro_shown = true;
		}
		if widget.suggestions_visible() {
			println!("{}", render::suggestions(&widget.suggestions()));
		}

		print!("> ");
		io::stdout().flush()?;

		let Some(line) = lines.next_line().await? else {
			break;
		};
		let Some(command) = command::parse(&line) else {
			continue;
		};
		let text = match command {
			Command::Say(text) => text,
			Command::Pick(index) => match pick_suggestion(&widget, index) {
				Some(text) => text,
				None => line.trim().to_string(),
			},
			Command::Compare(index) => match latest_card(&widget.messages(), index) {
				Some(hit) => suggestions::compare_prompt(&hit),
				None => {
					eprintln!("! No product card {index}.");

					continue;
				},
			},
			Command::Why(index) => match latest_card(&widget.messages(), index) {
				Some(hit) => suggestions::why_prompt(&hit),
				None => {
					eprintln!("! No product card {index}.");

					continue;
				},
			},
			Command::Open => {
				widget.open();

				continue;
			},
			Command::Close => {
				widget.close();

				continue;
			},
			Command::Dismiss => {
				widget.dismiss_intro();

				continue;
			},
			Command::Clear => {
				widget.clear();

				continue;
			},
			Command::Help => {
				println!("{}", command::HELP);

				continue;
			},
			Command::Quit => break,
			Command::Unknown(raw) => {
				eprintln!("! Unknown command {raw}. Try /help.");

				continue;
			},
		};

		if !widget.is_open() {
			widget.open();
		}

		if let SendOutcome::Answered(reply) = converse(&widget, text).await? {
			println!("{}", render::message(&reply));
		}
	}

	Ok(())
}

/// Runs one turn. Ctrl-C while waiting closes the panel, which aborts the turn.
async fn converse<S>(
	widget: &Arc<ChatWidget<HttpTransport, S>>,
	text: String,
) -> color_eyre::Result<SendOutcome>
where
	S: KeyValueStore + 'static,
{
	let mut turn = {
		let widget = Arc::clone(widget);

		tokio::spawn(async move { widget.send(&text).await })
	};

	tokio::select! {
		outcome = &mut turn => Ok(outcome?),
		_ = tokio::signal::ctrl_c() => {
			widget.close();
			println!("* Closed. Request cancelled.");

			Ok(turn.await?)
		},
	}
}

fn pick_suggestion<S>(widget: &ChatWidget<HttpTransport, S>, index: usize) -> Option<String>
where
	S: KeyValueStore + 'static,
{
	if !widget.suggestions_visible() {
		return None;
	}

	widget.suggestions().into_iter().nth(index.checked_sub(1)?)
}

/// Cards of the newest assistant message that has any.
fn latest_card(messages: &[ChatMessage], index: usize) -> Option<ProductHit> {
	messages
		.iter()
		.rev()
		.filter(|message| message.role == Role::Assistant)
		.find(|message| !message.products().is_empty())
		.and_then(|message| message.products().get(index.checked_sub(1)?))
		.cloned()
}
