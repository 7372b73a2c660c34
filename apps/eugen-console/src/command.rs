/// One line of console input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	Say(String),
	/// 1-based index into the visible suggestions.
	Pick(usize),
	/// 1-based index into the latest product cards.
	Compare(usize),
	Why(usize),
	Open,
	Close,
	Dismiss,
	Clear,
	Help,
	Quit,
	Unknown(String),
}

pub const HELP: &str = "\
Type a question and press enter.
  <n>            ask suggestion n
  /compare <n>   compare card n with a cheaper option
  /why <n>       ask why card n was picked
  /open /close   show or hide the panel
  /dismiss       hide the intro hint for good
  /clear         forget this conversation
  /quit          leave";

/// `None` for blank lines.
pub fn parse(line: &str) -> Option<Command> {
	let line = line.trim();

	if line.is_empty() {
		return None;
	}

	let Some(rest) = line.strip_prefix('/') else {
		return Some(match line.parse::<usize>() {
			Ok(index) if index > 0 => Command::Pick(index),
			_ => Command::Say(line.to_string()),
		});
	};
	let (name, arg) = match rest.split_once(char::is_whitespace) {
		Some((name, arg)) => (name, arg.trim()),
		None => (rest, ""),
	};
	let card = arg.parse::<usize>().ok().filter(|index| *index > 0);
	let command = match (name, arg.is_empty(), card) {
		("open", true, _) => Command::Open,
		("close", true, _) => Command::Close,
		("dismiss", true, _) => Command::Dismiss,
		("clear", true, _) => Command::Clear,
		("help", true, _) => Command::Help,
		("quit" | "exit", true, _) => Command::Quit,
		("compare", _, Some(index)) => Command::Compare(index),
		("why", _, Some(index)) => Command::Why(index),
		_ => Command::Unknown(line.to_string()),
	};

	Some(command)
}
