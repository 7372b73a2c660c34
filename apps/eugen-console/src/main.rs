use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = eugen_console::Args::parse();
	eugen_console::run(args).await
}
