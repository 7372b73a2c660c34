use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = eugen_proxy::Args::parse();
	eugen_proxy::run(args).await
}
