use anyhow::Result;
use hansik::{
    cli::{Cli, Commands},
    day::DayToken,
    web,
};

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env is fine, everything can come from args or the real environment
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();
    cli.init_logger()?;

    match cli.command {
        Commands::Serve { listen, fetch } => web::api::serve(fetch.hansik()?, &listen).await,
        Commands::Scrape { day, fetch } => {
            let res = fetch.hansik()?.menu(DayToken::parse(day.as_deref())).await;
            println!("{}", serde_json::to_string_pretty(&res)?);
            Ok(())
        }
    }
}
