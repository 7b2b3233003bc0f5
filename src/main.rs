use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use comicdex::catalog::{MarvelClient, RequestSigner};
use comicdex::core::config;
use comicdex::core::repository::CatalogRepository;
use comicdex::core::state::App;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "comicdex", about = "Browse the Marvel character catalog")]
struct Args {
    /// Catalog API base URL (overrides MARVEL_BASE_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to comicdex.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("comicdex.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config()?;
    let resolved = config::resolve(&file_config, args.base_url.as_deref());
    log::info!("Comicdex starting up with {:?}", resolved);

    let (public_key, private_key) = resolved.credentials()?;
    let client = MarvelClient::new(
        RequestSigner::new(public_key, private_key),
        Some(resolved.base_url.clone()),
        resolved.timeout,
    )?;
    let repository =
        CatalogRepository::with_chunk_size(Arc::new(client), resolved.section_chunk_size);

    comicdex::shell::run(App::new(repository, resolved.page_size)).await?;
    Ok(())
}
