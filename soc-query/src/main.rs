use clap::Parser;
use std::env;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use soc_query::{AppError, Settings};
use soc_query_repository::SocQueryClient;
use soc_query_shared::{QueryRequest, SortClause, DEFAULT_SIZE};

#[derive(Parser)]
#[command(name = "soc-query")]
#[command(about = "Run a query-string search against a Security Onion cluster", long_about = None)]
struct Cli {
    /// Query-string expression, e.g. `event.module:zeek AND destination.port:53`
    query: String,

    /// Maximum number of hits to return
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: u32,

    /// Index or index pattern (overrides SO_DEFAULT_INDEX)
    #[arg(long)]
    index: Option<String>,

    /// Sort clause as `field[:asc|desc]`; may be repeated
    #[arg(long = "sort")]
    sort: Vec<SortClause>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Settings::from_env()?;
    let client = SocQueryClient::new(config);

    let mut request = QueryRequest::new(cli.query).with_size(cli.size);
    if let Some(index) = cli.index {
        request = request.with_index(index);
    }
    if !cli.sort.is_empty() {
        request = request.with_sort(cli.sort);
    }

    let response = client.execute_query(&request).await?;

    let output = if cli.compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };
    println!("{}", output);

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "soc-query failed");
            if let Some(hint) = e.hint() {
                warn!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}
