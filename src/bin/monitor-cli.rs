use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "monitor-cli")]
#[command(about = "Query a running taskflow-monitor instance", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// API key, when the instance requires one.
    #[arg(short, long, env = "TASKFLOW_MONITOR_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 24 hour dashboard summary
    Dashboard,
    /// Raw events in a trailing window
    Metrics {
        /// e.g. 300, 15m, 1h, 7d
        #[arg(short, long)]
        window: Option<String>,
    },
    /// Active alerts
    Alerts,
    /// Liveness summary
    Health,
    /// Individual health check results
    Checks {
        /// Re-run every check instead of reading the cached result
        #[arg(short, long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let base = cli.url.trim_end_matches('/');
    let request = match &cli.command {
        Commands::Dashboard => client.get(format!("{}/monitoring/dashboard", base)),
        Commands::Metrics { window } => {
            let request = client.get(format!("{}/monitoring/api/metrics", base));
            match window {
                Some(window) => request.query(&[("window", window)]),
                None => request,
            }
        }
        Commands::Alerts => client.get(format!("{}/monitoring/api/alerts", base)),
        Commands::Health => client.get(format!("{}/monitoring/health", base)),
        Commands::Checks { refresh } => client
            .get(format!("{}/monitoring/api/health/checks", base))
            .query(&[("refresh", refresh)]),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: monitoring API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
