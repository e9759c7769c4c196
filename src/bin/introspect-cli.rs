use clap::{Parser, Subcommand};
use serde_json::Value;

use ipamd_introspect::http::routes::{
    ENIS_PATH, ENI_CONFIGS_PATH, IPAMD_ENV_PATH, METRICS_PATH, NETWORKUTILS_ENV_PATH, PODS_PATH,
    ROOT_PATH,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "introspect-cli")]
#[command(about = "Query a running ipamd introspection endpoint", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:61678")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available data routes
    Commands,
    /// ENI inventory with per-address assignment
    Enis,
    /// Pod to address bindings
    Pods,
    /// Network utility settings read from the environment
    NetworkutilsEnv,
    /// Address manager settings read from the environment
    IpamdEnv,
    /// ENIConfig resources known to the node
    EniConfigs,
    /// Raw Prometheus exposition
    Metrics,
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Commands => ROOT_PATH,
            Commands::Enis => ENIS_PATH,
            Commands::Pods => PODS_PATH,
            Commands::NetworkutilsEnv => NETWORKUTILS_ENV_PATH,
            Commands::IpamdEnv => IPAMD_ENV_PATH,
            Commands::EniConfigs => ENI_CONFIGS_PATH,
            Commands::Metrics => METRICS_PATH,
        }
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path()))
        .send()
        .await?;

    match cli.command {
        Commands::Metrics => print_text(res).await?,
        _ => print_json(res).await?,
    }

    Ok(())
}

/// Non-2xx answers become an error so the process exits non-zero.
async fn check_status(res: reqwest::Response) -> CliResult<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if let Ok(text) = res.text().await {
        eprintln!("Response: {}", text);
    }
    Err(format!("introspection endpoint returned status {}", status).into())
}

async fn print_json(res: reqwest::Response) -> CliResult<()> {
    let json: Value = check_status(res).await?.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_text(res: reqwest::Response) -> CliResult<()> {
    print!("{}", check_status(res).await?.text().await?);
    Ok(())
}
