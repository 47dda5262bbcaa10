use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "fault-cli")]
#[command(about = "Management CLI for the fault sandbox", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3500")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every registered fault and whether it is active
    Status,
    /// List active faults
    Active,
    /// Start a fault (cpu, latency, redis_latency)
    Start {
        name: String,
        /// Duration or delay in milliseconds; the server default when omitted
        #[arg(short, long)]
        duration: Option<i64>,
    },
    /// Stop a fault
    Stop { name: String },
    /// Stop every active fault
    StopAll,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/faults", base)).send().await?,
        Commands::Active => client.get(format!("{}/faults/active", base)).send().await?,
        Commands::Start { name, duration } => {
            client
                .post(format!("{}/faults/{}/start", base, name))
                .json(&json!({ "duration_ms": duration }))
                .send()
                .await?
        }
        Commands::Stop { name } => {
            client
                .post(format!("{}/faults/{}/stop", base, name))
                .send()
                .await?
        }
        Commands::StopAll => client.post(format!("{}/faults/stop-all", base)).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: fault API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
