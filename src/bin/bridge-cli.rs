use clap::{Parser, Subcommand};
use reqwest::Url;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "bridge-cli")]
#[command(about = "Command-line client for the fabric asset bridge", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000", env = "BRIDGE_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an asset (CreateAsset)
    Create {
        id: String,
        /// Asset value; parsed as JSON when possible, sent as a string otherwise
        value: String,
    },
    /// Read one asset (ReadAsset)
    Read { id: String },
    /// List all assets (GetAllAssets)
    List,
    /// Check that the bridge is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = Url::parse(&cli.url)?;

    let res = match cli.command {
        Commands::Create { id, value } => {
            let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            client
                .post(endpoint(&base, &["assets"])?)
                .json(&serde_json::json!({ "id": id, "value": value }))
                .send()
                .await?
        }
        Commands::Read { id } => client.get(endpoint(&base, &["assets", &id])?).send().await?,
        Commands::List => client.get(endpoint(&base, &["assets"])?).send().await?,
        Commands::Health => client.get(endpoint(&base, &["health"])?).send().await?,
    };

    print_response(res).await
}

/// `base` with percent-encoded path segments appended.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, String> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| format!("bridge URL cannot take a path: {}", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: bridge returned status {}", status);
        eprintln!("Response: {}", text);
        std::process::exit(1);
    }

    // Ledger payloads are usually JSON; print them pretty when they are.
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
