use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "switchman-cli")]
#[command(about = "Management CLI for the switchman gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key or session token, when the gateway requires one.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List active endpoints
    Endpoints,
    /// Print the routing configuration file
    GetConfig,
    /// Replace the routing configuration
    PutConfig { file: PathBuf },
    /// Check a routing configuration without applying it
    Verify { file: PathBuf },
    /// Sign in and print a session token
    Login { login: String, password: String },
    /// List admin users
    Users,
    /// Create an admin user
    AddUser { login: String, password: String },
    /// Delete an admin user by id
    DeleteUser { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/status", cli.url)).headers(headers).send().await?;
            print_json(res).await?;
        }
        Commands::Endpoints => {
            let res = client.get(format!("{}/endpoints", cli.url)).headers(headers).send().await?;
            print_json(res).await?;
        }
        Commands::GetConfig => {
            let res = client.get(format!("{}/config", cli.url)).headers(headers).send().await?;
            print_text(res).await?;
        }
        Commands::PutConfig { file } => {
            let body = tokio::fs::read(&file).await?;
            let res = client
                .post(format!("{}/config", cli.url))
                .headers(headers)
                .body(body)
                .send()
                .await?;
            print_text(res).await?;
        }
        Commands::Verify { file } => {
            let body = tokio::fs::read(&file).await?;
            let res = client
                .post(format!("{}/verify", cli.url))
                .headers(headers)
                .body(body)
                .send()
                .await?;
            if res.status().is_success() {
                println!("{}: configuration is valid", file.display());
            } else {
                print_text(res).await?;
            }
        }
        Commands::Login { login, password } => {
            let res = client
                .post(format!("{}/login", cli.url))
                .json(&serde_json::json!({ "login": login, "password": password }))
                .send()
                .await?;
            if !res.status().is_success() {
                return report_error(res).await;
            }
            let json: Value = res.json().await?;
            println!("{}", json["token"].as_str().unwrap_or_default());
        }
        Commands::Users => {
            let res = client.get(format!("{}/users", cli.url)).headers(headers).send().await?;
            print_json(res).await?;
        }
        Commands::AddUser { login, password } => {
            let res = client
                .post(format!("{}/users", cli.url))
                .headers(headers)
                .json(&serde_json::json!({ "login": login, "password": password }))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::DeleteUser { id } => {
            let res = client
                .delete(format!("{}/users/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?;
            if res.status().is_success() {
                println!("User {} deleted", id);
            } else {
                report_error(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if !res.status().is_success() {
        return report_error(res).await;
    }
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if !res.status().is_success() {
        return report_error(res).await;
    }
    print!("{}", res.text().await?);
    Ok(())
}

async fn report_error(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Error: Admin API returned status {}", res.status());
    if let Ok(text) = res.text().await {
        eprintln!("Response: {}", text);
    }
    Ok(())
}
