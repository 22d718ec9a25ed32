mod analysis;
mod auth;
mod client;
mod config;
mod credentials;
mod errors;
mod paths;
mod session;
mod session_machine;
mod storage;
mod structured_logger;
mod subscription;

use analysis::{Analyzer, HttpAnalyzer, MockAnalyzer, UploadedImage};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{AuthOutcome, Client};
use config::AppConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use storage::FileStore;
use structured_logger::StructuredLogger;
use subscription::PlanTier;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "visage")]
#[command(about = "Facial analysis client: accounts, subscription plans, and style recommendations")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new account and sign in
    Signup {
        name: String,
        email: String,
        password: String,
    },
    /// Sign in to an existing account
    Login { email: String, password: String },
    /// Sign out and clear the persisted session
    Logout,
    /// Show session and subscription state
    Status,
    /// List available subscription plans
    Plans,
    /// Switch subscription plan (free, pro, enterprise)
    Plan { tier: String },
    /// Analyze a face image and print recommendations
    Analyze { path: PathBuf },
    /// Restore the full quota for the current plan
    ResetQuota,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let store = Arc::new(FileStore::open(&paths::store_path()?)?);
    let client_id = uuid::Uuid::new_v4().simple().to_string();
    let logger = Arc::new(StructuredLogger::new(&client_id, &paths::logs_dir()?)?);
    let analyzer: Box<dyn Analyzer> = if config.use_mock_api {
        Box::new(MockAnalyzer)
    } else {
        Box::new(HttpAnalyzer::new(&config.api_base_url)?)
    };
    let mut client = Client::new(&config, store, analyzer, logger)?;

    match cli.command {
        Command::Signup {
            name,
            email,
            password,
        } => {
            let outcome = client.signup(&name, &email, &password).await?;
            finish_auth(&mut client, outcome)?;
        }
        Command::Login { email, password } => {
            let outcome = client.login(&email, &password).await?;
            finish_auth(&mut client, outcome)?;
        }
        Command::Logout => {
            client.logout()?;
            println!("Signed out.");
        }
        Command::Status => print_status(&client),
        Command::Plans => print_plans(&client),
        Command::Plan { tier } => {
            let tier = PlanTier::from_str(&tier)?;
            client.change_plan(tier)?;
            println!(
                "Switched to the {} plan: {} analyses remaining.",
                tier.label(),
                client.subscription().remaining()
            );
        }
        Command::Analyze { path } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read image: {}", path.display()))?;
            let image = UploadedImage::from_bytes(bytes)?;
            println!(
                "Analyzing {} ({})...",
                path.display(),
                image.format().mime()
            );
            let outcome = client.request_analysis(&image).await?;
            print_analysis(&outcome);
            println!();
            println!(
                "Analyses remaining: {}",
                client.subscription().remaining()
            );
        }
        Command::ResetQuota => {
            client.reset_monthly()?;
            println!(
                "Quota restored: {} analyses remaining.",
                client.subscription().remaining()
            );
        }
    }

    Ok(())
}

fn finish_auth(client: &mut Client, outcome: AuthOutcome) -> Result<()> {
    match outcome {
        AuthOutcome::SignedIn(identity) => {
            println!("Signed in as {} <{}>.", identity.name, identity.email);
            Ok(())
        }
        AuthOutcome::Rejected(err) => {
            eprintln!("Error: {}", err);
            // Printing the rejection acknowledges it.
            client.clear_error()?;
            std::process::exit(1);
        }
    }
}

fn print_status(client: &Client) {
    let snapshot = client.snapshot();
    match snapshot.identity {
        Some(identity) => println!("Signed in as {} <{}>.", identity.name, identity.email),
        None => println!("Signed out."),
    }
    if let Some(error) = snapshot.last_error {
        println!("Last error: {}", error);
    }

    let subscription = client.subscription();
    println!(
        "Plan: {} ({} of {} analyses remaining)",
        subscription.tier().label(),
        subscription.remaining(),
        subscription.ceiling()
    );
    println!("Backend: {}", client.backend_name());
}

fn print_plans(client: &Client) {
    let current = client.subscription().tier();
    for tier in PlanTier::all() {
        let marker = if *tier == current { "*" } else { " " };
        println!(
            "{} {} ({}/month, {} analyses)",
            marker,
            tier.label(),
            tier.price(),
            tier.ceiling()
        );
        for feature in tier.features() {
            println!("      - {}", feature);
        }
    }
}

fn print_analysis(outcome: &analysis::AnalysisOutcome) {
    println!("Face shape: {}", outcome.face_shape);
    println!("Eye type:   {}", outcome.eye_type);
    println!("Lip shape:  {}", outcome.lip_shape);
    println!("Skin tone:  {}", outcome.skin_tone);
    println!();
    println!("Recommendations:");
    println!("  Lipstick:    {}", outcome.recommendations.lipstick);
    println!("  Eyeshadow:   {}", outcome.recommendations.eyeshadow);
    println!("  Blush:       {}", outcome.recommendations.blush);
    println!("  Accessories: {}", outcome.recommendations.accessories);
}
