use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::*;
use domain::gateway::matching::MatchingClient;
use domain::matching::{KtasGrade, StartMatchingRequest};
use domain::reconciler::SessionOutcome;
use log::*;
use service::config::Config;
use service::logging::Logger;
use sse::{EventSourceTransport, Manager};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

mod output;

use output::Renderer;

#[derive(Parser)]
#[command(name = "hospital_match")]
#[command(version, about = "Emergency hospital matching client")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a patient for matching and follow the hospital calls live
    Start(StartArgs),
    /// Follow the status stream of an existing matching session
    Watch(WatchArgs),
}

#[derive(Args)]
struct StartArgs {
    /// Patient age (free text, e.g. "45" or "80s")
    #[arg(long)]
    age: String,

    /// Patient sex
    #[arg(long)]
    sex: String,

    /// Complaint category (e.g. cardiac, trauma)
    #[arg(long)]
    category: String,

    /// Main symptom
    #[arg(long)]
    symptom: String,

    /// Additional remarks for the receiving hospital
    #[arg(long, default_value = "")]
    remarks: String,

    /// KTAS grade, 1 (most urgent) to 5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    grade: u8,

    /// Patient latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Patient longitude
    #[arg(long, allow_negative_numbers = true)]
    lng: f64,

    /// Print the session channel and exit instead of following it
    #[arg(long)]
    no_follow: bool,

    #[command(flatten)]
    follow: FollowArgs,
}

#[derive(Args)]
struct WatchArgs {
    /// Channel returned when the matching session was started
    #[arg(long)]
    channel: String,

    #[command(flatten)]
    follow: FollowArgs,
}

#[derive(Args)]
struct FollowArgs {
    /// Stop following after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    Logger::init_logger(&cli.config)?;

    let succeeded = match cli.command {
        Command::Start(args) => start(&cli.config, args).await,
        Command::Watch(args) => follow(&cli.config, &args.channel, &args.follow).await,
    };

    match succeeded {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{e:#}");
            println!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

async fn start(config: &Config, args: StartArgs) -> Result<bool> {
    let request = StartMatchingRequest {
        age: args.age,
        sex: args.sex,
        category: args.category,
        symptom: args.symptom,
        remarks: args.remarks,
        grade: KtasGrade::try_from(args.grade)?,
        lat: args.lat,
        lng: args.lng,
    };

    let client = MatchingClient::new(config)?;

    println!(
        "{} Requesting hospital matching ({})...",
        "→".blue(),
        request.grade
    );
    let response = client.start_matching(&request).await?;
    output::print_session_started(&response);

    if args.no_follow {
        return Ok(true);
    }

    follow(config, &response.channel, &args.follow).await
}

/// Follow `channel` until the session settles, the timeout passes, or Ctrl-C.
/// Returns whether a hospital accepted the patient.
async fn follow(config: &Config, channel: &str, args: &FollowArgs) -> Result<bool> {
    let mut manager = Manager::new(Arc::new(EventSourceTransport::new(config)));
    let mut updates = manager.subscribe();

    println!("{} Following channel {}...", "→".blue(), channel.bold());
    manager.set_channel(Some(channel))?;

    let deadline = args
        .timeout_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut renderer = Renderer::default();

    let last = loop {
        let snapshot = updates.borrow_and_update().clone();
        renderer.render(&snapshot);

        if snapshot.state.outcome().is_final() {
            break snapshot;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break snapshot;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n{} Interrupted", "!".yellow());
                break snapshot;
            }
            _ = wait_until(deadline) => {
                println!("\n{} Stopped following after timeout", "!".yellow());
                break snapshot;
            }
        }
    };

    manager.close();
    output::print_summary(&last.state);

    Ok(last.state.outcome() == SessionOutcome::Matched)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn watch_command_parses_global_config() {
        let cli = Cli::try_parse_from([
            "hospital_match",
            "--api-url",
            "http://localhost:8080/",
            "watch",
            "--channel",
            "patient-7",
            "--timeout-secs",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.config.api_base_url(), "http://localhost:8080");
        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.channel, "patient-7");
                assert_eq!(args.follow.timeout_secs, Some(30));
            }
            Command::Start(_) => panic!("expected watch command"),
        }
    }

    #[test]
    fn start_command_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "hospital_match",
            "--api-url",
            "http://localhost",
            "start",
            "--age",
            "30",
            "--sex",
            "female",
            "--category",
            "trauma",
            "--symptom",
            "fracture",
            "--grade",
            "3",
            "--lat",
            "-33.86",
            "--lng",
            "151.2",
            "--no-follow",
        ])
        .unwrap();

        match cli.command {
            Command::Start(args) => {
                assert_eq!(args.lat, -33.86);
                assert_eq!(args.grade, 3);
                assert!(args.no_follow);
                assert_eq!(args.remarks, "");
            }
            Command::Watch(_) => panic!("expected start command"),
        }
    }

    #[test]
    fn start_command_rejects_out_of_range_grade() {
        let result = Cli::try_parse_from([
            "hospital_match",
            "--api-url",
            "http://localhost",
            "start",
            "--age",
            "30",
            "--sex",
            "male",
            "--category",
            "trauma",
            "--symptom",
            "fracture",
            "--grade",
            "6",
            "--lat",
            "37.5",
            "--lng",
            "127.0",
        ]);

        assert!(result.is_err());
    }
}
