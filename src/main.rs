use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use outbound_caller::config::{load_credentials, AgentSettings};
use outbound_caller::livekit::{ControlPlane, LiveKitApi, Room};
use outbound_caller::session::{AgentSession, ConsoleSessionFactory};
use outbound_caller::vad::VADConfig;
use outbound_caller::worker::{prewarm, AgentServer};

#[derive(Parser, Debug)]
#[command(author, version, about = "Outbound call agent worker", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join an existing room, reading its metadata from the LiveKit server
    Connect {
        /// Name of the room to join
        #[arg(long)]
        room: String,
    },
    /// Run the agent locally with the given metadata, without a server
    Console {
        /// Room name to report in logs
        #[arg(long, default_value = "console")]
        room: String,

        /// Room metadata as JSON
        #[arg(long, default_value = "")]
        metadata: String,
    },
}

fn log_session_finished(session: &dyn AgentSession) {
    if let Some(agent) = session.agent() {
        log::info!(
            room = agent.room();
            "Session finished for {} from {}",
            agent.caller_name(),
            agent.company_name()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("🚀 Starting outbound agent with args: {:?}", args);

    let settings = AgentSettings::load().context("Failed to load agent settings")?;
    let server = AgentServer::setup(
        || prewarm(VADConfig::default()),
        settings,
        Box::new(ConsoleSessionFactory),
    )
    .context("Failed to prewarm worker")?;

    match args.command {
        Command::Connect { room } => {
            let credentials = load_credentials().context("Failed to load LiveKit credentials")?;
            let api = LiveKitApi::new(&credentials);

            let result = server.connect(&api, &room).await;
            api.close().await;
            let session = result.with_context(|| format!("Agent failed in room {}", room))?;
            log_session_finished(session.as_ref());
        }
        Command::Console { room, metadata } => {
            let session = server
                .run_job(Room::new(room, metadata))
                .await
                .context("Agent failed in console session")?;
            log_session_finished(session.as_ref());
        }
    }

    Ok(())
}
