//! Initiate an outbound call via LiveKit SIP.
//! Dispatches the agent and dials the given phone number.

use anyhow::{Context, Result};
use clap::Parser;

use outbound_caller::config::{
    load_credentials, DialerConfig, DEFAULT_CALLER_NAME, DEFAULT_CALL_PURPOSE,
    DEFAULT_COMPANY_NAME,
};
use outbound_caller::dialer::{make_outbound_call, CallRequest};
use outbound_caller::livekit::LiveKitApi;
use outbound_caller::metadata::CallMetadata;

#[derive(Parser, Debug)]
#[command(author, version, about = "Make outbound call via LiveKit", long_about = None)]
struct Args {
    /// Phone number (E.164 format)
    phone_number: String,

    /// Caller name
    #[arg(long, env = "DEFAULT_CALLER_NAME", default_value = DEFAULT_CALLER_NAME)]
    caller: String,

    /// Company name
    #[arg(long, env = "DEFAULT_COMPANY_NAME", default_value = DEFAULT_COMPANY_NAME)]
    company: String,

    /// Call purpose
    #[arg(long, env = "DEFAULT_CALL_PURPOSE", default_value = DEFAULT_CALL_PURPOSE)]
    purpose: String,
}

impl Args {
    fn into_request(self) -> CallRequest {
        CallRequest {
            phone_number: self.phone_number,
            metadata: CallMetadata::new(self.caller, self.company, self.purpose),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let request = Args::parse().into_request();
    let config = DialerConfig::load();

    let credentials = load_credentials().context("Failed to load LiveKit credentials")?;
    let api = LiveKitApi::new(&credentials);

    let outcome = make_outbound_call(&api, &config, &request).await?;
    println!(
        "📞 Calling {} in room {} (dispatch {}, SIP call {})",
        outbound_caller::dialer::mask_phone(&request.phone_number),
        outcome.room_name,
        outcome.dispatch_id,
        outcome.sip_call_id
    );

    Ok(())
}
