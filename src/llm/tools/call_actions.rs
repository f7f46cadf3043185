use super::{ToolError, ToolResult};
use serde::Deserialize;
use serde_json::Value;
use strum::{Display, EnumString};
use tokio_util::sync::CancellationToken;

pub const END_CALL: &str = "end_call";
pub const SEND_INFO: &str = "send_info";
pub const SCHEDULE_DEMO: &str = "schedule_demo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InfoChannel {
    Whatsapp,
    Email,
}

impl InfoChannel {
    fn spoken(&self) -> &'static str {
        match self {
            InfoChannel::Whatsapp => "WhatsApp",
            InfoChannel::Email => "email",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendInfoArgs {
    pub channel: InfoChannel,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleDemoArgs {
    #[serde(default)]
    pub preferred_time: Option<String>,
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: Value) -> Result<T, ToolError> {
    // Models send `null` for argument-less calls
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidParameters(e.to_string()))
}

/// End the call when the conversation is complete
pub async fn end_call(
    _arguments: Value,
    room: &str,
    cancel_token: CancellationToken,
) -> Result<ToolResult, ToolError> {
    if cancel_token.is_cancelled() {
        return Err(ToolError::Cancelled);
    }

    log::info!(room = room; "Call ended by agent");
    Ok(ToolResult::Success("Goodbye! Have a great day.".to_string()))
}

/// Offer to send more information over WhatsApp or email.
/// Nothing is sent; the model only gets a confirmation to read out.
pub async fn send_info(
    arguments: Value,
    room: &str,
    cancel_token: CancellationToken,
) -> Result<ToolResult, ToolError> {
    if cancel_token.is_cancelled() {
        return Err(ToolError::Cancelled);
    }

    let args: SendInfoArgs = parse_args(arguments)?;

    log::info!(room = room; "Info requested via {}", args.channel);
    Ok(ToolResult::Success(format!(
        "Great, I'll send the details to you on {} right after this call.",
        args.channel.spoken()
    )))
}

/// Schedule a product demo. No calendar entry is created.
pub async fn schedule_demo(
    arguments: Value,
    room: &str,
    cancel_token: CancellationToken,
) -> Result<ToolResult, ToolError> {
    if cancel_token.is_cancelled() {
        return Err(ToolError::Cancelled);
    }

    let args: ScheduleDemoArgs = parse_args(arguments)?;
    let preferred_time = args
        .preferred_time
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let response = match preferred_time {
        Some(time) => {
            log::info!(room = room; "Demo requested for {}", time);
            format!(
                "Perfect, I've noted a demo for {}. You'll receive a confirmation shortly.",
                time
            )
        }
        None => {
            log::info!(room = room; "Demo requested without a preferred time");
            "Perfect, I've noted your interest in a demo. Our team will reach out to find a time that works for you.".to_string()
        }
    };

    Ok(ToolResult::Success(response))
}
