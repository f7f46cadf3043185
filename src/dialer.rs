//! Outbound call initiation.
//!
//! Dispatches the agent into a fresh room, then has the SIP trunk dial the
//! destination into that same room. One attempt per call, no retries.

use crate::config::DialerConfig;
use crate::error::{CallError, Result};
use crate::livekit::{ControlPlane, CreateAgentDispatchRequest, CreateSipParticipantRequest};
use crate::metadata::CallMetadata;

/// Identity the dialed phone joins the room with
pub const PHONE_PARTICIPANT_IDENTITY: &str = "phone_user";

/// A call to place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Destination in E.164 format, e.g. `+919988536242`
    pub phone_number: String,
    pub metadata: CallMetadata,
}

/// What the platform returned for a placed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub room_name: String,
    pub dispatch_id: String,
    pub sip_call_id: String,
    pub participant_identity: String,
}

fn last_four(phone_number: &str) -> &str {
    let count = phone_number.chars().count();
    match phone_number.char_indices().nth(count.saturating_sub(4)) {
        Some((idx, _)) => &phone_number[idx..],
        None => phone_number,
    }
}

/// Room name for a call: `call-{last four digits}-{unix seconds}`
pub fn room_name(phone_number: &str, timestamp: i64) -> String {
    format!("call-{}-{}", last_four(phone_number), timestamp)
}

/// Phone number with everything but the last four digits hidden
pub fn mask_phone(phone_number: &str) -> String {
    format!("***{}", last_four(phone_number))
}

/// Place an outbound call, closing `api` whether or not it succeeds
pub async fn make_outbound_call<A>(
    api: &A,
    config: &DialerConfig,
    request: &CallRequest,
) -> Result<CallOutcome>
where
    A: ControlPlane + ?Sized,
{
    let room = room_name(&request.phone_number, chrono::Utc::now().timestamp());
    let result = place_call(api, config, request, room).await;

    if let Err(e) = &result {
        log::error!(
            "Call failed for {}: {}",
            mask_phone(&request.phone_number),
            e
        );
    }

    api.close().await;
    result
}

async fn place_call<A>(
    api: &A,
    config: &DialerConfig,
    request: &CallRequest,
    room_name: String,
) -> Result<CallOutcome>
where
    A: ControlPlane + ?Sized,
{
    let trunk_id = config.trunk_id().map_err(CallError::Config)?;

    log::info!(
        "Starting call: {} from {}",
        request.metadata.caller_name,
        request.metadata.company_name
    );

    let dispatch = api
        .create_dispatch(CreateAgentDispatchRequest {
            agent_name: config.agent_name.clone(),
            room: room_name.clone(),
            metadata: request.metadata.to_json(),
            ..Default::default()
        })
        .await?;
    log::info!("Agent dispatched: {}", dispatch.id);

    let masked = mask_phone(&request.phone_number);
    log::info!("Dialing {}...", masked);

    let participant = api
        .create_sip_participant(CreateSipParticipantRequest {
            sip_trunk_id: trunk_id.to_string(),
            sip_call_to: request.phone_number.clone(),
            room_name: room_name.clone(),
            participant_identity: PHONE_PARTICIPANT_IDENTITY.to_string(),
            ..Default::default()
        })
        .await?;
    log::info!("Call initiated: {}", participant.sip_call_id);

    Ok(CallOutcome {
        room_name,
        dispatch_id: dispatch.id,
        sip_call_id: participant.sip_call_id,
        participant_identity: PHONE_PARTICIPANT_IDENTITY.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_name() {
        assert_eq!(
            room_name("+919988536242", 1_700_000_000),
            "call-6242-1700000000"
        );
        assert_eq!(room_name("+919988536242", 5), room_name("+919988536242", 5));
        assert_ne!(room_name("+919988536242", 5), room_name("+919988536242", 6));
    }

    #[test]
    fn test_short_numbers() {
        assert_eq!(room_name("123", 1), "call-123-1");
        assert_eq!(mask_phone("12"), "***12");
        assert_eq!(mask_phone(""), "***");
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+14155550123"), "***0123");
    }
}
