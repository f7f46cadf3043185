use async_trait::async_trait;
use livekit_api::services::agent_dispatch::AgentDispatchClient;
use livekit_api::services::room::RoomClient;
use livekit_api::services::sip::{CreateSIPParticipantOptions, SIPClient};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    AgentDispatch, ApiError, ControlPlane, CreateAgentDispatchRequest,
    CreateSipParticipantRequest, Room, SipParticipantInfo,
};
use crate::config::LiveKitCredentials;

/// LiveKit server API client for dispatch, SIP and room lookups
pub struct LiveKitApi {
    dispatch: AgentDispatchClient,
    sip: SIPClient,
    rooms: RoomClient,
    closed: AtomicBool,
}

impl LiveKitApi {
    pub fn new(credentials: &LiveKitCredentials) -> Self {
        // Service clients want the HTTP form of the server URL
        let host = credentials.url.as_str();
        let api_key = credentials.api_key.as_str();
        let api_secret = credentials.api_secret();

        Self {
            dispatch: AgentDispatchClient::with_api_key(host, api_key, api_secret),
            sip: SIPClient::with_api_key(host, api_key, api_secret),
            rooms: RoomClient::with_api_key(host, api_key, api_secret),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), ApiError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ApiError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl ControlPlane for LiveKitApi {
    async fn create_dispatch(
        &self,
        request: CreateAgentDispatchRequest,
    ) -> Result<AgentDispatch, ApiError> {
        self.ensure_open()?;
        log::debug!("CreateDispatch {} -> {}", request.agent_name, request.room);

        Ok(self.dispatch.create_dispatch(request).await?)
    }

    async fn create_sip_participant(
        &self,
        request: CreateSipParticipantRequest,
    ) -> Result<SipParticipantInfo, ApiError> {
        self.ensure_open()?;
        log::debug!("CreateSIPParticipant in {}", request.room_name);

        let options = CreateSIPParticipantOptions {
            participant_identity: request.participant_identity,
            ..Default::default()
        };
        let participant = self
            .sip
            .create_sip_participant(
                request.sip_trunk_id,
                request.sip_call_to,
                request.room_name,
                options,
                request.trunk,
            )
            .await?;
        Ok(participant)
    }

    async fn get_room(&self, name: &str) -> Result<Option<Room>, ApiError> {
        self.ensure_open()?;

        let rooms = self.rooms.list_rooms(vec![name.to_string()]).await?;
        Ok(rooms
            .into_iter()
            .find(|room| room.name == name)
            .map(Room::from))
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            log::debug!("LiveKit API client closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn api(url: &str) -> LiveKitApi {
        let credentials =
            LiveKitCredentials::new(url, "APIkey".to_string(), "secret".to_string()).unwrap();
        LiveKitApi::new(&credentials)
    }

    fn header_end(request: &[u8]) -> Option<usize> {
        request.windows(4).position(|window| window == b"\r\n\r\n")
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Answer one HTTP request with `status` and `body`, returning the request head
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            let head = loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = header_end(&request) {
                    let head = String::from_utf8_lossy(&request[..end]).to_string();
                    if n == 0 || request.len() >= end + 4 + content_length(&head) {
                        break head;
                    }
                } else if n == 0 {
                    break String::from_utf8_lossy(&request).to_string();
                }
            };

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            head
        });

        (url, handle)
    }

    fn dispatch_request() -> CreateAgentDispatchRequest {
        CreateAgentDispatchRequest {
            agent_name: "outbound-agent".to_string(),
            room: "call-6242-1".to_string(),
            metadata: "{}".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_dispatch_is_signed_and_routed() {
        let (url, server) = serve_once("200 OK", "").await;
        let api = api(&url);

        let dispatch = api.create_dispatch(dispatch_request()).await.unwrap();
        assert!(dispatch.id.is_empty());

        let head = server.await.unwrap();
        assert!(head.starts_with("POST /twirp/livekit.AgentDispatchService/CreateDispatch "));
        assert!(head.to_lowercase().contains("authorization: bearer "));
    }

    #[tokio::test]
    async fn test_server_error_code_is_kept() {
        let (url, server) =
            serve_once("404 Not Found", r#"{"code":"not_found","msg":"trunk not found"}"#).await;
        let api = api(&url);

        let err = api
            .create_sip_participant(CreateSipParticipantRequest {
                sip_trunk_id: "ST_missing".to_string(),
                sip_call_to: "+14155550123".to_string(),
                room_name: "call-0123-1".to_string(),
                participant_identity: "phone_user".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        let code = err.twirp().unwrap();
        assert_eq!(code.code, "not_found");
        assert_eq!(code.msg, "trunk not found");

        let head = server.await.unwrap();
        assert!(head.starts_with("POST /twirp/livekit.SIP/CreateSIPParticipant "));
    }

    #[tokio::test]
    async fn test_closed_client_rejects_requests() {
        let api = api("ws://127.0.0.1:7880");
        api.close().await;

        assert!(matches!(
            api.get_room("call-1234-1").await,
            Err(ApiError::Closed)
        ));
        assert!(matches!(
            api.create_dispatch(dispatch_request()).await,
            Err(ApiError::Closed)
        ));
    }
}
