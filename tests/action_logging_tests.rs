//! Actions log their invocation and nothing else; job log lines carry the room

use log::kv::{Key, Source};
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;
use serde_json::json;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use outbound_caller::agent::OutboundCallAgent;
use outbound_caller::config::AgentSettings;
use outbound_caller::livekit::Room;
use outbound_caller::llm::prompts::PromptVariant;
use outbound_caller::session::ConsoleSessionFactory;
use outbound_caller::vad::{VADConfig, VadError, VoiceActivityDetector};
use outbound_caller::worker::{AgentServer, ProcessContext};

#[derive(Debug)]
struct Captured {
    level: Level,
    message: String,
    room: Option<String>,
}

static RECORDS: Lazy<Mutex<Vec<Captured>>> = Lazy::new(|| Mutex::new(Vec::new()));

struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.target().starts_with("outbound_caller") {
            let room = record
                .key_values()
                .get(Key::from_str("room"))
                .map(|value| value.to_string());
            RECORDS.lock().unwrap().push(Captured {
                level: record.level(),
                message: record.args().to_string(),
                room,
            });
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;

fn capture() -> Vec<Captured> {
    // Only the first test installs the logger
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
    std::mem::take(&mut *RECORDS.lock().unwrap())
}

struct SilentVad(VADConfig);

impl VoiceActivityDetector for SilentVad {
    fn name(&self) -> &str {
        "silent"
    }

    fn config(&self) -> &VADConfig {
        &self.0
    }

    fn speech_probability(&self, _audio: &[i16]) -> Result<f32, VadError> {
        Ok(0.0)
    }
}

#[tokio::test]
#[serial]
async fn test_end_call_logs_exactly_once() {
    let agent = OutboundCallAgent::new("Alex", "Acme", PromptVariant::Standard);
    capture();

    let result = agent
        .invoke_tool("end_call", json!({}), CancellationToken::new())
        .await
        .unwrap();

    let records = capture();
    assert!(!result.text().is_empty());
    assert!(result.text().contains("Goodbye"));
    assert_eq!(records.len(), 1, "records: {:?}", records);
    assert_eq!(records[0].level, Level::Info);
    assert_eq!(records[0].message, "Call ended by agent");
}

#[tokio::test]
#[serial]
async fn test_schedule_demo_logs_exactly_once() {
    let agent = OutboundCallAgent::new("Alex", "Acme", PromptVariant::Standard);
    capture();

    agent
        .invoke_tool(
            "schedule_demo",
            json!({"preferred_time": "Friday morning"}),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let records = capture();
    assert_eq!(records.len(), 1, "records: {:?}", records);
    assert!(records[0].message.contains("Friday morning"));
}

#[tokio::test]
#[serial]
async fn test_job_log_lines_carry_room() {
    let vad: Arc<dyn VoiceActivityDetector> = Arc::new(SilentVad(VADConfig::default()));
    let server = AgentServer::new(
        ProcessContext::new(vad),
        AgentSettings::default(),
        Box::new(ConsoleSessionFactory),
    );
    capture();

    let session = server
        .run_job(Room::new(
            "call-6242-1",
            r#"{"caller_name":"Alex","company_name":"Acme"}"#,
        ))
        .await
        .unwrap();
    session
        .agent()
        .unwrap()
        .invoke_tool("end_call", json!({}), CancellationToken::new())
        .await
        .unwrap();

    let records = capture();
    assert!(
        records
            .iter()
            .any(|r| r.message.starts_with("Agent entered call")),
        "records: {:?}",
        records
    );
    assert!(
        records.iter().any(|r| r.message == "Call ended by agent"),
        "records: {:?}",
        records
    );
    for record in &records {
        assert_eq!(
            record.room.as_deref(),
            Some("call-6242-1"),
            "missing room on {:?}",
            record
        );
    }
}
