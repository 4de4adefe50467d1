//! Server List Ping client.
//!
//! Frame layout: every packet is length-prefixed with a varint, the body
//! starts with a varint packet id. The status exchange is a handshake
//! (protocol version, address, port, next state 1) followed by an empty
//! status request; the response carries one JSON string.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{ProbeOutcome, Prober};

const HANDSHAKE_PACKET_ID: i32 = 0x00;
const STATUS_REQUEST_PACKET_ID: i32 = 0x00;
const STATUS_RESPONSE_PACKET_ID: i32 = 0x00;
/// Sentinel protocol version servers accept for status-only connections.
const PROTOCOL_VERSION: i32 = -1;
const NEXT_STATE_STATUS: i32 = 1;
/// Upper bound on the declared status payload, to avoid trusting a
/// hostile length prefix.
const MAX_STATUS_BYTES: i32 = 1024 * 1024;

#[derive(Debug, Error)]
enum PingError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed status payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unexpected packet id {0}")]
    UnexpectedPacket(i32),
    #[error("varint longer than 5 bytes")]
    VarIntTooLong,
    #[error("declared payload length {0} out of range")]
    LengthOutOfRange(i32),
}

/// Status prober for Minecraft Java Edition servers. The whole exchange
/// (connect included) runs under one timeout.
pub struct MinecraftProber {
    timeout: Duration,
}

impl MinecraftProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn ping(&self, host: &str, port: u16) -> Result<StatusResponse, PingError> {
        let mut stream = TcpStream::connect((host, port)).await?;

        let mut handshake = Vec::new();
        write_varint(&mut handshake, HANDSHAKE_PACKET_ID);
        write_varint(&mut handshake, PROTOCOL_VERSION);
        write_string(&mut handshake, host);
        handshake.extend_from_slice(&port.to_be_bytes());
        write_varint(&mut handshake, NEXT_STATE_STATUS);
        write_packet(&mut stream, &handshake).await?;

        let mut request = Vec::new();
        write_varint(&mut request, STATUS_REQUEST_PACKET_ID);
        write_packet(&mut stream, &request).await?;

        let _frame_len = read_varint(&mut stream).await?;
        let packet_id = read_varint(&mut stream).await?;
        if packet_id != STATUS_RESPONSE_PACKET_ID {
            return Err(PingError::UnexpectedPacket(packet_id));
        }
        let payload_len = read_varint(&mut stream).await?;
        if !(0..=MAX_STATUS_BYTES).contains(&payload_len) {
            return Err(PingError::LengthOutOfRange(payload_len));
        }
        let mut payload = vec![0u8; payload_len as usize];
        stream.read_exact(&mut payload).await?;

        Ok(serde_json::from_slice(&payload)?)
    }
}

#[async_trait]
impl Prober for MinecraftProber {
    async fn probe(&self, host: &str, port: u16) -> ProbeOutcome {
        match timeout(self.timeout, self.ping(host, port)).await {
            Ok(Ok(response)) => response.into_outcome(),
            Ok(Err(error)) => {
                debug!(host, port, %error, "probe failed");
                ProbeOutcome::offline()
            }
            Err(_) => {
                debug!(host, port, timeout_ms = self.timeout.as_millis() as u64, "probe timed out");
                ProbeOutcome::offline()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    players: PlayerCounts,
    version: Option<VersionInfo>,
    description: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerCounts {
    #[serde(default)]
    online: u32,
    #[serde(default)]
    max: u32,
    #[serde(default)]
    sample: Vec<PlayerSample>,
}

#[derive(Debug, Deserialize)]
struct PlayerSample {
    name: String,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    name: String,
}

impl StatusResponse {
    fn into_outcome(self) -> ProbeOutcome {
        let motd = self
            .description
            .as_ref()
            .map(flatten_motd)
            .filter(|text| !text.is_empty());
        ProbeOutcome {
            online: true,
            player_count: self.players.online,
            max_players: self.players.max,
            version: self.version.map(|v| v.name),
            motd,
            player_names: Some(self.players.sample.into_iter().map(|p| p.name).collect()),
        }
    }
}

/// Extracts plain text from a `description` value, which is either a bare
/// string or a chat component tree (`text` plus nested `extra` parts).
/// Legacy `§x` formatting codes are stripped.
fn flatten_motd(value: &serde_json::Value) -> String {
    let mut text = String::new();
    collect_text(value, &mut text);
    strip_formatting(&text)
}

fn collect_text(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::String(s) => out.push_str(s),
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(s)) = map.get("text") {
                out.push_str(s);
            }
            if let Some(serde_json::Value::Array(parts)) = map.get("extra") {
                for part in parts {
                    collect_text(part, out);
                }
            }
        }
        serde_json::Value::Array(parts) => {
            for part in parts {
                collect_text(part, out);
            }
        }
        _ => {}
    }
}

fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut v = value as u32;
    loop {
        let mut byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if v == 0 {
            break;
        }
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_varint(buf, s.len() as i32);
    buf.extend_from_slice(s.as_bytes());
}

async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, PingError> {
    let mut value: u32 = 0;
    for i in 0..5 {
        let byte = reader.read_u8().await?;
        value |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(PingError::VarIntTooLong)
}

async fn write_packet(stream: &mut TcpStream, body: &[u8]) -> Result<(), PingError> {
    let mut frame = Vec::with_capacity(body.len() + 5);
    write_varint(&mut frame, body.len() as i32);
    frame.extend_from_slice(body);
    stream.write_all(&frame).await?;
    Ok(())
}
