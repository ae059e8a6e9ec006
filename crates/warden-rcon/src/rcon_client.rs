//! Minimal RCON wire client: dial, authenticate, execute one command.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const PACKET_TYPE_AUTH: i32 = 3;
const PACKET_TYPE_EXEC: i32 = 2;
const PACKET_TYPE_AUTH_RESPONSE: i32 = 2;
const PACKET_TYPE_RESPONSE_VALUE: i32 = 0;

const AUTH_FAILED_REQUEST_ID: i32 = -1;

// The vanilla server caps packet bodies at 4096 bytes; whitelist output
// never comes close.
const MAX_BODY_BYTES: usize = 4096;

#[derive(Debug, Error)]
/// Enumerates failures of the RCON transport and command layer.
pub enum RconError {
    #[error("rcon io error: {0}")]
    Io(#[from] io::Error),
    #[error("rcon authentication rejected")]
    AuthRejected,
    #[error("rcon protocol error: {0}")]
    Protocol(String),
    #[error("{0}")]
    CommandRejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RconPacket {
    request_id: i32,
    packet_type: i32,
    body: String,
}

fn encode_packet(packet: &RconPacket) -> Vec<u8> {
    let body = packet.body.as_bytes();
    let length = (body.len() + 10) as i32;
    let mut frame = Vec::with_capacity(body.len() + 14);
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&packet.request_id.to_le_bytes());
    frame.extend_from_slice(&packet.packet_type.to_le_bytes());
    frame.extend_from_slice(body);
    frame.extend_from_slice(&[0, 0]);
    frame
}

fn read_le_i32(payload: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        payload[offset],
        payload[offset + 1],
        payload[offset + 2],
        payload[offset + 3],
    ])
}

// `payload` is the frame after the length prefix: id, type, body, two NULs.
fn decode_packet(payload: &[u8]) -> Result<RconPacket, RconError> {
    if payload.len() < 10 {
        return Err(RconError::Protocol(format!(
            "response frame too short: {} bytes",
            payload.len()
        )));
    }
    if payload[payload.len() - 2..] != [0, 0] {
        return Err(RconError::Protocol(
            "response frame missing NUL terminators".to_string(),
        ));
    }
    let body = String::from_utf8_lossy(&payload[8..payload.len() - 2]).into_owned();
    Ok(RconPacket {
        request_id: read_le_i32(payload, 0),
        packet_type: read_le_i32(payload, 4),
        body,
    })
}

/// Connection settings for the game server's RCON listener. Each command
/// dials, authenticates, executes, and drops the connection.
#[derive(Debug, Clone)]
pub struct RconClient {
    host: String,
    port: u16,
    password: String,
}

impl RconClient {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
        }
    }

    /// Runs one command and returns the server's response body.
    pub async fn exec(&self, command: &str) -> Result<String, RconError> {
        let mut connection =
            RconConnection::connect(&self.host, self.port, &self.password).await?;
        connection.exec(command).await
    }
}

struct RconConnection {
    stream: TcpStream,
    next_request_id: i32,
}

impl RconConnection {
    async fn connect(host: &str, port: u16, password: &str) -> Result<Self, RconError> {
        let stream = TcpStream::connect((host, port)).await?;
        let mut connection = Self {
            stream,
            next_request_id: 1,
        };
        connection.authenticate(password).await?;
        Ok(connection)
    }

    async fn authenticate(&mut self, password: &str) -> Result<(), RconError> {
        let request_id = self.send(PACKET_TYPE_AUTH, password).await?;
        // Some servers send an empty response-value packet ahead of the
        // auth reply.
        loop {
            let packet = self.receive().await?;
            match packet.packet_type {
                PACKET_TYPE_AUTH_RESPONSE => {
                    if packet.request_id == AUTH_FAILED_REQUEST_ID {
                        return Err(RconError::AuthRejected);
                    }
                    if packet.request_id != request_id {
                        return Err(RconError::Protocol(format!(
                            "auth reply for unknown request id {}",
                            packet.request_id
                        )));
                    }
                    return Ok(());
                }
                PACKET_TYPE_RESPONSE_VALUE => continue,
                other => {
                    return Err(RconError::Protocol(format!(
                        "unexpected packet type {other} during authentication"
                    )))
                }
            }
        }
    }

    async fn exec(&mut self, command: &str) -> Result<String, RconError> {
        let request_id = self.send(PACKET_TYPE_EXEC, command).await?;
        let packet = self.receive().await?;
        if packet.packet_type != PACKET_TYPE_RESPONSE_VALUE {
            return Err(RconError::Protocol(format!(
                "unexpected packet type {} in command response",
                packet.packet_type
            )));
        }
        if packet.request_id != request_id {
            return Err(RconError::Protocol(format!(
                "command response for unknown request id {}",
                packet.request_id
            )));
        }
        Ok(packet.body)
    }

    async fn send(&mut self, packet_type: i32, body: &str) -> Result<i32, RconError> {
        if body.len() > MAX_BODY_BYTES {
            return Err(RconError::Protocol(format!(
                "command body exceeds {MAX_BODY_BYTES} bytes"
            )));
        }
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        let frame = encode_packet(&RconPacket {
            request_id,
            packet_type,
            body: body.to_string(),
        });
        self.stream.write_all(&frame).await?;
        Ok(request_id)
    }

    async fn receive(&mut self) -> Result<RconPacket, RconError> {
        let mut length_bytes = [0_u8; 4];
        self.stream.read_exact(&mut length_bytes).await?;
        let length = i32::from_le_bytes(length_bytes);
        if !(10..=(MAX_BODY_BYTES as i32 + 10)).contains(&length) {
            return Err(RconError::Protocol(format!(
                "invalid response length {length}"
            )));
        }
        let mut payload = vec![0_u8; length as usize];
        self.stream.read_exact(&mut payload).await?;
        decode_packet(&payload)
    }
}
