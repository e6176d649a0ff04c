//! # Head Position Clients
//!
//! Implementations of [`HeadPositionClient`].
//!
//! - [`TcpHeadClient`] opens one TCP connection per call, writes a request
//!   line and blocks until the responder's status line arrives.
//! - [`UnavailableHeadClient`] stands in when no responder is configured;
//!   every call fails.
//!
//! ## Wire Format
//!
//! ```text
//! -> {"position":"DOWN"}
//! <- {"status":0}
//! ```

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

use super::traits::HeadPositionClient;
use crate::error::CallError;
use crate::teleop::messages::{HeadPosition, HeadStatus};

#[derive(Debug, Serialize)]
struct HeadRequest {
    position: HeadPosition,
}

#[derive(Debug, Deserialize)]
struct HeadResponse {
    status: HeadStatus,
}

/// Blocking TCP client for the head-position service.
#[derive(Debug, Clone)]
pub struct TcpHeadClient {
    /// Responder address (`host:port`)
    addr: String,
    /// Timeout for connect, read and write. `None` blocks indefinitely.
    timeout: Option<Duration>,
}

impl TcpHeadClient {
    /// Create a client for the responder at `addr`.
    ///
    /// No connection is made until the first request.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use rovio_teleop::transport::head_client::TcpHeadClient;
    ///
    /// let client = TcpHeadClient::new("127.0.0.1:7070", Some(Duration::from_millis(500)));
    /// assert_eq!(client.addr(), "127.0.0.1:7070");
    /// ```
    pub fn new(addr: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// Responder address.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn connect(&self) -> Result<TcpStream, CallError> {
        let stream = match self.timeout {
            Some(timeout) => {
                let mut last_err = None;
                let mut connected = None;
                for sock_addr in self.addr.to_socket_addrs()? {
                    match TcpStream::connect_timeout(&sock_addr, timeout) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                match (connected, last_err) {
                    (Some(stream), _) => stream,
                    (None, Some(e)) => return Err(CallError::Io(e)),
                    (None, None) => {
                        return Err(CallError::Unavailable(format!(
                            "{} (address did not resolve)",
                            self.addr
                        )))
                    }
                }
            }
            None => TcpStream::connect(self.addr.as_str())?,
        };

        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        Ok(stream)
    }
}

impl HeadPositionClient for TcpHeadClient {
    fn request_head_position(&mut self, position: HeadPosition) -> Result<HeadStatus, CallError> {
        let mut stream = self.connect()?;

        let mut request = serde_json::to_vec(&HeadRequest { position })
            .map_err(|e| CallError::Io(e.into()))?;
        request.push(b'\n');
        stream.write_all(&request)?;
        stream.flush()?;
        debug!("Sent head request {} to {}", position, self.addr);

        let mut line = String::new();
        let read = BufReader::new(stream).read_line(&mut line)?;
        if read == 0 {
            return Err(CallError::InvalidResponse(
                "connection closed before a response".to_string(),
            ));
        }

        let response: HeadResponse = serde_json::from_str(line.trim())
            .map_err(|e| CallError::InvalidResponse(format!("{}: {}", e, line.trim())))?;
        Ok(response.status)
    }
}

/// Client used when no head-position responder is configured.
#[derive(Debug, Clone)]
pub struct UnavailableHeadClient {
    service: String,
}

impl UnavailableHeadClient {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl HeadPositionClient for UnavailableHeadClient {
    fn request_head_position(&mut self, _position: HeadPosition) -> Result<HeadStatus, CallError> {
        Err(CallError::Unavailable(self.service.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// Spawn a one-shot responder that answers with `reply` and hands back
    /// the request line it received.
    fn spawn_responder(reply: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request = String::new();
            reader.read_line(&mut request).unwrap();

            let mut stream = stream;
            stream.write_all(reply.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });

        (addr, handle)
    }

    #[test]
    fn test_successful_call_returns_status() {
        let (addr, handle) = spawn_responder("{\"status\":3}\n");
        let mut client = TcpHeadClient::new(addr, Some(Duration::from_secs(5)));

        let status = client.request_head_position(HeadPosition::Down).unwrap();
        assert_eq!(status, HeadStatus(3));

        let request = handle.join().unwrap();
        assert_eq!(request.trim(), r#"{"position":"DOWN"}"#);
    }

    #[test]
    fn test_call_without_timeout() {
        let (addr, handle) = spawn_responder("{\"status\":0}\n");
        let mut client = TcpHeadClient::new(addr, None);

        let status = client.request_head_position(HeadPosition::Up).unwrap();
        assert_eq!(status, HeadStatus(0));
        assert_eq!(handle.join().unwrap().trim(), r#"{"position":"UP"}"#);
    }

    #[test]
    fn test_malformed_response() {
        let (addr, handle) = spawn_responder("ok\n");
        let mut client = TcpHeadClient::new(addr, Some(Duration::from_secs(5)));

        let result = client.request_head_position(HeadPosition::Mid);
        assert!(matches!(result, Err(CallError::InvalidResponse(_))));
        handle.join().unwrap();
    }

    #[test]
    fn test_closed_without_response() {
        let (addr, handle) = spawn_responder("");
        let mut client = TcpHeadClient::new(addr, Some(Duration::from_secs(5)));

        let result = client.request_head_position(HeadPosition::Mid);
        assert!(matches!(result, Err(CallError::InvalidResponse(_))));
        handle.join().unwrap();
    }

    #[test]
    fn test_connection_refused() {
        // Bind then drop to get a port nobody is listening on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().to_string()
        };
        let mut client = TcpHeadClient::new(addr, Some(Duration::from_millis(500)));

        let result = client.request_head_position(HeadPosition::Down);
        assert!(matches!(result, Err(CallError::Io(_))));
    }

    #[test]
    fn test_unavailable_client_always_fails() {
        let mut client = UnavailableHeadClient::new("head_position");
        for position in [HeadPosition::Down, HeadPosition::Mid, HeadPosition::Up] {
            match client.request_head_position(position) {
                Err(CallError::Unavailable(service)) => assert_eq!(service, "head_position"),
                other => panic!("Expected Unavailable, got: {:?}", other),
            }
        }
    }
}
