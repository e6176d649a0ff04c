//! # JSON Lines Adapter
//!
//! Line oriented framing between this node and the host middleware bridge.
//!
//! ## Inbound
//!
//! Each line is one joystick event, either bare or wrapped in a topic
//! envelope:
//!
//! ```text
//! {"axes":[0.0,0.5,0.0],"buttons":[0,0,0,0]}
//! {"topic":"joy","msg":{"axes":[0.0,0.5,0.0],"buttons":[0,0,0,0]}}
//! ```
//!
//! ## Outbound
//!
//! Each velocity command is written as one envelope line:
//!
//! ```text
//! {"topic":"cmd_vel","msg":{"linear":{"x":0.5,"y":0.0,"z":0.0},"angular":{"x":0.0,"y":0.0,"z":0.0}}}
//! ```

use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;

use super::traits::VelocityPublisher;
use crate::error::Result;
use crate::teleop::messages::{JoyEvent, Twist};

/// A line carrying a `topic` key. `msg` stays untyped until the topic is
/// known to be ours.
#[derive(Debug, Deserialize)]
struct InboundEnvelope {
    topic: String,
    #[serde(default)]
    msg: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OutboundLine<'a> {
    topic: &'a str,
    msg: &'a Twist,
}

/// Decode one inbound line.
///
/// Returns `Ok(None)` for blank lines and for envelopes addressed to a
/// topic other than `joy_topic`, whatever their payload. A line is an
/// envelope if and only if it has a `topic` key.
///
/// # Errors
///
/// Returns [`TeleopError::Json`](crate::error::TeleopError::Json) if the
/// line is not a joystick event.
///
/// # Examples
///
/// ```
/// use rovio_teleop::transport::jsonl::decode_event;
///
/// let event = decode_event(r#"{"axes":[0.1],"buttons":[1]}"#, "joy")?.unwrap();
/// assert_eq!(event.buttons, vec![1]);
///
/// assert!(decode_event(r#"{"topic":"odom","msg":{}}"#, "joy")?.is_none());
/// # Ok::<(), rovio_teleop::error::TeleopError>(())
/// ```
pub fn decode_event(line: &str, joy_topic: &str) -> Result<Option<JoyEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(line)?;
    if value.get("topic").is_none() {
        return Ok(Some(serde_json::from_value(value)?));
    }

    let envelope: InboundEnvelope = serde_json::from_value(value)?;
    if envelope.topic != joy_topic {
        debug!("Ignoring message for topic {}", envelope.topic);
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(envelope.msg)?))
}

/// Velocity publisher writing one JSON envelope per line.
///
/// # Examples
///
/// ```
/// use rovio_teleop::teleop::messages::Twist;
/// use rovio_teleop::transport::jsonl::JsonLinesPublisher;
/// use rovio_teleop::transport::traits::VelocityPublisher;
///
/// let mut publisher = JsonLinesPublisher::new(Vec::new(), "cmd_vel");
/// publisher.publish(&Twist::planar(0.5, 0.0, 0.0))?;
///
/// let out = String::from_utf8(publisher.into_inner()).unwrap();
/// assert!(out.starts_with(r#"{"topic":"cmd_vel""#));
/// assert!(out.ends_with('\n'));
/// # Ok::<(), rovio_teleop::error::TeleopError>(())
/// ```
#[derive(Debug)]
pub struct JsonLinesPublisher<W> {
    writer: W,
    topic: String,
}

impl<W: Write + Send> JsonLinesPublisher<W> {
    /// Wrap a writer, tagging every line with `topic`.
    pub fn new(writer: W, topic: impl Into<String>) -> Self {
        Self {
            writer,
            topic: topic.into(),
        }
    }

    /// Topic name written into every envelope.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> VelocityPublisher for JsonLinesPublisher<W> {
    fn publish(&mut self, command: &Twist) -> Result<()> {
        let line = OutboundLine {
            topic: &self.topic,
            msg: command,
        };

        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        debug!(
            "Published {}: linear=({:.3}, {:.3}) angular_z={:.3}",
            self.topic, command.linear.x, command.linear.y, command.angular.z
        );
        Ok(())
    }
}
