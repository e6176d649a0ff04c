//! # Teleop Node
//!
//! Per-event handler wiring the [`InputMapper`] to the outbound endpoints.
//!
//! For every joystick event the node:
//!
//! 1. Computes and publishes one velocity command.
//! 2. Resolves at most one head position and calls the head service,
//!    blocking until it answers or fails.
//!
//! Failures are logged and reported in the returned [`EventOutcome`]; they
//! never stop the node from handling the next event. An out-of-range index
//! repeats on every event, so it is logged as an error once per parameter
//! and at debug level afterwards.

use std::collections::HashSet;
use tracing::{debug, error, info};

use super::mapper::InputMapper;
use super::messages::{HeadPosition, HeadStatus, JoyEvent, Twist};
use crate::config::Config;
use crate::error::{Result, TeleopError};
use crate::transport::traits::{HeadPositionClient, VelocityPublisher};

/// What happened to the head request of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadOutcome {
    /// No configured head button was pressed
    NotRequested,
    /// The service answered
    Acknowledged {
        position: HeadPosition,
        status: HeadStatus,
    },
    /// The call was made and failed
    Failed { position: HeadPosition },
    /// A head button index was out of range, no call was made
    Skipped,
}

/// Result of handling one joystick event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventOutcome {
    /// Command handed to the publisher, `None` if mapping or publishing failed
    pub command: Option<Twist>,
    pub head: HeadOutcome,
}

/// Running counters, logged periodically by the binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub events: u64,
    pub commands_published: u64,
    pub head_requests: u64,
    pub head_failures: u64,
    pub mapping_errors: u64,
}

/// Joystick teleoperation node.
///
/// Not thread-safe by design of the host: events arrive one at a time.
///
/// # Examples
///
/// ```
/// use rovio_teleop::config::Config;
/// use rovio_teleop::teleop::messages::JoyEvent;
/// use rovio_teleop::teleop::node::{HeadOutcome, TeleopNode};
/// use rovio_teleop::transport::head_client::UnavailableHeadClient;
/// use rovio_teleop::transport::jsonl::JsonLinesPublisher;
///
/// let config = Config::default();
/// let mut node = TeleopNode::from_config(
///     &config,
///     JsonLinesPublisher::new(Vec::new(), "cmd_vel"),
///     UnavailableHeadClient::new("head_position"),
/// );
///
/// let outcome = node.on_input_event(&JoyEvent::new(vec![0.0, 1.0, 0.0], vec![0, 0, 0, 0]));
/// assert_eq!(outcome.command.unwrap().linear.x, 1.0);
/// assert_eq!(outcome.head, HeadOutcome::NotRequested);
/// ```
#[derive(Debug)]
pub struct TeleopNode<P, H> {
    mapper: InputMapper,
    publisher: P,
    head_client: H,
    head_service: String,
    stats: NodeStats,
    /// Parameters whose out-of-range index has already been logged
    reported_params: HashSet<&'static str>,
}

impl<P, H> TeleopNode<P, H>
where
    P: VelocityPublisher,
    H: HeadPositionClient,
{
    /// Create a node from its parts.
    pub fn new(
        mapper: InputMapper,
        publisher: P,
        head_client: H,
        head_service: impl Into<String>,
    ) -> Self {
        Self {
            mapper,
            publisher,
            head_client,
            head_service: head_service.into(),
            stats: NodeStats::default(),
            reported_params: HashSet::new(),
        }
    }

    /// Create a node using the mapper parameters and service name in `config`.
    pub fn from_config(config: &Config, publisher: P, head_client: H) -> Self {
        Self::new(
            InputMapper::new(config.teleop.clone()),
            publisher,
            head_client,
            config.transport.head_service.clone(),
        )
    }

    /// Counters since the node was created.
    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// Handle one joystick event.
    pub fn on_input_event(&mut self, event: &JoyEvent) -> EventOutcome {
        self.stats.events += 1;

        let command = self.publish_velocity(event);

        let head = match self.mapper.head_request(event) {
            Ok(None) => HeadOutcome::NotRequested,
            Ok(Some(position)) => match self.request_head(position) {
                Ok(status) => {
                    // The status is only reported; nothing reacts to it yet
                    info!("Head status: {}", status);
                    HeadOutcome::Acknowledged { position, status }
                }
                Err(e) => {
                    error!("Failed to call service {}: {}", self.head_service, e);
                    self.stats.head_failures += 1;
                    HeadOutcome::Failed { position }
                }
            },
            Err(e) => {
                self.report_mapping_error(&e);
                HeadOutcome::Skipped
            }
        };

        EventOutcome { command, head }
    }

    /// Issue a single head-position call.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::HeadCall`](crate::error::TeleopError::HeadCall)
    /// when the service does not answer.
    pub fn request_head(&mut self, position: HeadPosition) -> Result<HeadStatus> {
        self.stats.head_requests += 1;
        let status = self.head_client.request_head_position(position)?;
        Ok(status)
    }

    /// Count a mapping error, logging it at error level only the first time
    /// its parameter fails. Returns `true` when it was logged as an error.
    fn report_mapping_error(&mut self, e: &TeleopError) -> bool {
        self.stats.mapping_errors += 1;

        let first = match e {
            TeleopError::AxisIndexOutOfRange { param, .. }
            | TeleopError::ButtonIndexOutOfRange { param, .. } => self.reported_params.insert(*param),
            _ => true,
        };

        if first {
            error!("{}", e);
        } else {
            debug!("{}", e);
        }
        first
    }

    fn publish_velocity(&mut self, event: &JoyEvent) -> Option<Twist> {
        let command = match self.mapper.map_velocity(event) {
            Ok(command) => command,
            Err(e) => {
                self.report_mapping_error(&e);
                return None;
            }
        };

        match self.publisher.publish(&command) {
            Ok(()) => {
                self.stats.commands_published += 1;
                Some(command)
            }
            Err(e) => {
                error!("Failed to publish velocity command: {}", e);
                None
            }
        }
    }
}
