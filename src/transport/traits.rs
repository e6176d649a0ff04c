//! Trait abstraction for the middleware endpoints to enable testing

use crate::error::{CallError, Result};
use crate::teleop::messages::{HeadPosition, HeadStatus, Twist};

/// Outbound velocity-command channel
#[cfg_attr(test, mockall::automock)]
pub trait VelocityPublisher: Send {
    /// Hand one command to the transport
    fn publish(&mut self, command: &Twist) -> Result<()>;
}

/// Blocking head-position request/response call
#[cfg_attr(test, mockall::automock)]
pub trait HeadPositionClient: Send {
    /// Ask the head to move and wait for the responder's status
    fn request_head_position(
        &mut self,
        position: HeadPosition,
    ) -> std::result::Result<HeadStatus, CallError>;
}

impl<T: HeadPositionClient + ?Sized> HeadPositionClient for Box<T> {
    fn request_head_position(
        &mut self,
        position: HeadPosition,
    ) -> std::result::Result<HeadStatus, CallError> {
        (**self).request_head_position(position)
    }
}
