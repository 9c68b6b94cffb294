//! Errors raised while maintaining a node's sockets

use super::node::NodeId;
use super::socket::SocketId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocketError {
    /// A connect notification names an origin that no longer resolves
    #[error("origin node {node} has no output slot {slot}")]
    DanglingOriginReference { node: NodeId, slot: SocketId },

    /// A notification lacks the fields its direction requires
    #[error("malformed link notification: {0}")]
    MalformedNotification(String),

    #[error("socket index {index} out of range for {len} sockets")]
    SocketIndexOutOfRange { index: usize, len: usize },
}
