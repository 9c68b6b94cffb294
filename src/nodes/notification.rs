//! Link notifications delivered by the host when an input is attached or detached

use super::error::SocketError;
use super::node::NodeId;
use super::socket::SocketId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkDirection {
    Connect,
    Disconnect,
}

/// Output socket a link starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOrigin {
    pub node: NodeId,
    pub slot: SocketId,
}

/// One connect or disconnect affecting exactly one input socket of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkNotification {
    pub direction: LinkDirection,
    /// Index of the affected socket in the node's input list
    pub socket_index: usize,
    /// Present only on connect
    pub origin: Option<LinkOrigin>,
}

impl LinkNotification {
    pub fn connect(socket_index: usize, origin_node: NodeId, origin_slot: SocketId) -> Self {
        Self {
            direction: LinkDirection::Connect,
            socket_index,
            origin: Some(LinkOrigin {
                node: origin_node,
                slot: origin_slot,
            }),
        }
    }

    pub fn disconnect(socket_index: usize) -> Self {
        Self {
            direction: LinkDirection::Disconnect,
            socket_index,
            origin: None,
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self.direction, LinkDirection::Connect)
    }

    /// Origin of a connect notification, or why it is unusable
    pub fn connect_origin(&self) -> Result<LinkOrigin, SocketError> {
        match (self.direction, self.origin) {
            (LinkDirection::Connect, Some(origin)) => Ok(origin),
            (LinkDirection::Connect, None) => Err(SocketError::MalformedNotification(format!(
                "connect on socket {} carries no origin",
                self.socket_index
            ))),
            (LinkDirection::Disconnect, _) => Err(SocketError::MalformedNotification(format!(
                "disconnect on socket {} has no origin to resolve",
                self.socket_index
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_carries_origin() {
        let notification = LinkNotification::connect(1, 4, 0);
        assert!(notification.is_connect());
        assert_eq!(
            notification.connect_origin(),
            Ok(LinkOrigin { node: 4, slot: 0 })
        );
    }

    #[test]
    fn test_connect_without_origin_is_malformed() {
        let notification = LinkNotification {
            direction: LinkDirection::Connect,
            socket_index: 0,
            origin: None,
        };
        assert!(matches!(
            notification.connect_origin(),
            Err(SocketError::MalformedNotification(_))
        ));
    }
}
