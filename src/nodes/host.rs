//! Capabilities the host editor exposes to socket-managing extensions
//!
//! The host owns socket storage. Extensions read the current list through
//! [`SocketHost`], issue structural edits back through it, and resolve the
//! origin of a new link through an [`OriginLookup`] handed to them per call.

use super::error::SocketError;
use super::node::NodeId;
use super::socket::{Socket, SocketId};

/// Mutable, index-addressable input socket list of one node
pub trait SocketHost {
    /// Current input sockets in display order
    fn sockets(&self) -> &[Socket];

    /// Mutable access for renaming and retyping a socket in place
    fn socket_mut(&mut self, index: usize) -> Option<&mut Socket>;

    /// Append an unconnected input socket and return its index
    fn append_socket(&mut self, name: String, type_tag: String) -> usize;

    /// Remove the socket at `index`, shifting later sockets down by one
    fn remove_socket_at(&mut self, index: usize) -> Result<Socket, SocketError>;

    /// Ask the host to re-layout and redraw the node
    fn mark_dirty(&mut self);
}

/// Read access to the graph's node registry
pub trait OriginLookup {
    /// The output socket `slot` of node `node`, if both still exist
    fn output_socket(&self, node: NodeId, slot: SocketId) -> Option<&Socket>;
}
