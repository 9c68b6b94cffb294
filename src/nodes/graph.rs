//! Node graph data structures and operations
//!
//! The graph is the host side of the socket contract: it owns every node's
//! sockets, records links, and tells registered hooks about each link change.

use super::hooks::{NodeHooksRegistry, NodeLifecycleHooks};
use super::host::OriginLookup;
use super::node::{Node, NodeId};
use super::notification::LinkNotification;
use super::socket::{LinkId, Socket, SocketId};
use crate::constants::sockets::PLACEHOLDER_TYPE;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A link from an output socket to an input socket on another node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: LinkId,
    pub from_node: NodeId,
    pub from_port: SocketId,
    pub to_node: NodeId,
    /// Current index of the target input; kept in sync when inputs move
    pub to_port: SocketId,
}

/// Whether an output of type `from` may feed an input of type `to`
pub fn type_tags_compatible(from: &str, to: &str) -> bool {
    from == to || from == PLACEHOLDER_TYPE || to == PLACEHOLDER_TYPE
}

/// A graph containing nodes and their connections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeGraph {
    pub nodes: HashMap<NodeId, Node>,
    pub connections: Vec<Connection>,
    next_node_id: NodeId,
    next_link_id: LinkId,
    #[serde(skip)]
    hooks: NodeHooksRegistry,
}

impl NodeGraph {
    /// Creates a new empty node graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph that dispatches to `hooks`
    pub fn with_hooks(hooks: NodeHooksRegistry) -> Self {
        Self {
            hooks,
            ..Self::default()
        }
    }

    /// Register lifecycle hooks for a node type
    pub fn register_hooks(&mut self, node_type: impl Into<String>, hooks: Box<dyn NodeLifecycleHooks>) {
        self.hooks.register(node_type, hooks);
    }


    /// Adds a node to the graph, runs its creation hooks and returns its ID
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.next_node_id;
        node.id = id;
        for hooks in self.hooks.hooks_for(&node.type_name) {
            hooks.on_node_created(&mut node);
        }
        self.nodes.insert(id, node);
        self.next_node_id += 1;
        id
    }

    /// Removes a node and all its connections
    ///
    /// Nodes fed by the removed node receive a disconnect notification for
    /// each of their inputs that loses its link.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        while let Some(link) = self
            .connections
            .iter()
            .find(|conn| conn.from_node == node_id)
            .map(|conn| conn.id)
        {
            self.disconnect_link(link);
        }
        self.connections.retain(|conn| conn.to_node != node_id);

        self.nodes.remove(&node_id)
    }

    /// Links output `from_port` of `from_node` to input `to_port` of `to_node`
    ///
    /// An input holds at most one link; an existing link on the target input
    /// is replaced in place and only the new link is announced.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: SocketId,
        to_node: NodeId,
        to_port: SocketId,
    ) -> Result<LinkId, &'static str> {
        if from_node == to_node {
            return Err("Cannot connect a node to itself");
        }
        let source = self.nodes.get(&from_node).ok_or("Source node does not exist")?;
        let target = self.nodes.get(&to_node).ok_or("Target node does not exist")?;
        let output = source.outputs.get(from_port).ok_or("Source port does not exist")?;
        let input = target.inputs.get(to_port).ok_or("Target port does not exist")?;
        if !type_tags_compatible(&output.type_tag, &input.type_tag) {
            return Err("Port types are not compatible");
        }

        if let Some(replaced) = input.link {
            self.connections.retain(|conn| conn.id != replaced);
        }

        let id = self.next_link_id;
        self.next_link_id += 1;
        self.connections.push(Connection {
            id,
            from_node,
            from_port,
            to_node,
            to_port,
        });
        if let Some(input) = self.nodes.get_mut(&to_node).and_then(|n| n.inputs.get_mut(to_port)) {
            input.link = Some(id);
        }
        debug!("link {}: {}:{} -> {}:{}", id, from_node, from_port, to_node, to_port);

        self.notify(to_node, LinkNotification::connect(to_port, from_node, from_port));
        Ok(id)
    }

    /// Removes the link feeding input `to_port` of `to_node`, if any
    pub fn disconnect(&mut self, to_node: NodeId, to_port: SocketId) -> Option<Connection> {
        let link = self
            .nodes
            .get(&to_node)?
            .inputs
            .get(to_port)?
            .link?;
        self.disconnect_link(link)
    }

    /// Removes a link by id and notifies the node it fed
    pub fn disconnect_link(&mut self, link: LinkId) -> Option<Connection> {
        let position = self.connections.iter().position(|conn| conn.id == link)?;
        let connection = self.connections.remove(position);

        let input_index = self.nodes.get_mut(&connection.to_node).and_then(|node| {
            let index = node.inputs.iter().position(|input| input.link == Some(link))?;
            node.inputs[index].link = None;
            Some(index)
        });
        debug!("unlink {}: {:?}", link, connection);

        if let Some(index) = input_index {
            self.notify(connection.to_node, LinkNotification::disconnect(index));
        }
        Some(connection)
    }

    /// The connection with id `link`
    pub fn connection(&self, link: LinkId) -> Option<&Connection> {
        self.connections.iter().find(|conn| conn.id == link)
    }

    /// The connection feeding input `to_port` of `to_node`
    pub fn incoming(&self, to_node: NodeId, to_port: SocketId) -> Option<&Connection> {
        let link = self.nodes.get(&to_node)?.inputs.get(to_port)?.link?;
        self.connection(link)
    }

    /// Deliver a link notification to the hooks of `node_id`
    fn notify(&mut self, node_id: NodeId, notification: LinkNotification) {
        // Take the node out so hooks can mutate it while reading the rest of
        // the graph through `OriginLookup`.
        let Some(mut node) = self.nodes.remove(&node_id) else {
            return;
        };
        for hooks in self.hooks.hooks_for(&node.type_name) {
            hooks.on_link_changed(&mut node, &notification, &*self);
        }
        self.nodes.insert(node_id, node);
        self.sync_link_slots(node_id);
    }

    /// Re-point connections at the current index of their target input
    fn sync_link_slots(&mut self, node_id: NodeId) {
        let Some(node) = self.nodes.get(&node_id) else {
            return;
        };
        let slots: HashMap<LinkId, SocketId> = node
            .inputs
            .iter()
            .enumerate()
            .filter_map(|(index, input)| input.link.map(|link| (link, index)))
            .collect();
        for conn in self.connections.iter_mut().filter(|conn| conn.to_node == node_id) {
            if let Some(&index) = slots.get(&conn.id) {
                conn.to_port = index;
            }
        }
    }
}

impl OriginLookup for NodeGraph {
    fn output_socket(&self, node: NodeId, slot: SocketId) -> Option<&Socket> {
        self.nodes.get(&node)?.outputs.get(slot)
    }
}
