//! Node types and core node functionality

use super::error::SocketError;
use super::host::SocketHost;
use super::socket::{pos2_serde, ColorHint, Socket, SocketKind};
use crate::constants::layout::{MIN_NODE_WIDTH, PORT_SPACING};
use crate::constants::sockets::PLACEHOLDER_TYPE;
use egui::{Color32, Pos2, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = usize;

/// A node in the graph with its input and output sockets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Registered node type, used to find the node's lifecycle hooks
    pub type_name: String,
    pub title: String,
    #[serde(with = "pos2_serde")]
    pub position: Pos2,
    #[serde(with = "vec2_serde")]
    pub size: Vec2,
    pub inputs: Vec<Socket>,
    pub outputs: Vec<Socket>,
    #[serde(with = "color32_serde")]
    pub color: Color32,
    /// Set when the node needs a re-layout and redraw
    #[serde(skip)]
    dirty: bool,
}

impl Node {
    /// Creates a new node with the specified properties
    pub fn new(id: NodeId, type_name: impl Into<String>, position: Pos2) -> Self {
        let type_name = type_name.into();
        Self {
            id,
            title: type_name.clone(),
            type_name,
            position,
            size: Vec2::new(MIN_NODE_WIDTH, 30.0),
            inputs: vec![],
            outputs: vec![],
            color: Color32::from_rgb(60, 60, 60),
            dirty: false,
        }
    }

    /// Adds an input socket accepting any type
    pub fn add_input(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_typed_input(name, PLACEHOLDER_TYPE)
    }

    /// Adds an input socket of the given type
    pub fn add_typed_input(&mut self, name: impl Into<String>, type_tag: impl Into<String>) -> &mut Self {
        let id = self.inputs.len();
        self.inputs.push(Socket::new(id, name, type_tag, SocketKind::Input));
        self
    }

    /// Adds an output socket of the given type
    pub fn add_output(&mut self, name: impl Into<String>, type_tag: impl Into<String>) -> &mut Self {
        let id = self.outputs.len();
        self.outputs.push(Socket::new(id, name, type_tag, SocketKind::Output));
        self
    }

    /// Sets the title shown in the node header
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the color of the node
    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    /// Sets the size of the node
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Whether the host still has to redraw this node
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the dirty flag, as the renderer does once per frame
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Widens the node to fit its sockets and recomputes their positions
    pub fn update_port_positions(&mut self) {
        let widest = self.inputs.len().max(self.outputs.len());
        self.size.x = self.size.x.max((widest + 1) as f32 * PORT_SPACING).max(MIN_NODE_WIDTH);

        // Input sockets on TOP of node
        let input_start_x = if self.inputs.len() > 1 {
            (self.size.x - (self.inputs.len() - 1) as f32 * PORT_SPACING) / 2.0
        } else {
            self.size.x / 2.0
        };

        for (i, input) in self.inputs.iter_mut().enumerate() {
            input.position = self.position + Vec2::new(input_start_x + i as f32 * PORT_SPACING, 0.0);
        }

        // Output sockets on BOTTOM of node
        let output_start_x = if self.outputs.len() > 1 {
            (self.size.x - (self.outputs.len() - 1) as f32 * PORT_SPACING) / 2.0
        } else {
            self.size.x / 2.0
        };

        for (i, output) in self.outputs.iter_mut().enumerate() {
            output.position =
                self.position + Vec2::new(output_start_x + i as f32 * PORT_SPACING, self.size.y);
        }
    }
}

impl SocketHost for Node {
    fn sockets(&self) -> &[Socket] {
        &self.inputs
    }

    fn socket_mut(&mut self, index: usize) -> Option<&mut Socket> {
        self.inputs.get_mut(index)
    }

    fn append_socket(&mut self, name: String, type_tag: String) -> usize {
        let index = self.inputs.len();
        debug!("node {}: append input {:?} at {}", self.id, name, index);
        self.inputs.push(
            Socket::new(index, name, type_tag, SocketKind::Input).with_color_hint(ColorHint::Dimmed),
        );
        index
    }

    fn remove_socket_at(&mut self, index: usize) -> Result<Socket, SocketError> {
        if index >= self.inputs.len() {
            return Err(SocketError::SocketIndexOutOfRange {
                index,
                len: self.inputs.len(),
            });
        }
        let removed = self.inputs.remove(index);
        debug!("node {}: removed input {:?} at {}", self.id, removed.name, index);
        for (i, socket) in self.inputs.iter_mut().enumerate().skip(index) {
            socket.id = i;
        }
        Ok(removed)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.update_port_positions();
    }
}

// Serde helper modules for egui types
mod vec2_serde {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(vec: &Vec2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [vec.x, vec.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Vec2::new(x, y))
    }
}

mod color32_serde {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [color.r(), color.g(), color.b(), color.a()].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [r, g, b, a] = <[u8; 4]>::deserialize(deserializer)?;
        Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_socket_renumbers_later_sockets() {
        let mut node = Node::new(0, "Test", Pos2::ZERO);
        node.add_input("a").add_input("b").add_input("c");

        let removed = node.remove_socket_at(1).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.inputs[1].name, "c");
        assert_eq!(node.inputs[1].id, 1);
    }

    #[test]
    fn test_remove_socket_out_of_range() {
        let mut node = Node::new(0, "Test", Pos2::ZERO);
        node.add_input("a");
        assert_eq!(
            node.remove_socket_at(3),
            Err(SocketError::SocketIndexOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_appended_socket_is_dimmed_and_unconnected() {
        let mut node = Node::new(0, "Test", Pos2::ZERO);
        let index = node.append_socket("image_".into(), "*".into());
        assert_eq!(index, 0);
        assert_eq!(node.inputs[0].color_hint, ColorHint::Dimmed);
        assert!(!node.inputs[0].is_connected());
    }

    #[test]
    fn test_mark_dirty_relayouts_and_take_clears() {
        let mut node = Node::new(0, "Test", Pos2::new(10.0, 20.0));
        for name in ["a", "b", "c", "d", "e", "f"] {
            node.add_input(name);
        }
        node.mark_dirty();

        assert!(node.is_dirty());
        assert!(node.size.x >= 7.0 * PORT_SPACING);
        assert_eq!(node.inputs[0].position.y, 20.0);
        assert!(node.inputs[1].position.x > node.inputs[0].position.x);
        assert!(node.inputs[5].position.x <= node.position.x + node.size.x);

        assert!(node.take_dirty());
        assert!(!node.is_dirty());
    }

    #[test]
    fn test_node_json_keeps_sockets_and_drops_dirty_flag() {
        let mut node = Node::new(3, "OpenRouterNode", Pos2::new(1.0, 2.0));
        node.add_typed_input("user_message", "STRING");
        node.mark_dirty();

        let json = serde_json::to_string(&node).unwrap();
        let restored: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.inputs, node.inputs);
        assert_eq!(restored.position, node.position);
        assert!(!restored.is_dirty());
    }
}
