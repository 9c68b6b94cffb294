//! Socket types: the named, typed connection points on a node

use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

/// Index of a socket within its node's input or output list
pub type SocketId = usize;

/// Identifier of a link between an output socket and an input socket
pub type LinkId = usize;

/// Direction of a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketKind {
    Input,
    Output,
}

/// Cosmetic hint telling the renderer how prominently to draw a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorHint {
    #[default]
    Normal,
    Dimmed,
}

impl ColorHint {
    /// Get the color the renderer uses for this hint
    pub fn color(&self) -> Color32 {
        match self {
            ColorHint::Normal => Color32::from_rgb(100, 200, 100),
            ColorHint::Dimmed => Color32::from_rgb(101, 101, 101),
        }
    }
}

/// A connection point on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    pub id: SocketId,
    pub name: String,
    /// Payload type, e.g. "IMAGE"; "*" until narrowed by a link
    pub type_tag: String,
    pub kind: SocketKind,
    /// Link terminating here; only meaningful for inputs
    #[serde(default)]
    pub link: Option<LinkId>,
    #[serde(default)]
    pub color_hint: ColorHint,
    #[serde(with = "pos2_serde", default = "origin")]
    pub position: Pos2,
}

fn origin() -> Pos2 {
    Pos2::ZERO
}

impl Socket {
    /// Creates a new socket
    pub fn new(
        id: SocketId,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        kind: SocketKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            type_tag: type_tag.into(),
            kind,
            link: None,
            color_hint: ColorHint::Normal,
            position: Pos2::ZERO,
        }
    }

    /// Sets the color hint
    pub fn with_color_hint(mut self, hint: ColorHint) -> Self {
        self.color_hint = hint;
        self
    }

    /// Whether a link currently terminates at this socket
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }
}

// Serde helper module for Pos2, shared with `Node`
pub(crate) mod pos2_serde {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(pos: &Pos2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [pos.x, pos.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pos2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Pos2::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_follows_link() {
        let mut socket = Socket::new(0, "image_", "*", SocketKind::Input);
        assert!(!socket.is_connected());

        socket.link = Some(7);
        assert!(socket.is_connected());
        assert_eq!(socket.kind, SocketKind::Input);
    }

    #[test]
    fn test_color_hints_render_differently() {
        assert_eq!(ColorHint::default(), ColorHint::Normal);
        assert_ne!(ColorHint::Normal.color(), ColorHint::Dimmed.color());
    }

    #[test]
    fn test_socket_json_without_optional_fields() {
        let json = r#"{"id":2,"name":"model","type_tag":"STRING","kind":"Input"}"#;
        let socket: Socket = serde_json::from_str(json).unwrap();
        assert_eq!(socket.link, None);
        assert_eq!(socket.color_hint, ColorHint::Normal);
        assert_eq!(socket.position, Pos2::ZERO);
    }
}
