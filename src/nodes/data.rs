//! Values flowing between nodes at execution time

use serde::{Deserialize, Serialize};

/// Encoded image handed over by an upstream node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Encoded bytes, e.g. PNG
    pub bytes: Vec<u8>,
}

/// Core data types that flow between nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeData {
    Image(ImageData),
    Float(f32),
    Integer(i64),
    String(String),
    Boolean(bool),
    None, // Empty/null value
}

impl NodeData {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeData::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            NodeData::Float(f) => Some(*f),
            NodeData::Integer(i) => Some(*i as f32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NodeData::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageData> {
        match self {
            NodeData::Image(image) => Some(image),
            _ => None,
        }
    }
}
