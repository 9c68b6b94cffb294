//! Repeatable input sockets that grow and shrink with their links
//!
//! A node carrying a socket family (every input whose name starts with the
//! family prefix, e.g. `image`) always ends up with:
//!
//! - exactly one unconnected family socket, named `image_`, as the last
//!   family socket,
//! - its connected family sockets named `image_1 .. image_k` in list order,
//! - every other input left exactly where and how it was.
//!
//! The manager keeps no state between calls. Each notification re-derives the
//! desired list from the host's current sockets and issues the edits needed to
//! get there.

use super::error::SocketError;
use super::hooks::NodeLifecycleHooks;
use super::host::{OriginLookup, SocketHost};
use super::naming::{bare_name, name_for_rank};
use super::node::Node;
use super::notification::LinkNotification;
use super::socket::{ColorHint, Socket};
use crate::config::Config;
use crate::constants::sockets::{IMAGE_FAMILY_PREFIX, PLACEHOLDER_TYPE};
use log::{debug, warn};

/// One structural or cosmetic edit issued to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEdit {
    /// Rename a socket in place and set its color hint
    Rename {
        index: usize,
        name: String,
        hint: ColorHint,
    },
    /// Remove the socket at `index`
    Remove { index: usize },
    /// Append a new unconnected family socket
    Append { name: String, type_tag: String },
}

/// Ordered edits turning a socket list into one that satisfies the family rules
///
/// Renames address pre-removal indices and come first; removals follow in
/// descending index order; an append, if any, is last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketEditPlan {
    pub edits: Vec<SocketEdit>,
}

impl SocketEditPlan {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply every edit to the host in order
    pub fn apply<H: SocketHost + ?Sized>(&self, host: &mut H) -> Result<(), SocketError> {
        for edit in &self.edits {
            match edit {
                SocketEdit::Rename { index, name, hint } => {
                    let len = host.sockets().len();
                    let socket = host
                        .socket_mut(*index)
                        .ok_or(SocketError::SocketIndexOutOfRange { index: *index, len })?;
                    socket.name = name.clone();
                    socket.color_hint = *hint;
                }
                SocketEdit::Remove { index } => {
                    host.remove_socket_at(*index)?;
                }
                SocketEdit::Append { name, type_tag } => {
                    host.append_socket(name.clone(), type_tag.clone());
                }
            }
        }
        Ok(())
    }
}

/// Keeps one family of repeatable input sockets in shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicSocketManager {
    family_prefix: String,
    placeholder_type: String,
}

impl Default for DynamicSocketManager {
    fn default() -> Self {
        Self::new(IMAGE_FAMILY_PREFIX, PLACEHOLDER_TYPE)
    }
}

impl DynamicSocketManager {
    pub fn new(family_prefix: impl Into<String>, placeholder_type: impl Into<String>) -> Self {
        Self {
            family_prefix: family_prefix.into(),
            placeholder_type: placeholder_type.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.image_family_prefix, &config.placeholder_type)
    }

    /// Whether `socket` belongs to the family this manager governs
    pub fn is_governed(&self, socket: &Socket) -> bool {
        socket.name.starts_with(&self.family_prefix)
    }

    /// Connected family sockets in rank order
    pub fn connected<'a>(&'a self, sockets: &'a [Socket]) -> impl Iterator<Item = &'a Socket> + 'a {
        sockets
            .iter()
            .filter(move |socket| self.is_governed(socket) && socket.is_connected())
    }

    /// Give a freshly created node its first, unconnected family socket
    pub fn on_node_created<H: SocketHost + ?Sized>(&self, host: &mut H) {
        host.append_socket(bare_name(&self.family_prefix), self.placeholder_type.clone());
        host.mark_dirty();
    }

    /// React to one link attached to or removed from the host's sockets
    pub fn on_link_notification<H: SocketHost + ?Sized>(
        &self,
        host: &mut H,
        notification: &LinkNotification,
        lookup: &dyn OriginLookup,
    ) {
        let governed = host
            .sockets()
            .get(notification.socket_index)
            .map(|socket| self.is_governed(socket));
        match governed {
            Some(false) => return,
            Some(true) => {
                if notification.is_connect() {
                    self.propagate_origin(host, notification, lookup);
                }
            }
            None => warn!(
                "{}",
                SocketError::MalformedNotification(format!(
                    "socket index {} out of range for {} sockets",
                    notification.socket_index,
                    host.sockets().len()
                ))
            ),
        }

        self.settle(host);
    }

    /// Run the re-derivation pass and apply its edits
    pub fn settle<H: SocketHost + ?Sized>(&self, host: &mut H) -> SocketEditPlan {
        let plan = self.plan(host.sockets());
        if !plan.is_empty() {
            debug!("{} socket edits for family {:?}", plan.edits.len(), self.family_prefix);
        }
        if let Err(e) = plan.apply(host) {
            // Plans are derived from the host's own list; this only fires if
            // the host rejected an in-range edit.
            warn!("socket edit rejected by host: {}", e);
        }
        host.mark_dirty();
        plan
    }

    /// Compute the edits that restore the family rules on `sockets`
    pub fn plan(&self, sockets: &[Socket]) -> SocketEditPlan {
        let mut edits = Vec::new();
        let mut removals = Vec::new();
        let mut rank = 0;
        let last_index = sockets.len().checked_sub(1);
        // Last family socket that survives the removals
        let mut tail: Option<(usize, &Socket)> = None;

        for (index, socket) in sockets.iter().enumerate() {
            if !self.is_governed(socket) {
                continue;
            }
            if socket.is_connected() {
                rank += 1;
                self.push_rename(&mut edits, index, socket, name_for_rank(&self.family_prefix, rank), ColorHint::Normal);
                tail = Some((index, socket));
            } else if Some(index) != last_index {
                removals.push(index);
            } else {
                tail = Some((index, socket));
            }
        }

        match tail {
            Some((index, socket)) if !socket.is_connected() => {
                self.push_rename(&mut edits, index, socket, bare_name(&self.family_prefix), ColorHint::Dimmed);
            }
            _ => {}
        }

        edits.extend(removals.into_iter().rev().map(|index| SocketEdit::Remove { index }));

        if tail.map_or(true, |(_, socket)| socket.is_connected()) {
            edits.push(SocketEdit::Append {
                name: bare_name(&self.family_prefix),
                type_tag: self.placeholder_type.clone(),
            });
        }

        SocketEditPlan { edits }
    }

    fn push_rename(
        &self,
        edits: &mut Vec<SocketEdit>,
        index: usize,
        socket: &Socket,
        name: String,
        hint: ColorHint,
    ) {
        if socket.name != name || socket.color_hint != hint {
            edits.push(SocketEdit::Rename { index, name, hint });
        }
    }

    /// Narrow the connected socket's type to its origin's and reset its name
    fn propagate_origin<H: SocketHost + ?Sized>(
        &self,
        host: &mut H,
        notification: &LinkNotification,
        lookup: &dyn OriginLookup,
    ) {
        let type_tag = match self.resolve_origin_type(notification, lookup) {
            Ok(type_tag) => type_tag,
            Err(e) => {
                warn!("skipping type propagation: {}", e);
                return;
            }
        };
        if let Some(socket) = host.socket_mut(notification.socket_index) {
            debug!("socket {} narrowed to {}", notification.socket_index, type_tag);
            socket.type_tag = type_tag;
            socket.name = bare_name(&self.family_prefix);
        }
    }

    fn resolve_origin_type(
        &self,
        notification: &LinkNotification,
        lookup: &dyn OriginLookup,
    ) -> Result<String, SocketError> {
        let origin = notification.connect_origin()?;
        lookup
            .output_socket(origin.node, origin.slot)
            .map(|socket| socket.type_tag.clone())
            .ok_or(SocketError::DanglingOriginReference {
                node: origin.node,
                slot: origin.slot,
            })
    }
}

impl NodeLifecycleHooks for DynamicSocketManager {
    fn on_node_created(&self, node: &mut Node) {
        DynamicSocketManager::on_node_created(self, node);
    }

    fn on_link_changed(&self, node: &mut Node, notification: &LinkNotification, lookup: &dyn OriginLookup) {
        self.on_link_notification(node, notification, lookup);
    }

    fn clone_box(&self) -> Box<dyn NodeLifecycleHooks> {
        Box::new(self.clone())
    }
}
