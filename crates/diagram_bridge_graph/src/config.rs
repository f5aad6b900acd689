// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model configuration: property names and key/copy hooks.

use crate::link::{LinkData, LinkIdentity};
use crate::node::{Key, NodeData};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Property names the engine reads from records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    /// Link property naming the source port
    pub link_from_port_property: String,
    /// Link property naming the target port
    pub link_to_port_property: String,
    /// Node property naming the node category (template)
    pub node_category_property: String,
    /// Node property naming the containing group
    pub node_group_property: String,
    /// Node property marking a node as a group
    pub node_is_group_property: String,
    /// Link property holding the link key, if links are keyed
    pub link_key_property: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            link_from_port_property: "fromPort".to_string(),
            link_to_port_property: "toPort".to_string(),
            node_category_property: "category".to_string(),
            node_group_property: "group".to_string(),
            node_is_group_property: "isGroup".to_string(),
            link_key_property: None,
        }
    }
}

impl ModelConfig {
    /// Set the link key property
    pub fn with_link_key_property(mut self, property: impl Into<String>) -> Self {
        self.link_key_property = Some(property.into());
        self
    }

    /// Link identity policy for this configuration
    pub fn link_identity(&self) -> LinkIdentity {
        LinkIdentity::with_key_property(self.link_key_property.clone())
    }
}

/// Generates a unique key for a node being inserted
pub type NodeKeyFn = Rc<dyn Fn(&NodeData) -> Key>;

/// Generates a unique key for a link being inserted
pub type LinkKeyFn = Rc<dyn Fn(&LinkData) -> Key>;

/// Copies node data for a duplicated node
pub type CopyNodeFn = Rc<dyn Fn(&NodeData) -> NodeData>;

/// Caller-supplied behavior hooks for the engine model
#[derive(Clone, Default)]
pub struct ModelHooks {
    /// Unique key generator for new nodes
    pub make_unique_node_key: Option<NodeKeyFn>,
    /// Unique key generator for new links
    pub make_unique_link_key: Option<LinkKeyFn>,
    /// Copy function for duplicated node data
    pub copy_node_data: Option<CopyNodeFn>,
}

impl ModelHooks {
    /// Set the node key generator
    pub fn with_node_keys(mut self, f: impl Fn(&NodeData) -> Key + 'static) -> Self {
        self.make_unique_node_key = Some(Rc::new(f));
        self
    }

    /// Set the link key generator
    pub fn with_link_keys(mut self, f: impl Fn(&LinkData) -> Key + 'static) -> Self {
        self.make_unique_link_key = Some(Rc::new(f));
        self
    }

    /// Set the node copy function
    pub fn with_node_copier(mut self, f: impl Fn(&NodeData) -> NodeData + 'static) -> Self {
        self.copy_node_data = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for ModelHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHooks")
            .field("make_unique_node_key", &self.make_unique_node_key.is_some())
            .field("make_unique_link_key", &self.make_unique_link_key.is_some())
            .field("copy_node_data", &self.copy_node_data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.node_group_property, "group");
        assert_eq!(config.link_from_port_property, "fromPort");
        assert!(config.link_key_property.is_none());
    }

    #[test]
    fn test_partial_config_from_ron() {
        let config: ModelConfig = ron::from_str("(linkKeyProperty: Some(\"key\"))").unwrap();
        assert_eq!(config.link_key_property.as_deref(), Some("key"));
        assert_eq!(config.node_category_property, "category");
        assert_eq!(config.link_identity().key_property(), Some("key"));
    }
}
