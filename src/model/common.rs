use super::Block;
use crate::types::BlockId;
use serde::{Deserialize, Serialize};

/// Common fields for all blocks
///
/// `id` is `None` for blocks that exist only locally (for example blocks
/// freshly parsed from editor markup) until the remote store assigns one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockCommon {
    pub id: Option<BlockId>,
    pub children: Vec<Block>,
    pub has_children: bool,
}

impl BlockCommon {
    pub fn new(id: Option<BlockId>) -> Self {
        Self {
            id,
            children: Vec::new(),
            has_children: false,
        }
    }

    /// Attaches children, keeping `has_children` in step with the list.
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }

    /// Whether children are known to exist remotely but have not been fetched.
    pub fn has_unfetched_children(&self) -> bool {
        self.has_children && self.children.is_empty()
    }
}
