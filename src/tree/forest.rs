// src/tree/forest.rs
//! Page nodes and the traversal primitives every cache operation goes through.

use crate::types::PageId;
use serde::Serialize;

/// One page in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNode {
    pub id: PageId,
    pub name: String,
    /// Optimistically true until the page's children have been listed.
    pub has_children: bool,
    pub children: Vec<PageNode>,
    /// Whether `children` is the complete listing from the remote store.
    #[serde(skip)]
    pub children_loaded: bool,
}

impl PageNode {
    /// A node whose children are not known yet.
    pub fn unresolved(id: PageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            has_children: true,
            children: Vec::new(),
            children_loaded: false,
        }
    }

    /// A node discovered in a children listing.
    pub fn listed(id: PageId, name: impl Into<String>, has_children: bool) -> Self {
        Self {
            id,
            name: name.into(),
            has_children,
            children: Vec::new(),
            children_loaded: false,
        }
    }

    /// Replaces this node's children with a fresh listing, keeping what is
    /// already known below children that are still present.
    pub fn adopt_listing(&mut self, listing: Vec<PageNode>) {
        let mut previous = std::mem::take(&mut self.children);
        self.children = listing
            .into_iter()
            .map(|mut fresh| {
                if let Some(at) = previous.iter().position(|known| known.id == fresh.id) {
                    let known = previous.swap_remove(at);
                    fresh.has_children |= !known.children.is_empty();
                    fresh.children = known.children;
                    fresh.children_loaded = known.children_loaded;
                }
                fresh
            })
            .collect();
        self.has_children = !self.children.is_empty();
        self.children_loaded = true;
    }
}

/// An entry of a root-to-page path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub id: PageId,
    pub name: String,
}

impl From<&PageNode> for Breadcrumb {
    fn from(node: &PageNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
        }
    }
}

/// Depth-first search for a page.
pub fn find<'a>(forest: &'a [PageNode], id: &PageId) -> Option<&'a PageNode> {
    forest.iter().find_map(|node| {
        if &node.id == id {
            Some(node)
        } else {
            find(&node.children, id)
        }
    })
}

pub fn find_mut<'a>(forest: &'a mut [PageNode], id: &PageId) -> Option<&'a mut PageNode> {
    for node in forest.iter_mut() {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// The node whose children contain `id`. Roots have no parent.
pub fn find_parent<'a>(forest: &'a [PageNode], id: &PageId) -> Option<&'a PageNode> {
    forest.iter().find_map(|node| {
        if node.children.iter().any(|child| &child.id == id) {
            Some(node)
        } else {
            find_parent(&node.children, id)
        }
    })
}

/// Nodes from a root down to `id`, inclusive.
pub fn path_to<'a>(forest: &'a [PageNode], id: &PageId) -> Option<Vec<&'a PageNode>> {
    let mut path = Vec::new();
    let mut current = id;
    loop {
        let node = find(forest, current)?;
        path.push(node);
        match find_parent(forest, current) {
            Some(parent) => current = &parent.id,
            None => break,
        }
        // a page cannot be its own ancestor
        if path.len() > forest_size(forest) {
            return None;
        }
    }
    path.reverse();
    Some(path)
}

fn forest_size(forest: &[PageNode]) -> usize {
    forest
        .iter()
        .map(|node| 1 + forest_size(&node.children))
        .sum()
}

/// Attaches a top-down chain of pages under `anchor`, or as a new root when
/// there is no anchor. Pages already present at a level are reused.
///
/// Returns false when the anchor is not in the forest.
pub fn graft(forest: &mut Vec<PageNode>, anchor: Option<&PageId>, chain: Vec<PageNode>) -> bool {
    let mut siblings: &mut Vec<PageNode> = match anchor {
        Some(anchor) => match find_mut(forest, anchor) {
            Some(node) => {
                if !chain.is_empty() {
                    node.has_children = true;
                }
                &mut node.children
            }
            None => return false,
        },
        None => forest,
    };

    for page in chain {
        let at = match siblings.iter().position(|node| node.id == page.id) {
            Some(at) => at,
            None => {
                siblings.push(page);
                siblings.len() - 1
            }
        };
        siblings = &mut siblings[at].children;
    }
    true
}
