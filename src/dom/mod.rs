//! DOM snapshot module
//!
//! This module provides the page model the extractor runs against:
//! - ElementNode: Representation of DOM elements and text nodes
//! - DomTree: One page snapshot, taken from a live tab or parsed from markup
//! - DomIndex: Document-order arena for ancestor and descendant queries

pub mod element;
pub mod html;
pub mod index;
pub mod tree;

pub use element::{BoundingBox, ElementNode};
pub use index::{DomIndex, NodeId};
pub use tree::DomTree;

use crate::error::Result;
use headless_chrome::Tab;
use std::sync::Arc;

/// Extract the DOM tree from a browser tab
pub fn extract_dom(tab: &Arc<Tab>) -> Result<DomTree> {
    DomTree::from_tab(tab)
}
