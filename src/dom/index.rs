use crate::dom::element::ElementNode;
use std::cell::OnceCell;
use std::ops::Range;

/// Position of a node in document (pre-)order
pub type NodeId = usize;

#[derive(Debug)]
struct Entry<'a> {
    node: &'a ElementNode,
    parent: Option<NodeId>,
    /// One past the last descendant
    subtree_end: NodeId,
}

/// Flat, document-ordered view over a [`ElementNode`] tree.
///
/// Pre-order numbering makes every subtree a contiguous id range, so
/// "descendants in document order" is a slice. Text content is computed
/// lazily and cached per node.
#[derive(Debug)]
pub struct DomIndex<'a> {
    entries: Vec<Entry<'a>>,
    texts: Vec<OnceCell<String>>,
}

impl<'a> DomIndex<'a> {
    pub fn new(root: &'a ElementNode) -> Self {
        let mut entries: Vec<Entry<'a>> = Vec::new();
        // (node, parent, entry id once pushed)
        let mut stack: Vec<(&'a ElementNode, Option<NodeId>, bool)> = vec![(root, None, false)];
        let mut open: Vec<NodeId> = Vec::new();

        while let Some((node, parent, visited)) = stack.pop() {
            if visited {
                if let Some(id) = open.pop() {
                    entries[id].subtree_end = entries.len();
                }
                continue;
            }

            let id = entries.len();
            entries.push(Entry { node, parent, subtree_end: id + 1 });
            open.push(id);
            stack.push((node, parent, true));
            for child in node.children.iter().rev() {
                stack.push((child, Some(id), false));
            }
        }

        let texts = (0..entries.len()).map(|_| OnceCell::new()).collect();
        Self { entries, texts }
    }

    /// Number of nodes, text nodes included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &'a ElementNode {
        self.entries[id].node
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries[id].parent
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Ids of all descendants in document order
    pub fn descendants(&self, id: NodeId) -> Range<NodeId> {
        id + 1..self.entries[id].subtree_end
    }

    /// Element descendants (text nodes skipped) in document order
    pub fn descendant_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(id).filter(move |&d| !self.entries[d].node.is_text())
    }

    /// All element ids in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.entries.len()).filter(move |&id| !self.entries[id].node.is_text())
    }

    /// DOM `textContent` of the node, cached
    pub fn text(&self, id: NodeId) -> &str {
        self.texts[id].get_or_init(|| self.entries[id].node.text())
    }

    /// Whether any descendant element has the given tag
    pub fn has_descendant_tag(&self, id: NodeId, tag: &str) -> bool {
        self.descendant_elements(id).any(|d| self.node(d).is_tag(tag))
    }

    /// First descendant element with the given tag
    pub fn first_descendant_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendant_elements(id).find(|&d| self.node(d).is_tag(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ElementNode {
        // body(0) > [ul(1) > [li(2) > [a(3) > [img(4)], #text(5)], li(6)], p(7) > #text(8)]
        ElementNode::new("body")
            .with_child(
                ElementNode::new("ul")
                    .with_child(
                        ElementNode::new("li")
                            .with_child(ElementNode::new("a").with_child(ElementNode::new("img")))
                            .with_text("Mug"),
                    )
                    .with_child(ElementNode::new("li")),
            )
            .with_child(ElementNode::new("p").with_text("footer"))
    }

    #[test]
    fn test_preorder_numbering() {
        let root = sample();
        let index = DomIndex::new(&root);

        assert_eq!(index.len(), 9);
        let tags: Vec<_> = (0..index.len()).map(|i| index.node(i).tag_name.as_str()).collect();
        assert_eq!(tags, vec!["body", "ul", "li", "a", "img", "#text", "li", "p", "#text"]);
    }

    #[test]
    fn test_parent_and_ancestors() {
        let root = sample();
        let index = DomIndex::new(&root);

        assert_eq!(index.parent(0), None);
        assert_eq!(index.parent(4), Some(3));
        assert_eq!(index.ancestors(4).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
        assert_eq!(index.ancestors(0).count(), 0);
    }

    #[test]
    fn test_descendant_ranges() {
        let root = sample();
        let index = DomIndex::new(&root);

        assert_eq!(index.descendants(1), 2..7);
        assert_eq!(index.descendants(2), 3..6);
        assert!(index.descendants(6).is_empty());
        assert_eq!(index.descendant_elements(2).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_tag_queries_and_text() {
        let root = sample();
        let index = DomIndex::new(&root);

        assert!(index.has_descendant_tag(2, "img"));
        assert!(!index.has_descendant_tag(6, "img"));
        assert_eq!(index.first_descendant_tag(0, "IMG"), Some(4));
        assert_eq!(index.text(0), "Mugfooter");
        assert_eq!(index.text(2), "Mug");
        assert_eq!(index.elements().count(), 7);
    }
}
