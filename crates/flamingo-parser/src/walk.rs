//! Pre-order traversal over the AST.
//!
//! A [`Visitor`] is shown each node before its children and decides whether
//! to descend, descend with a different visitor, or skip the subtree.
//! Children are visited in declaration order:
//!
//! ```text
//! File      -> Fragment
//! Fragment  -> nodes
//! Element   -> name, attributes, children
//! Attribute -> name
//! ```

use crate::ast::Node;

/// What to do after visiting a node.
#[derive(Debug)]
pub enum Visit<V> {
    /// Descend into the children with the same visitor.
    Continue,
    /// Descend into the children with another visitor.
    Switch(V),
    /// Do not descend. Siblings are still visited.
    Skip,
}

pub trait Visitor<'ast>: Sized {
    fn visit(&mut self, node: Node<'ast>) -> Visit<Self>;

    /// Called after the children of a node have been walked, on the
    /// visitor that walked them. Not called for skipped nodes.
    fn leave(&mut self, _node: Node<'ast>) {}
}

/// Walk `node` and its descendants.
pub fn walk<'ast, V: Visitor<'ast>>(visitor: &mut V, node: impl Into<Node<'ast>>) {
    let node = node.into();
    match visitor.visit(node) {
        Visit::Skip => {}
        Visit::Continue => {
            walk_children(visitor, node);
            visitor.leave(node);
        }
        Visit::Switch(mut next) => {
            walk_children(&mut next, node);
            next.leave(node);
        }
    }
}

fn walk_children<'ast, V: Visitor<'ast>>(visitor: &mut V, node: Node<'ast>) {
    match node {
        Node::File(file) => walk(visitor, Node::Fragment(&file.fragment)),
        Node::Fragment(fragment) => {
            for child in &fragment.nodes {
                walk(visitor, child);
            }
        }
        Node::Element(el) => {
            walk(visitor, Node::Ident(&el.name));
            for attr in &el.attributes {
                walk(visitor, Node::Attribute(attr));
            }
            for child in &el.children {
                walk(visitor, child);
            }
        }
        Node::Attribute(attr) => walk(visitor, Node::Ident(&attr.name)),
        Node::CodeBlock(_) | Node::Ident(_) | Node::Text(_) => {}
    }
}

struct Inspector<F>(F);

impl<'ast, F> Visitor<'ast> for Inspector<F>
where
    F: FnMut(Node<'ast>) -> bool,
{
    fn visit(&mut self, node: Node<'ast>) -> Visit<Self> {
        if (self.0)(node) {
            Visit::Continue
        } else {
            Visit::Skip
        }
    }
}

/// Walk the tree calling `f` on every node; returning `false` skips that
/// node's children.
pub fn inspect<'ast, F>(node: impl Into<Node<'ast>>, f: F)
where
    F: FnMut(Node<'ast>) -> bool,
{
    walk(&mut Inspector(f), node);
}
