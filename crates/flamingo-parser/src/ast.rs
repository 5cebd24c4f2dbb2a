//! Abstract Syntax Tree for Flamingo components.
//!
//! Every node records where it starts and ends in the source. The tree is
//! built once by the parser and only read afterwards.

use flamingo_lexer::Pos;

/// A compiled unit: an optional raw code block followed by markup.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub code_block: Option<CodeBlock>,
    pub fragment: Fragment,
}

/// Verbatim code between the `---` fences at the top of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Start of the opening fence.
    pub top_fence: Pos,
    /// End of the closing fence.
    pub bottom_fence: Pos,
    pub code: String,
}

/// An ordered run of sibling nodes with no tag of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub start: Pos,
    pub end: Pos,
    pub nodes: Vec<RenderNode>,
}

/// A tag or component invocation.
///
/// Self-closing elements have no children and the same shape as an
/// element closed by an explicit matching tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// The `<` of the opening tag.
    pub start: Pos,
    /// One past the `>` of the closing tag (or of `/>`).
    pub end: Pos,
    pub name: Ident,
    /// In source order; duplicates are kept.
    pub attributes: Vec<Attribute>,
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub pos: Pos,
    pub name: String,
}

impl Ident {
    pub fn end(&self) -> Pos {
        self.pos + self.name.len()
    }
}

/// `name="value"`, or a bare `name` whose value is `"true"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: Ident,
    pub value: String,
    pub end: Pos,
}

/// Character data between tags, trimmed at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub pos: Pos,
    pub literal: String,
}

impl Text {
    pub fn end(&self) -> Pos {
        self.pos + self.literal.len()
    }
}

/// A node that can appear in a content position.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Fragment(Fragment),
    Element(Element),
    Text(Text),
}

impl RenderNode {
    pub fn as_node(&self) -> Node<'_> {
        match self {
            RenderNode::Fragment(f) => Node::Fragment(f),
            RenderNode::Element(e) => Node::Element(e),
            RenderNode::Text(t) => Node::Text(t),
        }
    }

    pub fn start(&self) -> Pos {
        self.as_node().start()
    }

    pub fn end(&self) -> Pos {
        self.as_node().end()
    }
}

/// A borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    File(&'a File),
    CodeBlock(&'a CodeBlock),
    Fragment(&'a Fragment),
    Element(&'a Element),
    Ident(&'a Ident),
    Attribute(&'a Attribute),
    Text(&'a Text),
}

impl<'a> Node<'a> {
    pub fn start(&self) -> Pos {
        match self {
            Node::File(f) => match &f.code_block {
                Some(block) => block.top_fence,
                None => f.fragment.start,
            },
            Node::CodeBlock(c) => c.top_fence,
            Node::Fragment(f) => f.start,
            Node::Element(e) => e.start,
            Node::Ident(i) => i.pos,
            Node::Attribute(a) => a.name.pos,
            Node::Text(t) => t.pos,
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Node::File(f) => match &f.code_block {
                Some(block) => block.bottom_fence.max(f.fragment.end),
                None => f.fragment.end,
            },
            Node::CodeBlock(c) => c.bottom_fence,
            Node::Fragment(f) => f.end,
            Node::Element(e) => e.end,
            Node::Ident(i) => i.end(),
            Node::Attribute(a) => a.end,
            Node::Text(t) => t.end(),
        }
    }

    /// Short label used in logs and test failures.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::File(_) => "File",
            Node::CodeBlock(_) => "CodeBlock",
            Node::Fragment(_) => "Fragment",
            Node::Element(_) => "Element",
            Node::Ident(_) => "Ident",
            Node::Attribute(_) => "Attribute",
            Node::Text(_) => "Text",
        }
    }
}

impl<'a> From<&'a File> for Node<'a> {
    fn from(file: &'a File) -> Self {
        Node::File(file)
    }
}

impl<'a> From<&'a Element> for Node<'a> {
    fn from(el: &'a Element) -> Self {
        Node::Element(el)
    }
}

impl<'a> From<&'a RenderNode> for Node<'a> {
    fn from(node: &'a RenderNode) -> Self {
        node.as_node()
    }
}
