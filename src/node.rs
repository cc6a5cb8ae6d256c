//! The output tree: one node per piece of generated wiki markup.

use crate::writer::{INDENT_WIDTH, IndentedWriter};
use std::{borrow::Cow, io};

/// The kind of list construct an `item` belongs to.
///
/// Decided at construction time from the enclosing node, so a child never
/// needs to look back up the tree to pick its own marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Inside an `enumerate`; paragraphs get a `# ` marker.
    Numbered,
    /// Inside an `itemize` (or anything else); paragraphs get a `* ` marker.
    Bulleted,
    /// Inside a table row; the item becomes a `<td>` cell.
    TableCell,
}

/// The closed set of node behaviors.
///
/// Every behavior is a parameterization of [`Node`]'s configuration data;
/// the only ones the write pass dispatches on are the indentation-scoped
/// kinds and the anchor-synthesizing [`XrefTarget`](Kind::XrefTarget).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The document root.
    Root,
    /// Placeholder for unrecognized elements; drops its own text but still
    /// renders recognized child elements.
    Unknown,
    /// `<b>`: `__*` / `*`.
    Bold,
    /// `<i>`: `_` / `_`.
    Italic,
    /// `<code>`, `<command>`, `<file>`, `<samp>`: backtick-quoted.
    Mono,
    /// `<example>`: `{{{` fenced code block.
    CodeBlock,
    /// `<enumerate>`: indentation-scoped numbered list.
    Enumerate,
    /// `<itemize>`: indentation-scoped bulleted list.
    Itemize,
    /// `<quotation>`: indentation-scoped block.
    Quotation,
    /// `<item>`, with the context of its enclosing list construct.
    Item(ListKind),
    /// `<para>`.
    Paragraph,
    /// `<table>`: HTML fallback.
    Table,
    /// `<tableitem>`: an HTML table row.
    TableRow,
    /// `<tableterm>`: an HTML header cell.
    TableTerm,
    /// `<title>`: a `= ... =` heading.
    Heading,
    /// A `#summary`/`#labels` page metadata line.
    Pragma,
    /// Collector for `<majorheading>` content; merged into the `#summary`
    /// pragma instead of being attached to the body.
    SummaryText,
    /// `<uref>`: `[url description]` external link wrapper.
    Uref,
    /// `<urefdesc>`: link description, separated by a single space.
    UrefDesc,
    /// `<urefurl>`: link target, passed through.
    UrefUrl,
    /// `<xref>`: cross-reference wrapper.
    Xref,
    /// `<xrefnodename>`: anchor-synthesizing inline link.
    XrefTarget,
}

/// One entry in a node's ordered child sequence.
#[derive(Debug)]
pub enum Child {
    Node(Node),
    Text(String),
}

/// A unit of the output tree.
#[derive(Debug)]
pub struct Node {
    kind: Kind,
    /// If false, character data destined for this node is silently dropped.
    accepts_text: bool,
    /// Reserved whitespace-stripping policy flag; not enforced yet.
    #[allow(dead_code)]
    strip_whitespace: bool,
    /// Literal text emitted immediately before the children.
    delim_begin: Option<Cow<'static, str>>,
    /// Literal text emitted immediately after the children.
    delim_end: Option<Cow<'static, str>>,
    /// Minimum number of blank lines separating this node from whatever
    /// precedes it in the output stream.
    min_blank_lines: usize,
    children: Vec<Child>,
}

impl Node {
    /// Creates a node with the default configuration: accepts text, no
    /// delimiters, no spacing requirement.
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            accepts_text: true,
            strip_whitespace: true,
            delim_begin: None,
            delim_end: None,
            min_blank_lines: 0,
            children: Vec::new(),
        }
    }

    /// Sets both delimiters.
    pub fn delims(
        mut self,
        begin: impl Into<Cow<'static, str>>,
        end: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.delim_begin = Some(begin.into());
        self.delim_end = Some(end.into());
        self
    }

    /// Sets the begin delimiter only.
    pub fn delim_begin(mut self, begin: impl Into<Cow<'static, str>>) -> Self {
        self.delim_begin = Some(begin.into());
        self
    }

    /// Requires at least `count` blank lines before this node.
    pub fn blank_lines(mut self, count: usize) -> Self {
        self.min_blank_lines = count;
        self
    }

    /// Drops character data instead of accepting it.
    pub fn no_text(mut self) -> Self {
        self.accepts_text = false;
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Appends a child node. Insertion order is output order.
    pub fn push_node(&mut self, child: Node) {
        self.children.push(Child::Node(child));
    }

    /// Appends literal text, unless this node suppresses text.
    pub fn push_text(&mut self, text: &str) {
        if self.accepts_text {
            self.children.push(Child::Text(text.to_owned()));
        }
    }

    /// Moves all of `other`'s children onto the end of this node.
    pub fn adopt_children(&mut self, mut other: Node) {
        self.children.append(&mut other.children);
    }

    /// Writes this node and its subtree to `out`.
    ///
    /// First satisfies the blank-line requirement by emitting only the
    /// deficit against the writer's trailing-newline count, then serializes
    /// according to the node's kind.
    pub fn write<W: io::Write>(&self, out: &mut IndentedWriter<W>) -> io::Result<()> {
        for _ in 0..self.min_blank_lines.saturating_sub(out.newline_count()) {
            out.write_str("\n")?;
        }

        match self.kind {
            // Everything under an active list or quotation renders one
            // indent level deeper.
            Kind::Enumerate | Kind::Itemize | Kind::Quotation => {
                out.increase();
                self.write_inner(out)?;
                out.decrease();
            }
            // The anchor target can only be derived from content rendered at
            // write time, so the children go through an isolated buffer
            // first.
            Kind::XrefTarget => {
                let mut buf = IndentedWriter::new(INDENT_WIDTH, Vec::new());
                self.write_inner(&mut buf)?;
                let label = String::from_utf8_lossy(&buf.into_inner()).into_owned();
                let anchor = label.replace(' ', "_");
                out.write_str(&format!("[#{anchor} {label}]"))?;
            }
            _ => self.write_inner(out)?,
        }

        Ok(())
    }

    /// Default serialization: begin delimiter, children in order, end
    /// delimiter.
    fn write_inner<W: io::Write>(&self, out: &mut IndentedWriter<W>) -> io::Result<()> {
        if let Some(begin) = &self.delim_begin {
            out.write_str(begin)?;
        }
        for child in &self.children {
            match child {
                Child::Node(node) => node.write(out)?,
                Child::Text(text) => out.write_str(text)?,
            }
        }
        if let Some(end) = &self.delim_end {
            out.write_str(end)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(node: &Node) -> String {
        let mut out = IndentedWriter::new(INDENT_WIDTH, Vec::new());
        node.write(&mut out).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn delimiters_wrap_children() {
        let mut node = Node::new(Kind::Bold).delims("__*", "*");
        node.push_text("strong");
        assert_eq!(render(&node), "__*strong*");
    }

    #[test]
    fn suppressed_text_is_dropped() {
        let mut node = Node::new(Kind::Unknown).no_text();
        node.push_text("invisible");
        let mut inner = Node::new(Kind::Italic).delims("_", "_");
        inner.push_text("visible");
        node.push_node(inner);
        assert_eq!(render(&node), "_visible_");
    }

    #[test]
    fn blank_line_deficit_only() {
        let mut out = IndentedWriter::new(INDENT_WIDTH, Vec::new());
        out.write_str("before\n").unwrap();

        let mut node = Node::new(Kind::Paragraph).blank_lines(2);
        node.push_text("after");
        node.write(&mut out).unwrap();

        // One newline already pending, so only one more is owed.
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, "before\n\nafter");
    }

    #[test]
    fn satisfied_blank_lines_add_nothing() {
        let mut out = IndentedWriter::new(INDENT_WIDTH, Vec::new());
        out.write_str("before\n\n\n").unwrap();

        let mut node = Node::new(Kind::Paragraph).blank_lines(2);
        node.push_text("after");
        node.write(&mut out).unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, "before\n\n\nafter");
    }

    #[test]
    fn indentation_scope_is_balanced() {
        let mut quote = Node::new(Kind::Quotation).no_text();
        let mut para = Node::new(Kind::Paragraph);
        para.push_text("inner\n");
        quote.push_node(para);

        let mut out = IndentedWriter::new(INDENT_WIDTH, Vec::new());
        out.write_str("x\n").unwrap();
        quote.write(&mut out).unwrap();
        out.write_str("outer\n").unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, "x\n    inner\nouter\n");
    }

    #[test]
    fn anchor_link_from_rendered_text() {
        let mut node = Node::new(Kind::XrefTarget);
        node.push_text("Foo Bar");
        assert_eq!(render(&node), "[#Foo_Bar Foo Bar]");
    }
}
