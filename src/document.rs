//! The document root: builds the output tree from XML events, then writes
//! the wiki page.

use crate::{
    node::{Kind, ListKind, Node},
    writer::IndentedWriter,
};
use std::io;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

/// `asctime`-style timestamp for the generated-date line.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
);

/// The fixed label set for the `#labels` pragma line.
const LABELS: &str = "xml2wiki,Distribution,Featured";

/// Output options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Emit a generated-date line under the page pragmas.
    pub date: bool,
    /// Emit a table-of-contents directive.
    pub toc: bool,
}

/// The root of the output tree plus the construction state driven by the
/// XML event stream.
///
/// Construction and writing are two disjoint phases: the event handlers
/// mutate the tree, and [`write`](Self::write) only reads it.
pub struct Document {
    options: Options,
    /// The body tree.
    root: Node,
    /// The path of open elements from the root to the current insertion
    /// point; the top is "current". A popped node is attached to the new
    /// top on its end tag.
    stack: Vec<Node>,
    /// The `#summary` pragma singleton, fed by `majorheading` content
    /// wherever it occurs in the source.
    summary: Node,
    /// The `#labels` pragma singleton.
    labels: Node,
    /// `chapter`/`unnumbered` nesting depth; only used for heading levels.
    chapter_level: usize,
    /// `section`/`subsection` nesting depth; only used for heading levels.
    section_level: usize,
    /// How many level-1 headings have been seen, for the divider rule.
    divider_count: usize,
}

impl Document {
    /// Creates an empty document.
    pub fn new(options: Options) -> Self {
        let mut labels = Node::new(Kind::Pragma).delim_begin("#labels ");
        labels.push_text(LABELS);
        Self {
            options,
            root: Node::new(Kind::Root),
            stack: Vec::new(),
            summary: Node::new(Kind::Pragma).delim_begin("#summary "),
            labels,
            chapter_level: 0,
            section_level: 0,
            divider_count: 0,
        }
    }

    /// Handles an element start event.
    ///
    /// Maps the element name to a node construction and pushes it as the new
    /// insertion point. Names that only track nesting depth, and names not in
    /// the mapping at all, push a text-suppressing placeholder instead so the
    /// stack stays balanced and stray character data is dropped while any
    /// recognized descendants still render.
    pub fn start_element(&mut self, name: &str, attrs: &[(String, String)]) {
        log::debug!("{:indent$}BEGIN {name} {attrs:?}", "", indent = self.depth());

        let node = match name {
            // The italic prefix keeps bold working on indented lines, which
            // the wiki would otherwise read as a bullet item.
            "b" => Node::new(Kind::Bold).delims("__*", "*"),
            "chapter" | "unnumbered" | "unnumberedsec" => {
                self.chapter_level += 1;
                Node::new(Kind::Unknown).no_text()
            }
            "code" | "command" | "file" | "samp" => Node::new(Kind::Mono).delims("`", "`"),
            "enumerate" => Node::new(Kind::Enumerate).no_text().blank_lines(2),
            "example" => Node::new(Kind::CodeBlock)
                .delims("{{{\n", "\n}}}\n")
                .blank_lines(2),
            "i" => Node::new(Kind::Italic).delims("_", "_"),
            "item" => {
                let kind = match self.current_kind() {
                    Some(Kind::Enumerate) => ListKind::Numbered,
                    Some(Kind::TableRow) => ListKind::TableCell,
                    _ => ListKind::Bulleted,
                };
                let node = Node::new(Kind::Item(kind)).no_text();
                if kind == ListKind::TableCell {
                    node.delims("<td>", "</td>")
                } else {
                    node.blank_lines(1)
                }
            }
            "itemize" => Node::new(Kind::Itemize).no_text().blank_lines(2),
            "majorheading" => Node::new(Kind::SummaryText),
            "para" => match self.current_kind() {
                Some(Kind::Item(ListKind::TableCell)) => Node::new(Kind::Paragraph),
                Some(Kind::Item(ListKind::Numbered)) => {
                    Node::new(Kind::Paragraph).delim_begin("# ").blank_lines(1)
                }
                Some(Kind::Item(ListKind::Bulleted)) => {
                    Node::new(Kind::Paragraph).delim_begin("* ").blank_lines(1)
                }
                _ => Node::new(Kind::Paragraph).blank_lines(2),
            },
            "quotation" => Node::new(Kind::Quotation).no_text().blank_lines(2),
            "section" | "subsection" => {
                self.section_level += 1;
                Node::new(Kind::Unknown).no_text()
            }
            "table" => Node::new(Kind::Table)
                .delims("<table border=\"1\" cellpadding=\"4\">", "</table>")
                .blank_lines(1),
            "tableitem" => Node::new(Kind::TableRow)
                .no_text()
                .delims("<tr>", "</tr>")
                .blank_lines(1),
            "tableterm" => Node::new(Kind::TableTerm).delims("<td width=\"15%\">", "</td>"),
            "title" => self.heading(),
            "uref" => Node::new(Kind::Uref).no_text().delims("[", "]"),
            "urefdesc" => Node::new(Kind::UrefDesc).delim_begin(" "),
            "urefurl" => Node::new(Kind::UrefUrl),
            "xref" => Node::new(Kind::Xref).no_text(),
            "xrefnodename" => Node::new(Kind::XrefTarget),
            _ => {
                log::trace!("UNKNOWN: {name}");
                Node::new(Kind::Unknown).no_text()
            }
        };

        self.stack.push(node);
    }

    /// Handles an element end event.
    ///
    /// Pops the current node and attaches it to its parent, except for the
    /// summary collector, whose content is merged into the `#summary` pragma
    /// singleton instead of appearing in the body.
    pub fn end_element(&mut self, name: &str) {
        match name {
            "chapter" | "unnumbered" | "unnumberedsec" => {
                self.chapter_level = self.chapter_level.saturating_sub(1);
            }
            "section" | "subsection" => {
                self.section_level = self.section_level.saturating_sub(1);
            }
            _ => {}
        }

        let Some(node) = self.stack.pop() else {
            log::warn!("end of <{name}> with no open element");
            return;
        };

        if node.kind() == Kind::SummaryText {
            self.summary.adopt_children(node);
        } else if let Some(parent) = self.stack.last_mut() {
            parent.push_node(node);
        } else {
            self.root.push_node(node);
        }

        log::debug!("{:indent$}END {name}", "", indent = self.depth());
    }

    /// Handles a character data event: the text goes to whichever node is
    /// the current insertion point, which may drop it.
    pub fn text(&mut self, data: &str) {
        log::trace!("{:indent$}[{}]", "", data.trim(), indent = self.depth());
        match self.stack.last_mut() {
            Some(node) => node.push_text(data),
            None => self.root.push_text(data),
        }
    }

    /// Writes the finished page: the pragma lines, the optional date line
    /// and table-of-contents directive, then the body tree and a trailing
    /// newline.
    pub fn write<W: io::Write>(&self, out: &mut IndentedWriter<W>) -> io::Result<()> {
        self.summary.write(out)?;
        out.write_str("\n")?;
        self.labels.write(out)?;
        if self.options.date {
            let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
            let date = now.format(DATE_FORMAT).map_err(io::Error::other)?;
            out.write_str(&format!(
                "\n\n  ===== `[`generated by {} on {date}`]` =====",
                env!("CARGO_PKG_NAME")
            ))?;
        }
        if self.options.toc {
            out.write_str("\n\n<wiki:toc max_depth=\"3\" />")?;
        }
        self.root.write(out)?;
        out.write_str("\n")
    }

    /// Builds a heading node for the current chapter/section depth.
    ///
    /// Level-1 headings get a `----` divider: the first one only when a
    /// table of contents was requested, every later one unconditionally.
    /// That asymmetry is longstanding output-compatible behavior; keep it.
    fn heading(&mut self) -> Node {
        let level = self.chapter_level + self.section_level;
        let marks = "=".repeat(level);
        let mut begin = format!("{marks} ");
        if level == 1 {
            if self.options.toc || self.divider_count > 0 {
                begin.insert_str(0, "----\n");
            }
            self.divider_count += 1;
        }
        Node::new(Kind::Heading)
            .delims(begin, format!(" {marks}\n"))
            .blank_lines(2)
    }

    /// The kind of the current insertion point, if any element is open.
    fn current_kind(&self) -> Option<Kind> {
        self.stack.last().map(Node::kind)
    }

    /// Diagnostic indent width for the construction trace.
    fn depth(&self) -> usize {
        self.stack.len() * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::INDENT_WIDTH;

    fn render(doc: &Document) -> String {
        let mut out = IndentedWriter::new(INDENT_WIDTH, Vec::new());
        doc.write(&mut out).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    /// The pragma prologue shared by every page.
    const PROLOGUE: &str = "#summary \n#labels xml2wiki,Distribution,Featured";

    #[test]
    fn empty_document_renders_pragmas() {
        let doc = Document::new(Options::default());
        assert_eq!(render(&doc), format!("{PROLOGUE}\n"));
    }

    #[test]
    fn majorheading_feeds_summary_pragma() {
        let mut doc = Document::new(Options::default());
        doc.start_element("texinfo", &[]);
        doc.start_element("majorheading", &[]);
        doc.text("My Program");
        doc.end_element("majorheading");
        doc.end_element("texinfo");
        assert_eq!(
            render(&doc),
            "#summary My Program\n#labels xml2wiki,Distribution,Featured\n"
        );
    }

    #[test]
    fn heading_level_tracks_chapter_and_section_depth() {
        let mut doc = Document::new(Options::default());
        doc.start_element("chapter", &[]);
        doc.start_element("section", &[]);
        doc.start_element("title", &[]);
        doc.text("Deep");
        doc.end_element("title");
        doc.end_element("section");
        doc.end_element("chapter");
        assert_eq!(render(&doc), format!("{PROLOGUE}\n\n== Deep ==\n\n"));
    }

    #[test]
    fn first_divider_only_with_toc() {
        let mut doc = Document::new(Options::default());
        for title in ["A", "B"] {
            doc.start_element("chapter", &[]);
            doc.start_element("title", &[]);
            doc.text(title);
            doc.end_element("title");
            doc.end_element("chapter");
        }
        assert_eq!(
            render(&doc),
            format!("{PROLOGUE}\n\n= A =\n\n----\n= B =\n\n")
        );
    }

    #[test]
    fn toc_forces_divider_on_first_heading() {
        let mut doc = Document::new(Options {
            toc: true,
            ..Options::default()
        });
        doc.start_element("chapter", &[]);
        doc.start_element("title", &[]);
        doc.text("A");
        doc.end_element("title");
        doc.end_element("chapter");
        assert_eq!(
            render(&doc),
            format!("{PROLOGUE}\n\n<wiki:toc max_depth=\"3\" />\n\n----\n= A =\n\n")
        );
    }

    #[test]
    fn unnumbered_end_restores_chapter_depth() {
        let mut doc = Document::new(Options::default());
        doc.start_element("unnumbered", &[]);
        doc.end_element("unnumbered");
        doc.start_element("chapter", &[]);
        doc.start_element("title", &[]);
        doc.text("T");
        doc.end_element("title");
        doc.end_element("chapter");
        assert_eq!(render(&doc), format!("{PROLOGUE}\n\n= T =\n\n"));
    }

    #[test]
    fn item_markers_follow_list_kind() {
        let mut doc = Document::new(Options::default());
        for (list, _marker) in [("enumerate", "# "), ("itemize", "* ")] {
            doc.start_element(list, &[]);
            doc.start_element("item", &[]);
            doc.start_element("para", &[]);
            doc.text("x");
            doc.end_element("para");
            doc.end_element("item");
            doc.end_element(list);
        }
        assert_eq!(render(&doc), format!("{PROLOGUE}\n\n    # x\n\n    * x\n"));
    }

    #[test]
    fn table_cell_item_has_no_marker_or_spacing() {
        let mut doc = Document::new(Options::default());
        doc.start_element("table", &[]);
        doc.start_element("tableitem", &[]);
        doc.start_element("tableterm", &[]);
        doc.text("k");
        doc.end_element("tableterm");
        doc.start_element("item", &[]);
        doc.start_element("para", &[]);
        doc.text("v");
        doc.end_element("para");
        doc.end_element("item");
        doc.end_element("tableitem");
        doc.end_element("table");
        assert_eq!(
            render(&doc),
            format!(
                "{PROLOGUE}\n<table border=\"1\" cellpadding=\"4\">\
                 \n<tr><td width=\"15%\">k</td><td>v</td></tr></table>\n"
            )
        );
    }

    #[test]
    fn unknown_element_drops_text_but_not_children() {
        let mut doc = Document::new(Options::default());
        doc.start_element("mystery", &[]);
        doc.text("dropped");
        doc.start_element("b", &[]);
        doc.text("kept");
        doc.end_element("b");
        doc.end_element("mystery");
        assert_eq!(render(&doc), format!("{PROLOGUE}__*kept*\n"));
    }
}
