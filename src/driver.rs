//! Glue between the streaming XML parser and the document builder.

use crate::document::Document;
use quick_xml::{
    Reader,
    events::{Event, attributes::AttrError},
};
use std::io::BufRead;

/// The result type for driving the parser.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors that may occur while reading the XML input.
///
/// All of these are fatal; the input is expected to be well-formed and no
/// recovery is attempted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A malformed attribute inside an element start tag.
    #[error("malformed attribute: {0}")]
    Attr(#[from] AttrError),

    /// A parse or I/O error from the XML reader.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Feeds every XML event from `input` into `doc`.
///
/// Empty elements are expanded so `<x/>` produces the same start/end pair as
/// `<x></x>`. Element and attribute names in this vocabulary are plain ASCII,
/// so they are decoded lossily without a namespace pass.
pub fn feed<R: BufRead>(input: R, doc: &mut Document) -> Result<()> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().expand_empty_elements = true;

    let mut buf = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                depth += 1;
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let attrs = start
                    .attributes()
                    .map(|attr| {
                        let attr = attr?;
                        Ok((
                            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                            String::from_utf8_lossy(&attr.value).into_owned(),
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                doc.start_element(&name, &attrs);
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                doc.end_element(&String::from_utf8_lossy(end.name().as_ref()));
            }
            // Text outside the root element is prolog/epilog whitespace,
            // which is not character data.
            Event::Text(text) if depth > 0 => {
                doc.text(&text.unescape().map_err(quick_xml::Error::from)?);
            }
            Event::CData(data) if depth > 0 => {
                doc.text(&String::from_utf8_lossy(&data.into_inner()));
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry nothing for the output tree.
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
