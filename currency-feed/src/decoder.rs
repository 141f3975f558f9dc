//! RSS envelope decoding.
//!
//! Only `rss > channel > item` elements and their `description` / `pubDate`
//! children are read; everything else in the document is skipped. quick-xml
//! is built with its `encoding` feature, so an XML declaration such as
//! `encoding="windows-1257"` is honored when text is decoded.

use quick_xml::Reader;
use quick_xml::events::Event;

use currency_types::FeedError;

/// One `<item>` of the feed, exactly as published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    /// Rate line, e.g. `AUD 1.70010000 BRL 6.22330000`
    pub description: String,
    /// Publication timestamp, e.g. `Wed, 03 Jan 2024 12:00:00 +0200`
    pub pub_date: String,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Description,
    PubDate,
}

impl FeedItem {
    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Description => &mut self.description,
            Field::PubDate => &mut self.pub_date,
        }
    }
}

// Depth of the open-element stack at which each element starts.
const ITEM_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

/// Decodes a feed document into its items, in document order.
///
/// A document with a channel but no items decodes to an empty `Vec`.
///
/// # Errors
///
/// [`FeedError::Decode`] when the input is not well-formed XML: empty input,
/// no root element, mismatched or unclosed tags, or undecodable text.
pub fn decode(bytes: &[u8]) -> Result<Vec<FeedItem>, FeedError> {
    // Text is kept untrimmed: a field split by a comment or a CDATA section
    // must keep the whitespace between its segments. Fields are trimmed once
    // when they close.
    let mut reader = Reader::from_reader(bytes);

    let mut items = Vec::new();
    let mut buf = Vec::new();
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field: Option<Field> = None;
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if open.is_empty() {
                    if saw_root {
                        return Err(decode_error("multiple root elements"));
                    }
                    saw_root = true;
                }

                match (open.len(), name.as_slice()) {
                    (ITEM_DEPTH, b"item") if open[1] == b"channel" => {
                        current = Some(FeedItem::default());
                    }
                    (FIELD_DEPTH, b"description") if current.is_some() => {
                        field = Some(Field::Description);
                    }
                    (FIELD_DEPTH, b"pubDate") if current.is_some() => {
                        field = Some(Field::PubDate);
                    }
                    _ => {}
                }
                open.push(name);
            }
            Ok(Event::Empty(e)) => {
                if open.is_empty() {
                    if saw_root {
                        return Err(decode_error("multiple root elements"));
                    }
                    saw_root = true;
                }
                // `<item/>` is an item with no rate line; keep it so the caller sees it.
                if open.len() == ITEM_DEPTH
                    && open[1] == b"channel"
                    && e.local_name().as_ref() == b"item"
                {
                    items.push(FeedItem::default());
                }
            }
            Ok(Event::End(_)) => {
                // quick-xml has already checked that the name matches the open tag.
                let closed = open.pop();
                match open.len() {
                    FIELD_DEPTH => {
                        if let (Some(item), Some(f)) = (current.as_mut(), field.take()) {
                            let text = item.field_mut(f);
                            *text = text.trim().to_string();
                        }
                    }
                    ITEM_DEPTH if closed.as_deref() == Some(b"item".as_slice()) => {
                        if let Some(item) = current.take() {
                            items.push(item);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = e.unescape().map_err(|e| decode_error(&e.to_string()))?;
                    item.field_mut(f).push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = e.decode().map_err(|e| decode_error(&e.to_string()))?;
                    item.field_mut(f).push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(decode_error(&e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(decode_error("EOF: no root element"));
    }
    if let Some(name) = open.last() {
        return Err(decode_error(&format!(
            "unexpected EOF inside <{}>",
            String::from_utf8_lossy(name)
        )));
    }

    Ok(items)
}

fn decode_error(reason: &str) -> FeedError {
    FeedError::Decode(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_ITEMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Bank of Latvia ECB rates</title>
        <item>
            <title>01.01.2024</title>
            <pubDate>Mon, 01 Jan 2024 12:00:00 +0200</pubDate>
            <description>USD 1.10000000 EUR 0.90000000</description>
        </item>
        <item>
            <pubDate>Wed, 03 Jan 2024 12:00:00 +0200</pubDate>
            <description><![CDATA[ USD 1.30000000 EUR 0.70000000 ]]></description>
        </item>
        <item>
            <pubDate>Tue, 02 Jan 2024 12:00:00 +0200</pubDate>
            <description>USD 1.20000000 EUR 0.80000000</description>
        </item>
    </channel>
</rss>"#;

    #[test]
    fn test_decode_items_in_document_order() {
        let items = decode(THREE_ITEMS.as_bytes()).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].pub_date, "Mon, 01 Jan 2024 12:00:00 +0200");
        assert_eq!(items[0].description, "USD 1.10000000 EUR 0.90000000");
        assert_eq!(items[1].description, "USD 1.30000000 EUR 0.70000000");
        assert_eq!(items[2].pub_date, "Tue, 02 Jan 2024 12:00:00 +0200");
    }

    #[test]
    fn test_decode_empty_channel_is_not_an_error() {
        let items = decode(b"<rss><channel></channel></rss>").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        let err = decode(b"invalid xml").unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
        assert!(err.to_string().starts_with("decode XML:"));
    }

    #[test]
    fn test_decode_rejects_empty_input() {
        assert!(matches!(decode(b""), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_truncated_document() {
        let truncated = &THREE_ITEMS.as_bytes()[..THREE_ITEMS.len() / 2];
        assert!(matches!(decode(truncated), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_mismatched_tags() {
        let broken = b"<rss><channel><item></channel></item></rss>";
        assert!(matches!(decode(broken), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_ignores_items_outside_channel() {
        let doc = b"<rss><item><description>USD 1</description></item><channel/></rss>";
        assert!(decode(doc).unwrap().is_empty());
    }

    #[test]
    fn test_decode_unescapes_entities() {
        let doc = b"<rss><channel><item><description>USD&#32;1.5</description></item></channel></rss>";
        let items = decode(doc).unwrap();
        assert_eq!(items[0].description, "USD 1.5");
    }

    #[test]
    fn test_decode_keeps_whitespace_between_text_segments() {
        let cdata = b"<rss><channel><item><description>USD 1.1 <![CDATA[GBP 0.86]]></description></item></channel></rss>";
        let items = decode(cdata).unwrap();
        assert_eq!(items[0].description, "USD 1.1 GBP 0.86");

        let comment = b"<rss><channel><item><description>USD 1.1 <!-- x --> GBP 0.86</description></item></channel></rss>";
        let items = decode(comment).unwrap();
        assert_eq!(
            items[0].description.split_whitespace().collect::<Vec<_>>(),
            ["USD", "1.1", "GBP", "0.86"]
        );
    }

    #[test]
    fn test_decode_trims_field_edges() {
        let doc = b"<rss><channel><item><pubDate>\n  Wed, 03 Jan 2024 12:00:00 +0200\n</pubDate></item></channel></rss>";
        let items = decode(doc).unwrap();
        assert_eq!(items[0].pub_date, "Wed, 03 Jan 2024 12:00:00 +0200");
    }

    #[test]
    fn test_decode_honors_declared_encoding() {
        let mut doc = br#"<?xml version="1.0" encoding="ISO-8859-1"?><rss><channel><item><description>caf"#.to_vec();
        doc.push(0xE9);
        doc.extend_from_slice(b"</description></item></channel></rss>");

        let items = decode(&doc).unwrap();
        assert_eq!(items[0].description, "café");
    }
}
