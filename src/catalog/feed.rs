//! RSS 2.0 feed rendering with the iTunes podcast extensions.

use bytes::Bytes;
use std::fmt::Write;

use super::{Item, Metadata};

const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// Render the feed document for `items`.
///
/// The output depends only on the arguments, so an unchanged directory
/// renders to identical bytes.
pub fn render_feed(metadata: &Metadata, items: &[Item]) -> Bytes {
    let mut out = String::new();

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#).unwrap();
    writeln!(
        out,
        r#"<rss version="2.0" xmlns:itunes="{ITUNES_NS}" xmlns:content="{CONTENT_NS}">"#
    )
    .unwrap();
    writeln!(out, "<channel>").unwrap();
    writeln!(out, " <title>{}</title>", escape(&metadata.title)).unwrap();
    writeln!(out, " <link>{}</link>", escape(&metadata.link)).unwrap();
    writeln!(out, " <description>{}</description>", escape(&metadata.description)).unwrap();
    writeln!(out, " <language>{}</language>", escape(&metadata.language)).unwrap();
    writeln!(out, r#" <itunes:image href="{}" />"#, escape(&metadata.cover_url)).unwrap();

    for item in items {
        writeln!(out, " <item>").unwrap();
        writeln!(out, "  <title>{}</title>", escape(&item.title)).unwrap();
        writeln!(out, "  <link>{}</link>", escape(&item.link)).unwrap();
        writeln!(out, "  <description>{}</description>", escape(&item.description)).unwrap();
        writeln!(out, "  <pubDate>{}</pubDate>", item.mod_time.to_rfc2822()).unwrap();
        writeln!(
            out,
            r#"  <enclosure url="{}" length="{}" type="{}" />"#,
            escape(&item.enclosure.url),
            item.enclosure.length,
            item.enclosure.mime_type
        )
        .unwrap();
        writeln!(out, " </item>").unwrap();
    }

    writeln!(out, "</channel>").unwrap();
    writeln!(out, "</rss>").unwrap();

    Bytes::from(out)
}

/// Escape text for use in XML character data and attribute values.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Enclosure;
    use chrono::{DateTime, Utc};
    use std::path::Path;

    fn metadata() -> Metadata {
        Metadata::new(
            "Tom & Jerry's <Show>",
            "Weekly",
            "en",
            "http://pods.local/",
            None,
            Path::new("/srv"),
        )
    }

    fn item() -> Item {
        Item {
            title: "Ep \"1\"".into(),
            path: "ep1.mp3".into(),
            mod_time: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            link: "http://pods.local/ep1.mp3".into(),
            description: String::new(),
            enclosure: Enclosure {
                url: "http://pods.local/ep1.mp3".into(),
                length: 1234,
                mime_type: "audio/mpeg",
            },
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_render_channel() {
        let feed = render_feed(&metadata(), &[]);
        let xml = std::str::from_utf8(&feed).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<title>Tom &amp; Jerry&apos;s &lt;Show&gt;</title>"));
        assert!(xml.contains("<link>http://pods.local/</link>"));
        assert!(xml.contains("<language>en</language>"));
        assert!(xml.contains(r#"<itunes:image href="http://pods.local/cover.png" />"#));
        assert!(!xml.contains("<item>"));
    }

    #[test]
    fn test_render_item() {
        let feed = render_feed(&metadata(), &[item()]);
        let xml = std::str::from_utf8(&feed).unwrap();
        assert!(xml.contains("<title>Ep &quot;1&quot;</title>"));
        assert!(xml.contains("<pubDate>Tue, 14 Nov 2023 22:13:20 +0000</pubDate>"));
        assert!(xml.contains(
            r#"<enclosure url="http://pods.local/ep1.mp3" length="1234" type="audio/mpeg" />"#
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let items = vec![item()];
        assert_eq!(render_feed(&metadata(), &items), render_feed(&metadata(), &items));
    }
}
