//! CF_HTML payload codec.
//!
//! The clipboard HTML format wraps an HTML fragment in a description
//! block whose offsets are **byte** offsets into the UTF-8 encoded
//! payload, counted from the start of the description. The description
//! uses 10-digit zero-padded offsets so its own length is independent of
//! the values. `EndHTML` is exactly `len(description) + len(html)`.
//!
//! Only the payload codec lives here; putting the payload on an OS
//! clipboard is a platform concern outside this crate.

use crate::common::{Error, Result};

const VERSION_LINE: &str = "Version:0.9";
const START_FRAGMENT_MARK: &str = "<!--StartFragment-->";
const END_FRAGMENT_MARK: &str = "<!--EndFragment-->";

/// Pack an HTML fragment into a CF_HTML payload.
pub fn pack_html(fragment: &str, source_url: Option<&str>) -> String {
    let url = source_url.unwrap_or("about:blank");
    let prefix = format!("<html>\r\n<body>\r\n{START_FRAGMENT_MARK}");
    let suffix = format!("{END_FRAGMENT_MARK}\r\n</body>\r\n</html>");

    // The description length is fixed because every offset is written
    // with 10 digits.
    let description_len = format!(
        "{VERSION_LINE}\r\nStartHTML:{:010}\r\nEndHTML:{:010}\r\nStartFragment:{:010}\r\nEndFragment:{:010}\r\nSourceURL:{url}\r\n",
        0, 0, 0, 0
    )
    .len();

    let start_html = description_len;
    let start_fragment = start_html + prefix.len();
    let end_fragment = start_fragment + fragment.len();
    let end_html = end_fragment + suffix.len();

    format!(
        "{VERSION_LINE}\r\nStartHTML:{start_html:010}\r\nEndHTML:{end_html:010}\r\nStartFragment:{start_fragment:010}\r\nEndFragment:{end_fragment:010}\r\nSourceURL:{url}\r\n{prefix}{fragment}{suffix}"
    )
}

/// Recover the fragment from a CF_HTML payload.
pub fn unpack_html(payload: &str) -> Result<String> {
    let field = |name: &str| -> Result<usize> {
        let marker = format!("{name}:");
        let at = payload
            .find(&marker)
            .ok_or_else(|| Error::invalid_value("CF_HTML", format!("missing {name}")))?;
        let rest = &payload[at + marker.len()..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits
            .parse::<usize>()
            .map_err(|_| Error::invalid_value("CF_HTML", format!("bad {name} offset")))
    };
    let start = field("StartFragment")?;
    let end = field("EndFragment")?;
    let bytes = payload.as_bytes();
    if start > end || end > bytes.len() {
        return Err(Error::invalid_value("CF_HTML", "fragment offsets out of range"));
    }
    String::from_utf8(bytes[start..end].to_vec())
        .map_err(|_| Error::invalid_value("CF_HTML", "fragment is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_address_the_fragment() {
        let payload = pack_html("<b>bold</b>", Some("https://example.test/x"));
        assert_eq!(unpack_html(&payload).unwrap(), "<b>bold</b>");
    }

    #[test]
    fn test_offsets_are_utf8_bytes_not_chars() {
        // Multi-byte fragment: offsets must count encoded bytes.
        let payload = pack_html("héllo — ünïcode", None);
        assert_eq!(unpack_html(&payload).unwrap(), "héllo — ünïcode");
    }

    #[test]
    fn test_end_html_is_total_length() {
        let payload = pack_html("x", None);
        let end_html: usize = payload
            .split("EndHTML:")
            .nth(1)
            .unwrap()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap();
        assert_eq!(end_html, payload.len());
    }

    #[test]
    fn test_start_html_points_at_markup() {
        let payload = pack_html("x", None);
        let start_html: usize = payload
            .split("StartHTML:")
            .nth(1)
            .unwrap()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap();
        assert!(payload[start_html..].starts_with("<html>"));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(unpack_html("not a payload").is_err());
    }
}
