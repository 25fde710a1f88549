//! Conversion of event copy between storage dialects and output formats.
//!
//! Older events carry their copy in a legacy plaintext dialect (marked by the event's
//! `legacy_copy` flag): plain newlines and bare URLs. Newer events store HTML directly.

use crate::data_store::models::Event;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref URL_RE: Regex =
        Regex::new(r"https?://[^\s<]+").expect("static regex must compile");
    static ref BR_RE: Regex = Regex::new(r"(?i)<br\s*/?>").expect("static regex must compile");
    static ref P_OPEN_RE: Regex = Regex::new(r"(?i)<p[^>]*>").expect("static regex must compile");
    static ref P_CLOSE_RE: Regex = Regex::new(r"(?i)</p>").expect("static regex must compile");
    static ref ANCHOR_RE: Regex = Regex::new(
        r#"(?is)<a\s[^>]*href=["']?([^"'\s>]+)["']?[^>]*>(.*?)</a>"#
    )
    .expect("static regex must compile");
    static ref TAG_RE: Regex = Regex::new(r"</?[a-zA-Z][^>]*>").expect("static regex must compile");
}

/// The event's copy as HTML.
///
/// Legacy copy is converted: newlines become `<br>` and bare http(s) URLs become links.
/// Entities and markup already present in the text are left alone. Non-legacy copy is
/// returned verbatim.
pub fn copy_html(event: &Event) -> String {
    if !event.legacy_copy {
        return event.copy.clone();
    }
    let linked = URL_RE.replace_all(&event.copy, |caps: &Captures| {
        format!("<a href=\"{}\">{}</a>", &caps[0], &caps[0])
    });
    linked.replace('\n', "<br>")
}

/// The event's copy as plain text.
///
/// HTML copy is flattened: `<br>` becomes a newline, paragraphs become blank lines, links are
/// expanded to `text: href`, remaining tags are stripped and common entities are decoded.
/// Legacy copy only gets its entities decoded.
pub fn copy_plaintext(event: &Event) -> String {
    if event.legacy_copy {
        return decode_entities(&event.copy);
    }
    let text = BR_RE.replace_all(&event.copy, "\n");
    let text = P_OPEN_RE.replace_all(&text, "");
    let text = P_CLOSE_RE.replace_all(&text, "\n\n");
    let text = ANCHOR_RE.replace_all(&text, |caps: &Captures| {
        let href = &caps[1];
        let inner = caps[2].trim();
        if inner == href {
            href.to_owned()
        } else {
            format!("{}: {}", inner, href)
        }
    });
    let text = TAG_RE.replace_all(&text, "");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&pound;", "\u{a3}")
        .replace("&#163;", "\u{a3}")
        .replace("&nbsp;", " ")
}
