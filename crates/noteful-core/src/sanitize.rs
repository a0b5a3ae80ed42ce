//! Outbound XSS filtering.
//!
//! A whitelist filter in the style of the common `xss` HTML filters:
//!
//! - tags outside the whitelist are escaped, never dropped, so the text
//!   stays readable (`<script>` becomes `&lt;script&gt;`)
//! - whitelisted tags are rebuilt with only their allowed attributes
//! - `href`/`src` values with an executable scheme are blanked, judged on
//!   the value after character references are decoded
//! - text between tags has stray `<` and `>` escaped
//!
//! The filter runs on the way out of the API, never on stored data.

use serde_json::Value;

use crate::resource::is_truthy;

/// Tags kept as markup, with the attributes each may carry.
const WHITELIST: &[(&str, &[&str])] = &[
    ("a", &["target", "href", "title"]),
    ("abbr", &["title"]),
    ("address", &[]),
    ("article", &[]),
    ("aside", &[]),
    ("b", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("caption", &[]),
    ("cite", &[]),
    ("code", &[]),
    ("dd", &[]),
    ("del", &["datetime"]),
    ("div", &[]),
    ("dl", &[]),
    ("dt", &[]),
    ("em", &[]),
    ("figcaption", &[]),
    ("figure", &[]),
    ("footer", &[]),
    ("h1", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("h5", &[]),
    ("h6", &[]),
    ("header", &[]),
    ("hr", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("ins", &["datetime"]),
    ("li", &[]),
    ("mark", &[]),
    ("nav", &[]),
    ("ol", &[]),
    ("p", &[]),
    ("pre", &[]),
    ("s", &[]),
    ("section", &[]),
    ("small", &[]),
    ("span", &[]),
    ("strike", &[]),
    ("strong", &[]),
    ("sub", &[]),
    ("sup", &[]),
    ("table", &["width", "border", "align", "valign"]),
    ("tbody", &["align", "valign"]),
    ("td", &["width", "rowspan", "colspan", "align", "valign"]),
    ("tfoot", &["align", "valign"]),
    ("th", &["width", "rowspan", "colspan", "align", "valign"]),
    ("thead", &["align", "valign"]),
    ("tr", &["rowspan", "align", "valign"]),
    ("u", &[]),
    ("ul", &[]),
];

/// Attributes whose value is a URL.
const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite"];

/// Sanitize an outbound field value.
///
/// Falsy values become `""`. Non-string values are filtered as their JSON
/// text, so a numeric rating comes back as a string.
pub fn sanitize_value(value: &Value) -> String {
    if !is_truthy(value) {
        return String::new();
    }
    match value {
        Value::String(s) => sanitize_html(s),
        other => sanitize_html(&other.to_string()),
    }
}

/// Filter executable markup out of `input`.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        push_text(&mut out, &rest[..open]);
        let candidate = &rest[open..];

        match scan_tag(candidate) {
            Scan::Tag(end) => {
                out.push_str(&filter_tag(&candidate[..=end]));
                rest = &candidate[end + 1..];
            }
            Scan::Restart(next) => {
                out.push_str("&lt;");
                push_text(&mut out, &candidate[1..next]);
                rest = &candidate[next..];
            }
            Scan::Unterminated => {
                out.push_str("&lt;");
                rest = &candidate[1..];
            }
        }
    }

    push_text(&mut out, rest);
    out
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len() + 8);
    push_text(&mut out, tag);
    out
}

enum Scan {
    /// Byte offset of the closing `>`.
    Tag(usize),
    /// Another `<` opened before this one closed; offset of that `<`.
    Restart(usize),
    Unterminated,
}

/// Find where the tag starting at `s[0] == '<'` ends. Quotes are honoured,
/// so `>` inside an attribute value does not close the tag.
fn scan_tag(s: &str) -> Scan {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Scan::Tag(i),
            (None, '<') => return Scan::Restart(i),
            (None, _) => {}
        }
    }
    Scan::Unterminated
}

fn allowed_attributes(tag: &str) -> Option<&'static [&'static str]> {
    WHITELIST
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
}

/// Rebuild a whitelisted tag or escape anything else. `tag` includes the
/// surrounding angle brackets.
fn filter_tag(tag: &str) -> String {
    let inner = &tag[1..tag.len() - 1];
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name_len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    if name_len == 0 {
        return escape_tag(tag);
    }
    let name = inner[..name_len].to_ascii_lowercase();

    let Some(allowed) = allowed_attributes(&name) else {
        return escape_tag(tag);
    };

    if closing {
        return format!("</{name}>");
    }

    let mut body = inner[name_len..].trim_end();
    let self_closing = body.ends_with('/');
    if self_closing {
        body = &body[..body.len() - 1];
    }

    let mut out = format!("<{name}");
    for (attr, value) in parse_attributes(body) {
        if !allowed.contains(&attr.as_str()) {
            continue;
        }
        let value = value.and_then(|v| safe_attr_value(&attr, &v));
        out.push(' ');
        out.push_str(&attr);
        if let Some(value) = value {
            out.push_str("=\"");
            out.push_str(&escape_attr_value(&value));
            out.push('"');
        }
    }
    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out
}

/// Parse `name="v" name='v' name=v name` sequences. Names are lowercased.
fn parse_attributes(body: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let mut chars = body.char_indices().peekable();

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        let Some(&(start, _)) = chars.peek() else {
            break;
        };

        let mut end = start;
        while let Some((i, c)) = chars.next_if(|(_, c)| !c.is_whitespace() && *c != '=') {
            end = i + c.len_utf8();
        }
        let name = body[start..end].to_ascii_lowercase();

        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        if chars.next_if(|(_, c)| *c == '=').is_none() {
            if !name.is_empty() {
                attrs.push((name, None));
            }
            continue;
        }
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let value = match chars.peek().map(|(_, c)| *c) {
            Some(q @ ('"' | '\'')) => {
                chars.next();
                let mut value = String::new();
                for (_, c) in chars.by_ref() {
                    if c == q {
                        break;
                    }
                    value.push(c);
                }
                value
            }
            _ => {
                let mut value = String::new();
                while let Some((_, c)) = chars.next_if(|(_, c)| !c.is_whitespace()) {
                    value.push(c);
                }
                value
            }
        };

        if !name.is_empty() {
            attrs.push((name, Some(value)));
        }
    }

    attrs
}

/// Blank URL attributes that would execute script. Empty results drop the value.
fn safe_attr_value(attr: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if URL_ATTRIBUTES.contains(&attr) {
        let compact: String = decode_char_refs(value)
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .collect::<String>()
            .to_ascii_lowercase();
        let executable = compact.starts_with("javascript:")
            || compact.starts_with("vbscript:")
            || (compact.starts_with("data:") && !compact.starts_with("data:image/"));
        if executable {
            return None;
        }
    }
    Some(value.to_string())
}

/// Named references a browser decodes inside attribute values that can
/// spell a URL scheme.
const NAMED_REFS: &[(&str, char)] = &[
    ("amp", '&'),
    ("apos", '\''),
    ("colon", ':'),
    ("comma", ','),
    ("gt", '>'),
    ("lpar", '('),
    ("lt", '<'),
    ("newline", '\n'),
    ("nbsp", '\u{a0}'),
    ("period", '.'),
    ("quot", '"'),
    ("rpar", ')'),
    ("semi", ';'),
    ("sol", '/'),
    ("tab", '\t'),
];

/// Decode numeric (`&#106;`, `&#x6A;`) and named (`&colon;`) character
/// references. The trailing `;` is optional for numeric references, as in
/// browsers. Unknown or invalid references are left as written.
fn decode_char_refs(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_one(after) {
            Some((c, consumed)) => {
                out.push(c);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode the reference at the start of `s` (just past `&`). Returns the
/// character and the number of bytes consumed.
fn decode_one(s: &str) -> Option<(char, usize)> {
    if let Some(numeric) = s.strip_prefix('#') {
        let (radix, digits_at) = match numeric.chars().next() {
            Some('x' | 'X') => (16, 2),
            _ => (10, 1),
        };
        let digits = &s[digits_at..];
        let len = digits
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(digits.len());
        if len == 0 {
            return None;
        }
        // Leading zeros are unbounded.
        let significant = digits[..len].trim_start_matches('0');
        let code = if significant.is_empty() {
            0
        } else if significant.len() > 8 {
            u32::MAX
        } else {
            u32::from_str_radix(significant, radix).ok()?
        };
        let c = char::from_u32(code)
            .filter(|&c| c != '\0')
            .unwrap_or('\u{fffd}');
        let semicolon = usize::from(digits[len..].starts_with(';'));
        return Some((c, digits_at + len + semicolon));
    }

    let len = s
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(s.len());
    if !s[len..].starts_with(';') {
        return None;
    }
    let name = s[..len].to_ascii_lowercase();
    NAMED_REFS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, c)| (c, len + 1))
}

fn escape_attr_value(value: &str) -> String {
    value
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
