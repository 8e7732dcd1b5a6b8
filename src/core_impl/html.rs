use super::*;

pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    // Open elements, innermost last. Content outside all of them goes to the root.
    let mut open: Vec<NodeId> = Vec::new();
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let parent = open.last().copied().unwrap_or(dom.root);

        if bytes[i..].starts_with(b"<!--") {
            let end = find_subslice(bytes, i + 4, b"-->")
                .ok_or_else(|| Error::HtmlParse("unclosed HTML comment".into()))?;
            i = end + 3;
            continue;
        }

        if bytes[i..].starts_with(b"<!") {
            // <!DOCTYPE ...> and other declarations carry no nodes.
            let end = find_subslice(bytes, i + 2, b">")
                .ok_or_else(|| Error::HtmlParse("unclosed markup declaration".into()))?;
            i = end + 1;
            continue;
        }

        let next = bytes.get(i + 1).copied().unwrap_or_default();
        if bytes[i] == b'<' && next == b'/' {
            let (tag, after) = parse_end_tag(html, i)?;
            i = after;
            // End tags without a matching open element are ignored.
            if let Some(pos) = open.iter().rposition(|node| dom.is_tag(*node, &tag)) {
                open.truncate(pos);
            }
            continue;
        }

        if bytes[i] == b'<' && next.is_ascii_alphabetic() {
            let (tag, attrs, self_closing, after) = parse_start_tag(html, i)?;
            i = after;

            // Forms do not nest: a <form> start tag inside an open form is dropped.
            if tag == "form" && open.iter().any(|node| dom.is_tag(*node, "form")) {
                continue;
            }

            // An <option> or <optgroup> start tag closes a still-open <option>.
            let parent = if (tag == "option" || tag == "optgroup")
                && open.last().is_some_and(|top| dom.is_tag(*top, "option"))
            {
                open.pop();
                open.last().copied().unwrap_or(dom.root)
            } else {
                parent
            };

            let node = dom.create_element(parent, tag.clone(), attrs);

            if is_raw_text_tag(&tag) && !self_closing {
                let close = find_end_tag(bytes, i, &tag)
                    .ok_or_else(|| Error::HtmlParse(format!("unclosed <{tag}>")))?;
                let body = &html[i..close];
                if !body.is_empty() {
                    let body = if tag == "textarea" || tag == "title" {
                        decode_entities(body)
                    } else {
                        body.to_string()
                    };
                    dom.create_text(node, body);
                }
                let (_, after_end) = parse_end_tag(html, close)?;
                i = after_end;
            } else if !self_closing && !is_void_tag(&tag) {
                open.push(node);
            }
            continue;
        }

        // Text runs to the next '<'; a '<' that starts no tag is text too.
        let end = bytes[i + 1..]
            .iter()
            .position(|b| *b == b'<')
            .map_or(bytes.len(), |pos| i + 1 + pos);
        dom.create_text(parent, decode_entities(&html[i..end]));
        i = end;
    }

    dom.initialize_form_control_values();
    Ok(dom)
}

fn parse_start_tag(html: &str, at: usize) -> Result<(String, Vec<(String, String)>, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 1;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[at + 1..i].to_ascii_lowercase();

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        match bytes.get(i) {
            None => return Err(Error::HtmlParse(format!("unclosed start tag <{tag}>"))),
            Some(b'>') => {
                i += 1;
                break;
            }
            Some(b'/') => {
                i += 1;
                if bytes.get(i) == Some(&b'>') {
                    self_closing = true;
                    i += 1;
                    break;
                }
                continue;
            }
            Some(_) => {}
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if i == name_start {
            return Err(Error::HtmlParse(format!("invalid attribute name in <{tag}>")));
        }
        let name = html[name_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, &mut i)?
        } else {
            String::new()
        };

        if !attrs.iter().any(|(existing, _)| *existing == name) {
            attrs.push((name, value));
        }
    }

    Ok((tag, attrs, self_closing, i))
}

/// Parses `</tag ...>` starting at `at`, which must point at `</`.
fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[at + 2..i].to_ascii_lowercase();

    let close = find_subslice(bytes, i, b">")
        .ok_or_else(|| Error::HtmlParse("unclosed end tag".into()))?;
    Ok((tag, close + 1))
}

fn parse_attr_value(html: &str, i: &mut usize) -> Result<String> {
    let bytes = html.as_bytes();
    let start = *i;

    if let Some(quote) = bytes.get(start).copied().filter(|b| *b == b'\'' || *b == b'"') {
        let close = find_subslice(bytes, start + 1, &[quote])
            .ok_or_else(|| Error::HtmlParse("unclosed quoted attribute value".into()))?;
        *i = close + 1;
        return Ok(decode_entities(&html[start + 1..close]));
    }

    while *i < bytes.len()
        && !bytes[*i].is_ascii_whitespace()
        && bytes[*i] != b'>'
        && !bytes[*i..].starts_with(b"/>")
    {
        *i += 1;
    }
    Ok(decode_entities(&html[start..*i]))
}

fn decode_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';').filter(|pos| *pos <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| {
                    entity
                        .strip_prefix('#')
                        .and_then(|dec| dec.parse::<u32>().ok())
                })
                .and_then(char::from_u32),
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' || b == b'@' || b == b'.'
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "textarea" | "title")
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}

fn find_end_tag(bytes: &[u8], from: usize, tag: &str) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(tag.len() + 2)
        .position(|window| {
            window.starts_with(b"</") && window[2..].eq_ignore_ascii_case(tag.as_bytes())
        })
        .map(|pos| from + pos)
}
