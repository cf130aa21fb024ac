//! Minimal reader/writer for `.properties` files.
//!
//! Supports `#`/`!` comments, `=`/`:`/whitespace separators, backslash
//! escapes (including `\uXXXX`) and line continuations.

use std::collections::BTreeMap;

pub fn parse(text: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    let mut lines = text.lines();

    while let Some(raw) = lines.next() {
        let mut line = raw.trim_start().to_string();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        while ends_with_continuation(&line) {
            line.pop();
            match lines.next() {
                Some(next) => line.push_str(next.trim_start()),
                None => break,
            }
        }
        let (key, value) = split_entry(&line);
        entries.insert(unescape(key), unescape(value));
    }

    entries
}

/// Render entries one per line, preceded by an optional `#` comment.
pub fn render<'a, I>(entries: I, comment: Option<&str>) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    if let Some(comment) = comment {
        for line in comment.lines() {
            out.push('#');
            out.push_str(line);
            out.push('\n');
        }
    }
    for (key, value) in entries {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let bytes = line.as_bytes();
    let mut end = 0;
    let mut escaped = false;
    while end < bytes.len() {
        let b = bytes[end];
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if matches!(b, b'=' | b':' | b' ' | b'\t') {
            break;
        }
        end += 1;
    }

    let key = &line[..end];
    let mut rest = line[end..].trim_start_matches([' ', '\t']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t']);
    }
    (key, rest)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{000C}' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if is_key || i == 0 => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separators_and_comments() {
        let text = "# generated\n! also a comment\n\nA=1\nB : two\nC three\n  D=  padded\n";
        let map = parse(text);
        assert_eq!(map.len(), 4);
        assert_eq!(map["A"], "1");
        assert_eq!(map["B"], "two");
        assert_eq!(map["C"], "three");
        assert_eq!(map["D"], "padded");
    }

    #[test]
    fn empty_value() {
        let map = parse("EMPTY=\n");
        assert_eq!(map["EMPTY"], "");
    }

    #[test]
    fn continuation_lines_are_joined() {
        let map = parse("PATHS=/a \\\n    /b \\\n    /c\n");
        assert_eq!(map["PATHS"], "/a /b /c");
    }

    #[test]
    fn escaped_backslash_is_not_a_continuation() {
        let map = parse("WIN=C:\\\\\nNEXT=1\n");
        assert_eq!(map["WIN"], "C:\\");
        assert_eq!(map["NEXT"], "1");
    }

    #[test]
    fn unicode_escape() {
        let map = parse("NAME=caf\\u00e9\n");
        assert_eq!(map["NAME"], "café");
    }

    #[test]
    fn render_escapes_awkward_values() {
        let rendered = render([("KEY", " leading\tand\\slash")], Some("build settings"));
        assert_eq!(rendered, "#build settings\nKEY=\\ leading\\tand\\\\slash\n");
        let map = parse(&rendered);
        assert_eq!(map["KEY"], " leading\tand\\slash");
    }

    #[test]
    fn render_escapes_key_separators() {
        let rendered = render([("a=b:c d", "v")], None);
        assert_eq!(parse(&rendered)["a=b:c d"], "v");
    }
}
