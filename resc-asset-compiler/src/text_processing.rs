// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Escape and whitespace rules for text that ends up in a string pool.
use log::warn;

/// Resolves backslash escapes and double quotes.
///
/// Outside double quotes, each run of whitespace becomes a single space
/// unless `preserve_spaces` is set. Inside quotes whitespace is kept as is.
/// The quote characters themselves are removed.
pub fn process_text(text: &str, preserve_spaces: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quoted = false;
    let mut last_was_space = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                last_was_space = false;
            }
            '\\' => {
                last_was_space = false;
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('u') => {
                        let mut digits = String::new();
                        while digits.len() < 4 {
                            match chars.peek() {
                                Some(d) if d.is_ascii_hexdigit() => {
                                    digits.push(*d);
                                    chars.next();
                                }
                                _ => break
                            }
                        }
                        match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                            Some(decoded) if digits.len() == 4 => out.push(decoded),
                            _ => warn!("invalid unicode escape sequence \\u{} in {:?}", digits, text)
                        }
                    }
                    // \' \" \\ \@ \? \# and anything else stand for themselves
                    Some(other) => out.push(other),
                    None => {}
                }
            }
            c if c.is_whitespace() && !quoted && !preserve_spaces => {
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            }
            c => {
                out.push(c);
                last_was_space = false;
            }
        }
    }
    out
}

/// Text node rule for binary XML: whitespace-only text is dropped, otherwise
/// the text is trimmed and a single space is put back on each side that had
/// any whitespace, then escapes are processed.
pub fn compact_text_node(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut compacted = String::with_capacity(trimmed.len() + 2);
    if text.starts_with(char::is_whitespace) {
        compacted.push(' ');
    }
    compacted.push_str(trimmed);
    if text.ends_with(char::is_whitespace) {
        compacted.push(' ');
    }
    Some(process_text(&compacted, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes() {
        assert_eq!(process_text(r"a\nb\tc", false), "a\nb\tc");
        assert_eq!(process_text(r"\'\@\?\\\#", false), r"'@?\#");
        assert_eq!(process_text(r"été", false), "\u{e9}t\u{e9}");
        assert_eq!(process_text(r#"say \"hi\""#, false), "say \"hi\"");
    }

    #[test]
    fn bad_unicode_escape_is_dropped() {
        assert_eq!(process_text(r"x\u12y", false), "xy");
    }

    #[test]
    fn whitespace_collapses_outside_quotes() {
        assert_eq!(process_text("a  \n\t b", false), "a b");
        assert_eq!(process_text("a  \n\t b", true), "a  \n\t b");
        assert_eq!(process_text("\"a   b\"  c", false), "a   b c");
    }

    #[test]
    fn text_node_compaction() {
        assert_eq!(compact_text_node("  \n\t "), None);
        assert_eq!(compact_text_node("hello").as_deref(), Some("hello"));
        assert_eq!(compact_text_node("\n  hello\n").as_deref(), Some(" hello "));
        assert_eq!(compact_text_node("hello   world  ").as_deref(), Some("hello world "));
    }
}
