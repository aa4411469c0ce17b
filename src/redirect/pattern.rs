//! POSIX pattern syntax on top of the `regex` crate.
//!
//! The regex engine speaks something close to POSIX extended syntax. Basic
//! syntax swaps the meaning of escaped and bare grouping/repetition
//! characters, and bracket expressions treat backslash literally in both
//! flavors, so patterns are rewritten before compilation.

use regex::bytes::{Regex, RegexBuilder};

use crate::config::Syntax;

/// Compiles `pattern` for unanchored matching against raw bytes.
pub fn compile(pattern: &str, syntax: Syntax) -> Result<Regex, regex::Error> {
    let translated = translate(pattern, syntax);
    RegexBuilder::new(&translated).unicode(false).build()
}

/// Rewrites a POSIX pattern into the regex crate's syntax.
pub fn translate(pattern: &str, syntax: Syntax) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;
    // Basic syntax: `*` is literal where nothing precedes it to repeat.
    let mut at_start = true;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '[' => {
                i = copy_bracket(&chars, i, &mut out);
                at_start = false;
                continue;
            }
            '\\' if i + 1 < chars.len() => {
                let next = chars[i + 1];
                i += 2;
                match (syntax, next) {
                    (Syntax::Basic, '(' | ')' | '{' | '}' | '|' | '+' | '?') => {
                        out.push(next);
                        at_start = next == '(' || next == '|';
                    }
                    _ => {
                        out.push('\\');
                        out.push(next);
                        at_start = false;
                    }
                }
                continue;
            }
            '(' | ')' | '{' | '}' | '|' | '+' | '?' if syntax == Syntax::Basic => {
                out.push('\\');
                out.push(c);
            }
            '*' if syntax == Syntax::Basic && at_start => out.push_str("\\*"),
            '^' if at_start => {
                out.push('^');
                i += 1;
                continue;
            }
            '^' if syntax == Syntax::Basic => out.push_str("\\^"),
            '$' if syntax == Syntax::Basic && !closes_branch(&chars, i + 1) => {
                out.push_str("\\$")
            }
            _ => out.push(c),
        }
        at_start = false;
        i += 1;
    }

    out
}

/// Basic syntax only anchors `$` at the end of the pattern or of a group.
fn closes_branch(chars: &[char], at: usize) -> bool {
    at == chars.len()
        || (chars[at] == '\\' && matches!(chars.get(at + 1), Some(')' | '|')))
}

/// Copies the bracket expression starting at `chars[start] == '['` and
/// returns the index just past it. An unterminated bracket is copied as a
/// literal `[` so the regex engine reports it or matches it verbatim.
fn copy_bracket(chars: &[char], start: usize, out: &mut String) -> usize {
    let mut i = start + 1;
    let mut body = String::new();

    if chars.get(i) == Some(&'^') {
        body.push('^');
        i += 1;
    }
    // A leading `]` is a literal member.
    if chars.get(i) == Some(&']') {
        body.push_str("\\]");
        i += 1;
    }

    while i < chars.len() {
        let c = chars[i];
        match c {
            ']' => {
                out.push('[');
                out.push_str(&body);
                out.push(']');
                return i + 1;
            }
            '[' if matches!(chars.get(i + 1), Some(':' | '.' | '=')) => {
                let delim = chars[i + 1];
                let close = (i + 2..chars.len().saturating_sub(1))
                    .find(|&j| chars[j] == delim && chars[j + 1] == ']');
                match close {
                    Some(j) if delim == ':' => {
                        body.extend(&chars[i..j + 2]);
                        i = j + 2;
                    }
                    Some(j) => {
                        // Collating elements and equivalence classes of a
                        // single character are just that character.
                        for &member in &chars[i + 2..j] {
                            push_class_member(&mut body, member);
                        }
                        i = j + 2;
                    }
                    None => {
                        body.push_str("\\[");
                        i += 1;
                    }
                }
            }
            '-' => {
                body.push('-');
                i += 1;
            }
            _ => {
                push_class_member(&mut body, c);
                i += 1;
            }
        }
    }

    out.push_str("\\[");
    start + 1
}

fn push_class_member(body: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '&' | '~' | '^') {
        body.push('\\');
    }
    body.push(c);
}
