//! Line counting for `num_lines` facts

use serde::{Deserialize, Serialize};

/// Per-file line summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounts {
    pub total: u32,
    pub code: u32,
    pub comment: u32,
}

/// Literal the scanner is inside of
#[derive(Clone, Copy, PartialEq, Eq)]
enum Literal {
    /// `"..."` or `'...'`; backslash escapes the next character
    Quoted(char),
    /// `@"..."`; backslash is literal, `""` is a quote, may span lines
    Verbatim,
}

/// Count total, code and comment lines of C-family source text.
///
/// A line is a comment line if any of it lies inside `//` or `/* */`, and a
/// code line if any non-whitespace character lies outside a comment, so one
/// line can be both. Comment openers inside string and char literals, including
/// C# verbatim strings, are ignored.
pub fn compute_line_counts(text: &str) -> LineCounts {
    let mut counts = LineCounts::default();
    let mut in_block = false;
    let mut in_verbatim = false;

    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        let mut has_code = in_verbatim;
        let mut has_comment = in_block;
        let mut literal = in_verbatim.then_some(Literal::Verbatim);
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if in_block {
                has_comment = true;
                if c == '*' && next == Some('/') {
                    in_block = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            match literal {
                Some(Literal::Quoted(q)) => {
                    if c == '\\' {
                        i += 2;
                        continue;
                    }
                    if c == q {
                        literal = None;
                    }
                    i += 1;
                    continue;
                }
                Some(Literal::Verbatim) => {
                    has_code = true;
                    if c == '"' {
                        if next == Some('"') {
                            i += 2;
                            continue;
                        }
                        literal = None;
                    }
                    i += 1;
                    continue;
                }
                None => {}
            }

            match (c, next) {
                ('/', Some('/')) => {
                    has_comment = true;
                    break;
                }
                ('/', Some('*')) => {
                    has_comment = true;
                    in_block = true;
                    i += 2;
                    continue;
                }
                ('@', Some('"')) => {
                    has_code = true;
                    literal = Some(Literal::Verbatim);
                    i += 2;
                    continue;
                }
                ('"', _) | ('\'', _) => {
                    has_code = true;
                    // `@$"` interpolated verbatim strings
                    literal = if c == '"' && i >= 2 && chars[i - 2..i] == ['@', '$'] {
                        Some(Literal::Verbatim)
                    } else {
                        Some(Literal::Quoted(c))
                    };
                }
                (c, _) if c.is_whitespace() => {}
                _ => has_code = true,
            }
            i += 1;
        }

        in_verbatim = literal == Some(Literal::Verbatim);

        counts.total += 1;
        if has_code {
            counts.code += 1;
        }
        if has_comment {
            counts.comment += 1;
        }
    }

    counts
}
