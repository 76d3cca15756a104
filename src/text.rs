//! Normalization of multi-line `run` scripts

/// Strip the indentation that a multi-line string literal picks up from the
/// surrounding Rust source.
///
/// The first line is kept as written (it follows the opening quote). The
/// smallest indentation among the remaining non-blank lines is removed from
/// each of them, blank lines become empty, and a blank first line is dropped.
/// Lines that begin inside a quoted shell string are left untouched.
pub fn dedent_script(script: &str) -> String {
    if !script.contains('\n') {
        return script.to_string();
    }

    let lines = split_lines(script);
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.quoted && !line.text.trim().is_empty())
        .map(|line| leading_spaces(line.text))
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 || line.quoted {
            out.push(line.text);
        } else if line.text.trim().is_empty() {
            out.push("");
        } else {
            out.push(&line.text[indent..]);
        }
    }

    if out.len() > 1 && out[0].trim().is_empty() {
        out.remove(0);
    }
    out.join("\n")
}

struct Line<'a> {
    text: &'a str,
    /// The line starts inside an open quote
    quoted: bool,
}

fn split_lines(script: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut open: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    let mut start_quoted = false;

    for (idx, c) in script.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (c, open) {
            ('\\', Some('\'')) => {}
            ('\\', _) => escaped = true,
            ('\'' | '"', None) => open = Some(c),
            (q, Some(o)) if q == o => open = None,
            ('\n', _) => {
                lines.push(Line {
                    text: &script[start..idx],
                    quoted: start_quoted,
                });
                start = idx + 1;
                start_quoted = open.is_some();
            }
            _ => {}
        }
    }
    lines.push(Line {
        text: &script[start..],
        quoted: start_quoted,
    });
    lines
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_unchanged() {
        assert_eq!(dedent_script("  cargo test  "), "  cargo test  ");
    }

    #[test]
    fn test_continuation_lines_are_dedented() {
        let script = "VERSION=$(cargo pkgid)
                echo \"$VERSION\"
                  indented
                ";
        assert_eq!(
            dedent_script(script),
            "VERSION=$(cargo pkgid)\necho \"$VERSION\"\n  indented\n"
        );
    }

    #[test]
    fn test_leading_blank_line_dropped() {
        let script = "
            cargo build
            cargo test";
        assert_eq!(dedent_script(script), "cargo build\ncargo test");
    }

    #[test]
    fn test_quoted_newlines_preserved() {
        let script = "printf 'first
    second'
        done";
        assert_eq!(dedent_script(script), "printf 'first\n    second'\ndone");
    }

    #[test]
    fn test_escaped_quote_does_not_open_string() {
        let script = "echo \\\"
    next";
        assert_eq!(dedent_script(script), "echo \\\"\nnext");
    }
}
