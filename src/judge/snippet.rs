//! Snippet wrapping.
//!
//! Callers often submit a bare list of statements. Those are wrapped in a
//! synthesized `fn main` so they compile as a program; sources that already
//! define `main` pass through untouched apart from trimming.

use regex::Regex;
use std::sync::OnceLock;

const INDENT: &str = "    ";

fn entry_point_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bfn\s+main\s*\(").expect("entry point pattern is valid"))
}

/// True when `source` already defines a `fn main(`.
pub fn has_entry_point(source: &str) -> bool {
    entry_point_pattern().is_match(source)
}

/// Indent every non-empty line of `text` by `prefix`.
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn `source` into a runnable program.
pub fn wrap_snippet(source: &str) -> String {
    let stripped = source.trim();
    if has_entry_point(stripped) {
        return format!("{}\n", stripped);
    }

    if stripped.is_empty() {
        return "fn main() {\n}\n".to_string();
    }

    format!("fn main() {{\n{}\n}}\n", indent(stripped, INDENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_bare_statements() {
        let wrapped = wrap_snippet("println!(\"hi\");");
        assert_eq!(wrapped, "fn main() {\n    println!(\"hi\");\n}\n");
    }

    #[test]
    fn test_existing_main_is_kept() {
        let source = "\n\nfn main() {\n    println!(\"hi\");\n}\n\n";
        assert_eq!(wrap_snippet(source), "fn main() {\n    println!(\"hi\");\n}\n");
    }

    #[test]
    fn test_empty_input_gives_empty_main() {
        assert_eq!(wrap_snippet(""), "fn main() {\n}\n");
        assert_eq!(wrap_snippet("  \n\t"), "fn main() {\n}\n");
    }

    #[test]
    fn test_multiline_body_indented_once() {
        let wrapped = wrap_snippet("let x = 1;\n\nlet y = x + 1;");
        assert_eq!(wrapped, "fn main() {\n    let x = 1;\n\n    let y = x + 1;\n}\n");
    }

    #[test]
    fn test_exactly_one_entry_point_after_wrapping() {
        for body in ["let a = 2;", "fn helper() -> u8 { 3 }\nhelper();", "// comment"] {
            let wrapped = wrap_snippet(body);
            assert_eq!(entry_point_pattern().find_iter(&wrapped).count(), 1, "{}", body);
        }
    }

    #[test]
    fn test_entry_point_detection() {
        assert!(has_entry_point("fn main() {}"));
        assert!(has_entry_point("pub fn  main (){}"));
        assert!(!has_entry_point("fn mainly() {}"));
        assert!(!has_entry_point("fn domain() {}"));
    }
}
