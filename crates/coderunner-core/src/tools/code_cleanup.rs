//! Normalisation of model-generated code before it is executed

use regex::Regex;
use std::sync::OnceLock;

fn opening_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"^```(?:python\b|[A-Za-z0-9_+-]*[ \t]*\r?\n)?").expect("valid fence regex"))
}

/// Strip the Markdown code fence a model tends to wrap code in: a leading
/// "```" with an optional language tag, and a trailing "```". A tag other
/// than `python` only counts when the line ends right after it, so a
/// single-line fence keeps its code. Surrounding whitespace is trimmed.
pub fn clean_generated_code(code: &str) -> String {
    let mut code = code.trim();

    if let Some(m) = opening_fence().find(code) {
        code = &code[m.end()..];
    }
    if let Some(stripped) = code.strip_suffix("```") {
        code = stripped;
    }

    code.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_fence() {
        let raw = "```python\nprint('hello')\n```";
        assert_eq!(clean_generated_code(raw), "print('hello')");
    }

    #[test]
    fn test_bare_fence() {
        let raw = "  ```\nimport math\nprint(math.pi)\n```  \n";
        assert_eq!(clean_generated_code(raw), "import math\nprint(math.pi)");
    }

    #[test]
    fn test_unfenced_code_is_trimmed_only() {
        let raw = "\n\nx = 1\nprint(x)\n";
        assert_eq!(clean_generated_code(raw), "x = 1\nprint(x)");
    }

    #[test]
    fn test_inner_indentation_survives() {
        let raw = "```py\nfor i in range(2):\n    print(i)\n```";
        assert_eq!(clean_generated_code(raw), "for i in range(2):\n    print(i)");
    }

    #[test]
    fn test_backticks_inside_strings_are_kept() {
        let raw = "print('```')";
        assert_eq!(clean_generated_code(raw), "print('```')");
    }

    #[test]
    fn test_single_line_fence_keeps_code() {
        assert_eq!(clean_generated_code("```print('hi')```"), "print('hi')");
    }

    #[test]
    fn test_python_tag_on_same_line() {
        assert_eq!(clean_generated_code("```python print(1)```"), "print(1)");
    }

    #[test]
    fn test_identifier_starting_with_python_is_code() {
        assert_eq!(clean_generated_code("```pythonic = 1\nprint(pythonic)\n```"), "pythonic = 1\nprint(pythonic)");
    }
}
