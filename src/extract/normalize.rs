/// Normalizes an extracted markup fragment
///
/// Line endings are unified to `\n`, every line is trimmed, and leading and
/// trailing blank lines are removed. Blank lines between blocks are kept.
/// The function is idempotent.
///
/// # Examples
///
/// ```
/// use web_rollup::extract::normalize_fragment;
///
/// let raw = "\r\n   <h1>Title</h1>\r\n\r\n    <p>Body</p>   \n";
/// assert_eq!(normalize_fragment(raw), "<h1>Title</h1>\n\n<p>Body</p>");
/// ```
pub fn normalize_fragment(fragment: &str) -> String {
    let unified = fragment.replace("\r\n", "\n").replace('\r', "\n");

    unified
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trims_lines() {
        assert_eq!(normalize_fragment("  a  \n\t b\t"), "a\nb");
    }

    #[test]
    fn test_unifies_line_endings() {
        assert_eq!(normalize_fragment("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_removes_boundary_blank_lines() {
        assert_eq!(normalize_fragment("\n\n  \n<p>x</p>\n \n\n"), "<p>x</p>");
    }

    #[test]
    fn test_keeps_interior_blank_lines() {
        assert_eq!(normalize_fragment("<p>a</p>\n\n<p>b</p>"), "<p>a</p>\n\n<p>b</p>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_fragment(""), "");
        assert_eq!(normalize_fragment(" \r\n \t "), "");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "[ \t\r\na-z<>/\u{a0}]{0,64}") {
            let once = normalize_fragment(&s);
            prop_assert_eq!(normalize_fragment(&once), once);
        }

        #[test]
        fn normalized_output_has_no_carriage_returns(s in any::<String>()) {
            prop_assert!(!normalize_fragment(&s).contains('\r'));
        }
    }
}
