/// Normalize `\r\n` and lone `\r` to `\n`, split, and drop blank lines.
pub fn split_lines(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    normalized
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_line_endings() {
        let text = "a,b\r\nc,d\re,f\ng,h";
        assert_eq!(split_lines(text), vec!["a,b", "c,d", "e,f", "g,h"]);
    }

    #[test]
    fn test_blank_lines_dropped_in_order() {
        let text = "\n\nfirst\n   \n\t\nsecond\r\n\r\n";
        assert_eq!(split_lines(text), vec!["first", "second"]);
    }

    #[test]
    fn test_leading_bom_removed() {
        assert_eq!(split_lines("\u{feff}datetime,open\n"), vec!["datetime,open"]);
    }

    #[test]
    fn test_whitespace_only_text_is_empty() {
        assert!(split_lines(" \r\n \t ").is_empty());
    }
}
