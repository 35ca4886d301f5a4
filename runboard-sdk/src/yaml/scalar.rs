use super::resolve;

/// YAML 1.1 spellings of booleans that YAML 1.2 readers take as strings.
const DEPRECATED_BOOLEANS: [&str; 16] = [
    "y", "Y", "yes", "Yes", "YES", "on", "On", "ON",
    "n", "N", "no", "No", "NO", "off", "Off", "OFF",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarStyle {
    Plain,
    SingleQuoted,
    Literal,
    Folded,
    DoubleQuoted,
}

pub(crate) fn write_string(
    text: &str,
    indent: usize,
    indent_per_level: usize,
    line_width: usize,
    is_key: bool,
) -> String {
    if text.is_empty() {
        return "''".to_string();
    }

    if DEPRECATED_BOOLEANS.contains(&text) {
        return format!("'{}'", text);
    }

    match choose_style(text, is_key, indent_per_level, line_width) {
        ScalarStyle::Plain => text.to_string(),
        ScalarStyle::SingleQuoted => format!("'{}'", text.replace('\'', "''")),
        ScalarStyle::Literal => format!(
            "|{}{}",
            block_header(text, indent_per_level),
            drop_ending_newline(&indent_string(text, indent)),
        ),
        ScalarStyle::Folded => format!(
            ">{}{}",
            block_header(text, indent_per_level),
            drop_ending_newline(&indent_string(&fold_string(text, line_width), indent)),
        ),
        ScalarStyle::DoubleQuoted => format!("\"{}\"", escape_string(text)),
    }
}

pub(crate) fn choose_style(
    text: &str,
    single_line_only: bool,
    indent_per_level: usize,
    line_width: usize,
) -> ScalarStyle {
    let chars: Vec<char> = text.chars().collect();
    let (Some(&first), Some(&last)) = (chars.first(), chars.last()) else {
        return ScalarStyle::SingleQuoted;
    };

    let mut plain = is_plain_safe_first(first) && !is_whitespace(last);
    let mut has_line_break = false;
    let mut has_foldable_line = false;
    // Start of the current line, i.e. one past the last line feed.
    let mut line_start = 0usize;

    for (index, &ch) in chars.iter().enumerate() {
        if ch == '\n' && !single_line_only {
            has_line_break = true;
            has_foldable_line = has_foldable_line || is_foldable(&chars[line_start..index], line_width);
            line_start = index + 1;
        } else if !is_printable(ch) {
            return ScalarStyle::DoubleQuoted;
        }

        let previous = index.checked_sub(1).map(|i| chars[i]);
        plain = plain && is_plain_safe(ch, previous);
    }

    if !single_line_only {
        has_foldable_line = has_foldable_line || is_foldable(&chars[line_start..], line_width);
    }

    if !has_line_break && !has_foldable_line {
        return if plain && !resolve::is_ambiguous(text) {
            ScalarStyle::Plain
        } else {
            ScalarStyle::SingleQuoted
        };
    }

    if indent_per_level > 9 && needs_indent_indicator(text) {
        return ScalarStyle::DoubleQuoted;
    }

    if has_foldable_line {
        ScalarStyle::Folded
    } else {
        ScalarStyle::Literal
    }
}

fn is_foldable(line: &[char], line_width: usize) -> bool {
    line.len() > line_width && line.first() != Some(&' ')
}

/// Characters that may appear unescaped. Supplementary-plane characters are
/// excluded so they always take the double-quoted style.
fn is_printable(ch: char) -> bool {
    let code = ch as u32;
    (0x20..=0x7E).contains(&code)
        || ((0xA1..=0xD7FF).contains(&code) && code != 0x2028 && code != 0x2029)
        || ((0xE000..=0xFFFD).contains(&code) && code != 0xFEFF)
}

fn is_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

fn is_ns_char(ch: char) -> bool {
    is_printable(ch) && !is_whitespace(ch) && ch != '\u{FEFF}' && ch != '\r' && ch != '\n'
}

fn is_plain_safe(ch: char, previous: Option<char>) -> bool {
    is_printable(ch)
        && ch != '\u{FEFF}'
        && !matches!(ch, ',' | '[' | ']' | '{' | '}' | ':')
        && (ch != '#' || previous.is_some_and(is_ns_char))
}

fn is_plain_safe_first(ch: char) -> bool {
    is_printable(ch)
        && ch != '\u{FEFF}'
        && !is_whitespace(ch)
        && !matches!(
            ch,
            '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '='
                | '>' | '\'' | '"' | '%' | '@' | '`'
        )
}

fn needs_indent_indicator(text: &str) -> bool {
    text.trim_start_matches('\n').starts_with(' ')
}

fn block_header(text: &str, indent_per_level: usize) -> String {
    let indent_indicator = if needs_indent_indicator(text) {
        indent_per_level.to_string()
    } else {
        String::new()
    };

    let clip = text.ends_with('\n');
    let keep = clip && (text.ends_with("\n\n") || text == "\n");
    let chomp = if keep { "+" } else if clip { "" } else { "-" };

    format!("{}{}\n", indent_indicator, chomp)
}

fn indent_string(text: &str, spaces: usize) -> String {
    let indentation = " ".repeat(spaces);
    let mut result = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        if line != "\n" {
            result.push_str(&indentation);
        }
        result.push_str(line);
    }

    result
}

fn drop_ending_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Folds every line longer than `width` at single spaces, doubling the
/// line breaks between unindented lines so they survive folding.
fn fold_string(text: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let first_break = chars.iter().position(|&c| c == '\n').unwrap_or(chars.len());

    let mut result = fold_line(&chars[..first_break], width);
    let mut previous_more_indented = matches!(chars.first(), Some('\n') | Some(' '));
    let mut index = first_break;

    while index < chars.len() {
        let breaks_start = index;
        while index < chars.len() && chars[index] == '\n' {
            index += 1;
        }
        let breaks = &chars[breaks_start..index];

        let line_start = index;
        while index < chars.len() && chars[index] != '\n' {
            index += 1;
        }
        let line = &chars[line_start..index];

        let more_indented = line.first() == Some(&' ');

        result.extend(breaks);
        if !previous_more_indented && !more_indented && !line.is_empty() {
            result.push('\n');
        }
        result.push_str(&fold_line(line, width));

        previous_more_indented = more_indented;
    }

    result
}

fn fold_line(line: &[char], width: usize) -> String {
    if line.is_empty() || line[0] == ' ' {
        return line.iter().collect();
    }

    let mut result = String::new();
    let mut start = 0usize;
    let mut current = 0usize;

    // Candidate break points are spaces followed by a non-space.
    for next in 0..line.len().saturating_sub(1) {
        if line[next] != ' ' || line[next + 1] == ' ' {
            continue;
        }

        if next > start + width {
            let end = if current > start { current } else { next };
            result.push('\n');
            result.extend(&line[start..end]);
            start = end + 1;
        }
        current = next;
    }

    result.push('\n');
    if line.len() > start + width && current > start {
        result.extend(&line[start..current]);
        result.push('\n');
        result.extend(&line[current + 1..]);
    } else {
        result.extend(&line[start..]);
    }

    result.split_off(1)
}

fn escape_string(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);

    for ch in text.chars() {
        match escape_sequence(ch) {
            Some(sequence) => result.push_str(sequence),
            None if is_printable(ch) => result.push(ch),
            None => result.push_str(&encode_hex(ch as u32)),
        }
    }

    result
}

fn escape_sequence(ch: char) -> Option<&'static str> {
    let sequence = match ch {
        '\0' => "\\0",
        '\u{07}' => "\\a",
        '\u{08}' => "\\b",
        '\t' => "\\t",
        '\n' => "\\n",
        '\u{0B}' => "\\v",
        '\u{0C}' => "\\f",
        '\r' => "\\r",
        '\u{1B}' => "\\e",
        '"' => "\\\"",
        '\\' => "\\\\",
        '\u{85}' => "\\N",
        '\u{A0}' => "\\_",
        '\u{2028}' => "\\L",
        '\u{2029}' => "\\P",
        _ => return None,
    };

    Some(sequence)
}

fn encode_hex(code: u32) -> String {
    if code <= 0xFF {
        format!("\\x{:02X}", code)
    } else if code <= 0xFFFF {
        format!("\\u{:04X}", code)
    } else {
        format!("\\U{:08X}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(text: &str) -> ScalarStyle {
        choose_style(text, false, 2, 76)
    }

    #[test]
    fn test_plain_and_quoted_styles() {
        assert_eq!(style("tekton.dev/v1beta1"), ScalarStyle::Plain);
        assert_eq!(style("test-r-"), ScalarStyle::Plain);
        assert_eq!(style("a#b"), ScalarStyle::Plain);
        assert_eq!(style("a #b"), ScalarStyle::SingleQuoted);
        assert_eq!(style("-leading"), ScalarStyle::SingleQuoted);
        assert_eq!(style("key: value"), ScalarStyle::SingleQuoted);
        assert_eq!(style("trailing "), ScalarStyle::SingleQuoted);
        assert_eq!(style("true"), ScalarStyle::SingleQuoted);
        assert_eq!(style("42"), ScalarStyle::SingleQuoted);
    }

    #[test]
    fn test_unprintable_forces_double_quotes() {
        assert_eq!(style("tab\there"), ScalarStyle::DoubleQuoted);
        assert_eq!(style("crlf\r\n"), ScalarStyle::DoubleQuoted);
        assert_eq!(style("rocket \u{1F680}"), ScalarStyle::DoubleQuoted);
        assert_eq!(choose_style("multi\nline", true, 2, 76), ScalarStyle::DoubleQuoted);
    }

    #[test]
    fn test_block_styles() {
        assert_eq!(style("one\ntwo\n"), ScalarStyle::Literal);
        assert_eq!(style(&"word ".repeat(10)), ScalarStyle::SingleQuoted);
        assert_eq!(style("word ".repeat(20).trim_end()), ScalarStyle::Folded);
        assert_eq!(style(&" indented".repeat(10)), ScalarStyle::SingleQuoted);
    }

    #[test]
    fn test_block_header_chomping() {
        assert_eq!(block_header("a\n", 2), "\n");
        assert_eq!(block_header("a", 2), "-\n");
        assert_eq!(block_header("a\n\n", 2), "+\n");
        assert_eq!(block_header("\n", 2), "+\n");
        assert_eq!(block_header("  indented\n", 2), "2\n");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a\"b\\c"), "a\\\"b\\\\c");
        assert_eq!(escape_string("\t\u{1}\u{A0}"), "\\t\\x01\\_");
        assert_eq!(escape_string("\u{FEFF}"), "\\uFEFF");
        assert_eq!(escape_string("\u{1F680}"), "\\U0001F680");
    }

    #[test]
    fn test_fold_line_breaks_at_spaces() {
        let line: Vec<char> = "aaaa bbbb cccc dddd".chars().collect();
        assert_eq!(fold_line(&line, 10), "aaaa bbbb\ncccc dddd");

        let unbreakable: Vec<char> = "abcdefghijklmnop".chars().collect();
        assert_eq!(fold_line(&unbreakable, 10), "abcdefghijklmnop");
    }

    #[test]
    fn test_fold_string_separates_paragraph_lines() {
        assert_eq!(fold_string("first\nsecond", 40), "first\n\nsecond");
        assert_eq!(fold_string("first\n  indented", 40), "first\n  indented");
    }
}
