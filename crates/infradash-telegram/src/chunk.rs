//! Line-preserving message splitting.

/// Longest message sent in one call, in characters.
///
/// Telegram's hard limit is 4096; the margin leaves room for HTML entities.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Splits `text` into chunks of at most `max_chars` characters.
///
/// Chunks break on line boundaries; when no line exceeds `max_chars`, joining
/// them with `'\n'` gives back the original text. A single line longer than
/// `max_chars` is cut into pieces of at most `max_chars`, never inside an
/// HTML tag or entity unless the tag alone is longer than `max_chars`. Empty
/// text yields no chunks.
#[must_use]
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if !current.is_empty() {
                chunks.push(current.join("\n"));
                current.clear();
                current_len = 0;
            }
            chunks.extend(hard_split(line, max_chars));
            continue;
        }

        // +1 for the newline that rejoins this line to the previous one
        let joined_len = if current.is_empty() {
            line_len
        } else {
            current_len + 1 + line_len
        };

        if joined_len > max_chars {
            chunks.push(current.join("\n"));
            current.clear();
            current.push(line);
            current_len = line_len;
        } else {
            current.push(line);
            current_len = joined_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }
    chunks
}

fn hard_split(line: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            if let Some(open) = unclosed_markup(&chars[start..end]).filter(|&i| i > 0) {
                end = start + open;
            }
        }
        pieces.push(chars[start..end].iter().collect());
        start = end;
    }
    pieces
}

/// Offset of a `<` or `&` in `piece` whose tag or entity is not closed
/// before the end of the piece.
fn unclosed_markup(piece: &[char]) -> Option<usize> {
    let mut open: Option<(usize, char)> = None;
    for (i, &c) in piece.iter().enumerate() {
        match (c, open) {
            ('<' | '&', _) => open = Some((i, c)),
            ('>', Some((_, '<'))) | (';', Some((_, '&'))) => open = None,
            (c, Some((_, '&'))) if c.is_whitespace() => open = None,
            _ => {}
        }
    }
    open.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_within(chunks: &[String], max: usize) -> bool {
        chunks.iter().all(|c| c.chars().count() <= max)
    }

    #[test]
    fn test_short_message_is_one_chunk() {
        let text = "line one\nline two";
        assert_eq!(split_message(text, MAX_MESSAGE_CHARS), vec![text.to_string()]);
    }

    #[test]
    fn test_exactly_at_limit() {
        let text = "x".repeat(MAX_MESSAGE_CHARS);
        assert_eq!(split_message(&text, MAX_MESSAGE_CHARS).len(), 1);
    }

    #[test]
    fn test_empty_message() {
        assert!(split_message("", MAX_MESSAGE_CHARS).is_empty());
    }

    #[test]
    fn test_splits_on_line_boundaries() {
        let line = "a".repeat(30);
        let text = vec![line.as_str(); 10].join("\n");

        let chunks = split_message(&text, 100);
        assert_eq!(chunks.len(), 4);
        assert!(all_within(&chunks, 100));
        assert_eq!(chunks.join("\n"), text);
        assert!(chunks.iter().all(|c| c.split('\n').all(|l| l == line)));
    }

    #[test]
    fn test_over_long_line_is_hard_split() {
        let text = format!("head\n{}\ntail", "b".repeat(25));
        let chunks = split_message(&text, 10);

        assert!(all_within(&chunks, 10));
        assert_eq!(chunks, vec!["head", "bbbbbbbbbb", "bbbbbbbbbb", "bbbbb", "tail"]);
        assert_eq!(chunks.concat(), text.replace('\n', ""));
    }

    #[test]
    fn test_hard_split_keeps_markup_whole() {
        let text = format!("head\n{}&amp;{}", "x".repeat(8), "y".repeat(5));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks, vec!["head", "xxxxxxxx", "&amp;yyyyy"]);

        let chunks = split_message("ab<b>cdefghij", 4);
        assert_eq!(chunks, vec!["ab", "<b>c", "defg", "hij"]);

        let link = format!("see <a href=\"https://sam.gov/opp/{}\">x</a>", "9".repeat(20));
        let chunks = split_message(&link, 40);
        assert!(all_within(&chunks, 40));
        assert_eq!(chunks[0], "see ");
        assert!(chunks[1].starts_with("<a href="));
        assert_eq!(chunks.concat(), link);
    }

    #[test]
    fn test_tag_longer_than_limit_still_splits() {
        let tag = format!("<{}>", "a".repeat(10));
        let chunks = split_message(&tag, 4);
        assert!(all_within(&chunks, 4));
        assert_eq!(chunks.concat(), tag);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = format!("{}\n{}", "🟢".repeat(6), "🔴".repeat(6));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "🟢".repeat(6));
    }

    #[test]
    fn test_blank_lines_survive() {
        let text = format!("{}\n\n{}", "a".repeat(8), "b".repeat(8));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.join("\n"), text);
        assert!(all_within(&chunks, 10));
    }
}
