//! crates/study_notes_core/src/chunker.rs
//!
//! Splits long source text into word-bounded chunks for multi-pass summarization.

/// Splits `text` into consecutive groups of at most `max_words` words.
///
/// Text that already fits is returned untouched as a single chunk, so its original
/// whitespace survives. Longer text is re-joined with single spaces inside each chunk.
/// A `max_words` of zero is treated as one.
pub fn split(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() <= max_words {
        return vec![text.to_string()];
    }

    words.chunks(max_words).map(|group| group.join(" ")).collect()
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Cuts `text` to at most `max_chars` characters, backing up to the last whitespace
/// so the final word is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        None => text,
        Some((cut, _)) => {
            let head = &text[..cut];
            match head.rfind(char::is_whitespace) {
                Some(ws) if ws > 0 => head[..ws].trim_end(),
                _ => head,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_text_is_returned_verbatim() {
        let text = "  two\n\nwords  ";
        assert_eq!(split(text, 5), vec![text.to_string()]);
    }

    #[test]
    fn long_text_is_grouped_in_order() {
        let chunks = split("a b c d e f g", 3);
        assert_eq!(chunks, vec!["a b c", "d e f", "g"]);
    }

    #[test]
    fn runs_of_whitespace_count_as_one_separator() {
        let chunks = split("a\t\tb\n\nc   d", 2);
        assert_eq!(chunks, vec!["a b", "c d"]);
    }

    #[test]
    fn truncation_backs_up_to_a_word_boundary() {
        assert_eq!(truncate_chars("hello wonderful world", 12), "hello");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("ééé ééé", 5), "ééé");
    }

    proptest! {
        #[test]
        fn split_is_lossless_and_bounded(text in "[a-z \\n\\t]{0,400}", max_words in 1usize..20) {
            let chunks = split(&text, max_words);
            for chunk in &chunks {
                prop_assert!(word_count(chunk) <= max_words);
            }
            let rejoined = chunks.join(" ");
            let original: Vec<&str> = text.split_whitespace().collect();
            let after: Vec<&str> = rejoined.split_whitespace().collect();
            prop_assert_eq!(original, after);
        }
    }
}
