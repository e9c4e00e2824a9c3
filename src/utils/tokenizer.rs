//! Display-name tokenization.
//!
//! A token is either a maximal run of word characters (alphanumeric or `_`)
//! or a single punctuation character. Concatenating the tokens of a name
//! reproduces the name exactly; the builder's offset arithmetic depends on
//! that invariant, so this function never drops or merges characters.

/// Split a display name into tokens, as borrowed slices of the input.
///
/// `"System.List`1"` tokenizes to `["System", ".", "List", "`", "1"]`.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if is_word_char(ch) {
            if word_start.is_none() {
                word_start = Some(i);
            }
        } else {
            if let Some(start) = word_start.take() {
                tokens.push(&text[start..i]);
            }
            tokens.push(&text[i..i + ch.len_utf8()]);
        }
    }

    if let Some(start) = word_start {
        tokens.push(&text[start..]);
    }

    tokens
}

#[inline]
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let tokens = tokenize("System.Collections.Generic.List`1");
        assert_eq!(
            tokens,
            vec![
                "System", ".", "Collections", ".", "Generic", ".", "List", "`", "1"
            ]
        );
    }

    #[test]
    fn test_parameter_list() {
        let tokens = tokenize("Int32.Parse(String)");
        assert_eq!(tokens, vec!["Int32", ".", "Parse", "(", "String", ")"]);
    }

    #[test]
    fn test_underscore_is_word() {
        assert_eq!(tokenize("get_value"), vec!["get_value"]);
    }

    #[test]
    fn test_concat_reproduces_input() {
        for name in [
            "System.Collections.Generic.List`1",
            "Int32.Parse(String, IFormatProvider)",
            "Café.Größe",
            "..leading..dots..",
            "",
        ] {
            assert_eq!(tokenize(name).concat(), name);
        }
    }

    #[test]
    fn test_empty() {
        assert!(tokenize("").is_empty());
    }
}
