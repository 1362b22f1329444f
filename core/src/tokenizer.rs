use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Maximal runs of word characters; anything else only separates runs.
    static ref RE: Regex = Regex::new(r"[0-9A-Za-z_]+").expect("valid regex");
}

/// Lowercase a raw word run into a term.
pub fn normalize(word: &str) -> String {
    word.to_ascii_lowercase()
}

/// Iterate over the normalized terms of `text` in input order.
pub fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    RE.find_iter(text).map(|m| normalize(m.as_str()))
}

/// Tokenize text into lowercased word runs, dropping punctuation, whitespace and symbols.
pub fn tokenize(text: &str) -> Vec<String> {
    terms(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Hello, world! hello_there 42x");
        assert_eq!(t, vec!["hello", "world", "hello_there", "42x"]);
    }

    #[test]
    fn symbols_only_yield_nothing() {
        assert!(tokenize("  %#$@! && -- ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn separators_split_runs() {
        assert_eq!(tokenize("don't"), vec!["don", "t"]);
        assert_eq!(tokenize("a-b.c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(tokenize("café menu"), vec!["caf", "menu"]);
    }
}
