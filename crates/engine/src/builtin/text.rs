use std::collections::HashMap;
use std::io::ErrorKind;

use crate::coercion::{single_text, text_pair};
use crate::function::{ArgKind, FunctionSpec, Value};

/// Number of entries reported by `frequency`
const TOP_WORDS: usize = 10;

/// Text statistics capabilities
pub fn functions() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec::new("word_count", "Count whitespace-separated words", ArgKind::String, |args| {
            Ok(Value::Count(word_count(single_text(args)?)))
        }),
        FunctionSpec::new("char_count", "Count characters", ArgKind::String, |args| {
            Ok(Value::Count(single_text(args)?.chars().count()))
        }),
        FunctionSpec::new("frequency", "Ten most frequent words", ArgKind::String, |args| {
            Ok(Value::Frequencies(frequency(single_text(args)?, TOP_WORDS)))
        }),
        FunctionSpec::new(
            "find_word",
            "Count case-insensitive occurrences of a word in a text",
            ArgKind::StringPair,
            |args| {
                let (text, word) = text_pair(args)?;
                Ok(Value::Count(find_word(text, word)))
            },
        ),
        FunctionSpec::new("line_count", "Count the lines of a file", ArgKind::String, |args| {
            line_count(single_text(args)?).map(Value::Count)
        }),
    ]
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Most frequent lowercase words; ties keep first-occurrence order
pub fn frequency(text: &str, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for word in text.split_whitespace().map(str::to_lowercase) {
        let count = counts.entry(word.clone()).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|word| {
            let count = counts.get(&word).copied().unwrap_or(0);
            (word, count)
        })
        .collect();
    // Stable sort keeps first-occurrence order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Whole-word, case-insensitive occurrences of `word`
pub fn find_word(text: &str, word: &str) -> usize {
    let needle = word.to_lowercase();
    text.split_whitespace().filter(|w| w.to_lowercase() == needle).count()
}

pub fn line_count(path: &str) -> Result<usize, String> {
    let path = path.trim();
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().count()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(format!("File not found: {}", path)),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::Argument;

    fn invoke(name: &str, args: &[&str]) -> Result<Value, String> {
        let specs = functions();
        let spec = specs.iter().find(|s| s.name() == name).unwrap();
        let args: Vec<Argument> = args.iter().map(|a| Argument::Text(a.to_string())).collect();
        spec.invoke(&args)
    }

    #[test]
    fn test_word_count() {
        assert_eq!(invoke("word_count", &["hello world"]), Ok(Value::Count(2)));
        assert_eq!(invoke("word_count", &["  spaced\tout\nwords  "]), Ok(Value::Count(3)));
        assert_eq!(invoke("word_count", &[""]), Ok(Value::Count(0)));
    }

    #[test]
    fn test_char_count() {
        assert_eq!(invoke("char_count", &["hello"]), Ok(Value::Count(5)));
        assert_eq!(invoke("char_count", &["héllo wörld"]), Ok(Value::Count(11)));
    }

    #[test]
    fn test_frequency_ranking() {
        let freq = frequency("The cat and the dog and THE bird", 10);
        assert_eq!(
            freq,
            vec![
                ("the".to_string(), 3),
                ("and".to_string(), 2),
                ("cat".to_string(), 1),
                ("dog".to_string(), 1),
                ("bird".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_frequency_limit() {
        let text = (0..15).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        assert_eq!(frequency(&text, TOP_WORDS).len(), 10);
        assert!(frequency("", TOP_WORDS).is_empty());
    }

    #[test]
    fn test_frequency_rendering() {
        let value = invoke("frequency", &["b a b"]).unwrap();
        assert_eq!(value.to_string(), "{b: 2, a: 1}");
    }

    #[test]
    fn test_find_word() {
        assert_eq!(invoke("find_word", &["The cat saw the other cat", "CAT"]), Ok(Value::Count(2)));
        assert_eq!(invoke("find_word", &["category cat", "cat"]), Ok(Value::Count(1)));
        assert_eq!(invoke("find_word", &["nothing here", "cat"]), Ok(Value::Count(0)));
    }

    #[test]
    fn test_line_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "one\ntwo\nthree\n").unwrap();

        let result = invoke("line_count", &[path.to_str().unwrap()]);
        assert_eq!(result, Ok(Value::Count(3)));
    }

    #[test]
    fn test_line_count_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "one\ntwo").unwrap();
        assert_eq!(line_count(path.to_str().unwrap()), Ok(2));
    }

    #[test]
    fn test_line_count_missing_file() {
        let result = invoke("line_count", &["/nonexistent/notes.txt"]);
        assert_eq!(result, Err("File not found: /nonexistent/notes.txt".to_string()));
    }
}
