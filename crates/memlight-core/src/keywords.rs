//! Mixed-script keyword extraction.
//!
//! Produces a deduplicated set of candidate terms from raw text:
//! maximal runs of ASCII letters as whole words, plus every 4-, 3-,
//! and 2-character window whose first character falls in the CJK
//! unified block. The CJK windows deliberately overlap — this is a
//! cheap approximation, not a real segmenter, and the overlapping
//! candidates are part of the ranking behavior rather than a bug.

use std::collections::BTreeSet;

/// Common English and Chinese function words excluded from the index.
const STOPWORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
    "was", "were", "be", "been", "的", "了", "在", "是", "我", "有", "和", "就", "不", "人",
    "都", "一", "一个", "上", "也", "很", "到", "说", "要", "去", "你", "会", "着", "没有",
    "看", "好", "自己", "这", "那", "个", "能", "可以", "把", "让", "给", "被", "跟", "对",
    "向", "从",
];

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

fn is_stopword(term: &str) -> bool {
    STOPWORDS.contains(&term)
}

/// Extract the deduplicated keyword set for a piece of text.
///
/// The result carries no frequency information; callers count
/// occurrences against the source text with [`occurrence_count`].
/// Output order is sorted (the contract is a set).
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut terms: BTreeSet<String> = BTreeSet::new();

    // Whole-word runs of ASCII letters
    let mut run = String::new();
    for c in lower.chars() {
        if c.is_ascii_lowercase() {
            run.push(c);
        } else if !run.is_empty() {
            terms.insert(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        terms.insert(run);
    }

    // Overlapping CJK windows, longest first
    let chars: Vec<char> = lower.chars().collect();
    for i in 0..chars.len() {
        if !is_cjk(chars[i]) {
            continue;
        }
        for len in [4usize, 3, 2] {
            if i + len <= chars.len() {
                terms.insert(chars[i..i + len].iter().collect());
            }
        }
    }

    terms
        .into_iter()
        .filter(|t| t.chars().count() > 1)
        .filter(|t| !is_stopword(t))
        .collect()
}

/// Count non-overlapping occurrences of `term` in already-lowercased text.
pub fn occurrence_count(text_lower: &str, term: &str) -> u64 {
    if term.is_empty() {
        return 0;
    }
    text_lower.matches(term).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_words_lowercased_and_split() {
        let terms = extract_keywords("User said Hello, WORLD!");
        assert!(terms.contains(&"user".to_string()));
        assert!(terms.contains(&"said".to_string()));
        assert!(terms.contains(&"hello".to_string()));
        assert!(terms.contains(&"world".to_string()));
    }

    #[test]
    fn test_single_letters_dropped() {
        let terms = extract_keywords("a b c ab");
        assert_eq!(terms, vec!["ab".to_string()]);
    }

    #[test]
    fn test_stopwords_removed() {
        let terms = extract_keywords("the cat and the dog");
        assert!(!terms.contains(&"the".to_string()));
        assert!(!terms.contains(&"and".to_string()));
        assert!(terms.contains(&"cat".to_string()));
        assert!(terms.contains(&"dog".to_string()));
    }

    #[test]
    fn test_cjk_windows_overlap() {
        // Four CJK chars produce one 4-gram, two 3-grams, three 2-grams
        // (minus any stop-words).
        let terms = extract_keywords("搜索引擎");
        assert!(terms.contains(&"搜索引擎".to_string()));
        assert!(terms.contains(&"搜索引".to_string()));
        assert!(terms.contains(&"索引擎".to_string()));
        assert!(terms.contains(&"搜索".to_string()));
        assert!(terms.contains(&"索引".to_string()));
        assert!(terms.contains(&"引擎".to_string()));
    }

    #[test]
    fn test_cjk_stopwords_removed() {
        let terms = extract_keywords("没有记录");
        assert!(!terms.contains(&"没有".to_string()));
        assert!(terms.contains(&"记录".to_string()));
    }

    #[test]
    fn test_mixed_script_text() {
        let terms = extract_keywords("今天 deploy 了服务");
        assert!(terms.contains(&"deploy".to_string()));
        assert!(terms.contains(&"今天".to_string()));
        assert!(terms.contains(&"服务".to_string()));
    }

    #[test]
    fn test_deduplicated_output() {
        let terms = extract_keywords("note note note");
        assert_eq!(terms, vec!["note".to_string()]);
    }

    #[test]
    fn test_empty_and_symbol_only_text() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("!!! 123 ---").is_empty());
    }

    #[test]
    fn test_occurrence_count() {
        assert_eq!(occurrence_count("user said user", "user"), 2);
        assert_eq!(occurrence_count("aaaa", "aa"), 2); // non-overlapping
        assert_eq!(occurrence_count("hello", "world"), 0);
        assert_eq!(occurrence_count("hello", ""), 0);
    }
}
