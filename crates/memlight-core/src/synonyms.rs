//! Fixed synonym table for query expansion.
//!
//! Expansion happens at query time only; indexed terms are stored as
//! extracted. The table is hand-authored and not fully symmetric: a
//! term may list a synonym that does not list it back (e.g. `记忆`
//! lists `笔记`, but `笔记` has no entry). The asymmetry is preserved
//! as-is.

const SYNONYMS: &[(&str, &[&str])] = &[
    // Chinese
    ("小蝎子", &["用户", "主人", "朋友"]),
    ("用户", &["小蝎子", "主人", "朋友"]),
    ("小飞棍", &["我", "助手", "AI", "ai"]),
    ("我", &["小飞棍", "助手"]),
    ("记忆", &["记录", "日志", "笔记"]),
    ("记录", &["记忆", "日志"]),
    ("文件", &["文档", "资料"]),
    ("文档", &["文件", "资料"]),
    // English
    ("user", &["human", "person", "friend"]),
    ("ai", &["assistant", "bot", "agent"]),
    ("memory", &["record", "log", "note"]),
    ("file", &["document", "doc"]),
];

fn synonyms_for(term: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .iter()
        .find(|(key, _)| *key == term)
        .map(|(_, syns)| *syns)
}

/// Expand a term set with every synonym listed for its members.
///
/// Returns the input terms in order, followed by unseen synonyms in
/// table order. Deduplicated; deterministic.
pub fn expand(terms: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        if !expanded.contains(term) {
            expanded.push(term.clone());
        }
    }
    for term in terms {
        if let Some(syns) = synonyms_for(term) {
            for syn in syns {
                if !expanded.iter().any(|t| t == syn) {
                    expanded.push((*syn).to_string());
                }
            }
        }
    }
    expanded
}
