//! Keyword scanning shared by category detection and format suggestion
//!
//! Match rule: the keyword must appear in the prompt (case-insensitive) with a
//! string edge or a character that is neither alphabetic nor numeric on both
//! sides. This is looser than regex `\b`: `_`, `-` and `.` all separate words,
//! so `snake_case_code` and `vue.js` contain `code` and `vue`. Occurrences are
//! counted left to right without overlap. Empty keywords never match, and
//! inflections ("step" / "steps") have to be listed separately.
//!
//! Each keyword is compiled once into a [`Regex`] when a [`KeywordTables`] is
//! built from a [`Config`].

use regex::Regex;
use tracing::warn;

use crate::config::Config;
use crate::model::{Category, OutputFormat};

/// A char that may sit next to a keyword
const SEPARATOR: &str = r"[^\p{Alphabetic}\p{N}]";

/// Compile one keyword. Blank keywords yield `None`.
pub fn compile_keyword(keyword: &str) -> Result<Option<Regex>, regex::Error> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(None);
    }

    let pattern = format!(
        r"(?i)(?:^|{sep})({word})(?:$|{sep})",
        sep = SEPARATOR,
        word = regex::escape(&needle)
    );
    Regex::new(&pattern).map(Some)
}

/// Compiled keyword list of one category or format
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    patterns: Vec<Regex>,
}

impl KeywordSet {
    /// Compile a keyword list; keywords that fail to compile are skipped
    pub fn new(keywords: &[String]) -> Self {
        let patterns = keywords
            .iter()
            .filter_map(|keyword| match compile_keyword(keyword) {
                Ok(pattern) => pattern,
                Err(e) => {
                    warn!("Skipping keyword {:?}: {}", keyword, e);
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Sum of occurrences of every keyword in the set
    pub fn count(&self, text: &str) -> usize {
        self.patterns
            .iter()
            .map(|pattern| count_matches(pattern, text))
            .sum()
    }
}

fn count_matches(pattern: &Regex, text: &str) -> usize {
    let mut count = 0;
    let mut start = 0;
    // Resume right after the keyword so its trailing separator can lead the next match
    while let Some(word) = pattern.captures_at(text, start).and_then(|caps| caps.get(1)) {
        count += 1;
        start = word.end();
    }
    count
}

/// Keyword tables of a [`Config`], compiled and kept in priority order
#[derive(Debug, Clone)]
pub struct KeywordTables {
    contexts: Vec<(Category, KeywordSet)>,
    formats: Vec<(OutputFormat, KeywordSet)>,
}

impl KeywordTables {
    pub fn from_config(config: &Config) -> Self {
        Self {
            contexts: Category::ALL
                .iter()
                .map(|c| (*c, KeywordSet::new(config.keywords_for_context(*c))))
                .collect(),
            formats: OutputFormat::ALL
                .iter()
                .map(|f| (*f, KeywordSet::new(config.keywords_for_format(*f))))
                .collect(),
        }
    }

    /// Hits per category, in enumeration order
    pub fn context_scores(&self, text: &str) -> Vec<(Category, usize)> {
        self.contexts
            .iter()
            .map(|(category, set)| (*category, set.count(text)))
            .collect()
    }

    /// Hits per output format, in enumeration order
    pub fn format_scores(&self, text: &str) -> Vec<(OutputFormat, usize)> {
        self.formats
            .iter()
            .map(|(format, set)| (*format, set.count(text)))
            .collect()
    }
}

/// Highest non-zero score. `scores` must be in priority order: on a tie the
/// earlier entry wins.
pub fn pick_highest<T: Copy>(scores: &[(T, usize)]) -> Option<(T, usize)> {
    let mut best: Option<(T, usize)> = None;
    for &(label, hits) in scores {
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, best_hits)) if best_hits >= hits => {}
            _ => best = Some((label, hits)),
        }
    }
    best
}
