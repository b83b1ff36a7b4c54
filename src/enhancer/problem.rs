//! Problem-statement extraction

use std::sync::LazyLock;

use regex::Regex;

/// Politeness / request fillers, stripped repeatedly from the start
static FILLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:please|can you|could you|would you|i need|i want|help me)\b[\s,]*")
        .unwrap()
});

/// Leading question or instruction phrase, stripped once. Longer alternatives
/// come first so that "how do i" wins over "how do".
static LEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:what(?:'s| is| are| was| were)|how (?:do i|do you|do we|does|do|can i|can we|can|should i|should)|how to|why (?:is|are|does|do)|tell me about|explain|describe|define|compare|analy[sz]e|summari[sz]e)\b[\s,:]*",
    )
    .unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Trim and collapse internal whitespace runs to one space
pub fn normalize_whitespace(prompt: &str) -> String {
    WHITESPACE_RE.replace_all(prompt.trim(), " ").into_owned()
}

/// Extract the problem statement from a whitespace-normalized prompt
///
/// Leading fillers and one interrogative/imperative phrase are removed,
/// case-insensitively. Falls back to the prompt itself when nothing was
/// stripped or nothing would remain.
pub fn extract_problem(normalized: &str) -> String {
    let mut rest = normalized;
    let mut stripped = false;

    while let Some(m) = FILLER_RE.find(rest) {
        if m.end() == 0 {
            break;
        }
        rest = &rest[m.end()..];
        stripped = true;
    }

    if let Some(m) = LEAD_RE.find(rest) {
        rest = &rest[m.end()..];
        stripped = true;
    }

    if !stripped {
        return normalized.to_string();
    }

    let problem = rest
        .trim()
        .trim_end_matches(|c: char| c == '?' || c == '.' || c == '!')
        .trim_end();

    if problem.is_empty() {
        normalized.to_string()
    } else {
        problem.to_string()
    }
}
