use super::numbers::parse_number;
use crate::comparison::domain::{ExtractionRule, NumberCapture};
use regex::Regex;

const GROUPED_NUMBER: &str = r"(\d{1,3}(?: \d{3})+(?:[.,]\d+)?|\d+(?:[.,]\d+)?)\b";
const FIRST_RUN_NUMBER: &str = r"(\d+)";
const SEPARATOR: &str = r"\s*[:=–-]?\s*";
/// A short aside with no nested parentheses, so an unclosed one cannot swallow later rows.
const ASIDE: &str = r"\([^()]{0,80}\)";
const EVIDENCE_LIMIT: usize = 120;

/// Extraction rule compiled against preprocessed (lower-cased) document text.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    rule: ExtractionRule,
    regex: Regex,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RuleHit {
    pub(crate) value: f64,
    pub(crate) evidence: String,
}

impl CompiledRule {
    pub(crate) fn compile(rule: &ExtractionRule) -> Result<Self, regex::Error> {
        let regex = Regex::new(&rule_pattern(rule))?;
        Ok(Self {
            rule: rule.clone(),
            regex,
        })
    }

    pub(crate) fn rule(&self) -> &ExtractionRule {
        &self.rule
    }

    /// First occurrence of the rule in `text`; `None` when the label is absent or the
    /// captured token is not a number.
    pub(crate) fn apply(&self, text: &str) -> Option<RuleHit> {
        let captures = self.regex.captures(text)?;
        let token = captures.get(1)?.as_str();
        let value = parse_number(token)?;
        let evidence = captures.get(0).map(|m| m.as_str()).unwrap_or(token);

        Some(RuleHit {
            value,
            evidence: truncate(evidence.trim(), EVIDENCE_LIMIT),
        })
    }
}

pub(crate) fn rule_pattern(rule: &ExtractionRule) -> String {
    let label = label_pattern(rule.label());
    let number = match rule.capture() {
        NumberCapture::Grouped => GROUPED_NUMBER,
        NumberCapture::FirstRun => FIRST_RUN_NUMBER,
    };

    match rule {
        ExtractionRule::Simple { .. } => format!("{label}{SEPARATOR}{number}"),
        ExtractionRule::ParentheticalSkip { .. } => {
            format!(r"{label}\s*{ASIDE}{SEPARATOR}{number}")
        }
    }
}

fn label_pattern(label: &str) -> String {
    let lowered = label.to_lowercase();
    let words: Vec<String> = lowered.split_whitespace().map(regex::escape).collect();
    let body = words.join(r"\s+");

    if lowered
        .trim_start()
        .chars()
        .next()
        .is_some_and(char::is_alphanumeric)
    {
        format!(r"\b{body}")
    } else {
        body
    }
}

pub(crate) fn truncate(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((index, _)) => format!("{}…", &value[..index]),
        None => value.to_string(),
    }
}
