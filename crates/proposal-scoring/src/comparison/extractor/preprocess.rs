use crate::comparison::normalizer::collapse_whitespace;
use regex::{Captures, Regex};
use std::sync::OnceLock;

static FOOTNOTE_MARKER: OnceLock<Regex> = OnceLock::new();
static UNIT_TOKEN: OnceLock<Regex> = OnceLock::new();

/// Left where a unit followed a number so a grouped capture cannot run into the next column.
const UNIT_BOUNDARY: char = ';';

/// Document text after the fixed preprocessing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreparedText {
    /// Lower-cased, footnote-free, whitespace-collapsed text with unit tokens removed.
    pub(crate) text: String,
    /// Same text before unit removal; the generic fallback scan needs the units.
    pub(crate) with_units: String,
}

pub(crate) fn prepare(document: &str) -> PreparedText {
    let lowered = document.to_lowercase();
    let without_footnotes = footnote_marker().replace_all(&lowered, "$lead");
    let with_units = collapse_whitespace(&without_footnotes);
    let text = unit_token()
        .replace_all(&with_units, |caps: &Captures| match caps.name("digit") {
            Some(digit) => format!("{}{UNIT_BOUNDARY}", digit.as_str()),
            None => String::new(),
        })
        .into_owned();

    PreparedText { text, with_units }
}

fn footnote_marker() -> &'static Regex {
    FOOTNOTE_MARKER.get_or_init(|| {
        Regex::new(r"(?P<lead>^|[^\d])\d\)").expect("footnote marker pattern is valid")
    })
}

fn unit_token() -> &'static Regex {
    UNIT_TOKEN.get_or_init(|| {
        Regex::new(r"(?P<digit>\d) ?(?:m²|m2\b|ks\b)| ?\b(?:m²|m2\b|ks\b)")
            .expect("unit token pattern is valid")
    })
}
