use super::numbers::parse_number;
use super::rules::truncate;
use regex::Regex;
use std::sync::OnceLock;

static AREA_VALUE: OnceLock<Regex> = OnceLock::new();
static PERCENT_VALUE: OnceLock<Regex> = OnceLock::new();
static ANY_NUMBER: OnceLock<Regex> = OnceLock::new();

/// Values recovered by the label-less scan, each with the snippet it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FallbackScan {
    pub(crate) area: Option<(f64, String)>,
    pub(crate) ratio: Option<(f64, String)>,
    pub(crate) count: Option<(f64, String)>,
}

/// Scans text that still carries its unit tokens.
pub(crate) fn scan(text_with_units: &str) -> FallbackScan {
    FallbackScan {
        area: first_value(area_value(), text_with_units),
        ratio: first_value(percent_value(), text_with_units),
        count: first_bare_number(text_with_units),
    }
}

fn first_value(regex: &Regex, text: &str) -> Option<(f64, String)> {
    regex.captures_iter(text).find_map(|captures| {
        let value = parse_number(captures.get(1)?.as_str())?;
        let snippet = captures.get(0)?.as_str();
        Some((value, truncate(snippet.trim(), 60)))
    })
}

fn first_bare_number(text: &str) -> Option<(f64, String)> {
    any_number().captures_iter(text).find_map(|captures| {
        if captures.get(2).is_some() {
            return None;
        }
        let token = captures.get(1)?.as_str();
        parse_number(token).map(|value| (value, token.to_string()))
    })
}

fn area_value() -> &'static Regex {
    AREA_VALUE.get_or_init(|| {
        Regex::new(r"(\d{1,3}(?: \d{3})+(?:[.,]\d+)?|\d+(?:[.,]\d+)?)\s?(?:m²|m2\b)")
            .expect("area value pattern is valid")
    })
}

fn percent_value() -> &'static Regex {
    PERCENT_VALUE.get_or_init(|| {
        Regex::new(r"(\d+(?:[.,]\d+)?)\s?%").expect("percent value pattern is valid")
    })
}

fn any_number() -> &'static Regex {
    ANY_NUMBER.get_or_init(|| {
        Regex::new(r"(\d{1,3}(?: \d{3})+(?:[.,]\d+)?|\d+(?:[.,]\d+)?)(\s?(?:m²|m2\b|%))?")
            .expect("number pattern is valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_area_percentage_and_bare_number() {
        let scan = scan("návrh 3, celkem 12 500 m² území, zeleň 35 %, 120 bytů");
        assert_eq!(scan.area.as_ref().map(|(v, _)| *v), Some(12500.0));
        assert_eq!(scan.ratio.as_ref().map(|(v, _)| *v), Some(35.0));
        assert_eq!(scan.count.as_ref().map(|(v, _)| *v), Some(3.0));
    }

    #[test]
    fn bare_number_skips_unit_bearing_values() {
        let scan = scan("12 500 m2 a 40 % a 77");
        assert_eq!(scan.count.map(|(v, _)| v), Some(77.0));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert_eq!(scan(""), FallbackScan::default());
    }
}
