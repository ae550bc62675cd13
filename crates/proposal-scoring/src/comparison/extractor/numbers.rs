/// Parses a captured numeric token. Spaces are thousands separators and a decimal comma is
/// accepted; anything that does not yield a finite number is rejected.
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    let compact: String = token
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();

    if compact.is_empty() {
        return None;
    }

    compact.parse::<f64>().ok().filter(|value| value.is_finite())
}
