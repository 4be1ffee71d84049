//! Decoding of the fixed-width coordinate encoding found in fleet exports.
//!
//! Values arrive as digit strings with thousands separators and no decimal
//! point, e.g. `-25,677,209`. The first two digits of the magnitude are the
//! whole degrees and everything after is the fraction. Three digit degrees
//! (most longitudes outside the region these exports come from) decode wrong,
//! there is no way to tell them apart from the text alone.

/// Decode a raw coordinate field into signed decimal degrees.
///
/// Returns `None` for missing, too short or non-numeric input.
pub fn decode(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let clean: String = raw.chars().filter(|c| *c != ',').collect();
    if clean.chars().count() < 4 {
        return None;
    }

    let (negative, abs) = match clean.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, clean.as_str()),
    };

    let split = abs.char_indices().nth(2).map_or(abs.len(), |(i, _)| i);
    let (degrees, fraction) = abs.split_at(split);
    let formatted = format!("{}{degrees}.{fraction}", if negative { "-" } else { "" });

    let value: f64 = decimal_prefix(&formatted)?.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Longest leading `-?digits[.digits]` run of `s`, if it holds any digit.
///
/// Narrower than a general float parser: a leading `+` yields `None` and an
/// exponent is cut off along with anything else after the digits.
fn decimal_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let mut digits = 0;
    let mut seen_dot = false;
    while let Some(b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if digits == 0 {
        return None;
    }
    // "25." parses fine, a lone "-." would not reach here
    Some(&s[..end])
}
