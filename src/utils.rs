use crate::consts::ENCODING_MARKS;
use encoding_rs::Encoding;
use icu_properties::{maps, GeneralCategoryGroup};

// Utils module

// Round to the given number of decimal digits (feedback context values carry
// confidences rounded to 6 digits).
pub fn round_float(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

// Decode without replacement: any malformed sequence rejects the whole
// buffer.
pub(crate) fn strict_decode(data: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|decoded| decoded.into_owned())
}

// Printable in the text sense: TAB/CR/LF and space pass, other control,
// format, separator, surrogate, private-use and unassigned characters do not.
pub(crate) fn is_text_printable(character: char) -> bool {
    if matches!(character, '\t' | '\n' | '\r' | ' ') {
        return true;
    }
    let category = maps::general_category().get(character);
    !(GeneralCategoryGroup::Other.contains(category)
        || GeneralCategoryGroup::Separator.contains(category))
}

pub(crate) fn is_kana(character: char) -> bool {
    ('\u{3040}'..='\u{30FF}').contains(&character)
}

pub(crate) fn is_cjk_ideograph(character: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&character)
}

// Match a leading byte-order mark. Longest marks are listed first in
// ENCODING_MARKS, so utf-32 signatures win over their utf-16 prefixes.
pub(crate) fn identify_bom(sequence: &[u8]) -> Option<(&'static str, &'static [u8])> {
    ENCODING_MARKS
        .iter()
        .find(|(_, mark)| sequence.starts_with(mark))
        .copied()
}

pub(crate) fn has_high_bytes(data: &[u8]) -> bool {
    data.iter().any(|&byte| byte >= 0x80)
}

// Ratio of bytes that are suspicious in every supported text encoding:
// ASCII controls other than TAB/LF/CR/ESC, plus DEL. ESC is excluded so
// escape-encoded material is never counted against itself.
pub(crate) fn control_byte_ratio(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let suspicious = data
        .iter()
        .filter(|&&byte| (byte < 0x20 && !matches!(byte, 0x09 | 0x0A | 0x0D | 0x1B)) || byte == 0x7F)
        .count();
    suspicious as f64 / data.len() as f64
}
