use ahash::HashMap;
use once_cell::sync::Lazy;
use std::iter::FromIterator;

// Build-time tunables. None of these is runtime-configurable.
pub const EARLY_EXIT_BYTES: usize = 4096;
pub const EARLY_EXIT_CONFIDENCE: f64 = 0.98;
pub const AMBIGUITY_DELTA: f64 = 0.03;
pub const FEEDBACK_HISTORY_LIMIT: usize = 300;

// Calibration constants. Treated as named literals, not tunables.
pub(crate) const BINARY_CONTROL_RATIO: f64 = 0.05;
pub(crate) const SINGLE_BYTE_AMBIGUITY_WINDOW: f64 = 0.02;
pub(crate) const SINGLE_BYTE_AMBIGUITY_CAP: f64 = 0.72;

// Byte-order marks, longest signatures first: the 32-bit marks share a
// prefix with the 16-bit ones and must win.
pub static ENCODING_MARKS: Lazy<Vec<(&'static str, &'static [u8])>> = Lazy::new(|| {
    vec![
        ("utf-32-be", b"\x00\x00\xFE\xFF".as_slice()),
        ("utf-32-le", b"\xFF\xFE\x00\x00".as_slice()),
        ("utf-8-sig", b"\xEF\xBB\xBF".as_slice()),
        ("utf-16-be", b"\xFE\xFF".as_slice()),
        ("utf-16-le", b"\xFF\xFE".as_slice()),
    ]
});

// Tie-break priority between close-confidence candidates. Lowest rank wins.
pub static FALLBACK_ORDER: [&str; 13] = [
    "utf-8",
    "utf-8-sig",
    "utf-16-le",
    "utf-16-be",
    "utf-32-le",
    "utf-32-be",
    "iso-2022-jp",
    "shift_jis",
    "euc_jp",
    "big5",
    "windows-1250",
    "iso-8859-2",
    "latin-1",
];

pub static FALLBACK_RANK: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    HashMap::from_iter(FALLBACK_ORDER.iter().enumerate().map(|(rank, name)| (*name, rank)))
});

pub(crate) const POLISH_DIACRITICS: &str = "ąćęłńóśźżĄĆĘŁŃÓŚŹŻ";
pub(crate) const SUSPICIOUS_SYMBOLS: &str = "¤¦¨´¸";
pub(crate) const POLISH_BIGRAMS: [&str; 8] = ["sz", "cz", "rz", "dz", "ch", "ie", "ow", "ni"];
pub(crate) const POLISH_TRIGRAMS: [&str; 7] = ["prz", "str", "nie", "dzi", "rze", "szc", "czn"];

// Polish diacritic byte layouts for the two competing code pages.
pub(crate) static CP1250_BYTE_WEIGHTS: [(u8, f64); 16] = [
    (0xA5, 2.00),
    (0xB9, 2.00),
    (0x8C, 1.70),
    (0x9C, 1.70),
    (0x8F, 1.70),
    (0x9F, 1.70),
    (0xC6, 0.80),
    (0xE6, 0.80),
    (0xCA, 0.80),
    (0xEA, 0.80),
    (0xA3, 0.70),
    (0xB3, 0.70),
    (0xD1, 0.70),
    (0xF1, 0.70),
    (0xD3, 0.70),
    (0xF3, 0.70),
];

pub(crate) static ISO_8859_2_BYTE_WEIGHTS: [(u8, f64); 16] = [
    (0xA1, 2.00),
    (0xB1, 2.00),
    (0xA6, 1.70),
    (0xB6, 1.70),
    (0xAC, 1.70),
    (0xBC, 1.70),
    (0xC6, 0.80),
    (0xE6, 0.80),
    (0xCA, 0.80),
    (0xEA, 0.80),
    (0xA3, 0.70),
    (0xB3, 0.70),
    (0xD1, 0.70),
    (0xF1, 0.70),
    (0xD3, 0.70),
    (0xF3, 0.70),
];

// Reference byte distributions: (byte, expected_ratio, weight).
pub(crate) static CP1250_DISTRIBUTION: [(u8, f64, f64); 14] = [
    (0xA5, 0.0030, 1.2),
    (0xB9, 0.0032, 1.2),
    (0x8C, 0.0012, 1.0),
    (0x9C, 0.0015, 1.0),
    (0x8F, 0.0010, 1.0),
    (0x9F, 0.0012, 1.0),
    (0xC6, 0.0025, 0.8),
    (0xE6, 0.0028, 0.8),
    (0xCA, 0.0020, 0.8),
    (0xEA, 0.0021, 0.8),
    (0xD1, 0.0018, 0.7),
    (0xF1, 0.0020, 0.7),
    (0xD3, 0.0040, 0.7),
    (0xF3, 0.0042, 0.7),
];

pub(crate) static ISO_8859_2_DISTRIBUTION: [(u8, f64, f64); 14] = [
    (0xA1, 0.0030, 1.2),
    (0xB1, 0.0032, 1.2),
    (0xA6, 0.0012, 1.0),
    (0xB6, 0.0015, 1.0),
    (0xAC, 0.0010, 1.0),
    (0xBC, 0.0012, 1.0),
    (0xC6, 0.0025, 0.8),
    (0xE6, 0.0028, 0.8),
    (0xCA, 0.0020, 0.8),
    (0xEA, 0.0021, 0.8),
    (0xD1, 0.0018, 0.7),
    (0xF1, 0.0020, 0.7),
    (0xD3, 0.0040, 0.7),
    (0xF3, 0.0042, 0.7),
];
