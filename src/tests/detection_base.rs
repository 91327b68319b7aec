use crate::{detect, DetectionResult};
use encoding_rs::{BIG5, EUC_JP, ISO_8859_2, SHIFT_JIS, WINDOWS_1250};

const POLISH_SAMPLE: &str =
    "Zażółć gęślą jaźń. Przykładowy tekst, który zawiera polskie znaki diakrytyczne.\n";

fn encode(text: &str, encoding: &'static encoding_rs::Encoding) -> Vec<u8> {
    let (bytes, _, had_errors) = encoding.encode(text);
    assert!(!had_errors, "Sample not encodable as {}", encoding.name());
    bytes.into_owned()
}

#[test]
fn test_empty() {
    assert_eq!(
        detect(b""),
        DetectionResult {
            encoding: "utf-8",
            confidence: 1.0,
            used_fallback: false,
            detected_by_bom: false,
        },
        "Empty bytes payload SHOULD be guessed as UTF-8 (arbitrary)"
    );
}

#[test]
fn test_utf8_sig() {
    let result = detect(b"\xEF\xBB\xBFhello");
    assert_eq!(result.encoding, "utf-8-sig");
    assert!(result.confidence >= 0.99);
    assert!(result.detected_by_bom);
    assert!(!result.used_fallback);
}

#[test]
fn test_utf16_bom_with_valid_payload() {
    let mut le = b"\xFF\xFE".to_vec();
    le.extend("Hello".encode_utf16().flat_map(|unit| unit.to_le_bytes()));
    let result = detect(&le);
    assert_eq!(result.encoding, "utf-16-le");
    assert!(result.confidence >= 0.9);
    assert!(result.detected_by_bom);
    assert!(!result.used_fallback);

    let mut be = b"\xFE\xFF".to_vec();
    be.extend("Hello".encode_utf16().flat_map(|unit| unit.to_be_bytes()));
    let result = detect(&be);
    assert_eq!(result.encoding, "utf-16-be");
    assert!(result.confidence >= 0.9);
    assert!(result.detected_by_bom);
}

#[test]
fn test_bare_utf16_boms() {
    let result = detect(b"\xFF\xFE");
    assert_eq!(result.encoding, "utf-16-le");
    assert!(result.confidence >= 0.9);
    assert!(result.detected_by_bom);

    let result = detect(b"\xFE\xFF");
    assert_eq!(result.encoding, "utf-16-be");
    assert!(result.confidence >= 0.9);
}

#[test]
fn test_utf16_bom_with_broken_payload_is_suspicious() {
    // Odd payload length cannot be UTF-16.
    let result = detect(b"\xFF\xFEa");
    assert_eq!(result.encoding, "utf-16-le");
    assert!(result.used_fallback);
    assert!(result.confidence <= 0.49);
    assert!(result.detected_by_bom);

    // Unpaired high surrogate.
    let result = detect(&[0xFF, 0xFE, 0x3D, 0xD8, 0x41, 0x00]);
    assert!(result.used_fallback);
    assert!(result.confidence <= 0.49);
}

#[test]
fn test_utf32_boms() {
    let tests: [(&[u8], &str); 2] = [
        (b"\x00\x00\xFE\xFF payload", "utf-32-be"),
        (b"\xFF\xFE\x00\x00 payload", "utf-32-le"),
    ];
    for (input, expected) in tests {
        let result = detect(input);
        assert_eq!(
            result.encoding, expected,
            "32-bit marks must win over their 16-bit prefixes: {:?}",
            input
        );
        assert_eq!(result.confidence, 1.0);
        assert!(result.detected_by_bom);
        assert!(!result.used_fallback);
    }
}

#[test]
fn test_iso_2022_jp() {
    let result = detect(b"\x1B$BThis is the encoded segment\x1B(B");
    assert_eq!(result.encoding, "iso-2022-jp");
    assert!(
        (0.80..=0.99).contains(&result.confidence),
        "Confidence out of band: {}",
        result.confidence
    );
    assert!(!result.used_fallback);
    assert!(!result.detected_by_bom);
}

#[test]
fn test_obviously_ascii_content() {
    let tests = [
        b"AbAdZ pOoooOlDl mmlDoDkA lldDkeEkddA mpAlkDF".as_slice(),
        b"{\"token\": \"g4UsPJdfzNkGW2jwmKDGDilKGKYtpF2X\"}".as_slice(),
        b"81f4ab054b39cb0e12701e734077d84264308f5fc79494fc5f159fa2ebc07b73".as_slice(),
        b"{}".as_slice(),
    ];
    for input in tests {
        let result = detect(input);
        assert_eq!(
            result.encoding, "utf-8",
            "Dead-simple ASCII detection is wrongly detected! Input: {:?}",
            input
        );
        assert!(result.confidence >= 0.70);
        assert!(!result.used_fallback);
    }
}

#[test]
fn test_obviously_utf8_content() {
    let tests = [
        "\u{020d}",
        "héllo world!\n",
        "我没有埋怨，磋砣的只是一些时间。",
        "Bсеки човек има право на образование.",
        "(° ͜ʖ °), creepy face, smiley 😀",
        "[\"Financiën\", \"La France\"]",
        "Qu'est ce que une étoile?",
        "😀",
    ];
    for input in tests {
        let result = detect(input.as_bytes());
        assert_eq!(
            result.encoding, "utf-8",
            "Dead-simple UTF-8 detection is wrongly detected! Input: {:?}",
            input
        );
        assert!(result.confidence >= 0.70);
        assert!(!result.used_fallback);
        assert!(!result.detected_by_bom);
    }
}

#[test]
fn test_polish_utf8() {
    let payload = POLISH_SAMPLE.repeat(20).into_bytes();
    let result = detect(&payload);
    assert_eq!(result.encoding, "utf-8");
    assert!(result.confidence >= 0.70);
    assert!(!result.used_fallback);
}

#[test]
fn test_multi_byte_round_trips() {
    let japanese = "日本語のテキストです。漢字とかなを含む。";
    let chinese = "繁體中文測試文字內容。";
    let tests = [
        (encode(japanese, SHIFT_JIS), "shift_jis"),
        (encode(japanese, EUC_JP), "euc_jp"),
        (encode(chinese, BIG5), "big5"),
    ];
    for (input, expected) in &tests {
        let result = detect(input);
        assert_eq!(
            result.encoding, *expected,
            "Multi-byte detection failed for {}",
            expected
        );
        assert!(
            result.confidence >= 0.55,
            "Confidence too low for {}: {}",
            expected,
            result.confidence
        );
        assert!(!result.used_fallback);
    }
}

#[test]
fn test_single_byte_round_trips() {
    let text = POLISH_SAMPLE.repeat(20);
    let tests = [
        (encode(&text, WINDOWS_1250), "windows-1250"),
        (encode(&text, ISO_8859_2), "iso-8859-2"),
    ];
    for (input, expected) in &tests {
        let result = detect(input);
        assert_eq!(
            result.encoding, *expected,
            "Single-byte detection failed for {}",
            expected
        );
        assert!(result.confidence >= 0.55);
        assert!(!result.used_fallback);
        assert!(!result.detected_by_bom);
    }
}

#[test]
fn test_detection_is_pure() {
    let buffers: [&[u8]; 5] = [
        b"",
        b"plain ascii",
        b"\xEF\xBB\xBFhello",
        "Zażółć gęślą jaźń".as_bytes(),
        &[0xFF, 0xFE, 0x41],
    ];
    for input in buffers {
        assert_eq!(
            detect(input),
            detect(input),
            "Two detections over the same bytes must agree: {:?}",
            input
        );
    }
}

#[test]
fn test_result_invariants() {
    let polish_cp1250 = encode(POLISH_SAMPLE, WINDOWS_1250);
    let buffers: [&[u8]; 8] = [
        b"",
        b"plain ascii",
        b"\xEF\xBB\xBFhello",
        b"\xFF\xFEa",
        b"\x1B$Bsegment\x1B(B",
        "Zażółć gęślą jaźń".as_bytes(),
        &[0x00, 0x01, 0x02, 0x03],
        &polish_cp1250,
    ];
    for input in buffers {
        let result = detect(input);
        assert!(
            (0.0..=1.0).contains(&result.confidence),
            "Confidence out of range for {:?}: {}",
            input,
            result.confidence
        );
        if result.used_fallback {
            assert!(
                result.confidence <= 0.49,
                "Fallback results must stay below the suspicion threshold: {:?} -> {}",
                input,
                result.confidence
            );
        }
    }
}
