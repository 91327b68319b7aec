use crate::consts::{POLISH_BIGRAMS, POLISH_TRIGRAMS};
use counter::Counter;

//
// Frequency primitives
//

// Count every byte value in the raw stream. 256 fixed slots.
pub fn byte_histogram(data: &[u8]) -> [usize; 256] {
    let mut table = [0usize; 256];
    for &byte in data {
        table[byte as usize] += 1;
    }
    table
}

// Relative frequency of a specific byte value. Defined as 0 for empty input.
pub fn byte_ratio(data: &[u8], byte_value: usize) -> Result<f64, String> {
    if byte_value > 255 {
        return Err(String::from("byte_value must be in range 0..=255"));
    }
    if data.is_empty() {
        return Ok(0.0);
    }
    let table = byte_histogram(data);
    Ok(table[byte_value] as f64 / data.len() as f64)
}

// Frequency table for character n-grams. Empty when the text is shorter
// than n.
pub fn ngram_table(text: &str, n: usize) -> Result<Counter<String>, String> {
    if n == 0 {
        return Err(String::from("n must be greater than zero"));
    }
    let characters: Vec<char> = text.chars().collect();
    if characters.len() < n {
        return Ok(Counter::new());
    }
    Ok(characters
        .windows(n)
        .map(|window| window.iter().collect::<String>())
        .collect())
}

// Relative frequency of one specific n-gram token.
pub fn ngram_ratio(text: &str, token: &str) -> f64 {
    let n = token.chars().count();
    let length = text.chars().count();
    if n == 0 || length < n {
        return 0.0;
    }
    let table = ngram_table(text, n).unwrap_or_else(|_| Counter::new());
    let count = table.get(token).copied().unwrap_or(0);
    count as f64 / (length - n + 1).max(1) as f64
}

// Score Polish-like language patterns from case-folded bigrams and trigrams.
pub fn polish_ngram_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let length = lowered.chars().count();
    if length < 2 {
        return 0.0;
    }

    let bigram_table = ngram_table(&lowered, 2).unwrap_or_else(|_| Counter::new());
    let trigram_table = ngram_table(&lowered, 3).unwrap_or_else(|_| Counter::new());
    let total_bigrams = (length - 1).max(1);
    let total_trigrams = length.saturating_sub(2).max(1);

    let bigram_hits: usize = POLISH_BIGRAMS
        .iter()
        .map(|bigram| bigram_table.get(*bigram).copied().unwrap_or(0))
        .sum();
    let trigram_hits: usize = POLISH_TRIGRAMS
        .iter()
        .map(|trigram| trigram_table.get(*trigram).copied().unwrap_or(0))
        .sum();

    let bigram_ratio = bigram_hits as f64 / total_bigrams as f64;
    let trigram_ratio = trigram_hits as f64 / total_trigrams as f64;

    // Trigrams are a stronger language signal than bigrams.
    bigram_ratio * 0.9 + trigram_ratio * 1.6
}
