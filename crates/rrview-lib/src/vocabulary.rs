//! MIT-BIH annotation vocabulary.
//!
//! Maps the numeric codes stored in WFDB annotation files to their one- or
//! two-character symbols, and symbols to legend labels. The label table is
//! an external product input and is kept verbatim: `(` carries the "R-peak
//! onset" placeholder and `x`/`p` share the "Non-conducted P-wave" label.

/// Highest numeric annotation code that denotes an annotation (59..=63 are
/// stream control words).
pub const MAX_ANNOTATION_CODE: u8 = 49;

const SYMBOLS: [&str; MAX_ANNOTATION_CODE as usize + 1] = [
    " ", "N", "L", "R", "a", "V", "F", "J", "A", "S", // 0-9
    "E", "j", "/", "Q", "~", "", "|", "", "s", "T", // 10-19
    "*", "D", "\"", "=", "p", "B", "^", "t", "+", "u", // 20-29
    "?", "!", "[", "]", "e", "n", "@", "x", "f", "(", // 30-39
    ")", "r", "", "", "", "", "", "", "", "", // 40-49
];

const LABELS: &[(&str, &str)] = &[
    ("N", "Normal beat"),
    ("L", "Left bundle branch block beat"),
    ("R", "Right bundle branch block beat"),
    ("a", "Aberrated atrial premature beat"),
    ("V", "Premature ventricular contraction"),
    ("F", "Fusion of ventricular and normal beat"),
    ("J", "Nodal (junctional) premature beat"),
    ("A", "Atrial premature beat"),
    ("S", "Supraventricular premature beat"),
    ("E", "Ventricular escape beat"),
    ("j", "Nodal (junctional) escape beat"),
    ("/", "Paced beat"),
    ("Q", "Unclassifiable beat"),
    ("~", "Change in signal quality"),
    ("|", "Isolated QRS-like artifact"),
    ("+", "Rhythm change"),
    ("\"", "Comment annotation"),
    ("!", "Ventricular flutter wave"),
    ("[", "Start of ventricular flutter/fibrillation"),
    ("]", "End of ventricular flutter/fibrillation"),
    ("e", "Atrial escape beat"),
    ("f", "Fusion of paced and normal beat"),
    ("x", "Non-conducted P-wave"),
    ("p", "Non-conducted P-wave"),
    ("(", "R-peak onset"),
    (")", "Waveform end"),
    ("r", "R-on-T premature ventricular contraction"),
];

/// Symbol for a numeric WFDB annotation code, if the code is assigned.
pub fn symbol_for_code(code: u8) -> Option<&'static str> {
    SYMBOLS
        .get(code as usize)
        .copied()
        .filter(|symbol| !symbol.is_empty())
}

/// Legend label for an annotation symbol. Unknown symbols have none.
pub fn label_for(symbol: &str) -> Option<&'static str> {
    LABELS
        .iter()
        .find(|(candidate, _)| *candidate == symbol)
        .map(|(_, label)| *label)
}

/// Beat-class symbols: everything that marks a QRS complex rather than a
/// rhythm, quality or waveform annotation.
pub fn is_beat_symbol(symbol: &str) -> bool {
    matches!(
        symbol,
        "N" | "L" | "R" | "a" | "V" | "F" | "J" | "A" | "S" | "E" | "j" | "/" | "Q" | "e" | "f"
            | "r" | "n" | "B"
    )
}
