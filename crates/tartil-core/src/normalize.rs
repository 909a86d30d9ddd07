//! Arabic text normalization.
//!
//! Canonicalizes a verse or a transcript so that surface variation (tashkeel,
//! letter-shape variants, compatibility forms) does not register as a
//! recitation error.

use unicode_normalization::UnicodeNormalization;

/// The closed set of combining marks stripped before comparison.
pub const DIACRITICS: [char; 12] = [
    '\u{064B}', // Fathatan
    '\u{064C}', // Dammatan
    '\u{064D}', // Kasratan
    '\u{064E}', // Fatha
    '\u{064F}', // Damma
    '\u{0650}', // Kasra
    '\u{0651}', // Shadda
    '\u{0652}', // Sukun
    '\u{0653}', // Maddah
    '\u{0654}', // Hamza above
    '\u{0655}', // Hamza below
    '\u{0670}', // Superscript alef
];

const BARE_ALEF: char = '\u{0627}';
const HA: char = '\u{0647}';
const YA: char = '\u{064A}';

/// Returns `true` if `ch` is one of the twelve stripped [`DIACRITICS`].
pub fn is_diacritic(ch: char) -> bool {
    matches!(ch, '\u{064B}'..='\u{0655}' | '\u{0670}')
}

/// Word separator: Unicode whitespace or an ASCII information separator
/// (U+001C..=U+001F).
pub fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\u{1C}'..='\u{1F}')
}

fn strip_diacritics(text: &str) -> String {
    text.chars().filter(|&c| !is_diacritic(c)).collect()
}

fn fold_letter(ch: char) -> char {
    match ch {
        // Alef with madda, hamza above, hamza below, wasla
        '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' => BARE_ALEF,
        '\u{0629}' => HA, // Ta marbuta
        '\u{0649}' => YA, // Alef maksura
        other => other,
    }
}

/// Normalize Arabic text for comparison.
///
/// Steps, in order:
/// 1. remove the twelve [`DIACRITICS`]
/// 2. NFKC
/// 3. fold alef variants to bare alef, ta marbuta to ha, alef maksura to ya
/// 4. trim surrounding separators (internal runs are kept as-is)
///
/// The result is a fixed point: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let mut composed: String = strip_diacritics(text).nfkc().collect();

    // Presentation-form ligatures (e.g. U+FC5E) decompose into tashkeel under NFKC.
    if composed.chars().any(is_diacritic) {
        composed = strip_diacritics(&composed).nfkc().collect();
    }

    let folded: String = composed.chars().map(fold_letter).collect();
    folded.trim_matches(is_separator).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_listed_diacritic() {
        for d in DIACRITICS {
            let input = format!("\u{0628}{d}\u{0633}");
            assert_eq!(normalize(&input), "\u{0628}\u{0633}", "mark U+{:04X}", d as u32);
        }
    }

    #[test]
    fn is_diacritic_matches_the_closed_set() {
        for d in DIACRITICS {
            assert!(is_diacritic(d));
        }
        // Wavy hamza below and tatweel are outside the set.
        assert!(!is_diacritic('\u{065F}'));
        assert!(!is_diacritic('\u{0640}'));
        assert!(!is_diacritic('\u{0627}'));
    }

    #[test]
    fn leaves_other_combining_marks_alone() {
        // Latin acute accent composes under NFKC but is not stripped.
        assert_eq!(normalize("e\u{0301}"), "\u{00E9}");
    }

    #[test]
    fn folds_alef_variants() {
        assert_eq!(normalize("\u{0622}\u{0623}\u{0625}\u{0671}"), "اااا");
    }

    #[test]
    fn folds_ta_marbuta_and_alef_maksura() {
        assert_eq!(normalize("رحمة"), "رحمه");
        assert_eq!(normalize("موسى"), "موسي");
    }

    #[test]
    fn basmala_reduces_to_plain_letters() {
        assert_eq!(normalize("بِسْمِ اللَّهِ"), "بسم الله");
        assert_eq!(
            normalize("بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ"),
            "بسم الله الرحمن الرحيم"
        );
    }

    #[test]
    fn hamza_above_alef_loses_hamza_before_composition() {
        // Decomposed alef + hamza above would compose to U+0623 under NFKC,
        // but the hamza is stripped first.
        assert_eq!(normalize("\u{0627}\u{0654}"), "ا");
    }

    #[test]
    fn trims_but_keeps_internal_whitespace() {
        assert_eq!(normalize("  بسم   الله \n"), "بسم   الله");
    }

    #[test]
    fn trims_information_separators() {
        assert_eq!(normalize("\u{1C}\u{1F} الله\u{1E}"), "الله");
    }

    #[test]
    fn nfkc_applies_to_presentation_forms() {
        // Arabic letter beh isolated form.
        assert_eq!(normalize("\u{FE8F}"), "\u{0628}");
        // Fullwidth digits.
        assert_eq!(normalize("\u{FF11}\u{FF12}"), "12");
    }

    #[test]
    fn ligature_with_tashkeel_is_fully_stripped() {
        // Ligature shadda with dammatan isolated form decomposes to space + marks.
        let once = normalize("\u{FC5E}");
        assert!(!once.chars().any(is_diacritic));
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn empty_and_whitespace_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("\u{064E}\u{0651}"), "");
    }

    #[test]
    fn idempotent_on_varied_inputs() {
        let samples = [
            "",
            "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ",
            "إِيَّاكَ نَعْبُدُ وَإِيَّاكَ نَسْتَعِينُ",
            "آمَنَ الرَّسُولُ بِمَا أُنزِلَ إِلَيْهِ",
            "\u{FC5E}\u{FDF2} \u{FEFB}",
            "  mixed الصَّلَاةِ text 123 ",
            "e\u{0654}\u{0301}",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
