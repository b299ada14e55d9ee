//! Contextual Arabic shaping: logical code points to presentation forms.
//!
//! Joining runs in logical order decide whether each letter takes its
//! isolated, initial, medial or final form from the U+FE70..U+FEFF block,
//! with the mandatory Lam-Alef ligatures folded in. Shaping must happen
//! before bidirectional reordering, because joining depends on logical
//! adjacency.

use unicode_normalization::UnicodeNormalization;

use crate::unicode::class::{BidiClass, classify};

const LAM: char = '\u{0644}';

/// How a character participates in cursive joining.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum JoiningKind {
    /// Joins only to the following letter in visual RTL order (alef, dal,
    /// ra, waw and friends): takes isolated or final forms.
    Right,
    /// Joins on both sides: takes all four forms.
    Dual,
    /// Joins neighbors without taking forms itself (tatweel, ZWJ).
    Causing,
    /// Invisible to joining (harakat and other combining marks).
    Transparent,
    /// Breaks joining (everything else).
    NonJoining,
}

/// Contextual form selected for a letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Form {
    Isolated,
    Initial,
    Medial,
    Final,
}

fn joining_kind(c: char) -> JoiningKind {
    if classify(c) == BidiClass::NSM {
        return JoiningKind::Transparent;
    }
    match c {
        '\u{0622}'..='\u{0625}' | '\u{0627}' => JoiningKind::Right,
        '\u{062F}'..='\u{0632}' | '\u{0648}' => JoiningKind::Right,
        '\u{0629}' => JoiningKind::Right,
        '\u{0626}' | '\u{0628}' => JoiningKind::Dual,
        '\u{062A}'..='\u{062E}' => JoiningKind::Dual,
        '\u{0633}'..='\u{063A}' => JoiningKind::Dual,
        '\u{0641}'..='\u{0647}' => JoiningKind::Dual,
        '\u{0649}' | '\u{064A}' => JoiningKind::Dual,
        '\u{0640}' | '\u{200D}' => JoiningKind::Causing,
        _ => JoiningKind::NonJoining,
    }
}

/// Presentation forms as (isolated, final, initial, medial).
fn presentation_forms(c: char) -> Option<(char, char, char, char)> {
    let forms = match c {
        '\u{0621}' => ('\u{FE80}', '\u{FE80}', '\u{FE80}', '\u{FE80}'),
        '\u{0622}' => ('\u{FE81}', '\u{FE82}', '\u{FE81}', '\u{FE82}'),
        '\u{0623}' => ('\u{FE83}', '\u{FE84}', '\u{FE83}', '\u{FE84}'),
        '\u{0624}' => ('\u{FE85}', '\u{FE86}', '\u{FE85}', '\u{FE86}'),
        '\u{0625}' => ('\u{FE87}', '\u{FE88}', '\u{FE87}', '\u{FE88}'),
        '\u{0626}' => ('\u{FE89}', '\u{FE8A}', '\u{FE8B}', '\u{FE8C}'),
        '\u{0627}' => ('\u{FE8D}', '\u{FE8E}', '\u{FE8D}', '\u{FE8E}'),
        '\u{0628}' => ('\u{FE8F}', '\u{FE90}', '\u{FE91}', '\u{FE92}'),
        '\u{0629}' => ('\u{FE93}', '\u{FE94}', '\u{FE93}', '\u{FE94}'),
        '\u{062A}' => ('\u{FE95}', '\u{FE96}', '\u{FE97}', '\u{FE98}'),
        '\u{062B}' => ('\u{FE99}', '\u{FE9A}', '\u{FE9B}', '\u{FE9C}'),
        '\u{062C}' => ('\u{FE9D}', '\u{FE9E}', '\u{FE9F}', '\u{FEA0}'),
        '\u{062D}' => ('\u{FEA1}', '\u{FEA2}', '\u{FEA3}', '\u{FEA4}'),
        '\u{062E}' => ('\u{FEA5}', '\u{FEA6}', '\u{FEA7}', '\u{FEA8}'),
        '\u{062F}' => ('\u{FEA9}', '\u{FEAA}', '\u{FEA9}', '\u{FEAA}'),
        '\u{0630}' => ('\u{FEAB}', '\u{FEAC}', '\u{FEAB}', '\u{FEAC}'),
        '\u{0631}' => ('\u{FEAD}', '\u{FEAE}', '\u{FEAD}', '\u{FEAE}'),
        '\u{0632}' => ('\u{FEAF}', '\u{FEB0}', '\u{FEAF}', '\u{FEB0}'),
        '\u{0633}' => ('\u{FEB1}', '\u{FEB2}', '\u{FEB3}', '\u{FEB4}'),
        '\u{0634}' => ('\u{FEB5}', '\u{FEB6}', '\u{FEB7}', '\u{FEB8}'),
        '\u{0635}' => ('\u{FEB9}', '\u{FEBA}', '\u{FEBB}', '\u{FEBC}'),
        '\u{0636}' => ('\u{FEBD}', '\u{FEBE}', '\u{FEBF}', '\u{FEC0}'),
        '\u{0637}' => ('\u{FEC1}', '\u{FEC2}', '\u{FEC3}', '\u{FEC4}'),
        '\u{0638}' => ('\u{FEC5}', '\u{FEC6}', '\u{FEC7}', '\u{FEC8}'),
        '\u{0639}' => ('\u{FEC9}', '\u{FECA}', '\u{FECB}', '\u{FECC}'),
        '\u{063A}' => ('\u{FECD}', '\u{FECE}', '\u{FECF}', '\u{FED0}'),
        '\u{0641}' => ('\u{FED1}', '\u{FED2}', '\u{FED3}', '\u{FED4}'),
        '\u{0642}' => ('\u{FED5}', '\u{FED6}', '\u{FED7}', '\u{FED8}'),
        '\u{0643}' => ('\u{FED9}', '\u{FEDA}', '\u{FEDB}', '\u{FEDC}'),
        '\u{0644}' => ('\u{FEDD}', '\u{FEDE}', '\u{FEDF}', '\u{FEE0}'),
        '\u{0645}' => ('\u{FEE1}', '\u{FEE2}', '\u{FEE3}', '\u{FEE4}'),
        '\u{0646}' => ('\u{FEE5}', '\u{FEE6}', '\u{FEE7}', '\u{FEE8}'),
        '\u{0647}' => ('\u{FEE9}', '\u{FEEA}', '\u{FEEB}', '\u{FEEC}'),
        '\u{0648}' => ('\u{FEED}', '\u{FEEE}', '\u{FEED}', '\u{FEEE}'),
        '\u{0649}' => ('\u{FEEF}', '\u{FEF0}', '\u{FEEF}', '\u{FEF0}'),
        '\u{064A}' => ('\u{FEF1}', '\u{FEF2}', '\u{FEF3}', '\u{FEF4}'),
        _ => return None,
    };
    Some(forms)
}

/// Lam-Alef ligature as (isolated, final) for the given alef variant.
fn lam_alef_ligature(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

/// Whether the nearest non-transparent character before `i` joins forward.
fn preceding_joins(chars: &[char], i: usize) -> bool {
    for &c in chars[..i].iter().rev() {
        let kind = joining_kind(c);
        if kind != JoiningKind::Transparent {
            return matches!(kind, JoiningKind::Dual | JoiningKind::Causing);
        }
    }
    false
}

/// Whether the nearest non-transparent character after `i` joins backward.
fn following_joins(chars: &[char], i: usize) -> bool {
    for &c in &chars[i + 1..] {
        let kind = joining_kind(c);
        if kind != JoiningKind::Transparent {
            return matches!(
                kind,
                JoiningKind::Dual | JoiningKind::Right | JoiningKind::Causing
            );
        }
    }
    false
}

/// Index of the nearest non-transparent character after `i`, if any.
fn next_opaque(chars: &[char], i: usize) -> Option<usize> {
    (i + 1..chars.len()).find(|&j| joining_kind(chars[j]) != JoiningKind::Transparent)
}

/// Convert Arabic letters in `text` to their contextual presentation forms.
///
/// Non-Arabic characters pass through unchanged; combining marks keep their
/// positions relative to the base letters. Already-shaped text is a fixed
/// point: presentation forms do not participate in joining, so
/// `shape(shape(s)) == shape(s)`.
#[must_use]
pub fn shape(text: &str) -> String {
    let chars: Vec<char> = text.nfc().collect();
    let mut out = String::with_capacity(text.len());

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let kind = joining_kind(c);
        if kind == JoiningKind::Transparent {
            out.push(c);
            i += 1;
            continue;
        }

        // Mandatory ligature: lam followed by an alef variant.
        if c == LAM {
            if let Some(j) = next_opaque(&chars, i) {
                if let Some((isolated, final_form)) = lam_alef_ligature(chars[j]) {
                    out.push(if preceding_joins(&chars, i) {
                        final_form
                    } else {
                        isolated
                    });
                    // Marks that sat between the pair follow the ligature.
                    for &mark in &chars[i + 1..j] {
                        out.push(mark);
                    }
                    i = j + 1;
                    continue;
                }
            }
        }

        let prev_joins = preceding_joins(&chars, i);
        let next_joins = following_joins(&chars, i);
        let form = match (kind, prev_joins, next_joins) {
            (JoiningKind::Dual, true, true) => Form::Medial,
            (JoiningKind::Dual, true, false) => Form::Final,
            (JoiningKind::Dual, false, true) => Form::Initial,
            (JoiningKind::Right, true, _) => Form::Final,
            _ => Form::Isolated,
        };

        match presentation_forms(c) {
            Some((isolated, final_form, initial, medial)) => out.push(match form {
                Form::Isolated => isolated,
                Form::Final => final_form,
                Form::Initial => initial,
                Form::Medial => medial,
            }),
            None => out.push(c),
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_ascii_pass_through() {
        assert_eq!(shape(""), "");
        assert_eq!(shape("hello world"), "hello world");
    }

    #[test]
    fn lone_letter_takes_isolated_form() {
        assert_eq!(shape("\u{0628}"), "\u{FE8F}");
    }

    #[test]
    fn pair_takes_initial_and_final() {
        assert_eq!(shape("\u{0628}\u{0628}"), "\u{FE91}\u{FE90}");
    }

    #[test]
    fn triple_takes_medial_in_the_middle() {
        assert_eq!(shape("\u{0628}\u{0628}\u{0628}"), "\u{FE91}\u{FE92}\u{FE90}");
    }

    #[test]
    fn right_joiner_ends_the_run() {
        // Ba then alef: alef joins leftward only, so a following ba restarts.
        assert_eq!(
            shape("\u{0628}\u{0627}\u{0628}"),
            "\u{FE91}\u{FE8E}\u{FE8F}"
        );
    }

    #[test]
    fn lam_alef_isolated_ligature() {
        assert_eq!(shape("\u{0644}\u{0627}"), "\u{FEFB}");
    }

    #[test]
    fn lam_alef_final_ligature_after_joiner() {
        assert_eq!(shape("\u{0628}\u{0644}\u{0627}"), "\u{FE91}\u{FEFC}");
    }

    #[test]
    fn lam_alef_variants() {
        assert_eq!(shape("\u{0644}\u{0622}"), "\u{FEF5}");
        assert_eq!(shape("\u{0644}\u{0623}"), "\u{FEF7}");
        assert_eq!(shape("\u{0644}\u{0625}"), "\u{FEF9}");
    }

    #[test]
    fn marks_are_transparent_to_joining() {
        // Ba, fatha, ba: the mark neither breaks the join nor moves.
        assert_eq!(
            shape("\u{0628}\u{064E}\u{0628}"),
            "\u{FE91}\u{064E}\u{FE90}"
        );
    }

    #[test]
    fn mark_between_lam_and_alef_follows_the_ligature() {
        assert_eq!(
            shape("\u{0644}\u{064E}\u{0627}"),
            "\u{FEFB}\u{064E}"
        );
    }

    #[test]
    fn tatweel_joins_both_sides() {
        assert_eq!(
            shape("\u{0628}\u{0640}\u{0628}"),
            "\u{FE91}\u{0640}\u{FE90}"
        );
    }

    #[test]
    fn digits_break_joining() {
        assert_eq!(shape("\u{0628}1\u{0628}"), "\u{FE8F}1\u{FE8F}");
    }

    #[test]
    fn shaping_is_idempotent() {
        for text in [
            "",
            "hello",
            "\u{0628}\u{0633}\u{0645}",
            "\u{0644}\u{0627} \u{0628}\u{0628}\u{0628}",
            "mixed \u{0633}\u{0644}\u{0627}\u{0645} text",
        ] {
            let once = shape(text);
            assert_eq!(shape(&once), once);
        }
    }

    #[test]
    fn non_arabic_rtl_passes_through() {
        assert_eq!(shape("\u{05E9}\u{05DC}\u{05D5}\u{05DD}"), "\u{05E9}\u{05DC}\u{05D5}\u{05DD}");
    }
}
