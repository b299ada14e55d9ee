//! Bidi character classification and mirroring properties.
//!
//! Character data comes from the `unicode-bidi` crate's Bidi_Class tables;
//! this module layers the directional-mark override and the paired-bracket
//! and mirroring tables used by the resolution engine on top of it.

use unicode_bidi::BidiClass as UcdClass;

/// Directional type of a Unicode scalar per UAX #9, table 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BidiClass {
    // Strong types
    /// Left-to-Right
    L,
    /// Right-to-Left
    R,
    /// Arabic Letter
    AL,

    // Weak types
    /// European Number
    EN,
    /// European Number Separator
    ES,
    /// European Number Terminator
    ET,
    /// Arabic Number
    AN,
    /// Common Number Separator
    CS,
    /// Nonspacing Mark
    NSM,
    /// Boundary Neutral
    BN,

    // Neutral types
    /// Paragraph Separator
    B,
    /// Segment Separator
    S,
    /// Whitespace
    WS,
    /// Other Neutral
    ON,

    // Explicit formatting
    /// Left-to-Right Embedding
    LRE,
    /// Right-to-Left Embedding
    RLE,
    /// Left-to-Right Override
    LRO,
    /// Right-to-Left Override
    RLO,
    /// Pop Directional Format
    PDF,
    /// Left-to-Right Isolate
    LRI,
    /// Right-to-Left Isolate
    RLI,
    /// First Strong Isolate
    FSI,
    /// Pop Directional Isolate
    PDI,

    // Implicit directional marks
    /// Left-to-Right Mark (U+200E)
    LRM,
    /// Right-to-Left Mark (U+200F)
    RLM,
}

/// Which side of a bracket pair a character sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

/// Raw class lookup, before the directional-mark override.
fn raw_class(c: char) -> BidiClass {
    match c {
        '\u{200E}' => BidiClass::LRM,
        '\u{200F}' => BidiClass::RLM,
        _ => match unicode_bidi::bidi_class(c) {
            UcdClass::L => BidiClass::L,
            UcdClass::R => BidiClass::R,
            UcdClass::AL => BidiClass::AL,
            UcdClass::EN => BidiClass::EN,
            UcdClass::ES => BidiClass::ES,
            UcdClass::ET => BidiClass::ET,
            UcdClass::AN => BidiClass::AN,
            UcdClass::CS => BidiClass::CS,
            UcdClass::NSM => BidiClass::NSM,
            UcdClass::BN => BidiClass::BN,
            UcdClass::B => BidiClass::B,
            UcdClass::S => BidiClass::S,
            UcdClass::WS => BidiClass::WS,
            UcdClass::ON => BidiClass::ON,
            UcdClass::LRE => BidiClass::LRE,
            UcdClass::RLE => BidiClass::RLE,
            UcdClass::LRO => BidiClass::LRO,
            UcdClass::RLO => BidiClass::RLO,
            UcdClass::PDF => BidiClass::PDF,
            UcdClass::LRI => BidiClass::LRI,
            UcdClass::RLI => BidiClass::RLI,
            UcdClass::FSI => BidiClass::FSI,
            UcdClass::PDI => BidiClass::PDI,
        },
    }
}

/// Classify a Unicode scalar for the resolution engine.
///
/// Total over all of `char`. The implicit directional marks LRM (U+200E) and
/// RLM (U+200F) are forced to [`BidiClass::BN`] so that they influence
/// neither the weak nor the neutral rules; code points the table cannot name
/// fall back to [`BidiClass::ON`] inside the data layer.
#[must_use]
pub fn classify(c: char) -> BidiClass {
    match raw_class(c) {
        BidiClass::LRM | BidiClass::RLM => BidiClass::BN,
        class => class,
    }
}

impl BidiClass {
    /// Strong directional type (L, R, AL).
    #[must_use]
    pub fn is_strong(self) -> bool {
        matches!(self, Self::L | Self::R | Self::AL)
    }

    /// One of the nine explicit formatting types.
    #[must_use]
    pub fn is_explicit(self) -> bool {
        matches!(
            self,
            Self::LRE
                | Self::RLE
                | Self::LRO
                | Self::RLO
                | Self::PDF
                | Self::LRI
                | Self::RLI
                | Self::FSI
                | Self::PDI
        )
    }

    /// LRI, RLI or FSI.
    #[must_use]
    pub fn is_isolate_initiator(self) -> bool {
        matches!(self, Self::LRI | Self::RLI | Self::FSI)
    }

    /// Neutral or isolate formatting type (NI), the domain of rules N1/N2.
    #[must_use]
    pub fn is_neutral_or_isolate(self) -> bool {
        matches!(
            self,
            Self::B | Self::S | Self::WS | Self::ON | Self::LRI | Self::RLI | Self::FSI | Self::PDI
        )
    }

    /// Removed from rule processing by X9 (embeddings, overrides, PDF, BN).
    #[must_use]
    pub fn is_removed_by_x9(self) -> bool {
        matches!(
            self,
            Self::LRE | Self::RLE | Self::LRO | Self::RLO | Self::PDF | Self::BN
        )
    }
}

/// Paired-bracket lookup per BD14/BD15.
///
/// Returns the character on the other side of the pair and which side `c`
/// itself is. The table covers the bracket pairs the engine's N0 rule
/// resolves; the CJK angle brackets are canonically equivalent to the
/// mathematical ones (see [`canonical_bracket`]).
#[must_use]
pub fn paired_bracket(c: char) -> Option<(char, BracketKind)> {
    let (other, kind) = match c {
        '(' => (')', BracketKind::Open),
        ')' => ('(', BracketKind::Close),
        '[' => (']', BracketKind::Open),
        ']' => ('[', BracketKind::Close),
        '{' => ('}', BracketKind::Open),
        '}' => ('{', BracketKind::Close),
        '\u{27E6}' => ('\u{27E7}', BracketKind::Open), // ⟦
        '\u{27E7}' => ('\u{27E6}', BracketKind::Close), // ⟧
        '\u{27E8}' => ('\u{27E9}', BracketKind::Open), // ⟨
        '\u{27E9}' => ('\u{27E8}', BracketKind::Close), // ⟩
        '\u{27EA}' => ('\u{27EB}', BracketKind::Open), // ⟪
        '\u{27EB}' => ('\u{27EA}', BracketKind::Close), // ⟫
        '\u{2983}' => ('\u{2984}', BracketKind::Open), // ⦃
        '\u{2984}' => ('\u{2983}', BracketKind::Close), // ⦄
        '\u{2985}' => ('\u{2986}', BracketKind::Open), // ⦅
        '\u{2986}' => ('\u{2985}', BracketKind::Close), // ⦆
        '\u{3008}' => ('\u{3009}', BracketKind::Open), // 〈
        '\u{3009}' => ('\u{3008}', BracketKind::Close), // 〉
        _ => return None,
    };
    Some((other, kind))
}

/// Canonical form of a bracket character for pair matching.
///
/// U+3008/U+3009 are canonically equivalent to U+27E8/U+27E9, so a CJK
/// opener may be closed by a mathematical closer and vice versa.
#[must_use]
pub fn canonical_bracket(c: char) -> char {
    match c {
        '\u{3008}' => '\u{27E8}',
        '\u{3009}' => '\u{27E9}',
        _ => c,
    }
}

/// Mirrored counterpart of `c`, if it has one.
///
/// Covers the paired brackets plus the directional punctuation the engine's
/// L4 rule substitutes in right-to-left runs.
#[must_use]
pub fn mirrored(c: char) -> Option<char> {
    let m = match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '\u{00AB}' => '\u{00BB}', // «
        '\u{00BB}' => '\u{00AB}', // »
        '\u{2039}' => '\u{203A}', // ‹
        '\u{203A}' => '\u{2039}', // ›
        '\u{201C}' => '\u{201D}', // “
        '\u{201D}' => '\u{201C}', // ”
        '\u{2018}' => '\u{2019}', // ‘
        '\u{2019}' => '\u{2018}', // ’
        '\u{27E6}' => '\u{27E7}',
        '\u{27E7}' => '\u{27E6}',
        '\u{27E8}' => '\u{27E9}',
        '\u{27E9}' => '\u{27E8}',
        '\u{27EA}' => '\u{27EB}',
        '\u{27EB}' => '\u{27EA}',
        '\u{27EC}' => '\u{27ED}', // ⟬
        '\u{27ED}' => '\u{27EC}', // ⟭
        '\u{27EE}' => '\u{27EF}', // ⟮
        '\u{27EF}' => '\u{27EE}', // ⟯
        '\u{2983}' => '\u{2984}',
        '\u{2984}' => '\u{2983}',
        '\u{2985}' => '\u{2986}',
        '\u{2986}' => '\u{2985}',
        '\u{3008}' => '\u{3009}',
        '\u{3009}' => '\u{3008}',
        _ => return None,
    };
    Some(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_ascii_letters_are_l() {
        assert_eq!(classify('a'), BidiClass::L);
        assert_eq!(classify('Z'), BidiClass::L);
    }

    #[test]
    fn classify_digits_are_en() {
        assert_eq!(classify('0'), BidiClass::EN);
        assert_eq!(classify('9'), BidiClass::EN);
    }

    #[test]
    fn classify_hebrew_is_r() {
        assert_eq!(classify('\u{05D0}'), BidiClass::R);
    }

    #[test]
    fn classify_arabic_letter_is_al() {
        assert_eq!(classify('\u{0627}'), BidiClass::AL);
        assert_eq!(classify('\u{0628}'), BidiClass::AL);
    }

    #[test]
    fn classify_arabic_indic_digit_is_an() {
        assert_eq!(classify('\u{0660}'), BidiClass::AN);
    }

    #[test]
    fn classify_directional_marks_override_to_bn() {
        assert_eq!(classify('\u{200E}'), BidiClass::BN);
        assert_eq!(classify('\u{200F}'), BidiClass::BN);
        assert_eq!(raw_class('\u{200E}'), BidiClass::LRM);
        assert_eq!(raw_class('\u{200F}'), BidiClass::RLM);
    }

    #[test]
    fn classify_explicit_formatting() {
        assert_eq!(classify('\u{202A}'), BidiClass::LRE);
        assert_eq!(classify('\u{202B}'), BidiClass::RLE);
        assert_eq!(classify('\u{202C}'), BidiClass::PDF);
        assert_eq!(classify('\u{202D}'), BidiClass::LRO);
        assert_eq!(classify('\u{202E}'), BidiClass::RLO);
        assert_eq!(classify('\u{2066}'), BidiClass::LRI);
        assert_eq!(classify('\u{2067}'), BidiClass::RLI);
        assert_eq!(classify('\u{2068}'), BidiClass::FSI);
        assert_eq!(classify('\u{2069}'), BidiClass::PDI);
    }

    #[test]
    fn classify_neutrals_and_separators() {
        assert_eq!(classify(' '), BidiClass::WS);
        assert_eq!(classify('\t'), BidiClass::S);
        assert_eq!(classify('\u{2029}'), BidiClass::B);
        assert_eq!(classify('!'), BidiClass::ON);
        assert_eq!(classify(','), BidiClass::CS);
        assert_eq!(classify('+'), BidiClass::ES);
        assert_eq!(classify('$'), BidiClass::ET);
        assert_eq!(classify('\u{0300}'), BidiClass::NSM);
        assert_eq!(classify('\u{00AD}'), BidiClass::BN);
    }

    #[test]
    fn predicates_match_class_groups() {
        assert!(BidiClass::AL.is_strong());
        assert!(!BidiClass::EN.is_strong());
        assert!(BidiClass::PDI.is_explicit());
        assert!(BidiClass::FSI.is_isolate_initiator());
        assert!(!BidiClass::PDI.is_isolate_initiator());
        assert!(BidiClass::WS.is_neutral_or_isolate());
        assert!(BidiClass::RLI.is_neutral_or_isolate());
        assert!(!BidiClass::EN.is_neutral_or_isolate());
        assert!(BidiClass::PDF.is_removed_by_x9());
        assert!(BidiClass::BN.is_removed_by_x9());
        assert!(!BidiClass::PDI.is_removed_by_x9());
    }

    #[test]
    fn paired_bracket_table() {
        assert_eq!(paired_bracket('('), Some((')', BracketKind::Open)));
        assert_eq!(paired_bracket(']'), Some(('[', BracketKind::Close)));
        assert_eq!(paired_bracket('\u{3008}'), Some(('\u{3009}', BracketKind::Open)));
        assert_eq!(paired_bracket('a'), None);
    }

    #[test]
    fn canonical_bracket_folds_cjk_angles() {
        assert_eq!(canonical_bracket('\u{3008}'), '\u{27E8}');
        assert_eq!(canonical_bracket('\u{3009}'), '\u{27E9}');
        assert_eq!(canonical_bracket('('), '(');
    }

    #[test]
    fn mirrored_covers_brackets_and_quotes() {
        assert_eq!(mirrored('('), Some(')'));
        assert_eq!(mirrored('<'), Some('>'));
        assert_eq!(mirrored('\u{00AB}'), Some('\u{00BB}'));
        assert_eq!(mirrored('\u{27EC}'), Some('\u{27ED}'));
        assert_eq!(mirrored('a'), None);
    }
}
