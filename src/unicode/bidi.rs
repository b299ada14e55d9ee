//! Unicode Bidirectional Algorithm (UAX #9) resolution engine.
//!
//! Implements the full rule chain over [`BidiClass`] values: paragraph level
//! detection (P2/P3), explicit formatting (X1-X8) with a depth-bounded
//! directional status stack, isolating run sequences (X10), weak resolution
//! (W1-W7), bracket-pair and neutral resolution (N0-N2), implicit levels
//! (I1/I2), and line reordering with mirroring (L1/L2/L4).
//!
//! The engine never fails: malformed structure (unmatched PDF/PDI, stack
//! overflow past depth 125) is absorbed silently, as the algorithm requires.
//! All intermediate buffers are owned by a single resolver for the duration
//! of one paragraph; nothing escapes but the resolved runs.

use std::collections::HashMap;

use crate::unicode::class::{
    BidiClass, BracketKind, canonical_bracket, classify, mirrored, paired_bracket,
};

/// Maximum explicit embedding depth (UAX #9 BD2).
pub const MAX_DEPTH: u8 = 125;

/// Maximum resolved embedding level after the implicit rules.
pub const MAX_LEVEL: u8 = 126;

/// BD16 bracket-pair stack size.
const BRACKET_STACK_LIMIT: usize = 63;

/// A maximal span of characters sharing one embedding level.
///
/// `start` and `length` are in code points (`char`s), not bytes. The runs
/// returned by [`resolve`] are non-overlapping and cover the paragraph
/// exactly once, in logical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    /// First code point of the run.
    pub start: u32,
    /// Number of code points in the run.
    pub length: u32,
    /// Embedding level; even is LTR, odd is RTL.
    pub level: u8,
}

/// Detect the paragraph embedding level of `text` (rules P2/P3).
///
/// Scans for the first strong character, skipping anything between an
/// isolate initiator and its matching PDI. Returns 0 when no strong
/// character is found.
#[must_use]
pub fn paragraph_level(text: &str) -> u8 {
    let mut isolate_depth = 0u32;
    for c in text.chars() {
        match classify(c) {
            BidiClass::LRI | BidiClass::RLI | BidiClass::FSI => isolate_depth += 1,
            BidiClass::PDI => isolate_depth = isolate_depth.saturating_sub(1),
            BidiClass::L if isolate_depth == 0 => return 0,
            BidiClass::R | BidiClass::AL if isolate_depth == 0 => return 1,
            _ => {}
        }
    }
    0
}

fn effective_paragraph_level(text: &str, base_level: i8) -> u8 {
    match base_level {
        b if b < 0 => paragraph_level(text),
        0 => 0,
        _ => 1,
    }
}

/// Resolve embedding levels for one paragraph.
///
/// `base_level` of `-1` auto-detects the paragraph direction; `0`/`1` pin it
/// to LTR/RTL. Returns the level runs in logical order.
#[must_use]
pub fn resolve(text: &str, base_level: i8) -> Vec<Run> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let para_level = effective_paragraph_level(text, base_level);
    let levels = Resolver::new(chars, para_level).resolve_levels();

    let mut runs = Vec::new();
    let mut start = 0usize;
    for i in 1..levels.len() {
        if levels[i] != levels[start] {
            runs.push(Run {
                start: start as u32,
                length: (i - start) as u32,
                level: levels[start],
            });
            start = i;
        }
    }
    runs.push(Run {
        start: start as u32,
        length: (levels.len() - start) as u32,
        level: levels[start],
    });
    runs
}

/// Reorder `text` into visual display order given resolved `runs` (L2/L4).
///
/// The nine explicit formatting characters are omitted from the output;
/// mirrored characters in odd-level (RTL) positions are substituted with
/// their paired forms. All other code points are preserved.
#[must_use]
pub fn reorder_for_display(text: &str, runs: &[Run], paragraph_level: u8) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let mut levels = vec![paragraph_level; chars.len()];
    for run in runs {
        for i in run.start..run.start + run.length {
            if let Some(slot) = levels.get_mut(i as usize) {
                *slot = run.level;
            }
        }
    }

    let mut visual: Vec<usize> = (0..chars.len())
        .filter(|&i| !classify(chars[i]).is_explicit())
        .collect();
    if visual.is_empty() {
        return String::new();
    }

    // L2: progressive span reversal from the highest level down to 1.
    let max_level = visual.iter().map(|&i| levels[i]).max().unwrap_or(0);
    for threshold in (1..=max_level).rev() {
        let mut k = 0;
        while k < visual.len() {
            if levels[visual[k]] >= threshold {
                let span_start = k;
                while k < visual.len() && levels[visual[k]] >= threshold {
                    k += 1;
                }
                visual[span_start..k].reverse();
            } else {
                k += 1;
            }
        }
    }

    // L4: mirrored glyphs in RTL positions.
    let mut out = String::with_capacity(text.len());
    for &i in &visual {
        let c = chars[i];
        if levels[i] % 2 == 1 {
            out.push(mirrored(c).unwrap_or(c));
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolve and reorder in one step: logical order in, visual order out.
#[must_use]
pub fn process(text: &str, base_level: i8) -> String {
    if text.is_empty() {
        return String::new();
    }
    let para_level = effective_paragraph_level(text, base_level);
    let runs = resolve(text, base_level);
    reorder_for_display(text, &runs, para_level)
}

/// Directional override status of a stack entry (X1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OverrideStatus {
    Neutral,
    Ltr,
    Rtl,
}

/// Directional status stack entry.
#[derive(Clone, Copy, Debug)]
struct StatusEntry {
    level: u8,
    status: OverrideStatus,
    isolate: bool,
}

/// One isolating run sequence: same-level positions bridged across matched
/// isolate initiator / PDI pairs, with its boundary classes.
struct Sequence {
    positions: Vec<usize>,
    level: u8,
    sos: BidiClass,
    eos: BidiClass,
}

fn next_odd(level: u8) -> u8 {
    (level + 1) | 1
}

fn next_even(level: u8) -> u8 {
    (level + 2) & !1
}

fn direction_of(level: u8) -> BidiClass {
    if level % 2 == 0 { BidiClass::L } else { BidiClass::R }
}

/// L or R strength of a resolved class, treating EN/AN as R (N0/N1).
fn strength(class: BidiClass) -> Option<BidiClass> {
    match class {
        BidiClass::L => Some(BidiClass::L),
        BidiClass::R | BidiClass::EN | BidiClass::AN => Some(BidiClass::R),
        _ => None,
    }
}

/// Per-paragraph working state. Owns every intermediate buffer.
struct Resolver {
    chars: Vec<char>,
    /// Classes as classified, before any rule rewrites. Used by L1 and the
    /// NSM follow-ups of W1/N0.
    original: Vec<BidiClass>,
    /// Working classes, rewritten by the X/W/N rules.
    classes: Vec<BidiClass>,
    levels: Vec<u8>,
    /// Positions removed from rule processing by X9.
    removed: Vec<bool>,
    /// Matching PDI position for each isolate initiator (BD9).
    matched_pdi: Vec<Option<usize>>,
    para_level: u8,
}

impl Resolver {
    fn new(chars: Vec<char>, para_level: u8) -> Self {
        let original: Vec<BidiClass> = chars.iter().map(|&c| classify(c)).collect();
        let n = chars.len();
        let mut resolver = Self {
            chars,
            classes: original.clone(),
            original,
            levels: vec![para_level; n],
            removed: vec![false; n],
            matched_pdi: vec![None; n],
            para_level,
        };
        resolver.match_isolates();
        resolver
    }

    fn resolve_levels(mut self) -> Vec<u8> {
        self.resolve_explicit();
        for i in 0..self.classes.len() {
            self.removed[i] = self.classes[i] == BidiClass::BN;
        }
        let sequences = self.isolating_run_sequences();
        for seq in &sequences {
            self.resolve_weak(seq);
            self.resolve_brackets(seq);
            self.resolve_neutral(seq);
        }
        self.resolve_implicit();
        self.assign_removed_levels();
        self.reset_separator_levels();
        self.levels
    }

    /// BD9: match isolate initiators to their PDIs.
    fn match_isolates(&mut self) {
        let mut stack: Vec<usize> = Vec::new();
        for i in 0..self.original.len() {
            match self.original[i] {
                BidiClass::LRI | BidiClass::RLI | BidiClass::FSI => stack.push(i),
                BidiClass::PDI => {
                    if let Some(initiator) = stack.pop() {
                        self.matched_pdi[initiator] = Some(i);
                    }
                }
                _ => {}
            }
        }
    }

    /// First-strong level between `from` and `end`, skipping nested isolate
    /// spans (used for FSI direction, X5c).
    fn first_strong_level(&self, from: usize, end: usize) -> u8 {
        let mut depth = 0u32;
        for j in from..end {
            match self.original[j] {
                BidiClass::LRI | BidiClass::RLI | BidiClass::FSI => depth += 1,
                BidiClass::PDI => depth = depth.saturating_sub(1),
                BidiClass::L if depth == 0 => return 0,
                BidiClass::R | BidiClass::AL if depth == 0 => return 1,
                _ => {}
            }
        }
        0
    }

    fn apply_override(&mut self, i: usize, status: OverrideStatus) {
        match status {
            OverrideStatus::Ltr => self.classes[i] = BidiClass::L,
            OverrideStatus::Rtl => self.classes[i] = BidiClass::R,
            OverrideStatus::Neutral => {}
        }
    }

    /// X1-X8: explicit embeddings, overrides and isolates.
    fn resolve_explicit(&mut self) {
        let mut stack: Vec<StatusEntry> = Vec::with_capacity(usize::from(MAX_DEPTH) + 1);
        stack.push(StatusEntry {
            level: self.para_level,
            status: OverrideStatus::Neutral,
            isolate: false,
        });
        let mut overflow_isolates = 0u32;
        let mut overflow_embeddings = 0u32;
        let mut valid_isolates = 0u32;

        for i in 0..self.classes.len() {
            let class = self.classes[i];
            let top = *stack.last().expect("status stack is never empty");
            match class {
                BidiClass::RLE | BidiClass::LRE | BidiClass::RLO | BidiClass::LRO => {
                    self.levels[i] = top.level;
                    self.classes[i] = BidiClass::BN;

                    let rtl = matches!(class, BidiClass::RLE | BidiClass::RLO);
                    let new_level = if rtl {
                        next_odd(top.level)
                    } else {
                        next_even(top.level)
                    };
                    let status = match class {
                        BidiClass::RLO => OverrideStatus::Rtl,
                        BidiClass::LRO => OverrideStatus::Ltr,
                        _ => OverrideStatus::Neutral,
                    };
                    if new_level <= MAX_DEPTH && overflow_isolates == 0 && overflow_embeddings == 0
                    {
                        stack.push(StatusEntry {
                            level: new_level,
                            status,
                            isolate: false,
                        });
                    } else if overflow_isolates == 0 {
                        overflow_embeddings += 1;
                    }
                }

                BidiClass::RLI | BidiClass::LRI | BidiClass::FSI => {
                    self.levels[i] = top.level;
                    self.apply_override(i, top.status);

                    let rtl = match class {
                        BidiClass::RLI => true,
                        BidiClass::LRI => false,
                        _ => {
                            let end = self.matched_pdi[i].unwrap_or(self.classes.len());
                            self.first_strong_level(i + 1, end) == 1
                        }
                    };
                    let new_level = if rtl {
                        next_odd(top.level)
                    } else {
                        next_even(top.level)
                    };
                    if new_level <= MAX_DEPTH && overflow_isolates == 0 && overflow_embeddings == 0
                    {
                        valid_isolates += 1;
                        stack.push(StatusEntry {
                            level: new_level,
                            status: OverrideStatus::Neutral,
                            isolate: true,
                        });
                    } else {
                        overflow_isolates += 1;
                    }
                }

                BidiClass::PDI => {
                    if overflow_isolates > 0 {
                        overflow_isolates -= 1;
                    } else if valid_isolates > 0 {
                        overflow_embeddings = 0;
                        while let Some(entry) = stack.pop() {
                            if entry.isolate {
                                break;
                            }
                        }
                        valid_isolates -= 1;
                    }
                    let top = *stack.last().expect("status stack is never empty");
                    self.levels[i] = top.level;
                    self.apply_override(i, top.status);
                }

                BidiClass::PDF => {
                    if overflow_isolates > 0 {
                        // Swallowed by the overflowing isolate.
                    } else if overflow_embeddings > 0 {
                        overflow_embeddings -= 1;
                    } else if stack.len() > 1 && !top.isolate {
                        stack.pop();
                    }
                    self.levels[i] = stack.last().expect("status stack is never empty").level;
                    self.classes[i] = BidiClass::BN;
                }

                BidiClass::B => {
                    // X8: a paragraph separator terminates all embeddings.
                    stack.truncate(1);
                    overflow_isolates = 0;
                    overflow_embeddings = 0;
                    valid_isolates = 0;
                    self.levels[i] = self.para_level;
                }

                BidiClass::BN => {
                    self.levels[i] = top.level;
                }

                _ => {
                    self.levels[i] = top.level;
                    self.apply_override(i, top.status);
                }
            }
        }
    }

    /// X10/BD13: partition into isolating run sequences with sos/eos.
    fn isolating_run_sequences(&self) -> Vec<Sequence> {
        let n = self.classes.len();

        // Level runs over the positions X9 keeps.
        let mut runs: Vec<Vec<usize>> = Vec::new();
        for i in (0..n).filter(|&i| !self.removed[i]) {
            let continues = runs.last().is_some_and(|run| {
                self.levels[*run.last().expect("runs are non-empty")] == self.levels[i]
            });
            if continues {
                runs.last_mut().expect("runs are non-empty").push(i);
            } else {
                runs.push(vec![i]);
            }
        }

        let run_starting_at: HashMap<usize, usize> = runs
            .iter()
            .enumerate()
            .map(|(ri, run)| (run[0], ri))
            .collect();

        let mut used = vec![false; runs.len()];
        let mut sequences = Vec::new();
        for ri in 0..runs.len() {
            if used[ri] {
                continue;
            }
            used[ri] = true;
            let mut positions = runs[ri].clone();
            let mut current = ri;
            // Bridge across isolate initiator -> matching PDI, when the PDI
            // opens the next level run.
            loop {
                let last_pos = *runs[current].last().expect("runs are non-empty");
                if !self.original[last_pos].is_isolate_initiator() {
                    break;
                }
                let Some(pdi) = self.matched_pdi[last_pos] else {
                    break;
                };
                let Some(&next_ri) = run_starting_at.get(&pdi) else {
                    break;
                };
                if used[next_ri] {
                    break;
                }
                used[next_ri] = true;
                positions.extend_from_slice(&runs[next_ri]);
                current = next_ri;
            }

            let level = self.levels[positions[0]];

            let first = positions[0];
            let mut level_before = self.para_level;
            for j in (0..first).rev() {
                if !self.removed[j] {
                    level_before = self.levels[j];
                    break;
                }
            }
            let sos = direction_of(level.max(level_before));

            let last = *positions.last().expect("sequence is non-empty");
            let level_after = if self.original[last].is_isolate_initiator()
                && self.matched_pdi[last].is_none()
            {
                self.para_level
            } else {
                let mut after = self.para_level;
                for j in last + 1..n {
                    if !self.removed[j] {
                        after = self.levels[j];
                        break;
                    }
                }
                after
            };
            let eos = direction_of(level.max(level_after));

            sequences.push(Sequence {
                positions,
                level,
                sos,
                eos,
            });
        }
        sequences
    }

    /// W1-W7 over one isolating run sequence.
    fn resolve_weak(&mut self, seq: &Sequence) {
        // W1: NSM takes the class of its predecessor; ON after an isolate
        // boundary; sos at the start of the sequence.
        let mut prev = seq.sos;
        for &p in &seq.positions {
            if self.classes[p] == BidiClass::NSM {
                self.classes[p] = match prev {
                    BidiClass::LRI | BidiClass::RLI | BidiClass::FSI | BidiClass::PDI => {
                        BidiClass::ON
                    }
                    other => other,
                };
            }
            prev = self.classes[p];
        }

        // W2: EN whose nearest preceding strong type is AL becomes AN.
        let mut last_strong = seq.sos;
        for &p in &seq.positions {
            match self.classes[p] {
                BidiClass::L | BidiClass::R | BidiClass::AL => last_strong = self.classes[p],
                BidiClass::EN if last_strong == BidiClass::AL => self.classes[p] = BidiClass::AN,
                _ => {}
            }
        }

        // W3: AL becomes R.
        for &p in &seq.positions {
            if self.classes[p] == BidiClass::AL {
                self.classes[p] = BidiClass::R;
            }
        }

        // W4: a single separator between numbers of matching kind joins them.
        for k in 1..seq.positions.len().saturating_sub(1) {
            let prev_class = self.classes[seq.positions[k - 1]];
            let class = self.classes[seq.positions[k]];
            let next_class = self.classes[seq.positions[k + 1]];
            if class == BidiClass::ES && prev_class == BidiClass::EN && next_class == BidiClass::EN
            {
                self.classes[seq.positions[k]] = BidiClass::EN;
            } else if class == BidiClass::CS
                && prev_class == next_class
                && matches!(prev_class, BidiClass::EN | BidiClass::AN)
            {
                self.classes[seq.positions[k]] = prev_class;
            }
        }

        // W5: a run of ET adjacent to EN becomes EN.
        let mut k = 0;
        while k < seq.positions.len() {
            if self.classes[seq.positions[k]] == BidiClass::ET {
                let start = k;
                while k < seq.positions.len() && self.classes[seq.positions[k]] == BidiClass::ET {
                    k += 1;
                }
                let adjacent_en = (start > 0
                    && self.classes[seq.positions[start - 1]] == BidiClass::EN)
                    || (k < seq.positions.len()
                        && self.classes[seq.positions[k]] == BidiClass::EN);
                if adjacent_en {
                    for j in start..k {
                        self.classes[seq.positions[j]] = BidiClass::EN;
                    }
                }
            } else {
                k += 1;
            }
        }

        // W6: leftover separators and terminators become ON.
        for &p in &seq.positions {
            if matches!(
                self.classes[p],
                BidiClass::ES | BidiClass::ET | BidiClass::CS
            ) {
                self.classes[p] = BidiClass::ON;
            }
        }

        // W7: EN whose nearest preceding strong type is L becomes L.
        let mut last_strong = seq.sos;
        for &p in &seq.positions {
            match self.classes[p] {
                BidiClass::L | BidiClass::R => last_strong = self.classes[p],
                BidiClass::EN if last_strong == BidiClass::L => self.classes[p] = BidiClass::L,
                _ => {}
            }
        }
    }

    /// N0: resolve bracket pairs (BD16) against the embedding direction.
    fn resolve_brackets(&mut self, seq: &Sequence) {
        let mut stack: Vec<(char, usize)> = Vec::new();
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        'scan: for (k, &p) in seq.positions.iter().enumerate() {
            if self.classes[p] != BidiClass::ON {
                continue;
            }
            match paired_bracket(self.chars[p]) {
                Some((_, BracketKind::Open)) => {
                    if stack.len() == BRACKET_STACK_LIMIT {
                        break 'scan;
                    }
                    stack.push((canonical_bracket(self.chars[p]), k));
                }
                Some((open, BracketKind::Close)) => {
                    let open_canonical = canonical_bracket(open);
                    if let Some(idx) = stack.iter().rposition(|&(c, _)| c == open_canonical) {
                        pairs.push((stack[idx].1, k));
                        stack.truncate(idx);
                    }
                }
                None => {}
            }
        }
        pairs.sort_unstable();

        let embedding = direction_of(seq.level);
        let opposite = direction_of(seq.level + 1);
        for (open_k, close_k) in pairs {
            let mut found_embedding = false;
            let mut found_opposite = false;
            for k in open_k + 1..close_k {
                match strength(self.classes[seq.positions[k]]) {
                    Some(s) if s == embedding => {
                        found_embedding = true;
                        break;
                    }
                    Some(_) => found_opposite = true,
                    None => {}
                }
            }

            let new_class = if found_embedding {
                Some(embedding)
            } else if found_opposite {
                let mut context = seq.sos;
                for k in (0..open_k).rev() {
                    if let Some(s) = strength(self.classes[seq.positions[k]]) {
                        context = s;
                        break;
                    }
                }
                Some(if context == opposite { opposite } else { embedding })
            } else {
                None
            };

            if let Some(class) = new_class {
                self.set_bracket_class(seq, open_k, class);
                self.set_bracket_class(seq, close_k, class);
            }
        }
    }

    /// Reclassify a bracket and any NSM characters trailing it.
    fn set_bracket_class(&mut self, seq: &Sequence, k: usize, class: BidiClass) {
        self.classes[seq.positions[k]] = class;
        for &p in &seq.positions[k + 1..] {
            if self.original[p] == BidiClass::NSM {
                self.classes[p] = class;
            } else {
                break;
            }
        }
    }

    /// N1/N2: neutral and isolate formatting characters.
    fn resolve_neutral(&mut self, seq: &Sequence) {
        let n = seq.positions.len();
        let mut k = 0;
        while k < n {
            if !self.classes[seq.positions[k]].is_neutral_or_isolate() {
                k += 1;
                continue;
            }
            let start = k;
            while k < n && self.classes[seq.positions[k]].is_neutral_or_isolate() {
                k += 1;
            }
            let before = if start == 0 {
                seq.sos
            } else {
                strength(self.classes[seq.positions[start - 1]]).unwrap_or(seq.sos)
            };
            let after = if k == n {
                seq.eos
            } else {
                strength(self.classes[seq.positions[k]]).unwrap_or(seq.eos)
            };
            let resolved = if before == after {
                before
            } else {
                direction_of(seq.level)
            };
            for j in start..k {
                self.classes[seq.positions[j]] = resolved;
            }
        }
    }

    /// I1/I2: bump levels by final class.
    fn resolve_implicit(&mut self) {
        for i in 0..self.classes.len() {
            if self.removed[i] {
                continue;
            }
            let level = self.levels[i];
            let bumped = if level % 2 == 0 {
                match self.classes[i] {
                    BidiClass::R => level + 1,
                    BidiClass::AN | BidiClass::EN => level + 2,
                    _ => level,
                }
            } else {
                match self.classes[i] {
                    BidiClass::L | BidiClass::EN | BidiClass::AN => level + 1,
                    _ => level,
                }
            };
            self.levels[i] = bumped.min(MAX_LEVEL);
        }
    }

    /// Give X9-removed characters the level of their left neighbor so they
    /// never split an otherwise contiguous run.
    fn assign_removed_levels(&mut self) {
        for i in 0..self.levels.len() {
            if self.removed[i] {
                self.levels[i] = if i == 0 {
                    self.para_level
                } else {
                    self.levels[i - 1]
                };
            }
        }
    }

    /// L1: separators, and whitespace/isolate runs trailing them or ending
    /// the paragraph, reset to the paragraph level. Works on original
    /// classes; X9-removed characters are transparent to the scan.
    fn reset_separator_levels(&mut self) {
        let mut run_start: Option<usize> = None;
        for i in 0..self.levels.len() {
            match self.original[i] {
                BidiClass::B | BidiClass::S => {
                    self.levels[i] = self.para_level;
                    if let Some(start) = run_start {
                        for j in start..i {
                            self.levels[j] = self.para_level;
                        }
                    }
                    run_start = None;
                }
                class if class == BidiClass::WS
                    || class == BidiClass::PDI
                    || class.is_isolate_initiator()
                    || class.is_removed_by_x9() =>
                {
                    run_start.get_or_insert(i);
                }
                _ => run_start = None,
            }
        }
        if let Some(start) = run_start {
            for j in start..self.levels.len() {
                self.levels[j] = self.para_level;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels_of(text: &str, base: i8) -> Vec<u8> {
        let mut levels = Vec::new();
        for run in resolve(text, base) {
            for _ in 0..run.length {
                levels.push(run.level);
            }
        }
        levels
    }

    #[test]
    fn empty_text_resolves_to_nothing() {
        assert!(resolve("", -1).is_empty());
        assert_eq!(process("", -1), "");
    }

    #[test]
    fn paragraph_level_detection() {
        assert_eq!(paragraph_level("abc"), 0);
        assert_eq!(paragraph_level("\u{05D0}\u{05D1}"), 1);
        assert_eq!(paragraph_level("\u{0627}"), 1);
        assert_eq!(paragraph_level(" . "), 0);
        assert_eq!(paragraph_level("123"), 0);
    }

    #[test]
    fn paragraph_level_skips_isolated_content() {
        // Strong characters inside an isolate must not decide the level.
        assert_eq!(paragraph_level("\u{2066}\u{05D0}\u{2069}a"), 0);
        assert_eq!(paragraph_level("\u{2067}a\u{2069}\u{05D0}"), 1);
    }

    #[test]
    fn pure_ltr_single_run() {
        let runs = resolve("abc", -1);
        assert_eq!(
            runs,
            vec![Run {
                start: 0,
                length: 3,
                level: 0
            }]
        );
        assert_eq!(process("abc", -1), "abc");
    }

    #[test]
    fn pure_rtl_reverses() {
        let runs = resolve("\u{05D0}\u{05D1}\u{05D2}", -1);
        assert_eq!(
            runs,
            vec![Run {
                start: 0,
                length: 3,
                level: 1
            }]
        );
        assert_eq!(
            process("\u{05D0}\u{05D1}\u{05D2}", -1),
            "\u{05D2}\u{05D1}\u{05D0}"
        );
    }

    #[test]
    fn embedded_rtl_character_keeps_position() {
        assert_eq!(levels_of("a\u{05D0}b", -1), vec![0, 1, 0]);
        assert_eq!(process("a\u{05D0}b", -1), "a\u{05D0}b");
    }

    #[test]
    fn european_number_in_rtl_gets_level_two() {
        // EN after R stays EN (W2 needs AL); the implicit rules raise it to 2.
        assert_eq!(levels_of("\u{05D0}1\u{05D1}", -1), vec![1, 2, 1]);
        assert_eq!(process("\u{05D0}1\u{05D1}", -1), "\u{05D1}1\u{05D0}");
    }

    #[test]
    fn arabic_number_after_arabic_letter() {
        // W2 turns the EN into AN; the implicit rules raise it from 1 to 2.
        assert_eq!(levels_of("\u{0627}1", -1), vec![1, 2]);
    }

    #[test]
    fn numbers_in_ltr_text_stay_ltr() {
        // W5 absorbs the terminator, W4 the separator, W7 folds EN to L.
        assert_eq!(levels_of("x 123.456$ y", -1), vec![0; 12]);
        assert_eq!(process("x 123.456$ y", -1), "x 123.456$ y");
    }

    #[test]
    fn brackets_in_rtl_take_embedding_direction() {
        // N0: only an opposite strong inside, no strong context before the
        // opener, so both brackets take the embedding direction R.
        assert_eq!(levels_of("(a)", 1), vec![1, 2, 1]);
        // After L2 reversal and L4 mirroring the brackets read correctly.
        assert_eq!(process("(a)", 1), "(a)");
    }

    #[test]
    fn brackets_with_matching_strong_inside() {
        // Hebrew inside the pair matches the RTL embedding: brackets become R
        // and travel with the surrounding text.
        let text = "\u{05D0}(\u{05D1})\u{05D2}.";
        assert_eq!(process(text, -1), ".\u{05D2}(\u{05D1})\u{05D0}");
    }

    #[test]
    fn mirroring_square_brackets_in_rtl_run() {
        assert_eq!(
            process("\u{05D0}[\u{05D1}]\u{05D2}", -1),
            "\u{05D2}[\u{05D1}]\u{05D0}"
        );
    }

    #[test]
    fn isolate_content_is_reordered_in_place() {
        let text = "a\u{2067}\u{05D0}\u{05D1}\u{2069}b";
        assert_eq!(process(text, -1), "a\u{05D1}\u{05D0}b");
    }

    #[test]
    fn fsi_adopts_first_strong_direction() {
        let text = "\u{2068}\u{05D0}a\u{2069}";
        // FSI sees Hebrew first: content is RTL, the Latin letter nests at 2.
        assert_eq!(levels_of(text, 0), vec![0, 1, 2, 0]);
    }

    #[test]
    fn rlo_overrides_latin_to_rtl() {
        assert_eq!(process("\u{202E}abc\u{202C}", 0), "cba");
    }

    #[test]
    fn deep_nesting_is_absorbed_silently() {
        let mut text = String::new();
        for _ in 0..200 {
            text.push('\u{202B}');
        }
        text.push('a');
        let levels = levels_of(&text, 0);
        assert_eq!(levels.len(), 201);
        assert!(levels.iter().all(|&l| l <= MAX_LEVEL));
        // The strong character sits at the deepest valid embedding.
        assert_eq!(levels[200], 126);
        let _ = process(&text, 0);
    }

    #[test]
    fn unmatched_pops_are_ignored() {
        assert_eq!(levels_of("a\u{202C}b", 0), vec![0, 0, 0]);
        assert_eq!(levels_of("a\u{2069}b", 0), vec![0, 0, 0]);
    }

    #[test]
    fn trailing_whitespace_resets_to_paragraph_level() {
        let levels = levels_of("\u{05D0}\u{05D1} ", 0);
        assert_eq!(levels, vec![1, 1, 0]);
    }

    #[test]
    fn runs_partition_the_paragraph() {
        let text = "abc \u{05D0}\u{05D1} 123";
        let runs = resolve(text, -1);
        let mut next = 0u32;
        for run in &runs {
            assert_eq!(run.start, next);
            assert!(run.length > 0);
            next = run.start + run.length;
        }
        assert_eq!(next as usize, text.chars().count());
    }

    #[test]
    fn newline_separates_reordered_segments() {
        assert_eq!(
            process("abc\n\u{05D0}\u{05D1}\u{05D2}", -1),
            "abc\n\u{05D2}\u{05D1}\u{05D0}"
        );
    }

    #[test]
    fn explicit_formatting_is_dropped_from_display() {
        let text = "\u{202B}\u{05D0}\u{05D1}\u{202C}";
        assert_eq!(process(text, 0), "\u{05D1}\u{05D0}");
    }

    #[test]
    fn directional_marks_survive_display() {
        // LRM/RLM classify as BN but are not explicit formatting; they stay.
        let out = process("a\u{200E}b", -1);
        assert_eq!(out.chars().count(), 3);
    }

    #[test]
    fn base_level_pins_override_detection() {
        assert_eq!(levels_of("abc", 1)[0], 2);
        assert_eq!(levels_of("\u{05D0}", 0)[0], 1);
    }
}
