//! Arabic joining and presentation-form shaping.
//!
//! Terminals draw one glyph per cell, so cursive joining has to be done by
//! substituting the contextual presentation form (U+FE70..U+FEFF) for each
//! letter. Joining runs over the paragraph's logical character buffer,
//! across soft-wrapped rows, and only links characters resolved to the same
//! embedding level. Lam-alef ligatures are not formed: they would merge two
//! cells into one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoiningType {
    Right,
    Dual,
    Causing,
    NonJoining,
    Transparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Isolated,
    Final,
    Initial,
    Medial,
}

pub fn joining_type(c: char) -> JoiningType {
    match c as u32 {
        0x0622..=0x0625 | 0x0627 | 0x0629 | 0x062F..=0x0632 | 0x0648 | 0x0671..=0x0673 => {
            JoiningType::Right
        }
        0x0626 | 0x0628 | 0x062A..=0x062E | 0x0633..=0x063A | 0x0641..=0x0647 | 0x0649
        | 0x064A => JoiningType::Dual,
        0x0640 | 0x200D => JoiningType::Causing,
        0x064B..=0x065F | 0x0670 => JoiningType::Transparent,
        _ => JoiningType::NonJoining,
    }
}

/// (isolated, final, initial, medial); right-joining letters repeat their
/// isolated/final forms in the initial/medial slots.
fn forms(c: char) -> Option<[char; 4]> {
    let forms = match c {
        '\u{0622}' => ['\u{FE81}', '\u{FE82}', '\u{FE81}', '\u{FE82}'],
        '\u{0623}' => ['\u{FE83}', '\u{FE84}', '\u{FE83}', '\u{FE84}'],
        '\u{0624}' => ['\u{FE85}', '\u{FE86}', '\u{FE85}', '\u{FE86}'],
        '\u{0625}' => ['\u{FE87}', '\u{FE88}', '\u{FE87}', '\u{FE88}'],
        '\u{0626}' => ['\u{FE89}', '\u{FE8A}', '\u{FE8B}', '\u{FE8C}'],
        '\u{0627}' => ['\u{FE8D}', '\u{FE8E}', '\u{FE8D}', '\u{FE8E}'],
        '\u{0628}' => ['\u{FE8F}', '\u{FE90}', '\u{FE91}', '\u{FE92}'],
        '\u{0629}' => ['\u{FE93}', '\u{FE94}', '\u{FE93}', '\u{FE94}'],
        '\u{062A}' => ['\u{FE95}', '\u{FE96}', '\u{FE97}', '\u{FE98}'],
        '\u{062B}' => ['\u{FE99}', '\u{FE9A}', '\u{FE9B}', '\u{FE9C}'],
        '\u{062C}' => ['\u{FE9D}', '\u{FE9E}', '\u{FE9F}', '\u{FEA0}'],
        '\u{062D}' => ['\u{FEA1}', '\u{FEA2}', '\u{FEA3}', '\u{FEA4}'],
        '\u{062E}' => ['\u{FEA5}', '\u{FEA6}', '\u{FEA7}', '\u{FEA8}'],
        '\u{062F}' => ['\u{FEA9}', '\u{FEAA}', '\u{FEA9}', '\u{FEAA}'],
        '\u{0630}' => ['\u{FEAB}', '\u{FEAC}', '\u{FEAB}', '\u{FEAC}'],
        '\u{0631}' => ['\u{FEAD}', '\u{FEAE}', '\u{FEAD}', '\u{FEAE}'],
        '\u{0632}' => ['\u{FEAF}', '\u{FEB0}', '\u{FEAF}', '\u{FEB0}'],
        '\u{0633}' => ['\u{FEB1}', '\u{FEB2}', '\u{FEB3}', '\u{FEB4}'],
        '\u{0634}' => ['\u{FEB5}', '\u{FEB6}', '\u{FEB7}', '\u{FEB8}'],
        '\u{0635}' => ['\u{FEB9}', '\u{FEBA}', '\u{FEBB}', '\u{FEBC}'],
        '\u{0636}' => ['\u{FEBD}', '\u{FEBE}', '\u{FEBF}', '\u{FEC0}'],
        '\u{0637}' => ['\u{FEC1}', '\u{FEC2}', '\u{FEC3}', '\u{FEC4}'],
        '\u{0638}' => ['\u{FEC5}', '\u{FEC6}', '\u{FEC7}', '\u{FEC8}'],
        '\u{0639}' => ['\u{FEC9}', '\u{FECA}', '\u{FECB}', '\u{FECC}'],
        '\u{063A}' => ['\u{FECD}', '\u{FECE}', '\u{FECF}', '\u{FED0}'],
        '\u{0641}' => ['\u{FED1}', '\u{FED2}', '\u{FED3}', '\u{FED4}'],
        '\u{0642}' => ['\u{FED5}', '\u{FED6}', '\u{FED7}', '\u{FED8}'],
        '\u{0643}' => ['\u{FED9}', '\u{FEDA}', '\u{FEDB}', '\u{FEDC}'],
        '\u{0644}' => ['\u{FEDD}', '\u{FEDE}', '\u{FEDF}', '\u{FEE0}'],
        '\u{0645}' => ['\u{FEE1}', '\u{FEE2}', '\u{FEE3}', '\u{FEE4}'],
        '\u{0646}' => ['\u{FEE5}', '\u{FEE6}', '\u{FEE7}', '\u{FEE8}'],
        '\u{0647}' => ['\u{FEE9}', '\u{FEEA}', '\u{FEEB}', '\u{FEEC}'],
        '\u{0648}' => ['\u{FEED}', '\u{FEEE}', '\u{FEED}', '\u{FEEE}'],
        '\u{0649}' => ['\u{FEEF}', '\u{FEF0}', '\u{FEEF}', '\u{FEF0}'],
        '\u{064A}' => ['\u{FEF1}', '\u{FEF2}', '\u{FEF3}', '\u{FEF4}'],
        _ => return None,
    };
    Some(forms)
}

/// Whether the character joins towards the following (logically later) one.
fn joins_forward(jt: JoiningType) -> bool {
    matches!(jt, JoiningType::Dual | JoiningType::Causing)
}

/// Whether the character accepts a join from the preceding one.
fn joins_backward(jt: JoiningType) -> bool {
    matches!(jt, JoiningType::Dual | JoiningType::Right | JoiningType::Causing)
}

/// Nearest non-transparent neighbour of `i` (after it when `forward`), provided
/// every character on the way sits at the same level as `i`.
fn neighbour(chars: &[char], levels: &[u8], i: usize, forward: bool) -> Option<JoiningType> {
    let mut j = i;
    loop {
        j = if forward {
            j.checked_add(1).filter(|&n| n < chars.len())?
        } else {
            j.checked_sub(1)?
        };
        if levels[j] != levels[i] {
            return None;
        }
        match joining_type(chars[j]) {
            JoiningType::Transparent => continue,
            jt => return Some(jt),
        }
    }
}

/// Shape `chars` (logical order, with per-character `levels`). Returns
/// `(index, presentation form)` for every character that changes.
pub fn shape_arabic(chars: &[char], levels: &[u8]) -> Vec<(usize, char)> {
    debug_assert_eq!(chars.len(), levels.len());
    let mut out = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        let Some([isolated, fin, initial, medial]) = forms(c) else {
            continue;
        };
        let jt = joining_type(c);
        let prev = neighbour(chars, levels, i, false).is_some_and(joins_forward);
        let next = jt == JoiningType::Dual
            && neighbour(chars, levels, i, true).is_some_and(joins_backward);
        let form = match (prev, next) {
            (true, true) => Form::Medial,
            (true, false) => Form::Final,
            (false, true) => Form::Initial,
            (false, false) => Form::Isolated,
        };
        let shaped = match form {
            Form::Isolated => isolated,
            Form::Final => fin,
            Form::Initial => initial,
            Form::Medial => medial,
        };
        out.push((i, shaped));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaped(text: &str, level: u8) -> String {
        let chars: Vec<char> = text.chars().collect();
        let levels = vec![level; chars.len()];
        let mut out = chars.clone();
        for (i, ch) in shape_arabic(&chars, &levels) {
            out[i] = ch;
        }
        out.into_iter().collect()
    }

    #[test]
    fn joining_types() {
        assert_eq!(joining_type('\u{0628}'), JoiningType::Dual);
        assert_eq!(joining_type('\u{0627}'), JoiningType::Right);
        assert_eq!(joining_type('\u{0640}'), JoiningType::Causing);
        assert_eq!(joining_type('\u{064E}'), JoiningType::Transparent);
        assert_eq!(joining_type('a'), JoiningType::NonJoining);
    }

    #[test]
    fn three_dual_letters_get_initial_medial_final() {
        // beh beh beh
        assert_eq!(shaped("\u{0628}\u{0628}\u{0628}", 1), "\u{FE91}\u{FE92}\u{FE90}");
    }

    #[test]
    fn right_joining_letter_breaks_the_chain() {
        // beh alef beh: alef takes final form, the following beh starts over isolated.
        assert_eq!(shaped("\u{0628}\u{0627}\u{0628}", 1), "\u{FE91}\u{FE8E}\u{FE8F}");
    }

    #[test]
    fn transparent_marks_are_skipped() {
        // beh fatha beh
        assert_eq!(shaped("\u{0628}\u{064E}\u{0628}", 1), "\u{FE91}\u{064E}\u{FE90}");
    }

    #[test]
    fn level_change_blocks_joining() {
        let chars = ['\u{0628}', '\u{0628}'];
        let forms = shape_arabic(&chars, &[1, 3]);
        assert_eq!(forms, vec![(0, '\u{FE8F}'), (1, '\u{FE8F}')]);
    }

    #[test]
    fn non_arabic_is_untouched() {
        assert!(shape_arabic(&['a', 'b'], &[0, 0]).is_empty());
    }
}
