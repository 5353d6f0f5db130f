//! Base-14 Helvetica metrics, line wrapping and WinAnsi encoding.
//!
//! The PDF writer uses the standard Helvetica family so no font file has to
//! be embedded. Widths are the AFM advance widths (1/1000 em) for printable
//! ASCII; other characters use an average width, which only affects where
//! lines wrap.

/// One of the three Helvetica faces the writer registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    /// Resource name used in content streams.
    pub fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    /// PostScript name of the base-14 font.
    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance width of `c` in 1/1000 em.
pub fn char_width(c: char, font: Font) -> u16 {
    let table = match font {
        Font::Bold => &HELVETICA_BOLD,
        Font::Regular | Font::Oblique => &HELVETICA,
    };
    match c {
        ' '..='~' => table[c as usize - 32],
        '•' => 350,
        '—' => 1000,
        '…' => 1000,
        _ => 556,
    }
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, font) as u32).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap to `max_width` points.
///
/// Explicit newlines start a new line; words wider than a whole line are
/// broken between characters. Empty or whitespace-only text yields no lines.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let space = text_width(" ", font, size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0.0;

        for word in paragraph.split_whitespace() {
            let width = text_width(word, font, size);

            if width > max_width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let mut pieces = break_word(word, font, size, max_width);
                let last = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                line_width = text_width(&last, font, size);
                line = last;
                continue;
            }

            if line.is_empty() {
                line.push_str(word);
                line_width = width;
            } else if line_width + space + width <= max_width {
                line.push(' ');
                line.push_str(word);
                line_width += space + width;
            } else {
                lines.push(std::mem::replace(&mut line, word.to_string()));
                line_width = width;
            }
        }

        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

/// Split one over-long word into pieces no wider than `max_width`
/// (at least one character per piece).
fn break_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0;
    for c in word.chars() {
        let w = char_width(c, font) as f32 * size / 1000.0;
        if !piece.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Encode text for a `WinAnsiEncoding` simple font; unmappable characters
/// become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        '\t' => b' ',
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_afm() {
        assert_eq!(char_width(' ', Font::Regular), 278);
        assert_eq!(char_width('A', Font::Regular), 667);
        assert_eq!(char_width('A', Font::Bold), 722);
        assert_eq!(char_width('i', Font::Oblique), 222);
        assert_eq!(char_width('~', Font::Regular), 584);
        // "Hello" = 722 + 556 + 222 + 222 + 556 = 2278 units
        assert!((text_width("Hello", Font::Regular, 10.0) - 22.78).abs() < 1e-3);
    }

    #[test]
    fn wrap_breaks_at_word_boundaries() {
        let lines = wrap("one two three four five", Font::Regular, 10.0, 50.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 50.0, "{line:?}");
        }
        assert_eq!(lines.join(" "), "one two three four five");
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap("  Gauze   roll ", Font::Regular, 9.0, 200.0), ["Gauze roll"]);
        assert!(wrap("", Font::Regular, 9.0, 200.0).is_empty());
        assert!(wrap("   ", Font::Regular, 9.0, 200.0).is_empty());
    }

    #[test]
    fn wrap_honours_newlines() {
        assert_eq!(wrap("a\nb", Font::Regular, 9.0, 200.0), ["a", "b"]);
    }

    #[test]
    fn wrap_breaks_overlong_words() {
        let word = "W".repeat(40);
        let lines = wrap(&word, Font::Regular, 10.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 50.0);
        }
    }

    #[test]
    fn win_ansi_maps_latin1_and_punctuation() {
        assert_eq!(encode_win_ansi("Café"), b"Caf\xE9");
        assert_eq!(encode_win_ansi("A – B • C"), b"A \x96 B \x95 C");
        assert_eq!(encode_win_ansi("日本"), b"??");
    }
}
