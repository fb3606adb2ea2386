//! Textual headers and the two SEG Y codepages.
//!
//! # Card images
//! A textual header is a fixed 3200-byte record of forty 80-character
//! "card image" lines, encoded as either ASCII or EBCDIC codepage 037.
//! There is no line terminator between cards in the reel header; extended
//! textual headers conventionally end each card with CR LF inside its 80
//! bytes, leaving 78 content columns.
//!
//! # Extended header termination
//! When the reel header declares -1 extended headers, the sequence is
//! terminated by a record whose first card carries the `((SEG: EndText))`
//! stanza.  That record is a terminator, not content.
//!
//! CP037 is carried here as data tables; decoding EBCDIC is total (every
//! byte maps to a character), while ASCII decoding rejects bytes above
//! 0x7F under the strict policy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegYError};

pub const CARD_LENGTH: usize = 80;
pub const CARDS_PER_HEADER: usize = 40;
pub const TEXTUAL_HEADER_LEN: usize = CARD_LENGTH * CARDS_PER_HEADER;

/// Stanza marking the final extended textual header.
pub const END_TEXT_STANZA: &str = "((SEG: EndText))";
/// Conventional last-card marker for Revision 1 headers.
pub const END_TEXTUAL_HEADER: &str = "END TEXTUAL HEADER";
/// Conventional last-card marker for Revision 0 headers.
pub const END_EBCDIC: &str = "END EBCDIC";

/// Text encoding of the textual and extended headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    Ascii,
    Ebcdic,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextEncoding::Ascii => "ascii",
            TextEncoding::Ebcdic => "ebcdic",
        })
    }
}

/// What to do with bytes that do not decode under the chosen encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPolicy {
    /// Fail with an encoding error naming the byte and offset.
    #[default]
    Strict,
    /// Substitute U+FFFD and carry on.
    Replace,
}

// CP037 -> Unicode, all 256 byte values.
const CP037_TO_CHAR: [char; 256] = [
    '\u{00}', '\u{01}', '\u{02}', '\u{03}', '\u{9C}', '\t', '\u{86}', '\u{7F}',
    '\u{97}', '\u{8D}', '\u{8E}', '\u{0B}', '\u{0C}', '\r', '\u{0E}', '\u{0F}',
    '\u{10}', '\u{11}', '\u{12}', '\u{13}', '\u{9D}', '\u{85}', '\u{08}', '\u{87}',
    '\u{18}', '\u{19}', '\u{92}', '\u{8F}', '\u{1C}', '\u{1D}', '\u{1E}', '\u{1F}',
    '\u{80}', '\u{81}', '\u{82}', '\u{83}', '\u{84}', '\n', '\u{17}', '\u{1B}',
    '\u{88}', '\u{89}', '\u{8A}', '\u{8B}', '\u{8C}', '\u{05}', '\u{06}', '\u{07}',
    '\u{90}', '\u{91}', '\u{16}', '\u{93}', '\u{94}', '\u{95}', '\u{96}', '\u{04}',
    '\u{98}', '\u{99}', '\u{9A}', '\u{9B}', '\u{14}', '\u{15}', '\u{9E}', '\u{1A}',
    ' ', '\u{A0}', 'â', 'ä', 'à', 'á', 'ã', 'å',
    'ç', 'ñ', '¢', '.', '<', '(', '+', '|',
    '&', 'é', 'ê', 'ë', 'è', 'í', 'î', 'ï',
    'ì', 'ß', '!', '$', '*', ')', ';', '¬',
    '-', '/', 'Â', 'Ä', 'À', 'Á', 'Ã', 'Å',
    'Ç', 'Ñ', '¦', ',', '%', '_', '>', '?',
    'ø', 'É', 'Ê', 'Ë', 'È', 'Í', 'Î', 'Ï',
    'Ì', '`', ':', '#', '@', '\'', '=', '"',
    'Ø', 'a', 'b', 'c', 'd', 'e', 'f', 'g',
    'h', 'i', '«', '»', 'ð', 'ý', 'þ', '±',
    '°', 'j', 'k', 'l', 'm', 'n', 'o', 'p',
    'q', 'r', 'ª', 'º', 'æ', '¸', 'Æ', '¤',
    'µ', '~', 's', 't', 'u', 'v', 'w', 'x',
    'y', 'z', '¡', '¿', 'Ð', 'Ý', 'Þ', '®',
    '^', '£', '¥', '·', '©', '§', '¶', '¼',
    '½', '¾', '[', ']', '¯', '¨', '´', '×',
    '{', 'A', 'B', 'C', 'D', 'E', 'F', 'G',
    'H', 'I', '\u{AD}', 'ô', 'ö', 'ò', 'ó', 'õ',
    '}', 'J', 'K', 'L', 'M', 'N', 'O', 'P',
    'Q', 'R', '¹', 'û', 'ü', 'ù', 'ú', 'ÿ',
    '\\', '÷', 'S', 'T', 'U', 'V', 'W', 'X',
    'Y', 'Z', '²', 'Ô', 'Ö', 'Ò', 'Ó', 'Õ',
    '0', '1', '2', '3', '4', '5', '6', '7',
    '8', '9', '³', 'Û', 'Ü', 'Ù', 'Ú', '\u{9F}',
];

// ASCII -> CP037 for the 7-bit range; everything else goes through a table
// scan on encode.
const ASCII_TO_CP037: [u8; 128] = [
    0x00, 0x01, 0x02, 0x03, 0x37, 0x2D, 0x2E, 0x2F,
    0x16, 0x05, 0x25, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
    0x10, 0x11, 0x12, 0x13, 0x3C, 0x3D, 0x32, 0x26,
    0x18, 0x19, 0x3F, 0x27, 0x1C, 0x1D, 0x1E, 0x1F,
    0x40, 0x5A, 0x7F, 0x7B, 0x5B, 0x6C, 0x50, 0x7D,
    0x4D, 0x5D, 0x5C, 0x4E, 0x6B, 0x60, 0x4B, 0x61,
    0xF0, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7,
    0xF8, 0xF9, 0x7A, 0x5E, 0x4C, 0x7E, 0x6E, 0x6F,
    0x7C, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7,
    0xC8, 0xC9, 0xD1, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6,
    0xD7, 0xD8, 0xD9, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6,
    0xE7, 0xE8, 0xE9, 0xBA, 0xE0, 0xBB, 0xB0, 0x6D,
    0x79, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96,
    0x97, 0x98, 0x99, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6,
    0xA7, 0xA8, 0xA9, 0xC0, 0x4F, 0xD0, 0xA1, 0x07,
];

fn encode_char(ch: char, encoding: TextEncoding) -> Result<u8> {
    match encoding {
        TextEncoding::Ascii => {
            let code = u32::from(ch);
            if code < 0x80 {
                Ok(code as u8)
            } else {
                Err(SegYError::Unencodable { encoding, ch })
            }
        }
        TextEncoding::Ebcdic => {
            let code = u32::from(ch);
            if code < 0x80 {
                Ok(ASCII_TO_CP037[code as usize])
            } else {
                CP037_TO_CHAR
                    .iter()
                    .position(|&t| t == ch)
                    .map(|i| i as u8)
                    .ok_or(SegYError::Unencodable { encoding, ch })
            }
        }
    }
}

fn decode_line(
    bytes: &[u8],
    encoding: TextEncoding,
    policy: TextPolicy,
    offset: u64,
) -> Result<String> {
    match encoding {
        TextEncoding::Ascii => {
            let mut line = String::with_capacity(bytes.len());
            for (i, &b) in bytes.iter().enumerate() {
                if b < 0x80 {
                    line.push(b as char);
                } else {
                    match policy {
                        TextPolicy::Strict => {
                            return Err(SegYError::Encoding {
                                encoding,
                                byte: b,
                                offset: offset + i as u64,
                            })
                        }
                        TextPolicy::Replace => line.push('\u{FFFD}'),
                    }
                }
            }
            Ok(line)
        }
        TextEncoding::Ebcdic => Ok(bytes.iter().map(|&b| CP037_TO_CHAR[b as usize]).collect()),
    }
}

/// One 3200-byte textual header: forty lines of exactly eighty characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextualHeader {
    lines: Vec<String>,
}

impl TextualHeader {
    /// A header of all spaces.
    pub fn blank() -> Self {
        TextualHeader {
            lines: vec![" ".repeat(CARD_LENGTH); CARDS_PER_HEADER],
        }
    }

    /// Build from free-form lines: short or missing lines are padded with
    /// spaces, long lines and excess lines are truncated.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fixed: Vec<String> = lines
            .into_iter()
            .take(CARDS_PER_HEADER)
            .map(|line| {
                let mut owned: String = line.as_ref().chars().take(CARD_LENGTH).collect();
                let short = CARD_LENGTH - owned.chars().count();
                for _ in 0..short {
                    owned.push(' ');
                }
                owned
            })
            .collect();
        while fixed.len() < CARDS_PER_HEADER {
            fixed.push(" ".repeat(CARD_LENGTH));
        }
        TextualHeader { lines: fixed }
    }

    /// Decode a raw 3200-byte record. `offset` is the record's absolute
    /// file position, used in error messages.
    pub fn decode(
        raw: &[u8],
        encoding: TextEncoding,
        policy: TextPolicy,
        offset: u64,
    ) -> Result<Self> {
        debug_assert_eq!(raw.len(), TEXTUAL_HEADER_LEN);
        let mut lines = Vec::with_capacity(CARDS_PER_HEADER);
        for (i, card) in raw.chunks_exact(CARD_LENGTH).enumerate() {
            lines.push(decode_line(
                card,
                encoding,
                policy,
                offset + (i * CARD_LENGTH) as u64,
            )?);
        }
        Ok(TextualHeader { lines })
    }

    /// Encode to the raw 3200 bytes.
    pub fn encode(&self, encoding: TextEncoding) -> Result<Vec<u8>> {
        let mut raw = Vec::with_capacity(TEXTUAL_HEADER_LEN);
        for line in &self.lines {
            for ch in line.chars() {
                raw.push(encode_char(ch, encoding)?);
            }
        }
        debug_assert_eq!(raw.len(), TEXTUAL_HEADER_LEN);
        Ok(raw)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when the first card carries the end-text stanza.
    pub fn has_end_text_stanza(&self) -> bool {
        self.lines[0].contains(END_TEXT_STANZA)
    }
}

/// Format free text into extended-header pages: 78 content columns per
/// card, CR LF terminated, forty cards per page.  Overlong source lines
/// wrap; the optional terminator page carries the end-text stanza.
pub fn format_extended_text(text: &str, include_end_stanza: bool) -> Vec<TextualHeader> {
    const WIDTH: usize = CARD_LENGTH - 2;

    let mut cards: Vec<String> = Vec::new();
    for source in text.lines() {
        let chars: Vec<char> = source.chars().collect();
        if chars.is_empty() {
            cards.push(terminated_card("", WIDTH));
        }
        for chunk in chars.chunks(WIDTH) {
            cards.push(terminated_card(&chunk.iter().collect::<String>(), WIDTH));
        }
    }

    let mut pages: Vec<TextualHeader> = cards
        .chunks(CARDS_PER_HEADER)
        .map(TextualHeader::from_lines)
        .collect();
    if include_end_stanza {
        pages.push(end_text_stanza_page());
    }
    pages
}

/// The terminator page: the end-text stanza on the first card, blanks after.
pub fn end_text_stanza_page() -> TextualHeader {
    TextualHeader::from_lines([terminated_card(END_TEXT_STANZA, CARD_LENGTH - 2)])
}

fn terminated_card(content: &str, width: usize) -> String {
    let mut card = String::with_capacity(CARD_LENGTH);
    card.push_str(content);
    for _ in content.chars().count()..width {
        card.push(' ');
    }
    card.push('\r');
    card.push('\n');
    card
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codepage_tables_are_inverse() {
        for code in 0u8..=0x7F {
            let ebcdic = ASCII_TO_CP037[code as usize];
            assert_eq!(
                CP037_TO_CHAR[ebcdic as usize] as u32,
                u32::from(code),
                "ascii {code:#04x} does not survive the ebcdic round trip"
            );
        }
    }

    #[test]
    fn well_known_ebcdic_values() {
        assert_eq!(encode_char(' ', TextEncoding::Ebcdic).unwrap(), 0x40);
        assert_eq!(encode_char('A', TextEncoding::Ebcdic).unwrap(), 0xC1);
        assert_eq!(encode_char('0', TextEncoding::Ebcdic).unwrap(), 0xF0);
        assert_eq!(CP037_TO_CHAR[0xD1], 'J');
        assert_eq!(CP037_TO_CHAR[0xA2], 's');
    }

    #[test]
    fn ascii_strict_rejects_high_bytes() {
        let mut raw = vec![b' '; TEXTUAL_HEADER_LEN];
        raw[83] = 0xC1;
        let err = TextualHeader::decode(&raw, TextEncoding::Ascii, TextPolicy::Strict, 0);
        match err {
            Err(SegYError::Encoding { byte, offset, .. }) => {
                assert_eq!(byte, 0xC1);
                assert_eq!(offset, 83);
            }
            other => panic!("expected encoding error, got {other:?}"),
        }

        let replaced =
            TextualHeader::decode(&raw, TextEncoding::Ascii, TextPolicy::Replace, 0).unwrap();
        assert!(replaced.lines()[1].starts_with("   \u{FFFD}"));
    }

    #[test]
    fn ebcdic_header_round_trips() {
        let header = TextualHeader::from_lines(["C 1 CLIENT SIXTY NORTH", "C 2 LINE 42"]);
        let raw = header.encode(TextEncoding::Ebcdic).unwrap();
        assert_eq!(raw.len(), TEXTUAL_HEADER_LEN);
        assert_eq!(raw[0], 0xC3); // 'C'
        let back =
            TextualHeader::decode(&raw, TextEncoding::Ebcdic, TextPolicy::Strict, 0).unwrap();
        assert_eq!(back, header);
    }

    #[test]
    fn from_lines_pads_and_truncates() {
        let long = "x".repeat(200);
        let header = TextualHeader::from_lines([long.as_str(), "short"]);
        assert_eq!(header.lines().len(), CARDS_PER_HEADER);
        assert_eq!(header.lines()[0].chars().count(), CARD_LENGTH);
        assert!(header.lines()[0].chars().all(|c| c == 'x'));
        assert_eq!(&header.lines()[1][..5], "short");
        assert_eq!(header.lines()[1].chars().count(), CARD_LENGTH);
        assert_eq!(header.lines()[39], " ".repeat(CARD_LENGTH));
    }

    #[test]
    fn end_stanza_detection() {
        assert!(!TextualHeader::blank().has_end_text_stanza());
        let last = TextualHeader::from_lines([END_TEXT_STANZA]);
        assert!(last.has_end_text_stanza());
    }

    #[test]
    fn extended_text_wraps_and_terminates() {
        let text = format!("{}\nsecond line", "a".repeat(100));
        let pages = format_extended_text(&text, true);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].lines()[0].starts_with(&"a".repeat(78)));
        assert!(pages[0].lines()[0].ends_with("\r\n"));
        assert!(pages[0].lines()[1].starts_with(&"a".repeat(22)));
        assert!(pages[0].lines()[2].starts_with("second line"));
        assert!(pages[1].has_end_text_stanza());
    }
}
