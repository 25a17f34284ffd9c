//! Format sniffing for delimited text files
//!
//! Classifies the text encoding of a file by its byte-order-mark signature
//! and infers the field delimiter from a bounded text sample. Both checks
//! run once per load; the results travel with the table as its source
//! descriptor and are reused verbatim on save.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of bytes read when classifying an encoding
const BOM_PREFIX_LEN: u64 = 4;

/// Number of characters inspected when inferring a delimiter
const SAMPLE_CHARS: usize = 2048;

/// Text encodings recognized by BOM signature
///
/// Absence of any recognized signature is classified as plain UTF-8,
/// never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8 without a BOM (the fallback classification)
    #[default]
    Utf8,
    /// UTF-8 with a BOM
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

impl Encoding {
    /// Classify a byte prefix by BOM signature
    ///
    /// The UTF-32LE signature begins with the UTF-16LE one, so the 4-byte
    /// forms must be checked before the 2-byte forms.
    pub fn detect(prefix: &[u8]) -> Self {
        let candidates = [
            Encoding::Utf32Le,
            Encoding::Utf32Be,
            Encoding::Utf8Bom,
            Encoding::Utf16Le,
            Encoding::Utf16Be,
        ];
        candidates
            .into_iter()
            .find(|encoding| prefix.starts_with(encoding.bom()))
            .unwrap_or(Encoding::Utf8)
    }

    /// The BOM signature this encoding writes (empty for plain UTF-8)
    pub fn bom(self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => &[],
            Encoding::Utf8Bom => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Utf32Le => &[0xFF, 0xFE, 0x00, 0x00],
            Encoding::Utf32Be => &[0x00, 0x00, 0xFE, 0xFF],
        }
    }

    /// Decode file bytes (including any leading BOM) into a string
    pub fn decode(self, bytes: &[u8]) -> Result<String, DecodeError> {
        let body = bytes.strip_prefix(self.bom()).unwrap_or(bytes);
        match self {
            Encoding::Utf8 | Encoding::Utf8Bom => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(body)
                .map(Cow::into_owned)
                .ok_or(DecodeError { encoding: self }),
            Encoding::Utf16Le => encoding_rs::UTF_16LE
                .decode_without_bom_handling_and_without_replacement(body)
                .map(Cow::into_owned)
                .ok_or(DecodeError { encoding: self }),
            Encoding::Utf16Be => encoding_rs::UTF_16BE
                .decode_without_bom_handling_and_without_replacement(body)
                .map(Cow::into_owned)
                .ok_or(DecodeError { encoding: self }),
            // encoding_rs carries no UTF-32; the code-point codec is trivial
            Encoding::Utf32Le | Encoding::Utf32Be => self.decode_utf32(body),
        }
    }

    /// Encode a string back to file bytes, re-emitting the original BOM
    pub fn encode(self, text: &str) -> Vec<u8> {
        let mut bytes = self.bom().to_vec();
        match self {
            Encoding::Utf8 | Encoding::Utf8Bom => bytes.extend_from_slice(text.as_bytes()),
            Encoding::Utf16Le => {
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
            }
            Encoding::Utf16Be => {
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
            }
            Encoding::Utf32Le => {
                for ch in text.chars() {
                    bytes.extend_from_slice(&(ch as u32).to_le_bytes());
                }
            }
            Encoding::Utf32Be => {
                for ch in text.chars() {
                    bytes.extend_from_slice(&(ch as u32).to_be_bytes());
                }
            }
        }
        bytes
    }

    fn decode_utf32(self, body: &[u8]) -> Result<String, DecodeError> {
        if body.len() % 4 != 0 {
            return Err(DecodeError { encoding: self });
        }
        let mut text = String::with_capacity(body.len() / 4);
        for unit in body.chunks_exact(4) {
            let value = match self {
                Encoding::Utf32Le => u32::from_le_bytes([unit[0], unit[1], unit[2], unit[3]]),
                _ => u32::from_be_bytes([unit[0], unit[1], unit[2], unit[3]]),
            };
            let ch = char::from_u32(value).ok_or(DecodeError { encoding: self })?;
            text.push(ch);
        }
        Ok(text)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf8Bom => "UTF-8 (BOM)",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf32Le => "UTF-32LE",
            Encoding::Utf32Be => "UTF-32BE",
        };
        write!(f, "{}", label)
    }
}

/// Bytes that are not valid under the detected encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub encoding: Encoding,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} byte sequence", self.encoding)
    }
}

impl std::error::Error for DecodeError {}

/// Classify the encoding of a file by reading its first few bytes
pub fn detect_encoding(path: &Path) -> io::Result<Encoding> {
    let mut prefix = Vec::with_capacity(BOM_PREFIX_LEN as usize);
    File::open(path)?
        .take(BOM_PREFIX_LEN)
        .read_to_end(&mut prefix)?;
    Ok(Encoding::detect(&prefix))
}

/// Supported field delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Colon,
    Tab,
    Pipe,
}

impl Delimiter {
    /// Candidate set considered during detection
    pub const CANDIDATES: [Delimiter; 5] = [
        Delimiter::Comma,
        Delimiter::Semicolon,
        Delimiter::Colon,
        Delimiter::Tab,
        Delimiter::Pipe,
    ];

    /// Get the character for this delimiter
    pub fn char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Colon => ':',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// The delimiter as a single byte, as the csv crate expects it
    pub fn byte(self) -> u8 {
        self.char() as u8
    }

    fn name(self) -> &'static str {
        match self {
            Delimiter::Comma => "comma",
            Delimiter::Semicolon => "semicolon",
            Delimiter::Colon => "colon",
            Delimiter::Tab => "tab",
            Delimiter::Pipe => "pipe",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// No candidate delimiter appeared consistently across the sampled lines
///
/// Callers surface this instead of defaulting: a wrong guess corrupts
/// every subsequent parse of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterDetectionError {
    pub lines_sampled: usize,
}

impl fmt::Display for DelimiterDetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not determine the field delimiter from {} sampled line(s); \
             tried comma, semicolon, colon, tab and pipe",
            self.lines_sampled
        )
    }
}

impl std::error::Error for DelimiterDetectionError {}

/// Infer the field delimiter from decoded file content
///
/// Inspects at most the first 2048 characters. A candidate is accepted only
/// when it occurs the same nonzero number of times on every sampled line,
/// counting occurrences outside double-quoted spans; among consistent
/// candidates the highest per-line count wins.
pub fn detect_delimiter(text: &str) -> Result<Delimiter, DelimiterDetectionError> {
    let (sample, truncated) = match text.char_indices().nth(SAMPLE_CHARS) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    };

    let mut lines: Vec<&str> = sample.lines().filter(|line| !line.trim().is_empty()).collect();
    if truncated {
        // The final sampled line may be cut mid-record
        lines.pop();
    }
    if lines.is_empty() {
        return Err(DelimiterDetectionError { lines_sampled: 0 });
    }

    let mut best: Option<(Delimiter, usize)> = None;
    for candidate in Delimiter::CANDIDATES {
        let mut per_line = lines.iter().map(|line| count_unquoted(line, candidate.char()));
        let first = per_line.next().unwrap_or(0);
        if first == 0 || !per_line.all(|count| count == first) {
            continue;
        }
        if best.map_or(true, |(_, count)| first > count) {
            best = Some((candidate, first));
        }
    }

    match best {
        Some((delimiter, count)) => {
            tracing::debug!(
                "detected {} delimiter ({} per line over {} lines)",
                delimiter,
                count,
                lines.len()
            );
            Ok(delimiter)
        }
        None => Err(DelimiterDetectionError {
            lines_sampled: lines.len(),
        }),
    }
}

/// Count occurrences of `delim` on one line, ignoring double-quoted spans
fn count_unquoted(line: &str, delim: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delim && !in_quotes {
            count += 1;
        }
    }
    count
}
