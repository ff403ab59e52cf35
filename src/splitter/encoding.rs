//! Candidate-encoding decoding and lossy re-encoding.
//!
//! Everything here works on byte slices and strings only, so it can be tested
//! without touching the filesystem.

use crate::error::{Result, SplitError};
use encoding_rs::{EncoderResult, Encoding, UTF_16BE, UTF_16LE};

/// Written in place of characters the target encoding cannot represent.
pub const ENCODE_PLACEHOLDER: u8 = b'?';

/// Text decoded with one of the candidate encodings.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
    /// Malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

/// Resolves a WHATWG label, rejecting encodings halves cannot be written in.
pub fn resolve_label(label: &str) -> Result<&'static Encoding> {
    let encoding =
        Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| SplitError::UnknownEncoding {
            label: label.to_string(),
        })?;

    if !is_writable(encoding) {
        return Err(SplitError::UnsupportedEncoding {
            label: label.to_string(),
            encoding: encoding.name().to_string(),
        });
    }

    Ok(encoding)
}

/// True when text decoded with `encoding` can be encoded back into it.
///
/// encoding_rs has no encoder for UTF-16, so those are written by
/// [`encode_lossy`] itself. The `replacement` encoding decodes every input to
/// a single U+FFFD and can never be written back.
pub fn is_writable(encoding: &'static Encoding) -> bool {
    encoding.output_encoding() == encoding || encoding == UTF_16LE || encoding == UTF_16BE
}

/// Decodes `bytes`, returning `None` if any sequence is malformed.
///
/// No BOM sniffing is done, so a leading BOM stays part of the text and is
/// written back unchanged.
pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// Decodes `bytes`, replacing malformed sequences with U+FFFD.
pub fn decode_lossy(bytes: &[u8], encoding: &'static Encoding) -> (String, bool) {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    (text.into_owned(), had_errors)
}

/// Tries each candidate in order and returns the first clean decode.
///
/// When no candidate decodes cleanly and `allow_lossy` is set, the first
/// candidate is used with replacement characters.
pub fn detect(
    bytes: &[u8],
    candidates: &[&'static Encoding],
    allow_lossy: bool,
) -> Option<Decoded> {
    let candidates: Vec<&'static Encoding> = candidates
        .iter()
        .copied()
        .filter(|&encoding| is_writable(encoding))
        .collect();

    for &encoding in &candidates {
        if let Some(text) = decode_strict(bytes, encoding) {
            return Some(Decoded {
                text,
                encoding,
                lossy: false,
            });
        }
    }

    if !allow_lossy {
        return None;
    }

    candidates.first().map(|&encoding| {
        let (text, lossy) = decode_lossy(bytes, encoding);
        Decoded {
            text,
            encoding,
            lossy,
        }
    })
}

/// Encodes `text`, writing [`ENCODE_PLACEHOLDER`] for unmappable characters.
///
/// Returns the bytes and whether any placeholder was written.
pub fn encode_lossy(text: &str, encoding: &'static Encoding) -> (Vec<u8>, bool) {
    if encoding == UTF_16LE {
        return (encode_utf16(text, u16::to_le_bytes), false);
    }
    if encoding == UTF_16BE {
        return (encode_utf16(text, u16::to_be_bytes), false);
    }

    let mut encoder = encoding.new_encoder();
    let mut output = Vec::with_capacity(
        encoder
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .unwrap_or(text.len()),
    );
    let mut remaining = text;
    let mut replaced = false;

    loop {
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut output, true);
        remaining = &remaining[read..];

        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {
                let needed = encoder
                    .max_buffer_length_from_utf8_without_replacement(remaining.len())
                    .unwrap_or(remaining.len() * 4 + 16);
                output.reserve(needed.max(16));
            }
            EncoderResult::Unmappable(_) => {
                output.push(ENCODE_PLACEHOLDER);
                replaced = true;
            }
        }
    }

    (output, replaced)
}

// Every char has a UTF-16 form, so nothing is ever replaced here.
fn encode_utf16(text: &str, to_bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
    let mut output = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        output.extend_from_slice(&to_bytes(unit));
    }
    output
}
