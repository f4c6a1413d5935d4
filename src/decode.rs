// src/decode.rs
use crate::models::{DecodedText, SourceEncoding};
use encoding_rs::UTF_16LE;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];

/// Bytes inspected when guessing UTF-16LE without a byte-order mark.
const UTF16_SNIFF_LEN: usize = 512;

/// Decode file bytes using the first encoding in `order` that succeeds.
///
/// Never fails: when no attempt works the bytes are decoded lossily with
/// U+FFFD replacement. Empty input gives empty text.
pub fn decode_bytes(bytes: &[u8], order: &[SourceEncoding]) -> DecodedText {
    // Nothing to sniff in an empty file.
    if bytes.is_empty() {
        return DecodedText {
            text: String::new(),
            encoding: None,
            lossy: false,
        };
    }

    for &encoding in order {
        if let Some(text) = try_decode(bytes, encoding) {
            return DecodedText {
                text,
                encoding: Some(encoding),
                lossy: false,
            };
        }
    }

    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: None,
        lossy: true,
    }
}

pub fn try_decode(bytes: &[u8], encoding: SourceEncoding) -> Option<String> {
    match encoding {
        SourceEncoding::Utf16Le => decode_utf16le(bytes),
        SourceEncoding::Utf8Bom => bytes
            .strip_prefix(UTF8_BOM)
            .and_then(|rest| std::str::from_utf8(rest).ok())
            .map(str::to_string),
        SourceEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
        SourceEncoding::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes).into_owned()),
    }
}

fn decode_utf16le(bytes: &[u8]) -> Option<String> {
    let body = match bytes.strip_prefix(UTF16LE_BOM) {
        Some(rest) => rest,
        None if looks_like_utf16le(bytes) => bytes,
        None => return None,
    };
    if body.len() % 2 != 0 {
        return None;
    }

    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
}

/// A BOM-less buffer is treated as UTF-16LE when most odd bytes of its prefix
/// are NUL, which is what ASCII-range text looks like in that encoding.
fn looks_like_utf16le(bytes: &[u8]) -> bool {
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return false;
    }
    let sample = &bytes[..bytes.len().min(UTF16_SNIFF_LEN)];
    let pairs = sample.len() / 2;
    let nul_high = sample.chunks_exact(2).filter(|pair| pair[1] == 0 && pair[0] != 0).count();
    nul_high * 2 > pairs
}
