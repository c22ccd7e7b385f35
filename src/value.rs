//! Decoders for primitive universal types.
//!
//! Each decoder checks that the token carries the expected universal tag in
//! primitive form before looking at the content. Output slices are only
//! written once the whole input has been validated.

use crate::der::{tag, Token};
use crate::{Error, Result};

// Widest integer the decoders accumulate into.
const MAX_INT_BYTES: usize = 16;

/// DER boolean: a single `0x00` or `0xFF`.
pub fn boolean(token: &Token<'_>) -> Result<bool> {
    match boolean_byte(token)? {
        0x00 => Ok(false),
        0xFF => Ok(true),
        _ => Err(Error::Invalid),
    }
}

/// BER boolean: a single byte, anything but `0x00` is true.
pub fn boolean_unsafe(token: &Token<'_>) -> Result<bool> {
    Ok(boolean_byte(token)? != 0)
}

fn boolean_byte(token: &Token<'_>) -> Result<u8> {
    token.expect_primitive(tag::BOOLEAN)?;
    match token.raw() {
        [byte] => Ok(*byte),
        _ => Err(Error::Invalid),
    }
}

/// Strict integer decoding.
///
/// Multi-octet content may not start with `0x00`, nor with `0xFF` followed by
/// an octet whose top bit is set. Positive values whose top content bit would
/// need a clearing zero octet are therefore only accepted by [`int_unsafe`].
/// Fails with [`Error::Memory`] when the value does not fit in `T`.
pub fn int<T: TryFrom<i128>>(token: &Token<'_>) -> Result<T> {
    token.expect_primitive(tag::INTEGER)?;
    let bytes = token.raw();
    if bytes.len() > 1 && (bytes[0] == 0x00 || is_redundant_sign_byte(bytes[0], bytes[1])) {
        return Err(Error::Invalid);
    }
    narrow(bytes)
}

/// Like [`int`] but tolerates leading `0x00`/`0xFF` octets, stripping the
/// ones that do not change the value.
pub fn int_unsafe<T: TryFrom<i128>>(token: &Token<'_>) -> Result<T> {
    token.expect_primitive(tag::INTEGER)?;
    let mut bytes = token.raw();
    while bytes.len() > 1 && is_redundant_sign_byte(bytes[0], bytes[1]) {
        bytes = &bytes[1..];
    }
    narrow(bytes)
}

fn is_redundant_sign_byte(first: u8, second: u8) -> bool {
    (first == 0x00 && second & 0x80 == 0) || (first == 0xFF && second & 0x80 != 0)
}

fn narrow<T: TryFrom<i128>>(bytes: &[u8]) -> Result<T> {
    let first = match bytes.first() {
        Some(b) => *b,
        None => return Err(Error::Invalid),
    };
    if bytes.len() > MAX_INT_BYTES {
        return Err(Error::Memory);
    }

    let mut value: i128 = if first & 0x80 != 0 { -1 } else { 0 };
    for b in bytes {
        value = (value << 8) | i128::from(*b);
    }

    T::try_from(value).map_err(|_| Error::Memory)
}

/// Copy the content of a character string into `buf`, followed by a `0`
/// terminator.
///
/// Returns the copied octets without the terminator. They are valid UTF-8
/// for every kind but T61String, whose 8-bit octets are passed through as
/// they are; [`string_str`] is the variant for callers that need text.
pub fn string<'b>(token: &Token<'_>, buf: &'b mut [u8]) -> Result<&'b [u8]> {
    let bytes = validated(token)?;
    let len = bytes.len();
    if buf.len() < len + 1 {
        return Err(Error::Memory);
    }

    buf[..len].copy_from_slice(bytes);
    buf[len] = 0;
    Ok(&buf[..len])
}

/// Like [`string`] but also requires the content to be UTF-8.
pub fn string_str<'b>(token: &Token<'_>, buf: &'b mut [u8]) -> Result<&'b str> {
    if core::str::from_utf8(validated(token)?).is_err() {
        return Err(Error::Invalid);
    }
    let bytes = string(token, buf)?;
    core::str::from_utf8(bytes).map_err(|_| Error::Invalid)
}

/// True when `token` is a valid character string whose octets equal
/// `expected`.
pub fn string_eq(token: &Token<'_>, expected: &str) -> bool {
    validated(token).map_or(false, |bytes| bytes == expected.as_bytes())
}

fn validated<'a>(token: &Token<'a>) -> Result<&'a [u8]> {
    if !token.is_string() || !token.is_primitive() {
        return Err(Error::Invalid);
    }

    let bytes = token.raw();
    let allowed: fn(u8) -> bool = match token.tag() {
        tag::PRINTABLE_STRING => is_printable,
        tag::IA5_STRING => is_ia5,
        tag::VISIBLE_STRING => is_visible,
        _ => |b| b != 0,
    };
    if !bytes.iter().all(|b| allowed(*b)) {
        return Err(Error::Invalid);
    }

    if token.tag() == tag::UTF8_STRING && core::str::from_utf8(bytes).is_err() {
        return Err(Error::Invalid);
    }
    Ok(bytes)
}

// X.680 41.4
fn is_printable(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b" '()+,-./:=?".contains(&b)
}

fn is_ia5(b: u8) -> bool {
    b != 0 && b.is_ascii()
}

fn is_visible(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// Copy the bits of a bit string into `buf` and return the written bytes.
///
/// The first bit of the string ends up in the lowest order bit of the first
/// byte, i.e. each byte comes out with its bit order reversed:
///
/// ```text
/// | 0 1 2 3 4 5 6 7 | 8 9 ... |  ->  | 7 6 5 4 3 2 1 0 | ... 9 8 |
/// ```
///
/// Reassembling bytes into wider flag words is left to the caller.
pub fn bitstring<'b>(token: &Token<'_>, buf: &'b mut [u8]) -> Result<&'b [u8]> {
    token.expect_primitive(tag::BIT_STRING)?;

    let (unused, bits) = match token.raw().split_first() {
        Some((unused, bits)) => (*unused, bits),
        None => return Err(Error::Invalid),
    };
    if unused > 7 {
        return Err(Error::Invalid);
    }
    if unused > 0 {
        // DER requires the unused trailing bits to be zero
        match bits.last() {
            Some(last) if last & ((1 << unused) - 1) == 0 => {}
            _ => return Err(Error::Invalid),
        }
    }

    let out = match buf.get_mut(..bits.len()) {
        Some(out) => out,
        None => return Err(Error::Memory),
    };
    for (dst, src) in out.iter_mut().zip(bits) {
        *dst = src.reverse_bits();
    }
    Ok(out)
}
