use log::debug;

use crate::{Error, Result};

/// Universal tag numbers understood by the decoders.
pub mod tag {
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const BIT_STRING: u32 = 3;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const OID: u32 = 6;
    pub const UTF8_STRING: u32 = 12;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
    pub const PRINTABLE_STRING: u32 = 19;
    pub const T61_STRING: u32 = 20;
    pub const IA5_STRING: u32 = 22;
    pub const UTC_TIME: u32 = 23;
    pub const GENERALIZED_TIME: u32 = 24;
    pub const VISIBLE_STRING: u32 = 26;
}

const CONSTRUCTED: u8 = 0x20;
const HIGH_TAG_NUMBER: u8 = 0x1F;

/// Identifier class, X.690 8.1.2.2.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    fn from_identifier(byte: u8) -> Class {
        match byte >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::Context,
            _ => Class::Private,
        }
    }
}

/// A single decoded TLV.
///
/// The content is a view into the buffer the [`Parser`](crate::Parser) was
/// created over; a token never owns bytes. Equality compares class, tag,
/// primitivity and content, not the position the token was read from.
#[derive(Clone, Copy, Debug)]
pub struct Token<'a> {
    class: Class,
    tag: u32,
    primitive: bool,
    data: &'a [u8],
    end: usize,
}

impl<'a> Token<'a> {
    pub(crate) fn new(class: Class, tag: u32, primitive: bool, data: &'a [u8], end: usize) -> Self {
        Token {
            class,
            tag,
            primitive,
            data,
            end,
        }
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive
    }

    pub fn is_constructed(&self) -> bool {
        !self.primitive
    }

    /// Number of content octets.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The content octets exactly as they appear in the input, e.g. for
    /// hashing a signed structure.
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }

    /// The content as an `untrusted::Input`, for callers that keep reading it
    /// with their own `untrusted` based decoders.
    pub fn input(&self) -> untrusted::Input<'a> {
        untrusted::Input::from(self.data)
    }

    /// Offset just past the content within the parser's buffer.
    pub(crate) fn end(&self) -> usize {
        self.end
    }

    pub fn is(&self, class: Class, tag: u32) -> bool {
        self.class == class && self.tag == tag
    }

    pub fn is_sequence(&self) -> bool {
        self.is(Class::Universal, tag::SEQUENCE)
    }

    pub fn is_set(&self) -> bool {
        self.is(Class::Universal, tag::SET)
    }

    pub fn is_oid(&self) -> bool {
        self.is(Class::Universal, tag::OID)
    }

    pub fn is_int(&self) -> bool {
        self.is(Class::Universal, tag::INTEGER)
    }

    pub fn is_bool(&self) -> bool {
        self.is(Class::Universal, tag::BOOLEAN)
    }

    /// True for the universal string types [`string`](crate::string) accepts.
    pub fn is_string(&self) -> bool {
        self.class == Class::Universal
            && matches!(
                self.tag,
                tag::UTF8_STRING
                    | tag::PRINTABLE_STRING
                    | tag::T61_STRING
                    | tag::IA5_STRING
                    | tag::VISIBLE_STRING
            )
    }

    pub fn is_time(&self) -> bool {
        self.class == Class::Universal
            && (self.tag == tag::UTC_TIME || self.tag == tag::GENERALIZED_TIME)
    }

    /// Checks the identifier of a token a decoder is about to interpret.
    pub(crate) fn expect_primitive(&self, tag: u32) -> Result<()> {
        if self.primitive && self.is(Class::Universal, tag) {
            Ok(())
        } else {
            Err(Error::Invalid)
        }
    }
}

impl<'a, 'b> PartialEq<Token<'b>> for Token<'a> {
    fn eq(&self, other: &Token<'b>) -> bool {
        self.class == other.class
            && self.tag == other.tag
            && self.primitive == other.primitive
            && self.data == other.data
    }
}

impl<'a> Eq for Token<'a> {}

/// Human readable name of a type, `"UNKNOWN"` for anything but the universal
/// types listed in [`tag`].
pub fn type_name(class: Class, tag: u32) -> &'static str {
    if class != Class::Universal {
        return "UNKNOWN";
    }

    match tag {
        tag::BOOLEAN => "BOOLEAN",
        tag::INTEGER => "INTEGER",
        tag::BIT_STRING => "BIT STRING",
        tag::OCTET_STRING => "OCTET STRING",
        tag::NULL => "NULL",
        tag::OID => "OBJECT IDENTIFIER",
        tag::UTF8_STRING => "UTF8String",
        tag::SEQUENCE => "SEQUENCE",
        tag::SET => "SET",
        tag::PRINTABLE_STRING => "PrintableString",
        tag::T61_STRING => "T61String",
        tag::IA5_STRING => "IA5String",
        tag::UTC_TIME => "UTCTime",
        tag::GENERALIZED_TIME => "GeneralizedTime",
        tag::VISIBLE_STRING => "VisibleString",
        _ => "UNKNOWN",
    }
}

/// Identifier and length of a TLV, as read by [`read_header`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Header {
    pub class: Class,
    pub tag: u32,
    pub primitive: bool,
    pub length: usize,
}

pub(crate) fn read_header(input: &mut untrusted::Reader<'_>) -> Result<Header> {
    let first = input.read_byte()?;
    let class = Class::from_identifier(first);
    let primitive = first & CONSTRUCTED == 0;

    let tag = match first & HIGH_TAG_NUMBER {
        HIGH_TAG_NUMBER => read_high_tag_number(input)?,
        n => u32::from(n),
    };

    let length = read_length(input)?;

    Ok(Header {
        class,
        tag,
        primitive,
        length,
    })
}

// Base-128 big-endian, high bit marks continuation.
fn read_high_tag_number(input: &mut untrusted::Reader<'_>) -> Result<u32> {
    let mut byte = input.read_byte()?;
    if byte == 0x80 {
        // leading zero group
        return Err(Error::Invalid);
    }

    let mut tag: u32 = 0;
    loop {
        tag = match tag.checked_mul(128) {
            Some(t) => t | u32::from(byte & 0x7F),
            None => {
                debug!("tag number does not fit in 32 bits");
                return Err(Error::Unsupported);
            }
        };

        if byte & 0x80 == 0 {
            break;
        }
        byte = input.read_byte()?;
    }

    if tag < u32::from(HIGH_TAG_NUMBER) {
        // should have used the low tag number form
        return Err(Error::Invalid);
    }

    Ok(tag)
}

// If the high order bit of the first byte is clear the length is encoded in
// the remaining seven bits. Otherwise those bits count the big-endian length
// octets that follow.
fn read_length(input: &mut untrusted::Reader<'_>) -> Result<usize> {
    let first = input.read_byte()?;
    if first & 0x80 == 0 {
        return Ok(usize::from(first));
    }

    let num_bytes = first & 0x7F;
    match num_bytes {
        0 => {
            debug!("indefinite length form is not allowed in DER");
            return Err(Error::Unsupported);
        }
        0x7F => return Err(Error::Invalid),
        _ => {}
    }

    let mut length: usize = 0;
    for i in 0..num_bytes {
        let byte = input.read_byte()?;
        if i == 0 && byte == 0 {
            return Err(Error::Invalid);
        }

        length = match length.checked_mul(256) {
            Some(l) => l | usize::from(byte),
            None => {
                debug!("length does not fit in usize");
                return Err(Error::Unsupported);
            }
        };
    }

    if length < 0x80 {
        // should have used the short form
        return Err(Error::Invalid);
    }

    Ok(length)
}
