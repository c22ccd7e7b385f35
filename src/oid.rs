//! Object identifiers with a fixed arc capacity.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

use crate::der::{tag, Token};
use crate::{Error, Result};

/// Maximum number of arcs an [`Oid`] holds.
pub const OID_MAX_ARCS: usize = 12;

/// A decoded object identifier.
///
/// Ordering is lexicographic by arc, a strict prefix sorting first.
#[derive(Clone, Copy)]
pub struct Oid {
    arcs: [u32; OID_MAX_ARCS],
    len: usize,
}

impl Oid {
    /// An OID without any arcs.
    pub fn new() -> Self {
        Oid {
            arcs: [0; OID_MAX_ARCS],
            len: 0,
        }
    }

    pub fn from_arcs(arcs: &[u32]) -> Result<Self> {
        let mut oid = Oid::new();
        for arc in arcs {
            oid.push(*arc)?;
        }
        Ok(oid)
    }

    /// Decode the content of an OBJECT IDENTIFIER token.
    pub fn from_token(token: &Token<'_>) -> Result<Self> {
        token.expect_primitive(tag::OID)?;

        token.input().read_all(Error::Invalid, |input| {
            let mut oid = Oid::new();

            // the first two arcs share one subidentifier
            let first = read_subidentifier(input)?;
            if first < 80 {
                oid.push(first / 40)?;
                oid.push(first % 40)?;
            } else {
                oid.push(2)?;
                oid.push(first - 80)?;
            }

            while !input.at_end() {
                oid.push(read_subidentifier(input)?)?;
            }
            Ok(oid)
        })
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if the arcs are exactly `arcs`, in order.
    pub fn eq_arcs(&self, arcs: &[u32]) -> bool {
        self.arcs() == arcs
    }

    /// Render as dotted decimal into `buf`, followed by a `0` terminator.
    ///
    /// Nothing is written unless the whole rendering fits.
    pub fn write_dotted<'b>(&self, buf: &'b mut [u8]) -> Result<&'b str> {
        let needed = self.dotted_len();
        if buf.len() < needed + 1 {
            return Err(Error::Memory);
        }

        let mut pos = 0;
        for (i, arc) in self.arcs().iter().enumerate() {
            if i > 0 {
                buf[pos] = b'.';
                pos += 1;
            }

            let width = decimal_len(*arc);
            let mut value = *arc;
            for slot in buf[pos..pos + width].iter_mut().rev() {
                *slot = b'0' + (value % 10) as u8;
                value /= 10;
            }
            pos += width;
        }
        buf[pos] = 0;

        core::str::from_utf8(&buf[..pos]).map_err(|_| Error::Invalid)
    }

    fn dotted_len(&self) -> usize {
        let digits: usize = self.arcs().iter().map(|arc| decimal_len(*arc)).sum();
        digits + self.len.saturating_sub(1)
    }

    fn push(&mut self, arc: u32) -> Result<()> {
        if self.len == OID_MAX_ARCS {
            return Err(Error::Memory);
        }
        self.arcs[self.len] = arc;
        self.len += 1;
        Ok(())
    }
}

// Base-128 big-endian, high bit marks continuation.
fn read_subidentifier(input: &mut untrusted::Reader<'_>) -> Result<u32> {
    let mut byte = input.read_byte()?;
    if byte == 0x80 {
        return Err(Error::Invalid);
    }

    let mut value: u32 = 0;
    loop {
        value = match value.checked_mul(128) {
            Some(v) => v | u32::from(byte & 0x7F),
            None => return Err(Error::Memory),
        };
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        byte = input.read_byte()?;
    }
}

fn decimal_len(mut value: u32) -> usize {
    let mut len = 1;
    while value >= 10 {
        value /= 10;
        len += 1;
    }
    len
}

impl Default for Oid {
    fn default() -> Self {
        Oid::new()
    }
}

impl PartialEq for Oid {
    fn eq(&self, other: &Oid) -> bool {
        self.arcs() == other.arcs()
    }
}

impl Eq for Oid {}

impl PartialEq<[u32]> for Oid {
    fn eq(&self, other: &[u32]) -> bool {
        self.eq_arcs(other)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Oid) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Oid) -> Ordering {
        self.arcs().cmp(other.arcs())
    }
}

impl Hash for Oid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arcs().hash(state)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs().iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut oid = Oid::new();
        for component in s.split('.') {
            if component.is_empty() {
                return Err(Error::Invalid);
            }

            let mut arc: u32 = 0;
            for b in component.bytes() {
                if !b.is_ascii_digit() {
                    return Err(Error::Invalid);
                }
                arc = arc
                    .checked_mul(10)
                    .and_then(|a| a.checked_add(u32::from(b - b'0')))
                    .ok_or(Error::Memory)?;
            }
            oid.push(arc)?;
        }
        Ok(oid)
    }
}
