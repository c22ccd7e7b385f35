//! Bounded, zero-copy DER tokenizer.
//!
//! A [`Parser`] walks a caller-owned buffer one TLV at a time and hands out
//! [`Token`]s that borrow their content from that buffer. Nesting is entered
//! explicitly with [`Parser::descend`] and is capped at [`MAX_DEPTH`] levels,
//! so hostile input can never drive resource use past a fixed bound.
//!
//! Tokens are turned into values by the free decoders in this crate
//! ([`boolean`], [`int`], [`string`], [`string_str`], [`bitstring`],
//! [`time`]) and by [`Oid::from_token`]. None of them allocate.
//!
//! ```
//! use dertok::{int, Parser};
//!
//! // SEQUENCE { INTEGER 5, INTEGER -1 }
//! let der = [0x30, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0xff];
//! let mut parser = Parser::new(&der);
//!
//! let seq = parser.next().unwrap();
//! assert!(seq.is_sequence());
//! parser.descend().unwrap();
//!
//! let mut sum = 0i32;
//! while !parser.eot(&seq) {
//!     sum += int::<i32>(&parser.next().unwrap()).unwrap();
//! }
//! parser.ascend(1).unwrap();
//!
//! assert_eq!(sum, 4);
//! assert!(parser.eof());
//! ```

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

mod der;
mod oid;
mod parser;
mod time;
mod value;

pub use der::{tag, type_name, Class, Token};
pub use oid::{Oid, OID_MAX_ARCS};
pub use parser::{Parser, MAX_DEPTH};
pub use time::time;
pub use value::{
    bitstring, boolean, boolean_unsafe, int, int_unsafe, string, string_eq, string_str,
};

/// Result codes shared by every operation in this crate and by layers built
/// on top of it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The input violates DER syntax or a canonical-form rule.
    #[error("invalid DER encoding")]
    Invalid,
    /// A fixed capacity was exceeded: output buffer, nesting depth or OID arcs.
    #[error("capacity exceeded")]
    Memory,
    /// A recognized BER feature that is deliberately not implemented.
    #[error("unsupported encoding")]
    Unsupported,
    /// Reserved for trust decisions made by callers.
    #[error("untrusted")]
    Untrusted,
    /// Reserved for validity-period decisions made by callers.
    #[error("expired")]
    Expired,
}

impl From<untrusted::EndOfInput> for Error {
    fn from(_: untrusted::EndOfInput) -> Error {
        Error::Invalid
    }
}

pub type Result<T> = ::core::result::Result<T, Error>;
