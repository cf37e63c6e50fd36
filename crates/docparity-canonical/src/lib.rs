//! Document primitives shared by the parity tools.
//!
//! Dumps and ground-truth fixtures are parsed into [`DocValue`] trees, float
//! leaves are rounded with [`normalize`], and the result is written back with
//! [`to_canonical_string`], which reproduces the reference JSON encoder byte
//! for byte so that fixtures produced by either side compare as plain text.
//!
#![deny(missing_docs)]

/// Reference-compatible JSON encoding.
pub mod encoding;
/// Float rounding over document trees.
pub mod normalize;
/// Document text parsing.
pub mod parse;
/// Text comparison helpers.
pub mod text;
/// Document value model and parsing.
pub mod value;

pub use encoding::{
    encode_document, format_float, to_canonical_string, to_reference_string, write_document,
    EncodeError, Layout, ReferenceFormatter, CANONICAL_INDENT,
};
pub use normalize::{normalize, normalize_in_place, round_half_even, DEFAULT_PRECISION};
pub use parse::{ParseError, ParseErrorKind, MAX_NESTING};
pub use text::{normalize_newlines, trim_trailing_whitespace};
pub use value::{DocValue, Mapping};
