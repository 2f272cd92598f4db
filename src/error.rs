// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh
// -----
// Created Date: 2023/09/14 09:21:33

use std::{fmt, result};

/// Represents the error variants that the `HuffmanDecoder` can return.
#[derive(PartialEq)]
#[derive(Copy)]
#[derive(Clone)]
#[derive(Debug)]
pub enum HuffmanDecoderError {
    /// Any padding strictly larger than 7 bits MUST be interpreted as an error
    PaddingTooLarge,
    /// Any padding that does not correspond to the most significant bits of
    /// EOS MUST be interpreted as an error.
    InvalidPadding,
    /// If EOS is ever found in the string, it causes an error.
    EOSInString,
}

impl HuffmanDecoderError {
    #[inline]
    pub fn description_str(&self) -> &'static str {
        match self {
            HuffmanDecoderError::PaddingTooLarge => "padding longer than 7 bits",
            HuffmanDecoderError::InvalidPadding => "padding is not a prefix of EOS",
            HuffmanDecoderError::EOSInString => "EOS symbol in encoded string",
        }
    }
}

/// Represents all errors that can be encountered while decoding an HPACK
/// header block. Any of these invalidates the stream.
#[derive(PartialEq)]
#[derive(Copy)]
#[derive(Clone)]
#[derive(Debug)]
pub enum DecoderError {
    /// Index 0 used as an indexed directive, or an index beyond the end of
    /// the combined static and dynamic table.
    InvalidIndex,
    /// The decoded integer would exceed 2^31 - 1.
    IntegerOverflow,
    /// A size update above the maximum the host granted the decoder.
    InvalidMaxDynamicSize,
    /// The host shrank the table, so the peer MUST lead the next header
    /// block with a size update, and it did not.
    MaxSizeUpdateRequired,
    /// Header names of zero length cannot be represented.
    EmptyHeaderName,
    HuffmanDecoderError(HuffmanDecoderError),
}

impl DecoderError {
    #[inline]
    pub fn description_str(&self) -> &'static str {
        match self {
            DecoderError::InvalidIndex => "invalid header index",
            DecoderError::IntegerOverflow => "integer overflow",
            DecoderError::InvalidMaxDynamicSize => "dynamic table size update above maximum",
            DecoderError::MaxSizeUpdateRequired => "dynamic table size update required",
            DecoderError::EmptyHeaderName => "empty header name",
            DecoderError::HuffmanDecoderError(e) => e.description_str(),
        }
    }
}

#[derive(Debug)]
pub enum HpackError {
    Decoder(DecoderError),
    /// A dynamic table entry was requested with an index outside [1, length].
    OutOfRange,
    Io(std::io::Error),
}

impl HpackError {
    #[inline]
    fn description_str(&self) -> &'static str {
        match self {
            HpackError::Decoder(e) => e.description_str(),
            HpackError::OutOfRange => "table index out of range",
            HpackError::Io(_) => "io error",
        }
    }

    pub fn is_decompression(&self) -> bool {
        match self {
            HpackError::Decoder(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for HpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description_str())
    }
}

impl std::error::Error for HpackError {}

impl From<DecoderError> for HpackError {
    fn from(e: DecoderError) -> Self {
        HpackError::Decoder(e)
    }
}

impl From<HuffmanDecoderError> for HpackError {
    fn from(e: HuffmanDecoderError) -> Self {
        HpackError::Decoder(DecoderError::HuffmanDecoderError(e))
    }
}

impl From<std::io::Error> for HpackError {
    fn from(e: std::io::Error) -> Self {
        HpackError::Io(e)
    }
}

pub type HpackResult<T> = result::Result<T, HpackError>;
