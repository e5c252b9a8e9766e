//! Bounds-checked reading of resource data.

use alloc::{format, string::String, vec::Vec};
use core::{char::REPLACEMENT_CHARACTER, mem::size_of};

use zerocopy::{
    byteorder::little_endian::{U16, U32},
    FromBytes,
};

use crate::{errors::*, util::*};

/// Sequential reader over an immutable byte buffer.
///
/// Every read is checked against the bound of the cursor and advances the position only on success.
/// After a failed read the cursor should be abandoned.
///
/// Sub-cursors created with [`ByteCursor::slice`] are bounded to their span but remember where
/// that span starts in the outermost buffer, so [`ByteCursor::align`] always aligns relative to
/// the start of the resource data and never relative to the start of a nested block.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data:     &'a [u8],
    base:     usize,
    position: usize,
}
impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of the given buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            base: 0,
            position: 0,
        }
    }

    /// Returns the read position relative to the start of this cursor.
    pub fn position(&self) -> usize { self.position }

    /// Returns the read position relative to the start of the outermost buffer.
    pub fn offset(&self) -> usize { self.base + self.position }

    /// Returns the number of bytes left before the bound of this cursor.
    pub fn remaining(&self) -> usize { self.data.len() - self.position }

    /// Returns `true` if no bytes are left.
    pub fn is_empty(&self) -> bool { self.remaining() == 0 }

    /// Read a raw data layout.
    pub fn read<T: FromBytes + Copy>(&mut self) -> Result<T, DecodeError> {
        let value = read::<T>(&self.data[self.position..]).map_err(|error| {
            ReadError(format!(
                "{} at offset {:#x} with {} bytes remaining",
                error.0,
                self.offset(),
                self.remaining()
            ))
        })?;
        self.position += size_of::<T>();
        Ok(value)
    }

    /// Read a raw data layout without advancing.
    pub fn peek<T: FromBytes + Copy>(&self) -> Result<T, DecodeError> { self.clone().read::<T>() }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> { self.read::<u8>() }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> { self.read::<U16>().map(U16::get) }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> { self.read::<U32>().map(U32::get) }

    /// Borrow the next `length` bytes.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8], DecodeError> {
        if length > self.remaining() {
            return Err(DecodeError::OutOfBounds(format!(
                "{} bytes at offset {:#x} with {} bytes remaining",
                length,
                self.offset(),
                self.remaining()
            )));
        }
        let data = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(data)
    }

    /// Read a zero-terminated UTF-16 string.
    /// Unpaired surrogates are replaced with U+FFFD.
    ///
    /// # Returns
    /// Returns [`DecodeError::UnterminatedString`] if the bound is reached before a zero unit.
    pub fn read_utf16_cstring(&mut self) -> Result<String, DecodeError> {
        let start = self.offset();
        let mut units = Vec::new();
        loop {
            if self.remaining() < 2 {
                return Err(DecodeError::UnterminatedString(start));
            }
            match self.read_u16()? {
                0 => break,
                unit => units.push(unit),
            }
        }
        Ok(decode_utf16(&units))
    }

    /// Advance to the next multiple of `alignment` relative to the start of the outermost buffer.
    pub fn align(&mut self, alignment: usize) -> Result<(), DecodeError> {
        if alignment <= 1 {
            return Ok(());
        }
        let position = aligned_to(self.offset(), alignment) - self.base;
        if position > self.data.len() {
            return Err(DecodeError::OutOfBounds(format!(
                "alignment to {} at offset {:#x} with {} bytes remaining",
                alignment,
                self.offset(),
                self.remaining()
            )));
        }
        self.position = position;
        Ok(())
    }

    /// Split off a cursor bounded to the next `length` bytes and advance past them.
    pub fn slice(&mut self, length: usize) -> Result<ByteCursor<'a>, DecodeError> {
        let base = self.offset();
        let data = self.read_bytes(length)?;
        Ok(ByteCursor {
            data,
            base,
            position: 0,
        })
    }
}

pub(crate) fn decode_utf16(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|c| c.unwrap_or(REPLACEMENT_CHARACTER))
        .collect()
}
