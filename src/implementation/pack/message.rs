// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! An in-memory sink/source: the buffer which is carried by the messages of
//! the distributed search.

use crate::{Pack, PackError, Packer, Unpack, Unpacker};

/// A growable byte buffer holding values in the primitive pack format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBuffer {
    data: Vec<u8>,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_bytes(data: Vec<u8>) -> Self {
        MessageBuffer { data }
    }
    /// Packs a single value into a fresh buffer
    pub fn of<T: Pack + ?Sized>(value: &T) -> Result<Self, PackError> {
        let mut buffer = Self::new();
        value.pack(&mut buffer.packer())?;
        Ok(buffer)
    }
    /// Returns a packer appending to this buffer
    pub fn packer(&mut self) -> Packer<&mut Vec<u8>> {
        Packer::new(&mut self.data)
    }
    /// Returns an unpacker reading this buffer from the start
    pub fn unpacker(&self) -> Unpacker<&[u8]> {
        Unpacker::new(self.data.as_slice())
    }
    /// Unpacks a value which must span the whole buffer
    pub fn value<T: Unpack>(&self) -> Result<T, PackError> {
        let mut unpacker = self.unpacker();
        let value = T::unpack(&mut unpacker)?;
        let remaining = unpacker.into_inner().len();
        if remaining > 0 {
            return Err(PackError::TrailingBytes(remaining));
        }
        Ok(value)
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
