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

//! This module defines the binary serialization contract used by every value
//! which needs to cross a thread, process or storage boundary.

use std::io::{Read, Write};

use crate::{PackError, Packer, Unpacker};

/// A value which knows how to write itself in the primitive pack format.
/// Composite types simply forward to the `pack` method of their members.
pub trait Pack {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError>;
}

/// A value which knows how to rebuild itself from the primitive pack format.
/// Unpacking must read exactly what `pack` wrote, in the same order.
pub trait Unpack: Sized {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError>;
}
