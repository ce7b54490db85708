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

//! This module provides the primitive pack format: all scalars are written in
//! little endian byte order with a fixed width, lengths are written as `u64`.
//! The format does not depend on the transport (file or network message).

use std::io::{Read, Write};
use std::sync::Arc;

use crate::{Direction, Node, NodeId, NodeKind, Pack, PackError, Unpack};

/// Writes values in the primitive pack format onto some sink.
#[derive(Debug)]
pub struct Packer<W: Write> {
    out: W,
    written: u64,
}

macro_rules! put_scalar {
    ($($name:ident : $t:ty),*) => {
        $(
            #[inline]
            pub fn $name(&mut self, v: $t) -> Result<(), PackError> {
                self.raw(&v.to_le_bytes())
            }
        )*
    };
}

impl<W: Write> Packer<W> {
    pub fn new(out: W) -> Self {
        Packer { out, written: 0 }
    }
    /// The number of bytes written so far
    pub fn written(&self) -> u64 {
        self.written
    }
    /// Flushes the sink and gives it back
    pub fn finish(mut self) -> Result<W, PackError> {
        self.out.flush()?;
        Ok(self.out)
    }

    put_scalar!(u8: u8, u16: u16, u32: u32, u64: u64, i8: i8, i16: i16, i32: i32, i64: i64, f32: f32, f64: f64);

    #[inline]
    pub fn bool(&mut self, v: bool) -> Result<(), PackError> {
        self.u8(v as u8)
    }
    #[inline]
    pub fn usize(&mut self, v: usize) -> Result<(), PackError> {
        self.u64(v as u64)
    }
    #[inline]
    pub fn isize(&mut self, v: isize) -> Result<(), PackError> {
        self.i64(v as i64)
    }
    #[inline]
    pub fn char(&mut self, v: char) -> Result<(), PackError> {
        self.u32(v as u32)
    }
    /// Writes a length (or a count)
    #[inline]
    pub fn len(&mut self, n: usize) -> Result<(), PackError> {
        self.u64(n as u64)
    }
    /// Writes a length prefixed byte array
    pub fn bytes(&mut self, v: &[u8]) -> Result<(), PackError> {
        self.len(v.len())?;
        self.raw(v)
    }
    /// Writes a length prefixed utf-8 string
    pub fn str(&mut self, v: &str) -> Result<(), PackError> {
        self.bytes(v.as_bytes())
    }
    /// Writes any packable value
    pub fn value<T: Pack + ?Sized>(&mut self, v: &T) -> Result<(), PackError> {
        v.pack(self)
    }
    /// Writes a count prefixed sequence of values
    pub fn seq<'a, T, I>(&mut self, items: I) -> Result<(), PackError>
        where T: Pack + 'a, I: ExactSizeIterator<Item = &'a T>
    {
        self.len(items.len())?;
        for item in items {
            item.pack(self)?;
        }
        Ok(())
    }
    /// Writes bytes without any prefix
    fn raw(&mut self, v: &[u8]) -> Result<(), PackError> {
        self.out.write_all(v)?;
        self.written += v.len() as u64;
        Ok(())
    }
}

/// Reads values in the primitive pack format from some source.
#[derive(Debug)]
pub struct Unpacker<R: Read> {
    input: R,
    read: u64,
}

macro_rules! get_scalar {
    ($($name:ident : $t:ty),*) => {
        $(
            #[inline]
            pub fn $name(&mut self) -> Result<$t, PackError> {
                let mut buf = [0_u8; std::mem::size_of::<$t>()];
                self.raw(&mut buf)?;
                Ok(<$t>::from_le_bytes(buf))
            }
        )*
    };
}

impl<R: Read> Unpacker<R> {
    pub fn new(input: R) -> Self {
        Unpacker { input, read: 0 }
    }
    /// The number of bytes consumed so far
    pub fn consumed(&self) -> u64 {
        self.read
    }
    pub fn into_inner(self) -> R {
        self.input
    }

    get_scalar!(u8: u8, u16: u16, u32: u32, u64: u64, i8: i8, i16: i16, i32: i32, i64: i64, f32: f32, f64: f64);

    pub fn bool(&mut self) -> Result<bool, PackError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(PackError::InvalidTag { what: "bool", tag }),
        }
    }
    pub fn usize(&mut self) -> Result<usize, PackError> {
        let v = self.u64()?;
        usize::try_from(v).map_err(|_| PackError::LengthOverflow(v))
    }
    pub fn isize(&mut self) -> Result<isize, PackError> {
        let v = self.i64()?;
        isize::try_from(v).map_err(|_| PackError::LengthOverflow(v as u64))
    }
    pub fn char(&mut self) -> Result<char, PackError> {
        char::from_u32(self.u32()?).ok_or(PackError::InvalidUtf8)
    }
    pub fn len(&mut self) -> Result<usize, PackError> {
        self.usize()
    }
    /// Reads a length prefixed byte array
    pub fn bytes(&mut self) -> Result<Vec<u8>, PackError> {
        let len = self.len()?;
        let mut out = Vec::new();
        // reading through `take` makes the buffer grow with the data that is
        // actually there rather than trusting the length prefix blindly
        let got = (&mut self.input).take(len as u64).read_to_end(&mut out)?;
        self.read += got as u64;
        if got < len {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        Ok(out)
    }
    /// Reads a length prefixed utf-8 string
    pub fn string(&mut self) -> Result<String, PackError> {
        String::from_utf8(self.bytes()?).map_err(|_| PackError::InvalidUtf8)
    }
    /// Reads any unpackable value
    pub fn value<T: Unpack>(&mut self) -> Result<T, PackError> {
        T::unpack(self)
    }
    /// Reads a count prefixed sequence of values
    pub fn seq<T: Unpack>(&mut self) -> Result<Vec<T>, PackError> {
        let n = self.len()?;
        let mut out = Vec::with_capacity(n.min(1024));
        for _ in 0..n {
            out.push(T::unpack(self)?);
        }
        Ok(out)
    }
    fn raw(&mut self, buf: &mut [u8]) -> Result<(), PackError> {
        self.input.read_exact(buf)?;
        self.read += buf.len() as u64;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// --- Primitive impls --------------------------------------------------------
// ----------------------------------------------------------------------------
macro_rules! pack_scalar {
    ($($t:ident),*) => {
        $(
            impl Pack for $t {
                fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
                    packer.$t(*self)
                }
            }
            impl Unpack for $t {
                fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
                    unpacker.$t()
                }
            }
        )*
    };
}
pack_scalar!(bool, char, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl Pack for () {
    fn pack<W: Write>(&self, _: &mut Packer<W>) -> Result<(), PackError> {
        Ok(())
    }
}
impl Unpack for () {
    fn unpack<R: Read>(_: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(())
    }
}

impl Pack for str {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.str(self)
    }
}
impl Pack for String {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.str(self)
    }
}
impl Unpack for String {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        unpacker.string()
    }
}

impl<T: Pack> Pack for [T] {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.seq(self.iter())
    }
}
impl<T: Pack> Pack for Vec<T> {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.seq(self.iter())
    }
}
impl<T: Unpack> Unpack for Vec<T> {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        unpacker.seq()
    }
}

impl<T: Pack> Pack for Option<T> {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        match self {
            None => packer.bool(false),
            Some(v) => {
                packer.bool(true)?;
                v.pack(packer)
            }
        }
    }
}
impl<T: Unpack> Unpack for Option<T> {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        if unpacker.bool()? {
            Ok(Some(T::unpack(unpacker)?))
        } else {
            Ok(None)
        }
    }
}

impl<A: Pack, B: Pack> Pack for (A, B) {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        self.0.pack(packer)?;
        self.1.pack(packer)
    }
}
impl<A: Unpack, B: Unpack> Unpack for (A, B) {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        let a = A::unpack(unpacker)?;
        let b = B::unpack(unpacker)?;
        Ok((a, b))
    }
}

impl<T: Pack> Pack for Arc<T> {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        self.as_ref().pack(packer)
    }
}
impl<T: Unpack> Unpack for Arc<T> {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(Arc::new(T::unpack(unpacker)?))
    }
}

// ----------------------------------------------------------------------------
// --- Engine types -----------------------------------------------------------
// ----------------------------------------------------------------------------
impl Pack for NodeId {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.u64(self.0)
    }
}
impl Unpack for NodeId {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(NodeId(unpacker.u64()?))
    }
}

impl Pack for NodeKind {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        match self {
            NodeKind::Problem  => packer.u8(0),
            NodeKind::Solution => packer.u8(1),
        }
    }
}
impl Unpack for NodeKind {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        match unpacker.u8()? {
            0 => Ok(NodeKind::Problem),
            1 => Ok(NodeKind::Solution),
            tag => Err(PackError::InvalidTag { what: "node kind", tag }),
        }
    }
}

impl Pack for Direction {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        match self {
            Direction::Minimize => packer.u8(0),
            Direction::Maximize => packer.u8(1),
        }
    }
}
impl Unpack for Direction {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        match unpacker.u8()? {
            0 => Ok(Direction::Minimize),
            1 => Ok(Direction::Maximize),
            tag => Err(PackError::InvalidTag { what: "direction", tag }),
        }
    }
}

/// A node packs its identifier, depth, kind and evaluation before its payload.
impl<P: Pack> Pack for Node<P> {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        self.id().pack(packer)?;
        packer.usize(self.depth())?;
        self.kind().pack(packer)?;
        self.eval().pack(packer)?;
        self.payload().pack(packer)
    }
}
impl<P: Unpack> Unpack for Node<P> {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        let id = NodeId::unpack(unpacker)?;
        let depth = unpacker.usize()?;
        let kind = NodeKind::unpack(unpacker)?;
        let eval = Option::<f64>::unpack(unpacker)?;
        let payload = P::unpack(unpacker)?;
        Ok(Node::new(id, depth, kind, eval, payload))
    }
}


#[cfg(test)]
mod test_primitive {
    use crate::*;

    #[test]
    fn scalars_are_little_endian_and_fixed_width() {
        let mut packer = Packer::new(vec![]);
        packer.u32(1).unwrap();
        packer.i16(-2).unwrap();
        packer.bool(true).unwrap();
        assert_eq!(7, packer.written());
        let bytes = packer.finish().unwrap();
        assert_eq!(vec![1, 0, 0, 0, 0xFE, 0xFF, 1], bytes);
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut packer = Packer::new(vec![]);
        packer.str("ab").unwrap();
        let bytes = packer.finish().unwrap();
        assert_eq!(vec![2, 0, 0, 0, 0, 0, 0, 0, b'a', b'b'], bytes);
    }

    #[test]
    fn mixed_values_read_back_in_order() {
        let mut packer = Packer::new(vec![]);
        packer.f64(17.5).unwrap();
        packer.value(&String::from("hello")).unwrap();
        packer.value(&vec![Some(3_u16), None]).unwrap();
        packer.char('λ').unwrap();
        let bytes = packer.finish().unwrap();

        let mut unpacker = Unpacker::new(bytes.as_slice());
        assert_eq!(17.5, unpacker.f64().unwrap());
        assert_eq!("hello", unpacker.string().unwrap());
        assert_eq!(vec![Some(3_u16), None], unpacker.value::<Vec<Option<u16>>>().unwrap());
        assert_eq!('λ', unpacker.char().unwrap());
        assert_eq!(bytes.len() as u64, unpacker.consumed());
    }

    #[test]
    fn an_invalid_bool_is_rejected() {
        let bytes = [2_u8];
        let mut unpacker = Unpacker::new(&bytes[..]);
        assert!(matches!(unpacker.bool(), Err(PackError::InvalidTag { what: "bool", tag: 2 })));
    }

    #[test]
    fn a_truncated_buffer_is_an_error() {
        let mut packer = Packer::new(vec![]);
        packer.bytes(&[1, 2, 3, 4]).unwrap();
        let mut bytes = packer.finish().unwrap();
        bytes.truncate(10);
        let mut unpacker = Unpacker::new(bytes.as_slice());
        assert!(matches!(unpacker.bytes(), Err(PackError::Io(_))));
    }

    #[test]
    fn node_round_trip_preserves_the_observable_fields() {
        let node = Node::new(NodeId(12), 4, NodeKind::Problem, Some(17.5), vec![true, false, true]);
        let mut packer = Packer::new(vec![]);
        node.pack(&mut packer).unwrap();
        let bytes = packer.finish().unwrap();

        let back: Node<Vec<bool>> = Unpacker::new(bytes.as_slice()).value().unwrap();
        assert_eq!(node, back);
        assert_eq!(4, back.depth());
        assert_eq!(Some(17.5), back.eval());
        assert_eq!(&vec![true, false, true], back.payload());

        // unpacking hands out a brand new node: nobody else holds it
        let shared = back.share();
        assert_eq!(1, holders(&shared));
    }

    #[test]
    fn packing_a_node_does_not_touch_its_holders() {
        let node = Node::root(NodeId(0), Some(1.0), 7_u32).share();
        let copy = node.clone();
        let mut packer = Packer::new(vec![]);
        node.pack(&mut packer).unwrap();
        assert_eq!(2, holders(&node));
        drop(copy);
        assert_eq!(1, holders(&node));
    }
}
