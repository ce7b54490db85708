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

//! A file backed sink/source. This is what is used to persist the state of a
//! suspended search.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::{Pack, PackError, Packer, Unpack, Unpacker};

/// A file holding values in the primitive pack format.
#[derive(Debug, Clone)]
pub struct FileArchive {
    path: PathBuf,
}

impl FileArchive {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileArchive { path: path.as_ref().to_path_buf() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Creates (or truncates) the file and returns a packer writing to it.
    /// Don't forget to call `finish()` on the packer when you are done.
    pub fn writer(&self) -> Result<Packer<BufWriter<File>>, PackError> {
        Ok(Packer::new(BufWriter::new(File::create(&self.path)?)))
    }
    /// Opens the file and returns an unpacker reading from it.
    pub fn reader(&self) -> Result<Unpacker<BufReader<File>>, PackError> {
        Ok(Unpacker::new(BufReader::new(File::open(&self.path)?)))
    }
    /// Writes one value to the file, replacing its previous content
    pub fn save<T: Pack + ?Sized>(&self, value: &T) -> Result<(), PackError> {
        let mut packer = self.writer()?;
        value.pack(&mut packer)?;
        packer.finish()?;
        Ok(())
    }
    /// Reads one value from the file
    pub fn load<T: Unpack>(&self) -> Result<T, PackError> {
        self.reader()?.value()
    }
}
