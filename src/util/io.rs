//! Stream helpers shared by the wave and packed readers.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::{Error, Result};

/// Open a file for buffered reading, mapping a missing file to
/// [`Error::FileNotFound`].
pub fn open_file(path: impl AsRef<Path>) -> Result<BufReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;
    Ok(BufReader::new(file))
}

/// Fill `buf` as far as the stream allows. Returns the number of bytes
/// read, which is less than `buf.len()` only at end of stream.
pub fn read_up_to<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Read exactly `len` bytes, reporting a short stream as
/// [`Error::ShortBuffer`] against `what`.
pub fn read_exact_vec<R: Read + ?Sized>(reader: &mut R, len: usize, what: &str) -> Result<Vec<u8>> {
    let buf = read_at_most(reader, len)?;
    if buf.len() < len {
        return Err(Error::short(what, len, buf.len()));
    }
    Ok(buf)
}

/// Read up to `len` bytes. The buffer grows with the bytes actually
/// present, not with the declared length.
pub fn read_at_most<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    (&mut *reader).take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
