//! Low level access to C Binary files: fixed 80 byte text records, 32 bit little endian
//! integers and floats.
//!
//! Indexing walks a file with [`RecordReader`] and only records offsets. Array contents are
//! decoded later from an in-memory handle with [`read_values`].

use super::error::{self, BinaryError};
use num_traits::FromBytes;
use std::io::{Read, Seek, SeekFrom};

/// length of every text record in a C Binary file
pub(crate) const LINE_LENGTH: u64 = 80;

/// size of one integer / float
pub(crate) const VALUE_SIZE: u64 = 4;

/// Sequential reader over the records of a C Binary file
pub(crate) struct RecordReader<R> {
    inner: R,
    position: u64,
    len: u64,
}

impl<R: Read + Seek> RecordReader<R> {
    pub(crate) fn new(mut inner: R) -> Result<Self, BinaryError> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;

        Ok(Self {
            inner,
            position: 0,
            len,
        })
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.position >= self.len
    }

    fn ensure_available(&self, bytes: u64) -> Result<(), BinaryError> {
        let remaining = self.len.saturating_sub(self.position);
        if bytes > remaining {
            return Err(error::UnexpectedEof::new(self.position, bytes - remaining).into());
        }
        Ok(())
    }

    /// read one 80 byte text record
    pub(crate) fn read_line(&mut self) -> Result<String, BinaryError> {
        self.ensure_available(LINE_LENGTH)?;
        let mut buffer = [0; LINE_LENGTH as usize];
        self.inner.read_exact(&mut buffer)?;
        self.position += LINE_LENGTH;
        Ok(decode_line(&buffer))
    }

    /// read the next text record without consuming it
    pub(crate) fn peek_line(&mut self) -> Result<String, BinaryError> {
        let line = self.read_line()?;
        self.inner.seek(SeekFrom::Current(-(LINE_LENGTH as i64)))?;
        self.position -= LINE_LENGTH;
        Ok(line)
    }

    /// read a text record and check that it starts with `keyword`
    pub(crate) fn expect_line(&mut self, keyword: &'static str) -> Result<String, BinaryError> {
        let offset = self.position;
        let line = self.read_line()?;
        if !line.starts_with(keyword) {
            return Err(error::UnexpectedRecord::new(offset, keyword, line).into());
        }
        Ok(line)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, BinaryError> {
        self.ensure_available(VALUE_SIZE)?;
        let mut buffer = [0; VALUE_SIZE as usize];
        self.inner.read_exact(&mut buffer)?;
        self.position += VALUE_SIZE;
        Ok(i32::from_le_bytes(buffer))
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32, BinaryError> {
        let bits = self.read_i32()?;
        Ok(f32::from_bits(bits as u32))
    }

    /// read an integer that must not be negative (counts, part numbers)
    pub(crate) fn read_count(&mut self, what: &'static str) -> Result<usize, BinaryError> {
        let offset = self.position;
        let value = self.read_i32()?;
        usize::try_from(value).map_err(|_| error::NegativeValue::new(offset, what, value).into())
    }

    /// read `count` integers that must not be negative and return their sum
    pub(crate) fn read_count_sum(
        &mut self,
        count: usize,
        what: &'static str,
    ) -> Result<usize, BinaryError> {
        self.ensure_available(values_len(count))?;
        let mut total: usize = 0;
        for _ in 0..count {
            total = total.saturating_add(self.read_count(what)?);
        }
        Ok(total)
    }

    /// skip over `count` 4 byte values
    pub(crate) fn skip_values(&mut self, count: usize) -> Result<(), BinaryError> {
        let bytes = values_len(count);
        self.ensure_available(bytes)?;
        self.inner.seek(SeekFrom::Current(bytes as i64))?;
        self.position += bytes;
        Ok(())
    }
}

/// byte length of `count` 4 byte values, saturating so that absurd counts fail the bounds check
pub(crate) fn values_len(count: usize) -> u64 {
    (count as u64).saturating_mul(VALUE_SIZE)
}

/// text records are padded with NULs or spaces
fn decode_line(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).trim().to_string()
}

/// Decode `count` little endian values starting at `offset` of a loaded file
pub(crate) fn read_values<T>(data: &[u8], offset: u64, count: usize) -> Result<Vec<T>, BinaryError>
where
    T: FromBytes<Bytes = [u8; 4]>,
{
    let needed = values_len(count);
    let available = (data.len() as u64).saturating_sub(offset);
    if needed > available {
        return Err(error::UnexpectedEof::new(offset, needed - available).into());
    }

    let start = offset as usize;
    let end = start + needed as usize;

    let values = data[start..end]
        .chunks_exact(VALUE_SIZE as usize)
        .map(|chunk| {
            let mut bytes = [0; 4];
            bytes.copy_from_slice(chunk);
            T::from_le_bytes(&bytes)
        })
        .collect();

    Ok(values)
}
