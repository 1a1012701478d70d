//! Bounded cursor over a borrowed device buffer.
//!
//! All multi-byte integers on the wire are little-endian. The reader never
//! assumes host endianness: every value is assembled with `from_le_bytes`,
//! so the decoder behaves identically on big-endian hosts.

use crate::error::{Error, Result};

/// Sequential, bounds-checked access to a byte buffer.
///
/// The reader borrows the device buffer for the duration of one decode pass.
/// The cursor can never leave `[0, len]`; any operation that would cross the
/// end fails with a bounds error instead.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],

    // The current position in the data.
    index: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, index: 0 }
    }

    /// The current position of the reader inside the data.
    pub fn index(&self) -> usize {
        self.index
    }

    /// How many bytes are left in the data.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Changes the current position of the reader inside the data.
    ///
    /// The new position must be less than or equal to the length of the data.
    pub fn seek(&mut self, index: usize) -> Result<()> {
        if index > self.data.len() {
            return Err(Error::InvalidSeek {
                index,
                max: self.data.len(),
            });
        }

        self.index = index;
        Ok(())
    }

    /// Moves the current position forward by `size` bytes.
    pub fn skip(&mut self, size: usize) -> Result<()> {
        self.take(size)?;
        Ok(())
    }

    /// Fills `dest` with the data at the current position and advances.
    pub fn read_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        let src = self.take(dest.len())?;
        dest.copy_from_slice(src);
        Ok(())
    }

    /// Takes a chunk of bytes from the current position and splits it off
    /// into an independent reader, advancing this one past it.
    pub fn sub(&mut self, size: usize) -> Result<Reader<'a>> {
        Ok(Reader::new(self.take(size)?))
    }

    /// Borrows `size` bytes at the current position and advances.
    pub fn read_slice(&mut self, size: usize) -> Result<&'a [u8]> {
        self.take(size)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let src = self.take(1)?;
        Ok(src[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let src = self.take(2)?;
        Ok(u16::from_le_bytes([src[0], src[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let src = self.take(4)?;
        Ok(u32::from_le_bytes([src[0], src[1], src[2], src[3]]))
    }

    /// Bounds-checks a read of `size` bytes, returning the slice and
    /// advancing the cursor.
    fn take(&mut self, size: usize) -> Result<&'a [u8]> {
        if self.remaining() == 0 {
            return Err(Error::EndOfData { requested: size });
        }

        if size > self.remaining() {
            return Err(Error::InvalidRead {
                requested: size,
                available: self.remaining(),
            });
        }

        let src = &self.data[self.index..self.index + size];
        self.index += size;
        Ok(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_and_remaining() {
        let data = [1u8, 2, 3, 4];
        let mut reader = Reader::new(&data);

        assert_eq!(reader.index(), 0);
        assert_eq!(reader.remaining(), 4);

        reader.skip(3).unwrap();
        assert_eq!(reader.index(), 3);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_cursor_never_leaves_bounds() {
        let data = [0u8; 8];
        let mut reader = Reader::new(&data);

        // Valid operations keep 0 <= index <= len
        reader.seek(8).unwrap();
        assert_eq!(reader.index(), 8);

        // Failed operations leave the cursor untouched
        assert!(reader.seek(9).is_err());
        assert_eq!(reader.index(), 8);

        reader.seek(4).unwrap();
        assert!(reader.skip(5).is_err());
        assert_eq!(reader.index(), 4);
    }

    #[test]
    fn test_little_endian_reads() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut reader = Reader::new(&data);

        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0x12345678);
    }

    #[test]
    fn test_read_past_end() {
        let data = [1u8, 2];
        let mut reader = Reader::new(&data);

        match reader.read_u32() {
            Err(Error::InvalidRead {
                requested,
                available,
            }) => {
                assert_eq!(requested, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected InvalidRead, got {:?}", other),
        }

        reader.skip(2).unwrap();

        match reader.read_u8() {
            Err(Error::EndOfData { requested }) => assert_eq!(requested, 1),
            other => panic!("expected EndOfData, got {:?}", other),
        }
    }

    #[test]
    fn test_read_bytes() {
        let data = [10u8, 20, 30, 40];
        let mut reader = Reader::new(&data);

        let mut dest = [0u8; 3];
        reader.read_bytes(&mut dest).unwrap();
        assert_eq!(dest, [10, 20, 30]);
        assert_eq!(reader.index(), 3);
    }

    #[test]
    fn test_sub_reader_is_independent() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut reader = Reader::new(&data);

        let mut sub = reader.sub(4).unwrap();

        // The parent advanced past the chunk
        assert_eq!(reader.index(), 4);
        assert_eq!(reader.read_u8().unwrap(), 5);

        // The child starts at the beginning of the chunk
        assert_eq!(sub.index(), 0);
        assert_eq!(sub.remaining(), 4);
        assert_eq!(sub.read_u8().unwrap(), 1);

        // The child cannot read past its chunk
        assert!(sub.read_u32().is_err());
    }

    #[test]
    fn test_sub_larger_than_remaining() {
        let data = [0u8; 4];
        let mut reader = Reader::new(&data);

        assert!(reader.sub(5).is_err());
        assert_eq!(reader.index(), 0);
    }

    #[test]
    fn test_skip_on_empty_buffer() {
        let mut reader = Reader::new(&[]);
        assert!(matches!(reader.skip(1), Err(Error::EndOfData { .. })));
    }
}
