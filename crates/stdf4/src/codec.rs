//! Conversion of STDF field values to and from bytes
//!
//! A [`ValueCodec`] carries the byte order of the file being read, plus small scratch
//! buffers that are reused for every multi-byte field. One codec belongs to one parse
//! session; records borrow it while they decode or encode.

use byteorder::{ByteOrder, NativeEndian};

use crate::{
    error::{Error, Result},
    types::CpuType,
};

/// Longest value a variable length field can hold
pub const MAX_FIELD_LENGTH: usize = 255;

/// Byte order aware reader and writer for STDF field values
///
/// Values are read by copying them into a scratch buffer, reversed when the file order
/// differs from the host order, and then interpreted natively.
#[derive(Debug, Clone)]
pub struct ValueCodec {
    cpu_type: CpuType,
    reverse_on_read: bool,
    reverse_on_write: bool,

    /// Scratch space for two byte values
    pub(crate) two_bytes: [u8; 2],

    /// Scratch space for four byte values
    pub(crate) four_bytes: [u8; 4],
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::new(CpuType::native())
    }
}

impl ValueCodec {
    /// Create a codec reading and writing in the given byte order
    pub fn new(cpu_type: CpuType) -> Self {
        ValueCodec {
            cpu_type,
            reverse_on_read: cpu_type.is_reversed(),
            reverse_on_write: cpu_type.is_reversed(),
            two_bytes: [0; 2],
            four_bytes: [0; 4],
        }
    }

    /// The byte order in use for reading
    pub fn cpu_type(&self) -> CpuType {
        self.cpu_type
    }

    /// Set the byte order from a FAR CPU type value, 1 (big endian) or 2 (little endian)
    ///
    /// Both the read and write direction follow the new order.
    pub fn set_cpu_type(&mut self, cpu_type: u8) -> Result<()> {
        let cpu_type = CpuType::try_from(cpu_type)?;
        self.cpu_type = cpu_type;
        self.reverse_on_read = cpu_type.is_reversed();
        self.reverse_on_write = cpu_type.is_reversed();
        Ok(())
    }

    /// Set only the byte order used for writing
    ///
    /// Allows decoding in one order and encoding in another.
    pub fn set_write_cpu_type(&mut self, cpu_type: u8) -> Result<()> {
        self.reverse_on_write = CpuType::try_from(cpu_type)?.is_reversed();
        Ok(())
    }

    /// Whether multi-byte values are reversed when read
    pub fn reverse_bytes_on_read(&self) -> bool {
        self.reverse_on_read
    }

    /// Whether multi-byte values are reversed when written
    pub fn reverse_bytes_on_write(&self) -> bool {
        self.reverse_on_write
    }

    /// The byte order used for writing
    pub fn write_cpu_type(&self) -> CpuType {
        if self.reverse_on_write == self.cpu_type.is_reversed() {
            self.cpu_type
        } else {
            match self.cpu_type {
                CpuType::BigEndian => CpuType::LittleEndian,
                CpuType::LittleEndian => CpuType::BigEndian,
            }
        }
    }

    fn take<'a>(data: &'a [u8], offset: usize, width: usize) -> Result<&'a [u8]> {
        data.get(offset..offset + width)
            .ok_or(Error::InsufficientData {
                offset,
                needed: width,
                available: data.len(),
            })
    }

    pub(crate) fn load_two(&mut self, data: &[u8], offset: usize) -> Result<&[u8; 2]> {
        let src = Self::take(data, offset, 2)?;
        if self.reverse_on_read {
            self.two_bytes = [src[1], src[0]];
        } else {
            self.two_bytes = [src[0], src[1]];
        }
        Ok(&self.two_bytes)
    }

    pub(crate) fn load_four(&mut self, data: &[u8], offset: usize) -> Result<&[u8; 4]> {
        let src = Self::take(data, offset, 4)?;
        if self.reverse_on_read {
            self.four_bytes = [src[3], src[2], src[1], src[0]];
        } else {
            self.four_bytes = [src[0], src[1], src[2], src[3]];
        }
        Ok(&self.four_bytes)
    }

    /// Read a single byte (U*1)
    pub fn read_u8(&self, data: &[u8], offset: &mut usize) -> Result<u8> {
        let value = Self::take(data, *offset, 1)?[0];
        *offset += 1;
        Ok(value)
    }

    /// Read a signed byte (I*1)
    pub fn read_i8(&self, data: &[u8], offset: &mut usize) -> Result<i8> {
        Ok(self.read_u8(data, offset)? as i8)
    }

    /// Read a single character (C*1)
    pub fn read_char(&self, data: &[u8], offset: &mut usize) -> Result<char> {
        Ok(self.read_u8(data, offset)? as char)
    }

    /// Read an unsigned two byte integer (U*2)
    pub fn read_u16(&mut self, data: &[u8], offset: &mut usize) -> Result<u16> {
        let value = NativeEndian::read_u16(self.load_two(data, *offset)?);
        *offset += 2;
        Ok(value)
    }

    /// Read a signed two byte integer (I*2)
    pub fn read_i16(&mut self, data: &[u8], offset: &mut usize) -> Result<i16> {
        let value = NativeEndian::read_i16(self.load_two(data, *offset)?);
        *offset += 2;
        Ok(value)
    }

    /// Read an unsigned four byte integer (U*4)
    ///
    /// A value running past the end of the record reads as zero and leaves `offset`
    /// untouched, short trailing counters are common in real files.
    pub fn read_u32(&mut self, data: &[u8], offset: &mut usize) -> Result<u32> {
        if *offset + 4 > data.len() {
            return Ok(0);
        }

        let value = NativeEndian::read_u32(self.load_four(data, *offset)?);
        *offset += 4;
        Ok(value)
    }

    /// Read a four byte float (R*4)
    ///
    /// Returns `None` without advancing when the value is not in the record.
    pub fn read_f32(&mut self, data: &[u8], offset: &mut usize) -> Option<f32> {
        if *offset + 4 > data.len() {
            return None;
        }

        let value = NativeEndian::read_f32(self.load_four(data, *offset).ok()?);
        *offset += 4;
        Some(value)
    }

    /// Read a four byte float (R*4) that every record of its kind carries
    ///
    /// Fails with [`Error::InsufficientData`] when the record ends first.
    pub fn read_fixed_f32(&mut self, data: &[u8], offset: &mut usize) -> Result<f32> {
        let value = NativeEndian::read_f32(self.load_four(data, *offset)?);
        *offset += 4;
        Ok(value)
    }

    /// Read a length prefixed string (C*n)
    ///
    /// Returns `None` when the record has already ended, which is not the same as an empty
    /// string.
    pub fn read_string(&self, data: &[u8], offset: &mut usize) -> Result<Option<String>> {
        if *offset >= data.len() {
            return Ok(None);
        }

        let length = data[*offset] as usize;
        if length == 0 {
            *offset += 1;
            return Ok(Some(String::new()));
        }

        let remaining = data.len() - *offset - 1;
        if length > remaining {
            return Err(Error::TruncatedString { length, remaining });
        }

        let start = *offset + 1;
        let value = data[start..start + length].iter().map(|&b| b as char).collect();
        *offset += length + 1;
        Ok(Some(value))
    }

    /// Read a length prefixed byte array (B*n)
    pub fn read_bytes(&self, data: &[u8], offset: &mut usize) -> Result<Option<Vec<u8>>> {
        if *offset >= data.len() {
            return Ok(None);
        }

        let length = data[*offset] as usize;
        let remaining = data.len() - *offset - 1;
        if length > remaining {
            return Err(Error::TruncatedBytes { length, remaining });
        }

        let start = *offset + 1;
        let value = data[start..start + length].to_vec();
        *offset += length + 1;
        Ok(Some(value))
    }

    /// Read a character if the record has not ended
    pub fn read_nullable_char(&self, data: &[u8], offset: &mut usize) -> Option<char> {
        let value = *data.get(*offset)?;
        *offset += 1;
        Some(value as char)
    }

    /// Read a byte if the record has not ended
    pub fn read_nullable_u8(&self, data: &[u8], offset: &mut usize) -> Option<u8> {
        let value = *data.get(*offset)?;
        *offset += 1;
        Some(value)
    }

    /// Read a signed byte if the record has not ended
    pub fn read_nullable_i8(&self, data: &[u8], offset: &mut usize) -> Option<i8> {
        self.read_nullable_u8(data, offset).map(|b| b as i8)
    }

    /// Read a signed two byte integer if the record has not ended
    pub fn read_nullable_i16(&mut self, data: &[u8], offset: &mut usize) -> Result<Option<i16>> {
        if *offset >= data.len() {
            return Ok(None);
        }
        self.read_i16(data, offset).map(Some)
    }

    fn slot<'a>(dest: &'a mut [u8], offset: usize, width: usize) -> Result<&'a mut [u8]> {
        let available = dest.len().saturating_sub(offset);
        dest.get_mut(offset..offset + width)
            .ok_or(Error::BufferTooSmall {
                needed: width,
                available,
            })
    }

    /// Write a single byte, returns the bytes written
    pub fn write_u8(&self, value: u8, dest: &mut [u8], offset: usize) -> Result<usize> {
        Self::slot(dest, offset, 1)?[0] = value;
        Ok(1)
    }

    /// Write a single character in the 0..=255 range
    pub fn write_ascii_char(&self, value: char, dest: &mut [u8], offset: usize) -> Result<usize> {
        let byte = u8::try_from(u32::from(value)).map_err(|_| Error::CharOutOfAsciiRange(value))?;
        self.write_u8(byte, dest, offset)
    }

    fn write_ordered<const N: usize>(
        &self,
        mut bytes: [u8; N],
        dest: &mut [u8],
        offset: usize,
    ) -> Result<usize> {
        if self.reverse_on_write {
            bytes.reverse();
        }
        Self::slot(dest, offset, N)?.copy_from_slice(&bytes);
        Ok(N)
    }

    /// Write an unsigned two byte integer
    pub fn write_u16(&self, value: u16, dest: &mut [u8], offset: usize) -> Result<usize> {
        self.write_ordered(value.to_ne_bytes(), dest, offset)
    }

    /// Write a signed two byte integer
    pub fn write_i16(&self, value: i16, dest: &mut [u8], offset: usize) -> Result<usize> {
        self.write_ordered(value.to_ne_bytes(), dest, offset)
    }

    /// Write an unsigned four byte integer
    pub fn write_u32(&self, value: u32, dest: &mut [u8], offset: usize) -> Result<usize> {
        self.write_ordered(value.to_ne_bytes(), dest, offset)
    }

    /// Write a four byte float
    pub fn write_f32(&self, value: f32, dest: &mut [u8], offset: usize) -> Result<usize> {
        self.write_ordered(value.to_ne_bytes(), dest, offset)
    }

    /// Write a length prefixed string, returns the bytes written
    ///
    /// `None` writes nothing and sets `have_previous_null`. Once it is set, any later
    /// value fails with [`Error::NonNullAfterNull`], as a record can only end early.
    pub fn write_ascii_string(
        &self,
        value: Option<&str>,
        dest: &mut [u8],
        offset: usize,
        have_previous_null: &mut bool,
    ) -> Result<usize> {
        let Some(value) = value else {
            *have_previous_null = true;
            return Ok(0);
        };

        if *have_previous_null {
            return Err(Error::NonNullAfterNull);
        }

        let length = value.chars().count();
        if length > MAX_FIELD_LENGTH {
            return Err(Error::StringTooLong(length));
        }

        let slot = Self::slot(dest, offset, length + 1)?;
        slot[0] = length as u8;
        for (target, c) in slot[1..].iter_mut().zip(value.chars()) {
            *target = u8::try_from(u32::from(c)).map_err(|_| Error::CharOutOfAsciiRange(c))?;
        }
        Ok(length + 1)
    }

    /// Write a length prefixed byte array with the same null handling as strings
    pub fn write_bytes(
        &self,
        value: Option<&[u8]>,
        dest: &mut [u8],
        offset: usize,
        have_previous_null: &mut bool,
    ) -> Result<usize> {
        let Some(value) = value else {
            *have_previous_null = true;
            return Ok(0);
        };

        if *have_previous_null {
            return Err(Error::NonNullAfterNull);
        }

        if value.len() > MAX_FIELD_LENGTH {
            return Err(Error::StringTooLong(value.len()));
        }

        let slot = Self::slot(dest, offset, value.len() + 1)?;
        slot[0] = value.len() as u8;
        slot[1..].copy_from_slice(value);
        Ok(value.len() + 1)
    }

    /// Write a trailing character with the same null handling as strings
    pub fn write_nullable_char(
        &self,
        value: Option<char>,
        dest: &mut [u8],
        offset: usize,
        have_previous_null: &mut bool,
    ) -> Result<usize> {
        let Some(value) = value else {
            *have_previous_null = true;
            return Ok(0);
        };

        if *have_previous_null {
            return Err(Error::NonNullAfterNull);
        }

        self.write_ascii_char(value, dest, offset)
    }

    /// Write a trailing byte with the same null handling as strings
    pub fn write_nullable_u8(
        &self,
        value: Option<u8>,
        dest: &mut [u8],
        offset: usize,
        have_previous_null: &mut bool,
    ) -> Result<usize> {
        let Some(value) = value else {
            *have_previous_null = true;
            return Ok(0);
        };

        if *have_previous_null {
            return Err(Error::NonNullAfterNull);
        }

        self.write_u8(value, dest, offset)
    }

    /// Write a trailing float with the same null handling as strings
    pub fn write_nullable_f32(
        &self,
        value: Option<f32>,
        dest: &mut [u8],
        offset: usize,
        have_previous_null: &mut bool,
    ) -> Result<usize> {
        let Some(value) = value else {
            *have_previous_null = true;
            return Ok(0);
        };

        if *have_previous_null {
            return Err(Error::NonNullAfterNull);
        }

        self.write_f32(value, dest, offset)
    }

    /// Write a trailing signed two byte integer with the same null handling as strings
    pub fn write_nullable_i16(
        &self,
        value: Option<i16>,
        dest: &mut [u8],
        offset: usize,
        have_previous_null: &mut bool,
    ) -> Result<usize> {
        let Some(value) = value else {
            *have_previous_null = true;
            return Ok(0);
        };

        if *have_previous_null {
            return Err(Error::NonNullAfterNull);
        }

        self.write_i16(value, dest, offset)
    }
}

/// Bytes a trailing string adds to a record, including its length byte
pub(crate) fn string_length(value: &Option<String>) -> usize {
    value.as_ref().map_or(0, |s| s.chars().count() + 1)
}
