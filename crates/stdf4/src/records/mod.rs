//! Record variants of the STDF V4 format and the contract they share
//!
//! Every implemented kind is a plain struct that implements [`StdfRecord`]. The closed
//! [`Record`] enum wraps them so a parse can hold a mixed sequence.

use derive_more::derive::From;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec::ValueCodec,
    error::{Error, Result},
    types::{RecordHeader, RecordType},
};

pub mod file;
pub mod generic;
pub mod lot;
pub mod part;
pub mod results;
pub mod wafer;

pub use file::Far;
pub use generic::Dtr;
pub use lot::{Hbr, Mir, Mrr, Pcr, Sbr, Sdr};
pub use part::{PartFlags, Pir, Prr};
pub use results::{Ptr, Tsr};
pub use wafer::{Wcr, Wir, Wrr};

/// Decode and encode contract shared by every record kind
pub trait StdfRecord: Sized {
    /// Kind selected by the header of this record
    const RECORD_TYPE: RecordType;

    /// Read a record from its body, the bytes following the four byte header
    ///
    /// Trailing optional fields missing from the body are left as `None`.
    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self>;

    /// Bytes the encoded record takes up, header included
    fn wire_length(&self) -> Result<u16>;

    /// Write the header and fields at `offset`, returns the bytes written
    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16>;

    /// Three letter name of the record kind
    fn name(&self) -> &'static str {
        Self::RECORD_TYPE.name()
    }

    /// Encode into a new buffer of exactly [`wire_length`](Self::wire_length) bytes
    fn to_bytes(&self, codec: &ValueCodec) -> Result<Vec<u8>> {
        let mut dest = vec![0; self.wire_length()? as usize];
        self.encode(&mut dest, 0, codec)?;
        Ok(dest)
    }
}

/// Convert a header inclusive length into the 16 bit range
pub(crate) fn checked_length(total: usize) -> Result<u16> {
    u16::try_from(total).map_err(|_| Error::RecordTooLong(total))
}

/// Cursor writing one record field by field
///
/// Keeps the running offset and the null flag shared by all trailing optional fields.
pub(crate) struct FieldWriter<'a> {
    codec: &'a ValueCodec,
    dest: &'a mut [u8],
    start: usize,
    offset: usize,
    have_previous_null: bool,
}

impl<'a> FieldWriter<'a> {
    /// Check the destination has room for `total` bytes and write the header
    pub fn begin(
        codec: &'a ValueCodec,
        dest: &'a mut [u8],
        offset: usize,
        record_type: RecordType,
        total: u16,
    ) -> Result<Self> {
        let available = dest.len().saturating_sub(offset);
        if available < total as usize {
            return Err(Error::BufferTooSmall {
                needed: total as usize,
                available,
            });
        }

        let mut writer = FieldWriter {
            codec,
            dest,
            start: offset,
            offset,
            have_previous_null: false,
        };
        writer.u16(total - RecordHeader::SIZE as u16)?;
        writer.u8(record_type.major())?;
        writer.u8(record_type.minor())?;
        Ok(writer)
    }

    pub fn u8(&mut self, value: u8) -> Result<()> {
        self.offset += self.codec.write_u8(value, self.dest, self.offset)?;
        Ok(())
    }

    pub fn i8(&mut self, value: i8) -> Result<()> {
        self.u8(value as u8)
    }

    pub fn char(&mut self, value: char) -> Result<()> {
        self.offset += self.codec.write_ascii_char(value, self.dest, self.offset)?;
        Ok(())
    }

    pub fn u16(&mut self, value: u16) -> Result<()> {
        self.offset += self.codec.write_u16(value, self.dest, self.offset)?;
        Ok(())
    }

    pub fn i16(&mut self, value: i16) -> Result<()> {
        self.offset += self.codec.write_i16(value, self.dest, self.offset)?;
        Ok(())
    }

    pub fn u32(&mut self, value: u32) -> Result<()> {
        self.offset += self.codec.write_u32(value, self.dest, self.offset)?;
        Ok(())
    }

    pub fn f32(&mut self, value: f32) -> Result<()> {
        self.offset += self.codec.write_f32(value, self.dest, self.offset)?;
        Ok(())
    }

    /// Strings are always optional
    pub fn string(&mut self, value: &Option<String>) -> Result<()> {
        self.offset += self.codec.write_ascii_string(
            value.as_deref(),
            self.dest,
            self.offset,
            &mut self.have_previous_null,
        )?;
        Ok(())
    }

    pub fn bytes(&mut self, value: &Option<Vec<u8>>) -> Result<()> {
        self.offset += self.codec.write_bytes(
            value.as_deref(),
            self.dest,
            self.offset,
            &mut self.have_previous_null,
        )?;
        Ok(())
    }

    pub fn nullable_char(&mut self, value: Option<char>) -> Result<()> {
        self.offset += self.codec.write_nullable_char(
            value,
            self.dest,
            self.offset,
            &mut self.have_previous_null,
        )?;
        Ok(())
    }

    pub fn nullable_u8(&mut self, value: Option<u8>) -> Result<()> {
        self.offset += self.codec.write_nullable_u8(
            value,
            self.dest,
            self.offset,
            &mut self.have_previous_null,
        )?;
        Ok(())
    }

    pub fn nullable_i8(&mut self, value: Option<i8>) -> Result<()> {
        self.nullable_u8(value.map(|v| v as u8))
    }

    pub fn nullable_f32(&mut self, value: Option<f32>) -> Result<()> {
        self.offset += self.codec.write_nullable_f32(
            value,
            self.dest,
            self.offset,
            &mut self.have_previous_null,
        )?;
        Ok(())
    }

    /// Bytes written since [`begin`](Self::begin), header included
    pub fn finish(self) -> u16 {
        (self.offset - self.start) as u16
    }
}

macro_rules! record_enum {
    ($($variant:ident),+ $(,)?) => {
        /// Any record kind this library decodes
        #[derive(Debug, Clone, PartialEq, From)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "type"))]
        pub enum Record {
            $(
                #[allow(missing_docs)]
                $variant($variant),
            )+
        }

        impl Record {
            /// Kind of the wrapped record
            pub fn record_type(&self) -> RecordType {
                match self {
                    $(Record::$variant(_) => $variant::RECORD_TYPE,)+
                }
            }

            /// Bytes the encoded record takes up, header included
            pub fn wire_length(&self) -> Result<u16> {
                match self {
                    $(Record::$variant(record) => record.wire_length(),)+
                }
            }

            /// Write the header and fields at `offset`, returns the bytes written
            pub fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
                match self {
                    $(Record::$variant(record) => record.encode(dest, offset, codec),)+
                }
            }

            /// Encode into a new buffer
            pub fn to_bytes(&self, codec: &ValueCodec) -> Result<Vec<u8>> {
                match self {
                    $(Record::$variant(record) => record.to_bytes(codec),)+
                }
            }
        }
    };
}

record_enum!(Far, Mir, Mrr, Pcr, Hbr, Sbr, Sdr, Wir, Wrr, Wcr, Pir, Prr, Tsr, Ptr, Dtr);

impl Record {
    /// Three letter name of the record kind
    pub fn name(&self) -> &'static str {
        self.record_type().name()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::codec::ValueCodec;
    use crate::error::{Error, Result};
    use crate::records::{Dtr, Far, Pir, Record, StdfRecord};
    use crate::types::{CpuType, RecordType};

    #[test]
    fn record_dispatch() -> Result<()> {
        let record = Record::from(Pir { head: 1, site: 2 });
        assert_eq!(record.record_type(), RecordType::PIR);
        assert_eq!(record.name(), "PIR");
        assert_eq!(record.wire_length()?, 6);

        let codec = ValueCodec::new(CpuType::LittleEndian);
        assert_eq!(record.to_bytes(&codec)?, vec![0x02, 0x00, 0x05, 0x0A, 0x01, 0x02]);

        Ok(())
    }

    #[test]
    fn encode_checks_buffer() {
        let codec = ValueCodec::default();
        let far = Far::default();
        let mut dest = [0u8; 8];

        assert!(matches!(
            far.encode(&mut dest, 4, &codec),
            Err(Error::BufferTooSmall { needed: 6, available: 4 })
        ));
        assert_eq!(far.encode(&mut dest, 2, &codec).ok(), Some(6));
    }

    #[test]
    fn record_too_long() {
        let dtr = Dtr {
            text: Some("x".repeat(255)),
        };
        assert_eq!(dtr.wire_length().ok(), Some(260));
        assert!(matches!(
            crate::records::checked_length(70_000),
            Err(Error::RecordTooLong(70_000))
        ));
    }
}
