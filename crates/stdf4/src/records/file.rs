//! File level records

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec::ValueCodec,
    error::Result,
    records::{FieldWriter, StdfRecord},
    types::{CpuType, RecordType},
};

/// File Attributes Record (FAR)
///
/// The first record of every file. `cpu_type` declares the byte order of everything that
/// follows, it is stored as read so an unsupported value can still be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Far {
    /// CPU type that wrote the file, 1 big endian or 2 little endian (CPU_TYPE)
    pub cpu_type: u8,

    /// STDF version number, always 4 for this format (STDF_VER)
    pub stdf_version: u8,
}

impl Far {
    /// Total size of a FAR on the wire
    pub const WIRE_LENGTH: u16 = 6;

    /// Body length, the only one that can be read before the byte order is known
    pub const BODY_LENGTH: usize = 2;

    /// FAR declaring the given byte order
    pub fn new(cpu_type: CpuType) -> Self {
        Far {
            cpu_type: cpu_type.into(),
            stdf_version: 4,
        }
    }
}

impl Default for Far {
    fn default() -> Self {
        Far::new(CpuType::native())
    }
}

impl StdfRecord for Far {
    const RECORD_TYPE: RecordType = RecordType::FAR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        Ok(Far {
            cpu_type: codec.read_u8(body, &mut offset)?,
            stdf_version: codec.read_u8(body, &mut offset)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        Ok(Self::WIRE_LENGTH)
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, Self::WIRE_LENGTH)?;
        writer.u8(self.cpu_type)?;
        writer.u8(self.stdf_version)?;
        Ok(writer.finish())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::codec::ValueCodec;
    use crate::error::Result;
    use crate::records::{Far, StdfRecord};
    use crate::types::CpuType;

    #[test]
    fn decode_far() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x02, 0x00, 0x00, 0x0A,
            0x02, 0x04,
        ];

        let mut codec = ValueCodec::default();
        let far = Far::decode(&input[4..], &mut codec)?;
        assert_eq!(
            far,
            Far {
                cpu_type: 2,
                stdf_version: 4
            }
        );
        assert_eq!(far.name(), "FAR");

        Ok(())
    }

    #[test]
    fn encode_far() -> Result<()> {
        let codec = ValueCodec::new(CpuType::LittleEndian);
        let far = Far::new(CpuType::LittleEndian);

        assert_eq!(far.wire_length()?, 6);
        assert_eq!(far.to_bytes(&codec)?, vec![0x02, 0x00, 0x00, 0x0A, 0x02, 0x04]);

        let codec = ValueCodec::new(CpuType::BigEndian);
        let far = Far::new(CpuType::BigEndian);
        assert_eq!(far.to_bytes(&codec)?, vec![0x00, 0x02, 0x00, 0x0A, 0x01, 0x04]);

        Ok(())
    }

    #[test]
    fn decode_short_far() {
        let mut codec = ValueCodec::default();
        assert!(Far::decode(&[0x02], &mut codec).is_err());
    }
}
