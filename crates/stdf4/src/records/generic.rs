//! Generic data records

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec::{string_length, ValueCodec},
    error::Result,
    records::{checked_length, FieldWriter, StdfRecord},
    types::{RecordHeader, RecordType},
};

/// Datalog Text Record (DTR)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dtr {
    /// ASCII text string (TEXT_DAT)
    pub text: Option<String>,
}

impl StdfRecord for Dtr {
    const RECORD_TYPE: RecordType = RecordType::DTR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        Ok(Dtr {
            text: codec.read_string(body, &mut offset)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        checked_length(RecordHeader::SIZE + string_length(&self.text))
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, self.wire_length()?)?;
        writer.string(&self.text)?;
        Ok(writer.finish())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::codec::ValueCodec;
    use crate::error::Result;
    use crate::records::{Dtr, StdfRecord};
    use crate::types::CpuType;

    #[test]
    fn dtr_round_trip() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x06, 0x00, 0x32, 0x1E,
            0x05, b'h', b'e', b'l', b'l', b'o',
        ];

        let mut codec = ValueCodec::new(CpuType::LittleEndian);
        let dtr = Dtr::decode(&input[4..], &mut codec)?;
        assert_eq!(dtr.text.as_deref(), Some("hello"));
        assert_eq!(dtr.to_bytes(&codec)?, input.to_vec());

        Ok(())
    }

    #[test]
    fn empty_dtr() -> Result<()> {
        let mut codec = ValueCodec::new(CpuType::LittleEndian);
        let dtr = Dtr::decode(&[], &mut codec)?;
        assert_eq!(dtr, Dtr { text: None });
        assert_eq!(dtr.to_bytes(&codec)?, vec![0x00, 0x00, 0x32, 0x1E]);

        Ok(())
    }
}
