//! Part records, one pair per tested part

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec::{string_length, ValueCodec},
    error::{Error, Result},
    records::{checked_length, FieldWriter, StdfRecord},
    types::{RecordHeader, RecordType},
};

/// Part Information Record (PIR)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pir {
    /// HEAD_NUM
    pub head: u8,
    /// SITE_NUM
    pub site: u8,
}

impl Pir {
    const WIRE_LENGTH: u16 = 6;
}

impl StdfRecord for Pir {
    const RECORD_TYPE: RecordType = RecordType::PIR;

    fn decode(body: &[u8], _codec: &mut ValueCodec) -> Result<Self> {
        match body {
            [head, site, ..] => Ok(Pir {
                head: *head,
                site: *site,
            }),
            _ => Err(Error::InsufficientData {
                offset: 0,
                needed: 2,
                available: body.len(),
            }),
        }
    }

    fn wire_length(&self) -> Result<u16> {
        Ok(Self::WIRE_LENGTH)
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, Self::WIRE_LENGTH)?;
        writer.u8(self.head)?;
        writer.u8(self.site)?;
        Ok(writer.finish())
    }
}

/// PART_FLG bits of a [`Prr`]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct PartFlags(pub u8);

impl PartFlags {
    /// Supersedes an earlier part with the same PART_ID
    pub fn supersedes_by_id(self) -> bool {
        self.0 & 0x01 != 0
    }

    /// Supersedes an earlier part with the same coordinates
    pub fn supersedes_by_coordinates(self) -> bool {
        self.0 & 0x02 != 0
    }

    /// Testing ended abnormally
    pub fn abnormal_end(self) -> bool {
        self.0 & 0x04 != 0
    }

    /// Part failed, only meaningful when [`pass_fail_valid`](Self::pass_fail_valid)
    pub fn failed(self) -> bool {
        self.0 & 0x08 != 0
    }

    /// Whether the failed bit can be trusted
    pub fn pass_fail_valid(self) -> bool {
        self.0 & 0x10 == 0
    }
}

/// Part Results Record (PRR)
///
/// Decode only.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Prr {
    /// HEAD_NUM
    pub head: u8,
    /// SITE_NUM
    pub site: u8,
    /// PART_FLG
    pub part_flags: PartFlags,
    /// Number of tests executed (NUM_TEST)
    pub test_count: u16,
    /// HARD_BIN
    pub hard_bin: u16,
    /// SOFT_BIN, 65535 when unused
    pub soft_bin: u16,
    /// Wafer X coordinate, -32768 when unused (X_COORD)
    pub x: i16,
    /// Wafer Y coordinate, -32768 when unused (Y_COORD)
    pub y: i16,
    /// Elapsed test time in milliseconds (TEST_T)
    pub test_time: u32,
    /// PART_ID
    pub part_id: Option<String>,
    /// PART_TXT
    pub part_text: Option<String>,
    /// Part repair information (PART_FIX)
    pub part_fix: Option<Vec<u8>>,
}

impl Prr {
    const FIXED_LENGTH: usize = RecordHeader::SIZE + 17;

    /// Whether the part passed, `None` when the pass/fail flag is marked invalid
    pub fn passed(&self) -> Option<bool> {
        self.part_flags
            .pass_fail_valid()
            .then_some(!self.part_flags.failed())
    }
}

impl StdfRecord for Prr {
    const RECORD_TYPE: RecordType = RecordType::PRR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        let o = &mut offset;
        Ok(Prr {
            head: codec.read_u8(body, o)?,
            site: codec.read_u8(body, o)?,
            part_flags: PartFlags(codec.read_u8(body, o)?),
            test_count: codec.read_u16(body, o)?,
            hard_bin: codec.read_u16(body, o)?,
            soft_bin: codec.read_u16(body, o)?,
            x: codec.read_i16(body, o)?,
            y: codec.read_i16(body, o)?,
            test_time: codec.read_u32(body, o)?,
            part_id: codec.read_string(body, o)?,
            part_text: codec.read_string(body, o)?,
            part_fix: codec.read_bytes(body, o)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        checked_length(
            Self::FIXED_LENGTH
                + string_length(&self.part_id)
                + string_length(&self.part_text)
                + self.part_fix.as_ref().map_or(0, |b| b.len() + 1),
        )
    }

    fn encode(&self, _dest: &mut [u8], _offset: usize, _codec: &ValueCodec) -> Result<u16> {
        Err(Error::NotImplemented(Self::RECORD_TYPE.name()))
    }
}
