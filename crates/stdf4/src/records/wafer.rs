//! Wafer records

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec::{string_length, ValueCodec},
    error::{Error, Result},
    records::{checked_length, FieldWriter, StdfRecord},
    types::{RecordHeader, RecordType},
};

/// Wafer Information Record (WIR)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wir {
    /// HEAD_NUM
    pub head: u8,
    /// SITE_GRP, 255 when unused
    pub site_group: u8,
    /// Date and time the first part was tested (START_T)
    pub start_time: u32,
    /// WAFER_ID
    pub wafer_id: Option<String>,
}

impl StdfRecord for Wir {
    const RECORD_TYPE: RecordType = RecordType::WIR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        Ok(Wir {
            head: codec.read_u8(body, &mut offset)?,
            site_group: codec.read_u8(body, &mut offset)?,
            start_time: codec.read_u32(body, &mut offset)?,
            wafer_id: codec.read_string(body, &mut offset)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        checked_length(RecordHeader::SIZE + 6 + string_length(&self.wafer_id))
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, self.wire_length()?)?;
        writer.u8(self.head)?;
        writer.u8(self.site_group)?;
        writer.u32(self.start_time)?;
        writer.string(&self.wafer_id)?;
        Ok(writer.finish())
    }
}

/// Wafer Results Record (WRR)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wrr {
    /// HEAD_NUM
    pub head: u8,
    /// SITE_GRP, 255 when unused
    pub site_group: u8,
    /// Date and time the last part was tested (FINISH_T)
    pub finish_time: u32,
    /// PART_CNT
    pub part_count: u32,
    /// RTST_CNT
    pub retest_count: u32,
    /// ABRT_CNT
    pub abort_count: u32,
    /// GOOD_CNT
    pub good_count: u32,
    /// FUNC_CNT
    pub functional_count: u32,
    /// WAFER_ID
    pub wafer_id: Option<String>,
    /// FABWF_ID
    pub fab_wafer_id: Option<String>,
    /// FRAME_ID
    pub frame_id: Option<String>,
    /// MASK_ID
    pub mask_id: Option<String>,
    /// USR_DESC
    pub user_description: Option<String>,
    /// EXC_DESC
    pub exec_description: Option<String>,
}

impl Wrr {
    const FIXED_LENGTH: usize = RecordHeader::SIZE + 26;

    fn strings(&self) -> [&Option<String>; 6] {
        [
            &self.wafer_id,
            &self.fab_wafer_id,
            &self.frame_id,
            &self.mask_id,
            &self.user_description,
            &self.exec_description,
        ]
    }
}

impl StdfRecord for Wrr {
    const RECORD_TYPE: RecordType = RecordType::WRR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        let o = &mut offset;
        Ok(Wrr {
            head: codec.read_u8(body, o)?,
            site_group: codec.read_u8(body, o)?,
            finish_time: codec.read_u32(body, o)?,
            part_count: codec.read_u32(body, o)?,
            retest_count: codec.read_u32(body, o)?,
            abort_count: codec.read_u32(body, o)?,
            good_count: codec.read_u32(body, o)?,
            functional_count: codec.read_u32(body, o)?,
            wafer_id: codec.read_string(body, o)?,
            fab_wafer_id: codec.read_string(body, o)?,
            frame_id: codec.read_string(body, o)?,
            mask_id: codec.read_string(body, o)?,
            user_description: codec.read_string(body, o)?,
            exec_description: codec.read_string(body, o)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        let strings: usize = self.strings().into_iter().map(string_length).sum();
        checked_length(Self::FIXED_LENGTH + strings)
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, self.wire_length()?)?;
        writer.u8(self.head)?;
        writer.u8(self.site_group)?;
        writer.u32(self.finish_time)?;
        writer.u32(self.part_count)?;
        writer.u32(self.retest_count)?;
        writer.u32(self.abort_count)?;
        writer.u32(self.good_count)?;
        writer.u32(self.functional_count)?;
        for value in self.strings() {
            writer.string(value)?;
        }
        Ok(writer.finish())
    }
}

/// Wafer Configuration Record (WCR)
///
/// Decode only. The three sizes are required, a body too short for them is an error.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wcr {
    /// Diameter of the wafer in `units` (WAFR_SIZ)
    pub wafer_size: f32,
    /// Height of a die in `units` (DIE_HT)
    pub die_height: f32,
    /// Width of a die in `units` (DIE_WID)
    pub die_width: f32,
    /// Units code for the sizes (WF_UNITS)
    pub units: u8,
    /// Orientation of the wafer flat: `U`, `D`, `L`, `R` or space (WF_FLAT)
    pub flat: char,
    /// X coordinate of the center die (CENTER_X)
    pub center_x: Option<i16>,
    /// Y coordinate of the center die (CENTER_Y)
    pub center_y: Option<i16>,
    /// Positive X direction, `L` or `R` (POS_X)
    pub positive_x: Option<char>,
    /// Positive Y direction, `U` or `D` (POS_Y)
    pub positive_y: Option<char>,
}

impl Wcr {
    /// Readable name of the units code
    pub fn units_name(&self) -> &'static str {
        match self.units {
            0 => "Unknown",
            1 => "Inches",
            2 => "Centimeters",
            3 => "Millimeters",
            4 => "Mils",
            _ => "Invalid Code",
        }
    }
}

impl StdfRecord for Wcr {
    const RECORD_TYPE: RecordType = RecordType::WCR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        let o = &mut offset;
        Ok(Wcr {
            wafer_size: codec.read_fixed_f32(body, o)?,
            die_height: codec.read_fixed_f32(body, o)?,
            die_width: codec.read_fixed_f32(body, o)?,
            units: codec.read_u8(body, o)?,
            flat: codec.read_char(body, o)?,
            center_x: codec.read_nullable_i16(body, o)?,
            center_y: codec.read_nullable_i16(body, o)?,
            positive_x: codec.read_nullable_char(body, o),
            positive_y: codec.read_nullable_char(body, o),
        })
    }

    fn wire_length(&self) -> Result<u16> {
        let optional = self.center_x.map_or(0, |_| 2)
            + self.center_y.map_or(0, |_| 2)
            + self.positive_x.map_or(0, |_| 1)
            + self.positive_y.map_or(0, |_| 1);
        checked_length(RecordHeader::SIZE + 14 + optional)
    }

    fn encode(&self, _dest: &mut [u8], _offset: usize, _codec: &ValueCodec) -> Result<u16> {
        Err(Error::NotImplemented(Self::RECORD_TYPE.name()))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::codec::ValueCodec;
    use crate::error::{Error, Result};
    use crate::records::{StdfRecord, Wcr, Wir, Wrr};
    use crate::types::CpuType;

    #[test]
    fn wir_round_trip() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x00, 0x0A, 0x02, 0x0A,
            0x01, 0xFF,
            0x5B, 0xBE, 0x08, 0x46,
            0x03, b'W', b'0', b'1',
        ];

        let mut codec = ValueCodec::new(CpuType::BigEndian);
        let wir = Wir::decode(&input[4..], &mut codec)?;
        assert_eq!(
            wir,
            Wir {
                head: 1,
                site_group: 255,
                start_time: 1539180614,
                wafer_id: Some("W01".to_string()),
            }
        );
        assert_eq!(wir.to_bytes(&codec)?, input.to_vec());

        Ok(())
    }

    #[test]
    fn wrr_round_trip() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x1E, 0x00, 0x02, 0x14,
            0x01, 0xFF,
            0x46, 0x08, 0xBE, 0x5B,
            0x64, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x5A, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x03, b'W', b'0', b'1',
        ];

        let mut codec = ValueCodec::new(CpuType::LittleEndian);
        let wrr = Wrr::decode(&input[4..], &mut codec)?;
        assert_eq!(wrr.finish_time, 1539180614);
        assert_eq!(wrr.part_count, 100);
        assert_eq!(wrr.good_count, 90);
        assert_eq!(wrr.wafer_id.as_deref(), Some("W01"));
        assert_eq!(wrr.fab_wafer_id, None);

        let bytes = wrr.to_bytes(&codec)?;
        // encoded with sub-type 20, not the WIR sub-type
        assert_eq!(&bytes[2..4], &[0x02, 0x14]);
        assert_eq!(bytes, input.to_vec());

        Ok(())
    }

    #[test]
    fn wrr_strings_keep_order() {
        let codec = ValueCodec::default();
        let wrr = Wrr {
            wafer_id: Some("W01".to_string()),
            mask_id: Some("M".to_string()),
            ..Default::default()
        };
        assert!(matches!(wrr.to_bytes(&codec), Err(Error::NonNullAfterNull)));
    }

    #[test]
    fn wcr_decode_only() -> Result<()> {
        let mut body = Vec::new();
        body.extend_from_slice(&200.0f32.to_le_bytes());
        body.extend_from_slice(&5.5f32.to_le_bytes());
        body.extend_from_slice(&4.0f32.to_le_bytes());
        body.extend_from_slice(&[0x03, b'D']);
        body.extend_from_slice(&(-3i16).to_le_bytes());
        body.extend_from_slice(&7i16.to_le_bytes());
        body.extend_from_slice(&[b'R', b'U']);

        let mut codec = ValueCodec::new(CpuType::LittleEndian);
        let wcr = Wcr::decode(&body, &mut codec)?;
        assert_eq!(wcr.wafer_size, 200.0);
        assert_eq!(wcr.die_height, 5.5);
        assert_eq!(wcr.units_name(), "Millimeters");
        assert_eq!(wcr.flat, 'D');
        assert_eq!(wcr.center_x, Some(-3));
        assert_eq!(wcr.center_y, Some(7));
        assert_eq!(wcr.positive_x, Some('R'));
        assert_eq!(wcr.positive_y, Some('U'));
        assert_eq!(wcr.wire_length()?, 24);

        let short = Wcr::decode(&body[..14], &mut codec)?;
        assert_eq!(short.center_x, None);
        assert_eq!(short.positive_y, None);

        assert!(matches!(
            wcr.to_bytes(&codec),
            Err(Error::NotImplemented("WCR"))
        ));

        let unknown = Wcr {
            units: 9,
            ..Default::default()
        };
        assert_eq!(unknown.units_name(), "Invalid Code");

        Ok(())
    }

    #[test]
    fn wcr_without_sizes() {
        let mut codec = ValueCodec::new(CpuType::LittleEndian);
        assert!(matches!(
            Wcr::decode(&[0x03, b'D'], &mut codec),
            Err(Error::InsufficientData { offset: 0, needed: 4, available: 2 })
        ));

        let mut body = 200.0f32.to_le_bytes().to_vec();
        body.extend_from_slice(&5.5f32.to_le_bytes());
        body.extend_from_slice(&[0x03, b'D']);
        assert!(matches!(
            Wcr::decode(&body, &mut codec),
            Err(Error::InsufficientData { offset: 8, needed: 4, available: 10 })
        ));
    }
}
