//! Test result and test summary records

use byteorder::{ByteOrder, NativeEndian};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec::{string_length, ValueCodec},
    error::Result,
    records::{checked_length, FieldWriter, StdfRecord},
    types::{RecordHeader, RecordType},
};

fn optional_width<T>(value: &Option<T>, width: usize) -> usize {
    value.as_ref().map_or(0, |_| width)
}

/// Test Synopsis Record (TSR)
///
/// Execution and failure counts of one test over a site, or over all sites when
/// `head` is 255.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tsr {
    /// HEAD_NUM
    pub head: u8,
    /// SITE_NUM
    pub site: u8,
    /// `P` parametric, `F` functional, `M` multiple-result parametric (TEST_TYP)
    pub test_type: char,
    /// TEST_NUM
    pub test_number: u32,
    /// Number of executions (EXEC_CNT)
    pub exec_count: u32,
    /// Number of failures (FAIL_CNT)
    pub fail_count: u32,
    /// Number of alarmed tests (ALRM_CNT)
    pub alarm_count: u32,
    /// TEST_NAM
    pub test_name: Option<String>,
    /// SEQ_NAME
    pub sequencer_name: Option<String>,
    /// TEST_LBL
    pub test_label: Option<String>,
    /// Validity bits of the statistics below (OPT_FLAG)
    pub opt_flag: Option<u8>,
    /// Average execution time in seconds (TEST_TIM)
    pub test_time: Option<f32>,
    /// Lowest result (TEST_MIN)
    pub test_min: Option<f32>,
    /// Highest result (TEST_MAX)
    pub test_max: Option<f32>,
    /// Sum of results (TST_SUMS)
    pub test_sums: Option<f32>,
    /// Sum of squared results (TST_SQRS)
    pub test_squares: Option<f32>,
}

impl Default for Tsr {
    fn default() -> Self {
        Tsr {
            head: 255,
            site: 0,
            test_type: ' ',
            test_number: 0,
            exec_count: u32::MAX,
            fail_count: u32::MAX,
            alarm_count: u32::MAX,
            test_name: None,
            sequencer_name: None,
            test_label: None,
            opt_flag: None,
            test_time: None,
            test_min: None,
            test_max: None,
            test_sums: None,
            test_squares: None,
        }
    }
}

impl Tsr {
    const FIXED_LENGTH: usize = RecordHeader::SIZE + 19;

    fn statistic(&self, value: Option<f32>, invalid_bit: u8) -> Option<f32> {
        match self.opt_flag {
            Some(flag) if flag & invalid_bit == 0 => value,
            _ => None,
        }
    }

    /// Lowest result, if present and flagged valid
    pub fn min(&self) -> Option<f32> {
        self.statistic(self.test_min, 0x01)
    }

    /// Highest result, if present and flagged valid
    pub fn max(&self) -> Option<f32> {
        self.statistic(self.test_max, 0x02)
    }

    /// Average execution time, if present and flagged valid
    pub fn time(&self) -> Option<f32> {
        self.statistic(self.test_time, 0x04)
    }

    /// Sum of results, if present and flagged valid
    pub fn sums(&self) -> Option<f32> {
        self.statistic(self.test_sums, 0x10)
    }

    /// Sum of squared results, if present and flagged valid
    pub fn squares(&self) -> Option<f32> {
        self.statistic(self.test_squares, 0x20)
    }
}

impl StdfRecord for Tsr {
    const RECORD_TYPE: RecordType = RecordType::TSR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        let o = &mut offset;
        Ok(Tsr {
            head: codec.read_u8(body, o)?,
            site: codec.read_u8(body, o)?,
            test_type: codec.read_char(body, o)?,
            test_number: codec.read_u32(body, o)?,
            exec_count: codec.read_u32(body, o)?,
            fail_count: codec.read_u32(body, o)?,
            alarm_count: codec.read_u32(body, o)?,
            test_name: codec.read_string(body, o)?,
            sequencer_name: codec.read_string(body, o)?,
            test_label: codec.read_string(body, o)?,
            opt_flag: codec.read_nullable_u8(body, o),
            test_time: codec.read_f32(body, o),
            test_min: codec.read_f32(body, o),
            test_max: codec.read_f32(body, o),
            test_sums: codec.read_f32(body, o),
            test_squares: codec.read_f32(body, o),
        })
    }

    fn wire_length(&self) -> Result<u16> {
        checked_length(
            Self::FIXED_LENGTH
                + string_length(&self.test_name)
                + string_length(&self.sequencer_name)
                + string_length(&self.test_label)
                + optional_width(&self.opt_flag, 1)
                + optional_width(&self.test_time, 4)
                + optional_width(&self.test_min, 4)
                + optional_width(&self.test_max, 4)
                + optional_width(&self.test_sums, 4)
                + optional_width(&self.test_squares, 4),
        )
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, self.wire_length()?)?;
        writer.u8(self.head)?;
        writer.u8(self.site)?;
        writer.char(self.test_type)?;
        writer.u32(self.test_number)?;
        writer.u32(self.exec_count)?;
        writer.u32(self.fail_count)?;
        writer.u32(self.alarm_count)?;
        writer.string(&self.test_name)?;
        writer.string(&self.sequencer_name)?;
        writer.string(&self.test_label)?;
        writer.nullable_u8(self.opt_flag)?;
        writer.nullable_f32(self.test_time)?;
        writer.nullable_f32(self.test_min)?;
        writer.nullable_f32(self.test_max)?;
        writer.nullable_f32(self.test_sums)?;
        writer.nullable_f32(self.test_squares)?;
        Ok(writer.finish())
    }
}

/// Parametric Test Record (PTR)
///
/// The most common record in a file. Most testers only fill in the fixed prefix and the
/// test text, the remaining fields usually appear on the first PTR of each test.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ptr {
    /// TEST_NUM
    pub test_number: u32,
    /// HEAD_NUM
    pub head: u8,
    /// SITE_NUM
    pub site: u8,
    /// TEST_FLG
    pub test_flags: u8,
    /// PARM_FLG
    pub parametric_flags: u8,
    /// RESULT
    pub result: f32,
    /// TEST_TXT
    pub test_text: Option<String>,
    /// ALARM_ID
    pub alarm_id: Option<String>,
    /// OPT_FLAG
    pub opt_flag: Option<u8>,
    /// RES_SCAL
    pub result_scale: Option<i8>,
    /// LLM_SCAL
    pub low_limit_scale: Option<i8>,
    /// HLM_SCAL
    pub high_limit_scale: Option<i8>,
    /// LO_LIMIT
    pub low_limit: Option<f32>,
    /// HI_LIMIT
    pub high_limit: Option<f32>,
    /// UNITS
    pub units: Option<String>,
    /// C_RESFMT
    pub result_format: Option<String>,
    /// C_LLMFMT
    pub low_limit_format: Option<String>,
    /// C_HLMFMT
    pub high_limit_format: Option<String>,
    /// LO_SPEC
    pub low_spec: Option<f32>,
    /// HI_SPEC
    pub high_spec: Option<f32>,
}

impl Ptr {
    const FIXED_LENGTH: usize = RecordHeader::SIZE + 12;

    /// Decode reading every field through the generic codec calls
    ///
    /// [`decode`](StdfRecord::decode) takes a faster path for the fixed prefix and gives the
    /// same result.
    pub fn decode_generic(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        let ptr = Ptr {
            test_number: codec.read_u32(body, &mut offset)?,
            head: codec.read_u8(body, &mut offset)?,
            site: codec.read_u8(body, &mut offset)?,
            test_flags: codec.read_u8(body, &mut offset)?,
            parametric_flags: codec.read_u8(body, &mut offset)?,
            result: codec.read_fixed_f32(body, &mut offset)?,
            ..Default::default()
        };
        ptr.decode_optional(body, offset, codec)
    }

    fn decode_optional(mut self, body: &[u8], mut offset: usize, codec: &mut ValueCodec) -> Result<Self> {
        let o = &mut offset;
        self.test_text = codec.read_string(body, o)?;
        self.alarm_id = codec.read_string(body, o)?;
        self.opt_flag = codec.read_nullable_u8(body, o);
        self.result_scale = codec.read_nullable_i8(body, o);
        self.low_limit_scale = codec.read_nullable_i8(body, o);
        self.high_limit_scale = codec.read_nullable_i8(body, o);
        self.low_limit = codec.read_f32(body, o);
        self.high_limit = codec.read_f32(body, o);
        self.units = codec.read_string(body, o)?;
        self.result_format = codec.read_string(body, o)?;
        self.low_limit_format = codec.read_string(body, o)?;
        self.high_limit_format = codec.read_string(body, o)?;
        self.low_spec = codec.read_f32(body, o);
        self.high_spec = codec.read_f32(body, o);
        Ok(self)
    }

    fn flag_clear(&self, bits: u8) -> bool {
        self.opt_flag.is_some_and(|flag| flag & bits == 0)
    }

    /// The test result can be trusted, TEST_FLG bits 1 to 5 are clear
    pub fn result_valid(&self) -> bool {
        self.test_flags & 0x3E == 0
    }

    /// Pass or fail of the test, `None` when no pass/fail indication was given
    pub fn passed(&self) -> Option<bool> {
        (self.test_flags & 0x40 == 0).then_some(self.test_flags & 0x80 == 0)
    }

    /// Result scaling exponent, if flagged valid
    pub fn scale(&self) -> Option<i8> {
        self.result_scale.filter(|_| self.flag_clear(0x01))
    }

    /// Low test limit, if present and flagged valid
    pub fn low_test_limit(&self) -> Option<f32> {
        self.low_limit.filter(|_| self.flag_clear(0x50))
    }

    /// High test limit, if present and flagged valid
    pub fn high_test_limit(&self) -> Option<f32> {
        self.high_limit.filter(|_| self.flag_clear(0xA0))
    }

    /// Low specification limit, if present and flagged valid
    pub fn low_spec_limit(&self) -> Option<f32> {
        self.low_spec.filter(|_| self.flag_clear(0x04))
    }

    /// High specification limit, if present and flagged valid
    pub fn high_spec_limit(&self) -> Option<f32> {
        self.high_spec.filter(|_| self.flag_clear(0x08))
    }
}

impl StdfRecord for Ptr {
    const RECORD_TYPE: RecordType = RecordType::PTR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        if body.len() < 12 {
            return Self::decode_generic(body, codec);
        }

        let ptr = Ptr {
            test_number: NativeEndian::read_u32(codec.load_four(body, 0)?),
            head: body[4],
            site: body[5],
            test_flags: body[6],
            parametric_flags: body[7],
            result: NativeEndian::read_f32(codec.load_four(body, 8)?),
            ..Default::default()
        };
        ptr.decode_optional(body, 12, codec)
    }

    fn wire_length(&self) -> Result<u16> {
        checked_length(
            Self::FIXED_LENGTH
                + string_length(&self.test_text)
                + string_length(&self.alarm_id)
                + optional_width(&self.opt_flag, 1)
                + optional_width(&self.result_scale, 1)
                + optional_width(&self.low_limit_scale, 1)
                + optional_width(&self.high_limit_scale, 1)
                + optional_width(&self.low_limit, 4)
                + optional_width(&self.high_limit, 4)
                + string_length(&self.units)
                + string_length(&self.result_format)
                + string_length(&self.low_limit_format)
                + string_length(&self.high_limit_format)
                + optional_width(&self.low_spec, 4)
                + optional_width(&self.high_spec, 4),
        )
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, self.wire_length()?)?;
        writer.u32(self.test_number)?;
        writer.u8(self.head)?;
        writer.u8(self.site)?;
        writer.u8(self.test_flags)?;
        writer.u8(self.parametric_flags)?;
        writer.f32(self.result)?;
        writer.string(&self.test_text)?;
        writer.string(&self.alarm_id)?;
        writer.nullable_u8(self.opt_flag)?;
        writer.nullable_i8(self.result_scale)?;
        writer.nullable_i8(self.low_limit_scale)?;
        writer.nullable_i8(self.high_limit_scale)?;
        writer.nullable_f32(self.low_limit)?;
        writer.nullable_f32(self.high_limit)?;
        writer.string(&self.units)?;
        writer.string(&self.result_format)?;
        writer.string(&self.low_limit_format)?;
        writer.string(&self.high_limit_format)?;
        writer.nullable_f32(self.low_spec)?;
        writer.nullable_f32(self.high_spec)?;
        Ok(writer.finish())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::codec::ValueCodec;
    use crate::error::{Error, Result};
    use crate::records::{Ptr, StdfRecord, Tsr};
    use crate::types::CpuType;

    #[rustfmt::skip]
    const PTR_FULL: [u8; 46] = [
        0x2A, 0x00, 0x0F, 0x0A,
        0xE9, 0x03, 0x00, 0x00,
        0x01, 0x02, 0x00, 0x00,
        0x00, 0x00, 0xC0, 0x3F,
        0x03, b'V', b'd', b'd',
        0x00,
        0x0E,
        0x00, 0xFD, 0xFD,
        0x00, 0x00, 0x80, 0x3F,
        0x00, 0x00, 0x00, 0x40,
        0x01, b'V',
        0x00,
        0x00,
        0x00,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x20, 0x40,
    ];

    #[test]
    fn ptr_full_round_trip() -> Result<()> {
        let mut codec = ValueCodec::new(CpuType::LittleEndian);
        let ptr = Ptr::decode(&PTR_FULL[4..], &mut codec)?;

        assert_eq!(ptr.test_number, 1001);
        assert_eq!(ptr.head, 1);
        assert_eq!(ptr.site, 2);
        assert_eq!(ptr.result, 1.5);
        assert_eq!(ptr.test_text.as_deref(), Some("Vdd"));
        assert_eq!(ptr.alarm_id.as_deref(), Some(""));
        assert_eq!(ptr.opt_flag, Some(0x0E));
        assert_eq!(ptr.result_scale, Some(0));
        assert_eq!(ptr.low_limit_scale, Some(-3));
        assert_eq!(ptr.low_limit, Some(1.0));
        assert_eq!(ptr.high_limit, Some(2.0));
        assert_eq!(ptr.units.as_deref(), Some("V"));
        assert_eq!(ptr.low_spec, Some(0.0));
        assert_eq!(ptr.high_spec, Some(2.5));

        assert_eq!(ptr.wire_length()?, 46);
        assert_eq!(ptr.to_bytes(&codec)?, PTR_FULL.to_vec());

        Ok(())
    }

    #[test]
    fn ptr_helpers() -> Result<()> {
        let mut codec = ValueCodec::new(CpuType::LittleEndian);
        let ptr = Ptr::decode(&PTR_FULL[4..], &mut codec)?;

        assert!(ptr.result_valid());
        assert_eq!(ptr.passed(), Some(true));
        assert_eq!(ptr.scale(), Some(0));
        assert_eq!(ptr.low_test_limit(), Some(1.0));
        assert_eq!(ptr.high_test_limit(), Some(2.0));
        // OPT_FLAG 0x0E marks both spec limits invalid
        assert_eq!(ptr.low_spec_limit(), None);
        assert_eq!(ptr.high_spec_limit(), None);

        let failed = Ptr {
            test_flags: 0x80,
            ..Default::default()
        };
        assert_eq!(failed.passed(), Some(false));
        assert_eq!(failed.low_test_limit(), None);

        let unknown = Ptr {
            test_flags: 0x42,
            ..Default::default()
        };
        assert_eq!(unknown.passed(), None);
        assert!(!unknown.result_valid());

        Ok(())
    }

    #[test]
    fn ptr_fast_path_matches_generic() -> Result<()> {
        for cpu_type in [CpuType::LittleEndian, CpuType::BigEndian] {
            let mut codec = ValueCodec::new(cpu_type);
            let ptr = Ptr {
                test_number: 0x01020304,
                head: 1,
                site: 7,
                test_flags: 0x80,
                parametric_flags: 0x01,
                result: -12.25,
                test_text: Some("Idd".to_string()),
                ..Default::default()
            };
            let bytes = ptr.to_bytes(&codec)?;

            let fast = Ptr::decode(&bytes[4..], &mut codec)?;
            let generic = Ptr::decode_generic(&bytes[4..], &mut codec)?;
            assert_eq!(fast, generic);
            assert_eq!(fast, ptr);
        }

        Ok(())
    }

    #[test]
    fn ptr_prefix_only() -> Result<()> {
        let mut codec = ValueCodec::new(CpuType::BigEndian);
        let ptr = Ptr::decode(&[0, 0, 0, 5, 1, 1, 0, 0, 0x3F, 0x80, 0, 0], &mut codec)?;
        assert_eq!(ptr.test_number, 5);
        assert_eq!(ptr.result, 1.0);
        assert_eq!(ptr.test_text, None);
        assert_eq!(ptr.high_spec, None);
        assert_eq!(ptr.wire_length()?, 16);

        Ok(())
    }

    #[test]
    fn ptr_result_cut_short() {
        let mut codec = ValueCodec::new(CpuType::LittleEndian);
        // RESULT has two of its four bytes, which must not be read as TEST_TXT
        let body = [5, 0, 0, 0, 1, 1, 0, 0, 0x01, 0x41];
        assert!(matches!(
            Ptr::decode(&body, &mut codec),
            Err(Error::InsufficientData { offset: 8, needed: 4, available: 10 })
        ));
        assert!(matches!(
            Ptr::decode(&body[..8], &mut codec),
            Err(Error::InsufficientData { offset: 8, needed: 4, available: 8 })
        ));
    }

    #[test]
    fn ptr_null_before_value() {
        let codec = ValueCodec::default();
        let ptr = Ptr {
            test_text: Some("T".to_string()),
            units: Some("A".to_string()),
            ..Default::default()
        };
        assert!(matches!(ptr.to_bytes(&codec), Err(Error::NonNullAfterNull)));
    }

    #[test]
    fn tsr_round_trip() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x00, 0x26, 0x0A, 0x1E,
            0x01, 0x00, b'P',
            0x00, 0x00, 0x03, 0xE9,
            0x00, 0x00, 0x00, 0x64,
            0x00, 0x00, 0x00, 0x02,
            0x00, 0x00, 0x00, 0x00,
            0x03, b'V', b'd', b'd',
            0x00,
            0x00,
            0x11,
            0x3C, 0x23, 0xD7, 0x0A,
            0x3F, 0x80, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
        ];

        let mut codec = ValueCodec::new(CpuType::BigEndian);
        let tsr = Tsr::decode(&input[4..], &mut codec)?;
        assert_eq!(tsr.test_number, 1001);
        assert_eq!(tsr.exec_count, 100);
        assert_eq!(tsr.fail_count, 2);
        assert_eq!(tsr.test_name.as_deref(), Some("Vdd"));
        assert_eq!(tsr.sequencer_name.as_deref(), Some(""));
        assert_eq!(tsr.opt_flag, Some(0x11));
        assert_eq!(tsr.test_time, Some(0.01));
        assert_eq!(tsr.test_min, Some(1.0));
        assert_eq!(tsr.test_max, Some(2.0));
        assert_eq!(tsr.test_sums, None);

        assert_eq!(tsr.time(), Some(0.01));
        assert_eq!(tsr.min(), None);
        assert_eq!(tsr.max(), Some(2.0));
        assert_eq!(tsr.sums(), None);

        assert_eq!(tsr.to_bytes(&codec)?, input.to_vec());

        Ok(())
    }

    #[test]
    fn tsr_without_statistics() -> Result<()> {
        let tsr = Tsr {
            head: 1,
            site: 1,
            test_type: 'F',
            test_number: 7,
            test_name: Some("Func".to_string()),
            ..Default::default()
        };
        let codec = ValueCodec::new(CpuType::LittleEndian);
        let bytes = tsr.to_bytes(&codec)?;
        assert_eq!(bytes.len(), 4 + 19 + 5);

        let mut codec = codec;
        let decoded = Tsr::decode(&bytes[4..], &mut codec)?;
        assert_eq!(decoded, tsr);
        assert_eq!(decoded.opt_flag, None);
        assert_eq!(decoded.time(), None);

        Ok(())
    }
}
