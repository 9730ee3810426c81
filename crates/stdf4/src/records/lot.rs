//! Lot level records, written once per lot or per site summary

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec::{string_length, ValueCodec},
    error::{Error, Result},
    records::{checked_length, FieldWriter, StdfRecord},
    types::{RecordHeader, RecordType},
};

/// Master Information Record (MIR)
///
/// Holds the setup of the lot. The fixed fields are followed by thirty optional strings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mir {
    /// Date and time of job setup (SETUP_T)
    pub setup_time: u32,
    /// Date and time the first part was tested (START_T)
    pub start_time: u32,
    /// Tester station number (STAT_NUM)
    pub station_number: u8,
    /// Test mode code, such as production or engineering (MODE_COD)
    pub mode_code: char,
    /// Lot retest code (RTST_COD)
    pub retest_code: char,
    /// Data protection code (PROT_COD)
    pub protection_code: char,
    /// Burn-in time in minutes (BURN_TIM)
    pub burn_in_time: u16,
    /// Command mode code (CMOD_COD)
    pub command_mode_code: char,

    /// LOT_ID
    pub lot_id: Option<String>,
    /// PART_TYP
    pub product_id: Option<String>,
    /// NODE_NAM
    pub node_name: Option<String>,
    /// TSTR_TYP
    pub tester_type: Option<String>,
    /// JOB_NAM
    pub job_name: Option<String>,
    /// JOB_REV
    pub job_revision: Option<String>,
    /// SBLOT_ID
    pub sublot_id: Option<String>,
    /// OPER_NAM
    pub operator_name: Option<String>,
    /// EXEC_TYP
    pub exec_type: Option<String>,
    /// EXEC_VER
    pub exec_version: Option<String>,
    /// TEST_COD
    pub test_code: Option<String>,
    /// TST_TEMP
    pub test_temperature: Option<String>,
    /// USER_TXT
    pub user_text: Option<String>,
    /// AUX_FILE
    pub aux_file: Option<String>,
    /// PKG_TYP
    pub package_type: Option<String>,
    /// FAMLY_ID
    pub family_id: Option<String>,
    /// DATE_COD
    pub date_code: Option<String>,
    /// FACIL_ID
    pub facility_id: Option<String>,
    /// FLOOR_ID
    pub floor_id: Option<String>,
    /// PROC_ID
    pub process_id: Option<String>,
    /// OPER_FRQ
    pub operation_frequency: Option<String>,
    /// SPEC_NAM
    pub spec_name: Option<String>,
    /// SPEC_VER
    pub spec_version: Option<String>,
    /// FLOW_ID
    pub flow_id: Option<String>,
    /// SETUP_ID
    pub setup_id: Option<String>,
    /// DSGN_REV
    pub design_revision: Option<String>,
    /// ENG_ID
    pub engineering_id: Option<String>,
    /// ROM_COD
    pub rom_code: Option<String>,
    /// SERL_NUM
    pub serial_number: Option<String>,
    /// SUPR_NAM
    pub supervisor_name: Option<String>,
}

impl Default for Mir {
    fn default() -> Self {
        Mir {
            setup_time: 0,
            start_time: 0,
            station_number: 1,
            mode_code: ' ',
            retest_code: ' ',
            protection_code: ' ',
            burn_in_time: 0,
            command_mode_code: ' ',
            lot_id: None,
            product_id: None,
            node_name: None,
            tester_type: None,
            job_name: None,
            job_revision: None,
            sublot_id: None,
            operator_name: None,
            exec_type: None,
            exec_version: None,
            test_code: None,
            test_temperature: None,
            user_text: None,
            aux_file: None,
            package_type: None,
            family_id: None,
            date_code: None,
            facility_id: None,
            floor_id: None,
            process_id: None,
            operation_frequency: None,
            spec_name: None,
            spec_version: None,
            flow_id: None,
            setup_id: None,
            design_revision: None,
            engineering_id: None,
            rom_code: None,
            serial_number: None,
            supervisor_name: None,
        }
    }
}

impl Mir {
    const FIXED_LENGTH: usize = RecordHeader::SIZE + 15;

    /// The optional strings in wire order
    fn strings(&self) -> [&Option<String>; 30] {
        [
            &self.lot_id,
            &self.product_id,
            &self.node_name,
            &self.tester_type,
            &self.job_name,
            &self.job_revision,
            &self.sublot_id,
            &self.operator_name,
            &self.exec_type,
            &self.exec_version,
            &self.test_code,
            &self.test_temperature,
            &self.user_text,
            &self.aux_file,
            &self.package_type,
            &self.family_id,
            &self.date_code,
            &self.facility_id,
            &self.floor_id,
            &self.process_id,
            &self.operation_frequency,
            &self.spec_name,
            &self.spec_version,
            &self.flow_id,
            &self.setup_id,
            &self.design_revision,
            &self.engineering_id,
            &self.rom_code,
            &self.serial_number,
            &self.supervisor_name,
        ]
    }
}

impl StdfRecord for Mir {
    const RECORD_TYPE: RecordType = RecordType::MIR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        let o = &mut offset;
        Ok(Mir {
            setup_time: codec.read_u32(body, o)?,
            start_time: codec.read_u32(body, o)?,
            station_number: codec.read_u8(body, o)?,
            mode_code: codec.read_char(body, o)?,
            retest_code: codec.read_char(body, o)?,
            protection_code: codec.read_char(body, o)?,
            burn_in_time: codec.read_u16(body, o)?,
            command_mode_code: codec.read_char(body, o)?,
            lot_id: codec.read_string(body, o)?,
            product_id: codec.read_string(body, o)?,
            node_name: codec.read_string(body, o)?,
            tester_type: codec.read_string(body, o)?,
            job_name: codec.read_string(body, o)?,
            job_revision: codec.read_string(body, o)?,
            sublot_id: codec.read_string(body, o)?,
            operator_name: codec.read_string(body, o)?,
            exec_type: codec.read_string(body, o)?,
            exec_version: codec.read_string(body, o)?,
            test_code: codec.read_string(body, o)?,
            test_temperature: codec.read_string(body, o)?,
            user_text: codec.read_string(body, o)?,
            aux_file: codec.read_string(body, o)?,
            package_type: codec.read_string(body, o)?,
            family_id: codec.read_string(body, o)?,
            date_code: codec.read_string(body, o)?,
            facility_id: codec.read_string(body, o)?,
            floor_id: codec.read_string(body, o)?,
            process_id: codec.read_string(body, o)?,
            operation_frequency: codec.read_string(body, o)?,
            spec_name: codec.read_string(body, o)?,
            spec_version: codec.read_string(body, o)?,
            flow_id: codec.read_string(body, o)?,
            setup_id: codec.read_string(body, o)?,
            design_revision: codec.read_string(body, o)?,
            engineering_id: codec.read_string(body, o)?,
            rom_code: codec.read_string(body, o)?,
            serial_number: codec.read_string(body, o)?,
            supervisor_name: codec.read_string(body, o)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        let strings: usize = self.strings().into_iter().map(string_length).sum();
        checked_length(Self::FIXED_LENGTH + strings)
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, self.wire_length()?)?;
        writer.u32(self.setup_time)?;
        writer.u32(self.start_time)?;
        writer.u8(self.station_number)?;
        writer.char(self.mode_code)?;
        writer.char(self.retest_code)?;
        writer.char(self.protection_code)?;
        writer.u16(self.burn_in_time)?;
        writer.char(self.command_mode_code)?;
        for value in self.strings() {
            writer.string(value)?;
        }
        Ok(writer.finish())
    }
}

/// Master Results Record (MRR)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mrr {
    /// Date and time the last part was tested (FINISH_T)
    pub finish_time: u32,
    /// Lot disposition code (DISP_COD)
    pub disposition_code: Option<char>,
    /// Lot description supplied by user (USR_DESC)
    pub user_description: Option<String>,
    /// Lot description supplied by exec (EXC_DESC)
    pub exec_description: Option<String>,
}

impl StdfRecord for Mrr {
    const RECORD_TYPE: RecordType = RecordType::MRR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        Ok(Mrr {
            finish_time: codec.read_u32(body, &mut offset)?,
            disposition_code: codec.read_nullable_char(body, &mut offset),
            user_description: codec.read_string(body, &mut offset)?,
            exec_description: codec.read_string(body, &mut offset)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        checked_length(
            RecordHeader::SIZE
                + 4
                + self.disposition_code.map_or(0, |_| 1)
                + string_length(&self.user_description)
                + string_length(&self.exec_description),
        )
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, self.wire_length()?)?;
        writer.u32(self.finish_time)?;
        writer.nullable_char(self.disposition_code)?;
        writer.string(&self.user_description)?;
        writer.string(&self.exec_description)?;
        Ok(writer.finish())
    }
}

/// Part Count Record (PCR)
///
/// Head 255 marks a summary over all sites.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pcr {
    /// HEAD_NUM
    pub head: u8,
    /// SITE_NUM
    pub site: u8,
    /// Number of parts tested (PART_CNT)
    pub part_count: u32,
    /// Number of parts retested (RTST_CNT)
    pub retest_count: u32,
    /// Number of aborts during testing (ABRT_CNT)
    pub abort_count: u32,
    /// Number of good parts (GOOD_CNT)
    pub good_count: u32,
    /// Number of functional parts tested (FUNC_CNT)
    pub functional_count: u32,
}

impl Pcr {
    const WIRE_LENGTH: u16 = 26;
}

impl StdfRecord for Pcr {
    const RECORD_TYPE: RecordType = RecordType::PCR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        Ok(Pcr {
            head: codec.read_u8(body, &mut offset)?,
            site: codec.read_u8(body, &mut offset)?,
            part_count: codec.read_u32(body, &mut offset)?,
            retest_count: codec.read_u32(body, &mut offset)?,
            abort_count: codec.read_u32(body, &mut offset)?,
            good_count: codec.read_u32(body, &mut offset)?,
            functional_count: codec.read_u32(body, &mut offset)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        Ok(Self::WIRE_LENGTH)
    }

    fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
        let mut writer = FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, Self::WIRE_LENGTH)?;
        writer.u8(self.head)?;
        writer.u8(self.site)?;
        writer.u32(self.part_count)?;
        writer.u32(self.retest_count)?;
        writer.u32(self.abort_count)?;
        writer.u32(self.good_count)?;
        writer.u32(self.functional_count)?;
        Ok(writer.finish())
    }
}

/// Bin layout shared by HBR and SBR
fn decode_bin(body: &[u8], codec: &mut ValueCodec) -> Result<(u8, u8, u16, u32, char, Option<String>)> {
    let mut offset = 0;
    Ok((
        codec.read_u8(body, &mut offset)?,
        codec.read_u8(body, &mut offset)?,
        codec.read_u16(body, &mut offset)?,
        codec.read_u32(body, &mut offset)?,
        codec.read_char(body, &mut offset)?,
        codec.read_string(body, &mut offset)?,
    ))
}

const BIN_FIXED_LENGTH: usize = RecordHeader::SIZE + 9;

macro_rules! bin_record {
    ($(#[$meta:meta])* $name:ident, $record_type:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name {
            /// HEAD_NUM, 255 for a summary over all heads
            pub head: u8,
            /// SITE_NUM
            pub site: u8,
            /// Bin number
            pub bin: u16,
            /// Number of parts in the bin
            pub count: u32,
            /// `P` pass, `F` fail, space for unknown
            pub pass_fail: char,
            /// Name of the bin
            pub name: Option<String>,
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    head: 255,
                    site: 0,
                    bin: 0,
                    count: 0,
                    pass_fail: ' ',
                    name: None,
                }
            }
        }

        impl StdfRecord for $name {
            const RECORD_TYPE: RecordType = $record_type;

            fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
                let (head, site, bin, count, pass_fail, name) = decode_bin(body, codec)?;
                Ok($name {
                    head,
                    site,
                    bin,
                    count,
                    pass_fail,
                    name,
                })
            }

            fn wire_length(&self) -> Result<u16> {
                checked_length(BIN_FIXED_LENGTH + string_length(&self.name))
            }

            fn encode(&self, dest: &mut [u8], offset: usize, codec: &ValueCodec) -> Result<u16> {
                let mut writer =
                    FieldWriter::begin(codec, dest, offset, Self::RECORD_TYPE, self.wire_length()?)?;
                writer.u8(self.head)?;
                writer.u8(self.site)?;
                writer.u16(self.bin)?;
                writer.u32(self.count)?;
                writer.char(self.pass_fail)?;
                writer.string(&self.name)?;
                Ok(writer.finish())
            }
        }
    };
}

bin_record!(
    /// Hardware Bin Record (HBR)
    Hbr,
    RecordType::HBR
);

bin_record!(
    /// Software Bin Record (SBR)
    Sbr,
    RecordType::SBR
);

/// Site Description Record (SDR)
///
/// Describes the handler, probe card and other equipment of a site group. Decode only.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sdr {
    /// HEAD_NUM
    pub head: u8,
    /// SITE_GRP
    pub site_group: u8,
    /// Site numbers in the group (SITE_NUM), prefixed by SITE_CNT on the wire
    pub sites: Vec<u8>,

    /// HAND_TYP
    pub handler_type: Option<String>,
    /// HAND_ID
    pub handler_id: Option<String>,
    /// CARD_TYP
    pub card_type: Option<String>,
    /// CARD_ID
    pub card_id: Option<String>,
    /// LOAD_TYP
    pub load_type: Option<String>,
    /// LOAD_ID
    pub load_id: Option<String>,
    /// DIB_TYP
    pub dib_type: Option<String>,
    /// DIB_ID
    pub dib_id: Option<String>,
    /// CABL_TYP
    pub cable_type: Option<String>,
    /// CABL_ID
    pub cable_id: Option<String>,
    /// CONT_TYP
    pub contactor_type: Option<String>,
    /// CONT_ID
    pub contactor_id: Option<String>,
    /// LASR_TYP
    pub laser_type: Option<String>,
    /// LASR_ID
    pub laser_id: Option<String>,
    /// EXTR_TYP
    pub extra_type: Option<String>,
    /// EXTR_ID
    pub extra_id: Option<String>,
}

impl Sdr {
    fn strings(&self) -> [&Option<String>; 16] {
        [
            &self.handler_type,
            &self.handler_id,
            &self.card_type,
            &self.card_id,
            &self.load_type,
            &self.load_id,
            &self.dib_type,
            &self.dib_id,
            &self.cable_type,
            &self.cable_id,
            &self.contactor_type,
            &self.contactor_id,
            &self.laser_type,
            &self.laser_id,
            &self.extra_type,
            &self.extra_id,
        ]
    }
}

impl StdfRecord for Sdr {
    const RECORD_TYPE: RecordType = RecordType::SDR;

    fn decode(body: &[u8], codec: &mut ValueCodec) -> Result<Self> {
        let mut offset = 0;
        let o = &mut offset;

        let head = codec.read_u8(body, o)?;
        let site_group = codec.read_u8(body, o)?;
        let site_count = codec.read_u8(body, o)?;
        let sites = (0..site_count)
            .map(|_| codec.read_u8(body, o))
            .collect::<Result<Vec<_>>>()?;

        Ok(Sdr {
            head,
            site_group,
            sites,
            handler_type: codec.read_string(body, o)?,
            handler_id: codec.read_string(body, o)?,
            card_type: codec.read_string(body, o)?,
            card_id: codec.read_string(body, o)?,
            load_type: codec.read_string(body, o)?,
            load_id: codec.read_string(body, o)?,
            dib_type: codec.read_string(body, o)?,
            dib_id: codec.read_string(body, o)?,
            cable_type: codec.read_string(body, o)?,
            cable_id: codec.read_string(body, o)?,
            contactor_type: codec.read_string(body, o)?,
            contactor_id: codec.read_string(body, o)?,
            laser_type: codec.read_string(body, o)?,
            laser_id: codec.read_string(body, o)?,
            extra_type: codec.read_string(body, o)?,
            extra_id: codec.read_string(body, o)?,
        })
    }

    fn wire_length(&self) -> Result<u16> {
        let strings: usize = self.strings().into_iter().map(string_length).sum();
        checked_length(RecordHeader::SIZE + 3 + self.sites.len() + strings)
    }

    fn encode(&self, _dest: &mut [u8], _offset: usize, _codec: &ValueCodec) -> Result<u16> {
        Err(Error::NotImplemented(Self::RECORD_TYPE.name()))
    }
}
