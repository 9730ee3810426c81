//! Base types for structure of STDF files.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use derive_more::derive::Display;
use std::{
    io::{Read, Write},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Byte order declared by the CPU type field of the FAR record
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum CpuType {
    /// Sun 1, 2, 3 and 4 computers, big endian
    BigEndian = 1,

    /// DEC, Intel and compatibles, little endian
    LittleEndian = 2,
}

impl CpuType {
    /// The byte order of the machine running this library
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            CpuType::LittleEndian
        } else {
            CpuType::BigEndian
        }
    }

    /// Whether values need to be reversed to move between this order and the native one
    pub const fn is_reversed(self) -> bool {
        !matches!(
            (self, Self::native()),
            (CpuType::BigEndian, CpuType::BigEndian) | (CpuType::LittleEndian, CpuType::LittleEndian)
        )
    }
}

impl Default for CpuType {
    fn default() -> Self {
        Self::native()
    }
}

impl TryFrom<u8> for CpuType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(CpuType::BigEndian),
            2 => Ok(CpuType::LittleEndian),
            other => Err(Error::UnsupportedCpuType(other)),
        }
    }
}

impl From<CpuType> for u8 {
    fn from(value: CpuType) -> Self {
        value as u8
    }
}

/// Every record type the STDF V4 specification declares
///
/// The discriminant is the wire code, `major << 8 | minor`.
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum RecordType {
    /// File Attributes Record
    FAR = 0x000A,
    /// Audit Trail Record
    ATR = 0x0014,

    /// Master Information Record
    MIR = 0x010A,
    /// Master Results Record
    MRR = 0x0114,
    /// Part Count Record
    PCR = 0x011E,
    /// Hardware Bin Record
    HBR = 0x0128,
    /// Software Bin Record
    SBR = 0x0132,
    /// Pin Map Record
    PMR = 0x013C,
    /// Pin Group Record
    PGR = 0x013E,
    /// Pin List Record
    PLR = 0x013F,
    /// Retest Data Record
    RDR = 0x0146,
    /// Site Description Record
    SDR = 0x0150,

    /// Wafer Information Record
    WIR = 0x020A,
    /// Wafer Results Record
    WRR = 0x0214,
    /// Wafer Configuration Record
    WCR = 0x021E,

    /// Part Information Record
    PIR = 0x050A,
    /// Part Results Record
    PRR = 0x0514,

    /// Test Synopsis Record
    TSR = 0x0A1E,

    /// Parametric Test Record
    PTR = 0x0F0A,
    /// Multiple-Result Parametric Record
    MPR = 0x0F0F,
    /// Functional Test Record
    FTR = 0x0F14,

    /// Begin Program Section Record
    BPS = 0x140A,
    /// End Program Section Record
    EPS = 0x1414,

    /// Generic Data Record
    GDR = 0x320A,
    /// Datalog Text Record
    DTR = 0x321E,
}

impl RecordType {
    /// All declared record types in wire code order
    pub const ALL: [RecordType; 25] = [
        RecordType::FAR,
        RecordType::ATR,
        RecordType::MIR,
        RecordType::MRR,
        RecordType::PCR,
        RecordType::HBR,
        RecordType::SBR,
        RecordType::PMR,
        RecordType::PGR,
        RecordType::PLR,
        RecordType::RDR,
        RecordType::SDR,
        RecordType::WIR,
        RecordType::WRR,
        RecordType::WCR,
        RecordType::PIR,
        RecordType::PRR,
        RecordType::TSR,
        RecordType::PTR,
        RecordType::MPR,
        RecordType::FTR,
        RecordType::BPS,
        RecordType::EPS,
        RecordType::GDR,
        RecordType::DTR,
    ];

    /// Combined wire code, `major << 8 | minor`
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Record type (REC_TYP)
    pub const fn major(self) -> u8 {
        (self.code() >> 8) as u8
    }

    /// Record sub-type (REC_SUB)
    pub const fn minor(self) -> u8 {
        (self.code() & 0xFF) as u8
    }

    /// Look up a declared record type by its wire code
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Look up a declared record type by its major and minor type
    pub fn from_parts(major: u8, minor: u8) -> Option<Self> {
        Self::from_code(code(major, minor))
    }

    /// Three letter record name
    pub fn name(self) -> &'static str {
        match self {
            RecordType::FAR => "FAR",
            RecordType::ATR => "ATR",
            RecordType::MIR => "MIR",
            RecordType::MRR => "MRR",
            RecordType::PCR => "PCR",
            RecordType::HBR => "HBR",
            RecordType::SBR => "SBR",
            RecordType::PMR => "PMR",
            RecordType::PGR => "PGR",
            RecordType::PLR => "PLR",
            RecordType::RDR => "RDR",
            RecordType::SDR => "SDR",
            RecordType::WIR => "WIR",
            RecordType::WRR => "WRR",
            RecordType::WCR => "WCR",
            RecordType::PIR => "PIR",
            RecordType::PRR => "PRR",
            RecordType::TSR => "TSR",
            RecordType::PTR => "PTR",
            RecordType::MPR => "MPR",
            RecordType::FTR => "FTR",
            RecordType::BPS => "BPS",
            RecordType::EPS => "EPS",
            RecordType::GDR => "GDR",
            RecordType::DTR => "DTR",
        }
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownRecordName(s.to_owned()))
    }
}

/// Combine a major and minor type into a wire code
pub const fn code(major: u8, minor: u8) -> u16 {
    ((major as u16) << 8) | minor as u16
}

/// The four bytes in front of every record
///
/// `length` counts only the body that follows the header.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    /// Bytes of data following the header (REC_LEN)
    pub length: u16,

    /// Record type (REC_TYP)
    pub major: u8,

    /// Record sub-type (REC_SUB)
    pub minor: u8,
}

impl RecordHeader {
    /// Size of the header on the wire
    pub const SIZE: usize = 4;

    /// Combined wire code
    pub const fn code(&self) -> u16 {
        code(self.major, self.minor)
    }

    /// Read a header with the length in the given byte order
    pub fn read<R: Read>(reader: &mut R, cpu_type: CpuType) -> std::io::Result<Self> {
        let length = match cpu_type {
            CpuType::BigEndian => reader.read_u16::<BigEndian>()?,
            CpuType::LittleEndian => reader.read_u16::<LittleEndian>()?,
        };

        Ok(RecordHeader {
            length,
            major: reader.read_u8()?,
            minor: reader.read_u8()?,
        })
    }

    /// Write a header with the length in the given byte order
    pub fn write<W: Write>(&self, writer: &mut W, cpu_type: CpuType) -> std::io::Result<()> {
        match cpu_type {
            CpuType::BigEndian => writer.write_u16::<BigEndian>(self.length)?,
            CpuType::LittleEndian => writer.write_u16::<LittleEndian>(self.length)?,
        }
        writer.write_u8(self.major)?;
        writer.write_u8(self.minor)?;
        Ok(())
    }
}
