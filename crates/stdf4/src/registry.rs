//! Mapping from wire codes to the way each record kind is handled

use crate::{
    codec::ValueCodec,
    error::Result,
    records::{
        Dtr, Far, Hbr, Mir, Mrr, Pcr, Pir, Prr, Ptr, Record, Sbr, Sdr, StdfRecord, Tsr, Wcr, Wir,
        Wrr,
    },
    types::{self, RecordType},
};

/// How the parser treats a record code
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Decoded into a [`Record`]
    Implemented(RecordType),

    /// Known kind that is skipped and counted
    Ignored(RecordType),

    /// Declared kind with no handling, PLR, MPR and FTR
    Unregistered(RecordType),

    /// Code outside the record type table
    Unknown(u16),
}

/// Look up how a wire code is handled
pub fn resolve(code: u16) -> Disposition {
    resolve_with(code, RecordType::WRR.minor())
}

/// Look up how a wire code is handled, with WRR records tagged by `wrr_subtype`
///
/// The `(2, wrr_subtype)` code wins over any other kind sharing it.
pub fn resolve_with(code: u16, wrr_subtype: u8) -> Disposition {
    if code == types::code(RecordType::WRR.major(), wrr_subtype) {
        return Disposition::Implemented(RecordType::WRR);
    }

    let Some(record_type) = RecordType::from_code(code) else {
        return Disposition::Unknown(code);
    };

    match record_type {
        RecordType::FAR
        | RecordType::MIR
        | RecordType::MRR
        | RecordType::PCR
        | RecordType::HBR
        | RecordType::SBR
        | RecordType::SDR
        | RecordType::WIR
        | RecordType::WRR
        | RecordType::WCR
        | RecordType::PIR
        | RecordType::PRR
        | RecordType::TSR
        | RecordType::PTR
        | RecordType::DTR => Disposition::Implemented(record_type),

        RecordType::ATR
        | RecordType::PMR
        | RecordType::PGR
        | RecordType::RDR
        | RecordType::BPS
        | RecordType::EPS
        | RecordType::GDR => Disposition::Ignored(record_type),

        RecordType::PLR | RecordType::MPR | RecordType::FTR => {
            Disposition::Unregistered(record_type)
        }
    }
}

/// Decode a record body of the given kind
///
/// Returns `None` for kinds that have no decoder.
pub fn decode(record_type: RecordType, body: &[u8], codec: &mut ValueCodec) -> Result<Option<Record>> {
    let record: Record = match record_type {
        RecordType::PTR => Ptr::decode(body, codec)?.into(),
        RecordType::PIR => Pir::decode(body, codec)?.into(),
        RecordType::PRR => Prr::decode(body, codec)?.into(),
        RecordType::FAR => Far::decode(body, codec)?.into(),
        RecordType::MIR => Mir::decode(body, codec)?.into(),
        RecordType::MRR => Mrr::decode(body, codec)?.into(),
        RecordType::PCR => Pcr::decode(body, codec)?.into(),
        RecordType::HBR => Hbr::decode(body, codec)?.into(),
        RecordType::SBR => Sbr::decode(body, codec)?.into(),
        RecordType::SDR => Sdr::decode(body, codec)?.into(),
        RecordType::WIR => Wir::decode(body, codec)?.into(),
        RecordType::WRR => Wrr::decode(body, codec)?.into(),
        RecordType::WCR => Wcr::decode(body, codec)?.into(),
        RecordType::TSR => Tsr::decode(body, codec)?.into(),
        RecordType::DTR => Dtr::decode(body, codec)?.into(),
        _ => return Ok(None),
    };
    Ok(Some(record))
}
