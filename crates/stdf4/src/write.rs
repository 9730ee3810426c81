//! Types for writing STDF record streams
//!

use bon::Builder;
use std::fmt::Debug;
use std::io::Write;
use tracing::{instrument, Level};

use crate::{
    codec::ValueCodec,
    error::Result,
    records::Record,
    types::CpuType,
};

/// Options for how the STDF stream should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct StdfWriterOptions {
    /// Byte order used until a FAR record declares another one
    #[builder(default)]
    pub cpu_type: CpuType,
}

impl Default for StdfWriterOptions {
    fn default() -> Self {
        StdfWriterOptions::builder().build()
    }
}

/// STDF stream generator
///
/// Records are encoded back to back. Writing a FAR switches the byte order of that
/// record and every one after it to the CPU type it declares.
///
/// ```
/// # fn doit() -> stdf4::error::Result<()>
/// # {
/// use stdf4::records::{Far, Pir, Record};
/// use stdf4::types::CpuType;
/// use stdf4::write::{StdfWriter, StdfWriterOptions};
///
/// let mut writer = StdfWriter::new(Vec::new(), StdfWriterOptions::default());
/// writer.write_record(&Record::Far(Far::new(CpuType::BigEndian)))?;
/// writer.write_record(&Record::Pir(Pir { head: 1, site: 1 }))?;
///
/// let bytes = writer.finish()?;
/// assert_eq!(bytes, [0x00, 0x02, 0x00, 0x0A, 0x01, 0x04, 0x00, 0x02, 0x05, 0x0A, 0x01, 0x01]);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct StdfWriter<W: Write> {
    inner: W,
    codec: ValueCodec,
    buffer: Vec<u8>,
    records_written: usize,
}

impl<W: Write> Debug for StdfWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdfWriter")
            .field("cpu_type", &self.codec.write_cpu_type())
            .field("records_written", &self.records_written)
            .finish()
    }
}

impl<W: Write> StdfWriter<W> {
    /// Wrap a writer, nothing is written until the first record
    pub fn new(inner: W, options: StdfWriterOptions) -> Self {
        StdfWriter {
            inner,
            codec: ValueCodec::new(options.cpu_type),
            buffer: Vec::with_capacity(u16::MAX as usize),
            records_written: 0,
        }
    }

    /// Byte order of the next record
    pub fn cpu_type(&self) -> CpuType {
        self.codec.write_cpu_type()
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Encode one record, returns the bytes written
    ///
    /// Nothing is written when encoding fails. A FAR only changes the byte order once it
    /// has been written.
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(record = record.name()))]
    pub fn write_record(&mut self, record: &Record) -> Result<u16> {
        let far_codec = match record {
            Record::Far(far) => {
                let mut codec = self.codec.clone();
                codec.set_cpu_type(far.cpu_type)?;
                Some(codec)
            }
            _ => None,
        };
        let codec = far_codec.as_ref().unwrap_or(&self.codec);

        self.buffer.resize(record.wire_length()? as usize, 0);
        let written = record.encode(&mut self.buffer, 0, codec)?;
        self.inner.write_all(&self.buffer[..written as usize])?;

        if let Some(codec) = far_codec {
            self.codec = codec;
        }
        self.records_written += 1;
        Ok(written)
    }

    /// Encode records in order, stopping at the first failure
    pub fn write_all_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush and return the inner writer
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::io::Write;

    use crate::error::{Error, Result};
    use crate::records::{Dtr, Far, Prr, Record};
    use crate::types::CpuType;
    use crate::write::{StdfWriter, StdfWriterOptions};

    #[test]
    fn writes_in_option_order_until_far() -> Result<()> {
        let options = StdfWriterOptions::builder()
            .cpu_type(CpuType::BigEndian)
            .build();
        let mut writer = StdfWriter::new(Vec::new(), options);
        assert_eq!(writer.cpu_type(), CpuType::BigEndian);

        let dtr = Record::Dtr(Dtr {
            text: Some("a".to_string()),
        });
        writer.write_record(&dtr)?;
        writer.write_record(&Record::Far(Far::new(CpuType::LittleEndian)))?;
        writer.write_record(&dtr)?;
        assert_eq!(writer.cpu_type(), CpuType::LittleEndian);
        assert_eq!(writer.records_written(), 3);

        #[rustfmt::skip]
        let expected = vec![
            0x00, 0x02, 0x32, 0x1E, 0x01, b'a',
            0x02, 0x00, 0x00, 0x0A, 0x02, 0x04,
            0x02, 0x00, 0x32, 0x1E, 0x01, b'a',
        ];
        assert_eq!(writer.finish()?, expected);

        Ok(())
    }

    #[test]
    fn decode_only_records_are_rejected() -> Result<()> {
        let mut writer = StdfWriter::new(Vec::new(), StdfWriterOptions::default());
        let result = writer.write_all_records(&[
            Record::Far(Far::default()),
            Record::Prr(Prr::default()),
        ]);
        assert!(matches!(result, Err(Error::NotImplemented("PRR"))));
        assert_eq!(writer.records_written(), 1);
        assert_eq!(writer.finish()?.len(), 6);

        Ok(())
    }

    #[test]
    fn unsupported_cpu_type() {
        let mut writer = StdfWriter::new(Vec::new(), StdfWriterOptions::default());
        let far = Record::Far(Far {
            cpu_type: 0,
            stdf_version: 4,
        });
        assert!(matches!(
            writer.write_record(&far),
            Err(Error::UnsupportedCpuType(0))
        ));
        assert_eq!(writer.cpu_type(), CpuType::native());
    }

    struct Refusing;

    impl Write for Refusing {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("refused"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_far_keeps_byte_order() {
        let options = StdfWriterOptions::builder()
            .cpu_type(CpuType::LittleEndian)
            .build();
        let mut writer = StdfWriter::new(Refusing, options);

        let far = Record::Far(Far::new(CpuType::BigEndian));
        assert!(matches!(writer.write_record(&far), Err(Error::IOError(_))));
        assert_eq!(writer.cpu_type(), CpuType::LittleEndian);
        assert_eq!(writer.records_written(), 0);
    }
}
