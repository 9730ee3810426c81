//! Types for reading STDF record streams
//!

use bon::Builder;
use indexmap::IndexMap;
use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
    codec::ValueCodec,
    error::{Error, Result},
    records::{Far, Record},
    registry::{self, Disposition},
    types::{RecordHeader, RecordType},
};

/// Options for how a stream should be parsed
#[derive(Debug, Clone, Copy, Builder)]
pub struct ParseOptions {
    /// Decode every record but keep none of them, used for timing
    #[builder(default)]
    pub discard_records: bool,

    /// Amount of per record logging, from 0 (none) to 3 (every record)
    #[builder(default)]
    pub debug_level: u8,

    /// End the parse after the first record of this kind
    pub stop_after: Option<RecordType>,

    /// Capacity reserved for the record list
    #[builder(default = 4096)]
    pub initial_capacity: usize,

    /// Count PLR, MPR and FTR records as ignored instead of marking the parse invalid
    #[builder(default)]
    pub unregistered_as_ignored: bool,

    /// Sub-type decoded as a WRR
    ///
    /// Some writers tag WRR records with the WIR sub-type 10. Setting this to 10 decodes
    /// every `(2, 10)` record as a WRR.
    #[builder(default = RecordType::WRR.minor())]
    pub wrr_subtype: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::builder().build()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    Start,
    ReadHeader,
    ReadBody(RecordHeader),
    Dispatch(RecordHeader),
    Eof,
    Fatal,
}

/// Everything a parse produced
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// Decoded records in stream order
    pub records: Vec<Record>,

    /// Occurrences of each skipped record kind, by name
    pub ignored_type_counts: IndexMap<String, usize>,

    /// No unknown kinds and no malformed records were found
    pub is_valid: bool,

    /// Message of the last problem found
    pub invalid_message: Option<String>,

    /// Record headers consumed from the stream
    pub records_read: usize,
}

/// Reader for STDF V4 record streams
///
/// One parser owns one [`ValueCodec`], so it reads one stream at a time. Parse several
/// files in parallel with one parser each.
///
/// ```
/// # fn doit() -> stdf4::error::Result<()>
/// # {
/// use stdf4::{read::ParseOptions, Stdf4Parser};
///
/// let bytes = [0x02, 0x00, 0x00, 0x0A, 0x02, 0x04, 0x02, 0x00, 0x05, 0x0A, 0x01, 0x01];
///
/// let mut parser = Stdf4Parser::new(ParseOptions::default());
/// assert!(parser.try_parse(&bytes[..]));
/// assert_eq!(parser.records().len(), 2);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug)]
pub struct Stdf4Parser {
    options: ParseOptions,
    codec: ValueCodec,
    records: Vec<Record>,
    ignored_type_counts: IndexMap<String, usize>,
    is_valid: bool,
    invalid_message: Option<String>,
    records_read: usize,
}

impl Default for Stdf4Parser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl Stdf4Parser {
    /// Create a parser, nothing is read until [`try_parse`](Self::try_parse)
    pub fn new(options: ParseOptions) -> Self {
        Stdf4Parser {
            options,
            codec: ValueCodec::default(),
            records: Vec::new(),
            ignored_type_counts: IndexMap::new(),
            is_valid: true,
            invalid_message: None,
            records_read: 0,
        }
    }

    /// The options this parser was created with
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Records decoded by the last parse
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Take the records decoded by the last parse
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Occurrences of each skipped record kind, by name
    pub fn ignored_type_counts(&self) -> &IndexMap<String, usize> {
        &self.ignored_type_counts
    }

    /// Whether the last parse found no problems
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Message of the last problem found, earlier ones are only logged
    pub fn invalid_message(&self) -> Option<&str> {
        self.invalid_message.as_deref()
    }

    /// Record headers consumed by the last parse
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Everything the last parse produced
    pub fn into_outcome(self) -> ParseOutcome {
        ParseOutcome {
            records: self.records,
            ignored_type_counts: self.ignored_type_counts,
            is_valid: self.is_valid,
            invalid_message: self.invalid_message,
            records_read: self.records_read,
        }
    }

    /// Open and parse a file
    ///
    /// Fails only when the file cannot be opened, problems in its contents are reported
    /// through [`is_valid`](Self::is_valid).
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        let file = File::open(path.as_ref())?;
        Ok(self.try_parse(BufReader::new(file)))
    }

    /// Parse a whole stream, replacing the results of any earlier parse
    ///
    /// Reads until the end of the stream, a malformed record, or the record kind set in
    /// [`ParseOptions::stop_after`]. Returns [`is_valid`](Self::is_valid).
    #[instrument(skip_all)]
    pub fn try_parse<R: Read>(&mut self, mut reader: R) -> bool {
        self.reset();

        let mut body = Vec::with_capacity(u16::MAX as usize);
        let mut state = State::Start;

        loop {
            state = match state {
                State::Start => State::ReadHeader,

                State::ReadHeader => match RecordHeader::read(&mut reader, self.codec.cpu_type()) {
                    Ok(mut header) => {
                        self.records_read += 1;
                        // byte order is unknown until the FAR has been read
                        if header.code() == RecordType::FAR.code() {
                            header.length = Far::BODY_LENGTH as u16;
                        }
                        State::ReadBody(header)
                    }
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                        debug!("end of stream after {} records", self.records_read);
                        State::Eof
                    }
                    Err(e) => {
                        self.fail(e.into());
                        State::Fatal
                    }
                },

                State::ReadBody(header) => {
                    body.resize(header.length as usize, 0);
                    match reader.read_exact(&mut body) {
                        Ok(()) => State::Dispatch(header),
                        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                            warn!(
                                "stream ended inside a ({}, {}) record of length {}",
                                header.major, header.minor, header.length
                            );
                            State::Eof
                        }
                        Err(e) => {
                            self.fail(e.into());
                            State::Fatal
                        }
                    }
                }

                State::Dispatch(header) => match self.dispatch(header, &body) {
                    Ok(true) => State::ReadHeader,
                    Ok(false) => State::Eof,
                    Err(e) => {
                        self.fail(e);
                        State::Fatal
                    }
                },

                State::Eof | State::Fatal => break,
            };
        }

        info!(
            records = self.records.len(),
            read = self.records_read,
            ignored = self.ignored_type_counts.values().sum::<usize>(),
            valid = self.is_valid,
            "parse finished"
        );
        self.is_valid
    }

    fn reset(&mut self) {
        self.codec = ValueCodec::default();
        self.records = if self.options.discard_records {
            Vec::new()
        } else {
            Vec::with_capacity(self.options.initial_capacity)
        };
        self.ignored_type_counts.clear();
        self.is_valid = true;
        self.invalid_message = None;
        self.records_read = 0;
    }

    /// Handle one record, returns whether to keep reading
    fn dispatch(&mut self, header: RecordHeader, body: &[u8]) -> Result<bool> {
        if self.options.debug_level >= 2 {
            trace!(
                "({}, {}) length {}: {:02X?}",
                header.major,
                header.minor,
                header.length,
                body
            );
        }

        let disposition = match registry::resolve_with(header.code(), self.options.wrr_subtype) {
            Disposition::Unregistered(record_type) if self.options.unregistered_as_ignored => {
                Disposition::Ignored(record_type)
            }
            disposition => disposition,
        };

        match disposition {
            Disposition::Implemented(record_type) => {
                if let Some(record) = registry::decode(record_type, body, &mut self.codec)? {
                    if let Record::Far(far) = &record {
                        self.codec.set_cpu_type(far.cpu_type)?;
                        debug!("byte order set to {}", self.codec.cpu_type());
                    }

                    self.log_record(&header, &record);
                    if !self.options.discard_records {
                        self.records.push(record);
                    }
                }
            }
            Disposition::Ignored(record_type) => {
                *self
                    .ignored_type_counts
                    .entry(record_type.name().to_owned())
                    .or_default() += 1;
            }
            Disposition::Unregistered(record_type) => {
                self.mark_invalid(format!(
                    "record type {} ({}, {}) is not supported",
                    record_type, header.major, header.minor
                ));
            }
            Disposition::Unknown(_) => {
                self.mark_invalid(format!(
                    "unknown record type ({}, {}) with length {}",
                    header.major, header.minor, header.length
                ));
            }
        }

        match self.options.stop_after {
            Some(kind) if kind.code() == header.code() => {
                debug!("stopping after the first {kind}");
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    fn log_record(&self, header: &RecordHeader, record: &Record) {
        match self.options.debug_level {
            0 => {}
            1 | 2 => {
                if !matches!(header.major, 5 | 10 | 15) {
                    debug!("{} ({}, {}) length {}", record.name(), header.major, header.minor, header.length);
                }
            }
            _ => debug!("{record:?}"),
        }
    }

    fn mark_invalid(&mut self, message: String) {
        warn!("{message}");
        self.is_valid = false;
        self.invalid_message = Some(message);
    }

    fn fail(&mut self, err: Error) {
        error!("{err}");
        self.is_valid = false;
        self.invalid_message = Some(err.to_string());
    }
}

/// Parse a whole stream with a new parser
pub fn parse<R: Read>(reader: R, options: ParseOptions) -> ParseOutcome {
    let mut parser = Stdf4Parser::new(options);
    parser.try_parse(reader);
    parser.into_outcome()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::read::{parse, ParseOptions, Stdf4Parser};
    use crate::records::{Far, Pir, Record};
    use crate::types::RecordType;

    #[test]
    fn default_options() {
        let options = ParseOptions::default();
        assert!(!options.discard_records);
        assert_eq!(options.debug_level, 0);
        assert_eq!(options.stop_after, None);
        assert_eq!(options.initial_capacity, 4096);
        assert!(!options.unregistered_as_ignored);
        assert_eq!(options.wrr_subtype, 20);

        let options = ParseOptions::builder()
            .debug_level(3)
            .stop_after(RecordType::MIR)
            .build();
        assert_eq!(options.debug_level, 3);
        assert_eq!(options.stop_after, Some(RecordType::MIR));
    }

    #[test]
    fn empty_stream() {
        let outcome = parse(std::io::empty(), ParseOptions::default());
        assert!(outcome.is_valid);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.records_read, 0);
    }

    #[test]
    fn far_length_is_forced() {
        // a nonsense length on the FAR is replaced by 2
        #[rustfmt::skip]
        let input = [
            0xFF, 0xFF, 0x00, 0x0A, 0x02, 0x04,
            0x02, 0x00, 0x05, 0x0A, 0x01, 0x02,
        ];

        let mut parser = Stdf4Parser::default();
        assert!(parser.try_parse(&input[..]));
        assert_eq!(
            parser.records(),
            &[
                Record::Far(Far {
                    cpu_type: 2,
                    stdf_version: 4
                }),
                Record::Pir(Pir { head: 1, site: 2 }),
            ]
        );
        assert_eq!(parser.records_read(), 2);
    }

    #[test]
    fn parse_again_resets() {
        let input = [0x02, 0x00, 0x00, 0x0A, 0x02, 0x04, 0x00, 0x00, 0x63, 0x01];

        let mut parser = Stdf4Parser::default();
        assert!(!parser.try_parse(&input[..]));
        assert!(parser.invalid_message().is_some());

        assert!(parser.try_parse(&input[..6]));
        assert!(parser.invalid_message().is_none());
        assert_eq!(parser.records().len(), 1);
    }

    #[test]
    fn missing_file() {
        let mut parser = Stdf4Parser::default();
        assert!(parser.parse_file("does/not/exist.stdf").is_err());
    }
}
