//! This library handles reading from and creating **STDF** version 4 files produced by
//! semiconductor automated test equipment.
//!
//! # STDF V4 Format Documentation
//!
//! The Standard Test Data Format is a stream of length prefixed records. A file holds no
//! index or trailer, it is read front to back. STDF files are typically identified with the
//! `.stdf` or `.std` extension.
//!
//! ## Record Structure
//!
//! Every record starts with a four byte header, followed by the record body.
//!
//! | Offset (bytes) | Field    | Description                                              |
//! |----------------|----------|----------------------------------------------------------|
//! | 0x0000         | REC_LEN  | 2 bytes: Length of the body, excluding this header       |
//! | 0x0002         | REC_TYP  | 1 byte: Record type, the group of the record             |
//! | 0x0003         | REC_SUB  | 1 byte: Record sub-type within the group                 |
//! | 0x0004         | Body     | `REC_LEN` bytes of fields                                |
//!
//! The type and sub-type together select the record kind, for example `(15, 10)` is a
//! Parametric Test Record. [`types::RecordType`] lists every kind.
//!
//! ### Byte Order
//!
//! The first record of a file is always the File Attributes Record (FAR). Its first body
//! byte, CPU_TYPE, declares the byte order of every multi-byte field in the file:
//!
//! - `1`: Big endian (Sun)
//! - `2`: Little endian (DEC, Intel)
//!
//! Since the FAR length is read before the byte order is known, the FAR body is always
//! treated as two bytes long.
//!
//! ### Field Types
//!
//! | Code   | Description                                                         |
//! |--------|---------------------------------------------------------------------|
//! | `U*1`  | Unsigned 1 byte integer                                             |
//! | `U*2`  | Unsigned 2 byte integer                                             |
//! | `U*4`  | Unsigned 4 byte integer                                             |
//! | `I*1`  | Signed 1 byte integer                                               |
//! | `I*2`  | Signed 2 byte integer                                               |
//! | `R*4`  | 4 byte IEEE float                                                   |
//! | `C*1`  | Single character                                                    |
//! | `C*n`  | 1 byte length followed by up to 255 characters, no terminator       |
//! | `B*n`  | 1 byte length followed by up to 255 bytes                           |
//!
//! ### Optional Fields
//!
//! A record may end before its last fields. Missing trailing fields are absent, which is
//! different from an empty string. When writing, a record can only be cut short: a field
//! cannot be set once an earlier one was left out.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.stdf`, `.std`
//! - **Endianness**: Declared by the FAR record
//! - **Maximum record size**: 65535 bytes, header included
//!

pub mod codec;
pub mod error;
pub mod read;
pub mod records;
pub mod registry;
pub mod types;
pub mod write;

pub use codec::ValueCodec;
pub use read::{parse, ParseOptions, ParseOutcome, Stdf4Parser};
pub use records::{Record, StdfRecord};
pub use types::{CpuType, RecordType};
pub use write::StdfWriter;
