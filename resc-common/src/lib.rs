// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt, io, num::ParseIntError, rc::Rc};

use deku::prelude::*;

mod diagnostics;

pub use diagnostics::{DiagMessage, Diagnostics, Severity, Source};

/// Common error type making it easier to share `Result`s between the resc crates.
///
/// In general designed to avoid needing utilities like `map_err`.
#[derive(Debug, Clone)]
pub enum ResError {
    /// A chunk header violated one of the size invariants while reading a
    /// binary document. The reader that hit it is now permanently in its bad
    /// state.
    MalformedChunk(String),
    /// A string pool chunk was structurally valid as a chunk but its header,
    /// index array or string data is inconsistent.
    MalformedStringPool(String),
    /// A string pool index was read from a binary document but the pool does
    /// not have that many strings.
    StringPoolIndexOutOfRange(u32),
    /// String pool lengths are stored in 15 bits for UTF-8 pools, so strings
    /// longer than `0x7FFF` bytes must use a UTF-16 pool instead.
    StringPoolStringTooLong(String),
    /// Serialising or deserialising a fixed binary struct failed. See
    /// [DekuError].
    ByteSerialisationFailed(DekuError),
    /// Parsing failed while reading a text XML document. See
    /// [xml::reader::Error].
    XmlParsingFailed(xml::reader::Error),
    /// The XML document ended without a root element.
    MissingRootElement(String),
    /// An attribute value was expected to be an integer but was not.
    IntegerAttributeParsingFailed(ParseIntError),
    /// A reference such as `@drawable/preview` did not have the expected
    /// `[package:]type/name` shape.
    ReferenceAttributeParsingFailed(String),
    /// A resource name in text form (`package:type/entry`) was malformed.
    InvalidResourceName(String),
    /// A value refers to a resource name whose id is not known at flatten
    /// time.
    UnresolvedReference(String),
    /// Linking accumulated this many error diagnostics. The individual
    /// messages live in the [Diagnostics] that was passed in.
    LinkFailed { errors: usize },
    /// The intermediate message has no populated case that this toolchain
    /// understands.
    ///
    /// **This means the producing and consuming toolchains disagree on the
    /// schema version. It is never caused by user input.**
    UnrecognizedIntermediateVariant(&'static str),
    /// The intermediate message decoded, but its contents are inconsistent
    /// (for example a source path index past the end of the source pool).
    InvalidIntermediate(String),
    /// Decoding the intermediate protobuf bytes failed.
    IntermediateDecodingFailed(prost::DecodeError),
    /// An overlayable policy value outside the known set.
    UnknownOverlayablePolicy(i32),
    /// An overlayable entry declares no policy at all.
    OverlayPolicyViolation(String),
    /// A value kind that has no binary representation was asked to flatten.
    ValueNotFlattenable(&'static str),
    /// A primitive carries a data type that belongs to another item kind.
    InvalidPrimitiveType(u8),
    /// A locale could not be expressed in the binary configuration.
    UnsupportedLocale(String),
    /// A binary `ResTable_config` is truncated or carries values outside the
    /// known set.
    MalformedConfiguration(String),
    /// The idmap header does not start with the `IDMP` magic.
    IdmapBadMagic(u32),
    /// The idmap was written by an incompatible version of the generator.
    IdmapVersionMismatch(u32),
    /// The idmap tables are truncated, unsorted or reference out of range
    /// values.
    MalformedIdmap(String),
    /// A resource id references a package that has no runtime mapping.
    NoPackageMapping { package_id: u8 },
    /// Two dynamic reference tables disagree about a mapping.
    DynamicRefConflict(String),
    /// Every shared-library package id has been handed out.
    PackageIdsExhausted,
    /// An I/O operation failed. The engine itself only performs I/O when
    /// checking whether an idmap file is still current.
    FileIoError(Rc<io::Error>)
}

/// Result type where the error is always [ResError].
pub type Result<T> = std::result::Result<T, ResError>;

impl fmt::Display for ResError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResError::LinkFailed { errors } => write!(f, "linking failed with {errors} error(s)"),
            ResError::NoPackageMapping { package_id } => {
                write!(f, "no mapping for build-time package id 0x{package_id:02x}")
            }
            ResError::UnknownOverlayablePolicy(policy) => {
                write!(f, "unknown overlayable policy {policy}")
            }
            other => write!(f, "{:?}", other)
        }
    }
}

impl std::error::Error for ResError {}

// Automatic conversion from other types of error to ResError makes the rest of the code cleaner
impl From<io::Error> for ResError {
    fn from(value: io::Error) -> Self {
        ResError::FileIoError(value.into())
    }
}

impl From<DekuError> for ResError {
    fn from(value: DekuError) -> Self {
        ResError::ByteSerialisationFailed(value)
    }
}

impl From<ParseIntError> for ResError {
    fn from(value: ParseIntError) -> Self {
        ResError::IntegerAttributeParsingFailed(value)
    }
}

impl From<xml::reader::Error> for ResError {
    fn from(value: xml::reader::Error) -> Self {
        ResError::XmlParsingFailed(value)
    }
}

impl From<prost::DecodeError> for ResError {
    fn from(value: prost::DecodeError) -> Self {
        ResError::IntermediateDecodingFailed(value)
    }
}
