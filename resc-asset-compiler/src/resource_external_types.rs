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

// Types that Android itself uses to describe resources on the wire.
// Layouts follow frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h
use deku::prelude::*;

pub const RES_CHUNK_HEADER_SIZE: usize = 8;
pub const UINT32_MINUS_ONE: u32 = 0xFFFFFFFF;
// Either a string index or UINT32_MINUS_ONE if empty
pub type ResStringPoolRef = u32;

#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResChunkHeader {
    pub chunk_type: ChunkType,
    pub header_size: u16,
    // Includes both this header and the data that follows
    pub chunk_size: u32
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, DekuWrite)]
#[deku(id_type = "u16")]
pub enum ChunkType {
    #[deku(id = 0x0000)]
    Null,
    #[deku(id = 0x0001)]
    StringPool,
    #[deku(id = 0x0002)]
    Table,
    #[deku(id = 0x0003)]
    XmlFile,

    // Types within an XmlFile
    #[deku(id = 0x0100)]
    XmlStartNamespace,
    #[deku(id = 0x0101)]
    XmlEndNamespace,
    #[deku(id = 0x0102)]
    XmlStartElement,
    #[deku(id = 0x0103)]
    XmlEndElement,
    #[deku(id = 0x0104)]
    XmlCdata,
    #[deku(id = 0x0180)]
    XmlResourceMap,

    // Types within a Table
    #[deku(id = 0x0200)]
    TablePackage,
    #[deku(id = 0x0201)]
    TableType,
    #[deku(id = 0x0202)]
    TableTypeSpec,
    #[deku(id = 0x0203)]
    TableLibrary,
    #[deku(id = 0x0204)]
    TableOverlayable,
    #[deku(id = 0x0205)]
    TableOverlayablePolicy,
    #[deku(id = 0x0206)]
    TableStagedAlias
}

impl ChunkType {
    /// Maps a raw chunk type read from a buffer. Unknown types are legal on
    /// the wire (readers skip them), so this is an `Option`.
    pub fn from_id(id: u16) -> Option<ChunkType> {
        Some(match id {
            0x0000 => ChunkType::Null,
            0x0001 => ChunkType::StringPool,
            0x0002 => ChunkType::Table,
            0x0003 => ChunkType::XmlFile,
            0x0100 => ChunkType::XmlStartNamespace,
            0x0101 => ChunkType::XmlEndNamespace,
            0x0102 => ChunkType::XmlStartElement,
            0x0103 => ChunkType::XmlEndElement,
            0x0104 => ChunkType::XmlCdata,
            0x0180 => ChunkType::XmlResourceMap,
            0x0200 => ChunkType::TablePackage,
            0x0201 => ChunkType::TableType,
            0x0202 => ChunkType::TableTypeSpec,
            0x0203 => ChunkType::TableLibrary,
            0x0204 => ChunkType::TableOverlayable,
            0x0205 => ChunkType::TableOverlayablePolicy,
            0x0206 => ChunkType::TableStagedAlias,
            _ => return None
        })
    }
}

/// `Res_value::dataType`
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, DekuWrite)]
#[deku(id_type = "u8")]
pub enum ResValueType {
    #[deku(id = 0x00)]
    Null,
    #[deku(id = 0x01)]
    Reference,
    #[deku(id = 0x02)]
    Attribute,
    #[deku(id = 0x03)]
    String,
    #[deku(id = 0x04)]
    Float,
    #[deku(id = 0x05)]
    Dimension,
    #[deku(id = 0x06)]
    Fraction,
    #[deku(id = 0x07)]
    DynamicReference,
    #[deku(id = 0x08)]
    DynamicAttribute,
    #[deku(id = 0x10)]
    IntDec,
    #[deku(id = 0x11)]
    IntHex,
    #[deku(id = 0x12)]
    IntBoolean,
    #[deku(id = 0x1c)]
    IntColorArgb8,
    #[deku(id = 0x1d)]
    IntColorRgb8,
    #[deku(id = 0x1e)]
    IntColorArgb4,
    #[deku(id = 0x1f)]
    IntColorRgb4
}

impl ResValueType {
    pub fn from_u8(id: u8) -> Option<ResValueType> {
        Some(match id {
            0x00 => ResValueType::Null,
            0x01 => ResValueType::Reference,
            0x02 => ResValueType::Attribute,
            0x03 => ResValueType::String,
            0x04 => ResValueType::Float,
            0x05 => ResValueType::Dimension,
            0x06 => ResValueType::Fraction,
            0x07 => ResValueType::DynamicReference,
            0x08 => ResValueType::DynamicAttribute,
            0x10 => ResValueType::IntDec,
            0x11 => ResValueType::IntHex,
            0x12 => ResValueType::IntBoolean,
            0x1c => ResValueType::IntColorArgb8,
            0x1d => ResValueType::IntColorRgb8,
            0x1e => ResValueType::IntColorArgb4,
            0x1f => ResValueType::IntColorRgb4,
            _ => return None
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            ResValueType::Null => 0x00,
            ResValueType::Reference => 0x01,
            ResValueType::Attribute => 0x02,
            ResValueType::String => 0x03,
            ResValueType::Float => 0x04,
            ResValueType::Dimension => 0x05,
            ResValueType::Fraction => 0x06,
            ResValueType::DynamicReference => 0x07,
            ResValueType::DynamicAttribute => 0x08,
            ResValueType::IntDec => 0x10,
            ResValueType::IntHex => 0x11,
            ResValueType::IntBoolean => 0x12,
            ResValueType::IntColorArgb8 => 0x1c,
            ResValueType::IntColorRgb8 => 0x1d,
            ResValueType::IntColorArgb4 => 0x1e,
            ResValueType::IntColorRgb4 => 0x1f
        }
    }

    /// Types that are self-contained 32-bit payloads, as opposed to
    /// references or string pool indices.
    pub fn is_primitive(self) -> bool {
        !matches!(
            self,
            ResValueType::Reference
                | ResValueType::Attribute
                | ResValueType::String
                | ResValueType::DynamicReference
                | ResValueType::DynamicAttribute
        )
    }
}

// Res_value::data values when dataType is Null
pub const DATA_NULL_UNDEFINED: u32 = 0;
pub const DATA_NULL_EMPTY: u32 = 1;

#[derive(Debug, PartialEq, Clone, DekuWrite)]
pub struct ResValue {
    // Always 8
    pub size: u16,
    // Always 0
    pub res0: u8,
    pub data_type: ResValueType,
    pub data: u32
}

impl ResValue {
    pub const SIZE: usize = 8;
    pub const DATA_OFFSET: usize = 4;

    pub fn new(data_type: ResValueType, data: u32) -> Self {
        ResValue {
            size: Self::SIZE as u16,
            res0: 0,
            data_type,
            data
        }
    }
}

// Common to every node chunk inside an XmlFile
#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlNodeHeader {
    // Where this node appeared in the original document
    // Not important for on-device parsing, only debugging and logs
    pub line_number: u32,
    // The XML comment that originally appeared above this node
    pub comment: ResStringPoolRef
}

// Used for both the start and end of a namespace
#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlNamespaceExt {
    pub prefix: ResStringPoolRef,
    pub uri: ResStringPoolRef
}

impl XmlNamespaceExt {
    pub const PREFIX_OFFSET: usize = 0;
    pub const URI_OFFSET: usize = 4;
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlStartElementExt {
    pub namespace: ResStringPoolRef,
    pub name: ResStringPoolRef,
    pub attribute_start: u16,
    pub attribute_size: u16,
    pub attribute_count: u16,
    // Index (1-based) of the "id" attribute, 0 if none
    pub id_index: u16,
    // Index (1-based) of the "class" attribute, 0 if none
    pub class_index: u16,
    // Index (1-based) of the "style" attribute, 0 if none
    pub style_index: u16
}

impl XmlStartElementExt {
    pub const SIZE: u16 = 20;
    pub const NAMESPACE_OFFSET: usize = 0;
    pub const NAME_OFFSET: usize = 4;
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlEndElementExt {
    pub namespace: ResStringPoolRef,
    pub name: ResStringPoolRef
}

impl XmlEndElementExt {
    pub const NAMESPACE_OFFSET: usize = 0;
    pub const NAME_OFFSET: usize = 4;
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlAttributeEntry {
    pub namespace: ResStringPoolRef,
    pub name: ResStringPoolRef,
    pub raw_value: ResStringPoolRef,
    pub typed_value: ResValue
}

impl XmlAttributeEntry {
    pub const SIZE: u16 = 20;
    pub const NAMESPACE_OFFSET: usize = 0;
    pub const NAME_OFFSET: usize = 4;
    pub const RAW_VALUE_OFFSET: usize = 8;
    pub const TYPED_DATA_OFFSET: usize = 12 + ResValue::DATA_OFFSET;
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct XmlCdataExt {
    pub data: ResStringPoolRef,
    pub typed_data: ResValue
}

impl XmlCdataExt {
    pub const DATA_OFFSET: usize = 0;
}

pub const STRING_POOL_SORTED_FLAG: u32 = 1 << 0;
pub const STRING_POOL_UTF8_FLAG: u32 = 1 << 8;

#[derive(Debug, PartialEq, DekuWrite)]
pub struct StringPoolHeader {
    pub string_count: u32,
    pub style_count: u32,
    pub flags: u32,
    pub strings_start: u32,
    pub styles_start: u32
}

impl StringPoolHeader {
    // Including the ResChunkHeader in front of it
    pub const CHUNK_HEADER_SIZE: usize = RES_CHUNK_HEADER_SIZE + 20;
}

pub const ENTRY_FLAG_COMPLEX: u16 = 0x0001;
pub const ENTRY_FLAG_PUBLIC: u16 = 0x0002;
pub const ENTRY_FLAG_WEAK: u16 = 0x0004;

#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResTableEntry {
    pub size: u16,
    pub flags: u16,
    pub key: ResStringPoolRef
}

impl ResTableEntry {
    pub const SIZE: u16 = 8;
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResTableMapEntry {
    pub size: u16,
    pub flags: u16,
    pub key: ResStringPoolRef,
    // Resource id of the parent style, or 0
    pub parent: u32,
    pub count: u32
}

impl ResTableMapEntry {
    pub const SIZE: u16 = 16;
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResTableMap {
    pub name: u32,
    pub value: ResValue
}

impl ResTableMap {
    pub const SIZE: usize = 12;
    pub const VALUE_DATA_OFFSET: usize = 4 + ResValue::DATA_OFFSET;
}

// Special ResTableMap names, Res_MAKEINTERNAL(n)
pub const ATTR_TYPE: u32 = 0x0100_0000;
pub const ATTR_MIN: u32 = 0x0100_0001;
pub const ATTR_MAX: u32 = 0x0100_0002;
pub const ATTR_L10N: u32 = 0x0100_0003;
pub const ATTR_OTHER: u32 = 0x0100_0004;
pub const ATTR_ZERO: u32 = 0x0100_0005;
pub const ATTR_ONE: u32 = 0x0100_0006;
pub const ATTR_TWO: u32 = 0x0100_0007;
pub const ATTR_FEW: u32 = 0x0100_0008;
pub const ATTR_MANY: u32 = 0x0100_0009;

/// Res_MAKEARRAY
pub fn make_array_index(index: u32) -> u32 {
    0x0200_0000 | (index & 0xFFFF)
}

// A single entry in a RES_TABLE_LIBRARY_TYPE chunk, after its u32 count
#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResTableLibEntry {
    pub package_id: u32,
    // This is always 128 u16s (256 bytes) long, zero-terminated
    pub package_name: [u16; 128]
}

impl ResTableLibEntry {
    pub const SIZE: usize = 4 + 256;

    pub fn new(package_id: u8, package_name: &str) -> Self {
        let mut name = [0u16; 128];
        for (slot, unit) in name.iter_mut().take(127).zip(package_name.encode_utf16()) {
            *slot = unit;
        }
        ResTableLibEntry {
            package_id: package_id as u32,
            package_name: name
        }
    }
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct ResTableLibHeader {
    pub count: u32
}

// ResTable_map::type bits, stored in an attribute's ATTR_TYPE entry
pub const ATTR_FORMAT_ANY: u32 = 0x0000_FFFF;
pub const ATTR_FORMAT_REFERENCE: u32 = 1 << 0;
pub const ATTR_FORMAT_STRING: u32 = 1 << 1;
pub const ATTR_FORMAT_INTEGER: u32 = 1 << 2;
pub const ATTR_FORMAT_BOOLEAN: u32 = 1 << 3;
pub const ATTR_FORMAT_COLOR: u32 = 1 << 4;
pub const ATTR_FORMAT_FLOAT: u32 = 1 << 5;
pub const ATTR_FORMAT_DIMENSION: u32 = 1 << 6;
pub const ATTR_FORMAT_FRACTION: u32 = 1 << 7;
pub const ATTR_FORMAT_ENUM: u32 = 1 << 16;
pub const ATTR_FORMAT_FLAGS: u32 = 1 << 17;

/// `ResTable_config`, the device configuration a value applies to.
#[derive(Debug, PartialEq, Eq, Clone, Default, DekuWrite)]
pub struct ResTableConfig {
    // Always ResTableConfig::SIZE when written by us
    pub size: u32,
    pub mcc: u16,
    pub mnc: u16,
    // Two ASCII letters, or a packed three letter code when the high bit of
    // the first byte is set
    pub language: [u8; 2],
    pub country: [u8; 2],
    pub orientation: u8,
    pub touchscreen: u8,
    pub density: u16,
    pub keyboard: u8,
    pub navigation: u8,
    pub input_flags: u8,
    pub grammatical_inflection: u8,
    pub screen_width: u16,
    pub screen_height: u16,
    pub sdk_version: u16,
    // Always 0
    pub minor_version: u16,
    pub screen_layout: u8,
    pub ui_mode: u8,
    pub smallest_screen_width_dp: u16,
    pub screen_width_dp: u16,
    pub screen_height_dp: u16,
    pub locale_script: [u8; 4],
    pub locale_variant: [u8; 8],
    pub screen_layout2: u8,
    pub color_mode: u8,
    pub screen_config_pad2: u16,
    // localeScriptWasComputed, localeNumberingSystem and padding
    pub reserved: [u8; 12]
}

impl ResTableConfig {
    pub const SIZE: usize = 64;
}

// ResTable_config bit fields
pub const MASK_KEYSHIDDEN: u8 = 0x03;
pub const MASK_NAVHIDDEN: u8 = 0x0c;
pub const SHIFT_NAVHIDDEN: u8 = 2;
pub const MASK_SCREENSIZE: u8 = 0x0f;
pub const MASK_SCREENLONG: u8 = 0x30;
pub const SHIFT_SCREENLONG: u8 = 4;
pub const MASK_LAYOUTDIR: u8 = 0xc0;
pub const SHIFT_LAYOUTDIR: u8 = 6;
pub const MASK_UI_MODE_TYPE: u8 = 0x0f;
pub const MASK_UI_MODE_NIGHT: u8 = 0x30;
pub const SHIFT_UI_MODE_NIGHT: u8 = 4;
pub const MASK_SCREENROUND: u8 = 0x03;
