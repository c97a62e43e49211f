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

// Reads a binary XML document back into a flat list of node events.
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use resc_common::*;

use crate::{
    chunk_reader::{Chunk, ResChunkPullParser},
    resource_external_types::*,
    resource_internal_types::ResourceId,
    string_pool::StringPoolView
};

// ResChunkHeader + XmlNodeHeader
const NODE_HEADER_SIZE: usize = RES_CHUNK_HEADER_SIZE + 8;

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryXmlAttribute {
    pub namespace: Option<String>,
    pub name: String,
    /// From the resource map, when the name's pool index is covered by it
    pub resource_id: Option<ResourceId>,
    pub raw_value: Option<String>,
    pub typed_value: ResValue,
    /// The pooled string when `typed_value` is a `TYPE_STRING`
    pub string_value: Option<String>
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinaryXmlNode {
    StartNamespace {
        line: u32,
        prefix: Option<String>,
        uri: Option<String>
    },
    EndNamespace {
        line: u32,
        prefix: Option<String>,
        uri: Option<String>
    },
    StartElement {
        line: u32,
        namespace: Option<String>,
        name: String,
        attributes: Vec<BinaryXmlAttribute>,
        id_index: u16,
        class_index: u16,
        style_index: u16
    },
    EndElement {
        line: u32,
        namespace: Option<String>,
        name: String
    },
    Cdata {
        line: u32,
        text: String
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinaryXmlDocument {
    pub strings: Vec<String>,
    pub resource_map: Vec<u32>,
    pub nodes: Vec<BinaryXmlNode>
}

impl BinaryXmlDocument {
    pub fn elements(&self) -> impl Iterator<Item = (&str, &[BinaryXmlAttribute])> {
        self.nodes.iter().filter_map(|node| match node {
            BinaryXmlNode::StartElement {
                name, attributes, ..
            } => Some((name.as_str(), attributes.as_slice())),
            _ => None
        })
    }
}

fn malformed(message: impl Into<String>) -> ResError {
    ResError::MalformedChunk(message.into())
}

fn read_value(cursor: &mut Cursor<&[u8]>) -> Result<ResValue> {
    let size = cursor.read_u16::<LittleEndian>()?;
    let res0 = cursor.read_u8()?;
    let raw_type = cursor.read_u8()?;
    let data = cursor.read_u32::<LittleEndian>()?;
    let data_type = ResValueType::from_u8(raw_type)
        .ok_or_else(|| malformed(format!("unknown value type 0x{:02x}", raw_type)))?;
    Ok(ResValue {
        size,
        res0,
        data_type,
        data
    })
}

/// Decodes a document produced by the XML flattener (or aapt2).
pub fn read_binary_xml(bytes: &[u8]) -> Result<BinaryXmlDocument> {
    let mut top = ResChunkPullParser::new(bytes);
    let xml_file = match top.next() {
        Some(chunk) => chunk?,
        None => return Err(malformed("empty document"))
    };
    if xml_file.chunk_type() != Some(ChunkType::XmlFile) {
        return Err(malformed(format!(
            "expected an XML file chunk, found type 0x{:04x}",
            xml_file.raw_type
        )));
    }

    let mut document = BinaryXmlDocument::default();
    let mut pool: Option<StringPoolView> = None;
    for chunk in xml_file.children() {
        let chunk = chunk?;
        match chunk.chunk_type() {
            Some(ChunkType::StringPool) => {
                let view = StringPoolView::parse(&chunk)?;
                document.strings = view.strings()?;
                pool = Some(view);
            }
            Some(ChunkType::XmlResourceMap) => {
                let payload = chunk.payload();
                if payload.len() % 4 != 0 {
                    return Err(malformed("resource map is not a whole number of ids"));
                }
                document.resource_map = payload
                    .chunks_exact(4)
                    .map(|id| u32::from_le_bytes([id[0], id[1], id[2], id[3]]))
                    .collect();
            }
            Some(
                ChunkType::XmlStartNamespace
                | ChunkType::XmlEndNamespace
                | ChunkType::XmlStartElement
                | ChunkType::XmlEndElement
                | ChunkType::XmlCdata
            ) => {
                let pool = pool
                    .as_ref()
                    .ok_or_else(|| malformed("node chunk before the string pool"))?;
                let node = read_node(&chunk, pool, &document.resource_map)?;
                document.nodes.push(node);
            }
            _ => debug!("Skipping chunk type 0x{:04x} in binary XML", chunk.raw_type)
        }
    }
    Ok(document)
}

fn read_node(chunk: &Chunk, pool: &StringPoolView, resource_map: &[u32]) -> Result<BinaryXmlNode> {
    if (chunk.header_size as usize) < NODE_HEADER_SIZE {
        return Err(malformed(format!(
            "node header_size {} is too small",
            chunk.header_size
        )));
    }
    let mut header = Cursor::new(chunk.extra_header());
    let line = header.read_u32::<LittleEndian>()?;
    let _comment = header.read_u32::<LittleEndian>()?;

    let ext = chunk.payload();
    let mut cursor = Cursor::new(ext);
    let short = |_| malformed(format!("node at line {} is truncated", line));
    Ok(match chunk.chunk_type() {
        Some(ChunkType::XmlStartNamespace) | Some(ChunkType::XmlEndNamespace) => {
            let prefix = pool.get_optional(cursor.read_u32::<LittleEndian>().map_err(short)?)?;
            let uri = pool.get_optional(cursor.read_u32::<LittleEndian>().map_err(short)?)?;
            if chunk.chunk_type() == Some(ChunkType::XmlStartNamespace) {
                BinaryXmlNode::StartNamespace { line, prefix, uri }
            } else {
                BinaryXmlNode::EndNamespace { line, prefix, uri }
            }
        }
        Some(ChunkType::XmlEndElement) => {
            let namespace = pool.get_optional(cursor.read_u32::<LittleEndian>().map_err(short)?)?;
            let name = pool.get(cursor.read_u32::<LittleEndian>().map_err(short)?)?;
            BinaryXmlNode::EndElement {
                line,
                namespace,
                name
            }
        }
        Some(ChunkType::XmlCdata) => {
            let text = pool.get(cursor.read_u32::<LittleEndian>().map_err(short)?)?;
            BinaryXmlNode::Cdata { line, text }
        }
        _ => read_start_element(line, ext, pool, resource_map)?
    })
}

fn read_start_element(
    line: u32,
    ext: &[u8],
    pool: &StringPoolView,
    resource_map: &[u32]
) -> Result<BinaryXmlNode> {
    let short = |_| malformed(format!("start element at line {} is truncated", line));
    let mut cursor = Cursor::new(ext);
    let namespace = pool.get_optional(cursor.read_u32::<LittleEndian>().map_err(short)?)?;
    let name = pool.get(cursor.read_u32::<LittleEndian>().map_err(short)?)?;
    let attribute_start = cursor.read_u16::<LittleEndian>().map_err(short)? as usize;
    let attribute_size = cursor.read_u16::<LittleEndian>().map_err(short)? as usize;
    let attribute_count = cursor.read_u16::<LittleEndian>().map_err(short)? as usize;
    let id_index = cursor.read_u16::<LittleEndian>().map_err(short)?;
    let class_index = cursor.read_u16::<LittleEndian>().map_err(short)?;
    let style_index = cursor.read_u16::<LittleEndian>().map_err(short)?;

    if attribute_count > 0 && attribute_size < XmlAttributeEntry::SIZE as usize {
        return Err(malformed(format!("attribute size {} is too small", attribute_size)));
    }
    let end = attribute_start + attribute_count * attribute_size;
    if end > ext.len() {
        return Err(malformed(format!(
            "{} attributes of {} bytes do not fit in the element",
            attribute_count, attribute_size
        )));
    }

    let mut attributes = Vec::with_capacity(attribute_count);
    for i in 0..attribute_count {
        let start = attribute_start + i * attribute_size;
        let mut cursor = Cursor::new(&ext[start..start + attribute_size]);
        let namespace = pool.get_optional(cursor.read_u32::<LittleEndian>()?)?;
        let name_index = cursor.read_u32::<LittleEndian>()?;
        let raw_value = pool.get_optional(cursor.read_u32::<LittleEndian>()?)?;
        let typed_value = read_value(&mut cursor)?;
        let string_value = if typed_value.data_type == ResValueType::String {
            Some(pool.get(typed_value.data)?)
        } else {
            None
        };
        attributes.push(BinaryXmlAttribute {
            namespace,
            name: pool.get(name_index)?,
            resource_id: resource_map.get(name_index as usize).map(|id| ResourceId(*id)),
            raw_value,
            typed_value,
            string_value
        });
    }

    Ok(BinaryXmlNode::StartElement {
        line,
        namespace,
        name,
        attributes,
        id_index,
        class_index,
        style_index
    })
}
