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

use std::{collections::HashMap, io::Cursor};

use byteorder::{LittleEndian, ReadBytesExt};
use resc_common::*;

use crate::{
    chunk_reader::Chunk,
    chunk_writer::ChunkWriter,
    resource_external_types::*,
    resource_internal_types::ResourceId
};

/// Priority of every string that is not an attribute name with a resource id.
/// Sorts after all valid ids.
pub const LOW_PRIORITY: u32 = 0xFFFF_FFFF;

const MAX_UTF8_LENGTH: usize = 0x7FFF;
const MAX_UTF16_LENGTH: usize = 0x7FFF_FFFF;

/// Handle to a string added to a [StringPoolBuilder]. Its final index is only
/// known once the pool has been sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringPoolEncoding {
    #[default]
    Utf8,
    Utf16
}

#[derive(Debug)]
struct PoolEntry {
    value: String,
    priority: u32
}

/// Collects deduplicated strings while a document is being written.
///
/// The same text with two different priorities is two different entries: the
/// binary XML resource map lines up with pool indices, so an attribute name
/// carrying a resource id must not be shared with a plain value string.
#[derive(Debug, Default)]
pub struct StringPoolBuilder {
    entries: Vec<PoolEntry>,
    lookup: HashMap<(String, u32), usize>
}

impl StringPoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // If the string already exists in the pool, return the existing ref
    // If not, add it to the pool and return the newly-created ref
    pub fn make_ref(&mut self, value: &str, priority: u32) -> StringRef {
        if let Some(index) = self.lookup.get(&(value.to_string(), priority)) {
            return StringRef(*index);
        }
        let index = self.entries.len();
        self.entries.push(PoolEntry {
            value: value.to_string(),
            priority
        });
        self.lookup.insert((value.to_string(), priority), index);
        StringRef(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Orders the pool by priority. Equal priorities keep insertion order.
    pub fn sort(self) -> SortedStringPool {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| self.entries[i].priority);

        let mut final_index = vec![0u32; self.entries.len()];
        for (position, &entry) in order.iter().enumerate() {
            final_index[entry] = position as u32;
        }

        let mut entries: Vec<Option<PoolEntry>> = self.entries.into_iter().map(Some).collect();
        let mut strings = Vec::with_capacity(order.len());
        let mut priorities = Vec::with_capacity(order.len());
        for i in order {
            if let Some(entry) = entries[i].take() {
                strings.push(entry.value);
                priorities.push(entry.priority);
            }
        }

        SortedStringPool {
            strings,
            priorities,
            final_index
        }
    }
}

/// A pool whose indices are final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedStringPool {
    strings: Vec<String>,
    priorities: Vec<u32>,
    // StringRef -> index in `strings`
    final_index: Vec<u32>
}

impl SortedStringPool {
    /// A pool that keeps the given order, for tables where every string is
    /// equally important (source paths, key names).
    pub fn from_strings(strings: &[String]) -> Self {
        SortedStringPool {
            strings: strings.to_vec(),
            priorities: vec![LOW_PRIORITY; strings.len()],
            final_index: (0..strings.len() as u32).collect()
        }
    }

    pub fn index_of(&self, string: StringRef) -> u32 {
        self.final_index[string.0]
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn priorities(&self) -> &[u32] {
        &self.priorities
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// The leading run of valid resource ids, in pool order. This is the
    /// payload of a binary XML resource map.
    pub fn resource_ids(&self) -> Vec<u32> {
        self.priorities
            .iter()
            .take_while(|&&priority| {
                priority != LOW_PRIORITY && ResourceId(priority).is_valid()
            })
            .copied()
            .collect()
    }

    /// Appends this pool as a `RES_STRING_POOL_TYPE` chunk. Returns the size
    /// of the chunk.
    pub fn flatten(&self, buffer: &mut Vec<u8>, encoding: StringPoolEncoding) -> Result<usize> {
        let mut string_indicies: Vec<u32> = vec![];
        let mut string_data: Vec<u8> = vec![];
        for string in &self.strings {
            string_indicies.push(string_data.len() as u32);
            match encoding {
                StringPoolEncoding::Utf8 => encode_utf8_string(string, &mut string_data)?,
                StringPoolEncoding::Utf16 => encode_utf16_string(string, &mut string_data)?
            }
        }
        // String data must keep the chunk on a 32-bit boundary
        string_data.resize(string_data.len().next_multiple_of(4), 0);

        let header = StringPoolHeader {
            string_count: self.strings.len() as u32,
            style_count: 0,
            flags: match encoding {
                StringPoolEncoding::Utf8 => STRING_POOL_UTF8_FLAG,
                StringPoolEncoding::Utf16 => 0
            },
            strings_start: (StringPoolHeader::CHUNK_HEADER_SIZE + 4 * self.strings.len()) as u32,
            styles_start: 0
        };
        let mut chunk = ChunkWriter::start(buffer, ChunkType::StringPool, &header)?;
        for index in string_indicies {
            chunk.write_u32(index);
        }
        chunk.write(&string_data);
        Ok(chunk.finish())
    }
}

/// Builds a pool chunk from strings in the given order.
pub fn construct_string_pool(strings: &[String]) -> Result<Vec<u8>> {
    let mut buffer = vec![];
    SortedStringPool::from_strings(strings).flatten(&mut buffer, StringPoolEncoding::Utf8)?;
    Ok(buffer)
}

// UTF-8 pools store the UTF-16 length and then the UTF-8 length, each as one
// byte, or two bytes with the high bit of the first set.
fn encode_length8(length: usize, out: &mut Vec<u8>) {
    if length > 0x7F {
        out.push(0x80 | ((length >> 8) & 0x7F) as u8);
        out.push((length & 0xFF) as u8);
    } else {
        out.push(length as u8);
    }
}

fn encode_utf8_string(string: &str, out: &mut Vec<u8>) -> Result<()> {
    let char_count = string.encode_utf16().count();
    let byte_count = string.len();
    if char_count > MAX_UTF8_LENGTH || byte_count > MAX_UTF8_LENGTH {
        return Err(ResError::StringPoolStringTooLong(string.to_string()));
    }
    encode_length8(char_count, out);
    encode_length8(byte_count, out);
    out.extend(string.bytes());
    out.push(0);
    Ok(())
}

fn encode_utf16_string(string: &str, out: &mut Vec<u8>) -> Result<()> {
    let units: Vec<u16> = string.encode_utf16().collect();
    if units.len() > MAX_UTF16_LENGTH {
        return Err(ResError::StringPoolStringTooLong(string.to_string()));
    }
    if units.len() > 0x7FFF {
        out.extend((0x8000 | (units.len() >> 16) as u16).to_le_bytes());
        out.extend(((units.len() & 0xFFFF) as u16).to_le_bytes());
    } else {
        out.extend((units.len() as u16).to_le_bytes());
    }
    for unit in units {
        out.extend(unit.to_le_bytes());
    }
    out.extend(0u16.to_le_bytes());
    Ok(())
}

/// One string reference whose final pool index must be written at `offset`
/// once the pool is sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPatch {
    pub string: StringRef,
    pub offset: usize
}

#[derive(Debug, Default)]
pub struct PendingPatches {
    patches: Vec<PendingPatch>
}

impl PendingPatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, string: StringRef, offset: usize) {
        self.patches.push(PendingPatch { string, offset });
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingPatch> {
        self.patches.iter()
    }

    /// Writes each string's final index into `buffer`.
    pub fn apply(&self, buffer: &mut [u8], pool: &SortedStringPool) -> Result<()> {
        let buffer_len = buffer.len();
        for patch in &self.patches {
            let slot = buffer.get_mut(patch.offset..patch.offset + 4).ok_or_else(|| {
                ResError::MalformedChunk(format!(
                    "string reference slot {} is outside the {} byte buffer",
                    patch.offset,
                    buffer_len
                ))
            })?;
            slot.copy_from_slice(&pool.index_of(patch.string).to_le_bytes());
        }
        Ok(())
    }
}

/// Bounds-checked reader over a `RES_STRING_POOL_TYPE` chunk.
#[derive(Debug, Clone, Copy)]
pub struct StringPoolView<'a> {
    chunk: &'a [u8],
    string_count: u32,
    utf8: bool,
    indices_start: usize,
    strings_start: usize,
    strings_end: usize
}

impl<'a> StringPoolView<'a> {
    pub fn parse(chunk: &Chunk<'a>) -> Result<Self> {
        if chunk.chunk_type() != Some(ChunkType::StringPool) {
            return Err(ResError::MalformedStringPool(format!(
                "expected a string pool chunk, found type 0x{:04x}",
                chunk.raw_type
            )));
        }
        if (chunk.header_size as usize) < StringPoolHeader::CHUNK_HEADER_SIZE {
            return Err(ResError::MalformedStringPool(format!(
                "header_size {} is too small",
                chunk.header_size
            )));
        }

        let bytes = chunk.bytes();
        let mut header = Cursor::new(chunk.extra_header());
        let string_count = header.read_u32::<LittleEndian>()?;
        let style_count = header.read_u32::<LittleEndian>()?;
        let flags = header.read_u32::<LittleEndian>()?;
        let strings_start = header.read_u32::<LittleEndian>()? as usize;
        let styles_start = header.read_u32::<LittleEndian>()? as usize;

        let indices_start = chunk.header_size as usize;
        let indices_end = (string_count as u64 + style_count as u64) * 4 + indices_start as u64;
        if indices_end > bytes.len() as u64 {
            return Err(ResError::MalformedStringPool(format!(
                "{} string and {} style indices do not fit in {} bytes",
                string_count,
                style_count,
                bytes.len()
            )));
        }

        let strings_end = if styles_start != 0 {
            styles_start
        } else {
            bytes.len()
        };
        if string_count > 0
            && (strings_start < indices_end as usize
                || strings_start > strings_end
                || strings_end > bytes.len())
        {
            return Err(ResError::MalformedStringPool(format!(
                "string data [{}, {}) lies outside the chunk",
                strings_start, strings_end
            )));
        }

        Ok(StringPoolView {
            chunk: bytes,
            string_count,
            utf8: flags & STRING_POOL_UTF8_FLAG != 0,
            indices_start,
            strings_start,
            strings_end
        })
    }

    pub fn len(&self) -> usize {
        self.string_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.string_count == 0
    }

    pub fn is_utf8(&self) -> bool {
        self.utf8
    }

    pub fn get(&self, index: u32) -> Result<String> {
        if index >= self.string_count {
            return Err(ResError::StringPoolIndexOutOfRange(index));
        }
        let index_at = self.indices_start + index as usize * 4;
        let offset = u32::from_le_bytes([
            self.chunk[index_at],
            self.chunk[index_at + 1],
            self.chunk[index_at + 2],
            self.chunk[index_at + 3]
        ]) as usize;
        let data = self
            .chunk
            .get(self.strings_start..self.strings_end)
            .and_then(|data| data.get(offset..))
            .ok_or_else(|| {
                ResError::MalformedStringPool(format!("string {} starts out of bounds", index))
            })?;
        if self.utf8 {
            decode_utf8_string(data)
        } else {
            decode_utf16_string(data)
        }
    }

    /// Reads an optional reference, where `0xFFFFFFFF` means "no string".
    pub fn get_optional(&self, index: u32) -> Result<Option<String>> {
        if index == UINT32_MINUS_ONE {
            Ok(None)
        } else {
            self.get(index).map(Some)
        }
    }

    pub fn strings(&self) -> Result<Vec<String>> {
        (0..self.string_count).map(|i| self.get(i)).collect()
    }
}

fn truncated() -> ResError {
    ResError::MalformedStringPool("string data is truncated".into())
}

fn decode_length8(data: &[u8], pos: &mut usize) -> Result<usize> {
    let first = *data.get(*pos).ok_or_else(truncated)? as usize;
    *pos += 1;
    if first & 0x80 != 0 {
        let second = *data.get(*pos).ok_or_else(truncated)? as usize;
        *pos += 1;
        Ok(((first & 0x7F) << 8) | second)
    } else {
        Ok(first)
    }
}

fn decode_utf8_string(data: &[u8]) -> Result<String> {
    let mut pos = 0;
    // UTF-16 length, unused when decoding
    decode_length8(data, &mut pos)?;
    let byte_count = decode_length8(data, &mut pos)?;
    let bytes = data.get(pos..pos + byte_count).ok_or_else(truncated)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ResError::MalformedStringPool(format!("invalid UTF-8: {}", e)))
}

fn decode_utf16_string(data: &[u8]) -> Result<String> {
    let mut cursor = Cursor::new(data);
    let first = cursor.read_u16::<LittleEndian>().map_err(|_| truncated())? as usize;
    let length = if first & 0x8000 != 0 {
        let second = cursor.read_u16::<LittleEndian>().map_err(|_| truncated())? as usize;
        ((first & 0x7FFF) << 16) | second
    } else {
        first
    };
    let mut units = Vec::with_capacity(length.min(data.len() / 2));
    for _ in 0..length {
        units.push(cursor.read_u16::<LittleEndian>().map_err(|_| truncated())?);
    }
    String::from_utf16(&units)
        .map_err(|e| ResError::MalformedStringPool(format!("invalid UTF-16: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_reader::{ChunkEvent, ResChunkPullParser};

    fn read_back(bytes: &[u8]) -> Vec<String> {
        let mut parser = ResChunkPullParser::new(bytes);
        assert_eq!(parser.next_event(), ChunkEvent::Chunk);
        StringPoolView::parse(&parser.chunk().unwrap())
            .unwrap()
            .strings()
            .unwrap()
    }

    #[test]
    fn deduplicates_by_string_and_priority() {
        let mut pool = StringPoolBuilder::new();
        let a = pool.make_ref("name", LOW_PRIORITY);
        let b = pool.make_ref("name", LOW_PRIORITY);
        let c = pool.make_ref("name", 0x0101_0003);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn sort_puts_ids_first_and_is_stable() {
        let mut pool = StringPoolBuilder::new();
        let manifest = pool.make_ref("manifest", LOW_PRIORITY);
        let label = pool.make_ref("label", 0x0101_0001);
        let package = pool.make_ref("package", LOW_PRIORITY);
        let name = pool.make_ref("name", 0x0101_0003);
        let theme = pool.make_ref("theme", 0x0101_0000);

        let sorted = pool.sort();
        assert_eq!(
            sorted.strings(),
            &["theme", "label", "name", "manifest", "package"]
        );
        assert_eq!(sorted.index_of(theme), 0);
        assert_eq!(sorted.index_of(label), 1);
        assert_eq!(sorted.index_of(name), 2);
        assert_eq!(sorted.index_of(manifest), 3);
        assert_eq!(sorted.index_of(package), 4);
        assert_eq!(
            sorted.resource_ids(),
            vec![0x0101_0000, 0x0101_0001, 0x0101_0003]
        );
    }

    #[test]
    fn pending_patches_write_final_indices() {
        let mut pool = StringPoolBuilder::new();
        let late = pool.make_ref("late", LOW_PRIORITY);
        let early = pool.make_ref("early", 0x7f01_0000);
        let mut patches = PendingPatches::new();
        let mut buffer = vec![0xFF; 8];
        patches.record(late, 0);
        patches.record(early, 4);

        let sorted = pool.sort();
        patches.apply(&mut buffer, &sorted).unwrap();
        assert_eq!(buffer, vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn patch_outside_buffer_is_an_error() {
        let mut pool = StringPoolBuilder::new();
        let s = pool.make_ref("s", LOW_PRIORITY);
        let mut patches = PendingPatches::new();
        patches.record(s, 6);
        let sorted = pool.sort();
        assert!(patches.apply(&mut [0u8; 8], &sorted).is_err());
    }

    #[test]
    fn utf8_pool_reads_back() {
        let strings = vec![
            String::from(""),
            String::from("hello"),
            String::from("h\u{e9}llo w\u{f6}rld"),
            "x".repeat(300),
        ];
        let bytes = construct_string_pool(&strings).unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(read_back(&bytes), strings);
    }

    #[test]
    fn utf16_pool_reads_back() {
        let strings = vec![String::from("\u{1F600} smile"), String::from("plain")];
        let mut bytes = vec![];
        SortedStringPool::from_strings(&strings)
            .flatten(&mut bytes, StringPoolEncoding::Utf16)
            .unwrap();
        assert_eq!(read_back(&bytes), strings);
    }

    #[test]
    fn long_lengths_use_two_bytes() {
        let mut out = vec![];
        encode_length8(0x1234, &mut out);
        assert_eq!(out, vec![0x92, 0x34]);
        let mut pos = 0;
        assert_eq!(decode_length8(&out, &mut pos).unwrap(), 0x1234);
    }

    #[test]
    fn too_long_for_utf8() {
        let long = "a".repeat(0x8000);
        assert!(matches!(
            construct_string_pool(&[long]),
            Err(ResError::StringPoolStringTooLong(_))
        ));
    }

    #[test]
    fn out_of_range_index() {
        let bytes = construct_string_pool(&[String::from("only")]).unwrap();
        let mut parser = ResChunkPullParser::new(&bytes);
        parser.next_event();
        let view = StringPoolView::parse(&parser.chunk().unwrap()).unwrap();
        assert!(matches!(
            view.get(1),
            Err(ResError::StringPoolIndexOutOfRange(1))
        ));
        assert_eq!(view.get_optional(UINT32_MINUS_ONE).unwrap(), None);
    }

    #[test]
    fn corrupt_string_offset_is_rejected() {
        let mut bytes = construct_string_pool(&[String::from("abc")]).unwrap();
        // Point the only index far past the end of the data
        bytes[28..32].copy_from_slice(&1000u32.to_le_bytes());
        let mut parser = ResChunkPullParser::new(&bytes);
        parser.next_event();
        let view = StringPoolView::parse(&parser.chunk().unwrap()).unwrap();
        assert!(view.get(0).is_err());
    }
}
