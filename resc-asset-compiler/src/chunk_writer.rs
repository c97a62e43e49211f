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

// Every binary resource file is a tree of ResChunks. A chunk is started by
// writing its header with a zero size, its contents are appended, and the size
// is patched in when the chunk is finished. Nesting is up to the caller: start
// a child chunk on `parent.buffer()` and finish it before the parent.
use deku::DekuContainerWrite;
use resc_common::*;

use crate::resource_external_types::{ChunkType, ResChunkHeader, RES_CHUNK_HEADER_SIZE};

// AAPT requires all chunks to fall on 32-bit boundaries
pub const CHUNK_ALIGNMENT: usize = 4;

pub struct ChunkWriter<'a> {
    buffer: &'a mut Vec<u8>,
    start: usize
}

impl<'a> ChunkWriter<'a> {
    /// Starts a chunk whose header is the base `ResChunkHeader` followed by
    /// `extra_header`. `header_size` covers both.
    pub fn start<H: DekuContainerWrite>(
        buffer: &'a mut Vec<u8>,
        chunk_type: ChunkType,
        extra_header: &H
    ) -> Result<Self> {
        let extra_bytes = extra_header.to_bytes()?;
        Self::start_with_header_bytes(buffer, chunk_type, &extra_bytes)
    }

    /// Starts a chunk with only the base `ResChunkHeader`.
    pub fn start_bare(buffer: &'a mut Vec<u8>, chunk_type: ChunkType) -> Result<Self> {
        Self::start_with_header_bytes(buffer, chunk_type, &[])
    }

    fn start_with_header_bytes(
        buffer: &'a mut Vec<u8>,
        chunk_type: ChunkType,
        extra_header: &[u8]
    ) -> Result<Self> {
        let start = buffer.len();
        let header = ResChunkHeader {
            chunk_type,
            header_size: (RES_CHUNK_HEADER_SIZE + extra_header.len()) as u16,
            // Patched by finish()
            chunk_size: 0
        };
        buffer.extend(header.to_bytes()?);
        buffer.extend_from_slice(extra_header);
        Ok(ChunkWriter { buffer, start })
    }

    /// The underlying buffer, for writing nested chunks.
    pub fn buffer(&mut self) -> &mut Vec<u8> {
        &mut *self.buffer
    }

    /// Absolute offset in the buffer where this chunk began.
    pub fn start_offset(&self) -> usize {
        self.start
    }

    /// Number of bytes written to this chunk so far, header included.
    pub fn size(&self) -> usize {
        self.buffer.len() - self.start
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a serialised struct and returns the absolute buffer offset it
    /// was written at, so fields inside it can be patched later.
    pub fn write_struct<T: DekuContainerWrite>(&mut self, value: &T) -> Result<usize> {
        let offset = self.buffer.len();
        self.buffer.extend(value.to_bytes()?);
        Ok(offset)
    }

    /// Pads to a 4-byte boundary and patches the chunk size. Returns the total
    /// size of the chunk including padding.
    pub fn finish(self) -> usize {
        let unaligned = self.buffer.len() - self.start;
        let padding = (CHUNK_ALIGNMENT - unaligned % CHUNK_ALIGNMENT) % CHUNK_ALIGNMENT;
        self.buffer.resize(self.buffer.len() + padding, 0);
        let total = self.buffer.len() - self.start;
        self.buffer[self.start + 4..self.start + 8].copy_from_slice(&(total as u32).to_le_bytes());
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_external_types::ResTableLibHeader;

    #[test]
    fn bare_chunk_is_just_a_header() {
        let mut buf = vec![];
        let writer = ChunkWriter::start_bare(&mut buf, ChunkType::XmlResourceMap).unwrap();
        assert_eq!(writer.finish(), 8);
        assert_eq!(buf, vec![0x80, 0x01, 0x08, 0x00, 0x08, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn finish_pads_and_patches_size() {
        let mut buf = vec![];
        let mut writer = ChunkWriter::start(
            &mut buf,
            ChunkType::TableLibrary,
            &ResTableLibHeader { count: 0 }
        )
        .unwrap();
        writer.write(&[1, 2, 3]);
        assert_eq!(writer.finish(), 16);
        assert_eq!(buf.len(), 16);
        // header_size
        assert_eq!(&buf[2..4], &[12, 0]);
        // chunk_size
        assert_eq!(&buf[4..8], &[16, 0, 0, 0]);
        // padding is zeroed
        assert_eq!(&buf[15..], &[0]);
    }

    #[test]
    fn nested_chunks_compose() {
        let mut buf = vec![0xAA; 4];
        let mut outer = ChunkWriter::start_bare(&mut buf, ChunkType::XmlFile).unwrap();
        {
            let mut inner = ChunkWriter::start_bare(outer.buffer(), ChunkType::XmlResourceMap).unwrap();
            inner.write_u32(0x0101_0003);
            assert_eq!(inner.finish(), 12);
        }
        assert_eq!(outer.start_offset(), 4);
        assert_eq!(outer.finish(), 20);
        assert_eq!(&buf[8..12], &[20, 0, 0, 0]);
        assert_eq!(&buf[16..20], &[12, 0, 0, 0]);
    }
}
