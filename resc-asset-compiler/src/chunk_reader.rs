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

// Pull-style reader over a buffer of sibling ResChunks. Nested chunks are read
// by constructing a new reader over a chunk's payload.
use log::debug;
use resc_common::*;

use crate::resource_external_types::{ChunkType, RES_CHUNK_HEADER_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkEvent {
    StartDocument,
    Chunk,
    EndDocument,
    BadDocument
}

/// A validated view of one chunk inside the reader's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub raw_type: u16,
    pub header_size: u16,
    pub total_size: u32,
    // The entire chunk, header and payload
    bytes: &'a [u8]
}

impl<'a> Chunk<'a> {
    pub fn chunk_type(&self) -> Option<ChunkType> {
        ChunkType::from_id(self.raw_type)
    }

    /// The whole chunk, starting at its `ResChunkHeader`.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The header including the base `ResChunkHeader`.
    pub fn header(&self) -> &'a [u8] {
        &self.bytes[..self.header_size as usize]
    }

    /// The type-specific part of the header after the base `ResChunkHeader`.
    pub fn extra_header(&self) -> &'a [u8] {
        &self.bytes[RES_CHUNK_HEADER_SIZE..self.header_size as usize]
    }

    /// Everything after the header: `total_size - header_size` bytes.
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[self.header_size as usize..]
    }

    /// A reader over this chunk's children.
    pub fn children(&self) -> ResChunkPullParser<'a> {
        ResChunkPullParser::new(self.payload())
    }
}

pub struct ResChunkPullParser<'a> {
    data: &'a [u8],
    offset: usize,
    event: ChunkEvent,
    current: Option<Chunk<'a>>,
    error: Option<String>
}

impl<'a> ResChunkPullParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ResChunkPullParser {
            data,
            offset: 0,
            event: ChunkEvent::StartDocument,
            current: None,
            error: None
        }
    }

    pub fn event(&self) -> ChunkEvent {
        self.event
    }

    /// The chunk the reader is positioned on, only while the last event was
    /// [ChunkEvent::Chunk].
    pub fn chunk(&self) -> Option<Chunk<'a>> {
        self.current
    }

    /// Why the reader entered [ChunkEvent::BadDocument].
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Offset of the current chunk within the reader's buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn next_event(&mut self) -> ChunkEvent {
        match self.event {
            ChunkEvent::EndDocument | ChunkEvent::BadDocument => return self.event,
            ChunkEvent::StartDocument => {}
            ChunkEvent::Chunk => {
                if let Some(chunk) = self.current {
                    self.offset += chunk.total_size as usize;
                }
            }
        }
        self.current = None;

        let remaining = self.data.len() - self.offset;
        if remaining == 0 {
            self.event = ChunkEvent::EndDocument;
            return self.event;
        }

        match self.validate_chunk_at(remaining) {
            Ok(chunk) => {
                self.current = Some(chunk);
                self.event = ChunkEvent::Chunk;
            }
            Err(reason) => {
                debug!("Bad chunk at offset {}: {}", self.offset, reason);
                self.error = Some(reason);
                self.event = ChunkEvent::BadDocument;
            }
        }
        self.event
    }

    fn validate_chunk_at(&self, remaining: usize) -> std::result::Result<Chunk<'a>, String> {
        if remaining < RES_CHUNK_HEADER_SIZE {
            return Err(format!(
                "not enough data for a chunk header: {} bytes left",
                remaining
            ));
        }
        let bytes = &self.data[self.offset..];
        let raw_type = u16::from_le_bytes([bytes[0], bytes[1]]);
        let header_size = u16::from_le_bytes([bytes[2], bytes[3]]);
        let total_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        if (header_size as usize) < RES_CHUNK_HEADER_SIZE {
            return Err(format!("chunk header_size {} is too small", header_size));
        }
        if total_size < header_size as u32 {
            return Err(format!(
                "chunk total_size {} is smaller than header_size {}",
                total_size, header_size
            ));
        }
        if total_size as usize > remaining {
            return Err(format!(
                "chunk total_size {} is larger than the {} bytes remaining",
                total_size, remaining
            ));
        }

        Ok(Chunk {
            raw_type,
            header_size,
            total_size,
            bytes: &bytes[..total_size as usize]
        })
    }
}

// Convenience for callers that only care about the chunks
impl<'a> Iterator for ResChunkPullParser<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.event == ChunkEvent::BadDocument {
            // The error was already reported once
            return None;
        }
        match self.next_event() {
            ChunkEvent::Chunk => self.current.map(Ok),
            ChunkEvent::BadDocument => Some(Err(ResError::MalformedChunk(
                self.error.clone().unwrap_or_default()
            ))),
            _ => None
        }
    }
}
