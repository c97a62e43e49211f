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

// Binary layout of an idmap file. Everything is little-endian and every
// section starts on a 4-byte boundary:
//
//   IdmapHeader, then four length-prefixed strings
//     (target path, overlay path, overlay name, debug info)
//   IdmapDataHeader
//   IdmapTargetEntry          x target_entry_count
//   IdmapTargetInlineEntry    x target_inline_entry_count
//   IdmapInlineValue          x target_inline_entry_value_count
//   ResTable_config (64 bytes) x config_count
//   IdmapOverlayEntry         x overlay_entry_count
//   u32 pool size, then a string pool chunk of that size
use deku::prelude::*;
use resc_asset_compiler::resource_external_types::ResValue;

/// 'IDMP' read as a little-endian u32
pub const IDMAP_MAGIC: u32 = 0x504D_4449;
pub const IDMAP_CURRENT_VERSION: u32 = 0x0000_000A;

#[derive(Debug, PartialEq, DekuWrite)]
pub struct IdmapHeader {
    pub magic: u32,
    pub version: u32,
    pub target_crc32: u32,
    pub overlay_crc32: u32,
    /// PolicyFlags bits the overlay was verified against
    pub fulfilled_policies: u32,
    /// Non-zero when only overlayable resources may be overlaid
    pub enforce_overlayable: u32
}

impl IdmapHeader {
    pub const SIZE: usize = 24;
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct IdmapDataHeader {
    pub target_entry_count: u32,
    pub target_inline_entry_count: u32,
    pub target_inline_entry_value_count: u32,
    pub config_count: u32,
    pub overlay_entry_count: u32,
    /// Added to every inline string value so it cannot collide with an index
    /// into the target's own pool
    pub string_pool_index_offset: u32
}

impl IdmapDataHeader {
    pub const SIZE: usize = 24;
}

/// A target resource replaced by an overlay resource.
#[derive(Debug, PartialEq, DekuWrite)]
pub struct IdmapTargetEntry {
    pub target_id: u32,
    pub overlay_id: u32
}

impl IdmapTargetEntry {
    pub const SIZE: usize = 8;
}

/// A target resource replaced by values stored in the idmap itself.
#[derive(Debug, PartialEq, DekuWrite)]
pub struct IdmapTargetInlineEntry {
    pub target_id: u32,
    pub start_value_index: u32,
    pub value_count: u32
}

impl IdmapTargetInlineEntry {
    pub const SIZE: usize = 12;
}

#[derive(Debug, PartialEq, DekuWrite)]
pub struct IdmapInlineValue {
    pub config_index: u32,
    pub value: ResValue
}

impl IdmapInlineValue {
    pub const SIZE: usize = 4 + ResValue::SIZE;
}

/// Reverse mapping, used to rewrite references inside the overlay.
#[derive(Debug, PartialEq, DekuWrite)]
pub struct IdmapOverlayEntry {
    pub overlay_id: u32,
    pub target_id: u32
}

impl IdmapOverlayEntry {
    pub const SIZE: usize = 8;
}

pub(crate) fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}
