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

// An idmap is produced by another tool and may be stale, truncated or simply
// garbage. Everything is decoded and validated up front, so lookups never
// touch the raw bytes again.
use std::{
    io::{self, Cursor, Read},
    path::{Path, PathBuf},
    time::SystemTime
};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};
use resc_asset_compiler::{
    chunk_reader::ResChunkPullParser,
    configuration::Configuration,
    resource_external_types::{ResTableConfig, ResValue, ResValueType},
    resource_internal_types::{PolicyFlags, ResourceId},
    string_pool::StringPoolView
};
use resc_common::*;

use crate::{
    dynamic_ref_table::{DynamicRefTable, OverlayDynamicRefTable},
    idmap_types::*
};

/// Everything in the idmap header besides the magic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdmapInfo {
    pub version: u32,
    pub target_crc32: u32,
    pub overlay_crc32: u32,
    pub fulfilled_policies: PolicyFlags,
    pub enforce_overlayable: bool,
    pub target_path: String,
    pub overlay_path: String,
    pub overlay_name: String,
    pub debug_info: String
}

/// One configuration-specific value stored inline in the idmap.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineValue {
    pub config: Configuration,
    pub value: ResValue
}

/// The result of looking up a target resource. A target resource is either
/// aliased or has inline values, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum IdmapLookup<'a> {
    NotOverlaid,
    /// Use this overlay resource instead
    Aliased(ResourceId),
    /// Use these values instead, one per configuration
    InlineValues(&'a [InlineValue])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdmapStatus {
    UpToDate,
    /// The file changed since it was loaded and must be loaded again
    Stale
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InlineEntry {
    target_id: ResourceId,
    start: usize,
    count: usize
}

#[derive(Debug, Clone)]
pub struct LoadedIdmap {
    info: IdmapInfo,
    // (target, overlay), sorted by target
    target_entries: Vec<(ResourceId, ResourceId)>,
    // Sorted by target
    inline_entries: Vec<InlineEntry>,
    inline_values: Vec<InlineValue>,
    // (overlay, target), sorted by overlay
    overlay_entries: Vec<(ResourceId, ResourceId)>,
    string_pool: Vec<String>,
    string_pool_index_offset: u32,
    path: PathBuf,
    loaded_mtime: SystemTime
}

fn malformed(message: impl Into<String>) -> ResError {
    ResError::MalformedIdmap(message.into())
}

struct IdmapReader<'a> {
    cursor: Cursor<&'a [u8]>
}

impl<'a> IdmapReader<'a> {
    fn remaining(&self) -> usize {
        let data = self.cursor.get_ref();
        data.len().saturating_sub(self.cursor.position() as usize)
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| malformed(format!("truncated while reading {}", what)))
    }

    fn bytes(&mut self, len: usize, what: &str) -> Result<Vec<u8>> {
        if len > self.remaining() {
            return Err(malformed(format!(
                "{} needs {} bytes but only {} remain",
                what,
                len,
                self.remaining()
            )));
        }
        let mut out = vec![0u8; len];
        self.cursor.read_exact(&mut out)?;
        Ok(out)
    }

    fn string(&mut self, what: &str) -> Result<String> {
        let len = self.u32(what)? as usize;
        let bytes = self.bytes(len, what)?;
        self.bytes(padded_len(len) - len, what)?;
        String::from_utf8(bytes).map_err(|_| malformed(format!("{} is not UTF-8", what)))
    }

    // Fails before allocating when the table cannot fit in what is left
    fn table_len(&self, count: u32, entry_size: usize, what: &str) -> Result<usize> {
        let count = count as usize;
        match count.checked_mul(entry_size) {
            Some(size) if size <= self.remaining() => Ok(count),
            _ => Err(malformed(format!("{} {} do not fit in {} bytes", count, what, self.remaining())))
        }
    }

    fn res_value(&mut self) -> Result<ResValue> {
        let size = self
            .cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| malformed("truncated inline value"))?;
        let res0 = self.cursor.read_u8().map_err(|_| malformed("truncated inline value"))?;
        let raw_type = self.cursor.read_u8().map_err(|_| malformed("truncated inline value"))?;
        let data = self.u32("inline value")?;
        let data_type = ResValueType::from_u8(raw_type)
            .ok_or_else(|| malformed(format!("unknown inline value type 0x{:02x}", raw_type)))?;
        Ok(ResValue {
            size,
            res0,
            data_type,
            data
        })
    }
}

fn check_ascending<T>(entries: &[T], key: impl Fn(&T) -> ResourceId, what: &str) -> Result<()> {
    for pair in entries.windows(2) {
        if key(&pair[0]) >= key(&pair[1]) {
            return Err(malformed(format!(
                "{} are not sorted: {} is followed by {}",
                what,
                key(&pair[0]),
                key(&pair[1])
            )));
        }
    }
    Ok(())
}

impl LoadedIdmap {
    /// Decodes and validates an idmap. `path` and `mtime` identify the file
    /// the bytes came from, for [LoadedIdmap::status].
    pub fn load(path: impl Into<PathBuf>, mtime: SystemTime, data: &[u8]) -> Result<Self> {
        let path = path.into();
        let mut reader = IdmapReader {
            cursor: Cursor::new(data)
        };

        let magic = reader.u32("magic")?;
        if magic != IDMAP_MAGIC {
            return Err(ResError::IdmapBadMagic(magic));
        }
        let version = reader.u32("version")?;
        if version != IDMAP_CURRENT_VERSION {
            return Err(ResError::IdmapVersionMismatch(version));
        }
        let target_crc32 = reader.u32("target crc")?;
        let overlay_crc32 = reader.u32("overlay crc")?;
        let fulfilled_policies = PolicyFlags(reader.u32("fulfilled policies")?);
        let enforce_overlayable = reader.u32("enforce overlayable")? != 0;
        let info = IdmapInfo {
            version,
            target_crc32,
            overlay_crc32,
            fulfilled_policies,
            enforce_overlayable,
            target_path: reader.string("target path")?,
            overlay_path: reader.string("overlay path")?,
            overlay_name: reader.string("overlay name")?,
            debug_info: reader.string("debug info")?
        };

        let target_entry_count = reader.u32("target entry count")?;
        let target_inline_entry_count = reader.u32("inline entry count")?;
        let target_inline_entry_value_count = reader.u32("inline value count")?;
        let config_count = reader.u32("config count")?;
        let overlay_entry_count = reader.u32("overlay entry count")?;
        let string_pool_index_offset = reader.u32("string pool index offset")?;

        let count = reader.table_len(target_entry_count, IdmapTargetEntry::SIZE, "target entries")?;
        let mut target_entries = Vec::with_capacity(count);
        for _ in 0..count {
            let target = ResourceId(reader.u32("target entry")?);
            let overlay = ResourceId(reader.u32("target entry")?);
            target_entries.push((target, overlay));
        }

        let count = reader.table_len(
            target_inline_entry_count,
            IdmapTargetInlineEntry::SIZE,
            "inline entries"
        )?;
        let mut inline_entries = Vec::with_capacity(count);
        for _ in 0..count {
            inline_entries.push(InlineEntry {
                target_id: ResourceId(reader.u32("inline entry")?),
                start: reader.u32("inline entry")? as usize,
                count: reader.u32("inline entry")? as usize
            });
        }

        let count = reader.table_len(
            target_inline_entry_value_count,
            IdmapInlineValue::SIZE,
            "inline values"
        )?;
        let mut raw_values = Vec::with_capacity(count);
        for _ in 0..count {
            let config_index = reader.u32("inline value")?;
            raw_values.push((config_index, reader.res_value()?));
        }

        let count = reader.table_len(config_count, ResTableConfig::SIZE, "configurations")?;
        let mut configs = Vec::with_capacity(count);
        for _ in 0..count {
            let bytes = reader.bytes(ResTableConfig::SIZE, "configuration")?;
            configs.push(
                Configuration::from_bytes(&bytes)
                    .map_err(|e| malformed(format!("bad configuration: {:?}", e)))?
            );
        }

        let count = reader.table_len(overlay_entry_count, IdmapOverlayEntry::SIZE, "overlay entries")?;
        let mut overlay_entries = Vec::with_capacity(count);
        for _ in 0..count {
            let overlay = ResourceId(reader.u32("overlay entry")?);
            let target = ResourceId(reader.u32("overlay entry")?);
            overlay_entries.push((overlay, target));
        }

        let pool_size = reader.u32("string pool size")? as usize;
        let pool_bytes = reader.bytes(pool_size, "string pool")?;
        let string_pool = if pool_bytes.is_empty() {
            vec![]
        } else {
            match ResChunkPullParser::new(&pool_bytes).next() {
                Some(chunk) => StringPoolView::parse(&chunk?)?.strings()?,
                None => vec![]
            }
        };

        check_ascending(&target_entries, |(target, _)| *target, "target entries")?;
        check_ascending(&inline_entries, |entry| entry.target_id, "inline entries")?;
        check_ascending(&overlay_entries, |(overlay, _)| *overlay, "overlay entries")?;
        for entry in &inline_entries {
            if target_entries
                .binary_search_by_key(&entry.target_id, |(target, _)| *target)
                .is_ok()
            {
                return Err(malformed(format!(
                    "{} is both aliased and inlined",
                    entry.target_id
                )));
            }
            match entry.start.checked_add(entry.count) {
                Some(end) if end <= raw_values.len() => {}
                _ => {
                    return Err(malformed(format!(
                        "inline values {}+{} of {} are out of range",
                        entry.start, entry.count, entry.target_id
                    )))
                }
            }
        }
        let inline_values = raw_values
            .into_iter()
            .map(|(config_index, value)| {
                let config = configs.get(config_index as usize).ok_or_else(|| {
                    malformed(format!("configuration index {} is out of range", config_index))
                })?;
                Ok(InlineValue {
                    config: config.clone(),
                    value
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "loaded idmap {} for overlay {}: {} aliased, {} inline, {} overlay entries",
            path.display(),
            info.overlay_name,
            target_entries.len(),
            inline_entries.len(),
            overlay_entries.len()
        );

        Ok(LoadedIdmap {
            info,
            target_entries,
            inline_entries,
            inline_values,
            overlay_entries,
            string_pool,
            string_pool_index_offset,
            path,
            loaded_mtime: mtime
        })
    }

    pub fn info(&self) -> &IdmapInfo {
        &self.info
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn inline_lookup(&self, index: usize) -> IdmapLookup<'_> {
        let entry = self.inline_entries[index];
        IdmapLookup::InlineValues(&self.inline_values[entry.start..entry.start + entry.count])
    }

    /// How `target_id` is overlaid, if at all.
    pub fn lookup(&self, target_id: ResourceId) -> IdmapLookup<'_> {
        if let Ok(index) = self
            .target_entries
            .binary_search_by_key(&target_id, |(target, _)| *target)
        {
            return IdmapLookup::Aliased(self.target_entries[index].1);
        }
        match self
            .inline_entries
            .binary_search_by_key(&target_id, |entry| entry.target_id)
        {
            Ok(index) => self.inline_lookup(index),
            Err(_) => IdmapLookup::NotOverlaid
        }
    }

    /// A cursor for many lookups in ascending id order.
    pub fn cursor(&self) -> TargetCursor<'_> {
        TargetCursor {
            idmap: self,
            target_position: 0,
            inline_position: 0,
            last: None
        }
    }

    /// The target resource an overlay resource stands in for.
    pub fn overlay_to_target(&self, overlay_id: ResourceId) -> Option<ResourceId> {
        self.overlay_entries
            .binary_search_by_key(&overlay_id, |(overlay, _)| *overlay)
            .ok()
            .map(|index| self.overlay_entries[index].1)
    }

    /// The text of an inline string value. Other value types have none.
    pub fn inline_string(&self, value: &ResValue) -> Result<Option<&str>> {
        if value.data_type != ResValueType::String {
            return Ok(None);
        }
        value
            .data
            .checked_sub(self.string_pool_index_offset)
            .and_then(|index| self.string_pool.get(index as usize))
            .map(|string| Some(string.as_str()))
            .ok_or(ResError::StringPoolIndexOutOfRange(value.data))
    }

    /// The table that rewrites ids used by the overlay once the target was
    /// loaded with `target_assigned_package_id`. `base` resolves everything
    /// else the overlay references.
    pub fn overlay_dynamic_ref_table(
        &self,
        target_assigned_package_id: u8,
        base: DynamicRefTable
    ) -> OverlayDynamicRefTable {
        OverlayDynamicRefTable::new(self.overlay_entries.clone(), target_assigned_package_id, base)
    }

    /// Compares the modification time recorded at load with the file's
    /// current one. A deleted file is stale.
    pub fn status(&self) -> Result<IdmapStatus> {
        let modified = match std::fs::metadata(&self.path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("idmap {} was removed", self.path.display());
                return Ok(IdmapStatus::Stale);
            }
            Err(e) => return Err(e.into())
        };
        if modified == self.loaded_mtime {
            Ok(IdmapStatus::UpToDate)
        } else {
            warn!("idmap {} changed since it was loaded", self.path.display());
            Ok(IdmapStatus::Stale)
        }
    }

    pub fn is_up_to_date(&self) -> Result<bool> {
        Ok(self.status()? == IdmapStatus::UpToDate)
    }
}

/// Looks up target ids, resuming from the previous position. Ascending
/// queries scan each table once; a smaller id than the last one starts over.
pub struct TargetCursor<'a> {
    idmap: &'a LoadedIdmap,
    target_position: usize,
    inline_position: usize,
    last: Option<ResourceId>
}

impl<'a> TargetCursor<'a> {
    pub fn lookup(&mut self, target_id: ResourceId) -> IdmapLookup<'a> {
        if self.last.is_some_and(|last| target_id < last) {
            self.target_position = 0;
            self.inline_position = 0;
        }
        self.last = Some(target_id);

        let targets = &self.idmap.target_entries;
        while self.target_position < targets.len() && targets[self.target_position].0 < target_id {
            self.target_position += 1;
        }
        if let Some((target, overlay)) = targets.get(self.target_position) {
            if *target == target_id {
                return IdmapLookup::Aliased(*overlay);
            }
        }

        let inline = &self.idmap.inline_entries;
        while self.inline_position < inline.len() && inline[self.inline_position].target_id < target_id {
            self.inline_position += 1;
        }
        match inline.get(self.inline_position) {
            Some(entry) if entry.target_id == target_id => self.idmap.inline_lookup(self.inline_position),
            _ => IdmapLookup::NotOverlaid
        }
    }
}
