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

// Package ids inside resource ids are picked independently by every build.
// When packages are loaded together the runtime assigns its own ids, and a
// DynamicRefTable translates one to the other.
use std::{collections::BTreeMap, io::Cursor};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};
use resc_asset_compiler::{
    chunk_reader::Chunk,
    resource_external_types::{ChunkType, ResTableLibEntry, ResValue, ResValueType},
    resource_internal_types::ResourceId
};
use resc_common::*;

pub const APP_PACKAGE_ID: u8 = 0x7f;
pub const SYS_PACKAGE_ID: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicRefTable {
    assigned_package_id: u8,
    app_as_lib: bool,
    // Library package name -> build-time package id
    entries: BTreeMap<String, u8>,
    // Build-time package id -> runtime package id, 0 when unmapped
    lookup_table: [u8; 256]
}

impl Default for DynamicRefTable {
    fn default() -> Self {
        DynamicRefTable::new(0, false)
    }
}

impl DynamicRefTable {
    /// A table for the package loaded with `package_id`. With `app_as_lib`
    /// the package's own `0x7f` ids are treated as local and rewritten too.
    pub fn new(package_id: u8, app_as_lib: bool) -> Self {
        let mut lookup_table = [0u8; 256];
        lookup_table[APP_PACKAGE_ID as usize] = APP_PACKAGE_ID;
        lookup_table[SYS_PACKAGE_ID as usize] = SYS_PACKAGE_ID;
        DynamicRefTable {
            assigned_package_id: package_id,
            app_as_lib,
            entries: BTreeMap::new(),
            lookup_table
        }
    }

    pub fn assigned_package_id(&self) -> u8 {
        self.assigned_package_id
    }

    /// Shared libraries this package was built against, by name.
    pub fn entries(&self) -> &BTreeMap<String, u8> {
        &self.entries
    }

    /// Reads the library names and their build-time ids from a
    /// `RES_TABLE_LIBRARY_TYPE` chunk. The runtime ids are added later with
    /// [DynamicRefTable::add_mapping_by_name].
    pub fn load_library_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        if chunk.chunk_type() != Some(ChunkType::TableLibrary) {
            return Err(ResError::MalformedChunk(format!(
                "expected a library chunk, found type 0x{:04x}",
                chunk.raw_type
            )));
        }
        let count = Cursor::new(chunk.extra_header())
            .read_u32::<LittleEndian>()
            .map_err(|_| ResError::MalformedChunk(String::from("library chunk header has no count")))?;
        let payload = chunk.payload();
        if count as usize > payload.len() / ResTableLibEntry::SIZE {
            return Err(ResError::MalformedChunk(format!(
                "library chunk of {} bytes is too small for {} entries",
                payload.len(),
                count
            )));
        }

        let mut cursor = Cursor::new(payload);
        for _ in 0..count {
            let package_id = cursor.read_u32::<LittleEndian>()?;
            let mut name = [0u16; 128];
            cursor.read_u16_into::<LittleEndian>(&mut name)?;
            let package_id = u8::try_from(package_id)
                .map_err(|_| ResError::MalformedChunk(format!("bad library package id 0x{:08x}", package_id)))?;
            let length = name.iter().position(|&unit| unit == 0).unwrap_or(name.len());
            let name = String::from_utf16_lossy(&name[..length]);
            debug!("found library {} with id 0x{:02x}", name, package_id);
            self.entries.insert(name, package_id);
        }
        Ok(())
    }

    /// Merges `other` into this table. Both must be for the same package and
    /// must not disagree on any library or mapping.
    pub fn add_mappings(&mut self, other: &DynamicRefTable) -> Result<()> {
        if self.assigned_package_id != other.assigned_package_id {
            return Err(ResError::DynamicRefConflict(format!(
                "tables belong to packages 0x{:02x} and 0x{:02x}",
                self.assigned_package_id, other.assigned_package_id
            )));
        }
        for (name, id) in &other.entries {
            match self.entries.get(name) {
                Some(existing) if existing != id => {
                    return Err(ResError::DynamicRefConflict(format!(
                        "library {} has ids 0x{:02x} and 0x{:02x}",
                        name, existing, id
                    )));
                }
                Some(_) => {}
                None => {
                    self.entries.insert(name.clone(), *id);
                }
            }
        }
        for (build_id, (mine, theirs)) in self
            .lookup_table
            .iter_mut()
            .zip(other.lookup_table.iter())
            .enumerate()
        {
            if *mine == *theirs || *theirs == 0 {
                continue;
            }
            if *mine != 0 {
                return Err(ResError::DynamicRefConflict(format!(
                    "package 0x{:02x} maps to both 0x{:02x} and 0x{:02x}",
                    build_id, mine, theirs
                )));
            }
            *mine = *theirs;
        }
        Ok(())
    }

    /// Maps the library `package_name` to the runtime `package_id`. The
    /// library must already be known from a library chunk.
    pub fn add_mapping_by_name(&mut self, package_name: &str, package_id: u8) -> Result<()> {
        let Some(build_id) = self.entries.get(package_name) else {
            return Err(ResError::DynamicRefConflict(format!(
                "{} is not a library of package 0x{:02x}",
                package_name, self.assigned_package_id
            )));
        };
        self.lookup_table[*build_id as usize] = package_id;
        Ok(())
    }

    pub fn add_mapping(&mut self, build_package_id: u8, runtime_package_id: u8) {
        self.lookup_table[build_package_id as usize] = runtime_package_id;
    }

    /// The runtime id of `build_package_id`, if one is mapped.
    pub fn runtime_package_id(&self, build_package_id: u8) -> Option<u8> {
        match self.lookup_table[build_package_id as usize] {
            0 => None,
            id => Some(id)
        }
    }

    /// Whether [DynamicRefTable::lookup_resource_value] would change `value`.
    pub fn requires_lookup(&self, value: &ResValue) -> bool {
        match value.data_type {
            ResValueType::Reference | ResValueType::Attribute => {
                self.app_as_lib || ResourceId(value.data).package_id() == 0
            }
            ResValueType::DynamicReference | ResValueType::DynamicAttribute => true,
            _ => false
        }
    }

    /// Translates the package id of a build-time resource id.
    pub fn lookup_resource_id(&self, id: ResourceId) -> Result<ResourceId> {
        let package_id = id.package_id();
        if package_id == APP_PACKAGE_ID && !self.app_as_lib {
            // App ids are absolute
            return Ok(id);
        }
        if package_id == 0 || (package_id == APP_PACKAGE_ID && self.app_as_lib) {
            // A library referring to its own resources
            return Ok(id.with_package_id(self.assigned_package_id));
        }
        match self.runtime_package_id(package_id) {
            Some(runtime_id) => Ok(id.with_package_id(runtime_id)),
            None => {
                warn!(
                    "DynamicRefTable(0x{:02x}): no mapping for build-time package id 0x{:02x}",
                    self.assigned_package_id, package_id
                );
                Err(ResError::NoPackageMapping { package_id })
            }
        }
    }

    /// Rewrites a reference or attribute value in place. Dynamic references
    /// become plain references once their package is resolved.
    pub fn lookup_resource_value(&self, value: &mut ResValue) -> Result<()> {
        let resolved_type = match value.data_type {
            ResValueType::Reference | ResValueType::Attribute if !self.app_as_lib => return Ok(()),
            ResValueType::Reference | ResValueType::DynamicReference => ResValueType::Reference,
            ResValueType::Attribute | ResValueType::DynamicAttribute => ResValueType::Attribute,
            _ => return Ok(())
        };
        value.data = self.lookup_resource_id(ResourceId(value.data))?.0;
        value.data_type = resolved_type;
        Ok(())
    }
}

/// Rewrites ids used inside an overlay. Overlay resources that replace a
/// target resource are redirected to the target id under the package id the
/// runtime gave the target; other ids go through the overlay's own
/// [DynamicRefTable].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDynamicRefTable {
    // (overlay id, target id), sorted by overlay id
    overlay_entries: Vec<(ResourceId, ResourceId)>,
    target_assigned_package_id: u8,
    base: DynamicRefTable
}

impl OverlayDynamicRefTable {
    pub fn new(
        overlay_entries: Vec<(ResourceId, ResourceId)>,
        target_assigned_package_id: u8,
        base: DynamicRefTable
    ) -> Self {
        OverlayDynamicRefTable {
            overlay_entries,
            target_assigned_package_id,
            base
        }
    }

    pub fn target_assigned_package_id(&self) -> u8 {
        self.target_assigned_package_id
    }

    /// The overlay's own table, for adding library mappings.
    pub fn base_mut(&mut self) -> &mut DynamicRefTable {
        &mut self.base
    }

    /// Ids already under the target's package are returned unchanged, even
    /// when the overlay was built with the same package id.
    pub fn lookup_resource_id(&self, id: ResourceId) -> Result<ResourceId> {
        if id.package_id() == self.target_assigned_package_id {
            return Ok(id);
        }
        if let Ok(index) = self
            .overlay_entries
            .binary_search_by_key(&id, |(overlay_id, _)| *overlay_id)
        {
            let (_, target_id) = self.overlay_entries[index];
            return Ok(target_id.with_package_id(self.target_assigned_package_id));
        }
        self.base.lookup_resource_id(id)
    }

    /// Like [OverlayDynamicRefTable::lookup_resource_id], without redirecting
    /// overlay resources to the target.
    pub fn lookup_resource_id_no_rewrite(&self, id: ResourceId) -> Result<ResourceId> {
        if id.package_id() == self.target_assigned_package_id {
            return Ok(id);
        }
        self.base.lookup_resource_id(id)
    }
}

#[cfg(test)]
mod tests {
    use deku::DekuContainerWrite;
    use resc_asset_compiler::{
        chunk_reader::ResChunkPullParser,
        chunk_writer::ChunkWriter,
        resource_external_types::ResTableLibHeader
    };

    use super::*;

    fn library_chunk(libraries: &[(u8, &str)]) -> Vec<u8> {
        let mut buffer = vec![];
        let mut writer = ChunkWriter::start(
            &mut buffer,
            ChunkType::TableLibrary,
            &ResTableLibHeader {
                count: libraries.len() as u32
            }
        )
        .unwrap();
        for (id, name) in libraries {
            writer.write(&ResTableLibEntry::new(*id, name).to_bytes().unwrap());
        }
        writer.finish();
        buffer
    }

    fn load(bytes: &[u8], table: &mut DynamicRefTable) -> Result<()> {
        let chunk = ResChunkPullParser::new(bytes).next().unwrap()?;
        table.load_library_chunk(&chunk)
    }

    #[test]
    fn reserved_packages_pass_through() {
        let table = DynamicRefTable::new(0x02, false);
        assert_eq!(table.lookup_resource_id(ResourceId(0x7f01_0000)).unwrap(), ResourceId(0x7f01_0000));
        assert_eq!(table.lookup_resource_id(ResourceId(0x0101_0003)).unwrap(), ResourceId(0x0101_0003));
    }

    #[test]
    fn local_ids_get_the_assigned_package() {
        let table = DynamicRefTable::new(0x05, false);
        assert_eq!(table.lookup_resource_id(ResourceId(0x0002_0001)).unwrap(), ResourceId(0x0502_0001));

        let as_lib = DynamicRefTable::new(0x05, true);
        assert_eq!(as_lib.lookup_resource_id(ResourceId(0x7f02_0001)).unwrap(), ResourceId(0x0502_0001));
    }

    #[test]
    fn unmapped_package_is_an_error() {
        let table = DynamicRefTable::new(0x7f, false);
        assert!(matches!(
            table.lookup_resource_id(ResourceId(0x0301_0000)),
            Err(ResError::NoPackageMapping { package_id: 0x03 })
        ));
    }

    #[test]
    fn library_chunk_names_map_to_runtime_ids() {
        let mut table = DynamicRefTable::new(0x7f, false);
        load(&library_chunk(&[(0x02, "com.example.lib")]), &mut table).unwrap();
        assert_eq!(table.entries().get("com.example.lib"), Some(&0x02));

        table.add_mapping_by_name("com.example.lib", 0x04).unwrap();
        assert_eq!(table.lookup_resource_id(ResourceId(0x0201_0007)).unwrap(), ResourceId(0x0401_0007));
        assert!(table.add_mapping_by_name("com.example.other", 0x05).is_err());
    }

    #[test]
    fn truncated_library_chunk_is_rejected() {
        let mut bytes = library_chunk(&[(0x02, "a"), (0x03, "b")]);
        // Claim a third entry
        bytes[8] = 3;
        let mut table = DynamicRefTable::new(0x7f, false);
        assert!(matches!(load(&bytes, &mut table), Err(ResError::MalformedChunk(_))));
    }

    #[test]
    fn dynamic_values_become_plain_references() {
        let mut table = DynamicRefTable::new(0x7f, false);
        table.add_mapping(0x02, 0x03);

        let mut value = ResValue::new(ResValueType::DynamicReference, 0x0201_0000);
        assert!(table.requires_lookup(&value));
        table.lookup_resource_value(&mut value).unwrap();
        assert_eq!(value, ResValue::new(ResValueType::Reference, 0x0301_0000));

        let mut attr = ResValue::new(ResValueType::DynamicAttribute, 0x0201_0001);
        table.lookup_resource_value(&mut attr).unwrap();
        assert_eq!(attr, ResValue::new(ResValueType::Attribute, 0x0301_0001));

        // Plain references of an app are absolute
        let mut plain = ResValue::new(ResValueType::Reference, 0x0201_0000);
        assert!(!table.requires_lookup(&plain));
        table.lookup_resource_value(&mut plain).unwrap();
        assert_eq!(plain.data, 0x0201_0000);
    }

    #[test]
    fn merging_detects_conflicts() {
        let mut first = DynamicRefTable::new(0x7f, false);
        first.add_mapping(0x02, 0x03);
        let mut second = DynamicRefTable::new(0x7f, false);
        second.add_mapping(0x04, 0x05);
        first.add_mappings(&second).unwrap();
        assert_eq!(first.runtime_package_id(0x04), Some(0x05));

        let mut conflicting = DynamicRefTable::new(0x7f, false);
        conflicting.add_mapping(0x02, 0x06);
        assert!(matches!(first.add_mappings(&conflicting), Err(ResError::DynamicRefConflict(_))));
        assert!(first.add_mappings(&DynamicRefTable::new(0x10, false)).is_err());
    }

    #[test]
    fn overlay_ids_are_redirected_to_the_target() {
        let table = OverlayDynamicRefTable::new(
            vec![(ResourceId(0x7f03_0000), ResourceId(0x7f02_0000))],
            0x08,
            DynamicRefTable::new(0x7f, false)
        );
        assert_eq!(table.lookup_resource_id(ResourceId(0x7f03_0000)).unwrap(), ResourceId(0x0802_0000));
        // Already under the target's package
        assert_eq!(table.lookup_resource_id(ResourceId(0x0802_0001)).unwrap(), ResourceId(0x0802_0001));
        assert!(matches!(
            table.lookup_resource_id(ResourceId(0x4401_0000)),
            Err(ResError::NoPackageMapping { package_id: 0x44 })
        ));
        assert_eq!(
            table.lookup_resource_id_no_rewrite(ResourceId(0x7f03_0000)).unwrap(),
            ResourceId(0x7f03_0000)
        );
    }

    #[test]
    fn target_package_ids_pass_through_when_packages_collide() {
        let table = OverlayDynamicRefTable::new(
            vec![(ResourceId(0x7f03_0000), ResourceId(0x7f02_0000))],
            0x7f,
            DynamicRefTable::new(0x7f, false)
        );
        assert_eq!(table.lookup_resource_id(ResourceId(0x7f03_0000)).unwrap(), ResourceId(0x7f03_0000));
        assert_eq!(table.lookup_resource_id(ResourceId(0x7f02_0000)).unwrap(), ResourceId(0x7f02_0000));
    }
}
