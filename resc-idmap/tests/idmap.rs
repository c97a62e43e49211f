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

use std::{
    fs,
    io::Write,
    time::{Duration, SystemTime}
};

use resc_asset_compiler::{
    configuration::Configuration,
    resource_external_types::{ResValue, ResValueType},
    resource_internal_types::{PolicyFlags, ResourceId}
};
use resc_common::*;
use resc_idmap::{
    idmap_types::IDMAP_MAGIC, DynamicLibManager, DynamicRefTable, IdmapBuilder, IdmapLookup,
    IdmapStatus, LoadedIdmap
};

fn load(bytes: &[u8]) -> Result<LoadedIdmap> {
    LoadedIdmap::load("/data/resource-cache/overlay.idmap", SystemTime::UNIX_EPOCH, bytes)
}

fn night() -> Configuration {
    Configuration {
        ui_mode_night: resc_asset_compiler::configuration::UiModeNight::Night,
        ..Default::default()
    }
}

fn sample() -> IdmapBuilder {
    IdmapBuilder::new("/system/app/Target.apk", "/vendor/overlay/Overlay.apk", "accent")
        .crcs(0x1234_5678, 0x9abc_def0)
        .policies(PolicyFlags::PUBLIC | PolicyFlags::VENDOR_PARTITION, true)
        .alias(ResourceId(0x7f02_0000), ResourceId(0x7f03_0000))
        .alias(ResourceId(0x7f02_0005), ResourceId(0x7f03_0001))
        .inline_value(
            ResourceId(0x7f04_0001),
            Configuration::default(),
            ResValue::new(ResValueType::IntColorRgb8, 0xff00_ff00)
        )
        .inline_value(
            ResourceId(0x7f04_0001),
            night(),
            ResValue::new(ResValueType::IntColorRgb8, 0xff11_1111)
        )
        .inline_string(ResourceId(0x7f05_0000), Configuration::default(), "Overlaid")
}

#[test]
fn aliased_and_missing_ids() {
    let bytes = IdmapBuilder::new("target.apk", "overlay.apk", "")
        .alias(ResourceId(0x7f02_0000), ResourceId(0x7f03_0000))
        .build()
        .unwrap();
    let idmap = load(&bytes).unwrap();
    assert_eq!(
        idmap.lookup(ResourceId(0x7f02_0000)),
        IdmapLookup::Aliased(ResourceId(0x7f03_0000))
    );
    assert_eq!(idmap.lookup(ResourceId(0x7f02_0001)), IdmapLookup::NotOverlaid);
}

#[test]
fn header_is_read_back() {
    let idmap = load(&sample().debug_info("built by test").build().unwrap()).unwrap();
    let info = idmap.info();
    assert_eq!(info.target_crc32, 0x1234_5678);
    assert_eq!(info.overlay_crc32, 0x9abc_def0);
    assert!(info.fulfilled_policies.contains(PolicyFlags::VENDOR_PARTITION));
    assert!(info.enforce_overlayable);
    assert_eq!(info.target_path, "/system/app/Target.apk");
    assert_eq!(info.overlay_path, "/vendor/overlay/Overlay.apk");
    assert_eq!(info.overlay_name, "accent");
    assert_eq!(info.debug_info, "built by test");
}

#[test]
fn lookups_are_exclusive() {
    let idmap = load(&sample().build().unwrap()).unwrap();

    let IdmapLookup::InlineValues(values) = idmap.lookup(ResourceId(0x7f04_0001)) else {
        panic!("expected inline values");
    };
    assert_eq!(values.len(), 2);
    assert!(values[0].config.is_default());
    assert_eq!(values[0].value.data, 0xff00_ff00);
    assert_eq!(values[1].config, night());
    assert_eq!(values[1].value.data, 0xff11_1111);

    let IdmapLookup::InlineValues(strings) = idmap.lookup(ResourceId(0x7f05_0000)) else {
        panic!("expected an inline string");
    };
    assert_eq!(idmap.inline_string(&strings[0].value).unwrap(), Some("Overlaid"));
    assert_eq!(idmap.inline_string(&values[0].value).unwrap(), None);

    assert!(matches!(idmap.lookup(ResourceId(0x7f02_0005)), IdmapLookup::Aliased(_)));
    assert_eq!(idmap.lookup(ResourceId(0x7f04_0000)), IdmapLookup::NotOverlaid);
}

#[test]
fn cursor_agrees_with_lookup_in_any_order() {
    let idmap = load(&sample().build().unwrap()).unwrap();
    let queries = [
        0x7f01_0000,
        0x7f02_0000,
        0x7f02_0001,
        0x7f02_0005,
        0x7f04_0001,
        0x7f05_0000,
        0x7f06_0000,
        // Going back restarts the scan
        0x7f02_0000,
        0x7f04_0001,
    ];
    let mut cursor = idmap.cursor();
    for query in queries {
        let id = ResourceId(query);
        assert_eq!(cursor.lookup(id), idmap.lookup(id), "query {}", id);
    }
}

#[test]
fn overlay_ids_map_back_to_targets() {
    let idmap = load(&sample().build().unwrap()).unwrap();
    assert_eq!(
        idmap.overlay_to_target(ResourceId(0x7f03_0001)),
        Some(ResourceId(0x7f02_0005))
    );
    assert_eq!(idmap.overlay_to_target(ResourceId(0x7f03_0002)), None);

    let mut base = DynamicRefTable::new(0x7f, false);
    base.add_mapping(0x02, 0x09);
    let table = idmap.overlay_dynamic_ref_table(0x0a, base);
    assert_eq!(
        table.lookup_resource_id(ResourceId(0x7f03_0000)).unwrap(),
        ResourceId(0x0a02_0000)
    );
    // Already rewritten ids are left alone
    assert_eq!(
        table.lookup_resource_id(ResourceId(0x0a02_0000)).unwrap(),
        ResourceId(0x0a02_0000)
    );
    assert_eq!(
        table.lookup_resource_id(ResourceId(0x0201_0000)).unwrap(),
        ResourceId(0x0901_0000)
    );
    assert!(matches!(
        table.lookup_resource_id(ResourceId(0x3301_0000)),
        Err(ResError::NoPackageMapping { package_id: 0x33 })
    ));
}

#[test]
fn bad_magic_and_version_are_rejected() {
    let mut bytes = sample().build().unwrap();
    bytes[0] ^= 0xFF;
    assert!(matches!(load(&bytes), Err(ResError::IdmapBadMagic(_))));

    let mut bytes = sample().build().unwrap();
    assert_eq!(&bytes[..4], &IDMAP_MAGIC.to_le_bytes());
    bytes[4] = 0x09;
    assert!(matches!(load(&bytes), Err(ResError::IdmapVersionMismatch(9))));
}

#[test]
fn aliasing_and_inlining_one_target_is_rejected() {
    let builder = IdmapBuilder::new("t", "o", "n")
        .alias(ResourceId(0x7f02_0000), ResourceId(0x7f03_0000))
        .inline_value(
            ResourceId(0x7f02_0000),
            Configuration::default(),
            ResValue::new(ResValueType::IntDec, 1)
        );
    assert!(matches!(builder.build(), Err(ResError::MalformedIdmap(_))));
}

#[test]
fn unsorted_target_table_is_malformed() {
    let bytes = IdmapBuilder::new("", "", "")
        .alias(ResourceId(0x7f02_0000), ResourceId(0x7f03_0000))
        .alias(ResourceId(0x7f02_0001), ResourceId(0x7f03_0001))
        .build()
        .unwrap();
    // Four empty strings follow the 24 byte header, then the 24 byte data header
    let entries = 24 + 4 * 4 + 24;
    let mut swapped = bytes.clone();
    swapped[entries..entries + 8].copy_from_slice(&bytes[entries + 8..entries + 16]);
    swapped[entries + 8..entries + 16].copy_from_slice(&bytes[entries..entries + 8]);
    assert!(matches!(load(&swapped), Err(ResError::MalformedIdmap(_))));
}

// Every prefix and every corrupted copy of a valid idmap must be rejected or
// loaded, never read out of bounds.
#[test]
fn corrupted_idmaps_do_not_panic() {
    let original = sample().build().unwrap();
    for len in 0..original.len() {
        assert!(load(&original[..len]).is_err(), "prefix of {} bytes loaded", len);
    }

    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    for _ in 0..2000 {
        let mut bytes = original.clone();
        for _ in 0..(next() % 6 + 1) {
            // Keep the magic and version so the tables get exercised
            let at = 8 + (next() % (bytes.len() as u64 - 8)) as usize;
            bytes[at] = next() as u8;
        }
        if let Ok(idmap) = load(&bytes) {
            for id in [0x7f02_0000, 0x7f04_0001, 0x7f05_0000] {
                if let IdmapLookup::InlineValues(values) = idmap.lookup(ResourceId(id)) {
                    for value in values {
                        let _ = idmap.inline_string(&value.value);
                    }
                }
            }
        }
    }
}

#[test]
fn modified_file_is_stale() {
    let bytes = sample().build().unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let mtime = fs::metadata(file.path()).unwrap().modified().unwrap();
    let idmap = LoadedIdmap::load(file.path(), mtime, &fs::read(file.path()).unwrap()).unwrap();
    assert_eq!(idmap.status().unwrap(), IdmapStatus::UpToDate);
    assert!(idmap.is_up_to_date().unwrap());

    file.as_file()
        .set_modified(mtime + Duration::from_secs(60))
        .unwrap();
    assert_eq!(idmap.status().unwrap(), IdmapStatus::Stale);

    let path = file.path().to_path_buf();
    drop(file);
    assert!(!path.exists());
    assert!(!idmap.is_up_to_date().unwrap());
}

#[test]
fn library_ids_are_stable() {
    let mut manager = DynamicLibManager::new();
    let first = manager.get_assigned_id("lib_one").unwrap();
    assert_eq!(first, 0x02);
    assert_eq!(manager.get_assigned_id("lib_one").unwrap(), first);
    assert_eq!(manager.get_assigned_id("lib_two").unwrap(), first + 1);
    assert_eq!(manager.find_unassigned_id(0x02).unwrap(), first + 2);
}
