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

use phf::phf_map;

use crate::{resource_external_types::*, resource_internal_types::ResourceId};

pub const ANDROID_INTERNAL_ATTRIBUTE_MAGIC: u32 = 0x0101_0000;

/// An `android:` attribute as declared by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameworkAttribute {
    pub entry: u16,
    /// `ATTR_FORMAT_*` bits
    pub format_flags: u32,
    /// Values accepted for enum attributes
    pub symbols: &'static [(&'static str, u32)]
}

impl FrameworkAttribute {
    pub fn id(&self) -> ResourceId {
        ResourceId(ANDROID_INTERNAL_ATTRIBUTE_MAGIC | self.entry as u32)
    }

    pub fn symbol_value(&self, name: &str) -> Option<u32> {
        self.symbols
            .iter()
            .find(|(symbol, _)| *symbol == name)
            .map(|(_, value)| *value)
    }
}

const fn attr(entry: u16, format_flags: u32) -> FrameworkAttribute {
    FrameworkAttribute {
        entry,
        format_flags,
        symbols: &[]
    }
}

const REFERENCE_OR_STRING: u32 = ATTR_FORMAT_REFERENCE | ATTR_FORMAT_STRING;
const REFERENCE_OR_COLOR: u32 = ATTR_FORMAT_REFERENCE | ATTR_FORMAT_COLOR;
const INTEGER_OR_STRING: u32 = ATTR_FORMAT_INTEGER | ATTR_FORMAT_STRING;

const ORIENTATION_SYMBOLS: &[(&str, u32)] = &[("horizontal", 0), ("vertical", 1)];
const LAYOUT_SIZE_SYMBOLS: &[(&str, u32)] = &[
    ("fill_parent", 0xFFFF_FFFF),
    ("match_parent", 0xFFFF_FFFF),
    ("wrap_content", 0xFFFF_FFFE)
];
const VISIBILITY_SYMBOLS: &[(&str, u32)] = &[("visible", 0), ("invisible", 1), ("gone", 2)];

/// The Android Internal Attributes (android:name, android:compileSdkVersion
/// etc.) all have internal IDs which are important to know and look up.
/// Only the ones that appear in manifests and simple layouts are listed.
static INTERNAL_ATTRIBUTES_MAP: phf::Map<&'static str, FrameworkAttribute> = phf_map! {
    "theme" => attr(0x0000, ATTR_FORMAT_REFERENCE),
    "label" => attr(0x0001, REFERENCE_OR_STRING),
    "icon" => attr(0x0002, ATTR_FORMAT_REFERENCE),
    "name" => attr(0x0003, ATTR_FORMAT_STRING),
    "permission" => attr(0x0006, ATTR_FORMAT_STRING),
    "hasCode" => attr(0x000c, ATTR_FORMAT_BOOLEAN),
    "enabled" => attr(0x000e, ATTR_FORMAT_BOOLEAN),
    "debuggable" => attr(0x000f, ATTR_FORMAT_BOOLEAN),
    "exported" => attr(0x0010, ATTR_FORMAT_BOOLEAN),
    "process" => attr(0x0011, ATTR_FORMAT_STRING),
    "authorities" => attr(0x0018, ATTR_FORMAT_STRING),
    "description" => attr(0x0020, REFERENCE_OR_STRING),
    "value" => attr(0x0024, ATTR_FORMAT_ANY),
    "resource" => attr(0x0025, ATTR_FORMAT_REFERENCE),
    "scheme" => attr(0x0027, ATTR_FORMAT_STRING),
    "host" => attr(0x0028, ATTR_FORMAT_STRING),
    "textSize" => attr(0x0095, ATTR_FORMAT_DIMENSION),
    "textColor" => attr(0x0098, REFERENCE_OR_COLOR),
    "orientation" => FrameworkAttribute {
        entry: 0x00c4,
        format_flags: ATTR_FORMAT_ENUM,
        symbols: ORIENTATION_SYMBOLS
    },
    "id" => attr(0x00d0, ATTR_FORMAT_REFERENCE),
    "background" => attr(0x00d4, REFERENCE_OR_COLOR),
    "padding" => attr(0x00d5, ATTR_FORMAT_DIMENSION),
    "visibility" => FrameworkAttribute {
        entry: 0x00dc,
        format_flags: ATTR_FORMAT_ENUM,
        symbols: VISIBILITY_SYMBOLS
    },
    "layout_width" => FrameworkAttribute {
        entry: 0x00f4,
        format_flags: ATTR_FORMAT_DIMENSION | ATTR_FORMAT_ENUM,
        symbols: LAYOUT_SIZE_SYMBOLS
    },
    "layout_height" => FrameworkAttribute {
        entry: 0x00f5,
        format_flags: ATTR_FORMAT_DIMENSION | ATTR_FORMAT_ENUM,
        symbols: LAYOUT_SIZE_SYMBOLS
    },
    "src" => attr(0x0119, REFERENCE_OR_COLOR),
    "text" => attr(0x014f, REFERENCE_OR_STRING),
    "minSdkVersion" => attr(0x020c, INTEGER_OR_STRING),
    "versionCode" => attr(0x021b, ATTR_FORMAT_INTEGER),
    "versionName" => attr(0x021c, ATTR_FORMAT_STRING),
    "targetSdkVersion" => attr(0x0270, INTEGER_OR_STRING),
    "maxSdkVersion" => attr(0x0271, ATTR_FORMAT_INTEGER),
    "allowBackup" => attr(0x0280, ATTR_FORMAT_BOOLEAN),
    "glEsVersion" => attr(0x0281, ATTR_FORMAT_INTEGER),
    "required" => attr(0x028e, ATTR_FORMAT_BOOLEAN),
    "supportsRtl" => attr(0x03af, ATTR_FORMAT_BOOLEAN),
    "roundIcon" => attr(0x052c, ATTR_FORMAT_REFERENCE),
    "compileSdkVersion" => attr(0x0572, ATTR_FORMAT_INTEGER),
    "compileSdkVersionCodename" => attr(0x0573, ATTR_FORMAT_STRING),
};

/// The id and format of the framework attribute `name`, if it is known.
pub fn get_internal_attribute(name: &str) -> Option<FrameworkAttribute> {
    INTERNAL_ATTRIBUTES_MAP.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_attributes_have_known_ids() {
        assert_eq!(get_internal_attribute("name").unwrap().id(), ResourceId(0x0101_0003));
        assert_eq!(
            get_internal_attribute("versionCode").unwrap().id(),
            ResourceId(0x0101_021b)
        );
        assert!(get_internal_attribute("notAnAttribute").is_none());
    }

    #[test]
    fn enum_symbols() {
        let width = get_internal_attribute("layout_width").unwrap();
        assert_eq!(width.symbol_value("match_parent"), Some(0xFFFF_FFFF));
        assert_eq!(width.symbol_value("wrap_content"), Some(0xFFFF_FFFE));
        assert_eq!(width.symbol_value("huge"), None);
    }
}
