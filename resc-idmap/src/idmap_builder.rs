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

use std::collections::BTreeMap;

use deku::DekuContainerWrite;
use resc_asset_compiler::{
    configuration::Configuration,
    resource_external_types::{ResValue, ResValueType},
    resource_internal_types::{PolicyFlags, ResourceId},
    string_pool::construct_string_pool
};
use resc_common::*;

use crate::idmap_types::*;

/// Writes idmap files. Entries may be added in any order; the tables are
/// sorted when the file is built.
#[derive(Debug, Clone, Default)]
pub struct IdmapBuilder {
    target_crc32: u32,
    overlay_crc32: u32,
    fulfilled_policies: PolicyFlags,
    enforce_overlayable: bool,
    target_path: String,
    overlay_path: String,
    overlay_name: String,
    debug_info: String,
    aliases: BTreeMap<ResourceId, ResourceId>,
    inline: BTreeMap<ResourceId, Vec<(Configuration, ResValue)>>,
    strings: Vec<String>,
    string_pool_index_offset: u32
}

impl IdmapBuilder {
    pub fn new(target_path: &str, overlay_path: &str, overlay_name: &str) -> Self {
        IdmapBuilder {
            target_path: target_path.to_string(),
            overlay_path: overlay_path.to_string(),
            overlay_name: overlay_name.to_string(),
            ..Default::default()
        }
    }

    pub fn crcs(mut self, target_crc32: u32, overlay_crc32: u32) -> Self {
        self.target_crc32 = target_crc32;
        self.overlay_crc32 = overlay_crc32;
        self
    }

    pub fn policies(mut self, fulfilled_policies: PolicyFlags, enforce_overlayable: bool) -> Self {
        self.fulfilled_policies = fulfilled_policies;
        self.enforce_overlayable = enforce_overlayable;
        self
    }

    pub fn debug_info(mut self, debug_info: &str) -> Self {
        self.debug_info = debug_info.to_string();
        self
    }

    pub fn string_pool_index_offset(mut self, offset: u32) -> Self {
        self.string_pool_index_offset = offset;
        self
    }

    /// `target` is replaced by the overlay resource `overlay`.
    pub fn alias(mut self, target: ResourceId, overlay: ResourceId) -> Self {
        self.aliases.insert(target, overlay);
        self
    }

    /// `target` is replaced by `value` in `config`.
    pub fn inline_value(mut self, target: ResourceId, config: Configuration, value: ResValue) -> Self {
        self.inline.entry(target).or_default().push((config, value));
        self
    }

    /// `target` is replaced by the string `text` in `config`.
    pub fn inline_string(self, target: ResourceId, config: Configuration, text: &str) -> Self {
        let index = self.strings.len() as u32 + self.string_pool_index_offset;
        let mut builder = self.inline_value(target, config, ResValue::new(ResValueType::String, index));
        builder.strings.push(text.to_string());
        builder
    }

    fn write_string(out: &mut Vec<u8>, string: &str) {
        out.extend((string.len() as u32).to_le_bytes());
        out.extend(string.as_bytes());
        out.resize(out.len() + padded_len(string.len()) - string.len(), 0);
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        if let Some(target) = self.inline.keys().find(|target| self.aliases.contains_key(target)) {
            return Err(ResError::MalformedIdmap(format!(
                "{} cannot be both aliased and inlined",
                target
            )));
        }

        let mut configs: Vec<&Configuration> = vec![];
        let mut inline_entries = vec![];
        let mut inline_values = vec![];
        for (target, values) in &self.inline {
            inline_entries.push(IdmapTargetInlineEntry {
                target_id: target.0,
                start_value_index: inline_values.len() as u32,
                value_count: values.len() as u32
            });
            for (config, value) in values {
                let config_index = match configs.iter().position(|known| *known == config) {
                    Some(index) => index,
                    None => {
                        configs.push(config);
                        configs.len() - 1
                    }
                };
                inline_values.push(IdmapInlineValue {
                    config_index: config_index as u32,
                    value: value.clone()
                });
            }
        }

        // Several targets may share one overlay resource; the first wins
        let mut overlay_entries: BTreeMap<ResourceId, ResourceId> = BTreeMap::new();
        for (target, overlay) in &self.aliases {
            overlay_entries.entry(*overlay).or_insert(*target);
        }

        let mut out = IdmapHeader {
            magic: IDMAP_MAGIC,
            version: IDMAP_CURRENT_VERSION,
            target_crc32: self.target_crc32,
            overlay_crc32: self.overlay_crc32,
            fulfilled_policies: self.fulfilled_policies.0,
            enforce_overlayable: self.enforce_overlayable as u32
        }
        .to_bytes()?;
        for string in [&self.target_path, &self.overlay_path, &self.overlay_name, &self.debug_info] {
            Self::write_string(&mut out, string);
        }

        out.extend(
            IdmapDataHeader {
                target_entry_count: self.aliases.len() as u32,
                target_inline_entry_count: inline_entries.len() as u32,
                target_inline_entry_value_count: inline_values.len() as u32,
                config_count: configs.len() as u32,
                overlay_entry_count: overlay_entries.len() as u32,
                string_pool_index_offset: self.string_pool_index_offset
            }
            .to_bytes()?
        );
        for (target, overlay) in &self.aliases {
            out.extend(
                IdmapTargetEntry {
                    target_id: target.0,
                    overlay_id: overlay.0
                }
                .to_bytes()?
            );
        }
        for entry in &inline_entries {
            out.extend(entry.to_bytes()?);
        }
        for value in &inline_values {
            out.extend(value.to_bytes()?);
        }
        for config in configs {
            out.extend(config.to_bytes()?);
        }
        for (overlay, target) in &overlay_entries {
            out.extend(
                IdmapOverlayEntry {
                    overlay_id: overlay.0,
                    target_id: target.0
                }
                .to_bytes()?
            );
        }

        let pool = if self.strings.is_empty() {
            vec![]
        } else {
            construct_string_pool(&self.strings)?
        };
        out.extend((pool.len() as u32).to_le_bytes());
        out.extend(pool);
        Ok(out)
    }
}
