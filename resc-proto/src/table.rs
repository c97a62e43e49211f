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

// A whole compilation unit in intermediate form: entries grouped by type and
// package, plus the source pool every value's Source indexes into.

use log::debug;
use resc_asset_compiler::resource_internal_types::ResourceEntry;
use resc_common::{ResError, Result};

use crate::{
    aapt::pb,
    deserialize::{deserialize_entry, read_source_pool},
    inner_proto, proto,
    serialize::{serialize_entry, SourcePool}
};

pub const TOOL_NAME: &str = "resc";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableType {
    /// eg. `string`, `layout`
    pub name: String,
    pub id: Option<u8>,
    pub entries: Vec<ResourceEntry>
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TablePackage {
    pub name: String,
    pub id: Option<u8>,
    pub types: Vec<TableType>
}

fn construct_tool_fingerprint() -> Vec<pb::ToolFingerprint> {
    vec![pb::ToolFingerprint {
        tool: TOOL_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into()
    }]
}

fn serialize_type(table_type: &TableType, pool: &mut SourcePool) -> Result<pb::Type> {
    Ok(inner_proto! {pb::Type,
        type_id: table_type.id.and_then(|id| proto! {pb::TypeId, id: id as u32}),
        name: table_type.name.clone(),
        entry: table_type
            .entries
            .iter()
            .map(|entry| serialize_entry(entry, pool))
            .collect::<Result<Vec<_>>>()?
    })
}

/// Serializes `packages`. Source paths are pooled across the whole table.
pub fn serialize_table(packages: &[TablePackage]) -> Result<pb::ResourceTable> {
    let mut pool = SourcePool::new();
    let package = packages
        .iter()
        .map(|package| {
            Ok(pb::Package {
                package_id: package.id.and_then(|id| proto! {pb::PackageId, id: id as u32}),
                package_name: package.name.clone(),
                r#type: package
                    .types
                    .iter()
                    .map(|table_type| serialize_type(table_type, &mut pool))
                    .collect::<Result<Vec<_>>>()?
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("serialized table with {} source paths", pool.paths().len());

    Ok(inner_proto! {pb::ResourceTable,
        source_pool: Some(pool.to_pb()?),
        package: package,
        tool_fingerprint: construct_tool_fingerprint()
    })
}

fn narrow_id(id: u32, what: &str) -> Result<u8> {
    u8::try_from(id).map_err(|_| ResError::InvalidIntermediate(format!("{} id {} is out of range", what, id)))
}

pub fn deserialize_table(table: &pb::ResourceTable) -> Result<Vec<TablePackage>> {
    let paths = match &table.source_pool {
        Some(pool) => read_source_pool(pool)?,
        None => vec![]
    };
    table
        .package
        .iter()
        .map(|package| {
            Ok(TablePackage {
                name: package.package_name.clone(),
                id: package
                    .package_id
                    .as_ref()
                    .map(|id| narrow_id(id.id, "package"))
                    .transpose()?,
                types: package
                    .r#type
                    .iter()
                    .map(|table_type| {
                        Ok(TableType {
                            name: table_type.name.clone(),
                            id: table_type
                                .type_id
                                .as_ref()
                                .map(|id| narrow_id(id.id, "type"))
                                .transpose()?,
                            entries: table_type
                                .entry
                                .iter()
                                .map(|entry| deserialize_entry(entry, &paths))
                                .collect::<Result<Vec<_>>>()?
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            })
        })
        .collect()
}
