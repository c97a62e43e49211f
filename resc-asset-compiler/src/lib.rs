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

//! Binary resource chunks: reading and writing the chunk container, the
//! in-memory value model, and compiling text XML documents into binary XML.

pub mod binary_xml_reader;
pub mod chunk_reader;
pub mod chunk_writer;
pub mod configuration;
pub mod entry_flattener;
pub mod internal_android_attributes;
pub mod resource_external_types;
pub mod resource_internal_types;
pub mod string_pool;
pub mod text_processing;
pub mod value_parser;
pub mod xml_dom;
pub mod xml_flattener;
pub mod xml_linker;

use resc_common::*;

/// Parses, links and flattens a text XML document in one go.
pub fn compile_xml<R: std::io::Read>(
    reader: R,
    path: &str,
    symbols: &xml_linker::SymbolTable,
    options: &xml_flattener::XmlFlattenerOptions,
    diag: &mut Diagnostics
) -> Result<Vec<u8>> {
    let mut resource = xml_dom::inflate(reader, path)?;
    xml_linker::link_xml(&mut resource, symbols, diag)?;
    xml_flattener::flatten_xml(&resource, options)
}
