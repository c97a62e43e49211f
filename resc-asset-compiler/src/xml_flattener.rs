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

// Encodes an XML document into an XmlFile ResChunk:
//
//   XmlFile
//     StringPool
//     XmlResourceMap
//     XmlStartNamespace / XmlStartElement / XmlCdata / XmlEndElement / XmlEndNamespace ...
//
// Strings are only known by handle while the node chunks are written. Once
// the whole tree has been visited the pool is sorted so that attribute names
// with resource ids come first, in id order, and every handle is patched with
// its final index.
use std::cmp::Ordering;

use log::debug;
use resc_common::*;

use crate::{
    chunk_writer::ChunkWriter,
    resource_external_types::*,
    resource_internal_types::*,
    string_pool::*,
    text_processing::{compact_text_node, process_text},
    xml_dom::*
};

// android:id
const ID_ATTRIBUTE: ResourceId = ResourceId(0x0101_00d0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XmlFlattenerOptions {
    /// Write the original text of compiled attributes as their raw value
    pub keep_raw_values: bool,
    pub use_utf16: bool
}

/// Pool and deferred references for one traversal. Owned by the caller of
/// the traversal, never shared between documents.
#[derive(Debug, Default)]
pub struct FlattenState {
    pub pool: StringPoolBuilder,
    pub patches: PendingPatches
}

impl FlattenState {
    pub fn new() -> Self {
        Self::default()
    }

    // Interns `value` and arranges for its final index to land at `offset`
    fn add_string(&mut self, value: &str, priority: u32, offset: usize) {
        let string = self.pool.make_ref(value, priority);
        self.patches.record(string, offset);
    }

    // Empty strings are written as a null reference rather than an index
    fn add_optional_string(&mut self, value: &str, offset: usize) {
        if !value.is_empty() {
            self.add_string(value, LOW_PRIORITY, offset);
        }
    }
}

/// Flattens `resource` into a complete binary XML document.
pub fn flatten_xml(resource: &XmlResource, options: &XmlFlattenerOptions) -> Result<Vec<u8>> {
    let mut state = FlattenState::new();
    let mut nodes = vec![];
    flatten_element(&resource.root, options, &mut state, &mut nodes)?;

    let pool = state.pool.sort();
    state.patches.apply(&mut nodes, &pool)?;
    debug!(
        "Flattened {} with {} strings and {} string references",
        resource.source,
        pool.len(),
        state.patches.len()
    );

    let mut buffer = vec![];
    let mut xml_file = ChunkWriter::start_bare(&mut buffer, ChunkType::XmlFile)?;
    let encoding = if options.use_utf16 {
        StringPoolEncoding::Utf16
    } else {
        StringPoolEncoding::Utf8
    };
    pool.flatten(xml_file.buffer(), encoding)?;

    // Always present, even when empty
    let mut resource_map = ChunkWriter::start_bare(xml_file.buffer(), ChunkType::XmlResourceMap)?;
    for id in pool.resource_ids() {
        resource_map.write_u32(id);
    }
    resource_map.finish();

    xml_file.write(&nodes);
    xml_file.finish();
    Ok(buffer)
}

fn is_runtime_namespace(uri: &str) -> bool {
    uri != TOOLS_NAMESPACE
}

fn node_header(line: usize) -> XmlNodeHeader {
    XmlNodeHeader {
        line_number: line as u32,
        // Comments are not kept in binary XML
        comment: UINT32_MINUS_ONE
    }
}

/// Attributes with resource ids first, ascending by id, then everything else
/// by namespace and name.
pub fn compare_attributes(a: &XmlAttribute, b: &XmlAttribute) -> Ordering {
    match (a.resource_id, b.resource_id) {
        (Some(a_id), Some(b_id)) => a_id.cmp(&b_id),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => (&a.namespace_uri, &a.name).cmp(&(&b.namespace_uri, &b.name))
    }
}

fn write_namespace(
    chunk_type: ChunkType,
    decl: &NamespaceDecl,
    state: &mut FlattenState,
    out: &mut Vec<u8>
) -> Result<()> {
    let mut chunk = ChunkWriter::start(out, chunk_type, &node_header(decl.line))?;
    let offset = chunk.write_struct(&XmlNamespaceExt {
        prefix: UINT32_MINUS_ONE,
        uri: UINT32_MINUS_ONE
    })?;
    state.add_optional_string(&decl.prefix, offset + XmlNamespaceExt::PREFIX_OFFSET);
    state.add_optional_string(&decl.uri, offset + XmlNamespaceExt::URI_OFFSET);
    chunk.finish();
    Ok(())
}

fn flatten_element(
    element: &XmlElement,
    options: &XmlFlattenerOptions,
    state: &mut FlattenState,
    out: &mut Vec<u8>
) -> Result<()> {
    let namespaces: Vec<&NamespaceDecl> = element
        .namespace_decls
        .iter()
        .filter(|decl| is_runtime_namespace(&decl.uri))
        .collect();
    for decl in &namespaces {
        write_namespace(ChunkType::XmlStartNamespace, decl, state, out)?;
    }

    let mut attributes: Vec<&XmlAttribute> = element
        .attributes
        .iter()
        .filter(|attr| is_runtime_namespace(&attr.namespace_uri))
        .collect();
    attributes.sort_by(|a, b| compare_attributes(a, b));
    write_start_element(element, &attributes, options, state, out)?;

    for child in &element.children {
        match child {
            XmlNode::Element(child) => flatten_element(child, options, state, out)?,
            XmlNode::Text(text) => write_text(text, state, out)?
        }
    }

    let mut end = ChunkWriter::start(out, ChunkType::XmlEndElement, &node_header(element.line))?;
    let offset = end.write_struct(&XmlEndElementExt {
        namespace: UINT32_MINUS_ONE,
        name: UINT32_MINUS_ONE
    })?;
    state.add_optional_string(&element.namespace_uri, offset + XmlEndElementExt::NAMESPACE_OFFSET);
    state.add_string(&element.name, LOW_PRIORITY, offset + XmlEndElementExt::NAME_OFFSET);
    end.finish();

    for decl in namespaces.iter().rev() {
        write_namespace(ChunkType::XmlEndNamespace, decl, state, out)?;
    }
    Ok(())
}

fn write_start_element(
    element: &XmlElement,
    attributes: &[&XmlAttribute],
    options: &XmlFlattenerOptions,
    state: &mut FlattenState,
    out: &mut Vec<u8>
) -> Result<()> {
    let mut ext = XmlStartElementExt {
        namespace: UINT32_MINUS_ONE,
        name: UINT32_MINUS_ONE,
        attribute_start: XmlStartElementExt::SIZE,
        attribute_size: XmlAttributeEntry::SIZE,
        attribute_count: attributes.len() as u16,
        id_index: 0,
        class_index: 0,
        style_index: 0
    };
    // 1-based positions in the sorted attribute list
    for (index, attr) in attributes.iter().enumerate() {
        let position = index as u16 + 1;
        if attr.resource_id == Some(ID_ATTRIBUTE) {
            ext.id_index = position;
        } else if attr.namespace_uri.is_empty() {
            match attr.name.as_str() {
                "class" => ext.class_index = position,
                "style" => ext.style_index = position,
                _ => {}
            }
        }
    }

    let mut chunk = ChunkWriter::start(out, ChunkType::XmlStartElement, &node_header(element.line))?;
    let offset = chunk.write_struct(&ext)?;
    state.add_optional_string(&element.namespace_uri, offset + XmlStartElementExt::NAMESPACE_OFFSET);
    state.add_string(&element.name, LOW_PRIORITY, offset + XmlStartElementExt::NAME_OFFSET);

    for attr in attributes {
        write_attribute(&mut chunk, attr, options, state)?;
    }
    chunk.finish();
    Ok(())
}

fn write_attribute(
    chunk: &mut ChunkWriter,
    attr: &XmlAttribute,
    options: &XmlFlattenerOptions,
    state: &mut FlattenState
) -> Result<()> {
    // What goes into the typed value: a literal Res_value, or a string whose
    // pool index is patched in later
    let (typed_value, typed_string, raw_value) = match &attr.compiled_value {
        None => {
            let processed = process_text(&attr.value, false);
            (
                ResValue::new(ResValueType::String, 0),
                Some(processed.clone()),
                Some(processed)
            )
        }
        Some(item) => {
            let raw = options.keep_raw_values.then(|| attr.value.clone());
            match item.flatten() {
                FlatItem::Value(value) => (value, None, raw),
                FlatItem::PooledString(text) => (
                    ResValue::new(ResValueType::String, 0),
                    Some(text.to_string()),
                    raw
                )
            }
        }
    };

    let offset = chunk.write_struct(&XmlAttributeEntry {
        namespace: UINT32_MINUS_ONE,
        name: UINT32_MINUS_ONE,
        raw_value: UINT32_MINUS_ONE,
        typed_value
    })?;
    state.add_optional_string(&attr.namespace_uri, offset + XmlAttributeEntry::NAMESPACE_OFFSET);
    let name_priority = attr.resource_id.map(|id| id.0).unwrap_or(LOW_PRIORITY);
    state.add_string(&attr.name, name_priority, offset + XmlAttributeEntry::NAME_OFFSET);
    if let Some(raw_value) = raw_value {
        state.add_string(&raw_value, LOW_PRIORITY, offset + XmlAttributeEntry::RAW_VALUE_OFFSET);
    }
    if let Some(typed_string) = typed_string {
        state.add_string(&typed_string, LOW_PRIORITY, offset + XmlAttributeEntry::TYPED_DATA_OFFSET);
    }
    Ok(())
}

fn write_text(text: &XmlText, state: &mut FlattenState, out: &mut Vec<u8>) -> Result<()> {
    let Some(compacted) = compact_text_node(&text.text) else {
        return Ok(());
    };
    let mut chunk = ChunkWriter::start(out, ChunkType::XmlCdata, &node_header(text.line))?;
    let offset = chunk.write_struct(&XmlCdataExt {
        data: UINT32_MINUS_ONE,
        typed_data: ResValue::new(ResValueType::Null, DATA_NULL_UNDEFINED)
    })?;
    state.add_string(&compacted, LOW_PRIORITY, offset + XmlCdataExt::DATA_OFFSET);
    chunk.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_reader::{ChunkEvent, ResChunkPullParser};

    fn chunk_types(bytes: &[u8]) -> Vec<ChunkType> {
        let mut top = ResChunkPullParser::new(bytes);
        assert_eq!(top.next_event(), ChunkEvent::Chunk);
        let xml = top.chunk().unwrap();
        assert_eq!(xml.chunk_type(), Some(ChunkType::XmlFile));
        assert_eq!(top.next_event(), ChunkEvent::EndDocument);
        xml.children()
            .map(|chunk| chunk.unwrap().chunk_type().unwrap())
            .collect()
    }

    #[test]
    fn manifest_with_application() {
        let mut manifest = XmlElement::new("manifest");
        manifest
            .children
            .push(XmlNode::Element(XmlElement::new("application")));
        let doc = XmlResource {
            source: Source::new("AndroidManifest.xml"),
            root: manifest
        };
        let bytes = flatten_xml(&doc, &XmlFlattenerOptions::default()).unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(
            chunk_types(&bytes),
            vec![
                ChunkType::StringPool,
                ChunkType::XmlResourceMap,
                ChunkType::XmlStartElement,
                ChunkType::XmlStartElement,
                ChunkType::XmlEndElement,
                ChunkType::XmlEndElement
            ]
        );
    }

    #[test]
    fn tools_namespace_is_dropped() {
        let mut root = XmlElement::new("a");
        root.namespace_decls.push(NamespaceDecl {
            prefix: String::from("tools"),
            uri: TOOLS_NAMESPACE.to_string(),
            line: 1
        });
        root.namespace_decls.push(NamespaceDecl {
            prefix: String::from("android"),
            uri: ANDROID_NAMESPACE.to_string(),
            line: 1
        });
        root.attributes.push(XmlAttribute::new(TOOLS_NAMESPACE, "ignore", "All"));
        let doc = XmlResource {
            root,
            ..Default::default()
        };
        let bytes = flatten_xml(&doc, &XmlFlattenerOptions::default()).unwrap();
        assert_eq!(
            chunk_types(&bytes),
            vec![
                ChunkType::StringPool,
                ChunkType::XmlResourceMap,
                ChunkType::XmlStartNamespace,
                ChunkType::XmlStartElement,
                ChunkType::XmlEndElement,
                ChunkType::XmlEndNamespace
            ]
        );
    }

    #[test]
    fn attribute_comparison() {
        let with_id = |name: &str, id: u32| XmlAttribute {
            resource_id: Some(ResourceId(id)),
            ..XmlAttribute::new(ANDROID_NAMESPACE, name, "")
        };
        let a = with_id("label", 0x0101_0001);
        let b = with_id("name", 0x0101_0003);
        let c = XmlAttribute::new("", "package", "");
        let d = XmlAttribute::new("urn:x", "alpha", "");
        assert_eq!(compare_attributes(&a, &b), Ordering::Less);
        assert_eq!(compare_attributes(&b, &c), Ordering::Less);
        assert_eq!(compare_attributes(&c, &a), Ordering::Greater);
        assert_eq!(compare_attributes(&c, &d), Ordering::Less);
    }
}
