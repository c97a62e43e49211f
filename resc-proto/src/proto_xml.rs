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

// Compiled XML files are stored between build stages as ProtoXML, a tree of
// aapt.pb.XmlNode messages. It carries the same information as the linked
// DOM, minus comments, and is only turned into binary XML at the final link.

use std::io::Read;

use log::debug;
use resc_asset_compiler::{
    resource_internal_types::ResourceId,
    xml_dom::{inflate, NamespaceDecl, XmlAttribute, XmlElement, XmlNode, XmlResource, XmlText},
    xml_linker::{link_xml, SymbolTable}
};
use resc_common::{Diagnostics, ResError, Result, Source};

use crate::{
    aapt::pb::{self, xml_node::Node},
    deserialize::deserialize_item,
    serialize::serialize_item
};

fn position(line: usize) -> Option<pb::SourcePosition> {
    Some(pb::SourcePosition {
        line_number: line as u32,
        column_number: 0
    })
}

fn line_of(position: Option<&pb::SourcePosition>) -> usize {
    position.map_or(0, |position| position.line_number as usize)
}

fn serialize_attribute(attribute: &XmlAttribute) -> Result<pb::XmlAttribute> {
    Ok(pb::XmlAttribute {
        namespace_uri: attribute.namespace_uri.clone(),
        name: attribute.name.clone(),
        value: attribute.value.clone(),
        source: position(attribute.line),
        resource_id: attribute.resource_id.map_or(0, |id| id.0),
        compiled_item: attribute.compiled_value.as_ref().map(serialize_item).transpose()?
    })
}

fn serialize_element(element: &XmlElement) -> Result<pb::XmlElement> {
    Ok(pb::XmlElement {
        namespace_declaration: element
            .namespace_decls
            .iter()
            .map(|decl| pb::XmlNamespace {
                prefix: decl.prefix.clone(),
                uri: decl.uri.clone(),
                source: position(decl.line)
            })
            .collect(),
        namespace_uri: element.namespace_uri.clone(),
        name: element.name.clone(),
        attribute: element
            .attributes
            .iter()
            .map(serialize_attribute)
            .collect::<Result<Vec<_>>>()?,
        child: element
            .children
            .iter()
            .map(|child| {
                Ok(match child {
                    XmlNode::Element(child) => pb::XmlNode {
                        node: Some(Node::Element(serialize_element(child)?)),
                        source: position(child.line)
                    },
                    XmlNode::Text(text) => pb::XmlNode {
                        node: Some(Node::Text(text.text.clone())),
                        source: position(text.line)
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?
    })
}

/// Converts a (usually linked) document to its ProtoXML form.
pub fn serialize_xml(resource: &XmlResource) -> Result<pb::XmlNode> {
    Ok(pb::XmlNode {
        node: Some(Node::Element(serialize_element(&resource.root)?)),
        source: position(resource.root.line)
    })
}

fn deserialize_attribute(attribute: &pb::XmlAttribute) -> Result<XmlAttribute> {
    Ok(XmlAttribute {
        namespace_uri: attribute.namespace_uri.clone(),
        name: attribute.name.clone(),
        value: attribute.value.clone(),
        resource_id: (attribute.resource_id != 0).then_some(ResourceId(attribute.resource_id)),
        compiled_value: attribute.compiled_item.as_ref().map(deserialize_item).transpose()?,
        line: line_of(attribute.source.as_ref())
    })
}

fn deserialize_element(element: &pb::XmlElement, line: usize) -> Result<XmlElement> {
    Ok(XmlElement {
        namespace_decls: element
            .namespace_declaration
            .iter()
            .map(|decl| NamespaceDecl {
                prefix: decl.prefix.clone(),
                uri: decl.uri.clone(),
                line: line_of(decl.source.as_ref())
            })
            .collect(),
        namespace_uri: element.namespace_uri.clone(),
        name: element.name.clone(),
        attributes: element
            .attribute
            .iter()
            .map(deserialize_attribute)
            .collect::<Result<Vec<_>>>()?,
        children: element
            .child
            .iter()
            .map(|child| {
                let line = line_of(child.source.as_ref());
                Ok(match &child.node {
                    Some(Node::Element(element)) => XmlNode::Element(deserialize_element(element, line)?),
                    Some(Node::Text(text)) => XmlNode::Text(XmlText {
                        text: text.clone(),
                        line
                    }),
                    None => return Err(ResError::UnrecognizedIntermediateVariant("XmlNode"))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        line,
        comment: String::new()
    })
}

/// Rebuilds the DOM of a ProtoXML document. The root node must be an element.
pub fn deserialize_xml(node: &pb::XmlNode, path: &str) -> Result<XmlResource> {
    let root = match &node.node {
        Some(Node::Element(element)) => element,
        _ => return Err(ResError::MissingRootElement(path.to_string()))
    };
    let line = line_of(node.source.as_ref());
    Ok(XmlResource {
        source: Source {
            path: path.to_string(),
            line: None
        },
        root: deserialize_element(root, line)?
    })
}

/// Parses, links and serializes a text XML document in one go.
pub fn compile_proto_xml<R: Read>(
    byte_source: R,
    path: &str,
    symbols: &SymbolTable,
    diag: &mut Diagnostics
) -> Result<pb::XmlNode> {
    let mut resource = inflate(byte_source, path)?;
    link_xml(&mut resource, symbols, diag)?;
    debug!("{}: serializing to ProtoXML", path);
    serialize_xml(&resource)
}
