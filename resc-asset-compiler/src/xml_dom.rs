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

// In-memory XML tree that the linker annotates and the flattener consumes.
use std::io::Read;

use log::warn;
use resc_common::*;
use xml::{
    common::Position,
    namespace::Namespace,
    reader::{EventReader, ParserConfig, XmlEvent}
};

use crate::resource_internal_types::{Item, ResourceId};

pub const ANDROID_NAMESPACE: &str = "http://schemas.android.com/apk/res/android";
pub const TOOLS_NAMESPACE: &str = "http://schemas.android.com/tools";
pub const AUTO_NAMESPACE: &str = "http://schemas.android.com/apk/res-auto";
// Followed by the package name, eg. http://schemas.android.com/apk/res/com.example
pub const PACKAGE_NAMESPACE_PREFIX: &str = "http://schemas.android.com/apk/res/";

// Prefixes every XML parser knows without a declaration
const IMPLICIT_PREFIXES: [&str; 2] = ["xml", "xmlns"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceDecl {
    /// Empty for a default namespace (`xmlns="..."`)
    pub prefix: String,
    pub uri: String,
    pub line: usize
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlAttribute {
    /// Empty when the attribute has no namespace
    pub namespace_uri: String,
    pub name: String,
    /// The text as written in the document
    pub value: String,
    /// Set by the linker when the attribute name is a known attribute resource
    pub resource_id: Option<ResourceId>,
    /// Set by the linker when the value was compiled
    pub compiled_value: Option<Item>,
    pub line: usize
}

impl XmlAttribute {
    pub fn new(namespace_uri: &str, name: &str, value: &str) -> Self {
        XmlAttribute {
            namespace_uri: namespace_uri.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlText {
    pub text: String,
    pub line: usize
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(XmlText)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Declared on this element, not inherited from its parents
    pub namespace_decls: Vec<NamespaceDecl>,
    pub namespace_uri: String,
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
    pub line: usize,
    pub comment: String
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        XmlElement {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn find_attribute(&self, namespace_uri: &str, name: &str) -> Option<&XmlAttribute> {
        self.attributes
            .iter()
            .find(|attr| attr.namespace_uri == namespace_uri && attr.name == name)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None
        })
    }

    pub fn find_child(&self, namespace_uri: &str, name: &str) -> Option<&XmlElement> {
        self.child_elements()
            .find(|child| child.namespace_uri == namespace_uri && child.name == name)
    }
}

/// A whole XML document plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlResource {
    pub source: Source,
    pub root: XmlElement
}

// Namespaces in scope on `current` that are not in scope, or mean something
// else, on the parent
fn declared_here(current: &Namespace, parent: Option<&Namespace>, line: usize) -> Vec<NamespaceDecl> {
    current
        .0
        .iter()
        .filter(|(prefix, uri)| {
            if IMPLICIT_PREFIXES.contains(&prefix.as_str()) {
                return false;
            }
            // The "no namespace" mapping every parser starts with
            if prefix.is_empty() && uri.is_empty() {
                return false;
            }
            match parent {
                Some(parent) => parent.0.get(*prefix) != Some(*uri),
                None => true
            }
        })
        .map(|(prefix, uri)| NamespaceDecl {
            prefix: prefix.clone(),
            uri: uri.clone(),
            line
        })
        .collect()
}

/// Parses a text XML document into an [XmlResource].
///
/// Whitespace between elements is kept as text nodes, comments are attached
/// to the element that follows them.
pub fn inflate<R: Read>(byte_source: R, path: &str) -> Result<XmlResource> {
    let config = ParserConfig::new()
        .ignore_comments(false)
        .whitespace_to_characters(true)
        .cdata_to_characters(true)
        .coalesce_characters(true);
    let mut reader = EventReader::new_with_config(byte_source, config);

    let mut stack: Vec<(XmlElement, Namespace)> = vec![];
    let mut root: Option<XmlElement> = None;
    let mut pending_comment = String::new();

    loop {
        let event = reader.next()?;
        let line = reader.position().row as usize + 1;
        match event {
            XmlEvent::StartElement {
                name,
                attributes,
                namespace
            } => {
                let namespace_decls =
                    declared_here(&namespace, stack.last().map(|(_, ns)| ns), line);
                let element = XmlElement {
                    namespace_decls,
                    namespace_uri: name.namespace.unwrap_or_default(),
                    name: name.local_name,
                    attributes: attributes
                        .into_iter()
                        .map(|attr| XmlAttribute {
                            namespace_uri: attr.name.namespace.unwrap_or_default(),
                            name: attr.name.local_name,
                            value: attr.value,
                            line,
                            ..Default::default()
                        })
                        .collect(),
                    children: vec![],
                    line,
                    comment: std::mem::take(&mut pending_comment)
                };
                stack.push((element, namespace));
            }
            XmlEvent::EndElement { .. } => {
                let Some((element, _)) = stack.pop() else {
                    // The parser rejects unbalanced documents before we get here
                    continue;
                };
                match stack.last_mut() {
                    Some((parent, _)) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element)
                }
            }
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                // Text outside the root element has no binary representation
                if let Some((parent, _)) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(XmlText { text, line }));
                }
            }
            XmlEvent::Comment(comment) => {
                pending_comment = comment.trim().to_string();
            }
            XmlEvent::EndDocument => break,
            XmlEvent::StartDocument { .. } => {}
            other => warn!("{}:{}: ignoring XML part {:?}", path, line, other)
        }
    }

    let root = root.ok_or_else(|| ResError::MissingRootElement(path.to_string()))?;
    Ok(XmlResource {
        source: Source::new(path),
        root
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    xmlns:tools="http://schemas.android.com/tools"
    package="com.example">
    <!-- The app -->
    <application android:label="@string/app_name" tools:ignore="x">
        <activity android:name=".Main"/>
    </application>
</manifest>
"#;

    #[test]
    fn inflates_elements_attributes_and_lines() {
        let doc = inflate(MANIFEST.as_bytes(), "AndroidManifest.xml").unwrap();
        assert_eq!(doc.source.path, "AndroidManifest.xml");
        let manifest = &doc.root;
        assert_eq!(manifest.name, "manifest");
        assert_eq!(manifest.line, 2);
        assert_eq!(manifest.find_attribute("", "package").unwrap().value, "com.example");

        let application = manifest.find_child("", "application").unwrap();
        assert_eq!(application.comment, "The app");
        assert_eq!(application.line, 6);
        assert_eq!(
            application.find_attribute(ANDROID_NAMESPACE, "label").unwrap().value,
            "@string/app_name"
        );
        assert!(application.find_attribute(TOOLS_NAMESPACE, "ignore").is_some());
        assert!(application.find_child("", "activity").is_some());
    }

    #[test]
    fn namespace_declarations_are_not_inherited() {
        let doc = inflate(MANIFEST.as_bytes(), "AndroidManifest.xml").unwrap();
        let prefixes: Vec<&str> = doc
            .root
            .namespace_decls
            .iter()
            .map(|decl| decl.prefix.as_str())
            .collect();
        assert_eq!(prefixes, vec!["android", "tools"]);
        let application = doc.root.find_child("", "application").unwrap();
        assert!(application.namespace_decls.is_empty());
    }

    #[test]
    fn whitespace_is_kept_as_text() {
        let doc = inflate("<a> <b/>hi</a>".as_bytes(), "a.xml").unwrap();
        assert_eq!(doc.root.children.len(), 3);
        assert!(matches!(&doc.root.children[0], XmlNode::Text(t) if t.text == " "));
        assert!(matches!(&doc.root.children[2], XmlNode::Text(t) if t.text == "hi"));
    }

    #[test]
    fn redeclared_prefix_is_recorded() {
        let doc = inflate(
            r#"<a xmlns:p="urn:one"><b xmlns:p="urn:two"/><c xmlns:p="urn:one"/></a>"#.as_bytes(),
            "a.xml"
        )
        .unwrap();
        let b = doc.root.find_child("", "b").unwrap();
        assert_eq!(b.namespace_decls.len(), 1);
        assert_eq!(b.namespace_decls[0].uri, "urn:two");
        let c = doc.root.find_child("", "c").unwrap();
        assert!(c.namespace_decls.is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            inflate("<a><b></a>".as_bytes(), "bad.xml"),
            Err(ResError::XmlParsingFailed(_))
        ));
    }
}
