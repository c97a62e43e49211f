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

// Resolves attribute names to resource ids and compiles attribute values
// before an XML document is flattened.
use std::collections::HashMap;

use log::debug;
use resc_common::*;

use crate::{
    internal_android_attributes::get_internal_attribute,
    resource_external_types::*,
    resource_internal_types::*,
    text_processing::process_text,
    value_parser::{parse_reference, try_parse_item_for_format, try_parse_null_or_empty},
    xml_dom::*
};

const FRAMEWORK_PACKAGE: &str = "android";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub id: ResourceId,
    /// Present for `attr` resources
    pub attribute: Option<Attribute>
}

/// Every resource the document may refer to. Names in the framework's
/// `attr` type are answered from the built-in table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    package: String,
    symbols: HashMap<ResourceName, SymbolEntry>
}

impl SymbolTable {
    /// `package` is the package being built, used for names that omit one.
    pub fn new(package: &str) -> Self {
        SymbolTable {
            package: package.to_string(),
            symbols: HashMap::new()
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn add(&mut self, name: ResourceName, id: ResourceId) {
        let name = self.qualify(&name);
        self.symbols.insert(name, SymbolEntry { id, attribute: None });
    }

    pub fn add_attribute(&mut self, name: ResourceName, id: ResourceId, attribute: Attribute) {
        let name = self.qualify(&name);
        self.symbols.insert(
            name,
            SymbolEntry {
                id,
                attribute: Some(attribute)
            }
        );
    }

    pub fn find(&self, name: &ResourceName) -> Option<SymbolEntry> {
        let name = self.qualify(name);
        if let Some(entry) = self.symbols.get(&name) {
            return Some(entry.clone());
        }
        if name.package == FRAMEWORK_PACKAGE && name.type_name == "attr" {
            return get_internal_attribute(&name.entry).map(|framework| SymbolEntry {
                id: framework.id(),
                attribute: Some(Attribute {
                    format_flags: framework.format_flags,
                    symbols: framework
                        .symbols
                        .iter()
                        .map(|(symbol, value)| Symbol {
                            name: Reference::from_name(ResourceName::new(
                                FRAMEWORK_PACKAGE,
                                "id",
                                symbol
                            )),
                            value: *value,
                            data_type: ResValueType::IntDec.as_u8(),
                            ..Default::default()
                        })
                        .collect(),
                    ..Default::default()
                })
            });
        }
        None
    }

    fn qualify(&self, name: &ResourceName) -> ResourceName {
        if name.package.is_empty() {
            ResourceName {
                package: self.package.clone(),
                ..name.clone()
            }
        } else {
            name.clone()
        }
    }
}

struct Linker<'a> {
    symbols: &'a SymbolTable,
    diag: &'a mut Diagnostics,
    source: Source
}

/// Links every attribute in `resource`. Problems are reported to `diag` and
/// the whole document is always visited; if any error was reported the
/// result is [ResError::LinkFailed].
pub fn link_xml(
    resource: &mut XmlResource,
    symbols: &SymbolTable,
    diag: &mut Diagnostics
) -> Result<()> {
    let errors_before = diag.error_count();
    let mut linker = Linker {
        symbols,
        diag,
        source: resource.source.clone()
    };
    linker.link_element(&mut resource.root);

    let errors = linker.diag.error_count() - errors_before;
    if errors > 0 {
        return Err(ResError::LinkFailed { errors });
    }
    Ok(())
}

impl Linker<'_> {
    fn link_element(&mut self, element: &mut XmlElement) {
        for attr in element.attributes.iter_mut() {
            self.link_attribute(attr);
        }
        for child in element.children.iter_mut() {
            if let XmlNode::Element(child) = child {
                self.link_element(child);
            }
        }
    }

    // The attribute resource that defines `attr`, if its namespace names a
    // package
    fn attribute_definition(&mut self, attr: &XmlAttribute) -> Option<SymbolEntry> {
        let package = if attr.namespace_uri == ANDROID_NAMESPACE {
            FRAMEWORK_PACKAGE
        } else if attr.namespace_uri == AUTO_NAMESPACE {
            self.symbols.package()
        } else if let Some(package) = attr.namespace_uri.strip_prefix(PACKAGE_NAMESPACE_PREFIX) {
            package
        } else {
            // No namespace, or a namespace that is not a package
            return None;
        };
        let name = ResourceName::new(package, "attr", &attr.name);
        let found = self.symbols.find(&name);
        if found.is_none() {
            let source = self.source.with_line(attr.line);
            if package == FRAMEWORK_PACKAGE {
                self.diag.warn(source, format!("unknown attribute {}", name));
            } else {
                self.diag.error(source, format!("attribute {} not found", name));
            }
        }
        found
    }

    fn link_attribute(&mut self, attr: &mut XmlAttribute) {
        if attr.namespace_uri == TOOLS_NAMESPACE {
            return;
        }
        let definition = self.attribute_definition(attr);
        attr.resource_id = definition.as_ref().map(|entry| entry.id);

        if let Some(item) = try_parse_null_or_empty(&attr.value) {
            attr.compiled_value = Some(item);
            return;
        }
        match parse_reference(&attr.value) {
            Ok(Some(parsed)) => {
                attr.compiled_value = Some(Item::Reference(self.resolve(parsed.reference, attr.line)));
                return;
            }
            Ok(None) => {}
            Err(e) => {
                self.diag.error(
                    self.source.with_line(attr.line),
                    format!("invalid reference '{}': {}", attr.value, e)
                );
                return;
            }
        }

        let Some(attribute) = definition.and_then(|entry| entry.attribute) else {
            // Kept as a raw string by the flattener
            return;
        };
        let symbol = |text: &str| {
            attribute
                .symbols
                .iter()
                .find(|symbol| symbol.name.name.as_ref().is_some_and(|name| name.entry == text))
                .map(|symbol| symbol.value)
        };
        if let Some(item) = try_parse_item_for_format(&attr.value, attribute.format_flags, symbol) {
            attr.compiled_value = Some(item);
        } else if attribute.format_flags & ATTR_FORMAT_STRING != 0 {
            attr.compiled_value = Some(Item::String(process_text(&attr.value, false)));
        } else {
            self.diag.error(
                self.source.with_line(attr.line),
                format!("'{}' is incompatible with attribute {}", attr.value, attr.name)
            );
        }
    }

    fn resolve(&mut self, mut reference: Reference, line: usize) -> Reference {
        let Some(name) = &reference.name else {
            return reference;
        };
        match self.symbols.find(name) {
            Some(entry) => {
                debug!("resolved {} to {}", name, entry.id);
                reference.id = Some(entry.id);
            }
            None => {
                self.diag.error(
                    self.source.with_line(line),
                    format!("resource {} not found", name)
                );
            }
        }
        reference
    }
}
