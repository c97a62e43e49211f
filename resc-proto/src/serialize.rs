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

// Value model -> aapt.pb messages. This is a structural mapping, nothing here
// knows about the binary chunk format except the source pool, which is stored
// as a string pool chunk.
use std::collections::HashMap;

use resc_asset_compiler::{
    configuration::Configuration,
    resource_external_types::{ResValueType, DATA_NULL_EMPTY},
    resource_internal_types::*,
    string_pool::construct_string_pool
};
use resc_common::{ResError, Result, Source};

use crate::{
    aapt::pb::{self, primitive::OneofValue},
    inner_proto, proto
};

/// Source paths referenced by the values of one table, each stored once.
#[derive(Debug, Default)]
pub struct SourcePool {
    paths: Vec<String>,
    lookup: HashMap<String, u32>
}

impl SourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, path: &str) -> u32 {
        if let Some(index) = self.lookup.get(path) {
            return *index;
        }
        let index = self.paths.len() as u32;
        self.paths.push(path.to_string());
        self.lookup.insert(path.to_string(), index);
        index
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn to_pb(&self) -> Result<pb::StringPool> {
        Ok(pb::StringPool {
            data: construct_string_pool(&self.paths)?
        })
    }
}

/// An unknown source is left out of the message entirely.
pub fn serialize_source(source: &Source, pool: &mut SourcePool) -> Option<pb::Source> {
    if source.path.is_empty() && source.line.is_none() {
        return None;
    }
    proto! {pb::Source,
        path_idx: pool.intern(&source.path),
        position: source.line.map(|line| inner_proto! {pb::SourcePosition,
            line_number: line as u32
        })
    }
}

pub fn serialize_config(config: &Configuration) -> pb::Configuration {
    pb::Configuration {
        mcc: config.mcc as u32,
        mnc: config.mnc as u32,
        locale: config.locale.clone(),
        layout_direction: config.layout_direction.ordinal() as i32,
        screen_width: config.screen_width as u32,
        screen_height: config.screen_height as u32,
        screen_width_dp: config.screen_width_dp as u32,
        screen_height_dp: config.screen_height_dp as u32,
        smallest_screen_width_dp: config.smallest_screen_width_dp as u32,
        screen_layout_size: config.screen_layout_size.ordinal() as i32,
        screen_layout_long: config.screen_layout_long.ordinal() as i32,
        screen_round: config.screen_round.ordinal() as i32,
        orientation: config.orientation.ordinal() as i32,
        ui_mode_type: config.ui_mode_type.ordinal() as i32,
        ui_mode_night: config.ui_mode_night.ordinal() as i32,
        density: config.density as u32,
        touchscreen: config.touchscreen.ordinal() as i32,
        keys_hidden: config.keys_hidden.ordinal() as i32,
        keyboard: config.keyboard.ordinal() as i32,
        nav_hidden: config.nav_hidden.ordinal() as i32,
        navigation: config.navigation.ordinal() as i32,
        sdk_version: config.sdk_version as u32,
        product: config.product.clone()
    }
}

pub fn serialize_reference(reference: &Reference) -> pb::Reference {
    let reference_type = match reference.reference_type {
        ReferenceType::Resource => pb::reference::Type::Reference,
        ReferenceType::Attribute => pb::reference::Type::Attribute
    };
    pb::Reference {
        r#type: reference_type as i32,
        id: reference.id.map(|id| id.0).unwrap_or(0),
        name: reference
            .name
            .as_ref()
            .map(|name| name.to_string())
            .unwrap_or_default(),
        private: reference.private,
        is_dynamic: if reference.is_dynamic {
            proto! {pb::Boolean, value: true}
        } else {
            None
        },
        type_flags: reference.type_flags.unwrap_or(0),
        allow_raw: reference.allow_raw
    }
}

fn serialize_primitive(primitive: &Primitive) -> Result<pb::Primitive> {
    let data = primitive.data;
    let value = match primitive.data_type {
        ResValueType::Null if data == DATA_NULL_EMPTY => {
            OneofValue::EmptyValue(pb::primitive::EmptyType {})
        }
        ResValueType::Null => OneofValue::NullValue(pb::primitive::NullType {}),
        ResValueType::Float => OneofValue::FloatValue(f32::from_bits(data)),
        ResValueType::Dimension => OneofValue::DimensionValue(data),
        ResValueType::Fraction => OneofValue::FractionValue(data),
        ResValueType::IntDec => OneofValue::IntDecimalValue(data as i32),
        ResValueType::IntHex => OneofValue::IntHexadecimalValue(data),
        ResValueType::IntBoolean => OneofValue::BooleanValue(data != 0),
        ResValueType::IntColorArgb8 => OneofValue::ColorArgb8Value(data),
        ResValueType::IntColorRgb8 => OneofValue::ColorRgb8Value(data),
        ResValueType::IntColorArgb4 => OneofValue::ColorArgb4Value(data),
        ResValueType::IntColorRgb4 => OneofValue::ColorRgb4Value(data),
        other => return Err(ResError::InvalidPrimitiveType(other.as_u8()))
    };
    Ok(pb::Primitive {
        oneof_value: Some(value)
    })
}

fn serialize_styled_string(styled: &StyledString) -> pb::StyledString {
    pb::StyledString {
        value: styled.value.clone(),
        span: styled
            .spans
            .iter()
            .map(|span| pb::styled_string::Span {
                tag: span.name.clone(),
                first_char: span.first_char,
                last_char: span.last_char
            })
            .collect()
    }
}

pub fn serialize_item(item: &Item) -> Result<pb::Item> {
    use pb::item::Value;

    let value = match item {
        Item::Reference(reference) => Value::Ref(serialize_reference(reference)),
        Item::Id => Value::Id(pb::Id {}),
        Item::Primitive(primitive) => Value::Prim(serialize_primitive(primitive)?),
        Item::String(value) => Value::Str(pb::String {
            value: value.clone()
        }),
        Item::RawString(value) => Value::RawStr(pb::RawString {
            value: value.clone()
        }),
        Item::StyledString(styled) => Value::StyledStr(serialize_styled_string(styled)),
        Item::File(file) => {
            let file_type = match file.file_type {
                FileType::Unknown => pb::file_reference::Type::Unknown,
                FileType::Png => pb::file_reference::Type::Png,
                FileType::BinaryXml => pb::file_reference::Type::BinaryXml,
                FileType::ProtoXml => pb::file_reference::Type::ProtoXml
            };
            Value::File(pb::FileReference {
                path: file.path.clone(),
                r#type: file_type as i32
            })
        }
    };
    Ok(pb::Item { value: Some(value) })
}

fn serialize_macro(body: &Macro) -> pb::MacroBody {
    inner_proto! {pb::MacroBody,
        raw_string: body.raw_value.clone(),
        style_string: body.style_string.as_ref().map(|styled| pb::StyleString {
            str: styled.value.clone(),
            spans: styled
                .spans
                .iter()
                .map(|span| pb::style_string::Span {
                    name: span.name.clone(),
                    start_index: span.first_char,
                    end_index: span.last_char
                })
                .collect()
        }),
        untranslatable_sections: body
            .untranslatable_sections
            .iter()
            .map(|section| pb::UntranslatableSection {
                start_index: section.start,
                end_index: section.end
            })
            .collect(),
        namespace_stack: body
            .alias_namespaces
            .iter()
            .map(|alias| pb::NamespaceAlias {
                prefix: alias.alias.clone(),
                package_name: alias.package_name.clone(),
                is_private: alias.is_private
            })
            .collect()
    }
}

fn serialize_compound(value: &CompoundValue, pool: &mut SourcePool) -> Result<pb::CompoundValue> {
    use pb::compound_value::Value;

    let value = match value {
        CompoundValue::Attribute(attribute) => Value::Attr(pb::Attribute {
            format_flags: attribute.format_flags,
            min_int: attribute.min_int,
            max_int: attribute.max_int,
            symbol: attribute
                .symbols
                .iter()
                .map(|symbol| pb::attribute::Symbol {
                    source: serialize_source(&symbol.source, pool),
                    comment: symbol.comment.clone(),
                    name: Some(serialize_reference(&symbol.name)),
                    value: symbol.value,
                    r#type: symbol.data_type as u32
                })
                .collect()
        }),
        CompoundValue::Style(style) => Value::Style(pb::Style {
            parent: style.parent.as_ref().map(serialize_reference),
            parent_source: serialize_source(&style.parent_source, pool),
            entry: style
                .entries
                .iter()
                .map(|entry| {
                    Ok(pb::style::Entry {
                        source: serialize_source(&entry.source, pool),
                        comment: entry.comment.clone(),
                        key: Some(serialize_reference(&entry.key)),
                        item: Some(serialize_item(&entry.item)?)
                    })
                })
                .collect::<Result<Vec<_>>>()?
        }),
        CompoundValue::Styleable(styleable) => Value::Styleable(pb::Styleable {
            entry: styleable
                .entries
                .iter()
                .map(|attr| inner_proto! {pb::styleable::Entry,
                    attr: Some(serialize_reference(attr))
                })
                .collect()
        }),
        CompoundValue::Array(array) => Value::Array(pb::Array {
            element: array
                .elements
                .iter()
                .map(|item| {
                    Ok(inner_proto! {pb::array::Element,
                        item: Some(serialize_item(item)?)
                    })
                })
                .collect::<Result<Vec<_>>>()?
        }),
        CompoundValue::Plural(plural) => {
            let mut entry = vec![];
            for arity in PluralArity::ALL {
                if let Some(item) = plural.get(arity) {
                    entry.push(inner_proto! {pb::plural::Entry,
                        arity: serialize_arity(arity) as i32,
                        item: Some(serialize_item(item)?)
                    });
                }
            }
            Value::Plural(pb::Plural { entry })
        }
        CompoundValue::Macro(body) => Value::Macro(serialize_macro(body))
    };
    Ok(pb::CompoundValue { value: Some(value) })
}

fn serialize_arity(arity: PluralArity) -> pb::plural::Arity {
    match arity {
        PluralArity::Zero => pb::plural::Arity::Zero,
        PluralArity::One => pb::plural::Arity::One,
        PluralArity::Two => pb::plural::Arity::Two,
        PluralArity::Few => pb::plural::Arity::Few,
        PluralArity::Many => pb::plural::Arity::Many,
        PluralArity::Other => pb::plural::Arity::Other
    }
}

pub fn serialize_value(value: &Value, pool: &mut SourcePool) -> Result<pb::Value> {
    let kind = match &value.kind {
        ValueKind::Item(item) => pb::value::Value::Item(serialize_item(item)?),
        ValueKind::Compound(compound) => {
            pb::value::Value::CompoundValue(serialize_compound(compound, pool)?)
        }
    };
    Ok(pb::Value {
        source: serialize_source(&value.source, pool),
        comment: value.comment.clone(),
        weak: value.weak,
        value: Some(kind)
    })
}

// One policy per set bit, in bit order
pub(crate) const POLICY_TABLE: [(PolicyFlags, pb::overlayable_item::Policy); 9] = [
    (PolicyFlags::PUBLIC, pb::overlayable_item::Policy::Public),
    (PolicyFlags::SYSTEM_PARTITION, pb::overlayable_item::Policy::System),
    (PolicyFlags::VENDOR_PARTITION, pb::overlayable_item::Policy::Vendor),
    (PolicyFlags::PRODUCT_PARTITION, pb::overlayable_item::Policy::Product),
    (PolicyFlags::SIGNATURE, pb::overlayable_item::Policy::Signature),
    (PolicyFlags::ODM_PARTITION, pb::overlayable_item::Policy::Odm),
    (PolicyFlags::OEM_PARTITION, pb::overlayable_item::Policy::Oem),
    (PolicyFlags::ACTOR_SIGNATURE, pb::overlayable_item::Policy::Actor),
    (PolicyFlags::CONFIG_SIGNATURE, pb::overlayable_item::Policy::ConfigSignature)
];

pub fn serialize_overlayable_item(
    item: &OverlayableItem,
    pool: &mut SourcePool
) -> Result<pb::OverlayableItem> {
    item.validate()?;
    Ok(pb::OverlayableItem {
        source: serialize_source(&item.source, pool),
        comment: item.comment.clone(),
        policy: POLICY_TABLE
            .iter()
            .filter(|(flag, _)| item.policies.contains(*flag))
            .map(|(_, policy)| *policy as i32)
            .collect(),
        overlayable_idx: item.overlayable_index
    })
}

fn serialize_visibility(visibility: &Visibility, pool: &mut SourcePool) -> pb::Visibility {
    let level = match visibility.level {
        VisibilityLevel::Undefined => pb::visibility::Level::Unknown,
        VisibilityLevel::Private => pb::visibility::Level::Private,
        VisibilityLevel::Public => pb::visibility::Level::Public
    };
    pb::Visibility {
        level: level as i32,
        source: serialize_source(&visibility.source, pool),
        comment: visibility.comment.clone(),
        staged_api: visibility.staged_api
    }
}

pub fn serialize_entry(entry: &ResourceEntry, pool: &mut SourcePool) -> Result<pb::Entry> {
    Ok(inner_proto! {pb::Entry,
        entry_id: entry.id.and_then(|id| proto! {pb::EntryId, id: id as u32}),
        name: entry.name.clone(),
        visibility: Some(serialize_visibility(&entry.visibility, pool)),
        overlayable_item: entry
            .overlayable_item
            .as_ref()
            .map(|item| serialize_overlayable_item(item, pool))
            .transpose()?,
        config_value: entry
            .values
            .iter()
            .map(|config_value| {
                Ok(pb::ConfigValue {
                    config: Some(serialize_config(&config_value.config)),
                    value: Some(serialize_value(&config_value.value, pool)?)
                })
            })
            .collect::<Result<Vec<_>>>()?
    })
}
