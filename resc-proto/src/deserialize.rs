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

// aapt.pb messages -> value model.
//
// Messages are only ever written by a matching serializer, so a oneof with no
// case we know means the two sides were built from different schemas. That is
// reported as UnrecognizedIntermediateVariant and never guessed around.
use log::{error, warn};
use resc_asset_compiler::{
    chunk_reader::ResChunkPullParser,
    configuration::*,
    resource_external_types::{ResValueType, DATA_NULL_EMPTY, DATA_NULL_UNDEFINED},
    resource_internal_types::*,
    string_pool::StringPoolView
};
use resc_common::{ResError, Result, Source};

use crate::{aapt::pb, serialize::POLICY_TABLE};

fn unrecognized(what: &'static str) -> ResError {
    error!("Intermediate {} has no recognised variant, the producing toolchain uses a different schema", what);
    ResError::UnrecognizedIntermediateVariant(what)
}

fn invalid(message: impl Into<String>) -> ResError {
    ResError::InvalidIntermediate(message.into())
}

/// Decodes the source paths stored in a table's source pool.
pub fn read_source_pool(pool: &pb::StringPool) -> Result<Vec<String>> {
    if pool.data.is_empty() {
        return Ok(vec![]);
    }
    let mut parser = ResChunkPullParser::new(&pool.data);
    match parser.next() {
        Some(chunk) => StringPoolView::parse(&chunk?)?.strings(),
        None => Ok(vec![])
    }
}

pub fn deserialize_source(source: Option<&pb::Source>, paths: &[String]) -> Result<Source> {
    let Some(source) = source else {
        return Ok(Source::default());
    };
    let path = paths.get(source.path_idx as usize).ok_or_else(|| {
        invalid(format!(
            "source path index {} is past the end of the {} entry source pool",
            source.path_idx,
            paths.len()
        ))
    })?;
    Ok(Source {
        path: path.clone(),
        line: source.position.as_ref().map(|position| position.line_number as usize)
    })
}

fn narrow(value: u32, field: &str) -> Result<u16> {
    u16::try_from(value).map_err(|_| invalid(format!("configuration {} {} is out of range", field, value)))
}

fn qualifier<T>(from_ordinal: fn(u8) -> Option<T>, value: i32, field: &str) -> Result<T> {
    u8::try_from(value)
        .ok()
        .and_then(from_ordinal)
        .ok_or_else(|| invalid(format!("unknown configuration {} value {}", field, value)))
}

pub fn deserialize_config(config: &pb::Configuration) -> Result<Configuration> {
    Ok(Configuration {
        mcc: narrow(config.mcc, "mcc")?,
        mnc: narrow(config.mnc, "mnc")?,
        locale: config.locale.clone(),
        layout_direction: qualifier(
            LayoutDirection::from_ordinal,
            config.layout_direction,
            "layout direction"
        )?,
        screen_width: narrow(config.screen_width, "screen width")?,
        screen_height: narrow(config.screen_height, "screen height")?,
        screen_width_dp: narrow(config.screen_width_dp, "screen width dp")?,
        screen_height_dp: narrow(config.screen_height_dp, "screen height dp")?,
        smallest_screen_width_dp: narrow(config.smallest_screen_width_dp, "smallest width dp")?,
        screen_layout_size: qualifier(
            ScreenLayoutSize::from_ordinal,
            config.screen_layout_size,
            "screen size"
        )?,
        screen_layout_long: qualifier(
            ScreenLayoutLong::from_ordinal,
            config.screen_layout_long,
            "screen long"
        )?,
        screen_round: qualifier(ScreenRound::from_ordinal, config.screen_round, "screen round")?,
        orientation: qualifier(Orientation::from_ordinal, config.orientation, "orientation")?,
        ui_mode_type: qualifier(UiModeType::from_ordinal, config.ui_mode_type, "ui mode type")?,
        ui_mode_night: qualifier(UiModeNight::from_ordinal, config.ui_mode_night, "ui mode night")?,
        density: narrow(config.density, "density")?,
        touchscreen: qualifier(Touchscreen::from_ordinal, config.touchscreen, "touchscreen")?,
        keys_hidden: qualifier(KeysHidden::from_ordinal, config.keys_hidden, "keys hidden")?,
        keyboard: qualifier(Keyboard::from_ordinal, config.keyboard, "keyboard")?,
        nav_hidden: qualifier(NavHidden::from_ordinal, config.nav_hidden, "nav hidden")?,
        navigation: qualifier(Navigation::from_ordinal, config.navigation, "navigation")?,
        sdk_version: narrow(config.sdk_version, "sdk version")?,
        product: config.product.clone()
    })
}

/// The name and id are independent: either, both or neither may be set.
pub fn deserialize_reference(reference: &pb::Reference) -> Result<Reference> {
    let reference_type = match pb::reference::Type::try_from(reference.r#type) {
        Ok(pb::reference::Type::Reference) => ReferenceType::Resource,
        Ok(pb::reference::Type::Attribute) => ReferenceType::Attribute,
        Err(_) => return Err(unrecognized("Reference.Type"))
    };
    let name = if reference.name.is_empty() {
        None
    } else {
        Some(ResourceName::parse(&reference.name)?)
    };
    Ok(Reference {
        id: (reference.id != 0).then_some(ResourceId(reference.id)),
        name,
        reference_type,
        is_dynamic: reference.is_dynamic.as_ref().is_some_and(|dynamic| dynamic.value),
        private: reference.private,
        type_flags: (reference.type_flags != 0).then_some(reference.type_flags),
        allow_raw: reference.allow_raw
    })
}

fn deserialize_primitive(primitive: &pb::Primitive) -> Result<Primitive> {
    use pb::primitive::OneofValue;

    let (data_type, data) = match primitive.oneof_value.as_ref() {
        Some(OneofValue::NullValue(_)) => (ResValueType::Null, DATA_NULL_UNDEFINED),
        Some(OneofValue::EmptyValue(_)) => (ResValueType::Null, DATA_NULL_EMPTY),
        Some(OneofValue::FloatValue(value)) => (ResValueType::Float, value.to_bits()),
        Some(OneofValue::DimensionValue(value)) => (ResValueType::Dimension, *value),
        Some(OneofValue::FractionValue(value)) => (ResValueType::Fraction, *value),
        Some(OneofValue::IntDecimalValue(value)) => (ResValueType::IntDec, *value as u32),
        Some(OneofValue::IntHexadecimalValue(value)) => (ResValueType::IntHex, *value),
        Some(OneofValue::BooleanValue(value)) => {
            (ResValueType::IntBoolean, if *value { 0xFFFF_FFFF } else { 0 })
        }
        Some(OneofValue::ColorArgb8Value(value)) => (ResValueType::IntColorArgb8, *value),
        Some(OneofValue::ColorRgb8Value(value)) => (ResValueType::IntColorRgb8, *value),
        Some(OneofValue::ColorArgb4Value(value)) => (ResValueType::IntColorArgb4, *value),
        Some(OneofValue::ColorRgb4Value(value)) => (ResValueType::IntColorRgb4, *value),
        Some(OneofValue::DimensionValueDeprecated(value)) => (ResValueType::Dimension, *value as u32),
        Some(OneofValue::FractionValueDeprecated(value)) => (ResValueType::Fraction, *value as u32),
        None => return Err(unrecognized("Primitive"))
    };
    Primitive::new(data_type, data)
}

pub fn deserialize_item(item: &pb::Item) -> Result<Item> {
    use pb::item::Value;

    Ok(match &item.value {
        Some(Value::Ref(reference)) => Item::Reference(deserialize_reference(reference)?),
        Some(Value::Id(_)) => Item::Id,
        Some(Value::Prim(primitive)) => Item::Primitive(deserialize_primitive(primitive)?),
        Some(Value::Str(string)) => Item::String(string.value.clone()),
        Some(Value::RawStr(string)) => Item::RawString(string.value.clone()),
        Some(Value::StyledStr(styled)) => Item::StyledString(StyledString {
            value: styled.value.clone(),
            spans: styled
                .span
                .iter()
                .map(|span| Span {
                    name: span.tag.clone(),
                    first_char: span.first_char,
                    last_char: span.last_char
                })
                .collect()
        }),
        Some(Value::File(file)) => {
            let file_type = match pb::file_reference::Type::try_from(file.r#type) {
                Ok(pb::file_reference::Type::Unknown) => FileType::Unknown,
                Ok(pb::file_reference::Type::Png) => FileType::Png,
                Ok(pb::file_reference::Type::BinaryXml) => FileType::BinaryXml,
                Ok(pb::file_reference::Type::ProtoXml) => FileType::ProtoXml,
                Err(_) => return Err(unrecognized("FileReference.Type"))
            };
            Item::File(FileReference {
                path: file.path.clone(),
                file_type
            })
        }
        None => return Err(unrecognized("Item"))
    })
}

fn required_item(item: Option<&pb::Item>, context: &str) -> Result<Item> {
    match item {
        Some(item) => deserialize_item(item),
        None => Err(invalid(format!("{} has no item", context)))
    }
}

fn required_reference(reference: Option<&pb::Reference>, context: &str) -> Result<Reference> {
    match reference {
        Some(reference) => deserialize_reference(reference),
        None => Err(invalid(format!("{} has no reference", context)))
    }
}

// Anything unrecognised lands in the `other` slot
fn deserialize_arity(arity: i32) -> PluralArity {
    match pb::plural::Arity::try_from(arity) {
        Ok(pb::plural::Arity::Zero) => PluralArity::Zero,
        Ok(pb::plural::Arity::One) => PluralArity::One,
        Ok(pb::plural::Arity::Two) => PluralArity::Two,
        Ok(pb::plural::Arity::Few) => PluralArity::Few,
        Ok(pb::plural::Arity::Many) => PluralArity::Many,
        Ok(pb::plural::Arity::Other) => PluralArity::Other,
        Err(_) => {
            warn!("unknown plural arity {}, using other", arity);
            PluralArity::Other
        }
    }
}

fn deserialize_macro(body: &pb::MacroBody) -> Macro {
    Macro {
        raw_value: body.raw_string.clone(),
        style_string: body.style_string.as_ref().map(|styled| StyledString {
            value: styled.str.clone(),
            spans: styled
                .spans
                .iter()
                .map(|span| Span {
                    name: span.name.clone(),
                    first_char: span.start_index,
                    last_char: span.end_index
                })
                .collect()
        }),
        untranslatable_sections: body
            .untranslatable_sections
            .iter()
            .map(|section| UntranslatableSection {
                start: section.start_index,
                end: section.end_index
            })
            .collect(),
        alias_namespaces: body
            .namespace_stack
            .iter()
            .map(|alias| NamespaceAlias {
                alias: alias.prefix.clone(),
                package_name: alias.package_name.clone(),
                is_private: alias.is_private
            })
            .collect()
    }
}

fn deserialize_compound(value: &pb::CompoundValue, paths: &[String]) -> Result<CompoundValue> {
    use pb::compound_value::Value;

    Ok(match &value.value {
        Some(Value::Attr(attribute)) => CompoundValue::Attribute(Attribute {
            format_flags: attribute.format_flags,
            min_int: attribute.min_int,
            max_int: attribute.max_int,
            symbols: attribute
                .symbol
                .iter()
                .map(|symbol| {
                    Ok(Symbol {
                        source: deserialize_source(symbol.source.as_ref(), paths)?,
                        comment: symbol.comment.clone(),
                        name: required_reference(symbol.name.as_ref(), "attribute symbol")?,
                        value: symbol.value,
                        data_type: u8::try_from(symbol.r#type).map_err(|_| {
                            invalid(format!("symbol type {} is out of range", symbol.r#type))
                        })?
                    })
                })
                .collect::<Result<Vec<_>>>()?
        }),
        Some(Value::Style(style)) => CompoundValue::Style(Style {
            parent: style.parent.as_ref().map(deserialize_reference).transpose()?,
            parent_source: deserialize_source(style.parent_source.as_ref(), paths)?,
            entries: style
                .entry
                .iter()
                .map(|entry| {
                    Ok(StyleEntry {
                        source: deserialize_source(entry.source.as_ref(), paths)?,
                        comment: entry.comment.clone(),
                        key: required_reference(entry.key.as_ref(), "style entry")?,
                        item: required_item(entry.item.as_ref(), "style entry")?
                    })
                })
                .collect::<Result<Vec<_>>>()?
        }),
        Some(Value::Styleable(styleable)) => CompoundValue::Styleable(Styleable {
            entries: styleable
                .entry
                .iter()
                .map(|entry| required_reference(entry.attr.as_ref(), "styleable entry"))
                .collect::<Result<Vec<_>>>()?
        }),
        Some(Value::Array(array)) => CompoundValue::Array(Array {
            elements: array
                .element
                .iter()
                .map(|element| required_item(element.item.as_ref(), "array element"))
                .collect::<Result<Vec<_>>>()?
        }),
        Some(Value::Plural(plural)) => {
            let mut out = Plural::default();
            for entry in &plural.entry {
                let arity = deserialize_arity(entry.arity);
                out.set(arity, required_item(entry.item.as_ref(), "plural entry")?);
            }
            CompoundValue::Plural(out)
        }
        Some(Value::Macro(body)) => CompoundValue::Macro(deserialize_macro(body)),
        None => return Err(unrecognized("CompoundValue"))
    })
}

pub fn deserialize_value(value: &pb::Value, paths: &[String]) -> Result<Value> {
    let kind = match &value.value {
        Some(pb::value::Value::Item(item)) => ValueKind::Item(deserialize_item(item)?),
        Some(pb::value::Value::CompoundValue(compound)) => {
            ValueKind::Compound(deserialize_compound(compound, paths)?)
        }
        None => return Err(unrecognized("Value"))
    };
    Ok(Value {
        source: deserialize_source(value.source.as_ref(), paths)?,
        comment: value.comment.clone(),
        weak: value.weak,
        kind
    })
}

pub fn deserialize_overlayable_item(
    item: &pb::OverlayableItem,
    paths: &[String]
) -> Result<OverlayableItem> {
    let mut policies = PolicyFlags::NONE;
    for &raw in &item.policy {
        let policy = pb::overlayable_item::Policy::try_from(raw)
            .map_err(|_| ResError::UnknownOverlayablePolicy(raw))?;
        if policy == pb::overlayable_item::Policy::None {
            continue;
        }
        let flag = POLICY_TABLE
            .iter()
            .find(|(_, known)| *known == policy)
            .map(|(flag, _)| *flag)
            .ok_or(ResError::UnknownOverlayablePolicy(raw))?;
        policies = policies | flag;
    }
    let overlayable = OverlayableItem {
        policies,
        overlayable_index: item.overlayable_idx,
        source: deserialize_source(item.source.as_ref(), paths)?,
        comment: item.comment.clone()
    };
    overlayable.validate()?;
    Ok(overlayable)
}

fn deserialize_visibility(visibility: &pb::Visibility, paths: &[String]) -> Result<Visibility> {
    let level = match pb::visibility::Level::try_from(visibility.level) {
        Ok(pb::visibility::Level::Unknown) => VisibilityLevel::Undefined,
        Ok(pb::visibility::Level::Private) => VisibilityLevel::Private,
        Ok(pb::visibility::Level::Public) => VisibilityLevel::Public,
        Err(_) => return Err(unrecognized("Visibility.Level"))
    };
    Ok(Visibility {
        level,
        source: deserialize_source(visibility.source.as_ref(), paths)?,
        comment: visibility.comment.clone(),
        staged_api: visibility.staged_api
    })
}

pub fn deserialize_entry(entry: &pb::Entry, paths: &[String]) -> Result<ResourceEntry> {
    let id = match &entry.entry_id {
        Some(entry_id) => Some(u16::try_from(entry_id.id).map_err(|_| {
            invalid(format!("entry id {} of {} is out of range", entry_id.id, entry.name))
        })?),
        None => None
    };
    Ok(ResourceEntry {
        name: entry.name.clone(),
        id,
        visibility: entry
            .visibility
            .as_ref()
            .map(|visibility| deserialize_visibility(visibility, paths))
            .transpose()?
            .unwrap_or_default(),
        overlayable_item: entry
            .overlayable_item
            .as_ref()
            .map(|item| deserialize_overlayable_item(item, paths))
            .transpose()?,
        values: entry
            .config_value
            .iter()
            .map(|config_value| {
                let value = config_value
                    .value
                    .as_ref()
                    .ok_or_else(|| invalid(format!("{} has a configuration without a value", entry.name)))?;
                Ok(ConfigValue {
                    config: config_value
                        .config
                        .as_ref()
                        .map(deserialize_config)
                        .transpose()?
                        .unwrap_or_default(),
                    value: deserialize_value(value, paths)?
                })
            })
            .collect::<Result<Vec<_>>>()?
    })
}
