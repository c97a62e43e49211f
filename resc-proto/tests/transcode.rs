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

use prost::Message;
use resc_asset_compiler::{
    configuration::*,
    resource_external_types::{ResValueType, DATA_NULL_EMPTY},
    resource_internal_types::*
};
use resc_common::*;
use resc_proto::{
    aapt::pb,
    deserialize::{deserialize_config, deserialize_overlayable_item, deserialize_value, read_source_pool},
    deserialize_table,
    serialize::{serialize_config, serialize_overlayable_item, serialize_value, SourcePool},
    serialize_table,
    table::{TablePackage, TableType}
};

// Serializes, encodes to bytes, decodes and deserializes again.
fn through_the_wire(value: &Value) -> Value {
    let mut pool = SourcePool::new();
    let message = serialize_value(value, &mut pool).unwrap();
    let decoded = pb::Value::decode(message.encode_to_vec().as_slice()).unwrap();
    let paths = read_source_pool(&pool.to_pb().unwrap()).unwrap();
    deserialize_value(&decoded, &paths).unwrap()
}

fn reference(name: &str, id: u32) -> Reference {
    Reference {
        id: Some(ResourceId(id)),
        name: Some(ResourceName::parse(name).unwrap()),
        ..Default::default()
    }
}

fn primitive(data_type: ResValueType, data: u32) -> Item {
    Item::Primitive(Primitive::new(data_type, data).unwrap())
}

#[test]
fn every_item_kind_round_trips() {
    let items = vec![
        Item::Reference(reference("string/app_name", 0x7f01_0000)),
        Item::Reference(Reference {
            reference_type: ReferenceType::Attribute,
            name: Some(ResourceName::new("android", "attr", "textColor")),
            private: true,
            is_dynamic: true,
            type_flags: Some(0xFFFF),
            allow_raw: true,
            ..Default::default()
        }),
        Item::Id,
        Item::String("hello".into()),
        Item::RawString("  raw  ".into()),
        Item::StyledString(StyledString {
            value: "bold move".into(),
            spans: vec![Span {
                name: "b".into(),
                first_char: 0,
                last_char: 3
            }]
        }),
        Item::File(FileReference {
            path: "res/layout/main.xml".into(),
            file_type: FileType::ProtoXml
        }),
        primitive(ResValueType::Null, 0),
        primitive(ResValueType::Null, DATA_NULL_EMPTY),
        primitive(ResValueType::Float, 1.5f32.to_bits()),
        primitive(ResValueType::Dimension, 0x0000_0c01),
        primitive(ResValueType::Fraction, 0x0000_3200),
        Item::Primitive(Primitive::int(-7)),
        primitive(ResValueType::IntHex, 0xdead_beef),
        Item::Primitive(Primitive::boolean(true)),
        Item::Primitive(Primitive::boolean(false)),
        // Any non-zero boolean survives
        primitive(ResValueType::IntBoolean, 1),
        primitive(ResValueType::IntColorArgb8, 0x80ff_0000),
        primitive(ResValueType::IntColorRgb8, 0xff00_ff00),
        primitive(ResValueType::IntColorArgb4, 0xff11_2233),
        primitive(ResValueType::IntColorRgb4, 0xff44_5566),
    ];
    for item in items {
        let value = Value::item(item);
        assert_eq!(through_the_wire(&value), value);
    }
}

#[test]
fn compound_values_round_trip() {
    let source = Source::new("res/values/attrs.xml").with_line(4);
    let mut plural = Plural::default();
    plural.set(PluralArity::One, Item::String("%d song".into()));
    plural.set(PluralArity::Other, Item::String("%d songs".into()));

    let values = vec![
        CompoundValue::Attribute(Attribute {
            format_flags: 0x0001_0000,
            min_int: i32::MIN,
            max_int: i32::MAX,
            symbols: vec![Symbol {
                source: source.clone(),
                comment: "Upright".into(),
                name: reference("id/port", 0x7f05_0000),
                value: 1,
                data_type: ResValueType::IntDec.as_u8()
            }]
        }),
        CompoundValue::Style(Style {
            parent: Some(reference("android:style/Theme", 0x0103_0005)),
            parent_source: source.clone(),
            entries: vec![StyleEntry {
                source: source.clone(),
                comment: String::new(),
                key: reference("android:attr/textColor", 0x0101_0098),
                item: primitive(ResValueType::IntColorRgb8, 0xff00_0000)
            }]
        }),
        CompoundValue::Styleable(Styleable {
            entries: vec![reference("attr/size", 0x7f04_0000), reference("attr/shape", 0x7f04_0001)]
        }),
        CompoundValue::Array(Array {
            elements: vec![Item::String("a".into()), Item::Primitive(Primitive::int(2))]
        }),
        CompoundValue::Plural(plural),
        CompoundValue::Macro(Macro {
            raw_value: "@string/app_name".into(),
            style_string: None,
            untranslatable_sections: vec![UntranslatableSection { start: 1, end: 4 }],
            alias_namespaces: vec![NamespaceAlias {
                alias: "app".into(),
                package_name: "com.example".into(),
                is_private: false
            }]
        }),
    ];
    for compound in values {
        let mut value = Value::compound(compound).with_source(source.clone());
        value.comment = "kept".into();
        value.weak = true;
        assert_eq!(through_the_wire(&value), value);
    }
}

#[test]
fn configuration_round_trips() {
    let config = Configuration {
        mcc: 310,
        mnc: 4,
        locale: "fr-CA".into(),
        layout_direction: LayoutDirection::Rtl,
        screen_width_dp: 411,
        screen_height_dp: 731,
        smallest_screen_width_dp: 411,
        screen_layout_size: ScreenLayoutSize::Normal,
        orientation: Orientation::Land,
        ui_mode_type: UiModeType::Watch,
        ui_mode_night: UiModeNight::Night,
        density: 480,
        touchscreen: Touchscreen::Finger,
        keys_hidden: KeysHidden::KeysSoft,
        keyboard: Keyboard::Qwerty,
        nav_hidden: NavHidden::NavHidden,
        navigation: Navigation::Dpad,
        sdk_version: 21,
        product: "tablet".into(),
        ..Default::default()
    };
    let message = serialize_config(&config);
    assert_eq!(message.orientation, pb::configuration::Orientation::Land as i32);
    let decoded = pb::Configuration::decode(message.encode_to_vec().as_slice()).unwrap();
    assert_eq!(deserialize_config(&decoded).unwrap(), config);
    assert_eq!(deserialize_config(&pb::Configuration::default()).unwrap(), Configuration::default());
}

#[test]
fn configuration_values_out_of_range_are_rejected() {
    let message = pb::Configuration {
        density: 70_000,
        ..Default::default()
    };
    assert!(matches!(deserialize_config(&message), Err(ResError::InvalidIntermediate(_))));
    let message = pb::Configuration {
        orientation: 9,
        ..Default::default()
    };
    assert!(matches!(deserialize_config(&message), Err(ResError::InvalidIntermediate(_))));
}

#[test]
fn overlayable_policies_map_bit_by_bit() {
    let item = OverlayableItem {
        policies: PolicyFlags::PUBLIC | PolicyFlags::SIGNATURE | PolicyFlags::CONFIG_SIGNATURE,
        overlayable_index: 2,
        source: Source::new("res/values/overlayable.xml"),
        comment: String::new()
    };
    let mut pool = SourcePool::new();
    let message = serialize_overlayable_item(&item, &mut pool).unwrap();
    assert_eq!(
        message.policy,
        vec![
            pb::overlayable_item::Policy::Public as i32,
            pb::overlayable_item::Policy::Signature as i32,
            pb::overlayable_item::Policy::ConfigSignature as i32
        ]
    );
    assert_eq!(deserialize_overlayable_item(&message, pool.paths()).unwrap(), item);
}

#[test]
fn unknown_policy_is_reported() {
    let message = pb::OverlayableItem {
        policy: vec![pb::overlayable_item::Policy::Public as i32, 42],
        ..Default::default()
    };
    assert!(matches!(
        deserialize_overlayable_item(&message, &[]),
        Err(ResError::UnknownOverlayablePolicy(42))
    ));
}

#[test]
fn overlayable_without_policy_is_rejected_both_ways() {
    let item = OverlayableItem::default();
    assert!(matches!(
        serialize_overlayable_item(&item, &mut SourcePool::new()),
        Err(ResError::OverlayPolicyViolation(_))
    ));
    let message = pb::OverlayableItem {
        policy: vec![pb::overlayable_item::Policy::None as i32],
        ..Default::default()
    };
    assert!(matches!(
        deserialize_overlayable_item(&message, &[]),
        Err(ResError::OverlayPolicyViolation(_))
    ));
}

#[test]
fn unset_oneofs_are_unrecognized() {
    let empty = pb::Value::default();
    assert!(matches!(
        deserialize_value(&empty, &[]),
        Err(ResError::UnrecognizedIntermediateVariant("Value"))
    ));

    let no_primitive = pb::Value {
        value: Some(pb::value::Value::Item(pb::Item {
            value: Some(pb::item::Value::Prim(pb::Primitive::default()))
        })),
        ..Default::default()
    };
    assert!(matches!(
        deserialize_value(&no_primitive, &[]),
        Err(ResError::UnrecognizedIntermediateVariant("Primitive"))
    ));
}

#[test]
fn unknown_plural_arity_defaults_to_other() {
    let message = pb::Value {
        value: Some(pb::value::Value::CompoundValue(pb::CompoundValue {
            value: Some(pb::compound_value::Value::Plural(pb::Plural {
                entry: vec![pb::plural::Entry {
                    arity: 17,
                    item: Some(pb::Item {
                        value: Some(pb::item::Value::Id(pb::Id {}))
                    }),
                    ..Default::default()
                }]
            }))
        })),
        ..Default::default()
    };
    let value = deserialize_value(&message, &[]).unwrap();
    let ValueKind::Compound(CompoundValue::Plural(plural)) = &value.kind else {
        panic!("expected a plural, got {:?}", value.kind);
    };
    assert_eq!(plural.get(PluralArity::Other), Some(&Item::Id));
    assert_eq!(plural.get(PluralArity::Zero), None);
}

#[test]
fn source_index_past_the_pool_is_invalid() {
    let message = pb::Value {
        source: Some(pb::Source {
            path_idx: 3,
            position: None
        }),
        value: Some(pb::value::Value::Item(pb::Item {
            value: Some(pb::item::Value::Id(pb::Id {}))
        })),
        ..Default::default()
    };
    assert!(matches!(
        deserialize_value(&message, &["a.xml".to_string()]),
        Err(ResError::InvalidIntermediate(_))
    ));
}

#[test]
fn table_shares_one_source_pool() {
    let strings = Source::new("res/values/strings.xml");
    let entry = |name: &str, id: u16, text: &str, line: usize| ResourceEntry {
        name: name.into(),
        id: Some(id),
        visibility: Visibility {
            level: VisibilityLevel::Public,
            ..Default::default()
        },
        overlayable_item: None,
        values: vec![
            ConfigValue {
                config: Configuration::default(),
                value: Value::item(Item::String(text.into())).with_source(strings.with_line(line))
            },
            ConfigValue {
                config: Configuration {
                    locale: "de".into(),
                    ..Default::default()
                },
                value: Value::item(Item::String(text.to_uppercase()))
                    .with_source(Source::new("res/values-de/strings.xml").with_line(line))
            },
        ]
    };
    let packages = vec![TablePackage {
        name: "com.example".into(),
        id: Some(0x7f),
        types: vec![TableType {
            name: "string".into(),
            id: Some(1),
            entries: vec![entry("app_name", 0, "Example", 2), entry("title", 1, "Title", 3)]
        }]
    }];

    let table = serialize_table(&packages).unwrap();
    assert_eq!(table.tool_fingerprint.len(), 1);
    let decoded = pb::ResourceTable::decode(table.encode_to_vec().as_slice()).unwrap();
    let paths = read_source_pool(decoded.source_pool.as_ref().unwrap()).unwrap();
    assert_eq!(paths, vec!["res/values/strings.xml", "res/values-de/strings.xml"]);
    assert_eq!(deserialize_table(&decoded).unwrap(), packages);
}
