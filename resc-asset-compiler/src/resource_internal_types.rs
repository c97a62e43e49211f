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

// Types that are used internally to describe resource values
use std::{fmt, ops::BitOr};

use resc_common::*;

use crate::{configuration::Configuration, resource_external_types::*};

/// A `0xPPTTEEEE` resource id: package, type and entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourceId(pub u32);

impl ResourceId {
    pub fn new(package_id: u8, type_id: u8, entry_id: u16) -> Self {
        ResourceId(((package_id as u32) << 24) | ((type_id as u32) << 16) | entry_id as u32)
    }

    pub fn package_id(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn type_id(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn entry_id(self) -> u16 {
        self.0 as u16
    }

    /// Both the package and the type are set.
    pub fn is_valid(self) -> bool {
        self.package_id() != 0 && self.type_id() != 0
    }

    /// Only the type is required; the package is assigned at load time.
    pub fn is_valid_dynamic(self) -> bool {
        self.type_id() != 0
    }

    pub fn with_package_id(self, package_id: u8) -> Self {
        ResourceId((self.0 & 0x00FF_FFFF) | ((package_id as u32) << 24))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// eg. `android:attr/label`. An empty package means the package being built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourceName {
    pub package: String,
    /// eg. `string`, `drawable`, `attr`
    pub type_name: String,
    pub entry: String
}

impl ResourceName {
    pub fn new(package: &str, type_name: &str, entry: &str) -> Self {
        ResourceName {
            package: package.to_string(),
            type_name: type_name.to_string(),
            entry: entry.to_string()
        }
    }

    /// Parses `[package:]type/entry`.
    pub fn parse(text: &str) -> Result<Self> {
        let (package, rest) = match text.split_once(':') {
            Some((package, rest)) => (package, rest),
            None => ("", text)
        };
        let Some((type_name, entry)) = rest.split_once('/') else {
            return Err(ResError::InvalidResourceName(text.to_string()));
        };
        if type_name.is_empty() || entry.is_empty() || entry.contains('/') {
            return Err(ResError::InvalidResourceName(text.to_string()));
        }
        Ok(ResourceName::new(package, type_name, entry))
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}:", self.package)?;
        }
        write!(f, "{}/{}", self.type_name, self.entry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceType {
    /// `@type/name`
    #[default]
    Resource,
    /// `?attr/name`, resolved against the current theme
    Attribute
}

/// A reference to another resource, by id, by name or both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reference {
    pub id: Option<ResourceId>,
    pub name: Option<ResourceName>,
    pub reference_type: ReferenceType,
    /// The package id is assigned at load time through a dynamic reference
    /// table.
    pub is_dynamic: bool,
    /// `@*package:type/name`
    pub private: bool,
    /// Allowed attribute formats when this is an attribute name in an XML
    /// document.
    pub type_flags: Option<u32>,
    /// Raw strings are accepted where this attribute appears.
    pub allow_raw: bool
}

impl Reference {
    pub fn from_id(id: ResourceId) -> Self {
        Reference {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn from_name(name: ResourceName) -> Self {
        Reference {
            name: Some(name),
            ..Default::default()
        }
    }

    pub fn describe(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) => name.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => String::from("@null")
        }
    }
}

/// A value stored directly in a `Res_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Primitive {
    pub data_type: ResValueType,
    pub data: u32
}

impl Primitive {
    /// Primitives never carry references or pool indices, those have their
    /// own [Item] kinds. Any non-zero boolean is stored as `0xFFFFFFFF`.
    pub fn new(data_type: ResValueType, data: u32) -> Result<Self> {
        if !data_type.is_primitive() {
            return Err(ResError::InvalidPrimitiveType(data_type.as_u8()));
        }
        if data_type == ResValueType::IntBoolean {
            return Ok(Primitive::boolean(data != 0));
        }
        Ok(Primitive { data_type, data })
    }

    pub fn int(value: i32) -> Self {
        Primitive {
            data_type: ResValueType::IntDec,
            data: value as u32
        }
    }

    pub fn boolean(value: bool) -> Self {
        Primitive {
            data_type: ResValueType::IntBoolean,
            data: if value { 0xFFFF_FFFF } else { 0 }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    /// Tag name and attributes, eg. `b` or `font;color=red`
    pub name: String,
    pub first_char: u32,
    pub last_char: u32
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledString {
    pub value: String,
    pub spans: Vec<Span>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Unknown,
    Png,
    BinaryXml,
    ProtoXml
}

/// A file in `res/`, eg. `res/drawable/preview.png`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileReference {
    pub path: String,
    pub file_type: FileType
}

/// A single value that fits in a `Res_value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Reference(Reference),
    /// `@+id/name` declares an id and has no value of its own
    Id,
    Primitive(Primitive),
    String(String),
    /// Kept verbatim, never escape-processed
    RawString(String),
    StyledString(StyledString),
    File(FileReference)
}

/// How an [Item] lands in a `Res_value`.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatItem<'a> {
    Value(ResValue),
    /// `TYPE_STRING` whose data is the pool index of this string
    PooledString(&'a str)
}

impl Item {
    /// `@null`: a reference to nothing.
    pub fn null() -> Self {
        Item::Reference(Reference::default())
    }

    /// `@empty`: an explicitly empty value.
    pub fn empty() -> Self {
        Item::Primitive(Primitive {
            data_type: ResValueType::Null,
            data: DATA_NULL_EMPTY
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Item::Reference(_) => "reference",
            Item::Id => "id",
            Item::Primitive(_) => "primitive",
            Item::String(_) => "string",
            Item::RawString(_) => "raw string",
            Item::StyledString(_) => "styled string",
            Item::File(_) => "file"
        }
    }

    pub fn flatten(&self) -> FlatItem<'_> {
        match self {
            Item::Reference(reference) => {
                let id = reference.id.unwrap_or_default();
                let dynamic = reference.is_dynamic && id.is_valid_dynamic();
                let data_type = match (reference.reference_type, dynamic) {
                    (ReferenceType::Resource, false) => ResValueType::Reference,
                    (ReferenceType::Resource, true) => ResValueType::DynamicReference,
                    (ReferenceType::Attribute, false) => ResValueType::Attribute,
                    (ReferenceType::Attribute, true) => ResValueType::DynamicAttribute
                };
                FlatItem::Value(ResValue::new(data_type, id.0))
            }
            Item::Id => FlatItem::Value(ResValue::new(ResValueType::IntBoolean, 0)),
            Item::Primitive(primitive) => {
                FlatItem::Value(ResValue::new(primitive.data_type, primitive.data))
            }
            Item::String(value) | Item::RawString(value) => FlatItem::PooledString(value),
            Item::StyledString(styled) => FlatItem::PooledString(&styled.value),
            Item::File(file) => FlatItem::PooledString(&file.path)
        }
    }
}

/// One enum or flag value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Symbol {
    pub source: Source,
    pub comment: String,
    pub name: Reference,
    pub value: u32,
    /// `Res_value::dataType` of `value`, `TYPE_INT_DEC` unless it is a flag
    pub data_type: u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// `ATTR_FORMAT_*` bits
    pub format_flags: u32,
    pub min_int: i32,
    pub max_int: i32,
    pub symbols: Vec<Symbol>
}

impl Default for Attribute {
    fn default() -> Self {
        Attribute {
            format_flags: ATTR_FORMAT_ANY,
            min_int: i32::MIN,
            max_int: i32::MAX,
            symbols: vec![]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub source: Source,
    pub comment: String,
    pub key: Reference,
    pub item: Item
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    pub parent: Option<Reference>,
    pub parent_source: Source,
    pub entries: Vec<StyleEntry>
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Styleable {
    pub entries: Vec<Reference>
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Array {
    pub elements: Vec<Item>
}

/// CLDR plural categories, in their fixed slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralArity {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other
}

impl PluralArity {
    pub const ALL: [PluralArity; 6] = [
        PluralArity::Zero,
        PluralArity::One,
        PluralArity::Two,
        PluralArity::Few,
        PluralArity::Many,
        PluralArity::Other
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The `ResTable_map` name used for this slot in a binary table.
    pub fn map_name(self) -> u32 {
        match self {
            PluralArity::Zero => ATTR_ZERO,
            PluralArity::One => ATTR_ONE,
            PluralArity::Two => ATTR_TWO,
            PluralArity::Few => ATTR_FEW,
            PluralArity::Many => ATTR_MANY,
            PluralArity::Other => ATTR_OTHER
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plural {
    /// Indexed by [PluralArity::index]
    pub values: [Option<Item>; 6]
}

impl Plural {
    pub fn get(&self, arity: PluralArity) -> Option<&Item> {
        self.values[arity.index()].as_ref()
    }

    pub fn set(&mut self, arity: PluralArity, item: Item) {
        self.values[arity.index()] = Some(item);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UntranslatableSection {
    pub start: u64,
    pub end: u64
}

/// An `xmlns:alias="http://schemas.android.com/apk/res/package"` in scope
/// where a macro was defined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceAlias {
    pub alias: String,
    pub package_name: String,
    pub is_private: bool
}

/// `<macro>`: text substituted at compile time wherever it is referenced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Macro {
    pub raw_value: String,
    pub style_string: Option<StyledString>,
    pub untranslatable_sections: Vec<UntranslatableSection>,
    pub alias_namespaces: Vec<NamespaceAlias>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompoundValue {
    Attribute(Attribute),
    Style(Style),
    Styleable(Styleable),
    Array(Array),
    Plural(Plural),
    Macro(Macro)
}

impl CompoundValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            CompoundValue::Attribute(_) => "attr",
            CompoundValue::Style(_) => "style",
            CompoundValue::Styleable(_) => "styleable",
            CompoundValue::Array(_) => "array",
            CompoundValue::Plural(_) => "plurals",
            CompoundValue::Macro(_) => "macro"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Item(Item),
    Compound(CompoundValue)
}

/// A resource value plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub source: Source,
    pub comment: String,
    /// Can be overridden by a later definition without an error
    pub weak: bool,
    pub kind: ValueKind
}

impl Value {
    pub fn item(item: Item) -> Self {
        Value {
            source: Source::default(),
            comment: String::new(),
            weak: false,
            kind: ValueKind::Item(item)
        }
    }

    pub fn compound(value: CompoundValue) -> Self {
        Value {
            source: Source::default(),
            comment: String::new(),
            weak: false,
            kind: ValueKind::Compound(value)
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }
}

/// A value for one device configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue {
    pub config: Configuration,
    pub value: Value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityLevel {
    #[default]
    Undefined,
    Private,
    Public
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Visibility {
    pub level: VisibilityLevel,
    pub source: Source,
    pub comment: String,
    /// Public, but not yet finalized in the current SDK
    pub staged_api: bool
}

/// Which overlays may replace a resource. One bit per partition or
/// signature requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PolicyFlags(pub u32);

impl PolicyFlags {
    pub const NONE: PolicyFlags = PolicyFlags(0);
    pub const PUBLIC: PolicyFlags = PolicyFlags(0x0000_0001);
    pub const SYSTEM_PARTITION: PolicyFlags = PolicyFlags(0x0000_0002);
    pub const VENDOR_PARTITION: PolicyFlags = PolicyFlags(0x0000_0004);
    pub const PRODUCT_PARTITION: PolicyFlags = PolicyFlags(0x0000_0008);
    pub const SIGNATURE: PolicyFlags = PolicyFlags(0x0000_0010);
    pub const ODM_PARTITION: PolicyFlags = PolicyFlags(0x0000_0020);
    pub const OEM_PARTITION: PolicyFlags = PolicyFlags(0x0000_0040);
    pub const ACTOR_SIGNATURE: PolicyFlags = PolicyFlags(0x0000_0080);
    pub const CONFIG_SIGNATURE: PolicyFlags = PolicyFlags(0x0000_0100);

    pub fn contains(self, other: PolicyFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for PolicyFlags {
    type Output = PolicyFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        PolicyFlags(self.0 | rhs.0)
    }
}

/// Marks a resource as replaceable by overlays in the overlayable group at
/// `overlayable_index`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayableItem {
    pub policies: PolicyFlags,
    pub overlayable_index: u32,
    pub source: Source,
    pub comment: String
}

impl OverlayableItem {
    /// An item with no policy can never be overlaid, which is always a
    /// mistake in the declaring package.
    pub fn validate(&self) -> Result<()> {
        if self.policies.is_empty() {
            return Err(ResError::OverlayPolicyViolation(format!(
                "{}: overlayable item declares no policy",
                self.source
            )));
        }
        Ok(())
    }
}

/// Every value of one named resource, eg. all `string/app_name` variants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceEntry {
    pub name: String,
    pub id: Option<u16>,
    pub visibility: Visibility,
    pub overlayable_item: Option<OverlayableItem>,
    pub values: Vec<ConfigValue>
}

impl ResourceEntry {
    pub fn find_value(&self, config: &Configuration) -> Option<&Value> {
        self.values
            .iter()
            .find(|config_value| &config_value.config == config)
            .map(|config_value| &config_value.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_parts() {
        let id = ResourceId(0x7f02_0001);
        assert_eq!(id.package_id(), 0x7f);
        assert_eq!(id.type_id(), 0x02);
        assert_eq!(id.entry_id(), 0x0001);
        assert_eq!(ResourceId::new(0x7f, 0x02, 1), id);
        assert_eq!(id.with_package_id(0x03), ResourceId(0x0302_0001));
        assert!(id.is_valid());
        assert!(!ResourceId(0x0002_0001).is_valid());
        assert!(ResourceId(0x0002_0001).is_valid_dynamic());
        assert_eq!(id.to_string(), "0x7f020001");
    }

    #[test]
    fn resource_name_parse_and_format() {
        let name = ResourceName::parse("android:attr/label").unwrap();
        assert_eq!(name, ResourceName::new("android", "attr", "label"));
        assert_eq!(name.to_string(), "android:attr/label");

        let local = ResourceName::parse("string/app_name").unwrap();
        assert_eq!(local.package, "");
        assert_eq!(local.to_string(), "string/app_name");

        assert!(ResourceName::parse("app_name").is_err());
        assert!(ResourceName::parse("string/").is_err());
        assert!(ResourceName::parse("a:b/c/d").is_err());
    }

    #[test]
    fn primitive_rejects_reference_types() {
        assert!(Primitive::new(ResValueType::IntDec, 3).is_ok());
        assert!(matches!(
            Primitive::new(ResValueType::String, 3),
            Err(ResError::InvalidPrimitiveType(0x03))
        ));
    }

    #[test]
    fn booleans_are_normalised() {
        assert_eq!(
            Primitive::new(ResValueType::IntBoolean, 1).unwrap(),
            Primitive::boolean(true)
        );
        assert_eq!(Primitive::new(ResValueType::IntBoolean, 1).unwrap().data, 0xFFFF_FFFF);
        assert_eq!(Primitive::new(ResValueType::IntBoolean, 0).unwrap().data, 0);
    }

    #[test]
    fn item_flattening() {
        assert_eq!(
            Item::null().flatten(),
            FlatItem::Value(ResValue::new(ResValueType::Reference, 0))
        );
        assert_eq!(
            Item::empty().flatten(),
            FlatItem::Value(ResValue::new(ResValueType::Null, DATA_NULL_EMPTY))
        );
        let dynamic = Item::Reference(Reference {
            id: Some(ResourceId(0x0001_0002)),
            reference_type: ReferenceType::Attribute,
            is_dynamic: true,
            ..Default::default()
        });
        assert_eq!(
            dynamic.flatten(),
            FlatItem::Value(ResValue::new(ResValueType::DynamicAttribute, 0x0001_0002))
        );
        let file = Item::File(FileReference {
            path: String::from("res/drawable/icon.png"),
            file_type: FileType::Png
        });
        assert_eq!(file.flatten(), FlatItem::PooledString("res/drawable/icon.png"));
    }

    #[test]
    fn plural_slots() {
        let mut plural = Plural::default();
        plural.set(PluralArity::Few, Item::String(String::from("a few")));
        assert_eq!(plural.get(PluralArity::Few), Some(&Item::String(String::from("a few"))));
        assert_eq!(plural.get(PluralArity::Other), None);
        assert_eq!(PluralArity::Other.map_name(), ATTR_OTHER);
    }

    #[test]
    fn overlayable_requires_a_policy() {
        let mut item = OverlayableItem::default();
        assert!(matches!(
            item.validate(),
            Err(ResError::OverlayPolicyViolation(_))
        ));
        item.policies = PolicyFlags::PUBLIC | PolicyFlags::SIGNATURE;
        assert!(item.validate().is_ok());
        assert!(item.policies.contains(PolicyFlags::SIGNATURE));
        assert!(!item.policies.contains(PolicyFlags::ODM_PARTITION));
    }
}
