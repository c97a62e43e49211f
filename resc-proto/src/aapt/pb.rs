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

// Messages of the aapt.pb package (Resources.proto and Configuration.proto),
// with the same field numbers so the encoding stays compatible with other
// tools reading compiled resources.

/// A string pool chunk, used for the table's source paths.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringPool {
    #[prost(bytes = "vec", tag = "1")]
    pub data: ::prost::alloc::vec::Vec<u8>
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SourcePosition {
    #[prost(uint32, tag = "1")]
    pub line_number: u32,
    #[prost(uint32, tag = "2")]
    pub column_number: u32
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Source {
    /// Index into the table's source pool
    #[prost(uint32, tag = "1")]
    pub path_idx: u32,
    #[prost(message, optional, tag = "2")]
    pub position: ::core::option::Option<SourcePosition>
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ToolFingerprint {
    #[prost(string, tag = "1")]
    pub tool: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub version: ::prost::alloc::string::String
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DynamicRefTable {
    #[prost(message, optional, tag = "1")]
    pub package_id: ::core::option::Option<PackageId>,
    #[prost(string, tag = "2")]
    pub package_name: ::prost::alloc::string::String
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResourceTable {
    #[prost(message, optional, tag = "1")]
    pub source_pool: ::core::option::Option<StringPool>,
    #[prost(message, repeated, tag = "2")]
    pub package: ::prost::alloc::vec::Vec<Package>,
    #[prost(message, repeated, tag = "3")]
    pub overlayable: ::prost::alloc::vec::Vec<Overlayable>,
    #[prost(message, repeated, tag = "4")]
    pub tool_fingerprint: ::prost::alloc::vec::Vec<ToolFingerprint>,
    #[prost(message, repeated, tag = "5")]
    pub dynamic_ref_table: ::prost::alloc::vec::Vec<DynamicRefTable>
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct PackageId {
    #[prost(uint32, tag = "1")]
    pub id: u32
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Package {
    #[prost(message, optional, tag = "1")]
    pub package_id: ::core::option::Option<PackageId>,
    #[prost(string, tag = "2")]
    pub package_name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub r#type: ::prost::alloc::vec::Vec<Type>
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct TypeId {
    #[prost(uint32, tag = "1")]
    pub id: u32
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Type {
    #[prost(message, optional, tag = "1")]
    pub type_id: ::core::option::Option<TypeId>,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub entry: ::prost::alloc::vec::Vec<Entry>
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Visibility {
    #[prost(enumeration = "visibility::Level", tag = "1")]
    pub level: i32,
    #[prost(message, optional, tag = "2")]
    pub source: ::core::option::Option<Source>,
    #[prost(string, tag = "3")]
    pub comment: ::prost::alloc::string::String,
    #[prost(bool, tag = "4")]
    pub staged_api: bool
}

pub mod visibility {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Level {
        Unknown = 0,
        Private = 1,
        Public = 2
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AllowNew {
    #[prost(message, optional, tag = "1")]
    pub source: ::core::option::Option<Source>,
    #[prost(string, tag = "2")]
    pub comment: ::prost::alloc::string::String
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Overlayable {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub source: ::core::option::Option<Source>,
    #[prost(string, tag = "3")]
    pub actor: ::prost::alloc::string::String
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OverlayableItem {
    #[prost(message, optional, tag = "1")]
    pub source: ::core::option::Option<Source>,
    #[prost(string, tag = "2")]
    pub comment: ::prost::alloc::string::String,
    #[prost(enumeration = "overlayable_item::Policy", repeated, tag = "3")]
    pub policy: ::prost::alloc::vec::Vec<i32>,
    #[prost(uint32, tag = "4")]
    pub overlayable_idx: u32
}

pub mod overlayable_item {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Policy {
        None = 0,
        Public = 1,
        System = 2,
        Vendor = 3,
        Product = 4,
        Signature = 5,
        Odm = 6,
        Oem = 7,
        Actor = 8,
        ConfigSignature = 9
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct EntryId {
    #[prost(uint32, tag = "1")]
    pub id: u32
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entry {
    #[prost(message, optional, tag = "1")]
    pub entry_id: ::core::option::Option<EntryId>,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub visibility: ::core::option::Option<Visibility>,
    #[prost(message, optional, tag = "4")]
    pub allow_new: ::core::option::Option<AllowNew>,
    #[prost(message, optional, tag = "5")]
    pub overlayable_item: ::core::option::Option<OverlayableItem>,
    #[prost(message, repeated, tag = "6")]
    pub config_value: ::prost::alloc::vec::Vec<ConfigValue>
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigValue {
    #[prost(message, optional, tag = "1")]
    pub config: ::core::option::Option<Configuration>,
    #[prost(message, optional, tag = "2")]
    pub value: ::core::option::Option<Value>
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(message, optional, tag = "1")]
    pub source: ::core::option::Option<Source>,
    #[prost(string, tag = "2")]
    pub comment: ::prost::alloc::string::String,
    #[prost(bool, tag = "3")]
    pub weak: bool,
    #[prost(oneof = "value::Value", tags = "4, 5")]
    pub value: ::core::option::Option<value::Value>
}

pub mod value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(message, tag = "4")]
        Item(super::Item),
        #[prost(message, tag = "5")]
        CompoundValue(super::CompoundValue)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Item {
    #[prost(oneof = "item::Value", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub value: ::core::option::Option<item::Value>
}

pub mod item {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(message, tag = "1")]
        Ref(super::Reference),
        #[prost(message, tag = "2")]
        Str(super::String),
        #[prost(message, tag = "3")]
        RawStr(super::RawString),
        #[prost(message, tag = "4")]
        StyledStr(super::StyledString),
        #[prost(message, tag = "5")]
        File(super::FileReference),
        #[prost(message, tag = "6")]
        Id(super::Id),
        #[prost(message, tag = "7")]
        Prim(super::Primitive)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompoundValue {
    #[prost(oneof = "compound_value::Value", tags = "1, 2, 3, 4, 5, 6")]
    pub value: ::core::option::Option<compound_value::Value>
}

pub mod compound_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(message, tag = "1")]
        Attr(super::Attribute),
        #[prost(message, tag = "2")]
        Style(super::Style),
        #[prost(message, tag = "3")]
        Styleable(super::Styleable),
        #[prost(message, tag = "4")]
        Array(super::Array),
        #[prost(message, tag = "5")]
        Plural(super::Plural),
        #[prost(message, tag = "6")]
        Macro(super::MacroBody)
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Boolean {
    #[prost(bool, tag = "1")]
    pub value: bool
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Reference {
    #[prost(enumeration = "reference::Type", tag = "1")]
    pub r#type: i32,
    #[prost(uint32, tag = "2")]
    pub id: u32,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(bool, tag = "4")]
    pub private: bool,
    #[prost(message, optional, tag = "5")]
    pub is_dynamic: ::core::option::Option<Boolean>,
    #[prost(uint32, tag = "6")]
    pub type_flags: u32,
    #[prost(bool, tag = "7")]
    pub allow_raw: bool
}

pub mod reference {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Reference = 0,
        Attribute = 1
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Id {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct String {
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawString {
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StyledString {
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub span: ::prost::alloc::vec::Vec<styled_string::Span>
}

pub mod styled_string {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Span {
        #[prost(string, tag = "1")]
        pub tag: ::prost::alloc::string::String,
        #[prost(uint32, tag = "2")]
        pub first_char: u32,
        #[prost(uint32, tag = "3")]
        pub last_char: u32
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileReference {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(enumeration = "file_reference::Type", tag = "2")]
    pub r#type: i32
}

pub mod file_reference {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Unknown = 0,
        Png = 1,
        BinaryXml = 2,
        ProtoXml = 3
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Primitive {
    #[prost(oneof = "primitive::OneofValue", tags = "1, 2, 3, 13, 14, 6, 7, 8, 9, 10, 11, 12, 4, 5")]
    pub oneof_value: ::core::option::Option<primitive::OneofValue>
}

pub mod primitive {
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct NullType {}

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct EmptyType {}

    #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
    pub enum OneofValue {
        #[prost(message, tag = "1")]
        NullValue(NullType),
        #[prost(message, tag = "2")]
        EmptyValue(EmptyType),
        #[prost(float, tag = "3")]
        FloatValue(f32),
        #[prost(uint32, tag = "13")]
        DimensionValue(u32),
        #[prost(uint32, tag = "14")]
        FractionValue(u32),
        #[prost(int32, tag = "6")]
        IntDecimalValue(i32),
        #[prost(uint32, tag = "7")]
        IntHexadecimalValue(u32),
        #[prost(bool, tag = "8")]
        BooleanValue(bool),
        #[prost(uint32, tag = "9")]
        ColorArgb8Value(u32),
        #[prost(uint32, tag = "10")]
        ColorRgb8Value(u32),
        #[prost(uint32, tag = "11")]
        ColorArgb4Value(u32),
        #[prost(uint32, tag = "12")]
        ColorRgb4Value(u32),
        /// Written by old toolchains, read only
        #[prost(float, tag = "4")]
        DimensionValueDeprecated(f32),
        /// Written by old toolchains, read only
        #[prost(float, tag = "5")]
        FractionValueDeprecated(f32)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Attribute {
    #[prost(uint32, tag = "1")]
    pub format_flags: u32,
    #[prost(int32, tag = "2")]
    pub min_int: i32,
    #[prost(int32, tag = "3")]
    pub max_int: i32,
    #[prost(message, repeated, tag = "4")]
    pub symbol: ::prost::alloc::vec::Vec<attribute::Symbol>
}

pub mod attribute {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Symbol {
        #[prost(message, optional, tag = "1")]
        pub source: ::core::option::Option<super::Source>,
        #[prost(string, tag = "2")]
        pub comment: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "3")]
        pub name: ::core::option::Option<super::Reference>,
        #[prost(uint32, tag = "4")]
        pub value: u32,
        #[prost(uint32, tag = "5")]
        pub r#type: u32
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Style {
    #[prost(message, optional, tag = "1")]
    pub parent: ::core::option::Option<Reference>,
    #[prost(message, optional, tag = "2")]
    pub parent_source: ::core::option::Option<Source>,
    #[prost(message, repeated, tag = "3")]
    pub entry: ::prost::alloc::vec::Vec<style::Entry>
}

pub mod style {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Entry {
        #[prost(message, optional, tag = "1")]
        pub source: ::core::option::Option<super::Source>,
        #[prost(string, tag = "2")]
        pub comment: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "3")]
        pub key: ::core::option::Option<super::Reference>,
        #[prost(message, optional, tag = "4")]
        pub item: ::core::option::Option<super::Item>
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Styleable {
    #[prost(message, repeated, tag = "1")]
    pub entry: ::prost::alloc::vec::Vec<styleable::Entry>
}

pub mod styleable {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Entry {
        #[prost(message, optional, tag = "1")]
        pub source: ::core::option::Option<super::Source>,
        #[prost(string, tag = "2")]
        pub comment: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "3")]
        pub attr: ::core::option::Option<super::Reference>
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Array {
    #[prost(message, repeated, tag = "1")]
    pub element: ::prost::alloc::vec::Vec<array::Element>
}

pub mod array {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Element {
        #[prost(message, optional, tag = "1")]
        pub source: ::core::option::Option<super::Source>,
        #[prost(string, tag = "2")]
        pub comment: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "3")]
        pub item: ::core::option::Option<super::Item>
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Plural {
    #[prost(message, repeated, tag = "1")]
    pub entry: ::prost::alloc::vec::Vec<plural::Entry>
}

pub mod plural {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Arity {
        Zero = 0,
        One = 1,
        Two = 2,
        Few = 3,
        Many = 4,
        Other = 5
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Entry {
        #[prost(message, optional, tag = "1")]
        pub source: ::core::option::Option<super::Source>,
        #[prost(string, tag = "2")]
        pub comment: ::prost::alloc::string::String,
        #[prost(enumeration = "Arity", tag = "3")]
        pub arity: i32,
        #[prost(message, optional, tag = "4")]
        pub item: ::core::option::Option<super::Item>
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XmlNode {
    #[prost(oneof = "xml_node::Node", tags = "1, 2")]
    pub node: ::core::option::Option<xml_node::Node>,
    #[prost(message, optional, tag = "3")]
    pub source: ::core::option::Option<SourcePosition>
}

pub mod xml_node {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Node {
        #[prost(message, tag = "1")]
        Element(super::XmlElement),
        #[prost(string, tag = "2")]
        Text(::prost::alloc::string::String)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XmlElement {
    #[prost(message, repeated, tag = "1")]
    pub namespace_declaration: ::prost::alloc::vec::Vec<XmlNamespace>,
    #[prost(string, tag = "2")]
    pub namespace_uri: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "4")]
    pub attribute: ::prost::alloc::vec::Vec<XmlAttribute>,
    #[prost(message, repeated, tag = "5")]
    pub child: ::prost::alloc::vec::Vec<XmlNode>
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XmlNamespace {
    #[prost(string, tag = "1")]
    pub prefix: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub uri: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub source: ::core::option::Option<SourcePosition>
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XmlAttribute {
    #[prost(string, tag = "1")]
    pub namespace_uri: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub value: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub source: ::core::option::Option<SourcePosition>,
    #[prost(uint32, tag = "5")]
    pub resource_id: u32,
    #[prost(message, optional, tag = "6")]
    pub compiled_item: ::core::option::Option<Item>
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MacroBody {
    #[prost(string, tag = "1")]
    pub raw_string: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub style_string: ::core::option::Option<StyleString>,
    #[prost(message, repeated, tag = "3")]
    pub untranslatable_sections: ::prost::alloc::vec::Vec<UntranslatableSection>,
    #[prost(message, repeated, tag = "4")]
    pub namespace_stack: ::prost::alloc::vec::Vec<NamespaceAlias>,
    #[prost(message, optional, tag = "5")]
    pub source: ::core::option::Option<Source>
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamespaceAlias {
    #[prost(string, tag = "1")]
    pub prefix: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub package_name: ::prost::alloc::string::String,
    #[prost(bool, tag = "3")]
    pub is_private: bool
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StyleString {
    #[prost(string, tag = "1")]
    pub str: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub spans: ::prost::alloc::vec::Vec<style_string::Span>
}

pub mod style_string {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Span {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        #[prost(uint32, tag = "2")]
        pub start_index: u32,
        #[prost(uint32, tag = "3")]
        pub end_index: u32
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UntranslatableSection {
    #[prost(uint64, tag = "1")]
    pub start_index: u64,
    #[prost(uint64, tag = "2")]
    pub end_index: u64
}

/// Device qualifiers. Every enum starts with an unset value so an empty
/// message is the default configuration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Configuration {
    #[prost(uint32, tag = "1")]
    pub mcc: u32,
    #[prost(uint32, tag = "2")]
    pub mnc: u32,
    #[prost(string, tag = "3")]
    pub locale: ::prost::alloc::string::String,
    #[prost(enumeration = "configuration::LayoutDirection", tag = "4")]
    pub layout_direction: i32,
    #[prost(uint32, tag = "5")]
    pub screen_width: u32,
    #[prost(uint32, tag = "6")]
    pub screen_height: u32,
    #[prost(uint32, tag = "7")]
    pub screen_width_dp: u32,
    #[prost(uint32, tag = "8")]
    pub screen_height_dp: u32,
    #[prost(uint32, tag = "9")]
    pub smallest_screen_width_dp: u32,
    #[prost(enumeration = "configuration::ScreenLayoutSize", tag = "10")]
    pub screen_layout_size: i32,
    #[prost(enumeration = "configuration::ScreenLayoutLong", tag = "11")]
    pub screen_layout_long: i32,
    #[prost(enumeration = "configuration::ScreenRound", tag = "12")]
    pub screen_round: i32,
    #[prost(enumeration = "configuration::Orientation", tag = "15")]
    pub orientation: i32,
    #[prost(enumeration = "configuration::UiModeType", tag = "16")]
    pub ui_mode_type: i32,
    #[prost(enumeration = "configuration::UiModeNight", tag = "17")]
    pub ui_mode_night: i32,
    #[prost(uint32, tag = "18")]
    pub density: u32,
    #[prost(enumeration = "configuration::Touchscreen", tag = "19")]
    pub touchscreen: i32,
    #[prost(enumeration = "configuration::KeysHidden", tag = "20")]
    pub keys_hidden: i32,
    #[prost(enumeration = "configuration::Keyboard", tag = "21")]
    pub keyboard: i32,
    #[prost(enumeration = "configuration::NavHidden", tag = "22")]
    pub nav_hidden: i32,
    #[prost(enumeration = "configuration::Navigation", tag = "23")]
    pub navigation: i32,
    #[prost(uint32, tag = "24")]
    pub sdk_version: u32,
    #[prost(string, tag = "25")]
    pub product: ::prost::alloc::string::String
}

pub mod configuration {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum LayoutDirection {
        Unset = 0,
        Ltr = 1,
        Rtl = 2
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ScreenLayoutSize {
        Unset = 0,
        Small = 1,
        Normal = 2,
        Large = 3,
        Xlarge = 4
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ScreenLayoutLong {
        Unset = 0,
        Long = 1,
        Notlong = 2
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ScreenRound {
        Unset = 0,
        Round = 1,
        Notround = 2
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Orientation {
        Unset = 0,
        Port = 1,
        Land = 2,
        Square = 3
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum UiModeType {
        Unset = 0,
        Normal = 1,
        Desk = 2,
        Car = 3,
        Television = 4,
        Appliance = 5,
        Watch = 6,
        Vrheadset = 7
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum UiModeNight {
        Unset = 0,
        Night = 1,
        Notnight = 2
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Touchscreen {
        Unset = 0,
        Notouch = 1,
        Stylus = 2,
        Finger = 3
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum KeysHidden {
        Unset = 0,
        Keysexposed = 1,
        Keyshidden = 2,
        Keyssoft = 3
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Keyboard {
        Unset = 0,
        Nokeys = 1,
        Qwerty = 2,
        Twelvekey = 3
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum NavHidden {
        Unset = 0,
        Navexposed = 1,
        Navhidden = 2
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Navigation {
        Unset = 0,
        Nonav = 1,
        Dpad = 2,
        Trackball = 3,
        Wheel = 4
    }
}
