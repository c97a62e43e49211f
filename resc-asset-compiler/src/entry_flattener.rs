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

// Writes resource values as the entries of a RES_TABLE_TYPE_TYPE chunk.
// Simple values become a ResTable_entry followed by a Res_value, compound
// values a ResTable_map_entry followed by its ResTable_map list.
use deku::DekuContainerWrite;
use log::trace;
use resc_common::*;

use crate::{
    resource_external_types::*,
    resource_internal_types::*,
    string_pool::{PendingPatches, SortedStringPool, StringPoolBuilder, LOW_PRIORITY}
};

/// Accumulates entries and the global value string pool they refer to.
#[derive(Debug, Default)]
pub struct EntryFlattener {
    buffer: Vec<u8>,
    value_pool: StringPoolBuilder,
    patches: PendingPatches
}

// A value as it will appear in a Res_value, before string indices are known
enum MapValue<'a> {
    Value(ResValue),
    String(&'a str)
}

impl<'a> From<FlatItem<'a>> for MapValue<'a> {
    fn from(item: FlatItem<'a>) -> Self {
        match item {
            FlatItem::Value(value) => MapValue::Value(value),
            FlatItem::PooledString(string) => MapValue::String(string)
        }
    }
}

fn int_value(data: u32) -> MapValue<'static> {
    MapValue::Value(ResValue::new(ResValueType::IntDec, data))
}

fn required_id(reference: &Reference) -> Result<u32> {
    reference
        .id
        .map(|id| id.0)
        .ok_or_else(|| ResError::UnresolvedReference(reference.describe()))
}

impl EntryFlattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far. Entry offsets are relative to the start.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Appends one entry whose key is `key_index` in the package's key
    /// string pool. Returns the entry's offset.
    pub fn flatten_entry(&mut self, key_index: u32, value: &Value, public: bool) -> Result<usize> {
        let mut flags = 0;
        if public {
            flags |= ENTRY_FLAG_PUBLIC;
        }
        if value.weak {
            flags |= ENTRY_FLAG_WEAK;
        }

        let offset = self.buffer.len();
        match &value.kind {
            ValueKind::Item(item) => {
                self.buffer.extend(
                    ResTableEntry {
                        size: ResTableEntry::SIZE,
                        flags,
                        key: key_index
                    }
                    .to_bytes()?
                );
                self.write_value(item.flatten().into())?;
            }
            ValueKind::Compound(compound) => {
                let (parent, map) = map_entries(compound)?;
                self.buffer.extend(
                    ResTableMapEntry {
                        size: ResTableMapEntry::SIZE,
                        flags: flags | ENTRY_FLAG_COMPLEX,
                        key: key_index,
                        parent,
                        count: map.len() as u32
                    }
                    .to_bytes()?
                );
                for (name, value) in map {
                    self.buffer.extend(name.to_le_bytes());
                    self.write_value(value)?;
                }
            }
        }
        trace!("flattened entry {} at offset {}", key_index, offset);
        Ok(offset)
    }

    fn write_value(&mut self, value: MapValue) -> Result<()> {
        match value {
            MapValue::Value(value) => self.buffer.extend(value.to_bytes()?),
            MapValue::String(string) => {
                let string = self.value_pool.make_ref(string, LOW_PRIORITY);
                self.patches
                    .record(string, self.buffer.len() + ResValue::DATA_OFFSET);
                self.buffer
                    .extend(ResValue::new(ResValueType::String, 0).to_bytes()?);
            }
        }
        Ok(())
    }

    /// Sorts the value pool and patches every string reference. Returns the
    /// entry bytes and the pool they index into.
    pub fn finish(self) -> Result<(Vec<u8>, SortedStringPool)> {
        let EntryFlattener {
            mut buffer,
            value_pool,
            patches
        } = self;
        let pool = value_pool.sort();
        patches.apply(&mut buffer, &pool)?;
        Ok((buffer, pool))
    }
}

// The parent id and the (name, value) list of a compound value
fn map_entries(compound: &CompoundValue) -> Result<(u32, Vec<(u32, MapValue<'_>)>)> {
    let mut parent = 0;
    let mut map = vec![];
    match compound {
        CompoundValue::Attribute(attribute) => {
            map.push((ATTR_TYPE, int_value(attribute.format_flags)));
            if attribute.min_int != i32::MIN {
                map.push((ATTR_MIN, int_value(attribute.min_int as u32)));
            }
            if attribute.max_int != i32::MAX {
                map.push((ATTR_MAX, int_value(attribute.max_int as u32)));
            }
            let mut symbols = attribute
                .symbols
                .iter()
                .map(|symbol| {
                    let data_type = ResValueType::from_u8(symbol.data_type)
                        .ok_or(ResError::InvalidPrimitiveType(symbol.data_type))?;
                    Ok((
                        required_id(&symbol.name)?,
                        MapValue::Value(ResValue::new(data_type, symbol.value))
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            symbols.sort_by_key(|(id, _)| *id);
            map.extend(symbols);
        }
        CompoundValue::Style(style) => {
            if let Some(reference) = &style.parent {
                parent = required_id(reference)?;
            }
            let mut entries = style
                .entries
                .iter()
                .map(|entry| Ok((required_id(&entry.key)?, entry.item.flatten().into())))
                .collect::<Result<Vec<_>>>()?;
            entries.sort_by_key(|(id, _)| *id);
            map.extend(entries);
        }
        CompoundValue::Styleable(styleable) => {
            for reference in &styleable.entries {
                map.push((
                    required_id(reference)?,
                    MapValue::Value(ResValue::new(ResValueType::Null, DATA_NULL_UNDEFINED))
                ));
            }
        }
        CompoundValue::Array(array) => {
            for (i, element) in array.elements.iter().enumerate() {
                map.push((make_array_index(i as u32), element.flatten().into()));
            }
        }
        CompoundValue::Plural(plural) => {
            for arity in PluralArity::ALL {
                if let Some(item) = plural.get(arity) {
                    map.push((arity.map_name(), item.flatten().into()));
                }
            }
        }
        CompoundValue::Macro(_) => return Err(ResError::ValueNotFlattenable("macro"))
    }
    Ok((parent, map))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    fn attr_ref(id: u32) -> Reference {
        Reference::from_id(ResourceId(id))
    }

    #[test]
    fn simple_entries_share_the_value_pool() {
        let mut flattener = EntryFlattener::new();
        let first = flattener
            .flatten_entry(0, &Value::item(Item::String(String::from("hello"))), true)
            .unwrap();
        let second = flattener
            .flatten_entry(1, &Value::item(Item::Primitive(Primitive::int(7))), false)
            .unwrap();
        let third = flattener
            .flatten_entry(2, &Value::item(Item::String(String::from("hello"))), false)
            .unwrap();
        assert_eq!((first, second, third), (0, 16, 32));

        let (bytes, pool) = flattener.finish().unwrap();
        assert_eq!(pool.strings(), &[String::from("hello")]);
        assert_eq!(u16_at(&bytes, 2), ENTRY_FLAG_PUBLIC);
        assert_eq!(bytes[8 + 3], ResValueType::String.as_u8());
        assert_eq!(u32_at(&bytes, 12), 0);
        assert_eq!(u32_at(&bytes, 16 + 12), 7);
        assert_eq!(u32_at(&bytes, 32 + 4), 2);
    }

    #[test]
    fn style_entries_are_sorted_by_attribute_id() {
        let entry = |id: u32, value: i32| StyleEntry {
            source: Source::default(),
            comment: String::new(),
            key: attr_ref(id),
            item: Item::Primitive(Primitive::int(value))
        };
        let style = Style {
            parent: Some(attr_ref(0x7f0b_0001)),
            entries: vec![entry(0x7f01_0002, 2), entry(0x0101_0098, 1)],
            ..Default::default()
        };
        let mut flattener = EntryFlattener::new();
        flattener
            .flatten_entry(3, &Value::compound(CompoundValue::Style(style)), false)
            .unwrap();
        let (bytes, _) = flattener.finish().unwrap();

        assert_eq!(bytes.len(), 16 + 2 * ResTableMap::SIZE);
        assert_eq!(u16_at(&bytes, 2), ENTRY_FLAG_COMPLEX);
        assert_eq!(u32_at(&bytes, 8), 0x7f0b_0001);
        assert_eq!(u32_at(&bytes, 12), 2);
        assert_eq!(u32_at(&bytes, 16), 0x0101_0098);
        assert_eq!(u32_at(&bytes, 16 + ResTableMap::VALUE_DATA_OFFSET), 1);
        assert_eq!(u32_at(&bytes, 28), 0x7f01_0002);
    }

    #[test]
    fn attribute_bounds_are_only_written_when_set() {
        let attribute = Attribute {
            format_flags: ATTR_FORMAT_INTEGER,
            min_int: 0,
            ..Default::default()
        };
        let mut flattener = EntryFlattener::new();
        flattener
            .flatten_entry(0, &Value::compound(CompoundValue::Attribute(attribute)), false)
            .unwrap();
        let (bytes, _) = flattener.finish().unwrap();
        assert_eq!(u32_at(&bytes, 12), 2);
        assert_eq!(u32_at(&bytes, 16), ATTR_TYPE);
        assert_eq!(u32_at(&bytes, 24), ATTR_FORMAT_INTEGER);
        assert_eq!(u32_at(&bytes, 28), ATTR_MIN);
    }

    #[test]
    fn arrays_and_plurals_use_their_map_names() {
        let array = Array {
            elements: vec![Item::String(String::from("a")), Item::String(String::from("b"))]
        };
        let mut plural = Plural::default();
        plural.set(PluralArity::Other, Item::String(String::from("many")));
        plural.set(PluralArity::One, Item::String(String::from("one")));

        let mut flattener = EntryFlattener::new();
        flattener
            .flatten_entry(0, &Value::compound(CompoundValue::Array(array)), false)
            .unwrap();
        let plural_offset = flattener
            .flatten_entry(1, &Value::compound(CompoundValue::Plural(plural)), false)
            .unwrap();
        let (bytes, pool) = flattener.finish().unwrap();

        assert_eq!(u32_at(&bytes, 16), make_array_index(0));
        assert_eq!(u32_at(&bytes, 28), make_array_index(1));
        assert_eq!(u32_at(&bytes, plural_offset + 16), ATTR_ONE);
        assert_eq!(u32_at(&bytes, plural_offset + 28), ATTR_OTHER);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn unflattenable_values_are_errors() {
        let mut flattener = EntryFlattener::new();
        let result = flattener.flatten_entry(
            0,
            &Value::compound(CompoundValue::Macro(Macro::default())),
            false
        );
        assert!(matches!(result, Err(ResError::ValueNotFlattenable("macro"))));

        let styleable = Styleable {
            entries: vec![Reference::from_name(ResourceName::new("", "attr", "missing"))]
        };
        let result =
            flattener.flatten_entry(0, &Value::compound(CompoundValue::Styleable(styleable)), false);
        assert!(matches!(result, Err(ResError::UnresolvedReference(_))));
    }

    #[test]
    fn unknown_symbol_types_are_rejected() {
        let attribute = Attribute {
            format_flags: ATTR_FORMAT_ENUM,
            symbols: vec![Symbol {
                name: attr_ref(0x7f0c_0001),
                value: 1,
                data_type: 0x99,
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut flattener = EntryFlattener::new();
        let result =
            flattener.flatten_entry(0, &Value::compound(CompoundValue::Attribute(attribute)), false);
        assert!(matches!(result, Err(ResError::InvalidPrimitiveType(0x99))));
    }
}
