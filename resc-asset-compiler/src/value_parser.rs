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

// Turns attribute text such as "@string/app_name", "#ff0000" or "16dp" into
// typed values.
use resc_common::*;

use crate::{resource_external_types::*, resource_internal_types::*};

// Res_value complex encoding
const COMPLEX_UNIT_SHIFT: u32 = 0;
const COMPLEX_RADIX_SHIFT: u32 = 4;
const COMPLEX_MANTISSA_SHIFT: u32 = 8;
const COMPLEX_MANTISSA_MASK: u32 = 0x00FF_FFFF;
const COMPLEX_RADIX_23P0: u32 = 0;
const COMPLEX_RADIX_16P7: u32 = 1;
const COMPLEX_RADIX_8P15: u32 = 2;
const COMPLEX_RADIX_0P23: u32 = 3;

const DIMENSION_UNITS: [(&str, u32); 7] = [
    ("px", 0),
    ("dip", 1),
    ("dp", 1),
    ("sp", 2),
    ("pt", 3),
    ("in", 4),
    ("mm", 5)
];
const FRACTION_UNITS: [(&str, u32); 2] = [("%p", 1), ("%", 0)];

/// A reference parsed from text, plus whether it was `@+type/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub reference: Reference,
    pub create: bool
}

/// Parses `@[+][*][package:]type/name` or `?[*][package:][attr/]name`.
/// Returns `Ok(None)` when the text is not a reference at all.
pub fn parse_reference(text: &str) -> Result<Option<ParsedReference>> {
    let text = text.trim();
    let malformed = || ResError::ReferenceAttributeParsingFailed(text.to_string());

    if let Some(rest) = text.strip_prefix('@') {
        let (create, rest) = match rest.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, rest)
        };
        let (private, rest) = match rest.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, rest)
        };
        let name = ResourceName::parse(rest).map_err(|_| malformed())?;
        if create && name.type_name != "id" {
            // Only ids can be declared inline
            return Err(malformed());
        }
        return Ok(Some(ParsedReference {
            reference: Reference {
                name: Some(name),
                private,
                ..Default::default()
            },
            create
        }));
    }

    if let Some(rest) = text.strip_prefix('?') {
        let (private, rest) = match rest.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, rest)
        };
        let (package, rest) = match rest.split_once(':') {
            Some((package, rest)) => (package, rest),
            None => ("", rest)
        };
        let entry = match rest.split_once('/') {
            Some(("attr", entry)) => entry,
            Some(_) => return Err(malformed()),
            None => rest
        };
        if entry.is_empty() {
            return Err(malformed());
        }
        return Ok(Some(ParsedReference {
            reference: Reference {
                name: Some(ResourceName::new(package, "attr", entry)),
                reference_type: ReferenceType::Attribute,
                private,
                ..Default::default()
            },
            create: false
        }));
    }

    Ok(None)
}

/// `@null` and `@empty`.
pub fn try_parse_null_or_empty(text: &str) -> Option<Item> {
    match text.trim() {
        "@null" => Some(Item::null()),
        "@empty" => Some(Item::empty()),
        _ => None
    }
}

pub fn try_parse_bool(text: &str) -> Option<Primitive> {
    match text.trim() {
        "true" | "TRUE" | "True" => Some(Primitive::boolean(true)),
        "false" | "FALSE" | "False" => Some(Primitive::boolean(false)),
        _ => None
    }
}

/// Decimal (signed 32-bit) or `0x` hexadecimal (unsigned 32-bit).
pub fn try_parse_int(text: &str) -> Option<Primitive> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok().map(|data| Primitive {
            data_type: ResValueType::IntHex,
            data
        });
    }
    text.parse::<i32>().ok().map(Primitive::int)
}

/// `#rgb`, `#argb`, `#rrggbb` or `#aarrggbb`.
pub fn try_parse_color(text: &str) -> Option<Primitive> {
    let digits = text.trim().strip_prefix('#')?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    // Expands a 4-bit channel to 8 bits
    let nibble = |shift: u32| ((value >> shift) & 0xF) * 0x11;
    let (data_type, data) = match digits.len() {
        3 => (
            ResValueType::IntColorRgb4,
            0xFF00_0000 | (nibble(8) << 16) | (nibble(4) << 8) | nibble(0)
        ),
        4 => (
            ResValueType::IntColorArgb4,
            (nibble(12) << 24) | (nibble(8) << 16) | (nibble(4) << 8) | nibble(0)
        ),
        6 => (ResValueType::IntColorRgb8, 0xFF00_0000 | value),
        8 => (ResValueType::IntColorArgb8, value),
        _ => return None
    };
    Some(Primitive { data_type, data })
}

pub fn try_parse_float(text: &str) -> Option<Primitive> {
    let value = text.trim().parse::<f32>().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(Primitive {
        data_type: ResValueType::Float,
        data: value.to_bits()
    })
}

// Packs a value into the 24-bit mantissa + radix form used by dimensions and
// fractions, picking the radix that keeps the most precision
fn encode_complex(value: f32, unit: u32) -> u32 {
    let negative = value < 0.0;
    let magnitude = value.abs() as f64;
    let bits = (magnitude * (1u64 << 23) as f64 + 0.5) as u64;

    let (radix, shift) = if bits & 0x7F_FFFF == 0 {
        (COMPLEX_RADIX_23P0, 23)
    } else if bits & 0xFFFF_FFFF_FF80_0000 == 0 {
        (COMPLEX_RADIX_0P23, 0)
    } else if bits & 0xFFFF_FFFF_8000_0000 == 0 {
        (COMPLEX_RADIX_8P15, 8)
    } else if bits & 0xFFFF_FF80_0000_0000 == 0 {
        (COMPLEX_RADIX_16P7, 16)
    } else {
        (COMPLEX_RADIX_23P0, 23)
    };
    let mut mantissa = ((bits >> shift) as u32) & COMPLEX_MANTISSA_MASK;
    if negative {
        mantissa = mantissa.wrapping_neg() & COMPLEX_MANTISSA_MASK;
    }
    (radix << COMPLEX_RADIX_SHIFT) | (mantissa << COMPLEX_MANTISSA_SHIFT) | (unit << COMPLEX_UNIT_SHIFT)
}

fn split_unit(text: &str, units: &[(&str, u32)]) -> Option<(f32, u32)> {
    units.iter().find_map(|(suffix, unit)| {
        let number = text.strip_suffix(*suffix)?;
        number.trim().parse::<f32>().ok().map(|value| (value, *unit))
    })
}

/// eg. `16dp`, `-1.5sp`
pub fn try_parse_dimension(text: &str) -> Option<Primitive> {
    let (value, unit) = split_unit(text.trim(), &DIMENSION_UNITS)?;
    Some(Primitive {
        data_type: ResValueType::Dimension,
        data: encode_complex(value, unit)
    })
}

/// eg. `50%`, `25%p`
pub fn try_parse_fraction(text: &str) -> Option<Primitive> {
    let (value, unit) = split_unit(text.trim(), &FRACTION_UNITS)?;
    Some(Primitive {
        data_type: ResValueType::Fraction,
        data: encode_complex(value / 100.0, unit)
    })
}

/// Tries each format allowed by `format_flags` in turn. Strings are left to
/// the caller, since whether a string is acceptable depends on context.
///
/// `symbol` resolves enum names for attributes with `ATTR_FORMAT_ENUM`.
pub fn try_parse_item_for_format(
    text: &str,
    format_flags: u32,
    symbol: impl Fn(&str) -> Option<u32>
) -> Option<Item> {
    if let Some(item) = try_parse_null_or_empty(text) {
        return Some(item);
    }
    if format_flags & ATTR_FORMAT_ENUM != 0 {
        if let Some(value) = symbol(text.trim()) {
            return Some(Item::Primitive(Primitive::int(value as i32)));
        }
    }
    if format_flags & ATTR_FORMAT_BOOLEAN != 0 {
        if let Some(value) = try_parse_bool(text) {
            return Some(Item::Primitive(value));
        }
    }
    if format_flags & ATTR_FORMAT_INTEGER != 0 {
        if let Some(value) = try_parse_int(text) {
            return Some(Item::Primitive(value));
        }
    }
    if format_flags & ATTR_FORMAT_COLOR != 0 {
        if let Some(value) = try_parse_color(text) {
            return Some(Item::Primitive(value));
        }
    }
    if format_flags & ATTR_FORMAT_DIMENSION != 0 {
        if let Some(value) = try_parse_dimension(text) {
            return Some(Item::Primitive(value));
        }
    }
    if format_flags & ATTR_FORMAT_FRACTION != 0 {
        if let Some(value) = try_parse_fraction(text) {
            return Some(Item::Primitive(value));
        }
    }
    if format_flags & ATTR_FORMAT_FLOAT != 0 {
        if let Some(value) = try_parse_float(text) {
            return Some(Item::Primitive(value));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_references() {
        let parsed = parse_reference("@android:string/ok").unwrap().unwrap();
        assert_eq!(
            parsed.reference.name,
            Some(ResourceName::new("android", "string", "ok"))
        );
        assert!(!parsed.create);

        let parsed = parse_reference("@+id/button").unwrap().unwrap();
        assert!(parsed.create);
        assert_eq!(parsed.reference.name.unwrap().to_string(), "id/button");

        let parsed = parse_reference("@*android:drawable/hidden").unwrap().unwrap();
        assert!(parsed.reference.private);

        assert!(parse_reference("@+string/nope").is_err());
        assert!(parse_reference("@string").is_err());
        assert_eq!(parse_reference("plain text").unwrap(), None);
    }

    #[test]
    fn attribute_references() {
        let parsed = parse_reference("?android:attr/textColorPrimary").unwrap().unwrap();
        assert_eq!(parsed.reference.reference_type, ReferenceType::Attribute);
        assert_eq!(
            parsed.reference.name,
            Some(ResourceName::new("android", "attr", "textColorPrimary"))
        );
        let short = parse_reference("?colorAccent").unwrap().unwrap();
        assert_eq!(short.reference.name, Some(ResourceName::new("", "attr", "colorAccent")));
        assert!(parse_reference("?style/nope").is_err());
    }

    #[test]
    fn integers_and_booleans() {
        assert_eq!(try_parse_int("-3"), Some(Primitive::int(-3)));
        assert_eq!(
            try_parse_int("0x7f"),
            Some(Primitive {
                data_type: ResValueType::IntHex,
                data: 0x7f
            })
        );
        assert_eq!(try_parse_int("seven"), None);
        assert_eq!(try_parse_bool("true").unwrap().data, 0xFFFF_FFFF);
        assert_eq!(try_parse_bool("false").unwrap().data, 0);
    }

    #[test]
    fn colors() {
        let rgb4 = try_parse_color("#f80").unwrap();
        assert_eq!(rgb4.data_type, ResValueType::IntColorRgb4);
        assert_eq!(rgb4.data, 0xFFFF_8800);
        let argb4 = try_parse_color("#8f80").unwrap();
        assert_eq!(argb4.data, 0x88FF_8800);
        assert_eq!(try_parse_color("#123456").unwrap().data, 0xFF12_3456);
        assert_eq!(try_parse_color("#80123456").unwrap().data, 0x8012_3456);
        assert_eq!(try_parse_color("#12345"), None);
        assert_eq!(try_parse_color("123456"), None);
    }

    #[test]
    fn dimensions() {
        assert_eq!(try_parse_dimension("16dp").unwrap().data, 0x0000_1001);
        assert_eq!(try_parse_dimension("16dip").unwrap().data, 0x0000_1001);
        assert_eq!(try_parse_dimension("12sp").unwrap().data, 0x0000_0C02);
        assert_eq!(try_parse_dimension("0px").unwrap().data, 0);
        // 0.5px: mantissa 0x400000 with radix 0p23
        assert_eq!(try_parse_dimension("0.5px").unwrap().data, 0x4000_0030);
        assert_eq!(try_parse_dimension("16"), None);
    }

    #[test]
    fn fractions() {
        let half = try_parse_fraction("50%").unwrap();
        assert_eq!(half.data_type, ResValueType::Fraction);
        assert_eq!(half.data, 0x4000_0030);
        assert_eq!(try_parse_fraction("50%p").unwrap().data, 0x4000_0031);
    }

    #[test]
    fn format_driven_parsing() {
        let symbols = |name: &str| (name == "gone").then_some(2);
        assert_eq!(
            try_parse_item_for_format("gone", ATTR_FORMAT_ENUM, symbols),
            Some(Item::Primitive(Primitive::int(2)))
        );
        assert_eq!(
            try_parse_item_for_format("true", ATTR_FORMAT_BOOLEAN, |_| None),
            Some(Item::Primitive(Primitive::boolean(true)))
        );
        assert_eq!(try_parse_item_for_format("true", ATTR_FORMAT_INTEGER, |_| None), None);
        assert_eq!(
            try_parse_item_for_format("@null", ATTR_FORMAT_REFERENCE, |_| None),
            Some(Item::null())
        );
    }
}
