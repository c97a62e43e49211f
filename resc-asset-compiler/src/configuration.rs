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

// The device configuration a resource value applies to, eg. `values-en-rUS-land`.
// Matching configurations against a device is not done here, this only carries
// the qualifiers and converts them to and from the binary ResTable_config.
use std::{fmt, io::Cursor};

use byteorder::{LittleEndian, ReadBytesExt};
use deku::DekuContainerWrite;
use resc_common::*;

use crate::resource_external_types::*;

// Each qualifier enum is listed in the same order as the intermediate schema,
// so `ordinal()` doubles as its message value.
macro_rules! qualifier {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub enum $name {
            #[default]
            Unset,
            $($variant),+
        }

        impl $name {
            const VARIANTS: &'static [$name] = &[$name::Unset, $($name::$variant),+];

            pub fn ordinal(self) -> u8 {
                self as u8
            }

            pub fn from_ordinal(ordinal: u8) -> Option<Self> {
                Self::VARIANTS.get(ordinal as usize).copied()
            }
        }
    };
}

qualifier!(LayoutDirection { Ltr, Rtl });
qualifier!(ScreenLayoutSize { Small, Normal, Large, XLarge });
qualifier!(ScreenLayoutLong { Long, NotLong });
qualifier!(ScreenRound { Round, NotRound });
qualifier!(Orientation { Port, Land, Square });
qualifier!(UiModeType { Normal, Desk, Car, Television, Appliance, Watch, VrHeadset });
qualifier!(UiModeNight { Night, NotNight });
qualifier!(Touchscreen { NoTouch, Stylus, Finger });
qualifier!(KeysHidden { KeysExposed, KeysHidden, KeysSoft });
qualifier!(Keyboard { NoKeys, Qwerty, TwelveKey });
qualifier!(NavHidden { NavExposed, NavHidden });
qualifier!(Navigation { NoNav, Dpad, Trackball, Wheel });

// Binary values that do not follow the ordinal order
fn long_to_bits(value: ScreenLayoutLong) -> u8 {
    match value {
        ScreenLayoutLong::Unset => 0,
        ScreenLayoutLong::NotLong => 1,
        ScreenLayoutLong::Long => 2
    }
}

fn long_from_bits(bits: u8) -> ScreenLayoutLong {
    match bits {
        1 => ScreenLayoutLong::NotLong,
        2 => ScreenLayoutLong::Long,
        _ => ScreenLayoutLong::Unset
    }
}

fn night_to_bits(value: UiModeNight) -> u8 {
    match value {
        UiModeNight::Unset => 0,
        UiModeNight::NotNight => 1,
        UiModeNight::Night => 2
    }
}

fn night_from_bits(bits: u8) -> UiModeNight {
    match bits {
        1 => UiModeNight::NotNight,
        2 => UiModeNight::Night,
        _ => UiModeNight::Unset
    }
}

fn round_to_bits(value: ScreenRound) -> u8 {
    match value {
        ScreenRound::Unset => 0,
        ScreenRound::NotRound => 1,
        ScreenRound::Round => 2
    }
}

fn round_from_bits(bits: u8) -> ScreenRound {
    match bits {
        1 => ScreenRound::NotRound,
        2 => ScreenRound::Round,
        _ => ScreenRound::Unset
    }
}

pub const DENSITY_DEFAULT: u16 = 0;
pub const DENSITY_LOW: u16 = 120;
pub const DENSITY_MEDIUM: u16 = 160;
pub const DENSITY_TV: u16 = 213;
pub const DENSITY_HIGH: u16 = 240;
pub const DENSITY_XHIGH: u16 = 320;
pub const DENSITY_XXHIGH: u16 = 480;
pub const DENSITY_XXXHIGH: u16 = 640;
pub const DENSITY_ANY: u16 = 0xfffe;
pub const DENSITY_NONE: u16 = 0xffff;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Configuration {
    pub mcc: u16,
    pub mnc: u16,
    /// BCP-47 `ll` or `ll-RR`, eg. `en-US`, `fil-PH`, `es-419`. Empty for any.
    pub locale: String,
    pub layout_direction: LayoutDirection,
    pub screen_width: u16,
    pub screen_height: u16,
    pub screen_width_dp: u16,
    pub screen_height_dp: u16,
    pub smallest_screen_width_dp: u16,
    pub screen_layout_size: ScreenLayoutSize,
    pub screen_layout_long: ScreenLayoutLong,
    pub screen_round: ScreenRound,
    pub orientation: Orientation,
    pub ui_mode_type: UiModeType,
    pub ui_mode_night: UiModeNight,
    pub density: u16,
    pub touchscreen: Touchscreen,
    pub keys_hidden: KeysHidden,
    pub keyboard: Keyboard,
    pub nav_hidden: NavHidden,
    pub navigation: Navigation,
    pub sdk_version: u16,
    /// Only meaningful at compile time, never written to a binary table
    pub product: String
}

impl Configuration {
    pub fn is_default(&self) -> bool {
        *self == Configuration::default()
    }

    /// Encodes to a 64-byte `ResTable_config`.
    pub fn to_res_table_config(&self) -> Result<ResTableConfig> {
        let (language, country) = pack_locale(&self.locale)?;
        Ok(ResTableConfig {
            size: ResTableConfig::SIZE as u32,
            mcc: self.mcc,
            mnc: self.mnc,
            language,
            country,
            orientation: self.orientation.ordinal(),
            touchscreen: self.touchscreen.ordinal(),
            density: self.density,
            keyboard: self.keyboard.ordinal(),
            navigation: self.navigation.ordinal(),
            input_flags: self.keys_hidden.ordinal()
                | (self.nav_hidden.ordinal() << SHIFT_NAVHIDDEN),
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            sdk_version: self.sdk_version,
            screen_layout: self.screen_layout_size.ordinal()
                | (long_to_bits(self.screen_layout_long) << SHIFT_SCREENLONG)
                | (self.layout_direction.ordinal() << SHIFT_LAYOUTDIR),
            ui_mode: self.ui_mode_type.ordinal()
                | (night_to_bits(self.ui_mode_night) << SHIFT_UI_MODE_NIGHT),
            smallest_screen_width_dp: self.smallest_screen_width_dp,
            screen_width_dp: self.screen_width_dp,
            screen_height_dp: self.screen_height_dp,
            screen_layout2: round_to_bits(self.screen_round),
            ..Default::default()
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_res_table_config()?.to_bytes()?)
    }

    /// Decodes a `ResTable_config`. Shorter, older layouts are accepted and
    /// the missing fields read as unset.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config = read_res_table_config(bytes)?;
        Self::from_res_table_config(&config)
    }

    pub fn from_res_table_config(config: &ResTableConfig) -> Result<Self> {
        fn field<T>(value: Option<T>, name: &str, raw: u8) -> Result<T> {
            value.ok_or_else(|| {
                ResError::MalformedConfiguration(format!("unknown {} value {}", name, raw))
            })
        }

        let keys_hidden = config.input_flags & MASK_KEYSHIDDEN;
        let nav_hidden = (config.input_flags & MASK_NAVHIDDEN) >> SHIFT_NAVHIDDEN;
        let screen_size = config.screen_layout & MASK_SCREENSIZE;
        let layout_dir = (config.screen_layout & MASK_LAYOUTDIR) >> SHIFT_LAYOUTDIR;
        let ui_type = config.ui_mode & MASK_UI_MODE_TYPE;

        Ok(Configuration {
            mcc: config.mcc,
            mnc: config.mnc,
            locale: unpack_locale(config.language, config.country),
            layout_direction: field(
                LayoutDirection::from_ordinal(layout_dir),
                "layout direction",
                layout_dir
            )?,
            screen_width: config.screen_width,
            screen_height: config.screen_height,
            screen_width_dp: config.screen_width_dp,
            screen_height_dp: config.screen_height_dp,
            smallest_screen_width_dp: config.smallest_screen_width_dp,
            screen_layout_size: field(
                ScreenLayoutSize::from_ordinal(screen_size),
                "screen size",
                screen_size
            )?,
            screen_layout_long: long_from_bits(
                (config.screen_layout & MASK_SCREENLONG) >> SHIFT_SCREENLONG
            ),
            screen_round: round_from_bits(config.screen_layout2 & MASK_SCREENROUND),
            orientation: field(
                Orientation::from_ordinal(config.orientation),
                "orientation",
                config.orientation
            )?,
            ui_mode_type: field(UiModeType::from_ordinal(ui_type), "ui mode", ui_type)?,
            ui_mode_night: night_from_bits(
                (config.ui_mode & MASK_UI_MODE_NIGHT) >> SHIFT_UI_MODE_NIGHT
            ),
            density: config.density,
            touchscreen: field(
                Touchscreen::from_ordinal(config.touchscreen),
                "touchscreen",
                config.touchscreen
            )?,
            keys_hidden: field(KeysHidden::from_ordinal(keys_hidden), "keys hidden", keys_hidden)?,
            keyboard: field(
                Keyboard::from_ordinal(config.keyboard),
                "keyboard",
                config.keyboard
            )?,
            nav_hidden: field(NavHidden::from_ordinal(nav_hidden), "nav hidden", nav_hidden)?,
            navigation: field(
                Navigation::from_ordinal(config.navigation),
                "navigation",
                config.navigation
            )?,
            sdk_version: config.sdk_version,
            product: String::new()
        })
    }
}

/// Reads a `ResTable_config` whose first field is its own size.
pub fn read_res_table_config(bytes: &[u8]) -> Result<ResTableConfig> {
    if bytes.len() < 4 {
        return Err(ResError::MalformedConfiguration(String::from(
            "not enough data for a configuration size"
        )));
    }
    let size = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if size < 4 || size > bytes.len() {
        return Err(ResError::MalformedConfiguration(format!(
            "configuration size {} does not fit in {} bytes",
            size,
            bytes.len()
        )));
    }
    // Missing trailing fields read as zero
    let mut padded = [0u8; ResTableConfig::SIZE];
    let copied = size.min(ResTableConfig::SIZE);
    padded[..copied].copy_from_slice(&bytes[..copied]);

    let mut cursor = Cursor::new(&padded[..]);
    let mut config = ResTableConfig {
        size: cursor.read_u32::<LittleEndian>()?,
        mcc: cursor.read_u16::<LittleEndian>()?,
        mnc: cursor.read_u16::<LittleEndian>()?,
        ..Default::default()
    };
    config.language = [cursor.read_u8()?, cursor.read_u8()?];
    config.country = [cursor.read_u8()?, cursor.read_u8()?];
    config.orientation = cursor.read_u8()?;
    config.touchscreen = cursor.read_u8()?;
    config.density = cursor.read_u16::<LittleEndian>()?;
    config.keyboard = cursor.read_u8()?;
    config.navigation = cursor.read_u8()?;
    config.input_flags = cursor.read_u8()?;
    config.grammatical_inflection = cursor.read_u8()?;
    config.screen_width = cursor.read_u16::<LittleEndian>()?;
    config.screen_height = cursor.read_u16::<LittleEndian>()?;
    config.sdk_version = cursor.read_u16::<LittleEndian>()?;
    config.minor_version = cursor.read_u16::<LittleEndian>()?;
    config.screen_layout = cursor.read_u8()?;
    config.ui_mode = cursor.read_u8()?;
    config.smallest_screen_width_dp = cursor.read_u16::<LittleEndian>()?;
    config.screen_width_dp = cursor.read_u16::<LittleEndian>()?;
    config.screen_height_dp = cursor.read_u16::<LittleEndian>()?;
    config.locale_script = padded[36..40].try_into().unwrap_or_default();
    config.locale_variant = padded[40..48].try_into().unwrap_or_default();
    config.screen_layout2 = padded[48];
    config.color_mode = padded[49];
    config.screen_config_pad2 = u16::from_le_bytes([padded[50], padded[51]]);
    config.reserved = padded[52..64].try_into().unwrap_or_default();
    Ok(config)
}

// Two letter codes are stored as-is. Three letter codes are squeezed into two
// bytes, five bits per letter, with the high bit set as a marker.
fn pack_code(code: &str, base: u8) -> [u8; 2] {
    let bytes = code.as_bytes();
    match bytes.len() {
        2 => [bytes[0], bytes[1]],
        3 => {
            let first = bytes[0].wrapping_sub(base) & 0x7f;
            let second = bytes[1].wrapping_sub(base) & 0x7f;
            let third = bytes[2].wrapping_sub(base) & 0x7f;
            [0x80 | (third << 2) | (second >> 3), (second << 5) | first]
        }
        _ => [0, 0]
    }
}

fn unpack_code(packed: [u8; 2], base: u8) -> String {
    if packed[0] & 0x80 != 0 {
        let first = packed[1] & 0x1f;
        let second = ((packed[1] & 0xe0) >> 5) + ((packed[0] & 0x03) << 3);
        let third = (packed[0] & 0x7c) >> 2;
        [first + base, second + base, third + base]
            .iter()
            .map(|&b| b as char)
            .collect()
    } else if packed[0] != 0 {
        [packed[0], packed[1]].iter().map(|&b| b as char).collect()
    } else {
        String::new()
    }
}

fn pack_locale(locale: &str) -> Result<([u8; 2], [u8; 2])> {
    if locale.is_empty() {
        return Ok(([0, 0], [0, 0]));
    }
    let unsupported = || ResError::UnsupportedLocale(locale.to_string());
    let mut parts = locale.split('-');
    let language = parts.next().ok_or_else(unsupported)?;
    let region = parts.next();
    if parts.next().is_some() {
        // Scripts and variants live in fields this engine does not model
        return Err(unsupported());
    }

    if !(2..=3).contains(&language.len()) || !language.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(unsupported());
    }
    let country = match region {
        None => [0, 0],
        Some(region)
            if region.len() == 2 && region.bytes().all(|b| b.is_ascii_uppercase()) =>
        {
            pack_code(region, b'0')
        }
        Some(region) if region.len() == 3 && region.bytes().all(|b| b.is_ascii_digit()) => {
            pack_code(region, b'0')
        }
        Some(_) => return Err(unsupported())
    };
    Ok((pack_code(language, b'a'), country))
}

fn unpack_locale(language: [u8; 2], country: [u8; 2]) -> String {
    let language = unpack_code(language, b'a');
    let region = unpack_code(country, b'0');
    if language.is_empty() {
        String::new()
    } else if region.is_empty() {
        language
    } else {
        format!("{}-{}", language, region)
    }
}

// Resource directory qualifier form, eg. `en-rUS-land-hdpi-v21`
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = vec![];
        if self.mcc != 0 {
            parts.push(format!("mcc{}", self.mcc));
        }
        if self.mnc != 0 {
            parts.push(format!("mnc{:02}", self.mnc));
        }
        if !self.locale.is_empty() {
            match self.locale.split_once('-') {
                Some((language, region)) => parts.push(format!("{}-r{}", language, region)),
                None => parts.push(self.locale.clone())
            }
        }
        match self.layout_direction {
            LayoutDirection::Ltr => parts.push("ldltr".into()),
            LayoutDirection::Rtl => parts.push("ldrtl".into()),
            LayoutDirection::Unset => {}
        }
        if self.smallest_screen_width_dp != 0 {
            parts.push(format!("sw{}dp", self.smallest_screen_width_dp));
        }
        if self.screen_width_dp != 0 {
            parts.push(format!("w{}dp", self.screen_width_dp));
        }
        if self.screen_height_dp != 0 {
            parts.push(format!("h{}dp", self.screen_height_dp));
        }
        let size = match self.screen_layout_size {
            ScreenLayoutSize::Small => "small",
            ScreenLayoutSize::Normal => "normal",
            ScreenLayoutSize::Large => "large",
            ScreenLayoutSize::XLarge => "xlarge",
            ScreenLayoutSize::Unset => ""
        };
        let long = match self.screen_layout_long {
            ScreenLayoutLong::Long => "long",
            ScreenLayoutLong::NotLong => "notlong",
            ScreenLayoutLong::Unset => ""
        };
        let round = match self.screen_round {
            ScreenRound::Round => "round",
            ScreenRound::NotRound => "notround",
            ScreenRound::Unset => ""
        };
        let orientation = match self.orientation {
            Orientation::Port => "port",
            Orientation::Land => "land",
            Orientation::Square => "square",
            Orientation::Unset => ""
        };
        let ui_type = match self.ui_mode_type {
            UiModeType::Desk => "desk",
            UiModeType::Car => "car",
            UiModeType::Television => "television",
            UiModeType::Appliance => "appliance",
            UiModeType::Watch => "watch",
            UiModeType::VrHeadset => "vrheadset",
            UiModeType::Normal | UiModeType::Unset => ""
        };
        let night = match self.ui_mode_night {
            UiModeNight::Night => "night",
            UiModeNight::NotNight => "notnight",
            UiModeNight::Unset => ""
        };
        parts.extend(
            [size, long, round, orientation, ui_type, night]
                .iter()
                .filter(|part| !part.is_empty())
                .map(|part| part.to_string())
        );
        match self.density {
            DENSITY_DEFAULT => {}
            DENSITY_LOW => parts.push("ldpi".into()),
            DENSITY_MEDIUM => parts.push("mdpi".into()),
            DENSITY_TV => parts.push("tvdpi".into()),
            DENSITY_HIGH => parts.push("hdpi".into()),
            DENSITY_XHIGH => parts.push("xhdpi".into()),
            DENSITY_XXHIGH => parts.push("xxhdpi".into()),
            DENSITY_XXXHIGH => parts.push("xxxhdpi".into()),
            DENSITY_ANY => parts.push("anydpi".into()),
            DENSITY_NONE => parts.push("nodpi".into()),
            other => parts.push(format!("{}dpi", other))
        }
        let touch = match self.touchscreen {
            Touchscreen::NoTouch => "notouch",
            Touchscreen::Stylus => "stylus",
            Touchscreen::Finger => "finger",
            Touchscreen::Unset => ""
        };
        let keys = match self.keys_hidden {
            KeysHidden::KeysExposed => "keysexposed",
            KeysHidden::KeysHidden => "keyshidden",
            KeysHidden::KeysSoft => "keyssoft",
            KeysHidden::Unset => ""
        };
        let keyboard = match self.keyboard {
            Keyboard::NoKeys => "nokeys",
            Keyboard::Qwerty => "qwerty",
            Keyboard::TwelveKey => "12key",
            Keyboard::Unset => ""
        };
        let nav_hidden = match self.nav_hidden {
            NavHidden::NavExposed => "navexposed",
            NavHidden::NavHidden => "navhidden",
            NavHidden::Unset => ""
        };
        let navigation = match self.navigation {
            Navigation::NoNav => "nonav",
            Navigation::Dpad => "dpad",
            Navigation::Trackball => "trackball",
            Navigation::Wheel => "wheel",
            Navigation::Unset => ""
        };
        parts.extend(
            [touch, keys, keyboard, nav_hidden, navigation]
                .iter()
                .filter(|part| !part.is_empty())
                .map(|part| part.to_string())
        );
        if self.screen_width != 0 || self.screen_height != 0 {
            parts.push(format!("{}x{}", self.screen_width, self.screen_height));
        }
        if self.sdk_version != 0 {
            parts.push(format!("v{}", self.sdk_version));
        }

        if parts.is_empty() {
            write!(f, "default")
        } else {
            write!(f, "{}", parts.join("-"))
        }
    }
}
