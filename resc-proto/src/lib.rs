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

// The use of the proto! macro causes some extraneous Default::default() calls,
// but they are harmless and unavoidable with the current design of the macro.
#![allow(clippy::needless_update)]

//! The intermediate form passed between build stages: `aapt.pb` messages and
//! the transcoder between them and the value model.

pub mod aapt {
    pub mod pb;
}
mod proto_util;

pub mod deserialize;
pub mod proto_xml;
pub mod serialize;
pub mod table;

pub use deserialize::{deserialize_entry, deserialize_value};
pub use proto_xml::{deserialize_xml, serialize_xml};
pub use serialize::{serialize_entry, serialize_value, SourcePool};
pub use table::{deserialize_table, serialize_table};
