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

//! Runtime overlay support: idmap files that redirect target resources to an
//! overlay, and the tables that rewrite package ids between packages loaded
//! together.

pub mod dynamic_lib_manager;
pub mod dynamic_ref_table;
pub mod idmap_builder;
pub mod idmap_types;
pub mod loaded_idmap;

pub use dynamic_lib_manager::DynamicLibManager;
pub use dynamic_ref_table::{DynamicRefTable, OverlayDynamicRefTable};
pub use idmap_builder::IdmapBuilder;
pub use loaded_idmap::{IdmapLookup, IdmapStatus, LoadedIdmap, TargetCursor};
