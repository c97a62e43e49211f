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

use std::collections::HashMap;

use log::debug;
use resc_common::*;

use crate::dynamic_ref_table::APP_PACKAGE_ID;

/// The first id handed to a shared library. `0x00` means "this package" and
/// `0x01` is the framework.
pub const FIRST_SHARED_LIBRARY_ID: u8 = 0x02;

/// Hands out runtime package ids to shared libraries, one per library name.
#[derive(Debug, Clone)]
pub struct DynamicLibManager {
    assigned: HashMap<String, u8>,
    // None once every id is taken
    next_id: Option<u8>
}

impl Default for DynamicLibManager {
    fn default() -> Self {
        DynamicLibManager {
            assigned: HashMap::new(),
            next_id: Some(FIRST_SHARED_LIBRARY_ID)
        }
    }
}

impl DynamicLibManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of `library_package_name`, assigning the next free one on first
    /// use. Later calls with the same name return the same id.
    pub fn get_assigned_id(&mut self, library_package_name: &str) -> Result<u8> {
        if let Some(id) = self.assigned.get(library_package_name) {
            return Ok(*id);
        }
        let id = self.next_id.ok_or(ResError::PackageIdsExhausted)?;
        self.next_id = match id.checked_add(1) {
            // Never given out, it is the id of every app
            Some(APP_PACKAGE_ID) => Some(APP_PACKAGE_ID + 1),
            next => next
        };
        debug!("assigned package id 0x{:02x} to {}", id, library_package_name);
        self.assigned.insert(library_package_name.to_string(), id);
        Ok(id)
    }

    /// An id at or after `start` that no library has been given yet. The app
    /// id is skipped.
    pub fn find_unassigned_id(&self, start: u8) -> Result<u8> {
        let next = self.next_id.ok_or(ResError::PackageIdsExhausted)?;
        match start.max(next) {
            APP_PACKAGE_ID => Ok(APP_PACKAGE_ID + 1),
            id => Ok(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_memoized_and_ascending() {
        let mut manager = DynamicLibManager::new();
        let one = manager.get_assigned_id("lib_one").unwrap();
        assert_eq!(one, 0x02);
        assert_eq!(manager.get_assigned_id("lib_one").unwrap(), one);
        assert_eq!(manager.get_assigned_id("lib_two").unwrap(), one + 1);
    }

    #[test]
    fn unassigned_ids_skip_taken_ones() {
        let mut manager = DynamicLibManager::new();
        assert_eq!(manager.find_unassigned_id(0x02).unwrap(), 0x02);
        manager.get_assigned_id("a").unwrap();
        manager.get_assigned_id("b").unwrap();
        assert_eq!(manager.find_unassigned_id(0x02).unwrap(), 0x04);
        assert_eq!(manager.find_unassigned_id(0x10).unwrap(), 0x10);
    }

    #[test]
    fn unassigned_ids_skip_the_app_id() {
        let manager = DynamicLibManager::new();
        assert_eq!(manager.find_unassigned_id(APP_PACKAGE_ID).unwrap(), APP_PACKAGE_ID + 1);
        assert_eq!(manager.find_unassigned_id(0x7e).unwrap(), 0x7e);
    }

    #[test]
    fn app_id_is_never_assigned_and_ids_run_out() {
        let mut manager = DynamicLibManager::new();
        let mut ids = vec![];
        loop {
            match manager.get_assigned_id(&format!("lib{}", ids.len())) {
                Ok(id) => ids.push(id),
                Err(ResError::PackageIdsExhausted) => break,
                Err(e) => panic!("unexpected error {:?}", e)
            }
        }
        assert!(!ids.contains(&APP_PACKAGE_ID));
        assert_eq!(ids.len(), 0xFF - 0x02);
        assert_eq!(*ids.last().unwrap(), 0xFF);
        assert!(manager.find_unassigned_id(0x02).is_err());
    }
}
