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

// Prost messages are plain structs where every optional sub-message is an
// Option. These macros keep message construction readable.

/// Builds a message with the given fields set and everything else default.
#[macro_export]
macro_rules! inner_proto {
    ($($t:ident)::+, $($field:ident : $value:expr),* $(,)?) => {
        $($t)::+ {
            $($field: $value,)*
            ..Default::default()
        }
    };
}

/// Like [inner_proto!], wrapped in `Some` for use as an optional field.
#[macro_export]
macro_rules! proto {
    ($($t:ident)::+, $($field:ident : $value:expr),* $(,)?) => {
        Some($crate::inner_proto!($($t)::+, $($field: $value),*))
    };
}

/// A present but empty optional message.
#[macro_export]
macro_rules! empty_proto {
    ($t:ty) => {
        Some(<$t>::default())
    };
}
