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

// Recoverable problems found while compiling a resource. They are collected
// rather than returned so that one run can report every broken reference in a
// file before the build fails.
use std::fmt;

use log::{error, warn};

/// Where something came from in the user's input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Source {
    /// eg. `res/layout/main.xml`
    pub path: String,
    /// 1-based, if known
    pub line: Option<usize>
}

impl Source {
    pub fn new(path: impl Into<String>) -> Self {
        Source {
            path: path.into(),
            line: None
        }
    }

    pub fn with_line(&self, line: usize) -> Self {
        Source {
            path: self.path.clone(),
            line: Some(line)
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.path, line),
            None => write!(f, "{}", self.path)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagMessage {
    pub severity: Severity,
    pub source: Source,
    pub message: String
}

impl fmt::Display for DiagMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// Accumulates diagnostics for one compilation unit.
#[derive(Debug, Default)]
pub struct Diagnostics {
    messages: Vec<DiagMessage>,
    error_count: usize
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, source: Source, message: impl Into<String>) {
        let message = DiagMessage {
            severity: Severity::Error,
            source,
            message: message.into()
        };
        error!("{}", message);
        self.error_count += 1;
        self.messages.push(message);
    }

    pub fn warn(&mut self, source: Source, message: impl Into<String>) {
        let message = DiagMessage {
            severity: Severity::Warning,
            source,
            message: message.into()
        };
        warn!("{}", message);
        self.messages.push(message);
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn messages(&self) -> &[DiagMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_and_warnings_accumulate() {
        let mut diag = Diagnostics::new();
        let src = Source::new("res/xml/a.xml");
        diag.warn(src.with_line(3), "unused attribute");
        diag.error(src.with_line(4), "resource string/missing not found");
        diag.error(src.with_line(9), "resource drawable/gone not found");

        assert_eq!(diag.error_count(), 2);
        assert!(diag.has_errors());
        assert_eq!(diag.messages().len(), 3);
        assert_eq!(
            diag.messages()[1].to_string(),
            "res/xml/a.xml:4: resource string/missing not found"
        );
    }

    #[test]
    fn source_without_line_prints_path_only() {
        assert_eq!(Source::new("values.xml").to_string(), "values.xml");
    }
}
