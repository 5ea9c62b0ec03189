// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

use thiserror::Error;

/// Errors raised while resolving a command template.
///
/// All of these are run-wide fatal: they are detected before any node is
/// contacted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Placeholder names a key that is not in the substitution context
    #[error("no substitution value for placeholder '%({key})s' in '{template}'")]
    MissingKey { key: String, template: String },

    /// `%(` without a closing parenthesis
    #[error("unterminated placeholder at byte {position} in '{template}'")]
    Unterminated { template: String, position: usize },

    /// `%(name)` followed by something other than a supported conversion
    #[error("unsupported conversion '{conversion}' for placeholder '{key}' in '{template}'")]
    UnsupportedConversion {
        key: String,
        conversion: String,
        template: String,
    },

    /// A deployment parameter array has fewer values than there are slots
    #[error("parameter '{name}' has {len} value(s) but the deployment has {slots} slot(s)")]
    ParameterTooShort {
        name: String,
        len: usize,
        slots: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateError::MissingKey {
            key: "missing".to_string(),
            template: "echo %(missing)s".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no substitution value for placeholder '%(missing)s' in 'echo %(missing)s'"
        );

        let err = TemplateError::ParameterTooShort {
            name: "port".to_string(),
            len: 2,
            slots: 3,
        };
        assert_eq!(
            err.to_string(),
            "parameter 'port' has 2 value(s) but the deployment has 3 slot(s)"
        );
    }
}
