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

//! Command templates with `%(name)s` placeholders.
//!
//! Templates are resolved in two passes against the same context: a
//! deployment parameter value may itself be a template fragment (for example
//! `/srv/%(host)s/data`), so the output of the first pass is substituted once
//! more. Command text is trusted operator input; nothing here escapes it.

mod context;
mod error;

pub use context::{DeployParams, SubstitutionContext};
pub use error::TemplateError;

use crate::executor::concat_commands;

/// Conversion characters accepted after `%(name)`.
const CONVERSIONS: [char; 3] = ['s', 'd', 'i'];

/// A single command string or an ordered sequence of command fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTemplate {
    Single(String),
    Sequence(Vec<String>),
}

impl CommandTemplate {
    /// Resolve every placeholder, preserving shape, order and length.
    pub fn resolve(&self, ctx: &SubstitutionContext) -> Result<CommandTemplate, TemplateError> {
        match self {
            CommandTemplate::Single(template) => Ok(CommandTemplate::Single(resolve(template, ctx)?)),
            CommandTemplate::Sequence(fragments) => fragments
                .iter()
                .map(|fragment| resolve(fragment, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(CommandTemplate::Sequence),
        }
    }

    /// The text fed to the remote shell. Sequences are chained with `&&` so
    /// execution stops at the first failing fragment.
    pub fn script(&self) -> String {
        match self {
            CommandTemplate::Single(command) => command.clone(),
            CommandTemplate::Sequence(fragments) => concat_commands(fragments),
        }
    }
}

impl From<&str> for CommandTemplate {
    fn from(command: &str) -> Self {
        CommandTemplate::Single(command.to_string())
    }
}

impl From<String> for CommandTemplate {
    fn from(command: String) -> Self {
        CommandTemplate::Single(command)
    }
}

impl From<Vec<String>> for CommandTemplate {
    fn from(fragments: Vec<String>) -> Self {
        CommandTemplate::Sequence(fragments)
    }
}

/// Two-pass resolution of one template string.
pub fn resolve(template: &str, ctx: &SubstitutionContext) -> Result<String, TemplateError> {
    let first = substitute(template, ctx)?;
    substitute(&first, ctx)
}

/// One substitution pass.
///
/// `%(name)s` (or `d`/`i`) is replaced with the context value and `%%`
/// becomes `%`. Any other `%` is copied through unchanged.
pub fn substitute(template: &str, ctx: &SubstitutionContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('%') {
            out.push('%');
            offset += pos + 2;
            rest = tail;
        } else if let Some(body) = after.strip_prefix('(') {
            let close = body.find(')').ok_or_else(|| TemplateError::Unterminated {
                template: template.to_string(),
                position: offset + pos,
            })?;
            let key = &body[..close];
            let conversion = body[close + 1..].chars().next();

            match conversion {
                Some(c) if CONVERSIONS.contains(&c) => {}
                other => {
                    return Err(TemplateError::UnsupportedConversion {
                        key: key.to_string(),
                        conversion: other.map(String::from).unwrap_or_default(),
                        template: template.to_string(),
                    })
                }
            }

            let value = ctx.get(key).ok_or_else(|| TemplateError::MissingKey {
                key: key.to_string(),
                template: template.to_string(),
            })?;
            out.push_str(value);

            // '%' + '(' + key + ')' + conversion
            let consumed = close + 4;
            offset += pos + consumed;
            rest = &rest[pos + consumed..];
        } else {
            out.push('%');
            offset += pos + 1;
            rest = after;
        }
    }

    out.push_str(rest);
    Ok(out)
}
