//! Skeleton resolution - reads a model-written command line and maps it
//! onto a catalog family

use crate::command::catalog::{self, CommandFamily};
use crate::command::placeholder::{is_placeholder, placeholders_in};

/// A command line as written by the model, split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSkeleton {
    /// Tokens between `oci` and the verb, e.g. `compute instance`
    pub service: String,
    /// Last positional token before the first flag
    pub verb: String,
    /// Placeholder field names in order of appearance
    pub placeholders: Vec<String>,
    /// Number of flag values that are not placeholders
    pub literal_values: usize,
}

impl CommandSkeleton {
    /// Split a single `oci ...` line. Returns `None` when the line is not
    /// an OCI CLI invocation with at least a service and a verb.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != "oci" {
            return None;
        }

        let mut positional = Vec::new();
        let mut literal_values = 0;
        let mut seen_flag = false;
        let mut after_flag = false;

        for token in tokens {
            if token.starts_with("--") {
                seen_flag = true;
                after_flag = true;
            } else if !seen_flag {
                positional.push(token.to_lowercase());
            } else {
                if after_flag && !is_placeholder(token) {
                    literal_values += 1;
                }
                after_flag = false;
            }
        }

        if positional.len() < 2 {
            return None;
        }
        let verb = positional.pop()?;

        Some(Self {
            service: positional.join(" "),
            verb,
            placeholders: placeholders_in(line),
            literal_values,
        })
    }

    /// Look up the catalog family this skeleton belongs to
    pub fn family(&self) -> Option<&'static CommandFamily> {
        catalog::lookup(&self.service, &self.verb)
    }
}
