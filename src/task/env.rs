//! Ordered environment maps and shell assignment rendering

use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Environment variables in insertion order.
///
/// Overwriting an existing name keeps its original position, so a merged map
/// lists base entries first no matter which layer supplied the final value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    entries: Vec<(String, String)>,
}

impl EnvMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite one variable
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Get a variable value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a variable, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Layer `overrides` on top of `base`: base entries first, every
    /// collision resolved in favour of `overrides`.
    pub fn merged(base: &EnvMap, overrides: &EnvMap) -> EnvMap {
        let mut merged = base.clone();
        merged.extend(overrides.iter());
        merged
    }

    /// First name that is not a valid shell variable name
    pub fn invalid_name(&self) -> Option<&str> {
        self.iter()
            .map(|(name, _)| name)
            .find(|name| !is_valid_env_name(name))
    }

    /// Render one `export NAME="value";` assignment per entry.
    ///
    /// Names are emitted unchecked; see [`EnvMap::invalid_name`].
    pub fn to_assignments(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("export {}={};", name, quote_env_value(value)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for EnvMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = EnvMap::new();
        map.extend(iter);
        map
    }
}

impl Serialize for EnvMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EnvMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EnvMapVisitor;

        impl<'de> Visitor<'de> for EnvMapVisitor {
            type Value = EnvMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of environment variable names to string values")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<EnvMap, E> {
                Ok(EnvMap::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<EnvMap, A::Error> {
                let mut map = EnvMap::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    map.set(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(EnvMapVisitor)
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Whether `name` can be used in a shell `export`
pub fn is_valid_env_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

fn substitution_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\$\(.*\)|`[^`]*`)$").expect("valid regex"))
}

/// Whether a value is a command substitution to be evaluated by the shell
pub fn is_command_substitution(value: &str) -> bool {
    substitution_pattern().is_match(value.trim())
}

/// Quote an env value for a double-quoted assignment.
///
/// Command substitutions pass through verbatim; anything else is literal.
pub fn quote_env_value(value: &str) -> String {
    if is_command_substitution(value) {
        return format!("\"{}\"", value.trim());
    }
    quote_literal(value)
}

/// Double-quote a literal string, escaping everything the shell would expand
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
