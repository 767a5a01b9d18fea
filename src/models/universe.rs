use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Symbols to screen with their display names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    names: BTreeMap<String, String>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Universe whose display names are the symbols themselves
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        symbols
            .into_iter()
            .map(|s| {
                let symbol = s.into();
                (symbol.clone(), symbol)
            })
            .collect()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, name: impl Into<String>) {
        self.names.insert(symbol.into(), name.into());
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.names.contains_key(symbol)
    }

    /// Display name, or the symbol itself when none is known
    pub fn display_name(&self, symbol: &str) -> String {
        self.names
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| symbol.to_string())
    }

    pub fn symbols(&self) -> Vec<String> {
        self.names.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for Universe {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Provider-ready ticker: trimmed, upper-case, class-share dots as dashes
/// (`BRK.B` becomes `BRK-B`).
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_ascii_uppercase().replace('.', "-")
}
