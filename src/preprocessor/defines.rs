// Macro table shared by the preprocessor and the declaration parser

use rustc_hash::FxHashMap;

/// Macro name to literal replacement text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineTable {
    macros: FxHashMap<String, String>,
}

impl DefineTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.macros.insert(name.into(), value.into());
    }

    pub fn undef(&mut self, name: &str) -> Option<String> {
        self.macros.remove(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.macros.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.macros.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_undef() {
        let mut defines = DefineTable::new();
        defines.define("DDS", "");
        defines.define("VERSION", "3");
        assert!(defines.is_defined("DDS"));
        assert_eq!(defines.get("VERSION"), Some("3"));

        defines.define("VERSION", "4");
        assert_eq!(defines.get("VERSION"), Some("4"));
        assert_eq!(defines.len(), 2);

        assert_eq!(defines.undef("DDS"), Some(String::new()));
        assert!(!defines.is_defined("DDS"));
        assert_eq!(defines.undef("DDS"), None);
    }
}
