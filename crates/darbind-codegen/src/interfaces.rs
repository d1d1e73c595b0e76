//! The cross-DALF interface index built during pass 1.

use std::collections::BTreeMap;

use tracing::debug;

use darbind_core::{InterfaceMap, TmplStruct};

use crate::dedup::equal_name_count;

/// Interfaces from every DALF, keyed by defining module, then by interface
/// name. Entries are only ever appended; name collisions across DALFs are
/// resolved with the same integer-suffix rule as struct names, applied
/// globally across all modules.
#[derive(Debug, Default)]
pub struct InterfaceIndex {
    by_module: BTreeMap<String, InterfaceMap>,
}

impl InterfaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interface under its module, renaming it first when its name
    /// collides with any interface already in the index.
    pub fn insert(&mut self, mut interface: TmplStruct) {
        let count = equal_name_count(
            self.by_module.values().flat_map(|m| m.keys()),
            &interface.name,
        );
        if count > 0 {
            let renamed = format!("{}{}", interface.name, count + 1);
            debug!(
                "interface {} collides with an indexed name, renaming to {renamed}",
                interface.name
            );
            interface.name = renamed;
        }

        self.by_module
            .entry(interface.module_name.clone())
            .or_default()
            .insert(interface.name.clone(), interface);
    }

    pub fn module(&self, module_name: &str) -> Option<&InterfaceMap> {
        self.by_module.get(module_name)
    }

    /// The raw module-keyed view handed to the decoder in pass 2.
    pub fn by_module(&self) -> &BTreeMap<String, InterfaceMap> {
        &self.by_module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darbind_core::StructKind;

    fn interface(name: &str, module: &str) -> TmplStruct {
        let mut tmpl = TmplStruct::new(name, module, StructKind::Interface);
        tmpl.daml_name = name.trim_start_matches('I').to_string();
        tmpl
    }

    #[test]
    fn test_insert_keeps_modules_separate() {
        let mut index = InterfaceIndex::new();
        index.insert(interface("IFoo", "A"));
        index.insert(interface("IBar", "B"));

        assert!(index.module("A").unwrap().contains_key("IFoo"));
        assert!(index.module("B").unwrap().contains_key("IBar"));
        assert!(index.module("C").is_none());
    }

    #[test]
    fn test_collisions_across_modules_get_global_suffix() {
        let mut index = InterfaceIndex::new();
        index.insert(interface("IFoo", "A"));
        index.insert(interface("IFoo", "B"));
        index.insert(interface("IFoo", "C"));

        assert!(index.module("A").unwrap().contains_key("IFoo"));
        assert!(index.module("B").unwrap().contains_key("IFoo2"));
        assert!(index.module("C").unwrap().contains_key("IFoo3"));
    }

    #[test]
    fn test_suffixed_names_count_as_collisions() {
        let mut index = InterfaceIndex::new();
        index.insert(interface("IFoo2", "A"));
        index.insert(interface("IFoo2", "B"));

        // "IFoo2" is taken, so the incoming duplicate is suffixed again.
        assert!(index.module("B").unwrap().contains_key("IFoo22"));
    }
}
