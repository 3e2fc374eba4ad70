use ahash::AHashMap;
use indexmap::IndexMap;

use crate::{
    datum::Datum,
    types::{List, ListBuilder, Word},
    workspace::Workspace,
};

/// The property-list store: name → ordered property map. Property names are
/// case-folded like every other name.
#[derive(Debug, Default)]
pub struct PropertyLists {
    lists: AHashMap<String, IndexMap<String, Datum>>,
    pub ws: Workspace,
}

impl PropertyLists {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, plist: &Word, prop: &Word, value: Datum) {
        self.lists
            .entry(plist.key().to_string())
            .or_default()
            .insert(prop.key().to_string(), value);
    }

    /// GPROP: the stored value, or the empty list when absent.
    #[must_use]
    pub fn get(&self, plist: &Word, prop: &Word) -> Datum {
        self.lists
            .get(plist.key())
            .and_then(|props| props.get(prop.key()))
            .cloned()
            .unwrap_or_else(|| Datum::List(List::new()))
    }

    pub fn remove(&mut self, plist: &Word, prop: &Word) {
        if let Some(props) = self.lists.get_mut(plist.key()) {
            props.shift_remove(prop.key());
            if props.is_empty() {
                self.lists.remove(plist.key());
                self.ws.forget(plist.key());
            }
        }
    }

    /// PLIST: a flat [prop1 value1 prop2 value2 …] copy.
    #[must_use]
    pub fn plist(&self, plist: &Word) -> List {
        let mut out = ListBuilder::new();
        if let Some(props) = self.lists.get(plist.key()) {
            for (prop, value) in props {
                out.push(Datum::Word(Word::new(prop.clone(), false)));
                out.push(value.clone());
            }
        }
        out.finish()
    }

    #[must_use]
    pub fn has_plist(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    /// All property-list names on one side of the bury partition, sorted.
    #[must_use]
    pub fn all_names(&self, buried: bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .lists
            .keys()
            .filter(|name| self.ws.is_buried(name) == buried)
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn erase(&mut self, name: &str) {
        self.lists.remove(name);
        self.ws.forget(name);
    }

    /// Erases every unburied property list.
    pub fn erase_all(&mut self) {
        let keep: Vec<String> = self
            .lists
            .keys()
            .filter(|name| self.ws.is_buried(name))
            .cloned()
            .collect();
        self.lists.retain(|name, _| keep.contains(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> Word {
        Word::new(s, false)
    }

    #[test]
    fn put_get_roundtrip_is_case_insensitive() {
        let mut p = PropertyLists::new();
        p.put(&w("Colors"), &w("Sky"), Datum::Word(w("blue")));
        assert_eq!(p.get(&w("colors"), &w("SKY")).to_display_string(), "blue");
    }

    #[test]
    fn gprop_of_missing_property_is_empty_list() {
        let p = PropertyLists::new();
        let value = p.get(&w("nope"), &w("nothing"));
        assert!(matches!(value, Datum::List(l) if l.is_empty()));
    }

    #[test]
    fn removing_last_property_drops_the_list() {
        let mut p = PropertyLists::new();
        p.put(&w("a"), &w("b"), Datum::Word(w("c")));
        assert!(p.has_plist("a"));
        p.remove(&w("a"), &w("b"));
        assert!(!p.has_plist("a"));
    }

    #[test]
    fn plist_preserves_insertion_order() {
        let mut p = PropertyLists::new();
        p.put(&w("l"), &w("one"), Datum::Word(w("1")));
        p.put(&w("l"), &w("two"), Datum::Word(w("2")));
        let flat = p.plist(&w("l"));
        assert_eq!(
            Datum::List(flat).to_display_string(),
            "[one 1 two 2]"
        );
    }
}
