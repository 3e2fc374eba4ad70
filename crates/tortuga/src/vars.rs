use ahash::AHashMap;

use crate::{datum::Datum, workspace::Workspace};

/// One activation record: a running procedure, or the REPL itself for the
/// global frame.
#[derive(Debug)]
pub struct Frame {
    /// The AST node of the invoking call, or nothing for the global frame.
    pub source_node: Datum,
    /// Local bindings. A stored `Datum::Nothing` means declared-but-unbound:
    /// LOCAL creates the slot, reading it still raises NO-VALUE.
    bindings: AHashMap<String, Datum>,
    /// TEST state for IFTRUE/IFFALSE; `None` until TEST runs in this frame.
    pub test_state: Option<bool>,
    /// Values for the `?` explicit-slot placeholders, set by APPLY.
    pub explicit_slots: Datum,
}

impl Frame {
    fn new(source_node: Datum) -> Self {
        Self {
            source_node,
            bindings: AHashMap::new(),
            test_state: None,
            explicit_slots: Datum::Nothing,
        }
    }
}

/// The call-frame stack. The first frame is the global frame and is never
/// popped; lookups walk from the innermost frame outward.
#[derive(Debug)]
pub struct Vars {
    frames: Vec<Frame>,
    pub ws: Workspace,
}

impl Vars {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(Datum::Nothing)],
            ws: Workspace::default(),
        }
    }

    /// Number of frames, including the global frame.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self, source_node: Datum) {
        self.frames.push(Frame::new(source_node));
    }

    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    fn top(&mut self) -> &mut Frame {
        self.frames
            .last_mut()
            .expect("the global frame is never popped")
    }

    /// Reads a binding, walking innermost to global. `None` means the name is
    /// bound nowhere; `Some(Datum::Nothing)` means declared but valueless.
    #[must_use]
    pub fn value_for(&self, name: &str) -> Option<Datum> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.bindings.get(name).cloned())
    }

    /// MAKE semantics: update the innermost existing binding, or create one
    /// in the global frame.
    pub fn set_value(&mut self, name: &str, value: Datum) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.bindings.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.frames[0].bindings.insert(name.to_string(), value);
    }

    /// LOCAL semantics: declare in the innermost frame with no value.
    pub fn set_local(&mut self, name: &str) {
        self.top()
            .bindings
            .entry(name.to_string())
            .or_insert(Datum::Nothing);
    }

    /// GLOBAL semantics: declare in the global frame with no value.
    pub fn set_global(&mut self, name: &str) {
        self.frames[0]
            .bindings
            .entry(name.to_string())
            .or_insert(Datum::Nothing);
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.frames.iter().any(|f| f.bindings.contains_key(name))
    }

    #[must_use]
    pub fn is_global(&self, name: &str) -> bool {
        self.frames[0].bindings.contains_key(name)
    }

    /// Erases every occurrence of the name.
    pub fn erase(&mut self, name: &str) {
        for frame in &mut self.frames {
            frame.bindings.remove(name);
        }
        self.ws.forget(name);
    }

    /// Erases every unburied variable.
    pub fn erase_all(&mut self) {
        let buried: Vec<String> = self
            .frames
            .iter()
            .flat_map(|f| f.bindings.keys())
            .filter(|name| self.ws.is_buried(name))
            .cloned()
            .collect();
        for frame in &mut self.frames {
            frame.bindings.retain(|name, _| buried.contains(name));
        }
    }

    /// All bound names, deduplicated and sorted for stable listings.
    /// `buried` selects which side of the bury partition to list.
    #[must_use]
    pub fn all_names(&self, buried: bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .frames
            .iter()
            .flat_map(|f| f.bindings.keys().cloned())
            .filter(|name| self.ws.is_buried(name) == buried)
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// TEST: registers a result in the innermost frame.
    pub fn set_test(&mut self, result: bool) {
        self.top().test_state = Some(result);
    }

    /// The most recent TEST result visible from the innermost frame, walking
    /// outward so an inner procedure can observe an outer TEST.
    #[must_use]
    pub fn tested_state(&self) -> Option<bool> {
        self.frames.iter().rev().find_map(|f| f.test_state)
    }

    /// Sets the explicit-slot list on the innermost frame (APPLY).
    pub fn set_explicit_slots(&mut self, slots: Datum) {
        self.top().explicit_slots = slots;
    }

    /// The nearest explicit-slot list, walking outward.
    #[must_use]
    pub fn explicit_slots(&self) -> Datum {
        self.frames
            .iter()
            .rev()
            .map(|f| &f.explicit_slots)
            .find(|slots| !slots.is_nothing())
            .cloned()
            .unwrap_or(Datum::Nothing)
    }

    /// The source node of the innermost frame.
    #[must_use]
    pub fn current_source_node(&self) -> Datum {
        self.frames
            .last()
            .map_or(Datum::Nothing, |f| f.source_node.clone())
    }
}

impl Default for Vars {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Word;

    fn word(s: &str) -> Datum {
        Datum::Word(Word::new(s, false))
    }

    #[test]
    fn make_creates_in_global_when_unbound() {
        let mut vars = Vars::new();
        vars.push_frame(Datum::Nothing);
        vars.set_value("x", word("1"));
        vars.pop_frame();
        assert_eq!(vars.value_for("x").unwrap().to_display_string(), "1");
        assert!(vars.is_global("x"));
    }

    #[test]
    fn local_shadows_global() {
        let mut vars = Vars::new();
        vars.set_value("x", word("outer"));
        vars.push_frame(Datum::Nothing);
        vars.set_local("x");
        vars.set_value("x", word("inner"));
        assert_eq!(vars.value_for("x").unwrap().to_display_string(), "inner");
        vars.pop_frame();
        assert_eq!(vars.value_for("x").unwrap().to_display_string(), "outer");
    }

    #[test]
    fn local_without_make_is_declared_but_valueless() {
        let mut vars = Vars::new();
        vars.push_frame(Datum::Nothing);
        vars.set_local("x");
        assert!(vars.exists("x"));
        assert!(vars.value_for("x").unwrap().is_nothing());
    }

    #[test]
    fn test_state_visible_from_inner_frames() {
        let mut vars = Vars::new();
        vars.push_frame(Datum::Nothing);
        vars.set_test(true);
        vars.push_frame(Datum::Nothing);
        assert_eq!(vars.tested_state(), Some(true));
        vars.pop_frame();
        vars.pop_frame();
        assert_eq!(vars.tested_state(), None);
    }

    #[test]
    fn erase_all_skips_buried() {
        let mut vars = Vars::new();
        vars.set_value("keep", word("1"));
        vars.set_value("drop", word("2"));
        vars.ws.bury("keep");
        vars.erase_all();
        assert!(vars.exists("keep"));
        assert!(!vars.exists("drop"));
    }
}
