use ahash::AHashSet;

/// Buried / traced / stepped name sets, shared by the procedure registry,
/// the variable stack, and property lists.
///
/// Buried names are exempt from the mass-erase operations and from CONTENTS
/// listings; traced and stepped names get entry/exit echo and line-by-line
/// pausing respectively.
#[derive(Debug, Default)]
pub struct Workspace {
    buried: AHashSet<String>,
    traced: AHashSet<String>,
    stepped: AHashSet<String>,
}

impl Workspace {
    pub fn bury(&mut self, name: &str) {
        self.buried.insert(name.to_string());
    }

    pub fn unbury(&mut self, name: &str) {
        self.buried.remove(name);
    }

    #[must_use]
    pub fn is_buried(&self, name: &str) -> bool {
        self.buried.contains(name)
    }

    pub fn trace(&mut self, name: &str) {
        self.traced.insert(name.to_string());
    }

    pub fn untrace(&mut self, name: &str) {
        self.traced.remove(name);
    }

    #[must_use]
    pub fn is_traced(&self, name: &str) -> bool {
        self.traced.contains(name)
    }

    pub fn step(&mut self, name: &str) {
        self.stepped.insert(name.to_string());
    }

    pub fn unstep(&mut self, name: &str) {
        self.stepped.remove(name);
    }

    #[must_use]
    pub fn is_stepped(&self, name: &str) -> bool {
        self.stepped.contains(name)
    }

    /// Drops tracking for a name that no longer exists.
    pub fn forget(&mut self, name: &str) {
        self.buried.remove(name);
        self.traced.remove(name);
        self.stepped.remove(name);
    }

    fn sorted(set: &AHashSet<String>) -> Vec<String> {
        let mut names: Vec<String> = set.iter().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn traced_names(&self) -> Vec<String> {
        Self::sorted(&self.traced)
    }

    #[must_use]
    pub fn stepped_names(&self) -> Vec<String> {
        Self::sorted(&self.stepped)
    }
}
