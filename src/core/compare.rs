/// Which saved scenario, if any, is shown next to the working scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSelection {
    active: Option<String>,
}

impl ComparisonSelection {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Selecting the active id again turns comparison off; any other id
    /// replaces the current one. `None` always clears.
    pub fn set(&mut self, id: Option<&str>) -> Option<&str> {
        self.active = match id {
            Some(id) if self.active.as_deref() == Some(id) => None,
            Some(id) => Some(id.to_string()),
            None => None,
        };
        self.active()
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Clears the selection when it points at `id`. Returns whether it did.
    pub fn forget(&mut self, id: &str) -> bool {
        if self.active.as_deref() == Some(id) {
            self.active = None;
            return true;
        }
        false
    }
}
