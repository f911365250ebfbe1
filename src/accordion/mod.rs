//! Single-selection accordion over author rows.

/// Which author's detail panel is open, if any.
///
/// Opening one panel closes any other. The initial state is all collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccordionState {
    expanded: Option<usize>,
}

impl AccordionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle author `index`: collapse it if it is open, otherwise open it
    /// (closing whichever was open before).
    pub fn toggle(&mut self, index: usize) {
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    /// Drop the selection if it no longer points at a row.
    ///
    /// Called after the dataset is replaced with one that has fewer rows.
    pub fn clamp(&mut self, rows: usize) {
        if self.expanded.is_some_and(|i| i >= rows) {
            self.expanded = None;
        }
    }

    /// Header marker for author `index`.
    pub fn marker(&self, index: usize) -> &'static str {
        if self.is_expanded(index) { "-" } else { "+" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_collapsed() {
        let state = AccordionState::new();
        assert_eq!(state.expanded(), None);
        assert_eq!(state.marker(0), "+");
    }

    #[test]
    fn toggle_same_twice_collapses() {
        let mut state = AccordionState::new();
        state.toggle(2);
        assert!(state.is_expanded(2));
        assert_eq!(state.marker(2), "-");
        state.toggle(2);
        assert_eq!(state.expanded(), None);
    }

    #[test]
    fn toggle_other_switches() {
        let mut state = AccordionState::new();
        state.toggle(0);
        state.toggle(3);
        assert!(state.is_expanded(3));
        assert!(!state.is_expanded(0));
    }

    #[test]
    fn clamp_drops_stale_index() {
        let mut state = AccordionState::new();
        state.toggle(4);
        state.clamp(5);
        assert_eq!(state.expanded(), Some(4));
        state.clamp(2);
        assert_eq!(state.expanded(), None);
    }
}
