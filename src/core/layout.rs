// log-follow - core/layout.rs
//
// Panel visibility state machine.
//
//   Split       - every panel visible (initial state)
//   Focused(i)  - only panel i visible
//
// Digit commands drive it: `0` returns to Split, `d` in 1..=N focuses panel
// d-1, anything else is ignored. There is no terminal state.

/// Current layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Split,
    Focused(usize),
}

/// Visibility of each source's panel.
///
/// Invariant: either every entry is visible or exactly one is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    mode: LayoutMode,
    visible: Vec<bool>,
}

impl PanelLayout {
    /// All `source_count` panels visible.
    pub fn new(source_count: usize) -> Self {
        Self {
            mode: LayoutMode::Split,
            visible: vec![true; source_count],
        }
    }

    /// Apply a digit command. Returns `true` if the layout changed state.
    pub fn apply_digit(&mut self, digit: u8) -> bool {
        let next = match digit {
            0 => LayoutMode::Split,
            d if (1..=self.visible.len()).contains(&(d as usize)) => {
                LayoutMode::Focused(d as usize - 1)
            }
            _ => {
                tracing::trace!(digit, sources = self.visible.len(), "Layout: digit ignored");
                return false;
            }
        };

        let changed = next != self.mode;
        self.mode = next;
        self.recompute();
        if changed {
            tracing::debug!(mode = ?self.mode, "Layout changed");
        }
        changed
    }

    fn recompute(&mut self) {
        match self.mode {
            LayoutMode::Split => self.visible.iter_mut().for_each(|v| *v = true),
            LayoutMode::Focused(i) => {
                for (j, v) in self.visible.iter_mut().enumerate() {
                    *v = j == i;
                }
            }
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Whether panel `index` should be painted. Out-of-range indices are hidden.
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    /// Visibility flags in source order.
    pub fn visibility(&self) -> &[bool] {
        &self.visible
    }

    /// Indices of the visible panels, in source order.
    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.then_some(i))
    }

    pub fn source_count(&self) -> usize {
        self.visible.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_split() {
        let layout = PanelLayout::new(3);
        assert_eq!(layout.mode(), LayoutMode::Split);
        assert_eq!(layout.visibility(), &[true, true, true]);
    }

    #[test]
    fn test_focus_then_split() {
        let mut layout = PanelLayout::new(3);
        assert!(layout.apply_digit(2));
        assert_eq!(layout.visibility(), &[false, true, false]);
        assert_eq!(layout.mode(), LayoutMode::Focused(1));

        assert!(layout.apply_digit(0));
        assert_eq!(layout.visibility(), &[true, true, true]);
    }

    #[test]
    fn test_out_of_range_digit_is_ignored() {
        let mut layout = PanelLayout::new(3);
        layout.apply_digit(3);
        let before = layout.clone();
        assert!(!layout.apply_digit(9));
        assert!(!layout.apply_digit(4));
        assert_eq!(layout, before);
        assert_eq!(layout.visibility(), &[false, false, true]);
    }

    #[test]
    fn test_refocus_same_panel_is_not_a_change() {
        let mut layout = PanelLayout::new(2);
        assert!(layout.apply_digit(1));
        assert!(!layout.apply_digit(1));
        assert!(layout.apply_digit(0));
        assert!(!layout.apply_digit(0));
    }

    #[test]
    fn test_exactly_one_or_all_visible() {
        let mut layout = PanelLayout::new(4);
        for digit in [1, 4, 0, 9, 2, 7, 3, 0] {
            layout.apply_digit(digit);
            let n = layout.visibility().iter().filter(|v| **v).count();
            assert!(n == 1 || n == 4, "invalid visibility {:?}", layout.visibility());
        }
    }

    #[test]
    fn test_visible_indices() {
        let mut layout = PanelLayout::new(3);
        assert_eq!(layout.visible_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        layout.apply_digit(3);
        assert_eq!(layout.visible_indices().collect::<Vec<_>>(), vec![2]);
        assert!(!layout.is_visible(5));
    }
}
