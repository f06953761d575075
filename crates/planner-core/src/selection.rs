//! Two-click source/destination picking and the active aircraft type.

use crate::models::{AircraftType, Node};

/// Source/destination pair. A destination never exists without a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    Empty,
    HasSrc(Node),
    HasBoth { src: Node, dst: Node },
}

impl Selection {
    pub fn src(&self) -> Option<&Node> {
        match self {
            Selection::Empty => None,
            Selection::HasSrc(src) | Selection::HasBoth { src, .. } => Some(src),
        }
    }

    pub fn dst(&self) -> Option<&Node> {
        match self {
            Selection::HasBoth { dst, .. } => Some(dst),
            _ => None,
        }
    }

    /// Both endpoints, when the pair is complete.
    pub fn pair(&self) -> Option<(&Node, &Node)> {
        match self {
            Selection::HasBoth { src, dst } => Some((src, dst)),
            _ => None,
        }
    }
}

/// Outcome of a click, so the caller knows what to invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    SourceSet,
    DestinationSet,
    Cleared,
}

/// Owns the selection and the aircraft type.
#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    selection: Selection,
    aircraft: AircraftType,
}

impl SelectionMachine {
    pub fn new(aircraft: AircraftType) -> Self {
        Self {
            selection: Selection::Empty,
            aircraft,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn aircraft(&self) -> AircraftType {
        self.aircraft
    }

    /// Advance Empty -> HasSrc -> HasBoth -> Empty. The click that leaves
    /// HasBoth only clears; it does not start a new pair.
    pub fn click(&mut self, node: Node) -> ClickOutcome {
        let (next, outcome) = match std::mem::take(&mut self.selection) {
            Selection::Empty => (Selection::HasSrc(node), ClickOutcome::SourceSet),
            Selection::HasSrc(src) => (
                Selection::HasBoth { src, dst: node },
                ClickOutcome::DestinationSet,
            ),
            Selection::HasBoth { .. } => (Selection::Empty, ClickOutcome::Cleared),
        };
        self.selection = next;
        outcome
    }

    /// Switch aircraft type. Selection is left alone. Returns whether the
    /// type actually changed.
    pub fn set_aircraft(&mut self, aircraft: AircraftType) -> bool {
        let changed = self.aircraft != aircraft;
        self.aircraft = aircraft;
        changed
    }

    pub fn clear(&mut self) {
        self.selection = Selection::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn node(uid: &str) -> Node {
        Node::new(uid, Location::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn clicks_cycle_through_states() {
        let mut machine = SelectionMachine::default();

        assert_eq!(machine.click(node("a")), ClickOutcome::SourceSet);
        assert_eq!(machine.selection().src().map(|n| n.uid.as_str()), Some("a"));
        assert!(machine.selection().dst().is_none());

        assert_eq!(machine.click(node("b")), ClickOutcome::DestinationSet);
        let (src, dst) = machine.selection().pair().unwrap();
        assert_eq!((src.uid.as_str(), dst.uid.as_str()), ("a", "b"));

        assert_eq!(machine.click(node("c")), ClickOutcome::Cleared);
        assert_eq!(machine.selection(), &Selection::Empty);

        assert_eq!(machine.click(node("c")), ClickOutcome::SourceSet);
    }

    #[test]
    fn same_node_can_be_source_and_destination() {
        let mut machine = SelectionMachine::default();
        machine.click(node("a"));
        machine.click(node("a"));
        let (src, dst) = machine.selection().pair().unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn aircraft_change_keeps_selection() {
        let mut machine = SelectionMachine::new(AircraftType::ArrowXl);
        machine.click(node("a"));
        assert!(machine.set_aircraft(AircraftType::ArrowCargo));
        assert!(!machine.set_aircraft(AircraftType::ArrowCargo));
        assert_eq!(machine.selection().src().map(|n| n.uid.as_str()), Some("a"));
    }
}
