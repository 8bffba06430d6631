//! Element storage and the activation wiring table.

use crate::elements::{DungeonElement, ElementKind};
use log::debug;
use serde::{Deserialize, Serialize};

/// One directed activation edge: when `activator` fires, `target`'s
/// `activate` runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringEdge {
    pub activator: String,
    pub target: String,
}

/// Append-only store of level elements plus their activation wiring.
///
/// Duplicate ids are not rejected; lookups return the first match in
/// insertion order, so a duplicate silently shadows everything behind it.
/// Level authors own id hygiene.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    elements: Vec<DungeonElement>,
    wiring: Vec<WiringEdge>,
}

impl ElementRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element.
    pub fn add(&mut self, element: DungeonElement) {
        self.elements.push(element);
    }

    /// All elements, in insertion order.
    pub fn elements(&self) -> &[DungeonElement] {
        &self.elements
    }

    /// The wiring table, in subscription order.
    pub fn wiring(&self) -> &[WiringEdge] {
        &self.wiring
    }

    /// First element with the given id, regardless of variant.
    pub fn get(&self, id: &str) -> Option<&DungeonElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Typed first-match lookup: the first element with the given id that
    /// is also of variant `T`.
    pub fn get_element<T: ElementKind>(&self, id: &str) -> Option<&T> {
        self.elements
            .iter()
            .filter(|e| e.id() == id)
            .find_map(|e| T::from_element(e))
    }

    /// Mutable counterpart of [`get_element`](ElementRegistry::get_element).
    pub fn get_element_mut<T: ElementKind>(&mut self, id: &str) -> Option<&mut T> {
        self.elements
            .iter_mut()
            .filter(|e| e.id() == id)
            .find_map(|e| T::from_element_mut(e))
    }

    /// Subscribes `target` to `activator`'s activation event.
    ///
    /// Both ids must resolve to registered elements; otherwise this is a
    /// silent no-op, since level authors may wire optional elements that
    /// are absent from a given layout. Fan-in and fan-out are both
    /// unrestricted.
    pub fn wire_up(&mut self, activator: &str, target: &str) {
        if self.get(activator).is_none() || self.get(target).is_none() {
            debug!("wire_up skipped, unresolved id in {activator} -> {target}");
            return;
        }
        self.wiring.push(WiringEdge {
            activator: activator.to_string(),
            target: target.to_string(),
        });
    }

    /// Interacts with an element: runs its own `activate` (a switch flips
    /// to its thrown tile) and then fires its activation event so every
    /// wired target reacts. This is the player-facing entry point; an
    /// unknown id is a no-op.
    pub fn activate_element(&mut self, id: &str) {
        match self.elements.iter_mut().find(|e| e.id() == id) {
            Some(element) => element.activate(),
            None => return,
        }
        self.fire_activation(id);
    }

    /// Fires an activator's event: every subscribed target's `activate`
    /// runs synchronously, in subscription order, without touching the
    /// activator's own state (see
    /// [`activate_element`](ElementRegistry::activate_element) for the
    /// combined form). Firing an id with no subscribers (or no element at
    /// all) does nothing.
    pub fn fire_activation(&mut self, activator: &str) {
        let targets: Vec<String> = self
            .wiring
            .iter()
            .filter(|edge| edge.activator == activator)
            .map(|edge| edge.target.clone())
            .collect();

        for target in targets {
            if let Some(element) = self.elements.iter_mut().find(|e| e.id() == target) {
                element.activate();
            }
        }
    }

    /// Forwards a frame tick to every element.
    pub fn update(&mut self, delta_time: f32) {
        for element in &mut self.elements {
            element.update(delta_time);
        }
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the registry holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
