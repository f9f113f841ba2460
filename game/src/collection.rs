//! Unordered collection of active entity handles.

/// Handles of the entities updated once per tick.
///
/// Finished entities are removed by swapping the last handle into their
/// place, so iteration order is not preserved across ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameBehaviorCollection<H> {
    behaviors: Vec<H>,
}

impl<H: Copy> GameBehaviorCollection<H> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            behaviors: Vec::new(),
        }
    }

    /// Registers a handle for updates starting with the next pass.
    pub fn add(&mut self, behavior: H) {
        self.behaviors.push(behavior);
    }

    /// Whether no entity is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Number of active entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Iterates over the active handles in storage order.
    pub fn iter(&self) -> impl Iterator<Item = H> + '_ {
        self.behaviors.iter().copied()
    }

    /// Calls `update` exactly once per handle, dropping every handle for which it returns `false`.
    pub fn game_update(&mut self, mut update: impl FnMut(H) -> bool) {
        let mut index = 0;
        while index < self.behaviors.len() {
            if update(self.behaviors[index]) {
                index += 1;
            } else {
                let _ = self.behaviors.swap_remove(index);
            }
        }
    }

    /// Empties the collection, passing every handle to `recycle` exactly once.
    pub fn clear(&mut self, mut recycle: impl FnMut(H)) {
        for behavior in self.behaviors.drain(..) {
            recycle(behavior);
        }
    }
}

impl<H: Copy> Default for GameBehaviorCollection<H> {
    fn default() -> Self {
        Self::new()
    }
}
