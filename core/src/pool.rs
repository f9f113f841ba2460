//! Arena of reusable slots backing the entity factories.

/// Index of a slot inside a [`SlotPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a slot identifier from its numeric index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the slot within the arena storage.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Growable arena that hands out slots and keeps released ones on a free-list.
///
/// Values stay in place while their slot is free, so state established when a
/// slot is first created survives every later reuse of that slot.
#[derive(Debug)]
pub struct SlotPool<T> {
    values: Vec<T>,
    active: Vec<bool>,
    free: Vec<SlotId>,
}

impl<T> SlotPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            active: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Activates a free slot, or grows the arena by one value built with `create`.
    pub fn acquire_with(&mut self, create: impl FnOnce(SlotId) -> T) -> SlotId {
        if let Some(slot) = self.free.pop() {
            self.active[slot.index()] = true;
            return slot;
        }

        let slot = SlotId::new(self.values.len() as u32);
        self.values.push(create(slot));
        self.active.push(true);
        slot
    }

    /// Same as [`SlotPool::acquire_with`] but also lends out the activated value.
    pub fn acquire_mut(&mut self, create: impl FnOnce(SlotId) -> T) -> (SlotId, &mut T) {
        let slot = self.acquire_with(create);
        (slot, &mut self.values[slot.index()])
    }

    /// Returns an active slot to the free-list.
    ///
    /// Releasing a slot that is not active is an invariant violation.
    pub fn release(&mut self, slot: SlotId) {
        debug_assert!(self.is_active(slot), "slot {} released twice", slot.get());
        if self.is_active(slot) {
            self.active[slot.index()] = false;
            self.free.push(slot);
        }
    }

    /// Reports whether the slot is currently handed out.
    #[must_use]
    pub fn is_active(&self, slot: SlotId) -> bool {
        self.active.get(slot.index()).copied().unwrap_or(false)
    }

    /// Resolves an active slot.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&T> {
        if self.is_active(slot) {
            self.values.get(slot.index())
        } else {
            None
        }
    }

    /// Resolves an active slot for mutation.
    #[must_use]
    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut T> {
        if self.is_active(slot) {
            self.values.get_mut(slot.index())
        } else {
            None
        }
    }

    /// Number of slots currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.values.len() - self.free.len()
    }

    /// Total number of slots ever allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
