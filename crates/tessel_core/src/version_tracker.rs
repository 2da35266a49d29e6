use std::cell::Cell;

/// Storage version of a shared object.
///
/// Objects live behind `Rc`, so the counter is interior-mutable: bumping it only
/// needs `&self`. Composite objects hash these versions to decide whether a cached
/// verdict is still valid.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    version: Cell<u64>,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: Cell::new(0),
        }
    }

    /// Records one storage change
    pub fn changed(&self) {
        self.version.set(self.version.get().wrapping_add(1));
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.get()
    }
}
