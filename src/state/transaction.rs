use std::sync::Arc;

/// A value with an optional open transaction.
///
/// `begin` shares the current value as the snapshot; the first write after
/// that clones it (copy-on-write), so an untouched session costs nothing.
/// `rollback` swaps the snapshot back in, `commit` drops it.
#[derive(Debug, Clone)]
pub struct Transaction<T: Clone> {
    current: Arc<T>,
    snapshot: Option<Arc<T>>,
}

impl<T: Clone> Transaction<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: Arc::new(value),
            snapshot: None,
        }
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn is_open(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Open a transaction on the current value. Returns false if one is open.
    pub fn begin(&mut self) -> bool {
        if self.snapshot.is_some() {
            return false;
        }
        self.snapshot = Some(Arc::clone(&self.current));
        true
    }

    /// Mutable access to the working value.
    pub fn make_mut(&mut self) -> &mut T {
        Arc::make_mut(&mut self.current)
    }

    /// Keep the working value. Returns false if no transaction was open.
    pub fn commit(&mut self) -> bool {
        self.snapshot.take().is_some()
    }

    /// Restore the value captured by `begin`. Returns false if no transaction was open.
    pub fn rollback(&mut self) -> bool {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.current = snapshot;
                true
            }
            None => false,
        }
    }

    /// Replace the value outright, discarding any open transaction.
    pub fn reset(&mut self, value: T) {
        self.current = Arc::new(value);
        self.snapshot = None;
    }
}
