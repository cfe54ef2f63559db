//! Process-wide cookie set applied to new transfer requests.

use std::sync::{PoisonError, RwLock};

/// Last-write-wins set of `Cookie` header values.
///
/// Records copy the current set when they are created, so an update never
/// reaches a request that already exists.
#[derive(Debug, Default)]
pub struct CookieStore {
    current: RwLock<Vec<String>>,
}

impl CookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set.
    pub fn set(&self, cookies: Vec<String>) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = cookies;
    }

    /// A consistent copy of the current set.
    pub fn snapshot(&self) -> Vec<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_instead_of_merging() {
        let store = CookieStore::new();
        store.set(vec!["a=1".into(), "b=2".into()]);
        store.set(vec!["c=3".into()]);

        assert_eq!(store.snapshot(), vec!["c=3".to_string()]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshot_is_detached() {
        let store = CookieStore::new();
        store.set(vec!["a=1".into()]);
        let before = store.snapshot();

        store.set(Vec::new());

        assert_eq!(before, vec!["a=1".to_string()]);
        assert!(store.is_empty());
    }
}
