// Copyright (c) 2024 Mike Tsao

//! Stable identifiers, and factories that help ensure they are in fact unique.

use core::sync::atomic::Ordering;
use core::{hash::Hash, marker::PhantomData, sync::atomic::AtomicUsize};
use serde::{Deserialize, Serialize};

/// Something that can serve as a uid.
pub trait IsUid: Eq + Hash + Clone + From<usize> {
    /// Returns the raw uid.
    fn as_usize(&self) -> usize;
}

/// Generates unique uids.
///
/// A uid outlives any positional index: deleting a track renumbers the tracks
/// after it, but their uids don't change.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UidFactory<U: IsUid> {
    pub(crate) next_uid_value: AtomicUsize,
    #[serde(skip)]
    pub(crate) _phantom: PhantomData<U>,
}
impl<U: IsUid> UidFactory<U> {
    /// Creates a new [UidFactory] starting with the given value.
    pub fn new(first_uid: usize) -> Self {
        Self {
            next_uid_value: AtomicUsize::new(first_uid),
            _phantom: Default::default(),
        }
    }

    /// Generates the next unique uid.
    pub fn mint_next(&self) -> U {
        let uid_value = self.next_uid_value.fetch_add(1, Ordering::Relaxed);
        U::from(uid_value)
    }

    /// Notifies the factory that a uid exists that it didn't mint (for
    /// example, one that arrived with a deserialized sequence), so that it
    /// never mints a duplicate.
    pub fn notify_externally_minted_uid(&self, uid: U) {
        self.next_uid_value
            .fetch_max(uid.as_usize() + 1, Ordering::Relaxed);
    }
}
impl<U: IsUid> PartialEq for UidFactory<U> {
    fn eq(&self, other: &Self) -> bool {
        self.next_uid_value.load(Ordering::Relaxed) == other.next_uid_value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::TrackUid;
    use rustc_hash::FxHashSet;

    #[test]
    fn uid_factory_never_repeats() {
        let f = UidFactory::<TrackUid>::new(1);

        let mut uids = FxHashSet::default();
        for _ in 0..64 {
            assert!(uids.insert(f.mint_next()), "minted uids should be unique");
        }
    }

    #[test]
    fn uid_factory_with_notify_works() {
        let f = UidFactory::<TrackUid>::new(1);

        let uid_1 = f.mint_next();
        let uid_2 = f.mint_next();
        assert_ne!(uid_1, uid_2);

        let uid_3 = TrackUid(uid_2.0 + 1);
        f.notify_externally_minted_uid(uid_3);
        let uid_4 = f.mint_next();
        assert_ne!(uid_3, uid_4, "Notifying factory should cause it to skip past.");

        f.notify_externally_minted_uid(uid_1);
        let uid_5 = f.mint_next();
        assert_eq!(
            uid_5.0,
            uid_4.0 + 1,
            "Notifying factory about value below next should be no-op."
        );
    }
}
