use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` provides synchronized access to a value of type `T` that can be shared
/// between the owning thread and the extraction workers. It uses an `Arc<RwLock<T>>`
/// internally, so any number of workers can sample the same chunk concurrently while
/// voxel edits take the write lock.
///
/// # Examples
///
/// ```
/// use voxel_world::core::MtResource;
///
/// let counter = MtResource::new(0);
/// *counter.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Poisoning
/// A worker that panics while holding a guard poisons the lock. The voxel data is plain
/// old data and stays consistent at every write, so the guards are recovered from the
/// poison instead of propagating the panic to every later reader.
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard that allows reading the contained value.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles point at the same underlying value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clones_share_the_value_across_threads() {
        let counter = MtResource::new(0);
        let counter_clone = counter.clone();

        let handle = thread::spawn(move || {
            *counter_clone.get_mut() += 1;
        });
        handle.join().unwrap();

        assert_eq!(*counter.get(), 1);
    }

    #[test]
    fn poisoned_lock_is_still_readable() {
        let value = MtResource::new(vec![1, 2, 3]);
        let poisoner = value.clone();

        let _ = thread::spawn(move || {
            let _guard = poisoner.get_mut();
            panic!("worker died while holding the lock");
        })
        .join();

        assert_eq!(value.get().len(), 3);
        value.get_mut().push(4);
        assert_eq!(value.get().len(), 4);
    }

    #[test]
    fn ptr_eq_tracks_identity() {
        let a = MtResource::new(1u8);
        let b = a.clone();
        let c = MtResource::new(1u8);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
