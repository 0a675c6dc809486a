use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type-safe resource handle
///
/// Handles stay valid for as long as the registry holds the resource, so a
/// renderer can keep one across any number of regenerations.
pub struct Handle<T> {
    id: u64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

// Manual impls: derives would require `T: Clone` etc. on the resource type.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", short_type_name::<T>(), self.id)
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Handle ID generator
static HANDLE_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_handle_id() -> u64 {
    HANDLE_ID.fetch_add(1, Ordering::Relaxed)
}
