use core::num::NonZero;

// Tests shrink the handle space so exhausting it stays cheap.
#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Index of a slot in an [`Arena`](super::Arena).
///
/// Stored as `index + 1` so that `Option<Handle>`, the type of every parent
/// and child link, is no larger than the raw integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// The largest index a handle can carry.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    /// The number of distinct handles, and so the most slots one arena (and
    /// therefore one tree) can ever address.
    pub(crate) const COUNT: usize = Self::MAX + 1;

    /// Returns the handle for `index`, or `None` when `index` is past
    /// [`Handle::MAX`].
    #[inline]
    pub(crate) const fn try_from_index(index: usize) -> Option<Self> {
        if index > Self::MAX {
            return None;
        }

        #[allow(clippy::cast_possible_truncation)]
        let raw = (index + 1) as RawHandle;
        match NonZero::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
