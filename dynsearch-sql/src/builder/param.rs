//! Placeholder allocation.

use std::fmt;

/// A named placeholder, rendered as `@N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Param(usize);

impl Param {
    /// Numeric index of this placeholder.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Binding-table key: the index without the `@` marker.
    #[must_use]
    pub fn key(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Hands out placeholder names in strictly increasing order.
///
/// One allocator is shared by every leaf of a compile call, which is what
/// keeps placeholder names unique across a whole tree. It is deliberately not
/// `Clone`: two copies would hand out the same names.
///
/// ```
/// use dynsearch_sql::ParamAllocator;
///
/// let mut params = ParamAllocator::new();
/// assert_eq!(params.allocate().to_string(), "@0");
/// assert_eq!(params.allocate().to_string(), "@1");
/// assert_eq!(params.allocated(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ParamAllocator {
    start: usize,
    next: usize,
}

impl ParamAllocator {
    /// Allocator whose first placeholder is `@0`.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Allocator whose first placeholder is `@start`.
    #[must_use]
    pub const fn starting_at(start: usize) -> Self {
        Self { start, next: start }
    }

    /// Take the next placeholder.
    pub fn allocate(&mut self) -> Param {
        let param = Param(self.next);
        self.next += 1;
        param
    }

    /// Index the next call to [`allocate`](Self::allocate) will return.
    #[must_use]
    pub const fn peek(&self) -> usize {
        self.next
    }

    /// Number of placeholders handed out by this allocator.
    #[must_use]
    pub const fn allocated(&self) -> usize {
        self.next - self.start
    }

    pub(crate) fn commit(&mut self, scratch: Self) {
        debug_assert!(scratch.next >= self.next);
        self.next = scratch.next;
    }
}
