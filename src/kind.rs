/// Capability tags attached to a [`crate::Constructor`] through [`crate::Constructor::KINDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// The constructor expects the owning container as its first construction argument.
    Service,
}

#[inline]
#[must_use]
pub(crate) fn is_service(kinds: &[Kind]) -> bool {
    kinds.contains(&Kind::Service)
}
