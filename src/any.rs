use core::{
    any::{type_name, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

/// Identity of a constructor: its [`TypeId`] plus the type name kept for logs and errors.
/// Equality and ordering only consider the id.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeInfo;

    use alloc::string::ToString as _;

    trait Named {}

    struct Plain;

    #[test]
    fn test_identity() {
        assert_eq!(TypeInfo::of::<Plain>(), TypeInfo::of::<Plain>());
        assert_ne!(TypeInfo::of::<Plain>(), TypeInfo::of::<dyn Named>());
    }

    #[test]
    fn test_short_name() {
        let type_info = TypeInfo::of::<Plain>();

        assert_eq!(type_info.short_name(), "Plain");
        assert!(type_info.to_string().ends_with("any::tests::Plain"));
    }
}
