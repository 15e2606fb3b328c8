use alloc::{boxed::Box, vec::Vec};
use core::any::{type_name, TypeId};
use parking_lot::Mutex;
use tracing::{debug, error, info_span, warn};

use crate::{
    any::TypeInfo,
    descriptor::{instantiate, Constructor, Descriptor, ErasedArgs},
    errors::ResolveErrorKind,
    registry::{Candidate, Found, Registry, Slot},
    utils::thread_safety::{RcThreadSafety, WeakThreadSafety},
};

/// Registry of constructors and their instances.
///
/// A container is a handle: clones share the same entries.
/// A child container created with [`Container::with_parent`] resolves from its own entries first
/// and delegates a request to the parent chain only if it has nothing that satisfies it.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: RcThreadSafety<ContainerInner>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RcThreadSafety::new(ContainerInner {
                registry: Mutex::new(Registry::new()),
                parent: None,
            }),
        }
    }

    /// Creates child container layered over `parent`.
    /// The child only reads from the parent, it never copies the parent's entries.
    #[inline]
    #[must_use]
    pub fn with_parent(parent: Container) -> Self {
        Self {
            inner: RcThreadSafety::new(ContainerInner {
                registry: Mutex::new(Registry::new()),
                parent: Some(parent),
            }),
        }
    }

    /// Gets the parent container
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoParent`] if the container was created without parent
    #[inline]
    pub fn get_parent(&self) -> Result<Container, ResolveErrorKind> {
        self.inner.parent.clone().ok_or(ResolveErrorKind::NoParent)
    }

    #[inline]
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.inner.parent.is_some()
    }

    #[inline]
    #[must_use]
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: RcThreadSafety::downgrade(&self.inner),
        }
    }

    /// Returns `true` if both handles point to the same container
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Container) -> bool {
        RcThreadSafety::ptr_eq(&self.inner, &other.inner)
    }

    /// Gets an existing or a new instance of `T`.
    ///
    /// Resolution order:
    /// 1. The instance or factory registered for `T` in this container.
    /// 2. The first registered subtype of `T` (see [`Constructor::supertypes`]) in registration order.
    /// 3. The parent chain, if it has `T` or one of its subtypes.
    /// 4. A new instance of `T` built from [`Default`] arguments and cached in this container.
    ///
    /// Repeated calls return the same instance until the entry is replaced.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::Instantiate`] if the constructor fails
    pub fn get<T: Constructor + ?Sized>(&self) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        let span = info_span!("get", dependency = type_name::<T>());
        let _guard = span.enter();

        self.resolve::<T>(None)
    }

    /// Gets a new instance of `T` built from `args`, replacing the cached one.
    ///
    /// When a subtype of `T` substitutes it, the subtype is rebuilt instead,
    /// so `args` must be the subtype's [`Constructor::Args`].
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::IncorrectArgs`] if `args` don't match the substituted subtype's arguments
    /// - Returns [`ResolveErrorKind::Instantiate`] if the constructor fails
    pub fn get_with<T: Constructor + ?Sized>(&self, args: T::Args) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        let span = info_span!("get_with", dependency = type_name::<T>());
        let _guard = span.enter();

        self.resolve::<T>(Some(args))
    }

    /// Like [`Self::get`], but only for types registered in this container or its parents.
    /// `T` itself doesn't need to be a constructor, so a `dyn Trait` resolves to its registered subtypes.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotRegistered`] if neither `T` nor its subtypes are registered
    /// - Returns [`ResolveErrorKind::Instantiate`] if the constructor fails
    pub fn get_registered<T: ?Sized + 'static>(&self) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        let span = info_span!("get_registered", dependency = type_name::<T>());
        let _guard = span.enter();

        match self.lookup::<T>(None)? {
            Some(instance) => Ok(instance),
            None => Err(not_registered::<T>()),
        }
    }

    /// Like [`Self::get_with`], but only for constructors registered in this container or its parents.
    ///
    /// # Errors
    /// See [`Self::get_registered`] and [`Self::get_with`]
    pub fn get_registered_with<T: Constructor + ?Sized>(&self, args: T::Args) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        let span = info_span!("get_registered_with", dependency = type_name::<T>());
        let _guard = span.enter();

        match self.lookup::<T>(Some(&ErasedArgs::new(args)))? {
            Some(instance) => Ok(instance),
            None => Err(not_registered::<T>()),
        }
    }

    /// Checks whether `T` or one of its subtypes has an instance or factory in this container or its parents
    #[must_use]
    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        if self.has_own::<T>() {
            return true;
        }
        match &self.inner.parent {
            Some(parent) => parent.has::<T>(),
            None => false,
        }
    }

    /// Checks whether `T` or one of its subtypes has an instance or factory in this container, ignoring parents
    #[must_use]
    pub fn has_own<T: ?Sized + 'static>(&self) -> bool {
        self.inner.registry.lock().contains(&TypeId::of::<T>())
    }

    /// Registers a factory that builds `T` from `args` on the next [`Self::get`].
    /// Replaces any instance or factory registered for `T`.
    pub fn add<T: Constructor + ?Sized>(&self, args: T::Args) -> &Self {
        let descriptor = RcThreadSafety::new(Descriptor::of::<T>());
        let replaced = self.inner.registry.lock().insert(descriptor, Slot::Factory(ErasedArgs::new(args)));

        debug!(dependency = type_name::<T>(), replaced = replaced.is_some(), "Factory added");
        self
    }

    /// Builds `T` from `args` right away and registers the instance.
    /// Replaces any instance or factory registered for `T`, a cached instance is never reused.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::Instantiate`] if the constructor fails, the previous entry is kept in that case
    pub fn use_<T: Constructor + ?Sized>(&self, args: T::Args) -> Result<&Self, ResolveErrorKind> {
        let span = info_span!("use", dependency = type_name::<T>());
        let _guard = span.enter();

        let instance = match instantiate::<T>(self, args) {
            Ok(instance) => instance,
            Err(err) => {
                error!("{}", err);
                return Err(err.into());
            }
        };
        let descriptor = RcThreadSafety::new(Descriptor::of::<T>());
        let replaced = self.inner.registry.lock().insert(descriptor, Slot::Instance(Box::new(instance)));

        debug!(replaced = replaced.is_some(), "Cached");
        Ok(self)
    }

    /// Registers an already built instance of `T`.
    /// Replaces any instance or factory registered for `T`.
    pub fn set<T: Constructor + ?Sized>(&self, instance: RcThreadSafety<T>) -> &Self {
        let descriptor = RcThreadSafety::new(Descriptor::of::<T>());
        let replaced = self.inner.registry.lock().insert(descriptor, Slot::Instance(Box::new(instance)));

        debug!(dependency = type_name::<T>(), replaced = replaced.is_some(), "Instance set");
        self
    }

    /// Gets instances of every strict subtype of `T` registered in this container, in registration order.
    ///
    /// An entry registered for `T` itself isn't included and parents aren't searched.
    /// Pending factories are resolved and cached, so a later [`Self::get`] of the subtype returns the same instance.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::Instantiate`] if a factory's constructor fails
    pub fn find<T: ?Sized + 'static>(&self) -> Result<Vec<RcThreadSafety<T>>, ResolveErrorKind> {
        let span = info_span!("find", dependency = type_name::<T>());
        let _guard = span.enter();

        let candidates = self.inner.registry.lock().subtype_candidates::<T>()?;
        debug!(count = candidates.len(), "Subtypes found");

        let mut instances = Vec::with_capacity(candidates.len());
        for Candidate { descriptor, found } in candidates {
            let instance = match found {
                Found::Instance(instance) => instance,
                Found::Factory(args) => self.build::<T>(&descriptor, &args)?,
            };
            instances.push(instance);
        }

        Ok(instances)
    }
}

impl Container {
    fn resolve<T: Constructor + ?Sized>(&self, args: Option<T::Args>) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        let args = args.map(ErasedArgs::new);
        if let Some(instance) = self.lookup::<T>(args.as_ref())? {
            return Ok(instance);
        }

        let descriptor = RcThreadSafety::new(Descriptor::of::<T>());
        let args = args.unwrap_or_else(|| ErasedArgs::new(T::Args::default()));
        self.build::<T>(&descriptor, &args)
    }

    /// Finds `T` in this container or its parents without constructing unregistered types.
    /// Passed `args` rebuild the found entry.
    fn lookup<T: ?Sized + 'static>(&self, args: Option<&ErasedArgs>) -> Result<Option<RcThreadSafety<T>>, ResolveErrorKind> {
        let candidate = match self.inner.registry.lock().candidate::<T>() {
            Ok(candidate) => candidate,
            Err(err) => {
                error!("{}", err);
                return Err(err);
            }
        };

        let Some(Candidate { descriptor, found }) = candidate else {
            debug!("Not found in container");

            return match self.inner.parent.as_ref().filter(|parent| parent.has::<T>()) {
                Some(parent) => {
                    debug!("Delegated to parent");
                    parent.lookup::<T>(args)
                }
                None => Ok(None),
            };
        };

        if descriptor.type_info.id != TypeId::of::<T>() {
            debug!(subtype = descriptor.type_info.name, "Substituted by subtype");
        }

        match (found, args) {
            (Found::Instance(instance), None) => {
                debug!("Found in cache");
                Ok(Some(instance))
            }
            (Found::Factory(args), None) => {
                debug!("Found factory");
                self.build::<T>(&descriptor, &args).map(Some)
            }
            (_, Some(args)) => {
                debug!("Rebuilding with passed arguments");
                self.build::<T>(&descriptor, args).map(Some)
            }
        }
    }

    /// Builds the constructor described by `descriptor`, caches the instance under its key and returns it as `T`
    fn build<T: ?Sized + 'static>(&self, descriptor: &RcThreadSafety<Descriptor>, args: &ErasedArgs) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        let instance = match descriptor.construct(self, args) {
            Ok(instance) => instance,
            Err(err) => {
                error!("{}", err);
                return Err(err);
            }
        };
        let Some(casted) = descriptor.cast::<T>(&instance) else {
            let err = ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual: descriptor.type_info,
            };
            error!("{}", err);
            return Err(err);
        };

        // Replaced slot is dropped after the lock is released
        let _replaced = self.inner.registry.lock().insert(descriptor.clone(), Slot::Instance(instance));

        debug!(dependency = descriptor.type_info.name, "Cached");
        Ok(casted)
    }
}

fn not_registered<T: ?Sized + 'static>() -> ResolveErrorKind {
    let err = ResolveErrorKind::NotRegistered {
        type_info: TypeInfo::of::<T>(),
    };
    warn!("{}", err);
    err
}

/// Non-owning handle to a [`Container`]
#[derive(Clone)]
pub struct WeakContainer {
    inner: WeakThreadSafety<ContainerInner>,
}

impl WeakContainer {
    #[inline]
    #[must_use]
    pub fn upgrade(&self) -> Option<Container> {
        self.inner.upgrade().map(|inner| Container { inner })
    }
}

pub(crate) struct ContainerInner {
    pub(crate) registry: Mutex<Registry>,
    pub(crate) parent: Option<Container>,
}
