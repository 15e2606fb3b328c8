use alloc::vec::Vec;
use tracing::error;

use crate::{
    container::{Container, WeakContainer},
    descriptor::Constructor,
    errors::{InstantiateResult, ResolveErrorKind},
    kind::Kind,
    utils::thread_safety::RcThreadSafety,
};

#[derive(Clone)]
enum Handle {
    Owned(Container),
    Shared(WeakContainer),
}

/// Access to a container for types that resolve their own dependencies.
///
/// Embed it in a constructor tagged with [`Kind::Service`] and build it from the container
/// passed to [`Constructor::construct`]:
///
/// ```rust
/// use service_container::{Constructor, Container, InstantiateResult, Kind, Service};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Config {
///     sender: String,
/// }
///
/// impl Constructor for Config {
///     type Args = ();
///
///     fn construct(_: Option<Container>, (): ()) -> InstantiateResult<Arc<Self>> {
///         Ok(Arc::new(Self { sender: "noreply@example.com".to_owned() }))
///     }
/// }
///
/// struct Mailer {
///     service: Service,
/// }
///
/// impl Mailer {
///     fn sender(&self) -> String {
///         self.service.get_service::<Config>().unwrap().sender.clone()
///     }
/// }
///
/// impl Constructor for Mailer {
///     type Args = ();
///
///     const KINDS: &'static [Kind] = &[Kind::Service];
///
///     fn construct(container: Option<Container>, (): ()) -> InstantiateResult<Arc<Self>> {
///         Ok(Arc::new(Self { service: Service::new(container) }))
///     }
/// }
///
/// let container = Container::new();
/// let mailer = container.get::<Mailer>().unwrap();
///
/// assert_eq!(mailer.sender(), "noreply@example.com");
/// ```
///
/// A container passed in is held weakly, because the container usually owns the service's instance.
/// Without a container, the service creates and owns a new one.
#[derive(Clone)]
pub struct Service {
    handle: Handle,
}

impl Default for Service {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Service {
    #[inline]
    #[must_use]
    pub fn new(container: Option<Container>) -> Self {
        let handle = match container {
            Some(container) => Handle::Shared(container.downgrade()),
            None => Handle::Owned(Container::new()),
        };
        Self { handle }
    }

    /// # Errors
    /// - Returns [`ResolveErrorKind::ContainerDropped`] if the container passed to [`Self::new`] no longer exists
    pub fn container(&self) -> Result<Container, ResolveErrorKind> {
        match &self.handle {
            Handle::Owned(container) => Ok(container.clone()),
            Handle::Shared(container) => container.upgrade().ok_or_else(|| {
                let err = ResolveErrorKind::ContainerDropped;
                error!("{}", err);
                err
            }),
        }
    }

    /// Forwards to [`Container::get`]
    ///
    /// # Errors
    /// See [`Self::container`] and [`Container::get`]
    #[inline]
    pub fn get_service<T: Constructor + ?Sized>(&self) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        self.container()?.get::<T>()
    }

    /// Forwards to [`Container::get_with`]
    ///
    /// # Errors
    /// See [`Self::container`] and [`Container::get_with`]
    #[inline]
    pub fn get_service_with<T: Constructor + ?Sized>(&self, args: T::Args) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        self.container()?.get_with::<T>(args)
    }

    /// Forwards to [`Container::get_registered`]
    ///
    /// # Errors
    /// See [`Self::container`] and [`Container::get_registered`]
    #[inline]
    pub fn get_registered_service<T: ?Sized + 'static>(&self) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        self.container()?.get_registered::<T>()
    }

    /// Forwards to [`Container::has`], a dropped container has nothing
    #[inline]
    #[must_use]
    pub fn has_service<T: ?Sized + 'static>(&self) -> bool {
        self.container().is_ok_and(|container| container.has::<T>())
    }

    /// Forwards to [`Container::add`]
    ///
    /// # Errors
    /// See [`Self::container`]
    #[inline]
    pub fn add_service<T: Constructor + ?Sized>(&self, args: T::Args) -> Result<&Self, ResolveErrorKind> {
        self.container()?.add::<T>(args);
        Ok(self)
    }

    /// Forwards to [`Container::use_`]
    ///
    /// # Errors
    /// See [`Self::container`] and [`Container::use_`]
    #[inline]
    pub fn use_service<T: Constructor + ?Sized>(&self, args: T::Args) -> Result<&Self, ResolveErrorKind> {
        self.container()?.use_::<T>(args)?;
        Ok(self)
    }

    /// Forwards to [`Container::set`]
    ///
    /// # Errors
    /// See [`Self::container`]
    #[inline]
    pub fn set_service<T: Constructor + ?Sized>(&self, instance: RcThreadSafety<T>) -> Result<&Self, ResolveErrorKind> {
        self.container()?.set::<T>(instance);
        Ok(self)
    }

    /// Forwards to [`Container::find`]
    ///
    /// # Errors
    /// See [`Self::container`] and [`Container::find`]
    #[inline]
    pub fn find_service<T: ?Sized + 'static>(&self) -> Result<Vec<RcThreadSafety<T>>, ResolveErrorKind> {
        self.container()?.find::<T>()
    }
}

impl Constructor for Service {
    type Args = ();

    const KINDS: &'static [Kind] = &[Kind::Service];

    fn construct(container: Option<Container>, (): ()) -> InstantiateResult<RcThreadSafety<Self>> {
        Ok(RcThreadSafety::new(Self::new(container)))
    }
}
