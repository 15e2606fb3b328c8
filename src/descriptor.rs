use alloc::{boxed::Box, vec::Vec};
use core::any::TypeId;
use tracing::debug;

use crate::{
    any::TypeInfo,
    errors::{InstantiateResult, ResolveErrorKind},
    kind::{is_service, Kind},
    utils::thread_safety::{BoxAnyThreadSafety, RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety},
    Container,
};

/// A type the container knows how to build.
///
/// `Self` may be unsized, so a `dyn Trait` can be registered and resolved like any other
/// constructor and act as the base type of the implementations that declare it in
/// [`Constructor::supertypes`].
pub trait Constructor: SendSafety + SyncSafety + 'static {
    /// Construction arguments, usually a tuple.
    /// [`Container::get`] builds missing instances from [`Default::default`].
    type Args: Clone + Default + SendSafety + SyncSafety + 'static;

    /// Capability tags. Constructors tagged with [`Kind::Service`] receive the owning container.
    const KINDS: &'static [Kind] = &[];

    /// Types this constructor can stand in for when one of them is requested and isn't registered.
    /// Ancestors aren't inferred: list every type the substitution should apply to.
    #[must_use]
    fn supertypes() -> Vec<Supertype> {
        Vec::new()
    }

    /// Builds an instance.
    /// `container` is `Some` only if [`Self::KINDS`] contains [`Kind::Service`].
    /// The container caches the built instance, so keeping a strong `container` in it forms a reference cycle:
    /// store a [`crate::Service`] or a [`crate::WeakContainer`] instead.
    ///
    /// # Errors
    /// Failures are returned to the resolving caller as [`ResolveErrorKind::Instantiate`].
    fn construct(container: Option<Container>, args: Self::Args) -> InstantiateResult<RcThreadSafety<Self>>;
}

type UpcastFn = fn(&BoxAnyThreadSafety, &BoxAnyThreadSafety) -> Option<BoxAnyThreadSafety>;

/// Declared "is subtype of" relation between a constructor and one of its base types
pub struct Supertype {
    type_info: TypeInfo,
    cast: BoxAnyThreadSafety,
    upcast: UpcastFn,
}

impl Supertype {
    /// Declares that `Sub` can be used where `Super` is requested, converting instances with `cast`.
    #[inline]
    #[must_use]
    pub fn new<Sub, Super>(cast: fn(RcThreadSafety<Sub>) -> RcThreadSafety<Super>) -> Self
    where
        Sub: ?Sized + 'static,
        Super: ?Sized + SendSafety + SyncSafety + 'static,
    {
        Self {
            type_info: TypeInfo::of::<Super>(),
            cast: Box::new(cast),
            upcast: upcast::<Sub, Super>,
        }
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }
}

fn upcast<Sub, Super>(cast: &BoxAnyThreadSafety, instance: &BoxAnyThreadSafety) -> Option<BoxAnyThreadSafety>
where
    Sub: ?Sized + 'static,
    Super: ?Sized + SendSafety + SyncSafety + 'static,
{
    let cast = cast.downcast_ref::<fn(RcThreadSafety<Sub>) -> RcThreadSafety<Super>>()?;
    let instance = instance.downcast_ref::<RcThreadSafety<Sub>>()?;
    Some(Box::new(cast(instance.clone())))
}

/// Builds the [`Constructor::supertypes`] list for types reachable by unsizing coercion.
///
/// # Examples
/// ```rust
/// use service_container::{supertypes, Constructor, Container, InstantiateResult, Supertype};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {}
///
/// #[derive(Default)]
/// struct ConsoleLogger;
///
/// impl Logger for ConsoleLogger {}
///
/// impl Constructor for ConsoleLogger {
///     type Args = ();
///
///     fn supertypes() -> Vec<Supertype> {
///         supertypes![dyn Logger]
///     }
///
///     fn construct(_: Option<Container>, (): ()) -> InstantiateResult<Arc<Self>> {
///         Ok(Arc::new(Self))
///     }
/// }
/// ```
#[macro_export]
macro_rules! supertypes {
    ($($super:ty),* $(,)?) => {
        $crate::__private::vec![
            $(
                $crate::Supertype::new::<Self, $super>(
                    |this: $crate::utils::thread_safety::RcThreadSafety<Self>| -> $crate::utils::thread_safety::RcThreadSafety<$super> { this },
                ),
            )*
        ]
    };
}

/// Type-erased constructor arguments, shared between a pending registration and its constructions
#[derive(Clone)]
pub(crate) struct ErasedArgs {
    type_info: TypeInfo,
    value: RcAnyThreadSafety,
}

impl ErasedArgs {
    #[inline]
    #[must_use]
    pub(crate) fn new<Args: SendSafety + SyncSafety + 'static>(args: Args) -> Self {
        Self {
            type_info: TypeInfo::of::<Args>(),
            value: RcThreadSafety::new(args),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn get<Args: Clone + 'static>(&self) -> Option<Args> {
        self.value.downcast_ref::<Args>().cloned()
    }
}

type ConstructFn = fn(&Container, &ErasedArgs) -> Result<BoxAnyThreadSafety, ResolveErrorKind>;

/// Registration record of a constructor: identity, supertypes and an erased way to build it
pub(crate) struct Descriptor {
    pub(crate) type_info: TypeInfo,
    pub(crate) supertypes: Vec<Supertype>,
    construct: ConstructFn,
}

impl Descriptor {
    #[must_use]
    pub(crate) fn of<T: Constructor + ?Sized>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            supertypes: T::supertypes(),
            construct: construct_erased::<T>,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn is_subtype_of(&self, type_id: &TypeId) -> bool {
        self.type_info.id != *type_id && self.supertypes.iter().any(|supertype| supertype.type_info.id == *type_id)
    }

    /// Builds a new instance with `args`, which must hold this constructor's [`Constructor::Args`]
    #[inline]
    pub(crate) fn construct(&self, container: &Container, args: &ErasedArgs) -> Result<BoxAnyThreadSafety, ResolveErrorKind> {
        (self.construct)(container, args)
    }

    /// Views an instance of this constructor as `T`, either directly or through a declared supertype
    #[must_use]
    pub(crate) fn cast<T: ?Sized + 'static>(&self, instance: &BoxAnyThreadSafety) -> Option<RcThreadSafety<T>> {
        let type_id = TypeId::of::<T>();
        if self.type_info.id == type_id {
            return instance.downcast_ref::<RcThreadSafety<T>>().cloned();
        }

        let supertype = self.supertypes.iter().find(|supertype| supertype.type_info.id == type_id)?;
        let upcasted = (supertype.upcast)(&supertype.cast, instance)?;
        upcasted.downcast::<RcThreadSafety<T>>().ok().map(|boxed| *boxed)
    }
}

/// Builds `T` with the owning container prepended for [`Kind::Service`] constructors
pub(crate) fn instantiate<T: Constructor + ?Sized>(container: &Container, args: T::Args) -> InstantiateResult<RcThreadSafety<T>> {
    if is_service(T::KINDS) {
        debug!("Constructing as service");
        T::construct(Some(container.clone()), args)
    } else {
        debug!("Constructing");
        T::construct(None, args)
    }
}

fn construct_erased<T: Constructor + ?Sized>(container: &Container, args: &ErasedArgs) -> Result<BoxAnyThreadSafety, ResolveErrorKind> {
    let Some(typed_args) = args.get::<T::Args>() else {
        return Err(ResolveErrorKind::IncorrectArgs {
            type_info: TypeInfo::of::<T>(),
            expected: TypeInfo::of::<T::Args>(),
            actual: args.type_info,
        });
    };

    let instance = instantiate::<T>(container, typed_args)?;
    Ok(Box::new(instance))
}
