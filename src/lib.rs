//! A minimal service container.
//!
//! Types implement [`Constructor`] to tell the container how they are built. A [`Container`] caches one
//! instance per type, builds missing instances on demand, substitutes a registered subtype when its
//! base type is requested and falls back to its parent chain for types it has nothing for.
//!
//! ```rust
//! use service_container::{supertypes, Constructor, Container, InstantiateResult, Supertype};
//! use std::sync::Arc;
//!
//! trait Storage: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//!
//! struct Memory(String);
//!
//! impl Storage for Memory {
//!     fn name(&self) -> &str {
//!         &self.0
//!     }
//! }
//!
//! impl Constructor for Memory {
//!     type Args = (String,);
//!
//!     fn supertypes() -> Vec<Supertype> {
//!         supertypes![dyn Storage]
//!     }
//!
//!     fn construct(_: Option<Container>, (name,): Self::Args) -> InstantiateResult<Arc<Self>> {
//!         Ok(Arc::new(Self(name)))
//!     }
//! }
//!
//! let app = Container::new();
//! app.add::<Memory>(("memory".to_owned(),));
//!
//! let request = Container::with_parent(app.clone());
//! let storage = request.get_registered::<dyn Storage>().unwrap();
//!
//! assert_eq!(storage.name(), "memory");
//! assert!(Arc::ptr_eq(&app.get::<Memory>().unwrap(), &request.get::<Memory>().unwrap()));
//! ```
//!
//! Only constructors can be resolved:
//!
//! ```compile_fail
//! use service_container::Container;
//!
//! struct NotConstructor;
//!
//! let _ = Container::new().get::<NotConstructor>();
//! ```
#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod container;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod kind;
pub(crate) mod registry;
pub(crate) mod service;

pub mod utils;

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec;
}

pub use any::TypeInfo;
pub use container::{Container, WeakContainer};
pub use descriptor::{Constructor, Supertype};
pub use errors::{InstantiateErrorKind, InstantiateResult, ResolveErrorKind};
pub use kind::Kind;
pub use service::Service;
