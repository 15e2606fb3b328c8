#![cfg(feature = "thread_safe")]

use service_container::{
    supertypes, Constructor, Container, InstantiateErrorKind, InstantiateResult, Kind, ResolveErrorKind, Service, Supertype,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tracing_test::traced_test;

trait Repository: Send + Sync {
    fn url(&self) -> String;
}

impl Constructor for dyn Repository {
    type Args = ();

    fn construct(_: Option<Container>, (): ()) -> InstantiateResult<Arc<Self>> {
        Ok(Arc::new(Cache) as Arc<Self>)
    }
}

struct Database {
    url: String,
}

impl Repository for Database {
    fn url(&self) -> String {
        self.url.clone()
    }
}

impl Constructor for Database {
    type Args = (String,);

    fn supertypes() -> Vec<Supertype> {
        supertypes![dyn Repository]
    }

    fn construct(container: Option<Container>, (url,): Self::Args) -> InstantiateResult<Arc<Self>> {
        assert!(container.is_none());
        Ok(Arc::new(Self { url }))
    }
}

struct Cache;

impl Repository for Cache {
    fn url(&self) -> String {
        "memory://".to_owned()
    }
}

impl Constructor for Cache {
    type Args = ();

    fn supertypes() -> Vec<Supertype> {
        supertypes![dyn Repository]
    }

    fn construct(_: Option<Container>, (): ()) -> InstantiateResult<Arc<Self>> {
        Ok(Arc::new(Self))
    }
}

struct Users {
    service: Service,
    table: String,
}

impl Users {
    fn location(&self) -> Result<String, ResolveErrorKind> {
        let repository = self.service.get_registered_service::<dyn Repository>()?;
        Ok(format!("{}/{}", repository.url(), self.table))
    }
}

impl Constructor for Users {
    type Args = (String,);

    const KINDS: &'static [Kind] = &[Kind::Service];

    fn construct(container: Option<Container>, (table,): Self::Args) -> InstantiateResult<Arc<Self>> {
        if container.is_none() {
            return Err(InstantiateErrorKind::Custom(anyhow::anyhow!("users need a container")));
        }
        Ok(Arc::new(Self {
            service: Service::new(container),
            table,
        }))
    }
}

#[test]
#[traced_test]
fn test_singleton() {
    let container = Container::new();

    let first = container.get::<Database>().unwrap();
    let second = container.get::<Database>().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
#[traced_test]
fn test_args_force_reconstruction() {
    let container = Container::new();

    let a = container.get_with::<Database>(("a".to_owned(),)).unwrap();
    assert!(Arc::ptr_eq(&a, &container.get::<Database>().unwrap()));

    let b = container.get_with::<Database>(("b".to_owned(),)).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.url, "a");
    assert_eq!(b.url, "b");
}

#[test]
#[traced_test]
fn test_factory_laziness() {
    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Constructor for Counted {
        type Args = ();

        fn construct(_: Option<Container>, (): ()) -> InstantiateResult<Arc<Self>> {
            CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Self))
        }
    }

    let container = Container::new();
    container.add::<Counted>(());

    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 0);

    container.get::<Counted>().unwrap();
    container.get::<Counted>().unwrap();

    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
}

#[test]
#[traced_test]
fn test_subtype_substitution() {
    let container = Container::new();
    container.add::<Database>(("postgres://".to_owned(),));

    assert_eq!(container.get::<dyn Repository>().unwrap().url(), "postgres://");

    let container = Container::new();

    assert_eq!(container.get::<dyn Repository>().unwrap().url(), "memory://");
    assert!(container.has_own::<dyn Repository>());
    assert!(!container.has_own::<Cache>());
}

#[test]
#[traced_test]
fn test_parent_delegation() {
    let parent = Container::new();
    parent.add::<Database>(("parent://".to_owned(),));
    let child = Container::with_parent(parent.clone());

    let database = child.get::<Database>().unwrap();

    assert_eq!(database.url, "parent://");
    assert!(Arc::ptr_eq(&database, &parent.get::<Database>().unwrap()));
    assert!(!child.has_own::<Database>());
    assert!(parent.has_own::<Database>());
}

#[test]
#[traced_test]
fn test_set_overrides_get() {
    let container = Container::new();
    let database = Arc::new(Database {
        url: "set://".to_owned(),
    });

    container.set::<Database>(database.clone());

    assert!(Arc::ptr_eq(&database, &container.get::<Database>().unwrap()));
}

#[test]
#[traced_test]
fn test_service_aware_construction() {
    let app = Container::new();
    app.add::<Cache>(());
    let request = Container::with_parent(app);
    request.add::<Users>(("users".to_owned(),));

    let users = request.get::<Users>().unwrap();

    assert_eq!(users.location().unwrap(), "memory:///users");
    assert!(users.service.container().unwrap().ptr_eq(&request));
}

#[test]
#[traced_test]
fn test_service_outlived_container() {
    let container = Container::new();
    container.add::<Database>(("postgres://".to_owned(),));
    let users = container.get::<Users>().unwrap();

    assert_eq!(users.location().unwrap(), "postgres:///");

    drop(container);

    assert!(matches!(users.location(), Err(ResolveErrorKind::ContainerDropped)));
}

#[test]
#[traced_test]
fn test_find_in_registration_order() {
    let container = Container::new();
    container
        .add::<Cache>(())
        .add::<Database>(("postgres://".to_owned(),))
        .add::<Cache>(());

    let urls = container
        .find::<dyn Repository>()
        .unwrap()
        .iter()
        .map(|repository| repository.url())
        .collect::<Vec<_>>();

    assert_eq!(urls, ["memory://", "postgres://"]);
    assert_eq!(container.get::<dyn Repository>().unwrap().url(), "memory://");
}

#[test]
#[traced_test]
fn test_constructor_error() {
    #[derive(Debug)]
    struct Broken;

    impl Constructor for Broken {
        type Args = ();

        fn construct(_: Option<Container>, (): ()) -> InstantiateResult<Arc<Self>> {
            Err(anyhow::anyhow!("connection refused").into())
        }
    }

    let container = Container::new();

    let err = container.get::<Broken>().unwrap_err();

    assert!(matches!(err, ResolveErrorKind::Instantiate(_)));
    assert_eq!(err.to_string(), "connection refused");
    assert!(!container.has::<Broken>());
}

#[test]
#[traced_test]
fn test_get_registered() {
    let service = Service::default();

    let Err(err) = service.get_registered_service::<dyn Repository>() else {
        panic!("repository shouldn't be registered");
    };

    assert_eq!(err.to_string(), "The constructor Repository is not registered");
}
