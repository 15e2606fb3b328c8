use super::instantiate::InstantiateErrorKind;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("The constructor {} is not registered", type_info.short_name())]
    NotRegistered { type_info: TypeInfo },
    #[error("The service container has no parent")]
    NoParent,
    #[error("The service container was dropped before the service used it")]
    ContainerDropped,
    #[error("Incorrect instance type. Actual: {}, expected: {}", actual.short_name(), expected.short_name())]
    IncorrectType { expected: TypeInfo, actual: TypeInfo },
    #[error(
        "Incorrect constructor arguments. The constructor {} takes {}, but {} given",
        type_info.short_name(), expected.name, actual.name,
    )]
    IncorrectArgs {
        type_info: TypeInfo,
        expected: TypeInfo,
        actual: TypeInfo,
    },
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
}
