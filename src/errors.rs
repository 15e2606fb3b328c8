mod instantiate;
mod resolve;

pub use instantiate::InstantiateErrorKind;
pub use resolve::ResolveErrorKind;

pub type InstantiateResult<T> = Result<T, InstantiateErrorKind>;
