use parse_display::Display;

/// Errors reported by the registry, the dispatcher and the subscription layer.
#[non_exhaustive]
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[display("store `{name}` is already registered")]
    DuplicateStore { name: String },

    #[display("store `{name}` is not registered")]
    UnknownStore { name: String },

    #[display("store `{name}` does not hold a `{expected}`")]
    StoreType { name: String, expected: &'static str },

    /// `dispatch` was called while another dispatch was in flight.
    #[display("dispatch called during an in-flight dispatch")]
    ReentrantDispatch,

    /// The `Hookstores` a dispatch handle was taken from has been dropped.
    #[display("dispatch handle outlived its provider")]
    Detached,
}

impl std::error::Error for Error {}

impl Error {
    pub(crate) fn unknown_store(name: &str) -> Self {
        Error::UnknownStore {
            name: name.to_owned(),
        }
    }
}
