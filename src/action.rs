use std::fmt::Debug;

/// An intent to change state, dispatched to every store.
///
/// Implement this on an enum with one variant per kind of action.
/// Every reducer receives every action, so reducers match the variants they handle
/// and pass their state through unchanged for the rest.
///
/// ```
/// use hookstores::Action;
///
/// #[derive(Debug)]
/// enum SquareAction {
///     Toggle { color: char },
///     Reset,
/// }
///
/// impl Action for SquareAction {
///     fn name(&self) -> &'static str {
///         match self {
///             SquareAction::Toggle { .. } => "TOGGLE_SQUARE",
///             SquareAction::Reset => "RESET",
///         }
///     }
/// }
/// ```
pub trait Action: Debug + 'static {
    /// The kind of this action, used in log lines.
    fn name(&self) -> &'static str;
}
