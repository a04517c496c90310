use std::fmt::{self, Debug, Display};

/// An error wrapped with a human readable context.
pub(super) struct ContextError<M, E> {
    pub(super) context: M,
    pub(super) error: E,
}

impl<M, E> Debug for ContextError<M, E>
where
    M: Display,
    E: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextError")
            .field("context", &format_args!("{}", self.context))
            .field("error", &self.error)
            .finish()
    }
}

impl<M, E> Display for ContextError<M, E>
where
    M: Display,
    E: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.error)
    }
}

impl<M, E> std::error::Error for ContextError<M, E>
where
    M: Display,
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
