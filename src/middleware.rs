//! The per-middleware declaration: a name, a wrapping transform, and
//! ordering/requirement constraints.

use std::fmt;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler, Next};

/// Type-erased wrapping transform: given the rest of the chain, produce the
/// handler for this layer.
pub(crate) type WrapFn = Arc<dyn Fn(Next) -> BoxedHandler + Send + Sync + 'static>;

/// One named middleware declaration.
///
/// The wrap closure receives a [`Next`] for the remainder of the chain and
/// returns the wrapping handler. Constraints are declared by name:
///
/// ```rust
/// use lamina::{Middleware, Next, Request};
///
/// let auth = Middleware::new("auth", |next: Next| {
///     move |req: Request| {
///         let next = next.clone();
///         async move {
///             // inspect req, then hand it down the chain
///             next.run(req).await
///         }
///     }
/// })
/// .requires(["session"])
/// .after(["request-id"]);
/// ```
///
/// `requires` is existence-only: compilation fails if the named middleware
/// is absent, but it never influences ordering. `before` and `after` order
/// this middleware relative to the named ones; naming a middleware that is
/// not registered is allowed and simply has no effect.
pub struct Middleware {
    pub(crate) name: String,
    pub(crate) wrap: WrapFn,
    pub(crate) requires: Vec<String>,
    pub(crate) before: Vec<String>,
    pub(crate) after: Vec<String>,
}

impl Middleware {
    /// Declares a middleware with the given unique name.
    ///
    /// Uniqueness is not checked here — duplicate names are rejected when
    /// the stack compiles, where the whole configuration is visible.
    pub fn new<F, H>(name: impl Into<String>, wrap: F) -> Self
    where
        F: Fn(Next) -> H + Send + Sync + 'static,
        H: Handler,
    {
        Self {
            name: name.into(),
            wrap: Arc::new(move |next| wrap(next).into_boxed_handler()),
            requires: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Middlewares that must also be registered for compilation to succeed.
    /// Existence only; no effect on ordering.
    pub fn requires<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(names.into_iter().map(Into::into));
        self
    }

    /// Middlewares this one must run ahead of (i.e. wrap around).
    pub fn before<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before.extend(names.into_iter().map(Into::into));
        self
    }

    /// Middlewares this one must run behind (i.e. be wrapped by).
    pub fn after<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after.extend(names.into_iter().map(Into::into));
        self
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("before", &self.before)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}
