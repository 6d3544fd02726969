//! The middleware stack: registration, removal, compilation.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::graph::resolve_order;
use crate::handler::{BoxedHandler, Handler, Next};
use crate::middleware::{Middleware, WrapFn};

/// An ordered collection of middleware declarations.
///
/// Push declarations during a single-threaded configuration phase, then
/// [`compile`](Stack::compile) (or [`apply`](Stack::apply)) once before
/// traffic starts. The compiled [`Chain`] and the handlers it produces are
/// immutable and freely shareable across concurrent tasks; the stack itself
/// is not meant to be mutated while a chain built from it is serving.
///
/// ```rust
/// use lamina::{Middleware, Next, Stack};
///
/// let mut stack = Stack::new();
/// stack.push(Middleware::new("trace", |next: Next| next));
/// stack.push(Middleware::new("auth", |next: Next| next).after(["trace"]));
///
/// let chain = stack.compile()?;
/// assert_eq!(chain.to_string(), "trace -> auth");
/// # Ok::<(), lamina::Error>(())
/// ```
pub struct Stack {
    middlewares: Vec<Middleware>,
}

impl Stack {
    pub fn new() -> Self {
        Self { middlewares: Vec::new() }
    }

    /// Registers a middleware at the end of the stack.
    ///
    /// No uniqueness check happens here; duplicate names are rejected at
    /// compile time, where the whole configuration is visible.
    pub fn push(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    /// Removes every middleware named `name`, preserving the relative order
    /// of the rest. Unknown names are a no-op.
    ///
    /// Constraints elsewhere that still reference the removed name simply
    /// dangle: `before`/`after` references become inert, while a `requires`
    /// reference fails the next compile.
    pub fn remove(&mut self, name: &str) {
        let len_before = self.middlewares.len();
        self.middlewares.retain(|mw| mw.name != name);
        let removed = len_before - self.middlewares.len();
        if removed > 0 {
            debug!(name, removed, "middleware removed");
        }
    }

    /// Validates and orders the stack, returning the reusable compiled
    /// [`Chain`].
    ///
    /// Pure and synchronous: no registry state changes, so compiling twice
    /// without mutations in between yields the same order.
    pub fn compile(&self) -> Result<Chain, Error> {
        let order = resolve_order(&self.middlewares)?;
        let chain = Chain {
            names: order.iter().map(|&i| self.middlewares[i].name.clone()).collect(),
            wraps: order.iter().map(|&i| Arc::clone(&self.middlewares[i].wrap)).collect(),
        };
        debug!(order = %chain, "middleware chain compiled");
        Ok(chain)
    }

    /// Compiles the stack and immediately wraps `handler`.
    pub fn apply(&self, handler: impl Handler) -> Result<BoxedHandler, Error> {
        Ok(self.compile()?.wrap(handler))
    }

    /// The resolved order as a readable name list, for logs and diagnostics
    /// only — nothing behavioral should be parsed out of it.
    pub fn describe(&self) -> Result<String, Error> {
        Ok(self.compile()?.to_string())
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// The compiled artifact: middleware transforms in resolved order.
///
/// Produced by [`Stack::compile`]; detached from the stack, so later stack
/// mutations never affect an existing chain.
pub struct Chain {
    names: Vec<String>,
    wraps: Vec<WrapFn>,
}

impl Chain {
    /// Folds the chain around `handler`.
    ///
    /// The transforms are applied right to left, so the *first* middleware
    /// in the resolved order becomes the outermost wrapper and the *last*
    /// wraps directly around `handler`: a request enters the first-ordered
    /// middleware before any later one runs, and unwinds in reverse.
    ///
    /// The returned handler is reusable across any number of concurrent
    /// invocations; nothing about the order is recomputed per call.
    pub fn wrap(&self, handler: impl Handler) -> BoxedHandler {
        let mut wrapped = handler.into_boxed_handler();
        for wrap in self.wraps.iter().rev() {
            wrapped = wrap(Next(wrapped));
        }
        wrapped
    }

    /// Middleware names in resolved order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("names", &self.names).finish()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join(" -> "))
    }
}
