//! Unit-of-work scopes.
//!
//! A [`Scope`] is held by whatever opened the unit of work (a store session).
//! Lazy references produced inside it carry a [`ScopeToken`]; once the scope
//! is closed or dropped every token reports [`Error::StaleAccess`].

use std::sync::{Arc, Weak};

use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct Scope {
  alive: Arc<()>,
}

impl Scope {
  pub fn new() -> Self { Self::default() }

  pub fn token(&self) -> ScopeToken {
    ScopeToken { alive: Arc::downgrade(&self.alive) }
  }

  /// End the unit of work. Equivalent to dropping the scope.
  pub fn close(self) {}
}

/// A weak handle onto a [`Scope`].
#[derive(Debug, Clone)]
pub struct ScopeToken {
  alive: Weak<()>,
}

impl ScopeToken {
  pub fn is_open(&self) -> bool { self.alive.strong_count() > 0 }

  pub fn ensure_open(&self) -> Result<()> {
    if self.is_open() { Ok(()) } else { Err(Error::StaleAccess) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokens_go_stale_when_the_scope_closes() {
    let scope = Scope::new();
    let token = scope.token();
    let copy = token.clone();
    assert!(token.ensure_open().is_ok());

    scope.close();
    assert!(matches!(token.ensure_open(), Err(Error::StaleAccess)));
    assert!(!copy.is_open());
  }
}
