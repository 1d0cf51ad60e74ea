//! Middleware sees every action after the reducers have applied it.

use crate::actions::Action;
use crate::store::Store;

pub trait Middleware {
    /// Called once, in chain order, when the store is built
    fn attach(&self, _store: &Store) {}

    fn handle(&self, store: &Store, action: &Action);
}
