use std::mem;

use crate::clause::ClauseRef;
use crate::lit::Lit;
use crate::var::Var;

#[derive(Debug, Copy, Clone)]
pub struct Watcher {
    pub(crate) cref: ClauseRef,
    pub(crate) blocker: Lit,
}

/// Watchers indexed by the watched literal.
#[derive(Debug, Default)]
pub struct WatchList {
    watchlist: Vec<Vec<Watcher>>,
}

impl WatchList {
    pub const fn new() -> Self {
        Self { watchlist: Vec::new() }
    }

    pub fn init(&mut self, var: Var) {
        let needed = Lit::new(var, true).index() + 1;
        if self.watchlist.len() < needed {
            self.watchlist.resize_with(needed, Vec::new);
        }
    }

    pub fn insert(&mut self, lit: Lit, watch: Watcher) {
        self.watchlist[lit.index()].push(watch);
    }

    /// Take the watchers of `lit` out for in-place processing.
    pub fn take(&mut self, lit: Lit) -> Vec<Watcher> {
        mem::take(&mut self.watchlist[lit.index()])
    }

    /// Put back watchers previously taken with [WatchList::take].
    pub fn restore(&mut self, lit: Lit, watchers: Vec<Watcher>) {
        let added = mem::replace(&mut self.watchlist[lit.index()], watchers);
        self.watchlist[lit.index()].extend(added);
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Watcher) -> bool,
    {
        for watchers in self.watchlist.iter_mut() {
            watchers.retain(&mut keep);
        }
    }

    pub fn bytes(&self) -> usize {
        self.watchlist
            .iter()
            .map(|ws| ws.capacity() * mem::size_of::<Watcher>())
            .sum()
    }
}
