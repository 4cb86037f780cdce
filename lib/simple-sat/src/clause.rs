use std::mem;
use std::ops::{Index, IndexMut};

use crate::lit::Lit;

/// Index of a clause in the [ClauseArena].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClauseRef(pub(crate) u32);

#[derive(Debug, Clone)]
pub struct Clause {
    pub(crate) lits: Vec<Lit>,
    pub(crate) learnt: bool,
    pub(crate) lbd: u32,
    pub(crate) activity: f64,
    pub(crate) deleted: bool,
}

impl Clause {
    pub fn new(lits: Vec<Lit>, learnt: bool, lbd: u32) -> Self {
        Self {
            lits,
            learnt,
            lbd,
            activity: 0.0,
            deleted: false,
        }
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn size(&self) -> usize {
        self.lits.len()
    }

    pub fn is_learnt(&self) -> bool {
        self.learnt
    }

    pub fn lbd(&self) -> u32 {
        self.lbd
    }

    fn footprint(&self) -> usize {
        mem::size_of::<Self>() + self.lits.capacity() * mem::size_of::<Lit>()
    }
}

impl Index<usize> for Clause {
    type Output = Lit;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lits[index]
    }
}

impl IndexMut<usize> for Clause {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.lits[index]
    }
}

/// Slot storage for clauses. Freed slots are reused by later allocations.
#[derive(Debug, Default)]
pub struct ClauseArena {
    slots: Vec<Clause>,
    free: Vec<ClauseRef>,
    bytes: usize,
}

impl ClauseArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, lits: Vec<Lit>, learnt: bool, lbd: u32) -> ClauseRef {
        let clause = Clause::new(lits, learnt, lbd);
        self.bytes += clause.footprint();
        if let Some(cref) = self.free.pop() {
            self.slots[cref.0 as usize] = clause;
            cref
        } else {
            self.slots.push(clause);
            ClauseRef((self.slots.len() - 1) as u32)
        }
    }

    pub fn free(&mut self, cref: ClauseRef) {
        let clause = &mut self.slots[cref.0 as usize];
        debug_assert!(!clause.lits.is_empty(), "double free of clause {:?}", cref);
        self.bytes -= clause.footprint();
        clause.deleted = true;
        clause.lits = Vec::new();
        self.free.push(cref);
    }

    /// Number of live clauses.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes held by live clauses.
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Index<ClauseRef> for ClauseArena {
    type Output = Clause;

    fn index(&self, index: ClauseRef) -> &Self::Output {
        &self.slots[index.0 as usize]
    }
}

impl IndexMut<ClauseRef> for ClauseArena {
    fn index_mut(&mut self, index: ClauseRef) -> &mut Self::Output {
        &mut self.slots[index.0 as usize]
    }
}
