use rand::Rng;
use tracing::debug;

use crate::var::Var;

/// VSIDS activities together with an indexed max-heap of candidate decision variables.
#[derive(Debug)]
pub struct VarOrder {
    activity: Vec<f64>,
    heap: Vec<Var>,
    indices: Vec<Option<usize>>,
    var_decay: f64,
    var_inc: f64,
}

impl VarOrder {
    pub fn new(var_decay: f64) -> Self {
        Self {
            activity: Vec::new(),
            heap: Vec::new(),
            indices: Vec::new(),
            var_decay,
            var_inc: 1.0,
        }
    }

    pub fn set_var_decay(&mut self, var_decay: f64) {
        self.var_decay = var_decay;
    }

    /// Register a fresh variable with the given initial activity.
    pub fn init_var(&mut self, var: Var, activity: f64) {
        debug_assert_eq!(var.index(), self.activity.len());
        self.activity.push(activity);
        self.indices.push(None);
        self.insert(var);
    }

    pub fn activity(&self, var: Var) -> f64 {
        self.activity[var.index()]
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, var: Var) -> bool {
        self.indices[var.index()].is_some()
    }

    pub fn insert(&mut self, var: Var) {
        if !self.contains(var) {
            self.heap.push(var);
            self.sift_up(self.heap.len() - 1);
        }
    }

    pub fn pop_max(&mut self) -> Option<Var> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        self.indices[top.index()] = None;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    /// Any variable currently in the heap, chosen uniformly.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<Var> {
        if self.heap.is_empty() {
            None
        } else {
            Some(self.heap[rng.gen_range(0..self.heap.len())])
        }
    }

    pub fn var_decay_activity(&mut self) {
        self.var_inc /= self.var_decay;
    }

    pub fn var_bump_activity(&mut self, var: Var) {
        let new = self.activity[var.index()] + self.var_inc;
        self.activity[var.index()] = new;

        // Rescale large activities, if necessary:
        if new > 1e100 {
            self.var_rescale_activity();
        }

        // Update `var` in heap:
        if let Some(pos) = self.indices[var.index()] {
            self.sift_up(pos);
        }
    }

    fn var_rescale_activity(&mut self) {
        debug!("Rescaling activity");
        for a in self.activity.iter_mut() {
            *a *= 1e-100;
        }
        self.var_inc *= 1e-100;
    }

    fn before(&self, a: Var, b: Var) -> bool {
        self.activity[a.index()] > self.activity[b.index()]
    }

    fn place(&mut self, pos: usize, var: Var) {
        self.heap[pos] = var;
        self.indices[var.index()] = Some(pos);
    }

    fn sift_up(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.before(var, self.heap[parent]) {
                break;
            }
            self.place(pos, self.heap[parent]);
            pos = parent;
        }
        self.place(pos, var);
    }

    fn sift_down(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.before(self.heap[right], self.heap[left]) {
                right
            } else {
                left
            };
            if !self.before(self.heap[child], var) {
                break;
            }
            self.place(pos, self.heap[child]);
            pos = child;
        }
        self.place(pos, var);
    }
}
