//! Dependency tracking between named nodes
//!
//! An edge `(s, t)` means "`t` depends on `s`": `s` must be evaluated before
//! `t`. In spreadsheet terms `s` is a dependee (a cell a formula references)
//! and `t` is a dependent (the formula cell).

use ahash::{AHashMap, AHashSet};

/// A set of dependency edges with forward and backward indexes
///
/// # Invariants
///
/// 1. The two indexes mirror each other: `t ∈ dependents[s]` iff `s ∈ dependees[t]`.
/// 2. Empty neighbor sets are removed, so a missing key and an empty set look
///    the same to every query.
/// 3. `edge_count` equals the total size of either index.
///
/// All mutation goes through the methods below, which keep both indexes in step.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// s -> {t}: nodes that depend on s
    dependents: AHashMap<String, AHashSet<String>>,
    /// t -> {s}: nodes that t depends on
    dependees: AHashMap<String, AHashSet<String>>,
    edge_count: usize,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// Whether the edge `(s, t)` is present
    pub fn contains_edge(&self, s: &str, t: &str) -> bool {
        self.dependents
            .get(s)
            .map_or(false, |set| set.contains(t))
    }

    /// Nodes that depend on `s`
    pub fn dependents<'a>(&'a self, s: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependents
            .get(s)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Nodes that `t` depends on
    pub fn dependees<'a>(&'a self, t: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependees
            .get(t)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn dependent_count(&self, s: &str) -> usize {
        self.dependents.get(s).map_or(0, |set| set.len())
    }

    pub fn dependee_count(&self, t: &str) -> usize {
        self.dependees.get(t).map_or(0, |set| set.len())
    }

    pub fn has_dependents(&self, s: &str) -> bool {
        self.dependent_count(s) > 0
    }

    pub fn has_dependees(&self, t: &str) -> bool {
        self.dependee_count(t) > 0
    }

    /// All edges as `(s, t)` pairs, in no particular order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.dependents
            .iter()
            .flat_map(|(s, set)| set.iter().map(move |t| (s.as_str(), t.as_str())))
    }

    /// Add the edge `(s, t)`
    ///
    /// Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, s: impl Into<String>, t: impl Into<String>) -> bool {
        let s = s.into();
        let t = t.into();
        if self.contains_edge(&s, &t) {
            return false;
        }

        self.dependees
            .entry(t.clone())
            .or_default()
            .insert(s.clone());
        self.dependents.entry(s).or_default().insert(t);
        self.edge_count += 1;
        true
    }

    /// Remove the edge `(s, t)`
    ///
    /// Returns `false` if the edge was not present.
    pub fn remove_edge(&mut self, s: &str, t: &str) -> bool {
        if !unlink(&mut self.dependents, s, t) {
            return false;
        }
        unlink(&mut self.dependees, t, s);
        self.edge_count -= 1;
        true
    }

    /// Replace every edge `(s, *)` with `(s, t)` for each `t` in `new_dependents`
    pub fn replace_dependents<I, T>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if let Some(old) = self.dependents.remove(s) {
            self.edge_count -= old.len();
            for t in &old {
                unlink(&mut self.dependees, t, s);
            }
        }

        for t in new_dependents {
            self.add_edge(s, t);
        }
    }

    /// Replace every edge `(*, t)` with `(s, t)` for each `s` in `new_dependees`
    pub fn replace_dependees<I, S>(&mut self, t: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(old) = self.dependees.remove(t) {
            self.edge_count -= old.len();
            for s in &old {
                unlink(&mut self.dependents, s, t);
            }
        }

        for s in new_dependees {
            self.add_edge(s, t);
        }
    }

    /// Remove every edge
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.dependees.clear();
        self.edge_count = 0;
    }
}

/// Remove `value` from `index[key]`, dropping the key once its set is empty
fn unlink(index: &mut AHashMap<String, AHashSet<String>>, key: &str, value: &str) -> bool {
    let Some(set) = index.get_mut(key) else {
        return false;
    };
    let removed = set.remove(value);
    if set.is_empty() {
        index.remove(key);
    }
    removed
}
