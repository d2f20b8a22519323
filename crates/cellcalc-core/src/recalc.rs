//! Recalculation ordering
//!
//! Given a changed node, walks the "dependents" relation depth-first and
//! returns the reverse post-order of every reachable node, which is a valid
//! evaluation order. A node reached again while it is still on the traversal
//! stack closes a cycle, and the whole call fails.

use crate::dependency::DependencyGraph;
use ahash::AHashMap;
use thiserror::Error;

/// The dependents of a changed node form a cycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Circular dependency detected involving {involved_node}")]
pub struct CycleError {
    involved_node: String,
    cycle: Vec<String>,
}

impl CycleError {
    pub fn new(involved_node: impl Into<String>, cycle: Vec<String>) -> Self {
        Self {
            involved_node: involved_node.into(),
            cycle,
        }
    }

    /// The node whose revisit closed the cycle
    pub fn involved_node(&self) -> &str {
        &self.involved_node
    }

    /// Nodes on the cycle, starting at [`involved_node`](Self::involved_node)
    /// and following dependent edges
    pub fn cycle(&self) -> &[String] {
        &self.cycle
    }
}

/// Per-call traversal state; unvisited nodes have no entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

struct Frame<'a> {
    node: &'a str,
    /// Dependents, sorted so the resulting order is deterministic
    children: Vec<&'a str>,
    next: usize,
}

impl DependencyGraph {
    /// Nodes to re-evaluate after `changed` changes, in a valid order
    ///
    /// The result starts with `changed` and lists each transitively affected
    /// node after everything it depends on. The graph is never modified; on a
    /// cycle the caller decides how to roll back the edit that caused it.
    ///
    /// # Example
    /// ```rust
    /// use cellcalc_core::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_edge("A1", "B1");
    /// graph.add_edge("B1", "C1");
    /// assert_eq!(graph.recalculation_order("A1").unwrap(), ["A1", "B1", "C1"]);
    ///
    /// graph.add_edge("C1", "A1");
    /// assert!(graph.recalculation_order("A1").is_err());
    /// ```
    pub fn recalculation_order(&self, changed: &str) -> Result<Vec<String>, CycleError> {
        self.recalculation_order_many([changed])
    }

    /// Like [`recalculation_order`](Self::recalculation_order) for several
    /// changed nodes at once
    ///
    /// Roots are visited in the order given; a root already reached from an
    /// earlier one is not visited again.
    pub fn recalculation_order_many<'a, I>(&'a self, changed: I) -> Result<Vec<String>, CycleError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut marks: AHashMap<&'a str, Mark> = AHashMap::new();
        let mut finished: Vec<&'a str> = Vec::new();

        for root in changed {
            if !marks.contains_key(root) {
                self.visit(root, &mut marks, &mut finished)?;
            }
        }

        log::trace!("recalculation order covers {} nodes", finished.len());
        Ok(finished.into_iter().rev().map(str::to_string).collect())
    }

    /// Iterative depth-first search from `root`, appending nodes in post-order
    fn visit<'a>(
        &'a self,
        root: &'a str,
        marks: &mut AHashMap<&'a str, Mark>,
        finished: &mut Vec<&'a str>,
    ) -> Result<(), CycleError> {
        marks.insert(root, Mark::OnStack);
        let mut stack = vec![self.frame(root)];

        while let Some(frame) = stack.last_mut() {
            match frame.children.get(frame.next).copied() {
                Some(child) => {
                    frame.next += 1;
                    match marks.get(child) {
                        Some(Mark::Done) => {}
                        Some(Mark::OnStack) => {
                            let start = stack.iter().position(|f| f.node == child).unwrap_or(0);
                            let cycle = stack[start..].iter().map(|f| f.node.to_string()).collect();
                            log::debug!("cycle detected at {} while ordering from {}", child, root);
                            return Err(CycleError::new(child, cycle));
                        }
                        None => {
                            marks.insert(child, Mark::OnStack);
                            stack.push(self.frame(child));
                        }
                    }
                }
                None => {
                    let node = frame.node;
                    marks.insert(node, Mark::Done);
                    finished.push(node);
                    stack.pop();
                }
            }
        }

        Ok(())
    }

    fn frame<'a>(&'a self, node: &'a str) -> Frame<'a> {
        let mut children: Vec<&'a str> = self.dependents(node).collect();
        children.sort_unstable();
        Frame {
            node,
            children,
            next: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn position(order: &[String], node: &str) -> usize {
        order
            .iter()
            .position(|n| n == node)
            .unwrap_or_else(|| panic!("{} missing from {:?}", node, order))
    }

    fn chain() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_edge("A1", "B1");
        graph.add_edge("B1", "C1");
        graph.add_edge("C1", "D1");
        graph
    }

    #[test]
    fn test_isolated_node() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.recalculation_order("A1").unwrap(), vec!["A1"]);
    }

    #[test]
    fn test_chain() {
        let graph = chain();
        assert_eq!(
            graph.recalculation_order("A1").unwrap(),
            vec!["A1", "B1", "C1", "D1"]
        );
        assert_eq!(graph.recalculation_order("C1").unwrap(), vec!["C1", "D1"]);
        assert_eq!(graph.recalculation_order("D1").unwrap(), vec!["D1"]);
    }

    #[test]
    fn test_diamond() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("A1", "B1");
        graph.add_edge("A1", "C1");
        graph.add_edge("B1", "D1");
        graph.add_edge("C1", "D1");

        let order = graph.recalculation_order("A1").unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], "A1");
        assert!(position(&order, "B1") < position(&order, "D1"));
        assert!(position(&order, "C1") < position(&order, "D1"));
    }

    #[test]
    fn test_order_is_deterministic() {
        let mut graph = DependencyGraph::new();
        for t in ["E1", "B1", "D1", "C1"] {
            graph.add_edge("A1", t);
        }
        let first = graph.recalculation_order("A1").unwrap();
        for _ in 0..10 {
            assert_eq!(graph.recalculation_order("A1").unwrap(), first);
        }
    }

    #[test]
    fn test_cycle() {
        let mut graph = chain();
        graph.add_edge("D1", "A1");
        let edges_before = graph.edge_count();

        let err = graph.recalculation_order("A1").unwrap_err();
        assert_eq!(err.involved_node(), "A1");
        assert_eq!(err.cycle(), &["A1", "B1", "C1", "D1"]);
        assert!(err.to_string().contains("A1"));
        assert_eq!(graph.edge_count(), edges_before);
    }

    #[test]
    fn test_cycle_downstream_of_changed_node() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("A1", "B1");
        graph.add_edge("B1", "C1");
        graph.add_edge("C1", "B1");

        let err = graph.recalculation_order("A1").unwrap_err();
        assert_eq!(err.involved_node(), "B1");
        assert_eq!(err.cycle(), &["B1", "C1"]);
    }

    #[test]
    fn test_self_reference() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("A1", "A1");
        let err = graph.recalculation_order("A1").unwrap_err();
        assert_eq!(err.cycle(), &["A1"]);
    }

    #[test]
    fn test_shared_descendant_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("A1", "B1");
        graph.add_edge("A1", "C1");
        graph.add_edge("B1", "C1");
        let order = graph.recalculation_order("A1").unwrap();
        assert_eq!(order, vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_many_roots() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("A1", "C1");
        graph.add_edge("B1", "C1");
        graph.add_edge("C1", "D1");

        let order = graph.recalculation_order_many(["A1", "B1"]).unwrap();
        assert_eq!(order.len(), 4);
        assert!(position(&order, "A1") < position(&order, "C1"));
        assert!(position(&order, "B1") < position(&order, "C1"));
        assert!(position(&order, "C1") < position(&order, "D1"));

        let order = graph.recalculation_order_many(["C1", "A1"]).unwrap();
        assert_eq!(order, vec!["A1", "C1", "D1"]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut graph = DependencyGraph::new();
        let names: Vec<String> = (0..100_000).map(|i| format!("n{}", i)).collect();
        for pair in names.windows(2) {
            graph.add_edge(pair[0].as_str(), pair[1].as_str());
        }
        let order = graph.recalculation_order("n0").unwrap();
        assert_eq!(order.len(), names.len());
        assert_eq!(order.last().map(String::as_str), Some("n99999"));
    }
}
