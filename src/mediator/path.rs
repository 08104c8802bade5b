//! Path Search Module
//!
//! Breadth-first search over the connected-pages relation with a wall-clock
//! budget.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use tracing::debug;

use crate::error::Result;

use super::WikiMediator;

impl WikiMediator {
    /// Finds a shortest path of page titles from `start` to `stop`, both
    /// inclusive, following one link per hop.
    ///
    /// Returns an empty list when no path was found, whether the frontier
    /// was exhausted or the wall-clock budget ran out; absence of a path is
    /// a result, not an error.
    pub(super) async fn bfs_path(&self, start: &str, stop: &str) -> Result<Vec<String>> {
        if start == stop {
            return Ok(vec![start.to_string()]);
        }

        let deadline = Instant::now() + self.path_budget;
        let mut visited: HashSet<String> = HashSet::new();
        let mut parents: HashMap<String, String> = HashMap::new();
        let mut frontier: VecDeque<String> = VecDeque::new();
        frontier.push_back(start.to_string());

        while let Some(current) = frontier.pop_front() {
            if Instant::now() > deadline {
                debug!(start, stop, "path search budget exhausted");
                return Ok(Vec::new());
            }
            if !visited.insert(current.clone()) {
                continue;
            }

            // One hop = the pages linked from the current node.
            for neighbor in self.get_connected_pages(&current, 1).await? {
                if neighbor == current {
                    continue;
                }
                parents.entry(neighbor.clone()).or_insert_with(|| current.clone());
                if neighbor == stop {
                    return Ok(build_path(&parents, start, stop));
                }
                if !visited.contains(&neighbor) {
                    frontier.push_back(neighbor);
                }
            }
        }

        debug!(start, stop, "frontier exhausted, no path");
        Ok(Vec::new())
    }
}

/// Walks parent links back from `stop` and reverses into start-to-stop order.
fn build_path(parents: &HashMap<String, String>, start: &str, stop: &str) -> Vec<String> {
    let mut path = vec![stop.to_string()];
    let mut current = stop;
    while current != start {
        match parents.get(current) {
            Some(parent) => {
                path.push(parent.clone());
                current = parent;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
