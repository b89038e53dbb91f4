//! Tree statistics.
//!
//! Printed after the tree with `--summary`.
//!
//! ## Example Output
//!
//! ```text
//! ┌─────────────────┬───────┐
//! │ Metric          │ Count │
//! ├─────────────────┼───────┤
//! │ Direct          │ 4     │
//! │ Nodes           │ 37    │
//! │ Unique modules  │ 21    │
//! │ Duplicated      │ 16    │
//! │ Leaves          │ 25    │
//! │ Max depth       │ 5     │
//! └─────────────────┴───────┘
//! ```

use crate::artifact::Artifact;
use colored::*;
use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub direct: usize,
    pub nodes: usize,
    pub unique: usize,
    pub leaves: usize,
    pub max_depth: usize,
}

impl TreeStats {
    pub fn collect(forest: &[Artifact]) -> Self {
        let mut stats = TreeStats {
            direct: forest.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();
        for node in forest {
            walk(node, 1, &mut stats, &mut seen);
        }
        stats.unique = seen.len();
        stats
    }

    /// Nodes that repeat a module already present elsewhere in the tree.
    pub fn duplicated(&self) -> usize {
        self.nodes - self.unique
    }
}

fn walk<'t>(
    node: &'t Artifact,
    depth: usize,
    stats: &mut TreeStats,
    seen: &mut HashSet<(&'t str, &'t str)>,
) {
    stats.nodes += 1;
    stats.max_depth = stats.max_depth.max(depth);
    seen.insert((node.name.as_str(), node.version.as_str()));

    let children = node.children();
    if children.is_empty() {
        stats.leaves += 1;
    }
    for child in children {
        walk(child, depth + 1, stats, seen);
    }
}

pub fn print_summary(forest: &[Artifact]) {
    let stats = TreeStats::collect(forest);

    let mut table = crate::ui::Table::new(&["Metric", "Count"]);
    table.add_row(vec!["Direct".green().to_string(), stats.direct.to_string()]);
    table.add_row(vec!["Nodes".dimmed().to_string(), stats.nodes.to_string()]);
    table.add_row(vec![
        "Unique modules".dimmed().to_string(),
        stats.unique.to_string(),
    ]);
    table.add_row(vec![
        "Duplicated".yellow().to_string(),
        stats.duplicated().to_string(),
    ]);
    table.add_row(vec!["Leaves".dimmed().to_string(), stats.leaves.to_string()]);
    table.add_row(vec![
        "Max depth".dimmed().to_string(),
        stats.max_depth.to_string(),
    ]);

    eprint!("{}", table.render());
}
