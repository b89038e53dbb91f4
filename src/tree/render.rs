//! Dependency tree visualization.
//!
//! Renders a built forest in a hierarchical ASCII tree format.
//!
//! ## Example Output
//!
//! ```text
//! example.com/app
//! ├── github.com/spf13/cobra v1.8.0
//! │   └── github.com/spf13/pflag v1.0.5
//! └── golang.org/x/mod v0.14.0
//! ```

use crate::artifact::Artifact;
use colored::*;

pub fn render_text(root_label: &str, forest: &[Artifact], color: bool) -> String {
    let mut out = String::new();
    if color {
        out.push_str(&root_label.bold().cyan().to_string());
    } else {
        out.push_str(root_label);
    }
    out.push('\n');

    if forest.is_empty() {
        out.push_str("└── (no dependencies)\n");
        return out;
    }

    render_level(forest, "", color, &mut out);
    out
}

fn render_level(nodes: &[Artifact], indent: &str, color: bool, out: &mut String) {
    let count = nodes.len();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == count - 1;
        let prefix = if is_last { "└──" } else { "├──" };

        out.push_str(indent);
        out.push_str(prefix);
        out.push(' ');
        out.push_str(&label(node, color));
        out.push('\n');

        let child_indent = format!("{}{}", indent, if is_last { "    " } else { "│   " });
        render_level(node.children(), &child_indent, color, out);
    }
}

fn label(node: &Artifact, color: bool) -> String {
    match (node.version.is_empty(), color) {
        (true, false) => node.name.clone(),
        (true, true) => format!("{} ({})", node.name.bold(), "local".dimmed()),
        (false, false) => format!("{} {}", node.name, node.version),
        (false, true) => format!("{} {}", node.name.bold(), node.version.green()),
    }
}
