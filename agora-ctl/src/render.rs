use agora_client::{view::Node, CommentTree};

/// Plain-text rendition of a screen. Inputs are left out, as the command line
/// arguments take their place.
pub fn to_text(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn write_node(out: &mut String, node: &Node, indent: usize) {
    let pad = "  ".repeat(indent);
    match node {
        Node::Group {
            indent: extra,
            children,
            ..
        } => {
            let mut buttons = Vec::new();
            for c in children {
                match c {
                    Node::Button { .. } => buttons.push(c),
                    _ => {
                        flush_buttons(out, &mut buttons, indent + extra);
                        write_node(out, c, indent + extra);
                    }
                }
            }
            flush_buttons(out, &mut buttons, indent + extra);
        }
        Node::Heading { level, text } => {
            let marks = "#".repeat(usize::from(*level));
            out.push_str(&format!("{pad}{marks} {text}\n"));
        }
        Node::Text { text, .. } => out.push_str(&format!("{pad}{text}\n")),
        Node::Link { text, .. } => out.push_str(&format!("{pad}<{text}>\n")),
        Node::Image { alt, .. } => out.push_str(&format!("{pad}[image of {alt}]\n")),
        Node::Button { .. } => flush_buttons(out, &mut vec![node], indent),
        Node::Input { .. }
        | Node::Checkbox { .. }
        | Node::Select { .. }
        | Node::TextArea { .. } => (),
    }
}

/// Buttons next to each other go on a single line
fn flush_buttons(out: &mut String, buttons: &mut Vec<&Node>, indent: usize) {
    if buttons.is_empty() {
        return;
    }
    let labels = buttons
        .drain(..)
        .filter_map(|b| match b {
            Node::Button {
                label,
                enabled: true,
                ..
            } => Some(format!("[{label}]")),
            Node::Button {
                label,
                enabled: false,
                ..
            } => Some(format!("[{label} (disabled)]")),
            _ => None,
        })
        .collect::<Vec<_>>();
    out.push_str(&format!("{}{}\n", "  ".repeat(indent), labels.join(" ")));
}

/// Outline of a comment tree, as `agora-ctl tree` prints it
pub fn tree_to_text(tree: &CommentTree) -> String {
    let mut out = String::new();
    for e in tree.entries.iter() {
        out.push_str(&format!(
            "{}#{} by {} at {}: {}\n",
            "  ".repeat(e.depth),
            e.comment.id,
            e.comment.creator_id,
            e.comment.created_at.to_rfc3339(),
            e.comment.content,
        ));
    }
    if !tree.orphans.is_empty() {
        out.push_str(&format!("{} orphaned comment(s):\n", tree.orphans.len()));
        for o in tree.orphans.iter() {
            let parent = o
                .parent_comment_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| String::from("none"));
            out.push_str(&format!("  #{} (parent #{parent}): {}\n", o.id, o.content));
        }
    }
    out
}
