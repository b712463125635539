use loom_types::{NodeId, StoryNode};

/// Node in story "s" with `votes` synthetic voters.
pub(crate) fn node(
    id: &str,
    parent: Option<&str>,
    is_canon: bool,
    votes: usize,
    order: u64,
) -> StoryNode {
    StoryNode::new(id, "s", parent.map(NodeId::from), format!("text of {id}"), "author")
        .with_canon(is_canon)
        .with_order(order)
        .with_voters((0..votes).map(|i| format!("voter-{i}")))
}

pub(crate) fn ids(nodes: &[&StoryNode]) -> Vec<String> {
    nodes.iter().map(|n| n.id.to_string()).collect()
}

/// Canon root with a canon child (5 votes) and a more popular non-canon one (9).
pub(crate) fn canon_vs_popular() -> Vec<StoryNode> {
    vec![
        node("r", None, true, 0, 0),
        node("c1", Some("r"), true, 5, 1),
        node("c2", Some("r"), false, 9, 2),
    ]
}

/// Balanced binary tree of depth 2.
pub(crate) fn binary_tree() -> Vec<StoryNode> {
    vec![
        node("root", None, true, 0, 0),
        node("a", Some("root"), false, 0, 1),
        node("b", Some("root"), false, 0, 2),
        node("a1", Some("a"), false, 0, 3),
        node("a2", Some("a"), false, 0, 4),
        node("b1", Some("b"), false, 0, 5),
        node("b2", Some("b"), false, 0, 6),
    ]
}
