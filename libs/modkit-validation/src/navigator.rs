//! Classification of property paths into the shapes the resolver can name.

use crate::path::{ElementKind, Node, PropertyPath};

/// Label prefix for violations found in a handler's return value.
pub const SERVER_RESPONSE: &str = "server response";

/// What a property path looks like from the resolver's point of view.
#[derive(Debug, PartialEq, Eq)]
pub enum PathShape<'a> {
    /// The path crosses a return value; carries the ready-made label.
    ReturnValue(String),
    /// The violation sits on `member`, a direct child of `parent`.
    Member { parent: &'a Node, member: &'a Node },
    /// Too short to name anything.
    None,
}

/// Classify `path`.
///
/// Names after the return-value node are appended to [`SERVER_RESPONSE`]:
/// the first after a space, the rest dot-joined.
#[must_use]
pub fn classify(path: &PropertyPath) -> PathShape<'_> {
    if let Some(label) = return_value_label(path) {
        return PathShape::ReturnValue(label);
    }

    match path.nodes() {
        [.., parent, member] => PathShape::Member { parent, member },
        _ => PathShape::None,
    }
}

fn return_value_label(path: &PropertyPath) -> Option<String> {
    let pos = path
        .iter()
        .position(|n| n.kind() == ElementKind::ReturnValue)?;

    let mut label = String::from(SERVER_RESPONSE);
    for (i, node) in path.nodes()[pos + 1..].iter().enumerate() {
        label.push(if i == 0 { ' ' } else { '.' });
        label.push_str(node.name());
    }
    Some(label)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn path(nodes: impl IntoIterator<Item = Node>) -> PropertyPath {
        PropertyPath::new(nodes).unwrap()
    }

    #[test]
    fn return_value_without_members() {
        let p = path([
            Node::method("getUser", ["Uuid"]),
            Node::return_value(),
        ]);
        assert_eq!(classify(&p), PathShape::ReturnValue("server response".to_owned()));
    }

    #[test]
    fn return_value_with_nested_members() {
        let p = path([
            Node::method("getUser", ["Uuid"]),
            Node::return_value(),
            Node::property("address"),
            Node::property("city"),
        ]);
        assert_eq!(
            classify(&p),
            PathShape::ReturnValue("server response address.city".to_owned())
        );
    }

    #[test]
    fn return_value_takes_precedence_over_member_shape() {
        let p = path([Node::return_value(), Node::property("age")]);
        assert!(matches!(classify(&p), PathShape::ReturnValue(label) if label == "server response age"));
    }

    #[test]
    fn member_shape_uses_last_two_nodes() {
        let p = path([
            Node::method("createUser", ["String"]),
            Node::parameter("arg0", 0),
        ]);
        match classify(&p) {
            PathShape::Member { parent, member } => {
                assert_eq!(parent.name(), "createUser");
                assert_eq!(member.name(), "arg0");
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn single_node_has_no_shape() {
        let p = path([Node::property("name")]);
        assert_eq!(classify(&p), PathShape::None);
    }
}
