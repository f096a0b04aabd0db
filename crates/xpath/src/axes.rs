//! Pure functions collecting the nodes along each XPath axis.
//!
//! Forward axes yield nodes in document order. Reverse axes yield them nearest-first,
//! which is the order predicates number them in.

use crate::ast::Axis;
use std::collections::HashSet;
use xmlbind_dom::XmlNode;

fn add_node<N: XmlNode>(node: N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    if !seen.contains(&node) {
        seen.insert(node.clone());
        results.push(node);
    }
}

pub fn collect_child_nodes<N: XmlNode>(node: &N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    for child in node.children() {
        add_node(child, seen, results);
    }
}

pub fn collect_attribute_nodes<N: XmlNode>(node: &N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    for attr in node.attributes() {
        add_node(attr, seen, results);
    }
}

pub fn collect_descendant_nodes<N: XmlNode>(node: &N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    let mut stack: Vec<N> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        let mut children: Vec<N> = current.children().collect();
        children.reverse();
        add_node(current, seen, results);
        stack.extend(children);
    }
}

pub fn collect_descendant_or_self_nodes<N: XmlNode>(
    node: &N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    add_node(node.clone(), seen, results);
    collect_descendant_nodes(node, seen, results);
}

pub fn collect_parent_nodes<N: XmlNode>(node: &N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    if let Some(parent) = node.parent() {
        add_node(parent, seen, results);
    }
}

pub fn collect_ancestor_nodes<N: XmlNode>(node: &N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    let mut current = node.parent();
    while let Some(parent) = current {
        current = parent.parent();
        add_node(parent, seen, results);
    }
}

pub fn collect_ancestor_or_self_nodes<N: XmlNode>(
    node: &N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    add_node(node.clone(), seen, results);
    collect_ancestor_nodes(node, seen, results);
}

/// Attributes have a parent but are not its children, so they have no siblings.
fn siblings<N: XmlNode>(node: &N) -> Vec<N> {
    match node.parent() {
        Some(parent) => parent.children().collect(),
        None => Vec::new(),
    }
}

pub fn collect_following_sibling_nodes<N: XmlNode>(
    node: &N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    for sibling in siblings(node).into_iter().skip_while(|s| s != node).skip(1) {
        add_node(sibling, seen, results);
    }
}

pub fn collect_preceding_sibling_nodes<N: XmlNode>(
    node: &N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    let all = siblings(node);
    let Some(index) = all.iter().position(|s| s == node) else {
        return;
    };
    for sibling in all.into_iter().take(index).rev() {
        add_node(sibling, seen, results);
    }
}

pub fn collect_following_nodes<N: XmlNode>(node: &N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    let mut current = Some(node.clone());
    while let Some(c) = current {
        for sibling in siblings(&c).into_iter().skip_while(|s| *s != c).skip(1) {
            collect_descendant_or_self_nodes(&sibling, seen, results);
        }
        current = c.parent();
    }
}

pub fn collect_preceding_nodes<N: XmlNode>(node: &N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    let mut current = Some(node.clone());
    while let Some(c) = current {
        let all = siblings(&c);
        if let Some(index) = all.iter().position(|s| *s == c) {
            for sibling in all.into_iter().take(index).rev() {
                let mut subtree = Vec::new();
                collect_descendant_or_self_nodes(&sibling, &mut HashSet::new(), &mut subtree);
                for n in subtree.into_iter().rev() {
                    add_node(n, seen, results);
                }
            }
        }
        current = c.parent();
    }
}

/// Collects the nodes along `axis` from a single context node.
pub fn collect<N: XmlNode>(axis: Axis, node: &N) -> Vec<N> {
    let mut seen = HashSet::new();
    let mut results = Vec::new();
    match axis {
        Axis::Child => collect_child_nodes(node, &mut seen, &mut results),
        Axis::Attribute => collect_attribute_nodes(node, &mut seen, &mut results),
        Axis::Descendant => collect_descendant_nodes(node, &mut seen, &mut results),
        Axis::DescendantOrSelf => collect_descendant_or_self_nodes(node, &mut seen, &mut results),
        Axis::Parent => collect_parent_nodes(node, &mut seen, &mut results),
        Axis::Ancestor => collect_ancestor_nodes(node, &mut seen, &mut results),
        Axis::AncestorOrSelf => collect_ancestor_or_self_nodes(node, &mut seen, &mut results),
        Axis::SelfAxis => add_node(node.clone(), &mut seen, &mut results),
        Axis::FollowingSibling => collect_following_sibling_nodes(node, &mut seen, &mut results),
        Axis::PrecedingSibling => collect_preceding_sibling_nodes(node, &mut seen, &mut results),
        Axis::Following => collect_following_nodes(node, &mut seen, &mut results),
        Axis::Preceding => collect_preceding_nodes(node, &mut seen, &mut results),
    }
    results
}
