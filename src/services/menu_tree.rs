//! In-memory assembly of the menu hierarchy.
//!
//! Rows are kept in an arena (the ordered slice loaded from the database)
//! with a separate children-by-parent adjacency map instead of embedded
//! child pointers. Assembly walks the adjacency map from the roots, so a
//! node whose parent is absent from the working set is pruned together
//! with its whole subtree - the property the role-scoped view relies on.

use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

use crate::database::models::{Menu, MenuTreeNode};

/// Build the nested tree from rows already ordered by sibling position.
/// Input order is preserved among siblings, so the caller's
/// `ORDER BY "order", created_at, id` doubles as the stable tie-break.
///
/// `max_depth` guards against accidental cycles in stored data: anything
/// nested deeper is dropped and logged rather than recursed into.
pub fn assemble(
    menus: &[Menu],
    roles_by_menu: &HashMap<Uuid, Vec<i32>>,
    max_depth: u32,
) -> Vec<MenuTreeNode> {
    let mut children_of: HashMap<Uuid, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();

    let present: HashMap<Uuid, usize> = menus
        .iter()
        .enumerate()
        .map(|(idx, m)| (m.id, idx))
        .collect();

    for (idx, menu) in menus.iter().enumerate() {
        match menu.parent_id {
            None => roots.push(idx),
            Some(parent_id) if present.contains_key(&parent_id) => {
                children_of.entry(parent_id).or_default().push(idx);
            }
            Some(parent_id) => {
                // Parent not in the working set: either filtered out by the
                // caller (scoped view) or inconsistent data. Never promote
                // to root; the subtree stays hidden.
                warn!(menu_id = %menu.id, %parent_id, "dropping menu without visible parent");
            }
        }
    }

    roots
        .into_iter()
        .map(|idx| build_node(menus, &children_of, roles_by_menu, idx, 0, max_depth))
        .collect()
}

fn build_node(
    menus: &[Menu],
    children_of: &HashMap<Uuid, Vec<usize>>,
    roles_by_menu: &HashMap<Uuid, Vec<i32>>,
    idx: usize,
    depth: u32,
    max_depth: u32,
) -> MenuTreeNode {
    let menu = &menus[idx];
    let roles = roles_by_menu.get(&menu.id).cloned().unwrap_or_default();
    let mut node = MenuTreeNode::from_menu(menu, roles);

    if depth + 1 >= max_depth {
        if children_of.contains_key(&menu.id) {
            warn!(menu_id = %menu.id, depth, "menu tree depth cap reached, dropping children");
        }
        return node;
    }

    if let Some(child_indices) = children_of.get(&menu.id) {
        node.children = child_indices
            .iter()
            .map(|&child| {
                build_node(menus, children_of, roles_by_menu, child, depth + 1, max_depth)
            })
            .collect();
    }

    node
}

/// Would re-parenting `node` under `new_parent` introduce a cycle?
///
/// Walks ancestors from the candidate parent toward the root; the move is a
/// cycle when `node` itself appears on that path (covers parent == node).
/// The walk is step-capped by the map size, and a walk that exhausts the
/// cap means the stored chain is already cyclic - treated as a cycle too.
pub fn creates_cycle(
    parents: &HashMap<Uuid, Option<Uuid>>,
    node: Uuid,
    new_parent: Uuid,
) -> bool {
    let mut current = Some(new_parent);
    let mut steps = 0usize;

    while let Some(ancestor) = current {
        if ancestor == node {
            return true;
        }
        steps += 1;
        if steps > parents.len() {
            warn!(%node, %new_parent, "ancestor chain exceeds node count, assuming cycle");
            return true;
        }
        current = parents.get(&ancestor).copied().flatten();
    }

    false
}
