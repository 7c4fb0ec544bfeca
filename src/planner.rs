//! Render planning: structural diffs between ordered row lists.
//!
//! A [`RenderPlan`] is a pure data value the UI layer applies however it
//! wishes (table-view batch updates, virtual DOM diff, full redraw). Ops
//! replayed in order transform the previous row list into the current
//! one; the anchor names the row that should stay visually stationary so
//! the consumer can preserve scroll offset across insertions at the top.

use std::collections::HashSet;

use crate::models::{Item, ItemId};

/// Lightweight row reference captured around a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRef {
    /// Row id
    pub id: ItemId,
    /// Row sort key, for anchor fallback by proximity
    pub sort_key: u64,
}

/// Capture row references for a list of items.
pub fn row_refs(items: &[Item]) -> Vec<RowRef> {
    items
        .iter()
        .map(|item| RowRef {
            id: item.id.clone(),
            sort_key: item.sort_key(),
        })
        .collect()
}

/// One structural change.
///
/// Deletes are emitted first, at descending positions relative to the
/// previous list; inserts follow at ascending positions relative to the
/// new list. Applying the ops sequentially to the previous list yields
/// the new list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOp {
    /// Remove the row at this position of the working list
    Delete { position: usize },
    /// Insert the new row at this position of the working list
    Insert { position: usize },
}

/// Ordered structural diff plus scroll anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    /// Ops to replay, in order
    pub ops: Vec<RenderOp>,
    /// Row that should remain visually stationary, when one survives
    pub anchor: Option<ItemId>,
}

impl RenderPlan {
    /// Whether the plan changes anything.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of delete ops.
    pub fn deletes(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, RenderOp::Delete { .. }))
            .count()
    }

    /// Number of insert ops.
    pub fn inserts(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, RenderOp::Insert { .. }))
            .count()
    }
}

/// Computes minimal insert/delete diffs between ordered row lists.
pub struct RenderPlanner;

impl RenderPlanner {
    /// Diff `before` against `after`.
    ///
    /// Both lists must be in timeline order with unique ids, which the
    /// store guarantees. `first_visible` is the caller-supplied anchor
    /// candidate (visibility is a UI concern); when the merge removed it
    /// — only possible on snapshot replacement — the nearest surviving
    /// neighbor by sort key takes over.
    pub fn plan(before: &[RowRef], after: &[RowRef], first_visible: Option<&str>) -> RenderPlan {
        let before_ids: HashSet<&str> = before.iter().map(|row| row.id.as_str()).collect();
        let after_ids: HashSet<&str> = after.iter().map(|row| row.id.as_str()).collect();

        let mut ops = Vec::new();
        for (position, row) in before.iter().enumerate().rev() {
            if !after_ids.contains(row.id.as_str()) {
                ops.push(RenderOp::Delete { position });
            }
        }
        for (position, row) in after.iter().enumerate() {
            if !before_ids.contains(row.id.as_str()) {
                ops.push(RenderOp::Insert { position });
            }
        }

        let anchor = Self::select_anchor(before, &after_ids, first_visible);
        RenderPlan { ops, anchor }
    }

    fn select_anchor(
        before: &[RowRef],
        after_ids: &HashSet<&str>,
        first_visible: Option<&str>,
    ) -> Option<ItemId> {
        let wanted = first_visible?;
        if after_ids.contains(wanted) {
            return Some(wanted.to_string());
        }

        // The visible row was removed. Fall back to the surviving row
        // closest by sort key, preferring the newer one on a tie.
        let wanted_key = before.iter().find(|row| row.id == wanted)?.sort_key;
        before
            .iter()
            .filter(|row| after_ids.contains(row.id.as_str()))
            .min_by(|a, b| {
                a.sort_key
                    .abs_diff(wanted_key)
                    .cmp(&b.sort_key.abs_diff(wanted_key))
                    .then_with(|| b.sort_key.cmp(&a.sort_key))
            })
            .map(|row| row.id.clone())
    }
}
