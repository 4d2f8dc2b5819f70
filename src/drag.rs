//! Drag engine for moving nodes in lockstep with the pointer.
//!
//! A [`DragState`] lives only for the duration of one gesture. It records the
//! pointer's starting screen position and the starting world position of every
//! participating node. Pointer travel is converted to a world-space delta by
//! dividing by the viewport scale, so a drag looks the same at any zoom level.
//!
//! While dragging, any node that comes within the group distance of a selected
//! node is recruited and moves along for the rest of the gesture. Recruitment
//! is one-directional and is measured only against selected nodes, never
//! against other recruits.

use crate::selection::Selection;
use crate::types::{Diagram, NodeId};
use crate::viewport::Viewport;
use egui::{Pos2, Vec2};
use std::collections::BTreeMap;

/// Where a participating node started, and the drag delta already applied when it joined.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragMember {
    start: Pos2,
    joined_at: Vec2,
}

/// Ephemeral state of a node drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pointer_start: Pos2,
    members: BTreeMap<NodeId, DragMember>,
    last_delta: Vec2,
}

impl DragState {
    /// Starts a drag at `pointer` (screen space) over the given nodes.
    ///
    /// Ids that do not exist in `diagram` are ignored.
    pub fn begin<'a>(
        pointer: Pos2,
        node_ids: impl IntoIterator<Item = &'a NodeId>,
        diagram: &Diagram,
    ) -> Self {
        let members = node_ids
            .into_iter()
            .filter_map(|id| {
                diagram.node(id).map(|node| {
                    (
                        id.clone(),
                        DragMember {
                            start: node.position(),
                            joined_at: Vec2::ZERO,
                        },
                    )
                })
            })
            .collect();
        Self {
            pointer_start: pointer,
            members,
            last_delta: Vec2::ZERO,
        }
    }

    /// Screen position where the drag began.
    pub fn pointer_start(&self) -> Pos2 {
        self.pointer_start
    }

    /// Whether the node participates in this drag.
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    /// Ids of all participating nodes.
    pub fn members(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.members.keys()
    }

    /// Number of participating nodes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no node participates.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// World position the node is measured from.
    pub fn start_position(&self, id: &str) -> Option<Pos2> {
        self.members.get(id).map(|m| m.start)
    }

    /// Advances the drag to a new pointer position.
    ///
    /// First recruits nearby nodes using positions as they are before this
    /// update, then computes the new position of every participant.
    ///
    /// # Returns
    ///
    /// The new world position for each participating node.
    pub fn update(
        &mut self,
        pointer: Pos2,
        viewport: &Viewport,
        diagram: &Diagram,
        selection: &Selection,
        group_distance: f32,
    ) -> Vec<(NodeId, Pos2)> {
        self.recruit_nearby(diagram, selection, group_distance);

        let delta = viewport.screen_delta_to_world(pointer - self.pointer_start);
        self.last_delta = delta;

        self.members
            .iter()
            .map(|(id, member)| (id.clone(), member.start + (delta - member.joined_at)))
            .collect()
    }

    /// Adds every non-participating node lying within `group_distance` of another selected node.
    fn recruit_nearby(&mut self, diagram: &Diagram, selection: &Selection, group_distance: f32) {
        let anchors: Vec<(&NodeId, Pos2)> = selection
            .nodes()
            .filter_map(|id| diagram.node(id).map(|n| (id, n.position())))
            .collect();
        if anchors.is_empty() {
            return;
        }

        for node in &diagram.nodes {
            if self.members.contains_key(&node.id) {
                continue;
            }
            let position = node.position();
            let near = anchors
                .iter()
                .any(|(id, anchor)| **id != node.id && position.distance(*anchor) <= group_distance);
            if near {
                log::debug!("drag recruited node {}", node.id);
                self.members.insert(
                    node.id.clone(),
                    DragMember {
                        start: position,
                        joined_at: self.last_delta,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GROUP_DISTANCE;
    use crate::types::Node;
    use egui::pos2;

    fn approx_pos(a: Pos2, b: Pos2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    fn add(diagram: &mut Diagram, x: f32, y: f32) -> NodeId {
        diagram.add_node(Node::new("n", pos2(x, y)))
    }

    fn select(ids: &[&NodeId]) -> Selection {
        let mut selection = Selection::default();
        for id in ids {
            selection.select_toggle_additive(id, true);
        }
        selection
    }

    /// Runs one drag update and writes the results back, like the store does.
    fn step(
        drag: &mut DragState,
        pointer: Pos2,
        viewport: &Viewport,
        diagram: &mut Diagram,
        selection: &Selection,
    ) {
        let moves = drag.update(pointer, viewport, diagram, selection, GROUP_DISTANCE);
        for (id, pos) in moves {
            if let Some(node) = diagram.node_mut(&id) {
                node.set_position(pos);
            }
        }
    }

    fn position(diagram: &Diagram, id: &str) -> Pos2 {
        diagram.node(id).unwrap().position()
    }

    #[test]
    fn test_multi_drag_is_zoom_invariant() {
        let mut diagram = Diagram::new();
        let a = add(&mut diagram, 0.0, 0.0);
        let b = add(&mut diagram, 10.0, 10.0);
        let selection = select(&[&a, &b]);
        let viewport = Viewport::new(0.0, 0.0, 2.0);

        let mut drag = DragState::begin(pos2(50.0, 50.0), selection.nodes(), &diagram);
        step(&mut drag, pos2(150.0, 150.0), &viewport, &mut diagram, &selection);

        assert!(approx_pos(position(&diagram, &a), pos2(50.0, 50.0)));
        assert!(approx_pos(position(&diagram, &b), pos2(60.0, 60.0)));
    }

    #[test]
    fn test_world_delta_scales_inversely_with_zoom() {
        for scale in [0.1_f32, 0.5, 1.0, 2.5, 4.0] {
            let mut diagram = Diagram::new();
            let a = add(&mut diagram, 100.0, -20.0);
            let selection = select(&[&a]);
            let viewport = Viewport::new(13.0, 7.0, scale);

            let mut drag = DragState::begin(pos2(0.0, 0.0), selection.nodes(), &diagram);
            step(&mut drag, pos2(30.0, -12.0), &viewport, &mut diagram, &selection);

            let expected = pos2(100.0 + 30.0 / scale, -20.0 - 12.0 / scale);
            assert!(approx_pos(position(&diagram, &a), expected), "scale {scale}");
        }
    }

    #[test]
    fn test_updates_are_anchored_to_gesture_start() {
        let mut diagram = Diagram::new();
        let a = add(&mut diagram, 0.0, 0.0);
        let selection = select(&[&a]);
        let viewport = Viewport::default();

        let mut drag = DragState::begin(pos2(0.0, 0.0), selection.nodes(), &diagram);
        step(&mut drag, pos2(10.0, 0.0), &viewport, &mut diagram, &selection);
        step(&mut drag, pos2(25.0, 5.0), &viewport, &mut diagram, &selection);
        step(&mut drag, pos2(20.0, 5.0), &viewport, &mut diagram, &selection);

        assert_eq!(position(&diagram, &a), pos2(20.0, 5.0));
    }

    #[test]
    fn test_nearby_node_is_recruited_and_follows() {
        let mut diagram = Diagram::new();
        let a = add(&mut diagram, 0.0, 0.0);
        let b = add(&mut diagram, 30.0, 30.0);
        let selection = select(&[&a]);
        let viewport = Viewport::default();

        let mut drag = DragState::begin(pos2(0.0, 0.0), selection.nodes(), &diagram);
        assert!(!drag.contains(&b));

        step(&mut drag, pos2(10.0, 0.0), &viewport, &mut diagram, &selection);
        assert!(drag.contains(&b));
        assert_eq!(position(&diagram, &a), pos2(10.0, 0.0));
        assert_eq!(position(&diagram, &b), pos2(40.0, 30.0));

        step(&mut drag, pos2(50.0, 20.0), &viewport, &mut diagram, &selection);
        assert_eq!(position(&diagram, &a), pos2(50.0, 20.0));
        assert_eq!(position(&diagram, &b), pos2(80.0, 50.0));
    }

    #[test]
    fn test_node_recruited_mid_drag_does_not_jump() {
        let mut diagram = Diagram::new();
        let a = add(&mut diagram, 0.0, 0.0);
        let b = add(&mut diagram, 150.0, 0.0);
        let selection = select(&[&a]);
        let viewport = Viewport::default();

        let mut drag = DragState::begin(pos2(0.0, 0.0), selection.nodes(), &diagram);
        step(&mut drag, pos2(50.0, 0.0), &viewport, &mut diagram, &selection);
        assert!(!drag.contains(&b));
        assert_eq!(position(&diagram, &b), pos2(150.0, 0.0));

        // A is now 100 from B; one more step brings it within range.
        step(&mut drag, pos2(100.0, 0.0), &viewport, &mut diagram, &selection);
        assert!(!drag.contains(&b));
        step(&mut drag, pos2(110.0, 0.0), &viewport, &mut diagram, &selection);
        assert!(drag.contains(&b));
        assert_eq!(drag.start_position(&b), Some(pos2(150.0, 0.0)));
        assert_eq!(position(&diagram, &a), pos2(110.0, 0.0));
        assert_eq!(position(&diagram, &b), pos2(160.0, 0.0));
    }

    #[test]
    fn test_recruitment_is_monotonic() {
        let mut diagram = Diagram::new();
        let a = add(&mut diagram, 0.0, 0.0);
        let b = add(&mut diagram, 30.0, 30.0);
        let selection = select(&[&a]);
        let viewport = Viewport::default();

        let mut drag = DragState::begin(pos2(0.0, 0.0), selection.nodes(), &diagram);
        step(&mut drag, pos2(1.0, 0.0), &viewport, &mut diagram, &selection);
        assert!(drag.contains(&b));

        // Push B far outside the group distance; it stays in the drag.
        diagram.node_mut(&b).unwrap().set_position(pos2(5000.0, 5000.0));
        for x in [2.0, 3.0, 4.0] {
            step(&mut drag, pos2(x, 0.0), &viewport, &mut diagram, &selection);
            assert!(drag.contains(&b));
        }
        assert_eq!(drag.len(), 2);
    }

    #[test]
    fn test_recruitment_is_not_transitive() {
        let mut diagram = Diagram::new();
        let a = add(&mut diagram, 0.0, 0.0);
        let b = add(&mut diagram, 50.0, 0.0);
        let c = add(&mut diagram, 100.0, 0.0);
        let selection = select(&[&a]);
        let viewport = Viewport::default();

        let mut drag = DragState::begin(pos2(0.0, 0.0), selection.nodes(), &diagram);
        for x in [-5.0, -10.0, -20.0] {
            step(&mut drag, pos2(x, 0.0), &viewport, &mut diagram, &selection);
        }

        assert!(drag.contains(&b));
        assert!(!drag.contains(&c));
        assert_eq!(position(&diagram, &b), pos2(30.0, 0.0));
        assert_eq!(position(&diagram, &c), pos2(100.0, 0.0));
    }

    #[test]
    fn test_distant_nodes_stay_put() {
        let mut diagram = Diagram::new();
        let a = add(&mut diagram, 0.0, 0.0);
        let far = add(&mut diagram, 500.0, 500.0);
        let selection = select(&[&a]);
        let viewport = Viewport::default();

        let mut drag = DragState::begin(pos2(0.0, 0.0), selection.nodes(), &diagram);
        let moves = drag.update(pos2(10.0, 10.0), &viewport, &diagram, &selection, GROUP_DISTANCE);

        assert_eq!(moves.len(), 1);
        assert!(moves.iter().all(|(id, _)| *id != far));
    }

    #[test]
    fn test_empty_drag_moves_nothing_but_still_scans() {
        let mut diagram = Diagram::new();
        let a = add(&mut diagram, 0.0, 0.0);
        let b = add(&mut diagram, 20.0, 0.0);
        let selection = select(&[&a]);
        let viewport = Viewport::default();

        let mut drag = DragState::begin(pos2(0.0, 0.0), std::iter::empty(), &diagram);
        assert!(drag.is_empty());

        step(&mut drag, pos2(10.0, 0.0), &viewport, &mut diagram, &selection);
        assert!(drag.contains(&b));
        assert!(!drag.contains(&a));
        assert_eq!(position(&diagram, &a), pos2(0.0, 0.0));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let diagram = Diagram::new();
        let ghost: NodeId = "ghost".into();
        let drag = DragState::begin(pos2(0.0, 0.0), [&ghost], &diagram);
        assert!(drag.is_empty());
    }
}
