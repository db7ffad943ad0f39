use crate::geometry::{Bounds, Point};
use crate::tool::{Effect, InputEvent, Key, Modifiers, MouseButton, ToolEvent, ToolState};

use super::{Editor, Gesture, Notification};

impl Editor {
    /// Entry point for pointer, keyboard and wheel input.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown {
                pos,
                button,
                modifiers,
            } => self.pointer_down(pos, button, modifiers),
            InputEvent::PointerMove { pos } => self.pointer_move(pos),
            InputEvent::PointerUp { pos, button } => self.pointer_up(pos, button),
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, modifiers),
            InputEvent::Scroll { delta, pos } => self.scroll(delta, pos),
        }
    }

    /// Snapped world position under the screen point `pos`.
    fn resolve(&mut self, pos: Point) -> Point {
        let world = self.viewport.screen_to_world(pos);
        self.cursor = world;
        self.update_snap(world);
        self.snapper.current().position_or(world)
    }

    fn update_snap(&mut self, world: Point) {
        let tolerance = self.tolerance();
        self.ensure_grid();
        let changed = match &self.grid {
            Some(grid) => self.snapper.update(world, tolerance, grid),
            None => false,
        };
        if changed {
            let current = self.snapper.current();
            self.notify(Notification::SnapChanged(current));
        }
    }

    fn pointer_down(&mut self, pos: Point, button: MouseButton, modifiers: Modifiers) {
        let panning = button == MouseButton::Middle
            || (button == MouseButton::Left && (modifiers.ctrl || self.tool == ToolState::Pan));
        if panning {
            self.gesture = Gesture::Pan { last: pos };
            return;
        }
        if button != MouseButton::Left {
            return;
        }
        let raw = self.viewport.screen_to_world(pos);
        let at = self.resolve(pos);
        let tolerance = self.tolerance();

        if self.tool.is_idle() && !modifiers.shift {
            if self.begin_vertex_drag(raw, tolerance) || self.begin_peg_drag(raw, tolerance) {
                return;
            }
        }
        let peg = self.drawing.hit_test_peg(raw, tolerance);
        // Station-style tools work on the peg itself, not the snapped point.
        let at = match (peg, &self.tool) {
            (Some(i), ToolState::SetStation | ToolState::SetBacksight | ToolState::SetCheckPoint | ToolState::Stakeout) => {
                self.drawing.peg(i).map_or(at, |p| p.position)
            }
            _ => at,
        };
        self.dispatch(ToolEvent::Click {
            at,
            peg,
            additive: modifiers.shift,
        });
    }

    fn begin_vertex_drag(&mut self, p: Point, tolerance: f64) -> bool {
        let Some(index) = self.drawing.selection().primary() else {
            return false;
        };
        let Some(poly) = self.drawing.polyline(index) else {
            return false;
        };
        let Some(vertex) = poly.vertex_near(p, tolerance) else {
            return false;
        };
        if self.drawing.layers.is_locked(&poly.layer) {
            let msg = format!("Layer {} is locked", poly.layer);
            self.warn(msg);
            return true;
        }
        self.gesture = Gesture::DragVertex {
            index,
            vertex,
            before: poly.clone(),
        };
        true
    }

    fn begin_peg_drag(&mut self, p: Point, tolerance: f64) -> bool {
        let Some(index) = self.drawing.hit_test_peg(p, tolerance) else {
            return false;
        };
        let Some(peg) = self.drawing.peg(index).cloned() else {
            return false;
        };
        self.drawing.select_peg(Some(index));
        if self.drawing.layers.is_locked(&peg.layer) {
            return true;
        }
        self.gesture = Gesture::DragPeg { index, before: peg };
        true
    }

    fn pointer_move(&mut self, pos: Point) {
        let world = self.viewport.screen_to_world(pos);
        self.cursor = world;
        match &mut self.gesture {
            Gesture::Pan { last } => {
                let (dx, dy) = (pos.x - last.x, pos.y - last.y);
                *last = pos;
                self.viewport.pan_pixels(dx, dy);
            }
            Gesture::DragVertex { index, vertex, .. } => {
                let (index, vertex) = (*index, *vertex);
                if let Some(mut poly) = self.drawing.polyline(index).cloned() {
                    if let Some(v) = poly.points.get_mut(vertex) {
                        *v = world;
                    }
                    self.drawing.replace_polyline(index, poly);
                    self.invalidate();
                }
            }
            Gesture::DragPeg { index, .. } => {
                let index = *index;
                if let Some(mut peg) = self.drawing.peg(index).cloned() {
                    peg.position = world;
                    self.drawing.replace_peg(index, peg);
                }
            }
            Gesture::BoxSelect { end, .. } => *end = world,
            Gesture::None => self.update_snap(world),
        }
    }

    fn pointer_up(&mut self, pos: Point, _button: MouseButton) {
        let world = self.viewport.screen_to_world(pos);
        match std::mem::take(&mut self.gesture) {
            Gesture::None | Gesture::Pan { .. } => {}
            Gesture::DragVertex { index, before, .. } => {
                let Some(after) = self.drawing.polyline(index).cloned() else {
                    return;
                };
                if after != before {
                    self.record(crate::history::UndoCommand::ModifyPolyline { index, before, after });
                    self.status("Vertex moved");
                }
            }
            Gesture::DragPeg { index, before } => {
                let Some(after) = self.drawing.peg(index).cloned() else {
                    return;
                };
                if after != before {
                    let name = after.name.clone();
                    self.record(crate::history::UndoCommand::ModifyPeg { index, before, after });
                    self.status(format!("Peg {} moved", name));
                }
            }
            Gesture::BoxSelect { start, .. } => self.finish_box_select(start, world),
        }
    }

    fn finish_box_select(&mut self, start: Point, end: Point) {
        if start.distance_to(end) <= self.tolerance() {
            return;
        }
        let window = Bounds::from_points([start, end].into_iter());
        let Some(window) = window else {
            return;
        };
        let hits: Vec<usize> = self
            .drawing
            .visible_polylines()
            .filter(|(_, p)| p.bounds().map_or(false, |b| window.encloses(&b)))
            .map(|(i, _)| i)
            .collect();
        self.drawing.select_polylines(&hits);
        self.selection_changed();
        self.status(format!("Selected {} polylines", hits.len()));
    }

    fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        if modifiers.ctrl {
            match key {
                Key::Char('z' | 'Z') if modifiers.shift => self.redo(),
                Key::Char('z' | 'Z') => self.undo(),
                Key::Char('y' | 'Y') => self.redo(),
                _ => {}
            }
            return;
        }
        self.dispatch(ToolEvent::Key(key));
    }

    fn scroll(&mut self, delta: f64, pos: Point) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        let target = self.viewport.zoom * self.config.zoom_step.powf(delta);
        if self
            .viewport
            .zoom_at(target, pos, self.config.zoom_min, self.config.zoom_max)
        {
            let zoom = self.viewport.zoom;
            self.notify(Notification::ZoomChanged(zoom));
        }
    }

    /// Carries out one side effect produced by the tool state machine.
    pub(super) fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Status(msg) => self.status(msg),
            Effect::CreatePolyline { points, closed } => self.create_polyline(points, closed),
            Effect::CreateCircle { center, radius } => self.create_circle(center, radius),
            Effect::CreateArc { start, through, end } => self.create_arc(start, through, end),
            Effect::Split { at } => self.split_selected(at),
            Effect::Offset { distance, side } => self.offset_selected(distance, side),
            Effect::Measure { from, to } => self.report_measure(from, to),
            Effect::SetStation { peg } => self.set_station_peg(peg),
            Effect::SetBacksight { peg } => self.set_backsight_peg(peg),
            Effect::CheckPoint { peg } => self.check_point_peg(peg),
            Effect::Stakeout { peg } => self.stakeout_peg(peg),
            Effect::AddPeg { at, elevation } => {
                let name = self.next_peg_name.clone();
                self.add_peg(&name, at, elevation);
                self.next_peg_name = crate::naming::next_peg_name(&name);
            }
            Effect::Pick { at, additive } => self.pick(at, additive),
            Effect::ClearSelection => {
                self.drawing.clear_selection();
                self.selection_changed();
            }
            Effect::DeleteSelection => self.delete_selection(),
        }
    }

    fn pick(&mut self, at: Point, additive: bool) {
        let tolerance = self.tolerance();
        let hit = self.drawing.hit_test_polyline(self.cursor, tolerance).or_else(|| {
            self.drawing.hit_test_polyline(at, tolerance)
        });
        match (hit, additive) {
            (Some(i), true) => self.drawing.toggle_polyline(i),
            (Some(i), false) => self.drawing.select_polyline(Some(i)),
            (None, true) => return,
            (None, false) => {
                self.drawing.clear_selection();
                self.gesture = Gesture::BoxSelect {
                    start: self.cursor,
                    end: self.cursor,
                };
            }
        }
        self.selection_changed();
    }
}
