//! Undo/redo log of reversible drawing mutations.
//!
//! Commands hold copies of entity state, never references, so deleted
//! entities can always be restored.

use crate::drawing::{Drawing, Peg};
use crate::geometry::Polyline;

/// One reversible mutation of the drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoCommand {
    AddPolyline {
        index: usize,
        polyline: Polyline,
    },
    DeletePolyline {
        index: usize,
        polyline: Polyline,
    },
    ModifyPolyline {
        index: usize,
        before: Polyline,
        after: Polyline,
    },
    /// Insertions in ascending final index order.
    AddMultiple {
        entries: Vec<(usize, Polyline)>,
    },
    /// Removals in ascending original index order.
    DeleteMultiple {
        entries: Vec<(usize, Polyline)>,
    },
    AddPeg {
        index: usize,
        peg: Peg,
    },
    DeletePeg {
        index: usize,
        peg: Peg,
    },
    ModifyPeg {
        index: usize,
        before: Peg,
        after: Peg,
    },
    /// Recorded so the limitation can be reported; never inverted.
    DeleteLayer {
        name: String,
    },
    /// Several commands undone and redone as one step.
    Group {
        label: String,
        commands: Vec<UndoCommand>,
    },
}

impl UndoCommand {
    /// Short description used in status messages.
    pub fn label(&self) -> &str {
        match self {
            UndoCommand::AddPolyline { .. } => "Add polyline",
            UndoCommand::DeletePolyline { .. } => "Delete polyline",
            UndoCommand::ModifyPolyline { .. } => "Modify polyline",
            UndoCommand::AddMultiple { .. } => "Add polylines",
            UndoCommand::DeleteMultiple { .. } => "Delete polylines",
            UndoCommand::AddPeg { .. } => "Add peg",
            UndoCommand::DeletePeg { .. } => "Delete peg",
            UndoCommand::ModifyPeg { .. } => "Modify peg",
            UndoCommand::DeleteLayer { .. } => "Delete layer",
            UndoCommand::Group { label, .. } => label,
        }
    }

    pub fn is_undoable(&self) -> bool {
        match self {
            UndoCommand::DeleteLayer { .. } => false,
            UndoCommand::Group { commands, .. } => commands.iter().all(|c| c.is_undoable()),
            _ => true,
        }
    }

    /// Command that reverses this one, `None` for layer deletion.
    pub fn inverse(&self) -> Option<UndoCommand> {
        Some(match self {
            UndoCommand::AddPolyline { index, polyline } => UndoCommand::DeletePolyline {
                index: *index,
                polyline: polyline.clone(),
            },
            UndoCommand::DeletePolyline { index, polyline } => UndoCommand::AddPolyline {
                index: *index,
                polyline: polyline.clone(),
            },
            UndoCommand::ModifyPolyline { index, before, after } => UndoCommand::ModifyPolyline {
                index: *index,
                before: after.clone(),
                after: before.clone(),
            },
            UndoCommand::AddMultiple { entries } => UndoCommand::DeleteMultiple {
                entries: entries.clone(),
            },
            UndoCommand::DeleteMultiple { entries } => UndoCommand::AddMultiple {
                entries: entries.clone(),
            },
            UndoCommand::AddPeg { index, peg } => UndoCommand::DeletePeg {
                index: *index,
                peg: peg.clone(),
            },
            UndoCommand::DeletePeg { index, peg } => UndoCommand::AddPeg {
                index: *index,
                peg: peg.clone(),
            },
            UndoCommand::ModifyPeg { index, before, after } => UndoCommand::ModifyPeg {
                index: *index,
                before: after.clone(),
                after: before.clone(),
            },
            UndoCommand::DeleteLayer { .. } => return None,
            UndoCommand::Group { label, commands } => UndoCommand::Group {
                label: label.clone(),
                commands: commands
                    .iter()
                    .rev()
                    .map(|c| c.inverse())
                    .collect::<Option<Vec<_>>>()?,
            },
        })
    }

    /// Performs the forward mutation. Returns `false` if an index no longer
    /// matches the drawing.
    pub fn apply(&self, drawing: &mut Drawing) -> bool {
        match self {
            UndoCommand::AddPolyline { index, polyline } => {
                if *index > drawing.polylines().len() {
                    return false;
                }
                drawing.insert_polyline(*index, polyline.clone());
                true
            }
            UndoCommand::DeletePolyline { index, .. } => drawing.remove_polyline(*index).is_some(),
            UndoCommand::ModifyPolyline { index, after, .. } => {
                drawing.replace_polyline(*index, after.clone()).is_some()
            }
            UndoCommand::AddMultiple { entries } => {
                let mut ok = true;
                for (index, polyline) in entries {
                    if *index > drawing.polylines().len() {
                        ok = false;
                        continue;
                    }
                    drawing.insert_polyline(*index, polyline.clone());
                }
                ok
            }
            UndoCommand::DeleteMultiple { entries } => {
                let mut ok = true;
                for (index, _) in entries.iter().rev() {
                    ok &= drawing.remove_polyline(*index).is_some();
                }
                ok
            }
            UndoCommand::AddPeg { index, peg } => {
                if *index > drawing.pegs().len() {
                    return false;
                }
                drawing.insert_peg(*index, peg.clone());
                true
            }
            UndoCommand::DeletePeg { index, .. } => drawing.remove_peg(*index).is_some(),
            UndoCommand::ModifyPeg { index, after, .. } => {
                drawing.replace_peg(*index, after.clone()).is_some()
            }
            UndoCommand::DeleteLayer { name } => {
                drawing.layers.remove_layer(name);
                true
            }
            UndoCommand::Group { commands, .. } => {
                commands.iter().fold(true, |ok, c| c.apply(drawing) && ok)
            }
        }
    }

    /// Re-captures the state a modify command is about to overwrite.
    fn refreshed(self, drawing: &Drawing) -> UndoCommand {
        match self {
            UndoCommand::ModifyPolyline { index, before, after } => {
                let current = drawing.polyline(index).cloned().unwrap_or(after);
                UndoCommand::ModifyPolyline {
                    index,
                    before,
                    after: current,
                }
            }
            UndoCommand::ModifyPeg { index, before, after } => {
                let current = drawing.peg(index).cloned().unwrap_or(after);
                UndoCommand::ModifyPeg {
                    index,
                    before,
                    after: current,
                }
            }
            other => other,
        }
    }
}

/// What an undo or redo request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// The stack was empty.
    Empty,
    Applied(String),
    /// The command cannot be reversed and was discarded.
    Unsupported(String),
}

/// Pair of undo and redo stacks.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    undo: Vec<UndoCommand>,
    redo: Vec<UndoCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mutation that has already been applied.
    pub fn record(&mut self, command: UndoCommand) {
        log::debug!("recorded: {}", command.label());
        self.undo.push(command);
        self.redo.clear();
    }

    /// Applies `command` to `drawing` and records it.
    pub fn execute(&mut self, command: UndoCommand, drawing: &mut Drawing) -> bool {
        let ok = command.apply(drawing);
        if !ok {
            log::warn!("{} did not match the drawing", command.label());
        }
        self.record(command);
        ok
    }

    pub fn undo(&mut self, drawing: &mut Drawing) -> HistoryOutcome {
        let Some(command) = self.undo.pop() else {
            return HistoryOutcome::Empty;
        };
        let label = command.label().to_string();
        let command = command.refreshed(drawing);
        match command.inverse() {
            Some(inverse) => {
                if !inverse.apply(drawing) {
                    log::warn!("undo of {} did not match the drawing", label);
                }
                self.redo.push(command);
                HistoryOutcome::Applied(label)
            }
            None => HistoryOutcome::Unsupported(label),
        }
    }

    pub fn redo(&mut self, drawing: &mut Drawing) -> HistoryOutcome {
        let Some(command) = self.redo.pop() else {
            return HistoryOutcome::Empty;
        };
        let label = command.label().to_string();
        // Refresh the inverse so `before` reflects what redo overwrites.
        let command = match command.inverse() {
            Some(inv) => inv.refreshed(drawing).inverse().unwrap_or(command),
            None => command,
        };
        if !command.apply(drawing) {
            log::warn!("redo of {} did not match the drawing", label);
        }
        self.undo.push(command);
        HistoryOutcome::Applied(label)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::styles::Color;

    fn seg(x: f64) -> Polyline {
        Polyline::new(vec![Point::new(x, 0.0), Point::new(x, 1.0)], "0", Color::WHITE)
    }

    #[test]
    fn undo_on_empty_stack_is_silent() {
        let mut d = Drawing::new();
        let mut log = CommandLog::new();
        assert_eq!(log.undo(&mut d), HistoryOutcome::Empty);
        assert_eq!(log.redo(&mut d), HistoryOutcome::Empty);
    }

    #[test]
    fn add_then_undo_then_redo() {
        let mut d = Drawing::new();
        let mut log = CommandLog::new();
        log.execute(UndoCommand::AddPolyline { index: 0, polyline: seg(1.0) }, &mut d);
        assert_eq!(d.polylines().len(), 1);
        assert!(matches!(log.undo(&mut d), HistoryOutcome::Applied(_)));
        assert!(d.polylines().is_empty());
        assert!(log.can_redo());
        log.redo(&mut d);
        assert_eq!(d.polylines()[0], seg(1.0));
    }

    #[test]
    fn new_command_clears_redo() {
        let mut d = Drawing::new();
        let mut log = CommandLog::new();
        log.execute(UndoCommand::AddPolyline { index: 0, polyline: seg(1.0) }, &mut d);
        log.undo(&mut d);
        log.execute(UndoCommand::AddPolyline { index: 0, polyline: seg(2.0) }, &mut d);
        assert!(!log.can_redo());
    }

    #[test]
    fn delete_multiple_restores_positions() {
        let mut d = Drawing::new();
        for x in 0..4 {
            d.push_polyline(seg(x as f64));
        }
        let entries = vec![(1, seg(1.0)), (3, seg(3.0))];
        let mut log = CommandLog::new();
        log.execute(UndoCommand::DeleteMultiple { entries }, &mut d);
        assert_eq!(d.polylines(), &[seg(0.0), seg(2.0)]);
        log.undo(&mut d);
        assert_eq!(d.polylines(), &[seg(0.0), seg(1.0), seg(2.0), seg(3.0)]);
    }

    #[test]
    fn group_undoes_in_reverse() {
        let mut d = Drawing::new();
        d.push_polyline(seg(0.0));
        let group = UndoCommand::Group {
            label: "Split polyline".into(),
            commands: vec![
                UndoCommand::DeletePolyline { index: 0, polyline: seg(0.0) },
                UndoCommand::AddMultiple { entries: vec![(0, seg(5.0)), (1, seg(6.0))] },
            ],
        };
        let mut log = CommandLog::new();
        log.execute(group, &mut d);
        assert_eq!(d.polylines(), &[seg(5.0), seg(6.0)]);
        assert_eq!(log.undo(&mut d), HistoryOutcome::Applied("Split polyline".into()));
        assert_eq!(d.polylines(), &[seg(0.0)]);
    }

    #[test]
    fn layer_deletion_is_reported_not_undone() {
        let mut d = Drawing::with_survey_layers();
        let mut log = CommandLog::new();
        log.execute(UndoCommand::DeleteLayer { name: "Pegs".into() }, &mut d);
        assert!(d.layers.layer("Pegs").is_none());
        assert_eq!(log.undo(&mut d), HistoryOutcome::Unsupported("Delete layer".into()));
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn modify_redo_uses_current_state() {
        let mut d = Drawing::new();
        d.push_polyline(seg(0.0));
        let mut log = CommandLog::new();
        d.replace_polyline(0, seg(1.0));
        log.record(UndoCommand::ModifyPolyline { index: 0, before: seg(0.0), after: seg(1.0) });
        log.undo(&mut d);
        assert_eq!(d.polylines()[0], seg(0.0));
        log.redo(&mut d);
        assert_eq!(d.polylines()[0], seg(1.0));
        log.undo(&mut d);
        assert_eq!(d.polylines()[0], seg(0.0));
    }

    #[test]
    fn deleting_selected_clears_selection() {
        let mut d = Drawing::new();
        d.push_polyline(seg(0.0));
        d.push_polyline(seg(1.0));
        d.select_polyline(Some(1));
        let mut log = CommandLog::new();
        log.execute(UndoCommand::DeletePolyline { index: 1, polyline: seg(1.0) }, &mut d);
        assert_eq!(d.selection().primary(), None);
        log.undo(&mut d);
        log.execute(UndoCommand::DeletePolyline { index: 0, polyline: seg(0.0) }, &mut d);
        assert_eq!(d.polylines(), &[seg(1.0)]);
    }
}
