//! Interactive tool state machine.
//!
//! [`transition`] is the single table mapping `(state, event)` to the next
//! state and the side effects the editor must carry out. It never touches
//! the drawing itself; everything it needs to know about the drawing comes
//! in through [`Guards`] and the resolved [`ToolEvent`].

pub mod input;
pub mod viewport;

pub use input::{InputEvent, Key, Modifiers, MouseButton};
pub use viewport::Viewport;

use crate::geometry::Point;

/// Active interaction mode together with its transient data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    DrawLine {
        start: Option<Point>,
    },
    DrawPolyline {
        points: Vec<Point>,
    },
    DrawRect {
        corner: Option<Point>,
    },
    DrawCircle {
        center: Option<Point>,
    },
    DrawArc {
        start: Option<Point>,
        through: Option<Point>,
    },
    Split,
    OffsetWaitForSide {
        distance: f64,
    },
    Measure {
        start: Option<Point>,
    },
    SetStation,
    SetBacksight,
    SetCheckPoint,
    Stakeout,
    /// Continuous peg placement; every peg gets `elevation`.
    AddPeg {
        elevation: Option<f64>,
    },
    Pan,
}

impl ToolState {
    /// Mode name including the click phase, e.g. `DrawArc2`.
    pub fn name(&self) -> &'static str {
        match self {
            ToolState::Idle => "Idle",
            ToolState::DrawLine { start: None } => "DrawLine1",
            ToolState::DrawLine { .. } => "DrawLine2",
            ToolState::DrawPolyline { .. } => "DrawPolyline",
            ToolState::DrawRect { corner: None } => "DrawRect1",
            ToolState::DrawRect { .. } => "DrawRect2",
            ToolState::DrawCircle { center: None } => "DrawCircle1",
            ToolState::DrawCircle { .. } => "DrawCircle2",
            ToolState::DrawArc { start: None, .. } => "DrawArc1",
            ToolState::DrawArc { through: None, .. } => "DrawArc2",
            ToolState::DrawArc { .. } => "DrawArc3",
            ToolState::Split => "Split",
            ToolState::OffsetWaitForSide { .. } => "OffsetWaitForSide",
            ToolState::Measure { start: None } => "Measure1",
            ToolState::Measure { .. } => "Measure2",
            ToolState::SetStation => "SetStation",
            ToolState::SetBacksight => "SetBacksight",
            ToolState::SetCheckPoint => "SetCheckPoint",
            ToolState::Stakeout => "Stakeout",
            ToolState::AddPeg { .. } => "AddPeg",
            ToolState::Pan => "Pan",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ToolState::Idle)
    }

    pub fn is_measure(&self) -> bool {
        matches!(self, ToolState::Measure { .. })
    }

    /// Points already placed by a drawing tool, for previews.
    pub fn pending_points(&self) -> Vec<Point> {
        match self {
            ToolState::DrawLine { start } => start.iter().copied().collect(),
            ToolState::DrawPolyline { points } => points.clone(),
            ToolState::DrawRect { corner } => corner.iter().copied().collect(),
            ToolState::DrawCircle { center } => center.iter().copied().collect(),
            ToolState::DrawArc { start, through } => start.iter().chain(through.iter()).copied().collect(),
            ToolState::Measure { start } => start.iter().copied().collect(),
            _ => Vec::new(),
        }
    }
}

/// Mode requested by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolKind {
    Select,
    Line,
    Polyline,
    Rectangle,
    Circle,
    Arc,
    Split,
    Offset { distance: f64 },
    Measure,
    SetStation,
    SetBacksight,
    SetCheckPoint,
    Stakeout,
    AddPeg { elevation: Option<f64> },
    Pan,
}

impl ToolKind {
    fn initial_state(self) -> ToolState {
        match self {
            ToolKind::Select => ToolState::Idle,
            ToolKind::Line => ToolState::DrawLine { start: None },
            ToolKind::Polyline => ToolState::DrawPolyline { points: Vec::new() },
            ToolKind::Rectangle => ToolState::DrawRect { corner: None },
            ToolKind::Circle => ToolState::DrawCircle { center: None },
            ToolKind::Arc => ToolState::DrawArc {
                start: None,
                through: None,
            },
            ToolKind::Split => ToolState::Split,
            ToolKind::Offset { distance } => ToolState::OffsetWaitForSide { distance },
            ToolKind::Measure => ToolState::Measure { start: None },
            ToolKind::SetStation => ToolState::SetStation,
            ToolKind::SetBacksight => ToolState::SetBacksight,
            ToolKind::SetCheckPoint => ToolState::SetCheckPoint,
            ToolKind::Stakeout => ToolState::Stakeout,
            ToolKind::AddPeg { elevation } => ToolState::AddPeg { elevation },
            ToolKind::Pan => ToolState::Pan,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            ToolKind::Select => "Select mode",
            ToolKind::Line => "Line: click start point",
            ToolKind::Polyline => "Polyline: click points, Enter to finish, C to close",
            ToolKind::Rectangle => "Rectangle: click first corner",
            ToolKind::Circle => "Circle: click centre",
            ToolKind::Arc => "Arc: click start point",
            ToolKind::Split => "Split: click the point to split at",
            ToolKind::Offset { .. } => "Offset: click on the side to offset towards",
            ToolKind::Measure => "Measure: click first point",
            ToolKind::SetStation => "Click a peg to set the station",
            ToolKind::SetBacksight => "Click a peg to set the backsight",
            ToolKind::SetCheckPoint => "Click a peg to check",
            ToolKind::Stakeout => "Stakeout: click a peg",
            ToolKind::AddPeg { .. } => "Click to place pegs, Escape to finish",
            ToolKind::Pan => "Pan: drag to move the view",
        }
    }
}

/// Facts about the drawing the transition table depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Guards {
    pub has_selection: bool,
    pub has_station: bool,
}

/// Input after the editor has resolved positions and hit tests.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    Activate(ToolKind),
    /// Primary click not consumed by vertex or peg selection.
    Click {
        /// Snapped world position.
        at: Point,
        /// Peg under the cursor, if any.
        peg: Option<usize>,
        additive: bool,
    },
    Key(Key),
}

/// Work the editor performs after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Status(String),
    CreatePolyline { points: Vec<Point>, closed: bool },
    CreateCircle { center: Point, radius: f64 },
    CreateArc { start: Point, through: Point, end: Point },
    Split { at: Point },
    Offset { distance: f64, side: Point },
    Measure { from: Point, to: Point },
    SetStation { peg: usize },
    SetBacksight { peg: usize },
    CheckPoint { peg: usize },
    Stakeout { peg: usize },
    AddPeg { at: Point, elevation: Option<f64> },
    Pick { at: Point, additive: bool },
    ClearSelection,
    DeleteSelection,
}

/// Result of feeding one event to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: ToolState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: ToolState) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn status(self, msg: &str) -> Self {
        self.with(Effect::Status(msg.to_string()))
    }
}

fn activation_guard(kind: ToolKind, guards: &Guards) -> Option<&'static str> {
    match kind {
        ToolKind::Split if !guards.has_selection => Some("Select a polyline to split first"),
        ToolKind::Offset { .. } if !guards.has_selection => Some("Select a polyline to offset first"),
        ToolKind::Offset { distance } if !(distance.is_finite() && distance > 0.0) => {
            Some("Offset distance must be a positive number")
        }
        ToolKind::SetBacksight if !guards.has_station => Some("Set station point first"),
        ToolKind::SetCheckPoint if !guards.has_station => Some("Set station point first"),
        ToolKind::Stakeout if !guards.has_station => Some("Set station point first"),
        _ => None,
    }
}

/// Feeds one event to the state machine. `None` means the event is not
/// recognised in `state` and must be ignored.
pub fn transition(state: &ToolState, event: &ToolEvent, guards: &Guards) -> Option<Transition> {
    use ToolState as S;

    if let ToolEvent::Activate(kind) = event {
        return Some(match activation_guard(*kind, guards) {
            Some(reason) => Transition::to(state.clone()).status(reason),
            None => Transition::to(kind.initial_state()).status(kind.prompt()),
        });
    }

    let t = match (state, event) {
        (S::Idle, ToolEvent::Key(Key::Escape)) => Transition::to(S::Idle).with(Effect::ClearSelection),
        (_, ToolEvent::Key(Key::Escape)) => Transition::to(S::Idle).status("Cancelled"),
        (S::Idle, ToolEvent::Key(Key::Delete)) => Transition::to(S::Idle).with(Effect::DeleteSelection),
        (S::Idle, ToolEvent::Click { at, additive, .. }) => Transition::to(S::Idle).with(Effect::Pick {
            at: *at,
            additive: *additive,
        }),

        (S::DrawLine { start: None }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::DrawLine { start: Some(*at) }).status("Line: click end point")
        }
        (S::DrawLine { start: Some(s) }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::Idle).with(Effect::CreatePolyline {
                points: vec![*s, *at],
                closed: false,
            })
        }

        (S::DrawPolyline { points }, ToolEvent::Click { at, .. }) => {
            let mut points = points.clone();
            points.push(*at);
            Transition::to(S::DrawPolyline { points })
        }
        (S::DrawPolyline { points }, ToolEvent::Key(Key::Backspace)) => {
            let mut points = points.clone();
            points.pop();
            Transition::to(S::DrawPolyline { points })
        }
        (S::DrawPolyline { points }, ToolEvent::Key(Key::Return)) => {
            if points.len() >= 2 {
                Transition::to(S::Idle).with(Effect::CreatePolyline {
                    points: points.clone(),
                    closed: false,
                })
            } else {
                Transition::to(S::Idle).status("Polyline needs at least 2 points")
            }
        }
        (S::DrawPolyline { points }, ToolEvent::Key(Key::Char('c' | 'C'))) => {
            if points.len() >= 3 {
                Transition::to(S::Idle).with(Effect::CreatePolyline {
                    points: points.clone(),
                    closed: true,
                })
            } else {
                Transition::to(state.clone()).status("A closed polyline needs at least 3 points")
            }
        }

        (S::DrawRect { corner: None }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::DrawRect { corner: Some(*at) }).status("Rectangle: click opposite corner")
        }
        (S::DrawRect { corner: Some(c) }, ToolEvent::Click { at, .. }) => {
            let (a, b) = (*c, *at);
            if (a.x - b.x).abs() < f64::EPSILON || (a.y - b.y).abs() < f64::EPSILON {
                Transition::to(state.clone()).status("Rectangle has zero width or height")
            } else {
                Transition::to(S::Idle).with(Effect::CreatePolyline {
                    points: vec![a, Point::new(b.x, a.y), b, Point::new(a.x, b.y)],
                    closed: true,
                })
            }
        }

        (S::DrawCircle { center: None }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::DrawCircle { center: Some(*at) }).status("Circle: click a point on the circle")
        }
        (S::DrawCircle { center: Some(c) }, ToolEvent::Click { at, .. }) => {
            let radius = c.distance_to(*at);
            if radius < f64::EPSILON {
                Transition::to(state.clone()).status("Circle radius must be greater than zero")
            } else {
                Transition::to(S::Idle).with(Effect::CreateCircle { center: *c, radius })
            }
        }

        (S::DrawArc { start: None, .. }, ToolEvent::Click { at, .. }) => Transition::to(S::DrawArc {
            start: Some(*at),
            through: None,
        })
        .status("Arc: click a point on the arc"),
        (S::DrawArc { start: Some(s), through: None }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::DrawArc {
                start: Some(*s),
                through: Some(*at),
            })
            .status("Arc: click end point")
        }
        (S::DrawArc { start: Some(s), through: Some(m) }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::Idle).with(Effect::CreateArc {
                start: *s,
                through: *m,
                end: *at,
            })
        }

        (S::Split, ToolEvent::Click { at, .. }) => Transition::to(S::Idle).with(Effect::Split { at: *at }),
        (S::OffsetWaitForSide { distance }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::Idle).with(Effect::Offset {
                distance: *distance,
                side: *at,
            })
        }

        (S::Measure { start: None }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::Measure { start: Some(*at) }).status("Measure: click second point")
        }
        (S::Measure { start: Some(s) }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::Measure { start: None }).with(Effect::Measure { from: *s, to: *at })
        }

        (S::SetStation, ToolEvent::Click { peg: Some(i), .. }) => {
            Transition::to(S::Idle).with(Effect::SetStation { peg: *i })
        }
        (S::SetStation, ToolEvent::Click { peg: None, .. }) => {
            Transition::to(S::SetStation).status("Station must be placed on a peg")
        }
        (S::SetBacksight, ToolEvent::Click { peg: Some(i), .. }) => {
            Transition::to(S::Idle).with(Effect::SetBacksight { peg: *i })
        }
        (S::SetBacksight, ToolEvent::Click { peg: None, .. }) => {
            Transition::to(S::SetBacksight).status("Backsight must be placed on a peg")
        }
        (S::SetCheckPoint, ToolEvent::Click { peg: Some(i), .. }) => {
            Transition::to(S::Idle).with(Effect::CheckPoint { peg: *i })
        }
        (S::SetCheckPoint, ToolEvent::Click { peg: None, .. }) => {
            Transition::to(S::SetCheckPoint).status("Check point must be a peg")
        }
        (S::Stakeout, ToolEvent::Click { peg: Some(i), .. }) => {
            Transition::to(S::Stakeout).with(Effect::Stakeout { peg: *i })
        }

        (S::AddPeg { elevation }, ToolEvent::Click { at, .. }) => {
            Transition::to(S::AddPeg { elevation: *elevation }).with(Effect::AddPeg {
                at: *at,
                elevation: *elevation,
            })
        }

        _ => return None,
    };
    Some(t)
}
