//! Editing session tying the drawing, tools, snapping and history together.
//!
//! The [`Editor`] is driven by abstract [`InputEvent`]s and reports back
//! through [`Notification`] observers. Interactive operations never return
//! errors: failures become status messages and leave the drawing untouched.

mod edit;
mod input;
mod terrain;

pub use terrain::{MAJOR_CONTOUR_LAYER, MINOR_CONTOUR_LAYER};

use crate::config::EditorConfig;
use crate::drawing::Drawing;
use crate::dtm::{ContourLine, Tin};
use crate::geometry::{DefaultGeometry, GeometryLibrary, Point};
use crate::history::{CommandLog, HistoryOutcome, UndoCommand};
use crate::io::project::{read_project_json, write_project_json, ProjectFile};
use crate::layers::LayerManager;
use crate::snap::{SegmentGrid, SnapResult, Snapper};
use crate::surveying::{CheckPoint, StakeoutInfo};
use crate::tool::{transition, Guards, ToolEvent, ToolKind, ToolState, Viewport};

/// Layer new drawing tools place their entities on until another is chosen.
pub const DEFAULT_LAYER: &str = "Boundary";
/// Layer receiving pegs placed by hand.
pub const PEG_LAYER: &str = "Pegs";

/// Change events for panels observing the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Status(String),
    LayersChanged,
    /// Primary selected polyline after the change.
    SelectionChanged(Option<usize>),
    UndoRedoChanged { can_undo: bool, can_redo: bool },
    ZoomChanged(f64),
    SnapChanged(SnapResult),
    ToolChanged(&'static str),
}

pub type Observer = Box<dyn FnMut(&Notification)>;

/// Pointer gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    None,
    Pan {
        last: Point,
    },
    DragVertex {
        index: usize,
        vertex: usize,
        before: crate::geometry::Polyline,
    },
    DragPeg {
        index: usize,
        before: crate::drawing::Peg,
    },
    BoxSelect {
        start: Point,
        end: Point,
    },
}

pub struct Editor {
    drawing: Drawing,
    history: CommandLog,
    tool: ToolState,
    snapper: Snapper,
    /// Spatial index of visible segments; `None` when stale.
    grid: Option<SegmentGrid>,
    viewport: Viewport,
    config: EditorConfig,
    geometry: Box<dyn GeometryLibrary>,
    observers: Vec<Observer>,
    gesture: Gesture,
    current_layer: String,
    next_peg_name: String,
    tin: Option<Tin>,
    contours: Vec<ContourLine>,
    last_check: Option<CheckPoint>,
    cursor: Point,
    last_status: String,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_geometry(config, Box::new(DefaultGeometry::new()))
    }

    /// Editor backed by a caller-supplied geometry library.
    pub fn with_geometry(config: EditorConfig, geometry: Box<dyn GeometryLibrary>) -> Self {
        Self {
            drawing: Drawing::with_survey_layers(),
            history: CommandLog::new(),
            tool: ToolState::Idle,
            snapper: Snapper::new(config.snap.clone()),
            grid: None,
            viewport: Viewport::default(),
            next_peg_name: config.default_peg_name.clone(),
            config,
            geometry,
            observers: Vec::new(),
            gesture: Gesture::None,
            current_layer: DEFAULT_LAYER.to_string(),
            tin: None,
            contours: Vec::new(),
            last_check: None,
            cursor: Point::default(),
            last_status: String::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Notification) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn history(&self) -> &CommandLog {
        &self.history
    }

    pub fn tool(&self) -> &ToolState {
        &self.tool
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Resizes the visible area in pixels.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn snap(&self) -> SnapResult {
        self.snapper.current()
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn last_status(&self) -> &str {
        &self.last_status
    }

    pub fn current_layer(&self) -> &str {
        &self.current_layer
    }

    pub fn next_peg_name(&self) -> &str {
        &self.next_peg_name
    }

    pub fn set_next_peg_name(&mut self, name: &str) {
        self.next_peg_name = name.to_string();
    }

    pub fn tin(&self) -> Option<&Tin> {
        self.tin.as_ref()
    }

    pub fn contours(&self) -> &[ContourLine] {
        &self.contours
    }

    /// Most recent check-point computation.
    pub fn last_check_point(&self) -> Option<&CheckPoint> {
        self.last_check.as_ref()
    }

    /// Message of the last geometry-library failure.
    pub fn last_geometry_error(&self) -> Option<String> {
        self.geometry.last_error()
    }

    /// Pick and snap radius in world units at the current zoom.
    pub fn tolerance(&self) -> f64 {
        self.viewport.world_tolerance(self.config.snap_tolerance_px)
    }

    fn notify(&mut self, notification: Notification) {
        for observer in self.observers.iter_mut() {
            observer(&notification);
        }
    }

    pub(crate) fn status(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::info!("{}", msg);
        self.last_status = msg.clone();
        self.notify(Notification::Status(msg));
    }

    pub(crate) fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::warn!("{}", msg);
        self.last_status = msg.clone();
        self.notify(Notification::Status(msg));
    }

    fn selection_changed(&mut self) {
        let primary = self.drawing.selection().primary();
        self.notify(Notification::SelectionChanged(primary));
    }

    fn history_changed(&mut self) {
        let (can_undo, can_redo) = (self.history.can_undo(), self.history.can_redo());
        self.notify(Notification::UndoRedoChanged { can_undo, can_redo });
    }

    fn invalidate(&mut self) {
        self.grid = None;
    }

    fn ensure_grid(&mut self) {
        if self.grid.is_none() {
            self.grid = Some(SegmentGrid::build(self.drawing.visible_polylines()));
        }
    }

    /// Applies and records `command`, then refreshes dependants.
    fn execute(&mut self, command: UndoCommand) {
        self.history.execute(command, &mut self.drawing);
        self.invalidate();
        self.history_changed();
        self.selection_changed();
    }

    /// Records a mutation the caller already applied.
    fn record(&mut self, command: UndoCommand) {
        self.history.record(command);
        self.invalidate();
        self.history_changed();
    }

    fn guards(&self) -> Guards {
        Guards {
            has_selection: self.drawing.selection().primary().is_some(),
            has_station: self.drawing.setup.has_station(),
        }
    }

    /// Feeds one resolved event to the tool state machine.
    pub(crate) fn dispatch(&mut self, event: ToolEvent) -> bool {
        let Some(t) = transition(&self.tool, &event, &self.guards()) else {
            return false;
        };
        let previous = self.tool.name();
        self.tool = t.next;
        if self.tool.name() != previous {
            log::debug!("tool {} -> {}", previous, self.tool.name());
            let name = self.tool.name();
            self.notify(Notification::ToolChanged(name));
        }
        for effect in t.effects {
            self.run_effect(effect);
        }
        true
    }

    pub fn start_tool(&mut self, kind: ToolKind) {
        self.gesture = Gesture::None;
        self.dispatch(ToolEvent::Activate(kind));
    }

    /// Waits for a side click to offset the selected polyline by `distance`.
    pub fn start_offset_tool(&mut self, distance: f64) {
        self.start_tool(ToolKind::Offset { distance });
    }

    /// Returns to idle without touching the selection.
    pub fn cancel_tool(&mut self) {
        if !self.tool.is_idle() {
            self.dispatch(ToolEvent::Key(crate::tool::Key::Escape));
        }
    }

    pub fn undo(&mut self) {
        match self.history.undo(&mut self.drawing) {
            HistoryOutcome::Empty => return,
            HistoryOutcome::Applied(label) => self.status(format!("Undo: {}", label)),
            HistoryOutcome::Unsupported(_) => self.warn("Layer deletion cannot be undone"),
        }
        self.invalidate();
        self.history_changed();
        self.selection_changed();
    }

    pub fn redo(&mut self) {
        match self.history.redo(&mut self.drawing) {
            HistoryOutcome::Empty => return,
            HistoryOutcome::Applied(label) => self.status(format!("Redo: {}", label)),
            HistoryOutcome::Unsupported(_) => {}
        }
        self.invalidate();
        self.history_changed();
        self.selection_changed();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snapper.set_enabled(enabled);
        self.config.snap.enabled = enabled;
        let current = self.snapper.current();
        self.notify(Notification::SnapChanged(current));
        self.status(if enabled { "Snap enabled" } else { "Snap disabled" });
    }

    /// Live bearing and distance from the station to the cursor while staking out.
    pub fn stakeout_readout(&self) -> Option<StakeoutInfo> {
        if self.tool != ToolState::Stakeout {
            return None;
        }
        StakeoutInfo::compute(&self.drawing.setup, "Cursor", self.cursor, &self.config.display)
    }

    pub fn zoom_extents(&mut self) {
        let Some(bounds) = self.drawing.visible_bounds() else {
            return;
        };
        self.viewport.fit(&bounds, self.config.zoom_min, self.config.zoom_max);
        let zoom = self.viewport.zoom;
        self.notify(Notification::ZoomChanged(zoom));
    }

    /// Drops every entity, the history and derived surfaces.
    pub fn clear_all(&mut self) {
        self.drawing = Drawing::with_survey_layers();
        self.reset_session();
        self.status("Drawing cleared");
    }

    fn reset_session(&mut self) {
        self.history.clear();
        self.tool = ToolState::Idle;
        self.gesture = Gesture::None;
        self.snapper.clear();
        self.tin = None;
        self.contours.clear();
        self.last_check = None;
        self.invalidate();
        if self.drawing.layers.layer(&self.current_layer).is_none() {
            self.current_layer = self
                .drawing
                .layers
                .names()
                .next()
                .unwrap_or(DEFAULT_LAYER)
                .to_string();
        }
        self.notify(Notification::LayersChanged);
        self.selection_changed();
        self.history_changed();
    }

    pub fn save_project(&mut self, path: &str) -> std::io::Result<()> {
        let project = ProjectFile::from_drawing(&self.drawing);
        match write_project_json(path, &project) {
            Ok(()) => {
                self.status(format!("Project saved to {}", path));
                Ok(())
            }
            Err(e) => {
                self.warn(format!("Failed to save project: {}", e));
                Err(e)
            }
        }
    }

    /// Replaces the drawing with the project at `path`.
    pub fn load_project(&mut self, path: &str) -> std::io::Result<()> {
        let project = match read_project_json(path) {
            Ok(p) => p,
            Err(e) => {
                self.warn(format!("Failed to load project: {}", e));
                return Err(e);
            }
        };
        self.drawing = project.to_drawing();
        if self.drawing.layers.is_empty() {
            self.drawing.layers = LayerManager::with_survey_defaults();
        }
        self.reset_session();
        self.status(format!(
            "Loaded {} polylines and {} pegs from {}",
            self.drawing.polylines().len(),
            self.drawing.pegs().len(),
            path
        ));
        Ok(())
    }
}
