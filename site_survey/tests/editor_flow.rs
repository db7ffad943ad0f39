use assert_fs::prelude::*;
use site_survey::config::EditorConfig;
use site_survey::geometry::Point;
use site_survey::tool::{InputEvent, Modifiers, MouseButton, ToolKind};
use site_survey::{Editor, Notification};

fn click(ed: &mut Editor, x: f64, y: f64) {
    let pos = ed.viewport().world_to_screen(Point::new(x, y));
    ed.handle_event(InputEvent::PointerDown {
        pos,
        button: MouseButton::Left,
        modifiers: Modifiers::NONE,
    });
    ed.handle_event(InputEvent::PointerUp {
        pos,
        button: MouseButton::Left,
    });
}

#[test]
fn parcel_offset_and_partition_workflow() {
    let mut ed = Editor::default();
    ed.start_tool(ToolKind::Rectangle);
    click(&mut ed, 0.0, 0.0);
    click(&mut ed, 100.0, 60.0);
    assert_eq!(ed.drawing().polylines().len(), 1);
    assert!(ed.drawing().polylines()[0].closed);

    ed.start_offset_tool(5.0);
    click(&mut ed, 50.0, 30.0);
    assert_eq!(ed.drawing().pegs().len(), 4);
    let offset = &ed.drawing().polylines()[1];
    assert!(offset.points.iter().any(|p| p.distance_to(Point::new(5.0, 5.0)) < 1e-9));

    ed.set_current_layer("Partition");
    ed.add_polyline(vec![Point::new(50.0, 20.0), Point::new(50.0, 30.0)], false);
    ed.project_partition("X");
    let projected = &ed.drawing().pegs()[4..];
    assert_eq!(projected.len(), 2);
    assert_eq!(projected[0].name, "X1");
    assert!(projected[0].position.distance_to(Point::new(50.0, 5.0)) < 1e-9);
    assert_eq!(projected[1].name, "X2");
    assert!(projected[1].position.distance_to(Point::new(50.0, 55.0)) < 1e-9);
    assert!(ed.drawing().layers.layer("Partition_projection").is_some());

    ed.undo();
    assert_eq!(ed.drawing().pegs().len(), 4);
    ed.undo();
    ed.undo();
    assert_eq!(ed.drawing().polylines().len(), 1);
    assert!(ed.drawing().pegs().is_empty());
}

#[test]
fn settings_file_drives_the_editor() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("settings.json");
    file.write_str(r#"{"snap_tolerance_px": 4, "default_peg_name": "BM01", "display": {"decimals": 2}}"#)
        .unwrap();
    let config = EditorConfig::load(file.path().to_str().unwrap()).unwrap();
    let mut ed = Editor::new(config);
    assert_eq!(ed.tolerance(), 4.0);

    ed.start_tool(ToolKind::AddPeg { elevation: None });
    click(&mut ed, 10.0, 10.0);
    click(&mut ed, 20.0, 10.0);
    assert_eq!(ed.drawing().pegs()[1].name, "BM02");
    assert_eq!(ed.next_peg_name(), "BM03");

    ed.start_tool(ToolKind::Measure);
    click(&mut ed, 0.0, 0.0);
    click(&mut ed, 0.0, 3.0);
    assert!(ed.last_status().starts_with("Distance: 3.00 m"));
}

#[test]
fn observers_see_status_and_history() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut ed = Editor::default();
    ed.subscribe(move |n| sink.borrow_mut().push(n.clone()));

    ed.add_polyline(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)], false);
    let seen = seen.borrow();
    assert!(seen.contains(&Notification::UndoRedoChanged {
        can_undo: true,
        can_redo: false
    }));
    assert!(seen.contains(&Notification::SelectionChanged(Some(0))));
}

#[test]
fn pegs_import_as_one_undo_step() {
    let file = assert_fs::NamedTempFile::new("pegs.csv").unwrap();
    file.write_str("0,0,100\n10,0,101\n10,10\n").unwrap();
    let mut ed = Editor::default();
    let n = ed.import_pegs_csv(file.path().to_str().unwrap()).unwrap();
    assert_eq!(n, 3);
    assert_eq!(ed.drawing().elevated_pegs().len(), 2);
    assert_eq!(ed.history().undo_len(), 1);
    ed.undo();
    assert!(ed.drawing().pegs().is_empty());
}
