//! Scene files: items, configuration and a timed input script.

use anyhow::{Context, Result, anyhow, bail};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use snapcanvas_core::{
    AlignEdge, CanvasConfig, CanvasEvent, DistributeAxis, EngineConfig, HitPath, Instant, ItemId, Modifiers,
    PositionableItem, PositioningCanvas, ResizeHandle, Viewport,
};
use std::path::Path;
use std::time::Duration;

/// A scene as stored on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub items: Vec<PositionableItem>,
    #[serde(default)]
    pub script: Vec<Step>,
}

/// One scripted input, `at_ms` after the start of the replay.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

/// Refers to an item by its position in the scene's item list or by id.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Index(usize),
    Id(ItemId),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    PointerDown {
        item: ItemRef,
        x: f64,
        y: f64,
        /// Hit chain under the pointer; defaults to the item's own wrapper.
        #[serde(default)]
        path: Option<HitPath>,
        #[serde(default)]
        modifiers: Modifiers,
    },
    ResizeStart {
        item: ItemRef,
        handle: ResizeHandle,
        x: f64,
        y: f64,
    },
    RotateStart {
        item: ItemRef,
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp,
    Tick,
    Click {
        #[serde(default)]
        path: HitPath,
    },
    Cancel,
    Select {
        item: ItemRef,
        #[serde(default)]
        multi: bool,
    },
    SelectAll,
    DeselectAll,
    Align {
        edge: AlignEdge,
    },
    Distribute {
        axis: DistributeAxis,
    },
    Nudge {
        #[serde(default)]
        dx: i32,
        #[serde(default)]
        dy: i32,
        #[serde(default)]
        large: bool,
    },
    BringToFront {
        item: ItemRef,
    },
    SendToBack {
        item: ItemRef,
    },
    BringForward {
        item: ItemRef,
    },
    SendBackward {
        item: ItemRef,
    },
    Duplicate {
        item: ItemRef,
    },
    DuplicateSelected,
    Remove {
        item: ItemRef,
    },
    DeleteSelected,
    Undo,
    Redo,
}

/// What one step did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub at_ms: u64,
    pub outcome: String,
}

/// Result of replaying a scene.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub items: Vec<PositionableItem>,
    pub selection: Vec<ItemId>,
    pub events: Vec<CanvasEvent>,
    pub steps: Vec<StepRecord>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to parse scene {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the canvas this scene describes.
    pub fn build(&self) -> Result<PositioningCanvas> {
        let mut canvas = PositioningCanvas::with_items(self.canvas.clone(), self.engine.clone(), self.items.clone())
            .context("Invalid scene")?;
        if let Some(viewport) = self.viewport {
            canvas.set_viewport(viewport);
        }
        Ok(canvas)
    }

    /// Run the script against a fresh canvas.
    pub fn replay(&self) -> Result<Report> {
        let mut canvas = self.build()?;
        let ids: Vec<ItemId> = canvas.items().iter().map(|item| item.id).collect();
        let start = Instant::now();
        let mut events = canvas.poll_events();
        let mut steps = Vec::with_capacity(self.script.len());

        for (index, step) in self.script.iter().enumerate() {
            let now = start + Duration::from_millis(step.at_ms);
            let outcome = apply(&mut canvas, &ids, &step.action, now)
                .with_context(|| format!("Step {} ({:?}) failed", index, step.action))?;
            log::debug!("step {} at {}ms: {}", index, step.at_ms, outcome);
            events.extend(canvas.poll_events());
            steps.push(StepRecord {
                at_ms: step.at_ms,
                outcome,
            });
        }

        Ok(Report {
            items: canvas.items().to_vec(),
            selection: canvas.selected_ids().to_vec(),
            events,
            steps,
        })
    }
}

fn resolve(ids: &[ItemId], item: ItemRef) -> Result<ItemId> {
    match item {
        ItemRef::Id(id) => Ok(id),
        ItemRef::Index(index) => ids
            .get(index)
            .copied()
            .ok_or_else(|| anyhow!("Item index {} out of range ({} items)", index, ids.len())),
    }
}

fn apply(canvas: &mut PositioningCanvas, ids: &[ItemId], action: &Action, now: Instant) -> Result<String> {
    let outcome = match action {
        Action::PointerDown {
            item,
            x,
            y,
            path,
            modifiers,
        } => {
            let id = resolve(ids, *item)?;
            let path = path.clone().unwrap_or_else(|| HitPath::item(id));
            format!("{:?}", canvas.pointer_down(id, Point::new(*x, *y), &path, *modifiers, now))
        }
        Action::ResizeStart { item, handle, x, y } => {
            let id = resolve(ids, *item)?;
            format!("{:?}", canvas.resize_start(id, *handle, Point::new(*x, *y)))
        }
        Action::RotateStart { item, x, y } => {
            let id = resolve(ids, *item)?;
            format!("{:?}", canvas.rotate_start(id, Point::new(*x, *y)))
        }
        Action::PointerMove { x, y, modifiers } => {
            let moved = canvas.pointer_move(Point::new(*x, *y), *modifiers, now);
            format!("moved={} guides={}", moved, canvas.active_guides().len())
        }
        Action::PointerUp => format!("{:?}", canvas.pointer_up(now)),
        Action::Tick => format!("started={}", canvas.tick(now)),
        Action::Click { path } => format!("{:?}", canvas.click(path, now)),
        Action::Cancel => format!("cancelled={}", canvas.cancel_gesture()),
        Action::Select { item, multi } => {
            canvas.select(resolve(ids, *item)?, *multi)?;
            "selected".to_string()
        }
        Action::SelectAll => {
            canvas.select_all();
            "selected".to_string()
        }
        Action::DeselectAll => {
            canvas.deselect_all();
            "deselected".to_string()
        }
        Action::Align { edge } => format!("changed={}", canvas.align(*edge)),
        Action::Distribute { axis } => format!("changed={}", canvas.distribute(*axis)),
        Action::Nudge { dx, dy, large } => format!("changed={}", canvas.nudge_selection(*dx, *dy, *large)),
        Action::BringToFront { item } => format!("changed={}", canvas.bring_to_front(resolve(ids, *item)?)?),
        Action::SendToBack { item } => format!("changed={}", canvas.send_to_back(resolve(ids, *item)?)?),
        Action::BringForward { item } => format!("changed={}", canvas.bring_forward(resolve(ids, *item)?)?),
        Action::SendBackward { item } => format!("changed={}", canvas.send_backward(resolve(ids, *item)?)?),
        Action::Duplicate { item } => format!("created={}", canvas.duplicate_item(resolve(ids, *item)?)?),
        Action::DuplicateSelected => format!("created={}", canvas.duplicate_selected().len()),
        Action::Remove { item } => {
            let removed = canvas.remove_item(resolve(ids, *item)?)?;
            format!("removed={}", removed.id)
        }
        Action::DeleteSelected => format!("removed={}", canvas.delete_selected()),
        Action::Undo => format!("changed={}", canvas.undo()),
        Action::Redo => format!("changed={}", canvas.redo()),
    };
    Ok(outcome)
}

/// Load, validate and normalize a scene without running its script.
pub fn check(path: &Path) -> Result<Vec<PositionableItem>> {
    let scene = Scene::load(path)?;
    if scene.items.is_empty() {
        bail!("Scene {} has no items", path.display());
    }
    let canvas = scene.build()?;
    Ok(canvas.items().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_BOXES: &str = r#"{
        "canvas": { "width": 800, "height": 600 },
        "items": [
            { "id": "6f1c7f0e-3c61-4b8e-9d5e-0a4c1f3e2b10", "type": "shape",
              "position": { "x": 100, "y": 100, "width": 50, "height": 50 } },
            { "id": "2d9a4b3c-8e7f-4a61-b2c3-d4e5f6a7b8c9", "type": "shape",
              "position": { "x": 160, "y": 100, "width": 50, "height": 50 } }
        ],
        "script": [
            { "atMs": 0, "action": "pointerDown", "item": 0, "x": 120, "y": 120 },
            { "atMs": 16, "action": "pointerMove", "x": 120, "y": 140 },
            { "atMs": 32, "action": "pointerMove", "x": 120, "y": 122 },
            { "atMs": 48, "action": "pointerUp" },
            { "atMs": 100, "action": "click", "path": [ { "role": "item", "id": "6f1c7f0e-3c61-4b8e-9d5e-0a4c1f3e2b10" } ] }
        ]
    }"#;

    fn write_scene(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_replay_drag_with_snap() {
        let file = write_scene(TWO_BOXES);
        let report = Scene::load(file.path()).unwrap().replay().unwrap();

        let y = report.items[0].position.y;
        assert!((y - (102.0 - 2.0 / 6.0)).abs() < 1e-9);
        assert_eq!(report.steps.len(), 5);
        assert_eq!(report.steps[2].outcome, "moved=true guides=1");
        assert_eq!(report.steps[4].outcome, "Suppressed");
        let changes = report
            .events
            .iter()
            .filter(|e| matches!(e, CanvasEvent::ItemsChanged(_)))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_replay_layout_actions() {
        let scene = Scene::from_json(
            r#"{
                "canvas": { "width": 800, "height": 600 },
                "items": [
                    { "id": "00000000-0000-4000-8000-000000000001", "type": "text",
                      "position": { "x": 0, "y": 0, "width": 20, "height": 20 } },
                    { "id": "00000000-0000-4000-8000-000000000002", "type": "text",
                      "position": { "x": 50, "y": 10, "width": 20, "height": 20 } },
                    { "id": "00000000-0000-4000-8000-000000000003", "type": "image",
                      "position": { "x": 200, "y": 20, "width": 20, "height": 20 } }
                ],
                "script": [
                    { "action": "selectAll" },
                    { "action": "distribute", "axis": "horizontal" },
                    { "action": "align", "edge": "top" },
                    { "action": "undo" }
                ]
            }"#,
        )
        .unwrap();
        let report = scene.replay().unwrap();
        assert_eq!(report.items[1].position.x, 100.0);
        assert_eq!(report.items[1].position.y, 10.0);
        assert_eq!(report.selection.len(), 3);
    }

    #[test]
    fn test_bad_item_index_fails() {
        let scene = Scene::from_json(
            r#"{ "items": [], "script": [ { "action": "remove", "item": 3 } ] }"#,
        )
        .unwrap();
        let err = scene.replay().unwrap_err();
        assert!(format!("{:#}", err).contains("out of range"));
    }

    #[test]
    fn test_check_normalizes_items() {
        let file = write_scene(
            r#"{
                "canvas": { "width": 400, "height": 300 },
                "items": [
                    { "id": "00000000-0000-4000-8000-00000000000a", "type": "shape",
                      "position": { "x": 0, "y": 0, "width": -4, "height": 5 } }
                ]
            }"#,
        );
        let items = check(file.path()).unwrap();
        assert_eq!(items[0].position.width, 50.0);
        assert_eq!(items[0].position.height, 30.0);
    }

    #[test]
    fn test_check_rejects_invalid_canvas() {
        let file = write_scene(
            r#"{
                "canvas": { "width": -1, "height": 300 },
                "items": [
                    { "id": "00000000-0000-4000-8000-00000000000b", "type": "shape",
                      "position": { "x": 0, "y": 0, "width": 60, "height": 60 } }
                ]
            }"#,
        );
        assert!(check(file.path()).is_err());
    }
}
