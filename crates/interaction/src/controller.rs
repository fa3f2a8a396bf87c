//! Pointer state machine for creating, selecting, moving, and resizing annotations.
//!
//! All geometry is in the live display space of the editor canvas. While a
//! gesture is active only the controller's private copy of the shape changes;
//! the slide is touched once, on pointer-up (or pointer-leave).

use snapmark_slide_model::annotation::{Annotation, AnnotationColor, AnnotationId, ShapeKind};
use snapmark_slide_model::geometry::{
    hit_test, is_degenerate, resize_corner, resize_handle_at, translate, CornerHandle, Point,
};
use snapmark_slide_model::slide::Slide;

use crate::tool::{Tool, ToolSettings};

/// Public projection of the active gesture, for cursors and handle rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Drawing,
    Resizing,
    Dragging,
}

/// Snapshot of the controller for the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub tool: Tool,
    pub selected: Option<AnnotationId>,
    pub mode: Mode,
    /// Handle being dragged, while resizing.
    pub handle: Option<CornerHandle>,
}

/// Result of an operation that may change the slide.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Nothing to write (no gesture, no movement, unknown id).
    Unchanged,
    /// A drawn shape was below the minimum size and was dropped.
    Discarded,
    /// The new slide snapshot to persist.
    Committed(Slide),
}

impl CommitOutcome {
    pub fn committed(&self) -> Option<&Slide> {
        match self {
            CommitOutcome::Committed(slide) => Some(slide),
            _ => None,
        }
    }
}

/// In-progress, uncommitted geometry.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Drawing {
        start: Point,
        current: Point,
        shape: ShapeKind,
        color: AnnotationColor,
    },
    Resizing {
        original: Annotation,
        handle: CornerHandle,
        current: Annotation,
    },
    Dragging {
        original: Annotation,
        origin: Point,
        current: Annotation,
    },
}

impl Gesture {
    fn mode(&self) -> Mode {
        match self {
            Gesture::Idle => Mode::Idle,
            Gesture::Drawing { .. } => Mode::Drawing,
            Gesture::Resizing { .. } => Mode::Resizing,
            Gesture::Dragging { .. } => Mode::Dragging,
        }
    }
}

/// Single-active-mode pointer controller over one slide.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    settings: ToolSettings,
    selected: Option<AnnotationId>,
    gesture: Gesture,
}

impl InteractionController {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            settings,
            selected: None,
            gesture: Gesture::Idle,
        }
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            tool: self.settings.tool,
            selected: self.selected,
            mode: self.gesture.mode(),
            handle: match &self.gesture {
                Gesture::Resizing { handle, .. } => Some(*handle),
                _ => None,
            },
        }
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.gesture.mode()
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    /// Switch tools. Any gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: Tool) {
        self.cancel();
        self.settings.tool = tool;
    }

    pub fn set_shape(&mut self, shape: ShapeKind) {
        self.settings.shape = shape;
    }

    pub fn set_color(&mut self, color: AnnotationColor) {
        self.settings.color = color;
    }

    /// Select an annotation by id (e.g. from the sidebar list).
    pub fn select(&mut self, slide: &Slide, id: AnnotationId) -> bool {
        if slide.annotation(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Drop the in-progress gesture without writing anything.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// The selected annotation, if it still exists and is visible now.
    fn selected_visible<'a>(&self, slide: &'a Slide) -> Option<&'a Annotation> {
        let id = self.selected?;
        let now = slide.playback_time();
        slide.annotation(id).filter(|a| a.is_visible_at(now))
    }

    /// Begin a gesture.
    ///
    /// Precedence: resize handles of the selected annotation, then (select
    /// tool) drag of the selected annotation, then drag of any other visible
    /// annotation, then deselect; with the draw tool, start a new shape.
    pub fn pointer_down(&mut self, slide: &Slide, point: Point) {
        if !matches!(self.gesture, Gesture::Idle) {
            tracing::trace!(mode = ?self.gesture.mode(), "pointer_down ignored during gesture");
            return;
        }

        if let Some(selected) = self.selected_visible(slide) {
            if let Some(handle) = resize_handle_at(point, selected) {
                tracing::debug!(id = selected.id, ?handle, "Begin resize");
                self.gesture = Gesture::Resizing {
                    original: selected.clone(),
                    handle,
                    current: selected.clone(),
                };
                return;
            }
        }

        if self.settings.tool == Tool::Select {
            if let Some(selected) = self.selected_visible(slide) {
                if hit_test(point, selected) {
                    self.begin_drag(selected, point);
                    return;
                }
            }

            // Later annotations are drawn on top, so they win the hit test.
            let hit = slide
                .visible_annotations()
                .filter(|a| hit_test(point, a))
                .last();
            match hit {
                Some(annotation) => {
                    self.selected = Some(annotation.id);
                    self.begin_drag(annotation, point);
                }
                None => {
                    if self.selected.take().is_some() {
                        tracing::debug!("Selection cleared");
                    }
                }
            }
            return;
        }

        self.gesture = Gesture::Drawing {
            start: point,
            current: point,
            shape: self.settings.shape,
            color: self.settings.color.clone(),
        };
    }

    fn begin_drag(&mut self, annotation: &Annotation, point: Point) {
        tracing::debug!(id = annotation.id, "Begin drag");
        self.gesture = Gesture::Dragging {
            original: annotation.clone(),
            origin: point,
            current: annotation.clone(),
        };
    }

    /// Update in-progress geometry. Ignored while idle.
    pub fn pointer_move(&mut self, point: Point) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { current, .. } => *current = point,
            Gesture::Resizing {
                original,
                handle,
                current,
            } => *current = resize_corner(original, *handle, point),
            Gesture::Dragging {
                original,
                origin,
                current,
            } => *current = translate(original, point.x - origin.x, point.y - origin.y),
        }
    }

    /// Finish the active gesture at `point`.
    pub fn pointer_up(&mut self, slide: &Slide, point: Point) -> CommitOutcome {
        self.pointer_move(point);
        let gesture = std::mem::take(&mut self.gesture);

        match gesture {
            Gesture::Idle => CommitOutcome::Unchanged,
            Gesture::Drawing {
                start,
                current,
                shape,
                color,
            } => {
                if is_degenerate(start, current) {
                    tracing::debug!(?start, end = ?current, "Discarding degenerate shape");
                    return CommitOutcome::Discarded;
                }
                let mut annotation =
                    Annotation::new(slide.next_annotation_id(), shape, start, current, color);
                annotation.video_timestamp = slide.playback_time();

                let id = annotation.id;
                let mut annotations = slide.annotations.clone();
                annotations.push(annotation);
                self.selected = Some(id);
                tracing::debug!(id, %shape, "Annotation created");
                CommitOutcome::Committed(slide.with_annotations(annotations))
            }
            Gesture::Resizing {
                original, current, ..
            }
            | Gesture::Dragging {
                original, current, ..
            } => {
                if current == original {
                    return CommitOutcome::Unchanged;
                }
                replace_annotation(slide, current)
            }
        }
    }

    /// Leaving the canvas finalizes the gesture exactly like releasing the pointer.
    pub fn pointer_leave(&mut self, slide: &Slide, point: Point) -> CommitOutcome {
        self.pointer_up(slide, point)
    }

    /// Annotations as the canvas should show them right now: committed
    /// geometry with the in-progress shape substituted or appended, filtered
    /// to the slide's playback time.
    pub fn live_annotations(&self, slide: &Slide) -> Vec<Annotation> {
        let now = slide.playback_time();
        let mut live: Vec<Annotation> = slide
            .annotations
            .iter()
            .map(|a| match &self.gesture {
                Gesture::Resizing { current, .. } | Gesture::Dragging { current, .. }
                    if current.id == a.id =>
                {
                    current.clone()
                }
                _ => a.clone(),
            })
            .collect();

        if let Gesture::Drawing {
            start,
            current,
            shape,
            color,
        } = &self.gesture
        {
            let mut preview = Annotation::new(
                slide.next_annotation_id(),
                *shape,
                *start,
                *current,
                color.clone(),
            );
            preview.video_timestamp = now;
            live.push(preview);
        }

        live.retain(|a| a.is_visible_at(now));
        live
    }

    /// Replace the comment of one annotation.
    pub fn set_comment(
        &mut self,
        slide: &Slide,
        id: AnnotationId,
        comment: impl Into<String>,
    ) -> CommitOutcome {
        let Some(existing) = slide.annotation(id) else {
            return CommitOutcome::Unchanged;
        };
        let comment = comment.into();
        if existing.comment == comment {
            return CommitOutcome::Unchanged;
        }
        replace_annotation(slide, existing.clone().with_comment(comment))
    }

    /// Remove one annotation.
    pub fn delete(&mut self, slide: &Slide, id: AnnotationId) -> CommitOutcome {
        if slide.annotation(id).is_none() {
            return CommitOutcome::Unchanged;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.cancel();
        let annotations = slide
            .annotations
            .iter()
            .filter(|a| a.id != id)
            .cloned()
            .collect();
        tracing::debug!(id, "Annotation deleted");
        CommitOutcome::Committed(slide.with_annotations(annotations))
    }

    pub fn delete_selected(&mut self, slide: &Slide) -> CommitOutcome {
        match self.selected {
            Some(id) => self.delete(slide, id),
            None => CommitOutcome::Unchanged,
        }
    }

    /// Remove the most recently created annotation.
    pub fn undo_last(&mut self, slide: &Slide) -> CommitOutcome {
        match slide.annotations.last() {
            Some(last) => self.delete(slide, last.id),
            None => CommitOutcome::Unchanged,
        }
    }

    /// Remove every annotation on the slide.
    pub fn discard_all(&mut self, slide: &Slide) -> CommitOutcome {
        self.cancel();
        self.selected = None;
        if slide.annotations.is_empty() {
            return CommitOutcome::Unchanged;
        }
        tracing::debug!(count = slide.annotations.len(), "All annotations discarded");
        CommitOutcome::Committed(slide.with_annotations(Vec::new()))
    }
}

fn replace_annotation(slide: &Slide, updated: Annotation) -> CommitOutcome {
    if slide.annotation(updated.id).is_none() {
        return CommitOutcome::Unchanged;
    }
    let annotations = slide
        .annotations
        .iter()
        .map(|a| {
            if a.id == updated.id {
                updated.clone()
            } else {
                a.clone()
            }
        })
        .collect();
    CommitOutcome::Committed(slide.with_annotations(annotations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use snapmark_slide_model::slide::MediaRef;

    fn image_slide() -> Slide {
        Slide::new("shot", MediaRef::image("media/shot.png", 1280, 720))
    }

    fn draw(
        controller: &mut InteractionController,
        slide: &Slide,
        from: (f64, f64),
        to: (f64, f64),
    ) -> CommitOutcome {
        controller.pointer_down(slide, Point::new(from.0, from.1));
        controller.pointer_move(Point::new((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0));
        controller.pointer_up(slide, Point::new(to.0, to.1))
    }

    fn committed(outcome: CommitOutcome) -> Slide {
        match outcome {
            CommitOutcome::Committed(slide) => slide,
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn test_small_drag_is_discarded() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let outcome = draw(&mut c, &slide, (50.0, 50.0), (52.0, 52.0));
        assert_eq!(outcome, CommitOutcome::Discarded);
        assert_eq!(c.selected(), None);
        assert_eq!(c.mode(), Mode::Idle);
    }

    #[test]
    fn test_discard_keeps_existing_selection() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (300.0, 250.0)));
        let selected = c.selected();
        assert!(selected.is_some());

        // Far away from the selection's handles.
        assert_eq!(
            draw(&mut c, &slide, (500.0, 500.0), (501.0, 503.0)),
            CommitOutcome::Discarded
        );
        assert_eq!(c.selected(), selected);
    }

    #[test]
    fn test_draw_creates_selected_rectangle() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (300.0, 250.0)));

        assert_eq!(slide.annotations.len(), 1);
        let a = &slide.annotations[0];
        assert_eq!(a.shape, ShapeKind::Rectangle);
        assert_eq!(a.start, Point::new(100.0, 100.0));
        assert_eq!(a.end, Point::new(300.0, 250.0));
        assert_eq!(a.comment, "");
        assert_eq!(a.video_timestamp, None);
        assert_eq!(c.selected(), Some(a.id));
    }

    #[test]
    fn test_draw_on_video_binds_timestamp() {
        let slide = Slide::new("clip", MediaRef::video("media/f.png", 1280, 720, 30.0, 5.0));
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (10.0, 10.0), (90.0, 60.0)));
        assert_eq!(slide.annotations[0].video_timestamp, Some(5.0));
    }

    #[test]
    fn test_resize_bottom_right_handle() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (300.0, 250.0)));

        c.pointer_down(&slide, Point::new(306.0, 246.0));
        assert_eq!(c.mode(), Mode::Resizing);
        assert_eq!(c.state().handle, Some(CornerHandle::BottomRight));
        c.pointer_move(Point::new(350.0, 320.0));
        let slide = committed(c.pointer_up(&slide, Point::new(400.0, 380.0)));

        let a = &slide.annotations[0];
        assert_eq!(a.end, Point::new(400.0, 380.0));
        assert_eq!(a.start, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_select_tool_drag_moves_selected() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (300.0, 250.0)));
        c.set_tool(Tool::Select);

        c.pointer_down(&slide, Point::new(200.0, 200.0));
        assert_eq!(c.mode(), Mode::Dragging);
        let slide = committed(c.pointer_up(&slide, Point::new(230.0, 190.0)));

        let a = &slide.annotations[0];
        assert_eq!(a.start, Point::new(130.0, 90.0));
        assert_eq!(a.end, Point::new(330.0, 240.0));
    }

    #[test]
    fn test_select_tool_picks_topmost_other_annotation() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (0.0, 0.0), (400.0, 400.0)));
        let slide = committed(draw(&mut c, &slide, (600.0, 100.0), (700.0, 200.0)));
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (200.0, 200.0)));
        let ids: Vec<_> = slide.annotations.iter().map(|a| a.id).collect();

        c.set_tool(Tool::Select);
        c.clear_selection();
        c.pointer_down(&slide, Point::new(150.0, 150.0));
        assert_eq!(c.selected(), Some(ids[2]));
        assert_eq!(c.mode(), Mode::Dragging);
        assert_eq!(c.pointer_up(&slide, Point::new(150.0, 150.0)), CommitOutcome::Unchanged);

        // Another annotation becomes selected when clicked.
        c.pointer_down(&slide, Point::new(650.0, 150.0));
        assert_eq!(c.selected(), Some(ids[1]));
        c.pointer_up(&slide, Point::new(650.0, 150.0));
    }

    #[test]
    fn test_select_tool_empty_click_clears_selection() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (300.0, 250.0)));
        c.set_tool(Tool::Select);

        c.pointer_down(&slide, Point::new(900.0, 600.0));
        assert_eq!(c.selected(), None);
        assert_eq!(c.mode(), Mode::Idle);
        assert_eq!(c.pointer_up(&slide, Point::new(900.0, 600.0)), CommitOutcome::Unchanged);
    }

    #[test]
    fn test_handles_take_precedence_over_drawing() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (300.0, 250.0)));

        // Draw tool, but pointer is on the selected annotation's TL handle.
        c.pointer_down(&slide, Point::new(98.0, 102.0));
        assert_eq!(c.mode(), Mode::Resizing);
    }

    #[test]
    fn test_pointer_leave_finalizes_gesture() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        c.pointer_down(&slide, Point::new(10.0, 10.0));
        c.pointer_move(Point::new(80.0, 80.0));
        let slide = committed(c.pointer_leave(&slide, Point::new(120.0, 90.0)));
        assert_eq!(slide.annotations[0].end, Point::new(120.0, 90.0));
        assert_eq!(c.mode(), Mode::Idle);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        c.pointer_move(Point::new(5.0, 5.0));
        assert_eq!(c.pointer_up(&slide, Point::new(5.0, 5.0)), CommitOutcome::Unchanged);
        assert_eq!(c.pointer_leave(&slide, Point::new(5.0, 5.0)), CommitOutcome::Unchanged);
    }

    #[test]
    fn test_live_annotations_show_uncommitted_geometry() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (300.0, 250.0)));
        c.set_tool(Tool::Select);

        c.pointer_down(&slide, Point::new(200.0, 200.0));
        c.pointer_move(Point::new(210.0, 200.0));
        let live = c.live_annotations(&slide);
        assert_eq!(live[0].start, Point::new(110.0, 100.0));
        // Slide itself is untouched mid-gesture.
        assert_eq!(slide.annotations[0].start, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_live_annotations_filter_video_time() {
        let slide = Slide::new("clip", MediaRef::video("f.png", 1280, 720, 30.0, 5.0));
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (10.0, 10.0), (90.0, 60.0)));

        for t in [4.5, 5.0, 5.5] {
            assert_eq!(c.live_annotations(&slide.at_playback_time(t)).len(), 1);
        }
        for t in [4.0, 6.0] {
            assert!(c.live_annotations(&slide.at_playback_time(t)).is_empty());
        }
    }

    #[test]
    fn test_hidden_video_annotation_cannot_be_grabbed() {
        let slide = Slide::new("clip", MediaRef::video("f.png", 1280, 720, 30.0, 5.0));
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (10.0, 10.0), (90.0, 60.0)));
        let later = slide.at_playback_time(9.0);

        c.set_tool(Tool::Select);
        c.pointer_down(&later, Point::new(50.0, 30.0));
        assert_eq!(c.mode(), Mode::Idle);
    }

    #[test]
    fn test_comment_delete_undo_discard() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (0.0, 0.0), (50.0, 50.0)));
        let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (150.0, 150.0)));
        let first = slide.annotations[0].id;

        let slide = committed(c.set_comment(&slide, first, "Button misaligned"));
        assert_eq!(slide.annotations[0].comment, "Button misaligned");
        assert_eq!(
            c.set_comment(&slide, first, "Button misaligned"),
            CommitOutcome::Unchanged
        );
        assert_eq!(c.set_comment(&slide, 99, "x"), CommitOutcome::Unchanged);

        let undone = committed(c.undo_last(&slide));
        assert_eq!(undone.annotations.len(), 1);
        assert_eq!(c.selected(), None);

        c.select(&undone, first);
        let deleted = committed(c.delete_selected(&undone));
        assert!(deleted.annotations.is_empty());
        assert_eq!(c.undo_last(&deleted), CommitOutcome::Unchanged);

        let cleared = committed(c.discard_all(&slide));
        assert!(cleared.annotations.is_empty());
        assert_eq!(c.discard_all(&cleared), CommitOutcome::Unchanged);
    }

    #[test]
    fn test_new_ids_are_creation_ordered() {
        let slide = image_slide();
        let mut c = InteractionController::default();
        let slide = committed(draw(&mut c, &slide, (0.0, 0.0), (50.0, 50.0)));
        let slide = committed(draw(&mut c, &slide, (200.0, 200.0), (250.0, 250.0)));
        assert!(slide.annotations[0].id < slide.annotations[1].id);
    }

    fn coord() -> impl Strategy<Value = f64> {
        (-100i32..1400).prop_map(f64::from)
    }

    proptest! {
        #[test]
        fn prop_draw_commits_unless_degenerate(
            sx in coord(), sy in coord(), ex in coord(), ey in coord(),
        ) {
            let slide = image_slide();
            let mut c = InteractionController::default();
            let start = Point::new(sx, sy);
            let end = Point::new(ex, ey);
            let outcome = draw(&mut c, &slide, (sx, sy), (ex, ey));

            if is_degenerate(start, end) {
                prop_assert_eq!(outcome, CommitOutcome::Discarded);
                prop_assert_eq!(c.selected(), None);
            } else {
                let slide = committed(outcome);
                prop_assert_eq!(slide.annotations.len(), 1);
                prop_assert_eq!(slide.annotations[0].start, start);
                prop_assert_eq!(slide.annotations[0].end, end);
                prop_assert_eq!(c.selected(), Some(slide.annotations[0].id));
            }
            prop_assert_eq!(c.mode(), Mode::Idle);
        }

        #[test]
        fn prop_select_drag_keeps_size(
            gx in 130i32..270, gy in 130i32..220,
            dx in -200i32..200, dy in -200i32..200,
        ) {
            let slide = image_slide();
            let mut c = InteractionController::default();
            let slide = committed(draw(&mut c, &slide, (100.0, 100.0), (300.0, 250.0)));
            c.set_tool(Tool::Select);

            let grab = Point::new(f64::from(gx), f64::from(gy));
            c.pointer_down(&slide, grab);
            prop_assert_eq!(c.mode(), Mode::Dragging);
            let release = Point::new(grab.x + f64::from(dx), grab.y + f64::from(dy));
            let outcome = c.pointer_up(&slide, release);

            if dx == 0 && dy == 0 {
                prop_assert_eq!(outcome, CommitOutcome::Unchanged);
            } else {
                let moved = committed(outcome);
                let a = &moved.annotations[0];
                let expected = Point::new(100.0 + f64::from(dx), 100.0 + f64::from(dy));
                prop_assert_eq!(a.start, expected);
                prop_assert_eq!(a.end.x - a.start.x, 200.0);
                prop_assert_eq!(a.end.y - a.start.y, 150.0);
            }
        }
    }
}
