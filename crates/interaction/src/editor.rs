//! Editor session: one slide, one controller, and the write-back channel.

use snapmark_slide_model::annotation::{Annotation, AnnotationId};
use snapmark_slide_model::geometry::Point;
use snapmark_slide_model::session::{LoadedSession, Session};
use snapmark_slide_model::slide::Slide;

use crate::controller::{CommitOutcome, ControllerState, InteractionController};
use crate::tool::{Tool, ToolSettings};

/// Receives every committed slide snapshot.
///
/// The editor calls `update_slide` exactly once per committed operation and
/// never between pointer-move ticks.
pub trait SlideSink {
    fn update_slide(&mut self, slide: Slide);
}

impl<F> SlideSink for F
where
    F: FnMut(Slide),
{
    fn update_slide(&mut self, slide: Slide) {
        self(slide)
    }
}

impl SlideSink for Session {
    fn update_slide(&mut self, slide: Slide) {
        let id = slide.id.clone();
        if !self.replace_slide(slide) {
            tracing::warn!(slide = %id, "Dropping update for a slide not in the session");
        }
    }
}

impl SlideSink for LoadedSession {
    fn update_slide(&mut self, slide: Slide) {
        self.session.update_slide(slide);
    }
}

/// Editing state for the slide currently mounted in the editor.
pub struct EditorSession<S: SlideSink> {
    slide: Slide,
    controller: InteractionController,
    sink: S,
    commits: u64,
}

impl<S: SlideSink> EditorSession<S> {
    pub fn new(slide: Slide, settings: ToolSettings, sink: S) -> Self {
        tracing::debug!(slide = %slide.id, "Editor mounted");
        Self {
            slide,
            controller: InteractionController::new(settings),
            sink,
            commits: 0,
        }
    }

    /// The latest committed snapshot.
    pub fn slide(&self) -> &Slide {
        &self.slide
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of snapshots written to the sink so far.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Seek the mounted video. Playback position is view state and is not written back.
    pub fn set_playback_time(&mut self, secs: f64) {
        self.slide = self.slide.at_playback_time(secs);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.controller.set_tool(tool);
    }

    pub fn live_annotations(&self) -> Vec<Annotation> {
        self.controller.live_annotations(&self.slide)
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.controller.pointer_down(&self.slide, point);
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.controller.pointer_move(point);
    }

    pub fn pointer_up(&mut self, point: Point) -> bool {
        let outcome = self.controller.pointer_up(&self.slide, point);
        self.apply(outcome)
    }

    pub fn pointer_leave(&mut self, point: Point) -> bool {
        let outcome = self.controller.pointer_leave(&self.slide, point);
        self.apply(outcome)
    }

    pub fn set_comment(&mut self, id: AnnotationId, comment: impl Into<String>) -> bool {
        let outcome = self.controller.set_comment(&self.slide, id, comment);
        self.apply(outcome)
    }

    pub fn delete(&mut self, id: AnnotationId) -> bool {
        let outcome = self.controller.delete(&self.slide, id);
        self.apply(outcome)
    }

    pub fn delete_selected(&mut self) -> bool {
        let outcome = self.controller.delete_selected(&self.slide);
        self.apply(outcome)
    }

    pub fn undo_last(&mut self) -> bool {
        let outcome = self.controller.undo_last(&self.slide);
        self.apply(outcome)
    }

    pub fn discard_all(&mut self) -> bool {
        let outcome = self.controller.discard_all(&self.slide);
        self.apply(outcome)
    }

    /// Unmount, returning the last snapshot and the sink.
    pub fn into_parts(self) -> (Slide, S) {
        (self.slide, self.sink)
    }

    /// Swap in a committed snapshot and forward it. Returns whether anything was written.
    fn apply(&mut self, outcome: CommitOutcome) -> bool {
        match outcome {
            CommitOutcome::Committed(slide) => {
                self.slide = slide.clone();
                self.sink.update_slide(slide);
                self.commits += 1;
                tracing::debug!(
                    slide = %self.slide.id,
                    annotations = self.slide.annotations.len(),
                    "Slide committed"
                );
                true
            }
            CommitOutcome::Discarded | CommitOutcome::Unchanged => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapmark_slide_model::slide::MediaRef;

    #[test]
    fn test_closure_sink_receives_each_commit_once() {
        let slide = Slide::new("s", MediaRef::image("a.png", 800, 600));
        let mut received = Vec::new();
        {
            let mut editor =
                EditorSession::new(slide, ToolSettings::default(), |s: Slide| received.push(s));
            editor.pointer_down(Point::new(10.0, 10.0));
            editor.pointer_move(Point::new(40.0, 40.0));
            editor.pointer_move(Point::new(90.0, 70.0));
            assert!(editor.pointer_up(Point::new(100.0, 80.0)));
            assert_eq!(editor.commit_count(), 1);
        }
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].annotations.len(), 1);
    }

    #[test]
    fn test_session_sink_replaces_slide() {
        let mut session = Session::new("bugs");
        let slide = Slide::new("s", MediaRef::image("a.png", 800, 600));
        session.add_slide(slide.clone());

        let mut editor = EditorSession::new(slide.clone(), ToolSettings::default(), session);
        editor.pointer_down(Point::new(10.0, 10.0));
        editor.pointer_up(Point::new(200.0, 200.0));
        let id = editor.slide().annotations[0].id;
        editor.set_comment(id, "Typo in heading");

        let (_, session) = editor.into_parts();
        let stored = session.slide(&slide.id).unwrap();
        assert_eq!(stored.annotations[0].comment, "Typo in heading");
    }

    #[test]
    fn test_playback_time_is_not_written_back() {
        let slide = Slide::new("v", MediaRef::video("f.png", 800, 600, 20.0, 1.0));
        let mut writes = 0;
        let mut editor =
            EditorSession::new(slide, ToolSettings::default(), |_s: Slide| writes += 1);
        editor.set_playback_time(7.0);
        assert_eq!(editor.slide().playback_time(), Some(7.0));
        assert_eq!(editor.commit_count(), 0);
        drop(editor);
        assert_eq!(writes, 0);
    }
}
