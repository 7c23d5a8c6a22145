//! Dense per-frame label construction
//!
//! Events of one video are replayed in file order through a per-behavior
//! interval state machine (`Closed` / `Open(frame)`). Closed intervals and
//! point events are written into a label sink: a scalar class per frame for
//! single-label datasets, or one flag per class per frame for multilabel
//! datasets. Later writes replace earlier ones in the single-label case, so
//! the result depends on event order, not on timestamps.

use crate::types::{round_half_even, BehaviorEvent, EventStatus, VideoRecord};
use crate::vocabulary::ClassVocabulary;
use log::debug;
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Map a timestamp to a frame index clamped to `[0, frame_count - 1]`.
///
/// Returns `None` when the video has no frames.
pub fn frame_index(timestamp_sec: f64, fps: f64, frame_count: usize) -> Option<usize> {
    if frame_count == 0 {
        return None;
    }
    let frame = round_half_even(timestamp_sec * fps);
    let last = (frame_count - 1) as f64;
    Some(frame.clamp(0.0, last) as usize)
}

/// State of one behavior's interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalState {
    Closed,
    Open(usize),
}

/// A START that never saw its STOP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedStart {
    pub behavior: String,
    pub frame: usize,
}

/// Per-video interval state for every behavior
#[derive(Debug, Default)]
pub struct IntervalTracker {
    open: HashMap<String, usize>,
}

impl IntervalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, behavior: &str) -> IntervalState {
        match self.open.get(behavior) {
            Some(&frame) => IntervalState::Open(frame),
            None => IntervalState::Closed,
        }
    }

    /// Open (or re-open) an interval; a previous unclosed open is replaced
    pub fn start(&mut self, behavior: &str, frame: usize) {
        self.open.insert(behavior.to_string(), frame);
    }

    /// Close the behavior's interval, returning the inclusive frame range.
    ///
    /// A STOP without an open interval yields `None`.
    pub fn stop(&mut self, behavior: &str, frame: usize) -> Option<RangeInclusive<usize>> {
        self.open
            .remove(behavior)
            .map(|opened| opened.min(frame)..=opened.max(frame))
    }

    /// End of stream: report every interval still open, sorted by behavior
    pub fn finish(self) -> Vec<UnmatchedStart> {
        let mut unmatched: Vec<UnmatchedStart> = self
            .open
            .into_iter()
            .map(|(behavior, frame)| UnmatchedStart { behavior, frame })
            .collect();
        unmatched.sort_by(|a, b| a.behavior.cmp(&b.behavior));
        unmatched
    }
}

/// Destination of label writes
pub trait LabelSink {
    /// Mark every frame in `frames` as belonging to `class_id`
    fn mark(&mut self, frames: RangeInclusive<usize>, class_id: u32);
}

/// One class ID per frame; writes overwrite
#[derive(Debug, Clone, PartialEq)]
pub struct SingleLabelSink {
    pub frames: Vec<u32>,
}

impl SingleLabelSink {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frames: vec![0; frame_count],
        }
    }
}

impl LabelSink for SingleLabelSink {
    fn mark(&mut self, frames: RangeInclusive<usize>, class_id: u32) {
        for slot in &mut self.frames[frames] {
            *slot = class_id;
        }
    }
}

/// One flag per class per frame; writes only ever set flags
#[derive(Debug, Clone, PartialEq)]
pub struct MultiLabelSink {
    pub frames: Vec<Vec<bool>>,
}

impl MultiLabelSink {
    pub fn new(frame_count: usize, class_count: usize) -> Self {
        Self {
            frames: vec![vec![false; class_count]; frame_count],
        }
    }
}

impl LabelSink for MultiLabelSink {
    fn mark(&mut self, frames: RangeInclusive<usize>, class_id: u32) {
        let class = class_id as usize;
        for frame in &mut self.frames[frames] {
            if let Some(flag) = frame.get_mut(class) {
                *flag = true;
            }
        }
    }
}

/// Labels for one video plus intervals dropped at end of stream
#[derive(Debug, Clone, PartialEq)]
pub struct LabelOutcome<T> {
    pub labels: T,
    pub unmatched: Vec<UnmatchedStart>,
}

/// Builds dense label sequences against a fixed vocabulary
#[derive(Debug, Clone, Copy)]
pub struct LabelSequenceBuilder<'a> {
    vocab: &'a ClassVocabulary,
}

impl<'a> LabelSequenceBuilder<'a> {
    pub fn new(vocab: &'a ClassVocabulary) -> Self {
        Self { vocab }
    }

    /// Single-label sequence: unlabeled frames carry 0, unknown behaviors write 0
    pub fn single(&self, events: &[BehaviorEvent], video: &VideoRecord) -> LabelOutcome<Vec<u32>> {
        let mut sink = SingleLabelSink::new(video.frame_count);
        let unmatched = self.replay(events, video, &mut sink, |name| {
            Some(self.vocab.id(name).unwrap_or(0))
        });
        LabelOutcome {
            labels: sink.frames,
            unmatched,
        }
    }

    /// Multilabel sequence: behaviors outside the vocabulary are ignored
    pub fn multilabel(
        &self,
        events: &[BehaviorEvent],
        video: &VideoRecord,
    ) -> LabelOutcome<Vec<Vec<bool>>> {
        let mut sink = MultiLabelSink::new(video.frame_count, self.vocab.len());
        let unmatched = self.replay(events, video, &mut sink, |name| self.vocab.id(name));
        LabelOutcome {
            labels: sink.frames,
            unmatched,
        }
    }

    /// Replay events in order into `sink`; `class_of` returning `None` skips the event
    fn replay<S, F>(
        &self,
        events: &[BehaviorEvent],
        video: &VideoRecord,
        sink: &mut S,
        class_of: F,
    ) -> Vec<UnmatchedStart>
    where
        S: LabelSink,
        F: Fn(&str) -> Option<u32>,
    {
        let mut tracker = IntervalTracker::new();

        for event in events {
            let Some(class_id) = class_of(&event.behavior) else {
                continue;
            };
            let Some(frame) = frame_index(event.timestamp_sec, video.fps, video.frame_count)
            else {
                continue;
            };

            match event.status {
                EventStatus::Start => tracker.start(&event.behavior, frame),
                EventStatus::Stop => {
                    if let Some(range) = tracker.stop(&event.behavior, frame) {
                        sink.mark(range, class_id);
                    }
                }
                EventStatus::Point => sink.mark(frame..=frame, class_id),
            }
        }

        let unmatched = tracker.finish();
        for open in &unmatched {
            debug!(
                "{}: START of '{}' at frame {} has no STOP; interval dropped",
                video.name, open.behavior, open.frame
            );
        }
        unmatched
    }
}

/// Folder-mode labels: every frame carries the clip's class
pub fn uniform_labels(class_id: u32, frame_count: usize) -> Vec<u32> {
    vec![class_id; frame_count]
}
