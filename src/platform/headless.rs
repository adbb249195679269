//! In-memory platform
//!
//! Stand-ins for the device services. They record what the games do so tests
//! (and the headless demo) can inspect it.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use glam::IVec2;

use super::display::{Color, Display, RectStyle, WidgetId};
use super::{ChirpPlayer, Imu, ImuSample, Navigator, PowerManager, ScreenFactory};
use crate::audio::Chirp;
use crate::error::{AudioError, SensorError};

/// IMU that replays queued readings, then keeps returning the resting sample
#[derive(Default)]
pub struct ScriptedImu {
    inner: Mutex<ScriptedImuInner>,
}

#[derive(Default)]
struct ScriptedImuInner {
    queued: VecDeque<Result<ImuSample, SensorError>>,
    resting: ImuSample,
    reads: u64,
}

impl ScriptedImu {
    pub fn new(resting: ImuSample) -> Self {
        Self {
            inner: Mutex::new(ScriptedImuInner {
                resting,
                ..Default::default()
            }),
        }
    }

    /// Tilt on both axes (g)
    pub fn tilted(accel_x: f32, accel_y: f32) -> Self {
        Self::new(ImuSample {
            accel_x,
            accel_y,
            accel_z: 1.0,
        })
    }

    pub fn set_resting(&self, sample: ImuSample) {
        self.lock().resting = sample;
    }

    pub fn push(&self, reading: Result<ImuSample, SensorError>) {
        self.lock().queued.push_back(reading);
    }

    pub fn reads(&self) -> u64 {
        self.lock().reads
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedImuInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Imu for ScriptedImu {
    fn sample(&self) -> Result<ImuSample, SensorError> {
        let mut inner = self.lock();
        inner.reads += 1;
        match inner.queued.pop_front() {
            Some(reading) => reading,
            None => Ok(inner.resting),
        }
    }
}

/// Tone player that remembers every sequence
#[derive(Default)]
pub struct RecordingAudio {
    played: Mutex<Vec<Vec<Chirp>>>,
}

impl RecordingAudio {
    pub fn played(&self) -> Vec<Vec<Chirp>> {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ChirpPlayer for RecordingAudio {
    fn play(&self, chirps: &[Chirp]) -> Result<(), AudioError> {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(chirps.to_vec());
        Ok(())
    }
}

/// Power manager that only tracks the auto-sleep flag
pub struct PowerFlag {
    auto_sleep: AtomicBool,
    changes: AtomicU64,
}

impl Default for PowerFlag {
    fn default() -> Self {
        Self {
            auto_sleep: AtomicBool::new(true),
            changes: AtomicU64::new(0),
        }
    }
}

impl PowerFlag {
    pub fn auto_sleep_enabled(&self) -> bool {
        self.auto_sleep.load(Ordering::SeqCst)
    }

    pub fn changes(&self) -> u64 {
        self.changes.load(Ordering::SeqCst)
    }
}

impl PowerManager for PowerFlag {
    fn set_auto_sleep_enabled(&self, enabled: bool) {
        self.auto_sleep.store(enabled, Ordering::SeqCst);
        self.changes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Navigator that queues transitions until the host executes them
#[derive(Default)]
pub struct PendingNavigator {
    pending: Mutex<Vec<ScreenFactory>>,
}

impl PendingNavigator {
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn take_pending(&self) -> Vec<ScreenFactory> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Navigator for PendingNavigator {
    fn transition(&self, factory: ScreenFactory) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(factory);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Rect(RectStyle),
    Label { text: String, color: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub parent: Option<WidgetId>,
    pub kind: WidgetKind,
    pub pos: IVec2,
    pub visible: bool,
}

impl Widget {
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            WidgetKind::Label { text, .. } => Some(text),
            WidgetKind::Rect(_) => None,
        }
    }
}

/// Widget tree kept in memory
#[derive(Default)]
pub struct MemoryDisplay {
    inner: Mutex<MemoryDisplayInner>,
}

#[derive(Default)]
struct MemoryDisplayInner {
    next_id: u32,
    widgets: BTreeMap<WidgetId, Widget>,
    updates: u64,
}

impl MemoryDisplay {
    pub fn widget(&self, id: WidgetId) -> Option<Widget> {
        self.lock().widgets.get(&id).cloned()
    }

    pub fn widget_count(&self) -> usize {
        self.lock().widgets.len()
    }

    /// Text of every label, in creation order
    pub fn label_texts(&self) -> Vec<String> {
        self.lock()
            .widgets
            .values()
            .filter_map(|w| w.text().map(str::to_owned))
            .collect()
    }

    /// Number of position/visibility/text updates received so far
    pub fn updates(&self) -> u64 {
        self.lock().updates
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryDisplayInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, widget: Widget) -> WidgetId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = WidgetId(inner.next_id);
        inner.widgets.insert(id, widget);
        id
    }

    fn update(&self, id: WidgetId, f: impl FnOnce(&mut Widget)) {
        let mut inner = self.lock();
        inner.updates += 1;
        if let Some(widget) = inner.widgets.get_mut(&id) {
            f(widget);
        }
    }
}

impl Display for MemoryDisplay {
    fn create_rect(&self, parent: Option<WidgetId>, style: RectStyle) -> WidgetId {
        self.insert(Widget {
            parent,
            kind: WidgetKind::Rect(style),
            pos: IVec2::ZERO,
            visible: true,
        })
    }

    fn create_label(&self, parent: WidgetId, text: &str, color: Color) -> WidgetId {
        self.insert(Widget {
            parent: Some(parent),
            kind: WidgetKind::Label {
                text: text.to_owned(),
                color,
            },
            pos: IVec2::ZERO,
            visible: true,
        })
    }

    fn set_position(&self, id: WidgetId, pos: IVec2) {
        self.update(id, |w| w.pos = pos);
    }

    fn set_visible(&self, id: WidgetId, visible: bool) {
        self.update(id, |w| w.visible = visible);
    }

    fn set_text(&self, id: WidgetId, text: &str) {
        self.update(id, |w| {
            if let WidgetKind::Label { text: current, .. } = &mut w.kind {
                current.clear();
                current.push_str(text);
            }
        });
    }

    fn remove(&self, id: WidgetId) {
        let mut inner = self.lock();
        let mut doomed = vec![id];
        while let Some(next) = doomed.pop() {
            inner.widgets.remove(&next);
            doomed.extend(
                inner
                    .widgets
                    .iter()
                    .filter(|(_, w)| w.parent == Some(next))
                    .map(|(child, _)| *child),
            );
        }
    }
}
