//! Per-document annotation orchestration
//!
//! The annotator owns the thread map (page number → threads), routes
//! resolved gestures to thread creation, and manages the point/highlight
//! annotation modes. It never resolves DOM locations itself: the external
//! resolver hands it `Location` values and reads the mode marker through the
//! host seam.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use crate::annotations::dialog::{AnnotatorHost, ThreadKind, ThreadUiFactory};
use crate::annotations::thread::{AnnotationThread, ThreadState};
use crate::annotations::types::{Annotation, AnnotationType, Location};
use crate::error::Result;
use crate::events::{AnnotatorEvent, ThreadEvent};
use crate::service::{generate_annotation_id, AnnotationStore};

/// Active annotation input mode. Point and highlight are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationMode {
    None,
    Point,
    Highlight,
}

/// Orchestrates the thread map and annotation modes for one file version.
pub struct Annotator {
    store: Arc<dyn AnnotationStore>,
    host: Arc<dyn AnnotatorHost>,
    ui: Arc<dyn ThreadUiFactory>,
    file_version_id: String,
    /// page number → threads on that page; a thread id appears at most once
    /// across the whole map
    threads: Mutex<HashMap<u32, Vec<AnnotationThread>>>,
    mode: Mutex<AnnotationMode>,
    thread_events_tx: mpsc::UnboundedSender<ThreadEvent>,
    thread_events_rx: Mutex<mpsc::UnboundedReceiver<ThreadEvent>>,
    viewer_events: broadcast::Sender<AnnotatorEvent>,
}

impl Annotator {
    pub fn new(
        store: Arc<dyn AnnotationStore>,
        host: Arc<dyn AnnotatorHost>,
        ui: Arc<dyn ThreadUiFactory>,
        file_version_id: &str,
    ) -> Self {
        let (thread_events_tx, thread_events_rx) = mpsc::unbounded_channel();
        let (viewer_events, _) = broadcast::channel(64);

        Self {
            store,
            host,
            ui,
            file_version_id: file_version_id.to_string(),
            threads: Mutex::new(HashMap::new()),
            mode: Mutex::new(AnnotationMode::None),
            thread_events_tx,
            thread_events_rx: Mutex::new(thread_events_rx),
            viewer_events,
        }
    }

    /// Subscribe to annotator and forwarded thread events
    pub fn subscribe(&self) -> broadcast::Receiver<AnnotatorEvent> {
        self.viewer_events.subscribe()
    }

    pub fn mode(&self) -> AnnotationMode {
        *self.mode.lock()
    }

    /// Pages that currently have threads, ascending
    pub fn pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.threads.lock().keys().copied().collect();
        pages.sort_unstable();
        pages
    }

    pub fn threads_on_page(&self, page: u32) -> Vec<AnnotationThread> {
        self.threads
            .lock()
            .get(&page)
            .cloned()
            .unwrap_or_default()
    }

    /// Fetch all annotations for the file version and rebuild the thread map
    /// wholesale.
    ///
    /// The rebuild is intentional: map consistency is always derived from a
    /// single authoritative read, never patched incrementally. The store's
    /// grouping is deterministic, so an unchanged server response rebuilds
    /// an identical map.
    pub async fn fetch_annotations(&self) -> Result<()> {
        let map = self.store.thread_map(&self.file_version_id).await?;
        tracing::debug!(
            file_version_id = %self.file_version_id,
            threads = map.len(),
            "rebuilding thread map"
        );

        self.release_threads();

        for (_, annotations) in map {
            let Some(first) = annotations.first() else {
                continue;
            };
            let location = first.location.clone();
            let annotation_type = first.annotation_type;
            let thread = self.create_annotation_thread(annotations, location, annotation_type);
            thread.show();
        }

        Ok(())
    }

    /// Destroy every live thread so its dialog and indicator are released,
    /// then swallow the teardown events: the rebuild reuses thread ids, so a
    /// stale `ThreadDeleted` must not evict a freshly built thread later.
    fn release_threads(&self) {
        let old: Vec<AnnotationThread> = {
            let mut threads = self.threads.lock();
            let old = threads.values().flatten().cloned().collect();
            threads.clear();
            old
        };
        if old.is_empty() {
            return;
        }

        let released: HashSet<String> = old
            .iter()
            .map(|thread| thread.thread_id().to_string())
            .collect();
        for thread in old {
            thread.destroy();
        }

        let kept: Vec<ThreadEvent> = {
            let mut rx = self.thread_events_rx.lock();
            let mut kept = Vec::new();
            while let Ok(event) = rx.try_recv() {
                if !released.contains(event.thread_id()) {
                    kept.push(event);
                }
            }
            kept
        };
        for event in kept {
            let _ = self.thread_events_tx.send(event);
        }
    }

    /// Create a thread and register it under its page key.
    ///
    /// Reuses the thread id carried by fetched annotations; a fresh local
    /// draft gets a generated one.
    pub fn create_annotation_thread(
        &self,
        annotations: Vec<Annotation>,
        location: Location,
        annotation_type: AnnotationType,
    ) -> AnnotationThread {
        let thread_id = annotations
            .first()
            .map(|a| a.thread_id.clone())
            .unwrap_or_else(generate_annotation_id);

        let thread = AnnotationThread::new(
            annotations,
            location.clone(),
            annotation_type,
            thread_id,
            self.file_version_id.clone(),
            self.store.clone(),
            self.ui.clone(),
            self.thread_events_tx.clone(),
        );

        self.threads
            .lock()
            .entry(location.page())
            .or_default()
            .push(thread.clone());

        thread
    }

    /// A point gesture resolved by the external location resolver. Creates a
    /// pending thread when point mode is active; any prior draft is
    /// discarded first.
    pub fn handle_point_gesture(&self, location: Location) -> Option<AnnotationThread> {
        if *self.mode.lock() != AnnotationMode::Point {
            return None;
        }
        self.destroy_pending_threads();
        let thread = self.create_annotation_thread(Vec::new(), location, AnnotationType::Point);
        thread.show();
        Some(thread)
    }

    /// A highlight selection resolved by the external location resolver.
    pub fn handle_highlight_gesture(&self, location: Location) -> Option<AnnotationThread> {
        if *self.mode.lock() != AnnotationMode::Highlight {
            return None;
        }
        self.destroy_pending_threads();
        let thread = self.create_annotation_thread(Vec::new(), location, AnnotationType::Highlight);
        thread.show();
        Some(thread)
    }

    /// Toggle point annotation mode, exiting highlight mode first if needed
    pub fn toggle_point_mode(&self) {
        self.toggle_mode(AnnotationMode::Point);
    }

    /// Toggle highlight annotation mode, exiting point mode first if needed
    pub fn toggle_highlight_mode(&self) {
        self.toggle_mode(AnnotationMode::Highlight);
    }

    fn toggle_mode(&self, target: AnnotationMode) {
        if !self.store.can_annotate() {
            tracing::warn!("annotation capability disabled, ignoring mode toggle");
            return;
        }

        let mut mode = self.mode.lock();
        let current = *mode;

        if current == target {
            self.exit_mode(current);
            *mode = AnnotationMode::None;
            return;
        }

        // Modes are mutually exclusive: leave the other one completely
        // (listeners unbound, marker cleared, drafts dropped) before
        // entering, so one click never means two things.
        if current != AnnotationMode::None {
            self.exit_mode(current);
        }
        self.enter_mode(target);
        *mode = target;
    }

    fn enter_mode(&self, mode: AnnotationMode) {
        self.host.set_mode_marker(mode, true);
        self.host.bind_mode_listeners(mode);
        match mode {
            AnnotationMode::Point => self.broadcast(AnnotatorEvent::PointModeEnter),
            AnnotationMode::Highlight => self.broadcast(AnnotatorEvent::HighlightModeEnter),
            AnnotationMode::None => {}
        }
    }

    fn exit_mode(&self, mode: AnnotationMode) {
        self.host.unbind_mode_listeners(mode);
        self.host.set_mode_marker(mode, false);
        self.destroy_pending_threads();
        match mode {
            AnnotationMode::Point => self.broadcast(AnnotatorEvent::PointModeExit),
            AnnotationMode::Highlight => self.broadcast(AnnotatorEvent::HighlightModeExit),
            AnnotationMode::None => {}
        }
    }

    /// Drop every unsaved draft thread
    fn destroy_pending_threads(&self) {
        let mut threads = self.threads.lock();
        for bucket in threads.values_mut() {
            bucket.retain(|thread| {
                let pending = matches!(
                    thread.state(),
                    ThreadState::Pending | ThreadState::PendingActive
                );
                if pending {
                    thread.destroy();
                }
                !pending
            });
        }
        threads.retain(|_, bucket| !bucket.is_empty());
    }

    /// Drain pending thread events: maintain the map, apply the
    /// redraw-on-delete rule, and forward everything to viewers. Returns the
    /// number of events handled.
    pub fn process_pending_events(&self) -> usize {
        let mut handled = 0;
        loop {
            let event = self.thread_events_rx.lock().try_recv();
            let Ok(event) = event else {
                break;
            };
            self.handle_thread_event(&event);
            self.broadcast(AnnotatorEvent::Thread(event));
            handled += 1;
        }
        handled
    }

    fn handle_thread_event(&self, event: &ThreadEvent) {
        let ThreadEvent::ThreadDeleted { thread_id, page } = event else {
            return;
        };

        let redraw: Vec<AnnotationThread> = {
            let mut threads = self.threads.lock();
            let Some(bucket) = threads.get_mut(page) else {
                return;
            };
            bucket.retain(|thread| thread.thread_id() != thread_id);
            if bucket.is_empty() {
                threads.remove(page);
                Vec::new()
            } else {
                bucket
                    .iter()
                    .filter(|thread| thread.kind() == ThreadKind::Highlight)
                    .cloned()
                    .collect()
            }
        };

        // Overlapping highlight marks render order-dependently: removing one
        // can uncover a region another mark previously occluded, so every
        // remaining highlight on the page is redrawn.
        for thread in redraw {
            thread.show();
        }
    }

    /// Tear down modes and every thread
    pub fn destroy(&self) {
        {
            let mut mode = self.mode.lock();
            if *mode != AnnotationMode::None {
                self.exit_mode(*mode);
                *mode = AnnotationMode::None;
            }
        }

        let all: Vec<AnnotationThread> = {
            let mut threads = self.threads.lock();
            let all = threads.values().flatten().cloned().collect();
            threads.clear();
            all
        };
        for thread in all {
            thread.destroy();
        }
    }

    fn broadcast(&self, event: AnnotatorEvent) {
        // No subscribers is fine
        let _ = self.viewer_events.send(event);
    }
}
