//! Mock collaborators for tests
//!
//! Every mock records into a shared log so tests can assert on the exact
//! sequence of UI calls a state transition produced.

use std::sync::Arc;

use parking_lot::Mutex;

use super::dialog::{
    AnnotationDialog, AnnotatorHost, IndicatorElement, ThreadKind, ThreadUiFactory,
};
use super::types::{Annotation, Location};
use crate::annotator::AnnotationMode;

/// Shared call log
pub type UiLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> UiLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &UiLog) -> Vec<String> {
    log.lock().clone()
}

pub struct MockDialog {
    log: UiLog,
    visible: bool,
}

impl AnnotationDialog for MockDialog {
    fn show(&mut self) {
        self.visible = true;
        self.log.lock().push("dialog-show".to_string());
    }

    fn hide(&mut self) {
        self.visible = false;
        self.log.lock().push("dialog-hide".to_string());
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn setup(&mut self, annotations: &[Annotation]) {
        self.log.lock().push(format!("dialog-setup:{}", annotations.len()));
    }

    fn add_annotation(&mut self, annotation: &Annotation) {
        self.log
            .lock()
            .push(format!("dialog-add:{}", annotation.annotation_id));
    }

    fn remove_annotation(&mut self, annotation_id: &str) {
        self.log.lock().push(format!("dialog-remove:{}", annotation_id));
    }

    fn destroy(&mut self) {
        self.log.lock().push("dialog-destroy".to_string());
    }
}

pub struct MockIndicator {
    log: UiLog,
}

impl IndicatorElement for MockIndicator {
    fn show(&mut self, location: &Location) {
        self.log
            .lock()
            .push(format!("indicator-show:{}", location.page()));
    }

    fn hide(&mut self) {
        self.log.lock().push("indicator-hide".to_string());
    }

    fn destroy(&mut self) {
        self.log.lock().push("indicator-destroy".to_string());
    }
}

pub struct MockUiFactory {
    pub log: UiLog,
}

impl MockUiFactory {
    pub fn new(log: UiLog) -> Self {
        Self { log }
    }
}

impl ThreadUiFactory for MockUiFactory {
    fn create_dialog(
        &self,
        kind: ThreadKind,
        _location: &Location,
        annotations: &[Annotation],
    ) -> Box<dyn AnnotationDialog> {
        self.log
            .lock()
            .push(format!("create-dialog:{:?}:{}", kind, annotations.len()));
        Box::new(MockDialog {
            log: self.log.clone(),
            visible: false,
        })
    }

    fn create_indicator(&self, kind: ThreadKind, _location: &Location) -> Box<dyn IndicatorElement> {
        self.log.lock().push(format!("create-indicator:{:?}", kind));
        Box::new(MockIndicator {
            log: self.log.clone(),
        })
    }
}

pub struct MockHost {
    pub log: UiLog,
}

impl MockHost {
    pub fn new(log: UiLog) -> Self {
        Self { log }
    }
}

impl AnnotatorHost for MockHost {
    fn set_mode_marker(&self, mode: AnnotationMode, active: bool) {
        self.log.lock().push(format!("marker:{:?}:{}", mode, active));
    }

    fn bind_mode_listeners(&self, mode: AnnotationMode) {
        self.log.lock().push(format!("bind:{:?}", mode));
    }

    fn unbind_mode_listeners(&self, mode: AnnotationMode) {
        self.log.lock().push(format!("unbind:{:?}", mode));
    }
}
