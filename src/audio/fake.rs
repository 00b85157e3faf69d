//! An in-memory [`PlaybackEngine`] that records every call.
//!
//! Clones share state, so a test can hand one clone to the mixer and keep
//! another to inspect what the mixer asked for.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::error::LoadError;

use super::engine::{LoadRequest, PendingLoad, PlaybackEngine};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(String),
    SetGain(String, f32),
    Play(String, f32),
    Pause(String, f32),
    Unload(String),
    FadeOutAll(Duration),
}

#[derive(Default)]
struct Inner {
    calls: Vec<EngineCall>,
    playing: HashSet<String>,
    failing: HashSet<String>,
    deferred: HashSet<String>,
    waiting: HashMap<String, Sender<Result<(), LoadError>>>,
}

/// Loads resolve immediately unless the id was registered as failing or
/// deferred. Deferred loads are resolved later with [`FakeEngine::finish`].
#[derive(Clone, Default)]
pub struct FakeEngine {
    inner: Rc<RefCell<Inner>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_loads_of(&self, id: &str) {
        self.inner.borrow_mut().failing.insert(id.to_string());
    }

    pub fn succeed_loads_of(&self, id: &str) {
        self.inner.borrow_mut().failing.remove(id);
    }

    pub fn defer_loads_of(&self, id: &str) {
        self.inner.borrow_mut().deferred.insert(id.to_string());
    }

    /// Resolve a deferred load.
    pub fn finish(&self, id: &str, result: Result<(), LoadError>) {
        let tx = self.inner.borrow_mut().waiting.remove(id);
        if let Some(tx) = tx {
            let _ = tx.send(result);
        }
    }

    /// Drop a deferred load without answering it.
    pub fn abandon(&self, id: &str) {
        self.inner.borrow_mut().waiting.remove(id);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.inner.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    fn record(&self, call: EngineCall) {
        self.inner.borrow_mut().calls.push(call);
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, request: LoadRequest) -> PendingLoad {
        self.record(EngineCall::Load(request.id.clone()));
        let (tx, pending) = PendingLoad::channel();
        let mut inner = self.inner.borrow_mut();
        if inner.deferred.contains(&request.id) {
            inner.waiting.insert(request.id, tx);
        } else if inner.failing.contains(&request.id) {
            let _ = tx.send(Err(LoadError::Open {
                path: request.path.display().to_string(),
                reason: "missing".to_string(),
            }));
        } else {
            let _ = tx.send(Ok(()));
        }
        pending
    }

    fn set_gain(&mut self, id: &str, gain: f32) {
        self.record(EngineCall::SetGain(id.to_string(), gain));
    }

    fn play(&mut self, id: &str, target_gain: f32) {
        self.record(EngineCall::Play(id.to_string(), target_gain));
        self.inner.borrow_mut().playing.insert(id.to_string());
    }

    fn pause(&mut self, id: &str, current_gain: f32) {
        self.record(EngineCall::Pause(id.to_string(), current_gain));
        self.inner.borrow_mut().playing.remove(id);
    }

    fn is_playing(&self, id: &str) -> bool {
        self.inner.borrow().playing.contains(id)
    }

    fn unload(&mut self, id: &str) {
        self.record(EngineCall::Unload(id.to_string()));
        self.inner.borrow_mut().playing.remove(id);
    }

    fn fade_out_all(&mut self, fade_out: Duration) {
        self.record(EngineCall::FadeOutAll(fade_out));
        self.inner.borrow_mut().playing.clear();
    }
}
