//! Test doubles shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::BytesMut;
use flate2::{Compress, Compression, Decompress};
use parking_lot::Mutex;

use crate::compression::{DeflaterPool, InflaterPool};
use crate::error::{Error, Result};
use crate::executor::{Executor, Task};
use crate::extension::{Extension, ExtensionConfig, ExtensionRegistry};
use crate::factory::{Endpoint, ObjectFactory};
use crate::io::BufferPool;
use crate::lifecycle::{LifeCycle, LifeCycleListener, State};

// ============================================================================
// Journal
// ============================================================================

/// Ordered record of events shared between doubles.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().clear();
    }
}

// ============================================================================
// MockBean
// ============================================================================

/// Lifecycle double that can stand in for any collaborator.
pub(crate) struct MockBean {
    name: String,
    journal: Journal,
    running: AtomicBool,
    fail_start: AtomicBool,
    fail_stop: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl MockBean {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            running: AtomicBool::new(false),
            fail_start: AtomicBool::new(false),
            fail_stop: AtomicBool::new(false),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_on_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_on_stop(&self) {
        self.fail_stop.store(true, Ordering::SeqCst);
    }

    pub(crate) fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl LifeCycle for MockBean {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<()> {
        self.journal.record(format!("start {}", self.name));
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(Error::component(&self.name, "start refused"));
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.journal.record(format!("stop {}", self.name));
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(Error::component(&self.name, "stop refused"));
        }
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl BufferPool for MockBean {
    fn acquire(&self, size: usize) -> BytesMut {
        BytesMut::with_capacity(size)
    }

    fn release(&self, _buffer: BytesMut) {}
}

impl InflaterPool for MockBean {
    fn acquire(&self) -> Decompress {
        Decompress::new(false)
    }

    fn release(&self, _inflater: Decompress) {}
}

impl DeflaterPool for MockBean {
    fn acquire(&self) -> Compress {
        Compress::new(Compression::default(), false)
    }

    fn release(&self, _deflater: Compress) {}
}

impl ExtensionRegistry for MockBean {
    fn is_available(&self, _name: &str) -> bool {
        false
    }

    fn available_extension_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn new_instance(&self, config: &ExtensionConfig) -> Result<Box<dyn Extension>> {
        Err(Error::unknown_extension(config.name()))
    }
}

impl ObjectFactory for MockBean {
    fn decorate(&self, endpoint: Endpoint) -> Result<Endpoint> {
        Ok(endpoint)
    }

    fn destroy(&self, _endpoint: &mut Endpoint) {}
}

impl Executor for MockBean {
    fn execute(&self, task: Task) -> Result<()> {
        if !self.is_running() {
            return Err(Error::rejected(&self.name));
        }
        task();
        Ok(())
    }
}

// ============================================================================
// RecordingListener
// ============================================================================

/// Listener that writes each hook into a [`Journal`].
pub(crate) struct RecordingListener {
    journal: Journal,
}

impl RecordingListener {
    pub(crate) fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl LifeCycleListener for RecordingListener {
    fn on_starting(&self, container: &str) {
        self.journal.record(format!("starting {container}"));
    }

    fn on_started(&self, container: &str) {
        self.journal.record(format!("started {container}"));
    }

    fn on_failure(&self, container: &str, state: State, _error: &Error) {
        self.journal.record(format!("failure {container} {state}"));
    }

    fn on_stopping(&self, container: &str) {
        self.journal.record(format!("stopping {container}"));
    }

    fn on_stopped(&self, container: &str) {
        self.journal.record(format!("stopped {container}"));
    }
}
