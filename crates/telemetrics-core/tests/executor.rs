#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::io;
use std::sync::{Arc, Mutex};

use telemetrics_core::executor::exception_safe;
use telemetrics_core::TelemetryError;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn with_captured_logs(f: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.text()
}

#[test]
fn success_logs_start_and_stop() {
    let mut ran = false;
    let logs = with_captured_logs(|| {
        exception_safe("wcf", "OnRequest", || {
            ran = true;
            Ok::<(), TelemetryError>(())
        });
    });
    assert!(ran);
    assert!(logs.contains("execution started"));
    assert!(logs.contains("execution stopped"));
    assert!(!logs.contains("execution failed"));
    assert!(logs.contains("OnRequest"));
}

#[test]
fn error_is_swallowed_and_logged() {
    let logs = with_captured_logs(|| {
        exception_safe("wcf", "OnReply", || Err(TelemetryError::Channel("backend down".into())));
    });
    assert!(logs.contains("execution failed"));
    assert!(logs.contains("backend down"));
    assert!(!logs.contains("execution stopped"));
}

#[test]
fn panic_is_swallowed_and_logged() {
    let logs = with_captured_logs(|| {
        exception_safe("wcf", "OnFault", || -> Result<(), TelemetryError> { panic!("boom in hook") });
    });
    assert!(logs.contains("boom in hook"));
}

#[test]
fn locks_are_released_on_every_exit_path() {
    let shared = Arc::new(Mutex::new(0u32));

    let s = Arc::clone(&shared);
    exception_safe("m", "ok", move || {
        *s.lock().unwrap() += 1;
        Ok::<(), TelemetryError>(())
    });

    let s = Arc::clone(&shared);
    exception_safe("m", "err", move || {
        let mut guard = s.lock().unwrap();
        *guard += 1;
        Err(TelemetryError::InvalidArgument("after lock".into()))
    });

    // Mutex is poisoned by the panic but must be unlocked.
    let s = Arc::clone(&shared);
    exception_safe("m", "panic", move || -> Result<(), TelemetryError> {
        let _guard = s.lock().unwrap();
        panic!("while holding lock");
    });

    let value = match shared.try_lock() {
        Ok(g) => *g,
        Err(std::sync::TryLockError::Poisoned(p)) => *p.into_inner(),
        Err(std::sync::TryLockError::WouldBlock) => panic!("lock still held"),
    };
    assert_eq!(value, 2);
}
