//! Subscriber setup: stdout plus an optional per-artifact log file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

/// Log file that can be swapped between realisations.
///
/// Events are dropped while no file is open.
#[derive(Clone, Default)]
pub struct LogMirror(Arc<Mutex<Option<File>>>);

impl LogMirror {
    /// Start mirroring into `path`, replacing the previous file.
    pub fn open(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        *self.lock()? = Some(file);
        Ok(())
    }

    /// Flush and stop mirroring.
    pub fn close(&self) -> io::Result<()> {
        if let Some(mut file) = self.lock()?.take() {
            file.flush()?;
        }
        Ok(())
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Option<File>>> {
        self.0.lock().map_err(|_| io::Error::other("log mirror lock poisoned"))
    }
}

pub struct MirrorWriter(LogMirror);

impl Write for MirrorWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock()?.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.lock()?.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogMirror {
    type Writer = MirrorWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MirrorWriter(self.clone())
    }
}

/// Install the global subscriber.  `RUST_LOG` overrides the `info` default.
pub fn init(mirror: Option<LogMirror>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file = mirror.map(|m| tracing_subscriber::fmt::layer().with_ansi(false).with_writer(m));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file)
        .init();
}
