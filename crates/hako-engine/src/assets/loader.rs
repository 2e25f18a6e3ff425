use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use crate::error::EngineError;

/// Where an asset's bytes come from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    Path(PathBuf),
    /// Bytes bundled into the binary or produced at runtime.
    Bytes(Vec<u8>),
}

impl AssetSource {
    fn read(self, name: &str) -> Result<Vec<u8>, EngineError> {
        match self {
            AssetSource::Path(path) => std::fs::read(&path).map_err(|e| EngineError::AssetLoad {
                name: name.to_owned(),
                reason: format!("{}: {e}", path.display()),
            }),
            AssetSource::Bytes(bytes) => Ok(bytes),
        }
    }
}

impl From<PathBuf> for AssetSource {
    fn from(path: PathBuf) -> Self {
        AssetSource::Path(path)
    }
}

impl From<&str> for AssetSource {
    fn from(path: &str) -> Self {
        AssetSource::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for AssetSource {
    fn from(bytes: Vec<u8>) -> Self {
        AssetSource::Bytes(bytes)
    }
}

/// Outcome of a `load_all` barrier.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: usize,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// One in-flight read + decode running on its own thread.
pub(crate) struct PendingLoad<T> {
    pub(crate) name: String,
    receiver: Receiver<Result<T, EngineError>>,
}

impl<T: Send + 'static> PendingLoad<T> {
    pub(crate) fn spawn(
        name: &str,
        source: AssetSource,
        decode: fn(&str, &[u8]) -> Result<T, EngineError>,
    ) -> Self {
        let (sender, receiver) = channel();
        let owned = name.to_owned();

        thread::spawn(move || {
            let result = source.read(&owned).and_then(|bytes| decode(&owned, &bytes));
            let _ = sender.send(result);
        });

        Self { name: name.to_owned(), receiver }
    }

    /// Blocks until the load settles.
    pub(crate) fn wait(self) -> (String, Result<T, EngineError>) {
        let result = self.receiver.recv().unwrap_or_else(|_| {
            Err(EngineError::AssetLoad {
                name: self.name.clone(),
                reason: "loader thread exited without a result".into(),
            })
        });
        (self.name, result)
    }
}

/// Settles every pending load, handing successes to `store`.
pub(crate) fn settle_all<T: Send + 'static>(
    pending: Vec<PendingLoad<T>>,
    kind: &str,
    mut store: impl FnMut(String, T),
) -> LoadReport {
    let mut report = LoadReport::default();
    for load in pending {
        match load.wait() {
            (name, Ok(asset)) => {
                store(name, asset);
                report.loaded += 1;
            }
            (name, Err(e)) => {
                log::error!("{kind} '{name}' failed to load: {e}");
                report.failed += 1;
            }
        }
    }
    if report.loaded + report.failed > 0 {
        log::info!("{kind} loads settled: {} loaded, {} failed", report.loaded, report.failed);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(_: &str, bytes: &[u8]) -> Result<usize, EngineError> {
        Ok(bytes.len())
    }

    #[test]
    fn bytes_source_decodes_on_worker() {
        let (name, result) = PendingLoad::spawn("blob", AssetSource::Bytes(vec![1, 2, 3]), length).wait();
        assert_eq!(name, "blob");
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn missing_file_is_reported_not_panicked() {
        let load = PendingLoad::spawn("ghost", AssetSource::from("/definitely/not/here.bin"), length);
        let mut stored = Vec::new();
        let report = settle_all(vec![load], "blob", |n, v| stored.push((n, v)));
        assert_eq!(report, LoadReport { loaded: 0, failed: 1 });
        assert!(stored.is_empty());
    }
}
