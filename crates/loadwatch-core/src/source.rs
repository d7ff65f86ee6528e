//! Load sources: where samples come from.
//!
//! The poll loop asks a [`LoadSource`] for the current normalized load
//! once per tick. [`ProcLoadSource`] reads the kernel's 1-minute load
//! average and divides it by the number of online CPUs, so a value of 1
//! means every CPU is busy. [`StubLoadSource`] replays scripted values for
//! tests and offline runs.

use std::num::NonZeroU32;
use std::path::PathBuf;

/// Errors that can occur while reading the load average.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The load-average file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file content was not a load average.
    #[error("malformed load average: {reason}")]
    Parse {
        /// What was wrong with the content.
        reason: String,
    },

    /// A scripted source has nothing to replay.
    #[error("load source exhausted")]
    Exhausted,
}

/// A source of normalized load-average readings.
pub trait LoadSource: Send {
    /// Read the current normalized 1-minute load average.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when no reading is available this tick.
    /// The poll loop logs the error and tries again next tick.
    fn read_load(&mut self) -> Result<f64, SourceError>;
}

/// Parse the 1-minute load average from `/proc/loadavg` content.
///
/// The file looks like `0.52 0.58 0.59 1/467 12345`; only the first field
/// is used.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] if the first field is missing, not a
/// number, negative, or not finite.
pub fn parse_loadavg(contents: &str) -> Result<f64, SourceError> {
    let field = contents
        .split_whitespace()
        .next()
        .ok_or_else(|| SourceError::Parse {
            reason: "empty load average file".to_owned(),
        })?;
    let load: f64 = field.parse().map_err(|e| SourceError::Parse {
        reason: format!("{field:?}: {e}"),
    })?;
    if !load.is_finite() || load < 0.0 {
        return Err(SourceError::Parse {
            reason: format!("load average out of range: {load}"),
        });
    }
    Ok(load)
}

/// Number of CPUs available to this process, at least 1.
pub fn online_cpus() -> NonZeroU32 {
    std::thread::available_parallelism()
        .ok()
        .and_then(|n| u32::try_from(n.get()).ok())
        .and_then(NonZeroU32::new)
        .unwrap_or(NonZeroU32::MIN)
}

/// Reads the 1-minute load average from a `loadavg` file.
#[derive(Debug, Clone)]
pub struct ProcLoadSource {
    path: PathBuf,
    cpus: NonZeroU32,
}

impl ProcLoadSource {
    /// Read from `path`, normalizing by the online CPU count.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_cpus(path, online_cpus())
    }

    /// Read from `path`, normalizing by an explicit CPU count.
    pub fn with_cpus(path: impl Into<PathBuf>, cpus: NonZeroU32) -> Self {
        Self {
            path: path.into(),
            cpus,
        }
    }

    /// CPU count used for normalization.
    pub const fn cpus(&self) -> NonZeroU32 {
        self.cpus
    }
}

impl LoadSource for ProcLoadSource {
    fn read_load(&mut self) -> Result<f64, SourceError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let load = parse_loadavg(&contents)?;
        Ok(load / f64::from(self.cpus.get()))
    }
}

/// Replays a fixed list of readings.
///
/// After the last value the source either starts over (`cycle`) or
/// keeps returning [`SourceError::Exhausted`].
#[derive(Debug, Clone, Default)]
pub struct StubLoadSource {
    values: Vec<f64>,
    next: usize,
    cycle: bool,
}

impl StubLoadSource {
    /// Replay `values` once.
    pub const fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            next: 0,
            cycle: false,
        }
    }

    /// Replay `values` forever.
    pub const fn cycling(values: Vec<f64>) -> Self {
        Self {
            values,
            next: 0,
            cycle: true,
        }
    }

    /// Always return `value`.
    pub fn constant(value: f64) -> Self {
        Self::cycling(vec![value])
    }
}

impl LoadSource for StubLoadSource {
    fn read_load(&mut self) -> Result<f64, SourceError> {
        if self.cycle && self.next >= self.values.len() {
            self.next = 0;
        }
        let value = self
            .values
            .get(self.next)
            .copied()
            .ok_or(SourceError::Exhausted)?;
        self.next = self.next.saturating_add(1);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn parse_first_field() {
        let load = parse_loadavg("0.52 0.58 0.59 1/467 12345\n");
        assert!(matches!(load, Ok(v) if (v - 0.52).abs() < f64::EPSILON));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(parse_loadavg(""), Err(SourceError::Parse { .. })));
        assert!(matches!(parse_loadavg("abc 1 2"), Err(SourceError::Parse { .. })));
        assert!(matches!(parse_loadavg("-1.0 1 2"), Err(SourceError::Parse { .. })));
        assert!(matches!(parse_loadavg("NaN 1 2"), Err(SourceError::Parse { .. })));
    }

    #[test]
    fn proc_source_normalizes_by_cpu_count() {
        let path = std::env::temp_dir().join(format!("loadwatch-loadavg-{}", std::process::id()));
        let written = std::fs::File::create(&path)
            .and_then(|mut f| f.write_all(b"3.00 2.00 1.00 2/300 4242\n"));
        assert!(written.is_ok());

        let cpus = NonZeroU32::new(4).unwrap_or(NonZeroU32::MIN);
        let mut source = ProcLoadSource::with_cpus(&path, cpus);
        assert_eq!(source.cpus().get(), 4);
        let load = source.read_load();
        assert!(matches!(load, Ok(v) if (v - 0.75).abs() < f64::EPSILON));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn proc_source_missing_file() {
        let mut source = ProcLoadSource::new("/nonexistent/loadavg");
        assert!(matches!(source.read_load(), Err(SourceError::Io { .. })));
        assert!(source.cpus().get() >= 1);
    }

    #[test]
    fn stub_replays_then_exhausts() {
        let mut source = StubLoadSource::new(vec![0.5, 2.0]);
        assert!(matches!(source.read_load(), Ok(v) if (v - 0.5).abs() < f64::EPSILON));
        assert!(matches!(source.read_load(), Ok(v) if (v - 2.0).abs() < f64::EPSILON));
        assert!(matches!(source.read_load(), Err(SourceError::Exhausted)));
    }

    #[test]
    fn stub_cycles() {
        let mut source = StubLoadSource::cycling(vec![1.0, 3.0]);
        let values: Vec<f64> = (0..5).filter_map(|_| source.read_load().ok()).collect();
        assert_eq!(values.len(), 5);
        assert!((values.iter().sum::<f64>() - 9.0).abs() < f64::EPSILON);
        assert!(StubLoadSource::default().read_load().is_err());
        assert!(StubLoadSource::constant(0.3).read_load().is_ok());
    }
}
