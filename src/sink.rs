use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::Vector3;

/// Destination for the positions the engines sample once per simulated
/// minute. File naming, formatting, and placement live entirely behind this
/// trait; the engines only know how to record and close.
pub trait SampleSink {
    /// Accepts one sample: which body, elapsed simulated seconds, and the
    /// body's position at that instant. Samples for a given body always
    /// arrive in chronological order.
    fn record(&mut self, body: usize, seconds: u64, position: &Vector3<f64>) -> Result<()>;

    /// Flushes and releases the destination. Called once, after the final
    /// sample.
    fn close(&mut self) -> Result<()>;
}

/// Writes every sample it receives as one `x, y, z,` CSV row.
///
/// Used one-per-body: the threaded engine moves one of these into each
/// worker, and `BodyFileSinks` routes the single-threaded engine's
/// interleaved samples to the right file.
#[derive(Debug)]
pub struct CsvFileSink {
    writer: BufWriter<File>,
}

impl CsvFileSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("could not create output file {}", path.display()))?;
        Ok(CsvFileSink {
            writer: BufWriter::new(file),
        })
    }
}

impl SampleSink for CsvFileSink {
    fn record(&mut self, _body: usize, _seconds: u64, position: &Vector3<f64>) -> Result<()> {
        writeln!(
            self.writer,
            "{:.10e}, {:.10e}, {:.10e},",
            position.x, position.y, position.z
        )?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One `<body name>.csv` file per body, indexed in body-list order.
#[derive(Debug)]
pub struct BodyFileSinks {
    sinks: Vec<CsvFileSink>,
}

impl BodyFileSinks {
    /// Opens one CSV file per name under `dir`.
    pub fn create(dir: impl AsRef<Path>, names: &[String]) -> Result<Self> {
        let dir = dir.as_ref();
        let sinks = names
            .iter()
            .map(|name| CsvFileSink::create(dir.join(format!("{name}.csv"))))
            .collect::<Result<Vec<_>>>()?;
        Ok(BodyFileSinks { sinks })
    }

    /// Splits into per-body sinks for the threaded engine, which hands each
    /// worker ownership of its own file.
    pub fn into_per_body(self) -> Vec<CsvFileSink> {
        self.sinks
    }
}

impl SampleSink for BodyFileSinks {
    fn record(&mut self, body: usize, seconds: u64, position: &Vector3<f64>) -> Result<()> {
        self.sinks[body].record(body, seconds, position)
    }

    fn close(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.close()?;
        }
        Ok(())
    }
}

/// Collects samples in memory. Mostly useful for tests and for callers that
/// post-process trajectories instead of writing files.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub body: usize,
    pub seconds: u64,
    pub position: Vector3<f64>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }
}

impl SampleSink for MemorySink {
    fn record(&mut self, body: usize, seconds: u64, position: &Vector3<f64>) -> Result<()> {
        self.samples.push(Sample {
            body,
            seconds,
            position: *position,
        });
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
