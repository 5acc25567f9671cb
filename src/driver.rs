//! The cycle driver: toggles the clock of a [`Model`], steps it, samples it
//! into a [`Recorder`] and streams the recorded trace into a sink.
//!
//! A run goes through these phases:
//!
//! ```text
//! Priming --step, sample(0), step--> Primed
//! Primed | Flushed --clk=0--> ClockLow --step--> SteppedLow --sample(2c)--> SampledLow
//!   --clk=1--> ClockHigh --step--> SteppedHigh --sample(2c+1)--> SampledHigh --drain--> Flushed
//! ```
//!
//! The priming sample and the first clocked sample share timestamp 0.
//! Nothing reaches the sink before the first cycle's drain.

use super::*;
use log::*;

#[cfg(test)]
mod tests;

use std::io::Write;
use std::path::PathBuf;

pub const REFERENCE_CYCLES: u64 = 1000;
pub const REFERENCE_OUTPUT: &str = "waves_cxxrtl.vcd";

/// Every cycle needs two timestamps, the last one being `2 * cycles - 1`.
pub const MAX_CYCLES: u64 = u64::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Priming,
    Primed,
    ClockLow,
    SteppedLow,
    SampledLow,
    ClockHigh,
    SteppedHigh,
    SampledHigh,
    Flushed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub samples: u64,
    pub drains: u64,
    pub bytes_written: u64,
}

#[derive(Debug, Clone)]
pub struct CycleDriver {
    cycles: u64,
    timescale: Timescale,
    filter: Filter,
}

impl Default for CycleDriver {
    fn default() -> CycleDriver {
        CycleDriver {
            cycles: REFERENCE_CYCLES,
            timescale: Timescale::default(),
            filter: Filter::WithoutMemories,
        }
    }
}

/// The append-only destination of the trace.
/// Every append is flushed so a crash leaves a valid prefix behind.
struct Sink<W: Write> {
    inner: W,
    path: Option<PathBuf>,
    bytes_written: u64,
}

impl<W: Write> Sink<W> {
    fn new(inner: W, path: Option<PathBuf>) -> Sink<W> {
        Sink {
            inner,
            path,
            bytes_written: 0,
        }
    }

    fn append(&mut self, bytes: &[u8]) -> Result<(), TraceError> {
        self.inner.write_all(bytes).map_err(|e| TraceError::Io(self.path.clone(), e))?;
        self.inner.flush().map_err(|e| TraceError::Io(self.path.clone(), e))?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

struct Run<'a, M: Model, R: Recorder, W: Write> {
    model: M,
    recorder: R,
    sink: &'a mut Sink<W>,
    phase: Phase,
    cycle: u64,
    summary: RunSummary,
}

impl<'a, M: Model, R: Recorder, W: Write> Run<'a, M, R, W> {
    fn enter(&mut self, phase: Phase) {
        trace!("cycle {}: {:?} -> {:?}", self.cycle, self.phase, phase);
        self.phase = phase;
    }

    fn set_clock(&mut self, level: bool) {
        self.model.set_clock(level);
        self.enter(if level { Phase::ClockHigh } else { Phase::ClockLow });
    }

    fn step(&mut self) -> Result<(), TraceError> {
        let (cycle, phase) = (self.cycle, self.phase);
        self.model.step().map_err(|fault| TraceError::Model(cycle, phase, fault))
    }

    fn sample(&mut self, time: u64) -> Result<(), TraceError> {
        self.recorder.sample(time, &self.model)?;
        self.summary.samples += 1;
        Ok(())
    }

    fn drain(&mut self) -> Result<(), TraceError> {
        if self.recorder.is_empty() {
            warn!("Nothing recorded in cycle {}", self.cycle);
        }
        let bytes = self.recorder.drain();
        self.sink.append(&bytes)?;
        self.summary.drains += 1;
        self.enter(Phase::Flushed);
        Ok(())
    }

    fn prime(&mut self) -> Result<(), TraceError> {
        debug!("Priming model");
        self.step()?;
        self.sample(0)?;
        self.step()?;
        self.enter(Phase::Primed);
        Ok(())
    }

    fn clock_cycle(&mut self, cycle: u64) -> Result<(), TraceError> {
        self.cycle = cycle;

        self.set_clock(false);
        self.step()?;
        self.enter(Phase::SteppedLow);
        self.sample(2 * cycle)?;
        self.enter(Phase::SampledLow);

        self.set_clock(true);
        self.step()?;
        self.enter(Phase::SteppedHigh);
        self.sample(2 * cycle + 1)?;
        self.enter(Phase::SampledHigh);

        self.drain()?;
        self.summary.cycles += 1;
        Ok(())
    }
}

impl CycleDriver {
    pub fn new() -> CycleDriver {
        CycleDriver::default()
    }

    pub fn with_cycles(mut self, cycles: u64) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn with_timescale(mut self, timescale: Timescale) -> Self {
        self.timescale = timescale;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Drive `model` for the configured number of cycles, appending the
    /// recorded trace to `sink` once per cycle.
    pub fn run<M: Model, R: Recorder, W: Write>(&self, model: M, recorder: R, sink: &mut W) -> Result<RunSummary, TraceError> {
        let mut sink = Sink::new(sink, None);
        self.run_with_sink(model, recorder, &mut sink)
    }

    /// Like [`CycleDriver::run`], but opens (truncating) the file at `path`
    /// first. Nothing is simulated if the file cannot be created.
    pub fn run_to_file<M: Model, R: Recorder, P: Into<PathBuf>>(&self, model: M, recorder: R, path: P) -> Result<RunSummary, TraceError> {
        let path: PathBuf = path.into();
        let file = std::fs::File::create(&path).map_err(|e| TraceError::Io(Some(path.clone()), e))?;
        info!("Writing waves to {}", path.display());
        let mut sink = Sink::new(file, Some(path));
        self.run_with_sink(model, recorder, &mut sink)
    }

    fn run_with_sink<M: Model, R: Recorder, W: Write>(&self, model: M, mut recorder: R, sink: &mut Sink<W>) -> Result<RunSummary, TraceError> {
        if self.cycles > MAX_CYCLES {
            return Err(TraceError::TooManyCycles(self.cycles));
        }

        let items = model.debug_items();
        info!("Running {} cycles at {} per tick, {} debug items", self.cycles, self.timescale, items.len());

        recorder.timescale(self.timescale)?;
        recorder.add(&items, self.filter)?;

        let mut run = Run {
            model,
            recorder,
            sink,
            phase: Phase::Priming,
            cycle: 0,
            summary: RunSummary::default(),
        };

        run.prime()?;
        for cycle in 0..self.cycles {
            run.clock_cycle(cycle)?;
        }

        run.summary.bytes_written = run.sink.bytes_written;
        info!(
            "Finished {} cycles: {} samples, {} bytes written",
            run.summary.cycles,
            run.summary.samples,
            run.summary.bytes_written,
        );
        Ok(run.summary)
    }
}
