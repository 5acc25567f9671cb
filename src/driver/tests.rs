use crate::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Timescale(Timescale),
    Add(Filter),
    SetClock(bool),
    Step,
    Sample(u64, Option<bool>),
    /// Drained bytes, and whether the buffer was empty right after.
    Drain(Vec<u8>, bool),
}

type Log = Rc<RefCell<Vec<Event>>>;

struct FakeModel {
    log: Log,
    clk: bool,
    steps: u64,
    fail_at_step: Option<u64>,
}

impl FakeModel {
    fn new(log: &Log) -> FakeModel {
        FakeModel {
            log: log.clone(),
            clk: false,
            steps: 0,
            fail_at_step: None,
        }
    }
}

impl Probe for FakeModel {
    fn peek(&self, handle: Handle) -> Value {
        match handle.signal {
            0 => self.clk.into(),
            1 => Value::Word(16, self.steps),
            _ => Value::X,
        }
    }
}

impl Model for FakeModel {
    fn set_clock(&mut self, level: bool) {
        self.log.borrow_mut().push(Event::SetClock(level));
        self.clk = level;
    }

    fn step(&mut self) -> Result<(), ModelFault> {
        self.steps += 1;
        if Some(self.steps) == self.fail_at_step {
            return Err(ModelFault::Other("boom".to_string()));
        }
        self.log.borrow_mut().push(Event::Step);
        Ok(())
    }

    fn debug_items(&self) -> DebugItems {
        let mut items = DebugItems::new();
        items.add("top.clk", DebugItem::new(DebugKind::Input, 1, 0));
        items.add("top.steps", DebugItem::new(DebugKind::Reg, 16, 1));
        items.add("top.mem", DebugItem::new(DebugKind::Memory { depth: 4 }, 8, 2));
        items
    }
}

/// Writes `<time>;` for every sample.
struct FakeRecorder {
    log: Log,
    buffer: Vec<u8>,
}

impl FakeRecorder {
    fn new(log: &Log) -> FakeRecorder {
        FakeRecorder {
            log: log.clone(),
            buffer: vec![],
        }
    }
}

impl Recorder for FakeRecorder {
    fn timescale(&mut self, timescale: Timescale) -> Result<(), TraceError> {
        self.log.borrow_mut().push(Event::Timescale(timescale));
        Ok(())
    }

    fn add(&mut self, _items: &DebugItems, filter: Filter) -> Result<(), TraceError> {
        self.log.borrow_mut().push(Event::Add(filter));
        Ok(())
    }

    fn sample(&mut self, time: u64, probe: &dyn Probe) -> Result<(), TraceError> {
        let clk = probe.peek(Handle::new(0)).to_bool();
        self.log.borrow_mut().push(Event::Sample(time, clk));
        self.buffer.extend_from_slice(format!("{time};").as_bytes());
        Ok(())
    }

    fn drain(&mut self) -> Vec<u8> {
        let bytes = std::mem::take(&mut self.buffer);
        self.log.borrow_mut().push(Event::Drain(bytes.clone(), self.is_empty()));
        bytes
    }

    fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn run_fake(cycles: u64) -> (Vec<Event>, Vec<u8>, RunSummary) {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let mut sink: Vec<u8> = vec![];
    let driver = CycleDriver::new().with_cycles(cycles);
    let summary = driver.run(FakeModel::new(&log), FakeRecorder::new(&log), &mut sink).unwrap();
    let events = log.borrow().clone();
    (events, sink, summary)
}

fn sample_times(events: &[Event]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Sample(time, _clk) => Some(*time),
            _ => None,
        })
        .collect()
}

fn drains(events: &[Event]) -> Vec<Vec<u8>> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Drain(bytes, _empty_after) => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn sample_timestamps() {
    for cycles in [0, 1, 2, 7] {
        let (events, _sink, summary) = run_fake(cycles);
        let mut expected = vec![0];
        expected.extend(0..2 * cycles);
        assert_eq!(sample_times(&events), expected);
        assert_eq!(summary.samples, 2 * cycles + 1);
        assert_eq!(summary.cycles, cycles);
        assert!(sample_times(&events).iter().all(|time| *time < 2 * cycles.max(1)));
    }
}

#[test]
fn configures_recorder_before_sampling() {
    let (events, _sink, _summary) = run_fake(1);
    assert_eq!(events[0], Event::Timescale(Timescale::default()));
    assert_eq!(events[1], Event::Add(Filter::WithoutMemories));
}

#[test]
fn two_unclocked_priming_steps() {
    let (events, _sink, _summary) = run_fake(3);
    let first_clock = events.iter().position(|event| matches!(event, Event::SetClock(_))).unwrap();
    assert_eq!(
        &events[2..first_clock],
        &[Event::Step, Event::Sample(0, Some(false)), Event::Step],
    );
}

#[test]
fn clock_alternates() {
    let (events, _sink, _summary) = run_fake(5);
    let clocked: Vec<Option<bool>> = events
        .iter()
        .filter_map(|event| match event {
            Event::Sample(_time, clk) => Some(*clk),
            _ => None,
        })
        .skip(1)
        .collect();
    assert_eq!(clocked.len(), 10);
    for (i, clk) in clocked.iter().enumerate() {
        assert_eq!(*clk, Some(i % 2 == 1));
    }
}

#[test]
fn per_cycle_order() {
    let (events, _sink, _summary) = run_fake(1);
    assert_eq!(
        &events[5..],
        &[
            Event::SetClock(false),
            Event::Step,
            Event::Sample(0, Some(false)),
            Event::SetClock(true),
            Event::Step,
            Event::Sample(1, Some(true)),
            Event::Drain(b"0;0;1;".to_vec(), true),
        ],
    );
}

#[test]
fn two_cycle_scenario() {
    let (events, sink, summary) = run_fake(2);
    assert_eq!(sample_times(&events), vec![0, 0, 1, 2, 3]);
    assert_eq!(drains(&events), vec![b"0;0;1;".to_vec(), b"2;3;".to_vec()]);
    assert_eq!(sink, b"0;0;1;2;3;".to_vec());
    assert_eq!(summary.drains, 2);
    assert_eq!(summary.bytes_written, sink.len() as u64);
}

#[test]
fn sink_is_concatenation_of_drains() {
    let (events, sink, summary) = run_fake(50);
    let drains = drains(&events);
    assert_eq!(drains.len(), 50);
    assert!(drains.iter().all(|bytes| !bytes.is_empty()));
    assert_eq!(sink, drains.concat());
    assert_eq!(summary.drains, 50);
}

#[test]
fn buffer_is_empty_after_every_drain() {
    let (events, _sink, _summary) = run_fake(20);
    let drains: Vec<(usize, bool)> = events
        .iter()
        .filter_map(|event| match event {
            Event::Drain(bytes, empty_after) => Some((bytes.len(), *empty_after)),
            _ => None,
        })
        .collect();
    assert_eq!(drains.len(), 20);
    for (len, empty_after) in drains {
        assert!(len > 0);
        assert!(empty_after);
    }
}

#[test]
fn rejects_unrepresentable_cycle_counts() {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let mut sink: Vec<u8> = vec![];
    let result = CycleDriver::new()
        .with_cycles(MAX_CYCLES + 1)
        .run(FakeModel::new(&log), FakeRecorder::new(&log), &mut sink);
    assert!(matches!(result, Err(TraceError::TooManyCycles(cycles)) if cycles == MAX_CYCLES + 1));
    assert!(log.borrow().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn zero_cycles_writes_nothing() {
    let (events, sink, summary) = run_fake(0);
    assert!(drains(&events).is_empty());
    assert!(sink.is_empty());
    assert_eq!(summary.samples, 1);
}

#[test]
fn model_fault_keeps_flushed_prefix() {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let mut model = FakeModel::new(&log);
    // two priming steps and two steps for cycle 0, then the low step of cycle 1
    model.fail_at_step = Some(5);

    let mut sink: Vec<u8> = vec![];
    let result = CycleDriver::new().with_cycles(10).run(model, FakeRecorder::new(&log), &mut sink);

    match result {
        Err(TraceError::Model(1, Phase::ClockLow, ModelFault::Other(message))) => assert_eq!(message, "boom"),
        other => panic!("Unexpected result: {other:?}"),
    }
    assert_eq!(sink, b"0;0;1;".to_vec());
}

#[test]
fn recorder_filter_is_configurable() {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let mut sink: Vec<u8> = vec![];
    let driver = CycleDriver::new().with_cycles(1).with_filter(Filter::All);
    driver.run(FakeModel::new(&log), FakeRecorder::new(&log), &mut sink).unwrap();
    assert_eq!(log.borrow()[1], Event::Add(Filter::All));
}

#[test]
fn vcd_trace_of_fake_model() {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let mut sink: Vec<u8> = vec![];
    let summary = CycleDriver::new()
        .with_cycles(2)
        .run(FakeModel::new(&log), VcdWriter::new(), &mut sink)
        .unwrap();
    let text = String::from_utf8(sink).unwrap();

    assert!(text.starts_with("$timescale 1 us $end\n"));
    assert!(!text.contains("mem"));
    let times: Vec<&str> = text.lines().filter(|line| line.starts_with('#')).collect();
    assert_eq!(times, vec!["#0", "#0", "#1", "#2", "#3"]);
    assert_eq!(summary.bytes_written, text.len() as u64);

    // one priming step, then the second priming step and the falling edge step
    assert!(text.contains("#0\n0!\nb0000000000000001 \"\n#0\nb0000000000000011 \"\n"));
}

#[test]
fn unopenable_sink_aborts_before_stepping() {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("no-such-dir").join("waves.vcd");
    let result = CycleDriver::new().run_to_file(FakeModel::new(&log), FakeRecorder::new(&log), path.clone());

    match result {
        Err(TraceError::Io(Some(error_path), _error)) => assert_eq!(error_path, path),
        other => panic!("Unexpected result: {other:?}"),
    }
    assert!(log.borrow().is_empty());
}
