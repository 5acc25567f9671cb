use super::*;

/// Accumulates waveform samples of a model into an in-memory buffer.
///
/// Configuration (`timescale` and `add`) happens before the first `sample`.
/// The owner of the recorder moves the buffered bytes to durable storage with
/// `drain`, after which the buffer is empty.
pub trait Recorder {
    fn timescale(&mut self, timescale: Timescale) -> Result<(), TraceError>;
    fn add(&mut self, items: &DebugItems, filter: Filter) -> Result<(), TraceError>;
    fn sample(&mut self, time: u64, probe: &dyn Probe) -> Result<(), TraceError>;
    fn drain(&mut self) -> Vec<u8>;
    fn is_empty(&self) -> bool;
}

/// Which debug items a recorder should observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    All,
    #[default]
    WithoutMemories,
}

impl Filter {
    pub fn accepts(&self, item: &DebugItem) -> bool {
        match self {
            Filter::All => true,
            Filter::WithoutMemories => !item.is_memory(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    S,
    Ms,
    Us,
    Ns,
    Ps,
    Fs,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }
}

impl std::str::FromStr for TimeUnit {
    type Err = TraceError;

    fn from_str(unit: &str) -> Result<TimeUnit, TraceError> {
        match unit {
            "s" => Ok(TimeUnit::S),
            "ms" => Ok(TimeUnit::Ms),
            "us" => Ok(TimeUnit::Us),
            "ns" => Ok(TimeUnit::Ns),
            "ps" => Ok(TimeUnit::Ps),
            "fs" => Ok(TimeUnit::Fs),
            _ => Err(TraceError::InvalidTimescale(unit.to_string())),
        }
    }
}

/// The real time covered by one tick of the logical timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timescale {
    magnitude: u32,
    unit: TimeUnit,
}

impl Timescale {
    pub fn new(magnitude: u32, unit: TimeUnit) -> Result<Timescale, TraceError> {
        match magnitude {
            1 | 10 | 100 => Ok(Timescale { magnitude, unit }),
            _ => Err(TraceError::InvalidTimescale(format!("{magnitude} {}", unit.as_str()))),
        }
    }

    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }
}

impl Default for Timescale {
    fn default() -> Timescale {
        Timescale { magnitude: 1, unit: TimeUnit::Us }
    }
}

impl std::fmt::Display for Timescale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit.as_str())
    }
}

impl std::str::FromStr for Timescale {
    type Err = TraceError;

    /// Parses `1us`, `10 ns`, `100ps` and the like.
    fn from_str(s: &str) -> Result<Timescale, TraceError> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (magnitude, unit) = s.split_at(split);
        let magnitude: u32 = magnitude.parse().map_err(|_| TraceError::InvalidTimescale(s.to_string()))?;
        let unit: TimeUnit = unit.trim().parse().map_err(|_| TraceError::InvalidTimescale(s.to_string()))?;
        Timescale::new(magnitude, unit)
    }
}

#[test]
fn parse_timescales() {
    let timescale: Timescale = "1us".parse().unwrap();
    assert_eq!(timescale, Timescale::default());
    assert_eq!(timescale.to_string(), "1 us");

    let timescale: Timescale = " 10 ns ".parse().unwrap();
    assert_eq!(timescale.magnitude(), 10);
    assert_eq!(timescale.unit(), TimeUnit::Ns);

    assert!("3us".parse::<Timescale>().is_err());
    assert!("1 parsec".parse::<Timescale>().is_err());
    assert!("us".parse::<Timescale>().is_err());
}
