//! A small built-in model: a free-running 24-bit timer on `clk`, LEDs showing
//! the timer, and a 16-word ROM addressed by its low bits.

use super::*;

const TIMER_WIDTH: Width = 24;
const ROM_DEPTH: usize = 16;
const MAX_PASSES: usize = 8;

const CLK: SignalId = 0;
const TIMER: SignalId = 1;
const LED: SignalId = 2;
const ROM_ADDR: SignalId = 3;
const ROM_DATA: SignalId = 4;
const ROM: SignalId = 5;

#[derive(Debug, Clone)]
pub struct Blinky {
    clk: bool,
    prev_clk: bool,
    timer: u64,
    led: u64,
    rom_addr: u64,
    rom_data: u64,
    rom: [u16; ROM_DEPTH],
}

impl Default for Blinky {
    fn default() -> Blinky {
        let mut rom = [0; ROM_DEPTH];
        for (i, word) in rom.iter_mut().enumerate() {
            *word = (i as u16) * 0x1111;
        }

        Blinky {
            clk: false,
            prev_clk: false,
            timer: 0,
            led: 0,
            rom_addr: 0,
            rom_data: 0,
            rom,
        }
    }
}

impl Blinky {
    pub fn new() -> Blinky {
        Blinky::default()
    }

    /// Replace the ROM contents with big-endian 16-bit words from `data`.
    /// Missing bytes read as zero and extra bytes are ignored.
    pub fn with_rom(mut self, data: &[u8]) -> Blinky {
        for (i, word) in self.rom.iter_mut().enumerate() {
            let hi = data.get(2 * i).copied().unwrap_or(0) as u16;
            let lo = data.get(2 * i + 1).copied().unwrap_or(0) as u16;
            *word = hi << 8 | lo;
        }
        self
    }

    pub fn timer(&self) -> u64 {
        self.timer
    }

    /// One evaluation of every combinational signal. Returns whether anything changed.
    fn eval_comb(&mut self) -> bool {
        let led = (self.timer >> 4) & 0xff;
        let rom_addr = self.timer & 0xf;
        let rom_data = self.rom[self.rom_addr as usize] as u64;

        let changed = led != self.led || rom_addr != self.rom_addr || rom_data != self.rom_data;
        self.led = led;
        self.rom_addr = rom_addr;
        self.rom_data = rom_data;
        changed
    }
}

impl Probe for Blinky {
    fn peek(&self, handle: Handle) -> Value {
        match handle.signal {
            CLK => self.clk.into(),
            TIMER => Value::Word(TIMER_WIDTH, self.timer),
            LED => Value::Word(8, self.led),
            ROM_ADDR => Value::Word(4, self.rom_addr),
            ROM_DATA => Value::Word(16, self.rom_data),
            ROM => match self.rom.get(handle.index) {
                Some(word) => Value::Word(16, *word as u64),
                None => Value::X,
            },
            _ => Value::X,
        }
    }
}

impl Model for Blinky {
    fn set_clock(&mut self, level: bool) {
        self.clk = level;
    }

    fn step(&mut self) -> Result<(), ModelFault> {
        if self.clk && !self.prev_clk {
            self.timer = (self.timer + 1) & ((1 << TIMER_WIDTH) - 1);
        }
        self.prev_clk = self.clk;

        for _pass in 0..MAX_PASSES {
            if !self.eval_comb() {
                return Ok(());
            }
        }
        Err(ModelFault::Unsettled(MAX_PASSES))
    }

    fn debug_items(&self) -> DebugItems {
        let mut items = DebugItems::new();
        items.add("top.clk", DebugItem::new(DebugKind::Input, 1, CLK));
        items.add("top.timer", DebugItem::new(DebugKind::Reg, TIMER_WIDTH, TIMER));
        items.add("top.counter", DebugItem::new(DebugKind::Alias, TIMER_WIDTH, TIMER));
        items.add("top.led", DebugItem::new(DebugKind::Wire, 8, LED));
        items.add("top.rom_addr", DebugItem::new(DebugKind::Wire, 4, ROM_ADDR));
        items.add("top.rom_data", DebugItem::new(DebugKind::Wire, 16, ROM_DATA));
        items.add("top.rom", DebugItem::new(DebugKind::Memory { depth: ROM_DEPTH }, 16, ROM));
        items
    }
}
