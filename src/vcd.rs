//! A [`Recorder`] producing Value Change Dump text.
//!
//! The header (timescale, scopes and variable declarations) is written at the
//! first sample and buffered like any other output, so the first drain after the first sample yields a
//! complete, parseable file prefix. Every later drain extends it.

use super::*;


use std::collections::BTreeMap;
use std::fmt::Write;

/// One traced piece of storage. Several variables may share a slot.
#[derive(Debug)]
struct Slot {
    handle: Handle,
    width: Width,
    shortname: String,
    last: Option<Value>,
}

#[derive(Debug)]
struct Var {
    name: String,
    width: Width,
    shortname: String,
}

#[derive(Debug, Default)]
struct Mod {
    name: String,
    vars: Vec<Var>,
    mods: BTreeMap<String, Mod>,
}

#[derive(Debug, Default)]
pub struct VcdWriter {
    buffer: String,
    top: Mod,
    slots: Vec<Slot>,
    slot_by_handle: BTreeMap<Handle, usize>,
    timescale: Option<Timescale>,
    streaming: bool,
    last_time: Option<u64>,
}

/// Base-94 identifier over the printable characters `!` to `~`.
fn shortname(i: usize) -> String {
    let mut i = i;
    let mut shortname = Vec::new();

    loop {
        shortname.push(((i % 94) + 33) as u8);
        i /= 94;
        if i == 0 {
            break;
        }
    }

    String::from_utf8_lossy(shortname.as_slice()).into()
}

impl VcdWriter {
    pub fn new() -> VcdWriter {
        VcdWriter::default()
    }

    /// Number of distinct identifiers being traced.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Every path sharing a handle must agree on its width.
    fn check_width(&self, widths: &mut BTreeMap<Handle, Width>, path: &Path, handle: Handle, width: Width) -> Result<(), TraceError> {
        let existing = match self.slot_by_handle.get(&handle) {
            Some(slot_id) => Some(self.slots[*slot_id].width),
            None => widths.get(&handle).copied(),
        };
        match existing {
            Some(existing) if existing != width => Err(TraceError::WidthMismatch(path.clone(), existing, width)),
            Some(_) => Ok(()),
            None => {
                widths.insert(handle, width);
                Ok(())
            },
        }
    }

    fn shortname_for(&mut self, handle: Handle, width: Width) -> String {
        if let Some(slot_id) = self.slot_by_handle.get(&handle) {
            return self.slots[*slot_id].shortname.clone();
        }

        let slot_id = self.slots.len();
        let shortname = shortname(slot_id);
        self.slots.push(Slot {
            handle,
            width,
            shortname: shortname.clone(),
            last: None,
        });
        self.slot_by_handle.insert(handle, slot_id);
        shortname
    }

    fn declare(&mut self, path: &Path, name: String, handle: Handle, width: Width) {
        let shortname = self.shortname_for(handle, width);
        let mut module = &mut self.top;
        for segment in path.parent().segments() {
            module = module.mods.entry(segment.to_string()).or_insert_with(|| Mod {
                name: segment.to_string(),
                ..Mod::default()
            });
        }
        module.vars.push(Var { name, width, shortname });
    }

    fn write_definitions(&self, f: &mut dyn Write) -> std::fmt::Result {
        if let Some(timescale) = self.timescale {
            writeln!(f, "$timescale {timescale} $end")?;
        }
        for var in &self.top.vars {
            write_var(f, var, "")?;
        }
        for submodule in self.top.mods.values() {
            write_module_definitions(f, submodule, "")?;
        }
        writeln!(f, "$enddefinitions $end")?;
        Ok(())
    }

    fn write_changes(&mut self, f: &mut dyn Write, probe: &dyn Probe, all: bool) -> std::fmt::Result {
        for slot in self.slots.iter_mut() {
            let value = probe.peek(slot.handle);
            if all || slot.last.as_ref() != Some(&value) {
                write_value(f, &value, slot.width, &slot.shortname)?;
                slot.last = Some(value);
            }
        }
        Ok(())
    }
}

fn write_var(f: &mut dyn Write, var: &Var, indent: &str) -> std::fmt::Result {
    writeln!(f, "{indent}$var wire {} {} {} $end", var.width, var.shortname, var.name)
}

fn write_module_definitions(f: &mut dyn Write, module: &Mod, indent: &str) -> std::fmt::Result {
    writeln!(f, "{indent}$scope module {} $end", module.name)?;

    let mut new_indent = String::from(indent);
    new_indent.push_str("    ");
    for var in &module.vars {
        write_var(f, var, &new_indent)?;
    }

    for submodule in module.mods.values() {
        write_module_definitions(f, submodule, &new_indent)?;
    }

    writeln!(f, "{indent}$upscope $end")?;
    Ok(())
}

fn write_value(f: &mut dyn Write, value: &Value, width: Width, shortname: &str) -> std::fmt::Result {
    if width == 1 {
        writeln!(f, "{}{shortname}", value.to_bit_string(1))
    } else if value.is_x() {
        writeln!(f, "bx {shortname}")
    } else {
        writeln!(f, "b{} {shortname}", value.to_bit_string(width))
    }
}

impl Recorder for VcdWriter {
    fn timescale(&mut self, timescale: Timescale) -> Result<(), TraceError> {
        if self.streaming {
            return Err(TraceError::AlreadyStreaming);
        }
        self.timescale = Some(timescale);
        Ok(())
    }

    fn add(&mut self, items: &DebugItems, filter: Filter) -> Result<(), TraceError> {
        if self.streaming {
            return Err(TraceError::AlreadyStreaming);
        }

        let mut declarations = vec![];
        for (path, item) in items.iter() {
            if !filter.accepts(item) {
                continue;
            }
            match item.kind {
                DebugKind::Memory { depth } => {
                    for index in 0..depth {
                        let handle = Handle::element(item.handle.signal, index);
                        declarations.push((path, format!("{}[{index}]", path.name()), handle, item.width));
                    }
                },
                _ => declarations.push((path, path.name().to_string(), item.handle, item.width)),
            }
        }

        let mut widths = BTreeMap::new();
        for (path, _name, handle, width) in &declarations {
            self.check_width(&mut widths, path, *handle, *width)?;
        }

        for (path, name, handle, width) in declarations {
            self.declare(path, name, handle, width);
        }
        Ok(())
    }

    fn sample(&mut self, time: u64, probe: &dyn Probe) -> Result<(), TraceError> {
        if let Some(last_time) = self.last_time {
            if time < last_time {
                return Err(TraceError::TimeRewound(last_time, time));
            }
        }

        let mut buffer = std::mem::take(&mut self.buffer);
        let first_sample = !self.streaming;
        if first_sample {
            self.write_definitions(&mut buffer)?;
            self.streaming = true;
        }
        writeln!(buffer, "#{time}")?;
        self.write_changes(&mut buffer, probe, first_sample)?;
        self.buffer = buffer;

        self.last_time = Some(time);
        Ok(())
    }

    fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer).into_bytes()
    }

    fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
