//! Scripted stand-ins for the bus, delay and pen interrupt

use crate::irq::TouchIrq;
use core::convert::Infallible;
use embedded_hal::{
    delay::DelayNs,
    digital,
    spi::{self, ErrorKind, ErrorType, Operation, SpiDevice},
};

pub const CMD_X: u8 = 0x90;
pub const CMD_Y: u8 = 0xD0;
pub const CMD_Z1: u8 = 0xB0;
pub const CMD_Z2: u8 = 0xC0;

/// What the panel reports between two pressure checks
#[derive(Debug, Clone)]
pub struct Frame {
    pub z1: i32,
    pub z2: i32,
    /// X readings, cycled through
    pub x: Vec<i32>,
    /// Y readings, cycled through
    pub y: Vec<i32>,
}

impl Frame {
    pub fn released() -> Self {
        Self {
            z1: 0,
            z2: 0,
            x: vec![0],
            y: vec![0],
        }
    }

    pub fn touch(x: i32, y: i32) -> Self {
        Self {
            z1: 300,
            z2: 1200,
            x: vec![x],
            y: vec![y],
        }
    }

    pub fn samples(x: &[i32], y: &[i32]) -> Self {
        Self {
            z1: 300,
            z2: 1200,
            x: x.to_vec(),
            y: y.to_vec(),
        }
    }
}

/// Transfer failure injected by [`FakePanel::fail_at`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeBusError;

impl spi::Error for FakeBusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Resistive panel replaying a list of frames.
///
/// Every Z1 command starts the next frame, once the script runs out the panel
/// stays released.
#[derive(Debug, Default)]
pub struct FakePanel {
    frames: Vec<Frame>,
    next: usize,
    current: Option<Frame>,
    x_reads: usize,
    y_reads: usize,
    command: u8,
    fail_at: Option<usize>,
    pub commands: Vec<u8>,
}

impl FakePanel {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            ..Default::default()
        }
    }

    /// Fail the transaction carrying command number `n`, counted from zero
    pub fn fail_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    fn respond(&mut self) -> i32 {
        if self.command == CMD_Z1 {
            self.current = Some(
                self.frames
                    .get(self.next)
                    .cloned()
                    .unwrap_or_else(Frame::released),
            );
            self.next += 1;
            self.x_reads = 0;
            self.y_reads = 0;
        }
        let Some(frame) = &self.current else {
            return 0;
        };
        match self.command {
            CMD_Z1 => frame.z1,
            CMD_Z2 => frame.z2,
            CMD_X => {
                let v = frame.x[self.x_reads % frame.x.len()];
                self.x_reads += 1;
                v
            }
            CMD_Y => {
                let v = frame.y[self.y_reads % frame.y.len()];
                self.y_reads += 1;
                v
            }
            _ => 0,
        }
    }
}

impl ErrorType for FakePanel {
    type Error = FakeBusError;
}

impl SpiDevice<u8> for FakePanel {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            match op {
                Operation::Write(words) => {
                    if self.fail_at == Some(self.commands.len()) {
                        return Err(FakeBusError);
                    }
                    self.command = words[0];
                    self.commands.push(words[0]);
                }
                Operation::Read(words) => {
                    let value = ((self.respond() as u16) << 3).to_be_bytes();
                    words.copy_from_slice(&value);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Counts requested delay instead of sleeping
#[derive(Debug, Default)]
pub struct FakeDelay {
    pub elapsed_ns: u64,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}

#[derive(Debug)]
pub struct FakeIrq {
    pub pen_down: bool,
}

impl TouchIrq for FakeIrq {
    type Error = Infallible;

    fn is_pen_down(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pen_down)
    }
}

/// Pen interrupt line whose GPIO read always fails
#[derive(Debug)]
pub struct BrokenIrq;

impl TouchIrq for BrokenIrq {
    type Error = digital::ErrorKind;

    fn is_pen_down(&mut self) -> Result<bool, Self::Error> {
        Err(digital::ErrorKind::Other)
    }
}
