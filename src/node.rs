//! The RPC call surface.
//!
//! Reads encode into the node's scratch buffer and return the encoded bytes.
//! Updates take the caller's bytes and return a status code: `0` on
//! success, or a negative [`Error::code`](crate::Error::code).

use hubpack::SerializedSize;

use crate::channel::Channel;
use crate::interrupt::{CompletionHandlers, Handler};
use crate::{adc, channel, dma, error, pit, sim, Peripherals, Result};

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

/// Scratch buffer size that fits the largest message.
pub const BUFFER_SIZE: usize = {
    let size = adc::Registers::MAX_SIZE;
    let size = max(size, pit::Registers::MAX_SIZE);
    let size = max(size, pit::TimerConfig::MAX_SIZE);
    let size = max(size, sim::Scgc6::MAX_SIZE);
    let size = max(size, sim::Scgc7::MAX_SIZE);
    let size = max(size, dma::Registers::MAX_SIZE);
    let size = max(size, channel::tcd::Tcd::MAX_SIZE);
    let size = max(size, channel::priority::Dchpri::MAX_SIZE);
    max(size, channel::mux::Chcfg::MAX_SIZE)
};

/// Owns the peripherals, the completion handlers, and one scratch buffer.
///
/// `CAPACITY` defaults to [`BUFFER_SIZE`]. A smaller buffer works for the
/// messages that fit, and reads of larger ones fail with
/// [`Error::CapacityExceeded`](crate::Error::CapacityExceeded).
pub struct Node<const CHANNELS: usize, const CAPACITY: usize = BUFFER_SIZE> {
    peripherals: Peripherals<CHANNELS>,
    handlers: CompletionHandlers<CHANNELS>,
    buffer: [u8; CAPACITY],
}

impl<const CHANNELS: usize, const CAPACITY: usize> Node<CHANNELS, CAPACITY> {
    pub const fn new(peripherals: Peripherals<CHANNELS>) -> Self {
        Self {
            peripherals,
            handlers: CompletionHandlers::new(),
            buffer: [0; CAPACITY],
        }
    }

    pub fn peripherals(&self) -> &Peripherals<CHANNELS> {
        &self.peripherals
    }

    /// The completion handlers, for the DMA interrupt handlers to service.
    pub fn handlers(&self) -> &CompletionHandlers<CHANNELS> {
        &self.handlers
    }

    fn read(
        &mut self,
        serialize: impl FnOnce(&Peripherals<CHANNELS>, &mut [u8]) -> Result<usize>,
    ) -> Result<&[u8]> {
        let len = serialize(&self.peripherals, &mut self.buffer[..])?;
        Ok(&self.buffer[..len])
    }

    fn channel(&self, index: usize) -> Result<Channel> {
        // Safety: the node owns the DMA controller, and the handle is dropped
        // before the call that created it returns.
        unsafe { self.peripherals.dma.channel(index) }
    }

    fn read_channel(
        &mut self,
        index: usize,
        serialize: impl FnOnce(&Channel, &mut [u8]) -> Result<usize>,
    ) -> Result<&[u8]> {
        let channel = self.channel(index)?;
        let len = serialize(&channel, &mut self.buffer[..])?;
        Ok(&self.buffer[..len])
    }

    fn update_channel(
        &self,
        index: usize,
        update: impl FnOnce(&Channel) -> Result<()>,
    ) -> i8 {
        error::status(self.channel(index).and_then(|channel| update(&channel)))
    }

    pub fn read_adc(&mut self, unit: usize) -> Result<&[u8]> {
        self.read(|p, buffer| p.adc.serialize_registers(unit, buffer))
    }

    pub fn update_adc(&self, unit: usize, bytes: &[u8]) -> i8 {
        error::status(self.peripherals.adc.update_registers(unit, bytes))
    }

    pub fn read_pit(&mut self) -> Result<&[u8]> {
        self.read(|p, buffer| p.pit.serialize_registers(buffer))
    }

    pub fn update_pit(&self, bytes: &[u8]) -> i8 {
        error::status(self.peripherals.pit.update_registers(bytes))
    }

    pub fn read_pit_timer(&mut self, index: usize) -> Result<&[u8]> {
        self.read(|p, buffer| p.pit.serialize_timer_config(index, buffer))
    }

    pub fn update_pit_timer(&self, index: usize, bytes: &[u8]) -> i8 {
        error::status(self.peripherals.pit.update_timer_config(index, bytes))
    }

    pub fn read_scgc6(&mut self) -> Result<&[u8]> {
        self.read(|p, buffer| p.sim.serialize_scgc6(buffer))
    }

    pub fn update_scgc6(&self, bytes: &[u8]) -> i8 {
        error::status(self.peripherals.sim.update_scgc6(bytes))
    }

    pub fn read_scgc7(&mut self) -> Result<&[u8]> {
        self.read(|p, buffer| p.sim.serialize_scgc7(buffer))
    }

    pub fn update_scgc7(&self, bytes: &[u8]) -> i8 {
        error::status(self.peripherals.sim.update_scgc7(bytes))
    }

    pub fn read_dma(&mut self) -> Result<&[u8]> {
        self.read(|p, buffer| p.dma.serialize_registers(buffer))
    }

    pub fn update_dma(&self, bytes: &[u8]) -> i8 {
        error::status(self.peripherals.dma.update_registers(bytes))
    }

    pub fn read_tcd(&mut self, channel: usize) -> Result<&[u8]> {
        self.read_channel(channel, Channel::serialize_tcd)
    }

    pub fn update_tcd(&self, channel: usize, bytes: &[u8]) -> i8 {
        self.update_channel(channel, |chan| chan.update_tcd(bytes))
    }

    pub fn reset_tcd(&self, channel: usize) -> i8 {
        self.update_channel(channel, |chan| {
            chan.reset_tcd();
            Ok(())
        })
    }

    pub fn read_dchpri(&mut self, channel: usize) -> Result<&[u8]> {
        self.read_channel(channel, Channel::serialize_priority)
    }

    pub fn update_dchpri(&self, channel: usize, bytes: &[u8]) -> i8 {
        self.update_channel(channel, |chan| chan.update_priority(bytes))
    }

    pub fn read_mux_chcfg(&mut self, channel: usize) -> Result<&[u8]> {
        self.read_channel(channel, Channel::serialize_mux)
    }

    pub fn update_mux_chcfg(&self, channel: usize, bytes: &[u8]) -> i8 {
        self.update_channel(channel, |chan| chan.update_mux(bytes))
    }

    pub fn dma_channel_count(&self) -> usize {
        self.peripherals.dma.channel_count()
    }

    pub fn attach_dma_interrupt(&self, channel: usize, handler: Handler) -> i8 {
        error::status(self.handlers.register(channel, handler).map(|_| ()))
    }

    pub fn detach_dma_interrupt(&self, channel: usize) -> i8 {
        error::status(self.handlers.unregister(channel).map(|_| ()))
    }
}
