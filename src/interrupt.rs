//! DMA completion handlers.
//!
//! One optional handler per channel. Installing the DMA interrupt vectors is
//! up to the firmware; its handlers call [`CompletionHandlers::on_interrupt`]
//! with their channel number.

use core::cell::Cell;

use critical_section::Mutex;

use crate::{Dma, Error, Result};

/// A completion handler.
pub type Handler = fn();

type SharedHandler = Mutex<Cell<Option<Handler>>>;
const NO_HANDLER: SharedHandler = Mutex::new(Cell::new(None));

/// Per-channel completion handlers.
///
/// Safe to share between thread mode and interrupt handlers. Every access
/// happens inside a critical section.
pub struct CompletionHandlers<const CHANNELS: usize> {
    handlers: [SharedHandler; CHANNELS],
}

impl<const CHANNELS: usize> Default for CompletionHandlers<CHANNELS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHANNELS: usize> CompletionHandlers<CHANNELS> {
    pub const fn new() -> Self {
        Self {
            handlers: [NO_HANDLER; CHANNELS],
        }
    }

    fn slot(&self, channel: usize) -> Result<&SharedHandler> {
        self.handlers.get(channel).ok_or_else(|| {
            log::warn!("DMA channel {} out of range (0..{})", channel, CHANNELS);
            Error::OutOfRange
        })
    }

    /// Attach `handler` to `channel`, returning the handler it replaces.
    pub fn register(&self, channel: usize, handler: Handler) -> Result<Option<Handler>> {
        let slot = self.slot(channel)?;
        log::debug!("attach DMA{} completion handler", channel);
        Ok(critical_section::with(|cs| slot.borrow(cs).replace(Some(handler))))
    }

    /// Detach the handler from `channel`, returning it.
    pub fn unregister(&self, channel: usize) -> Result<Option<Handler>> {
        let slot = self.slot(channel)?;
        log::debug!("detach DMA{} completion handler", channel);
        Ok(critical_section::with(|cs| slot.borrow(cs).take()))
    }

    /// Call `channel`'s handler, if it has one. Returns `true` if it ran.
    ///
    /// The handler runs outside the critical section.
    pub fn dispatch(&self, channel: usize) -> Result<bool> {
        let slot = self.slot(channel)?;
        let handler = critical_section::with(|cs| slot.borrow(cs).get());
        if let Some(handler) = handler {
            handler();
        }
        Ok(handler.is_some())
    }

    /// Service `channel`'s DMA interrupt.
    ///
    /// If the channel is signaling an interrupt, the flag is cleared and the
    /// handler runs. Returns `true` if a handler ran.
    pub fn on_interrupt(&self, dma: &Dma<CHANNELS>, channel: usize) -> Result<bool> {
        // Safety: the handle doesn't outlive this call, and only touches the
        // channel's interrupt flag.
        let channel = unsafe { dma.channel(channel)? };
        if !channel.is_interrupt() {
            return Ok(false);
        }
        channel.clear_interrupt();
        self.dispatch(channel.channel())
    }
}
