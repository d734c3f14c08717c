//! Sparse register codecs for Kinetis K20 (Teensy 3.x) peripherals.
//!
//! `teensy-rpc-regs` exposes a microcontroller's peripheral registers to a
//! remote host. Each register group has a message type whose fields are all
//! `Option`s, and two operations:
//!
//! - *serialize* reads the live registers into a message with every field
//!   present, and encodes it into a caller-supplied buffer.
//! - *update* decodes a message and writes back only the fields that are
//!   present. Every other bit keeps its current value.
//!
//! Covered peripherals are the [ADC](adc), the [PIT](pit), [SIM clock
//! gating](sim), the [DMA controller](dma), and per-[`Channel`](channel::Channel)
//! DMA state: transfer control descriptors, arbitration priority, and
//! multiplexer slots.
//!
//! # Getting started
//!
//! The peripheral addresses are fixed for the K20. Use them to create the
//! [`Peripherals`], and hand those to a [`Node`]. The node owns a scratch
//! buffer, and exposes the RPC call surface.
//!
//! ```no_run
//! use teensy_rpc_regs::{Node, Peripherals};
//!
//! // Safety: this is the only owner of these peripherals.
//! let mut node: Node<16> = Node::new(unsafe { Peripherals::new() });
//!
//! // Encoded TCD for DMA channel 3, borrowed from the node's buffer.
//! let tcd: &[u8] = node.read_tcd(3).unwrap();
//!
//! // Gate on the DMA clock: SCGC7 with `dma` present and `true`.
//! let status = node.update_scgc7(&[1, 1]);
//! assert_eq!(status, 0);
//! ```
//!
//! For lower-level access, use the peripheral types directly, or the
//! [`wire`] module to encode and decode messages.
//!
//! ### License
//!
//! Licensed under either of
//!
//! - [Apache License, Version 2.0](http://www.apache.org/licenses/LICENSE-2.0) ([LICENSE-APACHE](./LICENSE-APACHE))
//! - [MIT License](http://opensource.org/licenses/MIT) ([LICENSE-MIT](./LICENSE-MIT))
//!
//! at your option.
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted
//! for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
//! dual licensed as above, without any additional terms or conditions.

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod bits;

pub mod adc;
pub mod channel;
pub mod dma;
mod error;
pub mod interrupt;
mod node;
pub mod pit;
mod ral;
pub mod sim;
pub mod wire;

pub use error::{status, Error};
pub use interrupt::CompletionHandlers;
pub use node::{Node, BUFFER_SIZE};
pub use ral::adc::{
    Averaging, ClockDivide, Gain, InputClock, LongSampleTime, MuxSelect, Reference, Resolution,
    SampleTime, Trigger,
};
pub use ral::tcd::{BandwidthControl, TransferSize};

/// A codec result
pub type Result<T> = core::result::Result<T, Error>;

/// A DMA driver.
///
/// This DMA driver manages the DMA controller and the multiplexer.
/// It's configured with pointers to both peripherals.
///
/// `Dma` allocates [`Channel`](channel::Channel)s. `CHANNELS` is the number
/// of channels on your part: 16 on the MK20DX256 (Teensy 3.1 and 3.2), 4 on
/// the MK20DX128 (Teensy 3.0).
pub struct Dma<const CHANNELS: usize> {
    controller: ral::Static<ral::dma::RegisterBlock>,
    multiplexer: ral::Static<ral::dmamux::RegisterBlock>,
}

// Safety: OK to allocate a DMA driver in a static context.
unsafe impl<const CHANNELS: usize> Sync for Dma<CHANNELS> {}

impl<const CHANNELS: usize> Dma<CHANNELS> {
    /// Create the DMA driver.
    ///
    /// Note that this can evaluate at compile time.
    ///
    /// # Safety
    ///
    /// Caller must make sure that `controller` is a pointer to the start of the
    /// DMA controller register block. Caller must also make sure that
    /// `multiplexer` is a pointer to the start of the DMA multiplexer. Both
    /// pointers must be valid for your MCU.
    ///
    /// An incorrect `CHANNELS` value prevents proper bounds checking when
    /// allocating channels. This may result in DMA channels that point to
    /// invalid memory.
    pub const unsafe fn new(controller: *const (), multiplexer: *const ()) -> Self {
        assert!(CHANNELS <= ral::dma::CHANNELS);
        Self {
            controller: ral::Static(controller.cast()),
            multiplexer: ral::Static(multiplexer.cast()),
        }
    }

    /// The number of DMA channels.
    pub const fn channel_count(&self) -> usize {
        CHANNELS
    }
}

/// Every peripheral with a register codec.
pub struct Peripherals<const CHANNELS: usize> {
    pub adc: adc::Adc,
    pub pit: pit::Pit,
    pub sim: sim::Sim,
    pub dma: Dma<CHANNELS>,
}

impl<const CHANNELS: usize> Peripherals<CHANNELS> {
    /// The peripherals at their K20 addresses.
    ///
    /// # Safety
    ///
    /// Only call this on a K20. The returned handles alias hardware state;
    /// create only one set of them.
    pub const unsafe fn new() -> Self {
        Self {
            adc: adc::Adc::new(ral::ADC0, ral::ADC_STRIDE),
            pit: pit::Pit::new(ral::PIT),
            sim: sim::Sim::new(ral::SIM_SCGC),
            dma: Dma::new(ral::DMA, ral::DMAMUX),
        }
    }
}
