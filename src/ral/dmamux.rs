//! DMA multiplexer
//!
//! One 8-bit configuration register per DMA channel. Unlike the priority
//! registers, these are in channel order.

use super::{dma::CHANNELS, fields, RWRegister};

/// DMA multiplexer configuration registers
#[repr(C)]
pub struct RegisterBlock {
    /// Multiplexer configuration registers, one per channel
    pub CHCFG: [RWRegister<u8>; CHANNELS],
}

/// Channel Configuration register (20.3.1/363)
pub mod CHCFG {
    super::fields!(u8;
        /// DMA Channel Enable
        ENBL[7; 1],
        /// DMA Channel Trigger Enable
        TRIG[6; 1],
        /// DMA Channel Source (Slot)
        SOURCE[0; 6],
    );
}
