//! DMA channels.
//!
//! A [`Channel`] is a handle to one channel's slice of the DMA controller:
//! its transfer control descriptor ([`tcd`]), its arbitration priority
//! ([`priority`]), and its multiplexer slot ([`mux`]).

pub mod mux;
pub mod priority;
pub mod tcd;

use crate::ral::{self, dmamux, Static};
use crate::{Error, Result};

impl<const CHANNELS: usize> crate::Dma<CHANNELS> {
    /// Creates the DMA channel described by `index`.
    ///
    /// Returns [`Error::OutOfRange`] if `index` is greater than or equal to
    /// the number of channels.
    ///
    /// # Safety
    ///
    /// This will create a handle that may alias global, mutable state. You should only create
    /// one channel per index. If there are multiple channels for the same index, you're
    /// responsible for ensuring synchronized access.
    pub unsafe fn channel(&self, index: usize) -> Result<Channel> {
        if index >= CHANNELS {
            log::warn!("DMA channel {} out of range (0..{})", index, CHANNELS);
            return Err(Error::OutOfRange);
        }
        Ok(Channel {
            index,
            registers: self.controller,
            multiplexer: self.multiplexer,
        })
    }
}

/// A DMA channel
///
/// The `Channel` reads and writes the live registers on every call. Nothing
/// is cached between calls.
pub struct Channel {
    /// Our channel number, expected to be between [0, 16)
    index: usize,
    /// Reference to the DMA registers
    registers: Static<ral::dma::RegisterBlock>,
    /// Reference to the DMA multiplexer
    multiplexer: Static<dmamux::RegisterBlock>,
}

impl Channel {
    /// Returns the DMA channel number.
    pub fn channel(&self) -> usize {
        self.index
    }

    pub(crate) fn tcd(&self) -> &ral::tcd::RegisterBlock {
        &self.registers.TCD[self.index]
    }

    fn priority_register(&self) -> &ral::RWRegister<u8> {
        &self.registers.DCHPRI[self.index]
    }

    fn mux_register(&self) -> &ral::RWRegister<u8> {
        &self.multiplexer.CHCFG[self.index]
    }

    /// `true` if minor loop mapping is enabled on the controller.
    fn is_minor_loop_mapping(&self) -> bool {
        let dma = &*self.registers;
        ral::read_reg!(ral::dma, dma, CR, EMLM == 1)
    }

    /// Returns `true` if this channel is signaling an interrupt.
    pub fn is_interrupt(&self) -> bool {
        self.registers.INT.read() & (1 << self.index) != 0
    }

    /// Clear this channel's interrupt flag.
    pub fn clear_interrupt(&self) {
        // Immutable write OK. CINT only affects our bit in INT.
        self.registers.CINT.write(self.index as u8);
    }

    /// Returns `true` if the channel's major loop has completed.
    pub fn is_complete(&self) -> bool {
        let tcd = self.tcd();
        ral::read_reg!(ral::tcd, tcd, CSR, DONE == 1)
    }

    /// Returns `true` if the channel is currently transferring.
    pub fn is_active(&self) -> bool {
        let tcd = self.tcd();
        ral::read_reg!(ral::tcd, tcd, CSR, ACTIVE == 1)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::ral::{self, testing};
    use crate::Dma;

    /// A 16-channel controller in host memory.
    pub(crate) fn dma() -> (
        &'static ral::dma::RegisterBlock,
        &'static ral::dmamux::RegisterBlock,
        Dma<16>,
    ) {
        let block = testing::zeroed::<ral::dma::RegisterBlock>();
        let mux = testing::zeroed::<ral::dmamux::RegisterBlock>();
        // Safety: both blocks are valid, leaked register images.
        let dma = unsafe { Dma::new(testing::ptr(block), testing::ptr(mux)) };
        (block, mux, dma)
    }

    #[test]
    fn channel_bounds() {
        let (_, _, dma) = dma();
        // Safety: one handle per index.
        unsafe {
            assert_eq!(dma.channel(15).map(|chan| chan.channel()), Ok(15));
            assert!(dma.channel(16).is_err());
        }
    }

    #[test]
    fn status_bits() {
        let (block, _, dma) = dma();
        block.TCD[3].CSR.write(ral::tcd::CSR::DONE.mask() as u16);
        // Safety: one handle per index.
        let (three, four) = unsafe { (dma.channel(3).unwrap(), dma.channel(4).unwrap()) };
        assert!(three.is_complete());
        assert!(!three.is_active());
        assert!(!four.is_complete());
    }
}
