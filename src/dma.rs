//! DMA controller globals.
//!
//! Covers the controller-wide registers: control, error status, the
//! request / interrupt / error bitmaps, and the 8-bit command registers that
//! act on one channel at a time. Per-channel state lives in
//! [`channel`](crate::channel).

use serde::{Deserialize, Serialize};

use crate::bits::Fields;
use crate::ral::{
    self,
    dma::{CR, ES},
};
use crate::{wire, Dma, Result};

register! {
    /// Control Register
    pub struct Cr: u32 {
        cx: bool = CR::CX,
        ecx: bool = CR::ECX,
        emlm: bool = CR::EMLM,
        clm: bool = CR::CLM,
        halt: bool = CR::HALT,
        hoe: bool = CR::HOE,
        erca: bool = CR::ERCA,
        edbg: bool = CR::EDBG,
    }
}

register! {
    /// Error Status Register
    pub struct Es: u32 {
        vld: bool = ES::VLD,
        ecx: bool = ES::ECX,
        cpe: bool = ES::CPE,
        errchn: u8 = ES::ERRCHN,
        sae: bool = ES::SAE,
        soe: bool = ES::SOE,
        dae: bool = ES::DAE,
        doe: bool = ES::DOE,
        nce: bool = ES::NCE,
        sge: bool = ES::SGE,
        sbe: bool = ES::SBE,
        dbe: bool = ES::DBE,
    }
}

/// DMA controller registers.
///
/// The 8-bit command registers are write-only. They are never captured, and
/// each one present in an update is written with its channel number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct Registers {
    pub cr: Option<Cr>,
    /// Read-only; ignored on update.
    pub es: Option<Es>,
    pub erq: Option<u32>,
    pub eei: Option<u32>,
    /// Clear enable error interrupt
    pub ceei: Option<u8>,
    /// Set enable error interrupt
    pub seei: Option<u8>,
    /// Clear enable request
    pub cerq: Option<u8>,
    /// Set enable request
    pub serq: Option<u8>,
    /// Clear DONE
    pub cdne: Option<u8>,
    /// Set START
    pub ssrt: Option<u8>,
    /// Clear error
    pub cerr: Option<u8>,
    /// Clear interrupt request
    pub cint: Option<u8>,
    pub int: Option<u32>,
    pub err: Option<u32>,
    /// Read-only; ignored on update.
    pub hrs: Option<u32>,
}

impl<const CHANNELS: usize> Dma<CHANNELS> {
    /// Capture the controller registers.
    pub fn read_registers(&self) -> Registers {
        let dma = &*self.controller;
        Registers {
            cr: Some(ral::capture(&dma.CR)),
            es: Some(Es::capture(dma.ES.read())),
            erq: Some(dma.ERQ.read()),
            eei: Some(dma.EEI.read()),
            int: Some(dma.INT.read()),
            err: Some(dma.ERR.read()),
            hrs: Some(dma.HRS.read()),
            ..Default::default()
        }
    }

    /// Apply the present registers.
    ///
    /// Bitmaps are written whole. Commands follow, with the two that can
    /// start a transfer, `SERQ` then `SSRT`, written last.
    pub fn apply_registers(&self, registers: &Registers) {
        let dma = &*self.controller;
        if registers.es.is_some() || registers.hrs.is_some() {
            log::debug!("DMA: ignoring read-only ES/HRS");
        }
        if let Some(cr) = &registers.cr {
            ral::update(&dma.CR, cr);
        }
        if let Some(erq) = registers.erq {
            dma.ERQ.write(erq);
        }
        if let Some(eei) = registers.eei {
            dma.EEI.write(eei);
        }
        if let Some(int) = registers.int {
            dma.INT.write(int);
        }
        if let Some(err) = registers.err {
            dma.ERR.write(err);
        }
        ral::command(&dma.CEEI, registers.ceei);
        ral::command(&dma.SEEI, registers.seei);
        ral::command(&dma.CERQ, registers.cerq);
        ral::command(&dma.CDNE, registers.cdne);
        ral::command(&dma.CERR, registers.cerr);
        ral::command(&dma.CINT, registers.cint);
        if registers.serq.is_some() || registers.ssrt.is_some() {
            ral::barrier();
        }
        ral::command(&dma.SERQ, registers.serq);
        ral::command(&dma.SSRT, registers.ssrt);
    }

    pub fn serialize_registers(&self, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize DMA registers");
        wire::encode(&self.read_registers(), buffer)
    }

    pub fn update_registers(&self, bytes: &[u8]) -> Result<()> {
        let registers: Registers = wire::decode(bytes)?;
        log::debug!("update DMA registers {:?}", registers);
        self.apply_registers(&registers);
        Ok(())
    }

    /// `true` if minor loop mapping is enabled.
    ///
    /// Selects the layout of every channel's `NBYTES` word.
    pub fn is_minor_loop_mapping(&self) -> bool {
        let dma = &*self.controller;
        ral::read_reg!(ral::dma, dma, CR, EMLM == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ral::testing::{self, peek};

    fn dma() -> (&'static ral::dma::RegisterBlock, Dma<16>) {
        let block = testing::zeroed::<ral::dma::RegisterBlock>();
        let mux = testing::zeroed::<ral::dmamux::RegisterBlock>();
        // Safety: both blocks are valid, leaked register images.
        let dma = unsafe { Dma::new(testing::ptr(block), testing::ptr(mux)) };
        (block, dma)
    }

    #[test]
    fn commands_are_never_captured() {
        let (block, dma) = dma();
        block.CR.write(CR::EMLM.mask() | CR::HOE.mask());
        block.ERQ.write(0x0000_8001);

        let mut buffer = [0; wire::max_size::<Registers>()];
        let len = dma.serialize_registers(&mut buffer).unwrap();
        let registers: Registers = wire::decode(&buffer[..len]).unwrap();
        assert_eq!(registers.erq, Some(0x8001));
        assert_eq!(registers.hrs, Some(0));
        assert_eq!(registers.cr.and_then(|cr| cr.emlm), Some(true));
        assert_eq!(registers.cr.and_then(|cr| cr.halt), Some(false));
        assert_eq!(registers.es.and_then(|es| es.errchn), Some(0));
        for command in [
            registers.ceei,
            registers.seei,
            registers.cerq,
            registers.serq,
            registers.cdne,
            registers.ssrt,
            registers.cerr,
            registers.cint,
        ] {
            assert_eq!(command, None);
        }
        assert!(dma.is_minor_loop_mapping());
    }

    #[test]
    fn update_writes_present_registers() {
        let (block, dma) = dma();
        block.CR.write(CR::ERCA.mask());
        block.EEI.write(0xFFFF);

        let registers = Registers {
            cr: Some(Cr {
                emlm: Some(true),
                ..Default::default()
            }),
            erq: Some(0),
            serq: Some(5),
            es: Some(Es {
                vld: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut buffer = [0; wire::max_size::<Registers>()];
        let len = wire::encode(&registers, &mut buffer).unwrap();
        dma.update_registers(&buffer[..len]).unwrap();

        assert_eq!(block.CR.read(), CR::ERCA.mask() | CR::EMLM.mask());
        assert_eq!(block.EEI.read(), 0xFFFF);
        assert_eq!(block.ES.read(), 0);
        assert_eq!(peek::<_, u8>(&block.SERQ), 5);
        assert_eq!(peek::<_, u8>(&block.SSRT), 0);
    }
}
