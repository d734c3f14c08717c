//! SIM clock gating.
//!
//! Only the two gates that matter to the other peripherals in this crate are
//! exposed: `SCGC6` (ADC0, PIT, DMAMUX, ...) and `SCGC7` (DMA).

use crate::ral::{self, sim::SCGC6, sim::SCGC7, Static};
use crate::{wire, Result};

register! {
    /// System Clock Gating Control Register 6
    pub struct Scgc6: u32 {
        rtc: bool = SCGC6::RTC,
        adc0: bool = SCGC6::ADC0,
        ftm1: bool = SCGC6::FTM1,
        ftm0: bool = SCGC6::FTM0,
        pit: bool = SCGC6::PIT,
        pdb: bool = SCGC6::PDB,
        usbdcd: bool = SCGC6::USBDCD,
        crc: bool = SCGC6::CRC,
        i2s: bool = SCGC6::I2S,
        spi1: bool = SCGC6::SPI1,
        spi0: bool = SCGC6::SPI0,
        flexcan0: bool = SCGC6::FLEXCAN0,
        dmamux: bool = SCGC6::DMAMUX,
        ftfl: bool = SCGC6::FTFL,
    }
}

register! {
    /// System Clock Gating Control Register 7
    pub struct Scgc7: u32 {
        dma: bool = SCGC7::DMA,
    }
}

/// Clock gating registers.
pub struct Sim {
    registers: Static<ral::sim::RegisterBlock>,
}

// Safety: OK to share in a static context. Every method is a volatile
// register access.
unsafe impl Sync for Sim {}

impl Sim {
    /// # Safety
    ///
    /// `scgc` must point at `SIM_SCGC6`, which must be followed by `SIM_SCGC7`.
    pub const unsafe fn new(scgc: *const ()) -> Self {
        Self {
            registers: Static(scgc.cast()),
        }
    }

    pub fn read_scgc6(&self) -> Scgc6 {
        ral::capture(&self.registers.SCGC6)
    }

    pub fn apply_scgc6(&self, scgc6: &Scgc6) {
        ral::update(&self.registers.SCGC6, scgc6);
    }

    pub fn read_scgc7(&self) -> Scgc7 {
        ral::capture(&self.registers.SCGC7)
    }

    pub fn apply_scgc7(&self, scgc7: &Scgc7) {
        ral::update(&self.registers.SCGC7, scgc7);
    }

    /// Encode the live `SCGC6` into `buffer`.
    pub fn serialize_scgc6(&self, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize SCGC6");
        wire::encode(&self.read_scgc6(), buffer)
    }

    /// Decode `bytes` and apply its present gates to `SCGC6`.
    pub fn update_scgc6(&self, bytes: &[u8]) -> Result<()> {
        let scgc6: Scgc6 = wire::decode(bytes)?;
        log::debug!("update SCGC6 {:?}", scgc6);
        self.apply_scgc6(&scgc6);
        Ok(())
    }

    pub fn serialize_scgc7(&self, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize SCGC7");
        wire::encode(&self.read_scgc7(), buffer)
    }

    pub fn update_scgc7(&self, bytes: &[u8]) -> Result<()> {
        let scgc7: Scgc7 = wire::decode(bytes)?;
        log::debug!("update SCGC7 {:?}", scgc7);
        self.apply_scgc7(&scgc7);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ral::testing;
    use crate::Error;

    fn sim() -> (&'static ral::sim::RegisterBlock, Sim) {
        let block = testing::zeroed::<ral::sim::RegisterBlock>();
        // Safety: block is a valid, leaked register image.
        let sim = unsafe { Sim::new(testing::ptr(block)) };
        (block, sim)
    }

    #[test]
    fn serialize_reports_every_gate() {
        let (block, sim) = sim();
        block.SCGC6.write(SCGC6::PIT.mask() | SCGC6::DMAMUX.mask());
        block.SCGC7.write(SCGC7::DMA.mask());

        let mut buffer = [0; 64];
        let len = sim.serialize_scgc6(&mut buffer).unwrap();
        let scgc6: Scgc6 = wire::decode(&buffer[..len]).unwrap();
        assert_eq!(scgc6.pit, Some(true));
        assert_eq!(scgc6.dmamux, Some(true));
        assert_eq!(scgc6.adc0, Some(false));
        assert_eq!(scgc6.rtc, Some(false));

        let len = sim.serialize_scgc7(&mut buffer).unwrap();
        let scgc7: Scgc7 = wire::decode(&buffer[..len]).unwrap();
        assert_eq!(scgc7.dma, Some(true));
    }

    #[test]
    fn update_touches_only_present_gates() {
        let (block, sim) = sim();
        // Reserved bits included, to show they survive.
        block.SCGC6.write(0x4000_0001 | SCGC6::PIT.mask());

        let scgc6 = Scgc6 {
            adc0: Some(true),
            pit: Some(false),
            ..Default::default()
        };
        let mut buffer = [0; 64];
        let len = wire::encode(&scgc6, &mut buffer).unwrap();
        sim.update_scgc6(&buffer[..len]).unwrap();
        assert_eq!(block.SCGC6.read(), 0x4000_0001 | SCGC6::ADC0.mask());
    }

    #[test]
    fn malformed_update_writes_nothing() {
        let (block, sim) = sim();
        block.SCGC7.write(0xFFFF_FFFF);
        assert_eq!(sim.update_scgc7(&[1]), Err(Error::MalformedInput));
        assert_eq!(block.SCGC7.read(), 0xFFFF_FFFF);
    }
}
