//! ADC register codec.
//!
//! The ADC has two units with identical register blocks. Every call names
//! the unit.

use serde::{Deserialize, Serialize};

use crate::bits::{Field, Triggered};
use crate::ral::{
    self,
    adc::{
        Averaging, ClockDivide, Gain, InputClock, LongSampleTime, MuxSelect, Reference,
        Resolution, SampleTime, Trigger, CFG1, CFG2, PGA, SC1, SC2, SC3, UNITS,
    },
    Instances, RWRegister, Static,
};
use crate::{wire, Error, Result};

register! {
    /// Status and control register 1, for both `SC1A` and `SC1B`
    pub struct Sc1: u32 {
        coco: bool = SC1::COCO,
        aien: bool = SC1::AIEN,
        diff: bool = SC1::DIFF,
        adch: u8 = SC1::ADCH,
    }
}

register! {
    pub struct Cfg1: u32 {
        adlpc: bool = CFG1::ADLPC,
        adiv: ClockDivide = CFG1::ADIV,
        adlsmp: SampleTime = CFG1::ADLSMP,
        mode: Resolution = CFG1::MODE,
        adiclk: InputClock = CFG1::ADICLK,
    }
}

register! {
    pub struct Cfg2: u32 {
        muxsel: MuxSelect = CFG2::MUXSEL,
        adacken: bool = CFG2::ADACKEN,
        adhsc: bool = CFG2::ADHSC,
        adlsts: LongSampleTime = CFG2::ADLSTS,
    }
}

register! {
    pub struct Sc2: u32 {
        /// Read-only
        adact: bool = SC2::ADACT,
        adtrg: Trigger = SC2::ADTRG,
        acfe: bool = SC2::ACFE,
        acfgt: bool = SC2::ACFGT,
        acren: bool = SC2::ACREN,
        dmaen: bool = SC2::DMAEN,
        refsel: Reference = SC2::REFSEL,
    }
}

register! {
    pub struct Sc3: u32 {
        /// Setting this starts a calibration
        cal: bool = SC3::CAL,
        calf: bool = SC3::CALF,
        adco: bool = SC3::ADCO,
        avge: bool = SC3::AVGE,
        avgs: Averaging = SC3::AVGS,
    }
}

impl Triggered for Sc3 {
    const TRIGGER: Field = SC3::CAL;
    fn trigger(&self) -> Option<bool> {
        self.cal
    }
}

register! {
    pub struct Pga: u32 {
        pgaen: bool = PGA::PGAEN,
        pgalpb: bool = PGA::PGALPB,
        pgag: Gain = PGA::PGAG,
    }
}

/// All registers of one ADC unit.
///
/// Calibration and gain words are carried whole.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct Registers {
    pub sc1a: Option<Sc1>,
    pub sc1b: Option<Sc1>,
    pub cfg1: Option<Cfg1>,
    pub cfg2: Option<Cfg2>,
    /// Result A. Read-only; ignored on update.
    pub ra: Option<u32>,
    /// Result B. Read-only; ignored on update.
    pub rb: Option<u32>,
    pub cv1: Option<u32>,
    pub cv2: Option<u32>,
    pub sc2: Option<Sc2>,
    pub sc3: Option<Sc3>,
    pub ofs: Option<u32>,
    pub pg: Option<u32>,
    pub mg: Option<u32>,
    pub clpd: Option<u32>,
    pub clps: Option<u32>,
    pub clp4: Option<u32>,
    pub clp3: Option<u32>,
    pub clp2: Option<u32>,
    pub clp1: Option<u32>,
    pub clp0: Option<u32>,
    pub pga: Option<Pga>,
    pub clmd: Option<u32>,
    pub clms: Option<u32>,
    pub clm4: Option<u32>,
    pub clm3: Option<u32>,
    pub clm2: Option<u32>,
    pub clm1: Option<u32>,
    pub clm0: Option<u32>,
}

/// The ADC units.
pub struct Adc {
    units: Instances<ral::adc::RegisterBlock, UNITS>,
}

// Safety: OK to share in a static context. Every method is a volatile
// register access.
unsafe impl Sync for Adc {}

fn write(register: &RWRegister<u32>, value: Option<u32>) {
    if let Some(value) = value {
        register.write(value);
    }
}

impl Adc {
    /// # Safety
    ///
    /// `adc0` must point at ADC0's register block, and the second unit must
    /// sit `stride` bytes after it.
    pub const unsafe fn new(adc0: *const (), stride: usize) -> Self {
        Self {
            units: Instances::new(adc0, stride),
        }
    }

    fn unit(&self, unit: usize) -> Result<Static<ral::adc::RegisterBlock>> {
        self.units.get(unit).ok_or_else(|| {
            log::warn!("ADC{} out of range (0..{})", unit, UNITS);
            Error::OutOfRange
        })
    }

    /// Capture every register of ADC `unit`.
    pub fn read_registers(&self, unit: usize) -> Result<Registers> {
        let adc = self.unit(unit)?;
        Ok(Registers {
            sc1a: Some(ral::capture(&adc.SC1A)),
            sc1b: Some(ral::capture(&adc.SC1B)),
            cfg1: Some(ral::capture(&adc.CFG1)),
            cfg2: Some(ral::capture(&adc.CFG2)),
            ra: Some(adc.RA.read()),
            rb: Some(adc.RB.read()),
            cv1: Some(adc.CV1.read()),
            cv2: Some(adc.CV2.read()),
            sc2: Some(ral::capture(&adc.SC2)),
            sc3: Some(ral::capture(&adc.SC3)),
            ofs: Some(adc.OFS.read()),
            pg: Some(adc.PG.read()),
            mg: Some(adc.MG.read()),
            clpd: Some(adc.CLPD.read()),
            clps: Some(adc.CLPS.read()),
            clp4: Some(adc.CLP4.read()),
            clp3: Some(adc.CLP3.read()),
            clp2: Some(adc.CLP2.read()),
            clp1: Some(adc.CLP1.read()),
            clp0: Some(adc.CLP0.read()),
            pga: Some(ral::capture(&adc.PGA)),
            clmd: Some(adc.CLMD.read()),
            clms: Some(adc.CLMS.read()),
            clm4: Some(adc.CLM4.read()),
            clm3: Some(adc.CLM3.read()),
            clm2: Some(adc.CLM2.read()),
            clm1: Some(adc.CLM1.read()),
            clm0: Some(adc.CLM0.read()),
        })
    }

    /// Apply the present registers of `registers` to ADC `unit`.
    ///
    /// Configuration and calibration words go first. `SC3` follows, with
    /// `CAL` set in its own write. `SC1A` is last of all, since writing it
    /// starts a conversion.
    pub fn apply_registers(&self, unit: usize, registers: &Registers) -> Result<()> {
        let adc = self.unit(unit)?;
        if registers.ra.is_some() || registers.rb.is_some() {
            log::debug!("ADC{}: ignoring read-only RA/RB", unit);
        }

        if let Some(cfg1) = &registers.cfg1 {
            ral::update(&adc.CFG1, cfg1);
        }
        if let Some(cfg2) = &registers.cfg2 {
            ral::update(&adc.CFG2, cfg2);
        }
        write(&adc.CV1, registers.cv1);
        write(&adc.CV2, registers.cv2);
        if let Some(sc2) = &registers.sc2 {
            ral::update(&adc.SC2, sc2);
        }
        write(&adc.OFS, registers.ofs);
        write(&adc.PG, registers.pg);
        write(&adc.MG, registers.mg);
        write(&adc.CLPD, registers.clpd);
        write(&adc.CLPS, registers.clps);
        write(&adc.CLP4, registers.clp4);
        write(&adc.CLP3, registers.clp3);
        write(&adc.CLP2, registers.clp2);
        write(&adc.CLP1, registers.clp1);
        write(&adc.CLP0, registers.clp0);
        if let Some(pga) = &registers.pga {
            ral::update(&adc.PGA, pga);
        }
        write(&adc.CLMD, registers.clmd);
        write(&adc.CLMS, registers.clms);
        write(&adc.CLM4, registers.clm4);
        write(&adc.CLM3, registers.clm3);
        write(&adc.CLM2, registers.clm2);
        write(&adc.CLM1, registers.clm1);
        write(&adc.CLM0, registers.clm0);
        if let Some(sc3) = &registers.sc3 {
            ral::update_triggered(&adc.SC3, sc3);
        }
        if let Some(sc1b) = &registers.sc1b {
            ral::update(&adc.SC1B, sc1b);
        }
        if let Some(sc1a) = &registers.sc1a {
            ral::barrier();
            ral::update(&adc.SC1A, sc1a);
        }
        Ok(())
    }

    pub fn serialize_registers(&self, unit: usize, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize ADC{}", unit);
        wire::encode(&self.read_registers(unit)?, buffer)
    }

    pub fn update_registers(&self, unit: usize, bytes: &[u8]) -> Result<()> {
        self.unit(unit)?;
        let registers: Registers = wire::decode(bytes)?;
        log::debug!("update ADC{} {:?}", unit, registers);
        self.apply_registers(unit, &registers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::Fields;
    use crate::ral::testing::{self, Recorder};
    use proptest::prelude::*;

    /// Both units in one allocation, the second one `stride` bytes along.
    fn adc() -> ([&'static ral::adc::RegisterBlock; 2], Adc) {
        let blocks = testing::zeroed::<[ral::adc::RegisterBlock; 2]>();
        let stride = core::mem::size_of::<ral::adc::RegisterBlock>();
        // Safety: blocks is a valid, leaked register image for both units.
        let adc = unsafe { Adc::new(testing::ptr(blocks), stride) };
        ([&blocks[0], &blocks[1]], adc)
    }

    #[test]
    fn serialize_captures_fields() {
        let ([adc0, adc1], adc) = adc();
        adc1.CFG1.write(0b0111_1001);
        adc1.CFG2.write(CFG2::MUXSEL.mask() | 0b10);
        adc1.SC1A.write(SC1::COCO.mask() | 0x1F);
        adc1.PGA.write(PGA::PGAEN.mask() | (6 << 16));

        let mut buffer = [0; wire::max_size::<Registers>()];
        let len = adc.serialize_registers(1, &mut buffer).unwrap();
        let registers: Registers = wire::decode(&buffer[..len]).unwrap();

        assert_eq!(
            registers.cfg1,
            Some(Cfg1 {
                adlpc: Some(false),
                adiv: Some(ClockDivide::Div8),
                adlsmp: Some(SampleTime::Long),
                mode: Some(Resolution::Bits10),
                adiclk: Some(InputClock::BusHalf),
            })
        );
        assert_eq!(
            registers.cfg2.and_then(|cfg2| cfg2.muxsel),
            Some(MuxSelect::B)
        );
        assert_eq!(
            registers.cfg2.and_then(|cfg2| cfg2.adlsts),
            Some(LongSampleTime::Extra6)
        );
        assert_eq!(
            registers.sc1a,
            Some(Sc1 {
                coco: Some(true),
                aien: Some(false),
                diff: Some(false),
                adch: Some(0x1F),
            })
        );
        assert_eq!(registers.pga.and_then(|pga| pga.pgag), Some(Gain::X64));
        assert_eq!(registers.ra, Some(0));

        // ADC0 is a separate block.
        assert_eq!(adc0.CFG1.read(), 0);
        let adc0 = adc.read_registers(0).unwrap();
        assert_eq!(adc0.cfg1.and_then(|cfg1| cfg1.adiv), Some(ClockDivide::Div1));
    }

    /// Captured fields written back over either background keep exactly the
    /// bits the table covers.
    fn table_covers<F: Fields<Word = u32>>(raw: u32) -> bool {
        let covered = F::capture(u32::MAX).apply(0);
        let fields = F::capture(raw);
        fields.apply(0) == raw & covered && fields.apply(u32::MAX) == raw | !covered
    }

    proptest! {
        #[test]
        fn field_tables_round_trip(raw in any::<u32>()) {
            prop_assert!(table_covers::<Sc1>(raw));
            prop_assert!(table_covers::<Cfg1>(raw));
            prop_assert!(table_covers::<Cfg2>(raw));
            prop_assert!(table_covers::<Sc2>(raw));
            prop_assert!(table_covers::<Sc3>(raw));
            prop_assert!(table_covers::<Pga>(raw));
        }
    }

    #[test]
    fn reserved_patterns_are_reported() {
        let ([adc0, _], adc) = adc();
        // REFSEL = 0b11 and PGAG = 0b1111 are reserved.
        adc0.SC2.write(0b11);
        adc0.PGA.write(0xF << 16);
        let registers = adc.read_registers(0).unwrap();
        assert_eq!(
            registers.sc2.and_then(|sc2| sc2.refsel),
            Some(Reference::Reserved(0b11))
        );
        assert_eq!(
            registers.pga.and_then(|pga| pga.pgag),
            Some(Gain::Reserved(0xF))
        );
        assert_eq!(registers.pga.and_then(|pga| pga.pgaen), Some(false));
    }

    #[test]
    fn update_is_sparse() {
        let ([adc0, _], adc) = adc();
        adc0.CFG1.write(0xFFFF_FFFF);
        adc0.CV1.write(0x1234);
        adc0.OFS.write(0x0004);

        let registers = Registers {
            cfg1: Some(Cfg1 {
                mode: Some(Resolution::Bits8),
                ..Default::default()
            }),
            ofs: Some(0),
            ra: Some(0xFFFF),
            ..Default::default()
        };
        let mut buffer = [0; wire::max_size::<Registers>()];
        let len = wire::encode(&registers, &mut buffer).unwrap();
        adc.update_registers(0, &buffer[..len]).unwrap();

        assert_eq!(adc0.CFG1.read(), 0xFFFF_FFF3);
        assert_eq!(adc0.CV1.read(), 0x1234);
        // Present zero is still written.
        assert_eq!(adc0.OFS.read(), 0);
        assert_eq!(adc0.RA.read(), 0);
    }

    #[test]
    fn calibration_starts_after_configuration() {
        let sc3 = Recorder::new(0u32);
        let update = Sc3 {
            cal: Some(true),
            avge: Some(true),
            avgs: Some(Averaging::Samples32),
            ..Default::default()
        };
        ral::update_triggered(&sc3, &update);
        assert_eq!(*sc3.writes.borrow(), [0b0111, 0b1000_0111]);
    }

    #[test]
    fn unit_out_of_range() {
        let (_, adc) = adc();
        assert_eq!(adc.read_registers(2), Err(Error::OutOfRange));
        assert_eq!(
            adc.apply_registers(7, &Registers::default()),
            Err(Error::OutOfRange)
        );
    }
}
