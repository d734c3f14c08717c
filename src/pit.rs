//! Periodic interrupt timer.
//!
//! Two messages: [`Registers`] for the module-wide `MCR`, and [`TimerConfig`]
//! for each of the four timers.

use serde::{Deserialize, Serialize};

use crate::bits::{Field, Fields, Triggered};
use crate::ral::{
    self,
    pit::{MCR, TCTRL, TFLG, TIMERS},
    Static,
};
use crate::{wire, Error, Result};

register! {
    /// PIT Module Control Register
    pub struct Mcr: u32 {
        mdis: bool = MCR::MDIS,
        frz: bool = MCR::FRZ,
    }
}

register! {
    /// Timer Control Register
    pub struct Tctrl: u32 {
        chn: bool = TCTRL::CHN,
        tie: bool = TCTRL::TIE,
        ten: bool = TCTRL::TEN,
    }
}

impl Triggered for Tctrl {
    const TRIGGER: Field = TCTRL::TEN;
    fn trigger(&self) -> Option<bool> {
        self.ten
    }
}

register! {
    /// Timer Flag Register
    pub struct Tflg: u32 {
        tif: bool = TFLG::TIF,
    }
}

/// Module-wide PIT registers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct Registers {
    pub mcr: Option<Mcr>,
}

/// One timer's registers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct TimerConfig {
    pub ldval: Option<u32>,
    /// Current count. Read-only; ignored on update.
    pub cval: Option<u32>,
    pub tctrl: Option<Tctrl>,
    /// Writing `true` clears a pending flag.
    pub tflg: Option<Tflg>,
}

/// The periodic interrupt timer.
pub struct Pit {
    registers: Static<ral::pit::RegisterBlock>,
}

// Safety: OK to share in a static context. Every method is a volatile
// register access.
unsafe impl Sync for Pit {}

impl Pit {
    /// # Safety
    ///
    /// `pit` must point at the PIT register block.
    pub const unsafe fn new(pit: *const ()) -> Self {
        Self {
            registers: Static(pit.cast()),
        }
    }

    fn timer(&self, index: usize) -> Result<&ral::pit::Timer> {
        self.registers.TIMER.get(index).ok_or_else(|| {
            log::warn!("PIT timer {} out of range (0..{})", index, TIMERS);
            Error::OutOfRange
        })
    }

    pub fn read_registers(&self) -> Registers {
        Registers {
            mcr: Some(ral::capture(&self.registers.MCR)),
        }
    }

    pub fn apply_registers(&self, registers: &Registers) {
        if let Some(mcr) = &registers.mcr {
            ral::update(&self.registers.MCR, mcr);
        }
    }

    pub fn serialize_registers(&self, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize PIT registers");
        wire::encode(&self.read_registers(), buffer)
    }

    pub fn update_registers(&self, bytes: &[u8]) -> Result<()> {
        let registers: Registers = wire::decode(bytes)?;
        log::debug!("update PIT registers {:?}", registers);
        self.apply_registers(&registers);
        Ok(())
    }

    /// Capture timer `index`.
    pub fn read_timer_config(&self, index: usize) -> Result<TimerConfig> {
        let timer = self.timer(index)?;
        Ok(TimerConfig {
            ldval: Some(timer.LDVAL.read()),
            cval: Some(timer.CVAL.read()),
            tctrl: Some(ral::capture(&timer.TCTRL)),
            tflg: Some(ral::capture(&timer.TFLG)),
        })
    }

    /// Apply `config` to timer `index`.
    ///
    /// The load value lands before the control register, and `TEN` is set
    /// only once the rest of `TCTRL` is written, so an enabled timer always
    /// starts from the new configuration.
    pub fn apply_timer_config(&self, index: usize, config: &TimerConfig) -> Result<()> {
        let timer = self.timer(index)?;
        if let Some(ldval) = config.ldval {
            timer.LDVAL.write(ldval);
        }
        if config.cval.is_some() {
            log::debug!("PIT timer {}: ignoring read-only CVAL", index);
        }
        if let Some(tflg) = &config.tflg {
            // Write-one-to-clear. Don't read back a pending flag and clear it
            // by accident.
            if !tflg.is_empty() {
                timer.TFLG.write(tflg.apply(0));
            }
        }
        if let Some(tctrl) = &config.tctrl {
            ral::update_triggered(&timer.TCTRL, tctrl);
        }
        Ok(())
    }

    pub fn serialize_timer_config(&self, index: usize, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize PIT timer {}", index);
        wire::encode(&self.read_timer_config(index)?, buffer)
    }

    pub fn update_timer_config(&self, index: usize, bytes: &[u8]) -> Result<()> {
        // Range check first. A bad index is reported as such, even alongside
        // a bad message.
        self.timer(index)?;
        let config: TimerConfig = wire::decode(bytes)?;
        log::debug!("update PIT timer {} {:?}", index, config);
        self.apply_timer_config(index, &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ral::testing::{self, Recorder};

    fn pit() -> (&'static ral::pit::RegisterBlock, Pit) {
        let block = testing::zeroed::<ral::pit::RegisterBlock>();
        // Safety: block is a valid, leaked register image.
        let pit = unsafe { Pit::new(testing::ptr(block)) };
        (block, pit)
    }

    #[test]
    fn timer_config_round_trip() {
        let (block, pit) = pit();
        let timer = &block.TIMER[2];
        timer.LDVAL.write(47_999);
        timer.TCTRL.write(TCTRL::TIE.mask() | TCTRL::TEN.mask());
        timer.TFLG.write(1);

        let mut buffer = [0; wire::max_size::<TimerConfig>()];
        let len = pit.serialize_timer_config(2, &mut buffer).unwrap();
        let config: TimerConfig = wire::decode(&buffer[..len]).unwrap();
        assert_eq!(config.ldval, Some(47_999));
        assert_eq!(config.cval, Some(0));
        assert_eq!(
            config.tctrl,
            Some(Tctrl {
                chn: Some(false),
                tie: Some(true),
                ten: Some(true),
            })
        );
        assert_eq!(config.tflg, Some(Tflg { tif: Some(true) }));

        // Other timers are untouched by timer 2's registers.
        let other = pit.read_timer_config(1).unwrap();
        assert_eq!(other.ldval, Some(0));
    }

    #[test]
    fn out_of_range_timer() {
        let (_, pit) = pit();
        let mut buffer = [0; 64];
        assert_eq!(
            pit.serialize_timer_config(TIMERS, &mut buffer),
            Err(Error::OutOfRange)
        );
        assert_eq!(pit.update_timer_config(4, &[0; 4]), Err(Error::OutOfRange));
    }

    #[test]
    fn partial_tctrl_update() {
        let (block, pit) = pit();
        let timer = &block.TIMER[0];
        timer.TCTRL.write(TCTRL::CHN.mask() | TCTRL::TIE.mask());

        let config = TimerConfig {
            tctrl: Some(Tctrl {
                tie: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        pit.apply_timer_config(0, &config).unwrap();
        assert_eq!(timer.TCTRL.read(), TCTRL::CHN.mask());
        assert_eq!(timer.LDVAL.read(), 0);
    }

    #[test]
    fn enable_is_written_last() {
        let tctrl = Recorder::new(0u32);
        let update = Tctrl {
            chn: Some(true),
            tie: Some(true),
            ten: Some(true),
        };
        ral::update_triggered(&tctrl, &update);
        assert_eq!(*tctrl.writes.borrow(), [0b110, 0b111]);
    }

    #[test]
    fn mcr_update() {
        let (block, pit) = pit();
        block.MCR.write(MCR::MDIS.mask());
        let registers = Registers {
            mcr: Some(Mcr {
                mdis: Some(false),
                frz: Some(true),
            }),
        };
        let mut buffer = [0; wire::max_size::<Registers>()];
        let len = wire::encode(&registers, &mut buffer).unwrap();
        pit.update_registers(&buffer[..len]).unwrap();
        assert_eq!(block.MCR.read(), MCR::FRZ.mask());
        assert_eq!(pit.read_registers(), registers);
    }
}
