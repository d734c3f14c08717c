//! Channel multiplexer configuration (`DMAMUX_CHCFGn`).

use super::Channel;
use crate::bits::Fields;
use crate::ral::{self, dmamux::CHCFG, Access};
use crate::{wire, Result};

register! {
    /// Channel Configuration register
    pub struct Chcfg: u8 {
        /// Channel enable
        enbl: bool = CHCFG::ENBL,
        /// Periodic trigger enable, channels 0 to 3 only
        trig: bool = CHCFG::TRIG,
        /// Request source slot
        source: u8 = CHCFG::SOURCE,
    }
}

/// Reconfigure a multiplexer slot.
///
/// The slot is disabled before the new configuration is written, as the
/// reference manual requires. The new value is computed from the value read
/// before the disable.
fn reconfigure<R: Access<Word = u8>>(register: &R, chcfg: &Chcfg) {
    if chcfg.is_empty() {
        return;
    }
    let raw = register.read();
    register.write(0);
    register.write(chcfg.apply(raw));
}

impl Channel {
    pub fn read_mux(&self) -> Chcfg {
        ral::capture(self.mux_register())
    }

    pub fn apply_mux(&self, chcfg: &Chcfg) {
        reconfigure(self.mux_register(), chcfg);
    }

    pub fn serialize_mux(&self, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize CHCFG{}", self.index);
        wire::encode(&self.read_mux(), buffer)
    }

    pub fn update_mux(&self, bytes: &[u8]) -> Result<()> {
        let chcfg: Chcfg = wire::decode(bytes)?;
        log::debug!("update CHCFG{} {:?}", self.index, chcfg);
        self.apply_mux(&chcfg);
        Ok(())
    }
}
