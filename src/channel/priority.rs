//! Channel arbitration priority (`DCHPRIn`).

use super::Channel;
use crate::ral::{self, dma::DCHPRI};
use crate::{wire, Result};

register! {
    /// Channel n Priority Register
    pub struct Dchpri: u8 {
        /// Enable channel preemption
        ecp: bool = DCHPRI::ECP,
        /// Disable preempt ability
        dpa: bool = DCHPRI::DPA,
        chpri: u8 = DCHPRI::CHPRI,
    }
}

impl Channel {
    pub fn read_priority(&self) -> Dchpri {
        ral::capture(self.priority_register())
    }

    pub fn apply_priority(&self, priority: &Dchpri) {
        ral::update(self.priority_register(), priority);
    }

    pub fn serialize_priority(&self, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize DCHPRI{}", self.index);
        wire::encode(&self.read_priority(), buffer)
    }

    pub fn update_priority(&self, bytes: &[u8]) -> Result<()> {
        let priority: Dchpri = wire::decode(bytes)?;
        log::debug!("update DCHPRI{} {:?}", self.index, priority);
        self.apply_priority(&priority);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::dma;

    #[test]
    fn priorities_follow_hardware_order() {
        let (block, _, dma) = dma();
        // DCHPRI3 is the first byte. Hardware resets each channel's priority
        // to its channel number.
        let raw: *const u8 = (&block.DCHPRI as *const ral::dma::ChannelPriorityRegisters).cast();
        for (offset, value) in [3u8, 2, 1, 0, 7, 6, 5, 4].into_iter().enumerate() {
            // Safety: offsets are inside the 16-byte priority block.
            unsafe { raw.cast_mut().add(offset).write_volatile(value) };
        }
        for index in 0..8 {
            // Safety: one handle per index.
            let channel = unsafe { dma.channel(index).unwrap() };
            assert_eq!(channel.read_priority().chpri, Some(index as u8));
        }
    }

    #[test]
    fn update_keeps_absent_fields() {
        let (block, _, dma) = dma();
        // Safety: one handle per index.
        let channel = unsafe { dma.channel(9).unwrap() };
        block.DCHPRI[9].write(DCHPRI::ECP.mask() as u8 | 9);

        let update = Dchpri {
            chpri: Some(2),
            dpa: Some(true),
            ..Default::default()
        };
        let mut buffer = [0; wire::max_size::<Dchpri>()];
        let len = wire::encode(&update, &mut buffer).unwrap();
        channel.update_priority(&buffer[..len]).unwrap();
        assert_eq!(block.DCHPRI[9].read(), 0b1100_0010);
        // Neighbors in the same group of four are untouched.
        assert_eq!(block.DCHPRI[8].read(), 0);
        assert_eq!(block.DCHPRI[10].read(), 0);
    }
}
