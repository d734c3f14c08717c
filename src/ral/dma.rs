//! DMA register blocks and fields

use super::{fields, tcd, RORegister, RWRegister, WORegister};

use core::ops::Index;

/// Number of DMA channels on the K20.
pub const CHANNELS: usize = 16;

/// DMA registers.
#[repr(C)]
pub struct RegisterBlock {
    /// Control Register
    pub CR: RWRegister<u32>,
    /// Error Status Register
    pub ES: RORegister<u32>,
    _reserved1: [u32; 1],
    /// Enable Request Register
    pub ERQ: RWRegister<u32>,
    _reserved2: [u32; 1],
    /// Enable Error Interrupt Register
    pub EEI: RWRegister<u32>,
    /// Clear Enable Error Interrupt Register
    pub CEEI: WORegister<u8>,
    /// Set Enable Error Interrupt Register
    pub SEEI: WORegister<u8>,
    /// Clear Enable Request Register
    pub CERQ: WORegister<u8>,
    /// Set Enable Request Register
    pub SERQ: WORegister<u8>,
    /// Clear DONE Status Bit Register
    pub CDNE: WORegister<u8>,
    /// Set START Bit Register
    pub SSRT: WORegister<u8>,
    /// Clear Error Register
    pub CERR: WORegister<u8>,
    /// Clear Interrupt Request Register
    pub CINT: WORegister<u8>,
    _reserved3: [u32; 1],
    /// Interrupt Request Register
    pub INT: RWRegister<u32>,
    _reserved4: [u32; 1],
    /// Error Register
    pub ERR: RWRegister<u32>,
    _reserved5: [u32; 1],
    /// Hardware Request Status Register
    pub HRS: RORegister<u32>,
    _reserved6: [u32; 50],
    /// Channel Priority Registers
    pub DCHPRI: ChannelPriorityRegisters,
    _reserved7: [u32; 956],
    /// Transfer Control Descriptors
    pub TCD: [tcd::RegisterBlock; CHANNELS],
}

// Did I calculate my reservations correctly?
const _: () = assert!(core::mem::offset_of!(RegisterBlock, HRS) == 0x34);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, DCHPRI) == 0x100);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, TCD) == 0x1000);

/// Wrapper for channel priority registers
///
/// Channel priority registers cannot be accessed with
/// normal channel indexes. This adapter makes it so that
/// we *can* access them with channel indexes by converting
/// the channel number to a reference to the priority
/// register.
#[repr(transparent)]
pub struct ChannelPriorityRegisters([RWRegister<u8>; CHANNELS]);

impl Index<usize> for ChannelPriorityRegisters {
    type Output = RWRegister<u8>;
    fn index(&self, channel: usize) -> &RWRegister<u8> {
        &self.0[priority_index(channel)]
    }
}

/// Pattern follows
///
///   3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, ...
///
/// for all channels. NXP keeping us on our toes.
pub(crate) const fn priority_index(channel: usize) -> usize {
    4 * (channel / 4) + (3 - (channel % 4))
}

/// Control Register (21.3.1/390)
pub mod CR {
    super::fields!(u32;
        /// Cancel Transfer
        CX[17; 1],
        /// Error Cancel Transfer
        ECX[16; 1],
        /// Enable Minor Loop Mapping
        EMLM[7; 1],
        /// Continuous Link Mode
        CLM[6; 1],
        /// Halt DMA Operations
        HALT[5; 1],
        /// Halt On Error
        HOE[4; 1],
        /// Enable Round Robin Channel Arbitration
        ERCA[2; 1],
        /// Enable Debug
        EDBG[1; 1],
    );
}

/// Error Status Register (21.3.2/392)
pub mod ES {
    super::fields!(u32;
        /// Logical OR of all ERR status bits
        VLD[31; 1],
        /// Transfer Cancelled
        ECX[16; 1],
        /// Channel Priority Error
        CPE[14; 1],
        /// Error Channel Number or Cancelled Channel Number
        ERRCHN[8; 4],
        /// Source Address Error
        SAE[7; 1],
        /// Source Offset Error
        SOE[6; 1],
        /// Destination Address Error
        DAE[5; 1],
        /// Destination Offset Error
        DOE[4; 1],
        /// NBYTES/CITER Configuration Error
        NCE[3; 1],
        /// Scatter/Gather Configuration Error
        SGE[2; 1],
        /// Source Bus Error
        SBE[1; 1],
        /// Destination Bus Error
        DBE[0; 1],
    );
}

/// Channel n Priority Register (21.3.16/414)
pub mod DCHPRI {
    super::fields!(u8;
        /// Enable Channel Preemption
        ECP[7; 1],
        /// Disable Preempt Ability
        DPA[6; 1],
        /// Channel n Arbitration Priority
        CHPRI[0; 4],
    );
}

#[cfg(test)]
mod tests {
    #[test]
    fn priority_registers_are_swizzled() {
        let order: [usize; 8] = core::array::from_fn(super::priority_index);
        assert_eq!(order, [3, 2, 1, 0, 7, 6, 5, 4]);
        assert_eq!(super::priority_index(15), 12);
    }
}
