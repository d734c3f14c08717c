//! Transfer control descriptor registers
//!
//! 32 bytes per channel. Three of the words have more than one layout:
//! `NBYTES` (see [`NBYTES`]) and the `CITER` / `BITER` pair (see [`ITER`]).

use super::{fields, RWRegister};

/// One channel's TCD (21.3.17/415 – 21.3.31/427).
#[repr(C, align(32))]
pub struct RegisterBlock {
    pub SADDR: RWRegister<u32>,
    pub SOFF: RWRegister<u16>,
    pub ATTR: RWRegister<u16>,
    pub NBYTES: RWRegister<u32>,
    pub SLAST: RWRegister<u32>,
    pub DADDR: RWRegister<u32>,
    pub DOFF: RWRegister<u16>,
    pub CITER: RWRegister<u16>,
    pub DLASTSGA: RWRegister<u32>,
    pub CSR: RWRegister<u16>,
    pub BITER: RWRegister<u16>,
}

const _: () = assert!(core::mem::size_of::<RegisterBlock>() == 32);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, CSR) == 0x1C);

impl RegisterBlock {
    /// Zero every word of the descriptor.
    ///
    /// `CSR` goes first so that a stale `START` can't fire while the rest of
    /// the descriptor is half cleared.
    pub fn reset(&self) {
        self.CSR.write(0);
        self.SADDR.write(0);
        self.SOFF.write(0);
        self.ATTR.write(0);
        self.NBYTES.write(0);
        self.SLAST.write(0);
        self.DADDR.write(0);
        self.DOFF.write(0);
        self.CITER.write(0);
        self.DLASTSGA.write(0);
        self.BITER.write(0);
    }
}

/// Transfer attributes (21.3.19/416)
pub mod ATTR {
    super::fields!(u16;
        /// Source address modulo
        SMOD[11; 5],
        /// Source data transfer size
        SSIZE[8; 3],
        /// Destination address modulo
        DMOD[3; 5],
        /// Destination data transfer size
        DSIZE[0; 3],
    );
}

/// Minor byte count (21.3.20/417 – 21.3.22/418)
///
/// With minor loop mapping disabled (`CR[EMLM] = 0`) the whole word is the
/// byte count. With mapping enabled, the top two bits enable a minor loop
/// offset; when either is set the offset occupies `MLOFF`, and the byte count
/// shrinks to ten bits.
pub mod NBYTES {
    super::fields!(u32;
        /// Source minor loop offset enable
        SMLOE[31; 1],
        /// Destination minor loop offset enable
        DMLOE[30; 1],
        /// Byte count, mapping enabled and offsets disabled
        NBYTES_MLOFFNO[0; 30],
        /// Signed minor loop offset
        MLOFF[10; 20],
        /// Byte count, mapping and offsets enabled
        NBYTES_MLOFFYES[0; 10],
    );
}

/// Current and beginning major iteration counts (21.3.26/421 – 21.3.31/427)
///
/// `CITER` and `BITER` share a layout. `ELINK` selects between a 15-bit
/// count, and a 9-bit count plus the channel to link to.
pub mod ITER {
    super::fields!(u16;
        /// Enable channel-to-channel linking on minor loop completion
        ELINK[15; 1],
        /// Minor loop link channel
        LINKCH[9; 4],
        /// Iteration count, linking enabled
        ITER_ELINKYES[0; 9],
        /// Iteration count, linking disabled
        ITER_ELINKNO[0; 15],
    );
}

/// Control and status (21.3.29/424)
pub mod CSR {
    super::fields!(u16;
        /// Bandwidth control
        BWC[14; 2],
        /// Major loop link channel
        MAJORLINKCH[8; 4],
        /// Channel done
        DONE[7; 1],
        /// Channel active
        ACTIVE[6; 1],
        /// Enable channel-to-channel linking on major loop completion
        MAJORELINK[5; 1],
        /// Enable scatter/gather processing
        ESG[4; 1],
        /// Disable request
        DREQ[3; 1],
        /// Interrupt when major counter is half complete
        INTHALF[2; 1],
        /// Interrupt when major iteration count completes
        INTMAJOR[1; 1],
        /// Channel start
        START[0; 1],
    );
}

bit_enum! {
    /// Source and destination transfer size
    pub enum TransferSize {
        Bits8 = 0b000,
        Bits16 = 0b001,
        Bits32 = 0b010,
        /// 16-byte burst
        Bytes16 = 0b100,
    }
}

bit_enum! {
    /// DMA bandwidth control
    pub enum BandwidthControl {
        /// No eDMA engine stalls
        NoStall = 0b00,
        /// DMA engine stalls for 4 cycles after each R/W
        Stall4Cycles = 0b10,
        /// DMA engine stalls for 8 cycles after each R/W
        Stall8Cycles = 0b11,
    }
}
