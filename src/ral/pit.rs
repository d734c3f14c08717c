//! Periodic interrupt timer registers (chapter 37)

use super::{fields, RORegister, RWRegister};

/// Number of PIT timers on the K20.
pub const TIMERS: usize = 4;

#[repr(C)]
pub struct RegisterBlock {
    /// Module Control Register
    pub MCR: RWRegister<u32>,
    _reserved0: [u32; 63],
    pub TIMER: [Timer; TIMERS],
}

/// One timer's registers, 16 bytes apart.
#[repr(C)]
pub struct Timer {
    /// Timer Load Value Register
    pub LDVAL: RWRegister<u32>,
    /// Current Timer Value Register
    pub CVAL: RORegister<u32>,
    /// Timer Control Register
    pub TCTRL: RWRegister<u32>,
    /// Timer Flag Register
    pub TFLG: RWRegister<u32>,
}

const _: () = assert!(core::mem::offset_of!(RegisterBlock, TIMER) == 0x100);
const _: () = assert!(core::mem::size_of::<Timer>() == 0x10);

/// PIT Module Control Register (37.3.1/903)
pub mod MCR {
    super::fields!(u32;
        /// Module Disable
        MDIS[1; 1],
        /// Freeze
        FRZ[0; 1],
    );
}

/// Timer Control Register (37.3.4/905)
pub mod TCTRL {
    super::fields!(u32;
        /// Chain Mode
        CHN[2; 1],
        /// Timer Interrupt Enable
        TIE[1; 1],
        /// Timer Enable
        TEN[0; 1],
    );
}

/// Timer Flag Register (37.3.5/906)
pub mod TFLG {
    super::fields!(u32;
        /// Timer Interrupt Flag, write 1 to clear
        TIF[0; 1],
    );
}
