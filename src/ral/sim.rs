//! System integration module, clock gating registers only

use super::{fields, RWRegister};

/// `SIM_SCGC6` and `SIM_SCGC7`, which sit next to each other.
#[repr(C)]
pub struct RegisterBlock {
    /// System Clock Gating Control Register 6
    pub SCGC6: RWRegister<u32>,
    /// System Clock Gating Control Register 7
    pub SCGC7: RWRegister<u32>,
}

/// System Clock Gating Control Register 6 (12.2.13/256)
pub mod SCGC6 {
    super::fields!(u32;
        /// RTC Access Control
        RTC[29; 1],
        /// ADC0 Clock Gate Control
        ADC0[27; 1],
        /// FTM1 Clock Gate Control
        FTM1[25; 1],
        /// FTM0 Clock Gate Control
        FTM0[24; 1],
        /// PIT Clock Gate Control
        PIT[23; 1],
        /// PDB Clock Gate Control
        PDB[22; 1],
        /// USB DCD Clock Gate Control
        USBDCD[21; 1],
        /// CRC Clock Gate Control
        CRC[18; 1],
        /// I2S Clock Gate Control
        I2S[15; 1],
        /// SPI1 Clock Gate Control
        SPI1[13; 1],
        /// SPI0 Clock Gate Control
        SPI0[12; 1],
        /// FlexCAN0 Clock Gate Control
        FLEXCAN0[4; 1],
        /// DMA Mux Clock Gate Control
        DMAMUX[1; 1],
        /// Flash Memory Clock Gate Control
        FTFL[0; 1],
    );
}

/// System Clock Gating Control Register 7 (12.2.14/259)
pub mod SCGC7 {
    super::fields!(u32;
        /// DMA Clock Gate Control
        DMA[1; 1],
    );
}
