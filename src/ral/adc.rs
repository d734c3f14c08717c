//! Analog-to-digital converter registers (chapter 31)

use super::{fields, RORegister, RWRegister};

/// Number of ADC units on the K20.
pub const UNITS: usize = 2;

#[repr(C)]
pub struct RegisterBlock {
    pub SC1A: RWRegister<u32>,
    pub SC1B: RWRegister<u32>,
    pub CFG1: RWRegister<u32>,
    pub CFG2: RWRegister<u32>,
    pub RA: RORegister<u32>,
    pub RB: RORegister<u32>,
    pub CV1: RWRegister<u32>,
    pub CV2: RWRegister<u32>,
    pub SC2: RWRegister<u32>,
    pub SC3: RWRegister<u32>,
    pub OFS: RWRegister<u32>,
    pub PG: RWRegister<u32>,
    pub MG: RWRegister<u32>,
    pub CLPD: RWRegister<u32>,
    pub CLPS: RWRegister<u32>,
    pub CLP4: RWRegister<u32>,
    pub CLP3: RWRegister<u32>,
    pub CLP2: RWRegister<u32>,
    pub CLP1: RWRegister<u32>,
    pub CLP0: RWRegister<u32>,
    pub PGA: RWRegister<u32>,
    pub CLMD: RWRegister<u32>,
    pub CLMS: RWRegister<u32>,
    pub CLM4: RWRegister<u32>,
    pub CLM3: RWRegister<u32>,
    pub CLM2: RWRegister<u32>,
    pub CLM1: RWRegister<u32>,
    pub CLM0: RWRegister<u32>,
}

const _: () = assert!(core::mem::offset_of!(RegisterBlock, PGA) == 0x50);
const _: () = assert!(core::mem::size_of::<RegisterBlock>() == 0x70);

/// Status and Control Registers 1 (31.3.1/654)
pub mod SC1 {
    super::fields!(u32;
        /// Conversion Complete Flag
        COCO[7; 1],
        /// Interrupt Enable
        AIEN[6; 1],
        /// Differential Mode Enable
        DIFF[5; 1],
        /// Input channel select
        ADCH[0; 5],
    );
}

/// Configuration Register 1 (31.3.2/657)
pub mod CFG1 {
    super::fields!(u32;
        /// Low-Power Configuration
        ADLPC[7; 1],
        /// Clock Divide Select
        ADIV[5; 2],
        /// Sample Time Configuration
        ADLSMP[4; 1],
        /// Conversion mode selection
        MODE[2; 2],
        /// Input Clock Select
        ADICLK[0; 2],
    );
}

/// Configuration Register 2 (31.3.3/658)
pub mod CFG2 {
    super::fields!(u32;
        /// ADC Mux Select
        MUXSEL[4; 1],
        /// Asynchronous Clock Output Enable
        ADACKEN[3; 1],
        /// High-Speed Configuration
        ADHSC[2; 1],
        /// Long Sample Time Select
        ADLSTS[0; 2],
    );
}

/// Status and Control Register 2 (31.3.6/661)
pub mod SC2 {
    super::fields!(u32;
        /// Conversion Active
        ADACT[7; 1],
        /// Conversion Trigger Select
        ADTRG[6; 1],
        /// Compare Function Enable
        ACFE[5; 1],
        /// Compare Function Greater Than Enable
        ACFGT[4; 1],
        /// Compare Function Range Enable
        ACREN[3; 1],
        /// DMA Enable
        DMAEN[2; 1],
        /// Voltage Reference Selection
        REFSEL[0; 2],
    );
}

/// Status and Control Register 3 (31.3.7/663)
pub mod SC3 {
    super::fields!(u32;
        /// Calibration
        CAL[7; 1],
        /// Calibration Failed Flag
        CALF[6; 1],
        /// Continuous Conversion Enable
        ADCO[3; 1],
        /// Hardware Average Enable
        AVGE[2; 1],
        /// Hardware Average Select
        AVGS[0; 2],
    );
}

/// PGA Register (31.3.11/666)
pub mod PGA {
    super::fields!(u32;
        /// PGA Enable
        PGAEN[23; 1],
        /// PGA Low-Power Mode Control
        PGALPB[20; 1],
        /// PGA Gain Setting
        PGAG[16; 4],
    );
}

bit_enum! {
    /// ADC input clock
    pub enum InputClock {
        Bus = 0b00,
        /// Bus clock divided by 2
        BusHalf = 0b01,
        Alternate = 0b10,
        Asynchronous = 0b11,
    }
}

bit_enum! {
    /// Input clock divider
    pub enum ClockDivide {
        Div1 = 0b00,
        Div2 = 0b01,
        Div4 = 0b10,
        Div8 = 0b11,
    }
}

bit_enum! {
    pub enum SampleTime {
        Short = 0,
        Long = 1,
    }
}

bit_enum! {
    /// Conversion resolution, single-ended
    ///
    /// Differential conversions are one bit wider.
    pub enum Resolution {
        Bits8 = 0b00,
        Bits12 = 0b01,
        Bits10 = 0b10,
        Bits16 = 0b11,
    }
}

bit_enum! {
    /// Extra ADCK cycles added in long sample mode
    pub enum LongSampleTime {
        Extra20 = 0b00,
        Extra12 = 0b01,
        Extra6 = 0b10,
        Extra2 = 0b11,
    }
}

bit_enum! {
    /// Channel mux select
    pub enum MuxSelect {
        A = 0,
        B = 1,
    }
}

bit_enum! {
    pub enum Trigger {
        Software = 0,
        Hardware = 1,
    }
}

bit_enum! {
    pub enum Reference {
        /// VREFH and VREFL
        Vref = 0b00,
        /// VALTH and VALTL
        Valt = 0b01,
    }
}

bit_enum! {
    /// Hardware averaging sample count
    pub enum Averaging {
        Samples4 = 0b00,
        Samples8 = 0b01,
        Samples16 = 0b10,
        Samples32 = 0b11,
    }
}

bit_enum! {
    pub enum Gain {
        X1 = 0,
        X2 = 1,
        X4 = 2,
        X8 = 3,
        X16 = 4,
        X32 = 5,
        X64 = 6,
    }
}
