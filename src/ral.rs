//! A RAL-like module for Kinetis K20 register access
//!
//! The register blocks here mirror the reference manual, with the per-channel
//! and per-timer register clusters represented as arrays of structs. Every
//! field is declared once, as a `Field` constant for the codecs, and as a
//! RAL-style module (`offset`, `mask`, `R`/`W`/`RW`) so the `ral-registers`
//! macros keep working.

#![allow(
    non_snake_case, // Compatibility with RAL
    non_upper_case_globals,
)]

pub mod adc;
pub mod dma;
pub mod dmamux;
pub mod pit;
pub mod sim;
pub mod tcd;

pub use ral_registers::read_reg;
pub use ral_registers::{RORegister, RWRegister, WORegister};

use crate::bits::{self, Fields, Triggered, Word};

/// DMA controller base address.
pub const DMA: *const () = 0x4000_8000 as _;
/// DMA multiplexer base address.
pub const DMAMUX: *const () = 0x4002_1000 as _;
/// Periodic interrupt timer base address.
pub const PIT: *const () = 0x4003_7000 as _;
/// ADC0 base address. ADC1 follows at [`ADC_STRIDE`].
pub const ADC0: *const () = 0x4003_B000 as _;
/// Distance between the ADC instances.
pub const ADC_STRIDE: usize = 0x8_0000;
/// Address of `SIM_SCGC6`, the first of the clock gating registers we use.
pub const SIM_SCGC: *const () = 0x4004_803C as _;

//
// Helper types for static memory
//
// Similar to the RAL's `Instance` type, but more copy.
//

pub(crate) struct Static<T>(pub(crate) *const T);
impl<T> core::ops::Deref for Static<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // Safety: pointer points to static memory (peripheral memory)
        unsafe { &*self.0 }
    }
}
impl<T> Clone for Static<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Static<T> {}

/// `N` identical register blocks, `stride` bytes apart.
pub(crate) struct Instances<T, const N: usize> {
    base: *const T,
    stride: usize,
}

impl<T, const N: usize> Instances<T, N> {
    pub(crate) const fn new(base: *const (), stride: usize) -> Self {
        Self {
            base: base.cast(),
            stride,
        }
    }

    /// The register block for instance `index`, if it exists.
    pub(crate) fn get(&self, index: usize) -> Option<Static<T>> {
        (index < N).then(|| {
            let addr = self.base.cast::<u8>().wrapping_add(index * self.stride);
            Static(addr.cast())
        })
    }
}

impl<T, const N: usize> Clone for Instances<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T, const N: usize> Copy for Instances<T, N> {}

/// Declares register fields.
///
/// `NAME[offset; width]` produces a `Field` constant named `NAME`, and a
/// module of the same name holding the RAL `offset` and `mask`.
macro_rules! fields {
    ($word:ty; $( $(#[$m:meta])* $name:ident [$offset:literal ; $width:literal] ),+ $(,)?) => {
        $(
            $(#[$m])*
            pub const $name: $crate::bits::Field = $crate::bits::Field::new($offset, $width);

            $(#[$m])*
            pub mod $name {
                pub const offset: $word = $offset;
                pub const mask: $word = (((1u64 << $width) - 1) as $word) << offset;
                pub mod R {}
                pub mod W {}
                pub mod RW {}
            }
        )+
    };
}
pub(crate) use fields;

/// Volatile access to one register.
///
/// Implemented for the RAL register types. The codecs only go through this
/// trait, so tests can stand in a register that records its writes.
pub trait Access {
    type Word: Word;
    fn read(&self) -> Self::Word;
    fn write(&self, value: Self::Word);
}

impl<W: Word> Access for RWRegister<W> {
    type Word = W;
    #[inline(always)]
    fn read(&self) -> W {
        RWRegister::read(self)
    }
    #[inline(always)]
    fn write(&self, value: W) {
        RWRegister::write(self, value)
    }
}

/// Read `register` and capture every field.
pub fn capture<R: Access, F: Fields<Word = R::Word>>(register: &R) -> F {
    F::capture(register.read())
}

/// Read-modify-write the present `fields` into `register`.
///
/// All present fields land in a single write. Nothing is written if no field
/// is present.
pub fn update<R: Access, F: Fields<Word = R::Word>>(register: &R, fields: &F) {
    if fields.is_empty() {
        return;
    }
    let raw = register.read();
    register.write(fields.apply(raw));
}

/// Like [`update`], but a present trigger field is written last, in its own
/// write, after the rest of the configuration has landed.
pub fn update_triggered<R: Access, F: Triggered<Word = R::Word>>(register: &R, fields: &F) {
    if fields.is_empty() {
        return;
    }
    let raw = register.read();
    let (configure, trigger) = bits::triggered_writes(fields, raw);
    register.write(configure);
    if let Some(trigger) = trigger {
        barrier();
        register.write(trigger);
    }
}

/// Write `value` to a write-only register, if present.
pub fn command<W: Copy>(register: &WORegister<W>, value: Option<W>) {
    if let Some(value) = value {
        register.write(value);
    }
}

/// Make sure earlier register writes complete before the next one issues.
#[inline(always)]
pub fn barrier() {
    cfg_if::cfg_if! {
        if #[cfg(all(target_arch = "arm", target_os = "none"))] {
            cortex_m::asm::dsb();
        } else {
            core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Host-side stand-ins for peripheral memory.

    use core::cell::{Cell, RefCell};
    use std::boxed::Box;
    use std::vec::Vec;

    use super::Access;
    use crate::bits::Word;

    /// Allocate a zeroed register block that lives for the rest of the test.
    pub fn zeroed<T>() -> &'static T {
        // Safety: register blocks are made of integers and UnsafeCells of
        // integers. All zeros is a valid value.
        Box::leak(Box::new(unsafe { core::mem::zeroed::<T>() }))
    }

    pub fn ptr<T>(block: &'static T) -> *const () {
        (block as *const T).cast()
    }

    /// Read back the last value written to a register, write-only or not.
    pub fn peek<R, W: Copy>(register: &R) -> W {
        // Safety: the RAL register types are a single cell holding `W`.
        unsafe { core::ptr::read_volatile((register as *const R).cast::<W>()) }
    }

    /// A register that logs every write.
    pub struct Recorder<W: Word> {
        value: Cell<W>,
        pub writes: RefCell<Vec<W>>,
    }

    impl<W: Word> Recorder<W> {
        pub fn new(value: W) -> Self {
            Self {
                value: Cell::new(value),
                writes: RefCell::new(Vec::new()),
            }
        }
    }

    impl<W: Word> Access for Recorder<W> {
        type Word = W;
        fn read(&self) -> W {
            self.value.get()
        }
        fn write(&self, value: W) {
            self.value.set(value);
            self.writes.borrow_mut().push(value);
        }
    }
}
