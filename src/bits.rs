//! Bit-field primitives and presence-tracked register fields.
//!
//! Every register codec in this crate is built from the same three pieces:
//!
//! - [`Field`], a bit range (offset and width) inside a register word.
//! - [`capture`] and [`update`], which move a field between a raw register
//!   word and an `Option`. `Some` means the field is present; a present field
//!   is always written, even when its value is zero.
//! - The `register!` macro, which turns a table of fields
//!   into a message struct and its [`Fields`] implementation.

/// A register word: `u8`, `u16`, or `u32`.
pub trait Word: Copy + Eq + core::fmt::Debug {
    /// Widen to `u32`.
    fn into_u32(self) -> u32;
    /// Narrow from `u32`, dropping any bits above the word width.
    fn from_u32(raw: u32) -> Self;
}

macro_rules! impl_word {
    ($($ty:ty),+) => {
        $(
            impl Word for $ty {
                #[inline(always)]
                fn into_u32(self) -> u32 {
                    self as u32
                }
                #[inline(always)]
                fn from_u32(raw: u32) -> Self {
                    raw as $ty
                }
            }
        )+
    };
}

impl_word!(u8, u16, u32);

#[inline(always)]
const fn low_mask(width: u32) -> u32 {
    if width >= u32::BITS {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// Returns the `width` bits of `raw` starting at bit `shift`.
#[inline(always)]
pub fn extract<W: Word>(raw: W, width: u32, shift: u32) -> u32 {
    debug_assert!(width > 0 && shift + width <= u32::BITS);
    (raw.into_u32() >> shift) & low_mask(width)
}

/// Replaces bits `[shift, shift + width)` of `raw` with the low `width` bits
/// of `value`.
///
/// Value bits above `width` are silently dropped. The field must fit in 32
/// bits.
#[inline(always)]
pub fn insert<W: Word>(raw: W, width: u32, shift: u32, value: u32) -> W {
    debug_assert!(width > 0 && shift + width <= u32::BITS);
    let mask = low_mask(width) << shift;
    W::from_u32((raw.into_u32() & !mask) | ((value & low_mask(width)) << shift))
}

/// Sign-extend the low `width` bits of `value`.
#[inline(always)]
pub fn sign_extend(value: u32, width: u32) -> i32 {
    debug_assert!(width > 0 && width <= u32::BITS);
    let unused = u32::BITS - width;
    ((value << unused) as i32) >> unused
}

/// A bit range inside a register word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    offset: u32,
    width: u32,
}

impl Field {
    /// Panics if the field doesn't fit in a 32-bit word. In a `const`, that's
    /// a build error.
    pub const fn new(offset: u32, width: u32) -> Self {
        assert!(width > 0 && offset + width <= u32::BITS);
        Self { offset, width }
    }

    /// A single-bit flag.
    pub const fn bit(offset: u32) -> Self {
        Self::new(offset, 1)
    }

    pub const fn offset(self) -> u32 {
        self.offset
    }

    pub const fn width(self) -> u32 {
        self.width
    }

    /// The field's bits, in place.
    pub const fn mask(self) -> u32 {
        low_mask(self.width) << self.offset
    }

    #[inline(always)]
    pub fn extract<W: Word>(self, raw: W) -> u32 {
        extract(raw, self.width, self.offset)
    }

    #[inline(always)]
    pub fn insert<W: Word>(self, raw: W, value: u32) -> W {
        insert(raw, self.width, self.offset, value)
    }

    #[inline(always)]
    pub fn is_set<W: Word>(self, raw: W) -> bool {
        self.extract(raw) != 0
    }
}

/// Construct a field value from its bits.
///
/// Returns `None` for bit patterns the type can't represent.
pub trait FromBits: Sized {
    fn from_bits(bits: u32) -> Option<Self>;
}

/// Convert a field value into its bits.
pub trait IntoBits {
    fn into_bits(self) -> u32;
}

impl FromBits for bool {
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

impl IntoBits for bool {
    fn into_bits(self) -> u32 {
        self as u32
    }
}

macro_rules! impl_unsigned_bits {
    ($($ty:ty),+) => {
        $(
            impl FromBits for $ty {
                fn from_bits(bits: u32) -> Option<Self> {
                    <$ty>::try_from(bits).ok()
                }
            }

            impl IntoBits for $ty {
                fn into_bits(self) -> u32 {
                    self as u32
                }
            }
        )+
    };
}

impl_unsigned_bits!(u8, u16, u32);

// Signed values only ever fill a whole register, so the bits are
// reinterpreted rather than sign-extended.
impl FromBits for i16 {
    fn from_bits(bits: u32) -> Option<Self> {
        Some(bits as u16 as i16)
    }
}

impl IntoBits for i16 {
    fn into_bits(self) -> u32 {
        self as u16 as u32
    }
}

impl FromBits for i32 {
    fn from_bits(bits: u32) -> Option<Self> {
        Some(bits as i32)
    }
}

impl IntoBits for i32 {
    fn into_bits(self) -> u32 {
        self as u32
    }
}

/// Read `field` out of `raw` as a present value.
#[inline]
pub fn capture<W: Word, T: FromBits>(raw: W, field: Field) -> Option<T> {
    T::from_bits(field.extract(raw))
}

/// Write `value` into `field` of `raw` if it's present.
#[inline]
pub fn update<W: Word, T: IntoBits>(raw: W, field: Field, value: Option<T>) -> W {
    match value {
        Some(value) => field.insert(raw, value.into_bits()),
        None => raw,
    }
}

/// A message that mirrors one register word, field by field.
///
/// Implemented by the `register!` macro.
pub trait Fields: Sized {
    /// The register's access width.
    type Word: Word;

    /// Capture every field of `raw`.
    fn capture(raw: Self::Word) -> Self;

    /// Write each present field into `raw`, leaving all other bits alone.
    fn apply(&self, raw: Self::Word) -> Self::Word;

    /// `true` if no field is present.
    fn is_empty(&self) -> bool;
}

/// A register with one field that starts hardware activity as soon as it's
/// written.
///
/// The trigger must only be written once every other field already holds its
/// new value. See [`triggered_writes`].
pub trait Triggered: Fields {
    const TRIGGER: Field;

    /// The requested trigger value, if any.
    fn trigger(&self) -> Option<bool>;
}

/// Compute the write sequence for a register with a trigger field.
///
/// The first word applies every present field except the trigger, which
/// keeps its value from `raw`. If the trigger is present, the second word is
/// the full update and must be written after the first.
pub fn triggered_writes<F: Triggered>(fields: &F, raw: F::Word) -> (F::Word, Option<F::Word>) {
    let next = fields.apply(raw);
    match fields.trigger() {
        Some(_) => {
            let configure = F::TRIGGER.insert(next, F::TRIGGER.extract(raw));
            (configure, Some(next))
        }
        None => (next, None),
    }
}

/// Declare an enumerated register field.
///
/// Each variant is given its bit pattern. Patterns without a variant are
/// reserved, and are carried as `Reserved` so that a read still reports what
/// the hardware holds.
macro_rules! bit_enum {
    (
        $(#[$m:meta])*
        pub enum $name:ident {
            $( $(#[$vm:meta])* $variant:ident = $bits:expr, )+
        }
    ) => {
        $(#[$m])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq,
            serde::Serialize, serde::Deserialize, hubpack::SerializedSize,
        )]
        pub enum $name {
            $( $(#[$vm])* $variant, )+
            /// A reserved bit pattern
            Reserved(u8),
        }

        impl $crate::bits::FromBits for $name {
            fn from_bits(bits: u32) -> Option<Self> {
                $(
                    if bits == $bits {
                        return Some($name::$variant);
                    }
                )+
                let raw = u8::try_from(bits).ok()?;
                log::warn!("{}: reserved encoding {:#x}", stringify!($name), raw);
                Some($name::Reserved(raw))
            }
        }

        impl $crate::bits::IntoBits for $name {
            fn into_bits(self) -> u32 {
                match self {
                    $( $name::$variant => $bits, )+
                    $name::Reserved(raw) => raw as u32,
                }
            }
        }
    };
}

/// Declare the message for one register word from its field table.
///
/// ```ignore
/// register! {
///     /// Timer control register.
///     pub struct Tctrl: u32 {
///         chn: bool = TCTRL::CHN,
///         tie: bool = TCTRL::TIE,
///         ten: bool = TCTRL::TEN,
///     }
/// }
/// ```
///
/// Every field becomes an `Option`. Capturing reads all of them; applying
/// writes only the present ones.
macro_rules! register {
    (
        $(#[$m:meta])*
        pub struct $name:ident : $word:ty {
            $( $(#[$fm:meta])* $field:ident : $ty:ty = $desc:path, )+
        }
    ) => {
        $(#[$m])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq,
            serde::Serialize, serde::Deserialize, hubpack::SerializedSize,
        )]
        pub struct $name {
            $( $(#[$fm])* pub $field: Option<$ty>, )+
        }

        impl $crate::bits::Fields for $name {
            type Word = $word;

            fn capture(raw: $word) -> Self {
                Self {
                    $( $field: $crate::bits::capture(raw, $desc), )+
                }
            }

            fn apply(&self, raw: $word) -> $word {
                let mut raw = raw;
                $( raw = $crate::bits::update(raw, $desc, self.$field); )+
                raw
            }

            fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )+
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NIBBLE: Field = Field::new(8, 4);
    const FLAG: Field = Field::bit(15);

    register! {
        pub struct Sample: u16 {
            flag: bool = FLAG,
            nibble: u8 = NIBBLE,
        }
    }

    impl Triggered for Sample {
        const TRIGGER: Field = FLAG;
        fn trigger(&self) -> Option<bool> {
            self.flag
        }
    }

    #[test]
    fn extract_insert() {
        assert_eq!(extract(0xABCD_u16, 4, 4), 0xC);
        assert_eq!(insert(0xABCD_u16, 4, 4, 0x3), 0xAB3D);
        assert_eq!(insert(0u32, 32, 0, 0xDEAD_BEEF), 0xDEAD_BEEF);
        assert_eq!(extract(0xDEAD_BEEF_u32, 32, 0), 0xDEAD_BEEF);
    }

    #[test]
    fn oversized_values_are_truncated() {
        assert_eq!(insert(0u32, 4, 8, 0x1F), 0xF00);
        assert_eq!(insert(0u8, 3, 6, 0x7), 0xC0);
    }

    #[test]
    fn insert_only_touches_the_field() {
        let raw = NIBBLE.insert(0xAAAA_AAAA_u32, 0x5);
        assert_eq!(raw & !NIBBLE.mask(), 0xAAAA_AAAA & !NIBBLE.mask());
        assert_eq!(NIBBLE.extract(raw), 0x5);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn field_past_the_word() {
        insert(0u32, 1, 32, 1);
    }

    #[test]
    #[should_panic]
    fn field_wider_than_the_word() {
        let _ = Field::new(28, 8);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0xF_FFFF, 20), -1);
        assert_eq!(sign_extend(0x8_0000, 20), -(1 << 19));
        assert_eq!(sign_extend(100, 20), 100);
    }

    #[test]
    fn present_zero_is_written() {
        let raw = update(0xFFFF_u16, NIBBLE, Some(0u8));
        assert_eq!(raw, 0xF0FF);
        assert_eq!(update::<u16, u8>(0xFFFF, NIBBLE, None), 0xFFFF);
    }

    #[test]
    fn register_table_roundtrip() {
        let sample = Sample::capture(0x8A00);
        assert_eq!(sample.flag, Some(true));
        assert_eq!(sample.nibble, Some(0xA));
        assert_eq!(sample.apply(0), 0x8A00);
        assert!(Sample::default().is_empty());
        assert!(!sample.is_empty());
    }

    #[test]
    fn trigger_is_held_back() {
        let sample = Sample {
            flag: Some(true),
            nibble: Some(3),
        };
        let (configure, trigger) = triggered_writes(&sample, 0x0000);
        assert_eq!(configure, 0x0300);
        assert_eq!(trigger, Some(0x8300));

        let sample = Sample {
            flag: None,
            nibble: Some(3),
        };
        assert_eq!(triggered_writes(&sample, 0x8000), (0x8300, None));
    }

    proptest! {
        #[test]
        fn insert_then_extract(
            raw in any::<u32>(),
            value in any::<u32>(),
            offset in 0u32..32,
            width in 1u32..=32,
        ) {
            let width = width.min(32 - offset);
            let field = Field::new(offset, width);
            let next = field.insert(raw, value);
            prop_assert_eq!(field.extract(next), value & low_mask(width));
            prop_assert_eq!(next & !field.mask(), raw & !field.mask());
        }
    }
}
