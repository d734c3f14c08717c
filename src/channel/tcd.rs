//! Transfer control descriptor codec.
//!
//! Most of a TCD maps one-to-one onto message fields. Three words don't:
//!
//! - `NBYTES` has three layouts. `DMA_CR[EMLM]` picks between a flat count
//!   and the mapped layouts, and inside the mapped layouts the word's own
//!   `SMLOE` / `DMLOE` bits pick whether a minor loop offset is present.
//! - `CITER` and `BITER` each have two layouts, picked by their own `ELINK`
//!   bit.
//!
//! On the wire each layout is a separate optional sub-message. A captured
//! [`Tcd`] carries exactly one of them per word. An update may carry at most
//! one; the codec works with the resolved [`MinorLoop`] and [`MajorLoop`]
//! sum types.

use serde::{Deserialize, Serialize};

use super::Channel;
use crate::bits::{self, Field, Triggered};
use crate::ral::{
    self,
    tcd::{BandwidthControl, TransferSize, ATTR, CSR, ITER, NBYTES},
};
use crate::{wire, Error, Result};

register! {
    /// Transfer attributes
    pub struct Attr: u16 {
        /// Source address modulo
        smod: u8 = ATTR::SMOD,
        ssize: TransferSize = ATTR::SSIZE,
        /// Destination address modulo
        dmod: u8 = ATTR::DMOD,
        dsize: TransferSize = ATTR::DSIZE,
    }
}

register! {
    /// Control and status
    pub struct Csr: u16 {
        bwc: BandwidthControl = CSR::BWC,
        majorlinkch: u8 = CSR::MAJORLINKCH,
        done: bool = CSR::DONE,
        active: bool = CSR::ACTIVE,
        majorelink: bool = CSR::MAJORELINK,
        esg: bool = CSR::ESG,
        dreq: bool = CSR::DREQ,
        inthalf: bool = CSR::INTHALF,
        intmajor: bool = CSR::INTMAJOR,
        start: bool = CSR::START,
    }
}

impl Triggered for Csr {
    const TRIGGER: Field = CSR::START;
    fn trigger(&self) -> Option<bool> {
        self.start
    }
}

/// `NBYTES` with minor loop mapping enabled and both offsets disabled.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct MinorLoopOffsetDisabled {
    /// 30-bit byte count
    pub nbytes: Option<u32>,
}

/// `NBYTES` with minor loop mapping enabled and at least one offset enabled.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct MinorLoopOffsetEnabled {
    /// Apply `mloff` to the source address
    pub smloe: Option<bool>,
    /// Apply `mloff` to the destination address
    pub dmloe: Option<bool>,
    /// Signed 20-bit minor loop offset
    pub mloff: Option<i32>,
    /// 10-bit byte count
    pub nbytes: Option<u16>,
}

/// `CITER` / `BITER` with minor loop channel linking enabled.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct LinkedIteration {
    /// Channel to link to on minor loop completion
    pub linkch: Option<u8>,
    /// 9-bit iteration count
    pub iter: Option<u16>,
}

/// `CITER` / `BITER` with channel linking disabled.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct Iteration {
    /// 15-bit iteration count
    pub iter: Option<u16>,
}

/// A transfer control descriptor.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, hubpack::SerializedSize,
)]
pub struct Tcd {
    pub saddr: Option<u32>,
    pub soff: Option<i16>,
    pub attr: Option<Attr>,
    /// `NBYTES`, minor loop mapping disabled
    pub nbytes_mlno: Option<u32>,
    /// `NBYTES`, mapping enabled, offsets disabled
    pub nbytes_mloffno: Option<MinorLoopOffsetDisabled>,
    /// `NBYTES`, mapping and offset enabled
    pub nbytes_mloffyes: Option<MinorLoopOffsetEnabled>,
    pub slast: Option<i32>,
    pub daddr: Option<u32>,
    pub doff: Option<i16>,
    pub citer_elinkyes: Option<LinkedIteration>,
    pub citer_elinkno: Option<Iteration>,
    pub dlastsga: Option<i32>,
    pub csr: Option<Csr>,
    pub biter_elinkyes: Option<LinkedIteration>,
    pub biter_elinkno: Option<Iteration>,
}

/// The layouts of `NBYTES`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinorLoop {
    /// The whole word is the byte count.
    Count(u32),
    OffsetDisabled(MinorLoopOffsetDisabled),
    OffsetEnabled(MinorLoopOffsetEnabled),
}

/// The layouts of `CITER` and `BITER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MajorLoop {
    Linked(LinkedIteration),
    Unlinked(Iteration),
}

impl MinorLoop {
    /// Decode `raw`. `emlm` is the controller's minor loop mapping bit.
    pub fn capture(raw: u32, emlm: bool) -> Self {
        if !emlm {
            MinorLoop::Count(raw)
        } else if !NBYTES::SMLOE.is_set(raw) && !NBYTES::DMLOE.is_set(raw) {
            MinorLoop::OffsetDisabled(MinorLoopOffsetDisabled {
                nbytes: bits::capture(raw, NBYTES::NBYTES_MLOFFNO),
            })
        } else {
            MinorLoop::OffsetEnabled(MinorLoopOffsetEnabled {
                smloe: bits::capture(raw, NBYTES::SMLOE),
                dmloe: bits::capture(raw, NBYTES::DMLOE),
                mloff: Some(bits::sign_extend(
                    NBYTES::MLOFF.extract(raw),
                    NBYTES::MLOFF.width(),
                )),
                nbytes: bits::capture(raw, NBYTES::NBYTES_MLOFFYES),
            })
        }
    }

    /// `true` if the layout carries no field.
    pub fn is_empty(&self) -> bool {
        match self {
            MinorLoop::Count(_) => false,
            MinorLoop::OffsetDisabled(layout) => layout.nbytes.is_none(),
            MinorLoop::OffsetEnabled(layout) => {
                layout.smloe.is_none()
                    && layout.dmloe.is_none()
                    && layout.mloff.is_none()
                    && layout.nbytes.is_none()
            }
        }
    }

    /// Write this layout into `raw`.
    ///
    /// `OffsetDisabled` clears both offset enables. An empty layout leaves
    /// `raw` as it is, selector bits included.
    pub fn apply(&self, raw: u32) -> u32 {
        if self.is_empty() {
            return raw;
        }
        match self {
            MinorLoop::Count(nbytes) => *nbytes,
            MinorLoop::OffsetDisabled(layout) => {
                let raw = NBYTES::SMLOE.insert(raw, 0);
                let raw = NBYTES::DMLOE.insert(raw, 0);
                bits::update(raw, NBYTES::NBYTES_MLOFFNO, layout.nbytes)
            }
            MinorLoop::OffsetEnabled(layout) => {
                let raw = bits::update(raw, NBYTES::SMLOE, layout.smloe);
                let raw = bits::update(raw, NBYTES::DMLOE, layout.dmloe);
                let raw = bits::update(raw, NBYTES::MLOFF, layout.mloff);
                bits::update(raw, NBYTES::NBYTES_MLOFFYES, layout.nbytes)
            }
        }
    }
}

impl MajorLoop {
    pub fn capture(raw: u16) -> Self {
        if ITER::ELINK.is_set(raw) {
            MajorLoop::Linked(LinkedIteration {
                linkch: bits::capture(raw, ITER::LINKCH),
                iter: bits::capture(raw, ITER::ITER_ELINKYES),
            })
        } else {
            MajorLoop::Unlinked(Iteration {
                iter: bits::capture(raw, ITER::ITER_ELINKNO),
            })
        }
    }

    /// `true` if the layout carries no field.
    pub fn is_empty(&self) -> bool {
        match self {
            MajorLoop::Linked(layout) => layout.linkch.is_none() && layout.iter.is_none(),
            MajorLoop::Unlinked(layout) => layout.iter.is_none(),
        }
    }

    /// Write this layout, and the `ELINK` bit that selects it, into `raw`.
    ///
    /// An empty layout leaves `raw` as it is.
    pub fn apply(&self, raw: u16) -> u16 {
        if self.is_empty() {
            return raw;
        }
        match self {
            MajorLoop::Linked(layout) => {
                let raw = ITER::ELINK.insert(raw, 1);
                let raw = bits::update(raw, ITER::LINKCH, layout.linkch);
                bits::update(raw, ITER::ITER_ELINKYES, layout.iter)
            }
            MajorLoop::Unlinked(layout) => {
                let raw = ITER::ELINK.insert(raw, 0);
                bits::update(raw, ITER::ITER_ELINKNO, layout.iter)
            }
        }
    }
}

/// Pick the one present variant, if any.
fn resolve<T, const N: usize>(word: &str, variants: [Option<T>; N]) -> Result<Option<T>> {
    let mut present = variants.into_iter().flatten();
    let first = present.next();
    if present.next().is_some() {
        log::warn!("TCD {}: more than one layout supplied", word);
        return Err(Error::ConflictingVariant);
    }
    Ok(first)
}

impl Tcd {
    /// The supplied `NBYTES` layout.
    pub fn minor_loop(&self) -> Result<Option<MinorLoop>> {
        resolve(
            "NBYTES",
            [
                self.nbytes_mlno.map(MinorLoop::Count),
                self.nbytes_mloffno.map(MinorLoop::OffsetDisabled),
                self.nbytes_mloffyes.map(MinorLoop::OffsetEnabled),
            ],
        )
    }

    /// The supplied `CITER` layout.
    pub fn citer(&self) -> Result<Option<MajorLoop>> {
        resolve(
            "CITER",
            [
                self.citer_elinkyes.map(MajorLoop::Linked),
                self.citer_elinkno.map(MajorLoop::Unlinked),
            ],
        )
    }

    /// The supplied `BITER` layout.
    pub fn biter(&self) -> Result<Option<MajorLoop>> {
        resolve(
            "BITER",
            [
                self.biter_elinkyes.map(MajorLoop::Linked),
                self.biter_elinkno.map(MajorLoop::Unlinked),
            ],
        )
    }

    /// Supply `NBYTES` as `layout`, dropping any other layout.
    pub fn set_minor_loop(&mut self, layout: MinorLoop) {
        self.nbytes_mlno = None;
        self.nbytes_mloffno = None;
        self.nbytes_mloffyes = None;
        match layout {
            MinorLoop::Count(nbytes) => self.nbytes_mlno = Some(nbytes),
            MinorLoop::OffsetDisabled(layout) => self.nbytes_mloffno = Some(layout),
            MinorLoop::OffsetEnabled(layout) => self.nbytes_mloffyes = Some(layout),
        }
    }

    pub fn set_citer(&mut self, layout: MajorLoop) {
        (self.citer_elinkyes, self.citer_elinkno) = split(layout);
    }

    pub fn set_biter(&mut self, layout: MajorLoop) {
        (self.biter_elinkyes, self.biter_elinkno) = split(layout);
    }
}

fn split(layout: MajorLoop) -> (Option<LinkedIteration>, Option<Iteration>) {
    match layout {
        MajorLoop::Linked(layout) => (Some(layout), None),
        MajorLoop::Unlinked(layout) => (None, Some(layout)),
    }
}

/// Capture every word of `tcd`.
///
/// `emlm` is the controller's minor loop mapping bit, read once per capture.
pub(crate) fn capture(tcd: &ral::tcd::RegisterBlock, emlm: bool) -> Tcd {
    let mut captured = Tcd {
        saddr: Some(tcd.SADDR.read()),
        soff: Some(tcd.SOFF.read() as i16),
        attr: Some(ral::capture(&tcd.ATTR)),
        slast: Some(tcd.SLAST.read() as i32),
        daddr: Some(tcd.DADDR.read()),
        doff: Some(tcd.DOFF.read() as i16),
        dlastsga: Some(tcd.DLASTSGA.read() as i32),
        csr: Some(ral::capture(&tcd.CSR)),
        ..Default::default()
    };
    captured.set_minor_loop(MinorLoop::capture(tcd.NBYTES.read(), emlm));
    captured.set_citer(MajorLoop::capture(tcd.CITER.read()));
    captured.set_biter(MajorLoop::capture(tcd.BITER.read()));
    captured
}

fn update_iteration(register: &ral::RWRegister<u16>, layout: Option<MajorLoop>) {
    if let Some(layout) = layout.filter(|layout| !layout.is_empty()) {
        register.write(layout.apply(register.read()));
    }
}

/// Apply the present fields of `update` to `tcd`.
///
/// Every layout is resolved before the first write, so a conflicting update
/// leaves the descriptor untouched. `CSR` is written last, and a present
/// `START` is set in a separate, final write.
pub(crate) fn apply(tcd: &ral::tcd::RegisterBlock, update: &Tcd) -> Result<()> {
    let minor_loop = update.minor_loop()?;
    let citer = update.citer()?;
    let biter = update.biter()?;

    if let Some(saddr) = update.saddr {
        tcd.SADDR.write(saddr);
    }
    if let Some(soff) = update.soff {
        tcd.SOFF.write(soff as u16);
    }
    if let Some(attr) = &update.attr {
        ral::update(&tcd.ATTR, attr);
    }
    if let Some(minor_loop) = minor_loop.filter(|layout| !layout.is_empty()) {
        tcd.NBYTES.write(minor_loop.apply(tcd.NBYTES.read()));
    }
    if let Some(slast) = update.slast {
        tcd.SLAST.write(slast as u32);
    }
    if let Some(daddr) = update.daddr {
        tcd.DADDR.write(daddr);
    }
    if let Some(doff) = update.doff {
        tcd.DOFF.write(doff as u16);
    }
    update_iteration(&tcd.CITER, citer);
    if let Some(dlastsga) = update.dlastsga {
        tcd.DLASTSGA.write(dlastsga as u32);
    }
    update_iteration(&tcd.BITER, biter);
    if let Some(csr) = &update.csr {
        ral::update_triggered(&tcd.CSR, csr);
    }
    Ok(())
}

impl Channel {
    /// Capture this channel's TCD.
    pub fn read_tcd(&self) -> Tcd {
        capture(self.tcd(), self.is_minor_loop_mapping())
    }

    /// Apply `tcd` to this channel's TCD.
    ///
    /// Fails with [`Error::ConflictingVariant`], before touching any
    /// register, if `tcd` supplies two layouts for one word.
    pub fn apply_tcd(&self, tcd: &Tcd) -> Result<()> {
        apply(self.tcd(), tcd)
    }

    pub fn serialize_tcd(&self, buffer: &mut [u8]) -> Result<usize> {
        log::trace!("serialize TCD{}", self.index);
        wire::encode(&self.read_tcd(), buffer)
    }

    pub fn update_tcd(&self, bytes: &[u8]) -> Result<()> {
        let tcd: Tcd = wire::decode(bytes)?;
        log::debug!("update TCD{} {:?}", self.index, tcd);
        self.apply_tcd(&tcd)
    }

    /// Zero every word of this channel's TCD.
    pub fn reset_tcd(&self) {
        log::debug!("reset TCD{}", self.index);
        self.tcd().reset();
    }
}
