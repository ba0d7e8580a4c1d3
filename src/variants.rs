//! Pre-tinted shadow variants, one per quantized darkness bucket.

use thiserror::Error;

/// Number of darkness buckets: nine possible neighbor counts (0..=8
/// occluders) plus the clamped full-darkness bucket.
pub const VARIANT_COUNT: usize = 10;

/// RGBA8 tint handle used by the built-in shadow set.
pub type Tint = [u8; 4];

/// Startup validation errors for the variant set. These abort startup with
/// the offending index in the message instead of surfacing at lookup time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariantBankError {
    #[error("lighting variant set is missing index {0}")]
    MissingIndex(u8),
    #[error("lighting variant set has duplicate index {0}")]
    DuplicateIndex(u8),
    #[error("lighting variant index {0} is outside 0..=9")]
    IndexOutOfRange(u8),
}

/// Ordered bank of shadow variants, indexed by quantized darkness bucket.
///
/// Built once at startup from (index, handle) pairs in any order: each
/// handle carries its bucket as an explicit index property, and the bank is
/// ordered by that property rather than by input position.
#[derive(Debug, Clone)]
pub struct VariantBank<H> {
    slots: Vec<H>,
}

impl<H> VariantBank<H> {
    /// Validate and order a raw variant collection. Every index in 0..=9
    /// must appear exactly once.
    pub fn build(raw: impl IntoIterator<Item = (u8, H)>) -> Result<Self, VariantBankError> {
        let mut slots: Vec<Option<H>> =
            std::iter::repeat_with(|| None).take(VARIANT_COUNT).collect();
        for (index, handle) in raw {
            let slot = slots
                .get_mut(index as usize)
                .ok_or(VariantBankError::IndexOutOfRange(index))?;
            if slot.is_some() {
                return Err(VariantBankError::DuplicateIndex(index));
            }
            *slot = Some(handle);
        }
        let mut ordered = Vec::with_capacity(VARIANT_COUNT);
        for (i, slot) in slots.into_iter().enumerate() {
            ordered.push(slot.ok_or(VariantBankError::MissingIndex(i as u8))?);
        }
        Ok(VariantBank { slots: ordered })
    }

    /// O(1) lookup. Indices produced by `variant_index` are clamped into
    /// range, so this never fails after a successful build.
    #[inline]
    pub fn lookup(&self, index: u8) -> &H {
        &self.slots[index as usize]
    }
}

/// Default grayscale shadow set: black tints with alpha stepping from fully
/// transparent (index 0) to fully opaque (index 9). Stands in for a
/// hand-authored "Lighting" tileset.
pub fn shadow_tints() -> Vec<(u8, Tint)> {
    (0..VARIANT_COUNT as u8)
        .map(|i| (i, [0, 0, 0, (i as u32 * 255 / 9) as u8]))
        .collect()
}
