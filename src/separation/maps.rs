//! separation::maps — in-memory multi-frequency HEALPix maps.
//!
//! Purpose
//! -------
//! Hold the sky data a pixel-by-pixel separation runs on: one map and one
//! noise-variance map per frequency channel and polarization component,
//! optionally restricted to a subset of pixels, and slice them into per-pixel
//! payloads for the likelihood.
//!
//! Key behaviors
//! -------------
//! - [`SkyMaps`] stores `data` and `variance` as `(npol, npix, nfreqs)`
//!   arrays, where `npix` is either the full `12 · nside²` or the size of the
//!   chosen pixel subset.
//! - [`SkyMaps::set_frequency_maps`] / [`SkyMaps::set_frequency_variance`]
//!   insert one full-sky `(npol, 12 · nside²)` map, keeping only the stored
//!   pixels.
//! - [`SkyMaps::extract_with_mask`] keeps the pixels whose mask value is 1
//!   and returns them as [`MaskedMaps`].
//! - [`MaskedMaps::pixel`] returns a [`PixelData`] `(npol, nfreqs)` payload.
//!
//! Invariants & assumptions
//! ------------------------
//! - `nside` is a positive power of two; subset indices are `< 12 · nside²`.
//! - Maps start zero-filled; channels not yet set read as zero.
//!
//! Conventions
//! -----------
//! - Pixel indices in [`MaskedMaps::indices`] refer to positions in the
//!   stored pixel axis, matching the order of the mask.
//! - No file I/O lives here; readers fill maps through the setters.
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis, s};

use crate::separation::errors::{SeparationError, SeparationResult};

/// Number of HEALPix pixels at resolution `nside`.
pub fn nside_to_npix(nside: usize) -> usize {
    12 * nside * nside
}

/// Data and noise variance of one pixel, both shaped `(npol, nfreqs)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelData {
    pub data: Array2<f64>,
    pub variance: Array2<f64>,
}

/// Multi-frequency maps on (a subset of) a HEALPix grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyMaps {
    nside: usize,
    npol: usize,
    nfreqs: usize,
    indices: Option<Vec<usize>>,
    data: Array3<f64>,
    variance: Array3<f64>,
}

impl SkyMaps {
    /// Allocate zero-filled maps.
    ///
    /// # Errors
    /// - [`SeparationError::InvalidNside`] unless `nside` is a positive power
    ///   of two.
    /// - [`SeparationError::InvalidDimension`] for `npol == 0` or
    ///   `nfreqs == 0`.
    /// - [`SeparationError::PixelOutOfRange`] for a subset index outside the
    ///   full map.
    pub fn new(
        nside: usize, npol: usize, nfreqs: usize, indices: Option<Vec<usize>>,
    ) -> SeparationResult<Self> {
        if nside == 0 || !nside.is_power_of_two() {
            return Err(SeparationError::InvalidNside { nside });
        }
        if npol == 0 {
            return Err(SeparationError::InvalidDimension { name: "npol", value: npol });
        }
        if nfreqs == 0 {
            return Err(SeparationError::InvalidDimension { name: "nfreqs", value: nfreqs });
        }
        let full = nside_to_npix(nside);
        if let Some(idx) = &indices {
            if let Some(&index) = idx.iter().find(|&&i| i >= full) {
                return Err(SeparationError::PixelOutOfRange { index, npix: full });
            }
        }
        let npix = indices.as_ref().map_or(full, Vec::len);
        Ok(Self {
            nside,
            npol,
            nfreqs,
            indices,
            data: Array3::zeros((npol, npix, nfreqs)),
            variance: Array3::zeros((npol, npix, nfreqs)),
        })
    }

    pub fn nside(&self) -> usize {
        self.nside
    }

    pub fn npol(&self) -> usize {
        self.npol
    }

    pub fn nfreqs(&self) -> usize {
        self.nfreqs
    }

    /// Number of stored pixels.
    pub fn npix(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn variance(&self) -> &Array3<f64> {
        &self.variance
    }

    /// Insert the sky maps of channel `ifreq`.
    ///
    /// # Errors
    /// - [`SeparationError::FrequencyOutOfRange`] for a bad channel.
    /// - [`SeparationError::ShapeMismatch`] unless `maps` is
    ///   `(npol, 12 · nside²)`.
    pub fn set_frequency_maps(&mut self, ifreq: usize, maps: ArrayView2<f64>) -> SeparationResult<()> {
        let (nside, npol, nfreqs) = (self.nside, self.npol, self.nfreqs);
        insert_channel(&mut self.data, self.indices.as_deref(), nside, npol, nfreqs, ifreq, maps)
    }

    /// Insert the noise-variance maps of channel `ifreq`.
    ///
    /// Same contract as [`SkyMaps::set_frequency_maps`].
    pub fn set_frequency_variance(
        &mut self, ifreq: usize, maps: ArrayView2<f64>,
    ) -> SeparationResult<()> {
        let (nside, npol, nfreqs) = (self.nside, self.npol, self.nfreqs);
        insert_channel(&mut self.variance, self.indices.as_deref(), nside, npol, nfreqs, ifreq, maps)
    }

    /// Keep the stored pixels whose mask value is exactly 1.
    ///
    /// # Errors
    /// [`SeparationError::ShapeMismatch`] unless the mask has one entry per
    /// stored pixel.
    pub fn extract_with_mask(&self, mask: ArrayView1<f64>) -> SeparationResult<MaskedMaps> {
        if mask.len() != self.npix() {
            return Err(SeparationError::ShapeMismatch {
                name: "mask",
                expected: vec![self.npix()],
                found: vec![mask.len()],
            });
        }
        let indices: Vec<usize> =
            mask.iter().enumerate().filter(|&(_, &m)| m == 1.0).map(|(i, _)| i).collect();
        Ok(MaskedMaps {
            data: self.data.select(Axis(1), &indices),
            variance: self.variance.select(Axis(1), &indices),
            indices,
        })
    }
}

/// Pixels retained by a mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedMaps {
    /// Positions of the retained pixels in the stored pixel axis.
    pub indices: Vec<usize>,
    /// Shape `(npol, indices.len(), nfreqs)`.
    pub data: Array3<f64>,
    /// Shape `(npol, indices.len(), nfreqs)`.
    pub variance: Array3<f64>,
}

impl MaskedMaps {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Payload of the `i`-th retained pixel.
    ///
    /// # Errors
    /// [`SeparationError::PixelOutOfRange`] if `i >= len()`.
    pub fn pixel(&self, i: usize) -> SeparationResult<PixelData> {
        if i >= self.len() {
            return Err(SeparationError::PixelOutOfRange { index: i, npix: self.len() });
        }
        Ok(PixelData {
            data: self.data.slice(s![.., i, ..]).to_owned(),
            variance: self.variance.slice(s![.., i, ..]).to_owned(),
        })
    }

    /// Payloads of every retained pixel, in mask order.
    pub fn pixels(&self) -> Vec<PixelData> {
        (0..self.len())
            .map(|i| PixelData {
                data: self.data.slice(s![.., i, ..]).to_owned(),
                variance: self.variance.slice(s![.., i, ..]).to_owned(),
            })
            .collect()
    }
}

// ---- Helper methods ----

fn insert_channel(
    target: &mut Array3<f64>, indices: Option<&[usize]>, nside: usize, npol: usize,
    nfreqs: usize, ifreq: usize, maps: ArrayView2<f64>,
) -> SeparationResult<()> {
    if ifreq >= nfreqs {
        return Err(SeparationError::FrequencyOutOfRange { ifreq, nfreqs });
    }
    let full = nside_to_npix(nside);
    if maps.dim() != (npol, full) {
        return Err(SeparationError::ShapeMismatch {
            name: "frequency maps",
            expected: vec![npol, full],
            found: maps.shape().to_vec(),
        });
    }
    let mut channel = target.slice_mut(s![.., .., ifreq]);
    match indices {
        Some(idx) => channel.assign(&maps.select(Axis(1), idx)),
        None => channel.assign(&maps),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Geometry validation in `SkyMaps::new`.
    // - Channel insertion with and without a pixel subset.
    // - Mask extraction and per-pixel payloads.
    // -------------------------------------------------------------------------

    fn ramp(npol: usize, npix: usize, offset: f64) -> Array2<f64> {
        Array2::from_shape_fn((npol, npix), |(p, i)| offset + 100.0 * p as f64 + i as f64)
    }

    #[test]
    // Purpose
    // -------
    // Only positive powers of two are valid resolutions.
    fn new_validates_geometry() {
        assert_eq!(SkyMaps::new(3, 1, 1, None), Err(SeparationError::InvalidNside { nside: 3 }));
        assert!(matches!(
            SkyMaps::new(1, 0, 1, None),
            Err(SeparationError::InvalidDimension { name: "npol", .. })
        ));
        assert_eq!(
            SkyMaps::new(1, 1, 1, Some(vec![0, 12])),
            Err(SeparationError::PixelOutOfRange { index: 12, npix: 12 })
        );
        assert_eq!(SkyMaps::new(2, 3, 4, None).unwrap().npix(), 48);
    }

    #[test]
    // Purpose
    // -------
    // A subset keeps only the listed pixels, in the listed order.
    //
    // Given
    // -----
    // - nside 1 (12 pixels), subset [5, 2], two channels.
    //
    // Expect
    // ------
    // - Stored data for channel 1 is `[[5, 2], [105, 102]] + offset`.
    fn set_frequency_maps_respects_subset() {
        // Arrange
        let mut maps = SkyMaps::new(1, 2, 2, Some(vec![5, 2])).unwrap();

        // Act
        maps.set_frequency_maps(1, ramp(2, 12, 0.5).view()).unwrap();
        maps.set_frequency_variance(0, ramp(2, 12, 0.0).view()).unwrap();

        // Assert
        assert_eq!(maps.data().slice(s![.., .., 1]), array![[5.5, 2.5], [105.5, 102.5]]);
        assert_eq!(maps.data().slice(s![.., .., 0]), Array2::<f64>::zeros((2, 2)));
        assert_eq!(maps.variance().slice(s![.., .., 0]), array![[5.0, 2.0], [105.0, 102.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Bad channels and shapes are rejected.
    fn set_frequency_maps_validates_input() {
        let mut maps = SkyMaps::new(1, 1, 1, None).unwrap();
        assert_eq!(
            maps.set_frequency_maps(1, ramp(1, 12, 0.0).view()),
            Err(SeparationError::FrequencyOutOfRange { ifreq: 1, nfreqs: 1 })
        );
        assert!(matches!(
            maps.set_frequency_variance(0, ramp(1, 11, 0.0).view()),
            Err(SeparationError::ShapeMismatch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Exactly the pixels with mask value 1 are kept.
    //
    // Given
    // -----
    // - 12 pixels, mask 1 at pixels 0, 4 and 11 (0.5 at pixel 7).
    //
    // Expect
    // ------
    // - Indices [0, 4, 11]; pixel payloads match the stored columns.
    fn extract_with_mask_keeps_ones_only() {
        // Arrange
        let mut maps = SkyMaps::new(1, 1, 2, None).unwrap();
        maps.set_frequency_maps(0, ramp(1, 12, 0.0).view()).unwrap();
        maps.set_frequency_maps(1, ramp(1, 12, 1000.0).view()).unwrap();
        let mut mask = Array1::<f64>::zeros(12);
        mask[0] = 1.0;
        mask[4] = 1.0;
        mask[7] = 0.5;
        mask[11] = 1.0;

        // Act
        let masked = maps.extract_with_mask(mask.view()).unwrap();

        // Assert
        assert_eq!(masked.indices, vec![0, 4, 11]);
        assert_eq!(masked.data.dim(), (1, 3, 2));
        let px = masked.pixel(1).unwrap();
        assert_eq!(px.data, array![[4.0, 1004.0]]);
        assert_eq!(masked.pixels().len(), 3);
        assert!(masked.pixel(3).is_err());
    }
}
