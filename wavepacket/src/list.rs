use crate::WavepacketError;
use basis::{Axis, StackedBasis};
use ndarray::{s, Array1, Array2, Array3, ArrayView1, Axis as NdAxis};
use std::ops::Range;
use types::c64;

/// One band sampled over the Brillouin zone, `data` is [sample, internal].
#[derive(Debug, Clone)]
pub struct Wavepacket {
    sample_basis: StackedBasis,
    basis: StackedBasis,
    data: Array2<c64>,
    eigenvalues: Option<Array1<f64>>,
}

impl Wavepacket {
    pub fn new(
        sample_basis: StackedBasis,
        basis: StackedBasis,
        data: Array2<c64>,
        eigenvalues: Option<Array1<f64>>,
    ) -> Result<Wavepacket, WavepacketError> {
        let expected = vec![sample_basis.n(), basis.n()];
        if data.shape() != expected.as_slice() {
            return Err(WavepacketError::ShapeMismatch {
                expected,
                found: data.shape().to_vec(),
            });
        }

        if let Some(eig) = eigenvalues.as_ref() {
            if eig.len() != sample_basis.n() {
                return Err(WavepacketError::ShapeMismatch {
                    expected: vec![sample_basis.n()],
                    found: vec![eig.len()],
                });
            }
        }

        Ok(Wavepacket {
            sample_basis,
            basis,
            data,
            eigenvalues,
        })
    }

    pub fn sample_basis(&self) -> &StackedBasis {
        &self.sample_basis
    }

    pub fn basis(&self) -> &StackedBasis {
        &self.basis
    }

    pub fn data(&self) -> &Array2<c64> {
        &self.data
    }

    pub fn eigenvalues(&self) -> Option<&Array1<f64>> {
        self.eigenvalues.as_ref()
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn get_vector(&self, sample: usize) -> ArrayView1<'_, c64> {
        self.data.row(sample)
    }

    /// Same bases and eigenvalues, new coefficients.
    pub fn with_data(&self, data: Array2<c64>) -> Result<Wavepacket, WavepacketError> {
        Wavepacket::new(
            self.sample_basis.clone(),
            self.basis.clone(),
            data,
            self.eigenvalues.clone(),
        )
    }
}

/// Bands of Bloch states over a sample grid, `data` is [band, sample, internal].
#[derive(Debug, Clone)]
pub struct WavepacketList {
    band_basis: Axis,
    sample_basis: StackedBasis,
    basis: StackedBasis,
    data: Array3<c64>,
    eigenvalues: Option<Array2<f64>>,
}

impl WavepacketList {
    pub fn new(
        band_basis: Axis,
        sample_basis: StackedBasis,
        basis: StackedBasis,
        data: Array3<c64>,
        eigenvalues: Option<Array2<f64>>,
    ) -> Result<WavepacketList, WavepacketError> {
        let expected = vec![band_basis.n(), sample_basis.n(), basis.n()];
        if data.shape() != expected.as_slice() {
            return Err(WavepacketError::ShapeMismatch {
                expected,
                found: data.shape().to_vec(),
            });
        }

        if let Some(eig) = eigenvalues.as_ref() {
            let expected = vec![band_basis.n(), sample_basis.n()];
            if eig.shape() != expected.as_slice() {
                return Err(WavepacketError::ShapeMismatch {
                    expected,
                    found: eig.shape().to_vec(),
                });
            }
        }

        Ok(WavepacketList {
            band_basis,
            sample_basis,
            basis,
            data,
            eigenvalues,
        })
    }

    pub fn from_wavepacket(wavepacket: &Wavepacket) -> Result<WavepacketList, WavepacketError> {
        as_wavepacket_list(std::slice::from_ref(wavepacket))
    }

    pub fn band_basis(&self) -> &Axis {
        &self.band_basis
    }

    pub fn sample_basis(&self) -> &StackedBasis {
        &self.sample_basis
    }

    pub fn basis(&self) -> &StackedBasis {
        &self.basis
    }

    pub fn data(&self) -> &Array3<c64> {
        &self.data
    }

    pub fn eigenvalues(&self) -> Option<&Array2<f64>> {
        self.eigenvalues.as_ref()
    }

    pub fn n_bands(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn n_samples(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn get_vector(&self, band: usize, sample: usize) -> ArrayView1<'_, c64> {
        self.data.slice(s![band, sample, ..])
    }

    pub fn get_wavepacket(&self, band: usize) -> Result<Wavepacket, WavepacketError> {
        let n = self.n_bands();
        if band >= n {
            return Err(WavepacketError::BandOutOfRange { band, n });
        }

        Ok(self.wavepacket_at(band))
    }

    fn wavepacket_at(&self, band: usize) -> Wavepacket {
        Wavepacket {
            sample_basis: self.sample_basis.clone(),
            basis: self.basis.clone(),
            data: self.data.index_axis(NdAxis(0), band).to_owned(),
            eigenvalues: self
                .eigenvalues
                .as_ref()
                .map(|eig| eig.index_axis(NdAxis(0), band).to_owned()),
        }
    }

    /// Contiguous band slice as a new list with a fundamental band basis.
    pub fn get_wavepackets(&self, bands: Range<usize>) -> Result<WavepacketList, WavepacketError> {
        let n = self.n_bands();
        if bands.start > bands.end || bands.end > n {
            return Err(WavepacketError::BandOutOfRange { band: bands.end, n });
        }

        let data = self.data.slice(s![bands.clone(), .., ..]).to_owned();
        let eigenvalues = self
            .eigenvalues
            .as_ref()
            .map(|eig| eig.slice(s![bands.clone(), ..]).to_owned());

        WavepacketList::new(
            Axis::Fundamental { n: bands.len() },
            self.sample_basis.clone(),
            self.basis.clone(),
            data,
            eigenvalues,
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = Wavepacket> + '_ {
        (0..self.n_bands()).map(move |band| self.wavepacket_at(band))
    }

    /// Mean eigenvalue of every band over the samples.
    pub fn get_average_eigenvalues(&self) -> Option<Array1<f64>> {
        self.eigenvalues
            .as_ref()
            .and_then(|eig| eig.mean_axis(NdAxis(1)))
    }
}

/// Stack wavepackets that share their bases into one list.
///
/// Eigenvalues are kept only when every wavepacket carries them.
pub fn as_wavepacket_list(wavepackets: &[Wavepacket]) -> Result<WavepacketList, WavepacketError> {
    let Some(first) = wavepackets.first() else {
        return Err(WavepacketError::Empty);
    };

    for (index, wp) in wavepackets.iter().enumerate() {
        if wp.sample_basis != first.sample_basis || wp.basis != first.basis {
            return Err(WavepacketError::WavepacketBasisMismatch { index });
        }
    }

    let nband = wavepackets.len();
    let nsample = first.sample_basis.n();
    let n = first.basis.n();

    let mut data = Array3::<c64>::zeros((nband, nsample, n));
    for (mut band, wp) in data.outer_iter_mut().zip(wavepackets.iter()) {
        band.assign(&wp.data);
    }

    let eigenvalues = if wavepackets.iter().all(|wp| wp.eigenvalues.is_some()) {
        let mut eig = Array2::<f64>::zeros((nband, nsample));
        for (mut row, wp) in eig.outer_iter_mut().zip(wavepackets.iter()) {
            if let Some(e) = wp.eigenvalues.as_ref() {
                row.assign(e);
            }
        }
        Some(eig)
    } else {
        None
    };

    WavepacketList::new(
        Axis::Fundamental { n: nband },
        first.sample_basis.clone(),
        first.basis.clone(),
        data,
        eigenvalues,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use wpconsts::*;

    fn two_band_list() -> WavepacketList {
        let mut data = Array3::<c64>::zeros((2, 3, 2));
        for b in 0..2 {
            for k in 0..3 {
                data[[b, k, b]] = ONE_C64;
            }
        }

        WavepacketList::new(
            Axis::Fundamental { n: 2 },
            StackedBasis::fundamental(&[3]),
            StackedBasis::position(&[2]),
            data,
            Some(array![[-1.0, -2.0, -3.0], [1.0, 2.0, 6.0]]),
        )
        .unwrap()
    }

    #[test]
    fn test_new_checks_shape() {
        let res = WavepacketList::new(
            Axis::Fundamental { n: 2 },
            StackedBasis::fundamental(&[3]),
            StackedBasis::position(&[2]),
            Array3::<c64>::zeros((2, 2, 2)),
            None,
        );
        assert!(matches!(res, Err(WavepacketError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_get_wavepacket_and_slices() {
        let list = two_band_list();

        let wp = list.get_wavepacket(1).unwrap();
        assert_eq!(wp.n_samples(), 3);
        assert_eq!(wp.get_vector(2)[1], ONE_C64);
        assert_eq!(wp.eigenvalues().unwrap()[2], 6.0);

        assert!(matches!(
            list.get_wavepacket(2),
            Err(WavepacketError::BandOutOfRange { band: 2, n: 2 })
        ));

        let upper = list.get_wavepackets(1..2).unwrap();
        assert_eq!(upper.band_basis(), &Axis::Fundamental { n: 1 });
        assert_eq!(upper.get_vector(0, 0)[1], ONE_C64);
        assert_eq!(upper.eigenvalues().unwrap()[[0, 1]], 2.0);
        assert_eq!(list.iter().count(), 2);
    }

    #[test]
    fn test_average_eigenvalues() {
        let avg = two_band_list().get_average_eigenvalues().unwrap();
        assert_eq!(avg, array![-2.0, 3.0]);
    }

    #[test]
    fn test_stack_round_trip() {
        let list = two_band_list();
        let wavepackets: Vec<Wavepacket> = list.iter().collect();

        let stacked = as_wavepacket_list(&wavepackets).unwrap();
        assert_eq!(stacked.data(), list.data());
        assert_eq!(stacked.eigenvalues(), list.eigenvalues());

        let single = WavepacketList::from_wavepacket(&wavepackets[0]).unwrap();
        assert_eq!(single.n_bands(), 1);

        let mut other = wavepackets[1].clone();
        other.eigenvalues = None;
        let mixed = as_wavepacket_list(&[wavepackets[0].clone(), other]).unwrap();
        assert!(mixed.eigenvalues().is_none());

        assert!(matches!(as_wavepacket_list(&[]), Err(WavepacketError::Empty)));
    }
}
