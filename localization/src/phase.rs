use crate::LocalizationError;
use basis::BasisError;
use control::Control;
use log::{debug, info};
use ndarray::Array2;
use rayon::prelude::*;
use types::c64;
use wavepacket::{as_wavepacket_list, Wavepacket, WavepacketList};
use wpconsts::*;

/// Phase-fixing scheme applied to one band at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalizationMethod {
    /// fix the phase at a given position index
    SinglePoint { idx: Vec<isize>, angle: f64 },

    /// average the phase at the maximum of sample 0 and its x0 <-> x1 mirror,
    /// both taken in the cell at `offset`
    TwoPointMax { offset: (isize, isize), angle: f64 },

    /// fix the phase at the maximum of sample 0
    MaxPoint { angle: f64 },
}

impl LocalizationMethod {
    pub fn from_control(control: &Control) -> Result<LocalizationMethod, LocalizationError> {
        let angle = control.get_localization_angle();

        match control.get_localization() {
            "single_point" => Ok(LocalizationMethod::SinglePoint {
                idx: control.get_localization_idx().to_vec(),
                angle,
            }),

            "two_point_max" => {
                let offset = control.get_localization_offset();
                if offset.len() != 2 {
                    return Err(BasisError::RankMismatch {
                        expected: 2,
                        found: offset.len(),
                    }
                    .into());
                }

                Ok(LocalizationMethod::TwoPointMax {
                    offset: (offset[0], offset[1]),
                    angle,
                })
            }

            "max_point" => Ok(LocalizationMethod::MaxPoint { angle }),

            name => Err(LocalizationError::UnknownMethod {
                name: name.to_string(),
            }),
        }
    }
}

/// ((phi + w) mod 2w) - w, with a floored modulo.
pub fn wrap_phases(phi: f64, half_width: f64) -> f64 {
    (phi + half_width).rem_euclid(2.0 * half_width) - half_width
}

/// Every sample converted to the fundamental position basis.
fn position_vectors(wavepacket: &Wavepacket) -> Result<Vec<Vec<c64>>, LocalizationError> {
    let basis = wavepacket.basis();

    let vectors = (0..wavepacket.n_samples())
        .into_par_iter()
        .map(|k| {
            let v = wavepacket.get_vector(k).to_vec();
            basis::convert_vector_to_position_basis(&v, basis)
        })
        .collect::<Result<Vec<_>, BasisError>>()?;

    Ok(vectors)
}

fn phases_at(
    positions: &[Vec<c64>],
    shape: &[usize],
    idx: &[isize],
) -> Result<Vec<f64>, LocalizationError> {
    let flat = basis::get_flat_index_wrapped(shape, idx)?;

    Ok(positions.iter().map(|x| x[flat].arg()).collect())
}

/// Phase of every sample's Bloch function at position index `idx`.
///
/// `idx` is a stacked index of the fundamental position grid of one cell;
/// components are taken modulo the grid size.
pub fn get_bloch_phases(wavepacket: &Wavepacket, idx: &[isize]) -> Result<Vec<f64>, LocalizationError> {
    let positions = position_vectors(wavepacket)?;

    phases_at(&positions, &wavepacket.basis().fundamental_shape(), idx)
}

/// 2 pi k . x at position index `idx` for every sample, with k the Bloch
/// fraction of the sample and x = idx / N the fractional position in the
/// cell.
pub fn get_global_phases(wavepacket: &Wavepacket, idx: &[isize]) -> Result<Vec<f64>, LocalizationError> {
    let shape = wavepacket.basis().fundamental_shape();
    if idx.len() != shape.len() {
        return Err(BasisError::RankMismatch {
            expected: shape.len(),
            found: idx.len(),
        }
        .into());
    }

    let fractions = basis::get_wavepacket_sample_fractions(wavepacket.sample_basis())?;
    if fractions.nrows() != shape.len() {
        return Err(BasisError::RankMismatch {
            expected: shape.len(),
            found: fractions.nrows(),
        }
        .into());
    }

    let phases = fractions
        .columns()
        .into_iter()
        .map(|k| {
            let kx: f64 = k
                .iter()
                .zip(idx.iter().zip(shape.iter()))
                .map(|(f, (&i, &n))| f * i as f64 / n as f64)
                .sum();
            TWOPI * kx
        })
        .collect();

    Ok(phases)
}

/// Multiply sample k by exp(-i * phases[k]).
fn apply_phases(wavepacket: &Wavepacket, phases: &[f64]) -> Result<Wavepacket, LocalizationError> {
    let mut data: Array2<c64> = wavepacket.data().clone();

    for (mut row, &phase) in data.outer_iter_mut().zip(phases.iter()) {
        let factor = c64::from_polar(1.0, -phase);
        row.mapv_inplace(|x| x * factor);
    }

    Ok(wavepacket.with_data(data)?)
}

fn total_phases(
    positions: &[Vec<c64>],
    wavepacket: &Wavepacket,
    idx: &[isize],
) -> Result<Vec<f64>, LocalizationError> {
    let bloch = phases_at(positions, &wavepacket.basis().fundamental_shape(), idx)?;
    let global = get_global_phases(wavepacket, idx)?;

    Ok(bloch.iter().zip(global.iter()).map(|(b, g)| b + g).collect())
}

/// Stacked position index of the largest component of sample 0.
fn max_index(positions: &[Vec<c64>], shape: &[usize]) -> Result<Option<Vec<isize>>, LocalizationError> {
    let Some(first) = positions.first() else {
        return Ok(None);
    };
    let Some(flat) = utility::argmax_norm(first) else {
        return Ok(None);
    };

    let idx = basis::get_stacked_index(shape, flat)?;

    Ok(Some(idx.iter().map(|&i| i as isize).collect()))
}

/// Each sample gets phase `angle` at position `idx`.
pub fn localize_single_point(
    wavepacket: &Wavepacket,
    idx: &[isize],
    angle: f64,
) -> Result<Wavepacket, LocalizationError> {
    let positions = position_vectors(wavepacket)?;
    let total = total_phases(&positions, wavepacket, idx)?;

    let phases: Vec<f64> = total.iter().map(|t| t - angle).collect();

    apply_phases(wavepacket, &phases)
}

/// Maximum of sample 0 and its x0 <-> x1 mirror, both wrapped into the
/// cell at `offset`.
pub fn get_wavepacket_two_points(
    wavepacket: &Wavepacket,
    offset: (isize, isize),
) -> Result<Option<(Vec<isize>, Vec<isize>)>, LocalizationError> {
    let shape = wavepacket.basis().fundamental_shape();
    if shape.len() < 2 {
        return Err(LocalizationError::TooFewAxes {
            required: 2,
            found: shape.len(),
        });
    }

    let positions = position_vectors(wavepacket)?;
    let Some(idx) = max_index(&positions, &shape)? else {
        return Ok(None);
    };

    Ok(Some(two_points(&shape, &idx, offset)?))
}

fn two_points(
    shape: &[usize],
    idx: &[isize],
    offset: (isize, isize),
) -> Result<(Vec<isize>, Vec<isize>), BasisError> {
    let mut origin = vec![0; shape.len()];
    origin[0] = shape[0] as isize * offset.0;
    origin[1] = shape[1] as isize * offset.1;

    let idx0 = basis::wrap_index_around_origin(shape, idx, &origin, &[0, 1])?;
    let idx1 = basis::get_x01_mirrored_index(&idx0)?;
    let idx1 = basis::wrap_index_around_origin(shape, &idx1, &origin, &[0, 1])?;

    Ok((idx0, idx1))
}

/// The phase at the maximum and at its mirror image is split
/// evenly, modulo the 0 / pi jump across the mirror plane.
pub fn localize_two_point_max(
    wavepacket: &Wavepacket,
    offset: (isize, isize),
    angle: f64,
) -> Result<Wavepacket, LocalizationError> {
    let shape = wavepacket.basis().fundamental_shape();
    if shape.len() < 2 {
        return Err(LocalizationError::TooFewAxes {
            required: 2,
            found: shape.len(),
        });
    }

    let positions = position_vectors(wavepacket)?;
    let Some(idx) = max_index(&positions, &shape)? else {
        return Ok(wavepacket.clone());
    };
    let (idx0, idx1) = two_points(&shape, &idx, offset)?;
    debug!("two point localization at {:?} and {:?}", idx0, idx1);

    let phi0 = total_phases(&positions, wavepacket, &idx0)?;
    let phi1 = total_phases(&positions, wavepacket, &idx1)?;

    let phases: Vec<f64> = phi0
        .iter()
        .zip(phi1.iter())
        .map(|(p0, p1)| p0 + 0.5 * wrap_phases(p1 - p0, HALFPI) - angle)
        .collect();

    apply_phases(wavepacket, &phases)
}

/// Single point localization at the maximum of sample 0.
pub fn localize_max_point(wavepacket: &Wavepacket, angle: f64) -> Result<Wavepacket, LocalizationError> {
    let shape = wavepacket.basis().fundamental_shape();

    let positions = position_vectors(wavepacket)?;
    let Some(idx) = max_index(&positions, &shape)? else {
        return Ok(wavepacket.clone());
    };

    let axes: Vec<usize> = (0..shape.len().min(2)).collect();
    let origin = vec![0; shape.len()];
    let idx = basis::wrap_index_around_origin(&shape, &idx, &origin, &axes)?;
    debug!("max point localization at {:?}", idx);

    let total = total_phases(&positions, wavepacket, &idx)?;
    let phases: Vec<f64> = total.iter().map(|t| t - angle).collect();

    apply_phases(wavepacket, &phases)
}

pub fn localize_wavepacket(
    wavepacket: &Wavepacket,
    method: &LocalizationMethod,
) -> Result<Wavepacket, LocalizationError> {
    match method {
        LocalizationMethod::SinglePoint { idx, angle } => localize_single_point(wavepacket, idx, *angle),
        LocalizationMethod::TwoPointMax { offset, angle } => {
            localize_two_point_max(wavepacket, *offset, *angle)
        }
        LocalizationMethod::MaxPoint { angle } => localize_max_point(wavepacket, *angle),
    }
}

/// Apply `method` to every band; band basis and eigenvalues are kept.
pub fn localize_wavepacket_list(
    list: &WavepacketList,
    method: &LocalizationMethod,
) -> Result<WavepacketList, LocalizationError> {
    info!("localizing {} bands with {:?}", list.n_bands(), method);

    let localized = list
        .iter()
        .map(|wp| localize_wavepacket(&wp, method))
        .collect::<Result<Vec<_>, _>>()?;

    let stacked = as_wavepacket_list(&localized)?;

    Ok(WavepacketList::new(
        list.band_basis().clone(),
        stacked.sample_basis().clone(),
        stacked.basis().clone(),
        stacked.data().clone(),
        stacked.eigenvalues().cloned(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use basis::{Axis, StackedBasis};
    use ndarray::Array1;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_wavepacket(sample_shape: &[usize], shape: &[usize], seed: u64) -> Wavepacket {
        let mut rng = StdRng::seed_from_u64(seed);
        let sample_basis = StackedBasis::fundamental(sample_shape);
        let basis = StackedBasis::position(shape);

        let mut data = Array2::<c64>::zeros((sample_basis.n(), basis.n()));
        for mut row in data.outer_iter_mut() {
            row.mapv_inplace(|_| c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)));
            let norm = row.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
            row.mapv_inplace(|x| x / norm);
        }

        let eigenvalues = Array1::from_iter((0..sample_basis.n()).map(|k| k as f64));
        Wavepacket::new(sample_basis, basis, data, Some(eigenvalues)).unwrap()
    }

    fn assert_unit_norms(wp: &Wavepacket) {
        for k in 0..wp.n_samples() {
            let norm = wp.get_vector(k).iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn test_wrap_phases() {
        assert_abs_diff_eq!(wrap_phases(0.0, PI), 0.0);
        assert_abs_diff_eq!(wrap_phases(1.5 * PI, PI), -0.5 * PI, epsilon = 1.0e-14);
        assert_abs_diff_eq!(wrap_phases(-1.5 * PI, PI), 0.5 * PI, epsilon = 1.0e-14);
        assert_abs_diff_eq!(wrap_phases(0.75 * PI, HALFPI), -0.25 * PI, epsilon = 1.0e-14);
        assert_abs_diff_eq!(wrap_phases(PI, HALFPI), 0.0, epsilon = 1.0e-14);
    }

    #[test]
    fn test_global_phases() {
        let wp = random_wavepacket(&[4, 2], &[3, 2], 1);

        // sample 1 is fraction (0, 1/2), sample 2 is (1/4, 0)
        let phases = get_global_phases(&wp, &[1, 1]).unwrap();
        assert_abs_diff_eq!(phases[0], 0.0);
        assert_abs_diff_eq!(phases[1], TWOPI * 0.5 * 0.5, epsilon = 1.0e-14);
        assert_abs_diff_eq!(phases[2], TWOPI * 0.25 / 3.0, epsilon = 1.0e-14);

        assert!(get_global_phases(&wp, &[1]).is_err());
    }

    #[test]
    fn test_single_point_is_a_fixed_point() {
        let wp = random_wavepacket(&[3, 4], &[2, 3], 5);
        let idx = [1, -1];

        let once = localize_single_point(&wp, &idx, 0.3).unwrap();
        assert_unit_norms(&once);

        let bloch = get_bloch_phases(&once, &idx).unwrap();
        let global = get_global_phases(&once, &idx).unwrap();
        for (b, g) in bloch.iter().zip(global.iter()) {
            assert_abs_diff_eq!(wrap_phases(b + g - 0.3, PI), 0.0, epsilon = 1.0e-10);
        }

        let twice = localize_single_point(&once, &idx, 0.3).unwrap();
        for (a, b) in once.data().iter().zip(twice.data().iter()) {
            assert_abs_diff_eq!((a - b).norm(), 0.0, epsilon = 1.0e-10);
        }

        assert_eq!(once.eigenvalues(), wp.eigenvalues());
    }

    #[test]
    fn test_single_point_keeps_real_positive_state() {
        let s = 0.5f64.sqrt();
        let data = Array2::from_shape_vec((1, 2), vec![c64::new(s, 0.0), c64::new(s, 0.0)]).unwrap();
        let wp = Wavepacket::new(
            StackedBasis::fundamental(&[1]),
            StackedBasis::position(&[2]),
            data.clone(),
            None,
        )
        .unwrap();

        let fixed = localize_single_point(&wp, &[0], 0.0).unwrap();
        for (a, b) in fixed.data().iter().zip(data.iter()) {
            assert_abs_diff_eq!((a - b).norm(), 0.0, epsilon = 1.0e-14);
        }
    }

    #[test]
    fn test_phase_strategies_only_rotate() {
        let wp = random_wavepacket(&[3, 3], &[4, 4], 9);

        let methods = [
            LocalizationMethod::SinglePoint {
                idx: vec![2, 0],
                angle: 1.0,
            },
            LocalizationMethod::TwoPointMax {
                offset: (1, 0),
                angle: 0.0,
            },
            LocalizationMethod::MaxPoint { angle: -0.5 },
        ];

        for method in methods.iter() {
            let fixed = localize_wavepacket(&wp, method).unwrap();
            assert_unit_norms(&fixed);
            assert_eq!(fixed.basis(), wp.basis());
            assert_eq!(fixed.sample_basis(), wp.sample_basis());

            for (a, b) in fixed.data().iter().zip(wp.data().iter()) {
                assert_abs_diff_eq!(a.norm(), b.norm(), epsilon = 1.0e-12);
            }
        }
    }

    #[test]
    fn test_max_point_fixes_phase_at_maximum() {
        let wp = random_wavepacket(&[2, 2], &[3, 3], 13);
        let fixed = localize_max_point(&wp, 0.7).unwrap();

        let shape = wp.basis().fundamental_shape();
        let positions = position_vectors(&fixed).unwrap();
        let idx = max_index(&positions, &shape).unwrap().unwrap();
        let idx = basis::wrap_index_around_origin(&shape, &idx, &[0, 0], &[0, 1]).unwrap();

        let total = total_phases(&positions, &fixed, &idx).unwrap();
        for t in total {
            assert_abs_diff_eq!(wrap_phases(t - 0.7, PI), 0.0, epsilon = 1.0e-10);
        }
    }

    #[test]
    fn test_two_points_are_mirrored_in_offset_cell() {
        let (idx0, idx1) = two_points(&[4, 4, 1], &[3, 1, 0], (1, 0)).unwrap();
        assert_eq!(idx0, vec![3, 1, 0]);
        assert_eq!(idx1, vec![5, -1, 0]);

        let (idx0, idx1) = two_points(&[4, 4], &[3, 1], (0, 0)).unwrap();
        assert_eq!(idx0, vec![-1, 1]);
        assert_eq!(idx1, vec![1, -1]);
    }

    fn two_peak_wavepacket(phi_max: f64, phi_mirror: f64) -> Wavepacket {
        // maximum at (1, 0) of a 3x3 cell, its mirror (0, 1) carries the rest
        let mut data = Array2::<c64>::zeros((1, 9));
        data[[0, 3]] = c64::from_polar(0.8, phi_max);
        data[[0, 1]] = c64::from_polar(0.6, phi_mirror);

        Wavepacket::new(
            StackedBasis::fundamental(&[1, 1]),
            StackedBasis::position(&[3, 3]),
            data,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_two_point_max_splits_phase_between_mirror_points() {
        let wp = two_peak_wavepacket(0.2, 0.8);
        assert_eq!(
            get_wavepacket_two_points(&wp, (0, 0)).unwrap(),
            Some((vec![1, 0], vec![0, 1]))
        );

        let fixed = localize_two_point_max(&wp, (0, 0), 0.0).unwrap();
        assert_abs_diff_eq!(fixed.data()[[0, 3]].arg(), -0.3, epsilon = 1.0e-12);
        assert_abs_diff_eq!(fixed.data()[[0, 1]].arg(), 0.3, epsilon = 1.0e-12);

        let fixed = localize_two_point_max(&wp, (0, 0), 0.25).unwrap();
        assert_abs_diff_eq!(fixed.data()[[0, 3]].arg(), -0.05, epsilon = 1.0e-12);
        assert_abs_diff_eq!(fixed.data()[[0, 1]].arg(), 0.55, epsilon = 1.0e-12);
    }

    #[test]
    fn test_two_point_max_splits_modulo_pi() {
        // a phase difference beyond pi/2 is folded back by pi first
        let wp = two_peak_wavepacket(0.2, 2.2);
        let fixed = localize_two_point_max(&wp, (0, 0), 0.0).unwrap();

        let p0 = fixed.data()[[0, 3]].arg();
        let p1 = fixed.data()[[0, 1]].arg();
        assert_abs_diff_eq!(p0, 0.5 * (PI - 2.0), epsilon = 1.0e-12);
        assert_abs_diff_eq!(wrap_phases(p0 + p1 - PI, PI), 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn test_two_point_needs_two_axes() {
        let wp = random_wavepacket(&[3], &[4], 2);

        assert!(matches!(
            localize_two_point_max(&wp, (0, 0), 0.0),
            Err(LocalizationError::TooFewAxes { required: 2, found: 1 })
        ));

        assert!(matches!(
            get_wavepacket_two_points(&wp, (0, 0)),
            Err(LocalizationError::TooFewAxes { .. })
        ));

        // max point falls back to the single available axis
        assert!(localize_max_point(&wp, 0.0).is_ok());
    }

    #[test]
    fn test_method_from_control() {
        let mut control = Control::new();
        control
            .parse_str("localization = single_point\nlocalization_idx = 1 0\nlocalization_angle = 0.25")
            .unwrap();
        assert_eq!(
            LocalizationMethod::from_control(&control).unwrap(),
            LocalizationMethod::SinglePoint {
                idx: vec![1, 0],
                angle: 0.25
            }
        );

        control.set_localization("two_point_max");
        assert_eq!(
            LocalizationMethod::from_control(&control).unwrap(),
            LocalizationMethod::TwoPointMax {
                offset: (0, 0),
                angle: 0.25
            }
        );

        control.set_localization("wannier");
        assert!(matches!(
            LocalizationMethod::from_control(&control),
            Err(LocalizationError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_list_localization_keeps_band_basis() {
        let wp = random_wavepacket(&[2, 2], &[2, 2], 4);
        let list = as_wavepacket_list(&[wp.clone(), wp]).unwrap();
        let list = WavepacketList::new(
            Axis::EvenlySpaced {
                n: 2,
                step: 2,
                offset: 0,
            },
            list.sample_basis().clone(),
            list.basis().clone(),
            list.data().clone(),
            list.eigenvalues().cloned(),
        )
        .unwrap();

        let fixed = localize_wavepacket_list(&list, &LocalizationMethod::MaxPoint { angle: 0.0 }).unwrap();
        assert_eq!(fixed.band_basis(), list.band_basis());
        assert_eq!(fixed.eigenvalues(), list.eigenvalues());
    }
}
