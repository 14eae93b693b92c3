use itertools::multizip;
use types::c64;
use wpconsts::ZERO_C64;

pub fn zdot_product(u: &[c64], v: &[c64]) -> c64 {
    assert_eq!(u.len(), v.len());

    multizip((u.iter(), v.iter()))
        .map(|(x, y)| x.conj() * (*y))
        .fold(ZERO_C64, |acc, z| acc + z)
}

pub fn vec_norm(v: &[c64]) -> f64 {
    v.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
}

/// Index of the component with the largest modulus; the first one wins on ties.
pub fn argmax_norm(v: &[c64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, x) in v.iter().enumerate() {
        let a = x.norm_sqr();
        match best {
            Some((_, b)) if a <= b => {}
            _ => best = Some((i, a)),
        }
    }

    best.map(|(i, _)| i)
}

pub fn argsort(v: &[f64]) -> Vec<usize> {
    let mut idx = (0..v.len()).collect::<Vec<_>>();

    idx.sort_by(|&i, &j| v[i].total_cmp(&v[j]));

    idx
}

/// N even, 8
///
/// n : 0 1 2 3 4 5 6 7
///
/// i : 0 1 2 3 4 -3 -2 -1
///
/// N Odd, 7
///
/// n : 0 1 2 3 4 5 6
///
/// i : 0 1 2 3 -3 -2 -1
pub fn fft_n2i(n: usize, ntot: usize) -> isize {
    if n > ntot / 2 {
        n as isize - ntot as isize
    } else {
        n as isize
    }
}

pub fn fft_i2n(i: isize, ntot: usize) -> usize {
    i.rem_euclid(ntot as isize) as usize
}
