use basis::*;
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn test_wrap_fundamental_grid_333() {
    let shape = [3, 3, 3];
    let basis = StackedBasis::fundamental(&shape);

    for i in 0..basis.n() {
        let idx: Vec<isize> = basis
            .get_stacked_index(i)
            .unwrap()
            .iter()
            .map(|&j| j as isize)
            .collect();

        let wrapped = wrap_index_around_origin(&shape, &idx, &[0, 0, 0], &[0, 1, 2]).unwrap();
        for (w, j) in wrapped.iter().zip(idx.iter()) {
            assert!([-1, 0, 1].contains(w), "index {:?} wrapped to {:?}", idx, wrapped);
            assert_eq!((w - j).rem_euclid(3), 0);
        }

        assert_eq!(basis.get_flat_index_wrapped(&wrapped).unwrap(), i);
    }
}

#[test]
fn test_wrap_distance_range_and_idempotence() {
    let mut rng = StdRng::seed_from_u64(17);

    for n in 1..9usize {
        for _ in 0..50 {
            let d: isize = rng.gen_range(-40..40);
            let w = wrap_distance(d, n);

            assert!(2 * w > -(n as isize) && 2 * w <= n as isize, "d={} n={} w={}", d, n, w);
            assert_eq!((w - d).rem_euclid(n as isize), 0);
            assert_eq!(wrap_distance(w, n), w);
        }
    }
}

#[test]
fn test_decrement_brillouin_zone_agrees_with_wrap_on_square_lattice() {
    let mut rng = StdRng::seed_from_u64(23);
    let dk = Array2::<f64>::eye(2);

    for _ in 0..100 {
        let shape = [rng.gen_range(1..8usize), rng.gen_range(1..8usize)];
        let nk = [rng.gen_range(-20..20isize), rng.gen_range(-20..20isize)];

        let decremented = decrement_brillouin_zone(&shape, dk.view(), &nk).unwrap();
        for d in 0..2 {
            assert_eq!(decremented[d], wrap_distance(nk[d], shape[d]));
        }

        let again = decrement_brillouin_zone(&shape, dk.view(), &decremented).unwrap();
        assert_eq!(again, decremented);
    }
}

#[test]
fn test_decrement_brillouin_zone_666() {
    let shape = [6, 6, 6];
    let dk = Array2::<f64>::eye(3);

    // the zone boundary keeps the positive representative on every axis
    let nk = decrement_brillouin_zone(&shape, dk.view(), &[3, 3, 0]).unwrap();
    assert_eq!(nk, vec![3, 3, 0]);

    let nk = decrement_brillouin_zone(&shape, dk.view(), &[-3, 4, 5]).unwrap();
    assert_eq!(nk, vec![3, -2, -1]);
}
