mod common;

use anyhow::Result;
use common::{arange, init_logging};
use meteogrid::{
    destagger_axis, Array, ComputeOptions, DataType, DimArray, Dimension, GridError, Range,
};

#[test]
fn section_shape_follows_range_lengths() -> Result<()> {
    init_logging();
    let array = arange(&[4, 5, 6]);
    let cases = [
        [Range::full(4)?, Range::full(5)?, Range::full(6)?],
        [Range::new(1, 3, 2)?, Range::new(0, 4, 3)?, Range::with_length(2, 3)?],
        [Range::new(3, 3, 1)?, Range::new(0, 0, 1)?, Range::new(0, 5, 5)?],
    ];
    for ranges in &cases {
        let section = array.section(ranges)?;
        let expected: Vec<usize> = ranges.iter().map(Range::length).collect();
        assert_eq!(section.shape(), expected.as_slice());
    }
    Ok(())
}

#[test]
fn section_then_copy_is_idempotent() -> Result<()> {
    let array = arange(&[4, 6]);
    let copy = array
        .section(&[Range::new(1, 3, 1)?, Range::new(0, 5, 2)?])?
        .copy()?;
    let again = copy.section(&copy.full_ranges()?)?;
    assert_eq!(again, copy);
    assert_eq!(again.copy()?, copy);
    Ok(())
}

#[test]
fn full_section_of_copy_equals_original() -> Result<()> {
    let array = arange(&[2, 3, 4]);
    let ranges: Vec<Range> = array
        .shape()
        .iter()
        .map(|&len| Range::new(0, len as i64 - 1, 1))
        .collect::<meteogrid::Result<_>>()?;
    assert_eq!(array.copy()?.section(&ranges)?, array);
    Ok(())
}

#[test]
fn elementwise_add() -> Result<()> {
    let a = Array::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
    let b = Array::from_vec(&[2, 3], vec![1.0; 6])?;
    let expected = Array::from_vec(&[2, 3], vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0])?;
    assert_eq!(a.add(&b)?, expected);
    Ok(())
}

#[test]
fn factory_rejects_negative_dimension() {
    let err = Array::factory(DataType::Float, &[4, -2, 3]).unwrap_err();
    assert!(matches!(err, GridError::Allocation { .. }));
}

#[test]
fn destagger_orthogonal_axes_composes() -> Result<()> {
    let data = arange(&[4, 5, 6]);
    let dims = vec![
        Dimension::new("bottom_top_stag", 4).staggered(true),
        Dimension::new("south_north", 5),
        Dimension::new("west_east_stag", 6).staggered(true),
    ];
    let grid = DimArray::new(data, dims)?;
    let once = destagger_axis(&grid, 0)?;
    let twice = destagger_axis(&once, 2)?;
    assert_eq!(twice.shape(), &[3, 5, 5]);

    // Mean of four neighbours, exact for these small integers.
    let v = |k: usize, j: usize, i: usize| (k * 30 + j * 6 + i) as f64;
    let expected = (v(1, 2, 3) + v(2, 2, 3) + v(1, 2, 4) + v(2, 2, 4)) / 4.0;
    assert_eq!(twice.data().get_at(&[1, 2, 3])?.as_f64(), expected);
    Ok(())
}

#[test]
fn destagger_with_empty_cross_axis() -> Result<()> {
    let data = Array::factory(DataType::Double, &[4, 0])?;
    let centers = meteogrid::destagger_array(&data, 0)?;
    assert_eq!(centers.shape(), &[3, 0]);
    Ok(())
}

#[test]
fn destagger_length_one_axis_fails() -> Result<()> {
    let grid = DimArray::new(
        arange(&[1, 3]),
        vec![Dimension::new("stag", 1).staggered(true), Dimension::new("x", 3)],
    )?;
    let err = meteogrid::destagger(&grid).unwrap_err();
    assert!(matches!(err, GridError::InvalidRange(_)));
    Ok(())
}

#[test]
fn parallel_results_match_sequential() -> Result<()> {
    init_logging();
    let a = arange(&[64, 64]).mul_scalar(0.1)?;
    let b = arange(&[64, 64]).add_scalar(1.0)?;

    let sequential = a.div(&b)?;
    let previous = meteogrid::global_options();
    meteogrid::set_global_options(ComputeOptions::default().with_parallel_threshold(1));
    let parallel = a.div(&b);
    meteogrid::set_global_options(previous);

    let parallel = parallel?;
    let bits = |array: &Array| -> meteogrid::Result<Vec<u64>> {
        Ok(array.to_vec_f64()?.into_iter().map(f64::to_bits).collect())
    };
    assert_eq!(bits(&parallel)?, bits(&sequential)?);
    Ok(())
}

#[test]
fn views_are_shareable_across_threads() -> Result<()> {
    let array = arange(&[8, 8]);
    let handles: Vec<_> = (0..4)
        .map(|row| {
            let array = array.clone();
            std::thread::spawn(move || -> meteogrid::Result<f64> {
                let view = array.section(&[Range::new(row * 2, row * 2 + 1, 1)?, Range::full(8)?])?;
                Ok(view.to_vec_f64()?.iter().sum())
            })
        })
        .collect();
    let mut total = 0.0;
    for handle in handles {
        total += handle.join().expect("worker panicked")?;
    }
    assert_eq!(total, (0..64).sum::<i32>() as f64);
    Ok(())
}
