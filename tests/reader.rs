mod common;

use anyhow::Result;
use common::init_logging;
use meteogrid::reader::encode_array;
use meteogrid::{
    geopotential_height, Array, ByteOrder, DataReader, DataType, Dimension, DimensionKind,
    GridError, RawDataReader, Variable,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn wrf_dims() -> Vec<Dimension> {
    vec![
        Dimension::new("bottom_top_stag", 3)
            .staggered(true)
            .with_kind(DimensionKind::Z),
        Dimension::new("south_north", 2).with_kind(DimensionKind::Y),
    ]
}

/// Write PH followed by PHB, big-endian floats.
fn write_geopotential_file() -> Result<(NamedTempFile, RawDataReader)> {
    let ph = Array::from_values(DataType::Float, &[3, 2], &[0.0, 0.0, 9.81, 19.62, 19.62, 39.24])?;
    let phb = Array::from_values(DataType::Float, &[3, 2], &[9.81; 6])?;

    let mut file = NamedTempFile::new()?;
    let ph_bytes = encode_array(&ph, ByteOrder::BigEndian)?;
    file.write_all(&ph_bytes)?;
    file.write_all(&encode_array(&phb, ByteOrder::BigEndian)?)?;
    file.flush()?;

    let reader = RawDataReader::new(file.path(), ByteOrder::BigEndian)
        .with_variable(
            Variable::new("PH", DataType::Float, wrf_dims())
                .with_attribute("units", "m2 s-2"),
            0,
        )
        .with_variable(
            Variable::new("PHB", DataType::Float, wrf_dims()),
            ph_bytes.len() as u64,
        );
    Ok((file, reader))
}

#[test]
fn reads_variables_with_dimensions() -> Result<()> {
    init_logging();
    let (_file, reader) = write_geopotential_file()?;

    let ph = reader.read("PH")?;
    assert_eq!(ph.shape(), &[3, 2]);
    assert_eq!(ph.data().data_type(), DataType::Float);
    assert_eq!(ph.stagger_dim_index(), Some(0));
    assert_eq!(ph.data().get_at(&[2, 1])?.as_f64(), f64::from(39.24f32));

    let variable = reader.require_variable("PH")?;
    assert_eq!(variable.attributes.get("units").map(String::as_str), Some("m2 s-2"));
    assert!(variable.is_staggered());
    Ok(())
}

#[test]
fn geopotential_height_from_file() -> Result<()> {
    let (_file, reader) = write_geopotential_file()?;
    let height = geopotential_height(&reader.read("PH")?, &reader.read("PHB")?)?;

    assert_eq!(height.shape(), &[2, 2]);
    assert!(!height.dimension(0).expect("vertical axis").is_staggered());
    let expected = [1.5, 2.0, 2.5, 4.0];
    for (value, expected) in height.data().to_vec_f64()?.into_iter().zip(expected) {
        assert!((value - expected).abs() < 1e-5, "{} vs {}", value, expected);
    }
    Ok(())
}

#[test]
fn unknown_variable() -> Result<()> {
    let (_file, reader) = write_geopotential_file()?;
    assert!(matches!(
        reader.read("T2"),
        Err(GridError::VariableNotFound { .. })
    ));
    Ok(())
}

#[test]
fn truncated_file_is_an_io_error() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(&[0u8; 10])?;
    file.flush()?;
    let reader = RawDataReader::new(file.path(), ByteOrder::LittleEndian).with_variable(
        Variable::new("U", DataType::Double, vec![Dimension::new("x", 2)]),
        0,
    );
    assert!(matches!(reader.read("U"), Err(GridError::Io(_))));
    Ok(())
}

#[test]
fn oversized_header_shapes_fail_before_reading() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(&[0u8; 16])?;
    file.flush()?;
    let reader = RawDataReader::new(file.path(), ByteOrder::BigEndian)
        .with_variable(
            Variable::new(
                "HUGE",
                DataType::Double,
                vec![Dimension::new("x", usize::MAX), Dimension::new("y", 2)],
            ),
            0,
        )
        .with_variable(
            Variable::new("LARGE", DataType::Double, vec![Dimension::new("x", 1 << 40)]),
            0,
        );
    assert_eq!(reader.require_variable("HUGE")?.size(), None);
    assert!(matches!(reader.read("HUGE"), Err(GridError::Allocation { .. })));
    assert!(matches!(reader.read("LARGE"), Err(GridError::Io(_))));
    Ok(())
}

#[test]
fn missing_file() {
    let reader = RawDataReader::new("/nonexistent/grid.bin", ByteOrder::BigEndian)
        .with_variable(Variable::new("U", DataType::Int, vec![Dimension::new("x", 1)]), 0);
    assert!(matches!(reader.read("U"), Err(GridError::FileOpen { .. })));
}
