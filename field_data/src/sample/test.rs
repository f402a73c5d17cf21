use super::*;

/// Thirty lines `k 2 3 .. 15` for k = 1..=30.
fn numbered_lines() -> String {
    (1..=ROWS)
        .map(|k| {
            std::iter::once(k.to_string())
                .chain((2..=COLUMNS).map(|c| c.to_string()))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn counting(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64 * 0.5 - 3.).collect()
}

#[test]
fn numbered_lines_split_into_halves() {
    let pair = MeasurementPair::parse_str(&numbered_lines()).unwrap();
    assert_eq!(pair.temperature.rows(), 15);
    assert_eq!(pair.temperature.columns(), 15);
    assert_eq!(pair.concentration.rows(), 15);
    assert_eq!(pair.concentration.columns(), 15);
    for row in 0..HALF_ROWS {
        assert_eq!(pair.temperature.get(row, 0), (row + 1) as f64);
        assert_eq!(pair.concentration.get(row, 0), (row + 16) as f64);
        assert_eq!(pair.temperature.get(row, 14), 15.);
        assert_eq!(&pair.concentration.row(row)[1..3], &[2., 3.]);
    }
}

#[test]
fn layout_of_lines_does_not_matter() {
    let values = counting(VALUE_COUNT);
    let one_line = values
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let ragged = values
        .chunks(7)
        .map(|c| {
            c.iter()
                .map(|f| format!("{f:e}"))
                .collect::<Vec<_>>()
                .join("\t ")
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    let a = MeasurementPair::parse_str(&one_line).unwrap();
    let b = MeasurementPair::parse_str(&ragged).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.flatten(), values);
}

#[test]
fn wrong_count_is_a_shape_error() {
    for count in [0, 1, 449, 451, 900] {
        let text = counting(count)
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        match MeasurementPair::parse_str(&text) {
            Err(Error::Shape { expected, found }) => {
                assert_eq!(expected, 450);
                assert_eq!(found, count);
            }
            other => panic!("expected shape error for {count} values, got {other:?}"),
        }
    }
}

#[test]
fn non_numeric_token_is_a_parse_error() {
    let mut lines: Vec<String> = numbered_lines().lines().map(String::from).collect();
    lines[3] = lines[3].replacen(" 7 ", " seven ", 1);
    match MeasurementPair::parse_str(&lines.join("\n")) {
        Err(Error::Parse {
            line,
            column,
            token,
        }) => {
            assert_eq!(line, 4);
            assert_eq!(column, 7);
            assert_eq!(token, "seven");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn parse_error_wins_over_shape_error() {
    assert!(matches!(
        MeasurementPair::parse_str("1 2 x"),
        Err(Error::Parse { .. })
    ));
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does_not_exist.txt");
    match MeasurementPair::read(&path) {
        Err(Error::FileNotFound(p)) => assert_eq!(p, path),
        other => panic!("expected missing file, got {other:?}"),
    }
}

#[test]
fn read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo_output.txt");
    std::fs::write(&path, numbered_lines()).unwrap();
    let pair = MeasurementPair::read(&path).unwrap();
    assert_eq!(pair.concentration.get(14, 0), 30.);
}

#[test]
fn range_ignores_non_finite_entries() {
    let matrix = Matrix::from_values(2, 2, vec![f64::NAN, -2., 5., f64::INFINITY]).unwrap();
    let (min, max) = matrix.range().unwrap();
    assert_eq!((min, max), (-2., 5.));
    let empty = Matrix::from_values(1, 1, vec![f64::NAN]).unwrap();
    assert!(empty.range().is_none());
}

#[test]
fn range_matches_statistics() {
    use statrs::statistics::Statistics;
    let pair = MeasurementPair::parse_str(&numbered_lines()).unwrap();
    let values = pair.concentration.values();
    let (min, max) = pair.concentration.range().unwrap();
    assert_eq!(min, Statistics::min(values.iter()));
    assert_eq!(max, Statistics::max(values.iter()));
}

#[test]
fn tsv_has_one_line_per_row() {
    let matrix = Matrix::from_values(2, 3, vec![1., 2., 3., 4., 5.5, 6.]).unwrap();
    assert_eq!(matrix.to_tsv(), "1\t2\t3\n4\t5.5\t6");
}
