use agemap::ramp::{Ramp, RampError, UnknownYear, YearColorStop};

fn example_ramp() -> Ramp {
    Ramp::new(
        vec![
            YearColorStop::new(1800, "#e41a1c"),
            YearColorStop::new(1925, "#4daf4a"),
            YearColorStop::new(2019, "#377eb8"),
        ],
        UnknownYear::new(0, "gray"),
    )
    .expect("example ramp is well formed")
}

#[test]
fn resolves_documented_examples() {
    let ramp = example_ramp();
    assert_eq!(ramp.resolve(1850), "#e41a1c");
    assert_eq!(ramp.resolve(1925), "#4daf4a");
    assert_eq!(ramp.resolve(2050), "#377eb8");
    assert_eq!(ramp.resolve(0), "gray");
}

#[test]
fn picks_greatest_stop_not_after_year() {
    let ramp = example_ramp();
    for year in 1800..2100 {
        let expected = ramp
            .stops()
            .iter()
            .rev()
            .find(|stop| stop.year <= year)
            .map(|stop| stop.color.as_str())
            .unwrap();
        assert_eq!(ramp.resolve(year), expected, "year {year}");
    }
}

#[test]
fn years_below_lowest_stop_take_lowest_color() {
    let ramp = example_ramp();
    assert_eq!(ramp.resolve(1700), "#e41a1c");
    assert_eq!(ramp.resolve(-5), "#e41a1c");
}

#[test]
fn sentinel_ignores_ramp_contents() {
    let ramp = Ramp::new(
        vec![YearColorStop::new(-10, "#000000"), YearColorStop::new(10, "#ffffff")],
        UnknownYear::new(0, "black"),
    )
    .unwrap();
    assert_eq!(ramp.resolve(0), "black");
    assert_eq!(ramp.resolve(-1), "#000000");
    assert_eq!(ramp.resolve(1), "#000000");
}

#[test]
fn custom_sentinel_is_honoured() {
    let ramp = Ramp::new(
        vec![YearColorStop::new(1900, "#abc")],
        UnknownYear::new(-1, "gray"),
    )
    .unwrap();
    assert_eq!(ramp.resolve(-1), "gray");
    assert_eq!(ramp.resolve(0), "#abc");
}

#[test]
fn empty_ramp_fails_fast() {
    let err = Ramp::new(Vec::new(), UnknownYear::new(0, "gray")).unwrap_err();
    assert_eq!(err, RampError::Empty);
}

#[test]
fn unsorted_or_duplicate_stops_fail_fast() {
    let unsorted = Ramp::new(
        vec![YearColorStop::new(1925, "#4daf4a"), YearColorStop::new(1800, "#e41a1c")],
        UnknownYear::new(0, "gray"),
    )
    .unwrap_err();
    assert_eq!(
        unsorted,
        RampError::Unsorted {
            previous: 1925,
            next: 1800
        }
    );

    let duplicate = Ramp::new(
        vec![YearColorStop::new(1900, "#4daf4a"), YearColorStop::new(1900, "#e41a1c")],
        UnknownYear::new(0, "gray"),
    );
    assert!(matches!(duplicate, Err(RampError::Unsorted { .. })));
}

#[test]
fn step_expression_special_cases_sentinel() {
    let ramp = example_ramp();
    let expression = ramp.step_expression();
    assert_eq!(expression[0], "case");
    assert_eq!(expression[1], serde_json::json!(["==", ["get", "year_built"], 0]));
    assert_eq!(expression[2], "gray");
    assert_eq!(expression[3], ramp.dated_expression());
}
