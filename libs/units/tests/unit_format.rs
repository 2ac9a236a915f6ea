//! Unit tests for the precedence printer and the format facade

use mensura_units::si::{
    AMPERE, CELSIUS, CUBIC_METRE, GRAM, KELVIN, KILOGRAM, LITRE, METRE, NEWTON, PASCAL, SECOND,
};
use mensura_units::{
    format, parse, Converter, Error, ExponentStyle, FormatOptions, ProductSeparator, Unit,
    UnitFormat,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::f64::consts::E;
use std::fmt;

fn rational(a: i64, b: i64) -> Converter {
    Converter::rational(a, b).unwrap()
}

fn ratio(a: i64, b: i64) -> BigRational {
    BigRational::new(BigInt::from(a), BigInt::from(b))
}

/// Formats `unit` and checks that the text parses back to it.
fn round_trip(unit: &Unit) -> String {
    let text = format(unit);
    assert_eq!(&parse(&text).unwrap(), unit, "re-parsing {text:?}");
    text
}

#[test]
fn test_symbols_print_verbatim() {
    assert_eq!(round_trip(&METRE), "m");
    assert_eq!(round_trip(&KILOGRAM), "kg");
    assert_eq!(round_trip(&GRAM), "g");
    assert_eq!(round_trip(&NEWTON), "N");
    assert_eq!(round_trip(&CELSIUS), "℃");
    assert_eq!(round_trip(&Unit::one()), "");
}

#[test]
fn test_products() {
    let per_square_second = SECOND.pow(2).unwrap().reciprocal().unwrap();
    assert_eq!(round_trip(&METRE.multiply(&per_square_second).unwrap()), "m/s^2");
    assert_eq!(round_trip(&SECOND.reciprocal().unwrap()), "1/s");
    let force = KILOGRAM
        .multiply(&METRE)
        .and_then(|unit| unit.multiply(&per_square_second))
        .unwrap();
    assert_eq!(round_trip(&force), "kg·m/s^2");
}

#[test]
fn test_negative_powers_are_grouped() {
    let unit = METRE
        .divide(&SECOND)
        .and_then(|unit| unit.divide(&AMPERE))
        .and_then(|unit| unit.divide(&KELVIN))
        .unwrap();
    assert_eq!(round_trip(&unit), "m/(s·A·K)");
    let denominator = SECOND.pow(2).unwrap().multiply(&AMPERE).unwrap();
    assert_eq!(
        round_trip(&METRE.divide(&denominator).unwrap()),
        "m/(s^2·A)"
    );
}

#[test]
fn test_prefixed_units() {
    assert_eq!(round_trip(&METRE.transform(&rational(1000, 1))), "km");
    assert_eq!(round_trip(&SECOND.transform(&rational(1, 1000))), "ms");
    assert_eq!(round_trip(&PASCAL.transform(&rational(1000, 1))), "kPa");
    assert_eq!(round_trip(&parse("km/h").unwrap()), "km/h");
    assert_eq!(round_trip(&parse("km^2").unwrap()), "km^2");
    assert_eq!(round_trip(&parse("m℃").unwrap()), "m℃");
}

#[test]
fn test_gram_and_litre_notation() {
    assert_eq!(round_trip(&KILOGRAM.transform(&rational(1, 1_000_000))), "mg");
    assert_eq!(round_trip(&KILOGRAM.transform(&rational(1000, 1))), "Mg");
    assert_eq!(round_trip(&LITRE.transform(&rational(1, 1000))), "mL");
    assert_eq!(round_trip(&CUBIC_METRE.transform(&rational(1, 1000))), "L");
    assert_eq!(round_trip(&KILOGRAM.transform(&rational(3, 7))), "g·3000/7");
    assert_eq!(round_trip(&KILOGRAM.shift(ratio(5, 1))), "kg+5");
    // A plain cubic metre keeps its product form
    assert_eq!(round_trip(&CUBIC_METRE), "m^3");
}

#[test]
fn test_scaled_units() {
    assert_eq!(round_trip(&METRE.transform(&rational(3, 7))), "m·3/7");
    assert_eq!(round_trip(&METRE.transform(&rational(1, 7))), "m/7");
    assert_eq!(round_trip(&METRE.transform(&rational(-2, 1))), "m·-2");
    assert_eq!(
        round_trip(&METRE.divide(&SECOND).unwrap().transform(&rational(1000, 1))),
        "m/s·1000"
    );
    assert_eq!(
        round_trip(&Unit::one().transform(&rational(3, 7))),
        "3/7"
    );
}

#[test]
fn test_offsets() {
    assert_eq!(round_trip(&KELVIN.shift(ratio(5, 1))), "K+5");
    assert_eq!(round_trip(&KELVIN.shift(ratio(-1, 2))), "K-0.5");
    assert_eq!(
        round_trip(&KELVIN.shift(ratio(5, 1)).transform(&rational(1, 1000))),
        "(K+5)/1000"
    );
    assert_eq!(
        round_trip(&Unit::one().shift(ratio(5, 2))),
        "(1)+2.5"
    );
    assert_eq!(
        round_trip(&CELSIUS.transform(&rational(3, 7))),
        "℃·3/7"
    );
}

#[test]
fn test_logarithmic_units() {
    assert_eq!(
        round_trip(&PASCAL.transform(&Converter::log(10.0).unwrap())),
        "log(Pa)"
    );
    assert_eq!(
        round_trip(&SECOND.transform(&Converter::log(E).unwrap())),
        "ln(s)"
    );
    assert_eq!(
        round_trip(&METRE.divide(&SECOND).unwrap().transform(&Converter::log(2.0).unwrap())),
        "log2(m/s)"
    );
    assert_eq!(
        round_trip(&METRE.transform(&Converter::exp(10.0).unwrap())),
        "10^m"
    );
    assert_eq!(
        round_trip(&METRE.divide(&SECOND).unwrap().transform(&Converter::exp(E).unwrap())),
        "e^(m/s)"
    );
    assert_eq!(
        round_trip(&Unit::one().transform(&rational(1000, 1)).transform(&Converter::exp(10.0).unwrap())),
        "10^((1000))"
    );
}

#[test]
fn test_converter_chains() {
    let chain = Converter::add(ratio(5, 1))
        .unwrap()
        .concatenate(&rational(2, 1))
        .concatenate(&Converter::add(ratio(3, 1)).unwrap());
    let unit = KELVIN.transform(&chain.inverse());
    assert_eq!(round_trip(&unit), "(K-3)/2-5");
    assert_eq!(round_trip(&KELVIN.transform(&chain)), "(K+5)·2+3");

    let milli_celsius = CELSIUS.transform(&rational(1, 1000));
    assert_eq!(round_trip(&milli_celsius.shift(ratio(2, 1))), "m℃+2");
    assert_eq!(
        round_trip(&milli_celsius.shift(ratio(2, 1)).transform(&rational(3, 1))),
        "(m℃+2)·3"
    );
}

#[test]
fn test_float_factors_reparse_as_rationals() {
    let unit = METRE.transform(&Converter::multiply(0.5).unwrap());
    let text = format(&unit);
    assert_eq!(text, "m·0.5");
    assert_eq!(parse(&text).unwrap(), METRE.transform(&rational(1, 2)));
}

#[test]
fn test_annotations() {
    let speed = METRE.divide(&SECOND).unwrap();
    assert_eq!(round_trip(&speed.annotate("speed").unwrap()), "m/s{speed}");
    assert_eq!(round_trip(&Unit::one().annotate("rbc").unwrap()), "{rbc}");
    let tick = SECOND.annotate("tick").unwrap();
    assert_eq!(round_trip(&METRE.multiply(&tick).unwrap()), "m·(s{tick})");
    let twice = METRE.annotate("a").and_then(|unit| unit.annotate("b")).unwrap();
    assert_eq!(round_trip(&twice), "m{a}{b}");
}

#[test]
fn test_annotations_with_braces() {
    assert_eq!(round_trip(&METRE.annotate("a{b").unwrap()), "m{a{b}");
    let tick = SECOND.annotate("{x").unwrap();
    assert_eq!(round_trip(&METRE.multiply(&tick).unwrap()), "m·(s{{x})");
    assert_eq!(
        METRE.annotate("a}b"),
        Err(Error::InvalidAnnotation("a}b".to_string()))
    );
}

#[test]
fn test_format_options() {
    let unit = METRE
        .pow(2)
        .and_then(|area| KILOGRAM.multiply(&area))
        .and_then(|unit| unit.divide(&SECOND.pow(3)?))
        .unwrap();

    let asterisk: UnitFormat = UnitFormat::default()
        .with_options(FormatOptions::default().with_product_separator(ProductSeparator::Asterisk));
    assert_eq!(asterisk.format(&unit), "kg*m^2/s^3");

    let superscript: UnitFormat = UnitFormat::default()
        .with_options(FormatOptions::default().with_exponent_style(ExponentStyle::Superscript));
    let text = superscript.format(&unit);
    assert_eq!(text, "kg·m²/s³");
    assert_eq!(superscript.parse(&text).unwrap(), unit);
}

#[test]
fn test_display_matches_format() {
    let unit = parse("kg·m/s^2").unwrap();
    assert_eq!(unit.to_string(), format(&unit));
}

struct FailingSink;

impl fmt::Write for FailingSink {
    fn write_str(&mut self, _: &str) -> fmt::Result {
        Err(fmt::Error)
    }
}

#[test]
fn test_sink_errors_propagate() {
    let format: UnitFormat = UnitFormat::default();
    let err = format.format_to(&METRE, &mut FailingSink).unwrap_err();
    assert_eq!(err, Error::Sink(fmt::Error));

    let mut out = String::new();
    format.format_to(&NEWTON, &mut out).unwrap();
    assert_eq!(out, "N");
}
