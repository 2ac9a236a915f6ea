//! A compact SI catalog and its symbol map.

use crate::error::Result;
use crate::symbols::SymbolMap;
use crate::unit::Unit;
use mensura_convert::Converter;
use num_bigint::BigInt;
use num_rational::BigRational;
use once_cell::sync::Lazy;

fn ratio(dividend: i64, divisor: i64) -> Converter {
    Converter::rational(dividend, divisor).expect("static SI ratio")
}

fn power_of_ten(exponent: i32) -> Converter {
    let magnitude = num_traits::pow(BigInt::from(10u8), exponent.unsigned_abs() as usize);
    let converter = if exponent < 0 {
        Converter::rational(1, magnitude)
    } else {
        Converter::rational(magnitude, 1)
    };
    converter.expect("static SI prefix")
}

fn derived(unit: Result<Unit>) -> Unit {
    unit.expect("static SI unit")
}

pub static METRE: Lazy<Unit> = Lazy::new(|| Unit::base("m"));
pub static KILOGRAM: Lazy<Unit> = Lazy::new(|| Unit::base("kg"));
pub static SECOND: Lazy<Unit> = Lazy::new(|| Unit::base("s"));
pub static AMPERE: Lazy<Unit> = Lazy::new(|| Unit::base("A"));
pub static KELVIN: Lazy<Unit> = Lazy::new(|| Unit::base("K"));
pub static MOLE: Lazy<Unit> = Lazy::new(|| Unit::base("mol"));
pub static CANDELA: Lazy<Unit> = Lazy::new(|| Unit::base("cd"));

pub static GRAM: Lazy<Unit> = Lazy::new(|| KILOGRAM.transform(&ratio(1, 1000)));
pub static CUBIC_METRE: Lazy<Unit> = Lazy::new(|| derived(METRE.pow(3)));
pub static LITRE: Lazy<Unit> = Lazy::new(|| CUBIC_METRE.transform(&ratio(1, 1000)));

pub static NEWTON: Lazy<Unit> = Lazy::new(|| {
    let parent = KILOGRAM
        .multiply(&METRE)
        .and_then(|unit| unit.divide(&SECOND.pow(2)?));
    Unit::alternate("N", &derived(parent))
});
pub static PASCAL: Lazy<Unit> = Lazy::new(|| {
    let parent = METRE.pow(2).and_then(|area| NEWTON.divide(&area));
    Unit::alternate("Pa", &derived(parent))
});
pub static JOULE: Lazy<Unit> =
    Lazy::new(|| Unit::alternate("J", &derived(NEWTON.multiply(&METRE))));
pub static WATT: Lazy<Unit> = Lazy::new(|| Unit::alternate("W", &derived(JOULE.divide(&SECOND))));
pub static HERTZ: Lazy<Unit> = Lazy::new(|| Unit::alternate("Hz", &derived(SECOND.reciprocal())));
pub static RADIAN: Lazy<Unit> = Lazy::new(|| Unit::alternate("rad", &Unit::one()));

pub static MINUTE: Lazy<Unit> = Lazy::new(|| SECOND.transform(&ratio(60, 1)));
pub static HOUR: Lazy<Unit> = Lazy::new(|| SECOND.transform(&ratio(3600, 1)));
pub static DAY: Lazy<Unit> = Lazy::new(|| SECOND.transform(&ratio(86400, 1)));
pub static CELSIUS: Lazy<Unit> = Lazy::new(|| {
    KELVIN.shift(BigRational::new(BigInt::from(27315), BigInt::from(100)))
});
pub static PERCENT: Lazy<Unit> = Lazy::new(|| Unit::one().transform(&ratio(1, 100)));

const PREFIXES: [(&str, i32); 20] = [
    ("Y", 24),
    ("Z", 21),
    ("E", 18),
    ("P", 15),
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("k", 3),
    ("h", 2),
    ("da", 1),
    ("d", -1),
    ("c", -2),
    ("m", -3),
    ("µ", -6),
    ("n", -9),
    ("p", -12),
    ("f", -15),
    ("a", -18),
    ("z", -21),
    ("y", -24),
];

static SI_SYMBOLS: Lazy<SymbolMap> = Lazy::new(|| {
    let mut map = SymbolMap::new();
    for (unit, symbol) in [
        (&*METRE, "m"),
        (&*KILOGRAM, "kg"),
        (&*SECOND, "s"),
        (&*AMPERE, "A"),
        (&*KELVIN, "K"),
        (&*MOLE, "mol"),
        (&*CANDELA, "cd"),
        (&*GRAM, "g"),
        (&*LITRE, "L"),
        (&*NEWTON, "N"),
        (&*PASCAL, "Pa"),
        (&*JOULE, "J"),
        (&*WATT, "W"),
        (&*HERTZ, "Hz"),
        (&*RADIAN, "rad"),
        (&*MINUTE, "min"),
        (&*HOUR, "h"),
        (&*DAY, "d"),
        (&*CELSIUS, "℃"),
        (&*PERCENT, "%"),
    ] {
        map.label(unit, symbol);
    }
    map.alias(&LITRE, "l").alias(&CELSIUS, "°C");

    for (symbol, exponent) in PREFIXES {
        map.label_prefix(&power_of_ten(exponent), symbol);
    }
    map.alias_prefix(&power_of_ten(-6), "μ");

    tracing::debug!(symbols = map.len(), "built SI symbol map");
    map
});

/// The process-wide SI symbol map.
pub fn symbols() -> &'static SymbolMap {
    &SI_SYMBOLS
}
