use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{digit0, digit1, i32 as integer, multispace0, one_of};
use nom::combinator::{all_consuming, map, opt, value};
use nom::sequence::delimited;
use nom::{IResult, Parser};

/// Parses the argument of the `:nth-*()` pseudo-classes into `(a, b)`.
///
/// <an+b> = odd | even | <integer> | [+-]? <digits>? n [ [+-] <digits> ]?
pub(crate) fn parse_anplusb(input: &str) -> Option<(i32, i32)> {
    all_consuming(delimited(multispace0, anplusb, multispace0))
        .parse(input)
        .ok()
        .map(|(_, nth)| nth)
}

fn anplusb(input: &str) -> IResult<&str, (i32, i32)> {
    alt((
        value((2, 1), tag_no_case("odd")),
        value((2, 0), tag_no_case("even")),
        a_n_plus_b,
        map(integer, |b| (0, b)),
    ))
    .parse(input)
}

fn a_n_plus_b(input: &str) -> IResult<&str, (i32, i32)> {
    let (input, sign) = opt(one_of("+-")).parse(input)?;
    let (input, digits) = digit0(input)?;
    let (input, _) = one_of("nN").parse(input)?;

    let a = if digits.is_empty() {
        1
    } else {
        digits.parse::<i32>().map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
        })?
    };
    let a = if sign == Some('-') { -a } else { a };

    let (input, offset) = opt((multispace0, one_of("+-"), multispace0, digit1)).parse(input)?;
    let b = match offset {
        Some((_, sign, _, digits)) => {
            let b = digits.parse::<i32>().map_err(|_| {
                nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
            })?;
            if sign == '-' {
                -b
            } else {
                b
            }
        }
        None => 0,
    };

    Ok((input, (a, b)))
}

/// Returns true when the 1-based `index` is matched by `a*n + b` for some n >= 0
pub(crate) fn nth_matches(a: i32, b: i32, index: i32) -> bool {
    if a == 0 {
        return index == b;
    }

    let diff = index - b;
    diff % a == 0 && diff / a >= 0
}
