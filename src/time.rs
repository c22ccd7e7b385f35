use crate::der::{tag, Class, Token};
use crate::{Error, Result};

/// Decode a UTCTime or GeneralizedTime to seconds since the Unix epoch.
///
/// Accepted forms are `YYMMDDHHMM[SS]Z` and `YYYYMMDDHHMM[SS]Z`. Two digit
/// years below 50 land in 20xx, the rest in 19xx. Fractional seconds and
/// local time offsets are rejected.
pub fn time(token: &Token<'_>) -> Result<i64> {
    if token.class() != Class::Universal || !token.is_primitive() {
        return Err(Error::Invalid);
    }

    let input = token.raw();
    let (year, input) = match token.tag() {
        tag::UTC_TIME => {
            let (yy, input) = digits(input, 2)?;
            (if yy < 50 { 2000 + yy } else { 1900 + yy }, input)
        }
        tag::GENERALIZED_TIME => digits(input, 4)?,
        _ => return Err(Error::Invalid),
    };

    let (month, input) = digits(input, 2)?;
    let (day, input) = digits(input, 2)?;
    let (hour, input) = digits(input, 2)?;
    let (minute, input) = digits(input, 2)?;
    let (second, input) = match input {
        b"Z" => (0, input),
        _ => digits(input, 2)?,
    };
    if input != b"Z" {
        return Err(Error::Invalid);
    }

    if !(1..=12).contains(&month)
        || day < 1
        || day > days_in_month(year, month)
        || hour > 23
        || minute > 59
        || second > 59
    {
        return Err(Error::Invalid);
    }

    let days = days_from_civil(i64::from(year), month, day);
    Ok(days * 86_400 + i64::from(hour * 3600 + minute * 60 + second))
}

fn digits(input: &[u8], count: usize) -> Result<(u32, &[u8])> {
    if input.len() < count {
        return Err(Error::Invalid);
    }

    let (head, rest) = input.split_at(count);
    let mut value = 0;
    for b in head {
        if !b.is_ascii_digit() {
            return Err(Error::Invalid);
        }
        value = value * 10 + u32::from(b - b'0');
    }
    Ok((value, rest))
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// Days between 1970-01-01 and the given proleptic Gregorian date, counting
// from a March based year so the leap day falls at the end.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let month_from_march = i64::from((month + 9) % 12);
    let day_of_year = (153 * month_from_march + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use std::vec::Vec;

    fn encode(tag: u8, text: &str) -> Vec<u8> {
        let mut out = vec![tag, text.len() as u8];
        out.extend_from_slice(text.as_bytes());
        out
    }

    fn utc(text: &str) -> Result<i64> {
        let data = encode(0x17, text);
        time(&Parser::new(&data).next().unwrap())
    }

    fn generalized(text: &str) -> Result<i64> {
        let data = encode(0x18, text);
        time(&Parser::new(&data).next().unwrap())
    }

    #[test]
    fn epoch() {
        assert_eq!(utc("700101000000Z"), Ok(0));
        assert_eq!(generalized("19700101000000Z"), Ok(0));
        assert_eq!(days_from_civil(1970, 1, 1), 0);
    }

    #[test]
    fn known_dates() {
        assert_eq!(utc("000101000000Z"), Ok(946_684_800));
        assert_eq!(utc("261017035441Z"), Ok(1_792_209_281));
        assert_eq!(generalized("20000229120000Z"), Ok(951_825_600));
        assert_eq!(generalized("19691231235959Z"), Ok(-1));
        assert_eq!(generalized("19000301000000Z"), Ok(-2_203_891_200));
    }

    #[test]
    fn two_digit_year_window() {
        assert_eq!(utc("491231235959Z"), Ok(2_524_607_999));
        assert_eq!(utc("500101000000Z"), Ok(-631_152_000));
    }

    #[test]
    fn seconds_are_optional() {
        assert_eq!(utc("7001010001Z"), Ok(60));
        assert_eq!(generalized("197001010001Z"), Ok(60));
    }

    #[test]
    fn field_ranges() {
        assert_eq!(utc("001301000000Z"), Err(Error::Invalid));
        assert_eq!(utc("000001000000Z"), Err(Error::Invalid));
        assert_eq!(utc("000100000000Z"), Err(Error::Invalid));
        assert_eq!(utc("000431000000Z"), Err(Error::Invalid));
        assert_eq!(utc("000101240000Z"), Err(Error::Invalid));
        assert_eq!(utc("000101006000Z"), Err(Error::Invalid));
        assert_eq!(utc("000101000060Z"), Err(Error::Invalid));
    }

    #[test]
    fn leap_days() {
        assert!(generalized("20000229000000Z").is_ok());
        assert!(generalized("20240229000000Z").is_ok());
        assert_eq!(generalized("19000229000000Z"), Err(Error::Invalid));
        assert_eq!(generalized("20230229000000Z"), Err(Error::Invalid));
        assert_eq!(utc("230229000000Z"), Err(Error::Invalid));
    }

    #[test]
    fn malformed() {
        assert_eq!(utc(""), Err(Error::Invalid));
        assert_eq!(utc("000101000000"), Err(Error::Invalid));
        assert_eq!(utc("000101000000+0100"), Err(Error::Invalid));
        assert_eq!(utc("0001010000 0Z"), Err(Error::Invalid));
        assert_eq!(utc("000101000000ZZ"), Err(Error::Invalid));
        assert_eq!(utc("00010100000Z"), Err(Error::Invalid));
        assert_eq!(generalized("20000101000000.5Z"), Err(Error::Invalid));
        assert_eq!(generalized("000101000000Z"), Err(Error::Invalid));
    }

    #[test]
    fn wrong_type() {
        let data = encode(0x04, "000101000000Z");
        assert_eq!(time(&Parser::new(&data).next().unwrap()), Err(Error::Invalid));

        let data = encode(0x97, "000101000000Z");
        assert_eq!(time(&Parser::new(&data).next().unwrap()), Err(Error::Invalid));
    }
}
