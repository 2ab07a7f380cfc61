use std::fmt;
use std::time::Duration;

/// Parse a segment length into [`Duration`].
///
/// A bare number is a count of seconds (`600`, `1.5`). Otherwise the value is
/// one or more `<number><unit>` components, optionally separated by spaces or
/// underscores (`10m`, `1m 30s`, `1h_15m`, `500ms`).
///
/// ```text
/// duration  = number | component { separators component } ;
/// component = number separators? unit ;
/// number    = digits [ "." digits ] ;
/// unit      = "ms" | "s" | "m" | "h" ;
/// ```
///
/// Each unit may appear once. Fractions are accepted down to whole
/// milliseconds. A leading `-` is rejected; zero is returned as is and left to
/// the caller.
pub fn parse_duration(value: &str) -> Result<Duration, DurationParseError> {
    let input = value.trim();
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if input.starts_with('-') {
        return Err(DurationParseError::Negative);
    }
    let input = input.strip_prefix('+').unwrap_or(input);

    if let Ok(number) = Number::parse_exact(input) {
        return number.to_duration(Unit::Second);
    }

    let mut cursor = Cursor::new(input);
    let mut seen = Vec::with_capacity(4);
    let mut total_ms: u64 = 0;

    while !cursor.at_end() {
        let number = cursor.number()?;
        cursor.skip_separators();
        let unit = cursor.unit()?;
        if seen.contains(&unit) {
            return Err(DurationParseError::DuplicateUnit(unit));
        }
        seen.push(unit);

        let component = duration_to_millis(number.to_duration(unit)?);
        total_ms = total_ms
            .checked_add(component)
            .ok_or(DurationParseError::TooLarge)?;
        cursor.skip_separators();
    }

    Ok(Duration::from_millis(total_ms))
}

fn duration_to_millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millisecond,
    Second,
    Minute,
    Hour,
}

impl Unit {
    fn millis(self) -> u128 {
        match self {
            Unit::Millisecond => 1,
            Unit::Second => 1_000,
            Unit::Minute => 60_000,
            Unit::Hour => 3_600_000,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Unit::Millisecond => "ms",
            Unit::Second => "s",
            Unit::Minute => "m",
            Unit::Hour => "h",
        }
    }
}

/// Decimal number kept as `mantissa / 10^scale`.
struct Number {
    mantissa: u128,
    scale: u32,
}

impl Number {
    /// Parse `text` only if all of it is a number.
    fn parse_exact(text: &str) -> Result<Self, DurationParseError> {
        let mut cursor = Cursor::new(text);
        let number = cursor.number()?;
        if cursor.at_end() {
            Ok(number)
        } else {
            Err(DurationParseError::ExpectedUnit { position: cursor.position() })
        }
    }

    fn to_duration(&self, unit: Unit) -> Result<Duration, DurationParseError> {
        let divisor = 10u128
            .checked_pow(self.scale)
            .ok_or(DurationParseError::TooPrecise(unit))?;
        let scaled = self
            .mantissa
            .checked_mul(unit.millis())
            .ok_or(DurationParseError::TooLarge)?;
        if scaled % divisor != 0 {
            return Err(DurationParseError::TooPrecise(unit));
        }

        let millis = u64::try_from(scaled / divisor).map_err(|_| DurationParseError::TooLarge)?;
        Ok(Duration::from_millis(millis))
    }
}

struct Cursor<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    fn at_end(&self) -> bool {
        self.offset >= self.text.len()
    }

    /// 1-based column for error messages.
    fn position(&self) -> usize {
        self.offset + 1
    }

    fn skip_separators(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(|c: char| c == '_' || c.is_ascii_whitespace());
        self.offset += rest.len() - trimmed.len();
    }

    fn number(&mut self) -> Result<Number, DurationParseError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let literal = &rest[..len];

        let (whole, fraction) = match literal.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (literal, ""),
        };
        let well_formed = !whole.is_empty()
            && whole.bytes().all(|b| b.is_ascii_digit())
            && fraction.bytes().all(|b| b.is_ascii_digit())
            && (!fraction.is_empty() || !literal.contains('.'));
        if !well_formed {
            return Err(DurationParseError::ExpectedNumber {
                position: self.position(),
            });
        }

        let digits = format!("{whole}{fraction}");
        let mantissa = digits
            .parse::<u128>()
            .map_err(|_| DurationParseError::TooLarge)?;
        self.offset += len;

        Ok(Number {
            mantissa,
            scale: fraction.len() as u32,
        })
    }

    fn unit(&mut self) -> Result<Unit, DurationParseError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let unit = match &rest[..len] {
            "ms" => Unit::Millisecond,
            "s" => Unit::Second,
            "m" => Unit::Minute,
            "h" => Unit::Hour,
            "" => {
                return Err(DurationParseError::ExpectedUnit {
                    position: self.position(),
                })
            }
            other => {
                return Err(DurationParseError::UnknownUnit {
                    position: self.position(),
                    found: other.to_owned(),
                })
            }
        };
        self.offset += len;
        Ok(unit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    Empty,
    Negative,
    ExpectedNumber { position: usize },
    ExpectedUnit { position: usize },
    UnknownUnit { position: usize, found: String },
    DuplicateUnit(Unit),
    TooPrecise(Unit),
    TooLarge,
}

impl std::error::Error for DurationParseError {}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationParseError::Empty => write!(f, "duration cannot be empty"),
            DurationParseError::Negative => write!(f, "duration cannot be negative"),
            DurationParseError::ExpectedNumber { position } => {
                write!(f, "expected a number at position {position}")
            }
            DurationParseError::ExpectedUnit { position } => {
                write!(f, "expected a unit (ms, s, m, h) at position {position}")
            }
            DurationParseError::UnknownUnit { position, found } => {
                write!(f, "unknown unit '{found}' at position {position}")
            }
            DurationParseError::DuplicateUnit(unit) => {
                write!(f, "unit '{}' appears more than once", unit.symbol())
            }
            DurationParseError::TooPrecise(unit) => write!(
                f,
                "'{}' values must be a whole number of milliseconds",
                unit.symbol()
            ),
            DurationParseError::TooLarge => write!(f, "duration is too large"),
        }
    }
}
