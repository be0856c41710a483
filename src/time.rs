//! Time arithmetic for countdown durations
//!
//! Durations are whole seconds in the range `0..=5999` (99:59). Everything in
//! this module is pure: malformed input is tolerated and mapped to 0 rather
//! than rejected.

/// Largest configurable duration in seconds (99:59)
pub const MAX_SECONDS: i64 = 99 * 60 + 59;
pub const MAX_MINUTES: i64 = 99;
pub const MAX_SECONDS_IN_MINUTE: i64 = 59;

/// Number of digits a keypad entry can hold (mmss)
pub const KEYPAD_WIDTH: usize = 4;

/// Minutes and seconds view of a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub minutes: i64,
    pub seconds: i64,
}

/// Format seconds as `SS` below one minute, otherwise `MM:SS`.
///
/// Minutes are not capped, so 3661 renders as `61:01`.
pub fn format(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        return format!("{:02}", seconds);
    }
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse `SS` or `MM:SS` leniently.
///
/// Each part is read as a leading integer; missing or invalid parts count as
/// 0 and negative parts clamp to 0. Any shape other than zero or one colon
/// yields 0.
pub fn parse_freeform(input: &str) -> i64 {
    if input.is_empty() {
        return 0;
    }

    let parts: Vec<&str> = input.split(':').collect();
    match parts.as_slice() {
        [secs] => leading_int(secs).unwrap_or(0).max(0),
        [mins, secs] => {
            let minutes = leading_int(mins).unwrap_or(0).max(0);
            let seconds = leading_int(secs).unwrap_or(0).max(0);
            minutes.saturating_mul(60).saturating_add(seconds)
        }
        _ => 0,
    }
}

/// Parse a calculator-style keypad entry (`mmss`, most recent digit rightmost).
///
/// Values below 100 are plain seconds capped at 59. From 100 upwards the
/// value splits into `value / 100` minutes and `value % 100` seconds, with the
/// seconds field clamped to 59 rather than carried into the minutes.
pub fn parse_keypad(digits: &str) -> i64 {
    let trimmed = digits.trim();
    let window = if trimmed.len() > KEYPAD_WIDTH && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        &trimmed[trimmed.len() - KEYPAD_WIDTH..]
    } else {
        trimmed
    };

    let value = match leading_int(window) {
        Some(v) if v >= 0 => v,
        _ => return 0,
    };

    if value < 100 {
        return value.min(MAX_SECONDS_IN_MINUTE);
    }

    let minutes = value / 100;
    let seconds = (value % 100).min(MAX_SECONDS_IN_MINUTE);
    minutes * 60 + seconds
}

/// Clamp seconds into `[0, MAX_SECONDS]`
pub fn normalize(seconds: i64) -> i64 {
    seconds.clamp(0, MAX_SECONDS)
}

/// Split a duration into minutes and seconds after normalizing it
pub fn to_parts(seconds: i64) -> TimeParts {
    let normalized = normalize(seconds);
    TimeParts {
        minutes: normalized / 60,
        seconds: normalized % 60,
    }
}

/// Combine minutes and seconds into a normalized duration
pub fn from_parts(minutes: i64, seconds: i64) -> i64 {
    normalize(minutes.saturating_mul(60).saturating_add(seconds))
}

/// Strict validation of `SS` / `MM:SS` for input fields.
///
/// Unlike [`parse_freeform`], this rejects anything outside `MM <= 99` and
/// `SS <= 59`.
pub fn is_valid_display_string(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }

    if input.contains(':') {
        let parts: Vec<&str> = input.split(':').collect();
        let [mins, secs] = parts.as_slice() else {
            return false;
        };
        match (leading_int(mins), leading_int(secs)) {
            (Some(m), Some(s)) => {
                (0..=MAX_MINUTES).contains(&m) && (0..=MAX_SECONDS_IN_MINUTE).contains(&s)
            }
            _ => false,
        }
    } else {
        matches!(leading_int(input), Some(s) if (0..=MAX_SECONDS_IN_MINUTE).contains(&s))
    }
}

/// Render a duration as the four keypad digits `MMSS`
pub fn to_keypad_string(seconds: i64) -> String {
    let parts = to_parts(seconds);
    format!("{:02}{:02}", parts.minutes, parts.seconds)
}

/// Read the integer prefix of `s`: optional whitespace, optional sign, then
/// digits up to the first non-digit. `None` when no digit is present.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    // Saturate absurdly long digit runs instead of failing
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Fixed-width keypad entry, filled left-to-right like a calculator display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeypadBuffer {
    digits: String,
}

impl KeypadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a digit. Returns false when the digit was ignored (buffer full
    /// or not a digit).
    pub fn push(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() || self.digits.len() >= KEYPAD_WIDTH {
            return false;
        }
        self.digits.push(digit);
        true
    }

    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Raw digits, or `0000` while nothing has been typed
    pub fn display(&self) -> &str {
        if self.digits.is_empty() {
            "0000"
        } else {
            &self.digits
        }
    }

    pub fn seconds(&self) -> i64 {
        parse_keypad(&self.digits)
    }

    /// Whether the entry can be confirmed as a duration
    pub fn is_confirmable(&self) -> bool {
        !self.digits.is_empty() && self.seconds() <= MAX_SECONDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(format(0), "00");
        assert_eq!(format(5), "05");
        assert_eq!(format(59), "59");
        assert_eq!(format(60), "01:00");
        assert_eq!(format(90), "01:30");
        assert_eq!(format(3661), "61:01");
        assert_eq!(format(MAX_SECONDS), "99:59");
    }

    #[test]
    fn test_parse_freeform() {
        assert_eq!(parse_freeform("30"), 30);
        assert_eq!(parse_freeform("05"), 5);
        assert_eq!(parse_freeform("01:30"), 90);
        assert_eq!(parse_freeform("05:00"), 300);
        assert_eq!(parse_freeform("00:00"), 0);
        assert_eq!(parse_freeform(":30"), 30);
        assert_eq!(parse_freeform("2:"), 120);
    }

    #[test]
    fn test_parse_freeform_tolerates_garbage() {
        assert_eq!(parse_freeform(""), 0);
        assert_eq!(parse_freeform("invalid"), 0);
        assert_eq!(parse_freeform("1:2:3"), 0);
        assert_eq!(parse_freeform("-5"), 0);
        assert_eq!(parse_freeform("-1:30"), 30);
        assert_eq!(parse_freeform("12abc"), 12);
    }

    #[test]
    fn test_format_parse_inverse_over_full_range() {
        for s in 0..=MAX_SECONDS {
            assert_eq!(parse_freeform(&format(s)), s, "failed at {}", s);
        }
    }

    #[test]
    fn test_parse_keypad() {
        assert_eq!(parse_keypad("30"), 30);
        assert_eq!(parse_keypad("59"), 59);
        assert_eq!(parse_keypad("75"), 59);
        assert_eq!(parse_keypad("0"), 0);
        assert_eq!(parse_keypad("130"), 90);
        assert_eq!(parse_keypad("500"), 300);
        assert_eq!(parse_keypad("0000"), 0);
        assert_eq!(parse_keypad("9959"), MAX_SECONDS);
    }

    #[test]
    fn test_parse_keypad_clamps_seconds_field() {
        assert_eq!(parse_keypad("165"), 119);
        assert_eq!(parse_keypad("199"), 119);
    }

    #[test]
    fn test_parse_keypad_invalid() {
        assert_eq!(parse_keypad(""), 0);
        assert_eq!(parse_keypad("abc"), 0);
        assert_eq!(parse_keypad("-10"), 0);
    }

    #[test]
    fn test_parse_keypad_keeps_last_four_digits() {
        assert_eq!(parse_keypad("120130"), 90);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(-10), 0);
        assert_eq!(normalize(0), 0);
        assert_eq!(normalize(300), 300);
        assert_eq!(normalize(10_000), MAX_SECONDS);
        for s in [-1_000_000, -1, 0, 1, 5999, 6000, i64::MAX, i64::MIN] {
            let once = normalize(s);
            assert!((0..=MAX_SECONDS).contains(&once));
            assert_eq!(normalize(once), once);
        }
    }

    #[test]
    fn test_parts_conversion() {
        assert_eq!(to_parts(90), TimeParts { minutes: 1, seconds: 30 });
        assert_eq!(to_parts(-5), TimeParts { minutes: 0, seconds: 0 });
        assert_eq!(to_parts(7000), TimeParts { minutes: 99, seconds: 59 });
        assert_eq!(from_parts(1, 30), 90);
        assert_eq!(from_parts(120, 0), MAX_SECONDS);
        assert_eq!(from_parts(0, -3), 0);
    }

    #[test]
    fn test_is_valid_display_string() {
        assert!(is_valid_display_string("30"));
        assert!(is_valid_display_string("01:30"));
        assert!(is_valid_display_string("99:59"));
        assert!(!is_valid_display_string(""));
        assert!(!is_valid_display_string("60"));
        assert!(!is_valid_display_string("100:00"));
        assert!(!is_valid_display_string("10:60"));
        assert!(!is_valid_display_string("1:2:3"));
        assert!(!is_valid_display_string("ab:cd"));
        assert!(!is_valid_display_string("-1"));
    }

    #[test]
    fn test_to_keypad_string() {
        assert_eq!(to_keypad_string(90), "0130");
        assert_eq!(to_keypad_string(0), "0000");
        assert_eq!(to_keypad_string(10_000), "9959");
    }

    #[test]
    fn test_keypad_buffer() {
        let mut keypad = KeypadBuffer::new();
        assert_eq!(keypad.display(), "0000");
        assert!(!keypad.is_confirmable());

        for digit in ['1', '3', '0'] {
            assert!(keypad.push(digit));
        }
        assert_eq!(keypad.seconds(), 90);
        assert!(keypad.is_confirmable());

        assert!(keypad.push('0'));
        assert!(!keypad.push('5'));
        assert!(!KeypadBuffer::new().push('x'));
        assert_eq!(keypad.as_str(), "1300");

        keypad.backspace();
        assert_eq!(keypad.as_str(), "130");
        keypad.clear();
        assert!(keypad.is_empty());
    }
}
