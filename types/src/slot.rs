//! Time-slot label recognition.
//!
//! Roster column headers mix fixed buckets ("Missed", "Due") with clock
//! labels ("2:00pm"). Slot labels are matched by shape rather than parsed
//! into times, since only exact string identity matters downstream.

/// Check whether a column header looks like a clock time slot.
///
/// Accepts `H:MM` or `HH:MM` with an `am`/`pm` suffix, case-insensitive,
/// with optional surrounding whitespace.
///
/// # Examples
/// ```
/// use wardbell_types::slot::is_slot_label;
/// assert!(is_slot_label("2:00pm"));
/// assert!(is_slot_label(" 11:30 AM "));
/// assert!(!is_slot_label("Missed"));
/// assert!(!is_slot_label("2:00"));
/// ```
pub fn is_slot_label(header: &str) -> bool {
    let s = header.trim();
    let Some(colon) = s.find(':') else {
        return false;
    };

    let (hours, rest) = s.split_at(colon);
    let rest = &rest[1..];

    if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match hours.parse::<u32>() {
        Ok(1..=12) => {}
        _ => return false,
    }

    if rest.len() < 2 || !rest.as_bytes()[..2].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let minutes: u32 = match rest[..2].parse() {
        Ok(m) => m,
        Err(_) => return false,
    };
    if minutes > 59 {
        return false;
    }

    let suffix = rest[2..].trim();
    suffix.eq_ignore_ascii_case("am") || suffix.eq_ignore_ascii_case("pm")
}
