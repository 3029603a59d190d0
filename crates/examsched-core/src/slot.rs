//! Slot labels and their chronological ordering.
//!
//! Slots are admin-curated labels such as `"7:30-9:30 AM"` or
//! `"10:00-12:00 PM"`. Two slots are the same slot only when their labels are
//! byte-identical; parsing is used for ordering, never for equality.
//!
//! Lexical order puts `"10:00-12:00 PM"` before `"7:30-9:30 AM"`, so listings
//! order by [`sort_key`], which parses the start (and end) time of day.

use std::cmp::Ordering;

use chrono::{NaiveTime, Timelike};

// ─── Parsing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
  Am,
  Pm,
}

/// One endpoint of a label before meridiem resolution.
#[derive(Debug, Clone, Copy)]
struct ClockReading {
  hour:     u32,
  minute:   u32,
  meridiem: Option<Meridiem>,
}

impl ClockReading {
  fn parse(raw: &str) -> Option<Self> {
    let upper = raw.trim().to_ascii_uppercase();
    let (body, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
      (rest.trim_end().trim_end_matches('.'), Some(Meridiem::Am))
    } else if let Some(rest) = upper.strip_suffix("PM") {
      (rest.trim_end().trim_end_matches('.'), Some(Meridiem::Pm))
    } else {
      (upper.as_str(), None)
    };

    let body = body.trim();
    let (h, m) = match body.split_once(':') {
      Some((h, m)) => (h.trim(), m.trim()),
      None => (body, "0"),
    };
    if h.is_empty() || !h.bytes().all(|b| b.is_ascii_digit()) {
      return None;
    }
    if m.is_empty() || !m.bytes().all(|b| b.is_ascii_digit()) {
      return None;
    }

    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if minute > 59 {
      return None;
    }
    match meridiem {
      Some(_) if !(1..=12).contains(&hour) => None,
      None if hour > 23 => None,
      _ => Some(Self { hour, minute, meridiem }),
    }
  }

  fn to_time(self, meridiem: Option<Meridiem>) -> Option<NaiveTime> {
    let hour = match meridiem {
      Some(Meridiem::Am) => self.hour % 12,
      Some(Meridiem::Pm) => self.hour % 12 + 12,
      None => self.hour,
    };
    NaiveTime::from_hms_opt(hour, self.minute, 0)
  }
}

/// The time-of-day window a slot label describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotTime {
  pub start: NaiveTime,
  pub end:   Option<NaiveTime>,
}

impl SlotTime {
  /// Parse a slot label. Returns `None` for labels that carry no readable
  /// time, which then sort after every timed label.
  ///
  /// A single trailing meridiem applies to the end of the window and, unless
  /// that would put the start after the end, to the start as well:
  /// `"10:00-12:00 PM"` starts at 10:00, `"1:00-3:00 PM"` at 13:00.
  pub fn parse(label: &str) -> Option<Self> {
    let mut parts = label.splitn(2, ['-', '\u{2013}']);
    let first = ClockReading::parse(parts.next()?)?;

    let Some(second) = parts.next() else {
      return Some(Self { start: first.to_time(first.meridiem)?, end: None });
    };
    let second = ClockReading::parse(second)?;
    let end = second.to_time(second.meridiem)?;

    let start = match (first.meridiem, second.meridiem) {
      (Some(own), _) => first.to_time(Some(own))?,
      (None, None) => first.to_time(None)?,
      (None, Some(inherited)) => {
        let start = first.to_time(Some(inherited))?;
        if start > end && start.hour() >= 12 {
          start.with_hour(start.hour() - 12)?
        } else {
          start
        }
      }
    };

    Some(Self { start, end: Some(end) })
  }
}

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Sort key for a slot label: timed labels by start then end, untimed labels
/// after them in lexical order. Ties fall back to the label itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKey<'a> {
  time:  Option<SlotTime>,
  label: &'a str,
}

impl Ord for SlotKey<'_> {
  fn cmp(&self, other: &Self) -> Ordering {
    match (&self.time, &other.time) {
      (Some(a), Some(b)) => a.cmp(b),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal,
    }
    .then_with(|| self.label.cmp(other.label))
  }
}

impl PartialOrd for SlotKey<'_> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

pub fn sort_key(label: &str) -> SlotKey<'_> {
  SlotKey { time: SlotTime::parse(label), label }
}
