use chrono::{Duration, NaiveTime, Timelike};

/// Slot grid step. Every bookable time sits on a 30-minute boundary.
pub const SLOT_MINUTES: i64 = 30;

/// The fixed time grid for one branch day: 30-minute steps from `open` to
/// `close`, both bounds inclusive. Bounds are configuration, not entity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    open: NaiveTime,
    close: NaiveTime,
}

impl SlotGrid {
    /// Builds a grid, or `None` when the bounds are misconfigured (off-grid
    /// or inverted). Callers treat `None` the same as an empty grid.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Option<Self> {
        if !is_aligned(open) || !is_aligned(close) || open > close {
            return None;
        }
        Some(Self { open, close })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    /// All grid times in ascending order.
    pub fn slots(&self) -> Vec<NaiveTime> {
        let mut out = Vec::new();
        let mut cursor = self.open;
        loop {
            out.push(cursor);
            if cursor == self.close {
                break;
            }
            cursor += Duration::minutes(SLOT_MINUTES);
        }
        out
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        is_aligned(time) && time >= self.open && time <= self.close
    }
}

impl Default for SlotGrid {
    /// 10:00 through 21:00, the widest bounds the salon uses.
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        }
    }
}

pub fn is_aligned(time: NaiveTime) -> bool {
    time.minute() % 30 == 0 && time.second() == 0 && time.nanosecond() == 0
}
