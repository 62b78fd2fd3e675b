use std::fmt;

/// One clock snapshot for the taskbar. Produced every tick and discarded; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTick {
    /// `HH:MM:SS`
    pub time: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl ClockTick {
    #[must_use]
    pub fn new(time: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            date: date.into(),
        }
    }

    /// Text shown in the taskbar clock label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}  {}", self.time, self.date)
    }
}

impl fmt::Display for ClockTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.time, self.date)
    }
}
