/// State carried between interactions. Owned by the UI loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Set by the first search on the real-time panel; never cleared.
    pub fetch_triggered: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger_fetch(&mut self) {
        self.fetch_triggered = true;
    }
}
