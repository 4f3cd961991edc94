use pokemon_defence_core::Event;

use crate::SessionObserver;

/// Running totals a persistence layer records for the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Enemies defeated by towers.
    pub kills: u32,
    /// Enemies that walked off the end of their path.
    pub escapes: u32,
    /// Currency credited from any source.
    pub money_earned: u64,
    /// Towers that changed species through evolution.
    pub evolutions: u32,
    /// Successful fusions.
    pub fusions: u32,
    /// Waves cleared, including major clears.
    pub waves_cleared: u32,
    /// Highest wave started.
    pub highest_wave: u32,
}

impl SessionStats {
    /// Folds one event into the totals. A world reset clears them.
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::WorldReset => *self = Self::default(),
            Event::EnemyDefeated { .. } => self.kills += 1,
            Event::EnemyEscaped { .. } => self.escapes += 1,
            Event::MoneyEarned { amount, .. } => {
                self.money_earned = self.money_earned.saturating_add(u64::from(*amount));
            }
            Event::TowerEvolved { .. } => self.evolutions += 1,
            Event::TowersFused { .. } => self.fusions += 1,
            Event::WaveCleared { .. } => self.waves_cleared += 1,
            Event::WaveStarted { wave } => self.highest_wave = self.highest_wave.max(*wave),
            _ => {}
        }
    }
}

impl SessionObserver for SessionStats {
    fn on_event(&mut self, event: &Event) {
        self.record(event);
    }
}
