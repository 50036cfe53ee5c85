//! In-memory alarm list.

use tracing::debug;

use super::model::{Alarm, AlarmId, NewAlarm};
use crate::error::{CoreError, Result, ValidationError};

/// Ordered collection of alarms. List order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct AlarmStore {
    alarms: Vec<Alarm>,
}

impl AlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a new alarm. Nothing is stored on failure.
    pub fn add(&mut self, new: NewAlarm) -> Result<AlarmId, ValidationError> {
        new.validate()?;
        let alarm = Alarm::from_new(new);
        let id = alarm.id;
        debug!(%id, time = %alarm.time_label(), repeat = %alarm.repeat, "alarm added");
        self.alarms.push(alarm);
        Ok(id)
    }

    pub fn remove(&mut self, id: AlarmId) -> Result<Alarm> {
        let index = self.index_of(id)?;
        let alarm = self.alarms.remove(index);
        debug!(%id, "alarm removed");
        Ok(alarm)
    }

    /// Flip the active flag. Returns the new value.
    pub fn toggle_active(&mut self, id: AlarmId) -> Result<bool> {
        let alarm = self.get_mut(id)?;
        alarm.active = !alarm.active;
        debug!(%id, active = alarm.active, "alarm toggled");
        Ok(alarm.active)
    }

    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: AlarmId) -> Result<&mut Alarm> {
        self.alarms
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(CoreError::AlarmNotFound(id))
    }

    pub fn list(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = &Alarm> {
        self.alarms.iter().filter(|a| a.active)
    }

    fn index_of(&self, id: AlarmId) -> Result<usize> {
        self.alarms
            .iter()
            .position(|a| a.id == id)
            .ok_or(CoreError::AlarmNotFound(id))
    }
}
