//! Monitor appender
//!
//! Mirrors each record onto a set of named monitor peripherals. Handles are
//! validated lazily: a cached handle is reused while the device reports
//! itself present, and is revalidated through the
//! [`PeripheralProvider`] otherwise.
//!
//! Devices that fail validation are skipped. The first failure of a device
//! that was previously working produces a single warning (returned as a
//! `SinkUnavailable` error); devices missing at setup time stay silent so
//! hosts without monitors attached see no noise.

use super::terminal::write_colored;
use crate::core::{Appender, LogRecord, LoggerError, Monitor, PeripheralProvider, Result};
use std::sync::Arc;

struct MonitorSlot {
    name: String,
    handle: Option<Box<dyn Monitor>>,
    /// Set once a warning was issued (or suppressed) for the current outage
    silenced: bool,
}

pub struct MonitorAppender {
    provider: Arc<dyn PeripheralProvider>,
    slots: Vec<MonitorSlot>,
    use_colors: bool,
}

impl MonitorAppender {
    /// Create the appender and validate every device without warning
    ///
    /// Duplicate names are collapsed, keeping the first occurrence.
    pub fn new(provider: Arc<dyn PeripheralProvider>, names: &[String], use_colors: bool) -> Self {
        let mut slots: Vec<MonitorSlot> = Vec::with_capacity(names.len());
        for name in names {
            if slots.iter().any(|slot| &slot.name == name) {
                continue;
            }
            let handle = provider.validate(name).ok();
            slots.push(MonitorSlot {
                name: name.clone(),
                silenced: handle.is_none(),
                handle,
            });
        }

        Self {
            provider,
            slots,
            use_colors,
        }
    }

    /// Names of devices that currently hold a validated handle
    pub fn active_names(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|slot| slot.handle.is_some())
            .map(|slot| slot.name.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Make sure the slot holds a usable handle; returns a new warning if
    /// the device just became unavailable
    fn refresh(provider: &dyn PeripheralProvider, slot: &mut MonitorSlot) -> Option<String> {
        if slot.handle.as_ref().is_some_and(|handle| handle.is_present()) {
            return None;
        }

        match provider.validate(&slot.name) {
            Ok(handle) => {
                slot.handle = Some(handle);
                slot.silenced = false;
                None
            }
            Err(reason) => {
                slot.handle = None;
                if slot.silenced {
                    None
                } else {
                    slot.silenced = true;
                    Some(format!("monitor '{}' skipped: {}", slot.name, reason))
                }
            }
        }
    }
}

impl Appender for MonitorAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let color = self.use_colors.then(|| record.level.color_code());
        let mut warnings = Vec::new();

        for slot in &mut self.slots {
            if let Some(warning) = Self::refresh(self.provider.as_ref(), slot) {
                warnings.push(warning);
            }
            if let Some(handle) = slot.handle.as_mut() {
                write_colored(handle.as_mut(), &record.line, color);
            }
        }

        if warnings.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::sink_unavailable("monitor", warnings.join("; ")))
        }
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "monitor"
    }
}
