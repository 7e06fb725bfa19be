//! One-shot events for the beeper / notification subsystem.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;

#[cfg(feature = "defmt")]
use defmt::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Alert {
    GyroCalibrated,
}

/// Fire-and-forget alert consumer, must not block the control loop.
pub trait AlertSink {
    fn push(&mut self, alert: Alert);
}

impl<S: AlertSink + ?Sized> AlertSink for &mut S {
    fn push(&mut self, alert: Alert) {
        (**self).push(alert)
    }
}

impl<M: RawMutex, const N: usize> AlertSink for Sender<'_, M, Alert, N> {
    fn push(&mut self, alert: Alert) {
        if self.try_send(alert).is_err() {
            warn!("alert queue full, dropped {}", alert);
        }
    }
}
