//! Hands out at most one live handle per physical pin.

use crate::error::{Error, Result};
use crate::gpio::{PinDriver, PinIo, PinKind};
use crate::pins::{Capabilities, PinDescriptor, PinKey, PinRegistry};
use log::{debug, info, warn};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// A claimed pin, tagged with the mode it was opened in.
pub enum PinHandle<D: PinDriver> {
    Digital(D::Digital),
    Pwm(D::Pwm),
}

impl<D: PinDriver> PinHandle<D> {
    pub fn kind(&self) -> PinKind {
        match self {
            PinHandle::Digital(_) => PinKind::Digital,
            PinHandle::Pwm(_) => PinKind::Pwm,
        }
    }

    fn close(&mut self) -> Result<()> {
        match self {
            PinHandle::Digital(pin) => pin.close(),
            PinHandle::Pwm(pin) => pin.close(),
        }
    }

    fn as_digital(&mut self) -> Option<&mut D::Digital> {
        match self {
            PinHandle::Digital(pin) => Some(pin),
            _ => None,
        }
    }

    fn as_pwm(&mut self) -> Option<&mut D::Pwm> {
        match self {
            PinHandle::Pwm(pin) => Some(pin),
            _ => None,
        }
    }
}

/// Maps pin keys to live handles, checking capabilities on first use.
///
/// The arbiter owns every handle it opens; callers get borrowed access.
/// **Note:** Not synchronized. Share it across threads only behind a lock.
pub struct PinArbiter<D: PinDriver> {
    registry: PinRegistry,
    driver: D,
    pins: BTreeMap<u32, PinHandle<D>>,
}

impl<D: PinDriver> PinArbiter<D> {
    pub fn new(registry: PinRegistry, driver: D) -> Self {
        Self {
            registry,
            driver,
            pins: BTreeMap::new(),
        }
    }

    /// Returns the digital handle for `key`, opening the pin on first use.
    ///
    /// Repeated calls for the same pin return the same handle without
    /// touching the driver again. Fails with [`Error::PinModeConflict`] if
    /// the pin is held in another mode (the existing handle is left alone),
    /// and with [`Error::UnsupportedPinMode`] if the pin lacks
    /// [`Capabilities::NORMAL`].
    pub fn acquire_digital(&mut self, key: impl Into<PinKey>) -> Result<&mut D::Digital> {
        self.acquire(
            key.into(),
            PinKind::Digital,
            Capabilities::NORMAL,
            |driver, desc| driver.open_digital(desc).map(PinHandle::Digital),
            PinHandle::as_digital,
        )
    }

    /// Returns the PWM handle for `key`, opening the pin on first use.
    ///
    /// Same rules as [`acquire_digital`](Self::acquire_digital), checked
    /// against [`Capabilities::PWM`].
    pub fn acquire_pwm(&mut self, key: impl Into<PinKey>) -> Result<&mut D::Pwm> {
        self.acquire(
            key.into(),
            PinKind::Pwm,
            Capabilities::PWM,
            |driver, desc| driver.open_pwm(desc).map(PinHandle::Pwm),
            PinHandle::as_pwm,
        )
    }

    fn acquire<T>(
        &mut self,
        key: PinKey,
        requested: PinKind,
        required: Capabilities,
        open: impl FnOnce(&mut D, &PinDescriptor) -> Result<PinHandle<D>>,
        project: fn(&mut PinHandle<D>) -> Option<&mut T>,
    ) -> Result<&mut T> {
        let desc = self.registry.lookup(&key).ok_or_else(|| Error::PinNotFound {
            key: key.to_string(),
        })?;

        let handle = match self.pins.entry(desc.number()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if !desc.caps().contains(required) {
                    return Err(Error::UnsupportedPinMode {
                        key: key.to_string(),
                        requested,
                    });
                }
                if desc.caps() != required {
                    info!(
                        "Pin '{}' is not a dedicated {} pin. Please refer to the board reference manual for more details.",
                        key, requested
                    );
                }
                debug!("Opening pin {} ('{}') as {}", desc.number(), key, requested);
                entry.insert(open(&mut self.driver, desc)?)
            }
        };

        let held = handle.kind();
        project(handle).ok_or_else(|| Error::PinModeConflict {
            key: key.to_string(),
            requested,
            held,
        })
    }

    /// Mode the pin named by `key` is currently held in, if any.
    pub fn held_kind(&self, key: impl Into<PinKey>) -> Option<PinKind> {
        let desc = self.registry.lookup(&key.into())?;
        self.pins.get(&desc.number()).map(PinHandle::kind)
    }

    /// Number of pins currently held.
    pub fn held_count(&self) -> usize {
        self.pins.len()
    }

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    /// Closes the handle held for `key` and frees the pin for a new mode.
    ///
    /// Returns `Ok(false)` if nothing was held. If closing fails the handle
    /// stays tracked.
    pub fn release(&mut self, key: impl Into<PinKey>) -> Result<bool> {
        let key = key.into();
        let number = self
            .registry
            .lookup(&key)
            .ok_or_else(|| Error::PinNotFound {
                key: key.to_string(),
            })?
            .number();
        match self.pins.entry(number) {
            Entry::Vacant(_) => Ok(false),
            Entry::Occupied(mut entry) => {
                entry.get_mut().close()?;
                debug!("Released pin {} ('{}')", number, key);
                entry.remove();
                Ok(true)
            }
        }
    }

    /// Closes every held handle in ascending pin order.
    ///
    /// Stops at the first failure: handles closed before it are forgotten,
    /// the failing handle and everything after it stay held.
    pub fn close_all(&mut self) -> Result<()> {
        while let Some((number, mut handle)) = self.pins.pop_first() {
            if let Err(e) = handle.close() {
                warn!(
                    "Failed to close pin {}: {}. {} pin(s) remain held.",
                    number,
                    e,
                    self.pins.len() + 1
                );
                self.pins.insert(number, handle);
                return Err(e);
            }
            debug!("Closed pin {}", number);
        }
        Ok(())
    }

    /// Gives back the driver. Any pins still held are dropped unclosed.
    pub fn into_driver(self) -> D {
        self.driver
    }
}
