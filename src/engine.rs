//! Codec engine capability
//!
//! The AAC-ELD transform itself lives outside this crate. A `CodecEngine`
//! creates `Converter` instances from a pair of stream descriptions; each
//! converter owns unmanaged engine resources until `dispose` is called.

use crate::error::OsStatus;
use crate::format::StreamDescription;
use crate::supplier::PacketSupplier;

/// Outcome of one fill call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillResult {
    pub status: OsStatus,
    /// PCM frames written to the output buffer
    pub frames: u32,
}

/// Encoder priming reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimeInfo {
    pub leading_frames: u32,
    pub trailing_frames: u32,
}

/// Snapshot of converter properties, for diagnostics only.
///
/// Every field is optional: engines report what they can and a failed
/// query leaves the field empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverterInfo {
    pub input_description: Option<StreamDescription>,
    pub output_description: Option<StreamDescription>,
    pub prime_info: Option<PrimeInfo>,
    pub magic_cookie_size: Option<u32>,
    pub min_input_buffer_size: Option<u32>,
    pub min_output_buffer_size: Option<u32>,
    pub max_input_packet_size: Option<u32>,
    pub max_output_packet_size: Option<u32>,
}

/// Factory for converter instances
pub trait CodecEngine {
    type Converter: Converter;

    /// Create a converter for `input` -> `output`
    fn create(
        &self,
        input: &StreamDescription,
        output: &StreamDescription,
    ) -> Result<Self::Converter, OsStatus>;
}

/// One live engine instance
pub trait Converter {
    /// Apply an out-of-band decoder configuration (magic cookie)
    fn set_magic_cookie(&mut self, cookie: &[u8]) -> Result<(), OsStatus>;

    /// Decode into `output`, pulling input from `supplier`.
    ///
    /// At most `max_frames` PCM frames are written.
    fn fill_buffer(
        &mut self,
        supplier: &mut dyn PacketSupplier,
        max_frames: u32,
        output: &mut [u8],
    ) -> FillResult;

    /// Release the engine instance
    fn dispose(self);

    fn info(&self) -> ConverterInfo {
        ConverterInfo::default()
    }
}

/// Owns a converter and disposes it exactly once, on every exit path
#[derive(Debug)]
pub struct ConverterGuard<C: Converter> {
    inner: Option<C>,
}

impl<C: Converter> ConverterGuard<C> {
    pub fn new(converter: C) -> Self {
        Self {
            inner: Some(converter),
        }
    }

    pub fn get(&self) -> Option<&C> {
        self.inner.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut C> {
        self.inner.as_mut()
    }

    /// Dispose now; later calls and the drop are no-ops
    pub fn dispose(&mut self) {
        if let Some(converter) = self.inner.take() {
            converter.dispose();
            log::debug!("Converter disposed");
        }
    }
}

impl<C: Converter> Drop for ConverterGuard<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingConverter {
        disposed: Rc<Cell<u32>>,
    }

    impl Converter for CountingConverter {
        fn set_magic_cookie(&mut self, _cookie: &[u8]) -> Result<(), OsStatus> {
            Ok(())
        }

        fn fill_buffer(
            &mut self,
            _supplier: &mut dyn PacketSupplier,
            _max_frames: u32,
            _output: &mut [u8],
        ) -> FillResult {
            FillResult {
                status: OsStatus::NO_ERR,
                frames: 0,
            }
        }

        fn dispose(self) {
            self.disposed.set(self.disposed.get() + 1);
        }
    }

    #[test]
    fn test_guard_disposes_on_drop() {
        let disposed = Rc::new(Cell::new(0));
        {
            let _guard = ConverterGuard::new(CountingConverter {
                disposed: disposed.clone(),
            });
        }
        assert_eq!(disposed.get(), 1);
    }

    #[test]
    fn test_guard_disposes_once() {
        let disposed = Rc::new(Cell::new(0));
        let mut guard = ConverterGuard::new(CountingConverter {
            disposed: disposed.clone(),
        });
        guard.dispose();
        guard.dispose();
        assert!(guard.get().is_none());
        drop(guard);
        assert_eq!(disposed.get(), 1);
    }

    #[test]
    fn test_default_info_is_empty() {
        let converter = CountingConverter {
            disposed: Rc::new(Cell::new(0)),
        };
        assert_eq!(converter.info(), ConverterInfo::default());
    }
}
