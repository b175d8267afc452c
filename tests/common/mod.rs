//! Scriptable codec engine for session tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use aaceld_core::{
    CodecEngine, Converter, ConverterInfo, FillResult, OsStatus, PacketSupplier, PrimeInfo,
    StreamDescription,
};

/// What the next fill call does
#[derive(Debug, Clone, Copy)]
pub enum FillBehavior {
    /// Consume the input and report this many frames
    Produce(u32),
    /// Fill the whole buffer but claim this many frames, even past the request
    OverReport(u32),
    /// Consume the input and fail with this status
    Fail(OsStatus),
}

/// Everything the engine saw
#[derive(Debug, Default)]
pub struct EngineLog {
    pub created: usize,
    pub disposed: usize,
    pub live: usize,
    pub max_live: usize,
    pub descriptions: Vec<(StreamDescription, StreamDescription)>,
    pub cookies: Vec<Vec<u8>>,
    pub fill_calls: usize,
    /// Sizes of packets handed over by the supplier, per fill call
    pub supplied: Vec<Vec<usize>>,
    pub output_lens: Vec<usize>,
}

#[derive(Clone)]
pub struct FakeEngine {
    pub log: Rc<RefCell<EngineLog>>,
    pub create_status: Option<OsStatus>,
    pub cookie_status: Option<OsStatus>,
    pub behavior: Rc<Cell<FillBehavior>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(EngineLog::default())),
            create_status: None,
            cookie_status: None,
            behavior: Rc::new(Cell::new(FillBehavior::Produce(480))),
        }
    }

    pub fn rejecting_create(status: i32) -> Self {
        Self {
            create_status: Some(OsStatus(status)),
            ..Self::new()
        }
    }

    pub fn rejecting_cookie(status: i32) -> Self {
        Self {
            cookie_status: Some(OsStatus(status)),
            ..Self::new()
        }
    }
}

pub struct FakeConverter {
    log: Rc<RefCell<EngineLog>>,
    cookie_status: Option<OsStatus>,
    behavior: Rc<Cell<FillBehavior>>,
    input: StreamDescription,
    output: StreamDescription,
}

impl CodecEngine for FakeEngine {
    type Converter = FakeConverter;

    fn create(
        &self,
        input: &StreamDescription,
        output: &StreamDescription,
    ) -> Result<FakeConverter, OsStatus> {
        if let Some(status) = self.create_status {
            return Err(status);
        }
        let mut log = self.log.borrow_mut();
        log.created += 1;
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        log.descriptions.push((*input, *output));
        Ok(FakeConverter {
            log: self.log.clone(),
            cookie_status: self.cookie_status,
            behavior: self.behavior.clone(),
            input: *input,
            output: *output,
        })
    }
}

impl Converter for FakeConverter {
    fn set_magic_cookie(&mut self, cookie: &[u8]) -> Result<(), OsStatus> {
        if let Some(status) = self.cookie_status {
            return Err(status);
        }
        self.log.borrow_mut().cookies.push(cookie.to_vec());
        Ok(())
    }

    fn fill_buffer(
        &mut self,
        supplier: &mut dyn PacketSupplier,
        max_frames: u32,
        output: &mut [u8],
    ) -> FillResult {
        // Pull until the supplier runs dry, like a real converter would
        let mut sizes = Vec::new();
        while let Some(packet) = supplier.supply(1) {
            assert_eq!(packet.description.data_byte_size as usize, packet.data.len());
            sizes.push(packet.data.len());
        }

        let mut log = self.log.borrow_mut();
        log.fill_calls += 1;
        log.supplied.push(sizes);
        log.output_lens.push(output.len());

        match self.behavior.get() {
            FillBehavior::Produce(frames) => {
                let frames = frames.min(max_frames);
                let bytes = frames as usize * self.output.bytes_per_frame as usize;
                output[..bytes].fill(0x5A);
                FillResult {
                    status: OsStatus::NO_ERR,
                    frames,
                }
            }
            FillBehavior::OverReport(frames) => {
                output.fill(0x5A);
                FillResult {
                    status: OsStatus::NO_ERR,
                    frames,
                }
            }
            FillBehavior::Fail(status) => FillResult { status, frames: 0 },
        }
    }

    fn dispose(self) {
        let mut log = self.log.borrow_mut();
        log.disposed += 1;
        log.live -= 1;
    }

    fn info(&self) -> ConverterInfo {
        ConverterInfo {
            input_description: Some(self.input),
            output_description: Some(self.output),
            prime_info: Some(PrimeInfo {
                leading_frames: 0,
                trailing_frames: 0,
            }),
            magic_cookie_size: Some(self.log.borrow().cookies.last().map_or(0, |c| c.len() as u32)),
            ..Default::default()
        }
    }
}
