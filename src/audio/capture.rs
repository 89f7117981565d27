// Capture - Audio blocks from the output callback to the recorder
// The render side copies every block into owned buffers and pushes them into a
// lock-free ring; it never blocks. The consumer concatenates blocks in arrival
// order.

use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::warn;

/// One rendered block, left and right channels of equal length
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureBlock {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl CaptureBlock {
    pub fn frames(&self) -> usize {
        self.left.len()
    }
}

/// Shared capture switch and counters
#[derive(Debug, Clone, Default)]
pub struct CaptureControl {
    recording: Arc<AtomicBool>,
    overruns: Arc<AtomicU64>,
}

impl CaptureControl {
    pub fn start(&self) {
        self.recording.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.recording.store(false, Ordering::Release);
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Blocks dropped because the ring was full
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }
}

/// Render-thread side of the capture pipeline
pub struct CaptureProcessor {
    producer: HeapProd<CaptureBlock>,
    control: CaptureControl,
}

impl CaptureProcessor {
    /// Copy the current block into the ring while capture is on.
    ///
    /// `inputs` holds up to two channel slices: a missing right channel is a
    /// copy of the left one, and no input at all captures nothing.
    pub fn process(&mut self, inputs: &[&[f32]]) {
        if !self.control.is_recording() {
            return;
        }
        let Some(left) = inputs.first() else {
            return;
        };

        let left = left.to_vec();
        let right = match inputs.get(1) {
            Some(right) => right.to_vec(),
            None => left.clone(),
        };

        if self.producer.try_push(CaptureBlock { left, right }).is_err() {
            let dropped = self.control.overruns.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(dropped, "Capture ring full, block dropped");
        }
    }
}

/// Recorder side: collects blocks until capture stops
pub struct CaptureAccumulator {
    consumer: HeapCons<CaptureBlock>,
    left: Vec<f32>,
    right: Vec<f32>,
    sample_rate: u32,
}

impl CaptureAccumulator {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames collected so far
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Move every queued block into the buffers. Returns the number of blocks.
    pub fn drain(&mut self) -> usize {
        let mut blocks = 0;
        while let Some(block) = self.consumer.try_pop() {
            let frames = block.left.len().min(block.right.len());
            self.left.extend_from_slice(&block.left[..frames]);
            self.right.extend_from_slice(&block.right[..frames]);
            blocks += 1;
        }
        blocks
    }

    /// Drop queued blocks and collected audio
    pub fn reset(&mut self) {
        self.consumer.clear();
        self.left.clear();
        self.right.clear();
    }

    /// Interleaved L/R samples collected so far
    pub fn interleaved(&self) -> Vec<f32> {
        self.left
            .iter()
            .zip(&self.right)
            .flat_map(|(&l, &r)| [l, r])
            .collect()
    }

    /// Drain the ring, then hand over the interleaved take and start empty
    pub fn finish(&mut self) -> Vec<f32> {
        self.drain();
        let samples = self.interleaved();
        self.left.clear();
        self.right.clear();
        samples
    }
}

/// Build the capture pipeline. `capacity` is counted in blocks.
pub fn capture_channel(
    capacity: usize,
    sample_rate: u32,
) -> (CaptureProcessor, CaptureAccumulator, CaptureControl) {
    let (producer, consumer) = HeapRb::<CaptureBlock>::new(capacity.max(1)).split();
    let control = CaptureControl::default();
    (
        CaptureProcessor {
            producer,
            control: control.clone(),
        },
        CaptureAccumulator {
            consumer,
            left: Vec::new(),
            right: Vec::new(),
            sample_rate,
        },
        control,
    )
}
