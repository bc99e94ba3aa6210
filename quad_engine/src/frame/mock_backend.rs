/// Scripted backend for frame loop tests (no GPU required)
///
/// All mock objects share one `MockGpu` that models fence states, counts
/// outstanding submissions and records every call as an `Event`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::frame::{
    CommandRecorder, Extent2D, FrameSync, ResizeFlag, SurfaceStatus, Swapchain, WindowSurface,
};

// ============================================================================
// Shared GPU model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSemaphore {
    ImageAvailable(usize),
    RenderFinished(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceState {
    Signaled,
    Unsignaled,
    /// Submitted work not yet observed complete
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Wait(usize),
    Reset(usize),
    Acquire { signal: MockSemaphore, image_index: u32, status: SurfaceStatus },
    Prepare(u32),
    Submit { image_index: u32, wait: MockSemaphore, signal: MockSemaphore, fence: usize },
    Present { image_index: u32, wait: MockSemaphore, status: SurfaceStatus },
    WaitIdle,
    Release,
    Recreate { extent: Extent2D, image_count: usize },
    RecordAll { generation: u64, image_count: usize },
    WaitEvents,
    /// A mock object was dropped
    Destroyed(&'static str),
}

fn push_destroyed(gpu: &SharedGpu, what: &'static str) {
    if let Ok(mut gpu) = gpu.try_borrow_mut() {
        gpu.events.push(Event::Destroyed(what));
    }
}

#[derive(Debug)]
pub struct MockGpu {
    pub events: Vec<Event>,
    pub fences: Vec<FenceState>,
    pub outstanding: usize,
    pub max_outstanding: usize,
}

pub type SharedGpu = Rc<RefCell<MockGpu>>;

impl MockGpu {
    pub fn shared(frames: usize) -> SharedGpu {
        Rc::new(RefCell::new(Self {
            events: Vec::new(),
            fences: vec![FenceState::Signaled; frames],
            outstanding: 0,
            max_outstanding: 0,
        }))
    }
}

// ============================================================================
// Mock FrameSync
// ============================================================================

pub struct MockFrameSync {
    gpu: SharedGpu,
    frames: usize,
}

impl FrameSync for MockFrameSync {
    type Semaphore = MockSemaphore;
    type Fence = usize;

    fn frames_in_flight(&self) -> usize {
        self.frames
    }

    fn wait(&self, frame: usize) -> Result<()> {
        let mut gpu = self.gpu.borrow_mut();
        gpu.events.push(Event::Wait(frame));
        match gpu.fences[frame] {
            FenceState::Signaled => Ok(()),
            FenceState::Pending => {
                gpu.fences[frame] = FenceState::Signaled;
                gpu.outstanding -= 1;
                Ok(())
            }
            FenceState::Unsignaled => Err(Error::BackendError(format!(
                "Deadlock: fence {} is unsignaled with no pending work",
                frame
            ))),
        }
    }

    fn reset(&self, frame: usize) -> Result<()> {
        let mut gpu = self.gpu.borrow_mut();
        gpu.events.push(Event::Reset(frame));
        if gpu.fences[frame] != FenceState::Signaled {
            return Err(Error::BackendError(format!(
                "Fence {} reset while {:?}",
                frame, gpu.fences[frame]
            )));
        }
        gpu.fences[frame] = FenceState::Unsignaled;
        Ok(())
    }

    fn image_available(&self, frame: usize) -> MockSemaphore {
        MockSemaphore::ImageAvailable(frame)
    }

    fn render_finished(&self, frame: usize) -> MockSemaphore {
        MockSemaphore::RenderFinished(frame)
    }

    fn in_flight_fence(&self, frame: usize) -> usize {
        frame
    }
}

impl Drop for MockFrameSync {
    fn drop(&mut self) {
        push_destroyed(&self.gpu, "sync");
    }
}

// ============================================================================
// Mock Swapchain
// ============================================================================

pub struct MockSwapchain {
    gpu: SharedGpu,
    pub image_count: usize,
    pub extent: Extent2D,
    pub generation: u64,
    next_index: u32,
    /// Results of upcoming acquires (Optimal once exhausted)
    pub acquire_results: VecDeque<Result<SurfaceStatus>>,
    /// Results of upcoming presents (Optimal once exhausted)
    pub present_results: VecDeque<Result<SurfaceStatus>>,
    /// Image indices of upcoming successful acquires (round-robin once exhausted)
    pub image_sequence: VecDeque<u32>,
    /// Image counts of upcoming generations (unchanged once exhausted)
    pub next_image_counts: VecDeque<usize>,
    /// Raised from inside the next present call
    pub raise_on_present: Option<ResizeFlag>,
}

impl Swapchain for MockSwapchain {
    type Semaphore = MockSemaphore;

    fn acquire_next_image(&mut self, signal: MockSemaphore) -> Result<(u32, SurfaceStatus)> {
        let status = self.acquire_results.pop_front().unwrap_or(Ok(SurfaceStatus::Optimal))?;
        let image_index = if status == SurfaceStatus::OutOfDate {
            0
        } else {
            let index = self
                .image_sequence
                .pop_front()
                .unwrap_or(self.next_index % self.image_count as u32);
            self.next_index = index + 1;
            index
        };
        self.gpu.borrow_mut().events.push(Event::Acquire { signal, image_index, status });
        Ok((image_index, status))
    }

    fn present(&mut self, image_index: u32, wait: MockSemaphore) -> Result<SurfaceStatus> {
        if let Some(flag) = self.raise_on_present.take() {
            flag.raise();
        }
        let status = self.present_results.pop_front().unwrap_or(Ok(SurfaceStatus::Optimal))?;
        self.gpu.borrow_mut().events.push(Event::Present { image_index, wait, status });
        Ok(status)
    }

    fn recreate(&mut self, extent: Extent2D) -> Result<()> {
        if let Some(count) = self.next_image_counts.pop_front() {
            self.image_count = count;
        }
        self.extent = extent;
        self.generation += 1;
        self.next_index = 0;
        self.gpu.borrow_mut().events.push(Event::Recreate { extent, image_count: self.image_count });
        Ok(())
    }

    fn image_count(&self) -> usize {
        self.image_count
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }
}

impl Drop for MockSwapchain {
    fn drop(&mut self) {
        push_destroyed(&self.gpu, "swapchain");
    }
}

// ============================================================================
// Mock CommandRecorder
// ============================================================================

pub struct MockRecorder {
    gpu: SharedGpu,
    pub recorded_images: usize,
    pub recorded_generation: Option<u64>,
    pub prepared: Vec<(u32, Duration)>,
}

impl CommandRecorder<MockSwapchain> for MockRecorder {
    type Fence = usize;

    fn record_all(&mut self, swapchain: &MockSwapchain) -> Result<()> {
        self.recorded_images = swapchain.image_count;
        self.recorded_generation = Some(swapchain.generation);
        self.gpu.borrow_mut().events.push(Event::RecordAll {
            generation: swapchain.generation,
            image_count: swapchain.image_count,
        });
        Ok(())
    }

    fn release(&mut self) {
        self.recorded_images = 0;
        self.recorded_generation = None;
        self.gpu.borrow_mut().events.push(Event::Release);
    }

    fn prepare(&mut self, image_index: u32, elapsed: Duration) -> Result<()> {
        self.prepared.push((image_index, elapsed));
        self.gpu.borrow_mut().events.push(Event::Prepare(image_index));
        Ok(())
    }

    fn submit(
        &mut self,
        image_index: u32,
        wait: MockSemaphore,
        signal: MockSemaphore,
        fence: usize,
    ) -> Result<()> {
        if image_index as usize >= self.recorded_images {
            return Err(Error::BackendError(format!(
                "No sequence recorded for image {}",
                image_index
            )));
        }
        let mut gpu = self.gpu.borrow_mut();
        if gpu.fences[fence] != FenceState::Unsignaled {
            return Err(Error::BackendError(format!(
                "Submitted with fence {} in state {:?}",
                fence, gpu.fences[fence]
            )));
        }
        gpu.fences[fence] = FenceState::Pending;
        gpu.outstanding += 1;
        gpu.max_outstanding = gpu.max_outstanding.max(gpu.outstanding);
        gpu.events.push(Event::Submit { image_index, wait, signal, fence });
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        let mut gpu = self.gpu.borrow_mut();
        for fence in gpu.fences.iter_mut() {
            if *fence == FenceState::Pending {
                *fence = FenceState::Signaled;
            }
        }
        gpu.outstanding = 0;
        gpu.events.push(Event::WaitIdle);
        Ok(())
    }
}

impl Drop for MockRecorder {
    fn drop(&mut self) {
        push_destroyed(&self.gpu, "recorder");
    }
}

// ============================================================================
// Mock Window
// ============================================================================

/// Window whose framebuffer size follows a script, advanced by `wait_events`
pub struct MockWindow {
    gpu: SharedGpu,
    extents: RefCell<VecDeque<Extent2D>>,
}

impl MockWindow {
    pub fn new(gpu: &SharedGpu, extents: &[Extent2D]) -> Self {
        Self {
            gpu: gpu.clone(),
            extents: RefCell::new(extents.iter().copied().collect()),
        }
    }
}

impl WindowSurface for MockWindow {
    fn framebuffer_extent(&self) -> Extent2D {
        self.extents.borrow().front().copied().unwrap_or(Extent2D::new(800, 600))
    }

    fn wait_events(&self) {
        let mut extents = self.extents.borrow_mut();
        if extents.len() > 1 {
            extents.pop_front();
        }
        self.gpu.borrow_mut().events.push(Event::WaitEvents);
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Build a connected mock sync/swapchain/recorder set
pub fn mock_backend(frames: usize, images: usize) -> (MockFrameSync, MockSwapchain, MockRecorder, SharedGpu) {
    let gpu = MockGpu::shared(frames);
    let sync = MockFrameSync { gpu: gpu.clone(), frames };
    let swapchain = MockSwapchain {
        gpu: gpu.clone(),
        image_count: images,
        extent: Extent2D::new(800, 600),
        generation: 0,
        next_index: 0,
        acquire_results: VecDeque::new(),
        present_results: VecDeque::new(),
        image_sequence: VecDeque::new(),
        next_image_counts: VecDeque::new(),
        raise_on_present: None,
    };
    let recorder = MockRecorder {
        gpu: gpu.clone(),
        recorded_images: 0,
        recorded_generation: None,
        prepared: Vec::new(),
    };
    (sync, swapchain, recorder, gpu)
}
