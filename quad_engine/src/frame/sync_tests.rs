//! Unit tests for the FrameSync provided methods, run on the mock backend

use crate::frame::mock_backend::{mock_backend, Event, FenceState, MockSemaphore};
use crate::frame::{CommandRecorder, FrameSync};

// ============================================================================
// WAIT AND RESET
// ============================================================================

#[test]
fn test_wait_and_reset_unsignals_created_fence() {
    let (sync, _swapchain, _recorder, gpu) = mock_backend(2, 3);

    sync.wait_and_reset(0).unwrap();

    let gpu = gpu.borrow();
    assert_eq!(gpu.fences, vec![FenceState::Unsignaled, FenceState::Signaled]);
    assert_eq!(gpu.events, vec![Event::Wait(0), Event::Reset(0)]);
}

#[test]
fn test_wait_and_reset_completes_pending_work() {
    let (sync, swapchain, mut recorder, gpu) = mock_backend(2, 3);
    recorder.record_all(&swapchain).unwrap();

    sync.wait_and_reset(1).unwrap();
    recorder
        .submit(0, sync.image_available(1), sync.render_finished(1), sync.in_flight_fence(1))
        .unwrap();
    assert_eq!(gpu.borrow().fences[1], FenceState::Pending);
    assert_eq!(gpu.borrow().outstanding, 1);

    sync.wait_and_reset(1).unwrap();

    let gpu = gpu.borrow();
    assert_eq!(gpu.fences[1], FenceState::Unsignaled);
    assert_eq!(gpu.outstanding, 0);
}

#[test]
fn test_wait_and_reset_repeats_on_same_slot() {
    let (sync, swapchain, mut recorder, gpu) = mock_backend(1, 2);
    recorder.record_all(&swapchain).unwrap();

    for image_index in [0, 1, 0] {
        sync.wait_and_reset(0).unwrap();
        recorder
            .submit(
                image_index,
                MockSemaphore::ImageAvailable(0),
                MockSemaphore::RenderFinished(0),
                sync.in_flight_fence(0),
            )
            .unwrap();
    }

    let gpu = gpu.borrow();
    assert_eq!(gpu.fences[0], FenceState::Pending);
    assert_eq!(gpu.max_outstanding, 1);
}

#[test]
fn test_wait_and_reset_twice_without_submit_fails() {
    let (sync, _swapchain, _recorder, gpu) = mock_backend(2, 3);

    sync.wait_and_reset(0).unwrap();

    assert!(sync.wait_and_reset(0).is_err());
    assert_eq!(gpu.borrow().fences[0], FenceState::Unsignaled);
}
