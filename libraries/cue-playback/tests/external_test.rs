//! PlaybackController scenarios against a mock remote provider
//!
//! The provider only answers intermittently, so the controller extrapolates
//! the position on its own tick and reconciles whenever a report arrives.

mod common;

use common::{controller_for, count_fade_out_finished, count_looped, remote_cue, states, Command};
use cue_core::LoopMode;
use cue_playback::{CueEvent, PlaybackState, TickKind};
use std::time::Duration;

const TRACK: &str = "spotify:track:4uLU6hMCjMI75M1A2tKUQC";

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn play_requests_the_normalized_track() {
    let cue = remote_cue();
    let (mut controller, device, _) = controller_for(&cue);

    controller.play(&cue);

    assert_eq!(controller.backend_name(), "external");
    assert_eq!(
        device.borrow().commands,
        vec![Command::Play {
            source: TRACK.into(),
            start_ms: 0
        }]
    );
}

#[test]
fn estimate_advances_one_interval_per_tick() {
    let cue = remote_cue();
    let (mut controller, _device, _) = controller_for(&cue);

    controller.play(&cue);
    assert!(controller.is_tick_running(TickKind::Position));

    for _ in 0..10 {
        controller.advance(&cue, ms(50));
    }
    assert_eq!(controller.position_ms(), 500);
}

#[test]
fn fade_in_is_skipped_without_a_local_mixer() {
    let mut cue = remote_cue();
    cue.set_fade_in_secs(3.0);
    let (mut controller, _device, _) = controller_for(&cue);

    controller.play(&cue);

    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(controller.envelope(), 1.0);
    assert!(!controller.is_tick_running(TickKind::Fade));
}

#[test]
fn provider_report_overwrites_the_estimate() {
    let mut cue = remote_cue();
    let (mut controller, _device, id) = controller_for(&cue);

    controller.play(&cue);
    controller.advance(&cue, ms(200));
    assert_eq!(controller.position_ms(), 200);

    controller.on_playback_state_reported(&mut cue, Some(5_000), Some(180_000), true);
    assert_eq!(controller.position_ms(), 5_000);
    assert_eq!(controller.duration_ms(), Some(180_000));
    assert_eq!(cue.remote_duration_ms(), Some(180_000));
    assert_eq!(cue.end_ms(), Some(180_000));

    controller.advance(&cue, ms(100));
    assert_eq!(controller.position_ms(), 5_100);

    let events = controller.drain_events();
    assert!(events.contains(&CueEvent::DurationKnown {
        cue: id,
        duration_ms: 180_000
    }));
    assert!(events.contains(&CueEvent::PositionUpdate {
        cue: id,
        position_ms: 5_100,
        duration_ms: Some(180_000)
    }));
}

#[test]
fn provider_not_playing_stops_extrapolation() {
    let mut cue = remote_cue();
    let (mut controller, _device, _) = controller_for(&cue);

    controller.play(&cue);
    controller.advance(&cue, ms(100));
    controller.on_playback_state_reported(&mut cue, None, None, false);

    assert!(!controller.is_tick_running(TickKind::Position));
    controller.advance(&cue, ms(1_000));
    assert_eq!(controller.position_ms(), 100);

    // The provider picks up again: extrapolation resumes from the report
    controller.on_playback_state_reported(&mut cue, Some(900), None, true);
    controller.advance(&cue, ms(100));
    assert_eq!(controller.position_ms(), 1_000);
}

#[test]
fn known_duration_caps_the_estimate() {
    let mut cue = remote_cue();
    cue.set_remote_duration_ms(Some(1_000));
    let (mut controller, _device, _) = controller_for(&cue);

    controller.play(&cue);
    controller.advance(&cue, ms(2_000));

    assert_eq!(controller.duration_ms(), Some(1_000));
    assert_eq!(controller.position_ms(), 1_000);
}

#[test]
fn pause_and_resume_send_requests_only() {
    let cue = remote_cue();
    let (mut controller, device, _) = controller_for(&cue);

    controller.play(&cue);
    controller.advance(&cue, ms(300));
    controller.pause();

    assert_eq!(controller.state(), PlaybackState::Paused);
    assert!(!controller.is_tick_running(TickKind::Position));
    controller.advance(&cue, ms(1_000));
    assert_eq!(controller.position_ms(), 300);

    controller.play(&cue);
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(
        device.borrow().commands[1..],
        [Command::Pause, Command::Resume]
    );

    controller.advance(&cue, ms(100));
    assert_eq!(controller.position_ms(), 400);
}

#[test]
fn stop_with_fade_is_immediate_but_still_notifies() {
    let mut cue = remote_cue();
    cue.set_start_secs(30.0);
    cue.set_fade_out_secs(3.0);
    let (mut controller, device, id) = controller_for(&cue);

    controller.play(&cue);
    controller.advance(&cue, ms(1_000));
    controller.drain_events();

    controller.stop_with_fade(&cue);

    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(device.borrow().commands.last(), Some(&Command::Stop));
    // The estimate rests at the start marker, not playing
    assert_eq!(controller.position_ms(), 30_000);
    assert!(!controller.is_tick_running(TickKind::Position));

    let events = controller.drain_events();
    assert_eq!(states(&events), vec![PlaybackState::Idle]);
    assert_eq!(events.last(), Some(&CueEvent::FadeOutFinished { cue: id }));
}

#[test]
fn end_of_region_is_detected_from_the_estimate() {
    let mut cue = remote_cue();
    cue.set_end_secs(Some(1.0));
    let (mut controller, _device, _) = controller_for(&cue);

    controller.play(&cue);
    controller.advance(&cue, ms(950));
    assert_eq!(controller.state(), PlaybackState::Playing);

    controller.advance(&cue, ms(50));
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(count_fade_out_finished(&controller.drain_events()), 1);
}

#[test]
fn counted_loop_seeks_the_provider_back() {
    let mut cue = remote_cue();
    cue.set_end_secs(Some(1.0));
    cue.set_loop_mode(LoopMode::Count);
    cue.set_loop_count(2);
    let (mut controller, device, _) = controller_for(&cue);

    controller.play(&cue);
    controller.advance(&cue, ms(1_000));
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(device.borrow().commands.last(), Some(&Command::Seek(0)));

    controller.advance(&cue, ms(1_000));
    assert_eq!(controller.state(), PlaybackState::Idle);

    let events = controller.drain_events();
    assert_eq!(count_looped(&events), 1);
    assert_eq!(count_fade_out_finished(&events), 1);
}

#[test]
fn late_report_after_stop_cannot_revive_the_session() {
    let mut cue = remote_cue();
    let (mut controller, _device, _) = controller_for(&cue);

    controller.play(&cue);
    controller.advance(&cue, ms(500));
    controller.stop_immediately(&cue);

    controller.on_playback_state_reported(&mut cue, Some(9_000), Some(200_000), true);

    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(controller.position_ms(), 0);
    assert!(!controller.is_tick_running(TickKind::Position));
    // The duration is still worth keeping
    assert_eq!(cue.remote_duration_ms(), Some(200_000));
}
