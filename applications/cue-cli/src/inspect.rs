//! `cue inspect`: one line per cue

use cue_core::{Cue, CueSource, LoopMode, RegionTiming, PLACEHOLDER_CLOCK};
use std::fmt::Write;

use crate::show::Show;

/// Render the cue list of `show`
pub fn render(show: &Show) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} cues)", show.path.display(), show.cues.len());

    for (index, cue) in show.cues.iter().enumerate() {
        let _ = writeln!(out, "{:>3}  {}", index, describe(cue));
    }
    out
}

/// One-line summary of a cue
pub fn describe(cue: &Cue) -> String {
    let source = match cue.source() {
        CueSource::Local { .. } => "local",
        CueSource::Remote { .. } => "remote",
    };

    let region = cue.region();
    let end = region
        .end_ms
        .filter(|_| region.is_defined())
        .map_or_else(|| PLACEHOLDER_CLOCK.to_string(), cue_core::format_clock);
    let total = RegionTiming::total_label(RegionTiming::compute(region, region.start_ms));

    let looping = match cue.loop_mode() {
        LoopMode::None => "once".to_string(),
        LoopMode::Infinite => "loop".to_string(),
        LoopMode::Count => format!("x{}", cue.loop_count()),
    };

    let mut line = format!(
        "{} [{}] {} -> {} ({}) fade {:.1}s/{:.1}s {} gain {:.2} rate {:.3}",
        cue.display_name(),
        source,
        cue_core::format_clock(region.start_ms),
        end,
        total,
        cue.fade_in_secs(),
        cue.fade_out_secs(),
        looping,
        cue.gain(),
        cue.playback_rate(),
    );
    if let Some(key) = cue.hotkey {
        let _ = write!(line, " key {}", key);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_a_local_cue() {
        let mut cue = Cue::from_user_input("/show/rain.wav");
        cue.set_start_secs(1.5);
        cue.set_end_secs(Some(11.5));
        cue.set_fade_in_secs(2.0);
        cue.set_loop_mode(LoopMode::Count);
        cue.set_loop_count(3);
        cue.hotkey = Some('r');

        assert_eq!(
            describe(&cue),
            "rain.wav [local] 00:01.500 -> 00:11.500 (00:10.000) fade 2.0s/0.0s x3 gain 1.00 rate 1.000 key r"
        );
    }

    #[test]
    fn undefined_region_shows_placeholders() {
        let cue = Cue::from_user_input("spotify:track:abc");
        let line = describe(&cue);
        assert!(line.contains("[remote]"));
        assert!(line.contains("-> --:--.--- (--:--.---)"));
    }
}
