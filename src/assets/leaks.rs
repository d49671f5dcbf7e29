use crate::config::LeakSchedule;
use crate::effects::SeededRandom;

/// Pick the light leak and opacity for frame `index`.
///
/// A pure function of its arguments: the pulsed schedule reproduces a
/// fade-in / hold / fade-out cycle without remembering earlier frames.
pub fn leak_for_frame(
    schedule: &LeakSchedule,
    random: &SeededRandom,
    index: u64,
    count: usize,
    peak_opacity: f32,
) -> Option<(usize, f32)> {
    if count == 0 || peak_opacity <= 0.0 {
        return None;
    }

    match *schedule {
        LeakSchedule::Constant { index: leak } => (leak < count).then_some((leak, peak_opacity)),
        LeakSchedule::Pulsed {
            period,
            fade_in,
            hold,
            fade_out,
        } => {
            let period = period.max(1) as u64;
            let cycle = index / period;
            let phase = index % period;
            let (fade_in, hold, fade_out) = (fade_in as u64, hold as u64, fade_out as u64);

            let level = if phase < fade_in {
                (phase + 1) as f32 / (fade_in + 1) as f32
            } else if phase < fade_in + hold {
                1.0
            } else if phase < fade_in + hold + fade_out {
                let p = phase - fade_in - hold;
                (fade_out - p) as f32 / (fade_out + 1) as f32
            } else {
                return None;
            };

            let leak = (random.stream(!cycle) % count as u64) as usize;
            Some((leak, peak_opacity * level))
        }
    }
}
