use rand::Rng;

use crate::error::Result;
use crate::grade::profile::ColorProfile;
use crate::grade::registry::ProfileRegistry;
use crate::video::types::Frame;

const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

/// Applies one color profile to frames
///
/// Stages, each clamped to `[0, 255]` before the next:
///
/// 1. lens softening (optical, before any color math)
/// 2. per-channel gain and offset, with the blue-cast offsets mixed in by mask
/// 3. contrast, saturation, luma blend and tone shaping
/// 4. monochrome grain
///
/// All per-pixel math is straight-line arithmetic; masks are folded in as
/// 0/1 factors rather than branches.
#[derive(Debug, Clone)]
pub struct ColorGrader {
    profile: ColorProfile,
}

impl ColorGrader {
    pub fn new(profile: ColorProfile) -> Self {
        Self { profile }
    }

    /// Resolve a profile by name, failing with `InvalidProfile` when unknown
    pub fn from_name(registry: &ProfileRegistry, name: &str) -> Result<Self> {
        Ok(Self::new(registry.get(name)?))
    }

    pub fn profile(&self) -> &ColorProfile {
        &self.profile
    }

    pub fn apply<R: Rng + ?Sized>(&self, frame: &mut Frame, rng: &mut R) {
        apply_profile(frame, &self.profile, rng);
    }
}

/// Grade a frame in place with `profile`
pub fn apply_profile<R: Rng + ?Sized>(frame: &mut Frame, profile: &ColorProfile, rng: &mut R) {
    if profile.softening > 0.0 {
        let blurred = image::imageops::blur(frame.as_image(), profile.softening);
        *frame = Frame::new(blurred);
    }

    let mut buf: Vec<f32> = frame.samples().iter().map(|&v| v as f32).collect();

    remap_channels(&mut buf, profile);
    adjust_tone(&mut buf, profile);
    if profile.grain > 0 {
        add_grain(&mut buf, profile.grain, rng);
    }

    for (dst, v) in frame.samples_mut().iter_mut().zip(buf) {
        *dst = v.round() as u8;
    }
}

fn clamp_pixel(px: &mut [f32]) {
    for v in px.iter_mut() {
        *v = v.clamp(0.0, 255.0);
    }
}

fn luma(px: &[f32]) -> f32 {
    px[0] * LUMA[0] + px[1] * LUMA[1] + px[2] * LUMA[2]
}

fn remap_channels(buf: &mut [f32], profile: &ColorProfile) {
    let gain = profile.channel_gain.map(|g| g * profile.brightness);
    let base = profile.channel_offset;
    let (threshold, alt) = match profile.blue_cast {
        Some(cast) => (cast.threshold, cast.offset),
        // Mask never fires
        None => (f32::INFINITY, base),
    };

    for px in buf.chunks_exact_mut(3) {
        let is_blue = (px[2] > (px[0] + px[1]) * 0.5 + threshold) as u8 as f32;
        for c in 0..3 {
            let offset = base[c] + is_blue * (alt[c] - base[c]);
            px[c] = px[c] * gain[c] + offset;
        }
        clamp_pixel(px);
    }
}

fn adjust_tone(buf: &mut [f32], profile: &ColorProfile) {
    let contrast = profile.contrast;
    let saturation = profile.saturation;
    let blend = profile.luma_blend;

    if contrast != 1.0 {
        let pixels = (buf.len() / 3).max(1) as f32;
        let mean = buf.chunks_exact(3).map(luma).sum::<f32>() / pixels;
        for px in buf.chunks_exact_mut(3) {
            for v in px.iter_mut() {
                *v = mean + contrast * (*v - mean);
            }
            clamp_pixel(px);
        }
    }

    if saturation != 1.0 {
        for px in buf.chunks_exact_mut(3) {
            let l = luma(px);
            for v in px.iter_mut() {
                *v = l + saturation * (*v - l);
            }
            clamp_pixel(px);
        }
    }

    if blend > 0.0 {
        for px in buf.chunks_exact_mut(3) {
            let l = luma(px);
            for v in px.iter_mut() {
                *v = *v * (1.0 - blend) + l * blend;
            }
            clamp_pixel(px);
        }
    }

    if profile.shadow_lift.is_none() && profile.highlight_rolloff.is_none() {
        return;
    }
    let (lift_at, lift) = profile
        .shadow_lift
        .map(|s| (s.threshold, s.strength))
        .unwrap_or((0.0, 0.0));
    let (roll_at, rolloff) = profile
        .highlight_rolloff
        .map(|s| (s.threshold, s.strength))
        .unwrap_or((255.0, 0.0));

    for px in buf.chunks_exact_mut(3) {
        let l = luma(px);
        let delta = (lift_at - l).max(0.0) * lift - (l - roll_at).max(0.0) * rolloff;
        for v in px.iter_mut() {
            *v += delta;
        }
        clamp_pixel(px);
    }
}

fn add_grain<R: Rng + ?Sized>(buf: &mut [f32], amount: u8, rng: &mut R) {
    let amount = amount as i32;
    for px in buf.chunks_exact_mut(3) {
        let noise = rng.gen_range(-amount..=amount) as f32;
        for v in px.iter_mut() {
            *v += noise;
        }
        clamp_pixel(px);
    }
}
