//! Animation-aware transform dispatch.
//!
//! A single-frame transform becomes animation-capable by going through
//! [`apply`]: still sources get the transform once, animated sources get
//! it on every kept frame. Sources longer than [`MAX_FRAMES`] are
//! subsampled to the cap, and each kept frame's display duration scales up
//! by the skip ratio so total playback length stays close to the original.
//!
//! Kept frames are independent of each other, so the per-frame transforms
//! fan out across a rayon thread pool; output order is preserved.

use crate::frame::{FilterOutput, Frame, Sequence, Source};
use image::DynamicImage;
use log::debug;
use rayon::prelude::*;

/// Ceiling on the frame count of a transformed sequence.
pub const MAX_FRAMES: usize = 100;

/// Apply a single-frame transform to a still or animated source.
///
/// Still sources (and animated sources when `max_frames <= 1`, for
/// transforms too expensive to run per-frame) produce
/// [`FilterOutput::Still`]; animated sources produce
/// [`FilterOutput::Animated`] with at most `max_frames` frames.
pub fn apply<F, E>(source: &Source, transform: F, max_frames: usize) -> Result<FilterOutput, E>
where
    F: Fn(&DynamicImage) -> Result<DynamicImage, E> + Sync,
    E: Send,
{
    match source {
        Source::Still(image) => Ok(FilterOutput::Still(transform(image)?)),
        Source::Animated(seq) if seq.frames.len() > 1 && max_frames > 1 => Ok(
            FilterOutput::Animated(transform_sequence(seq, &transform, max_frames)?),
        ),
        Source::Animated(seq) => Ok(FilterOutput::Still(transform(&seq.frames[0].image)?)),
    }
}

/// Subsample to the cap, transform every kept frame, rescale durations.
fn transform_sequence<F, E>(seq: &Sequence, transform: &F, cap: usize) -> Result<Sequence, E>
where
    F: Fn(&DynamicImage) -> Result<DynamicImage, E> + Sync,
    E: Send,
{
    let total = seq.frames.len();
    let fraction = if total > cap {
        total as f64 / cap as f64
    } else {
        1.0
    };
    let kept = kept_frame_indices(total, cap);
    if kept.len() < total {
        debug!("subsampling {total}-frame sequence to {} frames", kept.len());
    }
    let frames = kept
        .into_par_iter()
        .map(|index| {
            let frame = &seq.frames[index];
            Ok(Frame {
                image: transform(&frame.image)?,
                delay_ms: (frame.delay_ms as f64 * fraction).round() as u32,
            })
        })
        .collect::<Result<Vec<Frame>, E>>()?;
    Ok(Sequence {
        frames,
        loop_count: seq.loop_count,
    })
}

/// Zero-based indices of the frames to keep, at most `cap` of them.
///
/// Walks frames with a 1-based index and a running count of frames kept so
/// far, skipping a frame whenever `idx / total * cap` has fallen behind
/// the kept count. This spaces kept frames roughly evenly across the
/// source; the hard `cap` comparison closes the off-by-one the ratio test
/// allows on the final frame.
fn kept_frame_indices(total: usize, cap: usize) -> Vec<usize> {
    let mut kept = Vec::with_capacity(total.min(cap));
    let mut saved = 0usize;
    for idx in 1..=total {
        if saved >= cap {
            break;
        }
        if total > cap && (idx as f64 / total as f64) * (cap as f64) < saved as f64 {
            continue;
        }
        saved += 1;
        kept.push(idx - 1);
    }
    kept
}
