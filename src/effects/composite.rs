use crate::foundation::{
    error::{PadError, PadResult},
    math::mul_div255_u16,
};

pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over for premultiplied pixels, with `opacity` scaling the source.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;

    let mut out = [0u8; 4];
    out[3] = (sa + mul_div255_u16(u16::from(dst[3]), inv)).min(255) as u8;
    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), op);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = (sc + dc).min(255) as u8;
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> PadResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PadError::validation(
            "source-over expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Flatten a premultiplied buffer onto an opaque straight-RGB background.
pub fn flatten_onto(rgba8_premul: &[u8], background: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba8_premul.len() / 4 * 3);
    for px in rgba8_premul.chunks_exact(4) {
        let inv = 255 - u16::from(px[3]);
        for c in 0..3 {
            let v = u16::from(px[c]) + mul_div255_u16(u16::from(background[c]), inv);
            out.push(v.min(255) as u8);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
