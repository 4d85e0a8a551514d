/// Precomputed mapping from dest pixels to nearest src pixel
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
    identity: bool,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_y: Vec::new(),
            identity: false,
        }
    }

    pub fn dst_size(&self) -> (usize, usize) {
        (self.src_x.len(), self.src_y.len())
    }
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    // Sample at dest pixel centers
    let axis = |dst: usize, src: usize| -> Vec<usize> {
        if src == 0 {
            return vec![0; dst];
        }
        let s = src as f32 / dst as f32;
        (0..dst)
            .map(|d| (((d as f32 + 0.5) * s) as usize).min(src - 1))
            .collect()
    };

    ScaleLut {
        src_x: axis(dst_w, src_w),
        src_y: axis(dst_h, src_h),
        identity: dst_w == src_w && dst_h == src_h,
    }
}

/// Nearest-neighbour stretch of `src` (row width `sw`) into `dst` (row width `dw`)
pub fn blit_nearest(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    if lut.identity && dw == sw {
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
        return;
    }

    for (dst_row, &sy) in dst.chunks_exact_mut(dw).zip(&lut.src_y) {
        let row = &src[sy * sw..(sy + 1) * sw];
        for (d, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
            *d = row[sx];
        }
    }
}
