use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source row/column for every destination pixel.
pub struct ScaleLut {
    src_w: usize,
    xs: Vec<usize>,
    ys: Vec<usize>,
}

impl ScaleLut {
    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        Self {
            src_w,
            xs: nearest(dst_w, src_w),
            ys: nearest(dst_h, src_h),
        }
    }

    #[inline]
    pub fn dst_size(&self) -> (usize, usize) {
        (self.xs.len(), self.ys.len())
    }
}

fn nearest(dst: usize, src: usize) -> Vec<usize> {
    if src == 0 {
        return vec![0; dst];
    }
    (0..dst).map(|d| (d * src / dst).min(src - 1)).collect()
}

/// Nearest neighbour stretch of `src` onto `dst`, rows in parallel.
/// Blocky columns are the look we want, so no filtering.
pub fn blit_nearest(dst: &mut [u32], src: &[u32], lut: &ScaleLut) {
    let (dw, _) = lut.dst_size();
    if dw == 0 {
        return;
    }
    dst.par_chunks_mut(dw)
        .zip(lut.ys.par_iter())
        .for_each(|(dst_row, &sy)| {
            let row = &src[sy * lut.src_w..(sy + 1) * lut.src_w];
            for (px, &sx) in dst_row.iter_mut().zip(&lut.xs) {
                *px = row[sx];
            }
        });
}
