//! Box blur used to smooth the movement penalty field, so that paths keep some distance from
//! expensive terrain instead of hugging its border.
use grid_util::{SimpleValueGrid, ValueGrid};

/// Blurs `field` with a `(2 * radius + 1)²` box kernel. Samples that fall outside the field are
/// clamped to the nearest edge cell rather than treated as zero, so borders are not darkened.
///
/// The kernel is separable: a horizontal pass followed by a vertical pass, each keeping a running
/// window sum that is seeded once per row or column and then updated by one subtraction and one
/// addition per cell. Total cost is linear in the number of cells regardless of `radius`.
pub fn blur_penalties(field: &SimpleValueGrid<i32>, radius: usize) -> SimpleValueGrid<i32> {
    let w = field.width() as i32;
    let h = field.height() as i32;
    let k = radius as i32;
    let kernel_size = 2 * k + 1;
    let area = (kernel_size * kernel_size) as f64;

    let clamp_x = |x: i32| x.clamp(0, w - 1);
    let clamp_y = |y: i32| y.clamp(0, h - 1);

    let mut horizontal: SimpleValueGrid<i64> = SimpleValueGrid::new(w as usize, h as usize, 0);
    for y in 0..h {
        let mut sum: i64 = (-k..=k).map(|x| field.get(clamp_x(x), y) as i64).sum();
        horizontal.set(0, y, sum);
        for x in 1..w {
            sum -= field.get(clamp_x(x - k - 1), y) as i64;
            sum += field.get(clamp_x(x + k), y) as i64;
            horizontal.set(x, y, sum);
        }
    }

    let mut blurred: SimpleValueGrid<i32> = SimpleValueGrid::new(w as usize, h as usize, 0);
    let average = |sum: i64| (sum as f64 / area).round() as i32;
    for x in 0..w {
        let mut sum: i64 = (-k..=k).map(|y| horizontal.get(x, clamp_y(y))).sum();
        blurred.set(x, 0, average(sum));
        for y in 1..h {
            sum -= horizontal.get(x, clamp_y(y - k - 1));
            sum += horizontal.get(x, clamp_y(y + k));
            blurred.set(x, y, average(sum));
        }
    }
    blurred
}
