use image::{DynamicImage, ImageBuffer, Pixel, Primitive, Rgba, RgbaImage};

/// Largest value an 8-bit channel can hold.
pub const MAX_CHANNEL_VALUE: u8 = u8::MAX;

/// One pixel at 8-bit working precision, channels in R, G, B, A order.
pub type Color = Rgba<u8>;

/// A channel type that can be brought down to 8-bit working precision.
///
/// Wider depths are right-shifted so that the top eight bits are kept. The
/// same rule is used everywhere a pixel is read, which keeps ratios computed
/// from the source images and from a rendered diff image identical.
pub trait WorkingChannel: Primitive + 'static {
    fn to_working(self) -> u8;
}

impl WorkingChannel for u8 {
    fn to_working(self) -> u8 {
        self
    }
}

impl WorkingChannel for u16 {
    fn to_working(self) -> u8 {
        (self >> 8) as u8
    }
}

/// `|x - y|` for two channel values.
pub fn abs_channel_diff(x: u8, y: u8) -> u8 {
    (i16::from(x) - i16::from(y)).unsigned_abs() as u8
}

/// Per-channel absolute difference of two colors.
pub fn channel_delta(a: Color, b: Color) -> Color {
    let Rgba([ar, ag, ab, aa]) = a;
    let Rgba([br, bg, bb, ba]) = b;
    Rgba([
        abs_channel_diff(ar, br),
        abs_channel_diff(ag, bg),
        abs_channel_diff(ab, bb),
        abs_channel_diff(aa, ba),
    ])
}

/// Read the pixel at `(x, y)` at 8-bit working precision.
pub fn extract_color<C>(grid: &ImageBuffer<Rgba<C>, Vec<C>>, x: u32, y: u32) -> Color
where
    C: WorkingChannel,
    Rgba<C>: Pixel<Subpixel = C>,
{
    let Rgba([r, g, b, a]) = *grid.get_pixel(x, y);
    Rgba([r.to_working(), g.to_working(), b.to_working(), a.to_working()])
}

/// Convert a decoded image of any color model to a premultiplied 8-bit RGBA
/// grid.
///
/// Color channels are scaled by alpha at 16-bit precision and then
/// downshifted with [`WorkingChannel`], so a fully transparent pixel reads as
/// `(0, 0, 0, 0)` whatever color it was stored with. Opaque sources come out
/// unchanged. Grids built in memory with straight alpha can be brought into
/// the same form with `normalize(DynamicImage::from(grid))`.
pub fn normalize(decoded: DynamicImage) -> RgbaImage {
    let wide = decoded.into_rgba16();
    let (w, h) = wide.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let Rgba([r, g, b, a]) = *wide.get_pixel(x, y);
        Rgba([premultiply(r, a), premultiply(g, a), premultiply(b, a), a].map(u16::to_working))
    })
}

fn premultiply(c: u16, a: u16) -> u16 {
    (u32::from(c) * u32::from(a) / u32::from(u16::MAX)) as u16
}
