//! Anti-aliased edges and dash patterns.

/// Anti-aliased edge function.
///
/// Creates a smooth transition from 1 to 0 as distance increases past the edge.
///
/// # Parameters
/// - `dist`: Distance from the edge (0 = on edge)
/// - `half_thickness`: Half the total thickness (distance from center to edge)
/// - `aa_width`: Width of the anti-aliasing transition (typically 1.0)
///
/// # Returns
/// - 1.0 if dist < half_thickness
/// - Smooth falloff from 1 to 0 over aa_width
/// - 0.0 if dist > half_thickness + aa_width
#[inline]
pub fn aa_edge(dist: f32, half_thickness: f32, aa_width: f32) -> f32 {
    if dist < half_thickness {
        1.0
    } else if dist < half_thickness + aa_width {
        1.0 - (dist - half_thickness) / aa_width
    } else {
        0.0
    }
}

/// Coverage of a filled shape given its signed distance.
///
/// One pixel of falloff centered on the outline.
#[inline]
pub fn fill_coverage(signed_dist: f32) -> f32 {
    (0.5 - signed_dist).clamp(0.0, 1.0)
}

/// On/off lengths of a stroke dash pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub on: f32,
    pub off: f32,
}

impl Dash {
    pub const fn new(on: f32, off: f32) -> Self {
        Self { on, off }
    }

    /// True when `coord` (distance along the stroke) falls in a dash.
    #[inline]
    pub fn is_on(&self, coord: f32) -> bool {
        dashed(coord, self.on, self.off)
    }
}

/// Dashed line pattern.
///
/// Creates dashes along a line with the given dash and gap lengths.
#[inline]
pub fn dashed(coord: f32, dash_length: f32, gap_length: f32) -> bool {
    let period = dash_length + gap_length;
    if period <= 0.0 {
        return true;
    }
    let pos = coord.rem_euclid(period);
    pos < dash_length
}
