use std::fmt;

/// The fusion strategy currently assigned to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Copy the monthly series of a single station within 5 km of the target.
    Nearest,
    /// Inverse-distance weighting of the nearest usable station in each quadrant.
    #[default]
    Interpolation,
    /// Per-quadrant distance regression, evaluated at distance zero.
    Extrapolation,
    /// No estimate could be produced; the element is left out of the result.
    Fail,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Nearest => "nearest",
            Mode::Interpolation => "interpolation",
            Mode::Extrapolation => "extrapolation",
            Mode::Fail => "fail",
        };
        f.write_str(name)
    }
}
