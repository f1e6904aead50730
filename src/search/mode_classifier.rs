use crate::search::state::{ElementState, QuadrantState};
use crate::types::mode::Mode;
use crate::types::quadrant::{Quadrant, QuadrantMap};
use log::info;

/// Search step from which a quadrant counts as exhausted.
pub const EXCEEDED_STEP: u32 = 4;

/// Picks the radius-based mode for an element from its quadrant counters.
///
/// Exhausted quadrants ("exceeders") decide: at most one, or two diagonally opposite ones,
/// still leave the target surrounded, so interpolate. All four means nothing was found. Any
/// other layout means the target sits at the edge of the data and values are extrapolated.
/// An element already extrapolating keeps that mode while any quadrant has two or more
/// usable stations.
pub fn next_mode(current: Mode, quadrants: &QuadrantMap<QuadrantState>) -> Mode {
    if current == Mode::Extrapolation && quadrants.values().any(|q| q.usable.len() >= 2) {
        return current;
    }
    let exceeders: Vec<Quadrant> = quadrants
        .iter()
        .filter(|(_, q)| q.search_step >= EXCEEDED_STEP)
        .map(|(quadrant, _)| quadrant)
        .collect();

    match exceeders.as_slice() {
        [] | [_] => Mode::Interpolation,
        [a, b] if a.is_diagonal_to(*b) => Mode::Interpolation,
        [_, _, _, _] => Mode::Fail,
        _ => Mode::Extrapolation,
    }
}

/// Re-runs the classifier for an element, logging transitions.
pub fn reclassify(element: &mut ElementState) {
    let mode = next_mode(element.mode, &element.quadrants);
    if mode != element.mode {
        info!("{}: mode {} -> {}", element.id, element.mode, mode);
        element.mode = mode;
    }
}

/// Start-of-round classification: nearest and failed elements are left alone.
pub fn classify_round(elements: &mut [ElementState]) {
    for element in elements {
        if !matches!(element.mode, Mode::Nearest | Mode::Fail) {
            reclassify(element);
        }
    }
}
