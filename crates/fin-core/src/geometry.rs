use fin_types::{Geometry, SizeClass};

use crate::config::WindowConfig;
use crate::session::{Page, SessionState};

/// Window geometry for the given state.
///
/// Expanded while results are showing or the settings page is open,
/// collapsed otherwise.
#[must_use]
pub fn geometry_for(state: &SessionState, window: &WindowConfig) -> Geometry {
    let expanded = state.page() == Page::Settings || !state.results().is_empty();
    if expanded {
        Geometry {
            size: SizeClass::Expanded,
            width: window.width,
            height: window.expanded_height,
        }
    } else {
        Geometry {
            size: SizeClass::Collapsed,
            width: window.width,
            height: window.collapsed_height,
        }
    }
}
