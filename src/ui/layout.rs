use ratatui::layout::{Constraint, Layout, Rect};

/// Areas of the picker frame
pub struct PickerLayout {
    pub search: Rect,
    pub list: Rect,
    pub help: Rect,
}

/// Search input on top, list in the middle, one-line help bar at the bottom.
pub fn picker_layout(inner: Rect) -> PickerLayout {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Search input
        Constraint::Min(1),    // Candidate list
        Constraint::Length(1), // Help bar
    ])
    .split(inner);

    PickerLayout {
        search: chunks[0],
        list: chunks[1],
        help: chunks[2],
    }
}

/// A dialog centered in `total`: `width_pct` of the width (at least
/// `min_width`) and a fixed `height`, both kept inside a 2-cell margin.
pub fn centered_rect(total: Rect, width_pct: u16, min_width: u16, height: u16) -> Rect {
    let scaled = u32::from(total.width) * u32::from(width_pct) / 100;
    let width = u16::try_from(scaled)
        .unwrap_or(total.width)
        .max(min_width)
        .min(total.width.saturating_sub(4));
    let height = height.min(total.height.saturating_sub(4));

    let x = total.x + (total.width.saturating_sub(width)) / 2;
    let y = total.y + (total.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside_small_terminals() {
        let area = centered_rect(Rect::new(0, 0, 30, 8), 40, 36, 10);
        assert_eq!(area, Rect::new(2, 2, 26, 4));
    }

    #[test]
    fn centered_rect_handles_very_wide_terminals() {
        let area = centered_rect(Rect::new(0, 0, 2000, 30), 40, 36, 8);
        assert_eq!(area, Rect::new(600, 11, 800, 8));
    }

    #[test]
    fn picker_layout_gives_the_list_the_remaining_rows() {
        let layout = picker_layout(Rect::new(0, 0, 80, 20));
        assert_eq!(layout.search.height, 3);
        assert_eq!(layout.help, Rect::new(0, 19, 80, 1));
        assert_eq!(layout.list.height, 16);
    }
}
