//! Channel layout
//!
//! Describes how many light channels exist per named screen area. Every
//! per-channel buffer in the pipeline is a flat array ordered by
//! [`Area::ALL`]: top 1..n, bottom 1..n, left 1..n, right 1..n, center,
//! top left, top right, bottom left, bottom right.

use std::fmt;

/// One of the nine named screen regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Top,
    Bottom,
    Left,
    Right,
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Area {
    pub const ALL: [Area; 9] = [
        Area::Top,
        Area::Bottom,
        Area::Left,
        Area::Right,
        Area::Center,
        Area::TopLeft,
        Area::TopRight,
        Area::BottomLeft,
        Area::BottomRight,
    ];

    /// Area for the 4-bit area code used in DF10CH EEPROM descriptors
    pub fn from_code(code: u8) -> Option<Area> {
        Self::ALL.get(code as usize).copied()
    }

    /// Edge areas may hold many channels, the center and corners at most one
    pub fn max_channels(self) -> usize {
        match self {
            Area::Top | Area::Bottom | Area::Left | Area::Right => 25,
            _ => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Area::Top => "top",
            Area::Bottom => "bottom",
            Area::Left => "left",
            Area::Right => "right",
            Area::Center => "center",
            Area::TopLeft => "top left",
            Area::TopRight => "top right",
            Area::BottomLeft => "bottom left",
            Area::BottomRight => "bottom right",
        }
    }

    /// Whether channels of this area are numbered in logs
    pub fn is_edge(self) -> bool {
        matches!(self, Area::Top | Area::Bottom | Area::Left | Area::Right)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of channels per area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
    pub center: usize,
    pub top_left: usize,
    pub top_right: usize,
    pub bottom_left: usize,
    pub bottom_right: usize,
}

impl ChannelLayout {
    pub fn count(&self, area: Area) -> usize {
        match area {
            Area::Top => self.top,
            Area::Bottom => self.bottom,
            Area::Left => self.left,
            Area::Right => self.right,
            Area::Center => self.center,
            Area::TopLeft => self.top_left,
            Area::TopRight => self.top_right,
            Area::BottomLeft => self.bottom_left,
            Area::BottomRight => self.bottom_right,
        }
    }

    pub fn count_mut(&mut self, area: Area) -> &mut usize {
        match area {
            Area::Top => &mut self.top,
            Area::Bottom => &mut self.bottom,
            Area::Left => &mut self.left,
            Area::Right => &mut self.right,
            Area::Center => &mut self.center,
            Area::TopLeft => &mut self.top_left,
            Area::TopRight => &mut self.top_right,
            Area::BottomLeft => &mut self.bottom_left,
            Area::BottomRight => &mut self.bottom_right,
        }
    }

    pub fn total(&self) -> usize {
        Area::ALL.iter().map(|&a| self.count(a)).sum()
    }

    /// Index of the first channel of `area` in the flat color array
    pub fn offset(&self, area: Area) -> usize {
        Area::ALL
            .iter()
            .take_while(|&&a| a != area)
            .map(|&a| self.count(a))
            .sum()
    }

    /// Flat index of channel `index` of `area`, if that channel exists
    pub fn index_of(&self, area: Area, index: usize) -> Option<usize> {
        (index < self.count(area)).then(|| self.offset(area) + index)
    }

    /// `(area, area-local index)` for every channel in canonical order
    pub fn channels(&self) -> impl Iterator<Item = (Area, usize)> + '_ {
        Area::ALL
            .into_iter()
            .flat_map(move |a| (0..self.count(a)).map(move |i| (a, i)))
    }

    /// Raise every count to at least the count in `other`
    pub fn merge_max(&mut self, other: &ChannelLayout) {
        for area in Area::ALL {
            let n = self.count_mut(area);
            *n = (*n).max(other.count(area));
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top {}, bottom {}, left {}, right {}, center {}, topLeft {}, topRight {}, bottomLeft {}, bottomRight {}",
            self.top,
            self.bottom,
            self.left,
            self.right,
            self.center,
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChannelLayout {
        ChannelLayout {
            top: 3,
            bottom: 2,
            left: 1,
            right: 0,
            center: 1,
            top_left: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_total_and_offsets() {
        let layout = sample();
        assert_eq!(layout.total(), 8);
        assert_eq!(layout.offset(Area::Top), 0);
        assert_eq!(layout.offset(Area::Bottom), 3);
        assert_eq!(layout.offset(Area::Left), 5);
        assert_eq!(layout.offset(Area::Center), 6);
        assert_eq!(layout.offset(Area::TopLeft), 7);
        assert_eq!(layout.index_of(Area::Right, 0), None);
        assert_eq!(layout.index_of(Area::Bottom, 1), Some(4));
    }

    #[test]
    fn test_channels_follow_canonical_order() {
        let order: Vec<_> = sample().channels().collect();
        assert_eq!(order.len(), 8);
        assert_eq!(order[0], (Area::Top, 0));
        assert_eq!(order[2], (Area::Top, 2));
        assert_eq!(order[3], (Area::Bottom, 0));
        assert_eq!(order[7], (Area::TopLeft, 0));
    }

    #[test]
    fn test_merge_max() {
        let mut a = ChannelLayout { top: 2, left: 4, ..Default::default() };
        let b = ChannelLayout { top: 5, left: 1, center: 1, ..Default::default() };
        a.merge_max(&b);
        assert_eq!(a, ChannelLayout { top: 5, left: 4, center: 1, ..Default::default() });
    }
}
