//! Scroll timer: frame index → text layer offset.
//!
//! `travel` is the unsigned distance covered since the scene started and is
//! monotonic in the frame index. `offset` is what goes to the display:
//! `start_bias + direction.sign() * travel`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    /// Content moves up the screen (positive offsets).
    #[default]
    Up,
    /// Content moves down the screen (negative offsets).
    Down,
}

impl ScrollDirection {
    pub fn sign(self) -> i32 {
        match self {
            ScrollDirection::Up => 1,
            ScrollDirection::Down => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScrollSpeed {
    /// Advance `step_pixels` every `step_period` frames.
    Stepped { step_pixels: u32, step_period: u32 },
    /// Cover the whole text extent over exactly the scene budget.
    Fit,
}

impl Default for ScrollSpeed {
    fn default() -> Self {
        ScrollSpeed::Stepped {
            step_pixels: 1,
            step_period: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default)]
    pub speed: ScrollSpeed,
    #[serde(default)]
    pub direction: ScrollDirection,
    /// Offset at scene frame 0, in pixels.
    #[serde(default)]
    pub start_bias: i32,
    /// Stop once the text block has fully traversed the screen.
    #[serde(default)]
    pub clamp: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rate {
    Stepped { pixels: u32, period: u32 },
    Fit { extent: u32, budget: u32 },
    Still,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollTimer {
    rate: Rate,
    direction: ScrollDirection,
    start_bias: i32,
    limit: Option<u32>,
}

impl ScrollTimer {
    /// `extent` is the distance, in pixels, for the text block to leave the
    /// screen entirely: its own height plus the screen height. A fit rate
    /// with no budget, or a stepped rate with a zero period, stays at the
    /// start bias.
    pub fn new(config: &ScrollConfig, budget: Option<u32>, extent: u32) -> Self {
        let rate = match (&config.speed, budget) {
            (ScrollSpeed::Stepped { step_pixels, step_period }, _) if *step_period > 0 => {
                Rate::Stepped {
                    pixels: *step_pixels,
                    period: *step_period,
                }
            }
            (ScrollSpeed::Fit, Some(budget)) if budget > 0 => Rate::Fit { extent, budget },
            _ => Rate::Still,
        };
        ScrollTimer {
            rate,
            direction: config.direction,
            start_bias: config.start_bias,
            limit: config.clamp.then_some(extent),
        }
    }

    /// A timer that never moves, sitting at offset zero.
    pub fn still() -> Self {
        ScrollTimer {
            rate: Rate::Still,
            direction: ScrollDirection::Up,
            start_bias: 0,
            limit: None,
        }
    }

    pub fn travel(&self, frame: u32) -> u32 {
        let frame = u64::from(frame);
        let raw = match self.rate {
            Rate::Stepped { pixels, period } => frame / u64::from(period) * u64::from(pixels),
            Rate::Fit { extent, budget } => {
                (frame * u64::from(extent) / u64::from(budget)).min(u64::from(extent))
            }
            Rate::Still => 0,
        };
        let raw = match self.limit {
            Some(limit) => raw.min(u64::from(limit)),
            None => raw,
        };
        u32::try_from(raw).unwrap_or(u32::MAX)
    }

    pub fn offset(&self, frame: u32) -> i32 {
        let travel = i32::try_from(self.travel(frame)).unwrap_or(i32::MAX);
        self.start_bias
            .saturating_add(self.direction.sign().saturating_mul(travel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stepped(step_pixels: u32, step_period: u32) -> ScrollConfig {
        ScrollConfig {
            speed: ScrollSpeed::Stepped {
                step_pixels,
                step_period,
            },
            ..Default::default()
        }
    }

    #[test]
    fn stepped_offset_is_floor_of_frame_over_period() {
        let timer = ScrollTimer::new(&stepped(3, 4), Some(1800), 400);
        assert_eq!(timer.offset(0), 0);
        assert_eq!(timer.offset(3), 0);
        assert_eq!(timer.offset(4), 3);
        assert_eq!(timer.offset(11), 6);
        assert_eq!(timer.offset(1799), 1797);
    }

    #[test]
    fn travel_never_decreases() {
        let configs = [
            stepped(1, 2),
            stepped(5, 1),
            ScrollConfig {
                speed: ScrollSpeed::Fit,
                ..Default::default()
            },
            ScrollConfig {
                clamp: true,
                ..stepped(2, 1)
            },
        ];
        for config in &configs {
            let timer = ScrollTimer::new(config, Some(1800), 344);
            let mut last = timer.offset(0);
            for f in 1..2000 {
                let now = timer.offset(f);
                assert!(now >= last, "{config:?} went back at frame {f}");
                last = now;
            }
        }
    }

    #[test]
    fn direction_and_bias_are_explicit() {
        let up = ScrollConfig {
            start_bias: -224,
            ..stepped(1, 1)
        };
        let down = ScrollConfig {
            direction: ScrollDirection::Down,
            start_bias: 224,
            ..stepped(1, 1)
        };
        let up = ScrollTimer::new(&up, None, 0);
        let down = ScrollTimer::new(&down, None, 0);
        assert_eq!(up.offset(0), -224);
        assert_eq!(up.offset(10), -214);
        assert_eq!(down.offset(0), 224);
        assert_eq!(down.offset(10), 214);
        assert_eq!(up.travel(10), down.travel(10));
    }

    #[test]
    fn clamp_stops_at_the_extent() {
        let config = ScrollConfig {
            clamp: true,
            ..stepped(4, 1)
        };
        let timer = ScrollTimer::new(&config, Some(5400), 344);
        assert_eq!(timer.travel(80), 320);
        assert_eq!(timer.travel(86), 344);
        assert_eq!(timer.travel(5000), 344);
    }

    #[test]
    fn fit_covers_the_extent_over_the_budget() {
        let config = ScrollConfig {
            speed: ScrollSpeed::Fit,
            ..Default::default()
        };
        let timer = ScrollTimer::new(&config, Some(5400), 434);
        assert_eq!(timer.travel(0), 0);
        assert_eq!(timer.travel(2700), 217);
        assert_eq!(timer.travel(5400), 434);
    }

    #[test]
    fn fit_without_a_budget_stands_still() {
        let config = ScrollConfig {
            speed: ScrollSpeed::Fit,
            start_bias: 8,
            ..Default::default()
        };
        let timer = ScrollTimer::new(&config, None, 434);
        assert_eq!(timer.offset(1000), 8);
        assert_eq!(ScrollTimer::still().offset(1000), 0);
    }
}
