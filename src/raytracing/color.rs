use std::ops;

use super::error::TracerError;
use super::MIN_OPTICAL_INTENSITY;

/// An amount of light energy per channel. Components are unbounded above but
/// must never be negative; reflectance colors are further validated to [0, 1]
/// by `Optics`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl ops::Add<Color> for Color {
    type Output = Color;
    fn add(self, rhs: Color) -> Self::Output {
        Color {
            red: self.red + rhs.red,
            green: self.green + rhs.green,
            blue: self.blue + rhs.blue,
        }
    }
}

impl ops::AddAssign<Color> for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.red += rhs.red;
        self.green += rhs.green;
        self.blue += rhs.blue;
    }
}

// component-wise filtering: a surface color modulates incoming light
impl ops::Mul<Color> for Color {
    type Output = Color;
    fn mul(self, rhs: Color) -> Self::Output {
        Color {
            red: self.red * rhs.red,
            green: self.green * rhs.green,
            blue: self.blue * rhs.blue,
        }
    }
}

impl ops::Mul<f64> for Color {
    type Output = Color;
    fn mul(self, rhs: f64) -> Self::Output {
        Color {
            red: self.red * rhs,
            green: self.green * rhs,
            blue: self.blue * rhs,
        }
    }
}

impl ops::Mul<Color> for f64 {
    type Output = Color;
    fn mul(self, rhs: Color) -> Self::Output {
        rhs * self
    }
}

impl Color {
    #[inline(always)]
    pub fn new(red: f64, green: f64, blue: f64) -> Color {
        Color { red, green, blue }
    }

    #[inline(always)]
    pub fn black() -> Color {
        Color::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub fn white() -> Color {
        Color::new(1.0, 1.0, 1.0)
    }

    pub fn validate(self: &Self) -> Result<(), TracerError> {
        for component in [self.red, self.green, self.blue] {
            if component < 0.0 {
                return Err(TracerError::NegativeColorComponent(component));
            }
        }
        Ok(())
    }

    /// True when at least one channel still carries enough energy to matter.
    #[inline(always)]
    pub fn is_significant(self: &Self) -> bool {
        self.red >= MIN_OPTICAL_INTENSITY
            || self.green >= MIN_OPTICAL_INTENSITY
            || self.blue >= MIN_OPTICAL_INTENSITY
    }

    #[inline(always)]
    pub fn max_component(self: &Self) -> f64 {
        self.red.max(self.green).max(self.blue)
    }
}
