use super::color::Color;
use super::error::TracerError;

/// How a surface splits incoming light: matte scatter, mirror gloss and
/// transmission (`1 - opacity`). Matte and gloss colors are reflectances and
/// must stay within [0, 1] per component.
#[derive(Debug, Clone, Copy)]
pub struct Optics {
    matte_color: Color,
    gloss_color: Color,
    opacity: f64,
}

impl Default for Optics {
    fn default() -> Self {
        Optics {
            matte_color: Color::white(),
            gloss_color: Color::black(),
            opacity: 1.0,
        }
    }
}

impl Optics {
    pub fn new(matte_color: Color, gloss_color: Color, opacity: f64) -> Result<Optics, TracerError> {
        let mut optics = Optics::default();
        optics.set_matte_color(matte_color)?;
        optics.set_gloss_color(gloss_color)?;
        optics.set_opacity(opacity)?;
        Ok(optics)
    }

    pub fn set_matte_color(&mut self, matte_color: Color) -> Result<(), TracerError> {
        validate_reflection_color(matte_color)?;
        self.matte_color = matte_color;
        Ok(())
    }

    pub fn set_gloss_color(&mut self, gloss_color: Color) -> Result<(), TracerError> {
        validate_reflection_color(gloss_color)?;
        self.gloss_color = gloss_color;
        Ok(())
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Result<(), TracerError> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(TracerError::InvalidOpacity(opacity));
        }
        self.opacity = opacity;
        Ok(())
    }

    /// Split the surface reflectance between matte and gloss: the gloss
    /// factor is the mirror share, the rest goes to diffuse scatter. Both raw
    /// colors must already be realistic reflectances so the weighted pair
    /// cannot amplify light.
    pub fn set_matte_gloss_balance(
        &mut self,
        gloss_factor: f64,
        raw_matte_color: Color,
        raw_gloss_color: Color,
    ) -> Result<(), TracerError> {
        if !(0.0..=1.0).contains(&gloss_factor) {
            return Err(TracerError::InvalidGlossFactor(gloss_factor));
        }
        validate_reflection_color(raw_matte_color)?;
        validate_reflection_color(raw_gloss_color)?;
        self.matte_color = raw_matte_color * (1.0 - gloss_factor);
        self.gloss_color = raw_gloss_color * gloss_factor;
        Ok(())
    }

    pub fn matte_color(&self) -> Color {
        self.matte_color
    }

    pub fn gloss_color(&self) -> Color {
        self.gloss_color
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }
}

fn validate_reflection_color(color: Color) -> Result<(), TracerError> {
    for component in [color.red, color.green, color.blue] {
        if !(0.0..=1.0).contains(&component) {
            return Err(TracerError::InvalidReflectionColor(component));
        }
    }
    Ok(())
}
