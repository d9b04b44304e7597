//! Brief screen glitch played on headlight transitions.

/// Intensity under which the overlay is hidden.
const VISIBLE_THRESHOLD: f32 = 0.001;

/// Triangle pulse: 0 up to `peak` and back to 0 over `duration`.
///
/// Driven by unscaled time so pausing the game does not freeze it.
#[derive(Debug, Clone)]
pub struct GlitchPulse {
    peak: f32,
    duration: f32,
    elapsed: Option<f32>,
    intensity: f32,
}

impl GlitchPulse {
    /// Creates an idle pulse.
    #[must_use]
    pub fn new(peak: f32, duration: f32) -> Self {
        Self {
            peak,
            duration,
            elapsed: None,
            intensity: 0.0,
        }
    }

    /// Starts (or restarts) the pulse.
    pub fn burst(&mut self) {
        self.elapsed = Some(0.0);
    }

    /// Advances the pulse by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let Some(elapsed) = self.elapsed else {
            return;
        };

        let t = elapsed + dt;
        if t >= self.duration || self.duration <= 0.0 {
            self.elapsed = None;
            self.intensity = 0.0;
            return;
        }

        let x = (t / self.duration).clamp(0.0, 1.0);
        let tri = 1.0 - (x * 2.0 - 1.0).abs();
        self.intensity = tri * self.peak;
        self.elapsed = Some(t);
    }

    /// Current intensity.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Whether a pulse is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Whether the overlay should be drawn.
    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.intensity > VISIBLE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_pulse_is_dark() {
        let mut pulse = GlitchPulse::new(1.0, 0.12);
        pulse.advance(0.05);
        assert!(!pulse.overlay_visible());
        assert!(!pulse.is_active());
    }

    #[test]
    fn test_pulse_peaks_mid_way_then_ends() {
        let mut pulse = GlitchPulse::new(1.0, 0.1);
        pulse.burst();

        pulse.advance(0.05);
        assert!((pulse.intensity() - 1.0).abs() < 1e-4);
        assert!(pulse.overlay_visible());

        pulse.advance(0.025);
        assert!((pulse.intensity() - 0.5).abs() < 1e-3);

        pulse.advance(0.05);
        assert_eq!(pulse.intensity(), 0.0);
        assert!(!pulse.is_active());
    }

    #[test]
    fn test_burst_restarts() {
        let mut pulse = GlitchPulse::new(2.0, 0.1);
        pulse.burst();
        pulse.advance(0.09);
        pulse.burst();
        pulse.advance(0.05);
        assert!((pulse.intensity() - 2.0).abs() < 1e-3);
    }
}
