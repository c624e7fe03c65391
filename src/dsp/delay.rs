/// Circular delay line with a fixed capacity allocated up front.
///
/// Reads are fractional (linear interpolation) so the delay time can glide
/// without stepping.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Delay line able to hold `max_delay_samples` of history.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(2) + 1],
            write_pos: 0,
        }
    }

    /// Delay line sized for `seconds` at `sample_rate`.
    pub fn with_duration(seconds: f32, sample_rate: f32) -> Self {
        Self::new((seconds * sample_rate).ceil() as usize)
    }

    /// Longest delay this line supports, in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Read the sample written `delay_samples` writes ago.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1.0, self.capacity() as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;

        let a = self.buffer[(self.write_pos + len - whole) % len];
        let b = self.buffer[(self.write_pos + len - whole - 1) % len];
        a + (b - a) * frac
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Write `sample` and return the sample `delay_samples` behind it.
    pub fn next_sample(&mut self, sample: f32, delay_samples: f32) -> f32 {
        let delayed = self.read(delay_samples);
        self.write(sample);
        delayed
    }

    pub fn render(&mut self, buffer: &mut [f32], delay_samples: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_reappears_after_delay() {
        let mut line = DelayLine::new(64);
        let mut buffer = vec![0.0f32; 32];
        buffer[0] = 1.0;

        line.render(&mut buffer, 10.0);

        assert!((buffer[10] - 1.0).abs() < 1e-6);
        assert_eq!(buffer.iter().filter(|s| s.abs() > 1e-6).count(), 1);
    }

    #[test]
    fn fractional_delay_interpolates() {
        let mut line = DelayLine::new(16);
        let mut buffer = vec![0.0f32; 8];
        buffer[0] = 1.0;

        line.render(&mut buffer, 2.5);

        assert!((buffer[2] - 0.5).abs() < 1e-6);
        assert!((buffer[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn delay_is_clamped_to_capacity() {
        let line = DelayLine::with_duration(0.5, 1_000.0);
        assert_eq!(line.capacity(), 500);
        // Does not panic past capacity.
        let _ = line.read(1_000.0);
    }
}
