//! Decoded PCM as handed over by a decoder

/// Interleaved samples in one of the decoder output formats
#[derive(Debug, Clone, Copy)]
pub enum PcmSamples<'a> {
    F32(&'a [f32]),
    I16(&'a [i16]),
    I32(&'a [i32]),
}

impl PcmSamples<'_> {
    fn len(&self) -> usize {
        match self {
            Self::F32(data) => data.len(),
            Self::I16(data) => data.len(),
            Self::I32(data) => data.len(),
        }
    }

    /// Sample `index` as `f32` in `[-1, 1]`
    fn get(&self, index: usize) -> f32 {
        match self {
            Self::F32(data) => data[index],
            Self::I16(data) => f32::from(data[index]) / 32_768.0,
            Self::I32(data) => data[index] as f32 / 2_147_483_648.0,
        }
    }
}

/// One chunk of decoder output
#[derive(Debug, Clone, Copy)]
pub struct PcmBuffer<'a> {
    pub samples: PcmSamples<'a>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl<'a> PcmBuffer<'a> {
    pub fn new(samples: PcmSamples<'a>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Complete frames in the buffer
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// The first channel of every frame, as `f32`
    pub fn first_channel(&self) -> impl Iterator<Item = f32> + '_ {
        let stride = usize::from(self.channels.max(1));
        (0..self.frames()).map(move |frame| self.samples.get(frame * stride))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_first_channel() {
        let data = [0.5f32, -1.0, 0.25, -1.0, 0.125];
        let buffer = PcmBuffer::new(PcmSamples::F32(&data), 2, 48_000);

        // The trailing half frame is not a frame
        assert_eq!(buffer.frames(), 2);
        assert_eq!(buffer.first_channel().collect::<Vec<_>>(), vec![0.5, 0.25]);
    }

    #[test]
    fn integer_formats_are_scaled() {
        let shorts = [i16::MIN, 16_384];
        let buffer = PcmBuffer::new(PcmSamples::I16(&shorts), 1, 44_100);
        assert_eq!(buffer.first_channel().collect::<Vec<_>>(), vec![-1.0, 0.5]);

        let ints = [i32::MIN, 1 << 30];
        let buffer = PcmBuffer::new(PcmSamples::I32(&ints), 1, 44_100);
        assert_eq!(buffer.first_channel().collect::<Vec<_>>(), vec![-1.0, 0.5]);
    }

    #[test]
    fn zero_channels_reads_as_mono() {
        let data = [0.1f32, 0.2];
        let buffer = PcmBuffer::new(PcmSamples::F32(&data), 0, 44_100);
        assert_eq!(buffer.frames(), 2);
    }
}
