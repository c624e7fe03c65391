//! Default output device.
//!
//! The `cpal` stream is created, played and dropped on its own thread, so
//! nothing that holds it has to be `Send`. The caller gets the negotiated
//! sample rate back once the stream is running.

use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Sender};
use tracing::{debug, error, info};

use crate::{engine::renderer::Renderer, error::EngineError};

/// A running output stream. Dropping it stops playback.
pub struct OutputStream {
    sample_rate: u32,
    channels: u16,
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl OutputStream {
    /// Open the default device and start rendering.
    ///
    /// `build` receives the device sample rate and returns the renderer the
    /// stream callback will own.
    pub fn open<F>(build: F) -> Result<Self, EngineError>
    where
        F: FnOnce(u32) -> Renderer + Send + 'static,
    {
        let (ready_tx, ready_rx) = bounded::<Result<(u32, u16), EngineError>>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let thread = thread::Builder::new()
            .name("saavy-output".into())
            .spawn(move || {
                let stream = match start_stream(build) {
                    Ok((stream, sample_rate, channels)) => {
                        let _ = ready_tx.send(Ok((sample_rate, channels)));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                // Park until the owner goes away.
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!("output stream closed");
            })
            .map_err(|_| EngineError::NoOutputDevice)?;

        let (sample_rate, channels) = match ready_rx.recv() {
            Ok(result) => result?,
            Err(_) => return Err(EngineError::NoOutputDevice),
        };

        Ok(Self {
            sample_rate,
            channels,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        // Dropping the sender wakes the parked thread.
        self.shutdown.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn start_stream<F>(build: F) -> Result<(cpal::Stream, u32, u16), EngineError>
where
    F: FnOnce(u32) -> Renderer,
{
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(EngineError::NoOutputDevice)?;
    let supported = device.default_output_config()?;

    let format = supported.sample_format();
    if format != cpal::SampleFormat::F32 {
        return Err(EngineError::UnsupportedSampleFormat(format));
    }

    let config: cpal::StreamConfig = supported.into();
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;
    let mut renderer = build(sample_rate);

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _| renderer.render(data, channels as usize),
        |err| error!(%err, "output stream error"),
        None,
    )?;
    stream.play()?;

    info!(
        device = device.name().unwrap_or_default(),
        sample_rate, channels, "output stream started"
    );
    Ok((stream, sample_rate, channels))
}
