//! Async I2C driver for the Wii Classic Controller.

use controller_core::wii_classic::{
    ReportOutcome, ReportTracker, I2C_ADDRESS, INIT_SEQUENCE, REPORT_LEN, REQUEST_REPORT,
};
use defmt::{info, Format};
use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;

/// Bytes clocked out per read; only the first [`REPORT_LEN`] are used.
const READ_LEN: usize = 8;

/// Settling time after each register write.
const WRITE_SETTLE_MS: u64 = 5;

/// Bus failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum WiiError {
    Bus,
}

/// Wii Classic Controller on an async I2C bus.
pub struct WiiClassic<I> {
    i2c: I,
    tracker: ReportTracker,
}

impl<I: I2c> WiiClassic<I> {
    #[must_use]
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            tracker: ReportTracker::new(),
        }
    }

    /// Enable unencrypted reports.
    pub async fn init(&mut self) -> Result<(), WiiError> {
        for write in INIT_SEQUENCE {
            self.write(&write).await?;
        }
        Ok(())
    }

    /// Read one raw report.
    ///
    /// The read pointer is rewound afterwards so the next read starts at the
    /// first report byte again.
    pub async fn read_report(&mut self) -> Result<[u8; REPORT_LEN], WiiError> {
        let mut buf = [0u8; READ_LEN];
        self.i2c
            .read(I2C_ADDRESS, &mut buf)
            .await
            .map_err(|_| WiiError::Bus)?;

        let mut report = [0u8; REPORT_LEN];
        report.copy_from_slice(&buf[..REPORT_LEN]);
        Ok(report)
    }

    /// Read and decode one report, re-initialising the controller after a
    /// run of bad reports.
    pub async fn poll(&mut self) -> ReportOutcome {
        // A failed read decodes like an unplugged controller
        let report = self.read_report().await.unwrap_or([0; REPORT_LEN]);
        let outcome = self.tracker.on_report(&report);

        match outcome {
            ReportOutcome::Data(_) => {
                // Errors surface on the next read
                let _ = self.write(&REQUEST_REPORT).await;
            }
            ReportOutcome::Reconnect => {
                if self.init().await.is_ok() {
                    info!("Wii Classic re-initialised");
                }
            }
            ReportOutcome::Skip => {}
        }
        outcome
    }

    /// A valid report arrived since the last re-initialisation.
    pub fn is_connected(&self) -> bool {
        self.tracker.is_connected()
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), WiiError> {
        let result = self.i2c.write(I2C_ADDRESS, bytes).await;
        Timer::after_millis(WRITE_SETTLE_MS).await;
        result.map_err(|_| WiiError::Bus)
    }
}
