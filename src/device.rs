use futures::{SinkExt, StreamExt};
use std::{pin::Pin, time::Duration};
use tokio::net::TcpStream;
use tokio::time;
use tokio_serial::SerialPortBuilderExt;
use tokio_util::codec::Decoder;

use crate::address::Address;
use crate::function::Function;
use crate::proto::{codec::ScpiCodec, command::Command, Error, Result};
use crate::{DEFAULT_BAUDRATE, SCPI_PORT};

/// Magic value the instrument returns instead of a real measurement when
/// the signal exceeds the selected range.
pub const OVERFLOW_SENTINEL: f64 = 9.90000000E+37;

/// Upper bound on `SYST:ERR?` reads when draining the error queue, so
/// teardown terminates even against a misbehaving instrument.
pub const MAX_ERROR_QUEUE_DEPTH: usize = 50;

trait AsyncReadWrite<S>: futures::Sink<S> + futures::Stream {}

impl<T, S> AsyncReadWrite<S> for T where T: futures::Sink<S> + futures::Stream {}

#[allow(clippy::type_complexity)]
type ScpiStream = Pin<
    Box<
        dyn AsyncReadWrite<
            Command,
            Error = std::io::Error,
            Item = std::result::Result<String, std::io::Error>,
        >,
    >,
>;

/// One entry of the instrument's error queue. Code `0` means "no error".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub code: i32,
    pub message: String,
}

impl ErrorRecord {
    /// Parse a `SYST:ERR?` response of the form `<code>,"<description>"`.
    pub fn parse(line: &str) -> Result<Self> {
        let (code, message) = match line.split_once(',') {
            Some((code, message)) => (code, message),
            None => (line, ""),
        };
        let code = code.trim();
        let code = code
            .strip_prefix('+')
            .unwrap_or(code)
            .parse::<i32>()
            .map_err(|_| Error::Protocol(format!("invalid error queue response: '{}'", line)))?;
        Ok(Self {
            code,
            message: message.trim().trim_matches('"').to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.code == 0
    }
}

/// A connection to the HMC8012.
///
/// A `Device` owns the underlying transport exclusively. All operations are
/// blocking round trips on the same connection, each bounded by the timeout
/// given to [`Device::connect`]. After [`Device::close`] every further
/// command fails with [`Error::NotConnected`].
pub struct Device {
    stream: Option<ScpiStream>,
    timeout: Duration,
}

impl Device {
    /// Open a connection and put the instrument into remote control.
    ///
    /// Clears the status and error state (`*CLS`) but does not reset the
    /// configured function or range, so settings from a previous session
    /// persist. Use [`Device::reset`] for factory defaults.
    pub async fn connect(address: &Address, timeout: Duration) -> Result<Self> {
        let stream: ScpiStream = match address {
            Address::Lan { host } => {
                let connect = TcpStream::connect((host.as_str(), SCPI_PORT));
                let socket = time::timeout(timeout, connect)
                    .await
                    .map_err(|_| Error::Timeout(timeout))??;
                socket.set_nodelay(true)?;
                Box::pin(ScpiCodec::default().framed(socket))
            }
            Address::Com { port } => {
                let path = format!("COM{}", port);
                #[allow(unused_mut)]
                let mut port = tokio_serial::new(path, DEFAULT_BAUDRATE)
                    .timeout(timeout)
                    .open_native_async()?;

                #[cfg(unix)]
                port.set_exclusive(false)
                    .map_err(Error::Serial)?;

                Box::pin(ScpiCodec::default().framed(port))
            }
        };

        let mut device = Self {
            stream: Some(stream),
            timeout,
        };

        device.write(Command::ClearStatus).await?;
        device.write(Command::Remote).await?;
        let identity = device.identify().await?;
        log::info!("Connected to {}: {}", address, identity);

        Ok(device)
    }

    #[cfg(test)]
    pub(crate) fn new_faked(
        response_lines: &[&str],
    ) -> (Self, std::sync::Arc<std::sync::Mutex<Vec<u8>>>) {
        let fake = super::proto::fake::FakeBuffer::from_lines(response_lines);
        let written = fake.written();
        let stream = ScpiCodec::default().framed(fake);
        (
            Self {
                stream: Some(Box::pin(stream)),
                timeout: Duration::from_secs(1),
            },
            written,
        )
    }

    /// Send a command that produces no response line.
    pub async fn write(&mut self, command: Command) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        match time::timeout(self.timeout, stream.send(command)).await {
            Ok(sent) => Ok(sent?),
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }

    /// Send a query and read one response line, trailing whitespace stripped.
    pub async fn query(&mut self, command: Command) -> Result<String> {
        self.write(command).await?;
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        match time::timeout(self.timeout, stream.next()).await {
            Ok(Some(Ok(line))) => Ok(line),
            Ok(Some(Err(ioerr))) => Err(ioerr.into()),
            Ok(None) => Err(Error::Protocol(
                "connection closed by instrument".to_string(),
            )),
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }

    /// Block until the instrument has finished its current operation.
    async fn sync(&mut self) -> Result<()> {
        self.query(Command::OperationComplete).await?;
        Ok(())
    }

    /// Query the identification string.
    pub async fn identify(&mut self) -> Result<String> {
        let identity = self.query(Command::Identify).await?;
        if identity.is_empty() {
            return Err(Error::Protocol(
                "empty identification response".to_string(),
            ));
        }
        Ok(identity)
    }

    /// Reset the instrument to factory defaults and clear the error queue.
    pub async fn reset(&mut self) -> Result<()> {
        self.write(Command::Reset).await?;
        self.write(Command::ClearStatus).await?;
        self.sync().await
    }

    /// Select a measurement function and set its range.
    ///
    /// `range` is either the literal `AUTO` (case-insensitive) or a fixed
    /// range in instrument-native units, e.g. `4` for the 4 V range. The
    /// setting persists on the instrument until the next `set_range` or
    /// [`Device::reset`] call.
    pub async fn set_range(&mut self, function: &str, range: &str) -> Result<()> {
        let function: Function = function.parse()?;
        let auto = range.eq_ignore_ascii_case("AUTO");

        // All argument validation happens before the first command goes out.
        let fixed = match function.range_prefix() {
            Some(prefix) if !auto => {
                let value = range.parse::<f64>().map_err(|_| {
                    Error::InvalidArgument(format!(
                        "invalid range '{}': expected AUTO or a numeric value",
                        range
                    ))
                })?;
                Some((prefix, value))
            }
            Some(_) => None,
            None if auto => None,
            None => {
                return Err(Error::InvalidArgument(format!(
                    "function '{}' does not support range selection",
                    function
                )))
            }
        };

        self.write(Command::Configure(function)).await?;
        self.sync().await?;

        match (function.range_prefix(), fixed) {
            (Some(prefix), Some((_, value))) => {
                self.write(Command::RangeAuto { prefix, on: false }).await?;
                self.write(Command::FixedRange { prefix, value }).await?;
            }
            (Some(prefix), None) => {
                self.write(Command::RangeAuto { prefix, on: true }).await?;
            }
            (None, _) => return Ok(()),
        }
        self.sync().await
    }

    /// Trigger a single measurement with the currently configured function
    /// and range and return the reading.
    pub async fn measure(&mut self) -> Result<f64> {
        let raw = self.query(Command::Read).await?;
        let value = raw.parse::<f64>().map_err(|_| {
            Error::Protocol(format!("invalid measurement response: '{}'", raw))
        })?;

        if value >= OVERFLOW_SENTINEL {
            return Err(Error::Overflow(value));
        }

        let record = self.read_error().await?;
        if !record.is_empty() {
            return Err(Error::Instrument {
                code: record.code,
                message: record.message,
            });
        }
        Ok(value)
    }

    /// Read the next pending entry of the instrument's error queue.
    pub async fn read_error(&mut self) -> Result<ErrorRecord> {
        let line = self.query(Command::NextError).await?;
        ErrorRecord::parse(&line)
    }

    /// Read pending errors until the queue reports empty, giving up after
    /// [`MAX_ERROR_QUEUE_DEPTH`] reads.
    pub async fn drain_error_queue(&mut self) -> Result<()> {
        for _ in 0..MAX_ERROR_QUEUE_DEPTH {
            let record = self.read_error().await?;
            if record.is_empty() {
                break;
            }
            log::warn!("pending instrument error {}: {}", record.code, record.message);
        }
        Ok(())
    }

    /// Drain the error queue, restore local control and release the
    /// transport. Idempotent; teardown failures are logged, never returned.
    pub async fn close(&mut self) {
        if self.stream.is_none() {
            return;
        }
        if let Err(err) = self.drain_error_queue().await {
            log::warn!("error queue drain failed during close: {}", err);
        }
        if let Err(err) = self.write(Command::Local).await {
            log::warn!("failed to restore local control: {}", err);
        }
        self.stream = None;
    }
}
