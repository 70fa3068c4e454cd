use bytes::BytesMut;
use std::{
    fmt::{self, Write},
    io::{self},
    str,
};
use tokio_util::codec::{Decoder, Encoder};

use crate::proto::command::Command;

/// Newline-delimited SCPI framing: commands are terminated with a single
/// `\n`, responses with `\n` (optionally preceded by `\r`).
#[derive(Default)]
pub struct ScpiCodec;

impl Decoder for ScpiCodec {
    type Item = String;
    // We use io::Error here instead of our own Error type because at the
    // framing level any complete line is a successful decode. Classifying
    // the line content is up to a higher level.
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let offset = src.as_ref().iter().position(|b| *b == b'\n');
        if let Some(n) = offset {
            let line = src.split_to(n + 1);
            let line = str::from_utf8(&line[..n])
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            Ok(Some(line.trim_end().to_string()))
        } else {
            Ok(None)
        }
    }
}

fn write_fmt_guarded(dst: &mut BytesMut, args: fmt::Arguments<'_>) -> Result<(), io::Error> {
    dst.write_fmt(args)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

impl Encoder<Command> for ScpiCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        write_fmt_guarded(dst, format_args!("{}", item))?;
        dst.write_str("\n")
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_line() {
        let mut codec = ScpiCodec;
        let mut buf = BytesMut::from(&b"1.234000E-01\n9.9"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "1.234000E-01");
        // Incomplete second line stays buffered
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"9.9");
    }

    #[test]
    fn decode_strips_carriage_return() {
        let mut codec = ScpiCodec;
        let mut buf = BytesMut::from(&b"0,\"No error\"\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "0,\"No error\"");
    }

    #[test]
    fn encode_appends_newline() {
        let mut codec = ScpiCodec;
        let mut buf = BytesMut::new();
        codec.encode(Command::Identify, &mut buf).unwrap();
        codec.encode(Command::Read, &mut buf).unwrap();
        assert_eq!(&buf[..], b"*IDN?\nREAD?\n");
    }
}
