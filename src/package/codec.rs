//! The envelope text format.
//!
//! ```text
//! -----BEGIN PACKAGE-----
//! -----BEGIN BLOCK <name>-----
//! <base64 content, 65 chars per line>
//! -----END BLOCK <name>-----
//! ...
//! -----END PACKAGE-----
//! ```
//!
//! Writing always emits the last (possibly partial, possibly empty) payload
//! line, so a block whose base64 is a multiple of 65 characters long ends in
//! a blank line. Existing envelopes look like that and we stay bit-exact.
//!
//! Reading is lenient about what comes before the package (any junk is
//! skipped, and no package at all reads as an empty one) and strict about
//! what comes inside it.

use crate::{
    error::{Error, Result},
    package::Package,
    util::ser,
};
use std::io::{BufRead, Write};
use tracing::debug;

/// Every marker is wrapped in these.
pub const MARKER_DASHES: &str = "-----";
pub const PACKAGE_BEGIN: &str = "-----BEGIN PACKAGE-----";
pub const PACKAGE_END: &str = "-----END PACKAGE-----";
pub const BLOCK_BEGIN: &str = "-----BEGIN BLOCK";
pub const BLOCK_END: &str = "-----END BLOCK";
/// Payload line width, in base64 characters.
pub const LINE_WIDTH: usize = 65;

/// Render a package as envelope text.
pub fn encode(package: &Package) -> String {
    let mut out = String::new();
    out.push_str(PACKAGE_BEGIN);
    out.push('\n');
    for block in package.blocks() {
        out.push_str(&format!("{} {}{}\n", BLOCK_BEGIN, block.name(), MARKER_DASHES));
        let encoded = ser::base64_encode(block.content());
        let full_lines = encoded.len() / LINE_WIDTH;
        for i in 0..full_lines {
            out.push_str(&encoded[i * LINE_WIDTH..(i + 1) * LINE_WIDTH]);
            out.push('\n');
        }
        out.push_str(&encoded[full_lines * LINE_WIDTH..]);
        out.push('\n');
        out.push_str(&format!("{} {}{}\n", BLOCK_END, block.name(), MARKER_DASHES));
    }
    out.push_str(PACKAGE_END);
    out.push('\n');
    out
}

/// Write a package to a stream.
///
/// The whole envelope is rendered up front and handed to the writer in one
/// go, so an encoding problem can never leave half an envelope behind.
pub fn write_package<W: Write>(writer: &mut W, package: &Package) -> Result<()> {
    let text = encode(package);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    debug!(blocks = package.len(), bytes = text.len(), "wrote package");
    Ok(())
}

/// Pulls lines off a reader, minus their line endings.
struct Lines<R> {
    reader: R,
    line_no: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self { reader, line_no: 0, buf: Vec::new() }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        while matches!(self.buf.last(), Some(b'\n') | Some(b'\r')) {
            self.buf.pop();
        }
        // markers and base64 are ASCII; bad bytes in a payload fail at decode
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// Pull the block name out of a `-----BEGIN BLOCK <name>-----` (or END)
/// marker line.
fn marker_name(line: &str, prefix: &str, line_no: usize) -> Result<String> {
    let name = line.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(' '))
        .and_then(|rest| rest.strip_suffix(MARKER_DASHES))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::MalformedEnvelope(format!("line {}: malformed block marker {:?}", line_no, line)))?;
    Ok(name.to_string())
}

/// Parse a package from an envelope stream.
///
/// Input with no package marker at all yields an empty package. Once the
/// package has begun, running out of input, a bad marker, a mismatched block
/// end, or a bad base64 payload is a [`MalformedEnvelope`](Error::MalformedEnvelope).
pub fn read_package<R: BufRead>(reader: R) -> Result<Package> {
    let mut lines = Lines::new(reader);
    let mut package = Package::new();

    loop {
        match lines.next_line()? {
            Some(line) if line == PACKAGE_BEGIN => break,
            Some(_) => continue,
            None => {
                debug!("no package marker found, reading as an empty package");
                return Ok(package);
            }
        }
    }

    loop {
        let line = loop {
            match lines.next_line()? {
                Some(line) if line == PACKAGE_END || line.starts_with(BLOCK_BEGIN) => break line,
                Some(_) => continue,
                None => Err(Error::MalformedEnvelope("input ended before the package end marker".into()))?,
            }
        };
        if line == PACKAGE_END {
            break;
        }

        let name = marker_name(&line, BLOCK_BEGIN, lines.line_no)?;
        let mut payload = String::new();
        loop {
            match lines.next_line()? {
                Some(line) if line.starts_with(BLOCK_END) => {
                    let end_name = marker_name(&line, BLOCK_END, lines.line_no)?;
                    if end_name != name {
                        Err(Error::MalformedEnvelope(format!(
                            "line {}: block {:?} closed by an end marker for {:?}",
                            lines.line_no, name, end_name
                        )))?;
                    }
                    break;
                }
                Some(line) => payload.extend(line.chars().filter(|c| !c.is_whitespace())),
                None => Err(Error::MalformedEnvelope(format!("input ended inside block {:?}", name)))?,
            }
        }

        let content = ser::base64_decode(&payload)
            .map_err(|e| Error::MalformedEnvelope(format!("block {:?} has an invalid base64 payload: {}", name, e)))?;
        package.add(name, content)?;
    }

    debug!(blocks = package.len(), "read package");
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Package {
        let mut package = Package::new();
        package.add("PILGRIM_DATA", b"hello".to_vec()).unwrap();
        package.add("STAMP_DATAH7", (0..=255u8).collect::<Vec<_>>()).unwrap();
        package
    }

    #[test]
    fn codec_write_exact_format() {
        let mut package = Package::new();
        package.add("DATA", b"hello".to_vec()).unwrap();
        let mut out = Vec::new();
        write_package(&mut out, &package).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-----BEGIN PACKAGE-----\n-----BEGIN BLOCK DATA-----\naGVsbG8=\n-----END BLOCK DATA-----\n-----END PACKAGE-----\n",
        );
    }

    #[test]
    fn codec_wraps_at_65_columns() {
        // 96 bytes -> 128 base64 chars -> 65 + 63
        let mut package = Package::new();
        package.add("wide", vec![0xAB; 96]).unwrap();
        let text = encode(&package);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[2].len(), 65);
        assert_eq!(lines[3].len(), 63);
        assert_eq!(Package::from_text(&text).unwrap(), package);
    }

    #[test]
    fn codec_exact_multiple_emits_blank_line() {
        // 195 bytes -> 260 chars of base64 = 4 full lines, then an empty one
        let mut package = Package::new();
        package.add("exact", vec![7u8; 195]).unwrap();
        let text = encode(&package);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(ser::base64_encode(vec![7u8; 195]).len(), 260);
        for line in &lines[2..6] {
            assert_eq!(line.len(), 65);
        }
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "-----END BLOCK exact-----");
        assert_eq!(Package::from_text(&text).unwrap(), package);

        let mut empty = Package::new();
        empty.add("nothing", Vec::new()).unwrap();
        let text = encode(&empty);
        assert_eq!(text, "-----BEGIN PACKAGE-----\n-----BEGIN BLOCK nothing-----\n\n-----END BLOCK nothing-----\n-----END PACKAGE-----\n");
        assert_eq!(Package::from_text(&text).unwrap(), empty);
    }

    #[test]
    fn codec_read_preserves_order() {
        let package = sample();
        let read = Package::from_text(&package.to_text()).unwrap();
        assert_eq!(read.names(), vec!["PILGRIM_DATA", "STAMP_DATAH7"]);
        assert_eq!(read, package);
    }

    #[test]
    fn codec_read_no_package_is_empty() {
        assert!(read_package("".as_bytes()).unwrap().is_empty());
        assert!(read_package("just some\nrandom text\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn codec_read_skips_junk_and_tolerates_crlf() {
        let text = "Dear office,\r\nplease find my credential below.\r\n-----BEGIN PACKAGE-----\r\nsome comment\r\n-----BEGIN BLOCK DATA-----\r\naGVs\r\n  bG8=\r\n-----END BLOCK DATA-----\r\n-----END PACKAGE-----\r\nregards\r\n";
        let package = read_package(text.as_bytes()).unwrap();
        assert_eq!(package.get("DATA"), Some(b"hello".as_slice()));
        assert_eq!(package.len(), 1);
    }

    #[test]
    fn codec_read_truncated() {
        let text = sample().to_text();
        let no_end = text.replace("-----END PACKAGE-----\n", "");
        assert!(matches!(read_package(no_end.as_bytes()), Err(Error::MalformedEnvelope(_))));

        let cut = &text[..text.find("-----END BLOCK PILGRIM_DATA").unwrap()];
        assert!(matches!(read_package(cut.as_bytes()), Err(Error::MalformedEnvelope(_))));
    }

    #[test]
    fn codec_read_bad_markers() {
        for bad in [
            "-----BEGIN PACKAGE-----\n-----BEGIN BLOCK-----\naGVsbG8=\n-----END BLOCK-----\n-----END PACKAGE-----\n",
            "-----BEGIN PACKAGE-----\n-----BEGIN BLOCK DATA\naGVsbG8=\n-----END BLOCK DATA-----\n-----END PACKAGE-----\n",
            "-----BEGIN PACKAGE-----\n-----BEGIN BLOCK -----\naGVsbG8=\n-----END BLOCK -----\n-----END PACKAGE-----\n",
            "-----BEGIN PACKAGE-----\n-----BEGIN BLOCK DATA-----\naGVsbG8=\n-----END BLOCK OTHER-----\n-----END PACKAGE-----\n",
        ] {
            let res = read_package(bad.as_bytes());
            assert!(matches!(res, Err(Error::MalformedEnvelope(_))), "accepted {:?}", bad);
        }
    }

    #[test]
    fn codec_read_bad_base64() {
        let text = "-----BEGIN PACKAGE-----\n-----BEGIN BLOCK DATA-----\naGVsbG8*\n-----END BLOCK DATA-----\n-----END PACKAGE-----\n";
        match read_package(text.as_bytes()) {
            Err(Error::MalformedEnvelope(msg)) => assert!(msg.contains("DATA")),
            _ => panic!("bad base64 accepted"),
        }
    }

    #[test]
    fn codec_read_invalid_utf8_payload() {
        let bytes = b"-----BEGIN PACKAGE-----\n-----BEGIN BLOCK DATA-----\naGVs\xff\xfe\n-----END BLOCK DATA-----\n-----END PACKAGE-----\n";
        assert!(matches!(read_package(bytes.as_slice()), Err(Error::MalformedEnvelope(_))));
    }

    #[test]
    fn codec_read_latin1_junk_is_skipped() {
        let bytes = b"Hola, te paso la credencial de Jos\xe9\nsaludos\n";
        assert!(read_package(bytes.as_slice()).unwrap().is_empty());

        let mut bytes = b"Jos\xe9 te manda esto\n".to_vec();
        bytes.extend_from_slice(b"-----BEGIN PACKAGE-----\n\xe1rbol\n");
        bytes.extend_from_slice(b"-----BEGIN BLOCK DATA-----\naGVsbG8=\n-----END BLOCK DATA-----\n");
        bytes.extend_from_slice(b"-----END PACKAGE-----\nadi\xf3s\n");
        let package = read_package(bytes.as_slice()).unwrap();
        assert_eq!(package.len(), 1);
        assert_eq!(package.get("DATA"), Some(b"hello".as_slice()));
    }

    #[test]
    fn codec_write_error_surfaces() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        assert!(matches!(write_package(&mut Broken, &sample()), Err(Error::IoError(_))));
    }

    proptest! {
        #[test]
        fn codec_round_trip(
            blocks in proptest::collection::vec(("[A-Za-z0-9_{} -]{1,24}", proptest::collection::vec(any::<u8>(), 0..300)), 0..8)
        ) {
            let mut package = Package::new();
            for (name, content) in blocks {
                package.add(name, content).unwrap();
            }
            let read = Package::from_text(&package.to_text()).unwrap();
            prop_assert_eq!(read, package);
        }
    }
}
