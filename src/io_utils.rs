use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::error::Result;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Output compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zstd,
}

impl Compression {
    pub fn extension(self) -> &'static str {
        match self {
            Compression::None => "",
            Compression::Gzip => ".gz",
            Compression::Zstd => ".zst",
        }
    }
}

fn decompress<R: BufRead + 'static>(mut br: R) -> Result<Box<dyn Read>> {
    let (is_gz, is_zstd) = {
        let buf = br.fill_buf()?;
        (buf.starts_with(&GZIP_MAGIC), buf.starts_with(&ZSTD_MAGIC))
    };
    if is_gz {
        Ok(Box::new(MultiGzDecoder::new(br)))
    } else if is_zstd {
        Ok(Box::new(zstd::Decoder::with_buffer(br)?))
    } else {
        Ok(Box::new(br))
    }
}

/// Opens a file (or stdin for `-`), sniffing gzip and zstd from the first bytes.
pub fn open_input(path: &str) -> Result<Box<dyn Read>> {
    if path == "-" {
        decompress(BufReader::new(io::stdin()))
    } else {
        decompress(BufReader::new(File::open(path)?))
    }
}

/// Creates a file (or stdout when `path` is `None`) with the requested compression.
pub fn open_output(path: Option<&Path>, compression: Compression) -> Result<Box<dyn Write>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    let writer: Box<dyn Write> = match compression {
        Compression::None => sink,
        Compression::Gzip => Box::new(GzEncoder::new(sink, flate2::Compression::default())),
        Compression::Zstd => Box::new(zstd::Encoder::new(sink, 0)?.auto_finish()),
    };
    Ok(Box::new(BufWriter::new(writer)))
}
