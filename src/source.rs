//! Reading the dataset text from disk, decompressing when the file is compressed.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::CompressionFormat;

/// Compression to apply: the explicit option wins, otherwise the file extension decides.
pub fn resolve_compression(
    path: &Path,
    explicit: Option<CompressionFormat>,
) -> Option<CompressionFormat> {
    explicit.or_else(|| CompressionFormat::from_extension(path))
}

fn open_reader(path: &Path, compression: Option<CompressionFormat>) -> io::Result<Box<dyn Read>> {
    let f = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = match compression {
        None => Box::new(f),
        Some(CompressionFormat::Gzip) => Box::new(flate2::read::MultiGzDecoder::new(f)),
        Some(CompressionFormat::Zstd) => Box::new(zstd::Decoder::new(f)?),
        Some(CompressionFormat::Bzip2) => Box::new(bzip2::read::BzDecoder::new(f)),
        Some(CompressionFormat::Xz) => Box::new(xz2::read::XzDecoder::new(f)),
    };
    Ok(reader)
}

/// Read the whole dataset into memory as UTF-8 text.
pub fn read_dataset(path: &Path, compression: Option<CompressionFormat>) -> io::Result<String> {
    if path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is a directory", path.display()),
        ));
    }
    let mut reader = open_reader(path, resolve_compression(path, compression))?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("dataset is not valid UTF-8: {}", e.utf8_error()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "x,y,s\n0,1,10\n";

    #[test]
    fn reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(read_dataset(&path, None).unwrap(), SAMPLE);
    }

    #[test]
    fn reads_gzip_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv.gz");
        let file = File::create(&path).unwrap();
        let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        enc.write_all(SAMPLE.as_bytes()).unwrap();
        enc.finish().unwrap();
        assert_eq!(read_dataset(&path, None).unwrap(), SAMPLE);
    }

    #[test]
    fn reads_zstd_when_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.bin");
        let compressed = zstd::encode_all(SAMPLE.as_bytes(), 0).unwrap();
        std::fs::write(&path, compressed).unwrap();
        assert_eq!(
            read_dataset(&path, Some(CompressionFormat::Zstd)).unwrap(),
            SAMPLE
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dataset(&dir.path().join("nope.csv"), None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn directory_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dataset(dir.path(), None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn invalid_utf8_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, [0x78, 0xff, 0xfe]).unwrap();
        let err = read_dataset(&path, None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn explicit_compression_wins_over_extension() {
        let p = Path::new("a.csv.gz");
        assert_eq!(resolve_compression(p, None), Some(CompressionFormat::Gzip));
        assert_eq!(
            resolve_compression(p, Some(CompressionFormat::Xz)),
            Some(CompressionFormat::Xz)
        );
        assert_eq!(resolve_compression(Path::new("a.csv"), None), None);
    }
}
